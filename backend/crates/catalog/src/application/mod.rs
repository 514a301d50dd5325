pub mod apply_author;
pub mod browse;
pub mod cache_keys;
pub mod config;
pub mod maintenance;
pub mod manage_book;
pub mod moderate_authors;
pub mod moderate_books;
pub mod upload_book;

pub use apply_author::{ApplyAuthorUseCase, AuthorProfileInput};
pub use config::CatalogConfig;
pub use browse::{BrowseUseCase, Page, Pagination};
pub use maintenance::MaintenanceUseCase;
pub use manage_book::{ManageBookUseCase, UpdateBookInput};
pub use moderate_authors::ModerateAuthorsUseCase;
pub use moderate_books::ModerateBooksUseCase;
pub use upload_book::{FilePart, UploadBookUseCase, UploadInput};
