pub mod author_status;

pub use author_status::AuthorStatus;
