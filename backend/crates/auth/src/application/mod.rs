pub mod authenticate;
pub mod config;
pub mod login;
pub mod logout;
pub mod register;

pub use authenticate::AuthenticateUseCase;
pub use login::{LoginInput, LoginUseCase};
pub use logout::LogoutUseCase;
pub use register::{RegisterInput, RegisterUseCase};
