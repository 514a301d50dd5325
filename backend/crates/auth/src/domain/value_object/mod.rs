pub mod display_name;
pub mod email;
pub mod public_id;

pub use display_name::DisplayName;
pub use email::Email;
pub use public_id::PublicId;
