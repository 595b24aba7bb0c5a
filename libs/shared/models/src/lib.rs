pub mod auth;
pub mod error;

pub use auth::{Permission, Principal};
pub use error::AppError;
