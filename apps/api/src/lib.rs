pub mod router;
pub mod seed;
pub mod services;

pub use router::create_router;
pub use services::Services;
