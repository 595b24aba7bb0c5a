pub mod machine;
pub mod session_store;
pub mod wizard;

pub use session_store::{session_key, InMemorySessionStore, RedisSessionStore, SessionStore};
pub use wizard::WizardService;
