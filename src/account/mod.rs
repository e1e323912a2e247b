pub mod auth;
pub mod store;
pub mod usage;

pub use auth::{Authenticator, Credentials, MockAuthenticator, Session};
pub use store::{JsonFileStore, MemoryStore, UsageRecord, UsageStore};
pub use usage::{Plan, UsageGate};
