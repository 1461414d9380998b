//! Atelier core types and utilities

pub mod credentials;
pub mod error;
pub mod types;

pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore, StoredSession, TokenPair};
pub use error::{CoreError, CoreResult};
