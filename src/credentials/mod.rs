pub mod file;
pub mod jwt;
pub mod store;

pub use file::{session_path, FileCredentialStore};
pub use jwt::{decode_claims, TokenClaims};
pub use store::{CredentialStore, Credentials, MemoryCredentialStore};
