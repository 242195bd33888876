pub mod api;
pub mod args;
pub mod cli;
pub mod config;
pub mod coordinator;
pub mod credentials;
pub mod device;
pub mod error;
pub mod transport;
pub mod transports;
pub mod types;

pub use api::NamecardClient;
pub use config::{load_config, NamecardConfig, Profile};
pub use coordinator::{AuthenticatedRequestCoordinator, CoordinatorOptions};
pub use credentials::{CredentialStore, Credentials, FileCredentialStore, MemoryCredentialStore};
pub use error::{NamecardError, RefreshFailure};
pub use transport::{ApiRequest, ApiResponse, Transport};
pub use transports::HttpTransport;
pub use types::{Card, CardPayload, CardType, User};

/// One-shot convenience: resolve a profile from the discovered config and
/// build a client that persists its session to the profile's session file.
pub fn connect(profile: Option<&str>) -> Result<NamecardClient, NamecardError> {
    Ok(cli::Session::open(None, profile)?.client)
}
