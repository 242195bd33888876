pub mod env;
pub mod loader;
pub mod types;

pub use loader::{load_config, CONFIG_ENV};
pub use types::{NamecardConfig, Profile, ProfileConfig, DEFAULT_PROFILE};
