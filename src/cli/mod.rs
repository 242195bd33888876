pub mod auth;
pub mod card;
pub mod config_cmd;
pub mod output;
pub mod session;

pub use output::OutputMode;
pub use session::Session;
