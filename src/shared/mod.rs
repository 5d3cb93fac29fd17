pub mod config;
pub mod error;
pub mod logging;

pub use config::{AppConfig, DatabaseConfig, RemoteConfig, SyncSettings};
pub use error::AppError;
