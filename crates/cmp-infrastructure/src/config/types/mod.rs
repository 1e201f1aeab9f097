//! Configuration sections

mod app;
mod client;
mod logging;
mod server;
mod storage;

pub use app::AppConfig;
pub use client::ClientConfig;
pub use logging::LoggingConfig;
pub use server::ServerConfig;
pub use storage::StorageConfig;
