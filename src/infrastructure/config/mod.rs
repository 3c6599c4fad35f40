//! Application configuration.

pub mod app_config;
pub mod args;
pub mod storage;

pub use app_config::{AppConfig, LogLevel};
pub use args::{CliArgs, Command, ContextKind, ImageArgs, PlanArgs, Step};
pub use storage::{ConfigError, StorageManager};
