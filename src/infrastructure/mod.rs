//! Infrastructure layer with caches, URL construction and platform adapters.

/// Application configuration.
pub mod config;
/// Image URL construction and caches.
pub mod image;
/// Platform capability adapters.
pub mod platform;
/// Shared viewport visibility watcher.
pub mod visibility;

pub use config::{AppConfig, CliArgs, ConfigError, LogLevel, StorageManager};
pub use image::{FeatureCache, FormatSupport, SeenCache};
pub use platform::{HeadlessPlatform, StaticPlatform, TrackingWatcher};
pub use visibility::{ROOT_MARGIN_PX, SubscriptionId, VisibilityBroker};
