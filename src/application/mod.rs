//! Application layer tying the shared services to per-image controllers.

/// Image services and the loading state machine.
pub mod services;

pub use services::{ImageLoadController, ImageServices, ImageSources, LoadCallback, LoadHandle};
