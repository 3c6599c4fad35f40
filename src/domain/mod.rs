//! Domain layer with image entities, errors and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{ImageDescriptor, ImageId, ImageOptions, LoadState};
pub use errors::DescriptorError;
pub use ports::{FormatProbePort, ViewportPort};
