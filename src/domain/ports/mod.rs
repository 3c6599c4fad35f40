//! Ports for the platform capabilities the image pipeline consumes.

mod format_probe_port;
mod viewport_port;

#[cfg(test)]
pub use format_probe_port::MockFormatProbePort;
pub use format_probe_port::FormatProbePort;
pub use viewport_port::{IntersectionEntry, IntersectionWatcherPort, ViewportPort};
