//! Port for probing next-gen image format support.

/// Synchronous capability probe for the preferred image format (WebP).
#[cfg_attr(test, mockall::automock)]
pub trait FormatProbePort: Send + Sync {
    /// Runs the probe.
    ///
    /// Returns `None` when there is no rendering surface to probe with, so
    /// the answer is unknown rather than negative.
    fn probe_preferred_format(&self) -> Option<bool>;
}
