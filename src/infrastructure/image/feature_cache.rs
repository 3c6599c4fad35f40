//! Memoized next-gen image format detection.

use std::sync::{Arc, OnceLock};

use tracing::{debug, trace};

use crate::domain::ports::FormatProbePort;

/// Tri-state view of the cached probe result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatSupport {
    /// The probe has not produced an answer yet.
    Unknown,
    Supported,
    Unsupported,
}

/// Runs the format probe at most once and remembers the answer.
///
/// When the probe reports that no rendering surface exists, `false` is
/// returned but nothing is cached, so a later call from a visual context
/// can still probe.
pub struct FeatureCache {
    probe: Arc<dyn FormatProbePort>,
    webp: OnceLock<bool>,
}

impl FeatureCache {
    #[must_use]
    pub fn new(probe: Arc<dyn FormatProbePort>) -> Self {
        Self {
            probe,
            webp: OnceLock::new(),
        }
    }

    /// Returns true if the preferred (WebP) format is supported.
    pub fn is_preferred_format_supported(&self) -> bool {
        if let Some(supported) = self.webp.get() {
            return *supported;
        }

        match self.probe.probe_preferred_format() {
            Some(supported) => {
                let cached = *self.webp.get_or_init(|| supported);
                debug!(supported = cached, "Preferred image format probed");
                cached
            }
            None => {
                trace!("No rendering surface, format support left unknown");
                false
            }
        }
    }

    /// Returns the cached state without probing.
    #[must_use]
    pub fn status(&self) -> FormatSupport {
        match self.webp.get() {
            None => FormatSupport::Unknown,
            Some(true) => FormatSupport::Supported,
            Some(false) => FormatSupport::Unsupported,
        }
    }
}

impl std::fmt::Debug for FeatureCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureCache")
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockFormatProbePort;

    #[test]
    fn test_probe_runs_exactly_once() {
        let mut probe = MockFormatProbePort::new();
        probe
            .expect_probe_preferred_format()
            .times(1)
            .return_const(Some(true));
        let cache = FeatureCache::new(Arc::new(probe));

        assert_eq!(cache.status(), FormatSupport::Unknown);
        assert!(cache.is_preferred_format_supported());
        assert!(cache.is_preferred_format_supported());
        assert!(cache.is_preferred_format_supported());
        assert_eq!(cache.status(), FormatSupport::Supported);
    }

    #[test]
    fn test_negative_result_is_cached() {
        let mut probe = MockFormatProbePort::new();
        probe
            .expect_probe_preferred_format()
            .times(1)
            .return_const(Some(false));
        let cache = FeatureCache::new(Arc::new(probe));

        assert!(!cache.is_preferred_format_supported());
        assert!(!cache.is_preferred_format_supported());
        assert_eq!(cache.status(), FormatSupport::Unsupported);
    }

    #[test]
    fn test_missing_surface_is_not_cached() {
        let mut probe = MockFormatProbePort::new();
        let mut seq = mockall::Sequence::new();
        probe
            .expect_probe_preferred_format()
            .times(2)
            .in_sequence(&mut seq)
            .return_const(None::<bool>);
        probe
            .expect_probe_preferred_format()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(Some(true));
        let cache = FeatureCache::new(Arc::new(probe));

        assert!(!cache.is_preferred_format_supported());
        assert!(!cache.is_preferred_format_supported());
        assert_eq!(cache.status(), FormatSupport::Unknown);

        assert!(cache.is_preferred_format_supported());
        assert!(cache.is_preferred_format_supported());
        assert_eq!(cache.status(), FormatSupport::Supported);
    }

    #[test]
    fn test_status_never_probes() {
        let probe = MockFormatProbePort::new();
        let cache = FeatureCache::new(Arc::new(probe));

        assert_eq!(cache.status(), FormatSupport::Unknown);
    }
}
