//! Platform capability adapters for non-browser hosts.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::entities::ElementId;
use crate::domain::ports::{FormatProbePort, IntersectionWatcherPort, ViewportPort};

/// A context with no viewport and no rendering surface, such as a server
/// pre-rendering markup. Nothing is probed and nothing is watched.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessPlatform;

impl FormatProbePort for HeadlessPlatform {
    fn probe_preferred_format(&self) -> Option<bool> {
        None
    }
}

impl ViewportPort for HeadlessPlatform {
    fn has_viewport(&self) -> bool {
        false
    }

    fn supports_intersection(&self) -> bool {
        false
    }

    fn create_watcher(&self, _root_margin_px: u32) -> Option<Arc<dyn IntersectionWatcherPort>> {
        None
    }
}

/// Watcher that only tracks which targets are observed. Intersections are
/// reported by the host through `VisibilityBroker::handle_entries`.
#[derive(Debug, Default)]
pub struct TrackingWatcher {
    observed: Mutex<BTreeSet<ElementId>>,
}

impl TrackingWatcher {
    /// Targets currently observed, in ascending order.
    #[must_use]
    pub fn observed(&self) -> Vec<ElementId> {
        self.observed.lock().iter().copied().collect()
    }
}

impl IntersectionWatcherPort for TrackingWatcher {
    fn observe(&self, target: ElementId) {
        self.observed.lock().insert(target);
    }

    fn unobserve(&self, target: ElementId) {
        self.observed.lock().remove(&target);
    }
}

/// Fixed, host-declared capabilities.
#[derive(Debug)]
pub struct StaticPlatform {
    viewport: bool,
    intersection: bool,
    webp: Option<bool>,
    watcher: Arc<TrackingWatcher>,
}

impl StaticPlatform {
    /// Creates a platform. `webp` of `None` means there is no surface to
    /// probe with.
    #[must_use]
    pub fn new(viewport: bool, intersection: bool, webp: Option<bool>) -> Self {
        Self {
            viewport,
            intersection,
            webp,
            watcher: Arc::new(TrackingWatcher::default()),
        }
    }

    /// An interactive context with lazy loading available.
    #[must_use]
    pub fn interactive(webp: bool) -> Self {
        Self::new(true, true, Some(webp))
    }

    /// An interactive context that cannot detect intersections.
    #[must_use]
    pub fn eager(webp: bool) -> Self {
        Self::new(true, false, Some(webp))
    }

    /// The shared watcher handed to the broker.
    #[must_use]
    pub fn watcher(&self) -> Arc<TrackingWatcher> {
        self.watcher.clone()
    }
}

impl FormatProbePort for StaticPlatform {
    fn probe_preferred_format(&self) -> Option<bool> {
        if self.viewport { self.webp } else { None }
    }
}

impl ViewportPort for StaticPlatform {
    fn has_viewport(&self) -> bool {
        self.viewport
    }

    fn supports_intersection(&self) -> bool {
        self.intersection
    }

    fn create_watcher(&self, _root_margin_px: u32) -> Option<Arc<dyn IntersectionWatcherPort>> {
        if !self.viewport || !self.intersection {
            return None;
        }
        let watcher: Arc<dyn IntersectionWatcherPort> = self.watcher.clone();
        Some(watcher)
    }
}
