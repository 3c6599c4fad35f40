//! Ports for the platform's viewport and intersection capabilities.

use std::sync::Arc;

use crate::domain::entities::ElementId;

/// A single intersection report delivered by the platform watcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    /// Element the report is about.
    pub target: ElementId,
    /// Some platforms only report a ratio and leave this unset.
    pub is_intersecting: Option<bool>,
    /// Visible fraction of the target, from 0 to 1.
    pub intersection_ratio: f64,
}

impl IntersectionEntry {
    /// Entry reporting that `target` entered the (margin-expanded) viewport.
    #[must_use]
    pub const fn entering(target: ElementId) -> Self {
        Self {
            target,
            is_intersecting: Some(true),
            intersection_ratio: 1.0,
        }
    }

    /// Entry reporting that `target` is outside the viewport.
    #[must_use]
    pub const fn leaving(target: ElementId) -> Self {
        Self {
            target,
            is_intersecting: Some(false),
            intersection_ratio: 0.0,
        }
    }

    /// Returns true if the target counts as visible.
    ///
    /// A positive ratio is accepted even when the boolean flag is missing
    /// or false.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.is_intersecting == Some(true) || self.intersection_ratio > 0.0
    }
}

/// A platform intersection watcher that can track many targets.
pub trait IntersectionWatcherPort: Send + Sync {
    /// Starts watching `target`.
    fn observe(&self, target: ElementId);

    /// Stops watching `target`. Unknown targets are ignored.
    fn unobserve(&self, target: ElementId);
}

/// Port describing the execution context's viewport.
pub trait ViewportPort: Send + Sync {
    /// Returns false in headless or server contexts.
    fn has_viewport(&self) -> bool;

    /// Returns true if the platform can report viewport intersections.
    fn supports_intersection(&self) -> bool;

    /// Creates a watcher whose viewport is expanded by `root_margin_px` on
    /// every side. Returns `None` when intersection detection is missing.
    fn create_watcher(&self, root_margin_px: u32) -> Option<Arc<dyn IntersectionWatcherPort>>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_only_entry_counts_as_visible() {
        let entry = IntersectionEntry {
            target: ElementId::new(1),
            is_intersecting: None,
            intersection_ratio: 0.01,
        };
        assert!(entry.is_visible());
    }

    #[test]
    fn test_flag_without_ratio_counts_as_visible() {
        let entry = IntersectionEntry {
            target: ElementId::new(1),
            is_intersecting: Some(true),
            intersection_ratio: 0.0,
        };
        assert!(entry.is_visible());
        assert!(!IntersectionEntry::leaving(ElementId::new(1)).is_visible());
    }
}
