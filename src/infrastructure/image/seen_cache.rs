//! Record of images that have already been shown once.
//!
//! Remounting a finished image (for example after scroll virtualization)
//! consults this set so it renders in its final state instead of replaying
//! the placeholder fade.

use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;

use tracing::trace;

use crate::domain::entities::ImageId;

/// Write-once set of image ids. Entries are never removed.
///
/// Cloning shares the underlying set.
#[derive(Debug, Clone, Default)]
pub struct SeenCache {
    seen: Arc<RwLock<HashSet<ImageId>>>,
}

impl SeenCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            seen: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Returns true if `id` was marked before. Never mutates.
    #[must_use]
    pub fn has_been_seen(&self, id: &ImageId) -> bool {
        self.seen.read().contains(id)
    }

    /// Marks `id` as seen. Returns true if this call inserted it.
    pub fn mark_seen(&self, id: ImageId) -> bool {
        if self.has_been_seen(&id) {
            return false;
        }
        let mut seen = self.seen.write();
        trace!(id = %id, "Marking image as seen");
        seen.insert(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_then_query() {
        let cache = SeenCache::new();
        let id = ImageId::new("abc");

        assert!(!cache.has_been_seen(&id));
        assert!(cache.mark_seen(id.clone()));
        assert!(cache.has_been_seen(&id));
    }

    #[test]
    fn test_unmarked_id_is_unseen() {
        let cache = SeenCache::new();
        cache.mark_seen(ImageId::new("a"));

        assert!(!cache.has_been_seen(&ImageId::new("b")));
    }

    #[test]
    fn test_mark_is_idempotent() {
        let cache = SeenCache::new();
        let id = ImageId::new("abc");

        assert!(cache.mark_seen(id.clone()));
        assert!(!cache.mark_seen(id.clone()));
        assert!(cache.has_been_seen(&id));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let cache = SeenCache::new();
        let other = cache.clone();

        other.mark_seen(ImageId::new("shared"));

        assert!(cache.has_been_seen(&ImageId::new("shared")));
        assert!(!cache.is_empty());
    }

    #[test]
    fn test_query_does_not_insert() {
        let cache = SeenCache::new();
        let _ = cache.has_been_seen(&ImageId::new("x"));
        assert!(cache.is_empty());
    }
}
