//! Shared viewport-intersection watcher with one-shot subscriptions.
//!
//! Every image registers against the same platform watcher. The first time
//! a target reports a positive intersection, each subscription for that
//! target is removed and its callback runs exactly once.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::domain::entities::ElementId;
use crate::domain::ports::{IntersectionEntry, IntersectionWatcherPort, ViewportPort};

/// Margin, in CSS pixels, by which the viewport is expanded so images
/// start loading just ahead of scroll.
pub const ROOT_MARGIN_PX: u32 = 200;

/// One-shot visibility callback.
pub type VisibleCallback = Box<dyn FnOnce() + Send>;

/// Handle returned by [`VisibilityBroker::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

struct Subscription {
    id: SubscriptionId,
    target: ElementId,
    on_visible: VisibleCallback,
}

#[derive(Default)]
struct BrokerState {
    watcher: Option<Arc<dyn IntersectionWatcherPort>>,
    subscriptions: Vec<Subscription>,
}

impl BrokerState {
    fn has_target(&self, target: ElementId) -> bool {
        self.subscriptions.iter().any(|s| s.target == target)
    }
}

/// Multiplexes one platform intersection watcher across many targets.
pub struct VisibilityBroker {
    viewport: Arc<dyn ViewportPort>,
    state: Mutex<BrokerState>,
    next_id: AtomicU64,
}

impl VisibilityBroker {
    /// Creates a broker. The platform watcher is created lazily on the
    /// first subscription.
    #[must_use]
    pub fn new(viewport: Arc<dyn ViewportPort>) -> Self {
        Self {
            viewport,
            state: Mutex::new(BrokerState::default()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Returns true if the runtime can report intersections at all.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.viewport.has_viewport() && self.viewport.supports_intersection()
    }

    /// Registers `on_visible` to run the first time `target` becomes visible.
    ///
    /// Returns `None` and drops the callback uncalled when no watcher can
    /// be created, so callers can fall back to loading right away.
    pub fn subscribe(
        &self,
        target: ElementId,
        on_visible: VisibleCallback,
    ) -> Option<SubscriptionId> {
        let mut state = self.state.lock();
        let Some(watcher) = self.watcher(&mut state) else {
            debug!(target = %target, "Intersection detection unavailable, subscription ignored");
            return None;
        };

        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));

        if !state.has_target(target) {
            watcher.observe(target);
        }
        state.subscriptions.push(Subscription {
            id,
            target,
            on_visible,
        });
        trace!(target = %target, subscription = %id, "Subscribed to visibility");
        Some(id)
    }

    /// Cancels a pending subscription.
    ///
    /// Returns false for handles that already fired or were removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.state.lock();
        let Some(pos) = state.subscriptions.iter().position(|s| s.id == id) else {
            return false;
        };
        let removed = state.subscriptions.remove(pos);

        if !state.has_target(removed.target) {
            if let Some(watcher) = &state.watcher {
                watcher.unobserve(removed.target);
            }
        }
        trace!(target = %removed.target, subscription = %id, "Unsubscribed from visibility");
        true
    }

    /// Delivers a batch of intersection reports from the platform watcher.
    ///
    /// Callbacks run after the internal lock is released, so they may
    /// subscribe or unsubscribe freely.
    pub fn handle_entries(&self, entries: &[IntersectionEntry]) {
        let fired = {
            let mut state = self.state.lock();
            let mut fired = Vec::new();

            for entry in entries.iter().filter(|e| e.is_visible()) {
                if !state.has_target(entry.target) {
                    continue;
                }
                if let Some(watcher) = &state.watcher {
                    watcher.unobserve(entry.target);
                }

                let (matching, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut state.subscriptions)
                    .into_iter()
                    .partition(|s| s.target == entry.target);
                state.subscriptions = rest;
                fired.extend(matching);
            }
            fired
        };

        for subscription in fired {
            debug!(
                target = %subscription.target,
                subscription = %subscription.id,
                "Target became visible"
            );
            (subscription.on_visible)();
        }
    }

    /// Number of subscriptions that have not fired yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.state.lock().subscriptions.len()
    }

    /// Returns true if `id` is still waiting to fire.
    #[must_use]
    pub fn is_pending(&self, id: SubscriptionId) -> bool {
        self.state.lock().subscriptions.iter().any(|s| s.id == id)
    }

    fn watcher(&self, state: &mut BrokerState) -> Option<Arc<dyn IntersectionWatcherPort>> {
        if state.watcher.is_none() {
            if !self.viewport.has_viewport() {
                return None;
            }
            let watcher = self.viewport.create_watcher(ROOT_MARGIN_PX)?;
            debug!(margin = ROOT_MARGIN_PX, "Created shared intersection watcher");
            state.watcher = Some(watcher);
        }
        state.watcher.clone()
    }
}

impl std::fmt::Debug for VisibilityBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("VisibilityBroker")
            .field("has_watcher", &state.watcher.is_some())
            .field("pending", &state.subscriptions.len())
            .finish_non_exhaustive()
    }
}
