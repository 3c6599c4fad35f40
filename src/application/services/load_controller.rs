//! Per-image loading state machine.
//!
//! A controller is mounted for one target element. It decides whether to
//! wait for the viewport, reacts to the broker's visibility callback and to
//! the image element's load completion, and derives a [`RenderPlan`] from
//! its current state on demand.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::domain::entities::{
    BackgroundLayer, ElementId, ImageDescriptor, ImageId, ImageLayer, ImageOptions, LoadPhase,
    LoadState, PLACEHOLDER_TRANSITION_DELAY, PlaceholderLayer, RenderPlan,
};
use crate::infrastructure::image::{
    ResizeSpec, build_url, sizes_attribute, src_set, thumbnail_url, widths,
};
use crate::infrastructure::visibility::SubscriptionId;

use super::ImageServices;

/// Callback invoked whenever a mounted controller's full image finishes loading.
pub type LoadCallback = Arc<dyn Fn() + Send + Sync>;

/// URLs for one image, computed against the current format support.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageSources {
    /// Full-resolution URL at the source dimensions.
    pub final_src: String,
    /// `",\n"`-joined `"<url> <w>w"` entries when a max width is configured.
    pub final_src_set: Option<String>,
    /// Breakpoint hint paired with `final_src_set`.
    pub sizes: Option<String>,
    /// Blurred thumbnail URL.
    pub thumb_src: String,
}

struct Shared {
    id: ImageId,
    state: Mutex<LoadState>,
    services: ImageServices,
    on_load: Option<LoadCallback>,
}

impl Shared {
    fn mark_visible(&self) {
        let mut state = self.state.lock();
        state.is_visible = true;
        state.is_image_loaded = false;
        debug!(id = %self.id, phase = %state.phase(), "Image entered viewport");
    }

    fn mark_loaded(&self) {
        {
            let mut state = self.state.lock();
            if !state.is_visible {
                trace!(id = %self.id, "Load completion before visibility ignored");
                return;
            }
            if !state.is_image_loaded {
                state.is_image_loaded = true;
                debug!(id = %self.id, "Image loaded");
            }
        }
        self.services.seen().mark_seen(self.id.clone());

        if let Some(on_load) = &self.on_load {
            on_load();
        }
    }
}

/// Weak handle wired to the image element's load and error events.
///
/// Events arriving after the controller is dropped are ignored.
#[derive(Clone)]
pub struct LoadHandle {
    shared: Weak<Shared>,
}

impl LoadHandle {
    /// Reports load completion. Returns false if the controller is gone.
    pub fn notify_loaded(&self) -> bool {
        match self.shared.upgrade() {
            Some(shared) => {
                shared.mark_loaded();
                true
            }
            None => {
                trace!("Load completion after teardown ignored");
                false
            }
        }
    }

    /// Reports a failed fetch. The placeholder stays up; nothing transitions.
    pub fn notify_failed(&self, reason: &str) {
        if let Some(shared) = self.shared.upgrade() {
            warn!(id = %shared.id, reason, "Image failed to load, keeping placeholder");
        }
    }
}

impl std::fmt::Debug for LoadHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadHandle")
            .field("alive", &(self.shared.strong_count() > 0))
            .finish()
    }
}

/// Loading state machine for one mounted image.
///
/// Dropping the controller releases any pending visibility subscription.
pub struct ImageLoadController {
    target: ElementId,
    descriptor: ImageDescriptor,
    options: ImageOptions,
    shared: Arc<Shared>,
    subscription: Option<SubscriptionId>,
}

impl ImageLoadController {
    /// Mounts a controller for `descriptor` rendered into `target`.
    #[must_use]
    pub fn mount(
        target: ElementId,
        descriptor: ImageDescriptor,
        options: ImageOptions,
        services: &ImageServices,
        on_load: Option<LoadCallback>,
    ) -> Self {
        let id = descriptor.id();
        let state = LoadState::initial(
            services.seen().has_been_seen(&id),
            services.viewport().has_viewport(),
            services.broker().is_supported(),
        );

        let shared = Arc::new(Shared {
            id,
            state: Mutex::new(state),
            services: services.clone(),
            on_load,
        });

        let mut subscription = None;
        if state.phase() == LoadPhase::PendingVisibility {
            let weak = Arc::downgrade(&shared);
            subscription = services.broker().subscribe(
                target,
                Box::new(move || {
                    if let Some(shared) = weak.upgrade() {
                        shared.mark_visible();
                    }
                }),
            );
            if subscription.is_none() {
                debug!(id = %shared.id, "No visibility watcher, loading immediately");
                *shared.state.lock() = LoadState::initial(false, true, false);
            }
        }

        debug!(
            id = %shared.id,
            target = %target,
            phase = %shared.state.lock().phase(),
            "Mounted image controller"
        );

        Self {
            target,
            descriptor,
            options,
            shared,
            subscription,
        }
    }

    #[must_use]
    pub const fn target(&self) -> ElementId {
        self.target
    }

    #[must_use]
    pub const fn descriptor(&self) -> &ImageDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub const fn options(&self) -> &ImageOptions {
        &self.options
    }

    /// Snapshot of the current flags.
    #[must_use]
    pub fn state(&self) -> LoadState {
        *self.shared.state.lock()
    }

    #[must_use]
    pub fn phase(&self) -> LoadPhase {
        self.state().phase()
    }

    /// Returns true while a visibility subscription is outstanding.
    #[must_use]
    pub fn is_waiting_for_viewport(&self) -> bool {
        self.subscription
            .is_some_and(|id| self.shared.services.broker().is_pending(id))
    }

    /// Handle for the image element's load/error events.
    #[must_use]
    pub fn load_handle(&self) -> LoadHandle {
        LoadHandle {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Reports that the full image finished loading.
    pub fn on_image_loaded(&self) {
        self.shared.mark_loaded();
    }

    /// Computes every URL for this image. The format choice re-reads the
    /// feature cache on each call.
    #[must_use]
    pub fn sources(&self) -> ImageSources {
        let options = &self.options;
        let base = options.base_uri.as_str();
        let handle = self.descriptor.handle();
        let use_alt_format =
            options.with_webp && self.shared.services.features().is_preferred_format_supported();

        let final_src = build_url(
            base,
            handle,
            &ResizeSpec::exact(self.descriptor.width(), self.descriptor.height(), options.fit),
            &options.transforms,
            use_alt_format,
        );

        let (final_src_set, sizes) = match options.responsive_width() {
            Some(max_width) => (
                Some(src_set(
                    base,
                    handle,
                    &widths(self.descriptor.width(), max_width),
                    options.fit,
                    &options.transforms,
                    use_alt_format,
                )),
                Some(sizes_attribute(max_width)),
            ),
            None => (None, None),
        };

        ImageSources {
            final_src,
            final_src_set,
            sizes,
            thumb_src: thumbnail_url(base, handle),
        }
    }

    /// Derives what to draw right now.
    #[must_use]
    pub fn render(&self) -> RenderPlan {
        let state = self.state();
        let options = &self.options;
        let pending_opacity = u8::from(!state.is_image_loaded);

        let placeholder = options.blurry_placeholder.then(|| PlaceholderLayer {
            src: thumbnail_url(&options.base_uri, self.descriptor.handle()),
            opacity: pending_opacity,
            transition_delay: PLACEHOLDER_TRANSITION_DELAY.to_string(),
        });

        let background = options
            .background_color
            .resolve()
            .map(|color| BackgroundLayer {
                color: color.to_string(),
                opacity: pending_opacity,
                transition_delay: PLACEHOLDER_TRANSITION_DELAY.to_string(),
            });

        let image = state.is_visible.then(|| {
            let sources = self.sources();
            ImageLayer {
                src: sources.final_src,
                src_set: sources.final_src_set,
                sizes: sources.sizes,
                opacity: u8::from(state.is_image_loaded || !options.fade_in),
            }
        });

        RenderPlan::new(
            state,
            self.descriptor.aspect_padding_percent(),
            placeholder,
            background,
            image,
        )
        .with_text(options.title.clone(), options.alt.clone())
    }
}

impl Drop for ImageLoadController {
    fn drop(&mut self) {
        if let Some(id) = self.subscription.take() {
            if self.shared.services.broker().unsubscribe(id) {
                trace!(id = %self.shared.id, target = %self.target, "Released pending subscription");
            }
        }
    }
}

impl std::fmt::Debug for ImageLoadController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageLoadController")
            .field("target", &self.target)
            .field("descriptor", &self.descriptor)
            .field("state", &self.state())
            .field("subscription", &self.subscription)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{BackgroundColor, FitMode, RenderLayers};
    use crate::domain::ports::mocks::MockViewport;
    use crate::domain::ports::{IntersectionEntry, MockFormatProbePort};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const HANDLE: &str = "MtF5PNN0QCWl2kAx3NzW";

    fn descriptor() -> ImageDescriptor {
        ImageDescriptor::new(HANDLE, 1280, 853).unwrap()
    }

    fn probe(answer: Option<bool>) -> Arc<MockFormatProbePort> {
        let mut probe = MockFormatProbePort::new();
        probe.expect_probe_preferred_format().return_const(answer);
        Arc::new(probe)
    }

    fn services(viewport: &Arc<MockViewport>, webp: Option<bool>) -> ImageServices {
        ImageServices::new(probe(webp), viewport.clone())
    }

    fn counting_callback() -> (Arc<AtomicUsize>, LoadCallback) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = count.clone();
        (
            count,
            Arc::new(move || {
                inner.fetch_add(1, Ordering::SeqCst);
            }),
        )
    }

    #[test]
    fn test_lazy_lifecycle() {
        let viewport = Arc::new(MockViewport::interactive());
        let services = services(&viewport, Some(false));
        let (loads, on_load) = counting_callback();
        let target = ElementId::new(1);

        let controller = ImageLoadController::mount(
            target,
            descriptor(),
            ImageOptions::default(),
            &services,
            Some(on_load),
        );

        let state = controller.state();
        assert!(!state.is_visible);
        assert!(!state.is_image_loaded);
        assert_eq!(controller.phase(), LoadPhase::PendingVisibility);
        assert!(controller.is_waiting_for_viewport());
        assert_eq!(viewport.watcher.watching(), vec![target]);

        services
            .broker()
            .handle_entries(&[IntersectionEntry::entering(target)]);

        let state = controller.state();
        assert!(state.is_visible);
        assert!(!state.is_image_loaded);
        assert_eq!(controller.phase(), LoadPhase::Loading);
        assert!(!controller.is_waiting_for_viewport());

        controller.on_image_loaded();

        let state = controller.state();
        assert!(state.is_visible);
        assert!(state.is_image_loaded);
        assert_eq!(controller.phase(), LoadPhase::Loaded);
        assert!(services.seen().has_been_seen(&ImageId::new(HANDLE)));
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remount_after_load_skips_placeholder_flash() {
        let viewport = Arc::new(MockViewport::interactive());
        let services = services(&viewport, Some(false));
        let target = ElementId::new(1);

        let first =
            ImageLoadController::mount(target, descriptor(), ImageOptions::default(), &services, None);
        services
            .broker()
            .handle_entries(&[IntersectionEntry::entering(target)]);
        first.on_image_loaded();
        drop(first);

        let second = ImageLoadController::mount(
            ElementId::new(2),
            descriptor(),
            ImageOptions::default(),
            &services,
            None,
        );

        let state = second.state();
        assert!(state.is_visible);
        assert!(state.is_image_loaded);
        assert!(!second.is_waiting_for_viewport());
        assert_eq!(services.broker().pending(), 0);
    }

    #[test]
    fn test_without_intersection_loads_eagerly() {
        let viewport = Arc::new(MockViewport::with_capabilities(true, false));
        let services = services(&viewport, Some(true));

        let controller = ImageLoadController::mount(
            ElementId::new(1),
            descriptor(),
            ImageOptions::default(),
            &services,
            None,
        );

        assert_eq!(controller.phase(), LoadPhase::Loaded);
        assert!(controller.render().has_image());
        assert_eq!(viewport.watchers_created(), 0);
    }

    #[test]
    fn test_missing_watcher_falls_back_to_eager_load() {
        let viewport = Arc::new(MockViewport::without_watcher());
        let services = services(&viewport, Some(false));

        let controller = ImageLoadController::mount(
            ElementId::new(1),
            descriptor(),
            ImageOptions::default(),
            &services,
            None,
        );

        assert_eq!(controller.phase(), LoadPhase::Loaded);
        assert!(!controller.is_waiting_for_viewport());
        assert!(controller.render().has_image());
        assert_eq!(services.broker().pending(), 0);
    }

    #[test]
    fn test_load_handle_drives_lifecycle() {
        let viewport = Arc::new(MockViewport::interactive());
        let services = services(&viewport, Some(false));
        let (loads, on_load) = counting_callback();
        let target = ElementId::new(4);

        let controller = ImageLoadController::mount(
            target,
            descriptor(),
            ImageOptions::default(),
            &services,
            Some(on_load),
        );
        let handle = controller.load_handle();
        services
            .broker()
            .handle_entries(&[IntersectionEntry::entering(target)]);

        assert!(handle.notify_loaded());
        assert_eq!(controller.phase(), LoadPhase::Loaded);
        assert!(services.seen().has_been_seen(&ImageId::new(HANDLE)));
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_headless_renders_structure_only() {
        let viewport = Arc::new(MockViewport::with_capabilities(false, false));
        let services = ImageServices::new(Arc::new(MockFormatProbePort::new()), viewport.clone());

        let controller = ImageLoadController::mount(
            ElementId::new(1),
            descriptor(),
            ImageOptions::default(),
            &services,
            None,
        );

        let plan = controller.render();
        assert_eq!(plan.phase, LoadPhase::InitialHidden);
        assert!(!plan.has_image());
        assert!(plan.layers.contains(RenderLayers::SPACER | RenderLayers::PLACEHOLDER));
        assert_eq!(services.broker().pending(), 0);
    }

    #[test]
    fn test_drop_releases_subscription() {
        let viewport = Arc::new(MockViewport::interactive());
        let services = services(&viewport, Some(false));
        let target = ElementId::new(9);

        let controller =
            ImageLoadController::mount(target, descriptor(), ImageOptions::default(), &services, None);
        assert_eq!(services.broker().pending(), 1);

        drop(controller);

        assert_eq!(services.broker().pending(), 0);
        assert!(viewport.watcher.watching().is_empty());
        services
            .broker()
            .handle_entries(&[IntersectionEntry::entering(target)]);
        assert!(services.seen().is_empty());
    }

    #[test]
    fn test_load_after_teardown_is_ignored() {
        let viewport = Arc::new(MockViewport::with_capabilities(true, false));
        let services = services(&viewport, Some(false));
        let (loads, on_load) = counting_callback();

        let controller = ImageLoadController::mount(
            ElementId::new(1),
            descriptor(),
            ImageOptions::default(),
            &services,
            Some(on_load),
        );
        let handle = controller.load_handle();
        drop(controller);

        assert!(!handle.notify_loaded());
        assert_eq!(loads.load(Ordering::SeqCst), 0);
        assert!(services.seen().is_empty());
    }

    #[test]
    fn test_failed_load_keeps_placeholder() {
        let viewport = Arc::new(MockViewport::interactive());
        let services = services(&viewport, Some(false));
        let target = ElementId::new(1);
        let controller =
            ImageLoadController::mount(target, descriptor(), ImageOptions::default(), &services, None);
        services
            .broker()
            .handle_entries(&[IntersectionEntry::entering(target)]);

        controller.load_handle().notify_failed("404");

        let plan = controller.render();
        assert_eq!(plan.phase, LoadPhase::Loading);
        assert_eq!(plan.placeholder.map(|p| p.opacity), Some(1));
        assert!(!services.seen().has_been_seen(&ImageId::new(HANDLE)));
    }

    #[test]
    fn test_render_layers_follow_state() {
        let viewport = Arc::new(MockViewport::interactive());
        let services = services(&viewport, Some(false));
        let target = ElementId::new(1);
        let options = ImageOptions {
            background_color: BackgroundColor::Enabled(true),
            ..ImageOptions::default()
        };
        let controller = ImageLoadController::mount(target, descriptor(), options, &services, None);

        let plan = controller.render();
        assert!(!plan.has_image());
        assert_eq!(plan.background.as_ref().map(|b| b.color.as_str()), Some("lightgray"));
        assert_eq!(plan.background.as_ref().map(|b| b.opacity), Some(1));
        assert_eq!(
            plan.placeholder.as_ref().map(|p| p.src.as_str()),
            Some("https://media.graphcms.com/resize=w:20,h:20,fit:crop/blur=amount:2/compress/MtF5PNN0QCWl2kAx3NzW")
        );

        services
            .broker()
            .handle_entries(&[IntersectionEntry::entering(target)]);
        let plan = controller.render();
        assert_eq!(plan.image.as_ref().map(|i| i.opacity), Some(0));

        controller.on_image_loaded();
        let plan = controller.render();
        assert_eq!(plan.image.as_ref().map(|i| i.opacity), Some(1));
        assert_eq!(plan.placeholder.as_ref().map(|p| p.opacity), Some(0));
        assert_eq!(plan.background.as_ref().map(|b| b.opacity), Some(0));
    }

    #[test]
    fn test_no_fade_shows_image_while_loading() {
        let viewport = Arc::new(MockViewport::interactive());
        let services = services(&viewport, Some(false));
        let target = ElementId::new(1);
        let options = ImageOptions {
            fade_in: false,
            blurry_placeholder: false,
            ..ImageOptions::default()
        };
        let controller = ImageLoadController::mount(target, descriptor(), options, &services, None);
        services
            .broker()
            .handle_entries(&[IntersectionEntry::entering(target)]);

        let plan = controller.render();
        assert_eq!(plan.image.map(|i| i.opacity), Some(1));
        assert!(plan.placeholder.is_none());
        assert!(!plan.layers.contains(RenderLayers::PLACEHOLDER));
    }

    #[test]
    fn test_sources_with_srcset_and_webp() {
        let viewport = Arc::new(MockViewport::with_capabilities(true, false));
        let services = services(&viewport, Some(true));
        let options = ImageOptions {
            base_uri: "https://x".to_string(),
            max_width: 800,
            transforms: vec!["sharpen=amount:5".to_string()],
            ..ImageOptions::default()
        };
        let controller =
            ImageLoadController::mount(ElementId::new(1), descriptor(), options, &services, None);

        let sources = controller.sources();
        assert_eq!(
            sources.final_src,
            "https://x/resize=w:1280,h:853,fit:crop/sharpen=amount:5/output=format:webp/compress/MtF5PNN0QCWl2kAx3NzW"
        );
        assert_eq!(sources.sizes.as_deref(), Some("(max-width: 800px) 100vw, 800px"));
        let set = sources.final_src_set.unwrap();
        assert_eq!(set.split(",\n").count(), 5);
        assert!(set.ends_with("/output=format:webp/compress/MtF5PNN0QCWl2kAx3NzW 1280w"));
        assert!(!sources.thumb_src.contains("format:webp"));
    }

    #[test]
    fn test_without_max_width_no_srcset() {
        let viewport = Arc::new(MockViewport::with_capabilities(true, false));
        let services = services(&viewport, Some(false));
        let options = ImageOptions {
            fit: FitMode::Max,
            ..ImageOptions::default()
        };
        let controller =
            ImageLoadController::mount(ElementId::new(1), descriptor(), options, &services, None);

        let plan = controller.render();
        let image = plan.image.unwrap();
        assert!(image.src_set.is_none());
        assert!(image.sizes.is_none());
        assert!(image.src.contains("resize=w:1280,h:853,fit:max"));
    }

    #[test]
    fn test_format_choice_is_reread_on_each_render() {
        let viewport = Arc::new(MockViewport::with_capabilities(true, false));
        let mut probe = MockFormatProbePort::new();
        let mut seq = mockall::Sequence::new();
        probe
            .expect_probe_preferred_format()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(None::<bool>);
        probe
            .expect_probe_preferred_format()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(Some(true));
        let services = ImageServices::new(Arc::new(probe), viewport.clone());
        let controller = ImageLoadController::mount(
            ElementId::new(1),
            descriptor(),
            ImageOptions::default(),
            &services,
            None,
        );

        assert!(!controller.sources().final_src.contains("format:webp"));
        assert!(controller.sources().final_src.contains("format:webp"));
        assert!(controller.sources().final_src.contains("format:webp"));
    }

    #[test]
    fn test_webp_disabled_never_probes() {
        let viewport = Arc::new(MockViewport::with_capabilities(true, false));
        let services = ImageServices::new(Arc::new(MockFormatProbePort::new()), viewport.clone());
        let options = ImageOptions {
            with_webp: false,
            ..ImageOptions::default()
        };
        let controller =
            ImageLoadController::mount(ElementId::new(1), descriptor(), options, &services, None);

        assert!(!controller.sources().final_src.contains("format:webp"));
    }

    #[test]
    fn test_controllers_share_one_watcher() {
        let viewport = Arc::new(MockViewport::interactive());
        let services = services(&viewport, Some(false));

        let a = ImageLoadController::mount(
            ElementId::new(1),
            ImageDescriptor::new("a", 10, 10).unwrap(),
            ImageOptions::default(),
            &services,
            None,
        );
        let b = ImageLoadController::mount(
            ElementId::new(2),
            ImageDescriptor::new("b", 10, 10).unwrap(),
            ImageOptions::default(),
            &services,
            None,
        );

        services
            .broker()
            .handle_entries(&[IntersectionEntry::entering(ElementId::new(2))]);

        assert_eq!(viewport.watchers_created(), 1);
        assert_eq!(a.phase(), LoadPhase::PendingVisibility);
        assert_eq!(b.phase(), LoadPhase::Loading);
    }
}
