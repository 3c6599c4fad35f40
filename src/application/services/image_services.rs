//! Shared services every image controller draws on.

use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::domain::ports::{FormatProbePort, ViewportPort};
use crate::infrastructure::image::{FeatureCache, SeenCache};
use crate::infrastructure::platform::HeadlessPlatform;
use crate::infrastructure::visibility::VisibilityBroker;

static GLOBAL: OnceLock<ImageServices> = OnceLock::new();

/// Format cache, seen cache and visibility broker bundled for injection.
///
/// Cloning shares all three. Tests build their own bundle; applications
/// usually install one process-wide with [`ImageServices::install_global`].
#[derive(Clone)]
pub struct ImageServices {
    features: Arc<FeatureCache>,
    seen: SeenCache,
    broker: Arc<VisibilityBroker>,
    viewport: Arc<dyn ViewportPort>,
}

impl ImageServices {
    #[must_use]
    pub fn new(probe: Arc<dyn FormatProbePort>, viewport: Arc<dyn ViewportPort>) -> Self {
        Self {
            features: Arc::new(FeatureCache::new(probe)),
            seen: SeenCache::new(),
            broker: Arc::new(VisibilityBroker::new(viewport.clone())),
            viewport,
        }
    }

    /// Builds services from one adapter that provides both capabilities.
    #[must_use]
    pub fn from_platform<P>(platform: Arc<P>) -> Self
    where
        P: FormatProbePort + ViewportPort + 'static,
    {
        Self::new(platform.clone(), platform)
    }

    /// Services for a context without viewport or rendering surface.
    #[must_use]
    pub fn headless() -> Self {
        Self::from_platform(Arc::new(HeadlessPlatform))
    }

    /// Returns the process-wide services, creating headless ones if none
    /// were installed.
    pub fn global() -> &'static Self {
        GLOBAL.get_or_init(|| {
            debug!("No image services installed, using headless defaults");
            Self::headless()
        })
    }

    /// Installs the process-wide services.
    ///
    /// # Errors
    /// Hands `services` back if the global instance already exists.
    pub fn install_global(services: Self) -> Result<(), Self> {
        GLOBAL.set(services)
    }

    #[must_use]
    pub fn features(&self) -> &FeatureCache {
        &self.features
    }

    #[must_use]
    pub fn seen(&self) -> &SeenCache {
        &self.seen
    }

    #[must_use]
    pub fn broker(&self) -> &VisibilityBroker {
        &self.broker
    }

    #[must_use]
    pub fn viewport(&self) -> &dyn ViewportPort {
        self.viewport.as_ref()
    }
}

impl std::fmt::Debug for ImageServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageServices")
            .field("features", &self.features)
            .field("seen", &self.seen.len())
            .field("broker", &self.broker)
            .finish_non_exhaustive()
    }
}
