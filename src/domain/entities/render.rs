//! Render decision types handed to the presentation layer.

use serde::{Deserialize, Serialize};

use super::{LoadPhase, LoadState};

/// Transition delay applied to the placeholder and background layers.
pub const PLACEHOLDER_TRANSITION_DELAY: &str = "0.25s";

bitflags::bitflags! {
    /// Which layers of the image stack are present in a render.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct RenderLayers: u8 {
        const SPACER = 1 << 0;
        const PLACEHOLDER = 1 << 1;
        const BACKGROUND = 1 << 2;
        const IMAGE = 1 << 3;
    }
}

/// The blurred thumbnail layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceholderLayer {
    /// Tiny blurred variant of the source.
    pub src: String,
    /// 1 until the full image loads, then 0.
    pub opacity: u8,
    /// CSS delay before the fade-out starts.
    pub transition_delay: String,
}

/// The solid color layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackgroundLayer {
    /// CSS color value.
    pub color: String,
    /// 1 until the full image loads, then 0.
    pub opacity: u8,
    /// CSS delay before the fade-out starts.
    pub transition_delay: String,
}

/// The full image element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageLayer {
    /// Full-resolution URL.
    pub src: String,
    /// Present only when a max display width is configured.
    pub src_set: Option<String>,
    /// Present only when a max display width is configured.
    pub sizes: Option<String>,
    /// 0 while fading in, 1 once loaded or when fade-in is off.
    pub opacity: u8,
}

/// Everything the presentation layer needs to draw one image at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPlan {
    /// Layers present in this render.
    pub layers: RenderLayers,
    /// Coarse load phase the plan was derived from.
    pub phase: LoadPhase,
    /// The full image element is mounted.
    pub visible: bool,
    /// The full image has finished loading.
    pub loaded: bool,
    /// Bottom padding reserving the aspect ratio.
    pub aspect_padding_percent: f64,
    /// Blurred thumbnail, when enabled.
    pub placeholder: Option<PlaceholderLayer>,
    /// Solid color underlay, when enabled.
    pub background: Option<BackgroundLayer>,
    /// Full image, once visible.
    pub image: Option<ImageLayer>,
    /// Title text applied to the full image.
    pub title: String,
    /// Alt text applied to the full image.
    pub alt: String,
}

impl RenderPlan {
    /// Assembles a plan and derives its layer set from the parts present.
    #[must_use]
    pub fn new(
        state: LoadState,
        aspect_padding_percent: f64,
        placeholder: Option<PlaceholderLayer>,
        background: Option<BackgroundLayer>,
        image: Option<ImageLayer>,
    ) -> Self {
        let mut layers = RenderLayers::SPACER;
        layers.set(RenderLayers::PLACEHOLDER, placeholder.is_some());
        layers.set(RenderLayers::BACKGROUND, background.is_some());
        layers.set(RenderLayers::IMAGE, image.is_some());

        Self {
            layers,
            phase: state.phase(),
            visible: state.is_visible,
            loaded: state.is_image_loaded,
            aspect_padding_percent,
            placeholder,
            background,
            image,
            title: String::new(),
            alt: String::new(),
        }
    }

    /// Sets the pass-through text attributes.
    #[must_use]
    pub fn with_text(mut self, title: impl Into<String>, alt: impl Into<String>) -> Self {
        self.title = title.into();
        self.alt = alt.into();
        self
    }

    /// Returns true if the full image element should be mounted.
    #[must_use]
    pub const fn has_image(&self) -> bool {
        self.layers.contains(RenderLayers::IMAGE)
    }
}
