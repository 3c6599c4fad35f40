//! Per-image rendering options.

use serde::{Deserialize, Serialize};

use super::FitMode;

/// Default CDN address images are requested from.
pub const DEFAULT_BASE_URI: &str = "https://media.graphcms.com";

/// Color used when the background layer is enabled without a color.
pub const DEFAULT_BACKGROUND_COLOR: &str = "lightgray";

/// Options controlling how a single image is requested and revealed.
///
/// Every field has a default, so a partial TOML table or JSON object is
/// enough to configure an image.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageOptions {
    /// CDN address prepended to every transform URL.
    #[serde(default = "default_base_uri")]
    pub base_uri: String,

    /// Fit mode for the full image and every srcset entry.
    #[serde(default)]
    pub fit: FitMode,

    /// Largest width the image is displayed at. `0` disables srcset.
    #[serde(default)]
    pub max_width: u32,

    /// Request the next-gen format when the runtime supports it.
    #[serde(default = "default_true")]
    pub with_webp: bool,

    /// Extra CDN transforms, e.g. `sharpen=amount:5`, applied in order.
    #[serde(default)]
    pub transforms: Vec<String>,

    /// Show a blurred thumbnail until the full image loads.
    #[serde(default = "default_true")]
    pub blurry_placeholder: bool,

    /// Solid color layer shown until the full image loads.
    #[serde(default)]
    pub background_color: BackgroundColor,

    /// Fade the full image in once it has loaded.
    #[serde(default = "default_true")]
    pub fade_in: bool,

    /// Passed through to the image elements.
    #[serde(default)]
    pub title: String,

    /// Passed through to the image elements.
    #[serde(default)]
    pub alt: String,
}

impl ImageOptions {
    /// Returns the srcset display width, if one is configured.
    #[must_use]
    pub const fn responsive_width(&self) -> Option<u32> {
        if self.max_width == 0 {
            None
        } else {
            Some(self.max_width)
        }
    }
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            base_uri: default_base_uri(),
            fit: FitMode::default(),
            max_width: 0,
            with_webp: true,
            transforms: Vec::new(),
            blurry_placeholder: true,
            background_color: BackgroundColor::default(),
            fade_in: true,
            title: String::new(),
            alt: String::new(),
        }
    }
}

fn default_base_uri() -> String {
    DEFAULT_BASE_URI.to_string()
}

fn default_true() -> bool {
    true
}

/// Background layer setting: either a flag or an explicit color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BackgroundColor {
    /// `true` uses [`DEFAULT_BACKGROUND_COLOR`], `false` disables the layer.
    Enabled(bool),
    /// Any CSS color. An empty string disables the layer.
    Color(String),
}

impl BackgroundColor {
    /// Resolves the effective CSS color, or `None` when disabled.
    #[must_use]
    pub fn resolve(&self) -> Option<&str> {
        match self {
            Self::Enabled(true) => Some(DEFAULT_BACKGROUND_COLOR),
            Self::Enabled(false) => None,
            Self::Color(color) if color.trim().is_empty() => None,
            Self::Color(color) => Some(color.as_str()),
        }
    }
}

impl Default for BackgroundColor {
    fn default() -> Self {
        Self::Enabled(false)
    }
}

impl From<bool> for BackgroundColor {
    fn from(value: bool) -> Self {
        Self::Enabled(value)
    }
}

impl From<&str> for BackgroundColor {
    fn from(value: &str) -> Self {
        Self::Color(value.to_string())
    }
}
