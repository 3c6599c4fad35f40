//! Domain types describing a source image and its loading state.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::{DescriptorError, ParseFitModeError};

/// Stable identifier for a source asset, derived from its CDN handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageId(pub String);

impl ImageId {
    /// Creates a new `ImageId` from any string-like input.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ImageId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ImageId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Identity of a mounted target element as seen by the viewport watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

impl ElementId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A source asset on the CDN: its handle plus native pixel dimensions.
///
/// Immutable once built. Construction rejects an empty handle or a zero
/// dimension, since neither the srcset ladder nor the aspect-ratio spacer
/// can be derived without them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDescriptor")]
pub struct ImageDescriptor {
    handle: String,
    width: u32,
    height: u32,
}

#[derive(Deserialize)]
struct RawDescriptor {
    handle: String,
    width: u32,
    height: u32,
}

impl TryFrom<RawDescriptor> for ImageDescriptor {
    type Error = DescriptorError;

    fn try_from(raw: RawDescriptor) -> Result<Self, Self::Error> {
        Self::new(raw.handle, raw.width, raw.height)
    }
}

impl ImageDescriptor {
    /// Creates a descriptor.
    ///
    /// # Errors
    /// Returns `DescriptorError` if the handle is blank or either dimension is zero.
    pub fn new(handle: impl Into<String>, width: u32, height: u32) -> Result<Self, DescriptorError> {
        let handle = handle.into();
        if handle.trim().is_empty() {
            return Err(DescriptorError::EmptyHandle);
        }
        if width == 0 {
            return Err(DescriptorError::ZeroWidth);
        }
        if height == 0 {
            return Err(DescriptorError::ZeroHeight);
        }
        Ok(Self {
            handle,
            width,
            height,
        })
    }

    #[must_use]
    pub fn handle(&self) -> &str {
        &self.handle
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Key under which this asset is recorded in the seen cache.
    #[must_use]
    pub fn id(&self) -> ImageId {
        ImageId::new(self.handle.clone())
    }

    /// Bottom padding, in percent of the width, that reserves the image's
    /// aspect ratio before any bitmap arrives.
    #[must_use]
    pub fn aspect_padding_percent(&self) -> f64 {
        100.0 / (f64::from(self.width) / f64::from(self.height))
    }
}

/// How the CDN fits the source into the requested box.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Resize to fit inside the box, keeping aspect ratio.
    Clip,
    /// Fill the box, cropping overflow.
    #[default]
    Crop,
    /// Stretch to the box exactly.
    Scale,
    /// Like clip, but never upscale.
    Max,
}

impl FitMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clip => "clip",
            Self::Crop => "crop",
            Self::Scale => "scale",
            Self::Max => "max",
        }
    }
}

impl std::fmt::Display for FitMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FitMode {
    type Err = ParseFitModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clip" => Ok(Self::Clip),
            "crop" => Ok(Self::Crop),
            "scale" => Ok(Self::Scale),
            "max" => Ok(Self::Max),
            other => Err(ParseFitModeError {
                value: other.to_string(),
            }),
        }
    }
}

/// Per-controller loading flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoadState {
    /// The full image element is mounted and fetching (or fetched).
    pub is_visible: bool,
    /// The full image has finished loading.
    pub is_image_loaded: bool,
    /// The controller relies on viewport intersection to start loading.
    pub intersection_supported: bool,
}

impl LoadState {
    /// Picks the starting flags for a freshly mounted controller.
    ///
    /// Without a viewport nothing is fetched. A previously seen image, or a
    /// runtime without intersection detection, renders in its final state
    /// right away. Everything else waits for the viewport.
    #[must_use]
    pub const fn initial(seen_before: bool, has_viewport: bool, intersection_available: bool) -> Self {
        if !has_viewport {
            return Self {
                is_visible: false,
                is_image_loaded: false,
                intersection_supported: false,
            };
        }
        if seen_before || !intersection_available {
            return Self {
                is_visible: true,
                is_image_loaded: true,
                intersection_supported: false,
            };
        }
        Self {
            is_visible: false,
            is_image_loaded: false,
            intersection_supported: true,
        }
    }

    /// Derives the coarse phase from the flags.
    #[must_use]
    pub const fn phase(&self) -> LoadPhase {
        match (self.is_visible, self.is_image_loaded) {
            (_, true) => LoadPhase::Loaded,
            (true, false) => LoadPhase::Loading,
            (false, false) if self.intersection_supported => LoadPhase::PendingVisibility,
            (false, false) => LoadPhase::InitialHidden,
        }
    }
}

/// Coarse phase of an image load, derived from [`LoadState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPhase {
    /// Nothing probed and nothing requested (no viewport).
    InitialHidden,
    /// Waiting for the element to approach the viewport.
    PendingVisibility,
    /// Full image mounted, download in flight.
    Loading,
    /// Full image ready. Terminal for this mount.
    Loaded,
}

impl LoadPhase {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Loaded)
    }
}

impl std::fmt::Display for LoadPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InitialHidden => write!(f, "initial-hidden"),
            Self::PendingVisibility => write!(f, "pending-visibility"),
            Self::Loading => write!(f, "loading"),
            Self::Loaded => write!(f, "loaded"),
        }
    }
}
