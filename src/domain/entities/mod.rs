//! Domain entity definitions.

mod image;
mod options;
mod render;

pub use image::{ElementId, FitMode, ImageDescriptor, ImageId, LoadPhase, LoadState};
pub use options::{BackgroundColor, DEFAULT_BACKGROUND_COLOR, DEFAULT_BASE_URI, ImageOptions};
pub use render::{
    BackgroundLayer, ImageLayer, PLACEHOLDER_TRANSITION_DELAY, PlaceholderLayer, RenderLayers,
    RenderPlan,
};
