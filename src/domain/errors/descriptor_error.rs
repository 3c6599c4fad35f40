//! Image descriptor and option error types.

use thiserror::Error;

/// Reasons an image descriptor cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum DescriptorError {
    #[error("image handle must not be empty")]
    EmptyHandle,

    #[error("image width must be a positive number of pixels")]
    ZeroWidth,

    #[error("image height must be a positive number of pixels")]
    ZeroHeight,
}

/// An unrecognized fit mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown fit mode `{value}`, expected one of clip, crop, scale, max")]
pub struct ParseFitModeError {
    /// The rejected input.
    pub value: String,
}
