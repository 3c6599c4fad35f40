//! Domain error types.

mod descriptor_error;

pub use descriptor_error::{DescriptorError, ParseFitModeError};
