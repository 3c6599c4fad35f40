//! Image handling infrastructure.
//!
//! This module provides:
//! - Transform CDN URL construction
//! - Responsive width planning for srcset
//! - Memoized next-gen format detection
//! - The seen-before cache used to skip replayed fades

pub mod cdn;
pub mod feature_cache;
pub mod seen_cache;
pub mod srcset;

pub use cdn::{
    COMPRESS_TOKEN, ResizeSpec, THUMBNAIL_BLUR_TOKEN, TransformSpec, WEBP_TOKEN, build_url,
    compressed_only_url, thumbnail_url,
};
pub use feature_cache::{FeatureCache, FormatSupport};
pub use seen_cache::SeenCache;
pub use srcset::{sizes_attribute, src_set, widths};
