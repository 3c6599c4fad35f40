//! Image-transform CDN URL construction.
//!
//! URLs have the shape
//! `<base>/<resize>[/<transform>...]/[output=format:webp/]compress/<handle>`.

use crate::domain::entities::FitMode;

/// Compression token, always present.
pub const COMPRESS_TOKEN: &str = "compress";

/// Format conversion token emitted before compression.
pub const WEBP_TOKEN: &str = "output=format:webp";

/// Blur applied to the placeholder thumbnail.
pub const THUMBNAIL_BLUR_TOKEN: &str = "blur=amount:2";

/// Edge length of the square placeholder thumbnail.
pub const THUMBNAIL_SIZE: u32 = 20;

/// Resize instruction for the CDN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeSpec {
    /// Target width in pixels.
    pub width: u32,
    /// Omitted from the token when unset.
    pub height: Option<u32>,
    pub fit: FitMode,
}

impl ResizeSpec {
    /// Resize to a width only, letting the CDN derive the height.
    #[must_use]
    pub const fn width(width: u32, fit: FitMode) -> Self {
        Self {
            width,
            height: None,
            fit,
        }
    }

    /// Resize to an explicit box.
    #[must_use]
    pub const fn exact(width: u32, height: u32, fit: FitMode) -> Self {
        Self {
            width,
            height: Some(height),
            fit,
        }
    }

    /// The square thumbnail used for the blurred placeholder.
    #[must_use]
    pub const fn thumbnail() -> Self {
        Self::exact(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FitMode::Crop)
    }

    /// Renders `resize=w:<W>[,h:<H>],fit:<mode>`.
    #[must_use]
    pub fn token(&self) -> String {
        match self.height {
            Some(height) => format!("resize=w:{},h:{height},fit:{}", self.width, self.fit),
            None => format!("resize=w:{},fit:{}", self.width, self.fit),
        }
    }
}

/// Ordered transform tokens, applied left to right by the CDN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformSpec {
    tokens: Vec<String>,
}

impl TransformSpec {
    /// Starts a spec with the mandatory resize token followed by `extra`.
    ///
    /// Blank tokens are dropped and surrounding slashes trimmed so they can
    /// never produce an empty path segment.
    #[must_use]
    pub fn new<S: AsRef<str>>(resize: &ResizeSpec, extra: &[S]) -> Self {
        let mut tokens = Vec::with_capacity(extra.len() + 3);
        tokens.push(resize.token());
        tokens.extend(
            extra
                .iter()
                .map(|t| t.as_ref().trim().trim_matches('/'))
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        );
        Self { tokens }
    }

    /// Appends the compression token, preceded by format conversion when
    /// `use_alt_format` is set. Consumes the spec since compression is last.
    #[must_use]
    pub fn compressed(mut self, use_alt_format: bool) -> Vec<String> {
        if use_alt_format {
            self.tokens.push(WEBP_TOKEN.to_string());
        }
        self.tokens.push(COMPRESS_TOKEN.to_string());
        self.tokens
    }

    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

/// Builds a fetchable CDN URL. Pure and deterministic.
#[must_use]
pub fn build_url<S: AsRef<str>>(
    base: &str,
    handle: &str,
    resize: &ResizeSpec,
    extra_transforms: &[S],
    use_alt_format: bool,
) -> String {
    let segments = TransformSpec::new(resize, extra_transforms).compressed(use_alt_format);
    join_segments(base, &segments, handle)
}

/// Builds the untransformed URL used by the no-script fallback.
#[must_use]
pub fn compressed_only_url(base: &str, handle: &str) -> String {
    join_segments(base, &[COMPRESS_TOKEN.to_string()], handle)
}

/// Builds the blurred placeholder URL. Never format-converted.
#[must_use]
pub fn thumbnail_url(base: &str, handle: &str) -> String {
    build_url(
        base,
        handle,
        &ResizeSpec::thumbnail(),
        &[THUMBNAIL_BLUR_TOKEN],
        false,
    )
}

fn join_segments(base: &str, segments: &[String], handle: &str) -> String {
    let base = base.trim_end_matches('/');
    let handle = handle.trim_start_matches('/');

    let mut url = String::with_capacity(
        base.len() + handle.len() + segments.iter().map(|s| s.len() + 1).sum::<usize>() + 1,
    );
    url.push_str(base);
    for segment in segments {
        url.push('/');
        url.push_str(segment);
    }
    url.push('/');
    url.push_str(handle);
    url
}
