//! Responsive width planning and `srcset` / `sizes` generation.

use crate::domain::entities::FitMode;

use super::cdn::{ResizeSpec, build_url};

/// Multipliers of the max display width offered as srcset candidates.
const WIDTH_LADDER: [f64; 6] = [0.25, 0.5, 1.0, 1.5, 2.0, 3.0];

/// Plans the candidate widths for a srcset.
///
/// Candidates are fractions and multiples of `max_display_width`, kept only
/// when strictly smaller than the source, then the source width itself is
/// appended so at least one width is always returned. Widths are floored to
/// whole pixels; candidates that floor to zero are dropped.
#[must_use]
pub fn widths(source_width: u32, max_display_width: u32) -> Vec<u32> {
    let max = f64::from(max_display_width);
    let source = f64::from(source_width);

    let mut planned: Vec<u32> = WIDTH_LADDER
        .iter()
        .map(|factor| max * factor)
        .filter(|candidate| *candidate < source)
        .map(floor_px)
        .filter(|width| *width > 0)
        .collect();
    planned.push(source_width);
    planned.dedup();
    planned
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn floor_px(width: f64) -> u32 {
    width.floor() as u32
}

/// Single breakpoint hint: full viewport width up to `max_display_width`,
/// fixed at `max_display_width` above it.
#[must_use]
pub fn sizes_attribute(max_display_width: u32) -> String {
    format!("(max-width: {max_display_width}px) 100vw, {max_display_width}px")
}

/// Joins `"<url> <width>w"` entries with `",\n"`.
#[must_use]
pub fn src_set<S: AsRef<str>>(
    base: &str,
    handle: &str,
    widths: &[u32],
    fit: FitMode,
    extra_transforms: &[S],
    use_alt_format: bool,
) -> String {
    widths
        .iter()
        .map(|width| {
            let url = build_url(
                base,
                handle,
                &ResizeSpec::width(*width, fit),
                extra_transforms,
                use_alt_format,
            );
            format!("{url} {width}w")
        })
        .collect::<Vec<_>>()
        .join(",\n")
}
