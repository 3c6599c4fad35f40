//! Markup for clients that run no scripts.

use std::fmt::Write;

use crate::domain::entities::{ImageDescriptor, ImageOptions};
use crate::infrastructure::image::{compressed_only_url, sizes_attribute};

const COVER_STYLE: &str = "position:absolute;top:0;left:0;transition:opacity 0.5s;\
transition-delay:0s;opacity:1;width:100%;height:100%;object-fit:cover;object-position:center";

/// Renders a plain `<img>` tag pointing at the compressed original.
#[must_use]
pub fn noscript_img(descriptor: &ImageDescriptor, options: &ImageOptions) -> String {
    let src = compressed_only_url(&options.base_uri, descriptor.handle());

    let mut html = String::with_capacity(256);
    let _ = write!(
        html,
        r#"<img width="{}" height="{}" src="{}" alt="{}" title="{}""#,
        descriptor.width(),
        descriptor.height(),
        escape_attr(&src),
        escape_attr(&options.alt),
        escape_attr(&options.title),
    );
    if let Some(max_width) = options.responsive_width() {
        let _ = write!(html, r#" sizes="{}""#, sizes_attribute(max_width));
    }
    let _ = write!(html, r#" style="{COVER_STYLE}"/>"#);
    html
}

fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
