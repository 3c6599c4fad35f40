//! Blurup - lazy, blur-up responsive images for a transform CDN.
//!
//! This crate builds CDN transform URLs and srcsets for images, tracks which
//! images were already shown, shares one viewport watcher across all mounted
//! images, and drives each image from placeholder to full resolution.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing the image services and load controller.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing caches, URL construction and adapters.
pub mod infrastructure;
/// Presentation layer containing markup and command-line reports.
pub mod presentation;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "blurup";
