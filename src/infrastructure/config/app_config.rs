//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::entities::{BackgroundColor, ImageOptions};

pub(crate) const APP_NAME: &str = "blurup";
pub(crate) const APP_QUALIFIER: &str = "com";
pub(crate) const APP_ORGANIZATION: &str = "linuxmobile";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration, loaded from `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Log file path.
    #[serde(skip)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Default options applied to every image.
    #[serde(default)]
    pub image: ImageOptions,
}

use super::args::{CliArgs, ImageArgs};

impl AppConfig {
    /// Merges global CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
    }

    /// Applies per-invocation image overrides on top of the file defaults.
    #[must_use]
    pub fn image_options(&self, args: &ImageArgs) -> ImageOptions {
        let mut options = self.image.clone();
        if let Some(base_uri) = &args.base_uri {
            options.base_uri.clone_from(base_uri);
        }
        if let Some(fit) = args.fit {
            options.fit = fit;
        }
        if let Some(max_width) = args.max_width {
            options.max_width = max_width;
        }
        if let Some(with_webp) = args.with_webp {
            options.with_webp = with_webp;
        }
        if !args.transforms.is_empty() {
            options.transforms.clone_from(&args.transforms);
        }
        if let Some(blurry_placeholder) = args.blurry_placeholder {
            options.blurry_placeholder = blurry_placeholder;
        }
        if let Some(background_color) = &args.background_color {
            options.background_color = match background_color.as_str() {
                "true" => BackgroundColor::Enabled(true),
                "false" => BackgroundColor::Enabled(false),
                color => BackgroundColor::Color(color.to_string()),
            };
        }
        if let Some(fade_in) = args.fade_in {
            options.fade_in = fade_in;
        }
        if let Some(title) = &args.title {
            options.title.clone_from(title);
        }
        if let Some(alt) = &args.alt {
            options.alt.clone_from(alt);
        }
        options
    }

    /// Returns effective log path. Logging goes to stderr when unset.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_path: None,
            log_level: LogLevel::Info,
            image: ImageOptions::default(),
        }
    }
}
