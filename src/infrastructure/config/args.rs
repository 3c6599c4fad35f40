use super::app_config::LogLevel;
use crate::domain::entities::FitMode;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "blurup",
    version,
    about = "Plan lazy, blur-up responsive images for a transform CDN",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH", global = true)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the render plan for one image.
    Plan(PlanArgs),
    /// Write a default configuration file.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Execution context the plan is computed for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ContextKind {
    /// No viewport: markup only, nothing fetched.
    Server,
    /// Viewport without intersection detection: load immediately.
    Eager,
    /// Viewport with intersection detection: wait for visibility.
    #[default]
    Lazy,
}

/// How far to drive the loading state machine before printing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Step {
    /// Right after mounting.
    #[default]
    Mounted,
    /// After the element entered the viewport.
    Visible,
    /// After the full image reported load completion.
    Loaded,
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// CDN handle of the image.
    #[arg(long)]
    pub handle: String,

    /// Source width in pixels.
    #[arg(long)]
    pub width: u32,

    /// Source height in pixels.
    #[arg(long)]
    pub height: u32,

    /// Execution context to simulate.
    #[arg(long, value_enum, default_value_t)]
    pub context: ContextKind,

    /// Whether the simulated runtime supports WebP.
    #[arg(long)]
    pub webp: bool,

    /// State machine step to report.
    #[arg(long, value_enum, default_value_t)]
    pub step: Step,

    /// Also print the no-script fallback markup.
    #[arg(long)]
    pub noscript: bool,

    #[command(flatten)]
    pub image: ImageArgs,
}

/// Per-invocation overrides of the configured image options.
#[derive(Debug, Default, Args)]
pub struct ImageArgs {
    /// CDN base address.
    #[arg(long, value_name = "URL")]
    pub base_uri: Option<String>,

    /// Fit mode for resizing.
    #[arg(long, value_enum)]
    pub fit: Option<FitMode>,

    /// Maximum display width; 0 disables srcset.
    #[arg(long)]
    pub max_width: Option<u32>,

    /// Prefer WebP when the runtime supports it.
    #[arg(long)]
    pub with_webp: Option<bool>,

    /// Extra CDN transform, repeatable.
    #[arg(long = "transform", value_name = "TOKEN")]
    pub transforms: Vec<String>,

    /// Show the blurred placeholder.
    #[arg(long)]
    pub blurry_placeholder: Option<bool>,

    /// Background color, or `true`/`false`.
    #[arg(long)]
    pub background_color: Option<String>,

    /// Fade the image in on load.
    #[arg(long)]
    pub fade_in: Option<bool>,

    /// Title attribute.
    #[arg(long)]
    pub title: Option<String>,

    /// Alt text.
    #[arg(long)]
    pub alt: Option<String>,
}
