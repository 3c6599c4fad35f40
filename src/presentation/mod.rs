//! Presentation layer producing markup and printable plans.

/// Fallback markup for script-less clients.
pub mod noscript;
/// Render plans for the command line.
pub mod plan_report;

pub use noscript::noscript_img;
pub use plan_report::{PlanReport, build_plan_report};
