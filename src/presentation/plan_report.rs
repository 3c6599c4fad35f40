//! Command-line render plan reports.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::application::{ImageLoadController, ImageServices, ImageSources};
use crate::domain::entities::{ElementId, ImageDescriptor, ImageOptions, RenderPlan};
use crate::domain::errors::DescriptorError;
use crate::domain::ports::IntersectionEntry;
use crate::infrastructure::config::{ContextKind, PlanArgs, Step};
use crate::infrastructure::platform::{HeadlessPlatform, StaticPlatform};

use super::noscript::noscript_img;

/// Element id used for the single simulated mount.
const REPORT_TARGET: ElementId = ElementId::new(1);

/// Everything printed by `blurup plan`.
#[derive(Debug, Serialize)]
pub struct PlanReport {
    /// CDN content handle.
    pub handle: String,
    /// Source width in pixels.
    pub width: u32,
    /// Source height in pixels.
    pub height: u32,
    /// URLs derived for the image, independent of the load phase.
    pub sources: ImageSources,
    /// What the controller would draw at the requested step.
    pub plan: RenderPlan,
    /// Fallback markup, only when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noscript: Option<String>,
}

fn services_for(context: ContextKind, webp: bool) -> ImageServices {
    match context {
        ContextKind::Server => ImageServices::from_platform(Arc::new(HeadlessPlatform)),
        ContextKind::Eager => ImageServices::from_platform(Arc::new(StaticPlatform::eager(webp))),
        ContextKind::Lazy => {
            ImageServices::from_platform(Arc::new(StaticPlatform::interactive(webp)))
        }
    }
}

/// Mounts one controller in the requested context, drives it to `step`,
/// and reports what it would render.
///
/// # Errors
/// Returns `DescriptorError` if the handle or dimensions are invalid.
pub fn build_plan_report(
    args: &PlanArgs,
    options: ImageOptions,
) -> Result<PlanReport, DescriptorError> {
    let descriptor = ImageDescriptor::new(args.handle.clone(), args.width, args.height)?;
    let services = services_for(args.context, args.webp);
    let noscript = args.noscript.then(|| noscript_img(&descriptor, &options));

    let controller =
        ImageLoadController::mount(REPORT_TARGET, descriptor.clone(), options, &services, None);

    if matches!(args.step, Step::Visible | Step::Loaded) {
        services
            .broker()
            .handle_entries(&[IntersectionEntry::entering(REPORT_TARGET)]);
    }
    if args.step == Step::Loaded {
        controller.on_image_loaded();
    }

    let plan = controller.render();
    info!(
        handle = descriptor.handle(),
        phase = %plan.phase,
        context = ?args.context,
        "Built render plan"
    );

    Ok(PlanReport {
        handle: descriptor.handle().to_string(),
        width: descriptor.width(),
        height: descriptor.height(),
        sources: controller.sources(),
        plan,
        noscript,
    })
}
