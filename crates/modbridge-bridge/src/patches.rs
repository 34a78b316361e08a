//! Interception patches on the settings menu's internals
//!
//! Two after-hooks, both best-effort:
//!
//! - **page capture** on the menu page constructor records the page id and
//!   the page-open callback the menu was built with
//! - **tooltips** on the menu draw method draws the pending bridge tooltip
//!   on top of the menu, then clears it so it shows for exactly one frame

use crate::bridge::FrameState;
use crate::options::MenuTargets;
use crate::presentation::Presenter;
use modbridge_intercept::{
    CallFrame, HookImpl, HookKind, InterceptionEngine, MemberHandle, ParamType,
};
use serde::Serialize;
use std::any::Any;
use std::sync::Arc;
use tracing::{info, trace, warn};

/// Opens a menu page by id; captured from the menu page constructor
pub type PageOpener = Arc<dyn Fn(&str) + Send + Sync>;

const PAGE_PARAM: (&str, &str) = ("page", "System.String");
const OPEN_PAGE_PARAM: (&str, &str) = ("openPage", "System.Action`1[System.String]");
const SURFACE_PARAM: &str = "b";

/// Which patches are active
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PatchReport {
    pub page_capture: bool,
    pub tooltips: bool,
}

impl PatchReport {
    /// Whether every patch installed
    pub fn all(&self) -> bool {
        self.page_capture && self.tooltips
    }
}

fn params(types: &[String]) -> Vec<ParamType> {
    types.iter().map(|ty| ParamType::new(ty.as_str())).collect()
}

fn outcome(feature: &str, result: modbridge_intercept::Result<MemberHandle>) -> bool {
    match result {
        Ok(_) => {
            info!(category = "intercept", feature, "menu patch applied");
            true
        }
        Err(err) => {
            warn!(category = "intercept", feature, "menu patch unavailable: {}", err);
            false
        }
    }
}

/// Install both patches, reporting which succeeded
pub(crate) fn apply(
    engine: &InterceptionEngine,
    targets: &MenuTargets,
    owner_id: &str,
    frame: &Arc<FrameState>,
    presenter: Option<Arc<dyn Presenter>>,
) -> PatchReport {
    let page_capture = outcome(
        "page capture",
        engine.install_constructor_hook(
            &targets.menu_type,
            &params(&targets.page_ctor_params),
            HookKind::After,
            page_capture_hook(owner_id, Arc::clone(frame)),
        ),
    );

    let tooltips = outcome(
        "tooltips",
        engine.install_method_hook(
            &targets.menu_type,
            &targets.draw_method,
            &params(&targets.draw_params),
            HookKind::After,
            tooltip_hook(owner_id, targets, Arc::clone(frame), presenter),
        ),
    );

    PatchReport {
        page_capture,
        tooltips,
    }
}

fn page_capture_hook(owner_id: &str, frame: Arc<FrameState>) -> HookImpl {
    HookImpl::after(
        format!("{}.page_capture", owner_id),
        move |call: &CallFrame<'_>, _: &(dyn Any + Send + Sync)| {
            let page = call.arg::<String>(PAGE_PARAM.0).cloned();
            let opener = call.arg::<PageOpener>(OPEN_PAGE_PARAM.0).cloned();
            frame.capture_page(page, opener);
        },
    )
    .binding(PAGE_PARAM.0, PAGE_PARAM.1)
    .binding(OPEN_PAGE_PARAM.0, OPEN_PAGE_PARAM.1)
}

fn tooltip_hook(
    owner_id: &str,
    targets: &MenuTargets,
    frame: Arc<FrameState>,
    presenter: Option<Arc<dyn Presenter>>,
) -> HookImpl {
    let hook = HookImpl::after(
        format!("{}.tooltips", owner_id),
        move |call: &CallFrame<'_>, _: &(dyn Any + Send + Sync)| {
            // Always drained, drawn or not.
            let Some(tooltip) = frame.take_tooltip() else {
                return;
            };
            match (&presenter, call.arg_any(SURFACE_PARAM)) {
                (Some(presenter), Some(surface)) => presenter.draw_tooltip(surface, &tooltip),
                _ => trace!(category = "intercept", "tooltip dropped: nothing to draw with"),
            }
        },
    );
    match targets.draw_params.first() {
        Some(surface_type) => hook.binding(SURFACE_PARAM, surface_type.as_str()),
        None => hook,
    }
}
