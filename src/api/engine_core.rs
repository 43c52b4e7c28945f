use crate::model::ChartModel;

use super::{
    ChartOptions, chart_presentation::ChartPresentationState, chart_runtime::ChartRuntimeState,
};

/// Internal engine core state used by the public facade (`ChartEngine`).
pub(super) struct EngineCore {
    pub(super) options: ChartOptions,
    pub(super) model: ChartModel,
    pub(super) presentation: ChartPresentationState,
    pub(super) runtime: ChartRuntimeState,
}
