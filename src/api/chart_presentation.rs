use indexmap::IndexMap;

use crate::render::{CanvasBinding, SurfaceId, TextWidthCache};

use super::ChartLayout;

/// Canvas-facing state: the current layout and one binding per surface.
pub(super) struct ChartPresentationState {
    pub(super) layout: ChartLayout,
    pub(super) bindings: IndexMap<SurfaceId, CanvasBinding>,
    pub(super) text_cache: TextWidthCache,
    pub(super) device_pixel_ratio: f64,
}

impl ChartPresentationState {
    #[must_use]
    pub(super) fn new(device_pixel_ratio: f64) -> Self {
        Self {
            layout: ChartLayout::default(),
            bindings: IndexMap::new(),
            text_cache: TextWidthCache::default(),
            device_pixel_ratio,
        }
    }
}
