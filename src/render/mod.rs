mod canvas_binding;
mod frame;
mod layer_stack;
mod null_renderer;
mod primitives;
pub mod series_painters;
mod text_cache;

pub use canvas_binding::{
    BitmapSize, BitmapSizeListenerId, CanvasBinding, MediaSize, PriceAxisSide, RenderingTarget,
    ResizeSource, SurfaceId, bitmap_line_width, crisp_position,
};
pub use frame::RenderFrame;
pub use layer_stack::{CanvasLayerKind, CanvasTarget, LayerPrimitives};
pub use null_renderer::NullRenderer;
pub use primitives::{
    Color, LinePrimitive, PolygonPrimitive, RectPrimitive, TextHAlign, TextPrimitive,
};
pub use series_painters::SeriesPaintContext;
pub use text_cache::{
    AVERAGE_CHAR_WIDTH_RATIO, TextWidthCache, TextWidthCacheStats, estimate_text_width,
};

use crate::error::ChartResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive one fully materialized `RenderFrame` per canvas so drawing
/// code stays isolated from chart domain and interaction logic.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()>;
}
