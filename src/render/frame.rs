use crate::error::{ChartError, ChartResult};
use crate::render::{CanvasLayerKind, LayerPrimitives, RenderingTarget, SurfaceId};

/// Backend-agnostic scene for one canvas in one draw pass.
///
/// Lines, rects and polygons are in bitmap space; texts stay in media space.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub target: RenderingTarget,
    /// Whether the backing store must be cleared before drawing.
    pub clear: bool,
    pub layers: Vec<LayerPrimitives>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(target: RenderingTarget) -> Self {
        Self {
            target,
            clear: true,
            layers: Vec::new(),
        }
    }

    #[must_use]
    pub fn surface(&self) -> SurfaceId {
        self.target.surface
    }

    /// Layer of `kind`, created on first use.
    pub fn layer_mut(&mut self, kind: CanvasLayerKind) -> &mut LayerPrimitives {
        let position = match self.layers.iter().position(|layer| layer.kind == kind) {
            Some(position) => position,
            None => {
                self.layers.push(LayerPrimitives::new(kind));
                self.layers.len() - 1
            }
        };
        &mut self.layers[position]
    }

    #[must_use]
    pub fn layer(&self, kind: CanvasLayerKind) -> Option<&LayerPrimitives> {
        self.layers.iter().find(|layer| layer.kind == kind)
    }

    pub fn validate(&self) -> ChartResult<()> {
        if self.target.bitmap_size.is_empty() {
            return Err(ChartError::InvalidViewport {
                width: self.target.bitmap_size.width,
                height: self.target.bitmap_size.height,
            });
        }
        for layer in &self.layers {
            for line in &layer.lines {
                line.validate()?;
            }
            for rect in &layer.rects {
                rect.validate()?;
            }
            for polygon in &layer.polygons {
                polygon.validate()?;
            }
            for text in &layer.texts {
                text.validate()?;
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(LayerPrimitives::is_empty)
    }

    #[must_use]
    pub fn primitive_count(&self) -> usize {
        self.layers.iter().map(LayerPrimitives::primitive_count).sum()
    }
}
