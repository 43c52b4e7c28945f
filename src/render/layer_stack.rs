use serde::{Deserialize, Serialize};

use super::{LinePrimitive, PolygonPrimitive, RectPrimitive, TextPrimitive};

/// Physical canvas a layer is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanvasTarget {
    Main,
    Top,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanvasLayerKind {
    Background,
    Grid,
    Series,
    Overlay,
    Crosshair,
}

impl CanvasLayerKind {
    /// Main-canvas layers in paint order.
    pub const MAIN: [Self; 4] = [Self::Background, Self::Grid, Self::Series, Self::Overlay];
    pub const TOP: [Self; 1] = [Self::Crosshair];

    #[must_use]
    pub fn target(self) -> CanvasTarget {
        match self {
            Self::Crosshair => CanvasTarget::Top,
            _ => CanvasTarget::Main,
        }
    }

    #[must_use]
    pub fn for_target(target: CanvasTarget) -> &'static [Self] {
        match target {
            CanvasTarget::Main => &Self::MAIN,
            CanvasTarget::Top => &Self::TOP,
        }
    }
}

/// Draw commands collected for one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerPrimitives {
    pub kind: CanvasLayerKind,
    pub lines: Vec<LinePrimitive>,
    pub rects: Vec<RectPrimitive>,
    pub polygons: Vec<PolygonPrimitive>,
    pub texts: Vec<TextPrimitive>,
}

impl LayerPrimitives {
    #[must_use]
    pub fn new(kind: CanvasLayerKind) -> Self {
        Self {
            kind,
            lines: Vec::new(),
            rects: Vec::new(),
            polygons: Vec::new(),
            texts: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
            && self.rects.is_empty()
            && self.polygons.is_empty()
            && self.texts.is_empty()
    }

    #[must_use]
    pub fn primitive_count(&self) -> usize {
        self.lines.len() + self.rects.len() + self.polygons.len() + self.texts.len()
    }

    pub fn push_line(&mut self, line: LinePrimitive) {
        self.lines.push(line);
    }

    pub fn push_rect(&mut self, rect: RectPrimitive) {
        self.rects.push(rect);
    }

    pub fn push_polygon(&mut self, polygon: PolygonPrimitive) {
        self.polygons.push(polygon);
    }

    pub fn push_text(&mut self, text: TextPrimitive) {
        self.texts.push(text);
    }

    pub fn extend(&mut self, other: LayerPrimitives) {
        self.lines.extend(other.lines);
        self.rects.extend(other.rects);
        self.polygons.extend(other.polygons);
        self.texts.extend(other.texts);
    }
}

#[cfg(test)]
mod tests {
    use super::{CanvasLayerKind, CanvasTarget};

    #[test]
    fn only_crosshair_lives_on_top_canvas() {
        for kind in CanvasLayerKind::MAIN {
            assert_eq!(kind.target(), CanvasTarget::Main);
        }
        assert_eq!(CanvasLayerKind::Crosshair.target(), CanvasTarget::Top);
        assert_eq!(
            CanvasLayerKind::for_target(CanvasTarget::Top),
            &[CanvasLayerKind::Crosshair]
        );
    }
}
