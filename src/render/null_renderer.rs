use crate::error::ChartResult;
use crate::render::{RenderFrame, Renderer, SurfaceId};

/// Headless renderer used by tests and engine users without a backend.
///
/// It still validates frame content and records which surfaces were drawn so
/// tests can assert what a pass touched.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub last_line_count: usize,
    pub last_text_count: usize,
    pub frames_rendered: usize,
    pub rendered_surfaces: Vec<SurfaceId>,
}

impl NullRenderer {
    /// Forgets recorded surfaces, keeping counters.
    pub fn clear_history(&mut self) {
        self.rendered_surfaces.clear();
    }

    #[must_use]
    pub fn rendered(&self, surface: SurfaceId) -> bool {
        self.rendered_surfaces.contains(&surface)
    }
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;
        self.last_line_count = frame.layers.iter().map(|layer| layer.lines.len()).sum();
        self.last_text_count = frame.layers.iter().map(|layer| layer.texts.len()).sum();
        self.frames_rendered += 1;
        self.rendered_surfaces.push(frame.surface());
        Ok(())
    }
}
