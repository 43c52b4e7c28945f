use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{ChartError, ChartResult};

/// Size in CSS pixels, the space layout code reasons in.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaSize {
    pub width: f64,
    pub height: f64,
}

impl MediaSize {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Size in physical device pixels, the space draw calls target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BitmapSize {
    pub width: u32,
    pub height: u32,
}

impl BitmapSize {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PriceAxisSide {
    Left,
    Right,
}

/// Identifies one physical canvas owned by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SurfaceId {
    PaneMain(usize),
    PaneTop(usize),
    PriceAxis { pane: usize, side: PriceAxisSide },
    TimeAxis,
}

/// Where bitmap size suggestions come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResizeSource {
    /// Exact device-pixel box reported by the host.
    DevicePixelContentBox,
    /// Derived from media size and device pixel ratio.
    #[default]
    DevicePixelRatio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BitmapSizeListenerId(u64);

type BitmapSizeListener = Box<dyn FnMut(BitmapSize, BitmapSize)>;

/// Everything a draw routine needs to map media coordinates to bitmap ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderingTarget {
    pub surface: SurfaceId,
    pub media_size: MediaSize,
    pub bitmap_size: BitmapSize,
    pub horizontal_pixel_ratio: f64,
    pub vertical_pixel_ratio: f64,
}

/// Tracks media and bitmap sizes for one canvas and defers backing-store
/// resizes until a suggestion is committed.
pub struct CanvasBinding {
    surface: SurfaceId,
    media_size: MediaSize,
    origin: (f64, f64),
    device_pixel_ratio: f64,
    bitmap_size: BitmapSize,
    suggested_bitmap_size: Option<BitmapSize>,
    resize_source: ResizeSource,
    listeners: Vec<(BitmapSizeListenerId, BitmapSizeListener)>,
    next_listener_id: u64,
    disposed: bool,
}

impl fmt::Debug for CanvasBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanvasBinding")
            .field("surface", &self.surface)
            .field("media_size", &self.media_size)
            .field("bitmap_size", &self.bitmap_size)
            .field("suggested_bitmap_size", &self.suggested_bitmap_size)
            .field("resize_source", &self.resize_source)
            .field("listeners", &self.listeners.len())
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl CanvasBinding {
    #[must_use]
    pub fn new(surface: SurfaceId, device_pixel_ratio: f64) -> Self {
        Self {
            surface,
            media_size: MediaSize::default(),
            origin: (0.0, 0.0),
            device_pixel_ratio: sanitize_ratio(device_pixel_ratio),
            bitmap_size: BitmapSize::default(),
            suggested_bitmap_size: None,
            resize_source: ResizeSource::default(),
            listeners: Vec::new(),
            next_listener_id: 0,
            disposed: false,
        }
    }

    #[must_use]
    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    #[must_use]
    pub fn media_size(&self) -> MediaSize {
        self.media_size
    }

    #[must_use]
    pub fn bitmap_size(&self) -> BitmapSize {
        self.bitmap_size
    }

    #[must_use]
    pub fn suggested_bitmap_size(&self) -> Option<BitmapSize> {
        self.suggested_bitmap_size
    }

    #[must_use]
    pub fn resize_source(&self) -> ResizeSource {
        self.resize_source
    }

    #[must_use]
    pub fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Lays the canvas out at `origin` with `size`; suggests a new bitmap size
    /// when ratio-driven.
    pub fn set_media_size(&mut self, size: MediaSize, origin: (f64, f64)) -> ChartResult<()> {
        if !size.width.is_finite() || !size.height.is_finite() || size.width < 0.0 || size.height < 0.0
        {
            return Err(ChartError::InvalidData(format!(
                "canvas media size must be finite and >= 0, got {}x{}",
                size.width, size.height
            )));
        }
        if self.disposed {
            return Ok(());
        }
        self.media_size = size;
        self.origin = origin;
        if self.resize_source == ResizeSource::DevicePixelRatio {
            self.suggest(self.ratio_bitmap_size());
        }
        Ok(())
    }

    /// Exact device-pixel content box observed by the host.
    pub fn on_device_pixel_content_box(&mut self, size: BitmapSize) {
        if self.disposed {
            return;
        }
        self.resize_source = ResizeSource::DevicePixelContentBox;
        self.suggest(size);
    }

    pub fn on_device_pixel_ratio(&mut self, device_pixel_ratio: f64) {
        if self.disposed {
            return;
        }
        self.device_pixel_ratio = sanitize_ratio(device_pixel_ratio);
        if self.resize_source == ResizeSource::DevicePixelRatio {
            self.suggest(self.ratio_bitmap_size());
        }
    }

    /// Falls back to ratio-derived sizing, e.g. when the host lost its
    /// device-pixel observer.
    pub fn use_device_pixel_ratio(&mut self) {
        self.resize_source = ResizeSource::DevicePixelRatio;
        self.suggest(self.ratio_bitmap_size());
    }

    /// Commits the pending suggestion; returns whether the backing store
    /// changed (and was therefore cleared).
    pub fn apply_suggested_bitmap_size(&mut self) -> bool {
        let Some(suggested) = self.suggested_bitmap_size.take() else {
            return false;
        };
        let old = self.bitmap_size;
        if old == suggested {
            return false;
        }
        self.bitmap_size = suggested;
        debug!(
            surface = ?self.surface,
            width = suggested.width,
            height = suggested.height,
            "canvas bitmap resized"
        );
        for (_, listener) in &mut self.listeners {
            listener(old, suggested);
        }
        true
    }

    /// `None` while either size is empty.
    #[must_use]
    pub fn rendering_target(&self) -> Option<RenderingTarget> {
        if self.disposed || self.media_size.is_empty() || self.bitmap_size.is_empty() {
            return None;
        }
        Some(RenderingTarget {
            surface: self.surface,
            media_size: self.media_size,
            bitmap_size: self.bitmap_size,
            horizontal_pixel_ratio: f64::from(self.bitmap_size.width) / self.media_size.width,
            vertical_pixel_ratio: f64::from(self.bitmap_size.height) / self.media_size.height,
        })
    }

    pub fn subscribe_bitmap_size_changed(
        &mut self,
        listener: impl FnMut(BitmapSize, BitmapSize) + 'static,
    ) -> BitmapSizeListenerId {
        let id = BitmapSizeListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe_bitmap_size_changed(&mut self, id: BitmapSizeListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        before != self.listeners.len()
    }

    /// Drops listeners and pending suggestions; later resizes are ignored.
    pub fn dispose(&mut self) {
        self.listeners.clear();
        self.suggested_bitmap_size = None;
        self.disposed = true;
    }

    fn suggest(&mut self, size: BitmapSize) {
        let pending = self.suggested_bitmap_size.unwrap_or(self.bitmap_size);
        if pending == size {
            return;
        }
        trace!(surface = ?self.surface, width = size.width, height = size.height, "bitmap size suggested");
        self.suggested_bitmap_size = if size == self.bitmap_size {
            None
        } else {
            Some(size)
        };
    }

    fn ratio_bitmap_size(&self) -> BitmapSize {
        let ratio = self.device_pixel_ratio;
        let (left, top) = self.origin;
        BitmapSize {
            width: snap_extent(left, self.media_size.width, ratio),
            height: snap_extent(top, self.media_size.height, ratio),
        }
    }
}

fn sanitize_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() && ratio > 0.0 { ratio } else { 1.0 }
}

/// `round(start*r + extent*r) - round(start*r)`, so adjacent canvases tile
/// without gaps.
fn snap_extent(start: f64, extent: f64, ratio: f64) -> u32 {
    let begin = (start * ratio).round();
    let end = (start * ratio + extent * ratio).round();
    (end - begin).max(0.0) as u32
}

/// Whole-device-pixel stroke width for a media-space width.
#[must_use]
pub fn bitmap_line_width(media_width: f64, pixel_ratio: f64) -> f64 {
    (media_width * pixel_ratio).floor().max(1.0)
}

/// Bitmap-space center for a stroke of `line_width` device pixels so that it
/// covers whole pixels.
#[must_use]
pub fn crisp_position(media_coordinate: f64, pixel_ratio: f64, line_width: f64) -> f64 {
    let base = (media_coordinate * pixel_ratio).round();
    if (line_width as i64) % 2 == 1 {
        base + 0.5
    } else {
        base
    }
}
