use std::collections::HashMap;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Average glyph advance relative to the font size.
pub const AVERAGE_CHAR_WIDTH_RATIO: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextWidthCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
}

/// Deterministic, backend-independent text advance in media pixels.
#[must_use]
pub fn estimate_text_width(text: &str, font_size_px: f64) -> f64 {
    text.chars().count() as f64 * font_size_px * AVERAGE_CHAR_WIDTH_RATIO
}

/// Text-measurement cache owned by the layout pass.
///
/// Entries are keyed by font size and text. The whole table is dropped once it
/// reaches `max_entries`, which keeps memory bounded for streaming labels.
#[derive(Debug, Clone)]
pub struct TextWidthCache {
    entries: HashMap<(OrderedFloat<f64>, String), f64>,
    max_entries: usize,
    hits: u64,
    misses: u64,
}

impl Default for TextWidthCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ENTRIES)
    }
}

impl TextWidthCache {
    pub const DEFAULT_MAX_ENTRIES: usize = 4096;

    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            max_entries: max_entries.max(1),
            hits: 0,
            misses: 0,
        }
    }

    pub fn measure(&mut self, text: &str, font_size_px: f64) -> f64 {
        let key = (OrderedFloat(font_size_px), text.to_owned());
        if let Some(width) = self.entries.get(&key) {
            self.hits = self.hits.saturating_add(1);
            return *width;
        }
        self.misses = self.misses.saturating_add(1);
        if self.entries.len() >= self.max_entries {
            self.entries.clear();
        }
        let width = estimate_text_width(text, font_size_px);
        self.entries.insert(key, width);
        width
    }

    /// Widest of `texts` at `font_size_px`, zero for an empty iterator.
    pub fn max_width<'a>(
        &mut self,
        texts: impl IntoIterator<Item = &'a str>,
        font_size_px: f64,
    ) -> f64 {
        texts
            .into_iter()
            .map(|text| self.measure(text, font_size_px))
            .fold(0.0, f64::max)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn stats(&self) -> TextWidthCacheStats {
        TextWidthCacheStats {
            hits: self.hits,
            misses: self.misses,
            size: self.entries.len(),
        }
    }
}
