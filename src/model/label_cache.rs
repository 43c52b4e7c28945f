use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::TickMarkWeight;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeLabelCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct TimeLabelCacheKey {
    pub(crate) weight: TickMarkWeight,
    pub(crate) time_key: i64,
}

/// Formatted time-axis labels; cleared whenever the formatter generation moves.
#[derive(Debug, Clone, Default)]
pub(crate) struct TimeLabelCache {
    entries: HashMap<TimeLabelCacheKey, String>,
    generation: u64,
    hits: u64,
    misses: u64,
}

impl TimeLabelCache {
    const MAX_ENTRIES: usize = 8192;

    pub(crate) fn get_or_insert_with(
        &mut self,
        key: TimeLabelCacheKey,
        format: impl FnOnce() -> String,
    ) -> String {
        if let Some(value) = self.entries.get(&key) {
            self.hits = self.hits.saturating_add(1);
            return value.clone();
        }
        self.misses = self.misses.saturating_add(1);
        if self.entries.len() >= Self::MAX_ENTRIES {
            self.entries.clear();
        }
        let value = format();
        self.entries.insert(key, value.clone());
        value
    }

    /// Drops every entry and starts a new formatter generation.
    pub(crate) fn invalidate(&mut self) {
        self.entries.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn stats(&self) -> TimeLabelCacheStats {
        TimeLabelCacheStats {
            hits: self.hits,
            misses: self.misses,
            size: self.entries.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{TimeLabelCache, TimeLabelCacheKey};
    use crate::core::TickMarkWeight;

    #[test]
    fn second_lookup_hits_and_invalidate_clears() {
        let mut cache = TimeLabelCache::default();
        let key = TimeLabelCacheKey {
            weight: TickMarkWeight::DAY,
            time_key: 42,
        };
        assert_eq!(cache.get_or_insert_with(key, || "12".to_owned()), "12");
        assert_eq!(cache.get_or_insert_with(key, || "other".to_owned()), "12");
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.size), (1, 1, 1));

        let generation = cache.generation();
        cache.invalidate();
        assert_eq!(cache.stats().size, 0);
        assert_ne!(cache.generation(), generation);
    }
}
