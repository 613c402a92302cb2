use serde::Serialize;
use std::collections::VecDeque;

pub const RECENT_SEARCH_LIMIT: usize = 10;

/// Most-recent-first list of searched city names.
///
/// Entries are deduplicated by exact string match (not case-folded) and the
/// list never holds more than [`RECENT_SEARCH_LIMIT`] names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecentSearches {
    entries: VecDeque<String>,
}

impl RecentSearches {
    /// Insert at the front, moving an existing entry instead of duplicating it.
    pub fn promote(&mut self, city: &str) {
        self.remove(city);
        self.entries.push_front(city.to_string());
        self.entries.truncate(RECENT_SEARCH_LIMIT);
    }

    pub fn remove(&mut self, city: &str) {
        self.entries.retain(|entry| entry != city);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }
}
