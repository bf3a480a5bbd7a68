use serde::{Deserialize, Serialize};

/// Number of jig numbers kept in the search history
pub const HISTORY_LIMIT: usize = 10;

/// Recently searched jig numbers, most recent first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHistory {
    #[serde(default)]
    pub entries: Vec<String>,
}

impl SearchHistory {
    /// Move `term` to the front, dropping case-insensitive duplicates and
    /// anything beyond [`HISTORY_LIMIT`].
    pub fn record(&mut self, term: &str) {
        let term = term.trim();
        if term.is_empty() {
            return;
        }
        self.entries.retain(|e| !e.eq_ignore_ascii_case(term));
        self.entries.insert(0, term.to_string());
        self.entries.truncate(HISTORY_LIMIT);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
