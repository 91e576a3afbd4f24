use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::time::Duration;

/// Number of matching files per letter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LetterMetrics {
    counts: BTreeMap<String, u64>,
}

impl LetterMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the count for `letter`, replacing any earlier one.
    pub fn insert(&mut self, letter: impl Into<String>, count: u64) {
        self.counts.insert(letter.into(), count);
    }

    pub fn get(&self, letter: &str) -> Option<u64> {
        self.counts.get(letter).copied()
    }

    pub fn contains(&self, letter: &str) -> bool {
        self.counts.contains_key(letter)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Letters in alphabetical order.
    pub fn letters(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    /// Highest count first; equal counts stay in alphabetical order.
    pub fn sorted_desc(&self) -> Vec<(&str, u64)> {
        let mut pairs: Vec<(&str, u64)> = self
            .counts
            .iter()
            .map(|(letter, count)| (letter.as_str(), *count))
            .collect();
        pairs.sort_by(|a, b| b.1.cmp(&a.1));
        pairs
    }

    /// Human-readable report: one line per letter by descending count, then the elapsed time.
    pub fn render_report(&self, elapsed: Duration) -> String {
        let mut out = String::new();
        for (letter, count) in self.sorted_desc() {
            let _ = writeln!(out, "letter: {} occurs in {} files", letter, count);
        }
        let _ = writeln!(out, "elapsed: {:?}", elapsed);
        out
    }
}
