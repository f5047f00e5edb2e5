use super::normalizer::normalize;
use crate::api::Record;

/// A query reduced to its required words.
///
/// Words are matched as plain substrings of the normalized candidate text and all of
/// them must be present. Normalize once, match many.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryMatcher {
    words: Vec<String>,
}

impl QueryMatcher {
    pub fn new(query: &str) -> Self {
        let normalized = normalize(query);
        let mut words: Vec<String> = normalized
            .split(' ')
            .filter(|word| !word.is_empty())
            .map(str::to_string)
            .collect();
        words.sort();
        words.dedup();
        Self { words }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// True if every query word occurs in `text`. An empty text or query never matches.
    pub fn matches_text(&self, text: &str) -> bool {
        if self.words.is_empty() || text.is_empty() {
            return false;
        }
        let candidate = normalize(text);
        self.words.iter().all(|word| candidate.contains(word.as_str()))
    }

    /// A record matches if either script matches on its own
    pub fn matches_record(&self, record: &Record) -> bool {
        self.matches_text(&record.contents.primary_text)
            || self.matches_text(&record.contents.translated_text)
    }
}

/// One-shot form of [`QueryMatcher::matches_text`]
pub fn matches(text: &str, query: &str) -> bool {
    if text.is_empty() || query.is_empty() {
        return false;
    }
    QueryMatcher::new(query).matches_text(text)
}
