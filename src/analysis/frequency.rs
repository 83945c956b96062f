//! Stopword-filtered word frequency counting.
//!
//! Normalization follows the source reports' locale: lowercase, strip
//! punctuation, drop standalone numbers, then discard Spanish stopwords and
//! tokens that are not purely alphabetic.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::stopwords::is_stopword;

/// Word → count mapping ordered by descending count, ties in first-seen
/// order. Ordering is a display convenience; the accumulator treats this as
/// an unordered multiset.
pub type WordFrequencies = Vec<(String, u64)>;

/// Punctuation and other non-word characters (letters, digits, whitespace
/// and underscores survive).
static NON_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());

/// Standalone numeric tokens, bounded by word edges.
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d+\b").unwrap());

/// Accumulating word counter.
///
/// Supports both the per-document mode (one `add_text` per readout) and the
/// batch mode where several documents feed one counter before persisting.
#[derive(Debug, Default)]
pub struct FrequencyCounter {
    counts: HashMap<String, u64>,
    /// First-seen order, for stable tie-breaking in the readout.
    order: Vec<String>,
}

impl FrequencyCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize one text and add its word counts.
    pub fn add_text(&mut self, text: &str) {
        let lowered = text.to_lowercase();
        let stripped = NON_WORD_RE.replace_all(&lowered, "");
        let no_numbers = NUMBER_RE.replace_all(&stripped, "");

        for token in no_numbers.split_whitespace() {
            if is_stopword(token) || !token.chars().all(char::is_alphabetic) {
                continue;
            }
            match self.counts.get_mut(token) {
                Some(count) => *count += 1,
                None => {
                    self.counts.insert(token.to_string(), 1);
                    self.order.push(token.to_string());
                }
            }
        }
    }

    /// Read out the mapping, most common first.
    pub fn into_frequencies(self) -> WordFrequencies {
        let counts = self.counts;
        let mut frequencies: WordFrequencies = self
            .order
            .into_iter()
            .map(|word| {
                let count = counts[&word];
                (word, count)
            })
            .collect();
        // Stable sort keeps first-seen order among equal counts.
        frequencies.sort_by(|a, b| b.1.cmp(&a.1));
        frequencies
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Count word frequencies for a single text.
pub fn word_frequencies(text: &str) -> WordFrequencies {
    let mut counter = FrequencyCounter::new();
    counter.add_text(text);
    counter.into_frequencies()
}
