//! Word frequency analysis with Spanish locale normalization.

mod frequency;
mod stopwords;

pub use frequency::{word_frequencies, FrequencyCounter, WordFrequencies};
pub use stopwords::is_stopword;
