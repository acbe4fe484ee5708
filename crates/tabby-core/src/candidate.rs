//! Title and author hypotheses produced from recognized text.

use serde::{Deserialize, Serialize};

/// One hypothesis for a cover's identity.
///
/// Both fields are expected to be uppercase; nothing enforces it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct CandidateOption {
    /// Hypothesized title.
    pub title: String,
    /// Hypothesized author.
    pub author: String,
}

impl CandidateOption {
    /// Creates a new option.
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
        }
    }
}

/// A complete, ranked set of hypotheses, most confident first.
///
/// A set is never partial: it holds exactly the number of options it was
/// validated against, and never zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct CandidateSet {
    options: Vec<CandidateOption>,
}

impl CandidateSet {
    /// Builds a set when `options` holds exactly `expected` entries.
    pub fn try_new(options: Vec<CandidateOption>, expected: usize) -> Option<Self> {
        (expected > 0 && options.len() == expected).then_some(Self { options })
    }

    /// The highest ranked option.
    pub fn top(&self) -> &CandidateOption {
        &self.options[0]
    }

    /// All options in rank order.
    pub fn options(&self) -> &[CandidateOption] {
        &self.options
    }

    /// Number of options.
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Returns true when the set holds no options.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Consumes the set and returns its options.
    pub fn into_options(self) -> Vec<CandidateOption> {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(count: usize) -> Vec<CandidateOption> {
        (0..count)
            .map(|i| CandidateOption::new(format!("TITLE {i}"), format!("AUTHOR {i}")))
            .collect()
    }

    #[test]
    fn requires_exact_count() {
        assert!(CandidateSet::try_new(options(4), 5).is_none());
        assert!(CandidateSet::try_new(options(6), 5).is_none());
        assert!(CandidateSet::try_new(Vec::new(), 0).is_none());

        let set = CandidateSet::try_new(options(5), 5).unwrap();
        assert_eq!(set.len(), 5);
        assert_eq!(set.top().title, "TITLE 0");
        assert_eq!(set.options()[4].author, "AUTHOR 4");
    }
}
