//! Language model completion request and response values.

use serde::{Deserialize, Serialize};

/// A single-turn completion request: a system instruction plus one user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Fixed instruction describing the task and output grammar.
    pub system: String,
    /// Task input.
    pub user: String,
}

impl CompletionRequest {
    /// Creates a new request.
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// One completion choice. Content may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Message text, if the model produced any.
    pub content: Option<String>,
}

impl Choice {
    /// Creates a choice carrying text.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
        }
    }

    /// Creates a choice without content.
    pub fn empty() -> Self {
        Self { content: None }
    }
}

/// A completion response with zero or more choices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    /// Returned choices, in the order given by the model.
    pub choices: Vec<Choice>,
}

impl Completion {
    /// Creates a completion with a single text choice.
    pub fn single(content: impl Into<String>) -> Self {
        Self {
            choices: vec![Choice::text(content)],
        }
    }

    /// Content of the first choice, if there is one and it has text.
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.content.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_content() {
        assert_eq!(Completion::default().first_content(), None);
        assert_eq!(
            Completion {
                choices: vec![Choice::empty()]
            }
            .first_content(),
            None
        );
        assert_eq!(Completion::single("hello").first_content(), Some("hello"));
    }
}
