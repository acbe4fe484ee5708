//! Search tag generation for recommendations.

use std::time::Duration;

use tabby_core::{BoxedLanguageModel, CompletionRequest};

use super::call_with_timeout;
use super::extraction::{MAX_ATTEMPTS, SEPARATOR};
use crate::utility::tracing_targets::TAGS as TRACING_TARGET;

/// Number of tags the model is asked for.
pub const TAG_COUNT: usize = 10;

const SYSTEM_MESSAGE: &str = "\
You are a model which accepts a list of titles and authors. Using your knowledge of natural language and the internet, you will give a list of tags which generalizes the set of books. These tags will be used in a search query to find similar books.

In the input, you will accept 3 or more lines of text. Conditions:
- Each line is the format of \"TITLE |---| AUTHOR |---| WEIGHT\"
- Each weight is a number between 0 and 1.
- A weight of 0 means that related tags should NOT be included, while a weight of 10 means its tags should be heavily weighed.

You will output 10 tags, each on separate lines. Conditions:
- YOU MUST STRICTLY FOLLOW THIS FORMAT.
- Do not bulletpoint or number lines.
- These tags represent the best tags for the set.
- The best tags are first.
";

/// A book the reader liked, with how much it should count.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedBook {
    /// Title.
    pub title: String,
    /// One or more comma-separated authors.
    pub author: String,
    /// Weight in `[0, 1]`.
    pub weight: f64,
}

impl WeightedBook {
    /// Creates a weighted book, clamping the weight into `[0, 1]`.
    pub fn new(title: impl Into<String>, author: impl Into<String>, weight: f64) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            weight: if weight.is_nan() { 0.0 } else { weight.clamp(0.0, 1.0) },
        }
    }
}

/// Generalizes a set of books into catalog search tags.
#[derive(Clone)]
pub struct TagGenerator {
    model: BoxedLanguageModel,
    timeout: Duration,
}

impl TagGenerator {
    /// Creates a generator bounding every completion call by `timeout`.
    pub fn new(model: BoxedLanguageModel, timeout: Duration) -> Self {
        Self { model, timeout }
    }

    /// Returns the model's tags, best first. Empty when every attempt failed.
    pub async fn generate(&self, books: &[WeightedBook]) -> Vec<String> {
        let request = CompletionRequest::new(SYSTEM_MESSAGE, serialize_books(books));

        for attempt in 1..=MAX_ATTEMPTS {
            let completion =
                match call_with_timeout(self.timeout, "completion", self.model.complete(&request))
                    .await
                {
                    Ok(completion) => completion,
                    Err(err) => {
                        tracing::warn!(
                            target: TRACING_TARGET,
                            attempt,
                            error = %err,
                            "language model request failed"
                        );
                        continue;
                    }
                };

            let Some(content) = completion.first_content() else {
                tracing::info!(target: TRACING_TARGET, attempt, "completion has no content");
                continue;
            };

            let tags: Vec<String> = content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(ToOwned::to_owned)
                .collect();

            tracing::info!(
                target: TRACING_TARGET,
                attempts = attempt,
                tags = tags.len(),
                "tags generated"
            );
            return tags;
        }

        Vec::new()
    }
}

impl std::fmt::Debug for TagGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagGenerator")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Renders books as `TITLE |---| AUTHOR |---| WEIGHT` lines.
pub fn serialize_books(books: &[WeightedBook]) -> String {
    books
        .iter()
        .map(|book| {
            format!(
                "{} {SEPARATOR} {} {SEPARATOR} {:?}",
                book.title, book.author, book.weight
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
