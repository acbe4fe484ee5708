//! Title and author extraction from recognized cover text.
//!
//! The language model receives one line per fragment and must answer with
//! exactly [`ANSWER_COUNT`] lines of `TITLE |---| AUTHOR`. Any deviation
//! invalidates the whole answer and consumes one of [`MAX_ATTEMPTS`].

use std::time::Duration;

use tabby_core::{
    BoxedLanguageModel, CandidateOption, CandidateSet, CompletionRequest, RecognizedFragment,
};

use super::call_with_timeout;
use crate::utility::tracing_targets::EXTRACTION as TRACING_TARGET;

/// Number of candidate lines the model must return.
pub const ANSWER_COUNT: usize = 5;

/// Maximum number of completions requested per extraction.
pub const MAX_ATTEMPTS: usize = 3;

/// Field separator used in both directions.
pub const SEPARATOR: &str = "|---|";

const SYSTEM_MESSAGE: &str = "\
You are a model which accepts chunks of text which were recognized by an OCR model. The texts will be from the cover of a physical book. Using your knowledge of natural language and the internet, you will identify (1) the title and (2) the author, given the text.

In the input, you will accept 1 or more lines of text. Conditions:
- Each line is in the format of \"TEXT |---| AREA |---| CENTER_X, CENTER_Y\"
- TEXT is the text recognized by the OCR model.
- There may be misspellings in the text, for which you must account for.
- There may be parts of text which do are not part of the title nor the author.
- AREA is a floating point value representing how much area the text takes up.
- Texts with larger area tend to be part of the title or author.
- CENTER_X, CENTER_Y are floating point values which represent the center point of the text's bounding box.
- Texts which have close centers may be a part of a larger chunk.

You will output 5 answers on separate lines. Conditions:
- Each answer is in the format of \"TITLE |---| AUTHOR\". YOU MUST STRICTLY OBEY THIS FORMAT. Do not number or bulletpoint each answer.
- Each answer is unique.
- Every character should be UPPERCASE.
- The first answer is your most confident answer, while the bottom answer is your least confident answer.
- More confident answers should include the volume.
- More confident answers should include the edition.
";

/// Turns recognized fragments into ranked title/author candidates.
#[derive(Clone)]
pub struct CandidateExtractor {
    model: BoxedLanguageModel,
    timeout: Duration,
}

impl CandidateExtractor {
    /// Creates an extractor bounding every completion call by `timeout`.
    pub fn new(model: BoxedLanguageModel, timeout: Duration) -> Self {
        Self { model, timeout }
    }

    /// Asks the model for candidates, retrying malformed answers.
    ///
    /// Returns `None` once every attempt has been consumed.
    pub async fn extract(&self, fragments: &[RecognizedFragment]) -> Option<CandidateSet> {
        let request = CompletionRequest::new(SYSTEM_MESSAGE, serialize_fragments(fragments));

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

            let Some(choice) = completion.choices.first() else {
                tracing::info!(target: TRACING_TARGET, attempt, "no choices in completion");
                continue;
            };

            let Some(content) = choice.content.as_deref() else {
                tracing::info!(target: TRACING_TARGET, attempt, "completion has no content");
                continue;
            };

            match parse_candidates(content) {
                Some(candidates) => {
                    tracing::info!(
                        target: TRACING_TARGET,
                        attempts = attempt,
                        "candidates extracted"
                    );
                    return Some(candidates);
                }
                None => {
                    tracing::info!(target: TRACING_TARGET, attempt, "invalid response format");
                }
            }
        }

        tracing::warn!(
            target: TRACING_TARGET,
            attempts = MAX_ATTEMPTS,
            "extraction gave up"
        );
        None
    }
}

impl std::fmt::Debug for CandidateExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidateExtractor")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Renders fragments as `TEXT |---| AREA |---| CENTER_X, CENTER_Y` lines.
pub fn serialize_fragments(fragments: &[RecognizedFragment]) -> String {
    fragments
        .iter()
        .map(|fragment| {
            let center = fragment.center();
            format!(
                "{} {SEPARATOR} {:?} {SEPARATOR} {:?}, {:?}",
                fragment.text,
                fragment.area(),
                center.x,
                center.y
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parses a model answer. The batch is rejected as a whole on any defect.
pub fn parse_candidates(response: &str) -> Option<CandidateSet> {
    let options = response
        .trim()
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_option)
        .collect::<Option<Vec<_>>>()?;

    CandidateSet::try_new(options, ANSWER_COUNT)
}

fn parse_option(line: &str) -> Option<CandidateOption> {
    let mut fields = line.trim().split(SEPARATOR);
    let (Some(title), Some(author), None) = (fields.next(), fields.next(), fields.next()) else {
        return None;
    };

    Some(CandidateOption::new(title.trim(), author.trim()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tabby_core::mock::MockLanguageModel;
    use tabby_core::{Choice, Completion, Error, Quad};

    use super::*;

    const ANSWER: &str = "THE GIVER |---| LOIS LOWRY
GATHERING BLUE |---| LOIS LOWRY

MESSENGER |---| LOIS LOWRY
SON |---| LOIS LOWRY
NUMBER THE STARS |---| LOIS LOWRY
";

    fn extractor(model: &MockLanguageModel) -> CandidateExtractor {
        CandidateExtractor::new(Arc::new(model.clone()), Duration::from_secs(5))
    }

    #[test]
    fn serializes_one_line_per_fragment() {
        let fragments = vec![
            RecognizedFragment::new("THE GIVER", Quad::from_rect(0.0, 0.0, 100.0, 20.0), 0.9),
            RecognizedFragment::new("LOWRY", Quad::from_rect(10.0, 50.0, 30.0, 60.0), 0.8),
        ];

        assert_eq!(
            serialize_fragments(&fragments),
            "THE GIVER |---| 2000.0 |---| 50.0, 10.0\nLOWRY |---| 200.0 |---| 20.0, 55.0"
        );
        assert_eq!(serialize_fragments(&[]), "");
    }

    #[test]
    fn parses_five_lines_in_order() {
        let candidates = parse_candidates(ANSWER).unwrap();
        assert_eq!(candidates.len(), ANSWER_COUNT);
        assert_eq!(candidates.top().title, "THE GIVER");
        assert_eq!(candidates.top().author, "LOIS LOWRY");
        assert_eq!(candidates.options()[4].title, "NUMBER THE STARS");
    }

    #[test]
    fn rejects_wrong_line_count() {
        let four = ANSWER.lines().take(4).collect::<Vec<_>>().join("\n");
        assert!(parse_candidates(&four).is_none());

        let six = format!("{ANSWER}\nLOOKING BACK |---| LOIS LOWRY");
        assert!(parse_candidates(&six).is_none());
    }

    #[test]
    fn rejects_batch_with_one_bad_line() {
        let missing = ANSWER.replace("SON |---| LOIS LOWRY", "SON - LOIS LOWRY");
        assert!(parse_candidates(&missing).is_none());

        let extra = ANSWER.replace("SON |---| LOIS LOWRY", "SON |---| LOIS LOWRY |---| 0.4");
        assert!(parse_candidates(&extra).is_none());
    }

    #[tokio::test]
    async fn first_valid_answer_wins() {
        let model = MockLanguageModel::replying([ANSWER, ANSWER]);
        let candidates = extractor(&model).extract(&[]).await;

        assert!(candidates.is_some());
        assert_eq!(model.calls(), 1);
        assert_eq!(model.requests()[0].system, SYSTEM_MESSAGE);
    }

    #[tokio::test]
    async fn empty_answers_consume_attempts() {
        let model = MockLanguageModel::new([
            Ok(Completion::default()),
            Ok(Completion {
                choices: vec![Choice::empty()],
            }),
            Ok(Completion::single(ANSWER)),
        ]);

        assert!(extractor(&model).extract(&[]).await.is_some());
        assert_eq!(model.calls(), 3);
    }

    #[tokio::test]
    async fn gives_up_after_three_attempts() {
        let model = MockLanguageModel::new([
            Err(Error::network_error()),
            Ok(Completion::single("garbage")),
            Ok(Completion::single("more garbage")),
            Ok(Completion::single(ANSWER)),
        ]);

        assert!(extractor(&model).extract(&[]).await.is_none());
        assert_eq!(model.calls(), MAX_ATTEMPTS);
    }
}
