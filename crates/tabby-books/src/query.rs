//! Google Books query assembly.
//!
//! The volumes endpoint accepts a single `q` parameter where structured
//! fields are written as `keyword:value` clauses next to free text. Values
//! are sanitized first, so a phrase such as `people are subject:a study`
//! cannot smuggle in an extra `subject:` clause.

use tabby_core::SearchQuery;

/// Keywords the catalog interprets as the start of a structured clause.
pub const RESERVED_KEYWORDS: [&str; 5] = ["intitle", "inauthor", "inpublisher", "subject", "isbn"];

/// Breaks every `keyword:` adjacency in `value` by padding the colon.
pub fn sanitize(value: &str) -> String {
    RESERVED_KEYWORDS
        .iter()
        .fold(value.to_owned(), |acc, keyword| {
            acc.replace(&format!("{keyword}:"), &format!("{keyword} : "))
        })
}

/// Assembles the catalog query: the phrase, then one clause per non-empty
/// field, separated by single spaces.
pub fn assemble(query: &SearchQuery) -> String {
    let clauses = [
        ("", &query.phrase),
        ("intitle:", &query.title),
        ("inauthor:", &query.author),
        ("inpublisher:", &query.publisher),
        ("subject:", &query.subject),
        ("isbn:", &query.isbn),
    ];

    clauses
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(prefix, value)| format!("{prefix}{}", sanitize(value)))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phrase_and_title() {
        let query = SearchQuery::from_phrase("flowers").with_title("atlas");
        assert_eq!(assemble(&query), "flowers intitle:atlas");
    }

    #[test]
    fn single_field_has_no_stray_separators() {
        let query = SearchQuery::default().with_author("lois lowry");
        assert_eq!(assemble(&query), "inauthor:lois lowry");

        let query = SearchQuery::default().with_isbn("9780544336261");
        assert_eq!(assemble(&query), "isbn:9780544336261");
    }

    #[test]
    fn all_fields_in_order() {
        let query = SearchQuery::from_phrase("dystopia")
            .with_title("giver")
            .with_author("lowry")
            .with_publisher("houghton")
            .with_subject("fiction")
            .with_isbn("978");

        assert_eq!(
            assemble(&query),
            "dystopia intitle:giver inauthor:lowry inpublisher:houghton subject:fiction isbn:978"
        );
    }

    #[test]
    fn empty_query_is_empty() {
        assert_eq!(assemble(&SearchQuery::default()), "");
    }

    #[test]
    fn phrase_cannot_inject_clauses() {
        let query = SearchQuery::from_phrase("kingdoms to which people are subject:foo");
        let assembled = assemble(&query);

        assert!(!assembled.contains("subject:"));
        assert_eq!(assembled, "kingdoms to which people are subject : foo");
    }

    #[test]
    fn sanitizes_every_keyword() {
        for keyword in RESERVED_KEYWORDS {
            let sanitized = sanitize(&format!("x {keyword}:y"));
            assert_eq!(sanitized, format!("x {keyword} : y"));
        }
        assert_eq!(sanitize("no clauses here"), "no clauses here");
    }

    #[test]
    fn structured_fields_are_sanitized() {
        let query = SearchQuery::default().with_title("a intitle:b");
        assert_eq!(assemble(&query), "intitle:a intitle : b");
    }
}
