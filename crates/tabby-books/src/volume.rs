//! Typed views over the Google Books volumes response.
//!
//! Every attribute is read independently: a malformed attribute falls back
//! to its default instead of failing the record, and a malformed record is
//! skipped instead of failing the batch.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabby_core::{Book, BookDetails};

/// Identifier type marking an ISBN-13 entry.
pub const ISBN_13: &str = "ISBN_13";

/// Top-level volumes search response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volumes {
    /// Total number of matches reported by the catalog.
    #[serde(default, deserialize_with = "lenient")]
    pub total_items: Option<i64>,
    /// Raw items; each is decoded on its own.
    #[serde(default, deserialize_with = "lenient")]
    pub items: Option<Vec<Value>>,
}

impl Volumes {
    /// Maps every item with a readable `volumeInfo` into a [`Book`],
    /// preserving catalog order.
    pub fn into_books(self) -> Vec<Book> {
        if self.total_items.unwrap_or_default() <= 0 {
            return Vec::new();
        }

        self.items
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| serde_json::from_value::<Volume>(item).ok())
            .filter_map(|volume| volume.volume_info)
            .map(Book::from)
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Volume {
    #[serde(default, deserialize_with = "lenient")]
    volume_info: Option<VolumeInfo>,
}

/// Bibliographic payload of one volume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    /// Title.
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    /// Author names.
    #[serde(default, deserialize_with = "lenient")]
    pub authors: Option<Vec<String>>,
    /// Identifiers with their types.
    #[serde(default, deserialize_with = "lenient")]
    pub industry_identifiers: Option<Vec<IndustryIdentifier>>,
    /// Average rating.
    #[serde(default, deserialize_with = "lenient")]
    pub average_rating: Option<f64>,
    /// Description.
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    /// Page count.
    #[serde(default, deserialize_with = "lenient")]
    pub page_count: Option<i64>,
    /// Categories.
    #[serde(default, deserialize_with = "lenient")]
    pub categories: Option<Vec<String>>,
    /// Publisher.
    #[serde(default, deserialize_with = "lenient")]
    pub publisher: Option<String>,
    /// Publication date.
    #[serde(default, deserialize_with = "lenient")]
    pub published_date: Option<String>,
    /// Cover image links.
    #[serde(default, deserialize_with = "lenient")]
    pub image_links: Option<ImageLinks>,
}

impl VolumeInfo {
    /// The first ISBN-13 identifier, if any.
    pub fn isbn13(&self) -> Option<&str> {
        self.industry_identifiers
            .iter()
            .flatten()
            .find(|id| id.kind.as_deref() == Some(ISBN_13))
            .and_then(|id| id.identifier.as_deref())
    }
}

impl From<VolumeInfo> for BookDetails {
    fn from(info: VolumeInfo) -> Self {
        let defaults = BookDetails::default();

        Self {
            isbn: info.isbn13().unwrap_or_default().to_owned(),
            title: info.title.unwrap_or_default(),
            authors: info.authors.unwrap_or_default().join(","),
            rating: info.average_rating.unwrap_or(defaults.rating),
            summary: info.description.unwrap_or_default(),
            thumbnail: info
                .image_links
                .and_then(|links| links.thumbnail)
                .unwrap_or_default(),
            page_count: info.page_count.unwrap_or(defaults.page_count),
            genres: info.categories.unwrap_or_default().join(","),
            publisher: info.publisher.unwrap_or_default(),
            published_date: info.published_date.unwrap_or_default(),
        }
    }
}

impl From<VolumeInfo> for Book {
    fn from(info: VolumeInfo) -> Self {
        Book::new(info.into())
    }
}

/// One typed identifier of a volume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndustryIdentifier {
    /// Identifier type, e.g. `ISBN_13`.
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: Option<String>,
    /// Identifier value.
    #[serde(default, deserialize_with = "lenient")]
    pub identifier: Option<String>,
}

/// Cover image links of a volume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageLinks {
    /// Thumbnail URL.
    #[serde(default, deserialize_with = "lenient")]
    pub thumbnail: Option<String>,
}

/// Decodes a value, or `None` when it has an unexpected shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn books(response: Value) -> Vec<Book> {
        serde_json::from_value::<Volumes>(response)
            .unwrap()
            .into_books()
    }

    #[test]
    fn maps_a_full_record() {
        let books = books(json!({
            "totalItems": 1,
            "items": [{
                "volumeInfo": {
                    "title": "The Giver",
                    "authors": ["Lois Lowry", "Someone Else"],
                    "industryIdentifiers": [
                        {"type": "ISBN_10", "identifier": "0544336267"},
                        {"type": "ISBN_13", "identifier": "9780544336261"}
                    ],
                    "averageRating": 4.5,
                    "description": "Jonas's world is perfect.",
                    "pageCount": 240,
                    "categories": ["Young Adult Fiction", "Dystopia"],
                    "publisher": "HarperCollins",
                    "publishedDate": "2014",
                    "imageLinks": {"thumbnail": "http://books.google.com/t.jpg"}
                }
            }]
        }));

        assert_eq!(books.len(), 1);
        let book = &books[0];
        assert_eq!(book.isbn(), "9780544336261");
        assert_eq!(book.title(), "The Giver");
        assert_eq!(book.authors(), "Lois Lowry,Someone Else");
        assert_eq!(book.rating(), 4.5);
        assert_eq!(book.page_count(), 240);
        assert_eq!(book.genres(), "Young Adult Fiction,Dystopia");
        assert_eq!(book.thumbnail(), "http://books.google.com/t.jpg");
        assert_eq!(book.published_date(), "2014");
        assert_eq!(book.excerpt(), "Jonas's world is perfect....");
    }

    #[test]
    fn missing_attributes_take_defaults() {
        let books = books(json!({
            "totalItems": 1,
            "items": [{"volumeInfo": {"title": "Untitled"}}]
        }));

        let book = &books[0];
        assert_eq!(book.isbn(), "");
        assert_eq!(book.authors(), "");
        assert_eq!(book.rating(), -1.0);
        assert_eq!(book.page_count(), -1);
        assert_eq!(book.thumbnail(), "");
        assert_eq!(book.excerpt(), "...");
    }

    #[test]
    fn isbn_requires_isbn13_entry() {
        let info: VolumeInfo = serde_json::from_value(json!({
            "industryIdentifiers": [{"type": "ISBN_10", "identifier": "0544336267"}]
        }))
        .unwrap();
        assert_eq!(info.isbn13(), None);

        let info: VolumeInfo = serde_json::from_value(json!({
            "industryIdentifiers": [
                {"type": "ISBN_13", "identifier": "first"},
                {"type": "ISBN_13", "identifier": "second"}
            ]
        }))
        .unwrap();
        assert_eq!(info.isbn13(), Some("first"));
    }

    #[test]
    fn malformed_attribute_does_not_fail_the_record() {
        let books = books(json!({
            "totalItems": 1,
            "items": [{"volumeInfo": {"title": "Odd", "pageCount": "many", "authors": "solo"}}]
        }));

        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title(), "Odd");
        assert_eq!(books[0].page_count(), -1);
        assert_eq!(books[0].authors(), "");
    }

    #[test]
    fn items_without_volume_info_are_skipped() {
        let books = books(json!({
            "totalItems": 3,
            "items": [
                {"id": "a"},
                null,
                {"volumeInfo": {"title": "Kept"}},
                {"volumeInfo": "garbage"}
            ]
        }));

        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title(), "Kept");
    }

    #[test]
    fn zero_total_items_means_no_results() {
        assert!(books(json!({"totalItems": 0, "items": [{"volumeInfo": {}}]})).is_empty());
        assert!(books(json!({"kind": "books#volumes"})).is_empty());
    }
}
