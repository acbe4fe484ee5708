//! Book identification, search and recommendation handlers.
//!
//! Every route answers with the [`BookResults`] envelope after the
//! configured [`IsbnPolicy`] has been applied.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use tabby_core::{Book, SearchQuery};

use crate::extract::{ImageBody, Json, Query, ValidateJson};
use crate::handler::request::{RecommendationsRequest, SearchParams};
use crate::handler::response::{BookResults, ErrorResponse};
use crate::handler::{ErrorKind, Result};
use crate::pipeline::{BookPipeline, IsbnPolicy, TagGenerator};
use crate::service::ServiceState;
use crate::utility::DEFAULT_MAX_IMAGE_BODY_SIZE;

/// Tracing target for book operations.
const TRACING_TARGET: &str = "tabby_server::handler::books";

/// Message returned when a search carries no usable parameter.
pub const MISSING_SEARCH_PARAMETER: &str =
    "Request must contain at least one of the parameters, and that parameter must be non-empty.";

/// Message returned when no tags could be generated for recommendations.
pub const NO_TAGS: &str = "Unable to get tags from the given books.";

/// Unwraps a scan, degrading collaborator failures to an empty result.
///
/// Images the collaborators reject as unusable are reported to the client.
fn books_or_empty(
    operation: &'static str,
    scan: tabby_core::Result<Vec<Book>>,
) -> Result<Vec<Book>> {
    use tabby_core::ErrorKind as CoreKind;

    match scan {
        Ok(books) => Ok(books),
        Err(err) if matches!(err.kind(), CoreKind::Image | CoreKind::InvalidInput) => {
            Err(err.into())
        }
        Err(err) => {
            tracing::warn!(
                target: TRACING_TARGET,
                operation,
                error = %err,
                "scan failed, responding without books"
            );
            Ok(Vec::new())
        }
    }
}

/// Identifies the book on a cover photo.
#[tracing::instrument(skip_all, fields(width = image.width(), height = image.height()))]
async fn scan_cover(
    State(pipeline): State<BookPipeline>,
    State(policy): State<IsbnPolicy>,
    ImageBody(image): ImageBody,
) -> Result<(StatusCode, Json<BookResults>)> {
    tracing::debug!(target: TRACING_TARGET, "scanning cover");

    let books = books_or_empty("cover scan", pipeline.scan_cover(&image).await)?;
    let books = policy.apply(books);

    tracing::info!(
        target: TRACING_TARGET,
        results = books.len(),
        "cover scanned"
    );

    Ok((StatusCode::OK, Json(BookResults::new(books))))
}

fn scan_cover_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Scan a book cover")
        .description(
            "Identifies the book on a photo of its cover. The body is the raw image in any \
            common format. Responds with the matching catalog records, best first.",
        )
        .response::<200, Json<BookResults>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<413, Json<ErrorResponse>>()
}

/// Identifies every book on a shelf photo.
#[tracing::instrument(skip_all, fields(width = image.width(), height = image.height()))]
async fn scan_shelf(
    State(pipeline): State<BookPipeline>,
    State(policy): State<IsbnPolicy>,
    ImageBody(image): ImageBody,
) -> Result<(StatusCode, Json<BookResults>)> {
    tracing::debug!(target: TRACING_TARGET, "scanning shelf");

    let scan = pipeline
        .scan_shelf(&image, policy)
        .await
        .map(|scan| scan.into_first_books());
    let books = books_or_empty("shelf scan", scan)?;

    tracing::info!(
        target: TRACING_TARGET,
        results = books.len(),
        "shelf scanned"
    );

    Ok((StatusCode::OK, Json(BookResults::new(books))))
}

fn scan_shelf_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Scan a bookshelf")
        .description(
            "Identifies the books on a photo of a shelf. The body is the raw image in any \
            common format. Responds with the best match for every recognized spine, in \
            detection order.",
        )
        .response::<200, Json<BookResults>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<413, Json<ErrorResponse>>()
}

/// Searches the catalog by phrase and structured fields.
#[tracing::instrument(skip_all)]
async fn search(
    State(pipeline): State<BookPipeline>,
    State(policy): State<IsbnPolicy>,
    Query(params): Query<SearchParams>,
) -> Result<(StatusCode, Json<BookResults>)> {
    let Some(query) = params.into_query() else {
        return Err(ErrorKind::BadRequest.with_message(MISSING_SEARCH_PARAMETER));
    };

    tracing::debug!(target: TRACING_TARGET, query = ?query, "searching catalog");

    let books = policy.apply(pipeline.search(&query).await);

    tracing::info!(
        target: TRACING_TARGET,
        results = books.len(),
        "catalog searched"
    );

    Ok((StatusCode::OK, Json(BookResults::new(books))))
}

fn search_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Search books")
        .description(
            "Searches the catalog. At least one of `phrase`, `title`, `author`, `publisher`, \
            `subject` or `isbn` must be present and non-empty.",
        )
        .response::<200, Json<BookResults>>()
        .response::<400, Json<ErrorResponse>>()
}

/// Recommends books similar to a weighted set of titles.
#[tracing::instrument(skip_all, fields(books = request.titles.len()))]
async fn recommendations(
    State(pipeline): State<BookPipeline>,
    State(policy): State<IsbnPolicy>,
    State(tag_generator): State<TagGenerator>,
    ValidateJson(request): ValidateJson<RecommendationsRequest>,
) -> Result<(StatusCode, Json<BookResults>)> {
    let weighted = request.weighted_books();

    // An empty set has nothing to generalize.
    let tags = if weighted.is_empty() {
        Vec::new()
    } else {
        tag_generator.generate(&weighted).await
    };

    if tags.is_empty() {
        tracing::warn!(target: TRACING_TARGET, "no tags generated");
        return Err(ErrorKind::BadRequest.with_message(NO_TAGS));
    }

    let phrase = tags.join(", ");
    tracing::debug!(target: TRACING_TARGET, phrase = %phrase, "searching by tags");

    let books = policy.apply(pipeline.search(&SearchQuery::from_phrase(phrase)).await);

    tracing::info!(
        target: TRACING_TARGET,
        tags = tags.len(),
        results = books.len(),
        "recommendations found"
    );

    Ok((StatusCode::OK, Json(BookResults::new(books))))
}

fn recommendations_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Recommend books")
        .description(
            "Generalizes the given books into search tags and returns catalog matches for \
            them. `titles`, `authors` and the optional `weights` are parallel lists; weights \
            range from 0 to 1 and default to 1.",
        )
        .response::<200, Json<BookResults>>()
        .response::<400, Json<ErrorResponse>>()
}

/// Returns a [`Router`] with all book routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    let scans = ApiRouter::new()
        .api_route("/books/scan_cover", post_with(scan_cover, scan_cover_docs))
        .api_route("/books/scan_shelf", post_with(scan_shelf, scan_shelf_docs))
        .layer(DefaultBodyLimit::max(DEFAULT_MAX_IMAGE_BODY_SIZE));

    ApiRouter::new()
        .merge(scans)
        .api_route("/books/search", get_with(search, search_docs))
        .api_route(
            "/books/recommendations",
            post_with(recommendations, recommendations_docs),
        )
        .with_path_items(|item| item.tag("Books"))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::time::Duration;

    use axum::Router;
    use axum::body::Bytes;
    use axum_test::TestServer;
    use image::{ImageFormat, Rgb, RgbImage};
    use serde_json::{Value, json};
    use tabby_core::mock::{MockCatalog, MockLanguageModel, MockRecognizer, MockSegmenter};
    use tabby_core::{Detection, DetectionBox};

    use super::*;
    use crate::extract::COULD_NOT_READ_IMAGE;
    use crate::handler::test::create_test_server_with_mocks;
    use crate::middleware::{RecoveryConfig, RouterRecoveryExt};
    use crate::pipeline::test_support::{GIVER_ANSWER, Mocks, book, fragment};
    use crate::service::ServiceConfig;

    fn png(width: u32, height: u32) -> anyhow::Result<Bytes> {
        let image = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Png)?;
        Ok(Bytes::from(buffer.into_inner()))
    }

    fn giver_mocks(catalog: MockCatalog) -> Mocks {
        Mocks {
            language_model: MockLanguageModel::replying([GIVER_ANSWER]),
            catalog,
            ..Mocks::reading(vec![fragment("GIVER"), fragment("LOIS LOWRY")])
        }
    }

    #[tokio::test]
    async fn scan_cover_identifies_the_giver() -> anyhow::Result<()> {
        let mocks = giver_mocks(MockCatalog::new(vec![book("THE GIVER", "9780544336261")]));
        let server = create_test_server_with_mocks(&mocks)?;

        let response = server.post("/books/scan_cover").bytes(png(60, 80)?).await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["message"], "Found 1 books.");
        assert_eq!(body["resultsCount"], 1);
        assert_eq!(body["results"][0]["title"], "THE GIVER");
        assert_eq!(mocks.catalog.queries()[0].phrase, "the giver lois lowry");
        Ok(())
    }

    #[tokio::test]
    async fn scan_cover_drops_books_without_isbn() -> anyhow::Result<()> {
        let mocks = giver_mocks(MockCatalog::new(vec![
            book("The Giver", "9780544336261"),
            book("The Giver (Study Guide)", ""),
            book("The Giver Quartet", "9780544340688"),
        ]));
        let server = create_test_server_with_mocks(&mocks)?;

        let response = server.post("/books/scan_cover").bytes(png(60, 80)?).await;
        let body: Value = response.json();

        assert_eq!(body["resultsCount"], 2);
        assert_eq!(body["results"][0]["title"], "The Giver");
        assert_eq!(body["results"][1]["title"], "The Giver Quartet");
        Ok(())
    }

    #[tokio::test]
    async fn scan_cover_without_text_skips_collaborators() -> anyhow::Result<()> {
        let mocks = Mocks {
            language_model: MockLanguageModel::replying([GIVER_ANSWER]),
            catalog: MockCatalog::new(vec![book("The Giver", "9780544336261")]),
            ..Mocks::reading(Vec::new())
        };
        let server = create_test_server_with_mocks(&mocks)?;

        let response = server.post("/books/scan_cover").bytes(png(60, 80)?).await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["message"], "No books found.");
        assert_eq!(body["resultsCount"], 0);
        assert_eq!(mocks.language_model.calls(), 0);
        assert_eq!(mocks.catalog.calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn scan_cover_recognizer_failure_is_empty() -> anyhow::Result<()> {
        let mocks = Mocks {
            recognizer: Some(MockRecognizer::failing()),
            ..Mocks::default()
        };
        let server = create_test_server_with_mocks(&mocks)?;

        let response = server.post("/books/scan_cover").bytes(png(60, 80)?).await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["resultsCount"], 0);
        Ok(())
    }

    #[tokio::test]
    async fn scan_cover_rejects_non_images() -> anyhow::Result<()> {
        let mocks = Mocks::default();
        let server = create_test_server_with_mocks(&mocks)?;

        let response = server
            .post("/books/scan_cover")
            .bytes(Bytes::from_static(b"not an image"))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["message"], COULD_NOT_READ_IMAGE);
        assert_eq!(mocks.recognizer().calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn scan_shelf_returns_first_book_per_slot() -> anyhow::Result<()> {
        let detection = |x1, x2| Detection::new(DetectionBox::new(x1, 0.0, x2, 640.0), 0.9, 0);
        let mocks = Mocks {
            segmenter: MockSegmenter::new(vec![detection(0.0, 100.0), detection(200.0, 300.0)]),
            language_model: MockLanguageModel::replying([GIVER_ANSWER, GIVER_ANSWER]),
            catalog: MockCatalog::new(vec![
                book("No ISBN", ""),
                book("The Giver", "9780544336261"),
                book("Messenger", "9780544340695"),
            ]),
            ..Mocks::reading(vec![fragment("THE GIVER")])
        };
        let server = create_test_server_with_mocks(&mocks)?;

        let response = server.post("/books/scan_shelf").bytes(png(320, 160)?).await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["resultsCount"], 2);
        assert_eq!(body["results"][0]["title"], "The Giver");
        assert_eq!(body["results"][1]["title"], "The Giver");
        assert_eq!(mocks.segmenter.calls(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn scan_shelf_answers_before_request_timeout() -> anyhow::Result<()> {
        let detection = |x1, x2| Detection::new(DetectionBox::new(x1, 0.0, x2, 640.0), 0.9, 0);
        let mocks = Mocks {
            segmenter: MockSegmenter::new(vec![
                detection(0.0, 200.0),
                detection(200.0, 400.0),
                detection(400.0, 600.0),
            ]),
            language_model: MockLanguageModel::replying([GIVER_ANSWER; 3])
                .with_latency(Duration::from_millis(400)),
            catalog: MockCatalog::new(vec![book("The Giver", "9780544336261")]),
            ..Mocks::reading(vec![fragment("THE GIVER")])
        };
        let mut state = ServiceState::new(&ServiceConfig::default(), &mocks.collaborators())?;
        state.pipeline = state.pipeline.with_shelf_budget(Duration::from_millis(600));

        let app: Router = crate::handler::routes().with_state(state).into();
        let server = TestServer::new(app.with_recovery(&RecoveryConfig::with_timeout_secs(1)))?;

        let response = server.post("/books/scan_shelf").bytes(png(640, 160)?).await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["resultsCount"], 1);
        assert_eq!(body["results"][0]["title"], "The Giver");
        Ok(())
    }

    #[tokio::test]
    async fn search_forwards_parameters() -> anyhow::Result<()> {
        let mocks = Mocks {
            catalog: MockCatalog::new(vec![book("Atlas of Flowers", "9780000000001")]),
            ..Mocks::default()
        };
        let server = create_test_server_with_mocks(&mocks)?;

        let response = server
            .get("/books/search")
            .add_query_param("phrase", "flowers")
            .add_query_param("title", "atlas")
            .await;
        response.assert_status_ok();

        let query = &mocks.catalog.queries()[0];
        assert_eq!(query.phrase, "flowers");
        assert_eq!(query.title, "atlas");
        assert_eq!(response.json::<Value>()["resultsCount"], 1);
        Ok(())
    }

    #[tokio::test]
    async fn search_requires_a_parameter() -> anyhow::Result<()> {
        let mocks = Mocks::default();
        let server = create_test_server_with_mocks(&mocks)?;

        for path in ["/books/search", "/books/search?title=&author="] {
            let response = server.get(path).await;
            response.assert_status(StatusCode::BAD_REQUEST);
            assert_eq!(response.json::<Value>()["message"], MISSING_SEARCH_PARAMETER);
        }

        assert_eq!(mocks.catalog.calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn recommendations_search_by_joined_tags() -> anyhow::Result<()> {
        let mocks = Mocks {
            language_model: MockLanguageModel::replying(["dystopia\n\nyoung adult\n memory \n"]),
            catalog: MockCatalog::new(vec![book("Divergent", "9780062024039")]),
            ..Mocks::default()
        };
        let server = create_test_server_with_mocks(&mocks)?;

        let response = server
            .post("/books/recommendations")
            .json(&json!({
                "titles": ["The Giver", "Matched"],
                "authors": ["Lois Lowry", "Ally Condie"],
                "weights": [1.0, 0.5],
            }))
            .await;
        response.assert_status_ok();

        assert_eq!(
            mocks.catalog.queries()[0].phrase,
            "dystopia, young adult, memory"
        );
        assert_eq!(response.json::<Value>()["results"][0]["title"], "Divergent");
        Ok(())
    }

    #[tokio::test]
    async fn recommendations_reject_unequal_lists() -> anyhow::Result<()> {
        let mocks = Mocks::default();
        let server = create_test_server_with_mocks(&mocks)?;

        let response = server
            .post("/books/recommendations")
            .json(&json!({
                "titles": ["The Giver", "Matched"],
                "authors": ["Lois Lowry"],
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>()["message"],
            "All lists must be equal in length."
        );
        assert_eq!(mocks.language_model.calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn recommendations_without_tags_fail() -> anyhow::Result<()> {
        let mocks = Mocks::default();
        let server = create_test_server_with_mocks(&mocks)?;

        let response = server
            .post("/books/recommendations")
            .json(&json!({
                "titles": ["The Giver"],
                "authors": ["Lois Lowry"],
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["message"], NO_TAGS);
        assert_eq!(mocks.catalog.calls(), 0);
        Ok(())
    }
}
