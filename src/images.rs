//! Image resolution for generated articles.
//!
//! The model is asked for a thumbnail URL but often leaves it out. When it
//! does, [`ImageResolver`] fetches a random photo from one curated Unsplash
//! collection instead. A failed lookup never drops the article: it gets
//! [`NO_IMAGE_URL`] and the batch carries on.

use crate::config::UnsplashSettings;
use crate::error::PipelineError;
use crate::models::{Article, NO_IMAGE_URL, RawArticleRecord};
use crate::normalize::PendingArticle;
use serde::Deserialize;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Trait for photo lookup, scoped to a collection.
pub trait PhotoSearch {
    /// Fetch one random photo from a collection.
    ///
    /// # Arguments
    ///
    /// * `collection` - Identifier of the collection to draw from
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The "regular" size URL of the photo
    /// * `Err(PipelineError)` - The lookup failed; callers fall back to [`NO_IMAGE_URL`]
    async fn random_photo(&self, collection: &str) -> Result<String, PipelineError>;
}

#[derive(Debug, Deserialize)]
struct RandomPhoto {
    urls: PhotoUrls,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    regular: Option<String>,
}

/// Read `urls.regular` from a `/photos/random` response body.
pub fn regular_url(body: &str) -> Result<String, PipelineError> {
    let photo: RandomPhoto = serde_json::from_str(body)
        .map_err(|e| PipelineError::MalformedResponse(format!("unsplash: {e}")))?;
    photo
        .urls
        .regular
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| PipelineError::MalformedResponse("unsplash: no urls.regular".to_string()))
}

/// `reqwest`-backed client for the Unsplash API.
///
/// The access key travels in the `Authorization` header, never in the URL.
pub struct UnsplashClient {
    http: reqwest::Client,
    endpoint: Url,
    access_key: String,
}

impl fmt::Debug for UnsplashClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnsplashClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("access_key", &"<redacted>")
            .finish()
    }
}

impl UnsplashClient {
    /// Build a client for `{api_base}/photos/random`.
    ///
    /// # Arguments
    ///
    /// * `http` - Shared HTTP client; its timeout bounds every lookup
    /// * `settings` - API base URL
    /// * `access_key` - Unsplash access key
    ///
    /// # Returns
    ///
    /// The client, or a parse error if the endpoint is not a valid URL.
    pub fn new(
        http: reqwest::Client,
        settings: &UnsplashSettings,
        access_key: String,
    ) -> Result<Self, url::ParseError> {
        let endpoint = Url::parse(&format!(
            "{}/photos/random",
            settings.api_base.trim_end_matches('/')
        ))?;
        Ok(Self {
            http,
            endpoint,
            access_key,
        })
    }
}

impl PhotoSearch for UnsplashClient {
    #[instrument(level = "debug", skip_all, fields(%collection))]
    async fn random_photo(&self, collection: &str) -> Result<String, PipelineError> {
        let t0 = Instant::now();
        let response = self
            .http
            .get(self.endpoint.clone())
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Client-ID {}", self.access_key),
            )
            .query(&[("collections", collection)])
            .send()
            .await
            .map_err(|e| PipelineError::from_transport("unsplash", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::UpstreamUnavailable(format!(
                "unsplash: HTTP {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PipelineError::from_transport("unsplash", e))?;
        debug!(elapsed_ms = t0.elapsed().as_millis() as u64, "Unsplash call succeeded");
        regular_url(&body)
    }
}

/// Decides the final image URL of each article.
#[derive(Debug)]
pub struct ImageResolver<P> {
    search: P,
    collection: String,
}

impl<P: PhotoSearch> ImageResolver<P> {
    /// Create a resolver drawing fallback photos from one collection.
    ///
    /// # Arguments
    ///
    /// * `search` - Photo lookup backend
    /// * `collection` - Collection every lookup is scoped to
    pub fn new(search: P, collection: impl Into<String>) -> Self {
        Self {
            search,
            collection: collection.into(),
        }
    }

    /// Complete `pending` with an image.
    ///
    /// A non-blank `image_url` in the raw record is trusted as is and no
    /// request is made. Otherwise one photo lookup is issued; if it fails the
    /// article gets [`NO_IMAGE_URL`].
    pub async fn resolve(&self, pending: PendingArticle, raw: &RawArticleRecord) -> Article {
        if let Some(url) = raw.text("image_url") {
            return pending.with_image(url.to_string());
        }

        match self.search.random_photo(&self.collection).await {
            Ok(url) => {
                info!(title = %pending.title, "Resolved article image");
                pending.with_image(url)
            }
            Err(e) => {
                warn!(title = %pending.title, error = %e, "Image lookup failed; using placeholder");
                pending.with_image(NO_IMAGE_URL.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::FakePhotoSearch;
    use crate::normalize::normalize;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn raw(value: serde_json::Value) -> RawArticleRecord {
        RawArticleRecord::try_from(value).unwrap()
    }

    #[tokio::test]
    async fn test_supplied_image_is_kept_without_lookup() {
        let search = FakePhotoSearch::ok("https://images.unsplash.com/other");
        let resolver = ImageResolver::new(search.clone(), "DR5Mh4ituPY");
        let record = raw(json!({ "title": "A", "image_url": "https://cdn.example/a.png" }));

        let article = resolver.resolve(normalize(&record), &record).await;

        assert_eq!(article.image_url, "https://cdn.example/a.png");
        assert_eq!(search.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_image_triggers_one_lookup() {
        let search = FakePhotoSearch::ok("https://images.unsplash.com/photo-1");
        let resolver = ImageResolver::new(search.clone(), "DR5Mh4ituPY");
        let record = raw(json!({ "title": "A" }));

        let article = resolver.resolve(normalize(&record), &record).await;

        assert_eq!(article.image_url, "https://images.unsplash.com/photo-1");
        assert_eq!(search.calls(), 1);
        assert_eq!(search.collections(), vec!["DR5Mh4ituPY".to_string()]);
    }

    #[tokio::test]
    async fn test_blank_or_wrong_typed_image_triggers_lookup() {
        let search = FakePhotoSearch::ok("https://images.unsplash.com/photo-2");
        let resolver = ImageResolver::new(search.clone(), "c");

        for record in [raw(json!({ "image_url": "" })), raw(json!({ "image_url": 5 }))] {
            let article = resolver.resolve(normalize(&record), &record).await;
            assert_eq!(article.image_url, "https://images.unsplash.com/photo-2");
        }
        assert_eq!(search.calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_lookup_keeps_article_complete() {
        let search = FakePhotoSearch::failing();
        let resolver = ImageResolver::new(search.clone(), "c");
        let record = raw(json!({ "summary": "S" }));

        let article = resolver.resolve(normalize(&record), &record).await;

        assert_eq!(search.calls(), 1);
        assert_eq!(article.image_url, NO_IMAGE_URL);
        assert_eq!(article.title, crate::models::NO_TITLE);
        assert_eq!(article.summary, "S");
        assert_eq!(article.date, crate::models::NO_DATE);
    }

    #[test]
    fn test_regular_url_parsing() {
        let body = r#"{"id": "x", "urls": {"raw": "r", "regular": "https://images.unsplash.com/reg"}}"#;
        assert_eq!(regular_url(body).unwrap(), "https://images.unsplash.com/reg");

        for body in [r#"{"urls": {"small": "s"}}"#, r#"{"errors": ["nope"]}"#, "<html>"] {
            assert!(matches!(
                regular_url(body),
                Err(PipelineError::MalformedResponse(_))
            ));
        }
    }

    #[test]
    fn test_unsplash_endpoint() {
        let client = UnsplashClient::new(
            reqwest::Client::new(),
            &UnsplashSettings::default(),
            "key".to_string(),
        )
        .unwrap();
        assert_eq!(client.endpoint.as_str(), "https://api.unsplash.com/photos/random");
    }

    fn unsplash_for(base: &str) -> UnsplashClient {
        let settings = UnsplashSettings {
            api_base: base.to_string(),
            ..UnsplashSettings::default()
        };
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        UnsplashClient::new(http, &settings, "test-unsplash-key".to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_random_photo_sends_key_as_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/photos/random"))
            .and(header("authorization", "Client-ID test-unsplash-key"))
            .and(query_param("collections", "DR5Mh4ituPY"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"urls": {"regular": "https://images.unsplash.com/photo-7"}}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let url = unsplash_for(&server.uri())
            .random_photo("DR5Mh4ituPY")
            .await
            .unwrap();

        assert_eq!(url, "https://images.unsplash.com/photo-7");
        let received = server.received_requests().await.unwrap();
        assert!(!received[0].url.as_str().contains("test-unsplash-key"));
    }

    #[tokio::test]
    async fn test_error_status_falls_back_to_placeholder() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/photos/random"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Rate Limit Exceeded"))
            .mount(&server)
            .await;
        let client = unsplash_for(&server.uri());

        let err = client.random_photo("c").await.unwrap_err();
        assert!(matches!(err, PipelineError::UpstreamUnavailable(_)), "{err}");

        let resolver = ImageResolver::new(client, "c");
        let record = raw(json!({ "title": "A" }));
        let article = resolver.resolve(normalize(&record), &record).await;
        assert_eq!(article.title, "A");
        assert_eq!(article.image_url, NO_IMAGE_URL);
    }

    #[tokio::test]
    async fn test_connection_error_does_not_expose_key() {
        let err = unsplash_for("http://127.0.0.1:1")
            .random_photo("c")
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::UpstreamUnavailable(_)), "{err}");
        assert!(!err.to_string().contains("test-unsplash-key"), "{err}");
    }
}
