//! Immersion Kit API Client
//!
//! Fetches Japanese example sentences with media from the Immersion Kit
//! corpus.
//!
//! ## API Endpoints
//!
//! - **Search**: `https://apiv2.immersionkit.com/search?q={query}&exactMatch=false&limit=50&sort=sentence_length:asc`
//! - **Deck metadata**: `https://apiv2.immersionkit.com/index_meta`
//!
//! ## Media URLs
//!
//! Search results carry bare media filenames. Full URLs are assembled from
//! the object-store base, the media type (first segment of the entry id),
//! and the deck's display title:
//! `{base}{media_type}/{deck_title}/media/{filename}`
//!
//! ## Deck Metadata
//!
//! The `index_meta` endpoint maps deck slugs to display titles, which are
//! also path components of media URLs. The map is fetched once per client
//! and cached; a failed fetch degrades to an empty map (slugs used as-is)
//! rather than being retried.

use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use bridge_traits::time::{Clock, SystemClock};
use lru::LruCache;
use serde::Deserialize;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::{ExampleError, Result};
use crate::provider::ExampleProvider;
use crate::types::ExampleSentence;

/// Immersion Kit API base URL
const IMMERSION_KIT_API_BASE: &str = "https://apiv2.immersionkit.com";

/// Object-store base URL for media files
const MEDIA_BASE: &str = "https://us-southeast-1.linodeobjects.com/immersionkit/media/";

/// Maximum number of search results to request
const SEARCH_LIMIT: u32 = 50;

/// Timeout for API requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Capacity of the per-client search result cache
const SEARCH_CACHE_SIZE: usize = 32;

/// Immersion Kit API client
///
/// Handles keyword search, deck metadata resolution, and media URL assembly.
/// Implements per-client rate limiting and an LRU cache of recent searches.
pub struct ImmersionKitClient {
    http_client: Arc<dyn HttpClient>,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    /// Slug -> display title. `None` until the first fetch attempt;
    /// `Some(empty)` after a failed fetch so we never retry in-session.
    deck_titles: Mutex<Option<HashMap<String, String>>>,
    search_cache: parking_lot::Mutex<LruCache<String, Vec<ExampleSentence>>>,
}

/// Simple rate limiter to enforce delay between requests
struct RateLimiter {
    clock: Arc<dyn Clock>,
    last_request_ms: Option<i64>,
    min_delay: Duration,
}

impl RateLimiter {
    fn new(delay_ms: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last_request_ms: None,
            min_delay: Duration::from_millis(delay_ms),
        }
    }

    async fn wait_if_needed(&mut self) {
        if let Some(last) = self.last_request_ms {
            let now = self.clock.unix_timestamp_millis();
            let elapsed_ms = now - last;
            let required_ms = self.min_delay.as_millis() as i64;
            if elapsed_ms < required_ms {
                let wait_ms = (required_ms - elapsed_ms) as u64;
                let wait_time = Duration::from_millis(wait_ms);
                debug!("Rate limiting: waiting {:?}", wait_time);
                sleep(wait_time).await;
            }
        }
        self.last_request_ms = Some(self.clock.unix_timestamp_millis());
    }
}

/// Raw search result entry as returned by the API
#[derive(Debug, Clone, Deserialize)]
struct RawExample {
    #[serde(default)]
    id: String,
    /// Deck slug
    #[serde(default)]
    title: String,
    #[serde(default)]
    sentence: String,
    #[serde(default)]
    translation: String,
    /// Image filename, empty when the entry has none
    #[serde(default)]
    image: String,
    /// Audio filename, empty when the entry has none
    #[serde(default)]
    sound: String,
}

/// Search response envelope
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    examples: Vec<RawExample>,
}

/// Deck metadata entry from `index_meta`
#[derive(Debug, Deserialize)]
struct DeckMeta {
    #[serde(default)]
    title: String,
}

/// `index_meta` response envelope
#[derive(Debug, Deserialize)]
struct IndexMetaResponse {
    #[serde(default)]
    data: HashMap<String, DeckMeta>,
}

impl ImmersionKitClient {
    /// Creates a new Immersion Kit API client
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client for making requests
    /// * `rate_limit_delay_ms` - Minimum delay between requests in milliseconds
    pub fn new(http_client: Arc<dyn HttpClient>, rate_limit_delay_ms: u64) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self::with_clock(http_client, rate_limit_delay_ms, clock)
    }

    pub fn with_clock(
        http_client: Arc<dyn HttpClient>,
        rate_limit_delay_ms: u64,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            http_client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(rate_limit_delay_ms, clock))),
            deck_titles: Mutex::new(None),
            search_cache: parking_lot::Mutex::new(LruCache::new(
                NonZeroUsize::new(SEARCH_CACHE_SIZE).unwrap(),
            )),
        }
    }

    /// Fetches the deck metadata map, once per client.
    ///
    /// A failed fetch logs and caches an empty map so media URLs fall back
    /// to raw slugs for the rest of the session.
    async fn ensure_deck_titles(&self) -> HashMap<String, String> {
        let mut guard = self.deck_titles.lock().await;
        if let Some(map) = guard.as_ref() {
            return map.clone();
        }

        debug!("Fetching Immersion Kit deck metadata");
        let map = match self.fetch_index_meta().await {
            Ok(map) => {
                info!("Deck metadata fetched: {} decks", map.len());
                map
            }
            Err(e) => {
                warn!("Could not fetch Immersion Kit metadata: {}", e);
                HashMap::new()
            }
        };
        *guard = Some(map.clone());
        map
    }

    async fn fetch_index_meta(&self) -> Result<HashMap<String, String>> {
        let url = format!("{}/index_meta", IMMERSION_KIT_API_BASE);

        self.rate_limiter.lock().await.wait_if_needed().await;

        let request = HttpRequest::new(HttpMethod::Get, url)
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| ExampleError::Network(format!("index_meta fetch failed: {}", e)))?;

        if !response.is_success() {
            return Err(ExampleError::Http {
                status: response.status,
                body: String::from_utf8_lossy(&response.body).to_string(),
            });
        }

        let meta: IndexMetaResponse = serde_json::from_slice(&response.body)
            .map_err(|e| ExampleError::JsonParse(format!("Failed to parse index_meta: {}", e)))?;

        Ok(meta
            .data
            .into_iter()
            .map(|(slug, deck)| (slug, deck.title))
            .collect())
    }

    /// Assembles domain entries from raw results, resolving media URLs.
    fn map_examples(
        raw: Vec<RawExample>,
        deck_titles: &HashMap<String, String>,
    ) -> Vec<ExampleSentence> {
        raw.into_iter()
            .map(|ex| {
                let deck_title = deck_titles
                    .get(&ex.title)
                    .filter(|t| !t.is_empty())
                    .cloned()
                    .unwrap_or_else(|| ex.title.clone());
                let media_type = ex.id.split('_').next().unwrap_or("");
                let image_url = Self::media_url(&ex.image, media_type, &deck_title);
                let sound_url = Self::media_url(&ex.sound, media_type, &deck_title);
                ExampleSentence {
                    id: ex.id,
                    deck_slug: ex.title,
                    deck_title,
                    sentence: ex.sentence,
                    translation: ex.translation,
                    image_url,
                    sound_url,
                }
            })
            .collect()
    }

    fn media_url(filename: &str, media_type: &str, deck_title: &str) -> Option<String> {
        if filename.is_empty() || media_type.is_empty() || deck_title.is_empty() {
            return None;
        }
        Some(format!(
            "{}{}/{}/media/{}",
            MEDIA_BASE, media_type, deck_title, filename
        ))
    }
}

#[async_trait::async_trait]
impl ExampleProvider for ImmersionKitClient {
    async fn search(&self, keyword: &str) -> Result<Vec<ExampleSentence>> {
        if keyword.trim().is_empty() {
            return Err(ExampleError::InvalidKeyword(keyword.to_string()));
        }
        if let Some(cached) = self.search_cache.lock().get(keyword).cloned() {
            debug!("Search cache hit for {:?}", keyword);
            return Ok(cached);
        }

        let deck_titles = self.ensure_deck_titles().await;

        let url = format!(
            "{}/search?q={}&exactMatch=false&limit={}&sort=sentence_length:asc",
            IMMERSION_KIT_API_BASE,
            urlencoding::encode(keyword),
            SEARCH_LIMIT
        );
        debug!("Searching Immersion Kit: {}", url);

        self.rate_limiter.lock().await.wait_if_needed().await;

        let request = HttpRequest::new(HttpMethod::Get, url)
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| ExampleError::Network(format!("Search failed: {}", e)))?;

        // Redirects count as success here, matching the corpus CDN behavior
        if !(200..400).contains(&response.status) {
            return Err(ExampleError::Http {
                status: response.status,
                body: String::from_utf8_lossy(&response.body).to_string(),
            });
        }

        let parsed: SearchResponse = serde_json::from_slice(&response.body)
            .map_err(|e| ExampleError::JsonParse(format!("Failed to parse search results: {}", e)))?;

        let examples = Self::map_examples(parsed.examples, &deck_titles);
        info!("Found {} examples for {:?}", examples.len(), keyword);

        self.search_cache
            .lock()
            .put(keyword.to_string(), examples.clone());
        Ok(examples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::BridgeError;
    use bridge_traits::http::HttpResponse;
    use bytes::Bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves canned bodies keyed by URL substring; records request count.
    struct CannedHttpClient {
        routes: Vec<(&'static str, u16, &'static str)>,
        requests: AtomicUsize,
    }

    impl CannedHttpClient {
        fn new(routes: Vec<(&'static str, u16, &'static str)>) -> Self {
            Self {
                routes,
                requests: AtomicUsize::new(0),
            }
        }

        fn request_count(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl HttpClient for CannedHttpClient {
        async fn execute(
            &self,
            request: HttpRequest,
        ) -> bridge_traits::Result<HttpResponse> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            for (fragment, status, body) in &self.routes {
                if request.url.contains(fragment) {
                    return Ok(HttpResponse {
                        status: *status,
                        headers: HashMap::new(),
                        body: Bytes::from_static(body.as_bytes()),
                    });
                }
            }
            Err(BridgeError::OperationFailed(format!(
                "no route for {}",
                request.url
            )))
        }
    }

    const META_BODY: &str = r#"{"data":{"frieren":{"title":"Sousou no Frieren"}}}"#;
    const SEARCH_BODY: &str = r#"{"examples":[
        {"id":"anime_frieren_1","title":"frieren","sentence":"魔法は想像力の世界だ",
         "translation":"Magic is a world of imagination.","image":"f1.webp","sound":"f1.mp3"},
        {"id":"anime_frieren_2","title":"frieren","sentence":"行こう",
         "translation":"Let's go.","image":"","sound":""}
    ]}"#;

    fn client_with(routes: Vec<(&'static str, u16, &'static str)>) -> ImmersionKitClient {
        // Zero delay keeps the rate limiter out of the way in tests
        ImmersionKitClient::new(Arc::new(CannedHttpClient::new(routes)), 0)
    }

    #[tokio::test]
    async fn search_resolves_media_urls_through_deck_titles() {
        let client = client_with(vec![
            ("index_meta", 200, META_BODY),
            ("search", 200, SEARCH_BODY),
        ]);

        let examples = client.search("魔法").await.unwrap();
        assert_eq!(examples.len(), 2);

        let first = &examples[0];
        assert_eq!(first.deck_title, "Sousou no Frieren");
        assert_eq!(
            first.sound_url.as_deref(),
            Some("https://us-southeast-1.linodeobjects.com/immersionkit/media/anime/Sousou no Frieren/media/f1.mp3")
        );
        assert_eq!(
            first.image_url.as_deref(),
            Some("https://us-southeast-1.linodeobjects.com/immersionkit/media/anime/Sousou no Frieren/media/f1.webp")
        );

        // Entries without media stay in the list but resolve to no URLs
        let second = &examples[1];
        assert!(!second.has_audio());
        assert!(second.image_url.is_none());
    }

    #[tokio::test]
    async fn metadata_failure_degrades_to_slug_and_is_not_retried() {
        let http = Arc::new(CannedHttpClient::new(vec![
            ("index_meta", 500, "oops"),
            ("search", 200, SEARCH_BODY),
        ]));
        let client = ImmersionKitClient::new(http.clone(), 0);

        let examples = client.search("魔法").await.unwrap();
        assert_eq!(examples[0].deck_title, "frieren");
        assert_eq!(
            examples[0].sound_url.as_deref(),
            Some("https://us-southeast-1.linodeobjects.com/immersionkit/media/anime/frieren/media/f1.mp3")
        );

        // meta + search for the first call, search only for the second
        client.search("世界").await.unwrap();
        assert_eq!(http.request_count(), 3);
    }

    #[tokio::test]
    async fn repeated_search_hits_the_cache() {
        let http = Arc::new(CannedHttpClient::new(vec![
            ("index_meta", 200, META_BODY),
            ("search", 200, SEARCH_BODY),
        ]));
        let client = ImmersionKitClient::new(http.clone(), 0);

        client.search("魔法").await.unwrap();
        let before = http.request_count();
        client.search("魔法").await.unwrap();
        assert_eq!(http.request_count(), before);
    }

    #[tokio::test]
    async fn http_error_surfaces_status() {
        let client = client_with(vec![
            ("index_meta", 200, META_BODY),
            ("search", 503, "unavailable"),
        ]);

        match client.search("魔法").await {
            Err(ExampleError::Http { status, .. }) => assert_eq!(status, 503),
            other => panic!("expected Http error, got {:?}", other.map(|v| v.len())),
        }
    }

    #[tokio::test]
    async fn blank_keyword_is_rejected_without_a_request() {
        let http = Arc::new(CannedHttpClient::new(Vec::new()));
        let client = ImmersionKitClient::new(http.clone(), 0);

        assert!(matches!(
            client.search("  ").await,
            Err(ExampleError::InvalidKeyword(_))
        ));
        assert_eq!(http.request_count(), 0);
    }

    #[test]
    fn media_url_requires_all_components() {
        assert!(ImmersionKitClient::media_url("", "anime", "Deck").is_none());
        assert!(ImmersionKitClient::media_url("a.mp3", "", "Deck").is_none());
        assert!(ImmersionKitClient::media_url("a.mp3", "anime", "").is_none());
        assert_eq!(
            ImmersionKitClient::media_url("a.mp3", "anime", "Deck").unwrap(),
            "https://us-southeast-1.linodeobjects.com/immersionkit/media/anime/Deck/media/a.mp3"
        );
    }
}
