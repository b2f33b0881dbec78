//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP, audio) into
//! the study-aid core: the Immersion Kit example provider and the playback
//! sequencer. Desktop apps typically enable the `desktop-shims` feature
//! (which depends on `bridge-desktop`) and call [`bootstrap_desktop`];
//! other hosts assemble [`StudyDependencies`] from their own bridges.

pub mod error;
pub mod logging;

pub use error::{CoreError, Result};

use std::sync::Arc;

use bridge_traits::audio::AudioBackend;
use bridge_traits::http::HttpClient;
use core_examples::{random_word, ExampleProvider};
use core_sequencer::{PlaybackSequencer, SequencerConfig, SequencerEvent};
use tracing::info;

/// Minimum delay between Immersion Kit API requests
const PROVIDER_RATE_LIMIT_MS: u64 = 250;

/// Aggregated handle to the bridge dependencies the core requires.
pub struct StudyDependencies {
    pub http_client: Arc<dyn HttpClient>,
    pub provider: Arc<dyn ExampleProvider>,
    pub audio: Arc<dyn AudioBackend>,
}

impl StudyDependencies {
    /// Construct a dependency bundle from explicit bridge handles.
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        provider: Arc<dyn ExampleProvider>,
        audio: Arc<dyn AudioBackend>,
    ) -> Self {
        Self {
            http_client,
            provider,
            audio,
        }
    }
}

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct StudyService {
    deps: Arc<StudyDependencies>,
    sequencer: PlaybackSequencer,
}

impl StudyService {
    /// Create a new service from the provided dependencies.
    pub fn new(deps: StudyDependencies, config: SequencerConfig) -> Self {
        let deps = Arc::new(deps);
        let sequencer = PlaybackSequencer::new(
            Arc::clone(&deps.provider),
            Arc::clone(&deps.audio),
            config,
        );
        Self { deps, sequencer }
    }

    /// Access the bridge dependencies being used by the service.
    pub fn dependencies(&self) -> Arc<StudyDependencies> {
        Arc::clone(&self.deps)
    }

    /// The playback sequencer driving example review.
    pub fn sequencer(&self) -> PlaybackSequencer {
        self.sequencer.clone()
    }

    /// Subscribe to sequencer events for rendering.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<SequencerEvent> {
        self.sequencer.subscribe()
    }

    /// Look up examples for a keyword and start reviewing them.
    pub async fn lookup(&self, keyword: &str) -> Result<()> {
        self.sequencer.load_keyword(keyword).await?;
        Ok(())
    }

    /// Look up examples for a random built-in study word.
    pub async fn lookup_random(&self) -> Result<()> {
        let word = random_word(&mut rand::thread_rng()).ok_or(CoreError::NoRandomWords)?;
        info!("Random word lookup: {}", word);
        self.lookup(word).await
    }

    /// Stop playback and tear down background work.
    pub fn shutdown(&self) {
        self.sequencer.shutdown();
    }
}

/// Convenience bootstrapper for desktop hosts.
///
/// Builds the reqwest HTTP client, the rodio audio backend, and the
/// Immersion Kit provider, then assembles the service around them.
///
/// # Errors
///
/// Fails with [`CoreError::InitializationFailed`] when no audio output
/// device is available.
#[cfg(feature = "desktop-shims")]
pub fn bootstrap_desktop() -> Result<StudyService> {
    use bridge_desktop::{ReqwestHttpClient, RodioAudioBackend};
    use core_examples::ImmersionKitClient;

    let http_client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    let provider: Arc<dyn ExampleProvider> = Arc::new(ImmersionKitClient::new(
        Arc::clone(&http_client),
        PROVIDER_RATE_LIMIT_MS,
    ));
    let audio: Arc<dyn AudioBackend> = Arc::new(
        RodioAudioBackend::new(Arc::clone(&http_client))
            .map_err(|e| CoreError::InitializationFailed(e.to_string()))?,
    );

    Ok(StudyService::new(
        StudyDependencies::new(http_client, provider, audio),
        SequencerConfig::default(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::audio::PlayableHandle;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::http::{HttpRequest, HttpResponse};
    use core_examples::{ExampleSentence, RANDOM_WORDS};
    use mockall::mock;
    use mockall::predicate::function;

    mock! {
        Provider {}

        #[async_trait]
        impl ExampleProvider for Provider {
            async fn search(&self, keyword: &str) -> core_examples::Result<Vec<ExampleSentence>>;
        }
    }

    struct NoopHttp;

    #[async_trait]
    impl HttpClient for NoopHttp {
        async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
            Err(BridgeError::NotAvailable(request.url))
        }
    }

    struct NoopAudio;

    #[async_trait]
    impl AudioBackend for NoopAudio {
        async fn fetch_and_decode(&self, url: &str) -> BridgeResult<Box<dyn PlayableHandle>> {
            Err(BridgeError::NotAvailable(url.to_string()))
        }
    }

    fn service_with(provider: MockProvider) -> StudyService {
        StudyService::new(
            StudyDependencies::new(
                Arc::new(NoopHttp),
                Arc::new(provider),
                Arc::new(NoopAudio),
            ),
            SequencerConfig::instant(),
        )
    }

    #[tokio::test]
    async fn lookup_random_searches_a_builtin_word() {
        let mut provider = MockProvider::new();
        provider
            .expect_search()
            .with(function(|keyword: &str| {
                RANDOM_WORDS.contains(&keyword)
            }))
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let service = service_with(provider);
        service.lookup_random().await.unwrap();
    }

    #[tokio::test]
    async fn lookup_delegates_sanitized_keyword() {
        let mut provider = MockProvider::new();
        provider
            .expect_search()
            .with(mockall::predicate::eq("魔法"))
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let service = service_with(provider);
        // Latin decorations are stripped before the provider sees the keyword
        service.lookup("魔法(magic)").await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_blocks_further_lookups() {
        let service = service_with(MockProvider::new());
        service.shutdown();
        assert!(matches!(
            service.lookup("魔法").await,
            Err(CoreError::Sequencer(_))
        ));
    }
}
