//! Audio Backend Implementation using Rodio
//!
//! Fetches media over the bridge HTTP client and decodes it with rodio.
//! `rodio::OutputStream` is not `Send`, so the stream lives on a dedicated
//! thread for the lifetime of the backend; only the `OutputStreamHandle`
//! (which is `Send + Sync`) crosses into async code. Each decoded clip gets
//! its own paused `Sink` that the sequencer makes audible via `start`.

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bridge_traits::audio::{AudioBackend, PlaybackEnd, PlayableHandle};
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::http::{HttpClient, HttpRequest, RetryPolicy};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::{debug, warn};

/// Interval for polling sink drain state
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Referer/Origin sent with media fetches; the CDN rejects anonymous
/// requests for some decks
const MEDIA_REFERER: &str = "https://jpdb.io/";

/// Rodio-based audio backend.
///
/// Holds the audio device open for its whole lifetime so consecutive clips
/// do not pay device setup cost. Dropping the backend releases the device.
pub struct RodioAudioBackend {
    http_client: Arc<dyn HttpClient>,
    stream_handle: OutputStreamHandle,
    // Dropping this sender unparks the stream thread and lets it exit
    _keepalive: mpsc::Sender<()>,
}

impl RodioAudioBackend {
    /// Opens the default audio output device.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::AudioDevice`] when no output device is
    /// available (headless hosts, missing drivers).
    pub fn new(http_client: Arc<dyn HttpClient>) -> Result<Self> {
        let (handle_tx, handle_rx) = mpsc::channel();
        let (keepalive_tx, keepalive_rx) = mpsc::channel::<()>();

        std::thread::Builder::new()
            .name("rodio-output".to_string())
            .spawn(move || {
                match OutputStream::try_default() {
                    Ok((stream, handle)) => {
                        if handle_tx.send(Ok(handle)).is_err() {
                            return;
                        }
                        // Keep the stream alive until the backend drops
                        let _stream = stream;
                        let _ = keepalive_rx.recv();
                        debug!("Audio output thread shutting down");
                    }
                    Err(e) => {
                        let _ = handle_tx.send(Err(e));
                    }
                }
            })
            .map_err(|e| BridgeError::AudioDevice(format!("spawn failed: {}", e)))?;

        let stream_handle = handle_rx
            .recv()
            .map_err(|_| BridgeError::AudioDevice("output thread died".to_string()))?
            .map_err(|e| BridgeError::AudioDevice(e.to_string()))?;

        Ok(Self {
            http_client,
            stream_handle,
            _keepalive: keepalive_tx,
        })
    }
}

#[async_trait]
impl AudioBackend for RodioAudioBackend {
    async fn fetch_and_decode(&self, url: &str) -> Result<Box<dyn PlayableHandle>> {
        let request = HttpRequest::get(url)
            .header("Referer", MEDIA_REFERER)
            .header("Origin", MEDIA_REFERER)
            .timeout(Duration::from_secs(30));

        // The sequencer supersedes stale requests itself, no retry here
        let response = self
            .http_client
            .execute_with_retry(request, RetryPolicy::none())
            .await?;
        if !response.is_success() {
            warn!(status = response.status, url, "Media fetch failed");
            return Err(BridgeError::Http {
                status: response.status,
                message: format!("media fetch failed for {}", url),
            });
        }

        let cursor = Cursor::new(response.body.to_vec());
        let source = Decoder::new(cursor).map_err(|e| BridgeError::Decode(e.to_string()))?;

        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| BridgeError::AudioDevice(e.to_string()))?;
        sink.pause();
        sink.append(source);

        Ok(Box::new(RodioHandle {
            sink,
            started: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
        }))
    }
}

/// One decoded clip queued on its own paused sink.
struct RodioHandle {
    sink: Sink,
    started: AtomicBool,
    stopped: AtomicBool,
}

#[async_trait]
impl PlayableHandle for RodioHandle {
    fn start(&self) {
        if !self.started.swap(true, Ordering::SeqCst) && !self.stopped.load(Ordering::SeqCst) {
            self.sink.play();
        }
    }

    fn stop(&self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            self.sink.stop();
        }
    }

    async fn wait_until_end(&self) -> PlaybackEnd {
        // Sink::sleep_until_end blocks a thread, poll instead
        loop {
            if self.stopped.load(Ordering::SeqCst) {
                return PlaybackEnd::Stopped;
            }
            if self.started.load(Ordering::SeqCst) && self.sink.empty() {
                return PlaybackEnd::Natural;
            }
            tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
        }
    }
}
