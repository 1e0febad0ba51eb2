//! Audio source abstraction and HTTP stream implementation
//!
//! The controller treats the station stream as an opaque resource
//! reachable by URL: attach it, wait for a readiness or error event, then
//! play/pause it. `HttpAudioSource` is the production implementation;
//! tests substitute a mock behind the same trait.

use crate::error::PlaybackError;
use crate::playback::session::SessionId;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

/// What happened to the attached resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEventKind {
    /// The resource is playable
    Ready,
    /// The resource failed (network, decode, unsupported source)
    Error(String),
}

/// Resource lifecycle event, tagged with the session that attached it
///
/// The tag lets the controller discard events from superseded sessions.
#[derive(Debug, Clone)]
pub struct SourceEvent {
    pub session: SessionId,
    pub kind: SourceEventKind,
}

/// The single audio resource owned by the controller
///
/// `attach` begins loading and delivers a `Ready` event once the resource
/// is playable, or an `Error` event when loading or the live stream fails.
/// `detach` tears down the connection and all event bindings so a delayed
/// event from an old resource can never fire against new state.
#[async_trait]
pub trait AudioSource: Send {
    /// Begin loading `url` for `session`; events are tagged with the session
    async fn attach(&mut self, url: &str, session: SessionId, events: mpsc::Sender<SourceEvent>);

    /// Tear down the connection and event bindings; idempotent
    async fn detach(&mut self);

    /// Start producing audio; fails when the resource refuses to start
    async fn play(&mut self) -> Result<(), PlaybackError>;

    /// Suspend audio without tearing down the connection
    async fn pause(&mut self);

    /// Resume after a pause
    async fn resume(&mut self);

    /// Apply master volume (0.0-1.0)
    fn set_volume(&mut self, volume: f32);
}

/// Connect timeout for the initial stream request
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP byte-stream source
///
/// Issues a GET against the stream URL; readiness is reported once a
/// success status arrives, after which the reader task keeps draining the
/// body so the server holds the stream open. Pausing gates the reader
/// without dropping the connection. No decoding happens here: the bytes
/// are opaque and the volume setting is carried for the output sink seam.
pub struct HttpAudioSource {
    client: reqwest::Client,
    volume: f32,
    paused: Option<watch::Sender<bool>>,
    reader: Option<JoinHandle<()>>,
}

impl HttpAudioSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            volume: 1.0,
            paused: None,
            reader: None,
        }
    }

    /// Master volume carried for the output sink seam
    pub fn volume(&self) -> f32 {
        self.volume
    }

    fn teardown(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        self.paused = None;
    }
}

impl Default for HttpAudioSource {
    fn default() -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("wavehop/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self::new(client)
    }
}

#[async_trait]
impl AudioSource for HttpAudioSource {
    async fn attach(&mut self, url: &str, session: SessionId, events: mpsc::Sender<SourceEvent>) {
        // One connection at a time
        self.teardown();

        let (paused_tx, paused_rx) = watch::channel(false);
        self.paused = Some(paused_tx);

        let client = self.client.clone();
        let url = url.to_string();
        self.reader = Some(tokio::spawn(async move {
            stream_bytes(&client, &url, session, paused_rx, events).await;
        }));
    }

    async fn detach(&mut self) {
        self.teardown();
    }

    async fn play(&mut self) -> Result<(), PlaybackError> {
        match &self.paused {
            Some(paused) => {
                let _ = paused.send(false);
                Ok(())
            }
            None => Err(PlaybackError::PlayRejected("no source attached".to_string())),
        }
    }

    async fn pause(&mut self) {
        if let Some(paused) = &self.paused {
            let _ = paused.send(true);
        }
    }

    async fn resume(&mut self) {
        if let Some(paused) = &self.paused {
            let _ = paused.send(false);
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }
}

/// Connect, report readiness, then drain the stream until it fails
///
/// Sends `Ready` once a success status arrives, then an `Error` if the
/// body ends or fails. Radio streams are endless, so a clean EOF is still
/// abnormal. All events carry the attaching session's id; the controller
/// drops them if the session has been superseded.
async fn stream_bytes(
    client: &reqwest::Client,
    url: &str,
    session: SessionId,
    mut paused: watch::Receiver<bool>,
    events: mpsc::Sender<SourceEvent>,
) {
    let send = |kind: SourceEventKind| {
        let events = events.clone();
        async move {
            if events.send(SourceEvent { session, kind }).await.is_err() {
                debug!("source event channel closed for session {}", session);
            }
        }
    };

    let mut response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            send(SourceEventKind::Error(format!("connect failed: {e}"))).await;
            return;
        }
    };

    let status = response.status();
    if !status.is_success() {
        send(SourceEventKind::Error(format!("stream returned HTTP {status}"))).await;
        return;
    }

    send(SourceEventKind::Ready).await;

    loop {
        // Hold the reader while paused; the connection stays open
        while *paused.borrow() {
            if paused.changed().await.is_err() {
                return;
            }
        }

        match response.chunk().await {
            Ok(Some(_bytes)) => {}
            Ok(None) => {
                send(SourceEventKind::Error("stream ended".to_string())).await;
                return;
            }
            Err(e) => {
                send(SourceEventKind::Error(format!("stream failed: {e}"))).await;
                return;
            }
        }
    }
}
