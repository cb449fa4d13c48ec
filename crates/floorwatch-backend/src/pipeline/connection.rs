//! Lifecycle of the event stream connection.
//!
//! The manager never spawns tasks. Its owner polls [`ConnectionManager::next_event`]
//! (usually inside a `select!` loop) and hands the result back to
//! [`ConnectionManager::handle_lost`] or [`ConnectionManager::reconnect`].
//! Connection attempts are resolved by `next_event` as well, so the owner keeps
//! serving other work while the server is slow to answer.

use std::{sync::Arc, time::Duration};

use floorwatch_bridge::{config::ReconnectConfig, connection::ConnectionState};
use futures_util::{StreamExt, future::BoxFuture};
use tokio::time::Instant;

use crate::transport::{FrameStream, SseFrame, Transport, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    Disconnected,
    /// An open is in flight.
    Connecting,
    Open,
    /// The stream failed; a reconnect is about to be scheduled.
    Errored,
    /// Waiting for the reconnect deadline.
    Reconnecting,
}

/// Exponential backoff for automatic reconnects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    /// Bound on a single open.
    pub open_timeout: Duration,
}

impl ReconnectPolicy {
    /// Delay before the reconnect that follows `attempts` earlier ones.
    pub fn delay_for(&self, attempts: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempts))
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::from(&ReconnectConfig::default())
    }
}

impl From<&ReconnectConfig> for ReconnectPolicy {
    fn from(config: &ReconnectConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay: Duration::from_millis(config.base_delay_ms),
            open_timeout: Duration::from_millis(config.open_timeout_ms),
        }
    }
}

/// Something the owner of the connection has to react to.
#[derive(Debug)]
pub enum ConnectionEvent {
    /// The in-flight open succeeded; the stream is live.
    Opened,
    /// The in-flight open failed; a reconnect is already scheduled if any
    /// attempts are left.
    OpenFailed(TransportError),
    Frame(SseFrame),
    /// The stream failed or was closed by the server.
    Lost(TransportError),
    /// The reconnect deadline has passed.
    ReconnectDue,
}

#[derive(Debug, Clone, Copy)]
struct PendingReconnect {
    deadline: Instant,
    delay: Duration,
}

type OpenFuture = BoxFuture<'static, Result<FrameStream, TransportError>>;

pub struct ConnectionManager<T> {
    transport: Arc<T>,
    policy: ReconnectPolicy,
    url: Option<String>,
    phase: ConnectionPhase,
    attempts: u32,
    opening: Option<OpenFuture>,
    stream: Option<FrameStream>,
    pending: Option<PendingReconnect>,
}

impl<T: Transport> ConnectionManager<T> {
    pub fn new(transport: T, policy: ReconnectPolicy) -> Self {
        Self {
            transport: Arc::new(transport),
            policy,
            url: None,
            phase: ConnectionPhase::Disconnected,
            attempts: 0,
            opening: None,
            stream: None,
            pending: None,
        }
    }

    /// Starts a fresh connection to `url`, dropping any current stream, open
    /// or pending reconnect first. Resets the attempt counter.
    pub fn connect(&mut self, url: &str) {
        self.teardown();
        self.url = Some(url.to_string());
        self.attempts = 0;
        self.start_open();
    }

    /// Reopens the stored URL without resetting the attempt counter.
    pub fn reconnect(&mut self) {
        self.pending = None;
        if self.url.is_none() {
            self.phase = ConnectionPhase::Disconnected;
            return;
        }
        log::info!("Reconnecting (attempt {}/{})", self.attempts, self.policy.max_attempts);
        self.start_open();
    }

    /// Closes the stream and cancels any in-flight open or pending reconnect.
    /// The URL is kept.
    pub fn disconnect(&mut self) {
        if self.phase != ConnectionPhase::Disconnected {
            log::info!("Disconnecting from event stream");
        }
        self.teardown();
        self.phase = ConnectionPhase::Disconnected;
    }

    /// Marks the open stream as failed and schedules a reconnect.
    pub fn handle_lost(&mut self, error: TransportError) {
        log::error!("Event stream connection lost: {error}");
        self.fail();
    }

    /// Waits for the in-flight open to settle, the next frame, a stream
    /// failure or the reconnect deadline.
    ///
    /// Cancel safe. Pends forever while there is nothing to wait for.
    pub async fn next_event(&mut self) -> ConnectionEvent {
        if let Some(opening) = self.opening.as_mut() {
            let result = opening.await;
            self.opening = None;
            return self.finish_open(result);
        }

        if let Some(stream) = self.stream.as_mut() {
            return match stream.next().await {
                Some(Ok(frame)) => ConnectionEvent::Frame(frame),
                Some(Err(error)) => ConnectionEvent::Lost(error),
                None => ConnectionEvent::Lost(TransportError::Closed),
            };
        }

        if let Some(pending) = self.pending {
            tokio::time::sleep_until(pending.deadline).await;
            return ConnectionEvent::ReconnectDue;
        }

        std::future::pending().await
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState {
            url: self.url.clone().unwrap_or_default(),
            connected: self.is_connected(),
            reconnect_attempts: self.attempts,
        }
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.phase
    }

    pub fn is_connected(&self) -> bool {
        self.phase == ConnectionPhase::Open
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Delay of the currently pending reconnect, if any.
    pub fn scheduled_reconnect(&self) -> Option<Duration> {
        self.pending.map(|pending| pending.delay)
    }

    fn start_open(&mut self) {
        let Some(url) = self.url.clone() else {
            return;
        };

        let transport = Arc::clone(&self.transport);
        let timeout = self.policy.open_timeout;
        self.opening = Some(Box::pin(async move {
            match tokio::time::timeout(timeout, transport.open(&url)).await {
                Ok(result) => result,
                Err(_) => Err(TransportError::Timeout(timeout)),
            }
        }));
        self.phase = ConnectionPhase::Connecting;
    }

    fn finish_open(&mut self, result: Result<FrameStream, TransportError>) -> ConnectionEvent {
        let url = self.url.as_deref().unwrap_or_default();
        match result {
            Ok(stream) => {
                log::info!("Connected to event stream at {url}");
                self.stream = Some(stream);
                self.phase = ConnectionPhase::Open;
                self.attempts = 0;
                ConnectionEvent::Opened
            }
            Err(error) => {
                log::error!("Failed to connect to {url}: {error}");
                self.fail();
                ConnectionEvent::OpenFailed(error)
            }
        }
    }

    fn fail(&mut self) {
        self.stream = None;
        self.phase = ConnectionPhase::Errored;
        self.schedule_reconnect();
    }

    fn schedule_reconnect(&mut self) {
        if self.attempts >= self.policy.max_attempts {
            log::error!(
                "Giving up after {} reconnect attempts; connect again to retry",
                self.attempts
            );
            self.pending = None;
            self.phase = ConnectionPhase::Disconnected;
            return;
        }

        let delay = self.policy.delay_for(self.attempts);
        self.attempts += 1;
        log::info!(
            "Reconnecting in {delay:?} (attempt {}/{})",
            self.attempts,
            self.policy.max_attempts
        );
        self.pending = Some(PendingReconnect {
            deadline: Instant::now() + delay,
            delay,
        });
        self.phase = ConnectionPhase::Reconnecting;
    }

    fn teardown(&mut self) {
        self.opening = None;
        self.stream = None;
        self.pending = None;
    }
}
