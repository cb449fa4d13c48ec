//! Server-sent event transport.
//!
//! A [`Transport`] opens a long-lived stream and yields decoded
//! [`SseFrame`]s until the server closes it or the connection fails.

mod http;
mod sse;

use std::{pin::Pin, sync::Arc, time::Duration};

use async_trait::async_trait;
use futures_util::Stream;

pub use http::HttpEventSource;
pub use sse::SseDecoder;

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SseFrame {
    /// Event name; `None` for the default `message` event.
    pub event: Option<String>,
    /// Payload, with multi-line data joined by `\n`.
    pub data: String,
    /// Last event id seen on the stream.
    pub id: Option<String>,
}

impl SseFrame {
    pub fn new(event: Option<&str>, data: impl Into<String>) -> Self {
        Self {
            event: event.map(str::to_string),
            data: data.into(),
            id: None,
        }
    }
}

/// Errors that can occur while opening or reading the event stream.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("event stream request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("event stream answered with status {0}")]
    Status(reqwest::StatusCode),
    #[error("event stream closed by the server")]
    Closed,
    #[error("event stream unavailable: {0}")]
    Unavailable(String),
    #[error("event stream did not answer within {0:?}")]
    Timeout(Duration),
}

/// Frames of an open stream. The stream ends when the server closes it.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<SseFrame, TransportError>> + Send>>;

/// Opens event streams.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn open(&self, url: &str) -> Result<FrameStream, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn open(&self, url: &str) -> Result<FrameStream, TransportError> {
        (**self).open(url).await
    }
}
