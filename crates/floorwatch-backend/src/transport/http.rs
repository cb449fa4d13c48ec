use async_trait::async_trait;
use futures_util::{StreamExt, stream};
use reqwest::header::{ACCEPT, CACHE_CONTROL};

use super::{FrameStream, SseDecoder, Transport, TransportError};

/// Event stream over HTTP, backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpEventSource {
    client: reqwest::Client,
}

impl HttpEventSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpEventSource {
    async fn open(&self, url: &str) -> Result<FrameStream, TransportError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status));
        }

        let mut decoder = SseDecoder::new();
        let frames = response
            .bytes_stream()
            .map(move |chunk| match chunk {
                Ok(bytes) => decoder.feed(&bytes).into_iter().map(Ok).collect::<Vec<_>>(),
                Err(error) => vec![Err(TransportError::Request(error.without_url()))],
            })
            .flat_map(stream::iter);

        Ok(Box::pin(frames))
    }
}
