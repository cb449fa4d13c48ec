use serde::{Deserialize, Serialize};

/// Snapshot of the stream connection as seen by the rest of the application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConnectionState {
    /// URL of the event stream; kept after a disconnect for later reuse.
    pub url: String,
    /// Whether the stream is currently open.
    pub connected: bool,
    /// Number of reconnect attempts scheduled since the last successful open.
    pub reconnect_attempts: u32,
}
