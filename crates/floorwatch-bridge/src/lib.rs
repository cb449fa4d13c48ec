//! Communication bridge between the notification pipeline and its host.
//!
//! This crate defines the types and protocols used to connect a user
//! interface with the asynchronous backend that owns the event stream, the
//! notification list and the presentation channels.
//!
//! The design is deliberately lightweight and unidirectional:
//! - The host sends commands (e.g., connect, mark as read, clear all).
//! - The backend pushes events (e.g., the updated notification list,
//!   connection changes, navigation requests).
//!
//! Communication happens over bounded [`tokio::sync::mpsc`] channels wrapped
//! in [`BridgeChannels`], providing back-pressure, async compatibility, and
//! clean separation of concerns.

pub mod config;
pub mod connection;
pub mod navigation;
pub mod notification;

use tokio::sync::mpsc::{self, Receiver, Sender};

/// Messages emitted by the backend to inform the host of state updates.
#[derive(Debug, Clone)]
pub enum MessageFromBackend {
    /// The full notification list, newest first. Sent after every change.
    NotificationsUpdated(Vec<notification::NotificationRecord>),
    /// The connection flag, URL or attempt counter changed.
    ConnectionUpdated(connection::ConnectionState),
    /// Response to [`MessageToBackend::NotificationRequest`].
    NotificationResponse(Option<notification::NotificationRecord>),
    /// Response to [`MessageToBackend::UnreadCountRequest`].
    UnreadCountResponse(usize),
    /// Response to the configuration request from the host.
    ConfigurationResponse(config::Config),
    /// Response to [`MessageToBackend::PermissionRequest`]; `true` if granted.
    PermissionResponse(bool),
    /// A presented notification was activated and the UI should navigate.
    NavigationRequest(navigation::Route),
}

/// Commands issued by the host to control or query the backend.
#[derive(Debug, Clone)]
pub enum MessageToBackend {
    /// Open (or reopen) the event stream at the given URL.
    Connect(String),
    /// Close the event stream and cancel any pending reconnect.
    Disconnect,
    MarkAsRead(String),
    MarkAllAsRead,
    RemoveNotification(String),
    ClearAll,
    /// Look up a single notification by id.
    NotificationRequest(String),
    UnreadCountRequest,
    /// Request for the application configuration.
    ConfigurationRequest,
    /// Ask the user for permission on the active presentation channel.
    PermissionRequest,
    /// Inject a synthetic event as if it came from the stream.
    SimulateNotification(notification::RawEventPayload),
    /// A remote push notification reached the device while the app is open.
    PushReceived { title: String, body: String },
}

/// Paired `tokio::mpsc` channels for bidirectional communication between
/// host and backend.
pub struct BridgeChannels {
    /// Receiver used by the host to get messages from the backend.
    pub frontend_rx: Receiver<MessageFromBackend>,
    /// Sender used by the host to send commands to the backend.
    pub frontend_tx: Sender<MessageToBackend>,

    /// Receiver used by the backend to get commands from the host.
    pub backend_rx: Receiver<MessageToBackend>,
    /// Sender used by the backend to send events/responses to the host.
    pub backend_tx: Sender<MessageFromBackend>,
}

impl BridgeChannels {
    /// Creates a new pair of bridged channels with the given buffer capacity.
    pub fn new(buffer: usize) -> Self {
        let (to_backend_tx, to_backend_rx) = mpsc::channel(buffer);
        let (to_frontend_tx, to_frontend_rx) = mpsc::channel(buffer);
        Self {
            frontend_tx: to_backend_tx,
            frontend_rx: to_frontend_rx,
            backend_rx: to_backend_rx,
            backend_tx: to_frontend_tx,
        }
    }
}

impl Default for BridgeChannels {
    fn default() -> Self {
        Self::new(64)
    }
}
