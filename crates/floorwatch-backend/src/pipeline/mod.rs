//! The notification pipeline: event stream in, stored and presented records
//! out.
//!
//! [`NotificationPipeline`] owns the connection, the store and the
//! presentation dispatcher. It is driven by a single task which alternates
//! between [`NotificationPipeline::next_event`] and
//! [`NotificationPipeline::handle_event`], so frames are handled one at a time
//! and in arrival order.

pub mod classifier;
pub mod connection;
pub mod store;

use floorwatch_bridge::{
    connection::ConnectionState,
    notification::{NotificationRecord, NotificationType, RawEventPayload},
};
use floorwatch_presenter::PresentationDispatcher;

use crate::transport::{SseFrame, Transport};
use classifier::{Classified, EventChannel};
use connection::{ConnectionEvent, ConnectionManager, ReconnectPolicy};
use store::NotificationStore;

const SIMULATED_TITLE: &str = "Test Notification";
const SIMULATED_MESSAGE: &str = "This is a simulated notification for testing";

pub struct NotificationPipeline<T> {
    connection: ConnectionManager<T>,
    store: NotificationStore,
    dispatcher: PresentationDispatcher,
}

impl<T: Transport> NotificationPipeline<T> {
    pub fn new(transport: T, policy: ReconnectPolicy, dispatcher: PresentationDispatcher) -> Self {
        Self {
            connection: ConnectionManager::new(transport, policy),
            store: NotificationStore::new(),
            dispatcher,
        }
    }

    /// Starts connecting to `url`. The open settles in a later
    /// [`Self::next_event`].
    pub fn connect(&mut self, url: &str) {
        self.connection.connect(url);
    }

    pub fn disconnect(&mut self) {
        self.connection.disconnect();
    }

    /// See [`ConnectionManager::next_event`].
    pub async fn next_event(&mut self) -> ConnectionEvent {
        self.connection.next_event().await
    }

    /// Reacts to a connection event. Returns the id of the stored record when
    /// a frame produced one.
    pub async fn handle_event(&mut self, event: ConnectionEvent) -> Option<String> {
        match event {
            ConnectionEvent::Opened | ConnectionEvent::OpenFailed(_) => None,
            ConnectionEvent::Frame(frame) => self.handle_frame(frame).await,
            ConnectionEvent::Lost(error) => {
                self.connection.handle_lost(error);
                None
            }
            ConnectionEvent::ReconnectDue => {
                self.connection.reconnect();
                None
            }
        }
    }

    /// Classifies one frame; stores and presents it if it is a notification.
    pub async fn handle_frame(&mut self, frame: SseFrame) -> Option<String> {
        let channel = EventChannel::from_event_name(frame.event.as_deref());
        if let EventChannel::Unhandled(name) = &channel {
            log::debug!("Ignoring event on unhandled channel `{name}`");
            return None;
        }
        if channel.is_control() {
            log::debug!("Dropping {channel} keep-alive");
            return None;
        }

        match classifier::classify(&frame.data) {
            Ok(Classified::Control) => {
                log::debug!("Dropping control message on {channel}");
                None
            }
            Ok(Classified::Event(payload)) => {
                let record = classifier::to_record(payload, channel.type_override());
                Some(self.ingest(record).await)
            }
            Err(error) => {
                log::warn!("Dropping {channel} event: {error}");
                None
            }
        }
    }

    /// Adds `record` at the head of the store and presents it.
    pub async fn ingest(&mut self, record: NotificationRecord) -> String {
        let id = record.id.clone();
        log::info!(
            "New {} notification {id}: {}",
            record.notification_type,
            record.title
        );
        self.store.add(record.clone());
        self.dispatcher.dispatch(&record).await;
        id
    }

    /// Turns a remote push received in the foreground into an info record.
    pub async fn ingest_push(&mut self, title: &str, body: &str) -> Option<String> {
        if title.trim().is_empty() || body.trim().is_empty() {
            log::warn!("Ignoring push notification without title or body");
            return None;
        }

        let payload = RawEventPayload {
            title: title.to_string(),
            message: body.to_string(),
            ..Default::default()
        };
        let record = classifier::to_record(payload, Some(NotificationType::Info));
        Some(self.ingest(record).await)
    }

    /// Injects a synthetic payload through the regular ingestion path. Empty
    /// titles and messages are replaced by placeholder text.
    pub async fn simulate_notification(&mut self, mut payload: RawEventPayload) -> String {
        if payload.title.trim().is_empty() {
            payload.title = SIMULATED_TITLE.to_string();
        }
        if payload.message.trim().is_empty() {
            payload.message = SIMULATED_MESSAGE.to_string();
        }
        let record = classifier::to_record(payload, None);
        self.ingest(record).await
    }

    pub fn mark_as_read(&mut self, id: &str) {
        self.store.mark_read(id);
    }

    pub fn mark_all_as_read(&mut self) {
        self.store.mark_all_read();
    }

    pub fn remove_notification(&mut self, id: &str) {
        self.store.remove(id);
    }

    pub fn clear_all(&mut self) {
        self.store.clear();
    }

    pub fn notification_by_id(&self, id: &str) -> Option<&NotificationRecord> {
        self.store.find_by_id(id)
    }

    pub fn unread_count(&self) -> usize {
        self.store.unread_count()
    }

    /// Snapshot of all records, newest first.
    pub fn notifications(&self) -> Vec<NotificationRecord> {
        self.store.snapshot()
    }

    pub fn store(&self) -> &NotificationStore {
        &self.store
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    pub fn current_url(&self) -> Option<&str> {
        self.connection.url()
    }

    pub fn connection(&self) -> &ConnectionManager<T> {
        &self.connection
    }

    pub fn dispatcher(&self) -> &PresentationDispatcher {
        &self.dispatcher
    }
}
