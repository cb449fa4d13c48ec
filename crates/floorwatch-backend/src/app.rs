//! Application context and message dispatching utilities.
//!
//! The context owns the pipeline and the backend state, multiplexes bridge
//! commands with connection events, and pushes state changes back to the
//! host.

use floorwatch_bridge::{MessageFromBackend, MessageToBackend};
use tokio::sync::mpsc::{Receiver, Sender};

use crate::pipeline::NotificationPipeline;
use crate::services;
use crate::state::State;
use crate::transport::Transport;

/// Everything the backend task works on. Services receive it mutably.
pub(crate) struct AppContext<T> {
    pub state: State,
    pub pipeline: NotificationPipeline<T>,
    /// Outbound channel to the host.
    pub tx: Sender<MessageFromBackend>,
}

impl<T: Transport> AppContext<T> {
    /// Handles bridge commands and connection events until the host drops its
    /// end of the bridge.
    pub async fn run(&mut self, mut rx: Receiver<MessageToBackend>) {
        self.publish_changes().await;

        loop {
            tokio::select! {
                message = rx.recv() => {
                    let Some(message) = message else {
                        log::info!("Bridge closed, stopping backend");
                        break;
                    };
                    log::debug!("Got a host message: {message:?}");
                    self.dispatch_message(message).await;
                }
                event = self.pipeline.next_event() => {
                    self.pipeline.handle_event(event).await;
                }
            }

            self.publish_changes().await;
        }

        self.pipeline.disconnect();
    }

    /// Dispatches the received message from the host down to individual
    /// service handlers.
    async fn dispatch_message(&mut self, message: MessageToBackend) {
        match message {
            MessageToBackend::Connect(url) => {
                services::connection_service::handle_connect(self, url).await;
            }
            MessageToBackend::Disconnect => {
                services::connection_service::handle_disconnect(self);
            }
            MessageToBackend::MarkAsRead(id) => {
                services::notification_service::handle_mark_as_read(self, &id);
            }
            MessageToBackend::MarkAllAsRead => {
                services::notification_service::handle_mark_all_as_read(self);
            }
            MessageToBackend::RemoveNotification(id) => {
                services::notification_service::handle_remove(self, &id);
            }
            MessageToBackend::ClearAll => {
                services::notification_service::handle_clear_all(self);
            }
            MessageToBackend::NotificationRequest(id) => {
                services::notification_service::handle_notification_request(self, &id).await;
            }
            MessageToBackend::UnreadCountRequest => {
                services::notification_service::handle_unread_count_request(self).await;
            }
            MessageToBackend::SimulateNotification(payload) => {
                services::notification_service::handle_simulate(self, payload).await;
            }
            MessageToBackend::PushReceived { title, body } => {
                services::notification_service::handle_push_received(self, &title, &body).await;
            }
            MessageToBackend::PermissionRequest => {
                services::notification_service::handle_permission_request(self).await;
            }
            MessageToBackend::ConfigurationRequest => {
                services::config_service::handle_config_request(self).await;
            }
        }
    }

    /// Send a message to the host. Messages are dropped once the host is gone.
    pub async fn send(&self, message: MessageFromBackend) {
        if let Err(error) = self.tx.send(message).await {
            log::warn!("Failed to send message to host: {error}");
        }
    }

    /// Sends the notification list and the connection state to the host if
    /// they changed since they were last sent.
    async fn publish_changes(&mut self) {
        let revision = self.pipeline.store().revision();
        if self.state.published_revision != Some(revision) {
            self.state.published_revision = Some(revision);
            self.send(MessageFromBackend::NotificationsUpdated(
                self.pipeline.notifications(),
            ))
            .await;
        }

        let connection = self.pipeline.connection_state();
        if self.state.published_connection.as_ref() != Some(&connection) {
            self.state.published_connection = Some(connection.clone());
            self.send(MessageFromBackend::ConnectionUpdated(connection))
                .await;
        }
    }
}
