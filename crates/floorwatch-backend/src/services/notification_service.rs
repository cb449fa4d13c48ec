use floorwatch_bridge::{MessageFromBackend, notification::RawEventPayload};

use super::AppContextHandle;
use crate::transport::Transport;

pub fn handle_mark_as_read<T: Transport>(context: AppContextHandle<'_, T>, id: &str) {
    context.pipeline.mark_as_read(id);
}

pub fn handle_mark_all_as_read<T: Transport>(context: AppContextHandle<'_, T>) {
    context.pipeline.mark_all_as_read();
}

pub fn handle_remove<T: Transport>(context: AppContextHandle<'_, T>, id: &str) {
    context.pipeline.remove_notification(id);
}

pub fn handle_clear_all<T: Transport>(context: AppContextHandle<'_, T>) {
    context.pipeline.clear_all();
}

/// Answers with the record `id`, or `None` if the store has no such record.
pub async fn handle_notification_request<T: Transport>(context: AppContextHandle<'_, T>, id: &str) {
    let record = context.pipeline.notification_by_id(id).cloned();
    context
        .send(MessageFromBackend::NotificationResponse(record))
        .await;
}

pub async fn handle_unread_count_request<T: Transport>(context: AppContextHandle<'_, T>) {
    let count = context.pipeline.unread_count();
    context
        .send(MessageFromBackend::UnreadCountResponse(count))
        .await;
}

/// Handles [`floorwatch_bridge::MessageToBackend::SimulateNotification`].
pub async fn handle_simulate<T: Transport>(
    context: AppContextHandle<'_, T>,
    payload: RawEventPayload,
) {
    let id = context.pipeline.simulate_notification(payload).await;
    log::debug!("Simulated notification {id}");
}

/// Handles a remote push that arrived while the application is open.
pub async fn handle_push_received<T: Transport>(
    context: AppContextHandle<'_, T>,
    title: &str,
    body: &str,
) {
    context.pipeline.ingest_push(title, body).await;
}

/// Asks the user for permission on the active presentation channel.
pub async fn handle_permission_request<T: Transport>(context: AppContextHandle<'_, T>) {
    let granted = context.pipeline.dispatcher().request_permission().await;
    log::info!(
        "Notification permission {}",
        if granted { "granted" } else { "not granted" }
    );
    context
        .send(MessageFromBackend::PermissionResponse(granted))
        .await;
}
