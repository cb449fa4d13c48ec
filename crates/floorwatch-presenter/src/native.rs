use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use floorwatch_bridge::{
    config::NativeChannelConfig,
    notification::{NotificationExtra, NotificationRecord},
};
use serde::Serialize;
use tokio::sync::watch;

use crate::navigation::{ActivationRouter, Navigator};
use crate::{Platform, PresentError, Presenter};

/// Display permission as reported by the native platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// The user has not been asked yet.
    Prompt,
}

/// Everything the platform needs to schedule one local notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalNotification {
    /// Platform-level numeric identifier.
    pub id: i32,
    pub title: String,
    pub body: String,
    /// Expanded body; the message when the record has no details.
    pub large_body: String,
    pub summary_text: String,
    pub small_icon: String,
    pub icon_color: String,
    pub sound: String,
    /// Payload handed back to listeners when the notification is activated.
    pub extra: NotificationExtra,
    /// When the platform should show the notification.
    pub schedule_at: DateTime<Utc>,
    pub channel_id: String,
}

/// A user action performed on a delivered local notification.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeAction {
    pub action_id: String,
    /// The `extra` payload of the activated notification, if it had one.
    pub extra: Option<NotificationExtra>,
}

/// Callbacks fired by the native platform.
pub trait NativeListener: Send + Sync {
    fn on_received(&self, notification: &LocalNotification);
    fn on_action_performed(&self, action: &NativeAction);
}

/// Host-side access to the platform's local notification facility.
#[async_trait]
pub trait NativeNotifications: Send + Sync {
    async fn check_permission(&self) -> Result<PermissionStatus, PresentError>;
    async fn request_permission(&self) -> Result<PermissionStatus, PresentError>;
    async fn schedule(&self, notification: LocalNotification) -> Result<(), PresentError>;
    fn add_listener(&self, listener: Arc<dyn NativeListener>);
}

/// Integer prefix of `id`: leading whitespace and a sign are allowed and
/// anything after the digits is ignored, so `"12abc"` reads as 12.
fn leading_integer(id: &str) -> Option<i32> {
    let trimmed = id.trim_start();
    let unsigned = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    let rest = unsigned.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == unsigned.len() {
        return None;
    }
    trimmed[..trimmed.len() - rest.len()].parse().ok()
}

/// Presents records as delayed native local notifications.
///
/// Nothing is scheduled until [`Presenter::initialize`] has obtained a
/// permission grant; calls made before that are skipped, not queued.
pub struct NativePresenter {
    platform: Arc<dyn NativeNotifications>,
    navigator: Arc<dyn Navigator>,
    config: NativeChannelConfig,
    ready: watch::Sender<bool>,
    wired: AtomicBool,
}

impl NativePresenter {
    pub fn new(
        platform: Arc<dyn NativeNotifications>,
        navigator: Arc<dyn Navigator>,
        config: NativeChannelConfig,
    ) -> Self {
        let (ready, _) = watch::channel(false);
        Self {
            platform,
            navigator,
            config,
            ready,
            wired: AtomicBool::new(false),
        }
    }

    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    /// Resolves once the permission handshake has succeeded.
    pub async fn wait_ready(&self) {
        let mut ready = self.ready.subscribe();
        // the sender lives as long as `self`, so this only ends on `true`
        let _ = ready.wait_for(|ready| *ready).await;
    }

    /// Builds the local notification for `record`, scheduled relative to `now`.
    pub fn build_notification(
        &self,
        record: &NotificationRecord,
        now: DateTime<Utc>,
    ) -> LocalNotification {
        let id = leading_integer(&record.id)
            .filter(|id| *id != 0)
            .unwrap_or_else(|| rand::random_range(0..10_000));
        let delay = chrono::Duration::seconds(self.config.schedule_delay_secs as i64);

        LocalNotification {
            id,
            title: record.title.clone(),
            body: record.message.clone(),
            large_body: record
                .details
                .clone()
                .unwrap_or_else(|| record.message.clone()),
            summary_text: format!("{} Alert", record.notification_type.as_str().to_uppercase()),
            small_icon: self.config.small_icon.clone(),
            icon_color: self.config.icon_color.clone(),
            sound: self.config.sound.clone(),
            extra: NotificationExtra {
                notification_id: Some(record.id.clone()),
                notification_type: record.notification_type,
                timestamp: now.to_rfc3339(),
            },
            schedule_at: now + delay,
            channel_id: self.config.channel_id.clone(),
        }
    }
}

#[async_trait]
impl Presenter for NativePresenter {
    fn platform(&self) -> Platform {
        Platform::Native
    }

    fn wire_callbacks(&self) -> Result<(), PresentError> {
        if self.wired.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        self.platform
            .add_listener(Arc::new(ActivationRouter::new(self.navigator.clone())));
        log::debug!("Native notification listeners registered");
        Ok(())
    }

    async fn initialize(&self) -> Result<(), PresentError> {
        let mut status = self.platform.check_permission().await?;
        log::info!("Local notification permission status: {status:?}");

        if status == PermissionStatus::Prompt {
            status = self.platform.request_permission().await?;
            log::info!("Local notification permission request result: {status:?}");
        }

        if status != PermissionStatus::Granted {
            log::warn!("Local notification permission not granted");
            return Err(PresentError::PermissionDenied);
        }

        self.ready.send_replace(true);
        log::info!("Local notifications initialized");
        Ok(())
    }

    async fn present(&self, record: &NotificationRecord) -> Result<(), PresentError> {
        if !self.is_ready() {
            return Err(PresentError::NotInitialized);
        }

        let notification = self.build_notification(record, Utc::now());
        let (id, schedule_at) = (notification.id, notification.schedule_at);
        self.platform.schedule(notification).await?;

        log::info!(
            "Local notification {id} ({:?}) scheduled for {schedule_at}",
            record.title
        );
        Ok(())
    }

    async fn request_permission(&self) -> bool {
        let status = match self.platform.check_permission().await {
            Ok(PermissionStatus::Prompt) => self.platform.request_permission().await,
            other => other,
        };

        match status {
            Ok(PermissionStatus::Granted) => true,
            Ok(_) => false,
            Err(error) => {
                log::error!("Failed to request local notification permission: {error}");
                false
            }
        }
    }
}
