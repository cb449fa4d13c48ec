use std::{
    sync::{
        Arc, Weak,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use floorwatch_bridge::{
    config::BrowserChannelConfig,
    navigation::Route,
    notification::{NotificationExtra, NotificationRecord},
};
use serde::Serialize;

use crate::navigation::Navigator;
use crate::{Platform, PresentError, Presenter};

/// Page-level notification permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserPermission {
    Granted,
    Denied,
    /// The user has not decided yet.
    Default,
}

/// Options for a page-level notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserNotification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    /// Coalescing key; equal to the record id.
    pub tag: String,
    pub data: NotificationExtra,
    pub require_interaction: bool,
}

/// A notification currently shown by the browser.
pub trait BrowserNotificationHandle: Send + Sync {
    fn close(&self);
}

/// Invoked when the user clicks a shown notification.
pub type ClickHandler = Box<dyn Fn(&dyn BrowserNotificationHandle) + Send + Sync>;

/// Host-side access to the page's notification API.
#[async_trait]
pub trait BrowserNotifications: Send + Sync {
    fn is_supported(&self) -> bool;
    fn permission(&self) -> BrowserPermission;
    async fn request_permission(&self) -> BrowserPermission;
    fn show(
        &self,
        notification: BrowserNotification,
        on_click: ClickHandler,
    ) -> Result<Arc<dyn BrowserNotificationHandle>, PresentError>;

    /// Brings the application window to the front, where the platform allows it.
    fn focus_window(&self) {}
}

/// Presents records as browser notifications that navigate to the record's
/// detail page when clicked.
pub struct BrowserPresenter {
    platform: Arc<dyn BrowserNotifications>,
    navigator: Arc<dyn Navigator>,
    config: BrowserChannelConfig,
}

impl BrowserPresenter {
    pub fn new(
        platform: Arc<dyn BrowserNotifications>,
        navigator: Arc<dyn Navigator>,
        config: BrowserChannelConfig,
    ) -> Self {
        Self {
            platform,
            navigator,
            config,
        }
    }

    fn show(&self, record: &NotificationRecord) -> Result<(), PresentError> {
        let notification = BrowserNotification {
            title: record.title.clone(),
            body: record.message.clone(),
            icon: self.config.icon.clone(),
            badge: self.config.badge.clone(),
            tag: record.id.clone(),
            data: NotificationExtra {
                notification_id: Some(record.id.clone()),
                notification_type: record.notification_type,
                timestamp: Utc::now().to_rfc3339(),
            },
            require_interaction: self.config.require_interaction,
        };

        // the platform keeps the handler alive, so it must not own the platform
        let platform: Weak<dyn BrowserNotifications> = Arc::downgrade(&self.platform);
        let navigator = self.navigator.clone();
        let id = record.id.clone();
        let clicked = Arc::new(AtomicBool::new(false));
        let click_flag = clicked.clone();
        let on_click: ClickHandler = Box::new(move |handle| {
            log::info!("Browser notification {id} clicked");
            click_flag.store(true, Ordering::SeqCst);
            handle.close();
            navigator.navigate(Route::NotificationDetail(id.clone()));
            if let Some(platform) = platform.upgrade() {
                platform.focus_window();
            }
        });

        let handle = self.platform.show(notification, on_click)?;
        let auto_close = Duration::from_secs(self.config.auto_close_secs);
        tokio::spawn(async move {
            tokio::time::sleep(auto_close).await;
            // a click has already closed it
            if !clicked.load(Ordering::SeqCst) {
                handle.close();
            }
        });

        log::info!("Browser notification displayed: {}", record.title);
        Ok(())
    }
}

#[async_trait]
impl Presenter for BrowserPresenter {
    fn platform(&self) -> Platform {
        Platform::Web
    }

    fn wire_callbacks(&self) -> Result<(), PresentError> {
        // click handlers are attached per notification in `present`
        Ok(())
    }

    async fn initialize(&self) -> Result<(), PresentError> {
        if !self.platform.is_supported() {
            log::warn!("This browser does not support notifications");
            return Err(PresentError::Unsupported);
        }

        match self.platform.permission() {
            BrowserPermission::Granted => {
                log::info!("Browser notification permission already granted");
                Ok(())
            }
            BrowserPermission::Default => match self.platform.request_permission().await {
                BrowserPermission::Granted => {
                    log::info!("Browser notification permission granted");
                    Ok(())
                }
                _ => {
                    log::warn!("Browser notification permission denied");
                    Err(PresentError::PermissionDenied)
                }
            },
            BrowserPermission::Denied => Err(PresentError::PermissionDenied),
        }
    }

    async fn present(&self, record: &NotificationRecord) -> Result<(), PresentError> {
        if !self.platform.is_supported() {
            return Err(PresentError::Unsupported);
        }

        match self.platform.permission() {
            BrowserPermission::Granted => self.show(record),
            BrowserPermission::Default => match self.platform.request_permission().await {
                BrowserPermission::Granted => self.show(record),
                _ => Err(PresentError::PermissionDenied),
            },
            BrowserPermission::Denied => Err(PresentError::PermissionDenied),
        }
    }

    async fn request_permission(&self) -> bool {
        if !self.platform.is_supported() {
            log::warn!("This browser does not support notifications");
            return false;
        }

        match self.platform.permission() {
            BrowserPermission::Granted => true,
            BrowserPermission::Denied => false,
            BrowserPermission::Default => {
                self.platform.request_permission().await == BrowserPermission::Granted
            }
        }
    }
}
