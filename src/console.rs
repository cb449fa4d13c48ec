//! Terminal stand-ins for the platform notification facilities.
//!
//! Notifications are printed to stdout. Delivered ones can be activated from
//! the shell, which replays the tap or click the platform would report.

use std::{
    collections::HashMap,
    env,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::Utc;
use floorwatch_presenter::{
    Platform, PlatformProbe, PresentError,
    browser::{
        BrowserNotification, BrowserNotificationHandle, BrowserNotifications, BrowserPermission,
        ClickHandler,
    },
    native::{LocalNotification, NativeAction, NativeListener, NativeNotifications, PermissionStatus},
};

/// Environment variable selecting the presentation platform (`native` or `web`).
pub const PLATFORM_VAR: &str = "FLOORWATCH_PLATFORM";

/// Reads the platform from [`PLATFORM_VAR`]; anything but `native` means web.
pub struct EnvProbe;

impl PlatformProbe for EnvProbe {
    fn platform(&self) -> Platform {
        match env::var(PLATFORM_VAR).as_deref() {
            Ok("native") => Platform::Native,
            _ => Platform::Web,
        }
    }
}

type SharedClickHandler = Arc<dyn Fn(&dyn BrowserNotificationHandle) + Send + Sync>;

enum Delivered {
    Native(LocalNotification),
    Browser(SharedClickHandler),
}

/// Notifications currently on screen, keyed by record id. Each one carries
/// the serial it was shown with, so a stale handle cannot close a newer
/// notification for the same id.
#[derive(Default)]
struct Screen {
    next_serial: u64,
    shown: HashMap<String, (u64, Delivered)>,
}

type SharedScreen = Arc<Mutex<Screen>>;

/// Console implementation of both notification facilities.
#[derive(Default)]
pub struct ConsoleHost {
    listeners: Arc<Mutex<Vec<Arc<dyn NativeListener>>>>,
    screen: SharedScreen,
}

impl ConsoleHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates the user tapping or clicking the delivered notification for
    /// record `id`. Returns `false` if no such notification is on screen.
    pub fn activate(&self, id: &str) -> bool {
        let (serial, delivered) = {
            let Ok(screen) = self.screen.lock() else {
                return false;
            };
            match screen.shown.get(id) {
                Some((serial, Delivered::Native(notification))) => {
                    (*serial, Delivered::Native(notification.clone()))
                }
                Some((serial, Delivered::Browser(on_click))) => {
                    (*serial, Delivered::Browser(on_click.clone()))
                }
                None => return false,
            }
        };

        match delivered {
            Delivered::Native(notification) => {
                let action = NativeAction {
                    action_id: "tap".to_string(),
                    extra: Some(notification.extra),
                };
                for listener in self.listeners() {
                    listener.on_action_performed(&action);
                }
            }
            Delivered::Browser(on_click) => on_click(&ConsoleHandle {
                id: id.to_string(),
                serial,
                screen: self.screen.clone(),
            }),
        }
        true
    }

    fn listeners(&self) -> Vec<Arc<dyn NativeListener>> {
        self.listeners
            .lock()
            .map(|listeners| listeners.clone())
            .unwrap_or_default()
    }
}

/// Puts `entry` on screen, replacing any earlier notification for `id`, and
/// returns its serial.
fn deliver(screen: &SharedScreen, id: String, entry: Delivered) -> u64 {
    let Ok(mut screen) = screen.lock() else {
        return 0;
    };
    screen.next_serial += 1;
    let serial = screen.next_serial;
    screen.shown.insert(id, (serial, entry));
    serial
}

#[async_trait]
impl NativeNotifications for ConsoleHost {
    async fn check_permission(&self) -> Result<PermissionStatus, PresentError> {
        Ok(PermissionStatus::Prompt)
    }

    async fn request_permission(&self) -> Result<PermissionStatus, PresentError> {
        Ok(PermissionStatus::Granted)
    }

    async fn schedule(&self, notification: LocalNotification) -> Result<(), PresentError> {
        let delay = (notification.schedule_at - Utc::now())
            .to_std()
            .unwrap_or_default();
        let listeners = self.listeners();
        let screen = self.screen.clone();

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            println!(
                "\n[{}] {}: {}",
                notification.summary_text, notification.title, notification.large_body
            );
            for listener in &listeners {
                listener.on_received(&notification);
            }
            if let Some(id) = notification.extra.notification_id.clone() {
                deliver(&screen, id, Delivered::Native(notification));
            }
        });
        Ok(())
    }

    fn add_listener(&self, listener: Arc<dyn NativeListener>) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push(listener);
        }
    }
}

struct ConsoleHandle {
    id: String,
    serial: u64,
    screen: SharedScreen,
}

impl BrowserNotificationHandle for ConsoleHandle {
    fn close(&self) {
        let Ok(mut screen) = self.screen.lock() else {
            return;
        };
        if screen
            .shown
            .get(&self.id)
            .is_some_and(|(serial, _)| *serial == self.serial)
        {
            screen.shown.remove(&self.id);
            log::debug!("Closed browser notification {}", self.id);
        }
    }
}

#[async_trait]
impl BrowserNotifications for ConsoleHost {
    fn is_supported(&self) -> bool {
        true
    }

    fn permission(&self) -> BrowserPermission {
        BrowserPermission::Granted
    }

    async fn request_permission(&self) -> BrowserPermission {
        BrowserPermission::Granted
    }

    fn show(
        &self,
        notification: BrowserNotification,
        on_click: ClickHandler,
    ) -> Result<Arc<dyn BrowserNotificationHandle>, PresentError> {
        println!(
            "\n[{}] {}: {}",
            notification.data.notification_type, notification.title, notification.body
        );
        let serial = deliver(
            &self.screen,
            notification.tag.clone(),
            Delivered::Browser(Arc::from(on_click)),
        );
        Ok(Arc::new(ConsoleHandle {
            id: notification.tag,
            serial,
            screen: self.screen.clone(),
        }))
    }

    fn focus_window(&self) {
        println!("(window focused)");
    }
}
