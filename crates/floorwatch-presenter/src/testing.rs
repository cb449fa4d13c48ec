//! Test doubles for the platform collaborators.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use floorwatch_bridge::{
    navigation::Route,
    notification::{NotificationRecord, NotificationType},
};

use crate::browser::{
    BrowserNotification, BrowserNotificationHandle, BrowserNotifications, BrowserPermission,
    ClickHandler,
};
use crate::native::{LocalNotification, NativeListener, NativeNotifications, PermissionStatus};
use crate::navigation::Navigator;
use crate::{Platform, PresentError, Presenter};

pub fn sample_record(id: &str) -> NotificationRecord {
    NotificationRecord {
        id: id.to_string(),
        title: "Production Line Alert".to_string(),
        message: "Machine #3 requires maintenance check".to_string(),
        notification_type: NotificationType::Info,
        time: "Just now".to_string(),
        date: "Today".to_string(),
        read: false,
        details: None,
        actions: None,
        related_info: None,
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}

pub struct FakeNative {
    status: Mutex<PermissionStatus>,
    request_answer: Mutex<PermissionStatus>,
    scheduled: Mutex<Vec<LocalNotification>>,
    listeners: Mutex<Vec<Arc<dyn NativeListener>>>,
}

impl FakeNative {
    pub fn new(status: PermissionStatus) -> Self {
        Self {
            status: Mutex::new(status),
            request_answer: Mutex::new(status),
            scheduled: Mutex::new(Vec::new()),
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn answer_request_with(&self, status: PermissionStatus) {
        *self.request_answer.lock().unwrap() = status;
    }

    pub fn scheduled(&self) -> Vec<LocalNotification> {
        self.scheduled.lock().unwrap().clone()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }
}

#[async_trait]
impl NativeNotifications for FakeNative {
    async fn check_permission(&self) -> Result<PermissionStatus, PresentError> {
        Ok(*self.status.lock().unwrap())
    }

    async fn request_permission(&self) -> Result<PermissionStatus, PresentError> {
        let answer = *self.request_answer.lock().unwrap();
        *self.status.lock().unwrap() = answer;
        Ok(answer)
    }

    async fn schedule(&self, notification: LocalNotification) -> Result<(), PresentError> {
        self.scheduled.lock().unwrap().push(notification);
        Ok(())
    }

    fn add_listener(&self, listener: Arc<dyn NativeListener>) {
        self.listeners.lock().unwrap().push(listener);
    }
}

struct FakeHandle {
    closed: Arc<AtomicUsize>,
}

impl BrowserNotificationHandle for FakeHandle {
    fn close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

type SharedClickHandler = Arc<dyn Fn(&dyn BrowserNotificationHandle) + Send + Sync>;

pub struct FakeBrowser {
    supported: bool,
    permission: Mutex<BrowserPermission>,
    request_answer: Mutex<BrowserPermission>,
    requests: AtomicUsize,
    focus: AtomicUsize,
    closed: Arc<AtomicUsize>,
    shown: Mutex<Vec<(BrowserNotification, SharedClickHandler)>>,
}

impl FakeBrowser {
    pub fn new(permission: BrowserPermission) -> Self {
        Self {
            supported: true,
            permission: Mutex::new(permission),
            request_answer: Mutex::new(permission),
            requests: AtomicUsize::new(0),
            focus: AtomicUsize::new(0),
            closed: Arc::new(AtomicUsize::new(0)),
            shown: Mutex::new(Vec::new()),
        }
    }

    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new(BrowserPermission::Default)
        }
    }

    pub fn answer_request_with(&self, permission: BrowserPermission) {
        *self.request_answer.lock().unwrap() = permission;
    }

    pub fn shown(&self) -> Vec<BrowserNotification> {
        self.shown
            .lock()
            .unwrap()
            .iter()
            .map(|(notification, _)| notification.clone())
            .collect()
    }

    pub fn permission_requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn focus_requests(&self) -> usize {
        self.focus.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Simulates a user click on the `index`-th shown notification.
    pub fn click(&self, index: usize) {
        let handler = self.shown.lock().unwrap()[index].1.clone();
        let handle = FakeHandle {
            closed: self.closed.clone(),
        };
        handler(&handle);
    }
}

#[async_trait]
impl BrowserNotifications for FakeBrowser {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn permission(&self) -> BrowserPermission {
        *self.permission.lock().unwrap()
    }

    async fn request_permission(&self) -> BrowserPermission {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let answer = *self.request_answer.lock().unwrap();
        *self.permission.lock().unwrap() = answer;
        answer
    }

    fn show(
        &self,
        notification: BrowserNotification,
        on_click: ClickHandler,
    ) -> Result<Arc<dyn BrowserNotificationHandle>, PresentError> {
        self.shown
            .lock()
            .unwrap()
            .push((notification, Arc::from(on_click)));
        Ok(Arc::new(FakeHandle {
            closed: self.closed.clone(),
        }))
    }

    fn focus_window(&self) {
        self.focus.fetch_add(1, Ordering::SeqCst);
    }
}

/// Presenter that records every presented id and answers with a fixed result.
pub struct CountingPresenter {
    platform: Platform,
    result: Result<(), PresentError>,
    presented: Mutex<Vec<String>>,
}

impl CountingPresenter {
    pub fn new(platform: Platform, result: Result<(), PresentError>) -> Self {
        Self {
            platform,
            result,
            presented: Mutex::new(Vec::new()),
        }
    }

    pub fn presented(&self) -> Vec<String> {
        self.presented.lock().unwrap().clone()
    }
}

#[async_trait]
impl Presenter for CountingPresenter {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn wire_callbacks(&self) -> Result<(), PresentError> {
        Ok(())
    }

    async fn initialize(&self) -> Result<(), PresentError> {
        Ok(())
    }

    async fn present(&self, record: &NotificationRecord) -> Result<(), PresentError> {
        self.presented.lock().unwrap().push(record.id.clone());
        self.result.clone()
    }

    async fn request_permission(&self) -> bool {
        true
    }
}
