use std::sync::Arc;

use floorwatch_bridge::navigation::Route;

use crate::native::{LocalNotification, NativeAction, NativeListener};

/// Receives the route to open when the user activates a presented
/// notification.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Picks the route for a native notification action.
///
/// Notifications scheduled by this crate always carry an `extra` payload; a
/// tap on one without any payload goes to the generic demo page.
pub fn route_for_action(action: &NativeAction) -> Route {
    match &action.extra {
        Some(extra) => Route::for_notification(extra.notification_id.as_deref()),
        None => Route::NotificationDemo,
    }
}

/// Native listener that turns notification taps into navigation requests.
pub struct ActivationRouter {
    navigator: Arc<dyn Navigator>,
}

impl ActivationRouter {
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self { navigator }
    }
}

impl NativeListener for ActivationRouter {
    fn on_received(&self, notification: &LocalNotification) {
        log::debug!(
            "Local notification {} delivered: {}",
            notification.id,
            notification.title
        );
    }

    fn on_action_performed(&self, action: &NativeAction) {
        let route = route_for_action(action);
        log::info!(
            "Local notification action `{}` performed, navigating to {route}",
            action.action_id
        );
        self.navigator.navigate(route);
    }
}
