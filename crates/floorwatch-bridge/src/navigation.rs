use std::fmt;

/// In-app destinations that a notification activation can lead to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Detail page of a single notification.
    NotificationDetail(String),
    /// The notification list.
    Notifications,
    /// Landing page for local notifications that carry no payload.
    NotificationDemo,
}

impl Route {
    /// Picks the route for an activated notification, falling back to the
    /// list when no identifier is known.
    pub fn for_notification(notification_id: Option<&str>) -> Self {
        match notification_id {
            Some(id) if !id.is_empty() => Route::NotificationDetail(id.to_string()),
            _ => Route::Notifications,
        }
    }

    /// Renders the route as a router path.
    pub fn path(&self) -> String {
        match self {
            Route::NotificationDetail(id) => format!("/tabs/notification/{id}"),
            Route::Notifications => "/tabs/notification".to_string(),
            Route::NotificationDemo => "/tabs/notification-demo".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.path())
    }
}
