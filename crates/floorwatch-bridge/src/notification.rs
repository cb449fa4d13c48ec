use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Severity or category for user-visible notifications.
///
/// This enum classifies notifications by their intent and visual styling,
/// allowing the UI to display them appropriately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    /// Indicates a successful operation or positive outcome.
    Success,
    /// Indicates a non-critical issue that the user should be aware of, but
    /// does not prevent normal operation.
    Warning,
    /// Indicates an error or failure that may affect functionality.
    Error,
    /// Neutral informational message that does not indicate success or failure.
    #[default]
    Info,
    /// A plain message addressed to the operator.
    Message,
}

impl NotificationType {
    /// Returns the lowercase wire name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Success => "success",
            NotificationType::Warning => "warning",
            NotificationType::Error => "error",
            NotificationType::Info => "info",
            NotificationType::Message => "message",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Returned when a string does not name one of the five notification types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown notification type `{0}`")]
pub struct UnknownNotificationType(pub String);

impl FromStr for NotificationType {
    type Err = UnknownNotificationType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "success" => Ok(NotificationType::Success),
            "warning" => Ok(NotificationType::Warning),
            "error" => Ok(NotificationType::Error),
            "info" => Ok(NotificationType::Info),
            "message" => Ok(NotificationType::Message),
            other => Err(UnknownNotificationType(other.to_string())),
        }
    }
}

/// Button style hint for a [`NotificationAction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionFill {
    Clear,
    Outline,
    Solid,
    Default,
}

/// A presentation affordance attached to a notification (e.g. "Acknowledge").
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NotificationAction {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<ActionFill>,
}

/// A label/value pair shown in the expanded view of a notification.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RelatedInfo {
    pub label: String,
    pub value: String,
}

/// The canonical notification held by the store and displayed by the UI.
///
/// `time` and `date` are human-readable labels computed once when the record
/// is created. They are not refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    /// Identifier, unique within the lifetime of the store.
    pub id: String,
    pub title: String,
    pub message: String,
    /// The type/severity of the notification, determining its visual style.
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    /// Relative creation time label, e.g. "Just now".
    pub time: String,
    /// Creation day label, e.g. "Today".
    pub date: String,
    /// Whether the operator has seen this notification.
    pub read: bool,
    /// Optional rich text (may contain markup) for the detail view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<NotificationAction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_info: Option<Vec<RelatedInfo>>,
}

/// A notification event as it arrives from the server, before classification.
///
/// The `type` field is kept as a raw string here; unknown values are mapped
/// to [`NotificationType::Info`] when the record is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEventPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub message: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub notification_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<NotificationAction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_info: Option<Vec<RelatedInfo>>,
}

/// Opaque payload attached to a presented notification. Activation handlers
/// read it back to decide where to navigate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationExtra {
    pub notification_id: Option<String>,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    /// RFC 3339 timestamp of the presentation call.
    pub timestamp: String,
}
