//! Decides which stream frames are notifications and turns them into
//! canonical records.

use std::fmt;

use chrono::{DateTime, Local, Utc};
use floorwatch_bridge::notification::{NotificationRecord, NotificationType, RawEventPayload};
use serde_json::Value;

use crate::formatting::{date_label, time_label, to_base36};

/// Keep-alive markers sent by the server.
const CONTROL_MARKERS: [&str; 2] = ["heartbeat", "ping"];

/// Errors that can occur while decoding an event payload.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The frame is not JSON, or not an object with `title` and `message`.
    #[error("malformed event payload: {0}")]
    Malformed(#[from] serde_json::Error),
    /// A required text field is present but empty.
    #[error("event payload has an empty `{0}` field")]
    EmptyField(&'static str),
}

/// Outcome of classifying a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    /// Infrastructure keep-alive; never stored.
    Control,
    Event(RawEventPayload),
}

/// The named event channels of the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventChannel {
    /// Unnamed events and events explicitly named `message`.
    Message,
    Notification,
    /// Always produces warnings.
    Alert,
    /// Always produces successes.
    Success,
    Heartbeat,
    Ping,
    /// Any other event name; nothing listens to it.
    Unhandled(String),
}

impl EventChannel {
    pub fn from_event_name(name: Option<&str>) -> Self {
        match name {
            None | Some("") | Some("message") => EventChannel::Message,
            Some("notification") => EventChannel::Notification,
            Some("alert") => EventChannel::Alert,
            Some("success") => EventChannel::Success,
            Some("heartbeat") => EventChannel::Heartbeat,
            Some("ping") => EventChannel::Ping,
            Some(other) => EventChannel::Unhandled(other.to_string()),
        }
    }

    /// Type forced onto every record arriving on this channel.
    pub fn type_override(&self) -> Option<NotificationType> {
        match self {
            EventChannel::Alert => Some(NotificationType::Warning),
            EventChannel::Success => Some(NotificationType::Success),
            _ => None,
        }
    }

    /// Whether the whole channel carries keep-alives only.
    pub fn is_control(&self) -> bool {
        matches!(self, EventChannel::Heartbeat | EventChannel::Ping)
    }
}

impl fmt::Display for EventChannel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventChannel::Message => "message",
            EventChannel::Notification => "notification",
            EventChannel::Alert => "alert",
            EventChannel::Success => "success",
            EventChannel::Heartbeat => "heartbeat",
            EventChannel::Ping => "ping",
            EventChannel::Unhandled(name) => name,
        };
        formatter.write_str(name)
    }
}

fn is_marker(text: &str) -> bool {
    CONTROL_MARKERS.contains(&text)
}

/// Returns `true` for keep-alive frames: the bare strings `heartbeat` and
/// `ping`, or JSON whose value (or `type`/`message` field) is one of them.
pub fn is_control_message(raw: &str) -> bool {
    if is_marker(raw.trim()) {
        return true;
    }

    serde_json::from_str::<Value>(raw)
        .map(|value| is_control_value(&value))
        .unwrap_or(false)
}

/// Keep-alive check on an already decoded frame.
pub fn is_control_value(value: &Value) -> bool {
    match value {
        Value::String(text) => is_marker(text),
        Value::Object(fields) => ["type", "message"].iter().any(|field| {
            fields
                .get(*field)
                .and_then(Value::as_str)
                .is_some_and(is_marker)
        }),
        _ => false,
    }
}

fn validate(payload: RawEventPayload) -> Result<RawEventPayload, ParseError> {
    if payload.title.trim().is_empty() {
        return Err(ParseError::EmptyField("title"));
    }
    if payload.message.trim().is_empty() {
        return Err(ParseError::EmptyField("message"));
    }
    Ok(payload)
}

/// Decodes a JSON event payload.
pub fn parse(raw: &str) -> Result<RawEventPayload, ParseError> {
    validate(serde_json::from_str(raw)?)
}

/// Filters keep-alives before and after decoding, then decodes the payload.
pub fn classify(raw: &str) -> Result<Classified, ParseError> {
    if is_marker(raw.trim()) {
        return Ok(Classified::Control);
    }

    let value: Value = serde_json::from_str(raw)?;
    if is_control_value(&value) {
        return Ok(Classified::Control);
    }

    validate(serde_json::from_value(value)?).map(Classified::Event)
}

/// Generates a record id from the current time and a random suffix.
pub fn generate_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    format!("{}{}", to_base36(millis), to_base36(rand::random::<u64>()))
}

/// Builds the canonical record for `payload`, stamped with the current time.
pub fn to_record(payload: RawEventPayload, override_type: Option<NotificationType>) -> NotificationRecord {
    to_record_at(payload, override_type, Local::now())
}

/// Builds the canonical record for `payload` as of `now`.
///
/// The type is `override_type` if given, else the payload's own type, else
/// [`NotificationType::Info`]. Unknown payload types count as absent.
pub fn to_record_at(
    payload: RawEventPayload,
    override_type: Option<NotificationType>,
    now: DateTime<Local>,
) -> NotificationRecord {
    let notification_type = override_type
        .or_else(|| {
            payload
                .notification_type
                .as_deref()
                .and_then(|name| match name.parse() {
                    Ok(notification_type) => Some(notification_type),
                    Err(error) => {
                        log::debug!("{error}, using info");
                        None
                    }
                })
        })
        .unwrap_or_default();

    NotificationRecord {
        id: payload
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(generate_id),
        title: payload.title,
        message: payload.message,
        notification_type,
        time: time_label(now, now),
        date: date_label(now, now),
        read: false,
        details: payload.details,
        actions: payload.actions,
        related_info: payload.related_info,
    }
}
