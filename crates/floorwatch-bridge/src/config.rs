use serde::{Deserialize, Serialize};

/// Configuration of the event stream endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StreamConfig {
    /// URL of the server-sent event stream. Remembered after an explicit
    /// connect so the next run can reuse it.
    pub url: Option<String>,
    /// Whether to connect to `url` as soon as the backend starts.
    pub auto_connect: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            url: None,
            auto_connect: true,
        }
    }
}

/// Exponential backoff settings for automatic reconnects.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReconnectConfig {
    /// Maximum number of automatic reconnect attempts before giving up.
    pub max_attempts: u32,
    /// Delay before the first reconnect attempt, in milliseconds. Each further
    /// attempt doubles it.
    pub base_delay_ms: u64,
    /// Time the server has to answer a connection attempt, in milliseconds.
    /// An attempt that takes longer counts as failed.
    pub open_timeout_ms: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 1000,
            open_timeout_ms: 30_000,
        }
    }
}

/// Settings of the platform-level local notification channel.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NativeChannelConfig {
    /// Delay between scheduling a local notification and showing it, in seconds.
    pub schedule_delay_secs: u64,
    /// Resource name of the status-bar icon.
    pub small_icon: String,
    /// Accent color of the icon.
    pub icon_color: String,
    /// Sound file played when the notification is shown.
    pub sound: String,
    /// Channel the notifications are posted to.
    pub channel_id: String,
}

impl Default for NativeChannelConfig {
    fn default() -> Self {
        Self {
            schedule_delay_secs: 5,
            small_icon: "ic_stat_icon_config_sample".to_string(),
            icon_color: "#488AFF".to_string(),
            sound: "beep.wav".to_string(),
            channel_id: "factory-alerts".to_string(),
        }
    }
}

/// Settings of the page-level (browser) notification channel.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BrowserChannelConfig {
    pub icon: String,
    pub badge: String,
    /// Time after which an untouched notification is closed, in seconds.
    pub auto_close_secs: u64,
    /// Keep the notification visible until the user interacts with it.
    pub require_interaction: bool,
}

impl Default for BrowserChannelConfig {
    fn default() -> Self {
        Self {
            icon: "/favicon.png".to_string(),
            badge: "/favicon.png".to_string(),
            auto_close_secs: 10,
            require_interaction: true,
        }
    }
}

/// Global application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Maximum log level (`error`, `warn`, `info`, `debug` or `trace`).
    pub log_level: String,
    /// Event stream endpoint.
    pub stream: StreamConfig,
    /// Reconnect backoff policy.
    pub reconnect: ReconnectConfig,
    /// Native local notification channel.
    pub native: NativeChannelConfig,
    /// Browser notification channel.
    pub browser: BrowserChannelConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            stream: StreamConfig::default(),
            reconnect: ReconnectConfig::default(),
            native: NativeChannelConfig::default(),
            browser: BrowserChannelConfig::default(),
        }
    }
}
