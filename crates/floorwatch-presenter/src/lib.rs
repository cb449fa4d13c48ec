//! Presentation channels for notifications.
//!
//! A notification accepted by the pipeline is surfaced to the user through
//! exactly one channel, chosen once when the [`PresentationDispatcher`] is
//! built:
//! - [`native::NativePresenter`] schedules a platform-level local
//!   notification through a [`native::NativeNotifications`] collaborator.
//! - [`browser::BrowserPresenter`] creates a page-level notification through a
//!   [`browser::BrowserNotifications`] collaborator.
//!
//! The collaborators are supplied by the host environment. Presentation is
//! best-effort: the dispatcher logs every failure and never propagates it.
//!
//! # Setup
//! Callback wiring ([`Presenter::wire_callbacks`]) and the permission
//! handshake ([`Presenter::initialize`]) are separate steps. Wiring is
//! synchronous and never prompts the user; the handshake may suspend until
//! the platform answers.

pub mod browser;
pub mod native;
pub mod navigation;

#[cfg(test)]
mod testing;

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use floorwatch_bridge::notification::NotificationRecord;

/// Errors that can occur while presenting a notification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PresentError {
    /// The user (or platform policy) did not grant notification permission.
    #[error("notification permission was not granted")]
    PermissionDenied,
    /// The native channel was used before its permission handshake completed.
    #[error("notification system is not initialized")]
    NotInitialized,
    /// The host has no notification support at all.
    #[error("notifications are not supported on this platform")]
    Unsupported,
    /// The underlying platform call failed.
    #[error("platform notification call failed: {0}")]
    Platform(String),
}

/// The two mutually exclusive presentation platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Native,
    Web,
}

impl fmt::Display for Platform {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Native => formatter.write_str("native"),
            Platform::Web => formatter.write_str("web"),
        }
    }
}

/// Host capability that tells which platform the application runs on.
pub trait PlatformProbe {
    fn platform(&self) -> Platform;
}

/// A single presentation channel.
#[async_trait]
pub trait Presenter: Send + Sync {
    /// The platform this presenter targets.
    fn platform(&self) -> Platform;

    /// Registers activation callbacks with the platform. Returns once every
    /// listener is in place.
    fn wire_callbacks(&self) -> Result<(), PresentError>;

    /// Performs the permission handshake. Returns `Ok` once the channel is
    /// ready to present.
    async fn initialize(&self) -> Result<(), PresentError>;

    /// Presents one notification record.
    async fn present(&self, record: &NotificationRecord) -> Result<(), PresentError>;

    /// Explicitly asks for permission; returns `true` if it is granted.
    async fn request_permission(&self) -> bool;
}

/// Routes notification records to the presenter selected for this platform.
#[derive(Clone)]
pub struct PresentationDispatcher {
    presenter: Arc<dyn Presenter>,
}

impl PresentationDispatcher {
    /// Wraps an already chosen presenter.
    pub fn new(presenter: Arc<dyn Presenter>) -> Self {
        Self { presenter }
    }

    /// Asks `probe` for the current platform and builds only the matching
    /// presenter.
    pub fn select<N, W>(probe: &dyn PlatformProbe, native: N, web: W) -> Self
    where
        N: FnOnce() -> Arc<dyn Presenter>,
        W: FnOnce() -> Arc<dyn Presenter>,
    {
        let platform = probe.platform();
        log::info!("Using {platform} notification presenter");
        match platform {
            Platform::Native => Self::new(native()),
            Platform::Web => Self::new(web()),
        }
    }

    pub fn platform(&self) -> Platform {
        self.presenter.platform()
    }

    /// Shared handle to the selected presenter, e.g. to run its handshake on
    /// a separate task.
    pub fn presenter(&self) -> Arc<dyn Presenter> {
        self.presenter.clone()
    }

    pub fn wire_callbacks(&self) -> Result<(), PresentError> {
        self.presenter.wire_callbacks()
    }

    pub async fn initialize(&self) -> Result<(), PresentError> {
        self.presenter.initialize().await
    }

    /// Presents `record`, logging and swallowing any failure.
    pub async fn dispatch(&self, record: &NotificationRecord) {
        match self.presenter.present(record).await {
            Ok(()) => log::debug!("Presented notification {} via {}", record.id, self.platform()),
            Err(
                error @ (PresentError::PermissionDenied
                | PresentError::NotInitialized
                | PresentError::Unsupported),
            ) => {
                log::warn!("Skipped presenting notification {}: {error}", record.id);
            }
            Err(error) => {
                log::error!("Failed to present notification {}: {error}", record.id);
            }
        }
    }

    pub async fn request_permission(&self) -> bool {
        self.presenter.request_permission().await
    }
}
