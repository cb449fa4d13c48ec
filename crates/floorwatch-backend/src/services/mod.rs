//! Backend service handlers for host-driven requests.
//!
//! Handlers operate on the [`AppContext`](crate::app::AppContext), perform
//! side effects (network, filesystem, presentation) and answer queries over
//! the bridge. State changes are published by the caller afterwards.

pub mod config_service;
pub mod connection_service;
pub mod notification_service;

/// Represents a type that is used in all handlers as an application context.
pub(crate) type AppContextHandle<'a, T> = &'a mut crate::app::AppContext<T>;
