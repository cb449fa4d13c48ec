//! Backend runtime entry point and public API surface.
//!
//! This crate owns the event stream connection, classifies incoming frames
//! into notification records, keeps them in an in-memory store and hands them
//! to the presentation dispatcher. Bridge messages from the host are routed
//! to services that operate on the same pipeline.

mod app;
pub mod config;
pub mod formatting;
pub mod navigation;
pub mod pipeline;
mod runtime;
mod services;
mod state;
pub mod transport;

pub use crate::pipeline::NotificationPipeline;
pub use crate::runtime::{PresenterFactory, run, serve};
