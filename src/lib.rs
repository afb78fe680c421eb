//! Val Browser, a tabbed desktop browser shell around an embedded web engine.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod database;
pub mod logging;
pub mod managers;
pub mod platform;
pub mod services;
pub mod types;
pub mod view;

#[cfg(feature = "gui")]
pub mod ui;
