//! appshelf: a host for small demo applications
//!
//! Applications share one lifecycle (validate, initialize, run, destroy)
//! and are swapped into a single target surface by the
//! [`AppController`](app::AppController). Timers, frame callbacks, key
//! listeners and templates are explicit host services, driven either by
//! the headless host or, on Windows, by a real window.

pub mod app;
pub mod apps;
pub mod config;
pub mod domain;
pub mod input;
pub mod platform;
pub mod ui;
