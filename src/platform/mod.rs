//! Hosts and the scheduling they share
//!
//! The scheduler is platform independent. The headless host drives it with
//! simulated time; the Win32 host drives it from a window timer and is only
//! compiled on Windows.

pub mod headless;
pub mod scheduler;
#[cfg(windows)]
pub mod windows;

use std::path::PathBuf;

use crate::app::lifecycle::AppError;
use crate::config::HostConfigError;

pub use headless::HeadlessHost;

/// Host errors
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("Invalid host configuration: {0}")]
    Config(#[from] HostConfigError),

    #[error("Application failed: {0}")]
    App(#[from] AppError),

    #[error("No canvas to capture")]
    NoCanvas,

    #[error("Failed to write snapshot {}: {reason}", .path.display())]
    Snapshot { path: PathBuf, reason: String },

    #[cfg(not(windows))]
    #[error("The window host is only available on Windows")]
    WindowUnavailable,

    #[cfg(windows)]
    #[error("Failed to register window class")]
    WindowClassRegistrationFailed,

    #[cfg(windows)]
    #[error("Failed to create host window")]
    WindowCreationFailed,

    #[cfg(windows)]
    #[error("Win32 call failed: {0}")]
    Win32(#[from] ::windows::core::Error),
}
