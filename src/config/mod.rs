//! Configuration module for appshelf
//!
//! Host settings shared by the command line, the headless host and the
//! Win32 host.

pub mod host;

pub use host::{HostConfig, HostConfigError};
