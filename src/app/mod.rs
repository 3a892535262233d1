//! Application orchestration layer
//!
//! Lifecycle contract, the loader that swaps applications in and out, and
//! the Arkanoid game state machine.

pub mod controller;
pub mod lifecycle;
pub mod state;

pub use controller::{AppController, AppSettings, ModuleKind};
pub use lifecycle::{AppBase, AppContext, AppError, AppEvent, Application, LaunchOptions, launch};
