//! Domain logic and core data structures
//!
//! This module contains pure game and number logic that is independent
//! of surfaces, schedulers and platform-specific implementations.

pub mod core;
pub mod game;
pub mod keyboard;
pub mod objects;
pub mod primes;
