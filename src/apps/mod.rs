//! Concrete applications
//!
//! Each application embeds an [`AppBase`](crate::app::lifecycle::AppBase)
//! and implements [`Application`](crate::app::lifecycle::Application).

pub mod arkanoid;
pub mod prime_calculator;

pub use arkanoid::Arkanoid;
pub use prime_calculator::PrimeCalculator;
