pub mod keyboard;

pub use keyboard::{KeyEvent, KeyListeners, ListenerId};
