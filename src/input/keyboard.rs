//! Key press listeners
//!
//! Applications do not receive keys by default. They register a listener
//! and get a [`ListenerId`] back; the host delivers every key press to each
//! registered listener until it is unregistered again. Registration and
//! removal are explicit so the listener's lifetime is visible in the
//! owning application's `initialize` and `destroy`.

use tracing::trace;

/// Handle to a registered key listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Key events delivered by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// A printable character was typed
    Char(char),
    /// Anything else (control characters, unknown codes)
    Ignored(u32),
}

impl KeyEvent {
    /// Convert a platform character code (UTF-32) into a key event
    pub fn from_char_code(code: u32) -> Self {
        match char::from_u32(code) {
            Some(ch) if !ch.is_control() => KeyEvent::Char(ch),
            _ => KeyEvent::Ignored(code),
        }
    }

    /// The typed character, if any
    pub fn char(&self) -> Option<char> {
        match self {
            KeyEvent::Char(ch) => Some(*ch),
            KeyEvent::Ignored(_) => None,
        }
    }
}

/// Registry of active key listeners
#[derive(Debug, Default)]
pub struct KeyListeners {
    next_id: u64,
    active: Vec<ListenerId>,
}

impl KeyListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new listener
    pub fn register(&mut self) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.active.push(id);
        trace!(?id, "key listener registered");
        id
    }

    /// Removes a listener
    ///
    /// # Returns
    /// true if the listener was registered
    pub fn unregister(&mut self, id: ListenerId) -> bool {
        let before = self.active.len();
        self.active.retain(|active| *active != id);
        trace!(?id, "key listener removed");
        before != self.active.len()
    }

    /// Checks if a listener is currently registered
    pub fn is_registered(&self, id: ListenerId) -> bool {
        self.active.contains(&id)
    }

    /// Snapshot of the registered listeners, in registration order
    pub fn listeners(&self) -> Vec<ListenerId> {
        self.active.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
