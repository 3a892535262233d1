//! Keyboard mapping for the Arkanoid paddle
//!
//! Converts typed characters into paddle commands and tracks the cheat
//! code sequence. Completely pure and testable without a host.
//!
//! ## Design Principles
//! - **Exact keys**: only lowercase `a` and `d` steer the paddle
//! - **Case insensitive cheat**: `iddqd` and `IDDQD` are the same sequence
//! - **Strict prefix**: any key that breaks the prefix clears the buffer

/// Discrete paddle translation requested by a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddleCommand {
    Left,
    Right,
}

impl PaddleCommand {
    /// Pixels moved per key press
    pub const STEP: f32 = 20.0;

    /// Maps a typed character to a paddle command
    ///
    /// # Examples
    /// ```rust
    /// use appshelf::domain::keyboard::PaddleCommand;
    ///
    /// assert_eq!(PaddleCommand::from_key('a'), Some(PaddleCommand::Left));
    /// assert_eq!(PaddleCommand::from_key('d'), Some(PaddleCommand::Right));
    /// assert_eq!(PaddleCommand::from_key('x'), None);
    /// ```
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            'a' => Some(PaddleCommand::Left),
            'd' => Some(PaddleCommand::Right),
            _ => None,
        }
    }
}

/// Accumulates typed characters until they spell a fixed sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheatCode {
    sequence: &'static str,
    typed: String,
}

impl CheatCode {
    /// The sequence that widens the paddle to the full viewport
    pub const FULL_WIDTH_PADDLE: &'static str = "IDDQD";

    /// Creates an accumulator for `sequence` (expected in uppercase)
    pub fn new(sequence: &'static str) -> Self {
        Self {
            sequence,
            typed: String::with_capacity(sequence.len()),
        }
    }

    /// Feeds one typed character
    ///
    /// # Returns
    /// true exactly when this key completes the sequence
    pub fn push(&mut self, key: char) -> bool {
        self.typed.extend(key.to_uppercase());

        if !self.sequence.starts_with(self.typed.as_str()) {
            self.typed.clear();
            false
        } else if self.typed == self.sequence {
            self.typed.clear();
            true
        } else {
            false
        }
    }

    /// Characters accumulated so far
    pub fn typed(&self) -> &str {
        &self.typed
    }
}

impl Default for CheatCode {
    fn default() -> Self {
        Self::new(Self::FULL_WIDTH_PADDLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paddle_keys() {
        assert_eq!(PaddleCommand::from_key('a'), Some(PaddleCommand::Left));
        assert_eq!(PaddleCommand::from_key('d'), Some(PaddleCommand::Right));

        // Only the exact lowercase keys steer
        assert_eq!(PaddleCommand::from_key('A'), None);
        assert_eq!(PaddleCommand::from_key('D'), None);
        assert_eq!(PaddleCommand::from_key(' '), None);
    }

    #[test]
    fn cheat_code_completes() {
        let mut cheat = CheatCode::default();
        assert!(!cheat.push('I'));
        assert!(!cheat.push('D'));
        assert!(!cheat.push('D'));
        assert!(!cheat.push('Q'));
        assert!(cheat.push('D'));
        assert!(cheat.typed().is_empty());
    }

    #[test]
    fn cheat_code_is_case_insensitive() {
        let mut cheat = CheatCode::default();
        let completed: Vec<bool> = "iDdQd".chars().map(|c| cheat.push(c)).collect();
        assert_eq!(completed, vec![false, false, false, false, true]);
    }

    #[test]
    fn broken_prefix_resets() {
        let mut cheat = CheatCode::default();
        cheat.push('I');
        assert_eq!(cheat.typed(), "I");

        assert!(!cheat.push('X'));
        assert!(cheat.typed().is_empty());

        // The breaking key does not start a new attempt
        assert!(!cheat.push('D'));
        assert!(cheat.typed().is_empty());
    }

    #[test]
    fn sequence_can_be_entered_twice() {
        let mut cheat = CheatCode::default();
        let typed = "IDDQDIDDQD";
        let completions = typed.chars().filter(|&c| cheat.push(c)).count();
        assert_eq!(completions, 2);
    }
}
