//! The key-press set
//!
//! A fixed 256-bit set over every representable virtual-key code. The pump
//! thread mutates the window's copy under a mutex; readers receive a
//! [`KeyStates`] value copied out under the same lock.

use super::Key;

const WORDS: usize = 4;

/// Which key codes are currently held down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct KeyStates {
    bits: [u64; WORDS],
}

impl KeyStates {
    /// Number of representable key codes
    pub const CAPACITY: usize = WORDS * 64;

    /// An empty set
    pub const fn new() -> Self {
        Self { bits: [0; WORDS] }
    }

    const fn slot(code: u8) -> (usize, u64) {
        ((code / 64) as usize, 1 << (code % 64))
    }

    /// Mark `code` as held down
    pub fn set(&mut self, code: u8) {
        let (word, mask) = Self::slot(code);
        self.bits[word] |= mask;
    }

    /// Mark `code` as released
    pub fn clear(&mut self, code: u8) {
        let (word, mask) = Self::slot(code);
        self.bits[word] &= !mask;
    }

    /// Release every key
    pub fn clear_all(&mut self) {
        self.bits = [0; WORDS];
    }

    /// Whether `code` is held down
    pub const fn is_pressed(&self, code: u8) -> bool {
        let (word, mask) = Self::slot(code);
        self.bits[word] & mask != 0
    }

    /// Whether `key` is held down
    pub const fn is_down(&self, key: Key) -> bool {
        self.is_pressed(key.code())
    }

    /// Number of keys held down
    pub fn count(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Whether no key is held down
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|w| *w == 0)
    }

    /// Codes of all held keys, ascending
    pub fn pressed(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=u8::MAX).filter(|code| self.is_pressed(*code))
    }

    /// Held keys that have a symbolic name, ascending by code
    pub fn pressed_keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.pressed().filter_map(Key::from_code)
    }
}
