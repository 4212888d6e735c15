//! Keyboard input types
//!
//! - **`key`**: Symbolic key names mapped to native virtual-key codes
//! - **`key_states`**: The 256-entry key-press set published by the pump thread

pub mod key;
pub mod key_states;

pub use key::{Key, ParseKeyError};
pub use key_states::KeyStates;
