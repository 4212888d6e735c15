//! Key identifiers
//!
//! Every [`Key`] carries the native virtual-key code the window manager
//! reports in key-down/key-up notifications, so a key doubles as an index
//! into [`KeyStates`](super::KeyStates).

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

macro_rules! keys {
    ($($(#[$meta:meta])* $variant:ident = $code:literal, $name:literal;)*) => {
        /// Symbolic key names with their native virtual-key codes
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum Key {
            $($(#[$meta])* $variant = $code,)*
        }

        impl Key {
            /// Every key, in declaration order
            pub const ALL: &'static [Self] = &[$(Self::$variant,)*];

            /// Look up the key for a native virtual-key code
            pub const fn from_code(code: u8) -> Option<Self> {
                match code {
                    $($code => Some(Self::$variant),)*
                    _ => None,
                }
            }

            /// Symbolic name used in configuration files
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }
        }
    };
}

keys! {
    /// A key
    A = b'A', "A";
    /// B key
    B = b'B', "B";
    /// C key
    C = b'C', "C";
    /// D key
    D = b'D', "D";
    /// E key
    E = b'E', "E";
    /// F key
    F = b'F', "F";
    /// G key
    G = b'G', "G";
    /// H key
    H = b'H', "H";
    /// I key
    I = b'I', "I";
    /// J key
    J = b'J', "J";
    /// K key
    K = b'K', "K";
    /// L key
    L = b'L', "L";
    /// M key
    M = b'M', "M";
    /// N key
    N = b'N', "N";
    /// O key
    O = b'O', "O";
    /// P key
    P = b'P', "P";
    /// Q key
    Q = b'Q', "Q";
    /// R key
    R = b'R', "R";
    /// S key
    S = b'S', "S";
    /// T key
    T = b'T', "T";
    /// U key
    U = b'U', "U";
    /// V key
    V = b'V', "V";
    /// W key
    W = b'W', "W";
    /// X key
    X = b'X', "X";
    /// Y key
    Y = b'Y', "Y";
    /// Z key
    Z = b'Z', "Z";
    /// Top-row 0
    Row0 = b'0', "0";
    /// Top-row 1
    Row1 = b'1', "1";
    /// Top-row 2
    Row2 = b'2', "2";
    /// Top-row 3
    Row3 = b'3', "3";
    /// Top-row 4
    Row4 = b'4', "4";
    /// Top-row 5
    Row5 = b'5', "5";
    /// Top-row 6
    Row6 = b'6', "6";
    /// Top-row 7
    Row7 = b'7', "7";
    /// Top-row 8
    Row8 = b'8', "8";
    /// Top-row 9
    Row9 = b'9', "9";
    /// F1
    F1 = 0x70, "F1";
    /// F2
    F2 = 0x71, "F2";
    /// F3
    F3 = 0x72, "F3";
    /// F4
    F4 = 0x73, "F4";
    /// F5
    F5 = 0x74, "F5";
    /// F6
    F6 = 0x75, "F6";
    /// F7
    F7 = 0x76, "F7";
    /// F8
    F8 = 0x77, "F8";
    /// F9
    F9 = 0x78, "F9";
    /// F10
    F10 = 0x79, "F10";
    /// F11
    F11 = 0x7A, "F11";
    /// F12
    F12 = 0x7B, "F12";
    /// Enter / Return
    Return = 0x0D, "Return";
    /// Backspace
    Back = 0x08, "Back";
    /// Insert
    Insert = 0x2D, "Insert";
    /// Delete
    Delete = 0x2E, "Delete";
    /// Either Control key
    Control = 0x11, "Control";
    /// Either Alt key
    Alt = 0x12, "Alt";
    /// Escape
    Escape = 0x1B, "Escape";
    /// Either Shift key
    Shift = 0x10, "Shift";
    /// Caps Lock
    CapsLock = 0x14, "CapsLock";
    /// Page Up
    PageUp = 0x21, "PageUp";
    /// Page Down
    PageDown = 0x22, "PageDown";
    /// End
    End = 0x23, "End";
    /// Home
    Home = 0x24, "Home";
    /// Pause
    Pause = 0x13, "Pause";
    /// Left arrow
    Left = 0x25, "Left";
    /// Right arrow
    Right = 0x27, "Right";
    /// Up arrow
    Up = 0x26, "Up";
    /// Down arrow
    Down = 0x28, "Down";
    /// Tab
    Tab = 0x09, "Tab";
    /// Space bar
    Space = 0x20, "Space";
    /// `=`/`+` key
    Plus = 0xBB, "Plus";
    /// `-`/`_` key
    Minus = 0xBD, "Minus";
    /// `.`/`>` key
    Period = 0xBE, "Period";
    /// `,`/`<` key
    Comma = 0xBC, "Comma";
    /// `;`/`:` on US layouts
    Oem1 = 0xBA, "Oem1";
    /// `/`/`?` on US layouts
    Oem2 = 0xBF, "Oem2";
    /// `` ` ``/`~` on US layouts
    Oem3 = 0xC0, "Oem3";
    /// `[`/`{` on US layouts
    Oem4 = 0xDB, "Oem4";
    /// `\`/`|` on US layouts
    Oem5 = 0xDC, "Oem5";
    /// `]`/`}` on US layouts
    Oem6 = 0xDD, "Oem6";
    /// `'`/`"` on US layouts
    Oem7 = 0xDE, "Oem7";
    /// Layout-specific
    Oem8 = 0xDF, "Oem8";
}

impl Key {
    /// Native virtual-key code, also the index into the key-press set
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Key name not recognised by [`Key::from_str`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown key name: {0}")]
pub struct ParseKeyError(pub String);

impl FromStr for Key {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseKeyError(s.to_string()))
    }
}
