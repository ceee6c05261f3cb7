//! Numeric-keypad keys and the X11 keysym tables that identify them.
//!
//! X11 reports keypad keys with dedicated `KP_*` keysyms, which is the only
//! reliable signal that a digit came from the keypad rather than the main
//! row. Both NumLock states are covered: with NumLock off the keypad emits
//! the navigation-flavoured keysyms (`KP_Home`, `KP_End`, …), with NumLock
//! on it emits the digit keysyms (`KP_0` … `KP_9`).

use serde::{Deserialize, Serialize};

/// A key on the numeric keypad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumpadKey {
    Num0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,
    Decimal,
    Add,
    Subtract,
    Multiply,
    Divide,
    Enter,
}

const ALL: &[NumpadKey] = &[
    NumpadKey::Num0,
    NumpadKey::Num1,
    NumpadKey::Num2,
    NumpadKey::Num3,
    NumpadKey::Num4,
    NumpadKey::Num5,
    NumpadKey::Num6,
    NumpadKey::Num7,
    NumpadKey::Num8,
    NumpadKey::Num9,
    NumpadKey::Decimal,
    NumpadKey::Add,
    NumpadKey::Subtract,
    NumpadKey::Multiply,
    NumpadKey::Divide,
    NumpadKey::Enter,
];

impl NumpadKey {
    /// Stable machine name stored in recorded sessions (`"num_5"`, `"num_add"`).
    pub fn name(self) -> &'static str {
        match self {
            NumpadKey::Num0 => "num_0",
            NumpadKey::Num1 => "num_1",
            NumpadKey::Num2 => "num_2",
            NumpadKey::Num3 => "num_3",
            NumpadKey::Num4 => "num_4",
            NumpadKey::Num5 => "num_5",
            NumpadKey::Num6 => "num_6",
            NumpadKey::Num7 => "num_7",
            NumpadKey::Num8 => "num_8",
            NumpadKey::Num9 => "num_9",
            NumpadKey::Decimal => "num_decimal",
            NumpadKey::Add => "num_add",
            NumpadKey::Subtract => "num_subtract",
            NumpadKey::Multiply => "num_multiply",
            NumpadKey::Divide => "num_divide",
            NumpadKey::Enter => "num_enter",
        }
    }

    /// Display label (`"NUM 5"`, `"NUM +"`, `"NUM ENTER"`).
    pub fn label(self) -> &'static str {
        match self {
            NumpadKey::Num0 => "NUM 0",
            NumpadKey::Num1 => "NUM 1",
            NumpadKey::Num2 => "NUM 2",
            NumpadKey::Num3 => "NUM 3",
            NumpadKey::Num4 => "NUM 4",
            NumpadKey::Num5 => "NUM 5",
            NumpadKey::Num6 => "NUM 6",
            NumpadKey::Num7 => "NUM 7",
            NumpadKey::Num8 => "NUM 8",
            NumpadKey::Num9 => "NUM 9",
            NumpadKey::Decimal => "NUM .",
            NumpadKey::Add => "NUM +",
            NumpadKey::Subtract => "NUM -",
            NumpadKey::Multiply => "NUM *",
            NumpadKey::Divide => "NUM /",
            NumpadKey::Enter => "NUM ENTER",
        }
    }

    /// The character an injector can type to reproduce this key, if any.
    ///
    /// Keypad Enter has no character form; it is replayed as Return.
    pub fn char_equivalent(self) -> Option<char> {
        match self {
            NumpadKey::Num0 => Some('0'),
            NumpadKey::Num1 => Some('1'),
            NumpadKey::Num2 => Some('2'),
            NumpadKey::Num3 => Some('3'),
            NumpadKey::Num4 => Some('4'),
            NumpadKey::Num5 => Some('5'),
            NumpadKey::Num6 => Some('6'),
            NumpadKey::Num7 => Some('7'),
            NumpadKey::Num8 => Some('8'),
            NumpadKey::Num9 => Some('9'),
            NumpadKey::Decimal => Some('.'),
            NumpadKey::Add => Some('+'),
            NumpadKey::Subtract => Some('-'),
            NumpadKey::Multiply => Some('*'),
            NumpadKey::Divide => Some('/'),
            NumpadKey::Enter => None,
        }
    }

    /// Maps an X11 keysym to a keypad key.
    ///
    /// Covers the NumLock-off navigation keysyms, the NumLock-on digit
    /// keysyms, the operator keysyms and `KP_Enter`.
    pub fn from_keysym(keysym: u32) -> Option<NumpadKey> {
        match keysym {
            65421 => Some(NumpadKey::Enter),    // KP_Enter
            65429 => Some(NumpadKey::Num7),     // KP_Home
            65430 => Some(NumpadKey::Num1),     // KP_End
            65432 => Some(NumpadKey::Num8),     // KP_Up
            65433 => Some(NumpadKey::Num2),     // KP_Down
            65434 => Some(NumpadKey::Num9),     // KP_Prior
            65435 => Some(NumpadKey::Num3),     // KP_Next
            65436 => Some(NumpadKey::Num4),     // KP_Left
            65437 => Some(NumpadKey::Num5),     // KP_Begin
            65438 => Some(NumpadKey::Num6),     // KP_Right
            65439 => Some(NumpadKey::Decimal),  // KP_Delete
            65450 => Some(NumpadKey::Multiply), // KP_Multiply
            65451 => Some(NumpadKey::Add),      // KP_Add
            65453 => Some(NumpadKey::Subtract), // KP_Subtract
            65454 => Some(NumpadKey::Decimal),  // KP_Decimal
            65455 => Some(NumpadKey::Divide),   // KP_Divide
            65456 => Some(NumpadKey::Num0),     // KP_0
            65457 => Some(NumpadKey::Num1),     // KP_1
            65458 => Some(NumpadKey::Num2),     // KP_2
            65459 => Some(NumpadKey::Num3),     // KP_3
            65460 => Some(NumpadKey::Num4),     // KP_4
            65461 => Some(NumpadKey::Num5),     // KP_5
            65462 => Some(NumpadKey::Num6),     // KP_6
            65463 => Some(NumpadKey::Num7),     // KP_7
            65464 => Some(NumpadKey::Num8),     // KP_8
            65465 => Some(NumpadKey::Num9),     // KP_9
            _ => None,
        }
    }

    /// Maps a character to the keypad key that types it.
    ///
    /// Used when the platform flags a printable as keypad-originated without
    /// giving a keysym. `,` is accepted for the decimal key (locale keypads).
    pub fn from_char(ch: char) -> Option<NumpadKey> {
        match ch {
            '0' => Some(NumpadKey::Num0),
            '1' => Some(NumpadKey::Num1),
            '2' => Some(NumpadKey::Num2),
            '3' => Some(NumpadKey::Num3),
            '4' => Some(NumpadKey::Num4),
            '5' => Some(NumpadKey::Num5),
            '6' => Some(NumpadKey::Num6),
            '7' => Some(NumpadKey::Num7),
            '8' => Some(NumpadKey::Num8),
            '9' => Some(NumpadKey::Num9),
            '.' | ',' => Some(NumpadKey::Decimal),
            '+' => Some(NumpadKey::Add),
            '-' => Some(NumpadKey::Subtract),
            '*' => Some(NumpadKey::Multiply),
            '/' => Some(NumpadKey::Divide),
            _ => None,
        }
    }

    /// Parses either string form (`"num_add"`, `"NUM +"`, `"NUM ENTER"`).
    ///
    /// Suffix matching is lenient the way legacy files demand: `"NUM add"`
    /// and `"num_+"`-style mixtures resolve too.
    pub fn parse(text: &str) -> Option<NumpadKey> {
        let lowered = text.to_lowercase();
        if let Some(key) = ALL
            .iter()
            .copied()
            .find(|key| key.name() == lowered || key.label().to_lowercase() == lowered)
        {
            return Some(key);
        }

        // Lenient suffix forms: "num_<x>" / "NUM <x>" where <x> is a digit,
        // an operator character, or a spelled-out operator word.
        let suffix = lowered
            .strip_prefix("num_")
            .or_else(|| lowered.strip_prefix("num "))?;
        match suffix {
            "decimal" | "." | "," => Some(NumpadKey::Decimal),
            "add" | "+" => Some(NumpadKey::Add),
            "subtract" | "-" => Some(NumpadKey::Subtract),
            "multiply" | "*" => Some(NumpadKey::Multiply),
            "divide" | "/" => Some(NumpadKey::Divide),
            "enter" => Some(NumpadKey::Enter),
            _ => {
                let mut chars = suffix.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => NumpadKey::from_char(ch),
                    _ => None,
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_and_labels_round_trip_for_every_key() {
        for &key in ALL {
            assert_eq!(NumpadKey::parse(key.name()), Some(key), "name {:?}", key.name());
            assert_eq!(NumpadKey::parse(key.label()), Some(key), "label {:?}", key.label());
        }
    }

    #[test]
    fn test_numlock_off_keysyms_map_to_digits() {
        assert_eq!(NumpadKey::from_keysym(65437), Some(NumpadKey::Num5)); // KP_Begin
        assert_eq!(NumpadKey::from_keysym(65430), Some(NumpadKey::Num1)); // KP_End
        assert_eq!(NumpadKey::from_keysym(65439), Some(NumpadKey::Decimal)); // KP_Delete
    }

    #[test]
    fn test_numlock_on_keysyms_map_to_the_same_digits() {
        assert_eq!(NumpadKey::from_keysym(65456), Some(NumpadKey::Num0));
        assert_eq!(NumpadKey::from_keysym(65461), Some(NumpadKey::Num5));
        assert_eq!(NumpadKey::from_keysym(65465), Some(NumpadKey::Num9));
    }

    #[test]
    fn test_operator_keysyms() {
        assert_eq!(NumpadKey::from_keysym(65451), Some(NumpadKey::Add));
        assert_eq!(NumpadKey::from_keysym(65455), Some(NumpadKey::Divide));
        assert_eq!(NumpadKey::from_keysym(65421), Some(NumpadKey::Enter));
    }

    #[test]
    fn test_unknown_keysym_is_none() {
        assert_eq!(NumpadKey::from_keysym(65307), None); // Escape keysym
        assert_eq!(NumpadKey::from_keysym(0), None);
    }

    #[test]
    fn test_from_char_covers_digits_and_operators() {
        assert_eq!(NumpadKey::from_char('7'), Some(NumpadKey::Num7));
        assert_eq!(NumpadKey::from_char('+'), Some(NumpadKey::Add));
        assert_eq!(NumpadKey::from_char(','), Some(NumpadKey::Decimal));
        assert_eq!(NumpadKey::from_char('a'), None);
    }

    #[test]
    fn test_lenient_suffix_parsing() {
        assert_eq!(NumpadKey::parse("NUM add"), Some(NumpadKey::Add));
        assert_eq!(NumpadKey::parse("num_+"), Some(NumpadKey::Add));
        assert_eq!(NumpadKey::parse("NUM 7"), Some(NumpadKey::Num7));
        assert_eq!(NumpadKey::parse("num_enter"), Some(NumpadKey::Enter));
        assert_eq!(NumpadKey::parse("numpad7"), None);
    }

    #[test]
    fn test_char_equivalent_for_injection() {
        assert_eq!(NumpadKey::Num5.char_equivalent(), Some('5'));
        assert_eq!(NumpadKey::Divide.char_equivalent(), Some('/'));
        assert_eq!(NumpadKey::Enter.char_equivalent(), None);
    }
}
