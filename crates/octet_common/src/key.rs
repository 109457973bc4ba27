/// Physical keys a frontend can report.
///
/// Only the 4x4 block used by the hex keypad plus a few control keys are
/// modelled; everything else maps to `Key::None`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Key {
    Num1,
    Num2,
    Num3,
    Num4,
    Q,
    W,
    E,
    R,
    A,
    S,
    D,
    F,
    Z,
    X,
    C,
    V,
    Space,
    Escape,
    None,
}

impl Key {
    /// Map a physical key onto the CHIP-8 hex keypad.
    ///
    /// ```text
    /// keypad            keyboard
    /// 1 2 3 C           1 2 3 4
    /// 4 5 6 D           Q W E R
    /// 7 8 9 E           A S D F
    /// A 0 B F           Z X C V
    /// ```
    pub fn to_keypad(self) -> Option<u8> {
        match self {
            Key::Num1 => Some(0x1),
            Key::Num2 => Some(0x2),
            Key::Num3 => Some(0x3),
            Key::Num4 => Some(0xC),
            Key::Q => Some(0x4),
            Key::W => Some(0x5),
            Key::E => Some(0x6),
            Key::R => Some(0xD),
            Key::A => Some(0x7),
            Key::S => Some(0x8),
            Key::D => Some(0x9),
            Key::F => Some(0xE),
            Key::Z => Some(0xA),
            Key::X => Some(0x0),
            Key::C => Some(0xB),
            Key::V => Some(0xF),
            Key::Space | Key::Escape | Key::None => None,
        }
    }

    /// Parse a single lowercase character, as produced by text-based hosts.
    pub fn from_char(c: char) -> Key {
        match c.to_ascii_lowercase() {
            '1' => Key::Num1,
            '2' => Key::Num2,
            '3' => Key::Num3,
            '4' => Key::Num4,
            'q' => Key::Q,
            'w' => Key::W,
            'e' => Key::E,
            'r' => Key::R,
            'a' => Key::A,
            's' => Key::S,
            'd' => Key::D,
            'f' => Key::F,
            'z' => Key::Z,
            'x' => Key::X,
            'c' => Key::C,
            'v' => Key::V,
            ' ' => Key::Space,
            _ => Key::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keypad_layout_covers_all_sixteen_keys_once() {
        let keys = [
            Key::Num1,
            Key::Num2,
            Key::Num3,
            Key::Num4,
            Key::Q,
            Key::W,
            Key::E,
            Key::R,
            Key::A,
            Key::S,
            Key::D,
            Key::F,
            Key::Z,
            Key::X,
            Key::C,
            Key::V,
        ];
        let mut seen = [false; 16];
        for key in keys {
            let hex = key.to_keypad().unwrap() as usize;
            assert!(!seen[hex], "keypad 0x{:X} mapped twice", hex);
            seen[hex] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn control_keys_have_no_keypad_slot() {
        assert_eq!(Key::Escape.to_keypad(), None);
        assert_eq!(Key::Space.to_keypad(), None);
        assert_eq!(Key::from_char('x').to_keypad(), Some(0x0));
        assert_eq!(Key::from_char('V').to_keypad(), Some(0xF));
    }
}
