//! Default key bindings for navigation
//!
//! Keys are identified by their virtual key code plus modifier flags.

use super::NavCommand;
use crate::{MathError, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const KEY_BACKSPACE: u32 = 8;
pub const KEY_ENTER: u32 = 13;
pub const KEY_ESCAPE: u32 = 27;
pub const KEY_SPACE: u32 = 32;
pub const KEY_END: u32 = 35;
pub const KEY_HOME: u32 = 36;
pub const KEY_LEFT: u32 = 37;
pub const KEY_UP: u32 = 38;
pub const KEY_RIGHT: u32 = 39;
pub const KEY_DOWN: u32 = 40;
pub const KEY_0: u32 = 48;

/// Modifier keys held with a key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    const fn new(shift: bool, control: bool, alt: bool) -> Self {
        Modifiers {
            shift,
            control,
            alt,
            meta: false,
        }
    }

    fn describe(&self) -> String {
        let mut names = Vec::new();
        if self.control {
            names.push("Ctrl");
        }
        if self.alt {
            names.push("Alt");
        }
        if self.shift {
            names.push("Shift");
        }
        if self.meta {
            names.push("Meta");
        }
        if names.is_empty() {
            "none".to_string()
        } else {
            names.join("+")
        }
    }
}

/// A key with its modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub key: u32,
    pub modifiers: Modifiers,
}

const SHIFT: Modifiers = Modifiers::new(true, false, false);
const CTRL: Modifiers = Modifiers::new(false, true, false);
const ALT: Modifiers = Modifiers::new(false, false, true);
const CTRL_SHIFT: Modifiers = Modifiers::new(true, true, false);
const ALT_SHIFT: Modifiers = Modifiers::new(true, false, true);

static DEFAULT_KEYMAP: Lazy<HashMap<KeyChord, NavCommand>> = Lazy::new(create_default_keymap);

/// Create the default keymap
pub fn create_default_keymap() -> HashMap<KeyChord, NavCommand> {
    use NavCommand::*;
    let mut map = HashMap::new();
    let mut bind = |key: u32, modifiers: Modifiers, command: NavCommand| {
        map.insert(KeyChord { key, modifiers }, command);
    };

    // Siblings (left/right)
    bind(KEY_LEFT, Modifiers::NONE, MovePrevious);
    bind(KEY_RIGHT, Modifiers::NONE, MoveNext);
    bind(KEY_LEFT, SHIFT, ReadPrevious);
    bind(KEY_RIGHT, SHIFT, ReadNext);
    bind(KEY_LEFT, CTRL_SHIFT, DescribePrevious);
    bind(KEY_RIGHT, CTRL_SHIFT, DescribeNext);

    // Table cells (ctrl+arrows)
    bind(KEY_LEFT, CTRL, MoveCellPrevious);
    bind(KEY_RIGHT, CTRL, MoveCellNext);
    bind(KEY_UP, CTRL, MoveCellUp);
    bind(KEY_DOWN, CTRL, MoveCellDown);

    // Zoom (up/down)
    bind(KEY_UP, Modifiers::NONE, ZoomOut);
    bind(KEY_DOWN, Modifiers::NONE, ZoomIn);
    bind(KEY_UP, SHIFT, ZoomOutAll);
    bind(KEY_DOWN, SHIFT, ZoomInAll);
    bind(KEY_UP, ALT, ToggleZoomLockUp);
    bind(KEY_DOWN, ALT, ToggleZoomLockDown);

    // Ends (home/end)
    bind(KEY_HOME, Modifiers::NONE, MoveStart);
    bind(KEY_END, Modifiers::NONE, MoveEnd);
    bind(KEY_HOME, SHIFT, ReadStart);
    bind(KEY_END, SHIFT, ReadEnd);
    bind(KEY_HOME, CTRL, MoveColumnStart);
    bind(KEY_END, CTRL, MoveColumnEnd);
    bind(KEY_HOME, ALT, MoveLineStart);
    bind(KEY_END, ALT, MoveLineEnd);
    bind(KEY_HOME, ALT_SHIFT, ReadLineStart);
    bind(KEY_END, ALT_SHIFT, ReadLineEnd);

    // Reading in place
    bind(KEY_SPACE, Modifiers::NONE, ReadCurrent);
    bind(KEY_SPACE, SHIFT, ReadCellCurrent);
    bind(KEY_SPACE, CTRL, DescribeCurrent);
    bind(KEY_SPACE, ALT, ToggleSpeakMode);
    bind(KEY_ENTER, Modifiers::NONE, WhereAmI);
    bind(KEY_ENTER, SHIFT, WhereAmIAll);

    // Special keys
    bind(KEY_BACKSPACE, Modifiers::NONE, MoveLastLocation);
    bind(KEY_ESCAPE, Modifiers::NONE, Exit);

    // Placemarkers (digits)
    for n in 0..10u8 {
        let key = KEY_0 + u32::from(n);
        bind(key, Modifiers::NONE, MoveTo(n));
        bind(key, SHIFT, Read(n));
        bind(key, ALT, Describe(n));
        bind(key, CTRL, SetPlacemarker(n));
    }

    map
}

/// Look up the command bound to a key chord
pub fn command_for_key(key: u32, modifiers: Modifiers) -> Result<NavCommand> {
    DEFAULT_KEYMAP
        .get(&KeyChord { key, modifiers })
        .copied()
        .ok_or_else(|| MathError::InvalidKey {
            key,
            modifiers: modifiers.describe(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keymap_bindings() {
        assert_eq!(
            command_for_key(KEY_DOWN, Modifiers::NONE).unwrap(),
            NavCommand::ZoomIn
        );
        assert_eq!(
            command_for_key(KEY_0 + 4, CTRL).unwrap(),
            NavCommand::SetPlacemarker(4)
        );
        assert_eq!(
            command_for_key(KEY_LEFT, CTRL_SHIFT).unwrap(),
            NavCommand::DescribePrevious
        );
    }

    #[test]
    fn test_unbound_chord() {
        let meta = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        let err = command_for_key(KEY_LEFT, meta).unwrap_err();
        assert!(matches!(err, MathError::InvalidKey { key: KEY_LEFT, .. }));
        assert!(command_for_key(65, Modifiers::NONE).is_err());
    }

    #[test]
    fn test_binding_count() {
        let map = create_default_keymap();
        assert_eq!(map.len(), 34 + 40);
    }
}
