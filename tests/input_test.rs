//! Input system tests
//!
//! Tests the navigation command vocabulary and the key binding system

use mathreader::navigate::keymap::{
    create_default_keymap, KEY_0, KEY_DOWN, KEY_END, KEY_ENTER, KEY_ESCAPE, KEY_HOME, KEY_SPACE,
    KEY_UP,
};
use mathreader::navigate::{command_for_key, Modifiers, NavCommand};
use mathreader::{ErrorKind, MathError};

fn shift() -> Modifiers {
    Modifiers {
        shift: true,
        ..Modifiers::NONE
    }
}

fn alt() -> Modifiers {
    Modifiers {
        alt: true,
        ..Modifiers::NONE
    }
}

#[test]
fn test_every_command_name_parses() {
    let names = [
        "MovePrevious", "MoveNext", "MoveStart", "MoveEnd", "MoveLineStart", "MoveLineEnd",
        "MoveCellPrevious", "MoveCellNext", "MoveCellUp", "MoveCellDown", "MoveColumnStart",
        "MoveColumnEnd", "ZoomIn", "ZoomOut", "ZoomOutAll", "ZoomInAll", "MoveLastLocation",
        "ReadPrevious", "ReadNext", "ReadCurrent", "ReadCellCurrent", "ReadStart", "ReadEnd",
        "ReadLineStart", "ReadLineEnd", "DescribePrevious", "DescribeNext", "DescribeCurrent",
        "WhereAmI", "WhereAmIAll", "ToggleZoomLockUp", "ToggleZoomLockDown", "ToggleSpeakMode",
        "Exit",
    ];
    for name in names {
        let command: NavCommand = name.parse().unwrap();
        assert_eq!(command.to_string(), name);
    }
    for n in 0..10 {
        for prefix in ["MoveTo", "Read", "Describe", "SetPlacemarker"] {
            let name = format!("{}{}", prefix, n);
            assert_eq!(name.parse::<NavCommand>().unwrap().to_string(), name);
        }
    }
}

#[test]
fn test_unknown_command_is_command_error() {
    let err = "MoveSideways".parse::<NavCommand>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Command);
    assert_eq!(err.to_string(), "Unknown navigation command 'MoveSideways'");
}

#[test]
fn test_read_only_commands() {
    assert!(NavCommand::ReadCurrent.is_read_only());
    assert!(NavCommand::Describe(3).is_read_only());
    assert!(!NavCommand::MoveTo(3).is_read_only());
    assert!(!NavCommand::ZoomIn.is_read_only());
}

#[test]
fn test_key_bindings() {
    assert_eq!(command_for_key(KEY_UP, Modifiers::NONE).unwrap(), NavCommand::ZoomOut);
    assert_eq!(command_for_key(KEY_DOWN, shift()).unwrap(), NavCommand::ZoomInAll);
    assert_eq!(command_for_key(KEY_HOME, Modifiers::NONE).unwrap(), NavCommand::MoveStart);
    assert_eq!(command_for_key(KEY_END, alt()).unwrap(), NavCommand::MoveLineEnd);
    assert_eq!(command_for_key(KEY_SPACE, alt()).unwrap(), NavCommand::ToggleSpeakMode);
    assert_eq!(command_for_key(KEY_ENTER, shift()).unwrap(), NavCommand::WhereAmIAll);
    assert_eq!(command_for_key(KEY_ESCAPE, Modifiers::NONE).unwrap(), NavCommand::Exit);
    assert_eq!(command_for_key(KEY_0 + 7, shift()).unwrap(), NavCommand::Read(7));
}

#[test]
fn test_unbound_key() {
    let err = command_for_key(KEY_ESCAPE, shift()).unwrap_err();
    assert!(matches!(err, MathError::InvalidKey { key: KEY_ESCAPE, .. }));
    assert_eq!(
        err.to_string(),
        "No navigation command for key 27 with modifiers [Shift]"
    );
}

#[test]
fn test_keymap_has_no_meta_bindings() {
    let keymap = create_default_keymap();
    assert!(keymap.keys().all(|chord| !chord.modifiers.meta));
}
