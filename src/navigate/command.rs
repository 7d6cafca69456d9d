//! Navigation command vocabulary

use crate::MathError;
use std::fmt;
use std::str::FromStr;

/// A navigation command
///
/// The set is closed: command strings outside it are rejected with
/// [`MathError::UnknownCommand`]. Numbered commands take a placemarker slot
/// from 0 to 9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavCommand {
    // Movement
    MovePrevious,
    MoveNext,
    MoveStart,
    MoveEnd,
    MoveLineStart,
    MoveLineEnd,
    MoveCellPrevious,
    MoveCellNext,
    MoveCellUp,
    MoveCellDown,
    MoveColumnStart,
    MoveColumnEnd,
    MoveLastLocation,

    // Zoom
    ZoomIn,
    ZoomOut,
    ZoomInAll,
    ZoomOutAll,

    // Read and describe
    ReadPrevious,
    ReadNext,
    ReadCurrent,
    ReadCellCurrent,
    ReadStart,
    ReadEnd,
    ReadLineStart,
    ReadLineEnd,
    DescribePrevious,
    DescribeNext,
    DescribeCurrent,
    WhereAmI,
    WhereAmIAll,

    // Modes
    ToggleZoomLockUp,
    ToggleZoomLockDown,
    ToggleSpeakMode,
    Exit,

    // Placemarkers
    MoveTo(u8),
    Read(u8),
    Describe(u8),
    SetPlacemarker(u8),
}

const SIMPLE_COMMANDS: &[(&str, NavCommand)] = &[
    ("MovePrevious", NavCommand::MovePrevious),
    ("MoveNext", NavCommand::MoveNext),
    ("MoveStart", NavCommand::MoveStart),
    ("MoveEnd", NavCommand::MoveEnd),
    ("MoveLineStart", NavCommand::MoveLineStart),
    ("MoveLineEnd", NavCommand::MoveLineEnd),
    ("MoveCellPrevious", NavCommand::MoveCellPrevious),
    ("MoveCellNext", NavCommand::MoveCellNext),
    ("MoveCellUp", NavCommand::MoveCellUp),
    ("MoveCellDown", NavCommand::MoveCellDown),
    ("MoveColumnStart", NavCommand::MoveColumnStart),
    ("MoveColumnEnd", NavCommand::MoveColumnEnd),
    ("MoveLastLocation", NavCommand::MoveLastLocation),
    ("ZoomIn", NavCommand::ZoomIn),
    ("ZoomOut", NavCommand::ZoomOut),
    ("ZoomInAll", NavCommand::ZoomInAll),
    ("ZoomOutAll", NavCommand::ZoomOutAll),
    ("ReadPrevious", NavCommand::ReadPrevious),
    ("ReadNext", NavCommand::ReadNext),
    ("ReadCurrent", NavCommand::ReadCurrent),
    ("ReadCellCurrent", NavCommand::ReadCellCurrent),
    ("ReadStart", NavCommand::ReadStart),
    ("ReadEnd", NavCommand::ReadEnd),
    ("ReadLineStart", NavCommand::ReadLineStart),
    ("ReadLineEnd", NavCommand::ReadLineEnd),
    ("DescribePrevious", NavCommand::DescribePrevious),
    ("DescribeNext", NavCommand::DescribeNext),
    ("DescribeCurrent", NavCommand::DescribeCurrent),
    ("WhereAmI", NavCommand::WhereAmI),
    ("WhereAmIAll", NavCommand::WhereAmIAll),
    ("ToggleZoomLockUp", NavCommand::ToggleZoomLockUp),
    ("ToggleZoomLockDown", NavCommand::ToggleZoomLockDown),
    ("ToggleSpeakMode", NavCommand::ToggleSpeakMode),
    ("Exit", NavCommand::Exit),
];

const NUMBERED_PREFIXES: &[(&str, fn(u8) -> NavCommand)] = &[
    ("MoveTo", NavCommand::MoveTo),
    ("Read", NavCommand::Read),
    ("Describe", NavCommand::Describe),
    ("SetPlacemarker", NavCommand::SetPlacemarker),
];

impl FromStr for NavCommand {
    type Err = MathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((_, command)) = SIMPLE_COMMANDS.iter().find(|(name, _)| *name == s) {
            return Ok(*command);
        }
        for (prefix, make) in NUMBERED_PREFIXES {
            if let Some(digit) = s.strip_prefix(prefix) {
                if let [d @ b'0'..=b'9'] = digit.as_bytes() {
                    return Ok(make(d - b'0'));
                }
            }
        }
        Err(MathError::UnknownCommand(s.to_string()))
    }
}

impl fmt::Display for NavCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavCommand::MoveTo(n) => write!(f, "MoveTo{}", n),
            NavCommand::Read(n) => write!(f, "Read{}", n),
            NavCommand::Describe(n) => write!(f, "Describe{}", n),
            NavCommand::SetPlacemarker(n) => write!(f, "SetPlacemarker{}", n),
            other => {
                let name = SIMPLE_COMMANDS
                    .iter()
                    .find(|(_, command)| command == other)
                    .map(|(name, _)| *name)
                    .unwrap_or("Unknown");
                f.write_str(name)
            }
        }
    }
}

impl NavCommand {
    /// Does the command only render, leaving the navigation state alone?
    pub fn is_read_only(self) -> bool {
        use NavCommand::*;
        matches!(
            self,
            ReadPrevious
                | ReadNext
                | ReadCurrent
                | ReadCellCurrent
                | ReadStart
                | ReadEnd
                | ReadLineStart
                | ReadLineEnd
                | DescribePrevious
                | DescribeNext
                | DescribeCurrent
                | WhereAmI
                | WhereAmIAll
                | Read(_)
                | Describe(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!("ZoomIn".parse::<NavCommand>().unwrap(), NavCommand::ZoomIn);
        assert_eq!("MoveTo3".parse::<NavCommand>().unwrap(), NavCommand::MoveTo(3));
        assert_eq!(
            "SetPlacemarker0".parse::<NavCommand>().unwrap(),
            NavCommand::SetPlacemarker(0)
        );
        for bad in ["zoomin", "MoveTo10", "Read", "Describe-1", "", "Fly"] {
            assert!(matches!(
                bad.parse::<NavCommand>(),
                Err(MathError::UnknownCommand(_))
            ));
        }
    }

    #[test]
    fn test_display_round_trip() {
        for (name, command) in SIMPLE_COMMANDS {
            assert_eq!(command.to_string(), *name);
        }
        assert_eq!(NavCommand::Describe(7).to_string(), "Describe7");
    }
}
