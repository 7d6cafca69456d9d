//! Error types for mathreader

use std::io;
use thiserror::Error;

/// Category of a failure as reported at the call boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or structurally invalid markup
    Input,
    /// Unknown/invalid preference or unusable rules directory
    Config,
    /// Missing expression, unknown node or bad navigation location
    State,
    /// Unrecognized command or key combination
    Command,
}

/// Main error type for mathreader
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Invalid MathML: {0}")]
    Input(String),

    #[error("Unknown preference name '{0}'")]
    UnknownPreference(String),

    #[error("Invalid value '{value}' for preference '{name}': {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Rules directory error: {0}")]
    RulesDir(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("INI parse error: {0}")]
    IniParse(String),

    #[error("No MathML has been set")]
    NoExpression,

    #[error("No node with id '{0}' in the current MathML")]
    UnknownNodeId(String),

    #[error("Offset {offset} is out of range for node '{id}'")]
    InvalidOffset { id: String, offset: usize },

    #[error("No braille has been generated for the current MathML")]
    NoBraille,

    #[error("Braille position {position} is out of range (braille has {len} cells)")]
    BraillePosition { position: usize, len: usize },

    #[error("Placemarker {0} has not been set")]
    PlacemarkerNotSet(usize),

    #[error("Unknown navigation command '{0}'")]
    UnknownCommand(String),

    #[error("No navigation command for key {key} with modifiers [{modifiers}]")]
    InvalidKey { key: u32, modifiers: String },
}

impl MathError {
    /// Boundary category of this error
    pub fn kind(&self) -> ErrorKind {
        use MathError::*;
        match self {
            Input(_) => ErrorKind::Input,
            UnknownPreference(_) | InvalidValue { .. } | RulesDir(_) | Io(_) | IniParse(_) => {
                ErrorKind::Config
            }
            NoExpression
            | UnknownNodeId(_)
            | InvalidOffset { .. }
            | NoBraille
            | BraillePosition { .. }
            | PlacemarkerNotSet(_) => ErrorKind::State,
            UnknownCommand(_) | InvalidKey { .. } => ErrorKind::Command,
        }
    }
}

/// Result type alias for mathreader operations
pub type Result<T> = std::result::Result<T, MathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(MathError::Input("x".into()).kind(), ErrorKind::Input);
        assert_eq!(MathError::UnknownPreference("x".into()).kind(), ErrorKind::Config);
        assert_eq!(MathError::NoExpression.kind(), ErrorKind::State);
        assert_eq!(MathError::UnknownCommand("x".into()).kind(), ErrorKind::Command);
    }

    #[test]
    fn test_error_messages() {
        let err = MathError::UnknownNodeId("abc".into());
        assert_eq!(err.to_string(), "No node with id 'abc' in the current MathML");
    }
}
