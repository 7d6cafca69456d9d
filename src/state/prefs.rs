//! Preference store
//!
//! A fixed registry of recognized preference names, each with a value domain
//! and a default. Values are exchanged as strings and validated on `set`;
//! the last write wins. Preferences can also be loaded from (and saved to)
//! an INI file whose sections group related settings.

use crate::braille::BrailleCode;
use crate::{MathError, Result};
use ini::Ini;
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;

/// Base languages that have speech rules
pub const SUPPORTED_LANGUAGES: &[&str] = &["en"];

/// Value domain of a preference
#[derive(Debug, Clone, Copy)]
pub enum Domain {
    /// One of a fixed set of names (matched case-insensitively)
    Choice(&'static [&'static str]),
    /// A language code whose base language has speech rules
    Language,
    /// Free string matching a regex
    Pattern(&'static Lazy<Regex>),
    /// Number within an inclusive range
    Number { min: f64, max: f64 },
}

/// Registry entry
#[derive(Debug, Clone, Copy)]
pub struct PreferenceSpec {
    pub name: &'static str,
    /// INI section the preference is written under
    pub section: &'static str,
    pub domain: Domain,
    pub default: &'static str,
}

/// All recognized preferences
pub static REGISTRY: &[PreferenceSpec] = &[
    PreferenceSpec {
        name: "Language",
        section: "Speech",
        domain: Domain::Language,
        default: "en",
    },
    PreferenceSpec {
        name: "SpeechStyle",
        section: "Speech",
        domain: Domain::Choice(&["SimpleSpeak", "ClearSpeak"]),
        default: "SimpleSpeak",
    },
    PreferenceSpec {
        name: "Verbosity",
        section: "Speech",
        domain: Domain::Choice(&["Terse", "Medium", "Verbose"]),
        default: "Medium",
    },
    PreferenceSpec {
        name: "TTS",
        section: "Speech",
        domain: Domain::Choice(&["None", "SSML", "SAPI5"]),
        default: "None",
    },
    PreferenceSpec {
        name: "MathRate",
        section: "Speech",
        domain: Domain::Number {
            min: 10.0,
            max: 500.0,
        },
        default: "100",
    },
    PreferenceSpec {
        name: "PauseFactor",
        section: "Speech",
        domain: Domain::Number {
            min: 0.0,
            max: 1000.0,
        },
        default: "100",
    },
    PreferenceSpec {
        name: "DecimalSeparators",
        section: "Speech",
        domain: Domain::Pattern(&SEPARATORS),
        default: ".",
    },
    PreferenceSpec {
        name: "BrailleCode",
        section: "Braille",
        domain: Domain::Choice(&["Nemeth", "LaTeX", "ASCIIMath"]),
        default: "Nemeth",
    },
    PreferenceSpec {
        name: "BrailleNavHighlight",
        section: "Braille",
        domain: Domain::Choice(&["Off", "FirstChar", "EndPoints", "All"]),
        default: "EndPoints",
    },
    PreferenceSpec {
        name: "NavMode",
        section: "Navigation",
        domain: Domain::Choice(&["Enhanced", "Simple", "Character"]),
        default: "Enhanced",
    },
    PreferenceSpec {
        name: "NavVerbosity",
        section: "Navigation",
        domain: Domain::Choice(&["Terse", "Medium", "Verbose"]),
        default: "Medium",
    },
    PreferenceSpec {
        name: "Overview",
        section: "Navigation",
        domain: Domain::Choice(&["false", "true"]),
        default: "false",
    },
];

static LANGUAGE_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z]{2,3}(-[a-zA-Z0-9]{2,8})*$").expect("language code regex")
});

static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\sA-Za-z0-9]{1,4}$").expect("separator regex"));

/// Look up a registry entry
pub fn spec(name: &str) -> Option<&'static PreferenceSpec> {
    REGISTRY.iter().find(|spec| spec.name == name)
}

impl Domain {
    /// Validate `value`, returning its canonical form
    fn validate(&self, name: &str, value: &str) -> Result<String> {
        let invalid = |reason: String| MathError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
            reason,
        };
        let value = value.trim();
        match *self {
            Domain::Choice(choices) => choices
                .iter()
                .find(|choice| choice.eq_ignore_ascii_case(value))
                .map(|choice| choice.to_string())
                .ok_or_else(|| invalid(format!("expected one of {}", choices.join(", ")))),
            Domain::Language => {
                if !LANGUAGE_CODE.is_match(value) {
                    return Err(invalid("not a language code".to_string()));
                }
                let code = value.to_ascii_lowercase();
                let base = code.split('-').next().unwrap_or(&code);
                if SUPPORTED_LANGUAGES.contains(&base) {
                    Ok(code)
                } else {
                    Err(invalid(format!(
                        "supported languages are {}",
                        SUPPORTED_LANGUAGES.join(", ")
                    )))
                }
            }
            Domain::Pattern(pattern) => {
                if pattern.is_match(value) {
                    Ok(value.to_string())
                } else {
                    Err(invalid(format!("must match {}", pattern.as_str())))
                }
            }
            Domain::Number { min, max } => {
                let number: f64 = value
                    .parse()
                    .map_err(|_| invalid("not a number".to_string()))?;
                if !number.is_finite() || number < min || number > max {
                    return Err(invalid(format!("must be between {} and {}", min, max)));
                }
                Ok(format_number(number))
            }
        }
    }
}

fn format_number(number: f64) -> String {
    if number.fract() == 0.0 {
        format!("{}", number as i64)
    } else {
        number.to_string()
    }
}

/// Speech rule set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechStyle {
    SimpleSpeak,
    ClearSpeak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Terse,
    Medium,
    Verbose,
}

/// Speech markup for pauses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tts {
    None,
    Ssml,
    Sapi5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavMode {
    Enhanced,
    Simple,
    Character,
}

impl NavMode {
    pub fn as_str(self) -> &'static str {
        match self {
            NavMode::Enhanced => "Enhanced",
            NavMode::Simple => "Simple",
            NavMode::Character => "Character",
        }
    }
}

/// Which braille cells of the navigation node get dots 7 and 8
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Off,
    FirstChar,
    EndPoints,
    All,
}

fn parse_verbosity(value: &str) -> Verbosity {
    match value {
        "Terse" => Verbosity::Terse,
        "Verbose" => Verbosity::Verbose,
        _ => Verbosity::Medium,
    }
}

/// Current preference values
#[derive(Debug, Clone)]
pub struct Preferences {
    values: HashMap<&'static str, String>,
}

impl Preferences {
    /// All preferences at their defaults
    pub fn new() -> Self {
        let values = REGISTRY
            .iter()
            .map(|spec| (spec.name, spec.default.to_string()))
            .collect();
        Self { values }
    }

    /// Validate and store a preference value
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        let spec = spec(name).ok_or_else(|| MathError::UnknownPreference(name.to_string()))?;
        let canonical = spec.domain.validate(name, value)?;
        debug!("Preference {} = {}", spec.name, canonical);
        self.values.insert(spec.name, canonical);
        Ok(())
    }

    /// Current value of a preference
    pub fn get(&self, name: &str) -> Result<String> {
        let spec = spec(name).ok_or_else(|| MathError::UnknownPreference(name.to_string()))?;
        Ok(self.raw(spec.name).to_string())
    }

    fn raw(&self, name: &str) -> &str {
        self.values
            .get(name)
            .map(String::as_str)
            .or_else(|| spec(name).map(|spec| spec.default))
            .unwrap_or("")
    }

    /// Apply every valid entry of an INI file; invalid entries are skipped
    ///
    /// Returns the number of preferences applied.
    pub fn load_ini(&mut self, path: &Path) -> Result<usize> {
        debug!("Loading preferences from {:?}", path);
        let ini = Ini::load_from_file(path)
            .map_err(|e| MathError::IniParse(format!("Failed to load {:?}: {}", path, e)))?;

        let mut applied = 0;
        for (_section, properties) in ini.iter() {
            for (name, value) in properties.iter() {
                match self.set(name, value) {
                    Ok(()) => applied += 1,
                    Err(e) => warn!("Ignoring {}={} in {:?}: {}", name, value, path, e),
                }
            }
        }
        info!("Applied {} preferences from {:?}", applied, path);
        Ok(applied)
    }

    /// Write all preferences to an INI file, grouped by section
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut ini = Ini::new();
        for spec in REGISTRY {
            ini.with_section(Some(spec.section))
                .set(spec.name, self.raw(spec.name));
        }
        ini.write_to_file(path)?;
        Ok(())
    }

    // Typed getters used by the rule engine and navigation

    pub fn language(&self) -> &str {
        self.raw("Language")
    }

    pub fn speech_style(&self) -> SpeechStyle {
        match self.raw("SpeechStyle") {
            "ClearSpeak" => SpeechStyle::ClearSpeak,
            _ => SpeechStyle::SimpleSpeak,
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        parse_verbosity(self.raw("Verbosity"))
    }

    pub fn tts(&self) -> Tts {
        match self.raw("TTS") {
            "SSML" => Tts::Ssml,
            "SAPI5" => Tts::Sapi5,
            _ => Tts::None,
        }
    }

    /// Speech rate as a percentage of normal
    pub fn math_rate(&self) -> f64 {
        self.raw("MathRate").parse().unwrap_or(100.0)
    }

    /// Pause length as a percentage of normal
    pub fn pause_factor(&self) -> f64 {
        self.raw("PauseFactor").parse().unwrap_or(100.0)
    }

    pub fn decimal_separators(&self) -> &str {
        self.raw("DecimalSeparators")
    }

    pub fn braille_code(&self) -> BrailleCode {
        BrailleCode::from_name(self.raw("BrailleCode")).unwrap_or(BrailleCode::Nemeth)
    }

    pub fn nav_highlight(&self) -> Highlight {
        match self.raw("BrailleNavHighlight") {
            "Off" => Highlight::Off,
            "FirstChar" => Highlight::FirstChar,
            "All" => Highlight::All,
            _ => Highlight::EndPoints,
        }
    }

    pub fn nav_mode(&self) -> NavMode {
        match self.raw("NavMode") {
            "Simple" => NavMode::Simple,
            "Character" => NavMode::Character,
            _ => NavMode::Enhanced,
        }
    }

    pub fn nav_verbosity(&self) -> Verbosity {
        parse_verbosity(self.raw("NavVerbosity"))
    }

    /// Should navigation moves speak the describe rendering?
    pub fn overview(&self) -> bool {
        self.raw("Overview") == "true"
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self::new()
    }
}
