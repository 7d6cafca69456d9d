//! Configuration loading tests
//!
//! Tests that preferences and symbol names load from a rules directory
//! and provide expected default values

use mathreader::state::prefs::{NavMode, Preferences, Tts};
use mathreader::{MathError, Session};
use std::fs;
use tempfile::TempDir;

const SUM: &str = "<math><mi>a</mi><mo>+</mo><mi>b</mi></math>";

fn rules_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create rules dir")
}

#[test]
fn test_defaults() {
    let prefs = Preferences::new();
    assert_eq!(prefs.get("SpeechStyle").unwrap(), "SimpleSpeak");
    assert_eq!(prefs.get("BrailleCode").unwrap(), "Nemeth");
    assert_eq!(prefs.get("MathRate").unwrap(), "100");
    assert_eq!(prefs.nav_mode(), NavMode::Enhanced);
    assert!(!prefs.overview());
}

#[test]
fn test_prefs_ini_applied_from_rules_dir() {
    let dir = rules_dir();
    fs::write(
        dir.path().join("prefs.ini"),
        "[Speech]\nTTS = ssml\nVerbosity = Loud\n\n[Navigation]\nNavMode = simple\n",
    )
    .unwrap();

    let mut session = Session::new();
    session.set_rules_dir(dir.path()).unwrap();

    // Valid entries are applied in canonical case, invalid ones skipped
    assert_eq!(session.preference("TTS").unwrap(), "SSML");
    assert_eq!(session.preference("NavMode").unwrap(), "Simple");
    assert_eq!(session.preference("Verbosity").unwrap(), "Medium");
    assert_eq!(session.preferences().tts(), Tts::Ssml);
}

#[test]
fn test_save_and_reload() {
    let dir = rules_dir();
    let path = dir.path().join("prefs.ini");

    let mut prefs = Preferences::new();
    prefs.set("BrailleCode", "latex").unwrap();
    prefs.set("PauseFactor", "250").unwrap();
    prefs.set("Overview", "true").unwrap();
    prefs.save(&path).unwrap();

    let mut reloaded = Preferences::new();
    let applied = reloaded.load_ini(&path).unwrap();
    assert_eq!(applied, 12);
    assert_eq!(reloaded.get("BrailleCode").unwrap(), "LaTeX");
    assert_eq!(reloaded.get("PauseFactor").unwrap(), "250");
    assert!(reloaded.overview());
}

#[test]
fn test_unreadable_prefs_is_config_error() {
    let dir = rules_dir();
    fs::write(dir.path().join("prefs.ini"), "[Speech\nTTS = ssml\n").unwrap();

    let mut session = Session::new();
    let err = session.set_rules_dir(dir.path()).unwrap_err();
    assert!(matches!(err, MathError::IniParse(_)));
    assert!(session.rules_dir().is_none());
}

#[test]
fn test_symbol_overrides() {
    let dir = rules_dir();
    fs::create_dir(dir.path().join("en")).unwrap();
    fs::write(dir.path().join("en/unicode.ini"), "[symbols]\n43 = add\n").unwrap();

    let mut session = Session::new();
    session.set_rules_dir(dir.path()).unwrap();
    session.set_mathml(SUM).unwrap();
    assert_eq!(session.spoken_text().unwrap(), "a add b");
}

#[test]
fn test_language_change_reloads_symbols() {
    let dir = rules_dir();
    let mut session = Session::new();
    session.set_rules_dir(dir.path()).unwrap();
    session.set_mathml(SUM).unwrap();
    assert_eq!(session.spoken_text().unwrap(), "a plus b");

    fs::create_dir(dir.path().join("en")).unwrap();
    fs::write(dir.path().join("en/unicode.ini"), "[symbols]\n43 = and\n").unwrap();
    session.set_preference("Language", "en-US").unwrap();
    assert_eq!(session.preference("Language").unwrap(), "en-us");
    assert_eq!(session.spoken_text().unwrap(), "a and b");
}

#[test]
fn test_invalid_values() {
    let mut prefs = Preferences::new();
    assert!(matches!(
        prefs.set("MathRate", "5"),
        Err(MathError::InvalidValue { .. })
    ));
    assert!(matches!(
        prefs.set("Language", "fr"),
        Err(MathError::InvalidValue { .. })
    ));
    assert!(matches!(
        prefs.set("DecimalSeparators", "a"),
        Err(MathError::InvalidValue { .. })
    ));
    assert!(matches!(
        prefs.get("Volume"),
        Err(MathError::UnknownPreference(_))
    ));
}
