//! String boundary tests
//!
//! Walks the interface through the calls a screen reader host makes:
//! preferences, markup, speech, braille and navigation.

use mathreader::api::{EXIT, OK};
use mathreader::{Interface, NavigationLocation};
use tempfile::TempDir;

const MATHML: &str = "<math>
    <mrow id='outer-mrow'>
        <mrow id='mrow-1'><mo>(</mo><mfrac linethickness='0' id='choose'><mi id='id-m'>m</mi><mi>n</mi></mfrac><mo>)</mo></mrow>
        <mrow id='mrow-2'><mo>(</mo><msqrt id='msqrt'><msup id='id-m-squared'><mi>m</mi><mn>2</mn></msup><mo>+</mo><mi>n</mi></msqrt><mo>)</mo></mrow>
    </mrow>
</math>";

fn interface() -> (Interface, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let mut api = Interface::new();
    assert_eq!(api.set_rules_dir(dir.path()), OK);
    for (name, value) in [("Language", "en"), ("SpeechStyle", "SimpleSpeak"), ("TTS", "None")] {
        assert_eq!(api.set_preference(name, value), OK, "{}", api.get_error());
    }
    (api, dir)
}

#[test]
fn test_speech_and_braille() {
    let (mut api, _dir) = interface();
    let annotated = api.set_mathml(MATHML);
    assert!(annotated.contains("id=\"mi-1\""), "{}", annotated);

    assert_eq!(
        api.spoken_text(),
        "m choose n times; open paren, the square root of m squared plus n end root; close paren"
    );
    assert_eq!(api.set_preference("BrailleCode", "Nemeth"), OK);
    assert_eq!(api.braille(""), "⠷⠍⠩⠝⠾⠷⠜⠍⠘⠆⠐⠬⠝⠻⠾");
    assert_eq!(api.get_error(), "");
}

#[test]
fn test_navigation() {
    let (mut api, _dir) = interface();
    api.set_mathml(MATHML);
    api.braille("");

    assert_eq!(api.navigate_command("ZoomIn"), "m choose n");
    assert_eq!(api.navigation_location(), NavigationLocation::node("mrow-1"));
    assert_eq!(
        api.location_from_braille_position(1),
        NavigationLocation::node("id-m")
    );

    let location = NavigationLocation::new("id-m-squared", 0);
    assert_eq!(api.set_navigation_location(&location), OK);
    assert_eq!(api.navigation_location(), location);

    assert_eq!(api.set_preference("BrailleCode", "LaTeX"), OK);
    assert_eq!(api.navigation_braille(), "m^2");
    assert_eq!(api.navigate_command("Exit"), EXIT);
}

#[test]
fn test_failures_return_empty_and_set_error_once() {
    let (mut api, _dir) = interface();

    assert_eq!(api.spoken_text(), "");
    assert_eq!(api.get_error(), "No MathML has been set");
    assert_eq!(api.get_error(), "");

    assert_eq!(api.set_mathml("<math><mfrac><mi>a</mi></mfrac></math>"), "");
    assert!(api.get_error().starts_with("Invalid MathML"));

    api.set_mathml(MATHML);
    assert_eq!(api.navigate_command("Teleport"), "");
    assert_eq!(api.get_error(), "Unknown navigation command 'Teleport'");

    let missing = NavigationLocation::node("missing");
    assert_eq!(api.set_navigation_location(&missing), "");
    assert!(!api.get_error().is_empty());
    assert!(api.navigation_location().is_empty());

    assert!(api.location_from_braille_position(0).is_empty());
    assert_eq!(
        api.get_error(),
        "No braille has been generated for the current MathML"
    );

    assert_eq!(api.navigate_key(65, false, false, false, false), "");
    assert_eq!(
        api.get_error(),
        "No navigation command for key 65 with modifiers [none]"
    );
}

#[test]
fn test_rules_dir_must_come_first() {
    let mut api = Interface::new();
    assert_eq!(api.set_mathml(MATHML), "");
    assert!(api.get_error().starts_with("Rules directory error"));
    assert_eq!(api.set_rules_dir("/definitely/not/a/dir"), "");
    assert!(!api.get_error().is_empty());
}

#[test]
fn test_supported_lists_and_version() {
    let (api, _dir) = interface();
    assert_eq!(api.supported_braille_codes(), ["Nemeth", "LaTeX", "ASCIIMath"]);
    assert_eq!(api.supported_languages(), ["en"]);
    assert_eq!(api.supported_speech_styles("en"), ["SimpleSpeak", "ClearSpeak"]);
    assert_eq!(api.version(), env!("CARGO_PKG_VERSION"));
}
