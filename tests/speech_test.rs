//! Integration tests for speech rendering
//!
//! These tests verify spoken text for whole expressions and for single
//! nodes across speech styles, verbosity levels and TTS markup.

use mathreader::Session;
use tempfile::TempDir;

const BINOMIAL_TIMES_ROOT: &str = "<math><mrow id='outer-mrow'><mrow id='mrow-1'><mo>(</mo><mfrac linethickness='0' id='choose'><mi id='id-m'>m</mi><mi>n</mi></mfrac><mo>)</mo></mrow><mrow id='mrow-2'><mo>(</mo><msqrt id='msqrt'><msup id='id-m-squared'><mi>m</mi><mn>2</mn></msup><mo>+</mo><mi>n</mi></msqrt><mo>)</mo></mrow></mrow></math>";

fn session(prefs: &[(&str, &str)]) -> (Session, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::new();
    session.set_rules_dir(dir.path()).unwrap();
    for (name, value) in prefs {
        session.set_preference(name, value).unwrap();
    }
    (session, dir)
}

fn speak(prefs: &[(&str, &str)], markup: &str) -> String {
    let (mut session, _dir) = session(prefs);
    session.set_mathml(markup).unwrap();
    session.spoken_text().unwrap()
}

#[test]
fn test_binomial_times_square_root() {
    assert_eq!(
        speak(&[], BINOMIAL_TIMES_ROOT),
        "m choose n times; open paren, the square root of m squared plus n end root; close paren"
    );
}

#[test]
fn test_binomial_is_not_a_fraction() {
    let markup = "<math><mfrac linethickness='0px'><mi>m</mi><mi>n</mi></mfrac></math>";
    assert_eq!(speak(&[], markup), "m choose n");
    let markup = "<math><mfrac><mi>m</mi><mi>n</mi></mfrac></math>";
    assert_eq!(speak(&[], markup), "m over n");
}

#[test]
fn test_fractions_by_style() {
    let common = "<math><mfrac><mn>3</mn><mn>4</mn></mfrac></math>";
    assert_eq!(speak(&[], common), "3 over 4");
    assert_eq!(speak(&[("SpeechStyle", "ClearSpeak")], common), "3 fourths");

    let half = "<math><mfrac><mn>1</mn><mn>2</mn></mfrac></math>";
    assert_eq!(speak(&[("SpeechStyle", "clearspeak")], half), "1 half");

    let complex = "<math><mfrac><mrow><mi>a</mi><mo>+</mo><mi>b</mi></mrow><mi>c</mi></mfrac></math>";
    assert_eq!(speak(&[], complex), "fraction a plus b over c end fraction");
}

#[test]
fn test_powers() {
    assert_eq!(
        speak(&[], "<math><msup><mi>x</mi><mn>3</mn></msup></math>"),
        "x cubed"
    );
    assert_eq!(
        speak(&[], "<math><msup><mi>x</mi><mn>5</mn></msup></math>"),
        "x to the fifth power"
    );
    assert_eq!(
        speak(&[], "<math><msup><mi>e</mi><mi>t</mi></msup></math>"),
        "e to the t power"
    );
    assert_eq!(
        speak(&[], "<math><msub><mi>x</mi><mn>1</mn></msub></math>"),
        "x sub 1"
    );
}

#[test]
fn test_symbols_and_numbers() {
    assert_eq!(
        speak(&[], "<math><mi>α</mi><mo>≤</mo><mn>3.5</mn></math>"),
        "alpha is less than or equal to 3 point 5"
    );
    assert_eq!(
        speak(&[("DecimalSeparators", ",")], "<math><mn>3,5</mn></math>"),
        "3 point 5"
    );
}

#[test]
fn test_describe_is_verbose() {
    let (mut session, _dir) = session(&[]);
    session
        .set_mathml("<math><mfrac id='f'><mi>a</mi><mi>b</mi></mfrac></math>")
        .unwrap();
    assert_eq!(session.speech_for("f", false).unwrap(), "a over b");
    assert_eq!(
        session.speech_for("f", true).unwrap(),
        "the fraction with numerator a; and denominator b"
    );
}

#[test]
fn test_node_speech_is_a_fragment_of_the_whole() {
    let (mut session, _dir) = session(&[]);
    session.set_mathml(BINOMIAL_TIMES_ROOT).unwrap();
    let whole = session.spoken_text().unwrap();
    for id in ["choose", "msqrt", "id-m-squared", "id-m"] {
        let part = session.speech_for(id, false).unwrap();
        assert!(whole.contains(&part), "'{}' not in '{}'", part, whole);
    }
}

#[test]
fn test_ssml_rate() {
    let text = speak(
        &[("TTS", "SSML"), ("MathRate", "50")],
        "<math><mfrac><mi>a</mi><mi>b</mi></mfrac></math>",
    );
    assert_eq!(text, "<prosody rate='50%'>a over b</prosody>");
}

#[test]
fn test_sapi5_rate() {
    let text = speak(
        &[("TTS", "SAPI5"), ("MathRate", "300")],
        "<math><mi>x</mi></math>",
    );
    assert_eq!(text, "<rate speed='10'>x</rate>");
}

#[test]
fn test_table() {
    let markup = "<math><mtable><mtr><mtd><mn>1</mn></mtd><mtd><mn>2</mn></mtd></mtr><mtr><mtd><mn>3</mn></mtd><mtd><mn>4</mn></mtd></mtr></mtable></math>";
    let text = speak(&[], markup);
    assert!(text.starts_with("table with 2 rows and 2 columns;"), "{}", text);
    assert!(text.contains("row 1"), "{}", text);
    assert!(text.contains("column 2"), "{}", text);
}

#[test]
fn test_semantics_speaks_presentation_only() {
    let markup = "<math><semantics><mrow><mi>x</mi><mo>+</mo><mi>y</mi></mrow><annotation-xml encoding='MathML-Content'><apply><plus/><ci>x</ci><ci>y</ci></apply></annotation-xml><annotation encoding='TeX'>x+y</annotation></semantics></math>";
    assert_eq!(speak(&[], markup), "x plus y");
}

#[test]
fn test_string_literal() {
    assert_eq!(speak(&[], "<math><ms>hello   world</ms></math>"), "hello world");
}

#[test]
fn test_mfenced() {
    assert_eq!(
        speak(&[], "<math><mfenced><mi>a</mi><mi>b</mi></mfenced></math>"),
        "open paren, a comma b; close paren"
    );
    assert_eq!(
        speak(&[], "<math><mfenced><mi>x</mi></mfenced></math>"),
        "open paren x close paren"
    );
}

#[test]
fn test_multiscripts() {
    let markup = "<math><mmultiscripts><mi>C</mi><mn>2</mn><none/><mprescripts/><mn>1</mn><mn>3</mn></mmultiscripts></math>";
    assert_eq!(speak(&[], markup), "cap c sub 2, with prescripts sub 1 super 3");
    assert_eq!(
        speak(&[], "<math><mmultiscripts><mi>x</mi><mi>i</mi><mi>j</mi></mmultiscripts></math>"),
        "x sub i super j"
    );
}

#[test]
fn test_labeled_row_label_is_not_spoken() {
    let markup = "<math><mtable><mlabeledtr><mtd><mtext>(1.1)</mtext></mtd><mtd><mn>1</mn></mtd><mtd><mn>2</mn></mtd></mlabeledtr></mtable></math>";
    let text = speak(&[], markup);
    assert!(text.starts_with("table with 1 row and 2 columns;"), "{}", text);
    assert!(!text.contains("1.1"), "{}", text);
}

#[test]
fn test_maction_speaks_selected_child() {
    let markup = "<math><maction actiontype='toggle' selection='2'><mi>a</mi><mi>b</mi></maction></math>";
    assert_eq!(speak(&[], markup), "b");
    let markup = "<math><maction actiontype='toggle'><mi>a</mi><mi>b</mi></maction></math>";
    assert_eq!(speak(&[], markup), "a");
}
