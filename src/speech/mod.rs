//! Speech rendering
//!
//! English SimpleSpeak and ClearSpeak share one [`Notation`] implementation;
//! the style only changes which rule tables are consulted. Pauses and the
//! speech rate are expressed according to the `TTS` preference.

pub mod english;

use crate::rules::{self, Notation, Pause, Renderer, Rule, RuleContext};
use crate::state::prefs::{Preferences, SpeechStyle, Tts};
use crate::tree::{ExpressionNode, NodeKind};
use once_cell::sync::Lazy;
use regex::Regex;

/// Speech styles with rules, in preference-value spelling
pub const SUPPORTED_STYLES: &[&str] = &["SimpleSpeak", "ClearSpeak"];

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));
static SPACE_BEFORE_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+([,;])").expect("punctuation regex"));

/// English speech in one style
pub struct English {
    style: SpeechStyle,
    tts: Tts,
    rate: f64,
    pause_factor: f64,
}

impl English {
    pub fn new(prefs: &Preferences) -> Self {
        Self {
            style: prefs.speech_style(),
            tts: prefs.tts(),
            rate: prefs.math_rate(),
            pause_factor: prefs.pause_factor(),
        }
    }

    fn pause_ms(&self, pause: Pause) -> u32 {
        let base = match pause {
            Pause::Short => 150.0,
            Pause::Medium => 300.0,
            Pause::Long => 600.0,
        };
        (base * self.pause_factor / 100.0).round() as u32
    }
}

impl Notation for English {
    fn name(&self) -> &'static str {
        match self.style {
            SpeechStyle::SimpleSpeak => "SimpleSpeak",
            SpeechStyle::ClearSpeak => "ClearSpeak",
        }
    }

    fn rules(&self, kind: NodeKind) -> &'static [Rule] {
        english::rules(self.style, kind)
    }

    fn separator(&self) -> &'static str {
        " "
    }

    fn token(&self, r: &mut Renderer, node: &ExpressionNode) {
        let text = english::token_text(node, &r.ctx);
        r.word(&text);
    }

    fn row(&self, r: &mut Renderer, children: &[ExpressionNode]) {
        english::row(r, children);
    }

    fn pause(&self, r: &mut Renderer, pause: Pause) {
        if r.is_empty() {
            return;
        }
        match self.tts {
            Tts::None => {
                if matches!(r.last_char(), Some(',' | ';' | '.')) {
                    return;
                }
                r.attach(match pause {
                    Pause::Short => ",",
                    Pause::Medium | Pause::Long => ";",
                });
            }
            Tts::Ssml => {
                let ms = self.pause_ms(pause);
                if ms > 0 {
                    r.word(&format!("<break time='{}ms'/>", ms));
                }
            }
            Tts::Sapi5 => {
                let ms = self.pause_ms(pause);
                if ms > 0 {
                    r.word(&format!("<silence msec='{}'/>", ms));
                }
            }
        }
    }

    fn finish(&self, text: String) -> String {
        let text = WHITESPACE.replace_all(&text, " ");
        let text = SPACE_BEFORE_PUNCT.replace_all(&text, "$1");
        let text = text.trim_matches(|c: char| c.is_whitespace() || c == ',' || c == ';');

        if self.rate == 100.0 || text.is_empty() {
            return text.to_string();
        }
        match self.tts {
            Tts::None => text.to_string(),
            Tts::Ssml => format!("<prosody rate='{}%'>{}</prosody>", self.rate, text),
            Tts::Sapi5 => {
                // SAPI5 speeds run from -10 to 10, each step about 3x over ten steps
                let speed = (10.0 * (self.rate / 100.0).log(3.0)).round().clamp(-10.0, 10.0);
                format!("<rate speed='{}'>{}</rate>", speed as i32, text)
            }
        }
    }
}

/// Speak `node` as though it were the whole expression
pub fn speak(ctx: RuleContext, node: &ExpressionNode) -> String {
    let notation = English::new(ctx.prefs);
    rules::render(&notation, ctx, node).text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::SymbolTable;
    use crate::tree::{annotate, parse};

    fn say(prefs: &Preferences, markup: &str) -> String {
        let mut root = parse(markup).unwrap();
        annotate(&mut root).unwrap();
        let symbols = SymbolTable::new();
        speak(RuleContext::new(prefs, &symbols), &root)
    }

    #[test]
    fn test_plain_pauses() {
        let prefs = Preferences::new();
        assert_eq!(
            say(&prefs, "<math><mrow><mo>(</mo><mi>a</mi><mo>+</mo><mi>b</mi><mo>)</mo></mrow></math>"),
            "open paren, a plus b; close paren"
        );
    }

    #[test]
    fn test_ssml_breaks_and_rate() {
        let mut prefs = Preferences::new();
        prefs.set("TTS", "SSML").unwrap();
        prefs.set("PauseFactor", "200").unwrap();
        prefs.set("MathRate", "150").unwrap();
        assert_eq!(
            say(&prefs, "<math><mrow><mo>(</mo><mi>a</mi><mo>+</mo><mi>b</mi><mo>)</mo></mrow></math>"),
            "<prosody rate='150%'>open paren <break time='300ms'/> a plus b <break time='600ms'/> close paren</prosody>"
        );
    }

    #[test]
    fn test_sapi5_silence() {
        let mut prefs = Preferences::new();
        prefs.set("TTS", "SAPI5").unwrap();
        assert_eq!(
            say(&prefs, "<math><mrow><mo>(</mo><mi>a</mi><mo>-</mo><mi>b</mi><mo>)</mo></mrow></math>"),
            "open paren <silence msec='150'/> a minus b <silence msec='300'/> close paren"
        );
    }
}
