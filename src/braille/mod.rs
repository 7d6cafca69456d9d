//! Braille rendering and braille position mapping
//!
//! Each braille code is a complete, separate [`Notation`]; the `BrailleCode`
//! preference selects one wholesale for a render. The most recent braille
//! rendering is kept in a [`BrailleMap`] so that a cell position can be
//! traced back to the node that produced it.

pub mod asciimath;
pub mod latex;
pub mod nemeth;

use crate::rules::{self, Notation, Rendering, RuleContext};
use crate::state::prefs::Highlight;
use crate::tree::ExpressionNode;
use crate::{MathError, Result};
use log::debug;

/// Supported braille codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrailleCode {
    Nemeth,
    LaTeX,
    ASCIIMath,
}

impl BrailleCode {
    pub const ALL: &'static [BrailleCode] =
        &[BrailleCode::Nemeth, BrailleCode::LaTeX, BrailleCode::ASCIIMath];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|code| code.name().eq_ignore_ascii_case(name))
    }

    /// Preference-value spelling
    pub fn name(self) -> &'static str {
        match self {
            BrailleCode::Nemeth => "Nemeth",
            BrailleCode::LaTeX => "LaTeX",
            BrailleCode::ASCIIMath => "ASCIIMath",
        }
    }

    /// Does the code produce Unicode braille cells (as opposed to ASCII text)?
    pub fn is_unicode(self) -> bool {
        matches!(self, BrailleCode::Nemeth)
    }

    fn notation(self) -> &'static dyn Notation {
        match self {
            BrailleCode::Nemeth => &nemeth::Nemeth,
            BrailleCode::LaTeX => &latex::Latex,
            BrailleCode::ASCIIMath => &asciimath::AsciiMath,
        }
    }
}

/// Render `node` in the preferred braille code
pub fn render(ctx: RuleContext, node: &ExpressionNode) -> Rendering {
    rules::render(ctx.prefs.braille_code().notation(), ctx, node)
}

/// Add dots 7 and 8 to the cells of `nav_id`'s span
///
/// Only Unicode braille cells are changed; other characters and renderings
/// without the node pass through unchanged.
pub fn highlight(rendering: &Rendering, nav_id: &str, mode: Highlight) -> String {
    let span = match rendering.spans.iter().find(|span| span.id == nav_id) {
        Some(span) if mode != Highlight::Off && span.start < span.end => span,
        _ => return rendering.text.clone(),
    };

    rendering
        .text
        .chars()
        .enumerate()
        .map(|(i, ch)| {
            let marked = match mode {
                Highlight::Off => false,
                Highlight::FirstChar => i == span.start,
                Highlight::EndPoints => i == span.start || i + 1 == span.end,
                Highlight::All => span.start <= i && i < span.end,
            };
            if marked && ('\u{2800}'..='\u{28FF}').contains(&ch) {
                char::from_u32(ch as u32 | 0xC0).unwrap_or(ch)
            } else {
                ch
            }
        })
        .collect()
}

/// The latest braille rendering and its cell-to-node spans
#[derive(Debug, Clone, Default)]
pub struct BrailleMap {
    rendering: Option<Rendering>,
}

impl BrailleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the rendering (the tree it described was replaced)
    pub fn clear(&mut self) {
        self.rendering = None;
    }

    pub fn record(&mut self, rendering: Rendering) {
        debug!(
            "Braille map holds {} chars, {} spans",
            rendering.text.chars().count(),
            rendering.spans.len()
        );
        self.rendering = Some(rendering);
    }

    pub fn is_empty(&self) -> bool {
        self.rendering.is_none()
    }

    /// Id of the innermost node covering a 0-based character position
    pub fn location_at(&self, position: usize) -> Result<&str> {
        let rendering = self.rendering.as_ref().ok_or(MathError::NoBraille)?;
        let len = rendering.text.chars().count();
        if position >= len {
            return Err(MathError::BraillePosition { position, len });
        }
        // Children are recorded before their parents, so the first of equally
        // sized spans is the innermost
        rendering
            .spans
            .iter()
            .filter(|span| span.start <= position && position < span.end)
            .min_by_key(|span| span.end - span.start)
            .map(|span| span.id.as_str())
            .ok_or(MathError::BraillePosition { position, len })
    }
}

/// Is a space needed before `next` so that it does not run into a preceding
/// alphabetic command or word?
fn needs_space(previous: &str, next: &str) -> bool {
    let ends_alpha = previous.chars().last().is_some_and(char::is_alphabetic);
    let starts_alpha = next.chars().next().is_some_and(char::is_alphabetic);
    ends_alpha && starts_alpha
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Span;

    fn sample() -> Rendering {
        Rendering {
            text: "⠷⠍⠩⠝⠾".to_string(),
            spans: vec![
                Span { id: "open".into(), start: 0, end: 1 },
                Span { id: "m".into(), start: 1, end: 2 },
                Span { id: "n".into(), start: 3, end: 4 },
                Span { id: "frac".into(), start: 1, end: 4 },
                Span { id: "close".into(), start: 4, end: 5 },
                Span { id: "row".into(), start: 0, end: 5 },
            ],
        }
    }

    #[test]
    fn test_code_names() {
        assert_eq!(BrailleCode::from_name("nemeth"), Some(BrailleCode::Nemeth));
        assert_eq!(BrailleCode::from_name("ASCIIMath"), Some(BrailleCode::ASCIIMath));
        assert_eq!(BrailleCode::from_name("UEB"), None);
    }

    #[test]
    fn test_location_at() {
        let mut map = BrailleMap::new();
        assert!(matches!(map.location_at(0), Err(MathError::NoBraille)));
        map.record(sample());
        assert_eq!(map.location_at(1).unwrap(), "m");
        assert_eq!(map.location_at(2).unwrap(), "frac");
        assert_eq!(map.location_at(4).unwrap(), "close");
        assert!(matches!(
            map.location_at(5),
            Err(MathError::BraillePosition { position: 5, len: 5 })
        ));
    }

    #[test]
    fn test_highlight_modes() {
        let rendering = sample();
        assert_eq!(highlight(&rendering, "frac", Highlight::Off), "⠷⠍⠩⠝⠾");
        assert_eq!(highlight(&rendering, "frac", Highlight::FirstChar), "⠷⣍⠩⠝⠾");
        assert_eq!(highlight(&rendering, "frac", Highlight::EndPoints), "⠷⣍⠩⣝⠾");
        assert_eq!(highlight(&rendering, "frac", Highlight::All), "⠷⣍⣩⣝⠾");
        assert_eq!(highlight(&rendering, "missing", Highlight::All), "⠷⠍⠩⠝⠾");
    }

    #[test]
    fn test_needs_space() {
        assert!(needs_space("\\alpha", "x"));
        assert!(!needs_space("x^", "2"));
        assert!(!needs_space("", "x"));
    }
}
