//! Nemeth Code
//!
//! Unicode braille output. Script levels are announced with `⠘` (superscript)
//! and `⠰` (subscript) and the baseline is restored with `⠐` before the next
//! item on the line. The numeric indicator `⠼` is used for numbers that start
//! the expression or follow a space.

use crate::rules::symbols::is_invisible;
use crate::rules::Part::{Baseline, Child, Children, Join, PostScripts, PreScripts, Script, Text};
use crate::rules::{Notation, Renderer, Rule, RuleContext, ScriptMarks};
use crate::tree::{ExpressionNode, NodeKind};
use once_cell::sync::Lazy;
use std::collections::HashMap;

const NUMERIC_INDICATOR: &str = "⠼";
const CAPITAL: &str = "⠠";
const GREEK: &str = "⠨";
const SPACE: &str = "⠀";

static LETTERS: Lazy<HashMap<char, &'static str>> = Lazy::new(|| {
    let cells = "⠁⠃⠉⠙⠑⠋⠛⠓⠊⠚⠅⠇⠍⠝⠕⠏⠟⠗⠎⠞⠥⠧⠺⠭⠽⠵";
    ('a'..='z').zip(split_cells(cells)).collect()
});

static GREEK_LETTERS: Lazy<HashMap<char, &'static str>> = Lazy::new(|| {
    let letters = "αβγδεζηθικλμνξοπρστυφχψω";
    let cells = "⠁⠃⠛⠙⠑⠵⠱⠹⠊⠅⠇⠍⠝⠭⠕⠏⠗⠎⠞⠥⠋⠯⠽⠺";
    letters.chars().zip(split_cells(cells)).collect()
});

static DIGITS: Lazy<HashMap<char, &'static str>> = Lazy::new(|| {
    let cells = "⠴⠂⠆⠒⠲⠢⠖⠶⠦⠔";
    ('0'..='9').zip(split_cells(cells)).collect()
});

static OPERATORS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("+", "⠬"),
        ("-", "⠤"),
        ("−", "⠤"),
        ("±", "⠬⠤"),
        ("∓", "⠤⠬"),
        ("×", "⠈⠡"),
        ("⋅", "⠡"),
        ("·", "⠡"),
        ("*", "⠈⠼"),
        ("÷", "⠨⠌"),
        ("/", "⠸⠌"),
        ("=", "⠀⠨⠅⠀"),
        ("≠", "⠀⠌⠨⠅⠀"),
        ("<", "⠀⠐⠅⠀"),
        (">", "⠀⠨⠂⠀"),
        ("≤", "⠀⠐⠅⠱⠀"),
        ("≥", "⠀⠨⠂⠱⠀"),
        ("≈", "⠀⠈⠱⠈⠱⠀"),
        ("→", "⠀⠫⠕⠀"),
        ("∈", "⠀⠈⠑⠀"),
        ("(", "⠷"),
        (")", "⠾"),
        ("[", "⠈⠷"),
        ("]", "⠈⠾"),
        ("{", "⠨⠷"),
        ("}", "⠨⠾"),
        ("|", "⠳"),
        (",", "⠠⠀"),
        ("′", "⠄"),
        ("″", "⠄⠄"),
        ("!", "⠯"),
        ("∞", "⠠⠿"),
        ("∑", "⠨⠠⠎"),
        ("∏", "⠨⠠⠏"),
        ("∫", "⠮"),
        ("¯", "⠱"),
        ("‾", "⠱"),
        ("^", "⠸⠣"),
        ("~", "⠈⠱"),
        ("…", "⠄⠄⠄"),
    ])
});

fn split_cells(cells: &'static str) -> impl Iterator<Item = &'static str> {
    cells.char_indices().map(move |(i, ch)| &cells[i..i + ch.len_utf8()])
}

fn letter_cells(ch: char) -> Option<String> {
    if let Some(cells) = LETTERS.get(&ch) {
        return Some(cells.to_string());
    }
    if ch.is_ascii_uppercase() {
        let lower = ch.to_ascii_lowercase();
        return LETTERS.get(&lower).map(|cells| format!("{}{}", CAPITAL, cells));
    }
    if let Some(cells) = GREEK_LETTERS.get(&ch) {
        return Some(format!("{}{}", GREEK, cells));
    }
    let lower = ch.to_lowercase().next()?;
    GREEK_LETTERS
        .get(&lower)
        .map(|cells| format!("{}{}{}", GREEK, CAPITAL, cells))
}

/// Cells for an operator's content (unknown characters pass through)
pub fn operator_cells(content: &str) -> String {
    if let Some(cells) = OPERATORS.get(content) {
        return cells.to_string();
    }
    content
        .chars()
        .filter(|&ch| !is_invisible(ch))
        .map(|ch| {
            let mut buf = [0u8; 4];
            OPERATORS
                .get(ch.encode_utf8(&mut buf) as &str)
                .map(|cells| cells.to_string())
                .or_else(|| letter_cells(ch))
                .unwrap_or_else(|| ch.to_string())
        })
        .collect()
}

fn text_cells(content: &str) -> String {
    content
        .chars()
        .map(|ch| {
            if ch.is_whitespace() {
                SPACE.to_string()
            } else if let Some(cells) = DIGITS.get(&ch) {
                cells.to_string()
            } else {
                letter_cells(ch).unwrap_or_else(|| ch.to_string())
            }
        })
        .collect()
}

fn number_cells(content: &str, decimal_separators: &str) -> String {
    content
        .chars()
        .map(|ch| match DIGITS.get(&ch) {
            Some(cells) => cells.to_string(),
            None if decimal_separators.contains(ch) => "⠨".to_string(),
            None if ch == ',' => "⠠".to_string(),
            None => ch.to_string(),
        })
        .collect()
}

pub struct Nemeth;

impl Notation for Nemeth {
    fn name(&self) -> &'static str {
        "Nemeth"
    }

    fn rules(&self, kind: NodeKind) -> &'static [Rule] {
        match kind {
            NodeKind::Fraction => FRACTION,
            NodeKind::Sqrt => SQRT,
            NodeKind::Root => ROOT,
            NodeKind::Superscript => SUPERSCRIPT,
            NodeKind::Subscript => SUBSCRIPT,
            NodeKind::SubSup => SUBSUP,
            NodeKind::Under => UNDER,
            NodeKind::Over => OVER,
            NodeKind::UnderOver => UNDEROVER,
            NodeKind::Multiscripts => MULTISCRIPTS,
            NodeKind::Table => TABLE,
            NodeKind::TableRow => TABLE_ROW,
            NodeKind::Phantom => PHANTOM,
            NodeKind::Space => SPACE_RULES,
            NodeKind::Math
            | NodeKind::Row
            | NodeKind::Style
            | NodeKind::Padded
            | NodeKind::TableCell
            | NodeKind::Enclose
            | NodeKind::Error
            | NodeKind::Semantics
            | NodeKind::PreScripts
            | NodeKind::NoScript => &[],
            NodeKind::Identifier
            | NodeKind::Number
            | NodeKind::Operator
            | NodeKind::Text
            | NodeKind::StringLiteral => &[],
        }
    }

    fn separator(&self) -> &'static str {
        ""
    }

    fn token(&self, r: &mut Renderer, node: &ExpressionNode) {
        let cells = match node.kind {
            NodeKind::Number => {
                let digits = number_cells(&node.content, r.ctx.prefs.decimal_separators());
                if r.at_baseline() && (r.is_empty() || r.ends_with(SPACE)) {
                    format!("{}{}", NUMERIC_INDICATOR, digits)
                } else {
                    digits
                }
            }
            NodeKind::Operator => operator_cells(&node.content),
            NodeKind::Identifier | NodeKind::Text | NodeKind::StringLiteral => {
                text_cells(&node.content)
            }
            _ => String::new(),
        };
        r.attach(&cells);
    }

    fn row(&self, r: &mut Renderer, children: &[ExpressionNode]) {
        for (i, child) in children.iter().enumerate() {
            r.node(child);
            if let Some(next) = children.get(i + 1) {
                // A spaced comparison operator returns to the baseline by itself
                let spaced = next.kind == NodeKind::Operator
                    && operator_cells(&next.content).starts_with(SPACE);
                if spaced {
                    r.take_shift();
                } else {
                    r.restore_level();
                }
            }
        }
    }
}

fn always(_: &ExpressionNode, _: &RuleContext) -> bool {
    true
}

fn binomial(node: &ExpressionNode, _: &RuleContext) -> bool {
    node.is_binomial()
}

/// A fraction with another fraction inside
fn complex_fraction(node: &ExpressionNode, _: &RuleContext) -> bool {
    node.children.iter().any(|child| {
        let mut nested = false;
        child.walk(&mut |n| nested |= n.kind == NodeKind::Fraction);
        nested
    })
}

/// `x₁`: numeric subscripts of a single letter need no level indicator
fn numeric_subscript(node: &ExpressionNode, _: &RuleContext) -> bool {
    let base = node.children.first().map(ExpressionNode::collapse);
    let script = node.children.get(1).map(ExpressionNode::collapse);
    matches!((base, script), (Some(b), Some(s))
        if b.kind == NodeKind::Identifier
            && b.content_len() == 1
            && s.kind == NodeKind::Number
            && s.content.chars().all(|ch| ch.is_ascii_digit()))
}

static FRACTION: &[Rule] = &[
    Rule {
        name: "binomial",
        applies: binomial,
        template: &[Child(0), Text("⠩"), Child(1)],
    },
    Rule {
        name: "complex-fraction",
        applies: complex_fraction,
        template: &[
            Text("⠠⠹"),
            Child(0),
            Baseline,
            Text("⠠⠌"),
            Child(1),
            Baseline,
            Text("⠠⠼"),
        ],
    },
    Rule {
        name: "fraction",
        applies: always,
        template: &[
            Text("⠹"),
            Child(0),
            Baseline,
            Text("⠌"),
            Child(1),
            Baseline,
            Text("⠼"),
        ],
    },
];

static SQRT: &[Rule] = &[Rule {
    name: "sqrt",
    applies: always,
    template: &[Text("⠜"), Children, Baseline, Text("⠻")],
}];

static ROOT: &[Rule] = &[Rule {
    name: "root",
    applies: always,
    template: &[Text("⠣"), Child(1), Text("⠜"), Child(0), Baseline, Text("⠻")],
}];

static SUPERSCRIPT: &[Rule] = &[Rule {
    name: "superscript",
    applies: always,
    template: &[Child(0), Script("⠘", 1)],
}];

static SUBSCRIPT: &[Rule] = &[
    Rule {
        name: "numeric-subscript",
        applies: numeric_subscript,
        template: &[Child(0), Child(1)],
    },
    Rule {
        name: "subscript",
        applies: always,
        template: &[Child(0), Script("⠰", 1)],
    },
];

static SUBSUP: &[Rule] = &[Rule {
    name: "subsup",
    applies: always,
    template: &[Child(0), Script("⠰", 1), Script("⠘", 2)],
}];

static UNDER: &[Rule] = &[Rule {
    name: "under",
    applies: always,
    template: &[Text("⠐"), Child(0), Text("⠩"), Child(1), Text("⠻")],
}];

static OVER: &[Rule] = &[Rule {
    name: "over",
    applies: always,
    template: &[Text("⠐"), Child(0), Text("⠣"), Child(1), Text("⠻")],
}];

static UNDEROVER: &[Rule] = &[Rule {
    name: "underover",
    applies: always,
    template: &[
        Text("⠐"),
        Child(0),
        Text("⠩"),
        Child(1),
        Text("⠣"),
        Child(2),
        Text("⠻"),
    ],
}];

const SCRIPT_LEVELS: ScriptMarks = ScriptMarks::Levels("⠰", "⠘");

// Prescripts are written before the base, which is back on the baseline
static MULTISCRIPTS: &[Rule] = &[Rule {
    name: "multiscripts",
    applies: always,
    template: &[
        PreScripts(SCRIPT_LEVELS),
        Baseline,
        Child(0),
        PostScripts(SCRIPT_LEVELS),
    ],
}];

static TABLE: &[Rule] = &[Rule {
    name: "table",
    applies: always,
    template: &[Join("\n")],
}];

static TABLE_ROW: &[Rule] = &[Rule {
    name: "table-row",
    applies: always,
    template: &[Join("⠀⠀")],
}];

static PHANTOM: &[Rule] = &[Rule {
    name: "phantom",
    applies: always,
    template: &[],
}];

static SPACE_RULES: &[Rule] = &[Rule {
    name: "space",
    applies: always,
    template: &[Text(SPACE)],
}];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_tables() {
        assert_eq!(letter_cells('m').as_deref(), Some("⠍"));
        assert_eq!(letter_cells('M').as_deref(), Some("⠠⠍"));
        assert_eq!(letter_cells('π').as_deref(), Some("⠨⠏"));
        assert_eq!(number_cells("3.14", "."), "⠒⠨⠂⠲");
    }

    #[test]
    fn test_operator_cells() {
        assert_eq!(operator_cells("+"), "⠬");
        assert_eq!(operator_cells("="), "⠀⠨⠅⠀");
        assert_eq!(operator_cells("\u{2062}"), "");
    }
}
