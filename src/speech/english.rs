//! English speech rules for SimpleSpeak and ClearSpeak

use crate::rules::symbols::is_invisible;
use crate::rules::Part::{
    Child, Children, Computed, Inner, Last, Numbered, PostScripts, PreScripts, Text,
};
use crate::rules::{
    self, has_prescripts, is_fenced, is_fenced_binomial, is_simple, Part, Pause, Renderer, Rule,
    RuleContext, ScriptMarks, Segment,
};
use crate::state::prefs::{SpeechStyle, Verbosity};
use crate::tree::{ExpressionNode, NodeKind};

/// Rule table for a style and element kind
pub fn rules(style: SpeechStyle, kind: NodeKind) -> &'static [Rule] {
    match kind {
        NodeKind::Row => ROW,
        NodeKind::Fraction => match style {
            SpeechStyle::SimpleSpeak => SIMPLE_FRACTION,
            SpeechStyle::ClearSpeak => CLEAR_FRACTION,
        },
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
        NodeKind::Enclose => ENCLOSE,
        NodeKind::Error => ERROR,
        NodeKind::Math
        | NodeKind::Style
        | NodeKind::Padded
        | NodeKind::Semantics
        | NodeKind::TableCell
        | NodeKind::PreScripts
        | NodeKind::NoScript => &[],
        NodeKind::Identifier
        | NodeKind::Number
        | NodeKind::Operator
        | NodeKind::Text
        | NodeKind::StringLiteral
        | NodeKind::Space => &[],
    }
}

// Predicates

fn always(_: &ExpressionNode, _: &RuleContext) -> bool {
    true
}

fn terse(_: &ExpressionNode, ctx: &RuleContext) -> bool {
    ctx.verbosity == Verbosity::Terse
}

fn verbose(_: &ExpressionNode, ctx: &RuleContext) -> bool {
    ctx.verbosity == Verbosity::Verbose
}

fn child(node: &ExpressionNode, i: usize) -> Option<&ExpressionNode> {
    node.children.get(i).map(ExpressionNode::collapse)
}

fn child_is_number(node: &ExpressionNode, i: usize, value: &str) -> bool {
    child(node, i).is_some_and(|c| c.kind == NodeKind::Number && c.content == value)
}

fn child_is_integer(node: &ExpressionNode, i: usize) -> bool {
    child(node, i).is_some_and(|c| {
        c.kind == NodeKind::Number
            && !c.content.is_empty()
            && c.content.chars().all(|ch| ch.is_ascii_digit())
    })
}

fn child_is_simple(node: &ExpressionNode, i: usize) -> bool {
    node.children.get(i).is_some_and(is_simple)
}

fn child_is_operator(node: &ExpressionNode, i: usize, texts: &[&str]) -> bool {
    child(node, i).is_some_and(|c| c.kind == NodeKind::Operator && texts.contains(&c.content.as_str()))
}

fn fenced_binomial(node: &ExpressionNode, _: &RuleContext) -> bool {
    is_fenced_binomial(node)
}

fn fenced_simple(node: &ExpressionNode, _: &RuleContext) -> bool {
    is_fenced(node) && node.children.len() == 3 && is_simple(&node.children[1])
}

fn fenced_group(node: &ExpressionNode, _: &RuleContext) -> bool {
    is_fenced(node) && node.children.len() >= 3
}

fn binomial(node: &ExpressionNode, _: &RuleContext) -> bool {
    node.is_binomial()
}

fn binomial_verbose(node: &ExpressionNode, ctx: &RuleContext) -> bool {
    node.is_binomial() && verbose(node, ctx)
}

fn simple_fraction(node: &ExpressionNode, _: &RuleContext) -> bool {
    child_is_simple(node, 0) && child_is_simple(node, 1)
}

fn common_fraction(node: &ExpressionNode, _: &RuleContext) -> bool {
    child_is_integer(node, 0)
        && child(node, 1).is_some_and(|c| denominator_name(&c.content).is_some())
}

fn radicand_simple(node: &ExpressionNode, _: &RuleContext) -> bool {
    node.children.len() == 1 && is_simple(&node.children[0])
}

fn terse_radicand_simple(node: &ExpressionNode, ctx: &RuleContext) -> bool {
    terse(node, ctx) && radicand_simple(node, ctx)
}

fn cube_root(node: &ExpressionNode, _: &RuleContext) -> bool {
    child_is_number(node, 1, "3")
}

fn cube_root_simple(node: &ExpressionNode, _: &RuleContext) -> bool {
    child_is_number(node, 1, "3") && child_is_simple(node, 0)
}

fn base_simple(node: &ExpressionNode, _: &RuleContext) -> bool {
    child_is_simple(node, 0)
}

/// Bases that can take "squared" and "cubed"
fn power_base(node: &ExpressionNode) -> bool {
    child_is_simple(node, 0) || child(node, 0).is_some_and(is_fenced)
}

fn squared(node: &ExpressionNode, _: &RuleContext) -> bool {
    power_base(node) && child_is_number(node, 1, "2")
}

fn cubed(node: &ExpressionNode, _: &RuleContext) -> bool {
    power_base(node) && child_is_number(node, 1, "3")
}

fn primed(node: &ExpressionNode, _: &RuleContext) -> bool {
    child_is_operator(node, 1, &["′", "″", "‴", "'"])
}

fn ordinal_power(node: &ExpressionNode, _: &RuleContext) -> bool {
    child_is_simple(node, 0) && child_is_integer(node, 1)
}

fn simple_power(node: &ExpressionNode, _: &RuleContext) -> bool {
    child_is_simple(node, 1)
}

fn terse_numeric_subscript(node: &ExpressionNode, ctx: &RuleContext) -> bool {
    terse(node, ctx) && child_is_simple(node, 0) && child_is_integer(node, 1)
}

fn subsup_squared(node: &ExpressionNode, _: &RuleContext) -> bool {
    child_is_number(node, 2, "2")
}

const LARGE_OPERATORS: &[&str] = &["∑", "∏", "∐", "∫", "∬", "∭", "∮", "⋃", "⋂", "⋁", "⋀"];

fn large_operator(node: &ExpressionNode, _: &RuleContext) -> bool {
    child_is_operator(node, 0, LARGE_OPERATORS)
}

fn limit(node: &ExpressionNode, _: &RuleContext) -> bool {
    child(node, 0).is_some_and(|c| c.is_token() && matches!(c.content.as_str(), "lim" | "liminf" | "limsup"))
}

fn bar_accent(node: &ExpressionNode, _: &RuleContext) -> bool {
    child_is_operator(node, 1, &["¯", "‾", "_", "―", "−"])
}

fn hat_accent(node: &ExpressionNode, _: &RuleContext) -> bool {
    child_is_operator(node, 1, &["^", "ˆ", "̂"])
}

fn tilde_accent(node: &ExpressionNode, _: &RuleContext) -> bool {
    child_is_operator(node, 1, &["~", "˜", "̃"])
}

fn vector_accent(node: &ExpressionNode, _: &RuleContext) -> bool {
    child_is_operator(node, 1, &["→", "⃗"])
}

fn dot_accent(node: &ExpressionNode, _: &RuleContext) -> bool {
    child_is_operator(node, 1, &["˙", ".", "̇"])
}

fn prescripted(node: &ExpressionNode, _: &RuleContext) -> bool {
    has_prescripts(node)
}

fn struck_out(node: &ExpressionNode, _: &RuleContext) -> bool {
    node.attribute("notation").is_some_and(|n| n.contains("strike"))
}

fn boxed(node: &ExpressionNode, _: &RuleContext) -> bool {
    node.attribute("notation").is_some_and(|n| n.contains("box"))
}

// Computed text

fn ordinal(number: &str) -> String {
    let word = match number {
        "0" => "zeroth",
        "1" => "first",
        "2" => "second",
        "3" => "third",
        "4" => "fourth",
        "5" => "fifth",
        "6" => "sixth",
        "7" => "seventh",
        "8" => "eighth",
        "9" => "ninth",
        "10" => "tenth",
        _ => {
            let teens = number.len() >= 2 && number.as_bytes()[number.len() - 2] == b'1';
            let suffix = match (teens, number.chars().last()) {
                (false, Some('1')) => "st",
                (false, Some('2')) => "nd",
                (false, Some('3')) => "rd",
                _ => "th",
            };
            return format!("{}{}", number, suffix);
        }
    };
    word.to_string()
}

fn exponent_ordinal(node: &ExpressionNode, _: &RuleContext) -> String {
    child(node, 1).map(|c| ordinal(&c.content)).unwrap_or_default()
}

fn denominator_name(denominator: &str) -> Option<(&'static str, &'static str)> {
    let names = match denominator {
        "2" => ("half", "halves"),
        "3" => ("third", "thirds"),
        "4" => ("fourth", "fourths"),
        "5" => ("fifth", "fifths"),
        "6" => ("sixth", "sixths"),
        "7" => ("seventh", "sevenths"),
        "8" => ("eighth", "eighths"),
        "9" => ("ninth", "ninths"),
        "10" => ("tenth", "tenths"),
        _ => return None,
    };
    Some(names)
}

fn common_fraction_text(node: &ExpressionNode, _: &RuleContext) -> String {
    let numerator = child(node, 0).map(|c| c.content.as_str()).unwrap_or("");
    let denominator = child(node, 1).map(|c| c.content.as_str()).unwrap_or("");
    match denominator_name(denominator) {
        Some((one, _)) if numerator == "1" => format!("1 {}", one),
        Some((_, many)) => format!("{} {}", numerator, many),
        None => String::new(),
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

fn table_size(node: &ExpressionNode, _: &RuleContext) -> String {
    let rows = node.children.len();
    let columns = node
        .children
        .iter()
        .map(|row| row.children.len())
        .max()
        .unwrap_or(0);
    format!("table with {} and {}", plural(rows, "row"), plural(columns, "column"))
}

// Rule tables

static ROW: &[Rule] = &[
    Rule {
        name: "fenced-binomial",
        applies: fenced_binomial,
        template: &[Child(1)],
    },
    Rule {
        name: "fenced-simple",
        applies: fenced_simple,
        template: &[Child(0), Child(1), Last],
    },
    Rule {
        name: "fenced-group",
        applies: fenced_group,
        template: &[
            Child(0),
            Part::Pause(Pause::Short),
            Inner,
            Part::Pause(Pause::Medium),
            Last,
        ],
    },
];

const BINOMIAL_VERBOSE: Rule = Rule {
    name: "binomial-verbose",
    applies: binomial_verbose,
    template: &[Text("the binomial coefficient"), Child(0), Text("choose"), Child(1)],
};

const BINOMIAL: Rule = Rule {
    name: "binomial",
    applies: binomial,
    template: &[Child(0), Text("choose"), Child(1)],
};

const NUMERATOR_DENOMINATOR: &[Part] = &[
    Text("the fraction with numerator"),
    Child(0),
    Part::Pause(Pause::Medium),
    Text("and denominator"),
    Child(1),
];

const VERBOSE_FRACTION: Rule = Rule {
    name: "fraction-verbose",
    applies: verbose,
    template: NUMERATOR_DENOMINATOR,
};

const SIMPLE_OVER: Rule = Rule {
    name: "fraction-simple",
    applies: simple_fraction,
    template: &[Child(0), Text("over"), Child(1)],
};

static SIMPLE_FRACTION: &[Rule] = &[
    BINOMIAL_VERBOSE,
    BINOMIAL,
    VERBOSE_FRACTION,
    SIMPLE_OVER,
    Rule {
        name: "fraction",
        applies: always,
        template: &[
            Text("fraction"),
            Child(0),
            Text("over"),
            Child(1),
            Text("end fraction"),
        ],
    },
];

static CLEAR_FRACTION: &[Rule] = &[
    BINOMIAL_VERBOSE,
    BINOMIAL,
    Rule {
        name: "fraction-common",
        applies: common_fraction,
        template: &[Computed(common_fraction_text)],
    },
    VERBOSE_FRACTION,
    SIMPLE_OVER,
    Rule {
        name: "fraction",
        applies: always,
        template: NUMERATOR_DENOMINATOR,
    },
];

static SQRT: &[Rule] = &[
    Rule {
        name: "sqrt-terse-simple",
        applies: terse_radicand_simple,
        template: &[Text("square root of"), Children],
    },
    Rule {
        name: "sqrt-simple",
        applies: radicand_simple,
        template: &[Text("the square root of"), Children],
    },
    Rule {
        name: "sqrt-terse",
        applies: terse,
        template: &[Text("square root of"), Children, Text("end root")],
    },
    Rule {
        name: "sqrt",
        applies: always,
        template: &[Text("the square root of"), Children, Text("end root")],
    },
];

static ROOT: &[Rule] = &[
    Rule {
        name: "cube-root-simple",
        applies: cube_root_simple,
        template: &[Text("the cube root of"), Child(0)],
    },
    Rule {
        name: "cube-root",
        applies: cube_root,
        template: &[Text("the cube root of"), Child(0), Text("end root")],
    },
    Rule {
        name: "root-simple",
        applies: base_simple,
        template: &[Text("the index"), Child(1), Text("root of"), Child(0)],
    },
    Rule {
        name: "root",
        applies: always,
        template: &[
            Text("the index"),
            Child(1),
            Text("root of"),
            Child(0),
            Text("end root"),
        ],
    },
];

static SUPERSCRIPT: &[Rule] = &[
    Rule {
        name: "squared",
        applies: squared,
        template: &[Child(0), Text("squared")],
    },
    Rule {
        name: "cubed",
        applies: cubed,
        template: &[Child(0), Text("cubed")],
    },
    Rule {
        name: "prime",
        applies: primed,
        template: &[Child(0), Child(1)],
    },
    Rule {
        name: "ordinal-power",
        applies: ordinal_power,
        template: &[Child(0), Text("to the"), Computed(exponent_ordinal), Text("power")],
    },
    Rule {
        name: "simple-power",
        applies: simple_power,
        template: &[Child(0), Text("to the"), Child(1), Text("power")],
    },
    Rule {
        name: "power",
        applies: always,
        template: &[
            Child(0),
            Text("raised to the"),
            Child(1),
            Text("power"),
        ],
    },
];

static SUBSCRIPT: &[Rule] = &[
    Rule {
        name: "subscript-terse",
        applies: terse_numeric_subscript,
        template: &[Child(0), Child(1)],
    },
    Rule {
        name: "subscript",
        applies: always,
        template: &[Child(0), Text("sub"), Child(1)],
    },
];

static SUBSUP: &[Rule] = &[
    Rule {
        name: "large-operator-limits",
        applies: large_operator,
        template: &[
            Text("the"),
            Child(0),
            Text("from"),
            Child(1),
            Text("to"),
            Child(2),
            Text("of"),
        ],
    },
    Rule {
        name: "subscript-squared",
        applies: subsup_squared,
        template: &[Child(0), Text("sub"), Child(1), Text("squared")],
    },
    Rule {
        name: "subscript-power",
        applies: always,
        template: &[
            Child(0),
            Text("sub"),
            Child(1),
            Part::Pause(Pause::Short),
            Text("to the"),
            Child(2),
            Text("power"),
        ],
    },
];

static UNDER: &[Rule] = &[
    Rule {
        name: "limit",
        applies: limit,
        template: &[Text("the limit as"), Child(1), Text("of")],
    },
    Rule {
        name: "large-operator-under",
        applies: large_operator,
        template: &[Text("the"), Child(0), Text("over"), Child(1), Text("of")],
    },
    Rule {
        name: "underbar",
        applies: bar_accent,
        template: &[Child(0), Text("underbar")],
    },
    Rule {
        name: "under",
        applies: always,
        template: &[Child(0), Text("with"), Child(1), Text("below")],
    },
];

static OVER: &[Rule] = &[
    Rule {
        name: "bar",
        applies: bar_accent,
        template: &[Child(0), Text("bar")],
    },
    Rule {
        name: "hat",
        applies: hat_accent,
        template: &[Child(0), Text("hat")],
    },
    Rule {
        name: "tilde",
        applies: tilde_accent,
        template: &[Child(0), Text("tilde")],
    },
    Rule {
        name: "vector",
        applies: vector_accent,
        template: &[Text("vector"), Child(0)],
    },
    Rule {
        name: "dot",
        applies: dot_accent,
        template: &[Child(0), Text("dot")],
    },
    Rule {
        name: "large-operator-over",
        applies: large_operator,
        template: &[Text("the"), Child(0), Text("to"), Child(1), Text("of")],
    },
    Rule {
        name: "over",
        applies: always,
        template: &[Child(0), Text("with"), Child(1), Text("above")],
    },
];

static UNDEROVER: &[Rule] = &[
    Rule {
        name: "large-operator-limits",
        applies: large_operator,
        template: &[
            Text("the"),
            Child(0),
            Text("from"),
            Child(1),
            Text("to"),
            Child(2),
            Text("of"),
        ],
    },
    Rule {
        name: "underover",
        applies: always,
        template: &[
            Child(0),
            Text("with"),
            Child(1),
            Text("below and"),
            Child(2),
            Text("above"),
        ],
    },
];

const SPOKEN_SCRIPTS: ScriptMarks = ScriptMarks::Words("sub", "super");

static MULTISCRIPTS: &[Rule] = &[
    Rule {
        name: "multiscripts-prescripts",
        applies: prescripted,
        template: &[
            Child(0),
            PostScripts(SPOKEN_SCRIPTS),
            Part::Pause(Pause::Short),
            Text("with prescripts"),
            PreScripts(SPOKEN_SCRIPTS),
        ],
    },
    Rule {
        name: "multiscripts",
        applies: always,
        template: &[Child(0), PostScripts(SPOKEN_SCRIPTS)],
    },
];

static TABLE: &[Rule] = &[Rule {
    name: "table",
    applies: always,
    template: &[Computed(table_size), Part::Pause(Pause::Long), Numbered("row")],
}];

static TABLE_ROW: &[Rule] = &[Rule {
    name: "table-row",
    applies: always,
    template: &[Numbered("column")],
}];

static PHANTOM: &[Rule] = &[Rule {
    name: "phantom",
    applies: always,
    template: &[],
}];

static ENCLOSE: &[Rule] = &[
    Rule {
        name: "crossed-out",
        applies: struck_out,
        template: &[Text("crossed out"), Children, Text("end crossed out")],
    },
    Rule {
        name: "boxed",
        applies: boxed,
        template: &[Text("box"), Children, Text("end box")],
    },
];

static ERROR: &[Rule] = &[Rule {
    name: "error",
    applies: always,
    template: &[Text("error"), Children],
}];

// Tokens and rows

/// Spoken form of a token's content
pub fn token_text(node: &ExpressionNode, ctx: &RuleContext) -> String {
    match node.kind {
        NodeKind::Number => number_text(&node.content, ctx.prefs.decimal_separators()),
        NodeKind::Identifier => identifier_text(&node.content, ctx),
        NodeKind::Operator => operator_text(&node.content, ctx),
        NodeKind::Text | NodeKind::StringLiteral => node.content.clone(),
        _ => String::new(),
    }
}

fn number_text(content: &str, decimal_separators: &str) -> String {
    let mut out = String::with_capacity(content.len() + 8);
    for ch in content.chars() {
        if decimal_separators.contains(ch) {
            out.push_str(" point ");
        } else {
            out.push(ch);
        }
    }
    out.trim().to_string()
}

fn letter_text(ch: char, ctx: &RuleContext) -> String {
    if let Some(name) = ctx.symbols.name(ch) {
        return name.to_string();
    }
    if ch.is_uppercase() {
        format!("cap {}", ch.to_lowercase())
    } else {
        ch.to_string()
    }
}

fn identifier_text(content: &str, ctx: &RuleContext) -> String {
    let mut chars = content.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => letter_text(ch, ctx),
        _ => content.to_string(),
    }
}

fn operator_text(content: &str, ctx: &RuleContext) -> String {
    if content.chars().all(is_invisible) {
        return String::new();
    }
    if content.chars().count() > 1 && content.chars().all(char::is_alphabetic) {
        return content.to_string();
    }
    content
        .chars()
        .filter(|&ch| !is_invisible(ch))
        .map(|ch| {
            ctx.symbols
                .name(ch)
                .map(str::to_string)
                .unwrap_or_else(|| ch.to_string())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Speak siblings, inserting "times" for implied multiplication by a group
pub fn row(r: &mut Renderer, children: &[ExpressionNode]) {
    let mut previous: Option<Segment> = None;
    for segment in rules::segments(children) {
        let node = segment.node();
        if node.is_operator("\u{2062}") {
            // invisible times is silent and keeps the operands adjacent
            r.node(node);
            continue;
        }
        if let Some(left) = previous {
            if left.is_operand() && segment.is_operand() {
                implied_times(r, left, segment);
            }
        }
        r.node(node);
        previous = Some(segment);
    }
}

fn implied_times(r: &mut Renderer, left: Segment, right: Segment) {
    let right_group = match right {
        Segment::Node(node) => {
            let node = node.collapse();
            is_fenced(node) && !is_fenced_binomial(node)
        }
        Segment::Binomial(_) => false,
    };
    if right_group {
        r.word("times");
        r.pause(Pause::Medium);
    } else if left.is_fenced() {
        r.word("times");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals() {
        assert_eq!(ordinal("4"), "fourth");
        assert_eq!(ordinal("21"), "21st");
        assert_eq!(ordinal("12"), "12th");
        assert_eq!(ordinal("103"), "103rd");
    }

    #[test]
    fn test_number_text() {
        assert_eq!(number_text("3.14", "."), "3 point 14");
        assert_eq!(number_text("3,14", ","), "3 point 14");
        assert_eq!(number_text("1000", "."), "1000");
    }
}
