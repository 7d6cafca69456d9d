//! ASCIIMath output

use super::needs_space;
use crate::rules::symbols::is_invisible;
use crate::rules::Part::{Child, Children, Join, PostScripts, PreScripts, Text};
use crate::rules::{
    has_prescripts, is_fenced_binomial, is_simple, segments, Notation, Part, Renderer, Rule,
    RuleContext, ScriptMarks,
};
use crate::tree::{ExpressionNode, NodeKind};
use once_cell::sync::Lazy;
use std::collections::HashMap;

static SYMBOLS: Lazy<HashMap<char, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ('α', "alpha"),
        ('β', "beta"),
        ('γ', "gamma"),
        ('δ', "delta"),
        ('ε', "epsilon"),
        ('θ', "theta"),
        ('λ', "lambda"),
        ('μ', "mu"),
        ('π', "pi"),
        ('ρ', "rho"),
        ('σ', "sigma"),
        ('τ', "tau"),
        ('φ', "phi"),
        ('ω', "omega"),
        ('Γ', "Gamma"),
        ('Δ', "Delta"),
        ('Σ', "Sigma"),
        ('Ω', "Omega"),
        ('×', "xx"),
        ('⋅', "*"),
        ('·', "*"),
        ('÷', "-:"),
        ('±', "+-"),
        ('−', "-"),
        ('≤', "<="),
        ('≥', ">="),
        ('≠', "!="),
        ('≈', "~~"),
        ('≡', "-="),
        ('∈', "in"),
        ('∉', "!in"),
        ('⊂', "sub"),
        ('∪', "uu"),
        ('∩', "nn"),
        ('∞', "oo"),
        ('∂', "del"),
        ('∇', "grad"),
        ('∑', "sum"),
        ('∏', "prod"),
        ('∫', "int"),
        ('∮', "oint"),
        ('→', "->"),
        ('⇒', "=>"),
        ('⇔', "<=>"),
        ('…', "..."),
        ('′', "'"),
    ])
});

fn token_text(node: &ExpressionNode) -> String {
    match node.kind {
        NodeKind::Text => format!("\"{}\"", node.content),
        NodeKind::StringLiteral => format!("text(\"{}\")", node.content),
        NodeKind::Space => " ".to_string(),
        _ => node
            .content
            .chars()
            .filter(|&ch| !is_invisible(ch))
            .map(|ch| match SYMBOLS.get(&ch) {
                Some(name) => name.to_string(),
                None => ch.to_string(),
            })
            .collect(),
    }
}

pub struct AsciiMath;

impl Notation for AsciiMath {
    fn name(&self) -> &'static str {
        "ASCIIMath"
    }

    fn rules(&self, kind: NodeKind) -> &'static [Rule] {
        match kind {
            NodeKind::Row => ROW,
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
            NodeKind::Table | NodeKind::TableRow => BRACKETED,
            NodeKind::Phantom => PHANTOM,
            NodeKind::Math
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
            | NodeKind::StringLiteral
            | NodeKind::Space => &[],
        }
    }

    fn separator(&self) -> &'static str {
        ""
    }

    fn token(&self, r: &mut Renderer, node: &ExpressionNode) {
        let text = token_text(node);
        if needs_space(r.text(), &text) {
            r.attach(" ");
        }
        r.attach(&text);
    }

    fn row(&self, r: &mut Renderer, children: &[ExpressionNode]) {
        for segment in segments(children) {
            r.node(segment.node());
        }
    }
}

fn always(_: &ExpressionNode, _: &RuleContext) -> bool {
    true
}

fn fenced_binomial(node: &ExpressionNode, _: &RuleContext) -> bool {
    is_fenced_binomial(node)
}

fn binomial(node: &ExpressionNode, _: &RuleContext) -> bool {
    node.is_binomial()
}

fn simple_parts(node: &ExpressionNode, _: &RuleContext) -> bool {
    node.children.iter().all(is_simple)
}

fn simple_script(node: &ExpressionNode, _: &RuleContext) -> bool {
    node.children.get(1).is_some_and(is_simple)
}

fn large_operator(node: &ExpressionNode, _: &RuleContext) -> bool {
    node.children.first().is_some_and(|base| {
        let base = base.collapse();
        base.is_token() && matches!(base.content.as_str(), "∑" | "∏" | "∫" | "∮" | "lim")
    })
}

fn has_accent(node: &ExpressionNode, chars: &[&str]) -> bool {
    node.children.get(1).is_some_and(|accent| {
        let accent = accent.collapse();
        accent.kind == NodeKind::Operator && chars.contains(&accent.content.as_str())
    })
}

fn bar(node: &ExpressionNode, _: &RuleContext) -> bool {
    has_accent(node, &["¯", "‾", "_"])
}

fn hat(node: &ExpressionNode, _: &RuleContext) -> bool {
    has_accent(node, &["^", "ˆ"])
}

fn vector(node: &ExpressionNode, _: &RuleContext) -> bool {
    has_accent(node, &["→", "⃗"])
}

fn dot(node: &ExpressionNode, _: &RuleContext) -> bool {
    has_accent(node, &["˙", "."])
}

static ROW: &[Rule] = &[Rule {
    name: "fenced-binomial",
    applies: fenced_binomial,
    template: &[Child(1)],
}];

static FRACTION: &[Rule] = &[
    Rule {
        name: "binomial",
        applies: binomial,
        template: &[Text("(("), Child(0), Text("),("), Child(1), Text("))")],
    },
    Rule {
        name: "fraction-simple",
        applies: simple_parts,
        template: &[Child(0), Text("/"), Child(1)],
    },
    Rule {
        name: "fraction",
        applies: always,
        template: &[Text("("), Child(0), Text(")/("), Child(1), Text(")")],
    },
];

static SQRT: &[Rule] = &[Rule {
    name: "sqrt",
    applies: always,
    template: &[Text("sqrt("), Children, Text(")")],
}];

static ROOT: &[Rule] = &[Rule {
    name: "root",
    applies: always,
    template: &[Text("root("), Child(1), Text(")("), Child(0), Text(")")],
}];

static SUPERSCRIPT: &[Rule] = &[
    Rule {
        name: "superscript-simple",
        applies: simple_script,
        template: &[Child(0), Text("^"), Child(1)],
    },
    Rule {
        name: "superscript",
        applies: always,
        template: &[Child(0), Text("^("), Child(1), Text(")")],
    },
];

static SUBSCRIPT: &[Rule] = &[
    Rule {
        name: "subscript-simple",
        applies: simple_script,
        template: &[Child(0), Text("_"), Child(1)],
    },
    Rule {
        name: "subscript",
        applies: always,
        template: &[Child(0), Text("_("), Child(1), Text(")")],
    },
];

const LIMITS: &[Part] = &[
    Child(0),
    Text("_("),
    Child(1),
    Text(")^("),
    Child(2),
    Text(")"),
];

static SUBSUP: &[Rule] = &[Rule {
    name: "subsup",
    applies: always,
    template: LIMITS,
}];

static UNDER: &[Rule] = &[
    Rule {
        name: "under-limit",
        applies: large_operator,
        template: &[Child(0), Text("_("), Child(1), Text(")")],
    },
    Rule {
        name: "underline",
        applies: bar,
        template: &[Text("ul("), Child(0), Text(")")],
    },
    Rule {
        name: "under",
        applies: always,
        template: &[Text("underset("), Child(1), Text(")("), Child(0), Text(")")],
    },
];

static OVER: &[Rule] = &[
    Rule {
        name: "bar",
        applies: bar,
        template: &[Text("bar("), Child(0), Text(")")],
    },
    Rule {
        name: "hat",
        applies: hat,
        template: &[Text("hat("), Child(0), Text(")")],
    },
    Rule {
        name: "vector",
        applies: vector,
        template: &[Text("vec("), Child(0), Text(")")],
    },
    Rule {
        name: "dot",
        applies: dot,
        template: &[Text("dot("), Child(0), Text(")")],
    },
    Rule {
        name: "over-limit",
        applies: large_operator,
        template: &[Child(0), Text("^("), Child(1), Text(")")],
    },
    Rule {
        name: "over",
        applies: always,
        template: &[Text("overset("), Child(1), Text(")("), Child(0), Text(")")],
    },
];

static UNDEROVER: &[Rule] = &[
    Rule {
        name: "limits",
        applies: large_operator,
        template: LIMITS,
    },
    Rule {
        name: "underover",
        applies: always,
        template: &[
            Text("underset("),
            Child(1),
            Text(")(overset("),
            Child(2),
            Text(")("),
            Child(0),
            Text("))"),
        ],
    },
];

static BRACKETED: &[Rule] = &[Rule {
    name: "bracketed-list",
    applies: always,
    template: &[Text("["), Join(","), Text("]")],
}];

const SCRIPT_BRACES: ScriptMarks = ScriptMarks::Wrapped("_(", "^(", ")");

fn prescripted(node: &ExpressionNode, _: &RuleContext) -> bool {
    has_prescripts(node)
}

static MULTISCRIPTS: &[Rule] = &[
    Rule {
        name: "multiscripts-prescripts",
        applies: prescripted,
        template: &[
            Text("{::}"),
            PreScripts(SCRIPT_BRACES),
            Child(0),
            PostScripts(SCRIPT_BRACES),
        ],
    },
    Rule {
        name: "multiscripts",
        applies: always,
        template: &[Child(0), PostScripts(SCRIPT_BRACES)],
    },
];

static PHANTOM: &[Rule] = &[Rule {
    name: "phantom",
    applies: always,
    template: &[],
}];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_text() {
        assert_eq!(token_text(&ExpressionNode::token(NodeKind::Operator, "×")), "xx");
        assert_eq!(token_text(&ExpressionNode::token(NodeKind::Text, "if")), "\"if\"");
        assert_eq!(token_text(&ExpressionNode::token(NodeKind::Operator, "\u{2062}")), "");
    }
}
