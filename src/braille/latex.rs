//! LaTeX output for refreshable displays that read computer notation

use super::needs_space;
use crate::rules::symbols::is_invisible;
use crate::rules::Part::{Child, Children, Join, PostScripts, PreScripts, Text};
use crate::rules::{
    has_prescripts, is_fenced_binomial, segments, Notation, Part, Renderer, Rule, RuleContext,
    ScriptMarks,
};
use crate::tree::{ExpressionNode, NodeKind};
use once_cell::sync::Lazy;
use std::collections::HashMap;

static COMMANDS: Lazy<HashMap<char, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ('α', "\\alpha"),
        ('β', "\\beta"),
        ('γ', "\\gamma"),
        ('δ', "\\delta"),
        ('ε', "\\epsilon"),
        ('ζ', "\\zeta"),
        ('η', "\\eta"),
        ('θ', "\\theta"),
        ('ι', "\\iota"),
        ('κ', "\\kappa"),
        ('λ', "\\lambda"),
        ('μ', "\\mu"),
        ('ν', "\\nu"),
        ('ξ', "\\xi"),
        ('π', "\\pi"),
        ('ρ', "\\rho"),
        ('σ', "\\sigma"),
        ('τ', "\\tau"),
        ('υ', "\\upsilon"),
        ('φ', "\\phi"),
        ('χ', "\\chi"),
        ('ψ', "\\psi"),
        ('ω', "\\omega"),
        ('Γ', "\\Gamma"),
        ('Δ', "\\Delta"),
        ('Θ', "\\Theta"),
        ('Λ', "\\Lambda"),
        ('Π', "\\Pi"),
        ('Σ', "\\Sigma"),
        ('Φ', "\\Phi"),
        ('Ψ', "\\Psi"),
        ('Ω', "\\Omega"),
        ('×', "\\times"),
        ('⋅', "\\cdot"),
        ('·', "\\cdot"),
        ('÷', "\\div"),
        ('±', "\\pm"),
        ('∓', "\\mp"),
        ('−', "-"),
        ('≤', "\\le"),
        ('≥', "\\ge"),
        ('≠', "\\ne"),
        ('≈', "\\approx"),
        ('≡', "\\equiv"),
        ('∈', "\\in"),
        ('∉', "\\notin"),
        ('⊂', "\\subset"),
        ('∪', "\\cup"),
        ('∩', "\\cap"),
        ('∞', "\\infty"),
        ('∂', "\\partial"),
        ('∇', "\\nabla"),
        ('∑', "\\sum"),
        ('∏', "\\prod"),
        ('∫', "\\int"),
        ('∮', "\\oint"),
        ('→', "\\to"),
        ('←', "\\leftarrow"),
        ('⇒', "\\Rightarrow"),
        ('⇔', "\\Leftrightarrow"),
        ('{', "\\{"),
        ('}', "\\}"),
        ('⟨', "\\langle"),
        ('⟩', "\\rangle"),
        ('′', "'"),
        ('…', "\\ldots"),
        ('⋯', "\\cdots"),
        ('%', "\\%"),
        ('&', "\\&"),
    ])
});

const FUNCTIONS: &[&str] = &[
    "sin", "cos", "tan", "cot", "sec", "csc", "log", "ln", "exp", "lim", "max", "min", "det",
    "gcd", "sinh", "cosh", "tanh",
];

fn token_text(node: &ExpressionNode) -> String {
    match node.kind {
        NodeKind::Text => format!("\\text{{{}}}", node.content),
        NodeKind::StringLiteral => format!("\\text{{\"{}\"}}", node.content),
        NodeKind::Space => " ".to_string(),
        NodeKind::Identifier if FUNCTIONS.contains(&node.content.as_str()) => {
            format!("\\{}", node.content)
        }
        _ => node
            .content
            .chars()
            .filter(|&ch| !is_invisible(ch))
            .map(|ch| match COMMANDS.get(&ch) {
                Some(command) => command.to_string(),
                None => ch.to_string(),
            })
            .collect(),
    }
}

pub struct Latex;

impl Notation for Latex {
    fn name(&self) -> &'static str {
        "LaTeX"
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
            NodeKind::Table => TABLE,
            NodeKind::TableRow => TABLE_ROW,
            NodeKind::Phantom => PHANTOM,
            NodeKind::Enclose => ENCLOSE,
            NodeKind::Math
            | NodeKind::Style
            | NodeKind::Padded
            | NodeKind::TableCell
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
        if ends_with_command(r.text()) && needs_space(r.text(), &text) {
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

/// Does the output end in a control word such as `\alpha`?
fn ends_with_command(text: &str) -> bool {
    let word = text.trim_end_matches(char::is_alphabetic);
    word.len() < text.len() && word.ends_with('\\')
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

/// Scripts of one character need no braces
fn single_char_script(node: &ExpressionNode, _: &RuleContext) -> bool {
    node.children.get(1).is_some_and(|script| {
        let script = script.collapse();
        script.is_token() && token_text(script).chars().count() == 1
    })
}

fn large_operator(node: &ExpressionNode, _: &RuleContext) -> bool {
    node.children.first().is_some_and(|base| {
        let base = base.collapse();
        let large = matches!(base.content.as_str(), "∑" | "∏" | "∫" | "∮" | "⋃" | "⋂");
        (base.kind == NodeKind::Operator && large) || (base.is_token() && base.content == "lim")
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

fn tilde(node: &ExpressionNode, _: &RuleContext) -> bool {
    has_accent(node, &["~", "˜"])
}

fn vector(node: &ExpressionNode, _: &RuleContext) -> bool {
    has_accent(node, &["→", "⃗"])
}

fn dot(node: &ExpressionNode, _: &RuleContext) -> bool {
    has_accent(node, &["˙", "."])
}

fn boxed(node: &ExpressionNode, _: &RuleContext) -> bool {
    node.attribute("notation").is_some_and(|n| n.contains("box"))
}

fn struck_out(node: &ExpressionNode, _: &RuleContext) -> bool {
    node.attribute("notation").is_some_and(|n| n.contains("strike"))
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
        template: &[Text("\\binom{"), Child(0), Text("}{"), Child(1), Text("}")],
    },
    Rule {
        name: "fraction",
        applies: always,
        template: &[Text("\\frac{"), Child(0), Text("}{"), Child(1), Text("}")],
    },
];

static SQRT: &[Rule] = &[Rule {
    name: "sqrt",
    applies: always,
    template: &[Text("\\sqrt{"), Children, Text("}")],
}];

static ROOT: &[Rule] = &[Rule {
    name: "root",
    applies: always,
    template: &[Text("\\sqrt["), Child(1), Text("]{"), Child(0), Text("}")],
}];

static SUPERSCRIPT: &[Rule] = &[
    Rule {
        name: "superscript-char",
        applies: single_char_script,
        template: &[Child(0), Text("^"), Child(1)],
    },
    Rule {
        name: "superscript",
        applies: always,
        template: &[Child(0), Text("^{"), Child(1), Text("}")],
    },
];

static SUBSCRIPT: &[Rule] = &[
    Rule {
        name: "subscript-char",
        applies: single_char_script,
        template: &[Child(0), Text("_"), Child(1)],
    },
    Rule {
        name: "subscript",
        applies: always,
        template: &[Child(0), Text("_{"), Child(1), Text("}")],
    },
];

const LIMITS: &[Part] = &[
    Child(0),
    Text("_{"),
    Child(1),
    Text("}^{"),
    Child(2),
    Text("}"),
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
        template: &[Child(0), Text("_{"), Child(1), Text("}")],
    },
    Rule {
        name: "underline",
        applies: bar,
        template: &[Text("\\underline{"), Child(0), Text("}")],
    },
    Rule {
        name: "under",
        applies: always,
        template: &[Text("\\underset{"), Child(1), Text("}{"), Child(0), Text("}")],
    },
];

static OVER: &[Rule] = &[
    Rule {
        name: "bar",
        applies: bar,
        template: &[Text("\\bar{"), Child(0), Text("}")],
    },
    Rule {
        name: "hat",
        applies: hat,
        template: &[Text("\\hat{"), Child(0), Text("}")],
    },
    Rule {
        name: "tilde",
        applies: tilde,
        template: &[Text("\\tilde{"), Child(0), Text("}")],
    },
    Rule {
        name: "vector",
        applies: vector,
        template: &[Text("\\vec{"), Child(0), Text("}")],
    },
    Rule {
        name: "dot",
        applies: dot,
        template: &[Text("\\dot{"), Child(0), Text("}")],
    },
    Rule {
        name: "over-limit",
        applies: large_operator,
        template: &[Child(0), Text("^{"), Child(1), Text("}")],
    },
    Rule {
        name: "over",
        applies: always,
        template: &[Text("\\overset{"), Child(1), Text("}{"), Child(0), Text("}")],
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
            Text("\\underset{"),
            Child(1),
            Text("}{\\overset{"),
            Child(2),
            Text("}{"),
            Child(0),
            Text("}}"),
        ],
    },
];

static TABLE: &[Rule] = &[Rule {
    name: "matrix",
    applies: always,
    template: &[Text("\\begin{matrix}"), Join("\\\\"), Text("\\end{matrix}")],
}];

static TABLE_ROW: &[Rule] = &[Rule {
    name: "matrix-row",
    applies: always,
    template: &[Join("&")],
}];

const SCRIPT_BRACES: ScriptMarks = ScriptMarks::Wrapped("_{", "^{", "}");

fn prescripted(node: &ExpressionNode, _: &RuleContext) -> bool {
    has_prescripts(node)
}

static MULTISCRIPTS: &[Rule] = &[
    Rule {
        name: "multiscripts-prescripts",
        applies: prescripted,
        template: &[
            Text("{}"),
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
    template: &[Text("\\phantom{"), Children, Text("}")],
}];

static ENCLOSE: &[Rule] = &[
    Rule {
        name: "boxed",
        applies: boxed,
        template: &[Text("\\boxed{"), Children, Text("}")],
    },
    Rule {
        name: "cancel",
        applies: struck_out,
        template: &[Text("\\cancel{"), Children, Text("}")],
    },
];
