//! Rule engine
//!
//! A notation (a speech style or a braille code) is a set of priority-ordered
//! rules per element kind. Each rule pairs a predicate with a template; the
//! first rule whose predicate holds renders the node, recursing into children
//! through the template. Nodes without a matching rule fall back to the
//! notation's token or row rendering.
//!
//! Rendering is a pure function of the subtree and the preference snapshot,
//! and any node can be rendered as if it were the whole expression.

pub mod symbols;

pub use symbols::SymbolTable;

use crate::state::prefs::{Preferences, Verbosity};
use crate::tree::{ExpressionNode, NodeKind};

/// Pause strength between speech phrases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pause {
    Short,
    Medium,
    Long,
}

/// Preferences and tables a rule can consult
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub prefs: &'a Preferences,
    pub symbols: &'a SymbolTable,
    pub verbosity: Verbosity,
}

impl<'a> RuleContext<'a> {
    pub fn new(prefs: &'a Preferences, symbols: &'a SymbolTable) -> Self {
        Self {
            prefs,
            symbols,
            verbosity: prefs.verbosity(),
        }
    }

    /// Context for "describe" renderings, which are always verbose
    pub fn describing(self) -> Self {
        Self {
            verbosity: Verbosity::Verbose,
            ..self
        }
    }
}

pub type Predicate = fn(&ExpressionNode, &RuleContext) -> bool;
pub type Compute = fn(&ExpressionNode, &RuleContext) -> String;

/// One step of a rule template
#[derive(Clone, Copy)]
pub enum Part {
    /// Literal text
    Text(&'static str),
    /// Render child `i` (missing children render nothing)
    Child(usize),
    /// Render the last child
    Last,
    /// All children through the notation's row logic
    Children,
    /// Children without the first and last (the fences of a fenced row)
    Inner,
    /// The node's own token content through the notation's token logic
    Token,
    Pause(Pause),
    /// Child `i` one script level deeper, announced by the indicator
    Script(&'static str, usize),
    /// Return to the enclosing script level if a script was just closed
    Baseline,
    /// Children separated by the given text
    Join(&'static str),
    /// Children each prefixed by "label N"
    Numbered(&'static str),
    /// Text computed from the node
    Computed(Compute),
    /// Postscript pairs of an `mmultiscripts`
    PostScripts(ScriptMarks),
    /// Prescript pairs of an `mmultiscripts`
    PreScripts(ScriptMarks),
}

/// How a notation introduces each subscript and superscript of a script list
#[derive(Clone, Copy)]
pub enum ScriptMarks {
    /// A word before the script
    Words(&'static str, &'static str),
    /// A script level indicator
    Levels(&'static str, &'static str),
    /// Opening text for each script, then a shared closing text
    Wrapped(&'static str, &'static str, &'static str),
}

/// A predicate-to-template record
pub struct Rule {
    pub name: &'static str,
    pub applies: Predicate,
    pub template: &'static [Part],
}

/// A complete rule set: a speech style or a braille code
pub trait Notation {
    fn name(&self) -> &'static str;

    /// Rules for an element kind, highest priority first
    fn rules(&self, kind: NodeKind) -> &'static [Rule];

    /// Text placed between adjacent words
    fn separator(&self) -> &'static str;

    /// Render a token's content
    fn token(&self, r: &mut Renderer, node: &ExpressionNode);

    /// Render a sequence of siblings
    fn row(&self, r: &mut Renderer, children: &[ExpressionNode]);

    fn pause(&self, _r: &mut Renderer, _pause: Pause) {}

    /// Post-process the complete output
    fn finish(&self, text: String) -> String {
        text
    }
}

/// Character span of a node in the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub id: String,
    pub start: usize,
    pub end: usize,
}

/// Rendered text and the span of every node in it
#[derive(Debug, Clone, Default)]
pub struct Rendering {
    pub text: String,
    pub spans: Vec<Span>,
}

/// Output under construction
pub struct Renderer<'a> {
    notation: &'a dyn Notation,
    pub ctx: RuleContext<'a>,
    out: String,
    /// Length of `out` in chars
    len: usize,
    spans: Vec<Span>,
    /// Script level indicators currently open
    levels: Vec<&'static str>,
    /// A script level was closed and not yet returned from
    shifted: bool,
}

/// Render `node` as though it were the entire expression
pub fn render(notation: &dyn Notation, ctx: RuleContext, node: &ExpressionNode) -> Rendering {
    let mut renderer = Renderer {
        notation,
        ctx,
        out: String::with_capacity(128),
        len: 0,
        spans: Vec::new(),
        levels: Vec::new(),
        shifted: false,
    };
    renderer.node(node);
    log::trace!(
        "{} rendering of {}: {} chars",
        notation.name(),
        node.id,
        renderer.len
    );
    Rendering {
        text: notation.finish(renderer.out),
        spans: renderer.spans,
    }
}

impl<'a> Renderer<'a> {
    /// Render a node with the first matching rule, recording its span
    pub fn node(&mut self, node: &ExpressionNode) {
        let start = self.len;
        let notation = self.notation;
        let ctx = self.ctx;
        match notation
            .rules(node.kind)
            .iter()
            .find(|rule| (rule.applies)(node, &ctx))
        {
            Some(rule) => {
                log::trace!("{}: rule {} for {}", notation.name(), rule.name, node.id);
                self.apply(rule.template, node);
            }
            None if node.is_token() => notation.token(self, node),
            None => notation.row(self, &node.children),
        }
        self.spans.push(Span {
            id: node.id.clone(),
            start,
            end: self.len,
        });
    }

    fn apply(&mut self, template: &[Part], node: &ExpressionNode) {
        let notation = self.notation;
        for part in template {
            match *part {
                Part::Text(text) => self.word(text),
                Part::Child(i) => {
                    if let Some(child) = node.children.get(i) {
                        self.node(child);
                    }
                }
                Part::Last => {
                    if let Some(child) = node.children.last() {
                        self.node(child);
                    }
                }
                Part::Children => notation.row(self, &node.children),
                Part::Inner => {
                    if node.children.len() >= 2 {
                        notation.row(self, &node.children[1..node.children.len() - 1]);
                    }
                }
                Part::Token => notation.token(self, node),
                Part::Pause(pause) => notation.pause(self, pause),
                Part::Script(indicator, i) => {
                    if let Some(child) = node.children.get(i) {
                        self.script(indicator, child);
                    }
                }
                Part::Baseline => self.restore_level(),
                Part::Join(separator) => {
                    for (i, child) in node.children.iter().enumerate() {
                        if i > 0 {
                            self.word(separator);
                        }
                        self.node(child);
                    }
                }
                Part::Numbered(label) => {
                    for (i, child) in node.children.iter().enumerate() {
                        if i > 0 {
                            notation.pause(self, Pause::Medium);
                        }
                        self.word(&format!("{} {}", label, i + 1));
                        notation.pause(self, Pause::Short);
                        self.node(child);
                    }
                }
                Part::Computed(compute) => {
                    let text = compute(node, &self.ctx);
                    self.word(&text);
                }
                Part::PostScripts(marks) => self.scripts(marks, node.script_pairs().0),
                Part::PreScripts(marks) => self.scripts(marks, node.script_pairs().1),
            }
        }
    }

    /// Append text, separated from the previous word
    pub fn word(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let separator = self.notation.separator();
        if !self.out.is_empty() && !separator.is_empty() && !self.out.ends_with(separator) {
            self.attach(separator);
        }
        self.attach(text);
    }

    /// Append text directly to the previous output
    pub fn attach(&mut self, text: &str) {
        self.out.push_str(text);
        self.len += text.chars().count();
    }

    /// Insert a pause in the notation's style
    pub fn pause(&mut self, pause: Pause) {
        let notation = self.notation;
        notation.pause(self, pause);
    }

    /// Render `child` one script level deeper
    pub fn script(&mut self, indicator: &'static str, child: &ExpressionNode) {
        self.levels.push(indicator);
        let level = self.level();
        self.attach(&level);
        self.shifted = false;
        self.node(child);
        self.levels.pop();
        self.shifted = true;
    }

    /// Alternating subscripts and superscripts; `none` placeholders are silent
    fn scripts(&mut self, marks: ScriptMarks, scripts: &[ExpressionNode]) {
        for (i, script) in scripts.iter().enumerate() {
            if script.kind == NodeKind::NoScript {
                self.node(script);
                continue;
            }
            let superscript = i % 2 == 1;
            match marks {
                ScriptMarks::Words(sub, sup) => {
                    self.word(if superscript { sup } else { sub });
                    self.node(script);
                }
                ScriptMarks::Levels(sub, sup) => {
                    self.script(if superscript { sup } else { sub }, script);
                }
                ScriptMarks::Wrapped(sub, sup, close) => {
                    self.attach(if superscript { sup } else { sub });
                    self.node(script);
                    self.attach(close);
                }
            }
        }
    }

    /// Current level indicator ("" at the baseline)
    pub fn level(&self) -> String {
        self.levels.concat()
    }

    pub fn at_baseline(&self) -> bool {
        self.levels.is_empty()
    }

    /// Was a script level just closed?
    pub fn take_shift(&mut self) -> bool {
        std::mem::take(&mut self.shifted)
    }

    /// Emit the indicator of the enclosing level after a script closed
    pub fn restore_level(&mut self) {
        if self.take_shift() {
            let level = if self.at_baseline() {
                BASELINE.to_string()
            } else {
                self.level()
            };
            self.attach(&level);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// Output so far
    pub fn text(&self) -> &str {
        &self.out
    }

    pub fn ends_with(&self, suffix: &str) -> bool {
        self.out.ends_with(suffix)
    }

    pub fn last_char(&self) -> Option<char> {
        self.out.chars().last()
    }
}

/// Nemeth baseline indicator, also used to close scripts in other codes
const BASELINE: &str = "⠐";

// Shared predicates

/// Open and close fence characters
pub fn is_open_fence(text: &str) -> bool {
    matches!(text, "(" | "[" | "{" | "⟨" | "|" | "‖")
}

pub fn is_close_fence(text: &str) -> bool {
    matches!(text, ")" | "]" | "}" | "⟩" | "|" | "‖")
}

/// A row whose first and last children are matching fence operators
pub fn is_fenced(node: &ExpressionNode) -> bool {
    if node.kind != NodeKind::Row || node.children.len() < 2 {
        return false;
    }
    let first = &node.children[0];
    let last = &node.children[node.children.len() - 1];
    first.kind == NodeKind::Operator
        && last.kind == NodeKind::Operator
        && is_open_fence(&first.content)
        && is_close_fence(&last.content)
}

/// A fenced row holding exactly one binomial fraction
pub fn is_fenced_binomial(node: &ExpressionNode) -> bool {
    is_fenced(node) && node.children.len() == 3 && node.children[1].collapse().is_binomial()
}

/// Expressions short enough to need no grouping words
///
/// Tokens, negative numbers and single-token wrappers count as simple.
pub fn is_simple(node: &ExpressionNode) -> bool {
    let node = node.collapse();
    if node.is_token() {
        return true;
    }
    node.kind == NodeKind::Row
        && node.children.len() == 2
        && (node.children[0].is_operator("-") || node.children[0].is_operator("−"))
        && node.children[1].kind == NodeKind::Number
}

/// An `mmultiscripts` with scripts before its base
pub fn has_prescripts(node: &ExpressionNode) -> bool {
    !node.script_pairs().1.is_empty()
}

/// A row of operands and operators has this child as an operand
pub fn is_operand(node: &ExpressionNode) -> bool {
    !matches!(
        node.kind,
        NodeKind::Operator | NodeKind::Space | NodeKind::NoScript | NodeKind::PreScripts
    )
}

/// A unit of row logic: a single child, or a binomial whose fences are absorbed
#[derive(Debug, Clone, Copy)]
pub enum Segment<'n> {
    Node(&'n ExpressionNode),
    Binomial(&'n ExpressionNode),
}

impl<'n> Segment<'n> {
    pub fn node(self) -> &'n ExpressionNode {
        match self {
            Segment::Node(node) | Segment::Binomial(node) => node,
        }
    }

    pub fn is_operand(self) -> bool {
        match self {
            Segment::Node(node) => is_operand(node),
            Segment::Binomial(_) => true,
        }
    }

    /// Grouped by parentheses of its own
    pub fn is_fenced(self) -> bool {
        match self {
            Segment::Node(node) => is_fenced(node.collapse()),
            Segment::Binomial(_) => true,
        }
    }
}

/// Split a row into segments, absorbing `(` binomial `)` triples
pub fn segments(children: &[ExpressionNode]) -> Vec<Segment<'_>> {
    let mut out = Vec::with_capacity(children.len());
    let mut i = 0;
    while i < children.len() {
        if let [open, middle, close, ..] = &children[i..] {
            let binomial = middle.collapse();
            if open.kind == NodeKind::Operator
                && close.kind == NodeKind::Operator
                && is_open_fence(&open.content)
                && is_close_fence(&close.content)
                && binomial.is_binomial()
            {
                out.push(Segment::Binomial(binomial));
                i += 3;
                continue;
            }
        }
        out.push(Segment::Node(&children[i]));
        i += 1;
    }
    out
}
