//! Annotated MathML expression trees
//!
//! A MathML string is parsed into an [`ExpressionNode`] tree over a closed set
//! of element kinds. After [`annotate`] every node carries a unique `id`;
//! explicit ids from the markup are kept and the rest are synthesized.

mod annotate;
mod parser;
mod serialize;

pub use annotate::annotate;
pub use parser::parse;
pub use serialize::to_mathml;

use std::collections::HashMap;

/// The MathML elements understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Math,

    // Tokens
    Identifier,
    Number,
    Operator,
    Text,
    Space,
    StringLiteral,

    // Layout
    Row,
    Fraction,
    Sqrt,
    Root,
    Superscript,
    Subscript,
    SubSup,
    Under,
    Over,
    UnderOver,
    Multiscripts,
    /// `mprescripts` separator inside `mmultiscripts`
    PreScripts,
    /// `none` placeholder for a missing script
    NoScript,

    // Tables
    Table,
    TableRow,
    TableCell,

    // Wrappers
    Style,
    Padded,
    Phantom,
    Enclose,
    Error,
    /// `semantics` holding its presentation child; annotations are dropped
    Semantics,
}

impl NodeKind {
    /// Look up a kind by its MathML element name
    pub fn from_tag(tag: &str) -> Option<Self> {
        use NodeKind::*;
        let kind = match tag {
            "math" => Math,
            "mi" => Identifier,
            "mn" => Number,
            "mo" => Operator,
            "mtext" => Text,
            "mspace" => Space,
            "ms" => StringLiteral,
            "mrow" => Row,
            "mfrac" => Fraction,
            "msqrt" => Sqrt,
            "mroot" => Root,
            "msup" => Superscript,
            "msub" => Subscript,
            "msubsup" => SubSup,
            "munder" => Under,
            "mover" => Over,
            "munderover" => UnderOver,
            "mmultiscripts" => Multiscripts,
            "mprescripts" => PreScripts,
            "none" => NoScript,
            "mtable" => Table,
            "mtr" => TableRow,
            "mtd" => TableCell,
            "mstyle" => Style,
            "mpadded" => Padded,
            "mphantom" => Phantom,
            "menclose" => Enclose,
            "merror" => Error,
            "semantics" => Semantics,
            _ => return None,
        };
        Some(kind)
    }

    /// MathML element name
    pub fn tag(self) -> &'static str {
        use NodeKind::*;
        match self {
            Math => "math",
            Identifier => "mi",
            Number => "mn",
            Operator => "mo",
            Text => "mtext",
            Space => "mspace",
            StringLiteral => "ms",
            Row => "mrow",
            Fraction => "mfrac",
            Sqrt => "msqrt",
            Root => "mroot",
            Superscript => "msup",
            Subscript => "msub",
            SubSup => "msubsup",
            Under => "munder",
            Over => "mover",
            UnderOver => "munderover",
            Multiscripts => "mmultiscripts",
            PreScripts => "mprescripts",
            NoScript => "none",
            Table => "mtable",
            TableRow => "mtr",
            TableCell => "mtd",
            Style => "mstyle",
            Padded => "mpadded",
            Phantom => "mphantom",
            Enclose => "menclose",
            Error => "merror",
            Semantics => "semantics",
        }
    }

    /// Leaf kinds carrying literal content
    pub fn is_token(self) -> bool {
        use NodeKind::*;
        matches!(self, Identifier | Number | Operator | Text | Space | StringLiteral)
    }

    /// Exact number of children required, if the element has a fixed arity
    pub fn arity(self) -> Option<usize> {
        use NodeKind::*;
        match self {
            Fraction | Root | Superscript | Subscript | Under | Over => Some(2),
            SubSup | UnderOver => Some(3),
            Semantics => Some(1),
            PreScripts | NoScript => Some(0),
            _ => None,
        }
    }

    /// Kinds that shift their later children to a script level
    pub fn is_script(self) -> bool {
        matches!(
            self,
            NodeKind::Superscript | NodeKind::Subscript | NodeKind::SubSup | NodeKind::Multiscripts
        )
    }

    /// Grouping elements that add no meaning when they hold a single child
    pub fn is_wrapper(self) -> bool {
        matches!(
            self,
            NodeKind::Math
                | NodeKind::Row
                | NodeKind::Style
                | NodeKind::Padded
                | NodeKind::Semantics
        )
    }
}

/// A node of the annotated expression tree
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionNode {
    /// Unique id (non-empty after annotation)
    pub id: String,
    pub kind: NodeKind,
    /// Owned children in document order (empty for tokens)
    pub children: Vec<ExpressionNode>,
    /// Literal text (tokens only)
    pub content: String,
    /// Attributes other than `id`, in document order
    pub attributes: Vec<(String, String)>,
    /// `mfrac` drawn without a fraction bar (binomial notation)
    pub no_line: bool,
}

impl ExpressionNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: String::new(),
            kind,
            children: Vec::new(),
            content: String::new(),
            attributes: Vec::new(),
            no_line: false,
        }
    }

    /// Token node with the given content
    pub fn token(kind: NodeKind, content: &str) -> Self {
        Self {
            content: content.to_string(),
            ..Self::new(kind)
        }
    }

    /// Container node with the given children
    pub fn with_children(kind: NodeKind, children: Vec<ExpressionNode>) -> Self {
        Self {
            children,
            ..Self::new(kind)
        }
    }

    /// Builder-style id setter
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_token(&self) -> bool {
        self.kind.is_token()
    }

    pub fn is_binomial(&self) -> bool {
        self.kind == NodeKind::Fraction && self.no_line
    }

    /// Is this an `mo` with exactly the given text?
    pub fn is_operator(&self, text: &str) -> bool {
        self.kind == NodeKind::Operator && self.content == text
    }

    /// Number of characters in the token content
    pub fn content_len(&self) -> usize {
        self.content.chars().count()
    }

    /// Postscripts and prescripts of an `mmultiscripts`, base excluded
    ///
    /// Both slices alternate subscript, superscript.
    pub fn script_pairs(&self) -> (&[ExpressionNode], &[ExpressionNode]) {
        let scripts = self.children.get(1..).unwrap_or(&[]);
        match scripts.iter().position(|c| c.kind == NodeKind::PreScripts) {
            Some(i) => (&scripts[..i], &scripts[i + 1..]),
            None => (scripts, &[]),
        }
    }

    /// Skip single-child wrappers (`math`, `mrow`, `mstyle`, `mpadded`, `semantics`)
    pub fn collapse(&self) -> &ExpressionNode {
        let mut node = self;
        while node.kind.is_wrapper() && node.children.len() == 1 {
            node = &node.children[0];
        }
        node
    }

    /// Visit this node and all descendants in document order
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a ExpressionNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Find a descendant (or self) by id
    pub fn find(&self, id: &str) -> Option<&ExpressionNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }
}

/// The session's annotated tree, indexed by id
///
/// Each id maps to the child-index path from the root, which gives cheap
/// parent and ancestor lookups for navigation.
#[derive(Debug, Clone)]
pub struct Tree {
    root: ExpressionNode,
    paths: HashMap<String, Vec<usize>>,
}

impl Tree {
    pub fn new(root: ExpressionNode) -> Self {
        let mut paths = HashMap::new();
        let mut path = Vec::new();
        index_paths(&root, &mut path, &mut paths);
        Self { root, paths }
    }

    pub fn root(&self) -> &ExpressionNode {
        &self.root
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.paths.contains_key(id)
    }

    /// Child-index path from the root to `id`
    pub fn path(&self, id: &str) -> Option<&[usize]> {
        self.paths.get(id).map(|path| path.as_slice())
    }

    pub fn node_at(&self, path: &[usize]) -> Option<&ExpressionNode> {
        let mut node = &self.root;
        for &index in path {
            node = node.children.get(index)?;
        }
        Some(node)
    }

    pub fn find(&self, id: &str) -> Option<&ExpressionNode> {
        self.path(id).and_then(|path| self.node_at(path))
    }

    pub fn parent(&self, id: &str) -> Option<&ExpressionNode> {
        let path = self.path(id)?;
        if path.is_empty() {
            return None;
        }
        self.node_at(&path[..path.len() - 1])
    }

    /// Index of `id` within its parent's children
    pub fn index_in_parent(&self, id: &str) -> Option<usize> {
        self.path(id).and_then(|path| path.last().copied())
    }

    /// Ancestors of `id`, nearest first
    pub fn ancestors(&self, id: &str) -> Vec<&ExpressionNode> {
        let Some(path) = self.path(id) else {
            return Vec::new();
        };
        (0..path.len())
            .rev()
            .filter_map(|depth| self.node_at(&path[..depth]))
            .collect()
    }
}

fn index_paths(
    node: &ExpressionNode,
    path: &mut Vec<usize>,
    paths: &mut HashMap<String, Vec<usize>>,
) {
    paths.insert(node.id.clone(), path.clone());
    for (index, child) in node.children.iter().enumerate() {
        path.push(index);
        index_paths(child, path, paths);
        path.pop();
    }
}
