//! Navigation state machine
//!
//! The navigator tracks the current node, the previous location, a stack of
//! zoom steps and ten placemarker slots. Commands move the focus around the
//! tree (or only render without moving) and answer with speech.

pub mod command;
pub mod keymap;
pub mod location;

pub use command::NavCommand;
pub use keymap::{command_for_key, Modifiers};
pub use location::NavigationLocation;

use crate::rules::symbols::is_invisible;
use crate::rules::{RuleContext, SymbolTable};
use crate::speech;
use crate::state::prefs::{NavMode, Preferences, Verbosity};
use crate::tree::{ExpressionNode, NodeKind, Tree};
use crate::{MathError, Result};
use log::debug;

const ZOOMED_IN_ALL: &str = "zoomed in all the way";
const ZOOMED_OUT_ALL: &str = "zoomed out all the way";
const NOT_IN_TABLE: &str = "not in a table";
const NOT_INSIDE: &str = "not inside anything";

/// Answer to a navigation command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavOutput {
    Speech(String),
    /// Navigation mode should end
    Exit,
}

/// One ZoomIn: where it started and where it landed
#[derive(Debug, Clone, PartialEq, Eq)]
struct ZoomStep {
    from: String,
    to: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Previous,
    Next,
}

impl Direction {
    fn edge(self) -> &'static str {
        match self {
            Direction::Previous => "start",
            Direction::Next => "end",
        }
    }
}

/// Where a command would take the focus
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Node(String),
    /// Nowhere to go; say why
    Stay(String),
}

/// Navigation state for one session
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    current: NavigationLocation,
    last: NavigationLocation,
    zoom: Vec<ZoomStep>,
    placemarkers: [Option<NavigationLocation>; 10],
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current location (empty until the first navigation)
    pub fn location(&self) -> &NavigationLocation {
        &self.current
    }

    /// Forget positions in a replaced tree; placemarkers are kept
    pub fn reset(&mut self) {
        self.current = NavigationLocation::default();
        self.last = NavigationLocation::default();
        self.zoom.clear();
    }

    /// The node with the focus; an empty location means the whole expression
    pub fn current_node<'t>(&self, tree: &'t Tree) -> &'t ExpressionNode {
        resolve(tree, &self.current)
    }

    /// Validate and move to a location
    ///
    /// Offsets within token content are accepted but always normalized to 0.
    pub fn set_location(&mut self, tree: &Tree, location: &NavigationLocation) -> Result<()> {
        let node = tree
            .find(&location.id)
            .ok_or_else(|| MathError::UnknownNodeId(location.id.clone()))?;
        let max_offset = if node.is_token() { node.content_len() } else { 0 };
        if location.offset > max_offset {
            return Err(MathError::InvalidOffset {
                id: location.id.clone(),
                offset: location.offset,
            });
        }
        self.move_to(&node.id);
        Ok(())
    }

    /// Run a command against `tree`
    ///
    /// Toggle commands change `prefs`. On error nothing has been changed.
    pub fn execute(
        &mut self,
        command: NavCommand,
        tree: &Tree,
        prefs: &mut Preferences,
        symbols: &SymbolTable,
    ) -> Result<NavOutput> {
        use NavCommand::*;
        debug!("Navigation command {} at '{}'", command, self.current.id);

        let current = self.current_node(tree).id.clone();
        let mode = prefs.nav_mode();
        let text = match command {
            MovePrevious => {
                let target = sibling_target(tree, mode, &current, Direction::Previous);
                self.go(target, tree, prefs, symbols)
            }
            MoveNext => {
                let target = sibling_target(tree, mode, &current, Direction::Next);
                self.go(target, tree, prefs, symbols)
            }
            MoveStart => self.go(end_target(tree, &current, Direction::Previous), tree, prefs, symbols),
            MoveEnd => self.go(end_target(tree, &current, Direction::Next), tree, prefs, symbols),
            MoveLineStart => self.go(line_target(tree, &current, Direction::Previous), tree, prefs, symbols),
            MoveLineEnd => self.go(line_target(tree, &current, Direction::Next), tree, prefs, symbols),
            MoveCellPrevious => self.go(cell_target(tree, &current, Direction::Previous), tree, prefs, symbols),
            MoveCellNext => self.go(cell_target(tree, &current, Direction::Next), tree, prefs, symbols),
            MoveCellUp => self.go(vertical_target(tree, &current, Direction::Previous), tree, prefs, symbols),
            MoveCellDown => self.go(vertical_target(tree, &current, Direction::Next), tree, prefs, symbols),
            MoveColumnStart => self.go(column_target(tree, &current, Direction::Previous), tree, prefs, symbols),
            MoveColumnEnd => self.go(column_target(tree, &current, Direction::Next), tree, prefs, symbols),
            MoveLastLocation => {
                std::mem::swap(&mut self.current, &mut self.last);
                self.zoom.clear();
                self.speak_current(tree, prefs, symbols)
            }

            ZoomIn => self.zoom_in(tree, prefs, symbols),
            ZoomOut => self.zoom_out(tree, prefs, symbols),
            ZoomInAll => self.zoom_in_all(tree, prefs, symbols),
            ZoomOutAll => self.zoom_out_all(tree, prefs, symbols),

            ReadPrevious => read(sibling_target(tree, mode, &current, Direction::Previous), tree, prefs, symbols, false),
            ReadNext => read(sibling_target(tree, mode, &current, Direction::Next), tree, prefs, symbols, false),
            ReadCurrent => read(Target::Node(current), tree, prefs, symbols, false),
            ReadCellCurrent => match cell_of(tree, &current) {
                Some(cell) => read(Target::Node(cell.id.clone()), tree, prefs, symbols, false),
                None => NOT_IN_TABLE.to_string(),
            },
            ReadStart => read(end_target(tree, &current, Direction::Previous), tree, prefs, symbols, false),
            ReadEnd => read(end_target(tree, &current, Direction::Next), tree, prefs, symbols, false),
            ReadLineStart => read(line_target(tree, &current, Direction::Previous), tree, prefs, symbols, false),
            ReadLineEnd => read(line_target(tree, &current, Direction::Next), tree, prefs, symbols, false),
            DescribePrevious => read(sibling_target(tree, mode, &current, Direction::Previous), tree, prefs, symbols, true),
            DescribeNext => read(sibling_target(tree, mode, &current, Direction::Next), tree, prefs, symbols, true),
            DescribeCurrent => read(Target::Node(current), tree, prefs, symbols, true),
            WhereAmI => where_am_i(tree, &current, prefs, symbols),
            WhereAmIAll => where_am_i_all(tree, &current),

            ToggleZoomLockUp => cycle_nav_mode(prefs, Direction::Previous)?,
            ToggleZoomLockDown => cycle_nav_mode(prefs, Direction::Next)?,
            ToggleSpeakMode => {
                let overview = !prefs.overview();
                prefs.set("Overview", if overview { "true" } else { "false" })?;
                if overview { "overview on" } else { "overview off" }.to_string()
            }
            Exit => return Ok(NavOutput::Exit),

            MoveTo(n) => {
                let location = self.placemarker(tree, n)?;
                if location != self.current {
                    self.last = std::mem::replace(&mut self.current, location);
                    self.zoom.clear();
                }
                self.speak_current(tree, prefs, symbols)
            }
            Read(n) => {
                let location = self.placemarker(tree, n)?;
                speak_node(resolve(tree, &location), prefs, symbols, false)
            }
            Describe(n) => {
                let location = self.placemarker(tree, n)?;
                speak_node(resolve(tree, &location), prefs, symbols, true)
            }
            SetPlacemarker(n) => {
                self.placemarkers[usize::from(n)] = Some(self.current.clone());
                format!("placemarker {} set", n)
            }
        };
        Ok(NavOutput::Speech(text))
    }

    /// A placemarker's location, checked against the current tree
    fn placemarker(&self, tree: &Tree, n: u8) -> Result<NavigationLocation> {
        let location = self
            .placemarkers
            .get(usize::from(n))
            .and_then(Option::as_ref)
            .ok_or(MathError::PlacemarkerNotSet(usize::from(n)))?;
        if !location.is_empty() && !tree.contains(&location.id) {
            return Err(MathError::UnknownNodeId(location.id.clone()));
        }
        Ok(location.clone())
    }

    /// Focus `id`, remembering where we were
    fn set_current(&mut self, id: &str) {
        if self.current.id != id {
            self.last = std::mem::replace(&mut self.current, NavigationLocation::node(id));
        }
    }

    fn move_to(&mut self, id: &str) {
        self.set_current(id);
        self.zoom.clear();
    }

    fn go(
        &mut self,
        target: Target,
        tree: &Tree,
        prefs: &Preferences,
        symbols: &SymbolTable,
    ) -> String {
        match target {
            Target::Node(id) => {
                self.move_to(&id);
                self.speak_current(tree, prefs, symbols)
            }
            Target::Stay(message) => message,
        }
    }

    /// Speech for the node just moved to
    fn speak_current(&self, tree: &Tree, prefs: &Preferences, symbols: &SymbolTable) -> String {
        let node = self.current_node(tree);
        let text = speak_node(node, prefs, symbols, prefs.overview());
        match role_of(tree, &node.id) {
            Some(role) if prefs.nav_verbosity() == Verbosity::Verbose => {
                format!("{}, {}", role, text)
            }
            _ => text,
        }
    }

    fn zoom_in(&mut self, tree: &Tree, prefs: &Preferences, symbols: &SymbolTable) -> String {
        let node = self.current_node(tree);
        match first_child(node) {
            Some(child) => {
                self.zoom.push(ZoomStep {
                    from: node.id.clone(),
                    to: child.id.clone(),
                });
                self.set_current(&child.id);
                self.speak_current(tree, prefs, symbols)
            }
            None => {
                // Remember the leaf so that ZoomOut comes straight back to it
                let step = ZoomStep {
                    from: node.id.clone(),
                    to: node.id.clone(),
                };
                if self.zoom.last() != Some(&step) {
                    self.zoom.push(step);
                }
                ZOOMED_IN_ALL.to_string()
            }
        }
    }

    fn zoom_out(&mut self, tree: &Tree, prefs: &Preferences, symbols: &SymbolTable) -> String {
        let current = self.current_node(tree).id.clone();
        if let Some(step) = self.zoom.last() {
            if step.to == current {
                let from = step.from.clone();
                self.zoom.pop();
                self.set_current(&from);
                return self.speak_current(tree, prefs, symbols);
            }
        }
        match nav_parent(tree, &current) {
            Some(parent) => {
                self.move_to(&parent.id);
                self.speak_current(tree, prefs, symbols)
            }
            None => ZOOMED_OUT_ALL.to_string(),
        }
    }

    fn zoom_in_all(&mut self, tree: &Tree, prefs: &Preferences, symbols: &SymbolTable) -> String {
        let mut node = self.current_node(tree);
        if first_child(node).is_none() {
            return ZOOMED_IN_ALL.to_string();
        }
        while let Some(child) = first_child(node) {
            self.zoom.push(ZoomStep {
                from: node.id.clone(),
                to: child.id.clone(),
            });
            node = child;
        }
        self.set_current(&node.id);
        self.speak_current(tree, prefs, symbols)
    }

    fn zoom_out_all(&mut self, tree: &Tree, prefs: &Preferences, symbols: &SymbolTable) -> String {
        let root = effective_root(tree);
        if self.current_node(tree).id == root.id {
            return ZOOMED_OUT_ALL.to_string();
        }
        self.move_to(&root.id);
        self.speak_current(tree, prefs, symbols)
    }
}

// Tree queries

/// The expression without its single-child wrappers
fn effective_root(tree: &Tree) -> &ExpressionNode {
    tree.root().collapse()
}

fn resolve<'t>(tree: &'t Tree, location: &NavigationLocation) -> &'t ExpressionNode {
    if location.is_empty() {
        return effective_root(tree);
    }
    tree.find(&location.id)
        .unwrap_or_else(|| effective_root(tree))
}

/// Nodes that navigation steps over
fn is_silent(node: &ExpressionNode) -> bool {
    matches!(node.kind, NodeKind::Space | NodeKind::NoScript | NodeKind::PreScripts)
        || (node.kind == NodeKind::Operator
            && !node.content.is_empty()
            && node.content.chars().all(is_invisible))
}

/// The first child worth zooming into, with wrappers collapsed
fn first_child(node: &ExpressionNode) -> Option<&ExpressionNode> {
    if node.is_token() {
        return None;
    }
    node.children
        .iter()
        .find(|child| !is_silent(child))
        .or_else(|| node.children.first())
        .map(ExpressionNode::collapse)
}

/// The container whose children are `id`'s siblings, and `id`'s index in it
///
/// Single-child wrappers are transparent: the search continues upward.
fn sibling_context<'t>(tree: &'t Tree, id: &str) -> Option<(&'t ExpressionNode, usize)> {
    let mut node = id;
    loop {
        let parent = tree.parent(node)?;
        let index = tree.index_in_parent(node)?;
        if parent.kind.is_wrapper() && parent.children.len() == 1 {
            node = parent.id.as_str();
            continue;
        }
        return Some((parent, index));
    }
}

fn nav_parent<'t>(tree: &'t Tree, id: &str) -> Option<&'t ExpressionNode> {
    sibling_context(tree, id).map(|(parent, _)| parent)
}

/// Name of the part a child plays in its parent
fn role_name(parent: &ExpressionNode, index: usize) -> Option<&'static str> {
    use NodeKind::*;
    let roles: &[&str] = match parent.kind {
        Fraction => &["numerator", "denominator"],
        Sqrt if parent.children.len() == 1 => &["radicand"],
        Root => &["radicand", "index"],
        Superscript => &["base", "superscript"],
        Subscript => &["base", "subscript"],
        SubSup => &["base", "subscript", "superscript"],
        Under => &["base", "underscript"],
        Over => &["base", "overscript"],
        UnderOver => &["base", "underscript", "overscript"],
        Multiscripts => return multiscript_role(parent, index),
        _ => &[],
    };
    roles.get(index).copied()
}

/// Scripts alternate subscript and superscript on each side of the base
fn multiscript_role(parent: &ExpressionNode, index: usize) -> Option<&'static str> {
    if index == 0 {
        return Some("base");
    }
    let separator = parent
        .children
        .iter()
        .position(|child| child.kind == NodeKind::PreScripts);
    match separator {
        Some(at) if index == at => None,
        Some(at) if index > at => Some(if (index - at) % 2 == 1 {
            "presubscript"
        } else {
            "presuperscript"
        }),
        _ => Some(if index % 2 == 1 { "subscript" } else { "superscript" }),
    }
}

fn role_of(tree: &Tree, id: &str) -> Option<&'static str> {
    sibling_context(tree, id).and_then(|(parent, index)| role_name(parent, index))
}

fn kind_name(node: &ExpressionNode) -> &'static str {
    use NodeKind::*;
    match node.kind {
        Math | Row | Style | Padded | Semantics => "expression",
        Identifier => "identifier",
        Number => "number",
        Operator => "operator",
        Text => "text",
        StringLiteral => "string",
        Space => "space",
        Fraction if node.no_line => "binomial",
        Fraction => "fraction",
        Sqrt => "square root",
        Root => "root",
        Superscript => "power",
        Subscript => "subscript",
        SubSup => "scripted expression",
        Under | Over | UnderOver => "modified expression",
        Multiscripts => "multiscripted expression",
        PreScripts => "prescripts",
        NoScript => "empty script",
        Table => "table",
        TableRow => "table row",
        TableCell => "cell",
        Phantom => "phantom",
        Enclose => "enclosure",
        Error => "error",
    }
}

/// How a container is referred to: its role if it has one, else its kind
fn container_name(tree: &Tree, container: &ExpressionNode) -> &'static str {
    role_of(tree, &container.id).unwrap_or_else(|| kind_name(container))
}

fn boundary_message(tree: &Tree, id: &str, direction: Direction) -> String {
    let container = nav_parent(tree, id).unwrap_or_else(|| effective_root(tree));
    format!("{} of {}", direction.edge(), container_name(tree, container))
}

fn adjacent_sibling(tree: &Tree, id: &str, direction: Direction) -> Option<String> {
    let (parent, index) = sibling_context(tree, id)?;
    let sibling = match direction {
        Direction::Next => parent.children[index + 1..]
            .iter()
            .find(|child| !is_silent(child)),
        Direction::Previous => parent.children[..index]
            .iter()
            .rev()
            .find(|child| !is_silent(child)),
    };
    sibling.map(|child| child.collapse().id.clone())
}

/// Leaves of a subtree in document order, skipping silent ones
fn leaves(node: &ExpressionNode) -> Vec<&ExpressionNode> {
    let mut out = Vec::new();
    node.walk(&mut |n| {
        if n.children.is_empty() && !is_silent(n) {
            out.push(n);
        }
    });
    out
}

fn sibling_target(tree: &Tree, mode: NavMode, id: &str, direction: Direction) -> Target {
    match mode {
        NavMode::Enhanced => match adjacent_sibling(tree, id, direction) {
            Some(sibling) => Target::Node(sibling),
            None => Target::Stay(boundary_message(tree, id, direction)),
        },
        NavMode::Simple => {
            let mut node = id.to_string();
            loop {
                if let Some(sibling) = adjacent_sibling(tree, &node, direction) {
                    return Target::Node(sibling);
                }
                match nav_parent(tree, &node) {
                    Some(parent) => node = parent.id.clone(),
                    None => return Target::Stay(boundary_message(tree, &node, direction)),
                }
            }
        }
        NavMode::Character => leaf_target(tree, id, direction),
    }
}

/// The adjacent leaf in document order
fn leaf_target(tree: &Tree, id: &str, direction: Direction) -> Target {
    let root = effective_root(tree);
    let all = leaves(root);
    let Some(node) = tree.find(id) else {
        return Target::Stay(boundary_message(tree, &root.id, direction));
    };
    let own = leaves(node);
    let anchor = match direction {
        Direction::Previous => own.first(),
        Direction::Next => own.last(),
    };
    let position = anchor.and_then(|leaf| all.iter().position(|n| n.id == leaf.id));
    let target = match (position, direction) {
        (Some(i), Direction::Previous) if i > 0 => all.get(i - 1),
        (Some(i), Direction::Next) => all.get(i + 1),
        _ => None,
    };
    match target {
        Some(leaf) => Target::Node(leaf.id.clone()),
        None => Target::Stay(boundary_message(tree, &root.id, direction)),
    }
}

/// First or last leaf of the current container
fn end_target(tree: &Tree, id: &str, direction: Direction) -> Target {
    let container = nav_parent(tree, id).unwrap_or_else(|| effective_root(tree));
    let all = leaves(container);
    let leaf = match direction {
        Direction::Previous => all.first(),
        Direction::Next => all.last(),
    };
    match leaf {
        Some(leaf) => Target::Node(leaf.id.clone()),
        None => Target::Stay(boundary_message(tree, id, direction)),
    }
}

/// The table cell holding `id`, if any
fn cell_of<'t>(tree: &'t Tree, id: &str) -> Option<&'t ExpressionNode> {
    let node = tree.find(id)?;
    if node.kind == NodeKind::TableCell {
        return Some(node);
    }
    tree.ancestors(id)
        .into_iter()
        .find(|ancestor| ancestor.kind == NodeKind::TableCell)
}

/// Table, row index and column index of the cell holding `id`
fn table_position<'t>(tree: &'t Tree, id: &str) -> Option<(&'t ExpressionNode, usize, usize)> {
    let cell = cell_of(tree, id)?;
    let row = tree.parent(&cell.id)?;
    let table = tree.parent(&row.id)?;
    Some((
        table,
        tree.index_in_parent(&row.id)?,
        tree.index_in_parent(&cell.id)?,
    ))
}

fn line_target(tree: &Tree, id: &str, direction: Direction) -> Target {
    let Some((table, row, _)) = table_position(tree, id) else {
        return Target::Stay(NOT_IN_TABLE.to_string());
    };
    let cells = &table.children[row].children;
    let cell = match direction {
        Direction::Previous => cells.first(),
        Direction::Next => cells.last(),
    };
    match cell {
        Some(cell) => Target::Node(cell.id.clone()),
        None => Target::Stay(format!("{} of row", direction.edge())),
    }
}

fn cell_target(tree: &Tree, id: &str, direction: Direction) -> Target {
    let Some((table, row, column)) = table_position(tree, id) else {
        return Target::Stay(NOT_IN_TABLE.to_string());
    };
    let cells = &table.children[row].children;
    let cell = match direction {
        Direction::Previous => column.checked_sub(1).and_then(|c| cells.get(c)),
        Direction::Next => cells.get(column + 1),
    };
    match cell {
        Some(cell) => Target::Node(cell.id.clone()),
        None => Target::Stay(format!("{} of row", direction.edge())),
    }
}

fn vertical_target(tree: &Tree, id: &str, direction: Direction) -> Target {
    let Some((table, row, column)) = table_position(tree, id) else {
        return Target::Stay(NOT_IN_TABLE.to_string());
    };
    let row = match direction {
        Direction::Previous => row.checked_sub(1).and_then(|r| table.children.get(r)),
        Direction::Next => table.children.get(row + 1),
    };
    match row.and_then(|row| row.children.get(column)) {
        Some(cell) => Target::Node(cell.id.clone()),
        None => Target::Stay(match direction {
            Direction::Previous => "top of table".to_string(),
            Direction::Next => "bottom of table".to_string(),
        }),
    }
}

fn column_target(tree: &Tree, id: &str, direction: Direction) -> Target {
    let Some((table, _, column)) = table_position(tree, id) else {
        return Target::Stay(NOT_IN_TABLE.to_string());
    };
    let row = match direction {
        Direction::Previous => table.children.first(),
        Direction::Next => table.children.last(),
    };
    match row.and_then(|row| row.children.get(column)) {
        Some(cell) => Target::Node(cell.id.clone()),
        None => Target::Stay(format!("{} of column", direction.edge())),
    }
}

// Speech

fn speak_node(
    node: &ExpressionNode,
    prefs: &Preferences,
    symbols: &SymbolTable,
    describe: bool,
) -> String {
    let ctx = RuleContext::new(prefs, symbols);
    let ctx = if describe { ctx.describing() } else { ctx };
    let text = speech::speak(ctx, node);
    if text.is_empty() {
        kind_name(node).to_string()
    } else {
        text
    }
}

fn read(
    target: Target,
    tree: &Tree,
    prefs: &Preferences,
    symbols: &SymbolTable,
    describe: bool,
) -> String {
    match target {
        Target::Node(id) => match tree.find(&id) {
            Some(node) => speak_node(node, prefs, symbols, describe),
            None => String::new(),
        },
        Target::Stay(message) => message,
    }
}

fn where_am_i(tree: &Tree, id: &str, prefs: &Preferences, symbols: &SymbolTable) -> String {
    let Some(parent) = nav_parent(tree, id) else {
        return NOT_INSIDE.to_string();
    };
    let context = speak_node(parent, prefs, symbols, false);
    match role_of(tree, id) {
        Some(role) => format!("{} of {}", role, context),
        None => format!("inside {}", context),
    }
}

fn where_am_i_all(tree: &Tree, id: &str) -> String {
    let mut phrases = Vec::new();
    let mut node = id.to_string();
    while let Some(parent) = nav_parent(tree, &node) {
        phrases.push(match role_of(tree, &node) {
            Some(role) => format!("{} of {}", role, kind_name(parent)),
            None => format!("inside {}", kind_name(parent)),
        });
        node = parent.id.clone();
    }
    if phrases.is_empty() {
        NOT_INSIDE.to_string()
    } else {
        phrases.join("; ")
    }
}

fn cycle_nav_mode(prefs: &mut Preferences, direction: Direction) -> Result<String> {
    const MODES: [NavMode; 3] = [NavMode::Enhanced, NavMode::Simple, NavMode::Character];
    let index = MODES
        .iter()
        .position(|&mode| mode == prefs.nav_mode())
        .unwrap_or(0);
    let next = match direction {
        Direction::Next => MODES[(index + 1) % MODES.len()],
        Direction::Previous => MODES[(index + MODES.len() - 1) % MODES.len()],
    };
    prefs.set("NavMode", next.as_str())?;
    Ok(format!("{} mode", next.as_str().to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{annotate, parse};

    fn tree(markup: &str) -> Tree {
        let mut root = parse(markup).unwrap();
        annotate(&mut root).unwrap();
        Tree::new(root)
    }

    fn run(nav: &mut Navigator, tree: &Tree, prefs: &mut Preferences, command: &str) -> String {
        let symbols = SymbolTable::new();
        match nav
            .execute(command.parse().unwrap(), tree, prefs, &symbols)
            .unwrap()
        {
            NavOutput::Speech(text) => text,
            NavOutput::Exit => "Exit".to_string(),
        }
    }

    const FRACTION: &str = "<math><mfrac id='f'><mrow id='num'><mi id='a'>a</mi><mo id='plus'>+</mo><mi id='b'>b</mi></mrow><mi id='c'>c</mi></mfrac></math>";

    #[test]
    fn test_zoom_round_trip() {
        let tree = tree(FRACTION);
        let mut prefs = Preferences::new();
        let mut nav = Navigator::new();
        assert_eq!(run(&mut nav, &tree, &mut prefs, "ZoomIn"), "a plus b");
        assert_eq!(nav.location().id, "num");
        run(&mut nav, &tree, &mut prefs, "ZoomIn");
        assert_eq!(nav.location().id, "a");
        assert_eq!(run(&mut nav, &tree, &mut prefs, "ZoomIn"), ZOOMED_IN_ALL);
        run(&mut nav, &tree, &mut prefs, "ZoomOut");
        assert_eq!(nav.location().id, "a");
        run(&mut nav, &tree, &mut prefs, "ZoomOut");
        assert_eq!(nav.location().id, "num");
    }

    #[test]
    fn test_enhanced_boundaries() {
        let tree = tree(FRACTION);
        let mut prefs = Preferences::new();
        let mut nav = Navigator::new();
        nav.set_location(&tree, &NavigationLocation::node("b")).unwrap();
        assert_eq!(run(&mut nav, &tree, &mut prefs, "MoveNext"), "end of numerator");
        assert_eq!(nav.location().id, "b");
        assert_eq!(run(&mut nav, &tree, &mut prefs, "MovePrevious"), "plus");
    }

    #[test]
    fn test_simple_mode_walks_out() {
        let tree = tree(FRACTION);
        let mut prefs = Preferences::new();
        prefs.set("NavMode", "Simple").unwrap();
        let mut nav = Navigator::new();
        nav.set_location(&tree, &NavigationLocation::node("b")).unwrap();
        assert_eq!(run(&mut nav, &tree, &mut prefs, "MoveNext"), "c");
    }

    #[test]
    fn test_character_mode() {
        let tree = tree(FRACTION);
        let mut prefs = Preferences::new();
        prefs.set("NavMode", "Character").unwrap();
        let mut nav = Navigator::new();
        assert_eq!(run(&mut nav, &tree, &mut prefs, "MoveNext"), "end of fraction");
        nav.set_location(&tree, &NavigationLocation::node("num")).unwrap();
        assert_eq!(run(&mut nav, &tree, &mut prefs, "MoveNext"), "c");
    }

    #[test]
    fn test_where_am_i() {
        let tree = tree(FRACTION);
        let mut prefs = Preferences::new();
        let mut nav = Navigator::new();
        nav.set_location(&tree, &NavigationLocation::node("c")).unwrap();
        assert_eq!(
            run(&mut nav, &tree, &mut prefs, "WhereAmI"),
            "denominator of fraction a plus b over c end fraction"
        );
        nav.set_location(&tree, &NavigationLocation::node("a")).unwrap();
        assert_eq!(
            run(&mut nav, &tree, &mut prefs, "WhereAmIAll"),
            "inside expression; numerator of fraction"
        );
    }

    #[test]
    fn test_toggles_change_preferences() {
        let tree = tree(FRACTION);
        let mut prefs = Preferences::new();
        let mut nav = Navigator::new();
        assert_eq!(run(&mut nav, &tree, &mut prefs, "ToggleZoomLockDown"), "simple mode");
        assert_eq!(prefs.nav_mode(), NavMode::Simple);
        assert_eq!(run(&mut nav, &tree, &mut prefs, "ToggleZoomLockUp"), "enhanced mode");
        assert_eq!(run(&mut nav, &tree, &mut prefs, "ToggleSpeakMode"), "overview on");
        assert!(prefs.overview());
    }

    #[test]
    fn test_set_location_validation() {
        let tree = tree(FRACTION);
        let mut nav = Navigator::new();
        assert!(matches!(
            nav.set_location(&tree, &NavigationLocation::node("nope")),
            Err(MathError::UnknownNodeId(_))
        ));
        assert!(matches!(
            nav.set_location(&tree, &NavigationLocation::new("a", 2)),
            Err(MathError::InvalidOffset { .. })
        ));
        assert!(matches!(
            nav.set_location(&tree, &NavigationLocation::new("f", 1)),
            Err(MathError::InvalidOffset { .. })
        ));
        nav.set_location(&tree, &NavigationLocation::new("a", 1)).unwrap();
        assert_eq!(nav.location(), &NavigationLocation::node("a"));
    }
}
