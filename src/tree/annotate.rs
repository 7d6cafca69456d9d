//! Synthetic id assignment
//!
//! Nodes without an `id` get `"{tag}-{n}"`, numbered per element name in
//! document order and skipping any value already used by an explicit id.
//! Already-annotated markup is left untouched.

use super::ExpressionNode;
use crate::{MathError, Result};
use log::debug;
use std::collections::{HashMap, HashSet};

/// Give every node in the tree a unique, non-empty id
pub fn annotate(root: &mut ExpressionNode) -> Result<()> {
    let mut used = HashSet::new();
    collect_explicit(root, &mut used)?;

    let explicit = used.len();
    let mut counters: HashMap<&'static str, usize> = HashMap::new();
    assign(root, &mut used, &mut counters);
    debug!(
        "Annotated tree: {} explicit ids, {} synthesized",
        explicit,
        used.len() - explicit
    );
    Ok(())
}

fn collect_explicit(node: &ExpressionNode, used: &mut HashSet<String>) -> Result<()> {
    if !node.id.is_empty() && !used.insert(node.id.clone()) {
        return Err(MathError::Input(format!("Duplicate id '{}'", node.id)));
    }
    for child in &node.children {
        collect_explicit(child, used)?;
    }
    Ok(())
}

fn assign(
    node: &mut ExpressionNode,
    used: &mut HashSet<String>,
    counters: &mut HashMap<&'static str, usize>,
) {
    if node.id.is_empty() {
        let tag = node.kind.tag();
        let counter = counters.entry(tag).or_insert(0);
        loop {
            *counter += 1;
            let candidate = format!("{}-{}", tag, counter);
            if used.insert(candidate.clone()) {
                node.id = candidate;
                break;
            }
        }
    }
    for child in &mut node.children {
        assign(child, used, counters);
    }
}
