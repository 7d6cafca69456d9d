//! Writing annotated trees back out as MathML

use super::ExpressionNode;
use quick_xml::escape::escape;

/// Serialize a node (and its subtree) as MathML, `id` first
pub fn to_mathml(node: &ExpressionNode) -> String {
    let mut out = String::with_capacity(256);
    write_node(node, &mut out);
    out
}

fn write_node(node: &ExpressionNode, out: &mut String) {
    let tag = node.kind.tag();
    out.push('<');
    out.push_str(tag);
    if !node.id.is_empty() {
        write_attribute(out, "id", &node.id);
    }
    for (key, value) in &node.attributes {
        write_attribute(out, key, value);
    }

    if node.children.is_empty() && node.content.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    out.push_str(&escape(node.content.as_str()));
    for child in &node.children {
        write_node(child, out);
    }
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn write_attribute(out: &mut String, key: &str, value: &str) {
    out.push(' ');
    out.push_str(key);
    out.push_str("=\"");
    out.push_str(&escape(value));
    out.push('"');
}
