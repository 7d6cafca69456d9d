//! MathML parsing with quick-xml
//!
//! Builds an unannotated [`ExpressionNode`] tree and enforces the structural
//! rules of the element set: fixed arities, token leaves, table nesting and a
//! single `<math>` root.

use super::{ExpressionNode, NodeKind};
use crate::{MathError, Result};
use log::{debug, trace};
use once_cell::sync::Lazy;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::borrow::Cow;
use std::collections::HashMap;

/// Named entities commonly found in MathML beyond the XML predefined five
static MATHML_ENTITIES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("InvisibleTimes", "\u{2062}");
    m.insert("it", "\u{2062}");
    m.insert("ApplyFunction", "\u{2061}");
    m.insert("af", "\u{2061}");
    m.insert("InvisibleComma", "\u{2063}");
    m.insert("ic", "\u{2063}");
    m.insert("times", "×");
    m.insert("sdot", "⋅");
    m.insert("middot", "·");
    m.insert("divide", "÷");
    m.insert("minus", "−");
    m.insert("PlusMinus", "±");
    m.insert("pm", "±");
    m.insert("le", "≤");
    m.insert("leq", "≤");
    m.insert("ge", "≥");
    m.insert("geq", "≥");
    m.insert("ne", "≠");
    m.insert("infin", "∞");
    m.insert("sum", "∑");
    m.insert("Sum", "∑");
    m.insert("int", "∫");
    m.insert("Integral", "∫");
    m.insert("rarr", "→");
    m.insert("RightArrow", "→");
    m.insert("prime", "′");
    m.insert("alpha", "α");
    m.insert("beta", "β");
    m.insert("gamma", "γ");
    m.insert("delta", "δ");
    m.insert("epsilon", "ε");
    m.insert("theta", "θ");
    m.insert("lambda", "λ");
    m.insert("mu", "μ");
    m.insert("pi", "π");
    m.insert("sigma", "σ");
    m.insert("phi", "φ");
    m.insert("omega", "ω");
    m.insert("nbsp", "\u{a0}");
    m
});

fn resolve_entity(name: &str) -> Option<&'static str> {
    quick_xml::escape::resolve_predefined_entity(name)
        .or_else(|| MATHML_ENTITIES.get(name).copied())
}

fn unescape(raw: &str) -> Result<Cow<'_, str>> {
    quick_xml::escape::unescape_with(raw, resolve_entity)
        .map_err(|e| MathError::Input(format!("Unescape error: {}", e)))
}

/// Elements that close into one of the core kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rewrite {
    Keep,
    /// `mfenced`: a row with explicit fence and separator operators
    Fenced,
    /// `mlabeledtr`: a table row without its label cell
    LabeledRow,
    /// `maction`: only the selected child is kept
    Action,
}

/// An element whose end tag has not been seen yet
struct Open {
    node: ExpressionNode,
    rewrite: Rewrite,
}

impl Open {
    /// Element name the end tag must carry
    fn tag(&self) -> &'static str {
        match self.rewrite {
            Rewrite::Keep => self.node.kind.tag(),
            Rewrite::Fenced => "mfenced",
            Rewrite::LabeledRow => "mlabeledtr",
            Rewrite::Action => "maction",
        }
    }
}

fn element_kind(tag: &str) -> Option<(NodeKind, Rewrite)> {
    let element = match tag {
        "mfenced" => (NodeKind::Row, Rewrite::Fenced),
        "mlabeledtr" => (NodeKind::TableRow, Rewrite::LabeledRow),
        "maction" => (NodeKind::Row, Rewrite::Action),
        _ => (NodeKind::from_tag(tag)?, Rewrite::Keep),
    };
    Some(element)
}

fn is_annotation(tag: &str) -> bool {
    tag == "annotation" || tag == "annotation-xml"
}

/// Parse a MathML string into an (unannotated) expression tree
pub fn parse(markup: &str) -> Result<ExpressionNode> {
    let mut reader = Reader::from_str(markup);
    reader.config_mut().trim_text(false);

    // Elements currently open, innermost last
    let mut stack: Vec<Open> = Vec::with_capacity(16);
    let mut root: Option<ExpressionNode> = None;
    // Depth inside a skipped annotation
    let mut skipping = 0usize;

    loop {
        let event = reader.read_event().map_err(|e| {
            MathError::Input(format!(
                "XML error at position {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;
        match event {
            Event::Start(e) => {
                let tag = decode_tag_name(&reader, e.name().as_ref())?;
                if skipping > 0 {
                    skipping += 1;
                } else if is_annotation(&tag) {
                    check_annotation(&stack, &tag)?;
                    skipping = 1;
                } else {
                    let open = start_node(&reader, &e, &tag, &stack, root.is_some())?;
                    stack.push(open);
                }
            }
            Event::Empty(e) => {
                let tag = decode_tag_name(&reader, e.name().as_ref())?;
                if skipping > 0 {
                    continue;
                }
                if is_annotation(&tag) {
                    check_annotation(&stack, &tag)?;
                    continue;
                }
                let open = start_node(&reader, &e, &tag, &stack, root.is_some())?;
                finish_node(open, &mut stack, &mut root)?;
            }
            Event::End(e) => {
                if skipping > 0 {
                    skipping -= 1;
                    continue;
                }
                let tag = decode_tag_name(&reader, e.name().as_ref())?;
                let open = stack
                    .pop()
                    .ok_or_else(|| MathError::Input(format!("Unexpected end tag </{}>", tag)))?;
                if open.tag() != tag {
                    return Err(MathError::Input(format!(
                        "Mismatched end tag </{}>, expected </{}>",
                        tag,
                        open.tag()
                    )));
                }
                finish_node(open, &mut stack, &mut root)?;
            }
            Event::Eof => break,
            _ if skipping > 0 => {}
            Event::Text(e) => {
                let raw = reader
                    .decoder()
                    .decode(&e)
                    .map_err(|err| MathError::Input(format!("Decode error: {:?}", err)))?;
                add_text(&mut stack, &raw)?;
            }
            Event::CData(e) => {
                let raw = reader
                    .decoder()
                    .decode(&e)
                    .map_err(|err| MathError::Input(format!("Decode error: {:?}", err)))?;
                add_text(&mut stack, &raw)?;
            }
            Event::GeneralRef(e) => {
                let name = e
                    .decode()
                    .map_err(|err| MathError::Input(format!("Decode error: {:?}", err)))?;
                let entity = format!("&{};", name);
                let resolved = unescape(&entity)
                    .map_err(|_| MathError::Input(format!("Unknown entity {}", entity)))?;
                add_text(&mut stack, &resolved)?;
            }
            // Comments, declarations and processing instructions carry no math
            _ => {}
        }
    }

    if skipping > 0 {
        return Err(MathError::Input("Missing end tag for <annotation>".to_string()));
    }
    if let Some(open) = stack.last() {
        return Err(MathError::Input(format!(
            "Missing end tag for <{}>",
            open.tag()
        )));
    }
    root.ok_or_else(|| MathError::Input("No <math> element found".to_string()))
}

fn decode_tag_name(reader: &Reader<&[u8]>, raw: &[u8]) -> Result<String> {
    let decoded = reader
        .decoder()
        .decode(raw)
        .map_err(|e| MathError::Input(format!("Decode error: {:?}", e)))?;
    let local_name = decoded.rsplit(':').next().unwrap_or(decoded.as_ref());
    Ok(local_name.to_string())
}

/// Annotations are only meaningful as alternatives inside `semantics`
fn check_annotation(stack: &[Open], tag: &str) -> Result<()> {
    match stack.last() {
        Some(open) if open.node.kind == NodeKind::Semantics => Ok(()),
        Some(open) => Err(MathError::Input(format!(
            "<{}> is not allowed inside <{}>",
            tag,
            open.tag()
        ))),
        None => Err(MathError::Input(format!("<{}> outside of <math>", tag))),
    }
}

fn start_node(
    reader: &Reader<&[u8]>,
    e: &BytesStart<'_>,
    tag: &str,
    stack: &[Open],
    have_root: bool,
) -> Result<Open> {
    let (kind, rewrite) = element_kind(tag)
        .ok_or_else(|| MathError::Input(format!("Unknown MathML element <{}>", tag)))?;
    trace!("Parsing <{}>", tag);

    match stack.last() {
        None if have_root => {
            return Err(MathError::Input(format!(
                "Only one <math> element is allowed, found <{}>",
                tag
            )))
        }
        None if kind != NodeKind::Math => {
            return Err(MathError::Input(format!(
                "Expected <math> as the outer element, found <{}>",
                tag
            )))
        }
        Some(_) if kind == NodeKind::Math => {
            return Err(MathError::Input("<math> cannot be nested".to_string()))
        }
        Some(parent) => check_nesting(parent, kind, tag)?,
        None => {}
    }

    let mut node = ExpressionNode::new(kind);
    for attr in e.attributes() {
        let attr = attr.map_err(|err| MathError::Input(format!("Bad attribute: {}", err)))?;
        let key = reader
            .decoder()
            .decode(attr.key.as_ref())
            .map_err(|err| MathError::Input(format!("Decode error: {:?}", err)))?
            .into_owned();
        let raw = reader
            .decoder()
            .decode(&attr.value)
            .map_err(|err| MathError::Input(format!("Decode error: {:?}", err)))?;
        let value = unescape(&raw)?.into_owned();
        if key == "id" {
            node.id = value;
        } else {
            if key == "linethickness" && kind == NodeKind::Fraction {
                node.no_line = is_zero_thickness(&value);
            }
            node.attributes.push((key, value));
        }
    }
    Ok(Open { node, rewrite })
}

fn check_nesting(parent: &Open, child: NodeKind, tag: &str) -> Result<()> {
    use NodeKind::*;
    let allowed = match (parent.node.kind, child) {
        (p, _) if p.is_token() => false,
        (Table, TableRow) => true,
        (Table, _) => false,
        (TableRow, TableCell) => true,
        (TableRow, _) => false,
        (_, TableRow) | (_, TableCell) => false,
        (Multiscripts, _) => true,
        (_, PreScripts) | (_, NoScript) => false,
        _ => true,
    };
    if allowed {
        Ok(())
    } else {
        Err(MathError::Input(format!(
            "<{}> is not allowed inside <{}>",
            tag,
            parent.tag()
        )))
    }
}

fn add_text(stack: &mut [Open], text: &str) -> Result<()> {
    match stack.last_mut() {
        Some(open) if open.node.is_token() => {
            open.node.content.push_str(text);
            Ok(())
        }
        _ if text.trim().is_empty() => Ok(()),
        Some(open) => Err(MathError::Input(format!(
            "Text '{}' is not allowed inside <{}>",
            text.trim(),
            open.tag()
        ))),
        None => Err(MathError::Input(format!(
            "Text '{}' outside of <math>",
            text.trim()
        ))),
    }
}

fn finish_node(open: Open, stack: &mut [Open], root: &mut Option<ExpressionNode>) -> Result<()> {
    let mut node = match open.rewrite {
        Rewrite::Keep => open.node,
        Rewrite::Fenced => fenced_row(open.node),
        Rewrite::LabeledRow => unlabeled_row(open.node)?,
        Rewrite::Action => selected_action(open.node)?,
    };
    if node.is_token() {
        node.content = node.content.split_whitespace().collect::<Vec<_>>().join(" ");
    }
    if let Some(arity) = node.kind.arity() {
        if node.children.len() != arity {
            return Err(MathError::Input(format!(
                "<{}> needs {} children but has {}",
                node.kind.tag(),
                arity,
                node.children.len()
            )));
        }
    }
    if node.kind == NodeKind::Multiscripts {
        check_multiscripts(&node)?;
    }
    match stack.last_mut() {
        Some(parent) => parent.node.children.push(node),
        None => *root = Some(node),
    }
    Ok(())
}

/// Spell out an `mfenced` as `open`, the items with separators, `close`
///
/// Several items are grouped in an inner row so that the result has the
/// shape of a hand-written fenced row.
fn fenced_row(mut node: ExpressionNode) -> ExpressionNode {
    let open = node.attribute("open").unwrap_or("(").trim().to_string();
    let close = node.attribute("close").unwrap_or(")").trim().to_string();
    let separators: Vec<char> = node
        .attribute("separators")
        .unwrap_or(",")
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect();
    node.attributes
        .retain(|(key, _)| !matches!(key.as_str(), "open" | "close" | "separators"));

    let items = std::mem::take(&mut node.children);
    let count = items.len();
    let mut inner = Vec::with_capacity(count * 2);
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            // The last separator repeats when there are more gaps than separators
            if let Some(separator) = separators.get(i - 1).or(separators.last()) {
                inner.push(ExpressionNode::token(NodeKind::Operator, &separator.to_string()));
            }
        }
        inner.push(item);
    }

    if !open.is_empty() {
        node.children.push(ExpressionNode::token(NodeKind::Operator, &open));
    }
    if count > 1 {
        node.children.push(ExpressionNode::with_children(NodeKind::Row, inner));
    } else {
        node.children.extend(inner);
    }
    if !close.is_empty() {
        node.children.push(ExpressionNode::token(NodeKind::Operator, &close));
    }
    node
}

/// Drop the label cell (the first child) of an `mlabeledtr`
fn unlabeled_row(mut node: ExpressionNode) -> Result<ExpressionNode> {
    if node.children.is_empty() {
        return Err(MathError::Input("<mlabeledtr> needs a label cell".to_string()));
    }
    let label = node.children.remove(0);
    trace!("Skipping row label {}", label.id);
    Ok(node)
}

/// Keep the child picked by `selection` (1-based, default 1)
fn selected_action(mut node: ExpressionNode) -> Result<ExpressionNode> {
    let count = node.children.len();
    if count == 0 {
        return Err(MathError::Input("<maction> needs at least one child".to_string()));
    }
    let selection = node
        .attribute("selection")
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(1);
    let index = if (1..=count).contains(&selection) {
        selection - 1
    } else {
        debug!("maction selection {} out of range, using the first child", selection);
        0
    };
    Ok(node.children.swap_remove(index))
}

/// A base, then subscript/superscript pairs, optionally `mprescripts` and more pairs
fn check_multiscripts(node: &ExpressionNode) -> Result<()> {
    let base = node.children.first().map(|child| child.kind);
    if matches!(base, None | Some(NodeKind::PreScripts)) {
        return Err(MathError::Input("<mmultiscripts> needs a base".to_string()));
    }
    let separators = node
        .children
        .iter()
        .filter(|child| child.kind == NodeKind::PreScripts)
        .count();
    if separators > 1 {
        return Err(MathError::Input(
            "<mmultiscripts> can have only one <mprescripts/>".to_string(),
        ));
    }
    let (post, pre) = node.script_pairs();
    if post.len() % 2 != 0 || pre.len() % 2 != 0 {
        return Err(MathError::Input(
            "<mmultiscripts> scripts must come in subscript/superscript pairs".to_string(),
        ));
    }
    Ok(())
}

/// `linethickness` values that draw no fraction bar ("0", "0px", "0.0em", ...)
fn is_zero_thickness(value: &str) -> bool {
    let number = value
        .trim()
        .trim_end_matches(|c: char| c.is_ascii_alphabetic() || c == '%');
    number.parse::<f64>().map(|v| v == 0.0).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_binomial() {
        let root = parse("<math><mfrac linethickness='0'><mi>m</mi><mi>n</mi></mfrac></math>")
            .unwrap();
        assert_eq!(root.kind, NodeKind::Math);
        let frac = &root.children[0];
        assert!(frac.is_binomial());
        assert_eq!(frac.attribute("linethickness"), Some("0"));
        assert_eq!(frac.children[1].content, "n");
    }

    #[test]
    fn test_zero_thickness_units() {
        assert!(is_zero_thickness("0"));
        assert!(is_zero_thickness("0px"));
        assert!(is_zero_thickness(" 0.0em "));
        assert!(!is_zero_thickness("1px"));
        assert!(!is_zero_thickness("thin"));
    }

    #[test]
    fn test_entities_and_whitespace() {
        let root = parse("<math><mo> &times; </mo><mo>&#x2062;</mo><mtext>a  &amp;\n b</mtext></math>")
            .unwrap();
        assert_eq!(root.children[0].content, "×");
        assert_eq!(root.children[1].content, "\u{2062}");
        assert_eq!(root.children[2].content, "a & b");
    }

    #[test]
    fn test_named_entities_resolve_in_tokens() {
        let root = parse("<math><mi>&alpha;</mi><mo>&times;</mo><mi>x</mi></math>").unwrap();
        assert_eq!(root.children[0].content, "α");
        assert_eq!(root.children[1].content, "×");
        let err = parse("<math><mo>&nosuch;</mo></math>").unwrap_err();
        assert_eq!(err.to_string(), "Invalid MathML: Unknown entity &nosuch;");
    }

    #[test]
    fn test_semantics_drops_annotations() {
        let root = parse(
            "<math><semantics id='s'><mi>x</mi><annotation encoding='TeX'>x</annotation>\
             <annotation-xml encoding='MathML-Content'><ci>x</ci></annotation-xml></semantics></math>",
        )
        .unwrap();
        let semantics = &root.children[0];
        assert_eq!(semantics.kind, NodeKind::Semantics);
        assert_eq!(semantics.children.len(), 1);
        assert_eq!(semantics.children[0].content, "x");
        assert!(parse("<math><annotation>x</annotation></math>").is_err());
        assert!(parse("<math><semantics><annotation>x</annotation></semantics></math>").is_err());
    }

    #[test]
    fn test_string_literal_is_a_token() {
        let root = parse("<math><ms>  hello   world </ms></math>").unwrap();
        assert_eq!(root.children[0].kind, NodeKind::StringLiteral);
        assert_eq!(root.children[0].content, "hello world");
        assert!(parse("<math><ms><mi>x</mi></ms></math>").is_err());
    }

    #[test]
    fn test_mfenced_becomes_fenced_row() {
        let root = parse(
            "<math><mfenced id='f' separators=';' close=']'><mi>a</mi><mi>b</mi><mi>c</mi></mfenced></math>",
        )
        .unwrap();
        let row = &root.children[0];
        assert_eq!(row.kind, NodeKind::Row);
        assert_eq!(row.id, "f");
        assert!(row.attributes.is_empty());
        assert!(row.children[0].is_operator("("));
        assert!(row.children[2].is_operator("]"));
        let items: Vec<&str> = row.children[1].children.iter().map(|n| n.content.as_str()).collect();
        assert_eq!(items, ["a", ";", "b", ";", "c"]);

        let single = parse("<math><mfenced><mi>x</mi></mfenced></math>").unwrap();
        let contents: Vec<&str> = single.children[0].children.iter().map(|n| n.content.as_str()).collect();
        assert_eq!(contents, ["(", "x", ")"]);
    }

    #[test]
    fn test_labeled_row_loses_label() {
        let root = parse(
            "<math><mtable><mlabeledtr><mtd><mtext>(1)</mtext></mtd><mtd><mi>x</mi></mtd></mlabeledtr></mtable></math>",
        )
        .unwrap();
        let row = &root.children[0].children[0];
        assert_eq!(row.kind, NodeKind::TableRow);
        assert_eq!(row.children.len(), 1);
        assert_eq!(row.children[0].children[0].content, "x");
        assert!(parse("<math><mtable><mlabeledtr></mlabeledtr></mtable></math>").is_err());
    }

    #[test]
    fn test_maction_keeps_selection() {
        let root = parse(
            "<math><maction actiontype='toggle' selection='2'><mi>a</mi><mi>b</mi></maction></math>",
        )
        .unwrap();
        assert_eq!(root.children[0].content, "b");
        let root = parse("<math><maction selection='9'><mi>a</mi><mi>b</mi></maction></math>").unwrap();
        assert_eq!(root.children[0].content, "a");
        assert!(parse("<math><maction/></math>").is_err());
    }

    #[test]
    fn test_multiscripts_structure() {
        let root = parse(
            "<math><mmultiscripts><mi>C</mi><mn>2</mn><none/><mprescripts/><mn>1</mn><mn>3</mn></mmultiscripts></math>",
        )
        .unwrap();
        let scripts = &root.children[0];
        assert_eq!(scripts.kind, NodeKind::Multiscripts);
        assert_eq!(scripts.children[2].kind, NodeKind::NoScript);
        assert_eq!(scripts.children[3].kind, NodeKind::PreScripts);

        let bad = [
            "<math><mmultiscripts><mi>C</mi><mn>2</mn></mmultiscripts></math>",
            "<math><mmultiscripts><mprescripts/><mn>1</mn><mn>2</mn></mmultiscripts></math>",
            "<math><mmultiscripts><mi>C</mi><mprescripts/><mprescripts/></mmultiscripts></math>",
            "<math><mrow><none/></mrow></math>",
        ];
        for markup in bad {
            assert!(parse(markup).is_err(), "{}", markup);
        }
    }

    #[test]
    fn test_explicit_id_kept() {
        let root = parse("<math><mi id='x1' mathvariant='bold'>x</mi></math>").unwrap();
        assert_eq!(root.children[0].id, "x1");
        assert_eq!(root.children[0].attributes, vec![("mathvariant".into(), "bold".into())]);
    }

    #[test]
    fn test_structural_errors() {
        let bad = [
            "<math><mrow><mi>x</mi></math>",
            "<math><mi>x</mi>",
            "<math><mfrac><mi>x</mi></mfrac></math>",
            "<math><mi><mn>1</mn></mi></math>",
            "<math><mrow>loose text</mrow></math>",
            "<math><mtable><mtd><mi>x</mi></mtd></mtable></math>",
            "<math><mfoo/></math>",
            "<mrow><mi>x</mi></mrow>",
            "<math><mi>x</mi></math><math/>",
            "<math><mo>&bogus;</mo></math>",
        ];
        for markup in bad {
            let err = parse(markup).expect_err(markup);
            assert_eq!(err.kind(), crate::error::ErrorKind::Input, "{}", markup);
        }
    }

    #[test]
    fn test_namespaced_elements() {
        let root = parse("<m:math xmlns:m='http://www.w3.org/1998/Math/MathML'><m:mn>2</m:mn></m:math>")
            .unwrap();
        assert_eq!(root.children[0].kind, NodeKind::Number);
    }
}
