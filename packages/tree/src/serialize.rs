//! HTML serialization of a component subtree, used for the explicit-save
//! path. Capability flags and engine metadata are session state and are not
//! written out; style-identifier classes are, which is how identifiers
//! survive a save/load round-trip.

use crate::node::ComponentNode;

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Serialize a node and its descendants to an HTML string.
pub fn serialize_html(node: &ComponentNode) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

fn write_node(node: &ComponentNode, out: &mut String) {
    if let Some(text) = &node.text {
        out.push_str(&escape_text(text));
        return;
    }

    out.push('<');
    out.push_str(&node.tag);

    if !node.classes.is_empty() {
        out.push_str(" class=\"");
        out.push_str(&escape_attr(&node.classes.join(" ")));
        out.push('"');
    }

    let mut attrs: Vec<(&String, &String)> = node.attributes.iter().collect();
    attrs.sort_by_key(|(name, _)| name.as_str());
    for (name, value) in attrs {
        out.push(' ');
        out.push_str(name);
        if !value.is_empty() {
            out.push_str("=\"");
            out.push_str(&escape_attr(value));
            out.push('"');
        }
    }

    if VOID_TAGS.contains(&node.tag.as_str()) && node.children.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for child in &node.children {
        write_node(child, out);
    }
    out.push_str("</");
    out.push_str(&node.tag);
    out.push('>');
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}
