use bg_parser::{XmlElementNode, XmlNode};

pub const XML_DECLARATION: &str = "<?xml version='1.0' encoding='utf-8'?>";

/// Serializes `root` behind the XML declaration. Elements without children
/// are self-closed.
pub fn write_document(root: &XmlElementNode) -> String {
    let mut out = String::from(XML_DECLARATION);
    out.push('\n');
    write_element(&mut out, root);
    out.push('\n');
    out
}

fn write_element(out: &mut String, element: &XmlElementNode) {
    out.push('<');
    out.push_str(&element.name);
    for (name, value) in &element.attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attribute(value));
        out.push('"');
    }
    if element.children.is_empty() {
        out.push_str(" />");
        return;
    }
    out.push('>');
    for child in &element.children {
        match child {
            XmlNode::Element(child) => write_element(out, child),
            XmlNode::Text(text) => out.push_str(&escape_text(text)),
        }
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}

pub fn escape_text(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Line breaks and tabs are kept as character references so they survive
/// attribute value normalization.
pub fn escape_attribute(input: &str) -> String {
    escape_text(input)
        .replace('"', "&quot;")
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
        .replace('\t', "&#09;")
}
