use std::collections::BTreeMap;

use bg_core::BgError;
use roxmltree::{Document, Node, NodeType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElementNode),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElementNode {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<XmlNode>,
}

impl XmlElementNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn text(mut self, value: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(value.into()));
        self
    }

    pub fn child(mut self, element: XmlElementNode) -> Self {
        self.children.push(XmlNode::Element(element));
        self
    }

    pub fn push(&mut self, element: XmlElementNode) {
        self.children.push(XmlNode::Element(element));
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn elements(&self) -> impl Iterator<Item = &XmlElementNode> {
        self.children.iter().filter_map(|child| match child {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElementNode> {
        self.children.iter_mut().filter_map(|child| match child {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// Concatenated direct text children.
    pub fn text_content(&self) -> String {
        self.children
            .iter()
            .filter_map(|child| match child {
                XmlNode::Text(value) => Some(value.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }
}

pub fn parse_xml_document(source: &str) -> Result<XmlElementNode, BgError> {
    let document = Document::parse(source)
        .map_err(|error| BgError::new("XML_PARSE_ERROR", error.to_string()))?;

    let Some(root) = document.root().children().find(|node| node.is_element()) else {
        return Err(BgError::new(
            "XML_PARSE_ERROR",
            "XML document must contain a root element.",
        ));
    };

    Ok(parse_element(root))
}

fn parse_element(node: Node<'_, '_>) -> XmlElementNode {
    let mut attributes = BTreeMap::new();
    for attribute in node.attributes() {
        attributes.insert(attribute.name().to_string(), attribute.value().to_string());
    }

    let mut children = Vec::new();
    for child in node.children() {
        match child.node_type() {
            NodeType::Element => children.push(XmlNode::Element(parse_element(child))),
            NodeType::Text => {
                let value = child.text().unwrap_or_default();
                if value.trim().is_empty() {
                    continue;
                }
                children.push(XmlNode::Text(value.to_string()));
            }
            _ => {}
        }
    }

    XmlElementNode {
        name: node.tag_name().name().to_string(),
        attributes,
        children,
    }
}

#[cfg(test)]
mod xml_tests {
    use super::*;

    #[test]
    fn parse_keeps_attributes_and_meaningful_text() {
        let root = parse_xml_document(
            r#"<?xml version="1.0"?>
<testsuite tests="2">
  <testcase classname="tests.test_a" name="test_one"/>
  <testcase classname="tests.test_a" name="test_two">
    <skipped message="later">reason</skipped>
  </testcase>
</testsuite>"#,
        )
        .expect("document should parse");

        assert_eq!(root.name, "testsuite");
        assert_eq!(root.attribute("tests"), Some("2"));
        let cases = root.elements().collect::<Vec<_>>();
        assert_eq!(cases.len(), 2);
        assert!(cases[0].children.is_empty());
        let skipped = cases[1].elements().next().expect("skipped element");
        assert_eq!(skipped.name, "skipped");
        assert_eq!(skipped.text_content(), "reason");
    }

    #[test]
    fn parse_reports_invalid_xml() {
        let error = parse_xml_document("<testsuite>").expect_err("unclosed root should fail");
        assert_eq!(error.code, "XML_PARSE_ERROR");
    }

    #[test]
    fn builder_helpers_compose_elements() {
        let element = XmlElementNode::new("property")
            .attr("name", "dry-run")
            .attr("value", "false")
            .child(XmlElementNode::new("inner").text("x"));
        assert_eq!(element.attribute("name"), Some("dry-run"));
        assert_eq!(element.elements().count(), 1);
    }
}
