use bg_parser::XmlElementNode;

pub fn property(name: &str, value: &str) -> XmlElementNode {
    XmlElementNode::new("property")
        .attr("name", name)
        .attr("value", value)
}

/// Importer options shared by the test-case and requirement documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImporterProperties {
    pub project: String,
    pub dry_run: bool,
    pub lookup_method: String,
    /// Only written when `lookup_method` is `custom`.
    pub custom_lookup_field_id: Option<String>,
    pub response_property: Option<(String, String)>,
}

impl ImporterProperties {
    /// Appends `<response-properties>` (when set) and `<properties>` to the
    /// document root.
    pub fn append_to(&self, root: &mut XmlElementNode) {
        if let Some((name, value)) = &self.response_property {
            root.push(
                XmlElementNode::new("response-properties").child(
                    XmlElementNode::new("response-property")
                        .attr("name", name)
                        .attr("value", value),
                ),
            );
        }

        let mut properties = XmlElementNode::new("properties")
            .child(property("dry-run", if self.dry_run { "true" } else { "false" }))
            .child(property("lookup-method", &self.lookup_method));
        if self.lookup_method == "custom" {
            if let Some(field_id) = &self.custom_lookup_field_id {
                properties.push(property("polarion-custom-lookup-method-field-id", field_id));
            }
        }
        root.push(properties);
    }
}
