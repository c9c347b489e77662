use bg_core::FieldValue;
use bg_engine::{Configuration, ResolvedRequirement};
use bg_parser::XmlElementNode;

use crate::properties::ImporterProperties;

pub fn requirement_document(
    requirements: &[ResolvedRequirement],
    config: &Configuration,
    properties: &ImporterProperties,
) -> XmlElementNode {
    let mut root = XmlElementNode::new("requirements").attr("project-id", &properties.project);
    properties.append_to(&mut root);
    for requirement in requirements {
        root.push(requirement_element(requirement, config));
    }
    root
}

pub fn requirement_element(
    requirement: &ResolvedRequirement,
    config: &Configuration,
) -> XmlElementNode {
    let mut element = XmlElementNode::new("requirement");
    if let Some(assignee) = requirement.field("assignee") {
        element = element
            .attr("assignee-id", assignee.render())
            .attr("status-id", "approved");
    }
    if let Some(approvers) = requirement.field("approvers") {
        let approvers = match approvers {
            FieldValue::Text(text) => vec![text.clone()],
            FieldValue::List(items) => items.clone(),
        };
        element = element.attr(
            "approver-ids",
            approvers
                .iter()
                .map(|approver| format!("{}:approved", approver))
                .collect::<Vec<_>>()
                .join(" "),
        );
    }
    for (attribute, field) in [("priority-id", "priority"), ("severity-id", "severity")] {
        if let Some(value) = requirement.field(field).filter(|value| !value.is_blank()) {
            element = element.attr(attribute, value.render());
        }
    }

    element.push(XmlElementNode::new("title").text(&requirement.title));
    let mut custom_fields = XmlElementNode::new("custom-fields");
    for name in config.custom_field_names() {
        if let Some(value) = requirement.field(name) {
            custom_fields.push(
                XmlElementNode::new("custom-field")
                    .attr("content", value.render())
                    .attr("id", name),
            );
        }
    }
    element.push(custom_fields);
    element
}

#[cfg(test)]
mod requirement_tests {
    use super::*;
    use bg_engine::{requirement_configuration, FieldMap};

    fn requirement(with_people: bool) -> ResolvedRequirement {
        let mut fields = FieldMap::new();
        fields.insert("priority".to_string(), FieldValue::text("high"));
        fields.insert("severity".to_string(), FieldValue::text("should_have"));
        fields.insert("reqtype".to_string(), FieldValue::text("functional"));
        if with_people {
            fields.insert("assignee".to_string(), FieldValue::text("jdoe"));
            fields.insert(
                "approvers".to_string(),
                FieldValue::List(vec!["alice".to_string(), "bob".to_string()]),
            );
        }
        ResolvedRequirement {
            title: "Importer Test".to_string(),
            fields,
        }
    }

    #[test]
    fn element_sets_people_priority_and_custom_fields() {
        let config = requirement_configuration().expect("config");
        let element = requirement_element(&requirement(true), &config);

        assert_eq!(element.attribute("assignee-id"), Some("jdoe"));
        assert_eq!(element.attribute("status-id"), Some("approved"));
        assert_eq!(
            element.attribute("approver-ids"),
            Some("alice:approved bob:approved")
        );
        assert_eq!(element.attribute("priority-id"), Some("high"));
        assert_eq!(element.attribute("severity-id"), Some("should_have"));

        let title = element.elements().next().expect("title");
        assert_eq!(title.text_content(), "Importer Test");
        let custom = element
            .elements()
            .find(|child| child.name == "custom-fields")
            .expect("custom fields");
        let field = custom.elements().next().expect("reqtype");
        assert_eq!(field.attribute("id"), Some("reqtype"));
        assert_eq!(field.attribute("content"), Some("functional"));
    }

    #[test]
    fn without_people_no_assignment_attributes() {
        let config = requirement_configuration().expect("config");
        let element = requirement_element(&requirement(false), &config);
        assert_eq!(element.attribute("assignee-id"), None);
        assert_eq!(element.attribute("status-id"), None);
        assert_eq!(element.attribute("approver-ids"), None);
    }

    #[test]
    fn document_lists_each_requirement() {
        let config = requirement_configuration().expect("config");
        let properties = ImporterProperties {
            project: "PROJ".to_string(),
            dry_run: false,
            lookup_method: "name".to_string(),
            custom_lookup_field_id: None,
            response_property: None,
        };
        let document =
            requirement_document(&[requirement(true), requirement(false)], &config, &properties);
        assert_eq!(document.name, "requirements");
        assert_eq!(
            document
                .elements()
                .filter(|child| child.name == "requirement")
                .count(),
            2
        );
    }
}
