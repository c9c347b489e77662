use bg_core::{FieldValue, ResolvedTestCase, TestStep, TestSteps};
use bg_engine::Configuration;
use bg_parser::XmlElementNode;

use crate::properties::ImporterProperties;

/// `<testcase>` attribute names and the fields that feed them. `id` comes
/// from the resolved id slot.
const ATTRIBUTE_FIELDS: &[(&str, &str)] = &[
    ("approver-ids", "approvers"),
    ("assignee-id", "assignee"),
    ("due-date", "duedate"),
    ("initial-estimate", "initialestimate"),
    ("status-id", "status"),
];

pub const DEFAULT_AUTOMATION_SCRIPT_FORMAT: &str = "{path}#{line_number}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCaseOptions {
    pub properties: ImporterProperties,
    /// Template with `{path}` and `{line_number}` placeholders.
    pub automation_script_format: String,
}

pub fn testcase_document(
    testcases: &[ResolvedTestCase],
    config: &Configuration,
    options: &TestCaseOptions,
) -> XmlElementNode {
    let mut root = XmlElementNode::new("testcases").attr("project-id", &options.properties.project);
    options.properties.append_to(&mut root);
    for testcase in testcases {
        root.push(testcase_element(
            testcase,
            config,
            &options.automation_script_format,
        ));
    }
    root
}

pub fn automation_script(format: &str, testcase: &ResolvedTestCase) -> String {
    format
        .replace("{path}", &testcase.source_path)
        .replace("{line_number}", &testcase.line_number.to_string())
}

pub fn testcase_element(
    testcase: &ResolvedTestCase,
    config: &Configuration,
    automation_script_format: &str,
) -> XmlElementNode {
    let mut element = XmlElementNode::new("testcase").attr("id", &testcase.id);
    for (attribute, field) in ATTRIBUTE_FIELDS {
        if let Some(value) = testcase.field(field) {
            element = element.attr(*attribute, attribute_value(value));
        }
    }

    element.push(XmlElementNode::new("title").text(&testcase.title));
    if let Some(description) = testcase.field("description") {
        element.push(XmlElementNode::new("description").text(description.render()));
    }
    element.push(
        XmlElementNode::new("linked-work-items").child(
            XmlElementNode::new("linked-work-item")
                .attr("lookup-method", "name")
                .attr("role-id", "verifies")
                .attr("workitem-id", &testcase.requirement),
        ),
    );

    let mut test_steps = XmlElementNode::new("test-steps");
    if let Some(TestSteps::Paired { pairs }) = &testcase.steps {
        for pair in pairs {
            test_steps.push(step_element(pair));
        }
    }
    if is_parametrized(testcase) {
        test_steps.push(iteration_step());
    }
    if !test_steps.children.is_empty() {
        element.push(test_steps);
    }

    let mut custom_fields = XmlElementNode::new("custom-fields");
    for name in config.custom_field_names() {
        let content = match testcase.field(name) {
            Some(value) => value.render(),
            None if name == "automation_script" => {
                automation_script(automation_script_format, testcase)
            }
            None => continue,
        };
        custom_fields.push(
            XmlElementNode::new("custom-field")
                .attr("content", content)
                .attr("id", name),
        );
    }
    element.push(custom_fields);
    element
}

pub(crate) fn is_parametrized(testcase: &ResolvedTestCase) -> bool {
    testcase
        .field("parametrized")
        .and_then(FieldValue::as_text)
        .is_some_and(|value| value == "yes")
}

fn attribute_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(text) => text.clone(),
        FieldValue::List(items) => items.join(" "),
    }
}

fn step_element(pair: &TestStep) -> XmlElementNode {
    XmlElementNode::new("test-step")
        .child(
            XmlElementNode::new("test-step-column")
                .attr("id", "step")
                .text(&pair.step),
        )
        .child(
            XmlElementNode::new("test-step-column")
                .attr("id", "expectedResult")
                .text(&pair.expected),
        )
}

fn iteration_step() -> XmlElementNode {
    XmlElementNode::new("test-step")
        .child(
            XmlElementNode::new("test-step-column")
                .attr("id", "step")
                .text("Iteration: ")
                .child(XmlElementNode::new("parameter").attr("name", "pytest parameters")),
        )
        .child(
            XmlElementNode::new("test-step-column")
                .attr("id", "expectedResult")
                .text("Pass"),
        )
}
