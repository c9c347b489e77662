use std::collections::HashMap;
use std::sync::OnceLock;

use bg_core::{BgError, ResolvedTestCase, Warning, WarningKind};
use bg_engine::CustomFieldMap;
use bg_parser::XmlElementNode;
use regex::Regex;
use tracing::warn;

use crate::properties::property;
use crate::testcase::is_parametrized;

const RESERVED_PROPERTIES: &[&str] = &[
    "polarion-create-defects",
    "polarion-custom-lookup-method-field-id",
    "polarion-dry-run",
    "polarion-group-id",
    "polarion-include-skipped",
    "polarion-lookup-method",
    "polarion-project-id",
    "polarion-project-span-ids",
    "polarion-testrun-id",
    "polarion-testrun-status-id",
    "polarion-testrun-template-id",
    "polarion-testrun-title",
    "polarion-testrun-type-id",
    "polarion-user-id",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRunOptions {
    pub user: String,
    pub project: String,
    pub test_run_id: String,
    /// `finished` or `inprogress`.
    pub status: String,
    pub create_defects: bool,
    pub dry_run: bool,
    pub include_skipped: bool,
    pub lookup_method: String,
    pub custom_lookup_field_id: String,
    pub response_property: Option<(String, String)>,
    pub project_span_ids: Option<String>,
    pub group_id: Option<String>,
    pub template_id: Option<String>,
    pub title: Option<String>,
    pub type_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRunDocument {
    pub root: XmlElementNode,
    pub matched: usize,
    pub warnings: Vec<Warning>,
}

/// Removes the characters test run ids may not contain.
pub fn sanitize_test_run_id(id: &str) -> String {
    invalid_id_chars_regex().replace_all(id, "").into_owned()
}

fn invalid_id_chars_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r#"[\\/.:"<>|~!@#$?%^&'*()+`,=]"#).expect("invalid id chars regex")
    })
}

/// Builds `<testsuites>` from run properties and the first test suite of
/// `junit`, tagging every result that matches a resolved test case.
pub fn test_run_document(
    junit: &XmlElementNode,
    testcases: &[ResolvedTestCase],
    custom_fields: &CustomFieldMap,
    options: &TestRunOptions,
) -> Result<TestRunDocument, BgError> {
    let mut testsuite = first_testsuite(junit)?;
    let by_junit_id = testcases
        .iter()
        .map(|testcase| (testcase.qualified_name.as_str(), testcase))
        .collect::<HashMap<_, _>>();

    let mut matched = 0usize;
    let mut warnings = Vec::new();
    for result in testsuite
        .elements_mut()
        .filter(|element| element.name == "testcase")
    {
        let junit_id = format!(
            "{}.{}",
            result.attribute("classname").unwrap_or_default(),
            result.attribute("name").unwrap_or_default()
        );
        let (junit_id, parameters) = split_parameters(&junit_id);
        let Some(testcase) = by_junit_id.get(junit_id) else {
            let warning = Warning::new(
                WarningKind::JunitUnmatched,
                junit_id,
                "Found on the jUnit report but not in the source code; skipping.",
            );
            warn!(%warning, "test run");
            warnings.push(warning);
            continue;
        };

        let mut properties =
            XmlElementNode::new("properties").child(property("polarion-testcase-id", &testcase.id));
        match parameters {
            Some(parameters) if is_parametrized(testcase) => {
                properties.push(property("polarion-parameter-pytest parameters", parameters));
            }
            Some(parameters) => {
                let warning = Warning::new(
                    WarningKind::ParametrizedMismatch,
                    junit_id,
                    format!(
                        "Has a parametrized result of {} but its parametrized field is not set to yes; only one result will be recorded.",
                        parameters
                    ),
                );
                warn!(%warning, "test run");
                warnings.push(warning);
            }
            None => {}
        }
        result.push(properties);
        matched += 1;
    }

    let root = XmlElementNode::new("testsuites")
        .child(run_properties(custom_fields, options))
        .child(testsuite);
    Ok(TestRunDocument {
        root,
        matched,
        warnings,
    })
}

fn first_testsuite(junit: &XmlElementNode) -> Result<XmlElementNode, BgError> {
    if junit.name != "testsuites" {
        return Ok(junit.clone());
    }
    junit
        .elements()
        .next()
        .cloned()
        .ok_or_else(|| BgError::new("JUNIT_EMPTY", "The jUnit report has no test suite."))
}

/// `module.Class.test_x[a-1]` splits into the id and `a-1`.
fn split_parameters(junit_id: &str) -> (&str, Option<&str>) {
    match junit_id.split_once('[') {
        Some((id, rest)) => (id, Some(rest.strip_suffix(']').unwrap_or(rest))),
        None => (junit_id, None),
    }
}

fn run_properties(custom_fields: &CustomFieldMap, options: &TestRunOptions) -> XmlElementNode {
    let flag = |value: bool| if value { "true" } else { "false" };

    let mut values = custom_fields.clone();
    values.insert("polarion-create-defects", flag(options.create_defects));
    values.insert("polarion-dry-run", flag(options.dry_run));
    values.insert("polarion-include-skipped", flag(options.include_skipped));
    if let Some((name, value)) = &options.response_property {
        values.insert(format!("polarion-response-{}", name), value.as_str());
    }
    values.insert("polarion-lookup-method", options.lookup_method.as_str());
    if options.lookup_method == "custom" {
        values.insert(
            "polarion-custom-lookup-method-field-id",
            options.custom_lookup_field_id.as_str(),
        );
    }
    values.insert("polarion-project-id", options.project.as_str());
    values.insert("polarion-testrun-id", options.test_run_id.as_str());
    values.insert("polarion-testrun-status-id", options.status.as_str());
    let optional = [
        ("polarion-project-span-ids", &options.project_span_ids),
        ("polarion-group-id", &options.group_id),
        ("polarion-testrun-template-id", &options.template_id),
        ("polarion-testrun-title", &options.title),
        ("polarion-testrun-type-id", &options.type_id),
    ];
    for (name, value) in optional {
        if let Some(value) = value {
            values.insert(name, value.as_str());
        }
    }
    values.insert("polarion-user-id", options.user.as_str());

    let mut properties = XmlElementNode::new("properties");
    for (name, value) in values.iter() {
        let name = if name.starts_with("polarion-custom-")
            || name.starts_with("polarion-response-")
            || RESERVED_PROPERTIES.contains(&name)
        {
            name.to_string()
        } else {
            format!("polarion-custom-{}", name)
        };
        properties.push(property(&name, value));
    }
    properties
}
