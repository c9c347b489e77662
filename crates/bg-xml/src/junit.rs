use std::collections::BTreeMap;

use bg_core::BgError;
use bg_parser::{parse_xml_document, XmlElementNode};

const FAILING_STATUSES: &[&str] = &["error", "failure", "skipped"];

/// One `<testcase>` of a jUnit report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JunitResult {
    pub classname: String,
    pub name: String,
    /// `passed`, or the tag of the first error/failure/skipped child.
    pub status: String,
    /// The testcase attributes merged with those of its status element.
    pub attributes: BTreeMap<String, String>,
}

impl JunitResult {
    /// `classname.name`, the key test cases are matched by.
    pub fn junit_id(&self) -> String {
        format!("{}.{}", self.classname, self.name)
    }
}

pub fn parse_junit(source: &str) -> Result<Vec<JunitResult>, BgError> {
    let root = parse_xml_document(source)?;
    let mut results = Vec::new();
    collect_testcases(&root, &mut results);
    Ok(results)
}

fn collect_testcases(element: &XmlElementNode, results: &mut Vec<JunitResult>) {
    if element.name == "testcase" {
        results.push(junit_result(element));
        return;
    }
    for child in element.elements() {
        collect_testcases(child, results);
    }
}

fn junit_result(testcase: &XmlElementNode) -> JunitResult {
    let mut attributes = testcase.attributes.clone();
    let status_element = testcase
        .elements()
        .find(|child| FAILING_STATUSES.contains(&child.name.as_str()));
    let status = match status_element {
        Some(element) => {
            attributes.extend(element.attributes.clone());
            element.name.clone()
        }
        None => "passed".to_string(),
    };
    JunitResult {
        classname: testcase.attribute("classname").unwrap_or_default().to_string(),
        name: testcase.attribute("name").unwrap_or_default().to_string(),
        status,
        attributes,
    }
}

/// Result counts per status, in first-seen order.
pub fn summarize_results(results: &[JunitResult]) -> Vec<(String, usize)> {
    let mut summary: Vec<(String, usize)> = Vec::new();
    for result in results {
        match summary.iter_mut().find(|(status, _)| *status == result.status) {
            Some((_, count)) => *count += 1,
            None => summary.push((result.status.clone(), 1)),
        }
    }
    summary
}
