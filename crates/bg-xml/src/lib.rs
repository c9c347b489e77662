mod junit;
mod properties;
mod requirement;
mod test_run;
mod testcase;
mod writer;

pub use junit::{parse_junit, summarize_results, JunitResult};
pub use properties::{property, ImporterProperties};
pub use requirement::{requirement_document, requirement_element};
pub use test_run::{sanitize_test_run_id, test_run_document, TestRunDocument, TestRunOptions};
pub use testcase::{
    automation_script, testcase_document, testcase_element, TestCaseOptions,
    DEFAULT_AUTOMATION_SCRIPT_FORMAT,
};
pub use writer::{escape_attribute, escape_text, write_document, XML_DECLARATION};
