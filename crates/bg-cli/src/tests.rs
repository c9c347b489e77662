use super::*;
use bg_collector::module_dotted_path;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time should be monotonic")
        .as_nanos();
    std::env::temp_dir().join(format!("betelgeuse-rs-{}-{}", name, nanos))
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("parent should be created");
    }
    fs::write(path, content).expect("file should be written");
}

fn cli(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("betelgeuse").chain(args.iter().copied()))
        .expect("arguments should parse")
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

const SAMPLE_MODULE: &str = r#""""Sample module.

:requirement: Sample Requirement
"""


class SampleTestCase:
    """:caseimportance: High"""

    def test_first(self):
        """First test.

        :id: first-id
        :steps: Open the page
        :expectedresults: The page opens
        :bogus: dropped
        """

    def helper(self):
        pass


def test_second():
    """Second test.

    :id: second-id
    :parametrized: yes
    """
"#;

/// Writes a project with one test module and returns (root, module path).
fn sample_project(name: &str) -> (PathBuf, PathBuf) {
    let root = temp_path(name);
    let module = root.join("tests").join("test_sample.py");
    write_file(&module, SAMPLE_MODULE);
    write_file(&root.join("tests").join("helpers.py"), "def test_not_collected(): pass\n");
    (root, module)
}

#[test]
fn parse_key_value_splits_on_the_first_separator() {
    assert_eq!(
        cli_args::parse_key_value("selector=run-1"),
        Ok(("selector".to_string(), "run-1".to_string()))
    );
    assert!(cli_args::parse_key_value("selector").is_err());
    assert_eq!(
        cli_args::parse_key_value("a=b=c"),
        Ok(("a".to_string(), "b=c".to_string()))
    );
}

#[test]
fn test_case_arguments_use_importer_defaults() {
    let parsed = cli(&["test-case", "tests", "PROJ", "out.xml"]);
    let Command::TestCase(args) = parsed.command else {
        panic!("expected test-case");
    };
    assert_eq!(args.lookup_method, "custom");
    assert_eq!(args.lookup_method_custom_field_id, "testCaseID");
    assert_eq!(args.automation_script_format, "{path}#{line_number}");
    assert!(!args.importer.dry_run);
    assert!(args.importer.response_property.is_none());
}

#[test]
fn lookup_method_choices_depend_on_the_command() {
    let parsed = Cli::try_parse_from([
        "betelgeuse",
        "requirement",
        "--lookup-method",
        "custom",
        "tests",
        "PROJ",
        "out.xml",
    ]);
    assert!(parsed.is_err());

    let parsed = Cli::try_parse_from([
        "betelgeuse",
        "test-run",
        "--lookup-method",
        "name",
        "junit.xml",
        "tests",
        "jdoe",
        "PROJ",
        "out.xml",
    ]);
    assert!(parsed.is_err());
}

#[test]
fn test_case_writes_the_importer_document() {
    let (root, _) = sample_project("test-case");
    let output_path = root.join("testcases.xml");
    let output = run(cli(&[
        "test-case",
        "--dry-run",
        "--response-property",
        "selector=ci",
        &path_arg(&root.join("tests")),
        "PROJ",
        &path_arg(&output_path),
    ]))
    .expect("test-case should succeed");

    assert_eq!(output.lines, vec!["TESTCASES:2".to_string()]);
    assert_eq!(output.warnings.len(), 1);
    assert_eq!(output.warnings[0].kind, bg_core::WarningKind::UnrecognizedField);

    let xml = fs::read_to_string(&output_path).expect("output should exist");
    assert!(xml.starts_with("<?xml version='1.0' encoding='utf-8'?>"));
    assert!(xml.contains("<testcases project-id=\"PROJ\">"));
    assert!(xml.contains("<response-property name=\"selector\" value=\"ci\" />"));
    assert!(xml.contains("<property name=\"dry-run\" value=\"true\" />"));
    assert!(xml.contains("<testcase id=\"first-id\">"));
    assert!(xml.contains("<testcase id=\"second-id\">"));
    assert!(xml.contains("workitem-id=\"Sample Requirement\""));
    assert!(xml.contains("<custom-field content=\"high\" id=\"caseimportance\" />"));
    assert!(!xml.contains("bogus"));
}

#[test]
fn requirement_writes_one_entry_per_title() {
    let (root, _) = sample_project("requirement");
    let output_path = root.join("requirements.xml");
    let output = run(cli(&[
        "requirement",
        "--assignee",
        "jdoe",
        "--approver",
        "alice",
        "--approver",
        "bob",
        &path_arg(&root.join("tests")),
        "PROJ",
        &path_arg(&output_path),
    ]))
    .expect("requirement should succeed");

    assert_eq!(output.lines, vec!["REQUIREMENTS:1".to_string()]);
    let xml = fs::read_to_string(&output_path).expect("output should exist");
    assert!(xml.contains("<property name=\"lookup-method\" value=\"name\" />"));
    assert!(xml.contains("approver-ids=\"alice:approved bob:approved\""));
    assert!(xml.contains("assignee-id=\"jdoe\""));
    assert!(xml.contains("<title>Sample Requirement</title>"));
}

#[test]
fn test_run_tags_matching_results() {
    let (root, module) = sample_project("test-run");
    let classname = module_dotted_path(&module.to_string_lossy());
    let junit_path = root.join("junit.xml");
    write_file(
        &junit_path,
        &format!(
            r#"<testsuites><testsuite name="pytest">
<testcase classname="{0}.SampleTestCase" name="test_first"/>
<testcase classname="{0}" name="test_second[a-1]"><skipped message="later"/></testcase>
<testcase classname="{0}" name="test_gone"/>
</testsuite></testsuites>"#,
            classname
        ),
    );
    let output_path = root.join("test-run.xml");
    let output = run(cli(&[
        "test-run",
        "--custom-fields",
        "arch=x86_64",
        "--custom-fields",
        "not a pair",
        "--test-run-id",
        "nightly.1",
        &path_arg(&junit_path),
        &path_arg(&root.join("tests")),
        "jdoe",
        "PROJ",
        &path_arg(&output_path),
    ]))
    .expect("test-run should succeed");

    assert_eq!(
        output.lines,
        vec!["TEST_RUN_ID:nightly1".to_string(), "MATCHED:2".to_string()]
    );
    let kinds = output
        .warnings
        .iter()
        .map(|warning| warning.kind)
        .collect::<Vec<_>>();
    assert!(kinds.contains(&bg_core::WarningKind::CustomFieldIgnored));
    assert!(kinds.contains(&bg_core::WarningKind::JunitUnmatched));

    let xml = fs::read_to_string(&output_path).expect("output should exist");
    assert!(xml.contains("<property name=\"polarion-custom-arch\" value=\"x86_64\" />"));
    assert!(xml.contains("<property name=\"polarion-testrun-id\" value=\"nightly1\" />"));
    assert!(xml.contains("<property name=\"polarion-testcase-id\" value=\"first-id\" />"));
    assert!(xml.contains(
        "<property name=\"polarion-parameter-pytest parameters\" value=\"a-1\" />"
    ));
}

#[test]
fn resolve_prints_one_json_line_per_testcase() {
    let (root, _) = sample_project("resolve");
    let output = run(cli(&["resolve", &path_arg(&root.join("tests"))]))
        .expect("resolve should succeed");

    assert_eq!(output.lines.len(), 3);
    assert!(output.lines[0].starts_with("TESTCASE_JSON:{\"id\":\"first-id\""));
    assert!(output.lines[1].starts_with("TESTCASE_JSON:{\"id\":\"second-id\""));
    assert_eq!(output.lines[2], "TESTCASES:2");

    let json = output.lines[0].trim_start_matches("TESTCASE_JSON:");
    let value = serde_json::from_str::<serde_json::Value>(json).expect("valid json");
    assert_eq!(value["steps"]["kind"], "paired");
    assert_eq!(value["fields"]["caseimportance"], "high");
}

#[test]
fn config_file_extends_the_base_configuration() {
    let (root, _) = sample_project("config");
    let config_path = root.join("betelgeuse.json");
    write_file(
        &config_path,
        r#"{"testcase": {"customFields": ["team"], "defaults": {"team": {"value": "qe"}}, "transforms": {"team": {"builtin": "upper"}}}}"#,
    );
    let output = run(cli(&[
        "--config",
        &path_arg(&config_path),
        "resolve",
        &path_arg(&root.join("tests")),
    ]))
    .expect("resolve should succeed");
    assert!(output.lines[0].contains("\"team\":\"QE\""));
}

#[test]
fn configuration_errors_abort_before_writing() {
    let (root, _) = sample_project("bad-config");
    let config_path = root.join("betelgeuse.json");
    write_file(
        &config_path,
        r#"{"testcase": {"defaults": {"caseimportance": {"value": "low"}}}}"#,
    );
    let output_path = root.join("testcases.xml");
    let error = run(cli(&[
        "--config",
        &path_arg(&config_path),
        "test-case",
        &path_arg(&root.join("tests")),
        "PROJ",
        &path_arg(&output_path),
    ]))
    .expect_err("duplicate default should fail");
    assert_eq!(error.code, "CONFIG_DUPLICATE_DEFAULT");
    assert!(!output_path.exists());

    let missing = run(cli(&[
        "--config",
        &path_arg(&root.join("missing.json")),
        "resolve",
        &path_arg(&root.join("tests")),
    ]))
    .expect_err("missing config should fail");
    assert_eq!(missing.code, "CONFIG_FILE_READ");
}

#[test]
fn id_collisions_abort_before_writing() {
    let root = temp_path("collision");
    write_file(
        &root.join("tests").join("test_a.py"),
        "def test_one():\n    \"\"\":id: same\"\"\"\n\n\ndef test_two():\n    \"\"\":id: same\"\"\"\n",
    );
    let output_path = root.join("testcases.xml");
    let error = run(cli(&[
        "test-case",
        &path_arg(&root.join("tests")),
        "PROJ",
        &path_arg(&output_path),
    ]))
    .expect_err("collision should fail");
    assert_eq!(error.code, "ID_COLLISION");
    assert!(!output_path.exists());
}

#[test]
fn test_results_counts_statuses() {
    let junit_path = temp_path("results").join("junit.xml");
    write_file(
        &junit_path,
        r#"<testsuite>
<testcase classname="a" name="one"/>
<testcase classname="a" name="two"><failure message="boom"/></testcase>
<testcase classname="a" name="three"/>
</testsuite>"#,
    );
    let output = run(cli(&["test-results", "--path", &path_arg(&junit_path)]))
        .expect("summary should succeed");
    assert_eq!(output.lines, vec!["Passed: 2".to_string(), "Failure: 1".to_string()]);

    let missing = run(cli(&[
        "test-results",
        "--path",
        &path_arg(&temp_path("missing").join("junit.xml")),
    ]))
    .expect_err("missing report should fail");
    assert_eq!(missing.code, "CLI_JUNIT_READ");
}

#[test]
fn missing_source_path_is_reported() {
    let error = run(cli(&["resolve", &path_arg(&temp_path("nowhere"))]))
        .expect_err("missing source should fail");
    assert_eq!(error.code, "COLLECT_PATH_MISSING");
}
