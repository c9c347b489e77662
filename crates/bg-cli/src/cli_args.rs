use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "betelgeuse")]
#[command(about = "Turn Python test docstrings into Polarion importer XML")]
#[command(version)]
pub(crate) struct Cli {
    /// JSON file extending the base field configuration.
    #[arg(long = "config", env = "BETELGEUSE_CONFIG", global = true)]
    pub(crate) config: Option<PathBuf>,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Generate an XML file for the test case importer.
    TestCase(TestCaseArgs),
    /// Generate an XML file for the requirement importer.
    Requirement(RequirementArgs),
    /// Generate an XML file for the test run importer.
    TestRun(TestRunArgs),
    /// Summarize a jUnit report by result status.
    TestResults(TestResultsArgs),
    /// Print every resolved test case as JSON.
    Resolve(ResolveArgs),
}

#[derive(Debug, Args)]
pub(crate) struct ImporterArgs {
    /// Ignore this path during test collection. Repeatable.
    #[arg(long = "collect-ignore-path")]
    pub(crate) collect_ignore_path: Vec<PathBuf>,
    /// Tell the importer not to make any change.
    #[arg(long = "dry-run")]
    pub(crate) dry_run: bool,
    /// Mark every importer response with `key=value`.
    #[arg(long = "response-property", value_parser = parse_key_value)]
    pub(crate) response_property: Option<(String, String)>,
}

#[derive(Debug, Args)]
pub(crate) struct TestCaseArgs {
    /// Expands `{path}` and `{line_number}` of each test case.
    #[arg(long = "automation-script-format", default_value = "{path}#{line_number}")]
    pub(crate) automation_script_format: String,
    #[command(flatten)]
    pub(crate) importer: ImporterArgs,
    #[arg(long = "lookup-method", default_value = "custom", value_parser = ["custom", "id", "name"])]
    pub(crate) lookup_method: String,
    #[arg(long = "lookup-method-custom-field-id", default_value = "testCaseID")]
    pub(crate) lookup_method_custom_field_id: String,
    pub(crate) source_code_path: PathBuf,
    pub(crate) project: String,
    pub(crate) output_path: PathBuf,
}

#[derive(Debug, Args)]
pub(crate) struct RequirementArgs {
    /// Whom the requirements will be approved by. Repeatable.
    #[arg(long = "approver")]
    pub(crate) approver: Vec<String>,
    /// Whom the requirements will be assigned to.
    #[arg(long = "assignee")]
    pub(crate) assignee: Option<String>,
    #[command(flatten)]
    pub(crate) importer: ImporterArgs,
    #[arg(long = "lookup-method", default_value = "name", value_parser = ["id", "name"])]
    pub(crate) lookup_method: String,
    pub(crate) source_code_path: PathBuf,
    pub(crate) project: String,
    pub(crate) output_path: PathBuf,
}

#[derive(Debug, Args)]
pub(crate) struct TestRunArgs {
    /// Make the importer create defects for failed tests.
    #[arg(long = "create-defects")]
    pub(crate) create_defects: bool,
    /// `id=value` or a JSON object. Repeatable.
    #[arg(long = "custom-fields")]
    pub(crate) custom_fields: Vec<String>,
    #[command(flatten)]
    pub(crate) importer: ImporterArgs,
    #[arg(long = "lookup-method", default_value = "custom", value_parser = ["id", "custom"])]
    pub(crate) lookup_method: String,
    #[arg(long = "lookup-method-custom-field-id", default_value = "testCaseID")]
    pub(crate) lookup_method_custom_field_id: String,
    /// Make the importer skip skipped tests.
    #[arg(long = "no-include-skipped")]
    pub(crate) no_include_skipped: bool,
    /// Comma-separated project ids for the test run's project span.
    #[arg(long = "project-span-ids")]
    pub(crate) project_span_ids: Option<String>,
    #[arg(long = "status", default_value = "finished", value_parser = ["finished", "inprogress"])]
    pub(crate) status: String,
    #[arg(long = "test-run-group-id")]
    pub(crate) test_run_group_id: Option<String>,
    /// Defaults to `test-run-<unix time>`.
    #[arg(long = "test-run-id")]
    pub(crate) test_run_id: Option<String>,
    #[arg(long = "test-run-template-id")]
    pub(crate) test_run_template_id: Option<String>,
    #[arg(long = "test-run-title")]
    pub(crate) test_run_title: Option<String>,
    #[arg(long = "test-run-type-id")]
    pub(crate) test_run_type_id: Option<String>,
    pub(crate) junit_path: PathBuf,
    pub(crate) source_code_path: PathBuf,
    pub(crate) user: String,
    pub(crate) project: String,
    pub(crate) output_path: PathBuf,
}

#[derive(Debug, Args)]
pub(crate) struct TestResultsArgs {
    #[arg(long = "path", default_value = "junit-results.xml")]
    pub(crate) path: PathBuf,
}

#[derive(Debug, Args)]
pub(crate) struct ResolveArgs {
    #[arg(long = "collect-ignore-path")]
    pub(crate) collect_ignore_path: Vec<PathBuf>,
    pub(crate) source_code_path: PathBuf,
}

pub(crate) fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) => Ok((key.to_string(), value.to_string())),
        None => Err(format!(
            "{} needs to be in the format property_key=property_value",
            raw
        )),
    }
}
