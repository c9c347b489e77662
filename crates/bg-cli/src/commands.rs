use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use bg_collector::collect_tests;
use bg_core::BgError;
use bg_engine::{
    load_config_file, parse_custom_fields, resolve_requirements, resolve_trees, Configuration,
    EngineConfig, RequirementOptions, ResolutionReport,
};
use bg_parser::{parse_xml_document, XmlElementNode};
use bg_xml::{
    parse_junit, requirement_document, sanitize_test_run_id, summarize_results,
    test_run_document, testcase_document, write_document, ImporterProperties, TestCaseOptions,
    TestRunOptions,
};
use tracing::info;

use crate::{
    map_cli_junit_read, map_cli_output_write, title_case, CommandOutput, ImporterArgs,
    RequirementArgs, ResolveArgs, TestCaseArgs, TestResultsArgs, TestRunArgs,
};

pub(crate) fn load_engine_config(path: Option<&Path>) -> Result<EngineConfig, BgError> {
    match path {
        Some(path) => load_config_file(path),
        None => EngineConfig::base(),
    }
}

fn resolve_source(
    source_code_path: &Path,
    ignore_paths: &[PathBuf],
    config: &Configuration,
) -> Result<ResolutionReport, BgError> {
    let trees = collect_tests(source_code_path, ignore_paths)?;
    resolve_trees(&trees, config)
}

fn importer_properties(
    project: &str,
    importer: &ImporterArgs,
    lookup_method: &str,
    custom_lookup_field_id: Option<&str>,
) -> ImporterProperties {
    ImporterProperties {
        project: project.to_string(),
        dry_run: importer.dry_run,
        lookup_method: lookup_method.to_string(),
        custom_lookup_field_id: custom_lookup_field_id.map(str::to_string),
        response_property: importer.response_property.clone(),
    }
}

fn write_output(path: &Path, root: &XmlElementNode) -> Result<(), BgError> {
    fs::write(path, write_document(root)).map_err(|error| map_cli_output_write(path, error))?;
    info!(path = %path.display(), "wrote importer document");
    Ok(())
}

fn read_junit(path: &Path) -> Result<String, BgError> {
    fs::read_to_string(path).map_err(|error| map_cli_junit_read(path, error))
}

pub(crate) fn run_test_case(
    args: TestCaseArgs,
    config: &EngineConfig,
) -> Result<CommandOutput, BgError> {
    let report = resolve_source(
        &args.source_code_path,
        &args.importer.collect_ignore_path,
        &config.testcase,
    )?;
    let options = TestCaseOptions {
        properties: importer_properties(
            &args.project,
            &args.importer,
            &args.lookup_method,
            Some(&args.lookup_method_custom_field_id),
        ),
        automation_script_format: args.automation_script_format,
    };
    let document = testcase_document(&report.testcases, &config.testcase, &options);
    write_output(&args.output_path, &document)?;

    let count = report.testcases.len();
    Ok(CommandOutput::new(report.warnings).line(format!("TESTCASES:{}", count)))
}

pub(crate) fn run_requirement(
    args: RequirementArgs,
    config: &EngineConfig,
) -> Result<CommandOutput, BgError> {
    let report = resolve_source(
        &args.source_code_path,
        &args.importer.collect_ignore_path,
        &config.testcase,
    )?;
    let options = RequirementOptions {
        assignee: args.assignee,
        approvers: args.approver,
    };
    let requirements = resolve_requirements(&report.testcases, &config.requirement, &options)?;
    let properties = importer_properties(&args.project, &args.importer, &args.lookup_method, None);
    let document = requirement_document(&requirements, &config.requirement, &properties);
    write_output(&args.output_path, &document)?;

    Ok(CommandOutput::new(report.warnings)
        .line(format!("REQUIREMENTS:{}", requirements.len())))
}

pub(crate) fn run_test_run(args: TestRunArgs, config: &EngineConfig) -> Result<CommandOutput, BgError> {
    let custom_fields = parse_custom_fields(&args.custom_fields)?;
    let junit = parse_xml_document(&read_junit(&args.junit_path)?)?;
    let report = resolve_source(
        &args.source_code_path,
        &args.importer.collect_ignore_path,
        &config.testcase,
    )?;

    let test_run_id = args.test_run_id.unwrap_or_else(default_test_run_id);
    let options = TestRunOptions {
        user: args.user,
        project: args.project,
        test_run_id: sanitize_test_run_id(&test_run_id),
        status: args.status,
        create_defects: args.create_defects,
        dry_run: args.importer.dry_run,
        include_skipped: !args.no_include_skipped,
        lookup_method: args.lookup_method,
        custom_lookup_field_id: args.lookup_method_custom_field_id,
        response_property: args.importer.response_property,
        project_span_ids: args.project_span_ids,
        group_id: args.test_run_group_id,
        template_id: args.test_run_template_id,
        title: args.test_run_title,
        type_id: args.test_run_type_id,
    };
    let document = test_run_document(&junit, &report.testcases, &custom_fields.fields, &options)?;
    write_output(&args.output_path, &document.root)?;

    let mut warnings = report.warnings;
    warnings.extend(custom_fields.warnings);
    warnings.extend(document.warnings);
    Ok(CommandOutput::new(warnings)
        .line(format!("TEST_RUN_ID:{}", options.test_run_id))
        .line(format!("MATCHED:{}", document.matched)))
}

fn default_test_run_id() -> String {
    let seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or_default();
    format!("test-run-{}", seconds)
}

pub(crate) fn run_test_results(args: TestResultsArgs) -> Result<CommandOutput, BgError> {
    let results = parse_junit(&read_junit(&args.path)?)?;
    let mut output = CommandOutput::default();
    for (status, count) in summarize_results(&results) {
        output = output.line(format!("{}: {}", title_case(&status), count));
    }
    Ok(output)
}

pub(crate) fn run_resolve(args: ResolveArgs, config: &EngineConfig) -> Result<CommandOutput, BgError> {
    let report = resolve_source(&args.source_code_path, &args.collect_ignore_path, &config.testcase)?;
    let count = report.testcases.len();
    CommandOutput::new(report.warnings)
        .testcase_lines(&report.testcases)
        .map(|output| output.line(format!("TESTCASES:{}", count)))
}
