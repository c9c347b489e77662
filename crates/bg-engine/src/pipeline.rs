use bg_core::{
    BgError, ResolvedTestCase, ScopeId, ScopeTree, StepField, Warning, WarningKind,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{Configuration, Subject};
use crate::field_passes::{apply_defaults, apply_transforms};
use crate::identity::{derive_id, derive_requirement, derive_title, IdRegistry};
use crate::resolver::{merge_chain, retain_recognized};
use crate::steps::pair_steps;

/// Fields that live in dedicated `ResolvedTestCase` slots.
const SLOT_FIELDS: &[&str] = &["id", "title", "requirement", "steps", "expectedresults"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionReport {
    pub testcases: Vec<ResolvedTestCase>,
    pub warnings: Vec<Warning>,
}

/// Resolves every test function of every tree, in input order, then checks
/// id uniqueness across the whole batch.
pub fn resolve_trees(trees: &[ScopeTree], config: &Configuration) -> Result<ResolutionReport, BgError> {
    let mut report = ResolutionReport::default();
    let mut registry = IdRegistry::default();

    for tree in trees {
        for node in tree.nodes() {
            // Every module of a package carries its own copy of the package node.
            for warning in node.warnings() {
                if report.warnings.contains(warning) {
                    continue;
                }
                warn!(%warning, "docstring field list");
                report.warnings.push(warning.clone());
            }
        }
        for function in tree.functions() {
            let testcase = resolve_function(tree, function, config, &mut report.warnings)?;
            registry.record(&testcase.id, &testcase.qualified_name);
            report.testcases.push(testcase);
        }
    }

    registry.check()?;
    info!(
        testcases = report.testcases.len(),
        warnings = report.warnings.len(),
        "resolved test cases"
    );
    Ok(report)
}

pub fn resolve_function(
    tree: &ScopeTree,
    function: ScopeId,
    config: &Configuration,
    warnings: &mut Vec<Warning>,
) -> Result<ResolvedTestCase, BgError> {
    let node = tree.node(function).ok_or_else(|| {
        BgError::new(
            "SCOPE_UNKNOWN",
            format!("No scope {:?} in \"{}\".", function, tree.source_path()),
        )
    })?;
    let qualified_name = node.qualified_name();
    debug!(testcase = qualified_name, "resolving");

    let merged = merge_chain(tree.ancestors(function));
    let mut fields = retain_recognized(merged, config, qualified_name, warnings);

    let subject = Subject {
        name: node.name().to_string(),
        qualified_name: qualified_name.to_string(),
        docstring: node.docstring().to_string(),
        source_path: tree.source_path().to_string(),
        line_number: node.line_number().unwrap_or_default(),
    };
    apply_defaults(config, &subject, &mut fields)?;

    let pairing = pair_steps(
        fields.get(StepField::Steps.field_name()),
        fields.get(StepField::ExpectedResults.field_name()),
    );
    if pairing.fell_back {
        let warning = Warning::new(
            WarningKind::PairingFallback,
            qualified_name,
            "Steps and expected results do not match item for item; emitting one combined step.",
        );
        warn!(%warning, "step pairing");
        warnings.push(warning);
    }
    let mut steps = pairing.steps;
    apply_transforms(config, &subject, &mut fields, steps.as_mut())?;

    let module_name = tree
        .module_of(function)
        .map(|module| module.qualified_name())
        .unwrap_or(qualified_name);
    let id = derive_id(fields.get("id"), qualified_name);
    let title = derive_title(fields.get("title"), node.name());
    let requirement = derive_requirement(fields.get("requirement"), module_name);
    for slot in SLOT_FIELDS {
        fields.remove(*slot);
    }

    Ok(ResolvedTestCase {
        id,
        title,
        requirement,
        name: subject.name,
        qualified_name: subject.qualified_name,
        source_path: subject.source_path,
        line_number: subject.line_number,
        fields,
        steps,
    })
}
