use bg_core::{BgError, FieldValue, ResolvedTestCase};
use serde::Serialize;
use tracing::debug;

use crate::config::{Configuration, FieldMap, Subject};
use crate::field_passes::{apply_defaults, apply_transforms};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementOptions {
    pub assignee: Option<String>,
    pub approvers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRequirement {
    pub title: String,
    pub fields: FieldMap,
}

impl ResolvedRequirement {
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

/// One requirement per distinct title, in first-seen order, each completed
/// by the requirement configuration.
pub fn resolve_requirements(
    testcases: &[ResolvedTestCase],
    config: &Configuration,
    options: &RequirementOptions,
) -> Result<Vec<ResolvedRequirement>, BgError> {
    let mut titles: Vec<&str> = Vec::new();
    for testcase in testcases {
        if !titles.contains(&testcase.requirement.as_str()) {
            titles.push(&testcase.requirement);
        }
    }

    let mut requirements = Vec::with_capacity(titles.len());
    for title in titles {
        let subject = Subject {
            name: title.to_string(),
            qualified_name: title.to_string(),
            ..Subject::default()
        };
        let mut fields = FieldMap::new();
        if let Some(assignee) = &options.assignee {
            fields.insert("assignee".to_string(), FieldValue::text(assignee));
        }
        if !options.approvers.is_empty() {
            fields.insert(
                "approvers".to_string(),
                FieldValue::List(options.approvers.clone()),
            );
        }
        apply_defaults(config, &subject, &mut fields)?;
        apply_transforms(config, &subject, &mut fields, None)?;
        debug!(requirement = title, "resolved requirement");
        requirements.push(ResolvedRequirement {
            title: title.to_string(),
            fields,
        });
    }
    Ok(requirements)
}
