use bg_core::{BgError, FieldValue, StepField, TestSteps};
use tracing::debug;

use crate::config::{Configuration, FieldMap, ResolutionContext, Subject};

/// Fills absent recognized fields from their providers, in configuration
/// order. Each provider sees every field resolved before it.
pub fn apply_defaults(
    config: &Configuration,
    subject: &Subject,
    fields: &mut FieldMap,
) -> Result<(), BgError> {
    for name in config.field_names() {
        if fields.contains_key(name) {
            continue;
        }
        let Some(provider) = config.default_for(name) else {
            continue;
        };
        let value = provider
            .provide(&ResolutionContext::new(subject, fields))
            .map_err(|error| hook_failed("default", name, subject, error))?;
        match value {
            Some(value) => {
                fields.insert(name.to_string(), value);
            }
            None => debug!(field = name, subject = %subject.qualified_name, "default declined"),
        }
    }
    Ok(())
}

/// Replaces each present field with its transformed value, in configuration
/// order. Transforms for `steps` and `expectedresults` run on every paired
/// component of `steps`; the map keeps the untransformed values.
pub fn apply_transforms(
    config: &Configuration,
    subject: &Subject,
    fields: &mut FieldMap,
    mut steps: Option<&mut TestSteps>,
) -> Result<(), BgError> {
    for name in config.field_names() {
        let Some(transform) = config.transform_for(name) else {
            continue;
        };

        if let Some(field) = step_field(name) {
            if let Some(steps) = steps.as_deref_mut() {
                let context = ResolutionContext::new(subject, fields);
                transform_steps(steps, field, |text| {
                    transform
                        .apply(FieldValue::Text(text), &context)
                        .map(|value| value.render())
                        .map_err(|error| hook_failed("transform", name, subject, error))
                })?;
            }
            continue;
        }

        let Some(current) = fields.get(name).cloned() else {
            continue;
        };
        let value = transform
            .apply(current, &ResolutionContext::new(subject, fields))
            .map_err(|error| hook_failed("transform", name, subject, error))?;
        fields.insert(name.to_string(), value);
    }
    Ok(())
}

fn step_field(name: &str) -> Option<StepField> {
    [StepField::Steps, StepField::ExpectedResults]
        .into_iter()
        .find(|field| field.field_name() == name)
}

fn transform_steps<F>(steps: &mut TestSteps, field: StepField, mut apply: F) -> Result<(), BgError>
where
    F: FnMut(String) -> Result<String, BgError>,
{
    match steps {
        TestSteps::Paired { pairs } => {
            for pair in pairs {
                let slot = match field {
                    StepField::Steps => &mut pair.step,
                    StepField::ExpectedResults => &mut pair.expected,
                };
                *slot = apply(std::mem::take(slot))?;
            }
        }
        TestSteps::Unpaired {
            field: present,
            text,
        } if *present == field => {
            *text = apply(std::mem::take(text))?;
        }
        TestSteps::Unpaired { .. } => {}
    }
    Ok(())
}

fn hook_failed(hook: &str, field: &str, subject: &Subject, error: BgError) -> BgError {
    BgError::new(
        "HOOK_FAILED",
        format!(
            "The {} for field \"{}\" failed on \"{}\": {}",
            hook, field, subject.qualified_name, error
        ),
    )
}
