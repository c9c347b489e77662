use std::collections::BTreeMap;

use bg_core::{BgError, FieldValue};

fn explicit(value: Option<&FieldValue>) -> Option<String> {
    value
        .filter(|value| !value.is_blank())
        .map(FieldValue::render)
}

/// Explicit id, or the qualified dotted path of the test function.
pub fn derive_id(value: Option<&FieldValue>, qualified_name: &str) -> String {
    explicit(value).unwrap_or_else(|| qualified_name.to_string())
}

pub fn derive_title(value: Option<&FieldValue>, function_name: &str) -> String {
    explicit(value).unwrap_or_else(|| function_name.to_string())
}

/// Explicit requirement, or a title built from the module's base name:
/// `test_login_example` becomes `Login Example`, `test_API_limits` becomes
/// `Api Limits`.
pub fn derive_requirement(value: Option<&FieldValue>, module_name: &str) -> String {
    if let Some(requirement) = explicit(value) {
        return requirement;
    }
    let base = module_name.rsplit('.').next().unwrap_or(module_name);
    let stem = base
        .strip_prefix("test_")
        .or_else(|| base.strip_suffix("_test"))
        .unwrap_or(base);
    let title = stem
        .split('_')
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ");
    if title.is_empty() {
        base.to_string()
    } else {
        title
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Append-only record of derived ids, checked once the whole batch is in.
#[derive(Debug, Clone, Default)]
pub struct IdRegistry {
    entries: Vec<(String, String)>,
}

impl IdRegistry {
    pub fn record(&mut self, id: &str, qualified_name: &str) {
        self.entries.push((id.to_string(), qualified_name.to_string()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fails with every collision, each naming the id and both owners.
    pub fn check(&self) -> Result<(), BgError> {
        let mut first_owner = BTreeMap::new();
        let mut collisions = Vec::new();
        for (id, qualified_name) in &self.entries {
            match first_owner.get(id.as_str()) {
                Some(owner) => collisions.push(format!(
                    "Id \"{}\" is used by both \"{}\" and \"{}\".",
                    id, owner, qualified_name
                )),
                None => {
                    first_owner.insert(id.as_str(), qualified_name.as_str());
                }
            }
        }

        if collisions.is_empty() {
            Ok(())
        } else {
            Err(BgError::new("ID_COLLISION", collisions.join(" ")))
        }
    }
}
