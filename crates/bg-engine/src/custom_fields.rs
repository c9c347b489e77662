use bg_core::{BgError, Warning, WarningKind};
use serde_json::Value;
use tracing::warn;

/// Ordered string mapping; inserting an existing key replaces its value in
/// place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomFieldMap {
    entries: Vec<(String, String)>,
}

impl CustomFieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCustomFields {
    pub fields: CustomFieldMap,
    pub warnings: Vec<Warning>,
}

/// Parses `--custom-fields` items. Each item is a JSON object or a
/// `key=value` pair; later items override earlier keys.
pub fn parse_custom_fields<S: AsRef<str>>(items: &[S]) -> Result<ParsedCustomFields, BgError> {
    let mut parsed = ParsedCustomFields::default();
    for item in items {
        let item = item.as_ref();
        if item.trim_start().starts_with('{') {
            let object = serde_json::from_str::<serde_json::Map<String, Value>>(item).map_err(
                |error| {
                    BgError::new(
                        "CUSTOM_FIELDS_INVALID",
                        format!("Custom fields item is not a JSON object: {}", error),
                    )
                },
            )?;
            for (key, value) in object {
                let value = match value {
                    Value::String(text) => text,
                    other => other.to_string(),
                };
                parsed.fields.insert(key, value);
            }
            continue;
        }

        match item.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                parsed.fields.insert(key.trim(), value.trim());
            }
            _ => {
                let warning = Warning::new(
                    WarningKind::CustomFieldIgnored,
                    "custom-fields",
                    format!("Ignoring \"{}\": expected key=value or a JSON object.", item),
                );
                warn!(%warning, "ignoring custom field");
                parsed.warnings.push(warning);
            }
        }
    }
    Ok(parsed)
}
