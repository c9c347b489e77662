use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use bg_core::{BgError, FieldValue};
use rhai::Engine;
use serde::Deserialize;
use tracing::debug;

use crate::base_config::EngineConfig;
use crate::config::{Configuration, ConfigurationBuilder, DefaultProvider, Transform};
use crate::hooks::{self, ScriptHook};

/// On-disk configuration: `{"testcase": {...}, "requirement": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub testcase: SectionFile,
    pub requirement: SectionFile,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct SectionFile {
    pub fields: Vec<String>,
    pub custom_fields: Vec<String>,
    pub defaults: BTreeMap<String, HookSpec>,
    pub transforms: BTreeMap<String, HookSpec>,
}

/// Exactly one of `value`, `builtin` or `script`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HookSpec {
    pub value: Option<String>,
    pub builtin: Option<String>,
    pub script: Option<String>,
    #[serde(rename = "override")]
    pub override_existing: bool,
}

enum HookSource<'a> {
    Value(&'a str),
    Builtin(&'a str),
    Script(&'a str),
}

impl HookSpec {
    fn source(&self, hook: &str, field: &str) -> Result<HookSource<'_>, BgError> {
        match (&self.value, &self.builtin, &self.script) {
            (Some(value), None, None) => Ok(HookSource::Value(value)),
            (None, Some(builtin), None) => Ok(HookSource::Builtin(builtin)),
            (None, None, Some(script)) => Ok(HookSource::Script(script)),
            _ => Err(BgError::new(
                "CONFIG_HOOK_INVALID",
                format!(
                    "The {} for field \"{}\" must set exactly one of value, builtin or script.",
                    hook, field
                ),
            )),
        }
    }
}

pub fn parse_config_file(text: &str) -> Result<ConfigFile, BgError> {
    serde_json::from_str(text)
        .map_err(|error| BgError::new("CONFIG_FILE_INVALID", format!("Invalid config file: {}", error)))
}

/// Reads `path` and extends the base configuration with it.
pub fn load_config_file(path: &Path) -> Result<EngineConfig, BgError> {
    let text = fs::read_to_string(path).map_err(|error| {
        BgError::new(
            "CONFIG_FILE_READ",
            format!("Failed to read config file \"{}\": {}", path.display(), error),
        )
    })?;
    debug!(path = %path.display(), "loading config file");
    parse_config_file(&text)?.apply(&EngineConfig::base()?)
}

impl ConfigFile {
    pub fn apply(&self, base: &EngineConfig) -> Result<EngineConfig, BgError> {
        let engine = hooks::script_engine();
        Ok(EngineConfig {
            testcase: self.testcase.apply(&base.testcase, &engine)?,
            requirement: self.requirement.apply(&base.requirement, &engine)?,
        })
    }
}

impl SectionFile {
    fn apply(&self, base: &Configuration, engine: &Rc<Engine>) -> Result<Configuration, BgError> {
        let mut builder = ConfigurationBuilder::extend(base);
        for name in &self.fields {
            builder.field(name);
        }
        for name in &self.custom_fields {
            builder.custom_field(name);
        }
        for (field, spec) in &self.defaults {
            match default_provider(field, spec, engine) {
                Ok(provider) if spec.override_existing => {
                    builder.override_default(field, provider);
                }
                Ok(provider) => {
                    builder.default(field, provider);
                }
                Err(error) => {
                    builder.reject(error);
                }
            }
        }
        for (field, spec) in &self.transforms {
            match transform(field, spec, engine) {
                Ok(transform) if spec.override_existing => {
                    builder.override_transform(field, transform);
                }
                Ok(transform) => {
                    builder.transform(field, transform);
                }
                Err(error) => {
                    builder.reject(error);
                }
            }
        }
        builder.build()
    }
}

fn default_provider(
    field: &str,
    spec: &HookSpec,
    engine: &Rc<Engine>,
) -> Result<DefaultProvider, BgError> {
    match spec.source("default", field)? {
        HookSource::Value(value) => Ok(DefaultProvider::constant(value)),
        HookSource::Builtin(name) => hooks::builtin_default(name),
        HookSource::Script(source) => Ok(ScriptHook::compile(engine, source)?.into_default()),
    }
}

fn transform(field: &str, spec: &HookSpec, engine: &Rc<Engine>) -> Result<Transform, BgError> {
    match spec.source("transform", field)? {
        HookSource::Value(value) => {
            let value = value.to_string();
            Ok(Transform::new(move |_, _| Ok(FieldValue::text(&value))))
        }
        HookSource::Builtin(name) => hooks::builtin_transform(name),
        HookSource::Script(source) => Ok(ScriptHook::compile(engine, source)?.into_transform()),
    }
}

#[cfg(test)]
mod config_file_tests {
    use super::*;
    use crate::config::{FieldKind, FieldMap, ResolutionContext, Subject};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn base() -> EngineConfig {
        EngineConfig::base().expect("base config builds")
    }

    #[test]
    fn sections_extend_the_base_configuration() {
        let file = parse_config_file(
            r#"{
  "testcase": {
    "fields": ["customerscenario"],
    "customFields": ["team"],
    "defaults": {
      "team": {"value": "QE"},
      "caseimportance": {"value": "high", "override": true}
    },
    "transforms": {
      "team": {"builtin": "lower"},
      "customerscenario": {"script": "value.to_upper()"}
    }
  }
}"#,
        )
        .expect("config parses");
        let config = file.apply(&base()).expect("config applies");

        assert_eq!(config.testcase.kind_of("team"), Some(FieldKind::Custom));
        assert_eq!(
            config.testcase.kind_of("customerscenario"),
            Some(FieldKind::Standard)
        );
        let subject = Subject::default();
        let fields = FieldMap::new();
        let context = ResolutionContext::new(&subject, &fields);
        assert_eq!(
            config
                .testcase
                .default_for("caseimportance")
                .expect("default")
                .provide(&context)
                .expect("provides"),
            Some(FieldValue::text("high"))
        );
        assert_eq!(
            config
                .testcase
                .transform_for("customerscenario")
                .expect("transform")
                .apply(FieldValue::text("yes"), &context)
                .expect("script runs"),
            FieldValue::text("YES")
        );
        assert!(config.requirement.is_recognized("reqtype"));
    }

    #[test]
    fn redefining_a_base_hook_without_override_fails() {
        let file = parse_config_file(r#"{"testcase": {"defaults": {"caseimportance": {"value": "high"}}}}"#)
            .expect("config parses");
        let error = file.apply(&base()).expect_err("duplicate default");
        assert_eq!(error.code, "CONFIG_DUPLICATE_DEFAULT");
    }

    #[test]
    fn invalid_hook_specs_are_configuration_errors() {
        let both = parse_config_file(
            r#"{"testcase": {"transforms": {"title": {"builtin": "lower", "script": "value"}}}}"#,
        )
        .expect("config parses");
        assert_eq!(
            both.apply(&base()).expect_err("two sources").code,
            "CONFIG_HOOK_INVALID"
        );

        let unknown = parse_config_file(r#"{"testcase": {"transforms": {"title": {"builtin": "camel"}}}}"#)
            .expect("config parses");
        assert_eq!(
            unknown.apply(&base()).expect_err("unknown builtin").code,
            "CONFIG_UNKNOWN_BUILTIN"
        );

        let broken = parse_config_file(r#"{"requirement": {"transforms": {"title": {"script": "value +"}}}}"#)
            .expect("config parses");
        assert_eq!(
            broken.apply(&base()).expect_err("bad script").code,
            "CONFIG_SCRIPT_INVALID"
        );

        let error = parse_config_file(r#"{"testcases": {}}"#).expect_err("unknown section");
        assert_eq!(error.code, "CONFIG_FILE_INVALID");
    }

    #[test]
    fn load_reads_from_disk() {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("bg-config-{}.json", nanos));
        fs::write(&path, r#"{"requirement": {"customFields": ["risk"]}}"#).expect("write config");

        let config = load_config_file(&path).expect("config loads");
        assert_eq!(config.requirement.kind_of("risk"), Some(FieldKind::Custom));
        let _ = fs::remove_file(&path);

        let error = load_config_file(&path).expect_err("missing file");
        assert_eq!(error.code, "CONFIG_FILE_READ");
    }
}
