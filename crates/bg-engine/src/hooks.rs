use std::rc::Rc;

use bg_core::{BgError, FieldValue};
use bg_parser::docstring_prose;
use rhai::{Array, Dynamic, Engine, ImmutableString, Map, Scope, AST, INT};

use crate::config::{DefaultProvider, ResolutionContext, Transform};

pub const BUILTIN_TRANSFORMS: &[&str] = &["lower", "upper", "strip"];
pub const BUILTIN_DEFAULTS: &[&str] = &[
    "title-from-name",
    "caseposneg-from-name",
    "description-from-docstring",
];

pub fn lower() -> Transform {
    Transform::new(|value, _| Ok(value.map_text(str::to_lowercase)))
}

pub fn upper() -> Transform {
    Transform::new(|value, _| Ok(value.map_text(str::to_uppercase)))
}

pub fn strip() -> Transform {
    Transform::new(|value, _| Ok(value.map_text(|text| text.trim().to_string())))
}

pub fn title_from_name() -> DefaultProvider {
    DefaultProvider::function(|context| Ok(Some(FieldValue::text(&context.subject.name))))
}

pub fn caseposneg_from_name() -> DefaultProvider {
    DefaultProvider::function(|context| {
        let value = if context.subject.name.to_lowercase().contains("negative") {
            "negative"
        } else {
            "positive"
        };
        Ok(Some(FieldValue::text(value)))
    })
}

/// Docstring prose without the field list; declines when nothing is left.
pub fn description_from_docstring() -> DefaultProvider {
    DefaultProvider::function(|context| {
        let prose = docstring_prose(&context.subject.docstring);
        if prose.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(FieldValue::Text(prose)))
        }
    })
}

pub fn builtin_transform(name: &str) -> Result<Transform, BgError> {
    match name {
        "lower" => Ok(lower()),
        "upper" => Ok(upper()),
        "strip" => Ok(strip()),
        _ => Err(unknown_builtin("transform", name, BUILTIN_TRANSFORMS)),
    }
}

pub fn builtin_default(name: &str) -> Result<DefaultProvider, BgError> {
    match name {
        "title-from-name" => Ok(title_from_name()),
        "caseposneg-from-name" => Ok(caseposneg_from_name()),
        "description-from-docstring" => Ok(description_from_docstring()),
        _ => Err(unknown_builtin("default", name, BUILTIN_DEFAULTS)),
    }
}

fn unknown_builtin(hook: &str, name: &str, known: &[&str]) -> BgError {
    BgError::new(
        "CONFIG_UNKNOWN_BUILTIN",
        format!(
            "Unknown builtin {} \"{}\". Expected one of: {}.",
            hook,
            name,
            known.join(", ")
        ),
    )
}

/// A Rhai script used as a default provider or transform; its last
/// expression is the result.
///
/// Scripts see `testcase` (name, qualifiedName, docstring, sourcePath,
/// lineNumber, fields) and, for transforms, `value`. They return a string,
/// an array of strings, or `()`.
#[derive(Clone)]
pub struct ScriptHook {
    engine: Rc<Engine>,
    ast: Rc<AST>,
    source: String,
}

impl ScriptHook {
    pub fn compile(engine: &Rc<Engine>, source: &str) -> Result<Self, BgError> {
        let ast = engine.compile(source).map_err(|error| {
            BgError::new(
                "CONFIG_SCRIPT_INVALID",
                format!("Failed to compile hook script `{}`: {}", source, error),
            )
        })?;
        Ok(Self {
            engine: Rc::clone(engine),
            ast: Rc::new(ast),
            source: source.to_string(),
        })
    }

    pub fn into_default(self) -> DefaultProvider {
        DefaultProvider::function(move |context| self.eval(None, context))
    }

    pub fn into_transform(self) -> Transform {
        Transform::new(move |value, context| {
            self.eval(Some(&value), context)?.ok_or_else(|| {
                BgError::new(
                    "HOOK_SCRIPT_VALUE",
                    format!("Transform script `{}` returned no value.", self.source),
                )
            })
        })
    }

    fn eval(
        &self,
        value: Option<&FieldValue>,
        context: &ResolutionContext<'_>,
    ) -> Result<Option<FieldValue>, BgError> {
        let mut scope = Scope::new();
        scope.push_dynamic("testcase", context_to_dynamic(context));
        if let Some(value) = value {
            scope.push_dynamic("value", field_value_to_dynamic(value));
        }

        let result = self
            .engine
            .eval_ast_with_scope::<Dynamic>(&mut scope, &self.ast)
            .map_err(|error| {
                BgError::new(
                    "HOOK_SCRIPT_ERROR",
                    format!("Script `{}` failed: {}", self.source, error),
                )
            })?;
        dynamic_to_field_value(result, &self.source)
    }
}

pub fn script_engine() -> Rc<Engine> {
    let mut engine = Engine::new();
    engine.set_max_operations(100_000);
    Rc::new(engine)
}

fn context_to_dynamic(context: &ResolutionContext<'_>) -> Dynamic {
    let subject = context.subject;
    let mut fields = Map::new();
    for (name, value) in context.fields {
        fields.insert(name.as_str().into(), field_value_to_dynamic(value));
    }

    let mut map = Map::new();
    map.insert("name".into(), Dynamic::from(subject.name.clone()));
    map.insert(
        "qualifiedName".into(),
        Dynamic::from(subject.qualified_name.clone()),
    );
    map.insert("docstring".into(), Dynamic::from(subject.docstring.clone()));
    map.insert("sourcePath".into(), Dynamic::from(subject.source_path.clone()));
    map.insert(
        "lineNumber".into(),
        Dynamic::from(subject.line_number as INT),
    );
    map.insert("fields".into(), Dynamic::from_map(fields));
    Dynamic::from_map(map)
}

fn field_value_to_dynamic(value: &FieldValue) -> Dynamic {
    match value {
        FieldValue::Text(text) => Dynamic::from(text.clone()),
        FieldValue::List(items) => Dynamic::from_array(
            items
                .iter()
                .map(|item| Dynamic::from(item.clone()))
                .collect::<Array>(),
        ),
    }
}

fn dynamic_to_field_value(value: Dynamic, source: &str) -> Result<Option<FieldValue>, BgError> {
    if value.is_unit() {
        return Ok(None);
    }
    if value.is::<ImmutableString>() {
        return Ok(Some(FieldValue::Text(
            value.cast::<ImmutableString>().to_string(),
        )));
    }
    if value.is::<Array>() {
        let mut items = Vec::new();
        for item in value.cast::<Array>() {
            if !item.is::<ImmutableString>() {
                return Err(script_value_error(source, item.type_name()));
            }
            items.push(item.cast::<ImmutableString>().to_string());
        }
        return Ok(Some(FieldValue::List(items)));
    }
    Err(script_value_error(source, value.type_name()))
}

fn script_value_error(source: &str, type_name: &str) -> BgError {
    BgError::new(
        "HOOK_SCRIPT_VALUE",
        format!(
            "Script `{}` must return a string, an array of strings or (), got {}.",
            source, type_name
        ),
    )
}
