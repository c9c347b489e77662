use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use bg_core::{BgError, FieldValue};

pub type FieldMap = BTreeMap<String, FieldValue>;

type ProviderFn = dyn Fn(&ResolutionContext<'_>) -> Result<Option<FieldValue>, BgError>;
type TransformFn = dyn Fn(FieldValue, &ResolutionContext<'_>) -> Result<FieldValue, BgError>;

/// The item being resolved: a test function, or a requirement title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subject {
    pub name: String,
    pub qualified_name: String,
    pub docstring: String,
    pub source_path: String,
    pub line_number: usize,
}

/// Read-only view handed to default providers and transforms. `fields`
/// holds every value resolved so far.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionContext<'a> {
    pub subject: &'a Subject,
    pub fields: &'a FieldMap,
}

impl<'a> ResolutionContext<'a> {
    pub fn new(subject: &'a Subject, fields: &'a FieldMap) -> Self {
        Self { subject, fields }
    }

    pub fn field(&self, name: &str) -> Option<&'a FieldValue> {
        self.fields.get(name)
    }
}

#[derive(Clone)]
pub enum DefaultProvider {
    Constant(FieldValue),
    /// May decline by returning `Ok(None)`.
    Function(Rc<ProviderFn>),
}

impl DefaultProvider {
    pub fn constant(value: impl Into<String>) -> Self {
        Self::Constant(FieldValue::Text(value.into()))
    }

    pub fn function<F>(provider: F) -> Self
    where
        F: Fn(&ResolutionContext<'_>) -> Result<Option<FieldValue>, BgError> + 'static,
    {
        Self::Function(Rc::new(provider))
    }

    pub fn provide(&self, context: &ResolutionContext<'_>) -> Result<Option<FieldValue>, BgError> {
        match self {
            Self::Constant(value) => Ok(Some(value.clone())),
            Self::Function(provider) => provider(context),
        }
    }
}

impl fmt::Debug for DefaultProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
        }
    }
}

#[derive(Clone)]
pub struct Transform(Rc<TransformFn>);

impl Transform {
    pub fn new<F>(transform: F) -> Self
    where
        F: Fn(FieldValue, &ResolutionContext<'_>) -> Result<FieldValue, BgError> + 'static,
    {
        Self(Rc::new(transform))
    }

    pub fn apply(
        &self,
        value: FieldValue,
        context: &ResolutionContext<'_>,
    ) -> Result<FieldValue, BgError> {
        (self.0)(value, context)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Transform(..)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Standard,
    /// Written to the importer's custom-fields section.
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
}

/// Recognized fields in processing order, plus the hooks attached to them.
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    fields: Vec<FieldSpec>,
    defaults: BTreeMap<String, DefaultProvider>,
    transforms: BTreeMap<String, Transform>,
}

impl Configuration {
    pub fn builder() -> ConfigurationBuilder {
        <ConfigurationBuilder as Default>::default()
    }

    pub fn field_specs(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Field names in processing order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|spec| spec.name.as_str())
    }

    pub fn custom_field_names(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|spec| spec.kind == FieldKind::Custom)
            .map(|spec| spec.name.as_str())
    }

    pub fn is_recognized(&self, name: &str) -> bool {
        self.kind_of(name).is_some()
    }

    pub fn kind_of(&self, name: &str) -> Option<FieldKind> {
        self.fields
            .iter()
            .find(|spec| spec.name == name)
            .map(|spec| spec.kind)
    }

    pub fn default_for(&self, name: &str) -> Option<&DefaultProvider> {
        self.defaults.get(name)
    }

    pub fn transform_for(&self, name: &str) -> Option<&Transform> {
        self.transforms.get(name)
    }
}

/// Collects declarations and reports every conflict at `build` time, before
/// any resolution starts.
#[derive(Debug, Default)]
pub struct ConfigurationBuilder {
    config: Configuration,
    errors: Vec<BgError>,
}

impl ConfigurationBuilder {
    /// Starts from a copy of `base`; its fields keep their position ahead of
    /// anything appended.
    pub fn extend(base: &Configuration) -> Self {
        Self {
            config: base.clone(),
            errors: Vec::new(),
        }
    }

    pub fn field(&mut self, name: &str) -> &mut Self {
        self.declare(name, FieldKind::Standard)
    }

    pub fn custom_field(&mut self, name: &str) -> &mut Self {
        self.declare(name, FieldKind::Custom)
    }

    pub fn default(&mut self, name: &str, provider: DefaultProvider) -> &mut Self {
        let name = normalize(name);
        if self.config.defaults.contains_key(&name) {
            self.errors.push(BgError::new(
                "CONFIG_DUPLICATE_DEFAULT",
                format!(
                    "Default for field \"{}\" is already registered; use an override to replace it.",
                    name
                ),
            ));
            return self;
        }
        self.config.defaults.insert(name, provider);
        self
    }

    pub fn override_default(&mut self, name: &str, provider: DefaultProvider) -> &mut Self {
        self.config.defaults.insert(normalize(name), provider);
        self
    }

    pub fn transform(&mut self, name: &str, transform: Transform) -> &mut Self {
        let name = normalize(name);
        if self.config.transforms.contains_key(&name) {
            self.errors.push(BgError::new(
                "CONFIG_DUPLICATE_TRANSFORM",
                format!(
                    "Transform for field \"{}\" is already registered; use an override to replace it.",
                    name
                ),
            ));
            return self;
        }
        self.config.transforms.insert(name, transform);
        self
    }

    pub fn override_transform(&mut self, name: &str, transform: Transform) -> &mut Self {
        self.config.transforms.insert(normalize(name), transform);
        self
    }

    /// Records an error found while preparing a declaration, e.g. a hook
    /// script that failed to compile.
    pub fn reject(&mut self, error: BgError) -> &mut Self {
        self.errors.push(error);
        self
    }

    pub fn build(self) -> Result<Configuration, BgError> {
        let mut errors = self.errors;
        let hooked = self
            .config
            .defaults
            .keys()
            .chain(self.config.transforms.keys());
        for name in hooked {
            if !self.config.is_recognized(name) {
                errors.push(BgError::new(
                    "CONFIG_UNKNOWN_FIELD",
                    format!("Hook registered for undeclared field \"{}\".", name),
                ));
            }
        }

        let Some(first) = errors.first() else {
            return Ok(self.config);
        };
        Err(BgError::new(
            first.code.clone(),
            errors
                .iter()
                .map(|error| error.message.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        ))
    }

    fn declare(&mut self, name: &str, kind: FieldKind) -> &mut Self {
        let name = normalize(name);
        if self.config.is_recognized(&name) {
            self.errors.push(BgError::new(
                "CONFIG_DUPLICATE_FIELD",
                format!("Field \"{}\" is declared more than once.", name),
            ));
            return self;
        }
        self.config.fields.push(FieldSpec { name, kind });
        self
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
