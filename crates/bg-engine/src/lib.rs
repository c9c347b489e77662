pub mod base_config;
pub mod config;
pub mod config_file;
pub mod custom_fields;
pub mod field_passes;
pub mod hooks;
pub mod identity;
pub mod pipeline;
pub mod requirement;
pub mod resolver;
pub mod steps;

pub use base_config::{requirement_configuration, testcase_configuration, EngineConfig};
pub use config::{
    Configuration, ConfigurationBuilder, DefaultProvider, FieldKind, FieldMap, FieldSpec,
    ResolutionContext, Subject, Transform,
};
pub use config_file::{load_config_file, parse_config_file, ConfigFile, HookSpec, SectionFile};
pub use custom_fields::{parse_custom_fields, CustomFieldMap, ParsedCustomFields};
pub use pipeline::{resolve_function, resolve_trees, ResolutionReport};
pub use requirement::{resolve_requirements, RequirementOptions, ResolvedRequirement};
