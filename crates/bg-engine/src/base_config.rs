use bg_core::BgError;

use crate::config::{Configuration, DefaultProvider};
use crate::hooks;

pub const TESTCASE_FIELDS: &[&str] = &[
    "approvers",
    "assignee",
    "description",
    "duedate",
    "expectedresults",
    "id",
    "initialestimate",
    "parametrized",
    "requirement",
    "status",
    "steps",
    "title",
];

pub const TESTCASE_CUSTOM_FIELDS: &[&str] = &[
    "arch",
    "automation_script",
    "caseautomation",
    "casecomponent",
    "caseimportance",
    "caselevel",
    "caseposneg",
    "setup",
    "subcomponent",
    "subtype1",
    "subtype2",
    "tags",
    "tcmsarguments",
    "tcmsbug",
    "tcmscaseid",
    "tcmscategory",
    "tcmscomponent",
    "tcmsnotes",
    "tcmsplan",
    "tcmsreference",
    "tcmsrequirement",
    "tcmsscript",
    "tcmstag",
    "teardown",
    "testtier",
    "testtype",
    "upstream",
    "variant",
];

const TESTCASE_CONSTANT_DEFAULTS: &[(&str, &str)] = &[
    ("caseautomation", "automated"),
    ("casecomponent", "-"),
    ("caseimportance", "medium"),
    ("caselevel", "component"),
    ("parametrized", "no"),
    ("subtype1", "-"),
    ("testtype", "functional"),
    ("upstream", "no"),
];

const TESTCASE_LOWERED: &[&str] = &[
    "caseautomation",
    "casecomponent",
    "caseimportance",
    "caselevel",
    "caseposneg",
    "parametrized",
    "subtype1",
    "testtype",
    "upstream",
];

pub const REQUIREMENT_FIELDS: &[&str] = &[
    "approvers",
    "assignee",
    "categories",
    "description",
    "duedate",
    "id",
    "initialestimate",
    "plannedin",
    "priority",
    "severity",
    "status",
    "title",
];

pub const REQUIREMENT_CUSTOM_FIELDS: &[&str] = &["reqtype"];

const REQUIREMENT_CONSTANT_DEFAULTS: &[(&str, &str)] = &[
    ("priority", "high"),
    ("severity", "should_have"),
    ("status", "approved"),
    ("reqtype", "functional"),
];

/// The two configurations one run works with.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub testcase: Configuration,
    pub requirement: Configuration,
}

impl EngineConfig {
    pub fn base() -> Result<Self, BgError> {
        Ok(Self {
            testcase: testcase_configuration()?,
            requirement: requirement_configuration()?,
        })
    }
}

/// Standard and custom test-case fields, each list processed alphabetically,
/// standard fields first.
pub fn testcase_configuration() -> Result<Configuration, BgError> {
    let mut builder = Configuration::builder();
    for name in TESTCASE_FIELDS {
        builder.field(name);
    }
    for name in TESTCASE_CUSTOM_FIELDS {
        builder.custom_field(name);
    }
    for (name, value) in TESTCASE_CONSTANT_DEFAULTS {
        builder.default(name, DefaultProvider::constant(*value));
    }
    builder
        .default("caseposneg", hooks::caseposneg_from_name())
        .default("description", hooks::description_from_docstring())
        .default("title", hooks::title_from_name());
    for name in TESTCASE_LOWERED {
        builder.transform(name, hooks::lower());
    }
    builder.build()
}

pub fn requirement_configuration() -> Result<Configuration, BgError> {
    let mut builder = Configuration::builder();
    for name in REQUIREMENT_FIELDS {
        builder.field(name);
    }
    for name in REQUIREMENT_CUSTOM_FIELDS {
        builder.custom_field(name);
    }
    for (name, value) in REQUIREMENT_CONSTANT_DEFAULTS {
        builder.default(name, DefaultProvider::constant(*value));
        builder.transform(name, hooks::lower());
    }
    builder.build()
}
