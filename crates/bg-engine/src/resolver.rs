use bg_core::{ScopeNode, Warning, WarningKind};
use tracing::warn;

use crate::config::{Configuration, FieldMap};

/// Merges an ancestor chain given function first. For each field the
/// closest scope that declares it wins outright.
pub fn merge_chain<'a, I>(chain: I) -> FieldMap
where
    I: IntoIterator<Item = &'a ScopeNode>,
{
    let mut merged = FieldMap::new();
    for node in chain {
        for (name, value) in node.fields().iter() {
            merged
                .entry(name.to_string())
                .or_insert_with(|| value.clone());
        }
    }
    merged
}

/// Drops fields the configuration does not recognize, reporting each one
/// once for `scope`.
pub fn retain_recognized(
    merged: FieldMap,
    config: &Configuration,
    scope: &str,
    warnings: &mut Vec<Warning>,
) -> FieldMap {
    let mut kept = FieldMap::new();
    for (name, value) in merged {
        if config.is_recognized(&name) {
            kept.insert(name, value);
            continue;
        }
        let warning = Warning::new(
            WarningKind::UnrecognizedField,
            scope,
            format!("Field \"{}\" is not recognized and was dropped.", name),
        );
        warn!(%warning, "dropping field");
        warnings.push(warning);
    }
    kept
}

#[cfg(test)]
mod resolver_tests {
    use super::*;
    use bg_core::{FieldSet, FieldValue, ScopeDecl, ScopeTree};

    fn fields(entries: &[(&str, &str)]) -> FieldSet {
        let mut set = FieldSet::new();
        for (name, value) in entries {
            set.insert_first(*name, FieldValue::text(*value));
        }
        set
    }

    #[test]
    fn closest_scope_wins_for_every_field() {
        let mut tree = ScopeTree::new(
            "tests/test_mod.py",
            ScopeDecl::new("tests").with_fields(
                "",
                fields(&[("requirement", "Package"), ("tags", "pkg")]),
            ),
        );
        let module = tree
            .add_module(
                tree.root(),
                ScopeDecl::new("test_mod").with_fields(
                    "",
                    fields(&[
                        ("requirement", "Module"),
                        ("setup", "module setup"),
                        ("teardown", "module teardown"),
                    ]),
                ),
                "tests.test_mod",
            )
            .expect("module");
        let class = tree
            .add_class(
                module,
                ScopeDecl::new("Bar").with_fields(
                    "",
                    fields(&[("setup", "class setup"), ("teardown", "class teardown")]),
                ),
            )
            .expect("class");
        let function = tree
            .add_function(
                class,
                ScopeDecl::new("test_foo").with_fields(
                    "",
                    fields(&[("id", "F-1"), ("setup", "function setup")]),
                ),
                3,
            )
            .expect("function");

        let merged = merge_chain(tree.ancestors(function));
        assert_eq!(merged.get("id"), Some(&FieldValue::text("F-1")));
        assert_eq!(merged.get("setup"), Some(&FieldValue::text("function setup")));
        assert_eq!(merged.get("teardown"), Some(&FieldValue::text("class teardown")));
        assert_eq!(merged.get("requirement"), Some(&FieldValue::text("Module")));
        assert_eq!(merged.get("tags"), Some(&FieldValue::text("pkg")));

        let root = tree.node(tree.root()).expect("root");
        assert_eq!(root.fields().get("requirement"), Some(&FieldValue::text("Package")));
    }

    #[test]
    fn unrecognized_fields_are_dropped_with_one_warning_each() {
        let mut builder = Configuration::builder();
        builder.field("id");
        let config = builder.build().expect("config");

        let mut merged = FieldMap::new();
        merged.insert("id".to_string(), FieldValue::text("1"));
        merged.insert("bogus".to_string(), FieldValue::text("x"));
        merged.insert("other".to_string(), FieldValue::text("y"));

        let mut warnings = Vec::new();
        let kept = retain_recognized(merged, &config, "pkg.mod.test_a", &mut warnings);
        assert_eq!(kept.keys().collect::<Vec<_>>(), vec!["id"]);
        assert_eq!(warnings.len(), 2);
        assert!(warnings
            .iter()
            .all(|warning| warning.kind == WarningKind::UnrecognizedField
                && warning.scope == "pkg.mod.test_a"));
        assert!(warnings[0].message.contains("\"bogus\""));
    }
}
