use std::fs;
use std::path::{Path, PathBuf};

use bg_core::ScopeTree;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::module::{module_tree, PackageInfo};
use crate::CollectorError;

/// `test_*.py` or `*_test.py`.
pub fn is_test_module(file_name: &str) -> bool {
    let Some(stem) = file_name.strip_suffix(".py") else {
        return false;
    };
    stem.starts_with("test_") || stem.ends_with("_test")
}

/// Collects one scope tree per test module under `path`, visiting
/// directory entries sorted by file name. Anything under one of
/// `ignore_paths` is skipped.
pub fn collect_tests(path: &Path, ignore_paths: &[PathBuf]) -> Result<Vec<ScopeTree>, CollectorError> {
    if !path.exists() {
        return Err(CollectorError::MissingPath {
            path: path.to_path_buf(),
        });
    }

    let mut trees = Vec::new();
    if path.is_file() {
        let is_test = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(is_test_module);
        if is_test && !is_ignored(path, ignore_paths) {
            trees.push(collect_module(path)?);
        }
        return Ok(trees);
    }

    for entry in WalkDir::new(path)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_ignored(entry.path(), ignore_paths))
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let is_test = entry.file_name().to_str().is_some_and(is_test_module);
        if !is_test {
            continue;
        }
        trees.push(collect_module(entry.path())?);
    }

    info!(path = %path.display(), modules = trees.len(), "collected test modules");
    Ok(trees)
}

fn is_ignored(path: &Path, ignore_paths: &[PathBuf]) -> bool {
    ignore_paths
        .iter()
        .any(|ignored| path.starts_with(ignored))
}

fn collect_module(path: &Path) -> Result<ScopeTree, CollectorError> {
    debug!(path = %path.display(), "collecting test module");
    let source = read(path)?;
    let package = package_info(path)?;
    let display_path = path.to_string_lossy().replace('\\', "/");
    module_tree(&display_path, &source, &package).map_err(|source| CollectorError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// The directory holding `module_path`, with the docstring of its
/// `__init__.py` when there is one.
fn package_info(module_path: &Path) -> Result<PackageInfo, CollectorError> {
    let directory = module_path.parent().unwrap_or_else(|| Path::new(""));
    let name = directory
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();

    let init = directory.join("__init__.py");
    if !init.is_file() {
        return Ok(PackageInfo {
            name,
            docstring: String::new(),
        });
    }
    let source = read(&init)?;
    let module = bg_parser::parse_python_module(&source).map_err(|source| CollectorError::Parse {
        path: init.clone(),
        source,
    })?;
    Ok(PackageInfo {
        name,
        docstring: module.docstring.unwrap_or_default(),
    })
}

fn read(path: &Path) -> Result<String, CollectorError> {
    fs::read_to_string(path).map_err(|source| CollectorError::ReadFile {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod walk_tests {
    use super::*;

    use bg_core::{BgError, FieldValue};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should move forward")
            .as_nanos();
        std::env::temp_dir().join(format!("bg-collector-{}-{}", name, nanos))
    }

    fn write_file(path: &Path, content: &str) {
        let parent = path.parent().expect("path should have parent");
        fs::create_dir_all(parent).expect("parent dir should be created");
        fs::write(path, content).expect("file should be written");
    }

    #[test]
    fn test_module_names_match_both_patterns() {
        assert!(is_test_module("test_login.py"));
        assert!(is_test_module("login_test.py"));
        assert!(!is_test_module("conftest.py"));
        assert!(!is_test_module("test_login.pyc"));
        assert!(!is_test_module("helpers.py"));
    }

    #[test]
    fn directory_walk_is_sorted_and_reads_package_docstring() {
        let root = temp_dir("walk");
        write_file(
            &root.join("tests/__init__.py"),
            "\"\"\"Package.\n\n:requirement: Global Requirement\n\"\"\"\n",
        );
        write_file(&root.join("tests/test_b.py"), "def test_b():\n    pass\n");
        write_file(&root.join("tests/a_test.py"), "def test_a():\n    pass\n");
        write_file(&root.join("tests/helpers.py"), "def test_nope():\n    pass\n");
        write_file(&root.join("tests/sub/test_c.py"), "def test_c():\n    pass\n");

        let trees = collect_tests(&root, &[]).expect("collection succeeds");
        let paths = trees
            .iter()
            .map(|tree| {
                Path::new(tree.source_path())
                    .strip_prefix(&root)
                    .expect("under root")
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect::<Vec<_>>();
        assert_eq!(paths, vec!["tests/a_test.py", "tests/sub/test_c.py", "tests/test_b.py"]);

        let package = trees[0].node(trees[0].root()).expect("package node");
        assert_eq!(package.name(), "tests");
        assert_eq!(
            package.fields().get("requirement"),
            Some(&FieldValue::text("Global Requirement"))
        );
        let sub_package = trees[1].node(trees[1].root()).expect("package node");
        assert!(sub_package.fields().is_empty());
    }

    #[test]
    fn ignore_paths_prune_the_walk() {
        let root = temp_dir("ignore");
        write_file(&root.join("tests/test_a.py"), "def test_a():\n    pass\n");
        write_file(&root.join("tests/skip/test_b.py"), "def test_b():\n    pass\n");

        let trees = collect_tests(&root, &[root.join("tests/skip")]).expect("collection succeeds");
        assert_eq!(trees.len(), 1);
        assert!(trees[0].source_path().ends_with("test_a.py"));
    }

    #[test]
    fn single_file_and_error_paths() {
        let root = temp_dir("single");
        let module = root.join("test_one.py");
        write_file(&module, "def test_one():\n    pass\n");
        write_file(&root.join("notes.py"), "x = 1\n");

        assert_eq!(collect_tests(&module, &[]).expect("file").len(), 1);
        assert!(collect_tests(&root.join("notes.py"), &[])
            .expect("non-test file")
            .is_empty());

        let missing = collect_tests(&root.join("missing"), &[]).expect_err("missing path");
        assert!(matches!(missing, CollectorError::MissingPath { .. }));
        assert_eq!(BgError::from(missing).code, "COLLECT_PATH_MISSING");

        write_file(&root.join("test_bad.py"), "def test_bad(:\n");
        let error = collect_tests(&root, &[]).expect_err("syntax error");
        assert!(matches!(error, CollectorError::Parse { .. }));
        assert_eq!(BgError::from(error).code, "PYTHON_PARSE_ERROR");
    }
}
