use std::path::PathBuf;

pub fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

pub fn demos_root() -> PathBuf {
    workspace_root().join("demos")
}

/// The Python project the CLI smoke tests run against.
pub fn sample_project_dir() -> PathBuf {
    demos_root().join("sample_project")
}

pub fn sample_tests_dir() -> PathBuf {
    sample_project_dir().join("tests")
}

pub fn junit_report_path() -> PathBuf {
    sample_project_dir().join("junit-results.xml")
}

pub fn config_file_path() -> PathBuf {
    sample_project_dir().join("betelgeuse.json")
}
