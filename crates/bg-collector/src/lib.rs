mod module;
mod walk;

pub use module::{module_dotted_path, module_tree, PackageInfo};
pub use walk::{collect_tests, is_test_module};

use std::path::PathBuf;

use bg_core::BgError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("Source path {path} does not exist.")]
    MissingPath { path: PathBuf },
    #[error("Failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse { path: PathBuf, source: BgError },
    #[error("Failed to build scopes for {path}: {source}")]
    Scope { path: PathBuf, source: BgError },
}

impl From<CollectorError> for BgError {
    fn from(error: CollectorError) -> Self {
        let code = match &error {
            CollectorError::MissingPath { .. } => "COLLECT_PATH_MISSING".to_string(),
            CollectorError::ReadFile { .. } => "COLLECT_READ_ERROR".to_string(),
            CollectorError::Parse { source, .. } | CollectorError::Scope { source, .. } => {
                source.code.clone()
            }
        };
        BgError::new(code, error.to_string())
    }
}
