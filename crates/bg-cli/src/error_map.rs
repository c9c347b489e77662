use bg_core::BgError;
use std::fmt::Display;
use std::path::Path;

fn map_error(code: &'static str, error: impl Display) -> BgError {
    BgError::new(code, error.to_string())
}

pub(crate) fn emit_error(error: BgError) -> i32 {
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code);
    println!(
        "ERROR_MSG_JSON:{}",
        serde_json::to_string(&error.message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
    );
    1
}

pub(crate) fn map_cli_junit_read(path: &Path, error: std::io::Error) -> BgError {
    map_error(
        "CLI_JUNIT_READ",
        format!("Failed to read jUnit report \"{}\": {}", path.display(), error),
    )
}

pub(crate) fn map_cli_output_write(path: &Path, error: std::io::Error) -> BgError {
    map_error(
        "CLI_OUTPUT_WRITE",
        format!("Failed to write \"{}\": {}", path.display(), error),
    )
}

pub(crate) fn map_cli_json(error: serde_json::Error) -> BgError {
    map_error("CLI_JSON", error)
}

#[cfg(test)]
mod error_map_tests {
    use super::*;

    #[test]
    fn emit_error_returns_non_zero_exit_code() {
        let code = emit_error(BgError::new("ERR", "failed"));
        assert_eq!(code, 1);
    }

    #[test]
    fn mapping_helpers_keep_error_codes() {
        let path = Path::new("out/testcases.xml");
        let read = map_cli_junit_read(path, std::io::Error::other("read"));
        assert_eq!(read.code, "CLI_JUNIT_READ");
        assert!(read.message.contains("out/testcases.xml"));

        assert_eq!(
            map_cli_output_write(path, std::io::Error::other("write")).code,
            "CLI_OUTPUT_WRITE"
        );

        let invalid = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json");
        assert_eq!(map_cli_json(invalid).code, "CLI_JSON");
    }
}
