use bg_core::{BgError, ResolvedTestCase, Warning};

use crate::map_cli_json;

/// Successful command outcome, printed as the `RESULT:OK` protocol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CommandOutput {
    pub(crate) warnings: Vec<Warning>,
    /// Lines printed after the warnings, already prefixed.
    pub(crate) lines: Vec<String>,
}

impl CommandOutput {
    pub(crate) fn new(warnings: Vec<Warning>) -> Self {
        Self {
            warnings,
            lines: Vec::new(),
        }
    }

    pub(crate) fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    pub(crate) fn testcase_lines(mut self, testcases: &[ResolvedTestCase]) -> Result<Self, BgError> {
        for testcase in testcases {
            let json = serde_json::to_string(testcase).map_err(map_cli_json)?;
            self.lines.push(format!("TESTCASE_JSON:{}", json));
        }
        Ok(self)
    }

    pub(crate) fn render(&self) -> Vec<String> {
        let mut rendered = Vec::with_capacity(self.warnings.len() + self.lines.len() + 1);
        rendered.push("RESULT:OK".to_string());
        for warning in &self.warnings {
            rendered.push(format!(
                "WARNING_JSON:{}",
                serde_json::to_string(warning).unwrap_or_else(|_| "null".to_string())
            ));
        }
        rendered.extend(self.lines.iter().cloned());
        rendered
    }
}

pub(crate) fn emit_output(output: CommandOutput) -> i32 {
    for line in output.render() {
        println!("{}", line);
    }
    0
}

/// `passed` becomes `Passed`.
pub(crate) fn title_case(status: &str) -> String {
    let mut chars = status.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
