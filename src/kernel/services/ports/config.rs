//! Workspace configuration contract.
//!
//! Built once per workspace and handed to every `ProblemSync` explicitly.

use super::error::{Result, SyncError};
use crate::models::Problem;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub test_list_file: String,
    pub input_extension: String,
    pub expected_output_extension: String,
    pub program_output_extension: String,
    pub manual_test_prefix: String,
    pub sample_test_prefix: String,
    /// Relative to the workspace root. `%key%` placeholders are substituted
    /// with problem metadata.
    pub problem_directory: String,
    pub default_time_limit: f64,
    pub default_checker_params: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            test_list_file: "tests".to_string(),
            input_extension: "in".to_string(),
            expected_output_extension: "ans".to_string(),
            program_output_extension: "out".to_string(),
            manual_test_prefix: "manual".to_string(),
            sample_test_prefix: "sample".to_string(),
            problem_directory: "%platform_id%/%problem_id%".to_string(),
            default_time_limit: 2.0,
            default_checker_params: String::new(),
        }
    }
}

/// Which member of a test case's file triple a file is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestFileKind {
    Input,
    ExpectedOutput,
    ProgramOutput,
}

impl TestFileKind {
    pub const ALL: [TestFileKind; 3] = [
        TestFileKind::Input,
        TestFileKind::ExpectedOutput,
        TestFileKind::ProgramOutput,
    ];
}

impl SyncConfig {
    pub fn extension(&self, kind: TestFileKind) -> &str {
        match kind {
            TestFileKind::Input => &self.input_extension,
            TestFileKind::ExpectedOutput => &self.expected_output_extension,
            TestFileKind::ProgramOutput => &self.program_output_extension,
        }
    }

    pub fn test_file_name(&self, test_name: &str, kind: TestFileKind) -> String {
        format!("{test_name}.{}", self.extension(kind))
    }

    /// Splits `<name>.<ext>` into the test name and the triple member it
    /// belongs to. Files with any other suffix are not test files.
    pub fn classify(&self, file_name: &str) -> Option<(String, TestFileKind)> {
        TestFileKind::ALL.into_iter().find_map(|kind| {
            let stem = file_name.strip_suffix(self.extension(kind))?.strip_suffix('.')?;
            (!stem.is_empty()).then(|| (stem.to_string(), kind))
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.test_list_file.is_empty() {
            return Err(SyncError::Config("test list file name is empty".to_string()));
        }
        let extensions = [
            &self.input_extension,
            &self.expected_output_extension,
            &self.program_output_extension,
        ];
        if extensions.iter().any(|ext| ext.is_empty()) {
            return Err(SyncError::Config("test file extensions must not be empty".to_string()));
        }
        for (i, a) in extensions.iter().enumerate() {
            if extensions[i + 1..].contains(a) {
                return Err(SyncError::Config(format!("duplicate test file extension: {a}")));
            }
        }
        if self.classify(&self.test_list_file).is_some() {
            return Err(SyncError::Config(format!(
                "test list file {} collides with a test file extension",
                self.test_list_file
            )));
        }
        Ok(())
    }

    /// Resolves the problem directory pattern, relative to the workspace root.
    pub fn problem_directory(&self, problem: &Problem) -> Result<PathBuf> {
        if self.problem_directory.split('%').count() % 2 == 0 {
            return Err(SyncError::Config(format!(
                "unbalanced '%' in problem directory pattern: {}",
                self.problem_directory
            )));
        }
        let mut resolved = String::new();
        for (i, token) in self.problem_directory.split('%').enumerate() {
            if i % 2 == 0 {
                resolved.push_str(token);
                continue;
            }
            let value = match token {
                "platform_id" => &problem.platform,
                "problem_id" => &problem.id,
                "problem_name" => &problem.name,
                "contest_name" => &problem.contest,
                other => {
                    return Err(SyncError::Config(format!(
                        "unknown problem directory placeholder: %{other}%"
                    )))
                }
            };
            resolved.push_str(value);
        }
        let resolved = PathBuf::from(resolved);
        if resolved.as_os_str().is_empty() || resolved.is_absolute() {
            return Err(SyncError::Config(format!(
                "problem directory must be a relative path: {}",
                resolved.display()
            )));
        }
        Ok(resolved)
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/config.rs"]
mod tests;
