//! Test case value state.
//!
//! A test case is one (input, expected output, program output, status) tuple
//! identified by a name that is unique within its problem.

use serde::{Deserialize, Serialize};
use std::fmt;

const UNKNOWN_KEY: &str = "UNKNOWN";
const PENDING_KEY: &str = "PENDING";
const RUNNING_KEY: &str = "RUNNING";
const SKIPPED_KEY: &str = "SKIPPED";

/// Execution status as written in the status column of the test list file.
///
/// Only the runner's scheduling tokens are interpreted; verdicts such as
/// `PASSED` or `WA 0.12s` are kept verbatim in [`RunStatus::Other`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    #[default]
    Unknown,
    Pending,
    Running,
    Skipped,
    Other(String),
}

impl RunStatus {
    pub fn parse(column: &str) -> Self {
        match column.trim() {
            "" | UNKNOWN_KEY => Self::Unknown,
            PENDING_KEY => Self::Pending,
            RUNNING_KEY => Self::Running,
            SKIPPED_KEY => Self::Skipped,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Unknown => UNKNOWN_KEY,
            Self::Pending => PENDING_KEY,
            Self::Running => RUNNING_KEY,
            Self::Skipped => SKIPPED_KEY,
            Self::Other(token) => token,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    name: String,
    #[serde(default)]
    input: String,
    #[serde(default)]
    expected_output: String,
    #[serde(default)]
    program_output: String,
    #[serde(default)]
    skipped: bool,
    #[serde(default)]
    solved: bool,
    #[serde(default)]
    run_status: RunStatus,
    #[serde(skip)]
    input_dirty: bool,
    #[serde(skip)]
    expected_dirty: bool,
}

impl TestCase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_io(
        name: impl Into<String>,
        input: impl Into<String>,
        expected_output: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            input: input.into(),
            expected_output: expected_output.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Expected output as seen by readers. While the test is marked solved the
    /// program output stands in for it.
    pub fn expected_output(&self) -> &str {
        if self.solved {
            &self.program_output
        } else {
            &self.expected_output
        }
    }

    /// Expected output as stored, ignoring the solved override.
    pub(crate) fn raw_expected_output(&self) -> &str {
        &self.expected_output
    }

    pub fn program_output(&self) -> &str {
        &self.program_output
    }

    pub fn run_status(&self) -> &RunStatus {
        &self.run_status
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    pub fn is_running(&self) -> bool {
        self.run_status.is_running()
    }

    pub fn input_dirty(&self) -> bool {
        self.input_dirty
    }

    pub fn expected_dirty(&self) -> bool {
        self.expected_dirty
    }

    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input = value.into();
        self.input_dirty = true;
    }

    pub fn set_expected_output(&mut self, value: impl Into<String>) {
        self.expected_output = value.into();
        self.solved = false;
        self.expected_dirty = true;
    }

    pub fn set_solved(&mut self, solved: bool) {
        self.solved = solved;
        self.expected_dirty = true;
    }

    pub fn set_run_status(&mut self, status: RunStatus) {
        if status == RunStatus::Skipped {
            self.skipped = true;
        }
        self.run_status = status;
    }

    pub fn set_skipped(&mut self, skipped: bool) {
        if self.skipped && !skipped && self.run_status == RunStatus::Skipped {
            self.run_status = RunStatus::Unknown;
        }
        self.skipped = skipped;
    }

    pub fn flip_skipped(&mut self) {
        self.set_skipped(!self.skipped);
    }

    /// Status column persisted in the test list file.
    pub fn status_column(&self) -> &str {
        if self.skipped {
            SKIPPED_KEY
        } else {
            self.run_status.as_str()
        }
    }

    /// `<name> <status>` line of the test list file, without the newline.
    pub fn list_line(&self) -> String {
        format!("{} {}", self.name, self.status_column())
    }

    // Loaders push content observed on disk. They never mark anything dirty.

    pub(crate) fn load_input(&mut self, value: String) {
        self.input = value;
    }

    /// Content observed on disk replaces the answer, so a pending solved copy
    /// is dropped with it.
    pub(crate) fn load_expected_output(&mut self, value: String) {
        self.expected_output = value;
        self.solved = false;
    }

    pub(crate) fn load_program_output(&mut self, value: String) {
        self.program_output = value;
    }

    /// Applies a status token read back from the test list file. The skip flag
    /// follows the token both ways. A token equal to `status_column` is our own
    /// line and changes nothing.
    pub(crate) fn apply_list_status(&mut self, status: RunStatus) -> bool {
        if status.as_str() == self.status_column() {
            return false;
        }
        self.skipped = status == RunStatus::Skipped;
        self.run_status = status;
        true
    }

    pub(crate) fn mark_input_persisted(&mut self) {
        self.input_dirty = false;
    }

    /// Settles the expected output after it has been written to disk. A solved
    /// test adopts its program output and drops the flag.
    pub(crate) fn mark_expected_persisted(&mut self) {
        if self.solved {
            self.expected_output = self.program_output.clone();
            self.solved = false;
        }
        self.expected_dirty = false;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/test_case.rs"]
mod tests;
