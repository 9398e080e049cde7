//! Problem definition: metadata, limits and the ordered test case list.

use super::test_case::TestCase;
use serde::{Deserialize, Serialize};

/// How the program consumes its input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    #[default]
    Single,
    MultiNumber,
    MultiEof,
}

/// Unset limits are filled from the workspace configuration when the problem
/// is opened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    /// Seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<f64>,
    /// Megabytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_limit: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub contest: String,
    #[serde(default)]
    pub limits: Limits,
    /// Empty means standard input.
    #[serde(default)]
    pub input_file: String,
    /// Empty means standard output.
    #[serde(default)]
    pub output_file: String,
    #[serde(default)]
    pub test_type: TestType,
    #[serde(default)]
    pub interactive: bool,
    #[serde(default)]
    pub custom_checker: bool,
    #[serde(default)]
    pub checker_params: String,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
}

impl Problem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        platform: impl Into<String>,
        contest: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            platform: platform.into(),
            contest: contest.into(),
            ..Self::default()
        }
    }

    /// Attaches parsed sample tests, naming them `<prefix>1`, `<prefix>2`, ...
    pub fn with_samples<I, S>(mut self, prefix: &str, samples: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        for (i, (input, output)) in samples.into_iter().enumerate() {
            self.test_cases
                .push(TestCase::with_io(format!("{prefix}{}", i + 1), input, output));
        }
        self
    }

    pub fn full_name(&self) -> String {
        let name = if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        };
        format!("{} {}", self.contest, name)
    }

    pub fn test_case(&self, index: usize) -> Option<&TestCase> {
        self.test_cases.get(index)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/problem.rs"]
mod tests;
