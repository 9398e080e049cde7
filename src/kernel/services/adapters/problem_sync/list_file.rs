//! Test list file codec: one `<name> <status...>` line per test case, in list
//! order.

use crate::models::{RunStatus, TestCase};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub name: String,
    pub status: RunStatus,
}

pub fn render(test_cases: &[TestCase]) -> String {
    let mut out = String::new();
    for test_case in test_cases {
        out.push_str(&test_case.list_line());
        out.push('\n');
    }
    out
}

/// Blank lines are skipped; everything after the first space is the status
/// column.
pub fn parse(content: &str) -> Vec<ListEntry> {
    content
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let (name, status) = line.split_once(' ').unwrap_or((line, ""));
            ListEntry {
                name: name.to_string(),
                status: RunStatus::parse(status),
            }
        })
        .collect()
}

/// Positional agreement with the in-memory list. A file that disagrees in
/// length or in any name is unreliable as a whole.
pub fn matches_order(entries: &[ListEntry], test_cases: &[TestCase]) -> bool {
    entries.len() == test_cases.len()
        && entries
            .iter()
            .zip(test_cases)
            .all(|(entry, test_case)| entry.name == test_case.name())
}
