//! Data models shared by the sync engine and its collaborators.

pub mod problem;
pub mod test_case;

pub use problem::{Limits, Problem, TestType};
pub use test_case::{RunStatus, TestCase};
