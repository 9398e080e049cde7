//! probsync - keeps competitive programming problems and their test cases in
//! sync with a directory tree shared with an external test runner.
//!
//! Module layout:
//! - models: data models (Problem, TestCase)
//! - kernel: sync engine (ProblemSync, WorkspaceManager, config, events)

pub mod kernel;
pub mod models;
