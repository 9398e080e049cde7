//! On-disk mirror of one problem's test cases.
//!
//! Every read and write of the problem directory goes through `ProblemSync`.
//! Writes issued here are remembered in `written_files` until the watcher
//! echoes them back, so [`ProblemSync::file_changed`] can tell our own writes
//! apart from edits made by the external test runner.

pub mod list_file;
mod reconcile;

use crate::kernel::services::bus::{SyncBusSender, SyncEvent};
use crate::kernel::services::ports::{Result, SyncConfig, SyncError, TestFileKind};
use crate::models::{Problem, TestCase};
use rustc_hash::FxHashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One row of the tests table: input, expected output, program output and
/// result columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRow {
    pub name: String,
    pub input: String,
    pub expected_output: String,
    pub program_output: String,
    pub result: String,
}

struct SyncState {
    problem: Problem,
    names: FxHashSet<String>,
    manual_index: usize,
    tests_are_running: bool,
    written_files: FxHashSet<String>,
    test_set_changed: bool,
}

impl SyncState {
    fn check_index(&self, index: usize) -> Result<()> {
        let len = self.problem.test_cases.len();
        if index < len {
            Ok(())
        } else {
            Err(SyncError::IndexOutOfRange { index, len })
        }
    }

    fn ensure_not_running(&self) -> Result<()> {
        if self.tests_are_running {
            Err(SyncError::TestsRunning)
        } else {
            Ok(())
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.problem
            .test_cases
            .iter()
            .position(|test_case| test_case.name() == name)
    }

    fn recompute_running(&mut self) {
        self.tests_are_running = self.problem.test_cases.iter().any(TestCase::is_running);
    }
}

pub struct ProblemSync {
    directory: PathBuf,
    config: Arc<SyncConfig>,
    bus: SyncBusSender,
    state: Mutex<SyncState>,
}

impl ProblemSync {
    pub fn new(
        workspace_root: &Path,
        mut problem: Problem,
        config: Arc<SyncConfig>,
        bus: SyncBusSender,
    ) -> Result<Self> {
        let directory = workspace_root.join(config.problem_directory(&problem)?);
        if problem.limits.time_limit.is_none() {
            problem.limits.time_limit = Some(config.default_time_limit);
        }
        if problem.checker_params.is_empty() {
            problem.checker_params = config.default_checker_params.clone();
        }

        let mut names = FxHashSet::default();
        for test_case in &problem.test_cases {
            if !names.insert(test_case.name().to_string()) {
                return Err(SyncError::DuplicateTestCase(test_case.name().to_string()));
            }
        }
        let mut state = SyncState {
            problem,
            names,
            manual_index: 1,
            tests_are_running: false,
            written_files: FxHashSet::default(),
            test_set_changed: true,
        };
        state.recompute_running();

        Ok(Self {
            directory,
            config,
            bus,
            state: Mutex::new(state),
        })
    }

    /// Creates the directory, materializes in-memory tests, adopts test cases
    /// found on disk and rewrites the list file from the merged set.
    ///
    /// Runs before the directory is watched, so its writes are not tracked as
    /// pending self-writes.
    pub fn initialize(&self) -> Result<()> {
        let mut state = self.lock();
        std::fs::create_dir_all(&self.directory).map_err(|e| SyncError::io(&self.directory, e))?;

        for index in 0..state.problem.test_cases.len() {
            self.materialize(&mut state, index)?;
        }

        let listed = self
            .read_optional(&self.config.test_list_file)?
            .map(|content| list_file::parse(&content))
            .unwrap_or_default();
        let mut discovered = self.discover_unknown(&state)?;
        discovered.sort_by_key(|name| {
            let listed_at = listed
                .iter()
                .position(|entry| &entry.name == name)
                .unwrap_or(usize::MAX);
            (listed_at, name.clone())
        });

        for name in discovered {
            let mut test_case = self.read_test_case(&mut state, &name)?;
            if let Some(entry) = listed.iter().find(|entry| entry.name == name) {
                test_case.set_run_status(entry.status.clone());
            }
            tracing::info!(dir = %self.directory.display(), test = %name, "adopted test case from disk");
            state.names.insert(name);
            state.problem.test_cases.push(test_case);
        }

        self.write_list_file(&mut state)?;
        state.recompute_running();
        state.written_files.clear();
        Ok(())
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Snapshot of the wrapped problem.
    pub fn problem(&self) -> Problem {
        self.lock().problem.clone()
    }

    pub fn test_count(&self) -> usize {
        self.lock().problem.test_cases.len()
    }

    pub fn test_case(&self, index: usize) -> Result<TestCase> {
        let state = self.lock();
        state.check_index(index)?;
        Ok(state.problem.test_cases[index].clone())
    }

    pub fn tests_are_running(&self) -> bool {
        self.lock().tests_are_running
    }

    pub fn table_rows(&self) -> Vec<TestRow> {
        self.lock()
            .problem
            .test_cases
            .iter()
            .map(|test_case| TestRow {
                name: test_case.name().to_string(),
                input: test_case.input().to_string(),
                expected_output: test_case.expected_output().to_string(),
                program_output: test_case.program_output().to_string(),
                result: test_case.status_column().to_string(),
            })
            .collect()
    }

    pub fn next_test_name(&self) -> String {
        let mut state = self.lock();
        loop {
            let candidate = format!("{}{}", self.config.manual_test_prefix, state.manual_index);
            if !state.names.contains(&candidate) {
                return candidate;
            }
            state.manual_index += 1;
        }
    }

    pub fn add_test_case(&self, test_case: TestCase, create_files: bool) -> Result<usize> {
        let mut state = self.lock();
        state.ensure_not_running()?;
        if state.names.contains(test_case.name()) {
            return Err(SyncError::DuplicateTestCase(test_case.name().to_string()));
        }

        let index = state.problem.test_cases.len();
        state.names.insert(test_case.name().to_string());
        state.problem.test_cases.push(test_case);
        state.test_set_changed = true;
        if create_files {
            self.materialize(&mut state, index)?;
        }
        self.write_list_file(&mut state)?;
        self.notify(SyncEvent::TestCaseAdded {
            problem: self.directory.clone(),
            index,
        });
        Ok(index)
    }

    /// Applies in-memory edits through the test case setters. Nothing is
    /// written until the matching `*_changed` or [`Self::flush_test_case`].
    pub fn edit_test_case<R>(&self, index: usize, edit: impl FnOnce(&mut TestCase) -> R) -> Result<R> {
        let mut state = self.lock();
        state.check_index(index)?;
        let result = edit(&mut state.problem.test_cases[index]);
        self.notify_updated(index);
        Ok(result)
    }

    pub fn test_input_changed(&self, index: usize) -> Result<()> {
        let mut state = self.lock();
        state.check_index(index)?;
        self.persist_input(&mut state, index)?;
        self.notify_updated(index);
        Ok(())
    }

    pub fn test_answer_changed(&self, index: usize) -> Result<()> {
        let mut state = self.lock();
        state.check_index(index)?;
        self.persist_expected(&mut state, index)?;
        self.notify_updated(index);
        Ok(())
    }

    /// Persists whichever fields carry a dirty flag.
    pub fn flush_test_case(&self, index: usize) -> Result<()> {
        let mut state = self.lock();
        state.check_index(index)?;
        let test_case = &state.problem.test_cases[index];
        let (input_dirty, expected_dirty) = (test_case.input_dirty(), test_case.expected_dirty());
        if input_dirty {
            self.persist_input(&mut state, index)?;
        }
        if expected_dirty {
            self.persist_expected(&mut state, index)?;
        }
        if input_dirty || expected_dirty {
            self.notify_updated(index);
        }
        Ok(())
    }

    /// Accepts the program output as the expected answer.
    pub fn set_test_solved(&self, index: usize) -> Result<()> {
        let mut state = self.lock();
        state.check_index(index)?;
        state.problem.test_cases[index].set_solved(true);
        self.persist_expected(&mut state, index)?;
        self.notify_updated(index);
        Ok(())
    }

    pub fn flip_test_skipped(&self, index: usize) -> Result<()> {
        let mut state = self.lock();
        state.ensure_not_running()?;
        state.check_index(index)?;
        state.problem.test_cases[index].flip_skipped();
        self.write_list_file(&mut state)?;
        self.notify_updated(index);
        Ok(())
    }

    pub fn swap_test_cases(&self, first: usize, second: usize) -> Result<()> {
        let mut state = self.lock();
        state.ensure_not_running()?;
        state.check_index(first)?;
        state.check_index(second)?;
        state.problem.test_cases.swap(first, second);
        self.write_list_file(&mut state)?;
        self.notify(SyncEvent::TestCasesSwapped {
            problem: self.directory.clone(),
            first,
            second,
        });
        Ok(())
    }

    pub fn delete_test_case(&self, index: usize) -> Result<()> {
        let mut state = self.lock();
        state.ensure_not_running()?;
        state.check_index(index)?;

        let name = state.problem.test_cases[index].name().to_string();
        for kind in TestFileKind::ALL {
            self.remove_file(&mut state, &self.config.test_file_name(&name, kind))?;
        }
        state.names.remove(&name);
        state.problem.test_cases.remove(index);
        state.test_set_changed = true;
        self.write_list_file(&mut state)?;
        self.notify(SyncEvent::TestCaseDeleted {
            problem: self.directory.clone(),
            index,
        });
        Ok(())
    }

    /// Whether the test set changed since the last [`Self::mark_unchanged`].
    pub fn regeneration_required(&self) -> bool {
        self.lock().test_set_changed
    }

    pub fn mark_unchanged(&self) {
        self.lock().test_set_changed = false;
    }

    /// Removes the whole problem directory. The caller is expected to have
    /// stopped watching it.
    pub fn delete_from_disk(&self) -> Result<()> {
        let _state = self.lock();
        match std::fs::remove_dir_all(&self.directory) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SyncError::io(&self.directory, e)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SyncState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, event: SyncEvent) {
        self.bus.send(event);
    }

    fn notify_updated(&self, index: usize) {
        self.notify(SyncEvent::TestCaseUpdated {
            problem: self.directory.clone(),
            index,
        });
    }

    /// Writes input and expected output from memory and makes sure the
    /// program output file exists.
    fn materialize(&self, state: &mut SyncState, index: usize) -> Result<()> {
        self.persist_input(state, index)?;
        self.persist_expected(state, index)?;
        let name = state.problem.test_cases[index].name().to_string();
        let program = self.config.test_file_name(&name, TestFileKind::ProgramOutput);
        if !self.directory.join(&program).exists() {
            let content = state.problem.test_cases[index].program_output().to_string();
            self.write_file(state, &program, &content)?;
        }
        Ok(())
    }

    fn persist_input(&self, state: &mut SyncState, index: usize) -> Result<()> {
        let test_case = &state.problem.test_cases[index];
        let file = self.config.test_file_name(test_case.name(), TestFileKind::Input);
        let content = test_case.input().to_string();
        self.write_file(state, &file, &content)?;
        state.problem.test_cases[index].mark_input_persisted();
        Ok(())
    }

    /// A solved test copies the program output file over the expected output
    /// file; memory follows what was copied.
    fn persist_expected(&self, state: &mut SyncState, index: usize) -> Result<()> {
        let test_case = &state.problem.test_cases[index];
        let name = test_case.name().to_string();
        let expected = self.config.test_file_name(&name, TestFileKind::ExpectedOutput);
        if test_case.is_solved() {
            let program = self.config.test_file_name(&name, TestFileKind::ProgramOutput);
            let content = match self.read_optional(&program)? {
                Some(content) => content,
                None => test_case.program_output().to_string(),
            };
            self.write_file(state, &expected, &content)?;
            state.problem.test_cases[index].load_program_output(content);
        } else {
            let content = test_case.expected_output().to_string();
            self.write_file(state, &expected, &content)?;
        }
        state.problem.test_cases[index].mark_expected_persisted();
        Ok(())
    }

    fn write_list_file(&self, state: &mut SyncState) -> Result<()> {
        let content = list_file::render(&state.problem.test_cases);
        let file = self.config.test_list_file.clone();
        self.write_file(state, &file, &content)
    }

    /// Records the self-write before issuing it. A failed write produces no
    /// echo, so the record is dropped again.
    fn write_file(&self, state: &mut SyncState, file_name: &str, content: &str) -> Result<()> {
        let path = self.directory.join(file_name);
        state.written_files.insert(file_name.to_string());
        if let Err(e) = std::fs::write(&path, content) {
            state.written_files.remove(file_name);
            return Err(SyncError::io(path, e));
        }
        Ok(())
    }

    fn remove_file(&self, state: &mut SyncState, file_name: &str) -> Result<()> {
        let path = self.directory.join(file_name);
        state.written_files.insert(file_name.to_string());
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) => {
                state.written_files.remove(file_name);
                if e.kind() == io::ErrorKind::NotFound {
                    Ok(())
                } else {
                    Err(SyncError::io(path, e))
                }
            }
        }
    }

    fn read_optional(&self, file_name: &str) -> Result<Option<String>> {
        let path = self.directory.join(file_name);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SyncError::io(path, e)),
        }
    }

    /// Reads a sibling file, creating it empty if it is missing.
    fn read_or_create(&self, state: &mut SyncState, file_name: &str) -> Result<String> {
        match self.read_optional(file_name)? {
            Some(content) => Ok(content),
            None => {
                self.write_file(state, file_name, "")?;
                Ok(String::new())
            }
        }
    }

    fn read_test_case(&self, state: &mut SyncState, name: &str) -> Result<TestCase> {
        let mut test_case = TestCase::new(name);
        let input = self.read_or_create(state, &self.config.test_file_name(name, TestFileKind::Input))?;
        let expected =
            self.read_or_create(state, &self.config.test_file_name(name, TestFileKind::ExpectedOutput))?;
        let program =
            self.read_or_create(state, &self.config.test_file_name(name, TestFileKind::ProgramOutput))?;
        test_case.load_input(input);
        test_case.load_expected_output(expected);
        test_case.load_program_output(program);
        Ok(test_case)
    }

    fn discover_unknown(&self, state: &SyncState) -> Result<Vec<String>> {
        let entries =
            std::fs::read_dir(&self.directory).map_err(|e| SyncError::io(&self.directory, e))?;
        let mut names = Vec::new();
        for entry in entries.flatten() {
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if let Some((name, TestFileKind::Input)) = self.config.classify(&file_name) {
                if !state.names.contains(&name) {
                    names.push(name);
                }
            }
        }
        Ok(names)
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/problem_sync.rs"]
mod tests;
