use super::{list_file, ProblemSync, SyncState};
use crate::kernel::services::bus::SyncEvent;
use crate::kernel::services::ports::{FsEventKind, TestFileKind};

impl ProblemSync {
    /// Reconciles one watcher event for `file_name` inside the problem
    /// directory.
    ///
    /// Returns `true` when the event changed in-memory state or caused a
    /// repairing write, so callers can gate follow-up work on it.
    pub fn file_changed(&self, kind: FsEventKind, file_name: &str) -> bool {
        let mut state = self.lock();

        if state.written_files.remove(file_name) {
            tracing::trace!(dir = %self.directory.display(), file = file_name, ?kind, "own write echoed");
            return false;
        }

        if file_name == self.config.test_list_file {
            return self.list_file_changed(&mut state, kind);
        }

        let Some((name, file_kind)) = self.config.classify(file_name) else {
            return false;
        };

        match (state.position(&name), kind) {
            (None, FsEventKind::Created) if file_kind == TestFileKind::Input => {
                self.adopt_test_case(&mut state, name)
            }
            (None, _) => false,
            (Some(_), FsEventKind::Created) => false,
            (Some(index), FsEventKind::Modified) => self.reload_field(&mut state, index, file_kind),
            (Some(index), FsEventKind::Deleted) => match file_kind {
                TestFileKind::Input => self.forget_test_case(&mut state, index),
                _ => self.restore_missing(&mut state, index, file_kind),
            },
        }
    }

    fn list_file_changed(&self, state: &mut SyncState, kind: FsEventKind) -> bool {
        match kind {
            FsEventKind::Created => false,
            FsEventKind::Deleted => {
                if let Err(e) = self.write_list_file(state) {
                    tracing::warn!(dir = %self.directory.display(), error = %e, "restore test list failed");
                    return false;
                }
                true
            }
            FsEventKind::Modified => {
                let content = match self.read_optional(&self.config.test_list_file) {
                    Ok(Some(content)) => content,
                    Ok(None) => return false,
                    Err(e) => {
                        tracing::warn!(error = %e, "read test list failed");
                        return false;
                    }
                };
                let entries = list_file::parse(&content);
                if !list_file::matches_order(&entries, &state.problem.test_cases) {
                    tracing::debug!(
                        dir = %self.directory.display(),
                        lines = entries.len(),
                        tests = state.problem.test_cases.len(),
                        "test list disagrees with memory, ignored"
                    );
                    return false;
                }

                let mut changed = false;
                for (entry, test_case) in entries.into_iter().zip(state.problem.test_cases.iter_mut()) {
                    changed |= test_case.apply_list_status(entry.status);
                }
                let was_running = state.tests_are_running;
                state.recompute_running();
                if !changed && was_running == state.tests_are_running {
                    return false;
                }
                self.notify(SyncEvent::StatusesUpdated {
                    problem: self.directory.clone(),
                    running: state.tests_are_running,
                });
                true
            }
        }
    }

    fn adopt_test_case(&self, state: &mut SyncState, name: String) -> bool {
        let input = self.config.test_file_name(&name, TestFileKind::Input);
        if !self.directory.join(&input).is_file() {
            return false;
        }
        let test_case = match self.read_test_case(state, &name) {
            Ok(test_case) => test_case,
            Err(e) => {
                tracing::warn!(test = %name, error = %e, "adopt test case failed");
                return false;
            }
        };

        tracing::info!(dir = %self.directory.display(), test = %name, "external test case added");
        let index = state.problem.test_cases.len();
        state.names.insert(name);
        state.problem.test_cases.push(test_case);
        state.test_set_changed = true;
        if let Err(e) = self.write_list_file(state) {
            tracing::warn!(error = %e, "write test list failed");
        }
        self.notify(SyncEvent::TestCaseAdded {
            problem: self.directory.clone(),
            index,
        });
        true
    }

    fn reload_field(&self, state: &mut SyncState, index: usize, kind: TestFileKind) -> bool {
        let test_case = &state.problem.test_cases[index];
        let file = self.config.test_file_name(test_case.name(), kind);
        let content = match self.read_optional(&file) {
            Ok(Some(content)) => content,
            // Already gone; the delete event follows.
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!(file = %file, error = %e, "reload test file failed");
                return false;
            }
        };

        let test_case = &mut state.problem.test_cases[index];
        let current = match kind {
            TestFileKind::Input => test_case.input(),
            TestFileKind::ExpectedOutput => test_case.raw_expected_output(),
            TestFileKind::ProgramOutput => test_case.program_output(),
        };
        if current == content {
            return false;
        }
        match kind {
            TestFileKind::Input => test_case.load_input(content),
            TestFileKind::ExpectedOutput => test_case.load_expected_output(content),
            TestFileKind::ProgramOutput => test_case.load_program_output(content),
        }
        self.notify_updated(index);
        true
    }

    /// The input file is gone: the test case goes with it. Sibling files are
    /// left to whoever is deleting them.
    fn forget_test_case(&self, state: &mut SyncState, index: usize) -> bool {
        let test_case = state.problem.test_cases.remove(index);
        state.names.remove(test_case.name());
        state.test_set_changed = true;
        state.recompute_running();
        tracing::info!(dir = %self.directory.display(), test = %test_case.name(), "external test case removed");
        if let Err(e) = self.write_list_file(state) {
            tracing::warn!(error = %e, "write test list failed");
        }
        self.notify(SyncEvent::TestCaseDeleted {
            problem: self.directory.clone(),
            index,
        });
        true
    }

    fn restore_missing(&self, state: &mut SyncState, index: usize, kind: TestFileKind) -> bool {
        let test_case = &mut state.problem.test_cases[index];
        match kind {
            TestFileKind::ExpectedOutput => test_case.load_expected_output(String::new()),
            TestFileKind::ProgramOutput => test_case.load_program_output(String::new()),
            TestFileKind::Input => test_case.load_input(String::new()),
        }
        let file = self.config.test_file_name(test_case.name(), kind);
        if let Err(e) = self.write_file(state, &file, "") {
            if e.is_not_found() {
                tracing::debug!(file = %file, "problem directory gone, not restoring");
            } else {
                tracing::warn!(file = %file, error = %e, "restore test file failed");
            }
        }
        self.notify_updated(index);
        true
    }
}
