use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Debug)]
pub enum SyncError {
    Io { path: PathBuf, source: io::Error },
    /// Structural mutation attempted while the external runner reports a
    /// running test.
    TestsRunning,
    DuplicateProblem(PathBuf),
    DuplicateTestCase(String),
    IndexOutOfRange { index: usize, len: usize },
    Config(String),
    Watch(notify::Error),
}

impl SyncError {
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        SyncError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }

    /// Whether the operation was refused before touching any state.
    pub fn is_structural_conflict(&self) -> bool {
        matches!(
            self,
            SyncError::TestsRunning
                | SyncError::DuplicateProblem(_)
                | SyncError::DuplicateTestCase(_)
        )
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            SyncError::TestsRunning => {
                write!(f, "cannot change the test set while testing is in progress")
            }
            SyncError::DuplicateProblem(p) => {
                write!(f, "problem with such directory already exists: {}", p.display())
            }
            SyncError::DuplicateTestCase(name) => {
                write!(f, "test case with such name already exists: {}", name)
            }
            SyncError::IndexOutOfRange { index, len } => {
                write!(f, "test case index {} out of range ({} test cases)", index, len)
            }
            SyncError::Config(msg) => write!(f, "invalid configuration: {}", msg),
            SyncError::Watch(e) => write!(f, "watch error: {}", e),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Io { source, .. } => Some(source),
            SyncError::Watch(e) => Some(e),
            _ => None,
        }
    }
}

impl From<notify::Error> for SyncError {
    fn from(e: notify::Error) -> Self {
        SyncError::Watch(e)
    }
}
