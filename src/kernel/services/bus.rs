use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

/// Change notifications for observers of a problem's test set. `problem` is
/// the problem directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    TestCaseAdded {
        problem: PathBuf,
        index: usize,
    },
    TestCaseUpdated {
        problem: PathBuf,
        index: usize,
    },
    TestCaseDeleted {
        problem: PathBuf,
        index: usize,
    },
    TestCasesSwapped {
        problem: PathBuf,
        first: usize,
        second: usize,
    },
    StatusesUpdated {
        problem: PathBuf,
        running: bool,
    },
}

#[derive(Clone, Default)]
pub struct SyncBusSender {
    tx: Option<Sender<SyncEvent>>,
}

pub struct SyncBusReceiver {
    rx: Receiver<SyncEvent>,
}

pub fn sync_bus() -> (SyncBusSender, SyncBusReceiver) {
    let (tx, rx) = mpsc::channel();
    (SyncBusSender { tx: Some(tx) }, SyncBusReceiver { rx })
}

impl SyncBusSender {
    /// A sender nobody listens to.
    pub fn detached() -> Self {
        Self { tx: None }
    }

    pub fn send(&self, event: SyncEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}

impl SyncBusReceiver {
    pub fn try_recv(&mut self) -> Result<SyncEvent, TryRecvError> {
        self.rx.try_recv()
    }

    pub fn recv_timeout(&mut self, timeout: Duration) -> Result<SyncEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    pub fn drain(&mut self) -> Vec<SyncEvent> {
        self.rx.try_iter().collect()
    }
}
