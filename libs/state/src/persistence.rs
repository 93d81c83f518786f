//! JSON snapshot persistence
//!
//! A background writer thread receives whole-map snapshots over a bounded
//! channel and commits each one to disk with a temp-file-then-rename. The
//! commit hot path never blocks on disk: a full queue drops the snapshot
//! with a warning, and the next snapshot covers it because every snapshot
//! serializes the complete map.

use crate::store::{InMemoryPoolStore, PoolStateStore};
use crate::StoreError;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, error, info, warn};
use types::{PoolId, PoolState};

/// Snapshots queued beyond this depth are dropped in favor of newer ones.
const SNAPSHOT_QUEUE_DEPTH: usize = 64;

enum WriterCommand {
    Snapshot(String),
    Flush(Sender<()>),
}

/// Background snapshot writer for one target file.
#[derive(Debug)]
pub struct SnapshotWriter {
    sender: Option<Sender<WriterCommand>>,
    handle: Option<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
    path: PathBuf,
}

impl SnapshotWriter {
    /// Start the writer thread for `path`, creating parent directories.
    pub fn spawn(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let (sender, receiver) = bounded(SNAPSHOT_QUEUE_DEPTH);
        let shutdown = Arc::new(AtomicBool::new(false));
        let writer_path = path.clone();
        let handle = std::thread::Builder::new()
            .name("snapshot-writer".to_string())
            .spawn(move || writer_loop(receiver, writer_path))?;

        info!(path = %path.display(), "snapshot writer started");
        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
            shutdown,
            path,
        })
    }

    /// Queue a snapshot payload; never blocks.
    pub fn submit(&self, payload: String) {
        if self.shutdown.load(Ordering::SeqCst) {
            return;
        }
        let Some(sender) = &self.sender else { return };
        match sender.try_send(WriterCommand::Snapshot(payload)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(path = %self.path.display(), "snapshot queue full, dropping snapshot");
            }
            Err(TrySendError::Disconnected(_)) => {
                error!(path = %self.path.display(), "snapshot writer is gone");
            }
        }
    }

    /// Block until every queued snapshot has reached disk.
    pub fn flush(&self) {
        let Some(sender) = &self.sender else { return };
        let (ack_sender, ack_receiver) = bounded(1);
        if sender.send(WriterCommand::Flush(ack_sender)).is_ok() {
            let _ = ack_receiver.recv();
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SnapshotWriter {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        // Closing the channel lets the writer drain what is queued and exit.
        drop(self.sender.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!(path = %self.path.display(), "snapshot writer panicked");
            }
        }
    }
}

fn writer_loop(receiver: Receiver<WriterCommand>, path: PathBuf) {
    let mut pending: Option<String> = None;
    while let Ok(command) = receiver.recv() {
        match command {
            WriterCommand::Snapshot(payload) => {
                pending = Some(payload);
                // Collapse a burst of snapshots into the newest one.
                while let Ok(next) = receiver.try_recv() {
                    match next {
                        WriterCommand::Snapshot(payload) => pending = Some(payload),
                        WriterCommand::Flush(ack) => {
                            write_pending(&path, &mut pending);
                            let _ = ack.send(());
                        }
                    }
                }
                write_pending(&path, &mut pending);
            }
            WriterCommand::Flush(ack) => {
                write_pending(&path, &mut pending);
                let _ = ack.send(());
            }
        }
    }
    write_pending(&path, &mut pending);
    debug!(path = %path.display(), "snapshot writer stopped");
}

fn write_pending(path: &Path, pending: &mut Option<String>) {
    if let Some(payload) = pending.take() {
        if let Err(error) = write_atomic(path, payload.as_bytes()) {
            error!(path = %path.display(), %error, "snapshot write failed");
        }
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("tmp");
    {
        let file = File::create(&tmp)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(bytes)?;
        writer.flush()?;
    }
    fs::rename(&tmp, path)
}

/// Pool store with JSON snapshot durability.
///
/// The in-memory map answers all reads (read-after-write consistency); the
/// snapshot file is replayed at open and rewritten in the background after
/// every mutation.
#[derive(Debug)]
pub struct PersistentPoolStore {
    inner: InMemoryPoolStore,
    writer: SnapshotWriter,
}

impl PersistentPoolStore {
    /// Open the store, loading any existing snapshot at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let inner = match fs::read_to_string(&path) {
            Ok(raw) => {
                let map: BTreeMap<String, PoolState> = serde_json::from_str(&raw)?;
                info!(path = %path.display(), pools = map.len(), "loaded pool snapshot");
                InMemoryPoolStore::from_states(map.into_values())
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no pool snapshot yet, starting empty");
                InMemoryPoolStore::new()
            }
            Err(error) => return Err(error.into()),
        };
        let writer = SnapshotWriter::spawn(path)?;
        Ok(Self { inner, writer })
    }

    /// Block until the latest snapshot has reached disk.
    pub fn flush(&self) {
        self.writer.flush();
    }

    fn schedule_snapshot(&self) {
        match serialize_pools(&self.inner) {
            Ok(payload) => self.writer.submit(payload),
            Err(error) => error!(%error, "pool snapshot serialization failed"),
        }
    }
}

fn serialize_pools(store: &InMemoryPoolStore) -> Result<String, serde_json::Error> {
    let map: BTreeMap<String, PoolState> = store
        .all()
        .into_iter()
        .map(|state| (state.pool_id.to_string(), state))
        .collect();
    serde_json::to_string_pretty(&map)
}

impl PoolStateStore for PersistentPoolStore {
    fn get(&self, pool_id: &PoolId) -> Option<PoolState> {
        self.inner.get(pool_id)
    }

    fn insert_if_absent(&self, state: PoolState) -> (PoolState, bool) {
        let (state, created) = self.inner.insert_if_absent(state);
        if created {
            self.schedule_snapshot();
        }
        (state, created)
    }

    fn update_with<T, E, F>(&self, pool_id: &PoolId, f: F) -> Result<T, E>
    where
        F: FnOnce(&PoolState) -> Result<(PoolState, T), E>,
        E: From<StoreError>,
    {
        let value = self.inner.update_with(pool_id, f)?;
        self.schedule_snapshot();
        Ok(value)
    }

    fn all(&self) -> Vec<PoolState> {
        self.inner.all()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}
