//! triplemap AutoPersist - Batched durable write-back
//!
//! [`AutoPersistStore`] wraps any [`GraphStore`], applies mutations to it
//! immediately, and commits the whole store to a backing file once a
//! threshold of uncommitted mutations is reached (or on [`flush`]).
//!
//! A commit serializes the store to a temporary file next to the target
//! and then renames it over the target, so the target path only ever holds
//! a complete document. When a commit fails the in-memory store keeps its
//! mutations, the pending count is left unchanged, and the failure is
//! returned from whichever call triggered the commit.
//!
//! [`flush`]: AutoPersistStore::flush

pub mod sink;

pub use sink::{CommitSink, FsCommitSink};

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use triplemap_core::{
    ClosableIterator, ConfigError, GraphError, GraphStore, PersistConfig, QueryRow, Resource,
    Result, Statement, TriplePattern,
};

// ============================================================================
// State machine
// ============================================================================

/// Relationship between the in-memory store and its durable copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistState {
    /// Durable copy matches memory
    Clean,
    /// `n` mutations applied since the last commit, `1 <= n <= threshold`
    Dirty(usize),
    /// A commit of `pending` mutations is in progress
    Flushing { pending: usize },
}

impl PersistState {
    /// Mutations not yet reflected in the durable copy
    pub fn pending(&self) -> usize {
        match *self {
            Self::Clean => 0,
            Self::Dirty(n) => n,
            Self::Flushing { pending } => pending,
        }
    }

    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Clean)
    }
}

// ============================================================================
// AutoPersistStore
// ============================================================================

/// Write-back decorator over a graph store
pub struct AutoPersistStore<S> {
    inner: S,
    path: PathBuf,
    temp_path: PathBuf,
    threshold: usize,
    state: PersistState,
    sink: Box<dyn CommitSink>,
}

impl<S: GraphStore> AutoPersistStore<S> {
    /// Wrap `inner`, loading `path` into it when the file exists
    ///
    /// Statements already in `inner` are kept and count as one pending
    /// mutation, so `flush` and `close` write them. The temporary file is
    /// `path` with `.tmp` appended.
    pub fn open(inner: S, path: impl Into<PathBuf>, threshold: usize) -> Result<Self> {
        Self::open_with(inner, path.into(), threshold, ".tmp", Box::new(FsCommitSink))
    }

    /// Wrap `inner` using a persistence configuration
    pub fn from_config(inner: S, config: &PersistConfig) -> Result<Self> {
        config.validate()?;
        Self::open_with(
            inner,
            config.store_path.clone(),
            config.commit_threshold,
            &config.temp_suffix,
            Box::new(FsCommitSink),
        )
    }

    /// Wrap `inner` with explicit commit primitives
    pub fn open_with(
        mut inner: S,
        path: PathBuf,
        threshold: usize,
        temp_suffix: &str,
        sink: Box<dyn CommitSink>,
    ) -> Result<Self> {
        if threshold == 0 {
            return Err(ConfigError::InvalidValue {
                key: "commit_threshold".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        if temp_suffix.is_empty() {
            return Err(ConfigError::MissingRequired("temp_suffix".to_string()).into());
        }

        let mut temp = path.clone().into_os_string();
        temp.push(temp_suffix);

        if !inner.is_open() {
            inner.open()?;
        }
        let preloaded = inner.size()?;

        let mut store = Self {
            inner,
            path,
            temp_path: PathBuf::from(temp),
            threshold,
            state: PersistState::Clean,
            sink,
        };
        store.load()?;
        if preloaded > 0 {
            // the backing file does not hold what the wrapped store started with
            store.state = PersistState::Dirty(1);
            tracing::debug!(
                path = %store.path.display(),
                statements = preloaded,
                "Wrapped store was not empty, marked dirty"
            );
        }
        Ok(store)
    }

    /// Replace the commit primitives
    pub fn with_sink(mut self, sink: impl CommitSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Mutations applied since the last successful commit
    pub fn open_changes(&self) -> usize {
        self.state.pending()
    }

    pub fn state(&self) -> PersistState {
        self.state
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Temporary file written during a commit
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Unwrap the store without committing
    pub fn into_inner(self) -> S {
        if !self.state.is_clean() {
            tracing::warn!(
                path = %self.path.display(),
                pending = self.open_changes(),
                "Unwrapping store with uncommitted changes"
            );
        }
        self.inner
    }

    /// Commit now if anything is pending
    pub fn flush(&mut self) -> Result<()> {
        if self.state.is_clean() {
            return Ok(());
        }
        self.commit()
    }

    /// Discard in-memory content and re-read the backing file
    pub fn reload(&mut self) -> Result<()> {
        if !self.state.is_clean() {
            tracing::warn!(
                path = %self.path.display(),
                pending = self.open_changes(),
                "Reload discards uncommitted changes"
            );
        }
        self.inner.clear()?;
        self.state = PersistState::Clean;
        self.load()
    }

    fn load(&mut self) -> Result<()> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No backing file, starting empty");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let loaded = self.inner.read_from(&mut BufReader::new(file))?;
        tracing::info!(path = %self.path.display(), statements = loaded, "Loaded graph");
        Ok(())
    }

    /// Count one mutation, committing when the threshold is reached
    ///
    /// The count saturates at the threshold so a failed commit is retried by
    /// the very next mutation.
    fn record_mutation(&mut self) -> Result<()> {
        let pending = (self.state.pending() + 1).min(self.threshold);
        self.state = PersistState::Dirty(pending);
        tracing::debug!(pending, threshold = self.threshold, "Recorded mutation");
        if pending >= self.threshold {
            self.commit()?;
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        let pending = self.state.pending();
        self.state = PersistState::Flushing { pending };

        match self.write_and_swap() {
            Ok(()) => {
                self.state = PersistState::Clean;
                tracing::info!(path = %self.path.display(), committed = pending, "Committed graph");
                Ok(())
            }
            Err(source) => {
                self.state = PersistState::Dirty(pending);
                tracing::warn!(
                    path = %self.path.display(),
                    pending,
                    error = %source,
                    "Commit failed, durable copy is stale"
                );
                Err(GraphError::PersistenceFailure {
                    path: self.path.clone(),
                    source,
                })
            }
        }
    }

    fn write_and_swap(&self) -> io::Result<()> {
        let mut buf = Vec::new();
        self.inner.write_to(&mut buf).map_err(|e| match e {
            GraphError::Io(io) => io,
            other => io::Error::other(other.to_string()),
        })?;
        self.sink.write_temp(&self.temp_path, &buf)?;
        self.sink.swap(&self.temp_path, &self.path)
    }
}

impl<S: GraphStore> GraphStore for AutoPersistStore<S> {
    fn open(&mut self) -> Result<()> {
        self.inner.open()
    }

    /// Commit pending mutations, then close the wrapped store
    ///
    /// The wrapped store is closed even when the commit fails; the commit
    /// error is returned.
    fn close(&mut self) -> Result<()> {
        let flushed = if self.inner.is_open() {
            self.flush()
        } else {
            Ok(())
        };
        self.inner.close()?;
        flushed
    }

    fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    fn contains(&self, pattern: &TriplePattern) -> Result<bool> {
        self.inner.contains(pattern)
    }

    fn add_statement(&mut self, statement: Statement) -> Result<()> {
        self.inner.add_statement(statement)?;
        self.record_mutation()
    }

    fn remove_statement(&mut self, statement: &Statement) -> Result<()> {
        self.inner.remove_statement(statement)?;
        self.record_mutation()
    }

    fn remove_statements(&mut self, pattern: &TriplePattern) -> Result<()> {
        self.inner.remove_statements(pattern)?;
        self.record_mutation()
    }

    fn find_statements(&self, pattern: &TriplePattern) -> Result<ClosableIterator<Statement>> {
        self.inner.find_statements(pattern)
    }

    fn query(&self, query: &str) -> Result<ClosableIterator<QueryRow>> {
        self.inner.query(query)
    }

    fn new_unique_resource(&self) -> Result<Resource> {
        self.inner.new_unique_resource()
    }

    fn size(&self) -> Result<usize> {
        self.inner.size()
    }

    fn count(&self, pattern: &TriplePattern) -> Result<usize> {
        self.inner.count(pattern)
    }
}

impl<S> std::fmt::Debug for AutoPersistStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoPersistStore")
            .field("path", &self.path)
            .field("threshold", &self.threshold)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
