//! Durable write-back behaviour against the filesystem

use std::fs;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use triplemap_autopersist::{AutoPersistStore, CommitSink, FsCommitSink, PersistState};
use triplemap_core::{GraphError, GraphStore, Iri, Literal, Statement, TriplePattern};
use triplemap_graph::MemoryStore;

fn statement(value: &str) -> Statement {
    Statement::new(
        Iri::new_unchecked("urn:test:s"),
        Iri::new_unchecked("urn:test:p"),
        Literal::plain(value),
    )
}

/// Filesystem sink whose swap can be made to fail
#[derive(Clone, Default)]
struct FlakySink {
    fail_swap: Arc<AtomicBool>,
}

impl CommitSink for FlakySink {
    fn write_temp(&self, temp: &Path, bytes: &[u8]) -> io::Result<()> {
        FsCommitSink.write_temp(temp, bytes)
    }

    fn swap(&self, temp: &Path, target: &Path) -> io::Result<()> {
        if self.fail_swap.load(Ordering::SeqCst) {
            return Err(io::Error::other("injected failure before swap"));
        }
        FsCommitSink.swap(temp, target)
    }
}

#[test]
fn test_threshold_two_commits_on_second_mutation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.nt");
    let mut store = AutoPersistStore::open(MemoryStore::new(), &path, 2).unwrap();

    store.add_statement(statement("A")).unwrap();
    assert_eq!(store.open_changes(), 1);
    assert!(!path.exists());

    store.add_statement(statement("B")).unwrap();
    assert_eq!(store.open_changes(), 0);
    assert_eq!(store.state(), PersistState::Clean);

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"A\""));
    assert!(text.contains("\"B\""));
    assert!(!store.temp_path().exists());
}

#[test]
fn test_threshold_one_commits_every_mutation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.nt");
    let mut store = AutoPersistStore::open(MemoryStore::new(), &path, 1).unwrap();

    store.add_statement(statement("Test")).unwrap();
    assert_eq!(store.open_changes(), 0);
    let first = fs::read_to_string(&path).unwrap();

    store.add_statement(statement("Test2")).unwrap();
    let second = fs::read_to_string(&path).unwrap();
    assert_ne!(first, second);
    assert_eq!(second.lines().count(), 2);
}

#[test]
fn test_failed_swap_leaves_target_intact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.nt");
    let sink = FlakySink::default();
    let mut store = AutoPersistStore::open(MemoryStore::new(), &path, 2)
        .unwrap()
        .with_sink(sink.clone());

    store.add_statement(statement("A")).unwrap();
    store.add_statement(statement("B")).unwrap();
    let committed = fs::read_to_string(&path).unwrap();

    sink.fail_swap.store(true, Ordering::SeqCst);
    store.add_statement(statement("C")).unwrap();
    let err = store.add_statement(statement("D")).unwrap_err();
    assert!(err.is_persistence_failure());
    assert!(matches!(err, GraphError::PersistenceFailure { .. }));

    // target still holds the last good commit and parses
    assert_eq!(fs::read_to_string(&path).unwrap(), committed);
    let reread = AutoPersistStore::open(MemoryStore::new(), &path, 2).unwrap();
    assert_eq!(reread.size().unwrap(), 2);

    // in-memory mutations are kept, the counter stays saturated
    assert_eq!(store.size().unwrap(), 4);
    assert_eq!(store.state(), PersistState::Dirty(2));
}

#[test]
fn test_next_mutation_retries_failed_commit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.nt");
    let sink = FlakySink::default();
    let mut store = AutoPersistStore::open(MemoryStore::new(), &path, 3)
        .unwrap()
        .with_sink(sink.clone());

    sink.fail_swap.store(true, Ordering::SeqCst);
    store.add_statement(statement("A")).unwrap();
    store.add_statement(statement("B")).unwrap();
    assert!(store.add_statement(statement("C")).is_err());
    assert!(store.add_statement(statement("D")).is_err());
    assert_eq!(store.open_changes(), 3);

    sink.fail_swap.store(false, Ordering::SeqCst);
    store.add_statement(statement("E")).unwrap();
    assert_eq!(store.open_changes(), 0);
    assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 5);
}

#[test]
fn test_forced_flush_after_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.nt");
    let sink = FlakySink::default();
    let mut store = AutoPersistStore::open(MemoryStore::new(), &path, 100)
        .unwrap()
        .with_sink(sink.clone());

    store.add_statement(statement("A")).unwrap();
    sink.fail_swap.store(true, Ordering::SeqCst);
    assert!(store.flush().is_err());
    assert_eq!(store.state(), PersistState::Dirty(1));

    sink.fail_swap.store(false, Ordering::SeqCst);
    store.flush().unwrap();
    assert_eq!(store.state(), PersistState::Clean);
    assert!(path.exists());
}

#[test]
fn test_load_on_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.nt");
    {
        let mut store = AutoPersistStore::open(MemoryStore::new(), &path, 10).unwrap();
        store.add_statement(statement("kept")).unwrap();
        store.add_statement(statement("also kept")).unwrap();
        store.flush().unwrap();
    }

    let store = AutoPersistStore::open(MemoryStore::new(), &path, 10).unwrap();
    assert_eq!(store.state(), PersistState::Clean);
    assert_eq!(store.size().unwrap(), 2);
    assert!(store.contains_statement(&statement("kept")).unwrap());
}

#[test]
fn test_malformed_backing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.nt");
    fs::write(&path, "<urn:s> <urn:p> .\n").unwrap();

    let err = AutoPersistStore::open(MemoryStore::new(), &path, 10).unwrap_err();
    assert!(matches!(err, GraphError::Parse { line: 1, .. }));
}

#[test]
fn test_reload_discards_uncommitted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.nt");
    let mut store = AutoPersistStore::open(MemoryStore::new(), &path, 10).unwrap();
    store.add_statement(statement("durable")).unwrap();
    store.flush().unwrap();
    store.add_statement(statement("volatile")).unwrap();

    store.reload().unwrap();
    assert_eq!(store.state(), PersistState::Clean);
    assert_eq!(store.size().unwrap(), 1);
    assert!(!store.contains_statement(&statement("volatile")).unwrap());
}

#[test]
fn test_close_flushes_pending() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.nt");
    let mut store = AutoPersistStore::open(MemoryStore::new(), &path, 10).unwrap();
    store.add_statement(statement("A")).unwrap();

    GraphStore::close(&mut store).unwrap();
    assert!(!store.is_open());
    assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 1);

    let err = store.add_statement(statement("B")).unwrap_err();
    assert!(matches!(err, GraphError::StoreUnavailable(_)));
    assert_eq!(store.open_changes(), 0);
}

#[test]
fn test_close_reports_flush_failure_but_closes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.nt");
    let sink = FlakySink::default();
    let mut store = AutoPersistStore::open(MemoryStore::new(), &path, 10)
        .unwrap()
        .with_sink(sink.clone());
    store.add_statement(statement("A")).unwrap();

    sink.fail_swap.store(true, Ordering::SeqCst);
    assert!(GraphStore::close(&mut store).is_err());
    assert!(!store.is_open());
}

#[test]
fn test_existing_inner_content_is_persisted_on_close() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.nt");
    let inner = MemoryStore::from_statements([statement("preloaded")]);
    let mut store = AutoPersistStore::open(inner, &path, 10).unwrap();
    assert_eq!(store.state(), PersistState::Dirty(1));

    GraphStore::close(&mut store).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("preloaded"));
}

#[test]
fn test_existing_inner_content_counts_towards_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.nt");
    let inner = MemoryStore::from_statements([statement("preloaded")]);
    let mut store = AutoPersistStore::open(inner, &path, 2).unwrap();
    assert!(!path.exists());

    store.add_statement(statement("new")).unwrap();
    assert_eq!(store.state(), PersistState::Clean);
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("preloaded"));
    assert!(text.contains("new"));
}

#[test]
fn test_pattern_removal_counts_once() {
    let dir = tempfile::tempdir().unwrap();
    let mut store =
        AutoPersistStore::open(MemoryStore::new(), dir.path().join("graph.nt"), 10).unwrap();
    for value in ["a", "b", "c"] {
        store.add_statement(statement(value)).unwrap();
    }
    store.remove_statements(&TriplePattern::any()).unwrap();
    assert_eq!(store.open_changes(), 4);
    assert_eq!(store.size().unwrap(), 0);
}
