//! Graph store boundary
//!
//! [`GraphStore`] is the narrow interface the mapping engine and the
//! auto-persist layer consume. Result sequences are returned as
//! [`ClosableIterator`]s which release their cursor when closed or dropped.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{BufRead, Write};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::model::{Resource, Statement, TriplePattern};
use crate::{ntriples, GraphError, Node, Result};

/// One result row of a store query, keyed by variable name
pub type QueryRow = BTreeMap<String, Node>;

// ============================================================================
// Closable iteration
// ============================================================================

/// A single-pass result sequence with explicit release
///
/// Closing is idempotent. A closed iterator yields nothing further.
/// Dropping the iterator closes it, so early exits and `?` release the
/// underlying cursor as well.
pub struct ClosableIterator<T> {
    inner: Option<Box<dyn Iterator<Item = T>>>,
}

impl<T> ClosableIterator<T> {
    pub fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = T> + 'static,
    {
        Self {
            inner: Some(Box::new(iter)),
        }
    }

    pub fn empty() -> Self {
        Self { inner: None }
    }

    /// Release the underlying cursor
    pub fn close(&mut self) {
        self.inner = None;
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

}

impl<T> Iterator for ClosableIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let item = self.inner.as_mut()?.next();
        if item.is_none() {
            self.close();
        }
        item
    }
}

impl<T> Drop for ClosableIterator<T> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<T> fmt::Debug for ClosableIterator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosableIterator")
            .field("closed", &self.is_closed())
            .finish()
    }
}

// ============================================================================
// Store trait
// ============================================================================

/// Trait for graph store backends
///
/// Every operation on a closed store fails with
/// [`GraphError::StoreUnavailable`]. `find_statements` and `query` return
/// sequences that do not borrow the store, so callers may mutate the store
/// while holding one.
pub trait GraphStore: Send + Sync {
    /// Open the store; opening an open store is a no-op
    fn open(&mut self) -> Result<()>;

    fn close(&mut self) -> Result<()>;

    fn is_open(&self) -> bool;

    /// Whether any statement matches the pattern
    fn contains(&self, pattern: &TriplePattern) -> Result<bool>;

    /// Insert a statement; inserting a present statement changes nothing
    fn add_statement(&mut self, statement: Statement) -> Result<()>;

    /// Remove a statement if present
    fn remove_statement(&mut self, statement: &Statement) -> Result<()>;

    /// Remove every statement matching the pattern
    fn remove_statements(&mut self, pattern: &TriplePattern) -> Result<()>;

    fn find_statements(&self, pattern: &TriplePattern) -> Result<ClosableIterator<Statement>>;

    /// Run a store-specific query
    fn query(&self, query: &str) -> Result<ClosableIterator<QueryRow>>;

    /// Mint a resource not used anywhere in the store
    fn new_unique_resource(&self) -> Result<Resource>;

    /// Number of statements in the store
    fn size(&self) -> Result<usize> {
        Ok(self.find_statements(&TriplePattern::any())?.count())
    }

    /// Number of statements matching the pattern
    fn count(&self, pattern: &TriplePattern) -> Result<usize> {
        Ok(self.find_statements(pattern)?.count())
    }

    fn contains_statement(&self, statement: &Statement) -> Result<bool> {
        self.contains(&TriplePattern::exact(statement))
    }

    /// Remove every statement
    fn clear(&mut self) -> Result<()> {
        self.remove_statements(&TriplePattern::any())
    }

    /// Serialize the whole store
    ///
    /// The default writes N-Triples, one statement per line.
    fn write_to(&self, out: &mut dyn Write) -> Result<()> {
        let statements = self.find_statements(&TriplePattern::any())?;
        ntriples::write_statements(out, statements)?;
        Ok(())
    }

    /// Add every statement read from `input`, returning how many were read
    ///
    /// The default reads N-Triples. Nothing is added if the input is malformed.
    fn read_from(&mut self, input: &mut dyn BufRead) -> Result<usize> {
        let statements = ntriples::parse_document(input)?;
        let count = statements.len();
        for statement in statements {
            self.add_statement(statement)?;
        }
        tracing::debug!(statements = count, "Read statements");
        Ok(count)
    }
}

/// Error for an operation attempted on a closed store
pub fn store_closed(store: &str) -> GraphError {
    GraphError::StoreUnavailable(format!("{store} is closed"))
}

// ============================================================================
// Shared handle
// ============================================================================

/// Cloneable shared handle to a graph store
///
/// Typed instances keep one of these. Each mapping operation takes the
/// lock once for its whole check-then-mutate sequence.
#[derive(Clone)]
pub struct GraphHandle {
    inner: Arc<RwLock<dyn GraphStore>>,
}

impl GraphHandle {
    pub fn new<S: GraphStore + 'static>(store: S) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Shared access for queries
    pub fn read(&self) -> Result<RwLockReadGuard<'_, dyn GraphStore + 'static>> {
        self.inner
            .read()
            .map_err(|_| GraphError::StoreUnavailable("store lock poisoned".to_string()))
    }

    /// Exclusive access for mutations
    pub fn write(&self) -> Result<RwLockWriteGuard<'_, dyn GraphStore + 'static>> {
        self.inner
            .write()
            .map_err(|_| GraphError::StoreUnavailable("store lock poisoned".to_string()))
    }

}

impl fmt::Debug for GraphHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphHandle")
            .field("store", &Arc::as_ptr(&self.inner))
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
