//! triplemap Core - Graph data model, store boundary, and shared types
//!
//! This crate defines the abstractions every other triplemap crate builds on:
//! - RDF-style graph model (IRIs, blank nodes, literals, statements)
//! - The `GraphStore` boundary and closable result iteration
//! - N-Triples reading and writing
//! - Common error types
//! - Configuration management

pub mod config;
pub mod model;
pub mod ntriples;
pub mod store;
pub mod vocab;

pub use config::{AppConfig, ConfigError, LoggingConfig, PersistConfig};
pub use model::{BlankId, Iri, Literal, Node, Resource, Statement, TriplePattern};
pub use store::{ClosableIterator, GraphHandle, GraphStore, QueryRow};

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error type for graph mapping and persistence operations
#[derive(Error, Debug)]
pub enum GraphError {
    /// A bounded add/remove/set was rejected; the store was not touched.
    #[error("Cardinality violation on ({subject}, {predicate}): {message}")]
    CardinalityViolation {
        subject: String,
        predicate: String,
        message: String,
    },

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("Resource expected, found literal {0}")]
    ResourceExpected(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Serializing or swapping the durable copy failed. In-memory state is kept.
    #[error("Failed to persist graph to {path}: {source}")]
    PersistenceFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid node: {0}")]
    InvalidNode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GraphError {
    /// Build a cardinality violation for a `(subject, predicate)` coordinate
    pub fn cardinality(
        subject: &Resource,
        predicate: &Iri,
        message: impl Into<String>,
    ) -> Self {
        Self::CardinalityViolation {
            subject: subject.to_string(),
            predicate: predicate.to_string(),
            message: message.into(),
        }
    }

    /// Build a type mismatch for a node that could not be decoded
    pub fn type_mismatch(expected: impl Into<String>, found: &Node) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.to_string(),
        }
    }

    /// Whether this error left in-memory state ahead of the durable copy
    pub fn is_persistence_failure(&self) -> bool {
        matches!(self, Self::PersistenceFailure { .. })
    }
}

pub type Result<T> = std::result::Result<T, GraphError>;

/// Holds back commit failures across a multi-step mutation
///
/// A persistence failure leaves the in-memory change applied, so compound
/// operations (remove then add) keep going and report the first such
/// failure after their last step. Any other error is returned at once.
#[derive(Debug, Default)]
pub struct DeferredFailure {
    first: Option<GraphError>,
}

impl DeferredFailure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorb a persistence failure from one step
    pub fn step(&mut self, result: Result<()>) -> Result<()> {
        match result {
            Err(err) if err.is_persistence_failure() => {
                self.first.get_or_insert(err);
                Ok(())
            }
            other => other,
        }
    }

    /// `value`, or the first held-back failure
    pub fn finish<T>(self, value: T) -> Result<T> {
        match self.first {
            Some(err) => Err(err),
            None => Ok(value),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinality_message() {
        let subject = Resource::from(Iri::new_unchecked("urn:test:s"));
        let predicate = Iri::new_unchecked("urn:test:p");
        let err = GraphError::cardinality(&subject, &predicate, "at most 1 value allowed");

        let text = err.to_string();
        assert!(text.contains("<urn:test:s>"));
        assert!(text.contains("urn:test:p"));
        assert!(text.contains("at most 1"));
    }

    #[test]
    fn test_persistence_failure_flag() {
        let err = GraphError::PersistenceFailure {
            path: PathBuf::from("graph.nt"),
            source: std::io::Error::other("disk full"),
        };
        assert!(err.is_persistence_failure());
        assert!(!GraphError::StoreUnavailable("closed".into()).is_persistence_failure());
    }

    #[test]
    fn test_deferred_failure_keeps_first_commit_error() {
        let failure = |path: &str| GraphError::PersistenceFailure {
            path: PathBuf::from(path),
            source: std::io::Error::other("disk full"),
        };
        let mut deferred = DeferredFailure::new();
        assert!(deferred.step(Ok(())).is_ok());
        assert!(deferred.step(Err(failure("first.nt"))).is_ok());
        assert!(deferred.step(Err(failure("second.nt"))).is_ok());

        match deferred.finish(3) {
            Err(GraphError::PersistenceFailure { path, .. }) => {
                assert_eq!(path, PathBuf::from("first.nt"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_deferred_failure_passes_other_errors() {
        let mut deferred = DeferredFailure::new();
        let err = deferred
            .step(Err(GraphError::StoreUnavailable("closed".into())))
            .unwrap_err();
        assert!(matches!(err, GraphError::StoreUnavailable(_)));
        assert_eq!(deferred.finish("done").unwrap(), "done");
    }

    #[test]
    fn test_type_mismatch_shows_node() {
        let node = Node::from(Literal::plain("abc"));
        let err = GraphError::type_mismatch("i32", &node);
        assert_eq!(err.to_string(), "Type mismatch: expected i32, found \"abc\"");
    }
}
