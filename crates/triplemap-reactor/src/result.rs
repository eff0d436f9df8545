//! Restartable query results

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

use triplemap_core::{ClosableIterator, GraphHandle, Node, Result, Statement, TriplePattern};

use crate::codec::FromNode;

/// Which statement position a result projects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Projection {
    Subject,
    Object,
}

/// Lazily decoded values for one statement pattern
///
/// Each call to [`iter`](Self::iter) runs the pattern again against the
/// store's current content; the iterator it returns is single-pass.
pub struct ReactorResult<T> {
    graph: GraphHandle,
    pattern: TriplePattern,
    projection: Projection,
    _marker: PhantomData<fn() -> T>,
}

impl<T: FromNode> ReactorResult<T> {
    /// Objects of statements matching the pattern
    pub fn objects(graph: GraphHandle, pattern: TriplePattern) -> Self {
        Self {
            graph,
            pattern,
            projection: Projection::Object,
            _marker: PhantomData,
        }
    }

    /// Subjects of statements matching the pattern
    pub fn subjects(graph: GraphHandle, pattern: TriplePattern) -> Self {
        Self {
            graph,
            pattern,
            projection: Projection::Subject,
            _marker: PhantomData,
        }
    }

    /// Start a fresh traversal
    pub fn iter(&self) -> Result<ReactorIter<T>> {
        let statements = self.graph.read()?.find_statements(&self.pattern)?;
        Ok(ReactorIter {
            statements,
            graph: self.graph.clone(),
            projection: self.projection,
            _marker: PhantomData,
        })
    }

    /// Undecoded nodes of a fresh traversal
    pub fn nodes(&self) -> Result<Vec<Node>> {
        let projection = self.projection;
        Ok(self
            .graph
            .read()?
            .find_statements(&self.pattern)?
            .map(|st| project(st, projection))
            .collect())
    }

    pub fn to_vec(&self) -> Result<Vec<T>> {
        self.iter()?.collect()
    }

    /// First value of a fresh traversal; the cursor is closed afterwards
    pub fn first(&self) -> Result<Option<T>> {
        let mut iter = self.iter()?;
        let first = iter.next().transpose();
        iter.close();
        first
    }

    /// Number of matches, without decoding
    pub fn count(&self) -> Result<usize> {
        self.graph.read()?.count(&self.pattern)
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.graph.read()?.contains(&self.pattern).map(|found| !found)
    }

    pub fn to_set(&self) -> Result<HashSet<T>>
    where
        T: Eq + Hash,
    {
        self.iter()?.collect()
    }
}

impl<T> Clone for ReactorResult<T> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
            pattern: self.pattern.clone(),
            projection: self.projection,
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for ReactorResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactorResult")
            .field("pattern", &self.pattern)
            .field("projection", &self.projection)
            .finish()
    }
}

fn project(statement: Statement, projection: Projection) -> Node {
    match projection {
        Projection::Subject => Node::from(statement.subject),
        Projection::Object => statement.object,
    }
}

/// Single-pass traversal of a [`ReactorResult`]
///
/// Holds no lock on the store. Dropping it or calling [`close`](Self::close)
/// releases the underlying cursor.
pub struct ReactorIter<T> {
    statements: ClosableIterator<Statement>,
    graph: GraphHandle,
    projection: Projection,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ReactorIter<T> {
    pub fn close(&mut self) {
        self.statements.close();
    }

    pub fn is_closed(&self) -> bool {
        self.statements.is_closed()
    }
}

impl<T: FromNode> Iterator for ReactorIter<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let statement = self.statements.next()?;
        let node = project(statement, self.projection);
        Some(T::from_node(&self.graph, &node))
    }
}
