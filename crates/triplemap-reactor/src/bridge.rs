//! Mapping engine
//!
//! Typed property operations on a `(subject, predicate)` coordinate,
//! translated into statement operations on a [`GraphHandle`].
//!
//! Every mutating operation holds the store's write lock for its whole
//! check-then-mutate sequence, so bounded adds and removes cannot race
//! through a shared handle. Cardinality violations are detected before
//! anything is changed. Callers must not hold a guard from the same handle
//! while calling into this module.
//!
//! Replacing operations run every remove and add even when a write-back
//! commit fails part way; the commit failure is returned afterwards.

use std::collections::HashSet;
use std::hash::Hash;

use triplemap_core::{
    DeferredFailure, GraphError, GraphHandle, Iri, Node, Resource, Result, Statement,
    TriplePattern,
};

use crate::codec::{FromNode, ToNode};
use crate::result::ReactorResult;

// ============================================================================
// Reads
// ============================================================================

/// One value of the property, or `None` when it has none
///
/// With several values the one returned follows store order.
pub fn get_value<T: FromNode>(
    graph: &GraphHandle,
    subject: &Resource,
    predicate: &Iri,
) -> Result<Option<T>> {
    let node = graph
        .read()?
        .find_statements(&TriplePattern::subject_predicate(subject, predicate))?
        .next()
        .map(|st| st.object);
    node.map(|node| T::from_node(graph, &node)).transpose()
}

/// All values of the property as a restartable result
pub fn get_all_values<T: FromNode>(
    graph: &GraphHandle,
    subject: &Resource,
    predicate: &Iri,
) -> ReactorResult<T> {
    ReactorResult::objects(
        graph.clone(),
        TriplePattern::subject_predicate(subject, predicate),
    )
}

/// All values of the property, undecoded
pub fn get_all_nodes(graph: &GraphHandle, subject: &Resource, predicate: &Iri) -> Result<Vec<Node>> {
    Ok(graph
        .read()?
        .find_statements(&TriplePattern::subject_predicate(subject, predicate))?
        .map(|st| st.object)
        .collect())
}

pub fn get_all_as_set<T: FromNode + Eq + Hash>(
    graph: &GraphHandle,
    subject: &Resource,
    predicate: &Iri,
) -> Result<HashSet<T>> {
    get_all_values(graph, subject, predicate).to_set()
}

/// Every `x` with `(x, predicate, object)`
pub fn get_all_inverse<T: FromNode, V: ToNode + ?Sized>(
    graph: &GraphHandle,
    predicate: &Iri,
    object: &V,
) -> ReactorResult<T> {
    ReactorResult::subjects(
        graph.clone(),
        TriplePattern::predicate_object(predicate, &object.to_node()),
    )
}

pub fn contains_value<V: ToNode + ?Sized>(
    graph: &GraphHandle,
    subject: &Resource,
    predicate: &Iri,
    value: &V,
) -> Result<bool> {
    let statement = Statement::new(subject.clone(), predicate.clone(), value.to_node());
    graph.read()?.contains_statement(&statement)
}

pub fn contains_any_value(graph: &GraphHandle, subject: &Resource, predicate: &Iri) -> Result<bool> {
    graph
        .read()?
        .contains(&TriplePattern::subject_predicate(subject, predicate))
}

/// Number of values of the property
pub fn count_values(graph: &GraphHandle, subject: &Resource, predicate: &Iri) -> Result<usize> {
    graph
        .read()?
        .count(&TriplePattern::subject_predicate(subject, predicate))
}

// ============================================================================
// Writes
// ============================================================================

/// Add a value; returns false and changes nothing when it is already present
pub fn add_value<V: ToNode + ?Sized>(
    graph: &GraphHandle,
    subject: &Resource,
    predicate: &Iri,
    value: &V,
) -> Result<bool> {
    let statement = Statement::new(subject.clone(), predicate.clone(), value.to_node());
    let mut store = graph.write()?;
    if store.contains_statement(&statement)? {
        return Ok(false);
    }
    tracing::debug!(%statement, "Adding value");
    store.add_statement(statement)?;
    Ok(true)
}

/// Add a value unless the property already has `max_card` values
///
/// The bound is checked against the count before the add, so a duplicate
/// of an existing value is rejected too once the property is full.
pub fn add_value_bounded<V: ToNode + ?Sized>(
    graph: &GraphHandle,
    subject: &Resource,
    predicate: &Iri,
    value: &V,
    max_card: usize,
) -> Result<bool> {
    let statement = Statement::new(subject.clone(), predicate.clone(), value.to_node());
    let mut store = graph.write()?;
    let existing = store.count(&TriplePattern::subject_predicate(subject, predicate))?;
    if existing >= max_card {
        return Err(GraphError::cardinality(
            subject,
            predicate,
            format!("only {max_card} values allowed"),
        ));
    }
    if store.contains_statement(&statement)? {
        return Ok(false);
    }
    store.add_statement(statement)?;
    Ok(true)
}

/// Replace all values of the property by one value
pub fn set_value<V: ToNode + ?Sized>(
    graph: &GraphHandle,
    subject: &Resource,
    predicate: &Iri,
    value: &V,
) -> Result<()> {
    let mut store = graph.write()?;
    let mut deferred = DeferredFailure::new();
    deferred.step(store.remove_statements(&TriplePattern::subject_predicate(subject, predicate)))?;
    deferred.step(store.add_statement(Statement::new(
        subject.clone(),
        predicate.clone(),
        value.to_node(),
    )))?;
    deferred.finish(())
}

/// Replace all values of the property by `values`
///
/// With a `max_card`, more than `max_card` values is rejected before
/// anything is removed.
pub fn set_all_values<V: ToNode>(
    graph: &GraphHandle,
    subject: &Resource,
    predicate: &Iri,
    values: &[V],
    max_card: Option<usize>,
) -> Result<()> {
    if let Some(max) = max_card {
        if values.len() > max {
            return Err(GraphError::cardinality(
                subject,
                predicate,
                format!("{} values given, only {max} allowed", values.len()),
            ));
        }
    }
    let mut store = graph.write()?;
    let mut deferred = DeferredFailure::new();
    deferred.step(store.remove_statements(&TriplePattern::subject_predicate(subject, predicate)))?;
    for value in values {
        deferred.step(store.add_statement(Statement::new(
            subject.clone(),
            predicate.clone(),
            value.to_node(),
        )))?;
    }
    deferred.finish(())
}

/// Remove a value; returns whether it was present
pub fn remove_value<V: ToNode + ?Sized>(
    graph: &GraphHandle,
    subject: &Resource,
    predicate: &Iri,
    value: &V,
) -> Result<bool> {
    let statement = Statement::new(subject.clone(), predicate.clone(), value.to_node());
    let mut store = graph.write()?;
    if !store.contains_statement(&statement)? {
        return Ok(false);
    }
    store.remove_statement(&statement)?;
    Ok(true)
}

/// Remove a value unless the property has `min_card` values or fewer
pub fn remove_value_bounded<V: ToNode + ?Sized>(
    graph: &GraphHandle,
    subject: &Resource,
    predicate: &Iri,
    value: &V,
    min_card: usize,
) -> Result<bool> {
    let statement = Statement::new(subject.clone(), predicate.clone(), value.to_node());
    let mut store = graph.write()?;
    let existing = store.count(&TriplePattern::subject_predicate(subject, predicate))?;
    if existing <= min_card {
        return Err(GraphError::cardinality(
            subject,
            predicate,
            format!("at least {min_card} values required"),
        ));
    }
    if !store.contains_statement(&statement)? {
        return Ok(false);
    }
    store.remove_statement(&statement)?;
    Ok(true)
}

/// Remove every value of the property; returns whether any existed
pub fn remove_all_values(graph: &GraphHandle, subject: &Resource, predicate: &Iri) -> Result<bool> {
    let pattern = TriplePattern::subject_predicate(subject, predicate);
    let mut store = graph.write()?;
    if !store.contains(&pattern)? {
        return Ok(false);
    }
    store.remove_statements(&pattern)?;
    Ok(true)
}

/// Replace `old` by `new`; returns false and changes nothing if `old` is absent
pub fn update_value<A: ToNode + ?Sized, B: ToNode + ?Sized>(
    graph: &GraphHandle,
    subject: &Resource,
    predicate: &Iri,
    old: &A,
    new: &B,
) -> Result<bool> {
    let old = Statement::new(subject.clone(), predicate.clone(), old.to_node());
    let mut store = graph.write()?;
    if !store.contains_statement(&old)? {
        return Ok(false);
    }
    let mut deferred = DeferredFailure::new();
    deferred.step(store.remove_statement(&old))?;
    deferred.step(store.add_statement(Statement::new(
        subject.clone(),
        predicate.clone(),
        new.to_node(),
    )))?;
    deferred.finish(true)
}

// ============================================================================
// Tests
// ============================================================================
