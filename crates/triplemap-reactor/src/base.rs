//! Typed instance wrapper
//!
//! A [`ReactorBase`] binds one subject and a declared class to a store.
//! Identity is carried by the subject alone: two wrappers over the same
//! subject are equal whatever their declared class or store.

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use triplemap_core::vocab::rdf;
use triplemap_core::{
    GraphError, GraphHandle, Iri, Node, Resource, Result, Statement, TriplePattern,
};

use crate::bridge;
use crate::codec::{FromNode, ToNode};
use crate::result::ReactorResult;

/// Alias used where the wrapper is meant generically
pub type TypedInstance = ReactorBase;

/// A subject bound to a declared class and a store
#[derive(Clone)]
pub struct ReactorBase {
    graph: GraphHandle,
    class: Iri,
    resource: Resource,
}

impl ReactorBase {
    /// Wrap `resource` without touching the store
    pub fn new(graph: GraphHandle, class: Iri, resource: Resource) -> Self {
        Self {
            graph,
            class,
            resource,
        }
    }

    /// Wrap `resource` and assert `(resource, rdf:type, class)` if missing
    pub fn new_typed(graph: GraphHandle, class: Iri, resource: Resource) -> Result<Self> {
        let base = Self::new(graph, class, resource);
        if bridge::add_value(&base.graph, &base.resource, &rdf::TYPE, &base.class)? {
            tracing::debug!(resource = %base.resource, class = %base.class, "Added type information");
        }
        Ok(base)
    }

    /// Wrap a freshly minted resource and assert its type
    pub fn new_fresh(graph: GraphHandle, class: Iri) -> Result<Self> {
        let resource = graph.read()?.new_unique_resource()?;
        Self::new_typed(graph, class, resource)
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Declared class
    pub fn rdfs_class(&self) -> &Iri {
        &self.class
    }

    pub fn graph(&self) -> &GraphHandle {
        &self.graph
    }

    // ------------------------------------------------------------------------
    // Class membership
    // ------------------------------------------------------------------------

    /// Whether `(self, rdf:type, class)` holds
    pub fn has_type(&self, class: &Iri) -> Result<bool> {
        Self::has_instance(&self.graph, &self.resource, class)
    }

    /// Every `rdf:type` of this subject
    pub fn types(&self) -> Result<Vec<Iri>> {
        bridge::get_all_values(&self.graph, &self.resource, &rdf::TYPE).to_vec()
    }

    /// Decode this subject as another type
    pub fn cast_to<T: FromNode>(&self) -> Result<T> {
        T::from_node(&self.graph, &self.to_node())
    }

    /// Remove every statement with this subject in subject position
    pub fn delete(&self) -> Result<()> {
        tracing::debug!(resource = %self.resource, "Deleting instance");
        self.graph
            .write()?
            .remove_statements(&TriplePattern::new(Some(self.resource.clone()), None, None))
    }

    // ------------------------------------------------------------------------
    // Property access
    // ------------------------------------------------------------------------

    pub fn get<T: FromNode>(&self, property: &Iri) -> Result<Option<T>> {
        bridge::get_value(&self.graph, &self.resource, property)
    }

    pub fn get_all<T: FromNode>(&self, property: &Iri) -> ReactorResult<T> {
        bridge::get_all_values(&self.graph, &self.resource, property)
    }

    pub fn get_all_as_set<T: FromNode + Eq + Hash>(&self, property: &Iri) -> Result<HashSet<T>> {
        bridge::get_all_as_set(&self.graph, &self.resource, property)
    }

    /// Every `x` with `(x, property, self)`
    pub fn get_all_inverse<T: FromNode>(&self, property: &Iri) -> ReactorResult<T> {
        bridge::get_all_inverse(&self.graph, property, &self.resource)
    }

    pub fn set<V: ToNode + ?Sized>(&self, property: &Iri, value: &V) -> Result<()> {
        bridge::set_value(&self.graph, &self.resource, property, value)
    }

    pub fn set_all<V: ToNode>(&self, property: &Iri, values: &[V]) -> Result<()> {
        bridge::set_all_values(&self.graph, &self.resource, property, values, None)
    }

    pub fn set_all_bounded<V: ToNode>(
        &self,
        property: &Iri,
        values: &[V],
        max_card: usize,
    ) -> Result<()> {
        bridge::set_all_values(&self.graph, &self.resource, property, values, Some(max_card))
            .map_err(|e| self.in_class(e))
    }

    pub fn update<A: ToNode + ?Sized, B: ToNode + ?Sized>(
        &self,
        property: &Iri,
        old: &A,
        new: &B,
    ) -> Result<bool> {
        bridge::update_value(&self.graph, &self.resource, property, old, new)
    }

    pub fn has_value<V: ToNode + ?Sized>(&self, property: &Iri, value: &V) -> Result<bool> {
        bridge::contains_value(&self.graph, &self.resource, property, value)
    }

    pub fn has_any_value(&self, property: &Iri) -> Result<bool> {
        bridge::contains_any_value(&self.graph, &self.resource, property)
    }

    pub fn count(&self, property: &Iri) -> Result<usize> {
        bridge::count_values(&self.graph, &self.resource, property)
    }

    /// Add a value; false if it was already present
    pub fn add<V: ToNode + ?Sized>(&self, property: &Iri, value: &V) -> Result<bool> {
        bridge::add_value(&self.graph, &self.resource, property, value)
    }

    pub fn add_bounded<V: ToNode + ?Sized>(
        &self,
        property: &Iri,
        value: &V,
        max_card: usize,
    ) -> Result<bool> {
        bridge::add_value_bounded(&self.graph, &self.resource, property, value, max_card)
            .map_err(|e| self.in_class(e))
    }

    /// Remove a value; false if it was absent
    pub fn remove<V: ToNode + ?Sized>(&self, property: &Iri, value: &V) -> Result<bool> {
        bridge::remove_value(&self.graph, &self.resource, property, value)
    }

    pub fn remove_bounded<V: ToNode + ?Sized>(
        &self,
        property: &Iri,
        value: &V,
        min_card: usize,
    ) -> Result<bool> {
        bridge::remove_value_bounded(&self.graph, &self.resource, property, value, min_card)
            .map_err(|e| self.in_class(e))
    }

    pub fn remove_all(&self, property: &Iri) -> Result<bool> {
        bridge::remove_all_values(&self.graph, &self.resource, property)
    }

    fn in_class(&self, err: GraphError) -> GraphError {
        match err {
            GraphError::CardinalityViolation {
                subject,
                predicate,
                message,
            } => GraphError::CardinalityViolation {
                subject,
                predicate,
                message: format!("{message} in class {}", self.class),
            },
            other => other,
        }
    }

    // ------------------------------------------------------------------------
    // Store-level helpers
    // ------------------------------------------------------------------------

    /// Whether `(resource, rdf:type, class)` holds
    pub fn has_instance(graph: &GraphHandle, resource: &Resource, class: &Iri) -> Result<bool> {
        bridge::contains_value(graph, resource, &rdf::TYPE, class)
    }

    /// Wrapper for `resource` only when it is typed with `class`
    pub fn get_instance(graph: &GraphHandle, resource: &Resource, class: &Iri) -> Result<Option<Self>> {
        if Self::has_instance(graph, resource, class)? {
            Ok(Some(Self::new(graph.clone(), class.clone(), resource.clone())))
        } else {
            Ok(None)
        }
    }

    /// Every subject typed with `class`, decoded as `T`
    pub fn all_instances<T: FromNode>(graph: &GraphHandle, class: &Iri) -> ReactorResult<T> {
        bridge::get_all_inverse(graph, &rdf::TYPE, class)
    }

    /// Assert `(resource, rdf:type, class)`
    pub fn create_instance(graph: &GraphHandle, resource: &Resource, class: &Iri) -> Result<()> {
        bridge::add_value(graph, resource, &rdf::TYPE, class).map(|_| ())
    }

    /// Retract `(resource, rdf:type, class)`, leaving other statements alone
    pub fn delete_instance(graph: &GraphHandle, resource: &Resource, class: &Iri) -> Result<()> {
        let statement = Statement::new(resource.clone(), rdf::TYPE, class.clone());
        graph.write()?.remove_statement(&statement)
    }
}

impl PartialEq for ReactorBase {
    fn eq(&self, other: &Self) -> bool {
        self.resource == other.resource
    }
}

impl Eq for ReactorBase {}

impl PartialEq<Resource> for ReactorBase {
    fn eq(&self, other: &Resource) -> bool {
        self.resource == *other
    }
}

impl Hash for ReactorBase {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.resource.hash(state);
    }
}

impl fmt::Display for ReactorBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.resource, f)
    }
}

impl fmt::Debug for ReactorBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactorBase")
            .field("resource", &self.resource)
            .field("class", &self.class)
            .finish()
    }
}

impl ToNode for ReactorBase {
    fn to_node(&self) -> Node {
        Node::from(self.resource.clone())
    }
}

/// Wraps without checking for a type assertion; the declared class is
/// `rdfs:Resource`
impl FromNode for ReactorBase {
    fn from_node(graph: &GraphHandle, node: &Node) -> Result<Self> {
        let resource = node
            .as_resource()
            .ok_or_else(|| GraphError::ResourceExpected(node.to_string()))?;
        Ok(Self::new(
            graph.clone(),
            triplemap_core::vocab::rdfs::RESOURCE,
            resource,
        ))
    }
}

// ============================================================================
// Tests
// ============================================================================
