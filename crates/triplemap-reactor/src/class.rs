//! Application types bound to a schema class

use triplemap_core::{GraphHandle, Iri, Resource, Result};

use crate::base::ReactorBase;
use crate::codec::{FromNode, ToNode};
use crate::result::ReactorResult;

/// A typed wrapper for instances of one schema class
///
/// Implementations are normally generated with
/// [`reactor_class!`](crate::reactor_class).
pub trait ReactorClass: FromNode + ToNode + Sized {
    /// Class IRI instances are typed with
    const RDFS_CLASS: Iri;

    fn from_base(base: ReactorBase) -> Self;

    fn base(&self) -> &ReactorBase;

    fn resource(&self) -> &Resource {
        self.base().resource()
    }

    /// Wrap `resource` without writing anything
    fn wrap(graph: &GraphHandle, resource: Resource) -> Self {
        Self::from_base(ReactorBase::new(graph.clone(), Self::RDFS_CLASS, resource))
    }

    /// Wrap `resource`, asserting its type if missing
    fn create(graph: &GraphHandle, resource: Resource) -> Result<Self> {
        ReactorBase::new_typed(graph.clone(), Self::RDFS_CLASS, resource).map(Self::from_base)
    }

    /// New instance with a fresh resource
    fn fresh(graph: &GraphHandle) -> Result<Self> {
        ReactorBase::new_fresh(graph.clone(), Self::RDFS_CLASS).map(Self::from_base)
    }

    fn has_instance(graph: &GraphHandle, resource: &Resource) -> Result<bool> {
        ReactorBase::has_instance(graph, resource, &Self::RDFS_CLASS)
    }

    /// Wrapper only when `resource` is typed with this class
    fn get_instance(graph: &GraphHandle, resource: &Resource) -> Result<Option<Self>> {
        Ok(ReactorBase::get_instance(graph, resource, &Self::RDFS_CLASS)?.map(Self::from_base))
    }

    fn all_instances(graph: &GraphHandle) -> ReactorResult<Self> {
        ReactorBase::all_instances(graph, &Self::RDFS_CLASS)
    }

    fn create_instance(graph: &GraphHandle, resource: &Resource) -> Result<()> {
        ReactorBase::create_instance(graph, resource, &Self::RDFS_CLASS)
    }

    /// Retract only the type assertion
    fn delete_instance(graph: &GraphHandle, resource: &Resource) -> Result<()> {
        ReactorBase::delete_instance(graph, resource, &Self::RDFS_CLASS)
    }
}
