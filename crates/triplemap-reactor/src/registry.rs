//! Class registry
//!
//! Maps application types to schema class IRIs and back. The registry is
//! filled explicitly at start-up instead of being discovered at run time.

use std::any::{type_name, TypeId};
use std::collections::{BTreeMap, HashMap};

use triplemap_core::vocab::rdf;
use triplemap_core::{GraphHandle, Iri, Resource, Result};

use crate::bridge;
use crate::class::ReactorClass;
use crate::schema::owl::{ObjectProperty, OwlClass};

/// Registered class entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassEntry {
    pub class: Iri,
    pub type_name: &'static str,
}

/// Application type ↔ class IRI table
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    by_type: HashMap<TypeId, Iri>,
    by_class: BTreeMap<Iri, &'static str>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the classes shipped in [`schema`](crate::schema)
    pub fn builtin() -> Self {
        Self::new().with::<OwlClass>().with::<ObjectProperty>()
    }

    /// Register `T` under its class IRI
    ///
    /// A later registration for the same class IRI replaces the type name.
    pub fn register<T: ReactorClass + 'static>(&mut self) -> &mut Self {
        let class = T::RDFS_CLASS;
        tracing::debug!(class = %class, type_name = type_name::<T>(), "Registered class");
        self.by_type.insert(TypeId::of::<T>(), class.clone());
        self.by_class.insert(class, type_name::<T>());
        self
    }

    pub fn with<T: ReactorClass + 'static>(mut self) -> Self {
        self.register::<T>();
        self
    }

    /// Class IRI registered for `T`
    pub fn class_of<T: 'static>(&self) -> Option<&Iri> {
        self.by_type.get(&TypeId::of::<T>())
    }

    /// Type name registered for a class IRI
    pub fn type_name_for(&self, class: &Iri) -> Option<&'static str> {
        self.by_class.get(class).copied()
    }

    pub fn contains_class(&self, class: &Iri) -> bool {
        self.by_class.contains_key(class)
    }

    pub fn len(&self) -> usize {
        self.by_class.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_class.is_empty()
    }

    /// Entries ordered by class IRI
    pub fn entries(&self) -> impl Iterator<Item = ClassEntry> + '_ {
        self.by_class.iter().map(|(class, type_name)| ClassEntry {
            class: class.clone(),
            type_name,
        })
    }

    /// Registered entries matching the `rdf:type` values of `resource`
    pub fn types_of(&self, graph: &GraphHandle, resource: &Resource) -> Result<Vec<ClassEntry>> {
        let classes: Vec<Iri> = bridge::get_all_values(graph, resource, &rdf::TYPE).to_vec()?;
        Ok(classes
            .into_iter()
            .filter_map(|class| {
                let type_name = self.type_name_for(&class)?;
                Some(ClassEntry { class, type_name })
            })
            .collect())
    }
}
