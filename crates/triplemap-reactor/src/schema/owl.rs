//! OWL vocabulary classes

use triplemap_core::vocab::{owl, rdfs};

crate::reactor_class! {
    /// An `owl:Class`
    pub struct OwlClass: owl::CLASS;

    property DISJOINT_WITH = owl::DISJOINT_WITH => OwlClass {
        get: disjoint_with,
        get_all: all_disjoint_with,
        add: add_disjoint_with,
        set: set_disjoint_with,
        remove: remove_disjoint_with,
        remove_all: remove_all_disjoint_with,
        inverse: disjoint_with_class,
    }

    property LABEL = rdfs::LABEL => String {
        get: label,
        get_all: all_labels,
        add: add_label,
        set: set_label,
        remove: remove_label,
        remove_all: remove_all_labels,
        inverse: with_label,
    }
}

crate::reactor_class! {
    /// An `owl:ObjectProperty`
    pub struct ObjectProperty: owl::OBJECT_PROPERTY;

    property INVERSE_OF = owl::INVERSE_OF => ObjectProperty {
        get: inverse_of,
        get_all: all_inverse_of,
        add: add_inverse_of,
        set: set_inverse_of,
        remove: remove_inverse_of,
        remove_all: remove_all_inverse_of,
        inverse: inverse_of_property,
    }

    property DOMAIN = rdfs::DOMAIN => OwlClass {
        get: domain,
        get_all: all_domains,
        add: add_domain,
        set: set_domain,
        remove: remove_domain,
        remove_all: remove_all_domains,
        inverse: with_domain,
    }

    property RANGE = rdfs::RANGE => OwlClass {
        get: range,
        get_all: all_ranges,
        add: add_range,
        set: set_range,
        remove: remove_range,
        remove_all: remove_all_ranges,
        inverse: with_range,
    }
}

impl ObjectProperty {
    /// Declare `other` as the inverse of this property, in both directions
    pub fn link_inverse(&self, other: &ObjectProperty) -> triplemap_core::Result<()> {
        self.add_inverse_of(other)?;
        other.add_inverse_of(self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ReactorBase, ReactorClass};
    use triplemap_core::vocab::rdf;
    use triplemap_core::{GraphHandle, Iri, Node, Resource, Statement};
    use triplemap_graph::MemoryStore;

    fn iri(value: &'static str) -> Resource {
        Resource::from(Iri::new_unchecked(value))
    }

    #[test]
    fn test_create_asserts_type() {
        let graph = GraphHandle::new(MemoryStore::new());
        let person = OwlClass::create(&graph, iri("urn:ex:Person")).unwrap();

        assert!(OwlClass::has_instance(&graph, person.resource()).unwrap());
        assert!(!ObjectProperty::has_instance(&graph, person.resource()).unwrap());
        assert_eq!(person.base().types().unwrap(), vec![owl::CLASS]);
    }

    #[test]
    fn test_object_property_domain_and_range() {
        let graph = GraphHandle::new(MemoryStore::new());
        let person = OwlClass::create(&graph, iri("urn:ex:Person")).unwrap();
        let org = OwlClass::create(&graph, iri("urn:ex:Organisation")).unwrap();
        let works_for = ObjectProperty::create(&graph, iri("urn:ex:worksFor")).unwrap();

        works_for.set_domain(&person).unwrap();
        works_for.set_range(&org).unwrap();
        works_for.set_range(&person).unwrap();

        assert_eq!(works_for.domain().unwrap(), Some(person.clone()));
        assert_eq!(works_for.all_ranges().to_vec().unwrap(), vec![person.clone()]);

        let with_domain = ObjectProperty::with_domain(&graph, &person).to_vec().unwrap();
        assert_eq!(with_domain, vec![works_for]);
    }

    #[test]
    fn test_link_inverse_is_symmetric() {
        let graph = GraphHandle::new(MemoryStore::new());
        let parent = ObjectProperty::create(&graph, iri("urn:ex:hasParent")).unwrap();
        let child = ObjectProperty::create(&graph, iri("urn:ex:hasChild")).unwrap();

        parent.link_inverse(&child).unwrap();

        assert_eq!(parent.inverse_of().unwrap(), Some(child.clone()));
        assert_eq!(child.inverse_of().unwrap(), Some(parent.clone()));
        assert!(!parent.add_inverse_of(&child).unwrap());
    }

    #[test]
    fn test_labels_and_disjointness() {
        let graph = GraphHandle::new(MemoryStore::new());
        let cat = OwlClass::create(&graph, iri("urn:ex:Cat")).unwrap();
        let dog = OwlClass::create(&graph, iri("urn:ex:Dog")).unwrap();

        cat.add_label(&"Cat".to_string()).unwrap();
        cat.add_label(&"Katze".to_string()).unwrap();
        assert_eq!(cat.all_labels().count().unwrap(), 2);
        cat.set_label(&"Chat".to_string()).unwrap();
        assert_eq!(cat.label().unwrap().as_deref(), Some("Chat"));

        cat.add_disjoint_with(&dog).unwrap();
        assert_eq!(OwlClass::disjoint_with_class(&graph, &dog).to_vec().unwrap(), vec![cat.clone()]);
        assert!(cat.remove_all_disjoint_with().unwrap());
        assert_eq!(cat.disjoint_with().unwrap(), None);
    }

    #[test]
    fn test_wrapper_equals_resource_and_base() {
        let graph = GraphHandle::new(MemoryStore::new());
        let resource = iri("urn:ex:Thing");
        let class = OwlClass::wrap(&graph, resource.clone());

        assert!(class == resource);
        assert_eq!(class.to_string(), "<urn:ex:Thing>");
        assert_eq!(
            class.base().clone(),
            ReactorBase::new(graph.clone(), owl::CLASS, resource.clone())
        );
        assert!(!OwlClass::has_instance(&graph, &resource).unwrap());
    }

    #[test]
    fn test_from_node_rejects_literal() {
        let graph = GraphHandle::new(MemoryStore::new());
        {
            let mut store = graph.write().unwrap();
            store
                .add_statement(Statement::new(
                    iri("urn:ex:p"),
                    owl::INVERSE_OF,
                    Node::from(triplemap_core::Literal::plain("oops")),
                ))
                .unwrap();
            store
                .add_statement(Statement::new(iri("urn:ex:p"), rdf::TYPE, owl::OBJECT_PROPERTY))
                .unwrap();
        }
        let property = ObjectProperty::wrap(&graph, iri("urn:ex:p"));
        assert!(property.inverse_of().is_err());
    }
}
