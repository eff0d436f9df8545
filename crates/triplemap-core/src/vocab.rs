//! Well-known vocabulary IRIs

use crate::Iri;

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS_NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const OWL_NS: &str = "http://www.w3.org/2002/07/owl#";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";

pub mod rdf {
    use super::Iri;

    pub const TYPE: Iri = Iri::from_static("http://www.w3.org/1999/02/22-rdf-syntax-ns#type");
    pub const PROPERTY: Iri =
        Iri::from_static("http://www.w3.org/1999/02/22-rdf-syntax-ns#Property");
}

pub mod rdfs {
    use super::Iri;

    pub const RESOURCE: Iri = Iri::from_static("http://www.w3.org/2000/01/rdf-schema#Resource");
    pub const CLASS: Iri = Iri::from_static("http://www.w3.org/2000/01/rdf-schema#Class");
    pub const LABEL: Iri = Iri::from_static("http://www.w3.org/2000/01/rdf-schema#label");
    pub const COMMENT: Iri = Iri::from_static("http://www.w3.org/2000/01/rdf-schema#comment");
    pub const DOMAIN: Iri = Iri::from_static("http://www.w3.org/2000/01/rdf-schema#domain");
    pub const RANGE: Iri = Iri::from_static("http://www.w3.org/2000/01/rdf-schema#range");
    pub const SUB_CLASS_OF: Iri =
        Iri::from_static("http://www.w3.org/2000/01/rdf-schema#subClassOf");
    pub const SUB_PROPERTY_OF: Iri =
        Iri::from_static("http://www.w3.org/2000/01/rdf-schema#subPropertyOf");
}

pub mod owl {
    use super::Iri;

    pub const CLASS: Iri = Iri::from_static("http://www.w3.org/2002/07/owl#Class");
    pub const OBJECT_PROPERTY: Iri =
        Iri::from_static("http://www.w3.org/2002/07/owl#ObjectProperty");
    pub const INVERSE_OF: Iri = Iri::from_static("http://www.w3.org/2002/07/owl#inverseOf");
    pub const DISJOINT_WITH: Iri = Iri::from_static("http://www.w3.org/2002/07/owl#disjointWith");
}

/// XSD datatypes used by the value codec
pub mod xsd {
    use super::Iri;

    pub const STRING: Iri = Iri::from_static("http://www.w3.org/2001/XMLSchema#string");
    pub const BOOLEAN: Iri = Iri::from_static("http://www.w3.org/2001/XMLSchema#boolean");
    pub const INT: Iri = Iri::from_static("http://www.w3.org/2001/XMLSchema#int");
    pub const LONG: Iri = Iri::from_static("http://www.w3.org/2001/XMLSchema#long");
    pub const INTEGER: Iri = Iri::from_static("http://www.w3.org/2001/XMLSchema#integer");
    pub const UNSIGNED_INT: Iri = Iri::from_static("http://www.w3.org/2001/XMLSchema#unsignedInt");
    pub const UNSIGNED_LONG: Iri =
        Iri::from_static("http://www.w3.org/2001/XMLSchema#unsignedLong");
    pub const FLOAT: Iri = Iri::from_static("http://www.w3.org/2001/XMLSchema#float");
    pub const DOUBLE: Iri = Iri::from_static("http://www.w3.org/2001/XMLSchema#double");
    pub const DECIMAL: Iri = Iri::from_static("http://www.w3.org/2001/XMLSchema#decimal");
    pub const DATE: Iri = Iri::from_static("http://www.w3.org/2001/XMLSchema#date");
    pub const DATE_TIME: Iri = Iri::from_static("http://www.w3.org/2001/XMLSchema#dateTime");
}
