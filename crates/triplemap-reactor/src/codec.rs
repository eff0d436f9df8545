//! Value codec
//!
//! [`ToNode`] encodes application values as graph nodes; [`FromNode`]
//! decodes them back. Resource-like values pass through unchanged, scalars
//! become literals typed with the closest XSD datatype.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use triplemap_core::vocab::xsd;
use triplemap_core::{BlankId, GraphError, GraphHandle, Iri, Literal, Node, Resource, Result};

/// Encode a value as a graph node
pub trait ToNode {
    fn to_node(&self) -> Node;
}

/// Decode a graph node into a value
///
/// `graph` is the store the node was read from; typed wrappers keep it.
pub trait FromNode: Sized {
    fn from_node(graph: &GraphHandle, node: &Node) -> Result<Self>;
}

impl<T: ToNode + ?Sized> ToNode for &T {
    fn to_node(&self) -> Node {
        (**self).to_node()
    }
}

// ============================================================================
// Nodes and resources
// ============================================================================

impl ToNode for Node {
    fn to_node(&self) -> Node {
        self.clone()
    }
}

impl FromNode for Node {
    fn from_node(_graph: &GraphHandle, node: &Node) -> Result<Self> {
        Ok(node.clone())
    }
}

impl ToNode for Resource {
    fn to_node(&self) -> Node {
        Node::from(self.clone())
    }
}

impl FromNode for Resource {
    fn from_node(_graph: &GraphHandle, node: &Node) -> Result<Self> {
        node.as_resource()
            .ok_or_else(|| GraphError::ResourceExpected(node.to_string()))
    }
}

impl ToNode for Iri {
    fn to_node(&self) -> Node {
        Node::Iri(self.clone())
    }
}

impl FromNode for Iri {
    fn from_node(_graph: &GraphHandle, node: &Node) -> Result<Self> {
        match node {
            Node::Iri(iri) => Ok(iri.clone()),
            Node::Blank(_) => Err(GraphError::type_mismatch("IRI", node)),
            Node::Literal(_) => Err(GraphError::ResourceExpected(node.to_string())),
        }
    }
}

impl ToNode for BlankId {
    fn to_node(&self) -> Node {
        Node::Blank(self.clone())
    }
}

impl FromNode for BlankId {
    fn from_node(_graph: &GraphHandle, node: &Node) -> Result<Self> {
        match node {
            Node::Blank(id) => Ok(id.clone()),
            Node::Iri(_) => Err(GraphError::type_mismatch("blank node", node)),
            Node::Literal(_) => Err(GraphError::ResourceExpected(node.to_string())),
        }
    }
}

impl ToNode for Literal {
    fn to_node(&self) -> Node {
        Node::Literal(self.clone())
    }
}

impl FromNode for Literal {
    fn from_node(_graph: &GraphHandle, node: &Node) -> Result<Self> {
        node.as_literal()
            .cloned()
            .ok_or_else(|| GraphError::type_mismatch("literal", node))
    }
}

// ============================================================================
// Scalars
// ============================================================================

fn literal<'a>(node: &'a Node, expected: &str) -> Result<&'a Literal> {
    node.as_literal()
        .ok_or_else(|| GraphError::type_mismatch(expected, node))
}

impl ToNode for str {
    fn to_node(&self) -> Node {
        Node::Literal(Literal::plain(self))
    }
}

impl ToNode for String {
    fn to_node(&self) -> Node {
        self.as_str().to_node()
    }
}

/// Any literal decodes to its lexical form
impl FromNode for String {
    fn from_node(_graph: &GraphHandle, node: &Node) -> Result<Self> {
        Ok(literal(node, "string")?.lexical().to_string())
    }
}

impl ToNode for bool {
    fn to_node(&self) -> Node {
        Node::Literal(Literal::typed(self.to_string(), xsd::BOOLEAN))
    }
}

impl FromNode for bool {
    fn from_node(_graph: &GraphHandle, node: &Node) -> Result<Self> {
        match literal(node, "bool")?.lexical().trim() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(GraphError::type_mismatch("bool", node)),
        }
    }
}

macro_rules! numeric_codec {
    ($($ty:ty => $datatype:expr),* $(,)?) => {
        $(
            impl ToNode for $ty {
                fn to_node(&self) -> Node {
                    Node::Literal(Literal::typed(self.to_string(), $datatype))
                }
            }

            impl FromNode for $ty {
                fn from_node(_graph: &GraphHandle, node: &Node) -> Result<Self> {
                    literal(node, stringify!($ty))?
                        .lexical()
                        .trim()
                        .parse::<$ty>()
                        .map_err(|_| GraphError::type_mismatch(stringify!($ty), node))
                }
            }
        )*
    };
}

numeric_codec! {
    i32 => xsd::INT,
    i64 => xsd::LONG,
    u32 => xsd::UNSIGNED_INT,
    u64 => xsd::UNSIGNED_LONG,
    f32 => xsd::FLOAT,
    f64 => xsd::DOUBLE,
}

impl ToNode for NaiveDate {
    fn to_node(&self) -> Node {
        Node::Literal(Literal::typed(self.format("%Y-%m-%d").to_string(), xsd::DATE))
    }
}

impl FromNode for NaiveDate {
    fn from_node(_graph: &GraphHandle, node: &Node) -> Result<Self> {
        NaiveDate::parse_from_str(literal(node, "date")?.lexical().trim(), "%Y-%m-%d")
            .map_err(|_| GraphError::type_mismatch("date", node))
    }
}

impl ToNode for DateTime<Utc> {
    fn to_node(&self) -> Node {
        Node::Literal(Literal::typed(
            self.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            xsd::DATE_TIME,
        ))
    }
}

impl FromNode for DateTime<Utc> {
    fn from_node(_graph: &GraphHandle, node: &Node) -> Result<Self> {
        DateTime::parse_from_rfc3339(literal(node, "dateTime")?.lexical().trim())
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| GraphError::type_mismatch("dateTime", node))
    }
}

// ============================================================================
// Tests
// ============================================================================
