//! Graph data model
//!
//! Nodes are the values of a graph. A node is one of:
//! - An IRI (globally unique resource name)
//! - A blank node (identifier scoped to one store)
//! - A literal (lexical form + optional datatype or language tag)
//!
//! IRIs and blank nodes together form [`Resource`], the only kind of node
//! allowed in subject position. All types are immutable once built and
//! compare structurally.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

use crate::{GraphError, Result};

// ============================================================================
// IRI
// ============================================================================

/// An absolute IRI, stored without angle brackets
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iri(Cow<'static, str>);

impl Iri {
    /// Parse and validate an IRI
    ///
    /// The text must contain a scheme separator and no whitespace,
    /// control characters, or any of `<`, `>`, `"`, `{`, `}`, `|`, `^`, `` ` ``, `\`.
    pub fn parse(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.is_empty() {
            return Err(GraphError::InvalidNode("empty IRI".to_string()));
        }
        if let Some(bad) = text.chars().find(|c| is_forbidden_iri_char(*c)) {
            return Err(GraphError::InvalidNode(format!(
                "IRI {text:?} contains forbidden character {bad:?}"
            )));
        }
        if !text.contains(':') {
            return Err(GraphError::InvalidNode(format!(
                "IRI {text:?} has no scheme"
            )));
        }
        Ok(Self(Cow::Owned(text)))
    }

    /// Wrap a string known to be a valid IRI
    pub fn new_unchecked(text: impl Into<String>) -> Self {
        Self(Cow::Owned(text.into()))
    }

    /// IRI constant for vocabulary tables
    pub const fn from_static(text: &'static str) -> Self {
        Self(Cow::Borrowed(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this IRI lies in the namespace `prefix`
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    /// N-Triples form (`<iri>`)
    pub fn to_ntriples(&self) -> String {
        format!("<{}>", self.0)
    }
}

fn is_forbidden_iri_char(c: char) -> bool {
    c.is_whitespace()
        || c.is_control()
        || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\')
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Iri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Blank node
// ============================================================================

/// Blank node identifier
///
/// Labels are stable within one store but carry no meaning outside it.
/// The label does not include the `_:` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlankId(String);

impl BlankId {
    /// Create a blank node ID from a label
    pub fn new(label: impl Into<String>) -> Result<Self> {
        let label = label.into();
        let valid = !label.is_empty()
            && !label.ends_with('.')
            && label
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(GraphError::InvalidNode(format!(
                "invalid blank node label {label:?}"
            )));
        }
        Ok(Self(label))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.0)
    }
}

// ============================================================================
// Literal
// ============================================================================

/// A scalar graph value
///
/// A literal is plain, typed (with a datatype IRI), or language-tagged.
/// It never carries both a datatype and a language tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    lexical: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    datatype: Option<Iri>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    language: Option<String>,
}

impl Literal {
    /// Plain literal without datatype or language
    pub fn plain(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: None,
        }
    }

    /// Literal with an explicit datatype
    pub fn typed(lexical: impl Into<String>, datatype: Iri) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: Some(datatype),
            language: None,
        }
    }

    /// Language-tagged literal
    pub fn with_language(lexical: impl Into<String>, language: impl Into<String>) -> Result<Self> {
        let language = language.into();
        let valid = !language.is_empty()
            && language
                .split('-')
                .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric()));
        if !valid {
            return Err(GraphError::InvalidNode(format!(
                "invalid language tag {language:?}"
            )));
        }
        Ok(Self {
            lexical: lexical.into(),
            datatype: None,
            language: Some(language),
        })
    }

    pub fn lexical(&self) -> &str {
        &self.lexical
    }

    pub fn datatype(&self) -> Option<&Iri> {
        self.datatype.as_ref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// N-Triples form with escapes applied
    pub fn to_ntriples(&self) -> String {
        let mut out = String::with_capacity(self.lexical.len() + 2);
        out.push('"');
        for c in self.lexical.chars() {
            match c {
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                _ => out.push(c),
            }
        }
        out.push('"');
        if let Some(lang) = &self.language {
            out.push('@');
            out.push_str(lang);
        } else if let Some(datatype) = &self.datatype {
            out.push_str("^^");
            out.push_str(&datatype.to_ntriples());
        }
        out
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ntriples())
    }
}

// ============================================================================
// Resource and Node
// ============================================================================

/// A node allowed in subject position
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Iri(Iri),
    Blank(BlankId),
}

impl Resource {
    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Self::Iri(iri) => Some(iri),
            Self::Blank(_) => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Blank(_))
    }

    pub fn to_ntriples(&self) -> String {
        match self {
            Self::Iri(iri) => iri.to_ntriples(),
            Self::Blank(id) => id.to_string(),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ntriples())
    }
}

impl From<Iri> for Resource {
    fn from(iri: Iri) -> Self {
        Self::Iri(iri)
    }
}

impl From<BlankId> for Resource {
    fn from(id: BlankId) -> Self {
        Self::Blank(id)
    }
}

impl TryFrom<Node> for Resource {
    type Error = GraphError;

    fn try_from(node: Node) -> Result<Self> {
        match node {
            Node::Iri(iri) => Ok(Self::Iri(iri)),
            Node::Blank(id) => Ok(Self::Blank(id)),
            Node::Literal(lit) => Err(GraphError::ResourceExpected(lit.to_string())),
        }
    }
}

/// Any graph value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Iri(Iri),
    Blank(BlankId),
    Literal(Literal),
}

impl Node {
    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Self::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// View this node as a resource, if it is one
    pub fn as_resource(&self) -> Option<Resource> {
        match self {
            Self::Iri(iri) => Some(Resource::Iri(iri.clone())),
            Self::Blank(id) => Some(Resource::Blank(id.clone())),
            Self::Literal(_) => None,
        }
    }

    pub fn to_ntriples(&self) -> String {
        match self {
            Self::Iri(iri) => iri.to_ntriples(),
            Self::Blank(id) => id.to_string(),
            Self::Literal(lit) => lit.to_ntriples(),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ntriples())
    }
}

impl From<Resource> for Node {
    fn from(resource: Resource) -> Self {
        match resource {
            Resource::Iri(iri) => Self::Iri(iri),
            Resource::Blank(id) => Self::Blank(id),
        }
    }
}

impl From<Iri> for Node {
    fn from(iri: Iri) -> Self {
        Self::Iri(iri)
    }
}

impl From<BlankId> for Node {
    fn from(id: BlankId) -> Self {
        Self::Blank(id)
    }
}

impl From<Literal> for Node {
    fn from(lit: Literal) -> Self {
        Self::Literal(lit)
    }
}

impl PartialEq<Resource> for Node {
    fn eq(&self, other: &Resource) -> bool {
        match (self, other) {
            (Self::Iri(a), Resource::Iri(b)) => a == b,
            (Self::Blank(a), Resource::Blank(b)) => a == b,
            _ => false,
        }
    }
}

// ============================================================================
// Statement and pattern
// ============================================================================

/// A (subject, predicate, object) fact
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Statement {
    pub subject: Resource,
    pub predicate: Iri,
    pub object: Node,
}

impl Statement {
    pub fn new(subject: impl Into<Resource>, predicate: Iri, object: impl Into<Node>) -> Self {
        Self {
            subject: subject.into(),
            predicate,
            object: object.into(),
        }
    }

    /// One N-Triples line, without the trailing newline
    pub fn to_ntriples(&self) -> String {
        format!(
            "{} {} {} .",
            self.subject.to_ntriples(),
            self.predicate.to_ntriples(),
            self.object.to_ntriples()
        )
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ntriples())
    }
}

/// Statement pattern where `None` matches anything
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TriplePattern {
    pub subject: Option<Resource>,
    pub predicate: Option<Iri>,
    pub object: Option<Node>,
}

impl TriplePattern {
    pub fn new(subject: Option<Resource>, predicate: Option<Iri>, object: Option<Node>) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// Pattern matching every statement
    pub fn any() -> Self {
        Self::default()
    }

    /// `(subject, predicate, *)`
    pub fn subject_predicate(subject: &Resource, predicate: &Iri) -> Self {
        Self::new(Some(subject.clone()), Some(predicate.clone()), None)
    }

    /// `(*, predicate, object)`
    pub fn predicate_object(predicate: &Iri, object: &Node) -> Self {
        Self::new(None, Some(predicate.clone()), Some(object.clone()))
    }

    /// Pattern matching exactly `statement`
    pub fn exact(statement: &Statement) -> Self {
        Self::new(
            Some(statement.subject.clone()),
            Some(statement.predicate.clone()),
            Some(statement.object.clone()),
        )
    }

    pub fn matches(&self, statement: &Statement) -> bool {
        self.subject.as_ref().map_or(true, |s| *s == statement.subject)
            && self.predicate.as_ref().map_or(true, |p| *p == statement.predicate)
            && self.object.as_ref().map_or(true, |o| *o == statement.object)
    }

    /// Whether every position is bound
    pub fn is_concrete(&self) -> bool {
        self.subject.is_some() && self.predicate.is_some() && self.object.is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(s: &str) -> Iri {
        Iri::parse(s).unwrap()
    }

    #[test]
    fn test_iri_validation() {
        assert!(Iri::parse("urn:test:a").is_ok());
        assert!(Iri::parse("http://example.com/a#b").is_ok());
        assert!(Iri::parse("").is_err());
        assert!(Iri::parse("no-scheme").is_err());
        assert!(Iri::parse("urn:test:a b").is_err());
        assert!(Iri::parse("urn:test:<a>").is_err());
    }

    #[test]
    fn test_static_and_owned_iri_equal() {
        const TYPE: Iri = Iri::from_static("http://www.w3.org/1999/02/22-rdf-syntax-ns#type");
        let owned = iri("http://www.w3.org/1999/02/22-rdf-syntax-ns#type");
        assert_eq!(TYPE, owned);
    }

    #[test]
    fn test_blank_label_validation() {
        assert!(BlankId::new("b0").is_ok());
        assert!(BlankId::new("node-1.x").is_ok());
        assert!(BlankId::new("").is_err());
        assert!(BlankId::new("trailing.").is_err());
        assert!(BlankId::new("has space").is_err());
    }

    #[test]
    fn test_literal_forms() {
        let plain = Literal::plain("say \"hi\"\n");
        assert_eq!(plain.to_ntriples(), r#""say \"hi\"\n""#);

        let typed = Literal::typed("42", iri("http://www.w3.org/2001/XMLSchema#int"));
        assert_eq!(
            typed.to_ntriples(),
            "\"42\"^^<http://www.w3.org/2001/XMLSchema#int>"
        );

        let tagged = Literal::with_language("Hallo", "de-AT").unwrap();
        assert_eq!(tagged.to_ntriples(), "\"Hallo\"@de-AT");
        assert!(Literal::with_language("x", "de_AT").is_err());
    }

    #[test]
    fn test_literal_identity_is_structural() {
        let a = Literal::plain("1");
        let b = Literal::typed("1", iri("http://www.w3.org/2001/XMLSchema#string"));
        assert_ne!(a, b);
        assert_eq!(a, Literal::plain("1"));
    }

    #[test]
    fn test_resource_from_literal_fails() {
        let node = Node::from(Literal::plain("x"));
        let err = Resource::try_from(node).unwrap_err();
        assert!(matches!(err, GraphError::ResourceExpected(_)));
    }

    #[test]
    fn test_pattern_matching() {
        let s = Resource::from(iri("urn:test:s"));
        let p = iri("urn:test:p");
        let st = Statement::new(s.clone(), p.clone(), Literal::plain("v"));

        assert!(TriplePattern::any().matches(&st));
        assert!(TriplePattern::subject_predicate(&s, &p).matches(&st));
        assert!(TriplePattern::exact(&st).matches(&st));
        assert!(TriplePattern::exact(&st).is_concrete());

        let other = Resource::from(iri("urn:test:other"));
        assert!(!TriplePattern::subject_predicate(&other, &p).matches(&st));
    }

    #[test]
    fn test_statement_ntriples() {
        let st = Statement::new(
            BlankId::new("b1").unwrap(),
            iri("urn:test:p"),
            iri("urn:test:o"),
        );
        assert_eq!(st.to_string(), "_:b1 <urn:test:p> <urn:test:o> .");
    }
}
