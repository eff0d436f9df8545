//! In-memory graph store
//!
//! Statements are kept in a subject → predicate → objects index with a
//! secondary object index for inverse lookups. Iteration order is the
//! natural ordering of statements, so dumps are deterministic.

use std::collections::{BTreeMap, BTreeSet};

use triplemap_core::ntriples::{self, PatternTerm};
use triplemap_core::store::store_closed;
use triplemap_core::{
    ClosableIterator, GraphError, GraphStore, Iri, Node, QueryRow, Resource, Result, Statement,
    TriplePattern,
};
use uuid::Uuid;

/// Ordered in-memory statement set
#[derive(Debug, Clone)]
pub struct MemoryStore {
    spo: BTreeMap<Resource, BTreeMap<Iri, BTreeSet<Node>>>,
    /// object → (subject, predicate)
    ops: BTreeMap<Node, BTreeSet<(Resource, Iri)>>,
    len: usize,
    open: bool,
}

impl MemoryStore {
    /// Create an empty, open store
    pub fn new() -> Self {
        Self {
            spo: BTreeMap::new(),
            ops: BTreeMap::new(),
            len: 0,
            open: true,
        }
    }

    /// Create an open store holding `statements`
    pub fn from_statements(statements: impl IntoIterator<Item = Statement>) -> Self {
        let mut store = Self::new();
        for statement in statements {
            store.insert(statement);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn ensure_open(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(store_closed("memory store"))
        }
    }

    fn insert(&mut self, statement: Statement) -> bool {
        let Statement {
            subject,
            predicate,
            object,
        } = statement;
        let inserted = self
            .spo
            .entry(subject.clone())
            .or_default()
            .entry(predicate.clone())
            .or_default()
            .insert(object.clone());
        if inserted {
            self.ops
                .entry(object)
                .or_default()
                .insert((subject, predicate));
            self.len += 1;
        }
        inserted
    }

    fn delete(&mut self, statement: &Statement) -> bool {
        let Some(predicates) = self.spo.get_mut(&statement.subject) else {
            return false;
        };
        let Some(objects) = predicates.get_mut(&statement.predicate) else {
            return false;
        };
        if !objects.remove(&statement.object) {
            return false;
        }
        if objects.is_empty() {
            predicates.remove(&statement.predicate);
        }
        if predicates.is_empty() {
            self.spo.remove(&statement.subject);
        }

        if let Some(pairs) = self.ops.get_mut(&statement.object) {
            pairs.remove(&(statement.subject.clone(), statement.predicate.clone()));
            if pairs.is_empty() {
                self.ops.remove(&statement.object);
            }
        }
        self.len -= 1;
        true
    }

    /// Collect every statement matching the pattern, choosing the index by
    /// which positions are bound
    fn matching(&self, pattern: &TriplePattern) -> Vec<Statement> {
        let want_p = pattern.predicate.as_ref();

        if let Some(subject) = &pattern.subject {
            let Some(predicates) = self.spo.get(subject) else {
                return Vec::new();
            };
            return predicates
                .iter()
                .filter(move |(p, _)| want_p.map_or(true, |want| want == *p))
                .flat_map(move |(p, objects)| {
                    objects.iter().map(move |o| Statement {
                        subject: subject.clone(),
                        predicate: p.clone(),
                        object: o.clone(),
                    })
                })
                .filter(|st| pattern.matches(st))
                .collect();
        }

        if let Some(object) = &pattern.object {
            let Some(pairs) = self.ops.get(object) else {
                return Vec::new();
            };
            return pairs
                .iter()
                .filter(move |(_, p)| want_p.map_or(true, |want| want == p))
                .map(|(s, p)| Statement {
                    subject: s.clone(),
                    predicate: p.clone(),
                    object: object.clone(),
                })
                .collect();
        }

        self.spo
            .iter()
            .flat_map(move |(s, predicates)| {
                predicates
                    .iter()
                    .filter(move |(p, _)| want_p.map_or(true, |want| want == *p))
                    .flat_map(move |(p, objects)| {
                        objects.iter().map(move |o| Statement {
                            subject: s.clone(),
                            predicate: p.clone(),
                            object: o.clone(),
                        })
                    })
            })
            .collect()
    }

    fn is_used(&self, resource: &Resource) -> bool {
        self.spo.contains_key(resource) || self.ops.contains_key(&Node::from(resource.clone()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphStore for MemoryStore {
    fn open(&mut self) -> Result<()> {
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn contains(&self, pattern: &TriplePattern) -> Result<bool> {
        self.ensure_open()?;
        if let (Some(s), Some(p), Some(o)) = (&pattern.subject, &pattern.predicate, &pattern.object)
        {
            return Ok(self
                .spo
                .get(s)
                .and_then(|predicates| predicates.get(p))
                .is_some_and(|objects| objects.contains(o)));
        }
        Ok(!self.matching(pattern).is_empty())
    }

    fn add_statement(&mut self, statement: Statement) -> Result<()> {
        self.ensure_open()?;
        self.insert(statement);
        Ok(())
    }

    fn remove_statement(&mut self, statement: &Statement) -> Result<()> {
        self.ensure_open()?;
        self.delete(statement);
        Ok(())
    }

    fn remove_statements(&mut self, pattern: &TriplePattern) -> Result<()> {
        self.ensure_open()?;
        if *pattern == TriplePattern::any() {
            self.spo.clear();
            self.ops.clear();
            self.len = 0;
            return Ok(());
        }
        for statement in self.matching(pattern) {
            self.delete(&statement);
        }
        Ok(())
    }

    fn find_statements(&self, pattern: &TriplePattern) -> Result<ClosableIterator<Statement>> {
        self.ensure_open()?;
        Ok(ClosableIterator::new(self.matching(pattern).into_iter()))
    }

    /// Run a single triple pattern such as `?x <urn:p> ?y`
    ///
    /// Each row binds every variable; a variable used twice must bind the
    /// same node in both positions.
    fn query(&self, query: &str) -> Result<ClosableIterator<QueryRow>> {
        self.ensure_open()?;
        let [s, p, o] = ntriples::parse_pattern(query)?;

        let subject = match &s {
            PatternTerm::Variable(_) => None,
            PatternTerm::Node(node) => Some(
                node.as_resource()
                    .ok_or_else(|| GraphError::InvalidNode(format!("{node} cannot be a subject")))?,
            ),
        };
        let predicate = match &p {
            PatternTerm::Variable(_) => None,
            PatternTerm::Node(node) => Some(
                node.as_iri()
                    .cloned()
                    .ok_or_else(|| GraphError::InvalidNode(format!("{node} cannot be a predicate")))?,
            ),
        };
        let object = match &o {
            PatternTerm::Variable(_) => None,
            PatternTerm::Node(node) => Some(node.clone()),
        };

        let pattern = TriplePattern::new(subject, predicate, object);
        let rows: Vec<QueryRow> = self
            .matching(&pattern)
            .into_iter()
            .filter_map(|st| {
                let mut row = QueryRow::new();
                let bindings = [
                    (&s, Node::from(st.subject)),
                    (&p, Node::from(st.predicate)),
                    (&o, st.object),
                ];
                for (term, value) in bindings {
                    if let PatternTerm::Variable(name) = term {
                        match row.get(name) {
                            Some(bound) if *bound != value => return None,
                            Some(_) => {}
                            None => {
                                row.insert(name.clone(), value);
                            }
                        }
                    }
                }
                Some(row)
            })
            .collect();

        tracing::debug!(query, rows = rows.len(), "Memory store query");
        Ok(ClosableIterator::new(rows.into_iter()))
    }

    fn new_unique_resource(&self) -> Result<Resource> {
        self.ensure_open()?;
        loop {
            let candidate = Resource::Iri(Iri::new_unchecked(format!("urn:uuid:{}", Uuid::new_v4())));
            if !self.is_used(&candidate) {
                return Ok(candidate);
            }
        }
    }

    fn size(&self) -> Result<usize> {
        self.ensure_open()?;
        Ok(self.len)
    }
}

// ============================================================================
// Tests
// ============================================================================
