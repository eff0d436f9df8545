//! Graph rewrite rules
//!
//! A [`TransformRule`] rewrites statements in place through the
//! [`GraphStore`] interface, so rules work on any store, including
//! auto-persisted ones. [`Transformer`] applies an ordered list of rules.
//!
//! A rule always completes its in-memory rewrite; a commit failure raised
//! along the way is returned once the rule has finished.

use serde::Serialize;
use triplemap_core::ntriples::{self, PatternTerm};
use triplemap_core::{
    DeferredFailure, GraphError, GraphStore, Iri, Node, QueryRow, Resource, Result, Statement,
    TriplePattern,
};

// ============================================================================
// Rule trait
// ============================================================================

/// A store-wide rewrite
pub trait TransformRule: Send + Sync {
    /// Short name used in reports and logs
    fn name(&self) -> &str;

    /// Apply the rule, returning how many statements were rewritten
    fn apply(&self, store: &mut dyn GraphStore) -> Result<usize>;
}

/// Replace each statement for which `rewrite` yields a different statement
fn rewrite_each<F>(store: &mut dyn GraphStore, mut rewrite: F) -> Result<usize>
where
    F: FnMut(&Statement) -> Option<Statement>,
{
    let mut changes = Vec::new();
    for statement in store.find_statements(&TriplePattern::any())? {
        if let Some(replacement) = rewrite(&statement) {
            if replacement != statement {
                changes.push((statement, replacement));
            }
        }
    }

    let mut deferred = DeferredFailure::new();
    for (old, _) in &changes {
        deferred.step(store.remove_statement(old))?;
    }
    let rewritten = changes.len();
    for (_, new) in changes {
        deferred.step(store.add_statement(new))?;
    }
    deferred.finish(rewritten)
}

fn map_statement(statement: &Statement, mut f: impl FnMut(&Iri) -> Option<Iri>) -> Option<Statement> {
    let subject = match &statement.subject {
        Resource::Iri(iri) => f(iri).map(Resource::Iri),
        Resource::Blank(_) => None,
    };
    let predicate = f(&statement.predicate);
    let object = match &statement.object {
        Node::Iri(iri) => f(iri).map(Node::Iri),
        _ => None,
    };

    if subject.is_none() && predicate.is_none() && object.is_none() {
        return None;
    }
    Some(Statement {
        subject: subject.unwrap_or_else(|| statement.subject.clone()),
        predicate: predicate.unwrap_or_else(|| statement.predicate.clone()),
        object: object.unwrap_or_else(|| statement.object.clone()),
    })
}

// ============================================================================
// IRI rename
// ============================================================================

/// Replace one IRI by another in every position
#[derive(Debug, Clone)]
pub struct UriRenameRule {
    from: Iri,
    to: Iri,
}

impl UriRenameRule {
    pub fn new(from: Iri, to: Iri) -> Self {
        Self { from, to }
    }
}

impl TransformRule for UriRenameRule {
    fn name(&self) -> &str {
        "rename-iri"
    }

    fn apply(&self, store: &mut dyn GraphStore) -> Result<usize> {
        rewrite_each(store, |st| {
            map_statement(st, |iri| (*iri == self.from).then(|| self.to.clone()))
        })
    }
}

// ============================================================================
// Namespace rename
// ============================================================================

/// Rewrite every IRI starting with one prefix to start with another
#[derive(Debug, Clone)]
pub struct NamespaceRenameRule {
    from: String,
    to: String,
}

impl NamespaceRenameRule {
    /// The replacement prefix must itself be a valid IRI
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Result<Self> {
        let from = from.into();
        let to = to.into();
        if from.is_empty() {
            return Err(GraphError::InvalidNode("empty namespace prefix".to_string()));
        }
        Iri::parse(to.clone())?;
        Ok(Self { from, to })
    }
}

impl TransformRule for NamespaceRenameRule {
    fn name(&self) -> &str {
        "rename-namespace"
    }

    fn apply(&self, store: &mut dyn GraphStore) -> Result<usize> {
        rewrite_each(store, |st| {
            map_statement(st, |iri| {
                iri.as_str()
                    .strip_prefix(self.from.as_str())
                    .map(|rest| Iri::new_unchecked(format!("{}{}", self.to, rest)))
            })
        })
    }
}

// ============================================================================
// Search / remove / add
// ============================================================================

/// For each match of a `where` pattern, remove one instantiated pattern and
/// add another
///
/// All three are single triple patterns in the query syntax, e.g.
/// `?x <rdf:type> <urn:Old>`; variables in `remove` and `add` must be bound
/// by `where`.
#[derive(Debug, Clone)]
pub struct SearchRemoveAddRule {
    search: String,
    remove: [PatternTerm; 3],
    add: [PatternTerm; 3],
}

impl SearchRemoveAddRule {
    pub fn new(search: &str, remove: &str, add: &str) -> Result<Self> {
        let bound: Vec<String> = variables(&ntriples::parse_pattern(search)?);
        let remove = ntriples::parse_pattern(remove)?;
        let add = ntriples::parse_pattern(add)?;
        for name in variables(&remove).into_iter().chain(variables(&add)) {
            if !bound.contains(&name) {
                return Err(GraphError::InvalidNode(format!(
                    "variable ?{name} is not bound by the search pattern"
                )));
            }
        }
        Ok(Self {
            search: search.to_string(),
            remove,
            add,
        })
    }
}

fn variables(terms: &[PatternTerm; 3]) -> Vec<String> {
    terms
        .iter()
        .filter_map(|t| match t {
            PatternTerm::Variable(name) => Some(name.clone()),
            PatternTerm::Node(_) => None,
        })
        .collect()
}

fn instantiate(template: &[PatternTerm; 3], row: &QueryRow) -> Result<Statement> {
    let resolve = |term: &PatternTerm| -> Result<Node> {
        match term {
            PatternTerm::Node(node) => Ok(node.clone()),
            PatternTerm::Variable(name) => row
                .get(name)
                .cloned()
                .ok_or_else(|| GraphError::InvalidNode(format!("unbound variable ?{name}"))),
        }
    };
    let subject = Resource::try_from(resolve(&template[0])?)?;
    let predicate = match resolve(&template[1])? {
        Node::Iri(iri) => iri,
        other => return Err(GraphError::InvalidNode(format!("{other} cannot be a predicate"))),
    };
    let object = resolve(&template[2])?;
    Ok(Statement {
        subject,
        predicate,
        object,
    })
}

impl TransformRule for SearchRemoveAddRule {
    fn name(&self) -> &str {
        "search-remove-add"
    }

    fn apply(&self, store: &mut dyn GraphStore) -> Result<usize> {
        let rows: Vec<QueryRow> = store.query(&self.search)?.collect();
        let mut edits = Vec::with_capacity(rows.len());
        for row in &rows {
            edits.push((instantiate(&self.remove, row)?, instantiate(&self.add, row)?));
        }
        let mut deferred = DeferredFailure::new();
        for (remove, _) in &edits {
            deferred.step(store.remove_statement(remove))?;
        }
        for (_, add) in edits {
            deferred.step(store.add_statement(add))?;
        }
        deferred.finish(rows.len())
    }
}

// ============================================================================
// Transformer
// ============================================================================

/// Per-rule outcome of a transformation run
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransformReport {
    pub rules: Vec<(String, usize)>,
}

impl TransformReport {
    /// Total statements rewritten across all rules
    pub fn total(&self) -> usize {
        self.rules.iter().map(|(_, n)| n).sum()
    }
}

/// Applies rules in order
#[derive(Default)]
pub struct Transformer {
    rules: Vec<Box<dyn TransformRule>>,
}

impl Transformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule
    pub fn with_rule(mut self, rule: impl TransformRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn apply(&self, store: &mut dyn GraphStore) -> Result<TransformReport> {
        let mut report = TransformReport::default();
        for rule in &self.rules {
            let rewritten = rule.apply(store)?;
            tracing::info!(rule = rule.name(), rewritten, "Applied transform rule");
            report.rules.push((rule.name().to_string(), rewritten));
        }
        Ok(report)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use triplemap_core::vocab::{rdf, rdfs};

    use std::path::PathBuf;
    use triplemap_core::ClosableIterator;

    /// Applies every mutation, then reports a failed commit
    struct FailingCommits {
        inner: MemoryStore,
    }

    fn commit_failed() -> GraphError {
        GraphError::PersistenceFailure {
            path: PathBuf::from("graph.nt"),
            source: std::io::Error::other("disk full"),
        }
    }

    impl GraphStore for FailingCommits {
        fn open(&mut self) -> Result<()> {
            self.inner.open()
        }

        fn close(&mut self) -> Result<()> {
            self.inner.close()
        }

        fn is_open(&self) -> bool {
            self.inner.is_open()
        }

        fn contains(&self, pattern: &TriplePattern) -> Result<bool> {
            self.inner.contains(pattern)
        }

        fn add_statement(&mut self, statement: Statement) -> Result<()> {
            self.inner.add_statement(statement)?;
            Err(commit_failed())
        }

        fn remove_statement(&mut self, statement: &Statement) -> Result<()> {
            self.inner.remove_statement(statement)?;
            Err(commit_failed())
        }

        fn remove_statements(&mut self, pattern: &TriplePattern) -> Result<()> {
            self.inner.remove_statements(pattern)?;
            Err(commit_failed())
        }

        fn find_statements(&self, pattern: &TriplePattern) -> Result<ClosableIterator<Statement>> {
            self.inner.find_statements(pattern)
        }

        fn query(&self, query: &str) -> Result<ClosableIterator<QueryRow>> {
            self.inner.query(query)
        }

        fn new_unique_resource(&self) -> Result<Resource> {
            self.inner.new_unique_resource()
        }
    }

    const SUPER_REL: &str = "http://www.semanticdesktop.org/ontologies/2007/09/cds/hasSuperRelation";

    fn iri(s: &str) -> Iri {
        Iri::new_unchecked(s)
    }

    fn sample() -> MemoryStore {
        let (a, b, c, sup) = (iri("urn:test:a"), iri("urn:test:b"), iri("urn:test:c"), iri(SUPER_REL));
        MemoryStore::from_statements([
            Statement::new(sup.clone(), b.clone(), c.clone()),
            Statement::new(a.clone(), sup.clone(), c.clone()),
            Statement::new(a, b, sup),
        ])
    }

    #[test]
    fn test_uri_rename_every_position() {
        let mut store = sample();
        let rule = UriRenameRule::new(iri(SUPER_REL), rdfs::SUB_PROPERTY_OF);
        assert_eq!(rule.apply(&mut store).unwrap(), 3);

        let sup = Resource::from(iri(SUPER_REL));
        assert!(!store.contains(&TriplePattern::new(Some(sup), None, None)).unwrap());
        assert!(!store
            .contains(&TriplePattern::new(None, None, Some(iri(SUPER_REL).into())))
            .unwrap());
        assert_eq!(store.size().unwrap(), 3);
    }

    #[test]
    fn test_namespace_rename() {
        let mut store = sample();
        let rule = NamespaceRenameRule::new("urn:test:", "http://example.com#").unwrap();
        assert_eq!(rule.apply(&mut store).unwrap(), 3);

        let old = Resource::from(iri("urn:test:a"));
        let new = Resource::from(iri("http://example.com#a"));
        assert!(!store.contains(&TriplePattern::new(Some(old), None, None)).unwrap());
        assert!(store.contains(&TriplePattern::new(Some(new), None, None)).unwrap());

        assert!(NamespaceRenameRule::new("urn:test:", "not an iri").is_err());
    }

    #[test]
    fn test_search_remove_add() {
        let (a, b, c) = (iri("http://example.com#a"), iri("http://example.com#b"), iri("http://example.com#c"));
        let mut store = MemoryStore::from_statements([
            Statement::new(a.clone(), b.clone(), c.clone()),
            Statement::new(a.clone(), rdf::TYPE, c.clone()),
        ]);

        let search = format!("?x {} {}", rdf::TYPE.to_ntriples(), c.to_ntriples());
        let add = format!("?x {} {}", rdf::TYPE.to_ntriples(), b.to_ntriples());
        let rule = SearchRemoveAddRule::new(&search, &search, &add).unwrap();
        assert_eq!(rule.apply(&mut store).unwrap(), 1);

        assert!(store
            .contains_statement(&Statement::new(a.clone(), rdf::TYPE, b.clone()))
            .unwrap());
        assert!(!store
            .contains_statement(&Statement::new(a.clone(), rdf::TYPE, c.clone()))
            .unwrap());
        assert!(store.contains_statement(&Statement::new(a, b, c)).unwrap());

        assert!(SearchRemoveAddRule::new(&search, "?y <urn:p> <urn:o>", &add).is_err());
    }

    #[test]
    fn test_transformer_reports_each_rule() {
        let mut store = sample();
        let transformer = Transformer::new()
            .with_rule(UriRenameRule::new(iri(SUPER_REL), rdfs::SUB_PROPERTY_OF))
            .with_rule(NamespaceRenameRule::new("urn:test:", "http://example.com#").unwrap());
        assert_eq!(transformer.len(), 2);

        let report = transformer.apply(&mut store).unwrap();
        assert_eq!(report.rules[0], ("rename-iri".to_string(), 3));
        assert_eq!(report.rules[1], ("rename-namespace".to_string(), 3));
        assert_eq!(report.total(), 6);
    }

    #[test]
    fn test_rename_completes_when_commits_fail() {
        let mut store = FailingCommits { inner: sample() };
        let rule = UriRenameRule::new(iri(SUPER_REL), rdfs::SUB_PROPERTY_OF);

        let err = rule.apply(&mut store).unwrap_err();
        assert!(err.is_persistence_failure());

        let renamed = Resource::from(rdfs::SUB_PROPERTY_OF);
        assert!(store.inner.contains(&TriplePattern::new(Some(renamed), None, None)).unwrap());
        assert_eq!(store.inner.size().unwrap(), 3);
    }

    #[test]
    fn test_search_remove_add_completes_when_commits_fail() {
        let (a, b, c) = (iri("urn:test:a"), iri("urn:test:b"), iri("urn:test:c"));
        let mut store = FailingCommits {
            inner: MemoryStore::from_statements([Statement::new(a.clone(), rdf::TYPE, c.clone())]),
        };
        let search = format!("?x {} {}", rdf::TYPE.to_ntriples(), c.to_ntriples());
        let add = format!("?x {} {}", rdf::TYPE.to_ntriples(), b.to_ntriples());
        let rule = SearchRemoveAddRule::new(&search, &search, &add).unwrap();

        assert!(rule.apply(&mut store).unwrap_err().is_persistence_failure());
        assert!(store
            .inner
            .contains_statement(&Statement::new(a.clone(), rdf::TYPE, b))
            .unwrap());
        assert!(!store
            .inner
            .contains_statement(&Statement::new(a, rdf::TYPE, c))
            .unwrap());
    }
}
