//! triplemap Graph - In-memory graph store and rewrite rules
//!
//! Provides the reference [`GraphStore`](triplemap_core::GraphStore)
//! implementation used by the CLI and the test suites, plus pattern
//! rewrite rules that rename IRIs across a whole store.

pub mod memory;
pub mod transform;

pub use memory::MemoryStore;
pub use transform::{
    NamespaceRenameRule, SearchRemoveAddRule, TransformReport, TransformRule, Transformer,
    UriRenameRule,
};

use triplemap_core::{GraphStore, Result, TriplePattern};

/// Render a whole store as N-Triples text, one statement per line
pub fn dump(store: &dyn GraphStore) -> Result<String> {
    let mut buf = Vec::new();
    store.write_to(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Number of distinct subjects in a store
pub fn subject_count(store: &dyn GraphStore) -> Result<usize> {
    let subjects: std::collections::BTreeSet<_> = store
        .find_statements(&TriplePattern::any())?
        .map(|st| st.subject)
        .collect();
    Ok(subjects.len())
}
