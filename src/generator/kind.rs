//! Per-kind dispatch
//!
//! A driver iterates `dispatch(i)` without knowing which metaquery it runs.
//! `KindDispatcher` binds a generator to one [`MetaqueryKind`] so that loop
//! produces populated queries.

use serde::{Deserialize, Serialize};

use crate::query::{Query, QueryPool};

use super::{Metaqueries, QueryGenerator};

/// The metaquery operations a generator supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetaqueryKind {
    TagValues,
    FieldKeys,
    Cardinality,
}

impl MetaqueryKind {
    pub const ALL: [MetaqueryKind; 3] = [Self::TagValues, Self::FieldKeys, Self::Cardinality];

    /// Parse from string (case-insensitive, `-` or `_` separated)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "tag-values" | "metaquery-tag-values" => Some(Self::TagValues),
            "field-keys" | "metaquery-field-keys" => Some(Self::FieldKeys),
            "cardinality" | "metaquery-cardinality" => Some(Self::Cardinality),
            _ => None,
        }
    }

    /// Populate `q` using the operation this kind names
    pub fn fill<G: Metaqueries + ?Sized>(&self, generator: &G, q: &mut Query) {
        match self {
            Self::TagValues => generator.tag_values(q),
            Self::FieldKeys => generator.field_keys(q),
            Self::Cardinality => generator.cardinality(q),
        }
    }
}

impl std::fmt::Display for MetaqueryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TagValues => write!(f, "tag-values"),
            Self::FieldKeys => write!(f, "field-keys"),
            Self::Cardinality => write!(f, "cardinality"),
        }
    }
}

/// A generator whose `dispatch` always produces one kind of metaquery
#[derive(Debug, Clone)]
pub struct KindDispatcher<G> {
    generator: G,
    kind: MetaqueryKind,
}

impl<G: Metaqueries> KindDispatcher<G> {
    pub fn new(generator: G, kind: MetaqueryKind) -> Self {
        Self { generator, kind }
    }

    pub fn kind(&self) -> MetaqueryKind {
        self.kind
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }
}

impl<G: Metaqueries + Send + Sync> QueryGenerator for KindDispatcher<G> {
    fn dispatch(&self, _index: usize, pool: &QueryPool) -> Query {
        let mut q = pool.acquire();
        self.kind.fill(&self.generator, &mut q);
        q
    }
}
