//! Metadata filters for similarity search.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::metadata::{Metadata, Scalar};

/// An AND of equality/membership clauses.
///
/// A clause `key = value` holds when the document's `key` field equals
/// `value`, or is a list containing it. A missing field never matches.
/// The empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataFilter {
    clauses: BTreeMap<String, Scalar>,
}

impl MetadataFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a clause.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.clauses.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Scalar>) {
        self.clauses.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn matches(&self, metadata: &Metadata) -> bool {
        self.clauses.iter().all(|(key, wanted)| {
            metadata
                .get(key)
                .is_some_and(|value| value.matches(wanted))
        })
    }
}

impl<K, V> FromIterator<(K, V)> for MetadataFilter
where
    K: Into<String>,
    V: Into<Scalar>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            clauses: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
