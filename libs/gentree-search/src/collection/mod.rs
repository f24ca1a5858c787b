//! Person collection abstraction
//!
//! The executor only needs `count` and a projected, paged `find`. Any store
//! able to evaluate a [`FilterExpression`] can implement
//! [`PersonCollection`]; the server ships a Postgres implementation and this
//! crate ships [`MemoryCollection`].

mod memory;

pub use memory::MemoryCollection;

use crate::filter::FilterExpression;
use crate::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::{Map, Value};

/// A stored person document, keyed by its storage field names.
pub type PersonRecord = Map<String, Value>;

/// Finite, single-pass sequence of records.
pub type RecordStream = BoxStream<'static, Result<PersonRecord>>;

/// How far a total count may go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountLimit {
    /// Count every match. Can be slow on large collections.
    Unbounded,
    /// Stop counting once this many matches were seen.
    AtMost(u64),
}

impl CountLimit {
    /// Apply the limit to an already known count.
    pub fn cap(self, count: u64) -> u64 {
        match self {
            CountLimit::Unbounded => count,
            CountLimit::AtMost(limit) => count.min(limit),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindOptions {
    /// Top-level fields to return. `None` returns whole documents.
    pub projection: Option<Vec<String>>,
    pub skip: u64,
    pub limit: Option<u64>,
}

#[async_trait]
pub trait PersonCollection: Send + Sync {
    async fn count(&self, filter: &FilterExpression, limit: CountLimit) -> Result<u64>;

    /// Matching records in the store's natural order.
    async fn find(&self, filter: &FilterExpression, options: FindOptions) -> Result<RecordStream>;
}
