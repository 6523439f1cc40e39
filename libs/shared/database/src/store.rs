use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

/// A stored document. Every document returned by a store carries its
/// identifier under `_id`.
pub type Document = Map<String, Value>;

pub const ID_FIELD: &str = "_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Services,
    Bookings,
    Users,
    Doctors,
    Payments,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Services,
        Collection::Bookings,
        Collection::Users,
        Collection::Doctors,
        Collection::Payments,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Services => "services",
            Collection::Bookings => "bookings",
            Collection::Users => "users",
            Collection::Doctors => "doctors",
            Collection::Payments => "payments",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conjunction of field equality clauses. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((field.into(), value.into()));
        self
    }

    pub fn by_id(id: impl Into<String>) -> Self {
        Self::new().eq(ID_FIELD, id.into())
    }

    pub fn clauses(&self) -> &[(String, Value)] {
        &self.clauses
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.clauses
            .iter()
            .all(|(field, expected)| document.get(field) == Some(expected))
    }

    /// Seed document used when an upsert finds nothing to update.
    pub fn to_document(&self) -> Document {
        self.clauses
            .iter()
            .filter(|(field, _)| field != ID_FIELD)
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub acknowledged: bool,
    pub inserted_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_id: Option<String>,
}

impl UpdateResult {
    pub fn unmatched() -> Self {
        Self {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

/// The record store every cell talks to. Implementations must be safe to
/// share across requests behind an `Arc`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Cheap round trip used at startup to confirm the store is reachable.
    async fn ping(&self) -> Result<()>;

    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>>;

    async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>>;

    /// Inserts a document, assigning a fresh `_id` when the caller did not.
    async fn insert_one(&self, collection: Collection, document: Document) -> Result<InsertResult>;

    /// Merges `set` into the first matching document. With `upsert`, a miss
    /// inserts the filter's fields merged with `set`.
    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Document,
        upsert: bool,
    ) -> Result<UpdateResult>;

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<DeleteResult>;
}

/// Returns the merged document and whether anything changed.
pub(crate) fn merge_set(original: &Document, set: &Document) -> (Document, bool) {
    let mut merged = original.clone();
    let mut changed = false;

    for (field, value) in set {
        if field == ID_FIELD {
            continue;
        }
        if merged.get(field) != Some(value) {
            merged.insert(field.clone(), value.clone());
            changed = true;
        }
    }

    (merged, changed)
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
