//! Document store capability: query published documents, commit patches.
//!
//! The runner and the checker only see [`DocumentStore`]. Implementations:
//! - [`HttpStore`]: the hosted content lake over HTTPS
//! - [`NdjsonStore`]: a local dataset export, rewritten atomically on commit
//! - [`MemoryStore`]: in-memory, used by tests and by the NDJSON store
use crate::document::{Document, DRAFT_PREFIX};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

mod http;
mod memory;
mod ndjson;

pub use http::HttpStore;
pub use memory::MemoryStore;
pub use ndjson::NdjsonStore;

/// Failures at the store boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("store returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("decode store response: {0}")]
    Decode(String),

    #[error("transaction rejected: {0}")]
    Conflict(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Selects documents of one type, optionally including draft shadows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentQuery {
    pub document_type: String,
    pub include_drafts: bool,
}

impl DocumentQuery {
    /// Published documents of `document_type` only.
    pub fn published(document_type: impl Into<String>) -> Self {
        Self {
            document_type: document_type.into(),
            include_drafts: false,
        }
    }

    /// GROQ text; the type is bound through the `$type` parameter.
    pub fn to_groq(&self) -> String {
        if self.include_drafts {
            "*[_type == $type]".to_string()
        } else {
            "*[_type == $type && !(_id in path(\"drafts.**\"))]".to_string()
        }
    }

    /// Evaluate the same filter locally.
    pub fn matches(&self, document: &Document) -> bool {
        document.doc_type == self.document_type
            && (self.include_drafts || !document.id.starts_with(DRAFT_PREFIX))
    }
}

/// `set` patch on a single document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    pub id: String,
    pub set: Map<String, Value>,
}

impl Patch {
    pub fn set_field(id: impl Into<String>, field: &str, value: Value) -> Self {
        let mut set = Map::new();
        set.insert(field.to_string(), value);
        Self { id: id.into(), set }
    }
}

/// One mutation in a transaction, in the content lake's wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mutation {
    Patch(Patch),
}

impl Mutation {
    pub fn document_id(&self) -> &str {
        match self {
            Mutation::Patch(patch) => &patch.id,
        }
    }
}

/// Ordered mutations committed all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub mutations: Vec<Mutation>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn patch(&mut self, patch: Patch) -> &mut Self {
        self.mutations.push(Mutation::Patch(patch));
        self
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }
}

/// What the store acknowledged for a committed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitReceipt {
    pub transaction_id: String,
    pub document_ids: Vec<String>,
}

/// Query and transactional-patch capability of a content store.
pub trait DocumentStore {
    fn fetch(&self, query: &DocumentQuery) -> Result<Vec<Document>, StoreError>;

    /// Commit every mutation or none of them.
    fn commit(&mut self, transaction: Transaction) -> Result<CommitReceipt, StoreError>;
}
