use super::{CommitReceipt, DocumentQuery, DocumentStore, Mutation, StoreError, Transaction};
use crate::document::Document;

/// In-memory document set with all-or-nothing commits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Vec<Document>,
    committed: Vec<Transaction>,
    fail_next_commit: Option<String>,
    next_txn: u64,
}

impl MemoryStore {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents,
            ..Self::default()
        }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.id == id)
    }

    /// Transactions that were applied, in commit order.
    pub fn committed(&self) -> &[Transaction] {
        &self.committed
    }

    /// Make the next commit fail like a dropped connection.
    pub fn fail_next_commit(&mut self, message: impl Into<String>) {
        self.fail_next_commit = Some(message.into());
    }

    /// Apply `transaction` to a copy of the documents; swap it in only if
    /// every mutation succeeded.
    pub(crate) fn apply(&self, transaction: &Transaction) -> Result<Vec<Document>, StoreError> {
        let mut next = self.documents.clone();
        for mutation in &transaction.mutations {
            match mutation {
                Mutation::Patch(patch) => {
                    let mut targets = next.iter_mut().filter(|doc| doc.id == patch.id);
                    let doc = targets.next().ok_or_else(|| {
                        StoreError::Conflict(format!("cannot patch missing document {}", patch.id))
                    })?;
                    if targets.next().is_some() {
                        return Err(StoreError::Conflict(format!(
                            "document id {} is not unique",
                            patch.id
                        )));
                    }
                    for (field, value) in &patch.set {
                        if field.starts_with('_') {
                            return Err(StoreError::Conflict(format!(
                                "cannot set system field {field} on {}",
                                patch.id
                            )));
                        }
                        doc.fields.insert(field.clone(), value.clone());
                    }
                }
            }
        }
        Ok(next)
    }

    /// Swap in documents produced by [`MemoryStore::apply`] and record the
    /// transaction.
    pub(crate) fn replace(
        &mut self,
        documents: Vec<Document>,
        transaction: Transaction,
    ) -> CommitReceipt {
        self.documents = documents;
        self.next_txn += 1;
        let receipt = CommitReceipt {
            transaction_id: format!("mem-{}", self.next_txn),
            document_ids: transaction
                .mutations
                .iter()
                .map(|m| m.document_id().to_string())
                .collect(),
        };
        self.committed.push(transaction);
        receipt
    }

    pub(crate) fn take_injected_failure(&mut self) -> Result<(), StoreError> {
        match self.fail_next_commit.take() {
            Some(message) => Err(StoreError::Transport(message)),
            None => Ok(()),
        }
    }
}

impl DocumentStore for MemoryStore {
    fn fetch(&self, query: &DocumentQuery) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .documents
            .iter()
            .filter(|doc| query.matches(doc))
            .cloned()
            .collect())
    }

    fn commit(&mut self, transaction: Transaction) -> Result<CommitReceipt, StoreError> {
        self.take_injected_failure()?;
        let next = self.apply(&transaction)?;
        Ok(self.replace(next, transaction))
    }
}
