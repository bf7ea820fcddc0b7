use super::{CommitReceipt, DocumentQuery, DocumentStore, MemoryStore, StoreError, Transaction};
use crate::document::Document;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Dataset export on disk, one JSON document per line.
///
/// Commits are applied in memory first and then published by writing a
/// sibling temp file and renaming it over the export, so a failed write
/// leaves the previous file in place. Key order and file mode are kept, so
/// untouched lines come back byte-for-byte.
#[derive(Debug)]
pub struct NdjsonStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl NdjsonStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let text = fs::read_to_string(path)?;
        let documents = parse_ndjson(&text)?;
        tracing::debug!(
            path = %path.display(),
            document_count = documents.len(),
            "dataset export loaded"
        );
        Ok(Self {
            path: path.to_path_buf(),
            inner: MemoryStore::new(documents),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn documents(&self) -> &[Document] {
        self.inner.documents()
    }
}

impl DocumentStore for NdjsonStore {
    fn fetch(&self, query: &DocumentQuery) -> Result<Vec<Document>, StoreError> {
        self.inner.fetch(query)
    }

    fn commit(&mut self, transaction: Transaction) -> Result<CommitReceipt, StoreError> {
        let start = Instant::now();
        let next = self.inner.apply(&transaction)?;
        write_ndjson_atomic(&self.path, &next)?;
        let receipt = self.inner.replace(next, transaction);
        tracing::info!(
            elapsed_ms = start.elapsed().as_millis(),
            path = %self.path.display(),
            "dataset export rewritten"
        );
        Ok(receipt)
    }
}

fn parse_ndjson(text: &str) -> Result<Vec<Document>, StoreError> {
    let mut documents = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let document: Document = serde_json::from_str(line)
            .map_err(|err| StoreError::Decode(format!("line {}: {err}", index + 1)))?;
        documents.push(document);
    }
    Ok(documents)
}

fn write_ndjson_atomic(path: &Path, documents: &[Document]) -> Result<(), StoreError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(path)?.permissions();
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    for document in documents {
        let line = serde_json::to_string(document)
            .map_err(|err| StoreError::Decode(format!("encode {}: {err}", document.id)))?;
        tmp.write_all(line.as_bytes())?;
        tmp.write_all(b"\n")?;
    }
    tmp.flush()?;
    tmp.as_file().set_permissions(permissions)?;
    tmp.persist(path).map_err(|err| StoreError::Io(err.error))?;
    Ok(())
}
