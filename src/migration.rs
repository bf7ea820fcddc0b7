//! Field-localization migrations.
//!
//! A migration turns a plain-string field into a per-locale object for every
//! published document of one type. The run is a straight line:
//!
//! 1. fetch published documents (draft shadows excluded)
//! 2. classify each document by the shape of the target field
//! 3. build one `set` patch per legacy document
//! 4. commit every patch in a single transaction
//!
//! The store's transaction is the only consistency mechanism: the runner makes
//! exactly one mutating call and never retries. Two concurrent runs against the
//! same dataset may both patch the same documents; run one at a time.
use crate::document::{Document, FieldShape, Locale, LocalizedString};
use crate::store::{DocumentQuery, DocumentStore, Patch, Transaction};
use anyhow::{Context, Result};
use serde::Serialize;

/// A string-to-localized-object migration for one field of one type.
#[derive(Debug, Clone, Copy)]
pub struct LocalizeField {
    pub document_type: &'static str,
    pub field: &'static str,
    /// Locales that receive a copy of the legacy value.
    pub locales: &'static [Locale],
    /// Plural label for report lines, e.g. "team members".
    pub label: &'static str,
}

/// Team member names were plain strings before the site went multilingual.
pub const TEAM_MEMBER_NAMES: LocalizeField = LocalizeField {
    document_type: "teamMember",
    field: "name",
    locales: &Locale::ALL,
    label: "team members",
};

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Build the batch but do not commit it.
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Migrated,
    AlreadyMigrated,
    DryRun,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedDocument {
    pub id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedChange {
    pub id: String,
    pub legacy_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub document_type: String,
    pub field: String,
    pub outcome: Outcome,
    /// Published documents returned by the store.
    pub found: usize,
    /// Documents patched (or that would be, on a dry run).
    pub migrated: usize,
    pub already_migrated: usize,
    pub skipped: Vec<SkippedDocument>,
    /// Draft shadows the store returned despite the filter.
    pub drafts_ignored: usize,
    pub changes: Vec<PlannedChange>,
    pub transaction_id: Option<String>,
    #[serde(skip)]
    label: &'static str,
}

impl MigrationReport {
    /// Multi-line summary for the terminal.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Found {} {}\n", self.found, self.label));
        for skipped in &self.skipped {
            out.push_str(&format!("Skipped {}: {}\n", skipped.id, skipped.reason));
        }
        match self.outcome {
            Outcome::AlreadyMigrated if self.skipped.is_empty() => {
                out.push_str(&format!("All {} are already migrated.\n", self.label));
            }
            Outcome::AlreadyMigrated => {
                out.push_str(&format!(
                    "No {} to migrate; {} skipped\n",
                    self.label,
                    self.skipped.len()
                ));
            }
            Outcome::DryRun => {
                out.push_str(&format!(
                    "Dry run: {} {} would be migrated\n",
                    self.migrated, self.label
                ));
                for change in &self.changes {
                    out.push_str(&format!("  - {} ({})\n", change.legacy_value, change.id));
                }
            }
            Outcome::Migrated => {
                for change in &self.changes {
                    out.push_str(&format!("  - Migrated: {}\n", change.legacy_value));
                }
                out.push_str("Migration completed successfully.\n");
                out.push_str(&format!(
                    "{} {} have been migrated\n",
                    self.migrated, self.label
                ));
                if let Some(txn) = &self.transaction_id {
                    out.push_str(&format!("Transaction: {txn}\n"));
                }
                out.push_str("\nNote: all values have been duplicated across languages.\n");
                out.push_str(
                    "You may want to manually update the English and Russian translations.\n",
                );
            }
        }
        out
    }
}

enum Classified {
    Pending(PlannedChange),
    Done,
    Skipped(SkippedDocument),
}

impl LocalizeField {
    pub fn query(&self) -> DocumentQuery {
        DocumentQuery::published(self.document_type)
    }

    fn classify(&self, document: &Document) -> Classified {
        match FieldShape::of(document.field(self.field)) {
            FieldShape::Legacy(value) if value.trim().is_empty() => {
                Classified::Skipped(SkippedDocument {
                    id: document.id.clone(),
                    reason: "blank legacy value".to_string(),
                })
            }
            FieldShape::Legacy(value) => Classified::Pending(PlannedChange {
                id: document.id.clone(),
                legacy_value: value.to_string(),
            }),
            FieldShape::Localized(_) => Classified::Done,
            FieldShape::Absent => Classified::Skipped(SkippedDocument {
                id: document.id.clone(),
                reason: format!("{} is not set", self.field),
            }),
            FieldShape::Unexpected(kind) => Classified::Skipped(SkippedDocument {
                id: document.id.clone(),
                reason: format!("{} is a {kind}, expected string or object", self.field),
            }),
        }
    }

    fn patch_for(&self, change: &PlannedChange) -> Patch {
        let localized = LocalizedString::duplicated(&change.legacy_value, self.locales);
        Patch::set_field(change.id.clone(), self.field, localized.to_value())
    }

    /// Fetch, classify, and commit the migration as one transaction.
    pub fn run<S: DocumentStore + ?Sized>(
        &self,
        store: &mut S,
        options: RunOptions,
    ) -> Result<MigrationReport> {
        let fetched = store
            .fetch(&self.query())
            .with_context(|| format!("fetch {} documents", self.document_type))?;

        let (drafts, documents): (Vec<Document>, Vec<Document>) =
            fetched.into_iter().partition(Document::is_draft);
        if !drafts.is_empty() {
            tracing::warn!(
                drafts = drafts.len(),
                "store returned draft documents; ignoring them"
            );
        }
        tracing::info!(
            document_type = self.document_type,
            document_count = documents.len(),
            "documents fetched"
        );

        let mut report = MigrationReport {
            document_type: self.document_type.to_string(),
            field: self.field.to_string(),
            outcome: Outcome::AlreadyMigrated,
            found: documents.len(),
            migrated: 0,
            already_migrated: 0,
            skipped: Vec::new(),
            drafts_ignored: drafts.len(),
            changes: Vec::new(),
            transaction_id: None,
            label: self.label,
        };

        for document in &documents {
            match self.classify(document) {
                Classified::Pending(change) => report.changes.push(change),
                Classified::Done => report.already_migrated += 1,
                Classified::Skipped(skipped) => {
                    tracing::warn!(id = %skipped.id, reason = %skipped.reason, "document skipped");
                    report.skipped.push(skipped);
                }
            }
        }

        if report.changes.is_empty() {
            return Ok(report);
        }

        let mut transaction = Transaction::new();
        for change in &report.changes {
            tracing::debug!(id = %change.id, value = %change.legacy_value, "patch queued");
            transaction.patch(self.patch_for(change));
        }
        report.migrated = transaction.len();

        if options.dry_run {
            report.outcome = Outcome::DryRun;
            return Ok(report);
        }

        let receipt = store
            .commit(transaction)
            .context("commit migration transaction")?;
        tracing::info!(
            transaction_id = %receipt.transaction_id,
            document_count = report.migrated,
            "migration committed"
        );
        report.transaction_id = Some(receipt.transaction_id);
        report.outcome = Outcome::Migrated;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CommitReceipt, MemoryStore, StoreError};
    use serde_json::json;

    fn member(id: &str, name: serde_json::Value) -> Document {
        Document::new(id, "teamMember")
            .with_field("name", name)
            .with_field("role", json!({"fr": "Export", "en": "Export"}))
    }

    #[test]
    fn migrates_only_string_names() {
        let mut store = MemoryStore::new(vec![
            member("a", json!("Jean Dupont")),
            member("b", json!({"fr": "Marie", "en": "Marie", "ru": "Мари"})),
        ]);

        let report = TEAM_MEMBER_NAMES
            .run(&mut store, RunOptions::default())
            .unwrap();

        assert_eq!(report.outcome, Outcome::Migrated);
        assert_eq!(report.found, 2);
        assert_eq!(report.migrated, 1);
        assert_eq!(report.already_migrated, 1);
        assert_eq!(report.transaction_id.as_deref(), Some("mem-1"));

        let committed = store.committed();
        assert_eq!(committed.len(), 1);
        assert_eq!(committed[0].len(), 1);
        assert_eq!(committed[0].mutations[0].document_id(), "a");

        assert_eq!(
            store.get("a").unwrap().field("name"),
            Some(&json!({"fr": "Jean Dupont", "en": "Jean Dupont", "ru": "Jean Dupont"}))
        );
        assert_eq!(
            store.get("b").unwrap().field("name"),
            Some(&json!({"fr": "Marie", "en": "Marie", "ru": "Мари"}))
        );
        assert_eq!(
            store.get("a").unwrap().field("role"),
            Some(&json!({"fr": "Export", "en": "Export"}))
        );
    }

    #[test]
    fn second_run_is_a_no_op() {
        let mut store = MemoryStore::new(vec![member("a", json!("Jean")), member("c", json!("Paul"))]);
        TEAM_MEMBER_NAMES
            .run(&mut store, RunOptions::default())
            .unwrap();
        let after_first = store.documents().to_vec();

        let report = TEAM_MEMBER_NAMES
            .run(&mut store, RunOptions::default())
            .unwrap();
        assert_eq!(report.outcome, Outcome::AlreadyMigrated);
        assert_eq!(report.migrated, 0);
        assert_eq!(report.already_migrated, 2);
        assert_eq!(store.committed().len(), 1);
        assert_eq!(store.documents(), after_first.as_slice());
        assert!(report.summary().contains("already migrated"));
    }

    #[test]
    fn empty_dataset_succeeds_without_commit() {
        let mut store = MemoryStore::new(Vec::new());
        let report = TEAM_MEMBER_NAMES
            .run(&mut store, RunOptions::default())
            .unwrap();
        assert_eq!(report.outcome, Outcome::AlreadyMigrated);
        assert_eq!(report.found, 0);
        assert!(store.committed().is_empty());
    }

    #[test]
    fn drafts_never_become_candidates() {
        let mut store = MemoryStore::new(vec![
            member("drafts.a", json!("Draft Name")),
            member("a", json!({"fr": "Jean", "en": "Jean"})),
        ]);
        let report = TEAM_MEMBER_NAMES
            .run(&mut store, RunOptions::default())
            .unwrap();
        assert_eq!(report.found, 1);
        assert_eq!(report.migrated, 0);
        assert_eq!(
            store.get("drafts.a").unwrap().field("name"),
            Some(&json!("Draft Name"))
        );
    }

    /// Ignores the draft filter, like a misconfigured remote query.
    struct UnfilteredStore(MemoryStore);

    impl DocumentStore for UnfilteredStore {
        fn fetch(&self, query: &DocumentQuery) -> Result<Vec<Document>, StoreError> {
            let mut all = query.clone();
            all.include_drafts = true;
            self.0.fetch(&all)
        }

        fn commit(&mut self, transaction: Transaction) -> Result<CommitReceipt, StoreError> {
            self.0.commit(transaction)
        }
    }

    #[test]
    fn drafts_from_an_unfiltered_store_are_dropped() {
        let mut store = UnfilteredStore(MemoryStore::new(vec![
            member("drafts.a", json!("Draft Name")),
            member("a", json!("Jean")),
        ]));
        let report = TEAM_MEMBER_NAMES
            .run(&mut store, RunOptions::default())
            .unwrap();
        assert_eq!(report.drafts_ignored, 1);
        assert_eq!(report.found, 1);
        assert_eq!(report.migrated, 1);
        assert_eq!(
            store.0.get("drafts.a").unwrap().field("name"),
            Some(&json!("Draft Name"))
        );
    }

    #[test]
    fn commit_failure_propagates_and_mutates_nothing() {
        let mut store = MemoryStore::new(vec![member("a", json!("Jean Dupont"))]);
        store.fail_next_commit("connection reset by peer");

        let err = TEAM_MEMBER_NAMES
            .run(&mut store, RunOptions::default())
            .unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("commit migration transaction"), "{message}");
        assert!(message.contains("connection reset by peer"), "{message}");
        assert!(err.downcast_ref::<StoreError>().is_some());
        assert_eq!(
            store.get("a").unwrap().field("name"),
            Some(&json!("Jean Dupont"))
        );
    }

    struct FailingFetch;

    impl DocumentStore for FailingFetch {
        fn fetch(&self, _query: &DocumentQuery) -> Result<Vec<Document>, StoreError> {
            Err(StoreError::Status {
                status: 401,
                message: "Unauthorized".to_string(),
            })
        }

        fn commit(&mut self, _transaction: Transaction) -> Result<CommitReceipt, StoreError> {
            panic!("commit must not be called after a failed fetch");
        }
    }

    #[test]
    fn fetch_failure_aborts_before_commit() {
        let err = TEAM_MEMBER_NAMES
            .run(&mut FailingFetch, RunOptions::default())
            .unwrap_err();
        assert!(format!("{err:#}").starts_with("fetch teamMember documents"));
    }

    #[test]
    fn dry_run_plans_without_committing() {
        let mut store = MemoryStore::new(vec![member("a", json!("Jean")), member("b", json!("Anne"))]);
        let report = TEAM_MEMBER_NAMES
            .run(&mut store, RunOptions { dry_run: true })
            .unwrap();
        assert_eq!(report.outcome, Outcome::DryRun);
        assert_eq!(report.migrated, 2);
        assert!(report.transaction_id.is_none());
        assert!(store.committed().is_empty());
        assert_eq!(store.get("a").unwrap().field("name"), Some(&json!("Jean")));
        assert!(report.summary().contains("would be migrated"));
    }

    #[test]
    fn blank_and_missing_names_are_skipped() {
        let mut store = MemoryStore::new(vec![
            member("blank", json!("   ")),
            Document::new("missing", "teamMember"),
            member("numeric", json!(7)),
            member("ok", json!("Jean")),
        ]);
        let report = TEAM_MEMBER_NAMES
            .run(&mut store, RunOptions::default())
            .unwrap();
        assert_eq!(report.found, 4);
        assert_eq!(report.migrated, 1);
        let reasons: Vec<_> = report
            .skipped
            .iter()
            .map(|s| (s.id.as_str(), s.reason.as_str()))
            .collect();
        assert_eq!(
            reasons,
            vec![
                ("blank", "blank legacy value"),
                ("missing", "name is not set"),
                ("numeric", "name is a number, expected string or object"),
            ]
        );
        assert_eq!(store.get("blank").unwrap().field("name"), Some(&json!("   ")));
    }

    #[test]
    fn summary_counts_skips_when_nothing_is_pending() {
        let mut store = MemoryStore::new(vec![
            member("blank", json!("")),
            Document::new("missing", "teamMember"),
            member("done", json!({"fr": "Jean", "en": "Jean"})),
        ]);
        let report = TEAM_MEMBER_NAMES
            .run(&mut store, RunOptions::default())
            .unwrap();
        assert_eq!(report.outcome, Outcome::AlreadyMigrated);
        assert!(store.committed().is_empty());

        let summary = report.summary();
        assert!(summary.contains("No team members to migrate; 2 skipped"), "{summary}");
        assert!(!summary.contains("already migrated"), "{summary}");
    }

    #[test]
    fn summary_lists_migrated_values_and_translation_note() {
        let mut store = MemoryStore::new(vec![member("a", json!("Jean Dupont"))]);
        let report = TEAM_MEMBER_NAMES
            .run(&mut store, RunOptions::default())
            .unwrap();
        let summary = report.summary();
        assert!(summary.contains("Found 1 team members"));
        assert!(summary.contains("- Migrated: Jean Dupont"));
        assert!(summary.contains("1 team members have been migrated"));
        assert!(summary.contains("English and Russian translations"));
    }
}
