//! Validate published documents against the schema catalog.
use crate::preview::Preview;
use crate::schema::{validate, DocumentSchema, Violation};
use crate::store::{DocumentQuery, DocumentStore};
use anyhow::{Context, Result};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct DocumentFindings {
    pub id: String,
    pub preview: Preview,
    pub violations: Vec<Violation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeReport {
    pub document_type: String,
    pub checked: usize,
    /// Problems with the type as a whole, e.g. a duplicated singleton.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub type_violations: Vec<String>,
    /// Only documents with at least one violation.
    pub documents: Vec<DocumentFindings>,
}

impl TypeReport {
    pub fn is_clean(&self) -> bool {
        self.type_violations.is_empty() && self.documents.is_empty()
    }

    pub fn violation_count(&self) -> usize {
        self.type_violations.len()
            + self
                .documents
                .iter()
                .map(|doc| doc.violations.len())
                .sum::<usize>()
    }
}

/// Fetch published documents of `schema`'s type and validate each one.
pub fn check_type<S: DocumentStore + ?Sized>(
    store: &S,
    schema: &DocumentSchema,
) -> Result<TypeReport> {
    let documents: Vec<_> = store
        .fetch(&DocumentQuery::published(schema.name))
        .with_context(|| format!("fetch {} documents", schema.name))?
        .into_iter()
        .filter(|doc| !doc.is_draft())
        .collect();
    tracing::debug!(
        document_type = schema.name,
        document_count = documents.len(),
        "checking documents"
    );

    let mut type_violations = Vec::new();
    if schema.singleton && documents.len() > 1 {
        type_violations.push(format!(
            "singleton has {} published documents",
            documents.len()
        ));
    }

    let findings = documents
        .iter()
        .filter_map(|doc| {
            let violations = validate(schema, doc);
            (!violations.is_empty()).then(|| DocumentFindings {
                id: doc.id.clone(),
                preview: schema.preview.render(&doc.to_value()),
                violations,
            })
        })
        .collect();

    Ok(TypeReport {
        document_type: schema.name.to_string(),
        checked: documents.len(),
        type_violations,
        documents: findings,
    })
}

/// Check every schema in order, stopping at the first store failure.
pub fn check_all<S: DocumentStore + ?Sized>(
    store: &S,
    schemas: &[DocumentSchema],
) -> Result<Vec<TypeReport>> {
    schemas
        .iter()
        .map(|schema| check_type(store, schema))
        .collect()
}

/// Plain-text rendering for the terminal.
pub fn render_reports(reports: &[TypeReport]) -> String {
    let mut out = String::new();
    for report in reports {
        let status = if report.is_clean() { "ok" } else { "FAIL" };
        out.push_str(&format!(
            "{} [{status}] {} checked, {} violation(s)\n",
            report.document_type,
            report.checked,
            report.violation_count()
        ));
        for message in &report.type_violations {
            out.push_str(&format!("  {message}\n"));
        }
        for doc in &report.documents {
            out.push_str(&format!("  {} ({})\n", doc.preview.title, doc.id));
            for violation in &doc.violations {
                out.push_str(&format!("    - {violation}\n"));
            }
        }
    }
    out
}
