//! Hosted content lake over its HTTP query and mutate endpoints.
use super::{CommitReceipt, DocumentQuery, DocumentStore, StoreError, Transaction};
use crate::config::StudioConfig;
use crate::document::Document;
use serde::Deserialize;
use serde_json::Value;
use std::time::Instant;

/// Remote store for one project/dataset pair.
pub struct HttpStore {
    agent: ureq::Agent,
    base_url: String,
    dataset: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    result: Vec<Document>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MutateResponse {
    transaction_id: String,
    #[serde(default)]
    results: Vec<MutateResult>,
}

#[derive(Debug, Deserialize)]
struct MutateResult {
    id: String,
}

impl HttpStore {
    pub fn new(config: &StudioConfig) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(agent_config),
            base_url: api_base_url(config),
            dataset: config.dataset.clone(),
            token: config.token.clone(),
        }
    }

    fn query_url(&self) -> String {
        format!("{}/data/query/{}", self.base_url, self.dataset)
    }

    fn mutate_url(&self) -> String {
        format!("{}/data/mutate/{}", self.base_url, self.dataset)
    }

    fn bearer(&self) -> Option<String> {
        self.token.as_ref().map(|token| format!("Bearer {token}"))
    }
}

fn api_base_url(config: &StudioConfig) -> String {
    format!(
        "https://{}.api.sanity.io/v{}",
        config.project_id, config.api_version
    )
}

impl DocumentStore for HttpStore {
    fn fetch(&self, query: &DocumentQuery) -> Result<Vec<Document>, StoreError> {
        let start = Instant::now();
        let groq = query.to_groq();
        let type_param = Value::String(query.document_type.clone()).to_string();
        let url = self.query_url();

        let mut request = self
            .agent
            .get(url.as_str())
            .query("query", &groq)
            .query("$type", &type_param)
            .query("perspective", "raw");
        if let Some(bearer) = self.bearer() {
            request = request.header("Authorization", &bearer);
        }
        let mut response = request
            .call()
            .map_err(|err| StoreError::Transport(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|err| StoreError::Transport(format!("read response body: {err}")))?;

        tracing::info!(
            elapsed_ms = start.elapsed().as_millis(),
            status,
            response_bytes = body.len(),
            document_type = %query.document_type,
            "content lake query complete"
        );
        decode_query_response(status, &body)
    }

    fn commit(&mut self, transaction: Transaction) -> Result<CommitReceipt, StoreError> {
        let start = Instant::now();
        let body_bytes = serde_json::to_vec(&transaction)
            .map_err(|err| StoreError::Decode(format!("encode mutations: {err}")))?;
        let url = self.mutate_url();

        let mut request = self
            .agent
            .post(url.as_str())
            .query("returnIds", "true")
            .header("Content-Type", "application/json");
        if let Some(bearer) = self.bearer() {
            request = request.header("Authorization", &bearer);
        }
        let mut response = request
            .send(&body_bytes[..])
            .map_err(|err| StoreError::Transport(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|err| StoreError::Transport(format!("read response body: {err}")))?;

        tracing::info!(
            elapsed_ms = start.elapsed().as_millis(),
            status,
            mutation_count = transaction.len(),
            "content lake mutate complete"
        );
        decode_mutate_response(status, &body)
    }
}

fn decode_query_response(status: u16, body: &str) -> Result<Vec<Document>, StoreError> {
    if !(200..300).contains(&status) {
        return Err(StoreError::Status {
            status,
            message: error_message(body),
        });
    }
    let response: QueryResponse =
        serde_json::from_str(body).map_err(|err| StoreError::Decode(err.to_string()))?;
    Ok(response.result)
}

fn decode_mutate_response(status: u16, body: &str) -> Result<CommitReceipt, StoreError> {
    if !(200..300).contains(&status) {
        return Err(StoreError::Status {
            status,
            message: error_message(body),
        });
    }
    let response: MutateResponse =
        serde_json::from_str(body).map_err(|err| StoreError::Decode(err.to_string()))?;
    Ok(CommitReceipt {
        transaction_id: response.transaction_id,
        document_ids: response.results.into_iter().map(|r| r.id).collect(),
    })
}

/// Best human-readable message from an API error body.
fn error_message(body: &str) -> String {
    let fallback = || {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            "(empty response)".to_string()
        } else {
            trimmed.chars().take(200).collect()
        }
    };
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return fallback();
    };
    let error = &value["error"];
    error["description"]
        .as_str()
        .or_else(|| value["message"].as_str())
        .or_else(|| error.as_str())
        .map(str::to_string)
        .unwrap_or_else(fallback)
}
