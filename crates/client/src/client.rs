//! Organisation store HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required). Covers the three
//! I/O boundaries of an import: fetch a remote document, read the local
//! organisation snapshot, submit the commit.

use std::time::Duration;

use aidrecon_config::Settings;
use aidrecon_recon::{
    CommitRequest, CommitResult, DocumentFetcher, LocalOrganisation, OrganisationStore,
    ReconError,
};
use log::{debug, info};

use crate::auth::load_auth;

/// Longest body excerpt carried in an error message.
const BODY_EXCERPT_CHARS: usize = 300;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Store refused the credentials (or none were sent)
    #[error("not authenticated; save a token for this store first")]
    NotAuthenticated,
    #[error("network error: {0}")]
    Network(String),
    /// Non-success status with the server's reason or a body excerpt
    #[error("HTTP {0}: {1}")]
    Http(u16, String),
    /// Server rejected the payload (400/422)
    #[error("{0}")]
    Validation(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("I/O error: {0}")]
    Io(String),
}

/// Organisation store API client (blocking).
#[derive(Clone)]
pub struct StoreClient {
    http: reqwest::blocking::Client,
    api_base: String,
    token: Option<String>,
}

impl StoreClient {
    /// Client for `settings.api_base`, using saved credentials when they were
    /// issued for that base.
    pub fn from_settings(settings: &Settings) -> Self {
        let token = load_auth()
            .filter(|creds| creds.applies_to(&settings.api_base))
            .map(|creds| creds.token);
        Self::new(settings, token)
    }

    /// Create a new client with an explicit token.
    pub fn new(settings: &Settings, token: Option<String>) -> Self {
        let http = reqwest::blocking::Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// GET an organisation document by absolute URL. The bearer token is only
    /// sent when the URL points at the configured store.
    pub fn fetch_document(&self, url: &str) -> Result<String, ClientError> {
        let resp = self.get(url)?;
        let text = resp.text().map_err(|e| ClientError::Network(e.to_string()))?;
        debug!("fetched {} bytes from {url}", text.len());
        Ok(text)
    }

    /// Current local record for `organisation_id`.
    pub fn fetch_organisation(
        &self,
        organisation_id: &str,
    ) -> Result<LocalOrganisation, ClientError> {
        let url = format!("{}/api/organizations/{}/", self.api_base, organisation_id);
        let resp = self.get(&url)?;
        resp.json::<LocalOrganisation>()
            .map_err(|e| ClientError::Parse(e.to_string()))
    }

    /// Submit one import commit.
    pub fn commit_import(
        &self,
        organisation_id: &str,
        request: &CommitRequest,
    ) -> Result<CommitResult, ClientError> {
        let url = format!("{}/api/organizations/{}/iati-import/", self.api_base, organisation_id);
        let body = serde_json::to_value(request).map_err(|e| ClientError::Parse(e.to_string()))?;
        let resp = self.post_json(&url, &body)?;
        let result = resp
            .json::<CommitResult>()
            .map_err(|e| ClientError::Parse(e.to_string()))?;
        info!(
            "organisation {organisation_id}: store applied {} field(s)",
            result.updated_field_count
        );
        Ok(result)
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn is_store_url(&self, url: &str) -> bool {
        url.starts_with(&format!("{}/", self.api_base))
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response, ClientError> {
        debug!("GET {url}");
        let mut req = self.http.get(url);
        if let (Some(token), true) = (&self.token, self.is_store_url(url)) {
            req = req.bearer_auth(token);
        }
        let response = req.send().map_err(|e| ClientError::Network(e.to_string()))?;
        check_status(response)
    }

    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::blocking::Response, ClientError> {
        debug!("POST {url}");
        let mut req = self.http.post(url).json(body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let response = req.send().map_err(|e| ClientError::Network(e.to_string()))?;
        check_status(response)
    }
}

fn check_status(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, ClientError> {
    let status = response.status().as_u16();
    if response.status().is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    let reason = rejection_reason(&body);
    match status {
        401 | 403 => Err(ClientError::NotAuthenticated),
        400 | 422 => Err(ClientError::Validation(reason)),
        _ => Err(ClientError::Http(status, reason)),
    }
}

/// The server's stated reason: a JSON `error`, `detail` or `message` string,
/// else per-field error lists joined, else a trimmed body excerpt.
pub fn rejection_reason(body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "detail", "message"] {
            if let Some(serde_json::Value::String(reason)) = map.get(key) {
                return reason.clone();
            }
        }
        let field_errors: Vec<String> = map
            .iter()
            .filter_map(|(field, value)| {
                let messages: Vec<&str> =
                    value.as_array()?.iter().filter_map(|m| m.as_str()).collect();
                (!messages.is_empty()).then(|| format!("{field}: {}", messages.join(", ")))
            })
            .collect();
        if !field_errors.is_empty() {
            return field_errors.join("; ");
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    match trimmed.char_indices().nth(BODY_EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}…", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

// ── Engine collaborator impls ───────────────────────────────────────

impl DocumentFetcher for StoreClient {
    fn fetch_document(&self, url: &str) -> Result<String, ReconError> {
        StoreClient::fetch_document(self, url).map_err(|e| ReconError::Fetch(e.to_string()))
    }
}

impl OrganisationStore for StoreClient {
    fn fetch_snapshot(&self, organisation_id: &str) -> Result<LocalOrganisation, ReconError> {
        self.fetch_organisation(organisation_id)
            .map_err(|e| ReconError::Fetch(e.to_string()))
    }

    fn commit(
        &self,
        organisation_id: &str,
        request: &CommitRequest,
    ) -> Result<CommitResult, ReconError> {
        self.commit_import(organisation_id, request)
            .map_err(|e| ReconError::Commit(e.to_string()))
    }
}
