//! RAG indexing service integration
//!
//! Client for loading a finalized case into the retrieval index. The call
//! runs detached from the user-visible flow: its outcome is logged, never
//! surfaced, never retried inline.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::{Error, Result};

/// Indexing seam for the intake engine
#[async_trait]
pub trait CaseIndexer: Send + Sync {
    /// Load one case into the retrieval index
    async fn load_case(&self, case_id: &str) -> Result<()>;
}

/// `POST /rag/load` request body
#[derive(Serialize)]
struct LoadCaseRequest<'a> {
    #[serde(rename = "caseID")]
    case_id: &'a str,
}

/// Client for the RAG indexing service
#[derive(Debug, Clone)]
pub struct RagClient {
    client: Client,
    base_url: String,
}

impl RagClient {
    /// Create a client for the given base URL with an independent timeout
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Indexing(format!("cannot build http client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl CaseIndexer for RagClient {
    async fn load_case(&self, case_id: &str) -> Result<()> {
        let url = format!("{}/rag/load", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&LoadCaseRequest { case_id })
            .send()
            .await
            .map_err(|e| Error::Indexing(format!("RAG load request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Indexing(format!(
                "RAG service error: {status} - {body}"
            )));
        }

        Ok(())
    }
}
