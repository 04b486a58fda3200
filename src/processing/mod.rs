//! Processing submission client
//!
//! Packages a finished intake session into one multipart request to the
//! downstream classification service. The field contract is fixed: the case
//! and role identifiers travel as scalar fields; every evidence file is
//! appended under the repeated `Evidence` field and every case document
//! under `Full_docs`, so the receiving side reconstructs both ordered lists
//! by field name alone.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use std::time::Duration;

use crate::attachments::{AttachmentRecord, AttachmentSource};
use crate::{Error, Result};

/// A case ready for submission: identifiers plus both attachment lists
///
/// Ephemeral — built right before the submission call and discarded after
/// the response is merged into the persisted case.
#[derive(Debug, Clone)]
pub struct CaseSubmission {
    pub case_id: String,
    pub lawyer_id: String,
    pub judge_id: String,
    pub user_id: String,
    pub evidence: Vec<AttachmentRecord>,
    pub case_documents: Vec<AttachmentRecord>,
}

/// Submission seam for the intake engine
#[async_trait]
pub trait CaseProcessor: Send + Sync {
    /// Submit the case and return the service's structured response
    ///
    /// The response fields are opaque; they are merged verbatim into the
    /// persisted case record.
    async fn submit(&self, submission: &CaseSubmission) -> Result<serde_json::Value>;
}

/// HTTP client for the classification service
#[derive(Debug, Clone)]
pub struct ProcessingClient {
    client: Client,
    base_url: String,
}

impl ProcessingClient {
    /// Create a client for the given base URL with a request timeout
    ///
    /// The timeout should be generous — classification runs ML models.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Processing(format!("cannot build http client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Build one multipart file part from an attachment record
    ///
    /// File-backed records are streamed from their scratch slot; buffer-backed
    /// records are attached directly. The wire representation is identical.
    async fn file_part(attachment: &AttachmentRecord) -> Result<Part> {
        let part = match &attachment.source {
            AttachmentSource::File(path) => {
                let file = tokio::fs::File::open(path).await.map_err(|e| {
                    Error::Processing(format!(
                        "cannot open attachment {}: {e}",
                        path.display()
                    ))
                })?;
                Part::stream(reqwest::Body::from(file))
            }
            AttachmentSource::Buffer(bytes) => Part::bytes(bytes.clone()),
        };
        Ok(part.file_name(attachment.display_name.clone()))
    }
}

#[async_trait]
impl CaseProcessor for ProcessingClient {
    async fn submit(&self, submission: &CaseSubmission) -> Result<serde_json::Value> {
        let mut form = Form::new()
            .text("CaseID", submission.case_id.clone())
            .text("LawyerID", submission.lawyer_id.clone())
            .text("JudgeID", submission.judge_id.clone())
            .text("UserID", submission.user_id.clone());

        for attachment in &submission.evidence {
            form = form.part("Evidence", Self::file_part(attachment).await?);
        }
        for attachment in &submission.case_documents {
            form = form.part("Full_docs", Self::file_part(attachment).await?);
        }

        let url = format!("{}/classify", self.base_url);
        tracing::info!(
            case_id = %submission.case_id,
            evidence = submission.evidence.len(),
            case_documents = submission.case_documents.len(),
            url = %url,
            "submitting case to classification service"
        );

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Processing(format!("classification request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Processing(format!(
                "classification service error: {status} - {body}"
            )));
        }

        let fields = response
            .json()
            .await
            .map_err(|e| Error::Processing(format!("classification response parse error: {e}")))?;

        tracing::info!(case_id = %submission.case_id, "classification response received");
        Ok(fields)
    }
}
