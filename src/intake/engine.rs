//! Intake event orchestration
//!
//! One engine instance serves every chat. Each inbound event is handled as
//! an independent task: read session, fold through the pure transition,
//! send replies, write the session back with a refreshed TTL, then execute
//! the side effect. No in-process lock is held across any await — within-chat
//! ordering relies on the session store's per-key last-write-wins semantics.
//!
//! Nothing here is allowed to escape to the webhook layer: every failure
//! resolves to a user-facing message, a session write, or a logged
//! fire-and-forget outcome.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use super::{
    DocumentKind, IntakeEvent, IntakeState, MessageCatalog, Session, SideEffect, transition,
};
use crate::attachments::{self, AttachmentStore};
use crate::channels::ChatGateway;
use crate::db::{CaseRepo, NewCase};
use crate::processing::{CaseProcessor, CaseSubmission};
use crate::rag::CaseIndexer;
use crate::session::{SessionLookup, SessionStore};
use crate::{Error, Result};

/// Case intake engine: state machine plus its collaborators
pub struct IntakeEngine {
    sessions: SessionStore,
    gateway: Arc<dyn ChatGateway>,
    processor: Arc<dyn CaseProcessor>,
    indexer: Arc<dyn CaseIndexer>,
    cases: CaseRepo,
    attachments: AttachmentStore,
    messages: Arc<MessageCatalog>,
    reset_delay: Duration,
}

impl IntakeEngine {
    /// Create an engine over its collaborators
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sessions: SessionStore,
        gateway: Arc<dyn ChatGateway>,
        processor: Arc<dyn CaseProcessor>,
        indexer: Arc<dyn CaseIndexer>,
        cases: CaseRepo,
        attachments: AttachmentStore,
        messages: MessageCatalog,
        reset_delay: Duration,
    ) -> Self {
        Self {
            sessions,
            gateway,
            processor,
            indexer,
            cases,
            attachments,
            messages: Arc::new(messages),
            reset_delay,
        }
    }

    /// Handle one inbound event for a chat
    ///
    /// Never fails: every error path resolves internally.
    pub async fn handle_event(&self, chat_id: i64, event: IntakeEvent) {
        if event.is_empty() {
            return;
        }

        let session = match self.sessions.get(chat_id).await {
            Ok(SessionLookup::Found(session)) => session,
            Ok(SessionLookup::Missing) => Session::new(),
            Ok(SessionLookup::Corrupt) => {
                // Protocol fault: force the chat back to the start
                self.write_session(chat_id, &Session::new()).await;
                self.send(chat_id, &self.messages.invalid_greeting).await;
                return;
            }
            Err(error) => {
                tracing::error!(chat_id, %error, "session read failed; dropping event");
                return;
            }
        };

        let step = transition(session, &event, &self.messages);

        for reply in &step.replies {
            self.send(chat_id, reply).await;
        }
        self.write_session(chat_id, &step.session).await;

        match step.effect {
            SideEffect::None => {}
            SideEffect::FetchDocument {
                file_id,
                file_name,
                kind,
            } => {
                self.fetch_document(chat_id, step.session, &file_id, file_name.as_deref(), kind)
                    .await;
            }
            SideEffect::Submit => self.submit_case(chat_id, step.session).await,
        }
    }

    /// Download a fresh document and append it to the session
    ///
    /// A failed download leaves the session untouched; the user is told and
    /// may resend.
    async fn fetch_document(
        &self,
        chat_id: i64,
        mut session: Session,
        file_id: &str,
        file_name: Option<&str>,
        kind: DocumentKind,
    ) {
        let (bytes, file_path) = match self.gateway.download_file(file_id).await {
            Ok(downloaded) => downloaded,
            Err(error) => {
                tracing::warn!(chat_id, file_id, %error, "document download failed");
                self.send(chat_id, &self.messages.download_failed).await;
                return;
            }
        };

        let display_name = attachments::display_name(file_name, &file_path);
        let record = match self.attachments.save(file_id, &display_name, &bytes).await {
            Ok(record) => record,
            Err(error) => {
                tracing::warn!(chat_id, file_id, %error, "attachment pinning failed");
                self.send(chat_id, &self.messages.download_failed).await;
                return;
            }
        };

        match kind {
            DocumentKind::Evidence => session.evidence.push(record),
            DocumentKind::CaseDocument => session.case_documents.push(record),
        }

        self.write_session(chat_id, &session).await;
        self.send(chat_id, &self.messages.document_received).await;
    }

    /// Run the submission flow for a completed intake
    async fn submit_case(&self, chat_id: i64, session: Session) {
        let case_id = Uuid::new_v4().to_string();

        match self.try_submit(&case_id, &session).await {
            Ok(()) => {
                let summary = self.messages.summary(
                    &case_id,
                    session.lawyer_id.as_deref().unwrap_or_default(),
                    session.judge_id.as_deref().unwrap_or_default(),
                    session.user_id.as_deref().unwrap_or_default(),
                    session.evidence.len(),
                    session.case_documents.len(),
                );
                self.send(chat_id, &summary).await;

                self.attachments.remove_all(&session.all_attachments()).await;

                let mut completed = Session::new();
                completed.state = IntakeState::Complete;
                completed.case_id = Some(case_id.clone());
                completed.lawyer_id = session.lawyer_id.clone();
                completed.judge_id = session.judge_id.clone();
                completed.user_id = session.user_id.clone();
                self.write_session(chat_id, &completed).await;

                self.schedule_reset(chat_id);
                tracing::info!(chat_id, case_id = %case_id, "case intake completed");
            }
            Err(error) => {
                tracing::error!(chat_id, case_id = %case_id, %error, "case submission failed");
                self.send(chat_id, &self.messages.failure).await;

                // Cleanup and reset happen on every failure, with no delay
                self.attachments.remove_all(&session.all_attachments()).await;
                self.write_session(chat_id, &Session::new()).await;
            }
        }
    }

    /// Submit to the classification service and persist the merged record
    ///
    /// Either the full case record lands or nothing does; the indexing
    /// trigger is detached and cannot fail the flow.
    async fn try_submit(&self, case_id: &str, session: &Session) -> Result<()> {
        let submission = CaseSubmission {
            case_id: case_id.to_string(),
            lawyer_id: required(&session.lawyer_id, "lawyer_id")?,
            judge_id: required(&session.judge_id, "judge_id")?,
            user_id: required(&session.user_id, "user_id")?,
            evidence: session.evidence.clone(),
            case_documents: session.case_documents.clone(),
        };

        let classification = self.processor.submit(&submission).await?;

        self.cases.insert(&NewCase {
            case_id,
            lawyer_id: &submission.lawyer_id,
            judge_id: &submission.judge_id,
            user_id: &submission.user_id,
            classification: &classification,
        })?;

        // Make the case searchable; outcome is logged only
        let indexer = Arc::clone(&self.indexer);
        let case_id = case_id.to_string();
        tokio::spawn(async move {
            match indexer.load_case(&case_id).await {
                Ok(()) => tracing::info!(case_id = %case_id, "case loaded into RAG index"),
                Err(error) => {
                    tracing::error!(case_id = %case_id, %error, "RAG index load failed");
                }
            }
        });

        Ok(())
    }

    /// Schedule the post-success reset
    ///
    /// The reset always fires after the delay, regardless of intervening
    /// activity; events that land in the window see the `Complete` session.
    fn schedule_reset(&self, chat_id: i64) {
        let sessions = self.sessions.clone();
        let gateway = Arc::clone(&self.gateway);
        let messages = Arc::clone(&self.messages);
        let delay = self.reset_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            if let Err(error) = sessions.set(chat_id, &Session::new()).await {
                tracing::error!(chat_id, %error, "post-success session reset failed");
            }
            if let Err(error) = gateway.send_message(chat_id, &messages.restart_prompt).await {
                tracing::warn!(chat_id, %error, "restart prompt send failed");
            }
        });
    }

    /// Send one outbound message, logging delivery failures
    async fn send(&self, chat_id: i64, text: &str) {
        if let Err(error) = self.gateway.send_message(chat_id, text).await {
            tracing::warn!(chat_id, %error, "outbound message send failed");
        }
    }

    /// Write the session back, logging store failures
    async fn write_session(&self, chat_id: i64, session: &Session) {
        if let Err(error) = self.sessions.set(chat_id, session).await {
            tracing::error!(chat_id, %error, "session write failed");
        }
    }
}

/// Pull a role identifier the collecting states should have filled in
fn required(value: &Option<String>, field: &str) -> Result<String> {
    value
        .clone()
        .ok_or_else(|| Error::Processing(format!("session is missing {field}")))
}
