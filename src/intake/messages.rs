//! Bot message templates
//!
//! The catalog is injected into the state machine rather than referenced as
//! globals, so tests and deployments can swap wording without touching
//! transition logic.

/// Message templates keyed by outcome
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    /// Greeting accepted; intake starts
    pub welcome: String,
    /// Ask for the lawyer's username
    pub request_lawyer_id: String,
    /// Ask for the judge's username
    pub request_judge_id: String,
    /// Ask for the client's username
    pub request_client_id: String,
    /// Ask for evidence documents
    pub request_evidence: String,
    /// Ask for the remaining case documents
    pub request_documents: String,
    /// A document was downloaded and stored
    pub document_received: String,
    /// The same file handle was already uploaded in this session
    pub duplicate_document: String,
    /// DONE sent before any evidence arrived
    pub need_evidence: String,
    /// DONE sent before any case document arrived
    pub need_documents: String,
    /// Neither a document nor DONE while collecting
    pub send_or_done: String,
    /// A document download failed; the user may resend
    pub download_failed: String,
    /// Anything but hi/hello while awaiting the greeting
    pub invalid_greeting: String,
    /// An identifier that is not a single word
    pub invalid_username: String,
    /// Submission started
    pub processing: String,
    /// Submission succeeded (header of the summary)
    pub success: String,
    /// Submission or persistence failed
    pub failure: String,
    /// Input while a submission is in flight
    pub please_wait: String,
    /// Input after completion, before the delayed reset fires
    pub case_complete: String,
    /// Sent when the delayed reset fires
    pub restart_prompt: String,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self {
            welcome: "👋 Welcome! I'm here to help you with your legal case documentation.\n\nPlease provide the following information:".to_string(),
            request_lawyer_id: "📝 Please send the Lawyer's Username (single word):".to_string(),
            request_judge_id: "⚖️ Please send the Judge's Username (single word):".to_string(),
            request_client_id: "👤 Please send the Client's Username (single word):".to_string(),
            request_evidence: "📎 Please send evidence documents for the court case.\n\nYou can send multiple documents. When you're done, send 'DONE'.".to_string(),
            request_documents: "📄 Please send other case documents.\n\nYou can send multiple documents. When you're done, send 'DONE'.".to_string(),
            document_received: "✅ Document received. Send more documents or type 'DONE' when finished.".to_string(),
            duplicate_document: "⚠️ This file has already been uploaded. Send a different file or type 'DONE'.".to_string(),
            need_evidence: "⚠️ Please send at least one evidence document before typing 'DONE'.".to_string(),
            need_documents: "⚠️ Please send at least one case document before typing 'DONE'.".to_string(),
            send_or_done: "Please send a document or type 'DONE' when finished.".to_string(),
            download_failed: "❌ Failed to download the document. Please try again.".to_string(),
            invalid_greeting: "Please start by sending 'hi' or 'hello' to begin the process.".to_string(),
            invalid_username: "Username must be a single word. Please try again:".to_string(),
            processing: "⏳ Processing your case data and sending to the server...".to_string(),
            success: "✅ Case created successfully!".to_string(),
            failure: "❌ An error occurred while processing your request. Please try again.".to_string(),
            please_wait: "Please wait while we process your case...".to_string(),
            case_complete: "Your case is complete. Send 'hi' or 'hello' to start a new case.".to_string(),
            restart_prompt: "You can start a new case by sending 'hi' or 'hello'.".to_string(),
        }
    }
}

impl MessageCatalog {
    /// Render the post-submission case summary
    #[must_use]
    pub fn summary(
        &self,
        case_id: &str,
        lawyer_id: &str,
        judge_id: &str,
        user_id: &str,
        evidence_count: usize,
        document_count: usize,
    ) -> String {
        format!(
            "{}\n\n📋 Case Summary:\n🆔 Case ID: {case_id}\n👨‍⚖️ Lawyer: {lawyer_id}\n⚖️ Judge: {judge_id}\n👤 Client: {user_id}\n📎 Evidence Documents: {evidence_count}\n📄 Case Documents: {document_count}\n\nYour case has been successfully created and sent for processing!",
            self.success
        )
    }
}
