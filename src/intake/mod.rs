//! Case intake state machine
//!
//! The conversation is a strictly linear protocol: greeting, three role
//! identifiers, two document-collection phases, then submission. Each inbound
//! webhook event is folded through the pure [`transition`] function, which
//! returns the next session, the replies to send, and at most one side
//! effect for the engine to execute. All validation failures recover locally
//! by re-prompting without leaving the current state.

mod engine;
mod messages;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::attachments::AttachmentRecord;

pub use engine::IntakeEngine;
pub use messages::MessageCatalog;

/// Username rule: one whitespace-free token of word characters
static SINGLE_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+$").expect("valid regex"));

/// Conversation states, in protocol order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntakeState {
    AwaitingGreeting,
    AwaitingLawyerId,
    AwaitingJudgeId,
    AwaitingClientId,
    AwaitingEvidence,
    AwaitingDocuments,
    Submitting,
    Complete,
}

/// Per-chat conversation state, persisted to the session store after every
/// handled event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Current protocol state
    pub state: IntakeState,
    /// Lawyer username, set in `AwaitingLawyerId`
    pub lawyer_id: Option<String>,
    /// Judge username, set in `AwaitingJudgeId`
    pub judge_id: Option<String>,
    /// Client username, set in `AwaitingClientId`
    pub user_id: Option<String>,
    /// Evidence attachments, insertion order preserved
    pub evidence: Vec<AttachmentRecord>,
    /// Case-document attachments, insertion order preserved
    pub case_documents: Vec<AttachmentRecord>,
    /// Assigned once intake completes
    pub case_id: Option<String>,
}

impl Session {
    /// A fresh session at the start of the protocol
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: IntakeState::AwaitingGreeting,
            lawyer_id: None,
            judge_id: None,
            user_id: None,
            evidence: Vec::new(),
            case_documents: Vec::new(),
            case_id: None,
        }
    }

    /// Every attachment tracked by this session, evidence first
    #[must_use]
    pub fn all_attachments(&self) -> Vec<AttachmentRecord> {
        self.evidence
            .iter()
            .chain(self.case_documents.iter())
            .cloned()
            .collect()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Which attachment list a document event targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Evidence,
    CaseDocument,
}

/// A document reference carried by an inbound event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    /// Opaque platform file handle
    pub file_id: String,
    /// Original filename, if the platform supplied one
    pub file_name: Option<String>,
}

/// One inbound webhook event, reduced to what the protocol consumes
#[derive(Debug, Clone, Default)]
pub struct IntakeEvent {
    /// Message text, if any
    pub text: Option<String>,
    /// Attached document, if any
    pub document: Option<DocumentRef>,
}

impl IntakeEvent {
    /// A text-only event
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            document: None,
        }
    }

    /// A document-only event
    #[must_use]
    pub fn document(file_id: impl Into<String>, file_name: Option<String>) -> Self {
        Self {
            text: None,
            document: Some(DocumentRef {
                file_id: file_id.into(),
                file_name,
            }),
        }
    }

    /// Whether the event carries nothing the protocol consumes
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.text.is_none() && self.document.is_none()
    }
}

/// The side effect a transition asks the engine to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    /// Nothing beyond replies and the session write
    None,
    /// Download a fresh document into the given list
    FetchDocument {
        file_id: String,
        file_name: Option<String>,
        kind: DocumentKind,
    },
    /// Assemble and submit the case
    Submit,
}

/// Result of folding one event through the state machine
#[derive(Debug, Clone)]
pub struct Step {
    /// The session after the transition
    pub session: Session,
    /// Replies to send, in order
    pub replies: Vec<String>,
    /// At most one side effect for the engine
    pub effect: SideEffect,
}

impl Step {
    fn stay(session: Session, replies: Vec<String>) -> Self {
        Self {
            session,
            replies,
            effect: SideEffect::None,
        }
    }
}

/// Whether the trimmed input is a valid single-word username
#[must_use]
pub fn is_single_word(text: &str) -> bool {
    SINGLE_WORD.is_match(text.trim())
}

/// Fold one inbound event through the state machine
///
/// Pure: performs no I/O and never fails. Dedup against the session's
/// attachment lists happens here, before any download is requested.
#[must_use]
pub fn transition(session: Session, event: &IntakeEvent, messages: &MessageCatalog) -> Step {
    match session.state {
        IntakeState::AwaitingGreeting => greeting(session, event, messages),
        IntakeState::AwaitingLawyerId => identifier(
            session,
            event,
            messages,
            |s, id| s.lawyer_id = Some(id),
            IntakeState::AwaitingJudgeId,
            messages.request_judge_id.clone(),
        ),
        IntakeState::AwaitingJudgeId => identifier(
            session,
            event,
            messages,
            |s, id| s.judge_id = Some(id),
            IntakeState::AwaitingClientId,
            messages.request_client_id.clone(),
        ),
        IntakeState::AwaitingClientId => identifier(
            session,
            event,
            messages,
            |s, id| s.user_id = Some(id),
            IntakeState::AwaitingEvidence,
            messages.request_evidence.clone(),
        ),
        IntakeState::AwaitingEvidence => collecting(session, event, messages, DocumentKind::Evidence),
        IntakeState::AwaitingDocuments => {
            collecting(session, event, messages, DocumentKind::CaseDocument)
        }
        IntakeState::Submitting => {
            let reply = messages.please_wait.clone();
            Step::stay(session, vec![reply])
        }
        IntakeState::Complete => {
            let reply = messages.case_complete.clone();
            Step::stay(session, vec![reply])
        }
    }
}

/// Greeting gate: only a case-insensitive hi/hello advances.
/// Document events are ignored here.
fn greeting(mut session: Session, event: &IntakeEvent, messages: &MessageCatalog) -> Step {
    let Some(text) = event.text.as_deref() else {
        return Step::stay(session, vec![]);
    };

    let lower = text.trim().to_lowercase();
    if lower == "hi" || lower == "hello" {
        session.state = IntakeState::AwaitingLawyerId;
        Step::stay(
            session,
            vec![messages.welcome.clone(), messages.request_lawyer_id.clone()],
        )
    } else {
        Step::stay(session, vec![messages.invalid_greeting.clone()])
    }
}

/// Shared handler for the three identifier states.
/// Document events are ignored here.
fn identifier(
    mut session: Session,
    event: &IntakeEvent,
    messages: &MessageCatalog,
    store: impl FnOnce(&mut Session, String),
    next: IntakeState,
    prompt: String,
) -> Step {
    let Some(text) = event.text.as_deref() else {
        return Step::stay(session, vec![]);
    };

    if !is_single_word(text) {
        return Step::stay(session, vec![messages.invalid_username.clone()]);
    }

    store(&mut session, text.trim().to_string());
    session.state = next;
    Step::stay(session, vec![prompt])
}

/// Shared handler for the two document-collection states
fn collecting(
    mut session: Session,
    event: &IntakeEvent,
    messages: &MessageCatalog,
    kind: DocumentKind,
) -> Step {
    let done = event
        .text
        .as_deref()
        .is_some_and(|t| t.trim().eq_ignore_ascii_case("DONE"));

    if done {
        let (list_len, empty_warning) = match kind {
            DocumentKind::Evidence => (session.evidence.len(), messages.need_evidence.clone()),
            DocumentKind::CaseDocument => {
                (session.case_documents.len(), messages.need_documents.clone())
            }
        };

        if list_len == 0 {
            return Step::stay(session, vec![empty_warning]);
        }

        return match kind {
            DocumentKind::Evidence => {
                session.state = IntakeState::AwaitingDocuments;
                Step::stay(session, vec![messages.request_documents.clone()])
            }
            DocumentKind::CaseDocument => {
                session.state = IntakeState::Submitting;
                Step {
                    session,
                    replies: vec![messages.processing.clone()],
                    effect: SideEffect::Submit,
                }
            }
        };
    }

    if let Some(document) = &event.document {
        let list = match kind {
            DocumentKind::Evidence => &session.evidence,
            DocumentKind::CaseDocument => &session.case_documents,
        };

        // Dedup precedes any download
        if list
            .iter()
            .any(|record| record.source_file_id == document.file_id)
        {
            tracing::info!(
                file_id = %document.file_id,
                file_name = ?document.file_name,
                "skipping duplicate document"
            );
            return Step::stay(session, vec![messages.duplicate_document.clone()]);
        }

        let effect = SideEffect::FetchDocument {
            file_id: document.file_id.clone(),
            file_name: document.file_name.clone(),
            kind,
        };
        return Step {
            session,
            replies: vec![],
            effect,
        };
    }

    if event.text.is_some() {
        return Step::stay(session, vec![messages.send_or_done.clone()]);
    }

    Step::stay(session, vec![])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachments::AttachmentSource;

    fn catalog() -> MessageCatalog {
        MessageCatalog::default()
    }

    fn record(file_id: &str) -> AttachmentRecord {
        AttachmentRecord {
            source_file_id: file_id.to_string(),
            display_name: format!("{file_id}.pdf"),
            source: AttachmentSource::Buffer(vec![1, 2, 3]),
        }
    }

    #[test]
    fn test_greeting_gate_rejects_other_text() {
        let messages = catalog();
        let step = transition(Session::new(), &IntakeEvent::text("howdy"), &messages);

        assert_eq!(step.session.state, IntakeState::AwaitingGreeting);
        assert_eq!(step.replies, vec![messages.invalid_greeting.clone()]);
    }

    #[test]
    fn test_greeting_gate_is_case_insensitive() {
        let messages = catalog();
        for input in ["hi", "HELLO", "Hello", "  hi  "] {
            let step = transition(Session::new(), &IntakeEvent::text(input), &messages);
            assert_eq!(step.session.state, IntakeState::AwaitingLawyerId, "input {input:?}");
            assert_eq!(step.replies.len(), 2);
        }
    }

    #[test]
    fn test_greeting_ignores_document_events() {
        let messages = catalog();
        let step = transition(
            Session::new(),
            &IntakeEvent::document("file-1", None),
            &messages,
        );

        assert_eq!(step.session.state, IntakeState::AwaitingGreeting);
        assert!(step.replies.is_empty());
        assert_eq!(step.effect, SideEffect::None);
    }

    #[test]
    fn test_multi_word_username_rejected() {
        let messages = catalog();
        let mut session = Session::new();
        session.state = IntakeState::AwaitingLawyerId;

        let step = transition(session, &IntakeEvent::text("john smith"), &messages);

        assert_eq!(step.session.state, IntakeState::AwaitingLawyerId);
        assert_eq!(step.session.lawyer_id, None);
        assert_eq!(step.replies, vec![messages.invalid_username.clone()]);
    }

    #[test]
    fn test_single_word_username_accepted() {
        let messages = catalog();
        let mut session = Session::new();
        session.state = IntakeState::AwaitingLawyerId;

        let step = transition(session, &IntakeEvent::text(" john_smith "), &messages);

        assert_eq!(step.session.state, IntakeState::AwaitingJudgeId);
        assert_eq!(step.session.lawyer_id.as_deref(), Some("john_smith"));
    }

    #[test]
    fn test_identifier_chain_ends_at_evidence() {
        let messages = catalog();
        let mut session = Session::new();
        session.state = IntakeState::AwaitingJudgeId;

        let step = transition(session, &IntakeEvent::text("hon_judy"), &messages);
        assert_eq!(step.session.state, IntakeState::AwaitingClientId);
        assert_eq!(step.session.judge_id.as_deref(), Some("hon_judy"));

        let step = transition(step.session, &IntakeEvent::text("client1"), &messages);
        assert_eq!(step.session.state, IntakeState::AwaitingEvidence);
        assert_eq!(step.session.user_id.as_deref(), Some("client1"));
        assert_eq!(step.replies, vec![messages.request_evidence.clone()]);
    }

    #[test]
    fn test_done_with_no_evidence_stays() {
        let messages = catalog();
        let mut session = Session::new();
        session.state = IntakeState::AwaitingEvidence;

        let step = transition(session, &IntakeEvent::text("DONE"), &messages);

        assert_eq!(step.session.state, IntakeState::AwaitingEvidence);
        assert_eq!(step.replies, vec![messages.need_evidence.clone()]);
    }

    #[test]
    fn test_done_after_one_evidence_advances() {
        let messages = catalog();
        let mut session = Session::new();
        session.state = IntakeState::AwaitingEvidence;
        session.evidence.push(record("file-1"));

        let step = transition(session, &IntakeEvent::text(" done "), &messages);

        assert_eq!(step.session.state, IntakeState::AwaitingDocuments);
        assert_eq!(step.replies, vec![messages.request_documents.clone()]);
    }

    #[test]
    fn test_done_in_documents_triggers_submit() {
        let messages = catalog();
        let mut session = Session::new();
        session.state = IntakeState::AwaitingDocuments;
        session.case_documents.push(record("file-9"));

        let step = transition(session, &IntakeEvent::text("DONE"), &messages);

        assert_eq!(step.session.state, IntakeState::Submitting);
        assert_eq!(step.effect, SideEffect::Submit);
        assert_eq!(step.replies, vec![messages.processing.clone()]);
    }

    #[test]
    fn test_fresh_document_requests_fetch() {
        let messages = catalog();
        let mut session = Session::new();
        session.state = IntakeState::AwaitingEvidence;

        let step = transition(
            session,
            &IntakeEvent::document("file-1", Some("scan.pdf".to_string())),
            &messages,
        );

        assert_eq!(
            step.effect,
            SideEffect::FetchDocument {
                file_id: "file-1".to_string(),
                file_name: Some("scan.pdf".to_string()),
                kind: DocumentKind::Evidence,
            }
        );
        // The acknowledgement comes after the download succeeds
        assert!(step.replies.is_empty());
    }

    #[test]
    fn test_duplicate_document_warned_without_fetch() {
        let messages = catalog();
        let mut session = Session::new();
        session.state = IntakeState::AwaitingEvidence;
        session.evidence.push(record("file-1"));

        let step = transition(session, &IntakeEvent::document("file-1", None), &messages);

        assert_eq!(step.effect, SideEffect::None);
        assert_eq!(step.replies, vec![messages.duplicate_document.clone()]);
        assert_eq!(step.session.evidence.len(), 1);
    }

    #[test]
    fn test_duplicate_check_is_per_list() {
        let messages = catalog();
        let mut session = Session::new();
        session.state = IntakeState::AwaitingDocuments;
        session.evidence.push(record("file-1"));

        // Same handle in the other list is still fresh for this one
        let step = transition(session, &IntakeEvent::document("file-1", None), &messages);

        assert!(matches!(step.effect, SideEffect::FetchDocument { .. }));
    }

    #[test]
    fn test_stray_text_while_collecting_prompts() {
        let messages = catalog();
        let mut session = Session::new();
        session.state = IntakeState::AwaitingDocuments;

        let step = transition(session, &IntakeEvent::text("is this working?"), &messages);

        assert_eq!(step.session.state, IntakeState::AwaitingDocuments);
        assert_eq!(step.replies, vec![messages.send_or_done.clone()]);
    }

    #[test]
    fn test_complete_state_reports_complete() {
        let messages = catalog();
        let mut session = Session::new();
        session.state = IntakeState::Complete;

        let step = transition(session, &IntakeEvent::text("hi"), &messages);

        assert_eq!(step.session.state, IntakeState::Complete);
        assert_eq!(step.replies, vec![messages.case_complete.clone()]);
    }

    #[test]
    fn test_submitting_state_asks_to_wait() {
        let messages = catalog();
        let mut session = Session::new();
        session.state = IntakeState::Submitting;

        let step = transition(session, &IntakeEvent::text("hello?"), &messages);

        assert_eq!(step.session.state, IntakeState::Submitting);
        assert_eq!(step.replies, vec![messages.please_wait.clone()]);
    }

    #[test]
    fn test_is_single_word() {
        assert!(is_single_word("john_smith"));
        assert!(is_single_word("  judge99  "));
        assert!(!is_single_word("john smith"));
        assert!(!is_single_word(""));
        assert!(!is_single_word("a-b"));
    }

    #[test]
    fn test_state_serialization_tags() {
        let json = serde_json::to_string(&IntakeState::AwaitingGreeting).unwrap();
        assert_eq!(json, "\"AWAITING_GREETING\"");

        let state: IntakeState = serde_json::from_str("\"AWAITING_DOCUMENTS\"").unwrap();
        assert_eq!(state, IntakeState::AwaitingDocuments);
    }
}
