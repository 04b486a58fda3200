//! Shared test utilities: mock collaborators and an engine harness

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use docket_gateway::db::{self, CaseRepo};
use docket_gateway::{
    AttachmentStore, CaseProcessor, CaseSubmission, ChatGateway, Error, IntakeEngine, IntakeEvent,
    MessageCatalog, Result, SessionStore,
};

/// Delay used for the post-success reset in tests
pub const TEST_RESET_DELAY: Duration = Duration::from_millis(50);

/// Recording chat gateway; download failure can be toggled at construction
pub struct MockGateway {
    pub sent: Mutex<Vec<(i64, String)>>,
    pub downloaded: Mutex<Vec<String>>,
    pub fail_downloads: bool,
}

impl MockGateway {
    pub fn new(fail_downloads: bool) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            downloaded: Mutex::new(Vec::new()),
            fail_downloads,
        }
    }

    /// Messages sent to one chat, in order
    pub fn messages_for(&self, chat_id: i64) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == chat_id)
            .map(|(_, text)| text.clone())
            .collect()
    }

    /// Number of download calls that reached the gateway
    pub fn download_count(&self) -> usize {
        self.downloaded.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatGateway for MockGateway {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }

    async fn download_file(&self, file_id: &str) -> Result<(Vec<u8>, String)> {
        if self.fail_downloads {
            return Err(Error::Channel("download refused".to_string()));
        }
        self.downloaded.lock().unwrap().push(file_id.to_string());
        Ok((
            format!("content of {file_id}").into_bytes(),
            format!("documents/{file_id}.pdf"),
        ))
    }
}

/// Recording processor; submission failure can be toggled at construction
pub struct MockProcessor {
    pub submissions: Mutex<Vec<CaseSubmission>>,
    pub fail: bool,
}

impl MockProcessor {
    pub fn new(fail: bool) -> Self {
        Self {
            submissions: Mutex::new(Vec::new()),
            fail,
        }
    }

    /// Case IDs of recorded submissions
    pub fn submitted_case_ids(&self) -> Vec<String> {
        self.submissions
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.case_id.clone())
            .collect()
    }
}

#[async_trait]
impl CaseProcessor for MockProcessor {
    async fn submit(&self, submission: &CaseSubmission) -> Result<serde_json::Value> {
        if self.fail {
            return Err(Error::Processing("classification service down".to_string()));
        }
        self.submissions.lock().unwrap().push(submission.clone());
        Ok(json!({"Category": "civil", "Verdict_prediction": "favorable"}))
    }
}

/// Recording indexer
#[derive(Default)]
pub struct MockIndexer {
    pub loaded: Mutex<Vec<String>>,
}

#[async_trait]
impl docket_gateway::CaseIndexer for MockIndexer {
    async fn load_case(&self, case_id: &str) -> Result<()> {
        self.loaded.lock().unwrap().push(case_id.to_string());
        Ok(())
    }
}

/// A fully wired engine over mocks and in-memory backends
pub struct TestHarness {
    pub engine: Arc<IntakeEngine>,
    pub gateway: Arc<MockGateway>,
    pub processor: Arc<MockProcessor>,
    pub indexer: Arc<MockIndexer>,
    pub sessions: SessionStore,
    pub cases: CaseRepo,
    pub db: db::DbPool,
    scratch: tempfile::TempDir,
}

/// Build a harness; submission and download failures are togglable
pub fn harness(fail_submission: bool, fail_downloads: bool) -> TestHarness {
    let scratch = tempfile::tempdir().expect("scratch dir");
    let db = db::init_memory().expect("test db");
    let sessions = SessionStore::in_memory(Duration::from_secs(120));
    let cases = CaseRepo::new(db.clone());

    let gateway = Arc::new(MockGateway::new(fail_downloads));
    let processor = Arc::new(MockProcessor::new(fail_submission));
    let indexer = Arc::new(MockIndexer::default());

    let engine = IntakeEngine::new(
        sessions.clone(),
        gateway.clone(),
        processor.clone(),
        indexer.clone(),
        cases.clone(),
        AttachmentStore::new(scratch.path()).expect("attachment store"),
        MessageCatalog::default(),
        TEST_RESET_DELAY,
    );

    TestHarness {
        engine: Arc::new(engine),
        gateway,
        processor,
        indexer,
        sessions,
        cases,
        db,
        scratch,
    }
}

/// Walk a chat through greeting and the three identifiers, landing in the
/// evidence-collection state
pub async fn drive_to_evidence(h: &TestHarness, chat_id: i64) {
    h.engine.handle_event(chat_id, IntakeEvent::text("hi")).await;
    h.engine
        .handle_event(chat_id, IntakeEvent::text("lawyer_a"))
        .await;
    h.engine
        .handle_event(chat_id, IntakeEvent::text("judge_b"))
        .await;
    h.engine
        .handle_event(chat_id, IntakeEvent::text("client_c"))
        .await;
}

/// Walk a chat all the way to submission: one evidence file, one case
/// document, then the final DONE
pub async fn drive_to_submission(h: &TestHarness, chat_id: i64) {
    drive_to_evidence(h, chat_id).await;
    h.engine
        .handle_event(chat_id, IntakeEvent::document("evidence-1", Some("scan.pdf".to_string())))
        .await;
    h.engine.handle_event(chat_id, IntakeEvent::text("DONE")).await;
    h.engine
        .handle_event(chat_id, IntakeEvent::document("doc-1", Some("filing.pdf".to_string())))
        .await;
    h.engine.handle_event(chat_id, IntakeEvent::text("DONE")).await;
}
