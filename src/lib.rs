//! Docket Gateway - Telegram case-intake gateway for legal case processing
//!
//! This library provides the core functionality for the Docket gateway:
//! - Conversational case-intake state machine over Telegram webhooks
//! - TTL-backed session persistence (Redis or in-memory)
//! - Attachment download, deduplication, and scratch storage
//! - Multipart submission to the downstream classification service
//! - Case persistence and RAG index loading
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 Telegram Bot API                     │
//! │        webhook updates  │  sendMessage/getFile       │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Docket Gateway                       │
//! │  Intake state machine │ Sessions │ Attachments      │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │           Downstream services                        │
//! │   /classify (multipart)  │  /rag/load (JSON)        │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod attachments;
pub mod channels;
pub mod config;
pub mod db;
pub mod error;
pub mod intake;
pub mod processing;
pub mod rag;
pub mod session;

pub use attachments::{AttachmentRecord, AttachmentSource, AttachmentStore};
pub use channels::{ChatGateway, TelegramChannel};
pub use config::Config;
pub use db::{Case, CaseRepo, DbConn, DbPool};
pub use error::{Error, Result};
pub use intake::{
    DocumentKind, DocumentRef, IntakeEngine, IntakeEvent, IntakeState, MessageCatalog, Session,
    SideEffect, Step, transition,
};
pub use processing::{CaseProcessor, CaseSubmission, ProcessingClient};
pub use rag::{CaseIndexer, RagClient};
pub use session::{SessionLookup, SessionStore};
