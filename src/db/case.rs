//! Case repository for CRUD operations

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::DbPool;
use crate::{Error, Result};

/// A persisted case record
#[derive(Debug, Clone)]
pub struct Case {
    pub case_id: String,
    pub lawyer_id: String,
    pub judge_id: String,
    pub user_id: String,
    /// Classification service response, stored verbatim
    pub classification: Value,
    pub created_at: DateTime<Utc>,
}

impl Case {
    /// Render the merged case document:
    /// `{CaseID, LawyerID, JudgeID, UserID} ∪ classification fields`
    ///
    /// On a key collision the classification field wins.
    #[must_use]
    pub fn document(&self) -> Value {
        let mut doc = Map::new();
        doc.insert("CaseID".to_string(), Value::String(self.case_id.clone()));
        doc.insert("LawyerID".to_string(), Value::String(self.lawyer_id.clone()));
        doc.insert("JudgeID".to_string(), Value::String(self.judge_id.clone()));
        doc.insert("UserID".to_string(), Value::String(self.user_id.clone()));

        if let Value::Object(fields) = &self.classification {
            for (key, value) in fields {
                doc.insert(key.clone(), value.clone());
            }
        }

        Value::Object(doc)
    }
}

/// A case about to be persisted
#[derive(Debug, Clone)]
pub struct NewCase<'a> {
    pub case_id: &'a str,
    pub lawyer_id: &'a str,
    pub judge_id: &'a str,
    pub user_id: &'a str,
    pub classification: &'a Value,
}

/// Case repository
#[derive(Clone)]
pub struct CaseRepo {
    pool: DbPool,
}

impl CaseRepo {
    /// Create a new case repository
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Persist a finalized case
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn insert(&self, case: &NewCase<'_>) -> Result<()> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let classification = serde_json::to_string(case.classification)?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO cases (case_id, lawyer_id, judge_id, user_id, classification, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            [
                case.case_id,
                case.lawyer_id,
                case.judge_id,
                case.user_id,
                &classification,
                &now,
            ],
        )
        .map_err(|e| Error::Database(e.to_string()))?;

        tracing::info!(case_id = %case.case_id, "case persisted");
        Ok(())
    }

    /// Fetch a case by ID
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn get(&self, case_id: &str) -> Result<Option<Case>> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let case = conn
            .query_row(
                "SELECT case_id, lawyer_id, judge_id, user_id, classification, created_at
                 FROM cases WHERE case_id = ?1",
                [case_id],
                |row| {
                    Ok(Case {
                        case_id: row.get(0)?,
                        lawyer_id: row.get(1)?,
                        judge_id: row.get(2)?,
                        user_id: row.get(3)?,
                        classification: serde_json::from_str(&row.get::<_, String>(4)?)
                            .unwrap_or(Value::Null),
                        created_at: parse_datetime(&row.get::<_, String>(5)?),
                    })
                },
            )
            .ok();

        Ok(case)
    }

    /// Number of persisted cases
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn count(&self) -> Result<i64> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let count = conn
            .query_row("SELECT COUNT(*) FROM cases", [], |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(count)
    }
}

/// Parse an RFC 3339 timestamp, defaulting to now on malformed data
fn parse_datetime(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
