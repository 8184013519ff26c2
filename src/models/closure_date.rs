use crate::error::{Error, Result};
use crate::record::{first_version, required, Editable, Record};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A calendar day the clinic (or the MR desk) is closed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClosureDate {
    pub id: Uuid,
    pub date: NaiveDate,
    pub reason: String,
    #[serde(default = "active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default = "first_version")]
    pub version: i64,
}

fn active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClosureDateDraft {
    pub date: Option<NaiveDate>,
    pub reason: String,
    pub is_active: bool,
}

impl Default for ClosureDateDraft {
    fn default() -> Self {
        Self {
            date: None,
            reason: String::new(),
            is_active: true,
        }
    }
}

impl Record for ClosureDate {
    type Draft = ClosureDateDraft;
    const LABEL: &'static str = "closure date";

    fn id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn to_draft(&self) -> ClosureDateDraft {
        ClosureDateDraft {
            date: Some(self.date),
            reason: self.reason.clone(),
            is_active: self.is_active,
        }
    }

    fn validate(draft: &ClosureDateDraft) -> Result<()> {
        if draft.date.is_none() {
            return Err(Error::validation("Date is required"));
        }
        required(&draft.reason, "Reason")
    }
}

impl Editable for ClosureDate {}
