use crate::error::Result;
use crate::record::{first_version, required, Editable, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notice from the doctor shown on the public site
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoctorMessage {
    pub id: Uuid,
    pub message: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default = "first_version")]
    pub version: i64,
}

impl DoctorMessage {
    /// The most recent active message, which is the one the site shows
    pub fn current(messages: &[DoctorMessage]) -> Option<&DoctorMessage> {
        messages
            .iter()
            .filter(|m| m.active)
            .max_by_key(|m| m.created_at)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoctorMessageDraft {
    pub message: String,
    pub active: bool,
}

impl Default for DoctorMessageDraft {
    fn default() -> Self {
        Self {
            message: String::new(),
            active: true,
        }
    }
}

impl Record for DoctorMessage {
    type Draft = DoctorMessageDraft;
    const LABEL: &'static str = "doctor message";

    fn id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn to_draft(&self) -> DoctorMessageDraft {
        DoctorMessageDraft {
            message: self.message.clone(),
            active: self.active,
        }
    }

    fn validate(draft: &DoctorMessageDraft) -> Result<()> {
        required(&draft.message, "Message")
    }
}

impl Editable for DoctorMessage {}
