use crate::error::{Error, Result};
use crate::models::Day;
use crate::record::{first_version, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether medical representatives are received on a weekday, and how many
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MrWeekday {
    pub id: Uuid,
    pub day: Day,
    pub is_working: bool,
    pub max_appointments: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default = "first_version")]
    pub version: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MrWeekdayDraft {
    pub day: Day,
    pub is_working: bool,
    pub max_appointments: u32,
}

impl Default for MrWeekdayDraft {
    fn default() -> Self {
        Self {
            day: Day::Monday,
            is_working: false,
            max_appointments: 0,
        }
    }
}

impl Record for MrWeekday {
    type Draft = MrWeekdayDraft;
    const LABEL: &'static str = "MR weekday";

    fn id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn to_draft(&self) -> MrWeekdayDraft {
        MrWeekdayDraft {
            day: self.day,
            is_working: self.is_working,
            max_appointments: self.max_appointments,
        }
    }

    fn validate(draft: &MrWeekdayDraft) -> Result<()> {
        if draft.is_working && draft.max_appointments == 0 {
            return Err(Error::validation(format!(
                "{} needs at least one MR appointment to be a working day",
                draft.day
            )));
        }
        Ok(())
    }
}
