use crate::error::{Error, Result};
use crate::models::Day;
use crate::record::{first_version, Record};
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Clinic opening hours for one weekday, split into two sessions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkingHours {
    pub id: Uuid,
    pub day: Day,
    pub is_working: bool,
    pub morning_start: Option<NaiveTime>,
    pub morning_end: Option<NaiveTime>,
    pub evening_start: Option<NaiveTime>,
    pub evening_end: Option<NaiveTime>,
    pub created_at: DateTime<Utc>,
    #[serde(default = "first_version")]
    pub version: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    Morning,
    Evening,
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Session::Morning => f.write_str("Morning"),
            Session::Evening => f.write_str("Evening"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkingHoursDraft {
    pub day: Day,
    pub is_working: bool,
    pub morning_start: Option<NaiveTime>,
    pub morning_end: Option<NaiveTime>,
    pub evening_start: Option<NaiveTime>,
    pub evening_end: Option<NaiveTime>,
}

impl Default for WorkingHoursDraft {
    fn default() -> Self {
        Self::closed(Day::Monday)
    }
}

impl WorkingHoursDraft {
    /// A non-working day with no sessions
    pub fn closed(day: Day) -> Self {
        Self {
            day,
            is_working: false,
            morning_start: None,
            morning_end: None,
            evening_start: None,
            evening_end: None,
        }
    }

    pub fn session(&self, session: Session) -> (Option<NaiveTime>, Option<NaiveTime>) {
        match session {
            Session::Morning => (self.morning_start, self.morning_end),
            Session::Evening => (self.evening_start, self.evening_end),
        }
    }

    pub fn set_session(
        &mut self,
        session: Session,
        start: Option<NaiveTime>,
        end: Option<NaiveTime>,
    ) {
        match session {
            Session::Morning => {
                self.morning_start = start;
                self.morning_end = end;
            }
            Session::Evening => {
                self.evening_start = start;
                self.evening_end = end;
            }
        }
    }
}

impl Record for WorkingHours {
    type Draft = WorkingHoursDraft;
    const LABEL: &'static str = "working hours";

    fn id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn to_draft(&self) -> WorkingHoursDraft {
        WorkingHoursDraft {
            day: self.day,
            is_working: self.is_working,
            morning_start: self.morning_start,
            morning_end: self.morning_end,
            evening_start: self.evening_start,
            evening_end: self.evening_end,
        }
    }

    /// A session is either empty or has both ends with end >= start.
    /// Days off are not checked.
    fn validate(draft: &WorkingHoursDraft) -> Result<()> {
        if !draft.is_working {
            return Ok(());
        }
        for session in [Session::Morning, Session::Evening] {
            match draft.session(session) {
                (None, None) => {}
                (Some(start), Some(end)) if end < start => {
                    return Err(Error::validation(format!(
                        "{} session on {} ends ({}) before it starts ({})",
                        session,
                        draft.day,
                        end.format("%H:%M"),
                        start.format("%H:%M")
                    )));
                }
                (Some(_), Some(_)) => {}
                _ => {
                    return Err(Error::validation(format!(
                        "{} session on {} needs both a start and an end time",
                        session, draft.day
                    )));
                }
            }
        }
        Ok(())
    }
}
