use crate::error::{Error, Result};
use crate::record::{first_version, required, Record};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Appointment status. `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Completed,
    Cancelled,
}

/// The only status changes the back-office offers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Complete,
    Cancel,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, AppointmentStatus::Pending)
    }

    /// Status after `transition`, or `None` if it is not allowed from here
    pub fn apply(self, transition: Transition) -> Option<AppointmentStatus> {
        match (self, transition) {
            (AppointmentStatus::Pending, Transition::Complete) => Some(AppointmentStatus::Completed),
            (AppointmentStatus::Pending, Transition::Cancel) => Some(AppointmentStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A medical representative's visit request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MrAppointment {
    pub id: Uuid,
    pub mr_name: String,
    pub company_name: String,
    pub division_name: String,
    pub contact_no: String,
    pub appointment_date: NaiveDate,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default = "first_version")]
    pub version: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MrAppointmentDraft {
    pub mr_name: String,
    pub company_name: String,
    pub division_name: String,
    pub contact_no: String,
    pub appointment_date: Option<NaiveDate>,
}

impl Record for MrAppointment {
    type Draft = MrAppointmentDraft;
    const LABEL: &'static str = "MR appointment";

    fn id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn to_draft(&self) -> MrAppointmentDraft {
        MrAppointmentDraft {
            mr_name: self.mr_name.clone(),
            company_name: self.company_name.clone(),
            division_name: self.division_name.clone(),
            contact_no: self.contact_no.clone(),
            appointment_date: Some(self.appointment_date),
        }
    }

    fn validate(draft: &MrAppointmentDraft) -> Result<()> {
        required(&draft.mr_name, "MR name")?;
        required(&draft.company_name, "Company name")?;
        required(&draft.division_name, "Division name")?;
        required(&draft.contact_no, "Contact number")?;

        let contact = draft.contact_no.trim();
        let digits = contact.chars().filter(char::is_ascii_digit).count();
        let allowed = contact
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'));
        if !allowed || digits < 7 {
            return Err(Error::validation("Contact number is not valid"));
        }

        if draft.appointment_date.is_none() {
            return Err(Error::validation("Appointment date is required"));
        }
        Ok(())
    }
}
