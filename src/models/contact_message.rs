use crate::error::{Error, Result};
use crate::record::{first_version, required, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A message left through the public contact form. Only `is_read` changes
/// after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default = "first_version")]
    pub version: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContactMessageDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

fn looks_like_email(email: &str) -> bool {
    match email.trim().split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

impl Record for ContactMessage {
    type Draft = ContactMessageDraft;
    const LABEL: &'static str = "contact message";

    fn id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn to_draft(&self) -> ContactMessageDraft {
        ContactMessageDraft {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            message: self.message.clone(),
        }
    }

    fn validate(draft: &ContactMessageDraft) -> Result<()> {
        required(&draft.name, "Name")?;
        required(&draft.email, "Email")?;
        if !looks_like_email(&draft.email) {
            return Err(Error::validation("Email address is not valid"));
        }
        required(&draft.message, "Message")
    }
}
