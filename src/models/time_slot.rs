use crate::error::{Error, Result};
use crate::record::{first_version, Editable, Record};
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bookable clock time with a booking cap
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeSlot {
    pub id: Uuid,
    pub time: NaiveTime,
    pub max_bookings: u32,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default = "first_version")]
    pub version: i64,
}

impl TimeSlot {
    /// Whether a patient may still pick this slot
    pub fn is_selectable(&self, current_bookings: u32) -> bool {
        self.is_available && current_bookings < self.max_bookings
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeSlotDraft {
    pub time: Option<NaiveTime>,
    pub max_bookings: u32,
    pub is_available: bool,
}

impl Default for TimeSlotDraft {
    fn default() -> Self {
        Self {
            time: None,
            max_bookings: 1,
            is_available: true,
        }
    }
}

impl Record for TimeSlot {
    type Draft = TimeSlotDraft;
    const LABEL: &'static str = "time slot";

    fn id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn to_draft(&self) -> TimeSlotDraft {
        TimeSlotDraft {
            time: Some(self.time),
            max_bookings: self.max_bookings,
            is_available: self.is_available,
        }
    }

    fn validate(draft: &TimeSlotDraft) -> Result<()> {
        if draft.time.is_none() {
            return Err(Error::validation("Time is required"));
        }
        if draft.max_bookings == 0 {
            return Err(Error::validation("Maximum bookings must be at least 1"));
        }
        Ok(())
    }
}

impl Editable for TimeSlot {}

/// A slot together with how many bookings it already holds
#[derive(Debug, Clone, PartialEq)]
pub struct SlotAvailability {
    pub slot: TimeSlot,
    pub current_bookings: u32,
}

impl SlotAvailability {
    pub fn is_selectable(&self) -> bool {
        self.slot.is_selectable(self.current_bookings)
    }

    pub fn remaining(&self) -> u32 {
        self.slot.max_bookings.saturating_sub(self.current_bookings)
    }
}
