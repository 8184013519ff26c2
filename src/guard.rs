//! Checks run against the loaded list before a write is sent

use crate::error::{Error, Result};
use crate::record::Record;
use chrono::NaiveDate;
use std::fmt::Display;
use uuid::Uuid;

/// Pre-submission predicate over the current list
pub trait Guard<R: Record>: Send + Sync {
    /// `editing` is the id of the record being edited, which never conflicts
    /// with itself. `today` comes from the manager's clock.
    fn check(
        &self,
        draft: &R::Draft,
        editing: Option<Uuid>,
        rows: &[R],
        today: NaiveDate,
    ) -> Result<()>;
}

/// Rejects a draft whose key is already taken by another row
pub struct UniqueKeyGuard<R: Record, K> {
    label: &'static str,
    row_key: fn(&R) -> Option<K>,
    draft_key: fn(&R::Draft) -> Option<K>,
}

impl<R: Record, K> UniqueKeyGuard<R, K> {
    /// `row_key` returning `None` leaves that row out of the check (an
    /// inactive closure, say); `draft_key` returning `None` skips the check.
    pub fn new(
        label: &'static str,
        row_key: fn(&R) -> Option<K>,
        draft_key: fn(&R::Draft) -> Option<K>,
    ) -> Self {
        Self {
            label,
            row_key,
            draft_key,
        }
    }
}

/// First row other than `editing` whose key equals `key`
pub fn find_conflict<'a, R: Record, K: PartialEq>(
    rows: &'a [R],
    key: &K,
    editing: Option<Uuid>,
    row_key: impl Fn(&R) -> Option<K>,
) -> Option<&'a R> {
    rows.iter()
        .filter(|r| Some(r.id()) != editing)
        .find(|r| row_key(r).as_ref() == Some(key))
}

impl<R, K> Guard<R> for UniqueKeyGuard<R, K>
where
    R: Record,
    K: PartialEq + Display + Send + Sync,
{
    fn check(
        &self,
        draft: &R::Draft,
        editing: Option<Uuid>,
        rows: &[R],
        _today: NaiveDate,
    ) -> Result<()> {
        let key = match (self.draft_key)(draft) {
            Some(key) => key,
            None => return Ok(()),
        };
        match find_conflict(rows, &key, editing, self.row_key) {
            Some(_) => Err(Error::validation(format!(
                "A {} already exists for {}",
                self.label, key
            ))),
            None => Ok(()),
        }
    }
}

/// Rejects a draft dated before today
pub struct UpcomingDateGuard<R: Record> {
    label: &'static str,
    draft_date: fn(&R::Draft) -> Option<NaiveDate>,
}

impl<R: Record> UpcomingDateGuard<R> {
    pub fn new(label: &'static str, draft_date: fn(&R::Draft) -> Option<NaiveDate>) -> Self {
        Self { label, draft_date }
    }
}

impl<R: Record> Guard<R> for UpcomingDateGuard<R> {
    fn check(
        &self,
        draft: &R::Draft,
        _editing: Option<Uuid>,
        _rows: &[R],
        today: NaiveDate,
    ) -> Result<()> {
        match (self.draft_date)(draft) {
            Some(date) if date < today => Err(Error::validation(format!(
                "A {} cannot be set for {}, which is in the past",
                self.label, date
            ))),
            _ => Ok(()),
        }
    }
}
