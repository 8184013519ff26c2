//! Local mirror of one query result

use crate::record::Record;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// The latest full result of a table query. Always replaced wholesale.
#[derive(Debug, Clone)]
pub struct ListStore<R> {
    rows: Vec<R>,
    loaded_at: Option<DateTime<Utc>>,
}

impl<R> Default for ListStore<R> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            loaded_at: None,
        }
    }
}

impl<R: Record> ListStore<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a fresh result
    pub fn replace(&mut self, rows: Vec<R>) {
        self.rows = rows;
        self.loaded_at = Some(Utc::now());
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn find(&self, id: Uuid) -> Option<&R> {
        self.rows.iter().find(|r| r.id() == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.find(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// When the last successful load finished; `None` before the first one
    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }
}
