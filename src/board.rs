//! Per-weekday settings edited row by row
//!
//! Changes to a day are buffered locally and only written when that day's
//! `save` is called.

use crate::error::{Error, Result};
use crate::form::SubmitLatch;
use crate::manager::{capitalize, decode_rows};
use crate::models::{Day, MrWeekday, MrWeekdayDraft, WorkingHours, WorkingHoursDraft};
use crate::notify::{Notification, Notifier};
use crate::record::Record;
use crate::store::ListStore;
use clinic_desk_gateway::{DataGateway, Query};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// A record with exactly one row per weekday and a working flag
pub trait DayRecord: Record {
    fn day(&self) -> Day;

    /// Draft for a day that has no row yet
    fn blank(day: Day) -> Self::Draft;

    fn is_working(draft: &Self::Draft) -> bool;

    fn set_working(draft: &mut Self::Draft, working: bool);
}

impl DayRecord for MrWeekday {
    fn day(&self) -> Day {
        self.day
    }

    fn blank(day: Day) -> MrWeekdayDraft {
        MrWeekdayDraft {
            day,
            ..MrWeekdayDraft::default()
        }
    }

    fn is_working(draft: &MrWeekdayDraft) -> bool {
        draft.is_working
    }

    fn set_working(draft: &mut MrWeekdayDraft, working: bool) {
        draft.is_working = working;
    }
}

impl DayRecord for WorkingHours {
    fn day(&self) -> Day {
        self.day
    }

    fn blank(day: Day) -> WorkingHoursDraft {
        WorkingHoursDraft::closed(day)
    }

    fn is_working(draft: &WorkingHoursDraft) -> bool {
        draft.is_working
    }

    fn set_working(draft: &mut WorkingHoursDraft, working: bool) {
        draft.is_working = working;
    }
}

pub struct DayBoard<R: DayRecord> {
    gateway: Arc<dyn DataGateway>,
    table: String,
    store: RwLock<ListStore<R>>,
    pending: Mutex<HashMap<Day, R::Draft>>,
    latch: SubmitLatch,
    notifier: Arc<dyn Notifier>,
}

impl<R: DayRecord> DayBoard<R> {
    pub fn new(gateway: Arc<dyn DataGateway>, table: &str, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            gateway,
            table: table.to_string(),
            store: RwLock::new(ListStore::new()),
            pending: Mutex::new(HashMap::new()),
            latch: SubmitLatch::new(),
            notifier,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Fetch every day, Monday first. Unsaved edits survive a reload.
    pub async fn load(&self) -> Result<Vec<R>> {
        let fetched = self.gateway.query(&self.table, &Query::new()).await;
        let mut rows = match fetched.map_err(Error::from).and_then(decode_rows::<R>) {
            Ok(rows) => rows,
            Err(err) => return Err(self.fail(&format!("load {}s", R::LABEL), err)),
        };
        rows.sort_by_key(|r| r.day());

        debug!("Loaded {} days from {}", rows.len(), self.table);
        self.store.write().await.replace(rows.clone());
        Ok(rows)
    }

    pub async fn rows(&self) -> Vec<R> {
        self.store.read().await.rows().to_vec()
    }

    /// The stored row for `day`, ignoring unsaved edits
    pub async fn stored(&self, day: Day) -> Option<R> {
        self.store
            .read()
            .await
            .rows()
            .iter()
            .find(|r| r.day() == day)
            .cloned()
    }

    /// What the screen shows for `day`: the unsaved edit if any, else the
    /// stored row
    pub async fn draft(&self, day: Day) -> Option<R::Draft> {
        if let Some(draft) = self.pending.lock().await.get(&day) {
            return Some(draft.clone());
        }
        self.stored(day).await.map(|r| r.to_draft())
    }

    pub async fn is_working(&self, day: Day) -> Option<bool> {
        self.draft(day).await.map(|d| R::is_working(&d))
    }

    pub async fn is_dirty(&self, day: Day) -> bool {
        self.pending.lock().await.contains_key(&day)
    }

    /// Change the buffered draft of `day`; nothing is written
    pub async fn edit<F>(&self, day: Day, change: F)
    where
        F: FnOnce(&mut R::Draft),
    {
        let current = self.draft(day).await.unwrap_or_else(|| R::blank(day));
        let mut pending = self.pending.lock().await;
        let draft = pending.entry(day).or_insert(current);
        change(draft);
    }

    /// Flip the working flag of `day` locally and return the new value
    pub async fn toggle_working(&self, day: Day) -> bool {
        let mut working = false;
        self.edit(day, |draft| {
            working = !R::is_working(draft);
            R::set_working(draft, working);
        })
        .await;
        working
    }

    /// Drop unsaved edits for `day`
    pub async fn discard(&self, day: Day) {
        self.pending.lock().await.remove(&day);
    }

    /// Write the buffered edits of `day`. Without edits this is a no-op
    /// returning `None`.
    pub async fn save(&self, day: Day) -> Result<Option<R>> {
        let _ticket = self.latch.try_acquire().map_err(|e| self.reject(e))?;

        let draft = match self.pending.lock().await.get(&day) {
            Some(draft) => draft.clone(),
            None => return Ok(None),
        };
        R::validate(&draft).map_err(|e| self.reject(e))?;

        let saved = match self.persist(day, &draft).await {
            Ok(saved) => saved,
            Err(err) => return Err(self.fail(&format!("save {} for {}", R::LABEL, day), err)),
        };

        self.pending.lock().await.remove(&day);
        info!("Saved {} for {} in {}", R::LABEL, day, self.table);
        self.notifier.notify(Notification::success(format!(
            "{} for {} saved",
            capitalize(R::LABEL),
            day
        )));
        let _ = self.load().await;
        Ok(Some(saved))
    }

    async fn persist(&self, day: Day, draft: &R::Draft) -> Result<R> {
        let body = serde_json::to_value(draft)?;
        let row = match self.stored(day).await {
            Some(existing) => {
                self.gateway
                    .update(&self.table, existing.id(), Some(existing.version()), body)
                    .await?
            }
            None => self.gateway.insert(&self.table, body).await?,
        };
        Ok(serde_json::from_value(row)?)
    }

    fn reject(&self, err: Error) -> Error {
        warn!("Rejected {} input: {}", R::LABEL, err);
        self.notifier.notify(Notification::error(err.user_message()));
        err
    }

    fn fail(&self, action: &str, err: Error) -> Error {
        error!("Failed to {} ({}): {}", action, self.table, err);
        self.notifier.notify(Notification::error(err.user_message()));
        err
    }
}
