//! The list-manager pipeline every admin screen shares
//!
//! form → guards → gateway write → reload → notification

use crate::error::{Error, Result};
use crate::form::FormController;
use crate::guard::Guard;
use crate::notify::{Notification, Notifier};
use crate::record::{local_clock, Clock, Editable, Record};
use crate::store::ListStore;
use clinic_desk_gateway::{DataGateway, Query};
use log::{debug, error, info, warn};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// One table's screen: a list, a form, and the guards between them
///
/// Methods take `&self`; share a manager behind an `Arc` if several UI
/// handlers need it. No lock is held across a gateway call.
pub struct ListManager<R: Record> {
    gateway: Arc<dyn DataGateway>,
    table: String,
    query: Query,
    store: RwLock<ListStore<R>>,
    form: Mutex<FormController<R::Draft>>,
    guards: Vec<Box<dyn Guard<R>>>,
    notifier: Arc<dyn Notifier>,
    clock: Clock,
}

impl<R: Record> ListManager<R> {
    pub fn new(
        gateway: Arc<dyn DataGateway>,
        table: &str,
        query: Query,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            gateway,
            table: table.to_string(),
            query,
            store: RwLock::new(ListStore::new()),
            form: Mutex::new(FormController::new()),
            guards: Vec::new(),
            notifier,
            clock: local_clock(),
        }
    }

    pub fn with_guard<G: Guard<R> + 'static>(mut self, guard: G) -> Self {
        self.guards.push(Box::new(guard));
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Snapshot of the loaded rows
    pub async fn rows(&self) -> Vec<R> {
        self.store.read().await.rows().to_vec()
    }

    pub async fn find(&self, id: Uuid) -> Option<R> {
        self.store.read().await.find(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    pub async fn loaded_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.store.read().await.loaded_at()
    }

    /// Fetch the full list and replace the local one. On failure the
    /// previous rows stay in place.
    pub async fn load(&self) -> Result<Vec<R>> {
        let query = self.query.resolve((self.clock)());
        let fetched = self.gateway.query(&self.table, &query).await;

        let rows = match fetched.map_err(Error::from).and_then(decode_rows::<R>) {
            Ok(rows) => rows,
            Err(err) => return Err(self.fail(&format!("load {}s", R::LABEL), err)),
        };

        debug!("Loaded {} rows from {}", rows.len(), self.table);
        self.store.write().await.replace(rows.clone());
        Ok(rows)
    }

    /// Write a few fields of one row (a toggle) and reload. Bypasses the
    /// form and guards, so each screen decides which fields it may touch.
    pub(crate) async fn patch(&self, id: Uuid, fields: Value) -> Result<R> {
        let version = self.store.read().await.find(id).map(|r| r.version());
        let written = self
            .gateway
            .update(&self.table, id, version, fields)
            .await
            .map_err(Error::from)
            .and_then(|row| Ok(serde_json::from_value::<R>(row)?));

        match written {
            Ok(record) => {
                info!("Updated {} {} in {}", R::LABEL, id, self.table);
                self.notifier
                    .notify(Notification::success(format!("{} updated", capitalize(R::LABEL))));
                let _ = self.load().await;
                Ok(record)
            }
            Err(err) => Err(self.fail(&format!("update {}", R::LABEL), err)),
        }
    }

    /// Remove a row and reload. A form open on that row is closed.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if let Err(err) = self.gateway.delete(&self.table, id).await {
            return Err(self.fail(&format!("delete {}", R::LABEL), err.into()));
        }

        info!("Deleted {} {} from {}", R::LABEL, id, self.table);
        {
            let mut form = self.form.lock().await;
            if form.editing() == Some(id) {
                form.close();
            }
        }
        self.notifier
            .notify(Notification::success(format!("{} deleted", capitalize(R::LABEL))));
        let _ = self.load().await;
        Ok(())
    }

    /// Report a local precondition failure
    pub(crate) fn reject(&self, err: Error) -> Error {
        warn!("Rejected {} input: {}", R::LABEL, err);
        self.notifier.notify(Notification::error(err.user_message()));
        err
    }

    /// Report a failed round trip
    pub(crate) fn fail(&self, action: &str, err: Error) -> Error {
        error!("Failed to {} ({}): {}", action, self.table, err);
        self.notifier.notify(Notification::error(err.user_message()));
        err
    }
}

impl<R: Editable> ListManager<R> {
    /// Open the form on a blank draft
    pub async fn open_create(&self) {
        self.form.lock().await.open_create();
    }

    /// Open the form on a copy of a loaded record
    pub async fn open_edit(&self, id: Uuid) -> Result<()> {
        let draft = match self.store.read().await.find(id) {
            Some(record) => record.to_draft(),
            None => {
                return Err(self.reject(Error::validation(format!(
                    "This {} is no longer in the list",
                    R::LABEL
                ))))
            }
        };
        self.form.lock().await.open_edit(id, draft);
        Ok(())
    }

    pub async fn close(&self) {
        self.form.lock().await.close();
    }

    /// Change the draft in place
    pub async fn edit<F>(&self, change: F)
    where
        F: FnOnce(&mut R::Draft),
    {
        change(self.form.lock().await.draft_mut());
    }

    pub async fn draft(&self) -> R::Draft {
        self.form.lock().await.draft().clone()
    }

    pub async fn is_open(&self) -> bool {
        self.form.lock().await.is_open()
    }

    pub async fn editing(&self) -> Option<Uuid> {
        self.form.lock().await.editing()
    }

    pub async fn is_submitting(&self) -> bool {
        self.form.lock().await.is_submitting()
    }

    /// Validate, guard, write, close the form and reload
    pub async fn submit(&self) -> Result<R> {
        let (draft, editing, _ticket) = {
            let form = self.form.lock().await;
            form.begin_submit().map_err(|e| self.reject(e))?
        };

        R::validate(&draft).map_err(|e| self.reject(e))?;
        {
            let today = (self.clock)();
            let store = self.store.read().await;
            for guard in &self.guards {
                guard
                    .check(&draft, editing, store.rows(), today)
                    .map_err(|e| self.reject(e))?;
            }
        }

        let saved = match self.persist(&draft, editing).await {
            Ok(saved) => saved,
            Err(err) => return Err(self.fail(&format!("save {}", R::LABEL), err)),
        };

        info!("Saved {} {} in {}", R::LABEL, saved.id(), self.table);
        self.form.lock().await.close();
        self.notifier
            .notify(Notification::success(format!("{} saved", capitalize(R::LABEL))));
        let _ = self.load().await;
        Ok(saved)
    }

    async fn persist(&self, draft: &R::Draft, editing: Option<Uuid>) -> Result<R> {
        let body = serde_json::to_value(draft)?;
        let row = match editing {
            Some(id) => {
                let version = self.store.read().await.find(id).map(|r| r.version());
                self.gateway.update(&self.table, id, version, body).await?
            }
            None => self.gateway.insert(&self.table, body).await?,
        };
        Ok(serde_json::from_value(row)?)
    }
}

pub(crate) fn decode_rows<R: Record>(rows: Vec<Value>) -> Result<Vec<R>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(Error::from))
        .collect()
}

pub(crate) fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DoctorMessage, DoctorMessageDraft};
    use crate::notify::{Level, RecordingNotifier};
    use clinic_desk_gateway::{MemoryGateway, Operation};
    use reqwest::StatusCode;
    use serde_json::json;

    fn manager(
        gateway: Arc<MemoryGateway>,
        notifier: Arc<RecordingNotifier>,
    ) -> ListManager<DoctorMessage> {
        ListManager::new(
            gateway,
            "doctor_messages",
            Query::new().order("created_at", false),
            notifier,
        )
    }

    #[tokio::test]
    async fn failed_load_keeps_previous_rows() {
        let gateway = Arc::new(MemoryGateway::new());
        gateway
            .seed("doctor_messages", vec![json!({ "message": "Hello", "active": true })])
            .await;
        let notifier = Arc::new(RecordingNotifier::new());
        let list = manager(gateway.clone(), notifier.clone());

        assert_eq!(list.load().await.unwrap().len(), 1);

        gateway
            .fail_next(Operation::Query, StatusCode::SERVICE_UNAVAILABLE, "down")
            .await;
        assert!(list.load().await.is_err());
        assert_eq!(list.len().await, 1);
        assert_eq!(notifier.last().map(|n| n.level), Some(Level::Error));
    }

    #[tokio::test]
    async fn submit_creates_closes_form_and_reloads() {
        let gateway = Arc::new(MemoryGateway::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let list = manager(gateway.clone(), notifier.clone());

        list.open_create().await;
        list.edit(|d: &mut DoctorMessageDraft| d.message = "Closed for training".into())
            .await;
        let saved = list.submit().await.unwrap();

        assert_eq!(saved.message, "Closed for training");
        assert!(!list.is_open().await);
        assert_eq!(list.rows().await, vec![saved]);
        assert_eq!(
            notifier.last(),
            Some(Notification::success("Doctor message saved"))
        );
    }

    #[tokio::test]
    async fn invalid_draft_is_never_sent() {
        let gateway = Arc::new(MemoryGateway::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let list = manager(gateway.clone(), notifier.clone());

        list.open_create().await;
        let err = list.submit().await.unwrap_err();

        assert!(err.is_validation());
        assert_eq!(gateway.write_count(), 0);
        assert!(list.is_open().await);
        assert_eq!(notifier.errors().len(), 1);
    }

    #[tokio::test]
    async fn edit_updates_the_selected_row() {
        let gateway = Arc::new(MemoryGateway::new());
        gateway
            .seed("doctor_messages", vec![json!({ "message": "Old", "active": true })])
            .await;
        let list = manager(gateway.clone(), Arc::new(RecordingNotifier::new()));
        let id = list.load().await.unwrap()[0].id;

        list.open_edit(id).await.unwrap();
        assert_eq!(list.draft().await.message, "Old");
        list.edit(|d| d.message = "New".into()).await;
        let saved = list.submit().await.unwrap();

        assert_eq!(saved.id, id);
        assert_eq!(saved.version, 2);
        assert_eq!(list.find(id).await.map(|m| m.message), Some("New".to_string()));
    }

    #[tokio::test]
    async fn stale_edit_is_a_conflict_and_keeps_form_open() {
        let gateway = Arc::new(MemoryGateway::new());
        gateway
            .seed("doctor_messages", vec![json!({ "message": "Old", "active": true })])
            .await;
        let list = manager(gateway.clone(), Arc::new(RecordingNotifier::new()));
        let id = list.load().await.unwrap()[0].id;

        // another admin saves first
        gateway
            .update("doctor_messages", id, Some(1), json!({ "message": "Theirs" }))
            .await
            .unwrap();

        list.open_edit(id).await.unwrap();
        list.edit(|d| d.message = "Mine".into()).await;
        let err = list.submit().await.unwrap_err();

        assert!(err.is_conflict());
        assert!(list.is_open().await);
        assert_eq!(gateway.rows("doctor_messages").await[0]["message"], "Theirs");
    }

    #[tokio::test]
    async fn open_edit_of_unknown_id_is_rejected() {
        let list = manager(
            Arc::new(MemoryGateway::new()),
            Arc::new(RecordingNotifier::new()),
        );
        assert!(list.open_edit(Uuid::new_v4()).await.unwrap_err().is_validation());
        assert!(!list.is_open().await);
    }

    #[test]
    fn capitalizes_labels() {
        assert_eq!(capitalize("closure date"), "Closure date");
        assert_eq!(capitalize(""), "");
    }
}
