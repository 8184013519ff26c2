//! The shape shared by every row the back-office manages

use crate::error::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// A row owned by the remote store, mirrored locally
///
/// `Draft` is the editable part of the row: the form buffer, and the body of
/// inserts and updates.
pub trait Record: DeserializeOwned + Clone + Send + Sync + 'static {
    type Draft: Serialize + Clone + Default + Send + Sync + 'static;

    /// Lower-case name used in notifications, e.g. "closure date"
    const LABEL: &'static str;

    fn id(&self) -> Uuid;

    fn version(&self) -> i64;

    fn created_at(&self) -> DateTime<Utc>;

    fn to_draft(&self) -> Self::Draft;

    /// Required-field checks, run before anything is sent
    fn validate(draft: &Self::Draft) -> Result<()>;
}

/// A record staff may create and edit through a form
///
/// Contact messages and MR appointments are not `Editable`: after creation
/// only their read flag or status changes, through their own screens.
///
/// A contact message cannot be opened in the form:
///
/// ```compile_fail
/// use clinic_desk::manager::ListManager;
/// use clinic_desk::models::ContactMessage;
///
/// async fn rewrite(inbox: &ListManager<ContactMessage>, id: uuid::Uuid) {
///     inbox.open_edit(id).await.unwrap();
///     inbox.edit(|d| d.message = "rewritten".into()).await;
///     inbox.submit().await.unwrap();
/// }
/// ```
///
/// and an appointment's status cannot be written directly:
///
/// ```compile_fail
/// use clinic_desk::manager::ListManager;
/// use clinic_desk::models::MrAppointment;
///
/// async fn reopen(desk: &ListManager<MrAppointment>, id: uuid::Uuid) {
///     desk.patch(id, serde_json::json!({ "status": "pending" }))
///         .await
///         .unwrap();
/// }
/// ```
///
/// Closure dates, on the other hand, go through the form:
///
/// ```
/// use clinic_desk::manager::ListManager;
/// use clinic_desk::models::ClosureDate;
///
/// async fn rename(closures: &ListManager<ClosureDate>, id: uuid::Uuid) -> clinic_desk::Result<()> {
///     closures.open_edit(id).await?;
///     closures.edit(|d| d.reason = "Christmas Day".into()).await;
///     closures.submit().await?;
///     Ok(())
/// }
/// ```
pub trait Editable: Record {}

pub(crate) fn first_version() -> i64 {
    1
}

/// Source of "today" for date-relative filters and checks
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Today's date in the local time zone
pub fn local_clock() -> Clock {
    Arc::new(|| chrono::Local::now().date_naive())
}

/// Always the same day
pub fn fixed_clock(date: NaiveDate) -> Clock {
    Arc::new(move || date)
}

/// Blank text fails with a validation error naming the field
pub(crate) fn required(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(crate::Error::validation(format!("{} is required", field)));
    }
    Ok(())
}
