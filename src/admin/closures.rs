use crate::config::TableNames;
use crate::guard::{UniqueKeyGuard, UpcomingDateGuard};
use crate::manager::ListManager;
use crate::models::{ClosureDate, ClosureDateDraft};
use crate::notify::Notifier;
use chrono::NaiveDate;
use clinic_desk_gateway::{DataGateway, Query};
use std::sync::Arc;

/// Which closure calendar a manager edits. Both share the same columns and
/// rules; only the table differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosureCalendar {
    /// Days the clinic is closed to patients
    Clinic,
    /// Days no medical representatives are received
    Mr,
}

impl ClosureCalendar {
    pub fn table<'a>(&self, tables: &'a TableNames) -> &'a str {
        match self {
            ClosureCalendar::Clinic => &tables.closure_dates,
            ClosureCalendar::Mr => &tables.mr_closure_dates,
        }
    }
}

/// Upcoming active closures, at most one per date
pub type ClosureManager = ListManager<ClosureDate>;

/// Active closures from today on, soonest first
fn upcoming_closures() -> Query {
    Query::new()
        .eq("is_active", true)
        .from_today("date")
        .order("date", true)
}

fn active_date(row: &ClosureDate) -> Option<NaiveDate> {
    row.is_active.then_some(row.date)
}

fn any_date(draft: &ClosureDateDraft) -> Option<NaiveDate> {
    draft.date
}

fn draft_date(draft: &ClosureDateDraft) -> Option<NaiveDate> {
    if draft.is_active {
        draft.date
    } else {
        None
    }
}

impl ListManager<ClosureDate> {
    pub fn closures(
        gateway: Arc<dyn DataGateway>,
        calendar: ClosureCalendar,
        tables: &TableNames,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        ListManager::new(gateway, calendar.table(tables), upcoming_closures(), notifier)
            .with_guard(UpcomingDateGuard::<ClosureDate>::new("closure", any_date))
            .with_guard(UniqueKeyGuard::new("closure", active_date, draft_date))
    }

    /// Open the form, fill it and submit in one step
    pub async fn add_closure(&self, date: NaiveDate, reason: &str) -> crate::Result<ClosureDate> {
        self.open_create().await;
        self.edit(|d| {
            d.date = Some(date);
            d.reason = reason.to_string();
        })
        .await;
        self.submit().await
    }

    /// Whether `date` is one of the loaded active closures
    pub async fn is_closed(&self, date: NaiveDate) -> bool {
        self.rows()
            .await
            .iter()
            .any(|c| c.is_active && c.date == date)
    }
}
