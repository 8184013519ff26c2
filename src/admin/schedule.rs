use crate::board::DayBoard;
use crate::config::TableNames;
use crate::models::{Day, MrWeekday, Session, WorkingHours};
use crate::notify::Notifier;
use chrono::NaiveTime;
use clinic_desk_gateway::DataGateway;
use std::sync::Arc;

/// Clinic opening hours, one row per weekday
pub type WorkingHoursBoard = DayBoard<WorkingHours>;

/// Weekdays medical representatives may book, with a daily cap
pub type MrWeekdayBoard = DayBoard<MrWeekday>;

impl DayBoard<WorkingHours> {
    pub fn working_hours(
        gateway: Arc<dyn DataGateway>,
        tables: &TableNames,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        DayBoard::new(gateway, &tables.working_hours, notifier)
    }

    /// Set both ends of a session; `None` clears that end
    pub async fn set_session(
        &self,
        day: Day,
        session: Session,
        start: Option<NaiveTime>,
        end: Option<NaiveTime>,
    ) {
        self.edit(day, |d| d.set_session(session, start, end)).await;
    }
}

impl DayBoard<MrWeekday> {
    pub fn mr_weekdays(
        gateway: Arc<dyn DataGateway>,
        tables: &TableNames,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        DayBoard::new(gateway, &tables.mr_weekdays, notifier)
    }

    pub async fn set_capacity(&self, day: Day, max_appointments: u32) {
        self.edit(day, |d| d.max_appointments = max_appointments).await;
    }

    /// Stored cap for `day`; zero when the day is off or unknown
    pub async fn capacity(&self, day: Day) -> u32 {
        match self.stored(day).await {
            Some(row) if row.is_working => row.max_appointments,
            _ => 0,
        }
    }
}
