//! Clinic Desk
//!
//! Data layer for a clinic's public site and staff back-office, on top of a
//! Supabase (PostgREST) project. Every admin screen is a list manager: it
//! loads a table into a local list, edits one record at a time in a form,
//! checks the draft against the loaded list, writes through the gateway,
//! reloads, and reports the outcome as a notification.

pub mod admin;
pub mod board;
pub mod config;
pub mod error;
pub mod form;
pub mod guard;
pub mod manager;
pub mod models;
pub mod notify;
pub mod record;
pub mod site;
pub mod store;

use reqwest::Client;
use std::sync::Arc;

use crate::admin::{
    ClosureCalendar, ClosureManager, ContactInbox, DoctorMessageBoard, MrAppointmentDesk,
    MrWeekdayBoard, TimeSlotManager, WorkingHoursBoard,
};
use crate::config::{ClinicConfig, TableNames};
use crate::models::AppointmentStatus;
use crate::notify::{LogNotifier, Notifier};
use crate::record::{local_clock, Clock};
use crate::site::Site;

pub use clinic_desk_gateway as gateway;
pub use clinic_desk_gateway::{DataGateway, GatewayError, MemoryGateway, Query, RestGateway};
pub use error::{Error, Result};

/// The main entry point: hands out one manager per screen, all sharing the
/// same gateway, notifier and clock
#[derive(Clone)]
pub struct Clinic {
    gateway: Arc<dyn DataGateway>,
    tables: TableNames,
    notifier: Arc<dyn Notifier>,
    clock: Clock,
}

impl Clinic {
    /// Connect to the Supabase project described by `config`
    ///
    /// # Example
    ///
    /// ```no_run
    /// use clinic_desk::{config::ClinicConfig, Clinic};
    ///
    /// # async fn run() -> clinic_desk::Result<()> {
    /// let config = ClinicConfig::new("https://your-project-url.supabase.co", "your-anon-key".to_string())?
    ///     .with_access_token("staff-jwt");
    /// let clinic = Clinic::new(config)?;
    ///
    /// let slots = clinic.time_slots();
    /// slots.load().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: ClinicConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        let mut gateway = RestGateway::new(config.url.as_str(), &config.anon_key, http_client)
            .with_schema(&config.db_schema);
        if let Some(token) = &config.access_token {
            gateway = gateway.with_access_token(token);
        }

        Ok(Self::with_gateway(Arc::new(gateway), config.tables))
    }

    /// Connect using `SUPABASE_URL`, `SUPABASE_ANON_KEY` and
    /// `SUPABASE_ACCESS_TOKEN`
    pub fn from_env() -> Result<Self> {
        Self::new(ClinicConfig::from_env()?)
    }

    /// Use any gateway, e.g. a [`MemoryGateway`] for previews and tests
    pub fn with_gateway(gateway: Arc<dyn DataGateway>, tables: TableNames) -> Self {
        Self {
            gateway,
            tables,
            notifier: Arc::new(LogNotifier),
            clock: local_clock(),
        }
    }

    /// Send notifications to `notifier` instead of the log
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn gateway(&self) -> Arc<dyn DataGateway> {
        self.gateway.clone()
    }

    pub fn tables(&self) -> &TableNames {
        &self.tables
    }

    pub fn closures(&self, calendar: ClosureCalendar) -> ClosureManager {
        ClosureManager::closures(self.gateway(), calendar, &self.tables, self.notifier.clone())
            .with_clock(self.clock.clone())
    }

    pub fn time_slots(&self) -> TimeSlotManager {
        TimeSlotManager::time_slots(self.gateway(), &self.tables, self.notifier.clone())
            .with_clock(self.clock.clone())
    }

    pub fn working_hours(&self) -> WorkingHoursBoard {
        WorkingHoursBoard::working_hours(self.gateway(), &self.tables, self.notifier.clone())
    }

    pub fn mr_weekdays(&self) -> MrWeekdayBoard {
        MrWeekdayBoard::mr_weekdays(self.gateway(), &self.tables, self.notifier.clone())
    }

    pub fn doctor_messages(&self) -> DoctorMessageBoard {
        DoctorMessageBoard::new(self.gateway(), &self.tables, self.notifier.clone())
    }

    pub fn contact_inbox(&self) -> ContactInbox {
        ContactInbox::new(self.gateway(), &self.tables, self.notifier.clone())
    }

    pub fn mr_appointments(&self) -> MrAppointmentDesk {
        MrAppointmentDesk::new(self.gateway(), &self.tables, None, self.notifier.clone())
    }

    /// Appointments in one status only
    pub fn mr_appointments_with_status(&self, status: AppointmentStatus) -> MrAppointmentDesk {
        MrAppointmentDesk::new(self.gateway(), &self.tables, Some(status), self.notifier.clone())
    }

    /// Operations open to visitors of the public site
    pub fn site(&self) -> Site {
        Site::new(self.gateway(), self.tables.clone(), self.notifier.clone())
            .with_clock(self.clock.clone())
    }
}

/// Commonly used types
pub mod prelude {
    pub use crate::admin::*;
    pub use crate::config::{ClinicConfig, TableNames};
    pub use crate::error::{Error, Result};
    pub use crate::models::*;
    pub use crate::notify::{Level, LogNotifier, Notification, Notifier, RecordingNotifier};
    pub use crate::record::{fixed_clock, local_clock, Clock, Editable, Record};
    pub use crate::site::Site;
    pub use crate::Clinic;
    pub use clinic_desk_gateway::{DataGateway, MemoryGateway, Query, RestGateway};
}
