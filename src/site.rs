//! What the public site may do without signing in: send a contact message,
//! read the doctor's notice and request an MR appointment

use crate::config::TableNames;
use crate::error::{Error, Result};
use crate::form::SubmitLatch;
use crate::models::{
    AppointmentStatus, ContactMessage, ContactMessageDraft, Day, DoctorMessage, MrAppointment,
    MrAppointmentDraft, MrWeekday,
};
use crate::notify::{Notification, Notifier};
use crate::record::{local_clock, Clock, Record};
use chrono::{Datelike, NaiveDate};
use clinic_desk_gateway::{DataGateway, Query};
use log::{error, info, warn};
use serde_json::{json, Value};
use std::sync::Arc;

pub struct Site {
    gateway: Arc<dyn DataGateway>,
    tables: TableNames,
    notifier: Arc<dyn Notifier>,
    clock: Clock,
    contact_latch: SubmitLatch,
    booking_latch: SubmitLatch,
}

impl Site {
    pub fn new(gateway: Arc<dyn DataGateway>, tables: TableNames, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            gateway,
            tables,
            notifier,
            clock: local_clock(),
            contact_latch: SubmitLatch::new(),
            booking_latch: SubmitLatch::new(),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Store a visitor's message as unread
    pub async fn submit_contact(&self, draft: &ContactMessageDraft) -> Result<ContactMessage> {
        let _ticket = self.contact_latch.try_acquire().map_err(|e| self.reject(e))?;
        ContactMessage::validate(draft).map_err(|e| self.reject(e))?;

        let mut body = serde_json::to_value(draft)?;
        body["is_read"] = Value::Bool(false);
        let saved = match self.insert::<ContactMessage>(&self.tables.contact_messages, body).await {
            Ok(saved) => saved,
            Err(err) => return Err(self.fail("send contact message", err)),
        };

        info!("Contact message {} received from {}", saved.id, saved.email);
        self.notifier
            .notify(Notification::success("Thank you, your message has been sent"));
        Ok(saved)
    }

    /// The newest active doctor message, if any
    pub async fn current_notice(&self) -> Result<Option<DoctorMessage>> {
        let query = Query::new()
            .eq("active", true)
            .order("created_at", false)
            .limit(1);
        let rows = match self.fetch::<DoctorMessage>(&self.tables.doctor_messages, &query).await {
            Ok(rows) => rows,
            Err(err) => return Err(self.fail("load doctor message", err)),
        };
        Ok(rows.into_iter().next())
    }

    /// Request a visit. The day must be upcoming, open to MRs and not full;
    /// the request is stored as pending.
    pub async fn book_mr_appointment(&self, draft: &MrAppointmentDraft) -> Result<MrAppointment> {
        let _ticket = self.booking_latch.try_acquire().map_err(|e| self.reject(e))?;
        MrAppointment::validate(draft).map_err(|e| self.reject(e))?;
        let date = draft
            .appointment_date
            .ok_or_else(|| self.reject(Error::validation("Appointment date is required")))?;

        if date < (self.clock)() {
            return Err(self.reject(Error::validation(
                "Appointments cannot be booked for a past date",
            )));
        }

        match self.check_mr_day(date).await {
            Ok(()) => {}
            Err(err) if err.is_validation() => return Err(self.reject(err)),
            Err(err) => return Err(self.fail("check MR availability", err)),
        }

        let mut body = serde_json::to_value(draft)?;
        body["status"] = json!(AppointmentStatus::Pending);
        let saved = match self.insert::<MrAppointment>(&self.tables.mr_appointments, body).await {
            Ok(saved) => saved,
            Err(err) => return Err(self.fail("book MR appointment", err)),
        };

        info!(
            "MR appointment {} requested for {} by {}",
            saved.id, saved.appointment_date, saved.mr_name
        );
        self.notifier.notify(Notification::success(format!(
            "Appointment requested for {}",
            saved.appointment_date
        )));
        Ok(saved)
    }

    async fn check_mr_day(&self, date: NaiveDate) -> Result<()> {
        let closures = Query::new()
            .eq("date", date)
            .eq("is_active", true)
            .limit(1);
        let closed = self
            .gateway
            .query(&self.tables.mr_closure_dates, &closures)
            .await?;
        if let Some(closure) = closed.first() {
            let reason = closure.get("reason").and_then(Value::as_str).unwrap_or("closed");
            return Err(Error::validation(format!(
                "MRs are not received on {} ({})",
                date, reason
            )));
        }

        let day = Day::from(date.weekday());
        let weekday = self
            .fetch::<MrWeekday>(&self.tables.mr_weekdays, &Query::new().eq("day", day))
            .await?
            .into_iter()
            .next();
        let capacity = match weekday {
            Some(w) if w.is_working => w.max_appointments,
            _ => {
                return Err(Error::validation(format!(
                    "MRs are not received on {}s",
                    day
                )))
            }
        };

        let booked = Query::new()
            .eq("appointment_date", date)
            .neq("status", AppointmentStatus::Cancelled.as_str());
        let taken = self
            .gateway
            .query(&self.tables.mr_appointments, &booked)
            .await?
            .len();
        if taken >= capacity as usize {
            return Err(Error::validation(format!(
                "No MR appointments are left on {}",
                date
            )));
        }
        Ok(())
    }

    async fn fetch<R: Record>(&self, table: &str, query: &Query) -> Result<Vec<R>> {
        let rows = self.gateway.query(table, query).await?;
        crate::manager::decode_rows(rows)
    }

    async fn insert<R: Record>(&self, table: &str, body: Value) -> Result<R> {
        let row = self.gateway.insert(table, body).await?;
        Ok(serde_json::from_value(row)?)
    }

    fn reject(&self, err: Error) -> Error {
        warn!("Rejected public request: {}", err);
        self.notifier.notify(Notification::error(err.user_message()));
        err
    }

    fn fail(&self, action: &str, err: Error) -> Error {
        error!("Failed to {}: {}", action, err);
        self.notifier.notify(Notification::error(err.user_message()));
        err
    }
}
