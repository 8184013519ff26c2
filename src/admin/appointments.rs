use crate::config::TableNames;
use crate::error::{Error, Result};
use crate::manager::ListManager;
use crate::models::{AppointmentStatus, MrAppointment, Transition};
use crate::notify::Notifier;
use clinic_desk_gateway::{DataGateway, Query};
use log::debug;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// MR appointment requests, soonest first
///
/// Staff only move a pending request to completed or cancelled, or delete
/// it; the request itself is never edited.
pub struct MrAppointmentDesk {
    list: ListManager<MrAppointment>,
}

impl MrAppointmentDesk {
    /// `status` narrows the list to one status
    pub fn new(
        gateway: Arc<dyn DataGateway>,
        tables: &TableNames,
        status: Option<AppointmentStatus>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let mut query = Query::new();
        if let Some(status) = status {
            query = query.eq("status", status.as_str());
        }
        Self {
            list: ListManager::new(
                gateway,
                &tables.mr_appointments,
                query.order("appointment_date", true),
                notifier,
            ),
        }
    }

    pub async fn load(&self) -> Result<Vec<MrAppointment>> {
        self.list.load().await
    }

    pub async fn rows(&self) -> Vec<MrAppointment> {
        self.list.rows().await
    }

    pub async fn find(&self, id: Uuid) -> Option<MrAppointment> {
        self.list.find(id).await
    }

    pub async fn complete(&self, id: Uuid) -> Result<MrAppointment> {
        self.transition(id, Transition::Complete).await
    }

    pub async fn cancel(&self, id: Uuid) -> Result<MrAppointment> {
        self.transition(id, Transition::Cancel).await
    }

    async fn transition(&self, id: Uuid, transition: Transition) -> Result<MrAppointment> {
        let current = match self.list.find(id).await {
            Some(appointment) => appointment.status,
            None => {
                return Err(self
                    .list
                    .reject(Error::validation("This MR appointment is no longer in the list")))
            }
        };
        let next = match current.apply(transition) {
            Some(next) => next,
            None => {
                return Err(self.list.reject(Error::validation(format!(
                    "Appointment is already {}",
                    current
                ))))
            }
        };

        debug!("MR appointment {} {} -> {}", id, current, next);
        self.list.patch(id, json!({ "status": next })).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.list.delete(id).await
    }
}
