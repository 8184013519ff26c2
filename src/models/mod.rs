//! Clinic records and their drafts

mod closure_date;
mod contact_message;
mod day;
mod doctor_message;
mod mr_appointment;
mod mr_weekday;
mod time_slot;
mod working_hours;

pub use closure_date::{ClosureDate, ClosureDateDraft};
pub use contact_message::{ContactMessage, ContactMessageDraft};
pub use day::Day;
pub use doctor_message::{DoctorMessage, DoctorMessageDraft};
pub use mr_appointment::{AppointmentStatus, MrAppointment, MrAppointmentDraft, Transition};
pub use mr_weekday::{MrWeekday, MrWeekdayDraft};
pub use time_slot::{SlotAvailability, TimeSlot, TimeSlotDraft};
pub use working_hours::{Session, WorkingHours, WorkingHoursDraft};
