//! Back-office screens

mod appointments;
mod closures;
mod contacts;
mod messages;
mod schedule;
mod time_slots;

pub use appointments::MrAppointmentDesk;
pub use closures::{ClosureCalendar, ClosureManager};
pub use contacts::ContactInbox;
pub use messages::DoctorMessageBoard;
pub use schedule::{MrWeekdayBoard, WorkingHoursBoard};
pub use time_slots::TimeSlotManager;
