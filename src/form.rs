//! Edit buffer for one record at a time

use crate::error::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Gate that lets one submission through at a time
#[derive(Debug, Clone, Default)]
pub struct SubmitLatch {
    in_flight: Arc<AtomicBool>,
}

impl SubmitLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the latch, failing with [`Error::SubmissionInFlight`] if a
    /// submission already holds it. Released when the ticket drops.
    pub fn try_acquire(&self) -> Result<SubmitTicket> {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| Error::SubmissionInFlight)?;
        Ok(SubmitTicket {
            in_flight: self.in_flight.clone(),
        })
    }

    pub fn is_held(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct SubmitTicket {
    in_flight: Arc<AtomicBool>,
}

impl Drop for SubmitTicket {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::SeqCst);
    }
}

/// Form/modal state: closed, creating, or editing one record
#[derive(Debug, Default)]
pub struct FormController<D> {
    draft: D,
    editing: Option<Uuid>,
    open: bool,
    latch: SubmitLatch,
}

impl<D: Default + Clone> FormController<D> {
    pub fn new() -> Self {
        Self {
            draft: D::default(),
            editing: None,
            open: false,
            latch: SubmitLatch::new(),
        }
    }

    /// Open with a blank draft
    pub fn open_create(&mut self) {
        self.draft = D::default();
        self.editing = None;
        self.open = true;
    }

    /// Open on a copy of an existing record
    pub fn open_edit(&mut self, id: Uuid, draft: D) {
        self.draft = draft;
        self.editing = Some(id);
        self.open = true;
    }

    /// Close and reset to defaults
    pub fn close(&mut self) {
        self.draft = D::default();
        self.editing = None;
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Id of the record being edited; `None` in create mode
    pub fn editing(&self) -> Option<Uuid> {
        self.editing
    }

    pub fn draft(&self) -> &D {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut D {
        &mut self.draft
    }

    pub fn is_submitting(&self) -> bool {
        self.latch.is_held()
    }

    /// Snapshot what is needed to submit and claim the latch
    pub fn begin_submit(&self) -> Result<(D, Option<Uuid>, SubmitTicket)> {
        if !self.open {
            return Err(Error::validation("Nothing to submit: the form is closed"));
        }
        let ticket = self.latch.try_acquire()?;
        Ok((self.draft.clone(), self.editing, ticket))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Draft {
        text: String,
    }

    #[test]
    fn close_resets_buffer_and_edit_mode() {
        let mut form = FormController::<Draft>::new();
        let id = Uuid::new_v4();
        form.open_edit(id, Draft { text: "x".into() });
        assert_eq!(form.editing(), Some(id));

        form.close();
        assert!(!form.is_open());
        assert_eq!(form.editing(), None);
        assert_eq!(form.draft(), &Draft::default());
    }

    #[test]
    fn second_submit_is_refused_while_first_is_running() {
        let mut form = FormController::<Draft>::new();
        form.open_create();

        let (_, _, ticket) = form.begin_submit().unwrap();
        assert!(form.is_submitting());
        assert!(matches!(form.begin_submit(), Err(Error::SubmissionInFlight)));

        drop(ticket);
        assert!(!form.is_submitting());
        assert!(form.begin_submit().is_ok());
    }

    #[test]
    fn closed_form_cannot_submit() {
        let form = FormController::<Draft>::new();
        assert!(form.begin_submit().unwrap_err().is_validation());
    }
}
