use crate::config::TableNames;
use crate::guard::UniqueKeyGuard;
use crate::manager::ListManager;
use crate::models::{SlotAvailability, TimeSlot, TimeSlotDraft};
use crate::notify::Notifier;
use chrono::NaiveTime;
use clinic_desk_gateway::{DataGateway, Query};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Bookable times, earliest first, one row per clock time
pub type TimeSlotManager = ListManager<TimeSlot>;

fn slot_time(row: &TimeSlot) -> Option<NaiveTime> {
    Some(row.time)
}

fn draft_time(draft: &TimeSlotDraft) -> Option<NaiveTime> {
    draft.time
}

impl ListManager<TimeSlot> {
    pub fn time_slots(
        gateway: Arc<dyn DataGateway>,
        tables: &TableNames,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        ListManager::new(
            gateway,
            &tables.time_slots,
            Query::new().order("time", true),
            notifier,
        )
        .with_guard(UniqueKeyGuard::new("time slot", slot_time, draft_time))
    }

    /// Enable or disable a slot without opening the form
    pub async fn set_available(&self, id: Uuid, available: bool) -> crate::Result<TimeSlot> {
        self.patch(id, json!({ "is_available": available })).await
    }

    /// Pair every loaded slot with its booking count; times missing from
    /// `bookings` count as empty
    pub async fn availability(&self, bookings: &HashMap<NaiveTime, u32>) -> Vec<SlotAvailability> {
        self.rows()
            .await
            .into_iter()
            .map(|slot| SlotAvailability {
                current_bookings: bookings.get(&slot.time).copied().unwrap_or(0),
                slot,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use clinic_desk_gateway::MemoryGateway;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    async fn slots() -> (Arc<MemoryGateway>, TimeSlotManager) {
        let gateway = Arc::new(MemoryGateway::new());
        gateway
            .seed(
                "time_slots",
                vec![
                    json!({ "time": "10:30:00", "max_bookings": 2, "is_available": true }),
                    json!({ "time": "09:00:00", "max_bookings": 3, "is_available": true }),
                ],
            )
            .await;
        let manager = TimeSlotManager::time_slots(
            gateway.clone(),
            &TableNames::default(),
            Arc::new(RecordingNotifier::new()),
        );
        manager.load().await.unwrap();
        (gateway, manager)
    }

    #[tokio::test]
    async fn slots_are_sorted_by_time() {
        let (_, manager) = slots().await;
        let times: Vec<NaiveTime> = manager.rows().await.iter().map(|s| s.time).collect();
        assert_eq!(times, vec![at(9, 0), at(10, 30)]);
    }

    #[tokio::test]
    async fn same_time_twice_is_rejected() {
        let (gateway, manager) = slots().await;

        manager.open_create().await;
        manager.edit(|d| d.time = Some(at(9, 0))).await;
        assert!(manager.submit().await.unwrap_err().is_validation());
        assert_eq!(gateway.write_count(), 0);

        manager.edit(|d| d.time = Some(at(11, 0))).await;
        manager.submit().await.unwrap();
        assert_eq!(manager.len().await, 3);
    }

    #[tokio::test]
    async fn disabled_slot_is_unselectable() {
        let (_, manager) = slots().await;
        let early = manager.rows().await[0].id;

        let updated = manager.set_available(early, false).await.unwrap();
        assert!(!updated.is_available);

        let mut bookings = HashMap::new();
        bookings.insert(at(10, 30), 2);
        let board = manager.availability(&bookings).await;

        assert!(!board[0].is_selectable());
        assert_eq!(board[0].current_bookings, 0);
        assert!(!board[1].is_selectable());
        assert_eq!(board[1].remaining(), 0);
    }
}
