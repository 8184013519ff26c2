use crate::config::TableNames;
use crate::error::{Error, Result};
use crate::manager::ListManager;
use crate::models::DoctorMessage;
use crate::notify::Notifier;
use clinic_desk_gateway::{DataGateway, Query};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Doctor notices, newest first, plus the one opened in the detail view
pub struct DoctorMessageBoard {
    list: ListManager<DoctorMessage>,
    viewing: RwLock<Option<Uuid>>,
}

impl DoctorMessageBoard {
    pub fn new(
        gateway: Arc<dyn DataGateway>,
        tables: &TableNames,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            list: ListManager::new(
                gateway,
                &tables.doctor_messages,
                Query::new().order("created_at", false),
                notifier,
            ),
            viewing: RwLock::new(None),
        }
    }

    /// The underlying list and form
    pub fn list(&self) -> &ListManager<DoctorMessage> {
        &self.list
    }

    pub async fn load(&self) -> Result<Vec<DoctorMessage>> {
        self.list.load().await
    }

    /// Open the detail view on a loaded message
    pub async fn view(&self, id: Uuid) -> Result<DoctorMessage> {
        match self.list.find(id).await {
            Some(message) => {
                *self.viewing.write().await = Some(id);
                Ok(message)
            }
            None => Err(self
                .list
                .reject(Error::validation("This doctor message is no longer in the list"))),
        }
    }

    /// The message in the detail view, if it is still in the list
    pub async fn viewing(&self) -> Option<DoctorMessage> {
        let id = (*self.viewing.read().await)?;
        self.list.find(id).await
    }

    pub async fn close_view(&self) {
        *self.viewing.write().await = None;
    }

    /// The notice patients see: newest active message
    pub async fn current(&self) -> Option<DoctorMessage> {
        DoctorMessage::current(&self.list.rows().await).cloned()
    }

    pub async fn set_active(&self, id: Uuid, active: bool) -> Result<DoctorMessage> {
        self.list.patch(id, json!({ "active": active })).await
    }

    /// Delete a message; the detail view closes if it showed it
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.list.delete(id).await?;
        let mut viewing = self.viewing.write().await;
        if *viewing == Some(id) {
            *viewing = None;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use clinic_desk_gateway::MemoryGateway;

    async fn board() -> DoctorMessageBoard {
        let gateway = Arc::new(MemoryGateway::new());
        gateway
            .seed(
                "doctor_messages",
                vec![
                    json!({ "message": "On leave Friday", "active": true,
                        "created_at": "2024-06-01T08:00:00Z" }),
                    json!({ "message": "Clinic moved", "active": true,
                        "created_at": "2024-06-03T08:00:00Z" }),
                ],
            )
            .await;
        let board = DoctorMessageBoard::new(
            gateway,
            &TableNames::default(),
            Arc::new(RecordingNotifier::new()),
        );
        board.load().await.unwrap();
        board
    }

    #[tokio::test]
    async fn newest_active_is_current() {
        let board = board().await;
        assert_eq!(
            board.current().await.map(|m| m.message),
            Some("Clinic moved".to_string())
        );

        let newest = board.list().rows().await[0].id;
        board.set_active(newest, false).await.unwrap();
        assert_eq!(
            board.current().await.map(|m| m.message),
            Some("On leave Friday".to_string())
        );
    }

    #[tokio::test]
    async fn deleting_viewed_message_clears_view() {
        let board = board().await;
        let id = board.list().rows().await[0].id;

        board.view(id).await.unwrap();
        assert_eq!(board.viewing().await.map(|m| m.id), Some(id));

        board.delete(id).await.unwrap();
        assert!(board.viewing().await.is_none());
        assert_eq!(board.list().len().await, 1);
    }

    #[tokio::test]
    async fn viewing_an_unknown_message_fails() {
        let board = board().await;
        assert!(board.view(Uuid::new_v4()).await.unwrap_err().is_validation());
        assert!(board.viewing().await.is_none());
    }
}
