use crate::config::TableNames;
use crate::error::Result;
use crate::manager::ListManager;
use crate::models::ContactMessage;
use crate::notify::Notifier;
use clinic_desk_gateway::{DataGateway, Query};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Messages sent from the public contact form. Staff read and delete them
/// but never edit their content.
pub struct ContactInbox {
    list: ListManager<ContactMessage>,
}

impl ContactInbox {
    pub fn new(
        gateway: Arc<dyn DataGateway>,
        tables: &TableNames,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            list: ListManager::new(
                gateway,
                &tables.contact_messages,
                Query::new().order("created_at", false),
                notifier,
            ),
        }
    }

    pub async fn load(&self) -> Result<Vec<ContactMessage>> {
        self.list.load().await
    }

    pub async fn rows(&self) -> Vec<ContactMessage> {
        self.list.rows().await
    }

    pub async fn find(&self, id: Uuid) -> Option<ContactMessage> {
        self.list.find(id).await
    }

    pub async fn set_read(&self, id: Uuid, read: bool) -> Result<ContactMessage> {
        self.list.patch(id, json!({ "is_read": read })).await
    }

    pub async fn unread_count(&self) -> usize {
        self.list.rows().await.iter().filter(|m| !m.is_read).count()
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.list.delete(id).await
    }
}
