use super::client::path_id;
use super::{ApiClient, Result};
use crate::models::{Notification, NotificationQuery, Page, UnreadCount};

/// `/notifications` endpoints for the current user
pub struct NotificationsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> NotificationsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &NotificationQuery) -> Result<Page<Notification>> {
        self.client.get_page("/notifications", query).await
    }

    pub async fn unread_count(&self) -> Result<u64> {
        let unread: UnreadCount = self.client.get("/notifications/unread-count").await?;
        Ok(unread.count)
    }

    pub async fn mark_read(&self, id: &str) -> Result<()> {
        self.client
            .post_empty(&format!("/notifications/{}/read", path_id(id)?))
            .await
    }

    pub async fn mark_all_read(&self) -> Result<()> {
        self.client.post_empty("/notifications/mark-all-read").await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&format!("/notifications/{}", path_id(id)?)).await
    }
}
