use super::client::path_id;
use super::{ApiClient, Result};
use crate::models::{CreateMeetingRequest, JoinMeeting, Meeting, MeetingQuery, Page};

/// `/meetings` endpoints
pub struct MeetingsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> MeetingsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, request: &CreateMeetingRequest) -> Result<Meeting> {
        self.client.post("/meetings", request).await
    }

    pub async fn list(&self, query: &MeetingQuery) -> Result<Page<Meeting>> {
        self.client.get_page("/meetings", query).await
    }

    pub async fn get(&self, id: &str) -> Result<Meeting> {
        self.client.get(&format!("/meetings/{}", path_id(id)?)).await
    }

    /// Returns the room URL to open for the current user
    pub async fn join(&self, id: &str) -> Result<JoinMeeting> {
        self.client.post_action(&format!("/meetings/{}/join", path_id(id)?)).await
    }
}
