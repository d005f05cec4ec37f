use super::client::path_id;
use super::{ApiClient, Result};
use crate::models::{Page, UpdateProfileRequest, User, UserQuery};

/// `/users` endpoints
pub struct UsersApi<'a> {
    client: &'a ApiClient,
}

impl<'a> UsersApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Profile of the user the credential belongs to
    pub async fn me(&self) -> Result<User> {
        self.client.get("/users/me").await
    }

    pub async fn update_me(&self, request: &UpdateProfileRequest) -> Result<User> {
        self.client.put("/users/me", request).await
    }

    pub async fn list(&self, query: &UserQuery) -> Result<Page<User>> {
        self.client.get_page("/users", query).await
    }

    pub async fn get(&self, id: &str) -> Result<User> {
        self.client.get(&format!("/users/{}", path_id(id)?)).await
    }
}
