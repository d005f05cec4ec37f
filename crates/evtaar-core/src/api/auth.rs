use super::{ApiClient, Result};
use crate::models::{AuthTokens, LoginRequest, RegisterRequest, RegisteredUser};

/// `/auth` endpoints
pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisteredUser> {
        self.client.post("/auth/register", request).await
    }

    /// Exchange an email and password for a token pair. The caller decides
    /// whether to persist the returned credential.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthTokens> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.client.post("/auth/login", &request).await
    }

    pub async fn logout(&self) -> Result<()> {
        self.client.post_empty("/auth/logout").await
    }
}
