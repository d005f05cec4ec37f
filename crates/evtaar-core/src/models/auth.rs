use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/register`. A successful registration does not log
/// the user in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// `data` of a successful `POST /auth/login`.
#[derive(Clone, Deserialize)]
pub struct AuthTokens {
    pub user_id: String,
    pub email: String,
    #[serde(default)]
    pub role: String,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

// Tokens never reach log output
impl std::fmt::Debug for AuthTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthTokens")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisteredUser {
    pub user_id: String,
    pub email: String,
}
