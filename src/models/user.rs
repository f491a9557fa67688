use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Stored credential; read-only from the request path (no signup flow)
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Minimal identity returned on successful login
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
}

impl From<User> for Identity {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}
