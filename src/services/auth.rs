use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use rand::rngs::OsRng;
use uuid::Uuid;

use crate::config::AdminConfig;
use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{Identity, LoginRequest, User};

/// Same message for an unknown email and a wrong password
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Credential verification service
pub struct AuthService;

impl AuthService {
    /// Verify an email/password pair against the stored credential.
    /// Returns the minimal identity on success; no token is issued.
    pub async fn login(db: &Database, req: LoginRequest) -> Result<Identity> {
        if req.email.trim().is_empty() || req.password.is_empty() {
            return Err(AppError::BadRequest(
                "Email & password required.".to_string(),
            ));
        }

        let user: User = sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(&req.email)
            .fetch_optional(db.pool())
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !Self::verify_password(&req.password, &user.password_hash)? {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        Ok(Identity::from(user))
    }

    /// Seed the configured login credential if it does not exist yet.
    /// There is no signup flow, so this is the only way a credential
    /// enters the database.
    pub async fn ensure_seed_user(db: &Database, admin: &AdminConfig) -> Result<()> {
        let (Some(email), Some(password)) = (&admin.email, &admin.password) else {
            return Ok(());
        };

        let existing: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(db.pool())
            .await?;
        if existing.is_some() {
            return Ok(());
        }

        let id = Uuid::new_v4().to_string();
        let password_hash = Self::hash_password(password)?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(email)
        .bind(&password_hash)
        .bind(&now)
        .execute(db.pool())
        .await?;

        tracing::info!("Seeded login credential for {}", email);
        Ok(())
    }

    /// Hash password using Argon2
    pub fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?
            .to_string();

        Ok(password_hash)
    }

    /// Verify password against hash
    fn verify_password(password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}
