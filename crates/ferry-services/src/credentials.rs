//! Email/password authentication for owner-side requests

use ferry_core::models::User;
use ferry_core::validation::require;
use ferry_core::AppError;
use ferry_db::UserStore;
use std::sync::Arc;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Checks credentials against stored bcrypt hashes
#[derive(Clone)]
pub struct CredentialVerifier {
    users: Arc<dyn UserStore>,
}

impl CredentialVerifier {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    #[tracing::instrument(skip(self, password), fields(email = %email))]
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AppError> {
        require("email", email)?;
        require("password", password)?;

        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        let password = password.to_string();
        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?
            .unwrap_or(false);

        if !matches {
            tracing::debug!(user_id = %user.id, "Password mismatch");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        Ok(user)
    }
}
