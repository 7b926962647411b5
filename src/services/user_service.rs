//! User service

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::repositories::UserRepository,
    error::{AppError, AppResult},
    models::User,
    services::auth_service::{hash_password, verify_password},
};

/// User service
pub struct UserService {
    db: PgPool,
}

impl UserService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get user by ID
    pub async fn get_user(&self, id: &Uuid) -> AppResult<User> {
        UserRepository::find_by_id(&self.db, id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// List users with pagination
    pub async fn list_users(
        &self,
        page: u32,
        per_page: u32,
        search: Option<&str>,
    ) -> AppResult<(Vec<User>, i64)> {
        let offset = ((page - 1) * per_page) as i64;
        let limit = per_page as i64;

        UserRepository::list(&self.db, offset, limit, search).await
    }

    /// Update profile fields and optionally the password.
    /// Only the user themself (or an admin) may update an account.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_user(
        &self,
        requester_id: &Uuid,
        requester_is_admin: bool,
        target_id: &Uuid,
        display_name: Option<&str>,
        bio: Option<&str>,
        country: Option<&str>,
        current_password: Option<&str>,
        new_password: Option<&str>,
    ) -> AppResult<User> {
        if requester_id != target_id && !requester_is_admin {
            return Err(AppError::Forbidden(
                "Cannot update other users' profiles".to_string(),
            ));
        }

        if let Some(new_password) = new_password {
            let current = current_password.ok_or_else(|| {
                AppError::Validation("Current password required to change password".to_string())
            })?;

            let user = self.get_user(target_id).await?;
            if !verify_password(current, &user.password_hash)? {
                return Err(AppError::InvalidCredentials);
            }

            let password_hash = hash_password(new_password)?;
            UserRepository::update_password_hash(&self.db, target_id, &password_hash).await?;
        }

        UserRepository::update_profile(&self.db, target_id, display_name, bio, country).await
    }
}
