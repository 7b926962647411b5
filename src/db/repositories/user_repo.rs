//! User repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::{error::AppResult, models::User};

/// Repository for user database operations
pub struct UserRepository;

impl UserRepository {
    /// Create a new user
    pub async fn create(
        pool: &PgPool,
        username: &str,
        email: &str,
        password_hash: &str,
        display_name: Option<&str>,
        roles: &[String],
    ) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, display_name, roles)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(display_name)
        .bind(roles)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(pool: &PgPool, id: &Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Cheap existence probe for registration's duplicate-username check
    pub async fn username_taken(pool: &PgPool, username: &str) -> AppResult<bool> {
        let taken: bool =
            sqlx::query_scalar(r#"SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)"#)
                .bind(username)
                .fetch_one(pool)
                .await?;

        Ok(taken)
    }

    /// Same probe for the duplicate-email check
    pub async fn email_taken(pool: &PgPool, email: &str) -> AppResult<bool> {
        let taken: bool =
            sqlx::query_scalar(r#"SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)"#)
                .bind(email)
                .fetch_one(pool)
                .await?;

        Ok(taken)
    }

    /// Find user by email (password reset flow)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE email = $1"#)
            .bind(email)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Find user by username or email
    pub async fn find_by_identifier(pool: &PgPool, identifier: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT * FROM users WHERE username = $1 OR email = $1"#,
        )
        .bind(identifier)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Page through users, newest accounts first
    pub async fn list(
        pool: &PgPool,
        offset: i64,
        limit: i64,
        search: Option<&str>,
    ) -> AppResult<(Vec<User>, i64)> {
        let pattern = search.map(|s| format!("%{}%", s));

        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE ($1::text IS NULL OR username ILIKE $1 OR display_name ILIKE $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM users
            WHERE ($1::text IS NULL OR username ILIKE $1 OR display_name ILIKE $1)
            "#,
        )
        .bind(&pattern)
        .fetch_one(pool)
        .await?;

        Ok((users, total))
    }

    /// Update profile fields (COALESCE keeps existing values for absent inputs)
    pub async fn update_profile(
        pool: &PgPool,
        id: &Uuid,
        display_name: Option<&str>,
        bio: Option<&str>,
        country: Option<&str>,
    ) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET
                display_name = COALESCE($2, display_name),
                bio = COALESCE($3, bio),
                country = COALESCE($4, country),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(display_name)
        .bind(bio)
        .bind(country)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Replace the stored password hash
    pub async fn update_password_hash(
        pool: &PgPool,
        id: &Uuid,
        password_hash: &str,
    ) -> AppResult<()> {
        sqlx::query(
            r#"UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1"#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Flag the account as email-verified
    pub async fn mark_verified(pool: &PgPool, id: &Uuid) -> AppResult<()> {
        sqlx::query(
            r#"UPDATE users SET is_verified = TRUE, updated_at = NOW() WHERE id = $1"#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Update last login timestamp
    pub async fn update_last_login(pool: &PgPool, id: &Uuid) -> AppResult<()> {
        sqlx::query(r#"UPDATE users SET last_login_at = NOW() WHERE id = $1"#)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }
}
