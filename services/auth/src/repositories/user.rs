//! User repository for database operations

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::models::{GoogleProfile, RegisterRequest, User};

const USER_COLUMNS: &str =
    "id, username, email, password_hash, google_id, apple_id, full_name, created_at, updated_at";

/// Width of the `users.full_name` column, in characters
const FULL_NAME_MAX_CHARS: usize = 100;

/// The profile's display name, cut to fit `users.full_name`
fn full_name(profile: &GoogleProfile) -> Option<String> {
    profile
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| name.chars().take(FULL_NAME_MAX_CHARS).collect())
}

/// Hash a password with argon2 and a random salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();
    Ok(hash)
}

/// Check a password against a user's stored hash. Accounts without a
/// password never match.
pub fn verify_password(user: &User, password: &str) -> Result<bool> {
    let Some(stored) = user.password_hash.as_deref() else {
        return Ok(false);
    };

    let parsed_hash = PasswordHash::new(stored)
        .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn user_from_row(row: &PgRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        google_id: row.try_get("google_id")?,
        apple_id: row.try_get("apple_id")?,
        full_name: row.try_get("full_name")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Register a password account
    pub async fn create(&self, request: &RegisterRequest) -> Result<User> {
        info!("Creating new user: {}", request.username);

        let password_hash = hash_password(&request.password)?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (id, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&request.username)
        .bind(&request.email)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await?;

        user_from_row(&row)
    }

    /// Whether the username or the email is already taken
    pub async fn username_or_email_taken(&self, username: &str, email: &str) -> Result<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 OR email = $2)",
        )
        .bind(username)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    pub async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE google_id = $1"))
            .bind(google_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Resolve a Google identity to a user: by Google id first, then by
    /// email (linking the Google id to that account), otherwise a new
    /// password-less account is created.
    pub async fn find_or_create_google_user(&self, profile: &GoogleProfile) -> Result<User> {
        if let Some(user) = self.find_by_google_id(&profile.google_id).await? {
            return Ok(user);
        }

        let full_name = full_name(profile);

        if let Some(existing) = self.find_by_email(&profile.email).await? {
            info!("Linking Google account to user {}", existing.id);
            let row = sqlx::query(&format!(
                r#"
                UPDATE users
                SET google_id = $2,
                    full_name = COALESCE(full_name, $3),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING {USER_COLUMNS}
                "#
            ))
            .bind(existing.id)
            .bind(&profile.google_id)
            .bind(&full_name)
            .fetch_one(&self.pool)
            .await?;
            return user_from_row(&row);
        }

        info!("Creating user for Google account {}", profile.email);
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (id, email, google_id, full_name)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&profile.email)
        .bind(&profile.google_id)
        .bind(&full_name)
        .fetch_one(&self.pool)
        .await?;

        user_from_row(&row)
    }
}
