use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use super::{ErrorContext, StoreError, UserStore, ensure_insertable, ensure_valid_id, translate};
use crate::error::ApiError;
use crate::models::User;

/// PostgreSQL 実装
///
/// SQL は全てプレースホルダでバインドする（文字列連結しない）。
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    /// # Note
    /// UNIQUE制約違反 (`users_email_key`) は `bad_request` に変換される
    async fn insert(&self, user: User) -> Result<User, ApiError> {
        ensure_insertable(&user)?;
        let date_created = user.date_created.unwrap_or_else(OffsetDateTime::now_utc);

        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (first_name, last_name, email, date_created, status, password)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, first_name, last_name, email, date_created, status, password
            "#,
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(date_created)
        .bind(&user.status)
        .bind(&user.password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| translate(e, ErrorContext::email(&user.email)))
    }

    async fn find_by_id(&self, id: i64) -> Result<User, ApiError> {
        ensure_valid_id(id)?;

        sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, email, date_created, status, password
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| translate(e, ErrorContext::id(id)))
    }

    async fn find_by_email(&self, email: &str) -> Result<User, ApiError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, email, date_created, status, password
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| translate(e, ErrorContext::email(email)))
    }

    async fn update(&self, user: User) -> Result<User, ApiError> {
        ensure_valid_id(user.id)?;

        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET first_name = $2, last_name = $3, email = $4
            WHERE id = $1
            RETURNING id, first_name, last_name, email, date_created, status, password
            "#,
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| translate(e, ErrorContext::id(user.id).with_email(&user.email)))
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        ensure_valid_id(id)?;

        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| translate(e, ErrorContext::id(id)))?;

        if result.rows_affected() == 0 {
            return Err(translate(StoreError::RowNotFound, ErrorContext::id(id)));
        }
        Ok(())
    }

    async fn find_by_status(&self, status: &str) -> Result<Vec<User>, ApiError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, email, date_created, status, password
            FROM users
            WHERE status = $1
            ORDER BY id ASC
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| translate(e, ErrorContext::status(status)))?;

        if users.is_empty() {
            return Err(translate(StoreError::RowNotFound, ErrorContext::status(status)));
        }
        Ok(users)
    }
}
