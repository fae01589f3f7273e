//! User queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use wayfarer_core::{Email, NewUser, User, UserId};

use super::{PgStore, classify, corrupt};
use crate::db::{Entity, StoreError, StoreResult, UserStore};

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    password_hash: String,
    is_superuser: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| corrupt("app_user", row.id, e))?;

        Ok(Self {
            id: UserId::new(row.id),
            username: row.username,
            email,
            first_name: row.first_name,
            last_name: row.last_name,
            password_hash: row.password_hash,
            is_superuser: row.is_superuser,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO app_user (
                username, email, first_name, last_name, password_hash, is_superuser
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            ",
        )
        .bind(&new.username)
        .bind(new.email.as_str())
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.password_hash)
        .bind(new.is_superuser)
        .fetch_one(self.pool())
        .await
        .map_err(classify)?;

        row.try_into()
    }

    async fn get_user(&self, id: UserId) -> StoreResult<User> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM app_user WHERE id = $1")
            .bind(id.as_i32())
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| StoreError::not_found(Entity::User, id))?
            .try_into()
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM app_user WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(Entity::User, id));
        }
        Ok(())
    }
}
