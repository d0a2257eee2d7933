use sqlx::{FromRow, PgConnection};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::StoreResult;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String, // Argon2 digest, never exposed
    pub is_active: bool,
    pub is_superuser: bool,
    pub created_at: OffsetDateTime,
    pub last_login_at: Option<OffsetDateTime>,
}

const USER_COLUMNS: &str =
    "id, email, password_hash, is_active, is_superuser, created_at, last_login_at";

impl User {
    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;
        Ok(user)
    }

    /// Lookup by already-normalized (lowercase) email.
    pub async fn find_by_email(conn: &mut PgConnection, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(conn)
        .await?;
        Ok(user)
    }

    /// Inserts a new active user. A concurrent registration of the same email
    /// surfaces as `StoreError::UniqueViolation`.
    pub async fn create(
        conn: &mut PgConnection,
        email: &str,
        password_hash: &str,
    ) -> StoreResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .fetch_one(conn)
        .await?;
        Ok(user)
    }

    pub async fn touch_last_login(
        conn: &mut PgConnection,
        id: Uuid,
        at: OffsetDateTime,
    ) -> StoreResult<()> {
        sqlx::query("UPDATE users SET last_login_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(conn)
            .await?;
        Ok(())
    }
}
