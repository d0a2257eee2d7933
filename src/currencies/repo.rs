use sqlx::{FromRow, PgConnection};

use crate::db::StoreResult;

#[derive(Debug, Clone, FromRow)]
pub struct Currency {
    pub currency_id: String,
    pub name: String,
    pub is_active: bool,
}

pub async fn list_active(conn: &mut PgConnection) -> StoreResult<Vec<Currency>> {
    let rows = sqlx::query_as::<_, Currency>(
        r#"
        SELECT currency_id, name, is_active
          FROM currencies
         WHERE is_active
         ORDER BY currency_id
        "#,
    )
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

pub async fn get(conn: &mut PgConnection, currency_id: &str) -> StoreResult<Option<Currency>> {
    let row = sqlx::query_as::<_, Currency>(
        "SELECT currency_id, name, is_active FROM currencies WHERE currency_id = $1",
    )
    .bind(currency_id)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

pub async fn insert(conn: &mut PgConnection, currency: &Currency) -> StoreResult<Currency> {
    let row = sqlx::query_as::<_, Currency>(
        r#"
        INSERT INTO currencies (currency_id, name, is_active)
        VALUES ($1, $2, $3)
        RETURNING currency_id, name, is_active
        "#,
    )
    .bind(&currency.currency_id)
    .bind(&currency.name)
    .bind(currency.is_active)
    .fetch_one(conn)
    .await?;
    Ok(row)
}
