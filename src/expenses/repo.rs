use sqlx::PgConnection;
use uuid::Uuid;

use super::repo_types::{Expense, NewExpense};
use crate::db::StoreResult;

const EXPENSE_COLUMNS: &str = "id, user_id, currency_id, amount, category, vendor, created_at";

pub struct ListFilter<'a> {
    pub category: Option<&'a str>,
    pub limit: i64,
    pub offset: i64,
}

/// Caller's expenses in creation order.
pub async fn list_by_user(
    conn: &mut PgConnection,
    user_id: Uuid,
    filter: &ListFilter<'_>,
) -> StoreResult<Vec<Expense>> {
    let rows = sqlx::query_as::<_, Expense>(&format!(
        r#"
        SELECT {EXPENSE_COLUMNS}
          FROM expenses
         WHERE user_id = $1
           AND ($2::text IS NULL OR category = $2)
         ORDER BY created_at ASC, id ASC
         LIMIT $3 OFFSET $4
        "#
    ))
    .bind(user_id)
    .bind(filter.category)
    .bind(filter.limit)
    .bind(filter.offset)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

/// Fetches an expense only if `user_id` owns it. A foreign id and a missing
/// id are indistinguishable.
pub async fn get_owned(
    conn: &mut PgConnection,
    user_id: Uuid,
    expense_id: Uuid,
) -> StoreResult<Option<Expense>> {
    let row = sqlx::query_as::<_, Expense>(&format!(
        "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = $1 AND user_id = $2"
    ))
    .bind(expense_id)
    .bind(user_id)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

/// Same as [`get_owned`] but locks the row for the rest of the transaction.
pub async fn get_owned_for_update(
    conn: &mut PgConnection,
    user_id: Uuid,
    expense_id: Uuid,
) -> StoreResult<Option<Expense>> {
    let row = sqlx::query_as::<_, Expense>(&format!(
        "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = $1 AND user_id = $2 FOR UPDATE"
    ))
    .bind(expense_id)
    .bind(user_id)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

pub async fn insert(
    conn: &mut PgConnection,
    user_id: Uuid,
    new: &NewExpense,
) -> StoreResult<Expense> {
    let row = sqlx::query_as::<_, Expense>(&format!(
        r#"
        INSERT INTO expenses (id, user_id, currency_id, amount, category, vendor)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {EXPENSE_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&new.currency_id)
    .bind(new.amount)
    .bind(&new.category)
    .bind(&new.vendor)
    .fetch_one(conn)
    .await?;
    Ok(row)
}

/// Writes the mutable fields of `expense` back. Owner and id are match keys only.
pub async fn update(conn: &mut PgConnection, expense: &Expense) -> StoreResult<Expense> {
    let row = sqlx::query_as::<_, Expense>(&format!(
        r#"
        UPDATE expenses
           SET amount = $3, category = $4, vendor = $5, currency_id = $6
         WHERE id = $1 AND user_id = $2
        RETURNING {EXPENSE_COLUMNS}
        "#
    ))
    .bind(expense.id)
    .bind(expense.user_id)
    .bind(expense.amount)
    .bind(&expense.category)
    .bind(&expense.vendor)
    .bind(&expense.currency_id)
    .fetch_one(conn)
    .await?;
    Ok(row)
}

/// Returns whether a row owned by `user_id` was removed.
pub async fn delete_owned(
    conn: &mut PgConnection,
    user_id: Uuid,
    expense_id: Uuid,
) -> StoreResult<bool> {
    let res = sqlx::query("DELETE FROM expenses WHERE id = $1 AND user_id = $2")
        .bind(expense_id)
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(res.rows_affected() > 0)
}
