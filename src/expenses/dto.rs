use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Expense, ExpensePatch, NewExpense};
use crate::currencies::normalize_currency_code;
use crate::error::ApiError;

pub const MAX_PAGE_SIZE: i64 = 100;
const MAX_CATEGORY_LEN: usize = 50;
const MAX_VENDOR_LEN: usize = 100;

#[derive(Debug, Deserialize)]
pub struct ExpenseCreate {
    pub amount: Decimal,
    pub category: String,
    pub vendor: String,
    pub currency_id: String,
}

impl ExpenseCreate {
    pub fn validate(self) -> Result<NewExpense, ApiError> {
        Ok(NewExpense {
            amount: validate_amount(self.amount)?,
            category: normalize_category(&self.category)?,
            vendor: normalize_vendor(&self.vendor)?,
            currency_id: normalize_currency_code(&self.currency_id)?,
        })
    }
}

/// Partial update body. Absent or `null` fields are left unchanged; unknown
/// fields are rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpenseUpdate {
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub vendor: Option<String>,
    pub currency_id: Option<String>,
}

impl ExpenseUpdate {
    pub fn validate(self) -> Result<ExpensePatch, ApiError> {
        Ok(ExpensePatch {
            amount: self.amount.map(validate_amount).transpose()?,
            category: self.category.as_deref().map(normalize_category).transpose()?,
            vendor: self.vendor.as_deref().map(normalize_vendor).transpose()?,
            currency_id: self
                .currency_id
                .as_deref()
                .map(normalize_currency_code)
                .transpose()?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ExpenseResponse {
    pub id: Uuid,
    pub amount: Decimal,
    pub category: String,
    pub vendor: String,
    pub currency_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Expense> for ExpenseResponse {
    fn from(e: Expense) -> Self {
        Self {
            id: e.id,
            amount: e.amount,
            category: e.category,
            vendor: e.vendor,
            currency_id: e.currency_id,
            created_at: e.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub category: Option<String>,
}

fn default_limit() -> i64 {
    MAX_PAGE_SIZE
}

impl ListQuery {
    /// Checks paging bounds and returns the normalized category filter.
    pub fn validate(&self) -> Result<Option<String>, ApiError> {
        if self.offset < 0 {
            return Err(ApiError::Validation("offset must be >= 0".into()));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.limit) {
            return Err(ApiError::Validation(format!(
                "limit must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        self.category.as_deref().map(normalize_category).transpose()
    }
}

fn validate_amount(amount: Decimal) -> Result<Decimal, ApiError> {
    if amount > Decimal::ZERO {
        Ok(amount)
    } else {
        Err(ApiError::Validation("amount must be greater than 0".into()))
    }
}

/// Trimmed and lowercased; idempotent.
pub fn normalize_category(raw: &str) -> Result<String, ApiError> {
    let category = raw.trim().to_lowercase();
    check_len("category", &category, MAX_CATEGORY_LEN)?;
    Ok(category)
}

pub fn normalize_vendor(raw: &str) -> Result<String, ApiError> {
    let vendor = raw.trim().to_string();
    check_len("vendor", &vendor, MAX_VENDOR_LEN)?;
    Ok(vendor)
}

fn check_len(field: &str, value: &str, max: usize) -> Result<(), ApiError> {
    let len = value.chars().count();
    if len == 0 || len > max {
        return Err(ApiError::Validation(format!(
            "{field} must be between 1 and {max} characters"
        )));
    }
    Ok(())
}
