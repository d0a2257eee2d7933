use serde::{Deserialize, Serialize};

use super::repo::Currency;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CurrencyCreate {
    pub currency_id: String,
    pub name: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl CurrencyCreate {
    pub fn validate(self) -> Result<Currency, ApiError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ApiError::Validation("name must not be empty".into()));
        }
        Ok(Currency {
            currency_id: normalize_currency_code(&self.currency_id)?,
            name: name.to_string(),
            is_active: self.is_active,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct CurrencyResponse {
    pub currency_id: String,
    pub name: String,
    pub is_active: bool,
}

impl From<Currency> for CurrencyResponse {
    fn from(c: Currency) -> Self {
        Self {
            currency_id: c.currency_id,
            name: c.name,
            is_active: c.is_active,
        }
    }
}

/// ISO 4217 code: three ASCII letters, stored uppercase.
pub fn normalize_currency_code(raw: &str) -> Result<String, ApiError> {
    let code = raw.trim().to_ascii_uppercase();
    if code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(code)
    } else {
        Err(ApiError::Validation(format!(
            "currency_id must be a 3-letter ISO 4217 code, got {raw:?}"
        )))
    }
}
