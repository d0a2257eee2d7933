use serde::{Deserialize, Serialize};

/// JWT payload. `sub` carries the user id; `email` is a fallback lookup key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>, // user ID
    pub iat: i64, // issued at (unix timestamp)
    pub exp: i64, // expires at (unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}
