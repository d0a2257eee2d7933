use sqlx::{Connection, PgConnection};
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use super::claims::Claims;
use super::dto::{is_valid_email, normalize_email};
use super::password::{hash_password, is_strong_enough, verify_password};
use super::repo::User;
use crate::db::StoreError;
use crate::error::ApiError;

/// Checks applied before any storage access. Returns the normalized email.
pub fn validate_registration(email: &str, password: &str) -> Result<String, ApiError> {
    let email = normalize_email(email);
    if !is_valid_email(&email) {
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if !is_strong_enough(password) {
        return Err(ApiError::WeakPassword);
    }
    Ok(email)
}

/// Inserts a new user. Both the pre-check and a unique violation from a
/// concurrent insert report `Conflict`.
pub async fn register_user(
    conn: &mut PgConnection,
    email: &str,
    password: &str,
) -> Result<User, ApiError> {
    if User::find_by_email(conn, email).await?.is_some() {
        warn!(%email, "email already registered");
        return Err(email_taken());
    }

    let digest = hash_password(password)?;

    let mut tx = conn.begin().await?;
    let user = match User::create(&mut *tx, email, &digest).await {
        Ok(u) => u,
        Err(StoreError::UniqueViolation) => {
            warn!(%email, "email registered concurrently");
            return Err(email_taken());
        }
        Err(e) => return Err(e.into()),
    };
    tx.commit().await?;

    info!(user_id = %user.id, %email, "user registered");
    Ok(user)
}

fn email_taken() -> ApiError {
    ApiError::Conflict("Email already registered".into())
}

/// Verifies credentials and stamps `last_login_at`. Unknown email and wrong
/// password produce the same error.
pub async fn authenticate(
    conn: &mut PgConnection,
    email: &str,
    password: &str,
) -> Result<User, ApiError> {
    let Some(mut user) = User::find_by_email(conn, email).await? else {
        warn!(%email, "login for unknown email");
        return Err(ApiError::InvalidCredentials);
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = %user.id, "login with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let now = OffsetDateTime::now_utc();
    let mut tx = conn.begin().await?;
    User::touch_last_login(&mut *tx, user.id, now).await?;
    tx.commit().await?;
    user.last_login_at = Some(now);

    info!(user_id = %user.id, "user logged in");
    Ok(user)
}

/// Who a verified token names. At least one of the two is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimKeys<'a> {
    pub subject: Option<&'a str>,
    pub email: Option<&'a str>,
}

/// Checks the claim shape without touching storage.
pub fn lookup_keys(claims: &Claims) -> Result<ClaimKeys<'_>, ApiError> {
    let subject = claims.sub.as_deref().filter(|s| !s.is_empty());
    let email = claims.email.as_deref().filter(|s| !s.is_empty());
    if subject.is_none() && email.is_none() {
        return Err(ApiError::MalformedPayload);
    }
    Ok(ClaimKeys { subject, email })
}

/// Resolves the caller: id first, then email.
pub async fn resolve_user(conn: &mut PgConnection, keys: ClaimKeys<'_>) -> Result<User, ApiError> {
    let mut user = None;
    if let Some(id) = keys.subject.and_then(|s| Uuid::parse_str(s).ok()) {
        user = User::find_by_id(conn, id).await?;
    }
    if user.is_none() {
        if let Some(email) = keys.email {
            user = User::find_by_email(conn, &normalize_email(email)).await?;
        }
    }

    let user = user.ok_or(ApiError::UserNotFound)?;
    if !user.is_active {
        warn!(user_id = %user.id, "inactive account presented a token");
        return Err(ApiError::AccountInactive);
    }
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_rejects_short_passwords() {
        assert!(matches!(
            validate_registration("a@x.com", "short"),
            Err(ApiError::WeakPassword)
        ));
    }

    #[test]
    fn registration_rejects_bad_email_first() {
        assert!(matches!(
            validate_registration("nope", "short"),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn registration_normalizes_email() {
        assert_eq!(
            validate_registration(" A@X.com ", "longenough").unwrap(),
            "a@x.com"
        );
    }

    fn claims(sub: Option<&str>, email: Option<&str>) -> Claims {
        Claims {
            sub: sub.map(str::to_string),
            iat: 0,
            exp: 0,
            email: email.map(str::to_string),
        }
    }

    #[test]
    fn claims_naming_nobody_are_malformed() {
        assert!(matches!(lookup_keys(&claims(None, None)), Err(ApiError::MalformedPayload)));
        assert!(matches!(
            lookup_keys(&claims(Some(""), Some(""))),
            Err(ApiError::MalformedPayload)
        ));
    }

    #[test]
    fn either_claim_is_enough_to_look_up() {
        let only_email = claims(None, Some("a@x.com"));
        assert_eq!(
            lookup_keys(&only_email).unwrap(),
            ClaimKeys { subject: None, email: Some("a@x.com") }
        );
        let only_sub = claims(Some("not-a-uuid"), Some(""));
        assert_eq!(
            lookup_keys(&only_sub).unwrap(),
            ClaimKeys { subject: Some("not-a-uuid"), email: None }
        );
    }
}
