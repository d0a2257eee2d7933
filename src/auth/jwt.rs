use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};

use super::claims::Claims;
use crate::config::JwtConfig;
use crate::error::ApiError;

/// Signing and verification keys derived from the configured secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    default_ttl: Duration,
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            algorithm: cfg.algorithm,
            default_ttl: Duration::minutes(cfg.ttl_minutes),
        }
    }

    /// Signs `{sub, iat, exp, email?}`. `ttl` falls back to the configured
    /// token lifetime.
    pub fn issue(
        &self,
        subject: &str,
        email: Option<&str>,
        ttl: Option<Duration>,
    ) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + ttl.unwrap_or(self.default_ttl);
        let claims = Claims {
            sub: Some(subject.to_string()),
            iat: now.unix_timestamp(),
            exp: exp.unix_timestamp(),
            email: email.map(str::to_string),
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)?;
        debug!(sub = %subject, "jwt signed");
        Ok(token)
    }

    /// Verifies signature and expiry. Every failure is reported as
    /// `InvalidToken`, whatever the underlying cause.
    pub fn decode(&self, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::new(self.algorithm);
        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => {
                warn!(reason = ?e.kind(), "jwt rejected");
                Err(ApiError::InvalidToken)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str) -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: secret.into(),
            algorithm: Algorithm::HS256,
            ttl_minutes: 5,
        })
    }

    #[test]
    fn issue_and_decode_round_trip() {
        let keys = make_keys("dev-secret");
        let token = keys
            .issue("0f0e3c7a-1111-4a5b-9c9d-2b2b2b2b2b2b", Some("a@x.com"), None)
            .expect("sign");
        let claims = keys.decode(&token).expect("decode");
        assert_eq!(claims.sub.as_deref(), Some("0f0e3c7a-1111-4a5b-9c9d-2b2b2b2b2b2b"));
        assert_eq!(claims.email.as_deref(), Some("a@x.com"));
        assert_eq!(claims.exp - claims.iat, 5 * 60);
    }

    #[test]
    fn email_claim_is_omitted_when_absent() {
        let keys = make_keys("dev-secret");
        let token = keys.issue("42", None, None).expect("sign");
        let claims = keys.decode(&token).expect("decode");
        assert_eq!(claims.email, None);
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = make_keys("dev-secret");
        let token = keys
            .issue("42", None, Some(Duration::minutes(-10)))
            .expect("sign");
        assert!(matches!(keys.decode(&token), Err(ApiError::InvalidToken)));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let keys = make_keys("dev-secret");
        let token = keys.issue("42", None, None).expect("sign");
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let forged = encode(
            &Header::new(Algorithm::HS256),
            &Claims {
                sub: Some("43".into()),
                iat: 0,
                exp: i64::MAX / 2,
                email: None,
            },
            &EncodingKey::from_secret(b"other"),
        )
        .expect("sign forged");
        parts[1] = forged.split('.').nth(1).expect("payload").to_string();
        let tampered = parts.join(".");
        assert!(matches!(keys.decode(&tampered), Err(ApiError::InvalidToken)));
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let token = make_keys("secret-a").issue("42", None, None).expect("sign");
        assert!(matches!(make_keys("secret-b").decode(&token), Err(ApiError::InvalidToken)));
    }

    #[test]
    fn garbage_is_rejected() {
        let keys = make_keys("dev-secret");
        assert!(matches!(keys.decode("not.a.jwt"), Err(ApiError::InvalidToken)));
        assert!(matches!(keys.decode(""), Err(ApiError::InvalidToken)));
    }
}
