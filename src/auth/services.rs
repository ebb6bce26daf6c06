use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, error, warn};

use crate::auth::repo_types::User;
use crate::config::JwtConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// Characters satisfying the special-character password rule.
const PASSWORD_SPECIALS: &[char] = &['!', '@', '#', '?', ']'];

/// Validates and normalizes an email. Returns the trimmed, lowercased address.
pub fn validate_email(candidate: &str) -> Result<String, ApiError> {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^([A-Za-z0-9]+[._-])*[A-Za-z0-9]+@[A-Za-z0-9-]+(\.[A-Za-z]{2,})+$")
                .unwrap();
    }
    let email = candidate.trim().to_lowercase();
    if email.is_empty() {
        return Err(ApiError::MissingField("email"));
    }
    if !EMAIL_RE.is_match(&email) {
        return Err(ApiError::Validation("invalid email".into()));
    }
    Ok(email)
}

/// Password rule: at least 10 characters, one ASCII uppercase, one ASCII
/// lowercase and one of `! @ # ? ]`.
pub fn validate_password(candidate: &str) -> Result<(), ApiError> {
    if candidate.is_empty() {
        return Err(ApiError::MissingField("password"));
    }
    let long_enough = candidate.chars().count() >= 10;
    let has_upper = candidate.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = candidate.chars().any(|c| c.is_ascii_lowercase());
    let has_special = candidate.chars().any(|c| PASSWORD_SPECIALS.contains(&c));
    if !(long_enough && has_upper && has_lower && has_special) {
        return Err(ApiError::Validation(
            "password must be at least 10 characters and contain an uppercase letter, \
             a lowercase letter and one of ! @ # ? ]"
                .into(),
        ));
    }
    Ok(())
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Bearer-token payload: the subject is the account's normalized email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

/// Internal verification failure kinds. Callers collapse all of them into the
/// uniform unauthorized response; the distinction exists for logs and tests.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("bad signature")]
    BadSignature,
    #[error("malformed token")]
    Malformed,
}

/// JWT signing and verification keys derived from the process-wide secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: TimeDuration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::new(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl: TimeDuration::minutes(config.ttl_minutes),
        }
    }

    pub fn sign(&self, subject: &str) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: (now + self.ttl).unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(subject = %subject, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let validation = Validation::new(Algorithm::HS256);
        let data =
            decode::<Claims>(token, &self.decoding, &validation).map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            })?;
        debug!(subject = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

/// Resolved identity of the request. Handlers that take this extractor sit
/// behind the auth gate; anonymous endpoints simply do not ask for it.
/// Every request re-verifies the token, nothing is cached.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized)?;

        let claims = match keys.verify(token) {
            Ok(c) => c,
            Err(kind) => {
                warn!(%kind, "token rejected");
                return Err(ApiError::Unauthorized);
            }
        };

        // Subjects are stored normalized at issuance. An account that vanished
        // since then is an authentication failure, not a server fault.
        let user = User::find_by_email(&state.db, &claims.sub)
            .await?
            .ok_or_else(|| {
                warn!(subject = %claims.sub, "token subject has no account");
                ApiError::Unauthorized
            })?;

        Ok(CurrentUser(user))
    }
}

#[cfg(test)]
mod email_tests {
    use super::*;

    #[test]
    fn accepts_plain_and_segmented_addresses() {
        assert_eq!(validate_email("a@b.com").unwrap(), "a@b.com");
        assert_eq!(
            validate_email("first.last@example.co.uk").unwrap(),
            "first.last@example.co.uk"
        );
        assert_eq!(
            validate_email("user_name-1@sub-domain.org").unwrap(),
            "user_name-1@sub-domain.org"
        );
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(validate_email("  A@B.COM  ").unwrap(), "a@b.com");
    }

    #[test]
    fn empty_email_is_a_missing_field_not_a_format_error() {
        assert!(matches!(
            validate_email("   "),
            Err(ApiError::MissingField("email"))
        ));
    }

    #[test]
    fn rejects_bad_grammar() {
        for bad in [
            "plainaddress",
            "@no-local.com",
            "no-domain@",
            "a@b",
            "a@b.c",
            "spaced name@example.com",
            "a@@b.com",
        ] {
            assert!(
                matches!(validate_email(bad), Err(ApiError::Validation(_))),
                "{bad} should be rejected"
            );
        }
    }
}

#[cfg(test)]
mod password_tests {
    use super::*;

    #[test]
    fn accepts_a_compliant_password() {
        assert!(validate_password("Abcdefgh1!").is_ok());
        assert!(validate_password("Testpassword!").is_ok());
        assert!(validate_password("xxxxxxxxU]").is_ok());
    }

    #[test]
    fn empty_password_is_a_missing_field() {
        assert!(matches!(
            validate_password(""),
            Err(ApiError::MissingField("password"))
        ));
    }

    #[test]
    fn each_rule_clause_is_enforced() {
        // too short
        assert!(validate_password("Abc1!defg").is_err());
        // no uppercase
        assert!(validate_password("abcdefgh1!").is_err());
        // no lowercase
        assert!(validate_password("ABCDEFGH1!").is_err());
        // no special character
        assert!(validate_password("Abcdefgh12").is_err());
        // '$' is not in the allowed special set
        assert!(validate_password("Abcdefgh1$").is_err());
    }

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert_ne!(hash, password);
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hash = hash_password("Correct-horse1!").expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert!(!err.to_string().is_empty());
    }
}

#[cfg(test)]
mod jwt_tests {
    use super::*;

    fn make_keys(secret: &str, ttl_minutes: i64) -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: secret.into(),
            ttl_minutes,
        })
    }

    #[test]
    fn sign_and_verify_returns_the_subject() {
        let keys = make_keys("dev-secret", 5);
        let token = keys.sign("a@b.com").expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, "a@b.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_is_rejected_as_expired() {
        // Default validation leeway is 60s, so back-date well past it.
        let keys = make_keys("dev-secret", -180);
        let token = keys.sign("a@b.com").expect("sign");
        assert_eq!(keys.verify(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn wrong_secret_is_rejected_as_bad_signature() {
        let good = make_keys("secret-one", 5);
        let evil = make_keys("secret-two", 5);
        let token = good.sign("a@b.com").expect("sign");
        assert_eq!(evil.verify(&token).unwrap_err(), TokenError::BadSignature);
    }

    #[test]
    fn garbage_is_rejected_as_malformed() {
        let keys = make_keys("dev-secret", 5);
        assert_eq!(
            keys.verify("not-a-token").unwrap_err(),
            TokenError::Malformed
        );
        assert_eq!(keys.verify("").unwrap_err(), TokenError::Malformed);
    }
}

#[cfg(test)]
mod gate_tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<CurrentUser, ApiError> {
        let state = AppState::fake();
        let mut builder = Request::builder().uri("/api/movie");
        if let Some(value) = header {
            builder = builder.header(axum::http::header::AUTHORIZATION, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        CurrentUser::from_request_parts(&mut parts, &state).await
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        assert!(matches!(extract(None).await, Err(ApiError::Unauthorized)));
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_unauthorized() {
        let result = extract(Some("Basic dXNlcjpwYXNz")).await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }

    #[tokio::test]
    async fn invalid_token_is_unauthorized() {
        let result = extract(Some("Bearer garbage.token.here")).await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }

    #[tokio::test]
    async fn token_with_wrong_signature_is_unauthorized() {
        let foreign = JwtKeys::new(&JwtConfig {
            secret: "some-other-secret".into(),
            ttl_minutes: 5,
        });
        let token = foreign.sign("a@b.com").expect("sign");
        let result = extract(Some(&format!("Bearer {token}"))).await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }
}
