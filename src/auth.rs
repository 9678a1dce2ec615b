use std::sync::Arc;

use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use sha2::{Digest, Sha256};

use crate::config::AuthConfig;
use crate::error::ApiError;

/// Decides whether a request may use the admin routes.
pub trait AdminVerifier: Send + Sync {
    /// `bearer` is the token from `Authorization: Bearer <token>`, if any.
    fn verify(&self, bearer: Option<&str>) -> bool;
}

/// Approves everything. Only for local setups and tests.
pub struct AllowAll;

impl AdminVerifier for AllowAll {
    fn verify(&self, _bearer: Option<&str>) -> bool {
        true
    }
}

/// Accepts one configured token. Only its SHA-256 digest is kept in memory.
pub struct StaticToken {
    digest: String,
}

impl StaticToken {
    pub fn new(token: &str) -> Self {
        StaticToken {
            digest: hash_token(token),
        }
    }
}

impl AdminVerifier for StaticToken {
    fn verify(&self, bearer: Option<&str>) -> bool {
        match bearer {
            Some(token) if !token.is_empty() => hash_token(token) == self.digest,
            _ => false,
        }
    }
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Pick the verifier for the configured auth section.
pub fn verifier_from_config(config: &AuthConfig) -> Arc<dyn AdminVerifier> {
    match config.admin_token.as_deref().filter(|t| !t.is_empty()) {
        Some(token) => Arc::new(StaticToken::new(token)),
        None => Arc::new(AllowAll),
    }
}

fn bearer_token(header: Option<&str>) -> Option<&str> {
    let value = header?.trim();
    let (scheme, token) = value.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
}

// ── Admin request guard ──

/// Guard: request passed the managed `AdminVerifier`.
pub struct AdminUser;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminUser {
    type Error = ApiError;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let verifier = match request.rocket().state::<Arc<dyn AdminVerifier>>() {
            Some(v) => v,
            None => {
                return Outcome::Error((
                    Status::InternalServerError,
                    ApiError::Internal("no AdminVerifier is managed".to_string()),
                ))
            }
        };

        let token = bearer_token(request.headers().get_one("Authorization"));
        if verifier.verify(token) {
            Outcome::Success(AdminUser)
        } else {
            Outcome::Error((Status::Unauthorized, ApiError::Unauthorized))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_all_accepts_anything() {
        assert!(AllowAll.verify(None));
        assert!(AllowAll.verify(Some("whatever")));
    }

    #[test]
    fn static_token_matches_exactly() {
        let v = StaticToken::new("s3cret");
        assert!(v.verify(Some("s3cret")));
        assert!(!v.verify(Some("s3cret ")));
        assert!(!v.verify(Some("")));
        assert!(!v.verify(None));
    }

    #[test]
    fn bearer_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(Some("bearer  abc ")), Some("abc"));
        assert_eq!(bearer_token(Some("Basic abc")), None);
        assert_eq!(bearer_token(Some("abc")), None);
        assert_eq!(bearer_token(None), None);
    }

    #[test]
    fn config_selects_verifier() {
        let open = verifier_from_config(&AuthConfig::default());
        assert!(open.verify(None));

        let locked = verifier_from_config(&AuthConfig {
            admin_token: Some("tok".to_string()),
        });
        assert!(!locked.verify(None));
        assert!(locked.verify(Some("tok")));
    }
}
