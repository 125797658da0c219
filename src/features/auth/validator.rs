use super::model::{AuthenticatedUser, CustomClaims};
use crate::core::error::AppError;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::jwks::JwksClient;

/// Verifies RS256 ID tokens against the identity provider's JWKS
pub struct JwtValidator {
    jwks_client: Arc<JwksClient>,
    issuer: String,
    audience: String,
    leeway: u64,
    admin_emails: Vec<String>,
}

/// Claims of an ID token. `iss`, `aud`, `exp` and `nbf` are checked by
/// `jsonwebtoken`; custom claims sit at the top level next to them.
#[derive(Debug, Clone, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    #[serde(flatten)]
    custom: CustomClaims,
}

impl Claims {
    fn into_user(self, admin_emails: &[String]) -> Result<AuthenticatedUser, AppError> {
        if self.sub.is_empty() {
            return Err(AppError::Auth("Token has an empty subject".to_string()));
        }

        let roles =
            self.custom
                .resolve_roles(self.email.as_deref(), self.email_verified, admin_emails);

        Ok(AuthenticatedUser {
            uid: self.sub,
            email: self.email,
            email_verified: self.email_verified,
            roles,
        })
    }
}

impl JwtValidator {
    pub fn new(
        jwks_client: Arc<JwksClient>,
        issuer: String,
        audience: String,
        leeway: Duration,
        admin_emails: Vec<String>,
    ) -> Self {
        Self {
            jwks_client,
            issuer,
            audience,
            leeway: leeway.as_secs(),
            admin_emails,
        }
    }

    pub async fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let header = decode_header(token).map_err(|e| AppError::Auth(e.to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(AppError::Auth(format!(
                "Unsupported algorithm: {:?}. Only RS256 is allowed",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| AppError::Auth("Missing kid in token header".to_string()))?;

        let decoding_key = self
            .jwks_client
            .get_key(&kid)
            .await
            .map_err(|e| AppError::Auth(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.leeway = self.leeway;
        validation.validate_nbf = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| AppError::Auth(e.to_string()))?;

        token_data.claims.into_user(&self.admin_emails)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: serde_json::Value) -> Claims {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_firebase_admin_claim_maps_to_admin_user() {
        let user = claims(json!({
            "sub": "uid-1",
            "email": "staff@example.jp",
            "email_verified": true,
            "admin": true,
            "firebase": { "sign_in_provider": "password" }
        }))
        .into_user(&[])
        .unwrap();

        assert_eq!(user.uid, "uid-1");
        assert!(user.is_admin());
    }

    #[test]
    fn test_plain_user_is_not_admin() {
        let user = claims(json!({ "sub": "uid-2", "email": "someone@example.jp" }))
            .into_user(&["owner@example.jp".to_string()])
            .unwrap();

        assert!(!user.is_admin());
        assert!(!user.email_verified);
    }

    #[test]
    fn test_empty_subject_is_rejected() {
        let result = claims(json!({ "sub": "" })).into_user(&[]);
        assert!(matches!(result, Err(AppError::Auth(_))));
    }

    #[tokio::test]
    async fn test_garbage_token_is_rejected_before_fetching_keys() {
        let validator = JwtValidator::new(
            Arc::new(JwksClient::new(
                "http://127.0.0.1:1/jwks",
                Duration::from_secs(60),
            )),
            "https://securetoken.google.com/demo".to_string(),
            "demo".to_string(),
            Duration::from_secs(0),
            vec![],
        );

        let result = validator.validate_token("not-a-jwt").await;
        assert!(matches!(result, Err(AppError::Auth(_))));
    }
}
