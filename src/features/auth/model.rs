use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::ROLE_ADMIN;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Identity provider user id (`sub` claim)
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub email_verified: bool,
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Admins can review intake responses and edit news/blog content
    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }
}

/// Role claims as set through custom claims on the identity provider
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomClaims {
    /// Firebase-style boolean claim: `{ "admin": true }`
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl CustomClaims {
    /// Resolve the role list, granting admin to allow-listed verified emails
    pub fn resolve_roles(
        &self,
        email: Option<&str>,
        email_verified: bool,
        admin_emails: &[String],
    ) -> Vec<String> {
        let mut roles = self.roles.clone();
        let allow_listed = email_verified
            && email.is_some_and(|e| admin_emails.iter().any(|a| a.eq_ignore_ascii_case(e)));

        if (self.admin || allow_listed) && !roles.iter().any(|r| r == ROLE_ADMIN) {
            roles.push(ROLE_ADMIN.to_string());
        }
        roles
    }
}
