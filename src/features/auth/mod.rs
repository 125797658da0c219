//! Admin authentication.
//!
//! Admin console requests carry a bearer ID token issued by the identity
//! provider (Firebase Authentication in production). The token is verified
//! against the provider's JWKS and turned into an [`model::AuthenticatedUser`].
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/admin/me` | Admin | Current admin identity |

mod jwks;
mod validator;

pub mod guards;
pub mod handlers;
pub mod model;
pub mod routes;

pub use jwks::JwksClient;
pub use validator::JwtValidator;
