use axum::Json;

use crate::core::error::Result;
use crate::features::auth::guards::RequireAdmin;
use crate::features::auth::model::AuthenticatedUser;
use crate::shared::types::ApiResponse;

/// Current admin identity, used by the admin console to check its session
#[utoipa::path(
    get,
    path = "/api/admin/me",
    responses(
        (status = 200, description = "Authenticated admin", body = ApiResponse<AuthenticatedUser>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin access required")
    ),
    tag = "auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(
    RequireAdmin(user): RequireAdmin,
) -> Result<Json<ApiResponse<AuthenticatedUser>>> {
    Ok(Json(ApiResponse::success(Some(user), None, None)))
}
