use authgate_db::models::role::Role;
use axum::extract::State;
use axum::Json;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/v1/roles -- every role with its permission names.
pub async fn list_roles(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<Json<Vec<Role>>> {
    Ok(Json(state.store.list_roles().await?))
}
