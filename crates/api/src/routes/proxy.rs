use axum::routing::any;
use axum::Router;

use crate::handlers::proxy;
use crate::state::AppState;

/// Catch-all routes for the three forwarded services.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/gateway", any(proxy::gateway))
        .route("/gateway/{*rest}", any(proxy::gateway))
        .route("/reports", any(proxy::reports))
        .route("/reports/{*rest}", any(proxy::reports))
        .route("/files", any(proxy::files))
        .route("/files/{*rest}", any(proxy::files))
}
