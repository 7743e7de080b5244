//! Search endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::Result;
use crate::models::*;
use crate::services::auth::now_ms;
use crate::AppState;

/// GET /api/search?q=
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>> {
    Ok(Json(state.search.search(&query.q).await?))
}

/// DELETE /api/admin/search-cache
pub async fn purge_cache(State(state): State<AppState>) -> Result<Json<PurgeResponse>> {
    let purged = state.db.purge_expired_cache(now_ms())?;
    tracing::info!(purged, "Purged expired search cache entries");
    Ok(Json(PurgeResponse { purged }))
}
