use axum::{
    async_trait,
    extract::{FromRequestParts, Path, State},
    http::{request::Parts, StatusCode},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult, EngineResult};
use crate::middleware::request_id::RequestId;
use crate::models::{
    ContentBasedRecommendations, Recommendation, SoulmateComparison, TasteReport,
    UserBasedRecommendations, UserId, UserProfile,
};
use crate::services::{explorer, Recommender};

use super::AppState;

// Request/Response types

/// User id taken from the path; a malformed id is reported as invalid input
pub struct UserPath(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for UserPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(user_id) = Path::<UserId>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::InvalidInput(e.body_text()))?;
        Ok(UserPath(user_id))
    }
}

#[derive(Debug, Serialize)]
pub struct DatasetSummary {
    pub movies: usize,
    pub ratings: usize,
    pub users: usize,
    pub orphan_ratings: usize,
    pub duplicate_ratings: usize,
    pub min_votes: usize,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ItemBasedResponse {
    pub user_id: UserId,
    pub recommendations: Vec<Recommendation>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Size of the loaded dataset
pub async fn dataset_summary(State(state): State<AppState>) -> Json<DatasetSummary> {
    let dataset = state.dataset();
    Json(DatasetSummary {
        movies: dataset.movie_count(),
        ratings: dataset.rating_count(),
        users: dataset.user_count(),
        orphan_ratings: dataset.orphan_ratings(),
        duplicate_ratings: dataset.duplicate_ratings(),
        min_votes: state.inner.settings.min_votes,
        loaded_at: state.inner.loaded_at,
    })
}

/// All user ids, ascending
pub async fn list_users(State(state): State<AppState>) -> Json<Vec<UserId>> {
    Json(state.dataset().user_ids().collect())
}

/// Taste twin of a user with the side-by-side comparison
pub async fn soulmate(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    UserPath(user_id): UserPath,
) -> AppResult<Json<SoulmateComparison>> {
    tracing::info!(request_id = %request_id, user_id, "Finding soulmate");
    let comparison = run_engine(state, move |r| explorer::soulmate(r, user_id)).await?;
    Ok(Json(comparison))
}

pub async fn user_based(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    UserPath(user_id): UserPath,
) -> AppResult<Json<UserBasedRecommendations>> {
    tracing::info!(request_id = %request_id, user_id, "Processing user-based recommendations");
    let recommendations = run_engine(state, move |r| r.user_based(user_id)).await?;
    Ok(Json(recommendations))
}

pub async fn item_based(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    UserPath(user_id): UserPath,
) -> AppResult<Json<ItemBasedResponse>> {
    tracing::info!(request_id = %request_id, user_id, "Processing item-based recommendations");
    let recommendations = state.recommender().item_based(user_id)?;
    Ok(Json(ItemBasedResponse {
        user_id,
        recommendations,
    }))
}

pub async fn content_based(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    UserPath(user_id): UserPath,
) -> AppResult<Json<ContentBasedRecommendations>> {
    tracing::info!(request_id = %request_id, user_id, "Processing content-based recommendations");
    let recommendations = state.recommender().content_based(user_id)?;
    Ok(Json(recommendations))
}

pub async fn profile(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    UserPath(user_id): UserPath,
) -> AppResult<Json<UserProfile>> {
    tracing::info!(request_id = %request_id, user_id, "Building profile");
    let profile = state.recommender().profile(user_id)?;
    Ok(Json(profile))
}

/// Everything at once: soulmate, three recommendation lists, profile
pub async fn report(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    UserPath(user_id): UserPath,
) -> AppResult<Json<TasteReport>> {
    tracing::info!(request_id = %request_id, user_id, "Processing taste report");
    let report = run_engine(state, move |r| explorer::explore(r, user_id)).await?;
    Ok(Json(report))
}

/// Runs a similarity-heavy engine call on the blocking pool
async fn run_engine<T, F>(state: AppState, f: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce(&Recommender<'_>) -> EngineResult<T> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || f(&state.recommender()))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Engine task join error");
            AppError::Internal(e.to_string())
        })?;
    Ok(result?)
}
