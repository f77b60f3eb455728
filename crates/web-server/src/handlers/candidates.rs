use crate::{
    auth::AdminUser,
    error::AppError,
    handlers::{PageWindow, Paginated},
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use core_types::CandidateStatus;
use database::{CandidateDetails, CandidateStats, InterestDetails, NewCandidate};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CandidateListQuery {
    pub status: Option<CandidateStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCandidateStatusRequest {
    pub status: CandidateStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewInterest {
    pub candidate_id: Uuid,
    pub pet_id: Uuid,
}

/// # GET /api/candidates
pub async fn list_candidates(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<CandidateListQuery>,
) -> Result<Json<Paginated<CandidateDetails>>, AppError> {
    let window = PageWindow::resolve(query.page, query.limit, &state.config.pagination);
    let (candidates, total) = state
        .db_repo
        .list_candidates(query.status, window.limit(), window.offset())
        .await?;
    Ok(Json(window.paginate(candidates, total)))
}

/// # GET /api/candidates/:id
pub async fn get_candidate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    _admin: AdminUser,
) -> Result<Json<CandidateDetails>, AppError> {
    let candidate = state.db_repo.get_candidate(id).await?;
    Ok(Json(candidate))
}

/// # POST /api/candidates
/// The public adoption form. An optional `pet_id` registers the
/// candidate's interest in that pet at the same time.
pub async fn create_candidate(
    State(state): State<Arc<AppState>>,
    Json(new_candidate): Json<NewCandidate>,
) -> Result<(StatusCode, Json<CandidateDetails>), AppError> {
    let candidate = state.db_repo.create_candidate(&new_candidate).await?;
    Ok((StatusCode::CREATED, Json(candidate)))
}

/// # PATCH /api/candidates/:id/status
/// Applies one evaluation to every interest the candidate holds.
pub async fn update_candidate_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    _admin: AdminUser,
    Json(request): Json<UpdateCandidateStatusRequest>,
) -> Result<Json<CandidateDetails>, AppError> {
    let candidate = state
        .db_repo
        .update_candidate_status(id, request.status, request.notes.as_deref())
        .await?;
    Ok(Json(candidate))
}

/// # POST /api/interests
/// Records a candidate's interest in a specific pet.
pub async fn create_interest(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewInterest>,
) -> Result<(StatusCode, Json<InterestDetails>), AppError> {
    let interest = state
        .db_repo
        .create_interest(request.candidate_id, request.pet_id)
        .await?;
    Ok((StatusCode::CREATED, Json(interest)))
}

/// # GET /api/candidates/stats
pub async fn candidate_stats(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<CandidateStats>, AppError> {
    let stats = state.db_repo.candidate_stats().await?;
    Ok(Json(stats))
}
