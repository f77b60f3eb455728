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
use core_types::AdoptionStatus;
use database::{AdoptionDetails, AdoptionStats, FinalizeAdoption};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct AdoptionListQuery {
    pub status: Option<AdoptionStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAdoptionStatusRequest {
    pub status: AdoptionStatus,
    pub notes: Option<String>,
}

/// # GET /api/adoptions
pub async fn list_adoptions(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<AdoptionListQuery>,
) -> Result<Json<Paginated<AdoptionDetails>>, AppError> {
    let window = PageWindow::resolve(query.page, query.limit, &state.config.pagination);
    let (adoptions, total) = state
        .db_repo
        .list_adoptions(query.status, window.limit(), window.offset())
        .await?;
    Ok(Json(window.paginate(adoptions, total)))
}

/// # GET /api/adoptions/:id
pub async fn get_adoption(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    _admin: AdminUser,
) -> Result<Json<AdoptionDetails>, AppError> {
    let adoption = state.db_repo.get_adoption(id).await?;
    Ok(Json(adoption))
}

/// # GET /api/adoptions/candidate/:candidate_id
pub async fn adoptions_for_candidate(
    State(state): State<Arc<AppState>>,
    Path(candidate_id): Path<Uuid>,
    _admin: AdminUser,
) -> Result<Json<Vec<AdoptionDetails>>, AppError> {
    let adoptions = state.db_repo.adoptions_for_candidate(candidate_id).await?;
    Ok(Json(adoptions))
}

/// # POST /api/adoptions
/// Finalizes an adoption. The repository runs the whole transition — new
/// adoption row, pet marked adopted, competing interests settled — as one
/// transaction.
pub async fn finalize_adoption(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(request): Json<FinalizeAdoption>,
) -> Result<(StatusCode, Json<AdoptionDetails>), AppError> {
    let adoption = state.db_repo.finalize_adoption(&request).await?;
    Ok((StatusCode::CREATED, Json(adoption)))
}

/// # PATCH /api/adoptions/:id/status
/// Cancelling or returning an adoption puts the pet back up for adoption;
/// interests rejected at finalize time stay rejected.
pub async fn update_adoption_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    _admin: AdminUser,
    Json(request): Json<UpdateAdoptionStatusRequest>,
) -> Result<Json<AdoptionDetails>, AppError> {
    let adoption = state
        .db_repo
        .update_adoption_status(id, request.status, request.notes.as_deref())
        .await?;
    Ok(Json(adoption))
}

/// # GET /api/adoptions/stats
pub async fn adoption_stats(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<AdoptionStats>, AppError> {
    let stats = state.db_repo.adoption_stats().await?;
    Ok(Json(stats))
}
