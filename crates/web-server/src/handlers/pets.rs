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
use core_types::{PetStatus, Sex, Size, Species};
use database::{NewPet, PetFilter, PetStats, PetUpdate, PetWithImages};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct PetListQuery {
    pub species: Option<Species>,
    pub status: Option<PetStatus>,
    pub size: Option<Size>,
    pub sex: Option<Sex>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePetStatusRequest {
    pub status: PetStatus,
}

/// # GET /api/pets
/// Public listing with filters and pagination.
pub async fn list_pets(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PetListQuery>,
) -> Result<Json<Paginated<PetWithImages>>, AppError> {
    let window = PageWindow::resolve(query.page, query.limit, &state.config.pagination);
    let filter = PetFilter {
        species: query.species,
        status: query.status,
        size: query.size,
        sex: query.sex,
    };
    let (pets, total) = state
        .db_repo
        .list_pets(&filter, window.limit(), window.offset())
        .await?;
    Ok(Json(window.paginate(pets, total)))
}

/// # GET /api/pets/:id
pub async fn get_pet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<PetWithImages>, AppError> {
    let pet = state.db_repo.get_pet(id).await?;
    Ok(Json(pet))
}

/// # POST /api/pets
/// Registers a new pet; the authenticated admin is recorded as the
/// registrar.
pub async fn create_pet(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Json(new_pet): Json<NewPet>,
) -> Result<(StatusCode, Json<PetWithImages>), AppError> {
    let pet = state.db_repo.create_pet(&new_pet, admin.0.id).await?;
    Ok((StatusCode::CREATED, Json(pet)))
}

/// # PUT /api/pets/:id
pub async fn update_pet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    _admin: AdminUser,
    Json(update): Json<PetUpdate>,
) -> Result<Json<PetWithImages>, AppError> {
    let pet = state.db_repo.update_pet(id, &update).await?;
    Ok(Json(pet))
}

/// # PATCH /api/pets/:id/status
pub async fn update_pet_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    _admin: AdminUser,
    Json(request): Json<UpdatePetStatusRequest>,
) -> Result<Json<PetWithImages>, AppError> {
    let pet = state.db_repo.update_pet_status(id, request.status).await?;
    Ok(Json(pet))
}

/// # DELETE /api/pets/:id
/// Removes a pet and, through the schema, its images and interests.
/// Refused while adoption records reference the pet.
pub async fn delete_pet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    _admin: AdminUser,
) -> Result<Json<Value>, AppError> {
    state.db_repo.delete_pet(id).await?;
    Ok(Json(json!({ "message": "Pet removed successfully" })))
}

/// # GET /api/pets/stats
pub async fn pet_stats(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<PetStats>, AppError> {
    let stats = state.db_repo.pet_stats().await?;
    Ok(Json(stats))
}
