use crate::DbError;
use chrono::{DateTime, Utc};
use core_types::{
    AdoptionStatus, CandidateStatus, InterestStatus, PetStatus, Sex, Size, Species, UserRole,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic,
/// including the adoption-lifecycle transitions that must run atomically.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

/// Admin note written onto the interests of candidates who lost out when a
/// pet's adoption was finalized.
const ADOPTED_BY_ANOTHER_NOTE: &str = "Pet was adopted by another candidate";

// ==============================================================================
// Row types
// ==============================================================================

/// A back-office user account, as stored in the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: UserRole,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// An adoptable animal, as stored in the `pets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Pet {
    pub id: Uuid,
    pub name: String,
    pub species: Species,
    pub age: String,
    pub size: Size,
    pub sex: Sex,
    pub color: String,
    pub weight_kg: Option<Decimal>,
    pub description: String,
    pub temperament: Option<String>,
    pub neutered: bool,
    pub vaccinated: bool,
    pub dewormed: bool,
    pub special_needs: Option<String>,
    pub history: Option<String>,
    pub status: PetStatus,
    pub registered_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PetImage {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub image_url: String,
    pub file_name: String,
    pub size_bytes: Option<i64>,
    pub mime_type: String,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

/// A person who filled in the public adoption form.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Candidate {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub housing_type: String,
    pub availability: String,
    pub pet_experience: String,
    pub motivation: String,
    pub status: CandidateStatus,
    pub created_at: DateTime<Utc>,
}

/// One candidate's interest in one pet. Unique per (candidate, pet) pair.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Interest {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub pet_id: Uuid,
    pub status: InterestStatus,
    pub interest_date: DateTime<Utc>,
    pub evaluated_at: Option<DateTime<Utc>>,
    pub admin_notes: Option<String>,
}

/// A finalized pet-to-candidate binding with its own lifecycle status.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Adoption {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub candidate_id: Uuid,
    pub adoption_date: DateTime<Utc>,
    pub fee: Option<Decimal>,
    pub notes: Option<String>,
    pub status: AdoptionStatus,
}

// ==============================================================================
// Response shapes (rows joined with their relations)
// ==============================================================================

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PetSummary {
    pub id: Uuid,
    pub name: String,
    pub species: Species,
    pub status: PetStatus,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CandidateSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PetWithImages {
    #[serde(flatten)]
    pub pet: Pet,
    pub images: Vec<PetImage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterestWithPet {
    #[serde(flatten)]
    pub interest: Interest,
    pub pet: PetSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdoptionWithPet {
    #[serde(flatten)]
    pub adoption: Adoption,
    pub pet: PetSummary,
}

/// An adoption joined with both of its endpoints, the shape every adoption
/// endpoint responds with.
#[derive(Debug, Clone, Serialize)]
pub struct AdoptionDetails {
    #[serde(flatten)]
    pub adoption: Adoption,
    pub pet: PetSummary,
    pub candidate: CandidateSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterestDetails {
    #[serde(flatten)]
    pub interest: Interest,
    pub pet: PetSummary,
    pub candidate: CandidateSummary,
}

/// A candidate together with everything they have applied for.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateDetails {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub interests: Vec<InterestWithPet>,
    pub adoptions: Vec<AdoptionWithPet>,
}

// Flat rows produced by JOIN queries, folded into the nested response
// shapes above. sqlx maps columns by name, so the pet/candidate columns
// are aliased with prefixes.

#[derive(Debug, FromRow)]
struct InterestPetRow {
    id: Uuid,
    candidate_id: Uuid,
    pet_id: Uuid,
    status: InterestStatus,
    interest_date: DateTime<Utc>,
    evaluated_at: Option<DateTime<Utc>>,
    admin_notes: Option<String>,
    pet_name: String,
    pet_species: Species,
    pet_status: PetStatus,
}

impl From<InterestPetRow> for InterestWithPet {
    fn from(row: InterestPetRow) -> Self {
        InterestWithPet {
            pet: PetSummary {
                id: row.pet_id,
                name: row.pet_name,
                species: row.pet_species,
                status: row.pet_status,
            },
            interest: Interest {
                id: row.id,
                candidate_id: row.candidate_id,
                pet_id: row.pet_id,
                status: row.status,
                interest_date: row.interest_date,
                evaluated_at: row.evaluated_at,
                admin_notes: row.admin_notes,
            },
        }
    }
}

#[derive(Debug, FromRow)]
struct AdoptionJoinRow {
    id: Uuid,
    pet_id: Uuid,
    candidate_id: Uuid,
    adoption_date: DateTime<Utc>,
    fee: Option<Decimal>,
    notes: Option<String>,
    status: AdoptionStatus,
    pet_name: String,
    pet_species: Species,
    pet_status: PetStatus,
    candidate_name: String,
    candidate_email: String,
    candidate_phone: String,
}

impl AdoptionJoinRow {
    fn split(self) -> AdoptionDetails {
        AdoptionDetails {
            pet: PetSummary {
                id: self.pet_id,
                name: self.pet_name,
                species: self.pet_species,
                status: self.pet_status,
            },
            candidate: CandidateSummary {
                id: self.candidate_id,
                name: self.candidate_name,
                email: self.candidate_email,
                phone: self.candidate_phone,
            },
            adoption: Adoption {
                id: self.id,
                pet_id: self.pet_id,
                candidate_id: self.candidate_id,
                adoption_date: self.adoption_date,
                fee: self.fee,
                notes: self.notes,
                status: self.status,
            },
        }
    }
}

// ==============================================================================
// Input types
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct NewPet {
    pub name: String,
    pub species: Species,
    pub age: String,
    pub size: Size,
    pub sex: Sex,
    pub color: Option<String>,
    pub weight_kg: Option<Decimal>,
    pub description: String,
    pub temperament: Option<String>,
    #[serde(default)]
    pub neutered: bool,
    #[serde(default)]
    pub vaccinated: bool,
    #[serde(default)]
    pub dewormed: bool,
    pub special_needs: Option<String>,
    pub history: Option<String>,
    #[serde(default)]
    pub images: Vec<NewPetImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPetImage {
    pub url: String,
    pub name: Option<String>,
    pub size_bytes: Option<i64>,
    pub mime_type: Option<String>,
}

/// Partial pet update; every field left as `None` keeps its stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PetUpdate {
    pub name: Option<String>,
    pub species: Option<Species>,
    pub age: Option<String>,
    pub size: Option<Size>,
    pub sex: Option<Sex>,
    pub color: Option<String>,
    pub weight_kg: Option<Decimal>,
    pub description: Option<String>,
    pub temperament: Option<String>,
    pub neutered: Option<bool>,
    pub vaccinated: Option<bool>,
    pub dewormed: Option<bool>,
    pub special_needs: Option<String>,
    pub history: Option<String>,
    pub status: Option<PetStatus>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PetFilter {
    pub species: Option<Species>,
    pub status: Option<PetStatus>,
    pub size: Option<Size>,
    pub sex: Option<Sex>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCandidate {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub housing_type: String,
    pub availability: String,
    pub pet_experience: String,
    pub motivation: String,
    /// Optional pet the candidate is applying for; creates the interest
    /// row in the same transaction as the candidate itself.
    pub pet_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: UserRole,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FinalizeAdoption {
    pub pet_id: Uuid,
    pub candidate_id: Uuid,
    pub notes: Option<String>,
    pub fee: Option<Decimal>,
}

// ==============================================================================
// Statistics shapes
// ==============================================================================

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PetStats {
    pub total: i64,
    pub available: i64,
    pub in_process: i64,
    pub adopted: i64,
    pub dogs: i64,
    pub cats: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CandidateStats {
    pub total_candidates: i64,
    pub pending_interests: i64,
    pub approved_interests: i64,
    pub rejected_interests: i64,
    pub active_adoptions: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdoptionStats {
    pub total: i64,
    pub active: i64,
    pub cancelled: i64,
    pub returned: i64,
    pub per_month: Vec<MonthlyAdoptions>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MonthlyAdoptions {
    pub month: DateTime<Utc>,
    pub total: i64,
}

#[derive(Debug, FromRow)]
struct AdoptionTotalsRow {
    total: i64,
    active: i64,
    cancelled: i64,
    returned: i64,
}

// ==============================================================================
// Users
// ==============================================================================

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Creates a back-office user. The caller is responsible for hashing the
    /// password; this layer never sees plaintext credentials.
    pub async fn create_user(&self, user: NewUser) -> Result<User, DbError> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, phone, address, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(&user.address)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DbError::on_constraint(e, "users_email_key", || {
                DbError::Duplicate("Email is already in use".to_string())
            })
        })?;
        Ok(created)
    }
}

// ==============================================================================
// Pets
// ==============================================================================

impl DbRepository {
    /// Fetches a page of pets matching the filter, newest first, together
    /// with the total number of matches for pagination.
    pub async fn list_pets(
        &self,
        filter: &PetFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PetWithImages>, i64), DbError> {
        let pets = sqlx::query_as::<_, Pet>(
            r#"
            SELECT * FROM pets
            WHERE ($1::text IS NULL OR species = $1)
              AND ($2::text IS NULL OR status = $2)
              AND ($3::text IS NULL OR size = $3)
              AND ($4::text IS NULL OR sex = $4)
            ORDER BY created_at DESC
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(filter.species)
        .bind(filter.status)
        .bind(filter.size)
        .bind(filter.sex)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM pets
            WHERE ($1::text IS NULL OR species = $1)
              AND ($2::text IS NULL OR status = $2)
              AND ($3::text IS NULL OR size = $3)
              AND ($4::text IS NULL OR sex = $4)
            "#,
        )
        .bind(filter.species)
        .bind(filter.status)
        .bind(filter.size)
        .bind(filter.sex)
        .fetch_one(&self.pool)
        .await?;

        let with_images = self.attach_images(pets).await?;
        Ok((with_images, total))
    }

    pub async fn get_pet(&self, id: Uuid) -> Result<PetWithImages, DbError> {
        let pet = sqlx::query_as::<_, Pet>("SELECT * FROM pets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DbError::NotFound("Pet"))?;
        let images = self.images_for_pet(pet.id).await?;
        Ok(PetWithImages { pet, images })
    }

    /// Registers a new pet and its images in one transaction. The first
    /// image becomes the primary one.
    pub async fn create_pet(
        &self,
        new_pet: &NewPet,
        registered_by: Uuid,
    ) -> Result<PetWithImages, DbError> {
        let mut tx = self.pool.begin().await?;

        let color = new_pet
            .color
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or("unknown");

        let pet = sqlx::query_as::<_, Pet>(
            r#"
            INSERT INTO pets (name, species, age, size, sex, color, weight_kg, description,
                              temperament, neutered, vaccinated, dewormed, special_needs,
                              history, registered_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(&new_pet.name)
        .bind(new_pet.species)
        .bind(&new_pet.age)
        .bind(new_pet.size)
        .bind(new_pet.sex)
        .bind(color)
        .bind(new_pet.weight_kg)
        .bind(&new_pet.description)
        .bind(&new_pet.temperament)
        .bind(new_pet.neutered)
        .bind(new_pet.vaccinated)
        .bind(new_pet.dewormed)
        .bind(&new_pet.special_needs)
        .bind(&new_pet.history)
        .bind(registered_by)
        .fetch_one(&mut *tx)
        .await?;

        let mut images = Vec::with_capacity(new_pet.images.len());
        for (index, image) in new_pet.images.iter().enumerate() {
            // Images arrive base64-encoded; when no size is given, estimate
            // the decoded byte count from the payload length.
            let size_bytes = image
                .size_bytes
                .unwrap_or_else(|| (image.url.len() as i64 * 3 + 3) / 4);
            let file_name = image.name.clone().unwrap_or_else(|| {
                format!("pet-{}-{}.jpg", new_pet.name.replace(' ', "-"), index)
            });

            let saved = sqlx::query_as::<_, PetImage>(
                r#"
                INSERT INTO pet_images (pet_id, image_url, file_name, size_bytes, mime_type, is_primary)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
                "#,
            )
            .bind(pet.id)
            .bind(&image.url)
            .bind(&file_name)
            .bind(size_bytes)
            .bind(image.mime_type.as_deref().unwrap_or("image/jpeg"))
            .bind(index == 0)
            .fetch_one(&mut *tx)
            .await?;
            images.push(saved);
        }

        tx.commit().await?;
        Ok(PetWithImages { pet, images })
    }

    /// Applies a partial update; absent fields keep their stored values.
    pub async fn update_pet(&self, id: Uuid, update: &PetUpdate) -> Result<PetWithImages, DbError> {
        let pet = sqlx::query_as::<_, Pet>(
            r#"
            UPDATE pets SET
                name = COALESCE($2, name),
                species = COALESCE($3, species),
                age = COALESCE($4, age),
                size = COALESCE($5, size),
                sex = COALESCE($6, sex),
                color = COALESCE($7, color),
                weight_kg = COALESCE($8, weight_kg),
                description = COALESCE($9, description),
                temperament = COALESCE($10, temperament),
                neutered = COALESCE($11, neutered),
                vaccinated = COALESCE($12, vaccinated),
                dewormed = COALESCE($13, dewormed),
                special_needs = COALESCE($14, special_needs),
                history = COALESCE($15, history),
                status = COALESCE($16, status)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(update.species)
        .bind(&update.age)
        .bind(update.size)
        .bind(update.sex)
        .bind(&update.color)
        .bind(update.weight_kg)
        .bind(&update.description)
        .bind(&update.temperament)
        .bind(update.neutered)
        .bind(update.vaccinated)
        .bind(update.dewormed)
        .bind(&update.special_needs)
        .bind(&update.history)
        .bind(update.status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound("Pet"))?;

        let images = self.images_for_pet(pet.id).await?;
        Ok(PetWithImages { pet, images })
    }

    pub async fn update_pet_status(
        &self,
        id: Uuid,
        status: PetStatus,
    ) -> Result<PetWithImages, DbError> {
        let pet =
            sqlx::query_as::<_, Pet>("UPDATE pets SET status = $2 WHERE id = $1 RETURNING *")
                .bind(id)
                .bind(status)
                .fetch_optional(&self.pool)
                .await?
                .ok_or(DbError::NotFound("Pet"))?;
        let images = self.images_for_pet(pet.id).await?;
        Ok(PetWithImages { pet, images })
    }

    /// Deletes a pet. Images and interests go with it; adoption history is
    /// never deleted, so the pet is kept while adoption rows reference it.
    pub async fn delete_pet(&self, id: Uuid) -> Result<(), DbError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM pets WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        if !exists {
            return Err(DbError::NotFound("Pet"));
        }

        let adoption_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM adoptions WHERE pet_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        if adoption_count > 0 {
            return Err(DbError::Conflict(
                "Pet has adoption records and cannot be deleted".to_string(),
            ));
        }

        sqlx::query("DELETE FROM pets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn pet_stats(&self) -> Result<PetStats, DbError> {
        let stats = sqlx::query_as::<_, PetStats>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE status = 'available') AS available,
                   COUNT(*) FILTER (WHERE status = 'in_process') AS in_process,
                   COUNT(*) FILTER (WHERE status = 'adopted') AS adopted,
                   COUNT(*) FILTER (WHERE species = 'dog') AS dogs,
                   COUNT(*) FILTER (WHERE species = 'cat') AS cats
            FROM pets
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }

    async fn images_for_pet(&self, pet_id: Uuid) -> Result<Vec<PetImage>, DbError> {
        let images = sqlx::query_as::<_, PetImage>(
            "SELECT * FROM pet_images WHERE pet_id = $1 ORDER BY is_primary DESC, created_at ASC",
        )
        .bind(pet_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(images)
    }

    /// Loads the images for a whole page of pets with a single query.
    async fn attach_images(&self, pets: Vec<Pet>) -> Result<Vec<PetWithImages>, DbError> {
        let ids: Vec<Uuid> = pets.iter().map(|pet| pet.id).collect();
        let images = sqlx::query_as::<_, PetImage>(
            r#"
            SELECT * FROM pet_images
            WHERE pet_id = ANY($1)
            ORDER BY is_primary DESC, created_at ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_pet: HashMap<Uuid, Vec<PetImage>> = HashMap::new();
        for image in images {
            by_pet.entry(image.pet_id).or_default().push(image);
        }

        Ok(pets
            .into_iter()
            .map(|pet| {
                let images = by_pet.remove(&pet.id).unwrap_or_default();
                PetWithImages { pet, images }
            })
            .collect())
    }
}

// ==============================================================================
// Candidates & interests
// ==============================================================================

impl DbRepository {
    pub async fn list_candidates(
        &self,
        status: Option<CandidateStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<CandidateDetails>, i64), DbError> {
        let candidates = sqlx::query_as::<_, Candidate>(
            r#"
            SELECT * FROM candidates
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM candidates WHERE ($1::text IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        let details = self.attach_candidate_relations(candidates).await?;
        Ok((details, total))
    }

    pub async fn get_candidate(&self, id: Uuid) -> Result<CandidateDetails, DbError> {
        let candidate = sqlx::query_as::<_, Candidate>("SELECT * FROM candidates WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DbError::NotFound("Candidate"))?;
        let mut details = self.attach_candidate_relations(vec![candidate]).await?;
        Ok(details.remove(0))
    }

    /// Registers a candidate from the public adoption form. When the form
    /// names a specific pet, the interest row is created in the same
    /// transaction so a half-registered application can never exist.
    pub async fn create_candidate(
        &self,
        new_candidate: &NewCandidate,
    ) -> Result<CandidateDetails, DbError> {
        let existing: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM candidates WHERE email = $1)")
                .bind(&new_candidate.email)
                .fetch_one(&self.pool)
                .await?;
        if existing {
            return Err(DbError::Duplicate(
                "A registration with this email already exists".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let candidate = sqlx::query_as::<_, Candidate>(
            r#"
            INSERT INTO candidates (name, email, phone, address, housing_type, availability,
                                    pet_experience, motivation)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&new_candidate.name)
        .bind(&new_candidate.email)
        .bind(&new_candidate.phone)
        .bind(&new_candidate.address)
        .bind(&new_candidate.housing_type)
        .bind(&new_candidate.availability)
        .bind(&new_candidate.pet_experience)
        .bind(&new_candidate.motivation)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            DbError::on_constraint(e, "candidates_email_key", || {
                DbError::Duplicate("A registration with this email already exists".to_string())
            })
        })?;

        if let Some(pet_id) = new_candidate.pet_id {
            let pet_exists: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM pets WHERE id = $1)")
                    .bind(pet_id)
                    .fetch_one(&mut *tx)
                    .await?;
            if !pet_exists {
                return Err(DbError::NotFound("Pet"));
            }

            sqlx::query("INSERT INTO interests (candidate_id, pet_id) VALUES ($1, $2)")
                .bind(candidate.id)
                .bind(pet_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        let mut details = self.attach_candidate_relations(vec![candidate]).await?;
        Ok(details.remove(0))
    }

    /// Applies an evaluation to the candidate by stamping every one of
    /// their interest rows with the corresponding state. Deliberately not
    /// scoped per pet: one candidate decision drives all of their pending
    /// interests uniformly.
    pub async fn update_candidate_status(
        &self,
        id: Uuid,
        status: CandidateStatus,
        notes: Option<&str>,
    ) -> Result<CandidateDetails, DbError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM candidates WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        if !exists {
            return Err(DbError::NotFound("Candidate"));
        }

        sqlx::query(
            r#"
            UPDATE interests
            SET status = $2, evaluated_at = NOW(), admin_notes = $3
            WHERE candidate_id = $1
            "#,
        )
        .bind(id)
        .bind(status.as_interest_status())
        .bind(notes)
        .execute(&self.pool)
        .await?;

        self.get_candidate(id).await
    }

    /// Records a candidate's interest in a pet. At most one interest may
    /// exist per (candidate, pet) pair; the unique constraint backs up the
    /// explicit check under concurrent requests.
    pub async fn create_interest(
        &self,
        candidate_id: Uuid,
        pet_id: Uuid,
    ) -> Result<InterestDetails, DbError> {
        let candidate = sqlx::query_as::<_, CandidateSummary>(
            "SELECT id, name, email, phone FROM candidates WHERE id = $1",
        )
        .bind(candidate_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound("Candidate"))?;

        let pet = sqlx::query_as::<_, PetSummary>(
            "SELECT id, name, species, status FROM pets WHERE id = $1",
        )
        .bind(pet_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound("Pet"))?;

        let already_interested: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM interests WHERE candidate_id = $1 AND pet_id = $2)",
        )
        .bind(candidate_id)
        .bind(pet_id)
        .fetch_one(&self.pool)
        .await?;
        if already_interested {
            return Err(DbError::Duplicate(
                "Candidate has already expressed interest in this pet".to_string(),
            ));
        }

        let interest = sqlx::query_as::<_, Interest>(
            "INSERT INTO interests (candidate_id, pet_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(candidate_id)
        .bind(pet_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DbError::on_constraint(e, "interests_candidate_pet_key", || {
                DbError::Duplicate(
                    "Candidate has already expressed interest in this pet".to_string(),
                )
            })
        })?;

        Ok(InterestDetails {
            interest,
            pet,
            candidate,
        })
    }

    pub async fn candidate_stats(&self) -> Result<CandidateStats, DbError> {
        let stats = sqlx::query_as::<_, CandidateStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM candidates) AS total_candidates,
                (SELECT COUNT(*) FROM interests WHERE status = 'interested') AS pending_interests,
                (SELECT COUNT(*) FROM interests WHERE status = 'approved') AS approved_interests,
                (SELECT COUNT(*) FROM interests WHERE status = 'rejected') AS rejected_interests,
                (SELECT COUNT(*) FROM adoptions WHERE status = 'active') AS active_adoptions
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }

    /// Loads interests and adoption history for a batch of candidates with
    /// two queries instead of two per candidate.
    async fn attach_candidate_relations(
        &self,
        candidates: Vec<Candidate>,
    ) -> Result<Vec<CandidateDetails>, DbError> {
        let ids: Vec<Uuid> = candidates.iter().map(|candidate| candidate.id).collect();

        let interest_rows = sqlx::query_as::<_, InterestPetRow>(
            r#"
            SELECT i.id, i.candidate_id, i.pet_id, i.status, i.interest_date, i.evaluated_at,
                   i.admin_notes,
                   p.name AS pet_name, p.species AS pet_species, p.status AS pet_status
            FROM interests i
            JOIN pets p ON p.id = i.pet_id
            WHERE i.candidate_id = ANY($1)
            ORDER BY i.interest_date DESC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let adoption_rows = sqlx::query_as::<_, AdoptionJoinRow>(
            r#"
            SELECT a.id, a.pet_id, a.candidate_id, a.adoption_date, a.fee, a.notes, a.status,
                   p.name AS pet_name, p.species AS pet_species, p.status AS pet_status,
                   c.name AS candidate_name, c.email AS candidate_email, c.phone AS candidate_phone
            FROM adoptions a
            JOIN pets p ON p.id = a.pet_id
            JOIN candidates c ON c.id = a.candidate_id
            WHERE a.candidate_id = ANY($1)
            ORDER BY a.adoption_date DESC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut interests_by_candidate: HashMap<Uuid, Vec<InterestWithPet>> = HashMap::new();
        for row in interest_rows {
            interests_by_candidate
                .entry(row.candidate_id)
                .or_default()
                .push(row.into());
        }

        let mut adoptions_by_candidate: HashMap<Uuid, Vec<AdoptionWithPet>> = HashMap::new();
        for row in adoption_rows {
            let details = row.split();
            adoptions_by_candidate
                .entry(details.adoption.candidate_id)
                .or_default()
                .push(AdoptionWithPet {
                    adoption: details.adoption,
                    pet: details.pet,
                });
        }

        Ok(candidates
            .into_iter()
            .map(|candidate| {
                let interests = interests_by_candidate
                    .remove(&candidate.id)
                    .unwrap_or_default();
                let adoptions = adoptions_by_candidate
                    .remove(&candidate.id)
                    .unwrap_or_default();
                CandidateDetails {
                    candidate,
                    interests,
                    adoptions,
                }
            })
            .collect())
    }
}

// ==============================================================================
// Adoptions (the lifecycle coordinator)
// ==============================================================================

impl DbRepository {
    pub async fn list_adoptions(
        &self,
        status: Option<AdoptionStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<AdoptionDetails>, i64), DbError> {
        let rows = sqlx::query_as::<_, AdoptionJoinRow>(
            r#"
            SELECT a.id, a.pet_id, a.candidate_id, a.adoption_date, a.fee, a.notes, a.status,
                   p.name AS pet_name, p.species AS pet_species, p.status AS pet_status,
                   c.name AS candidate_name, c.email AS candidate_email, c.phone AS candidate_phone
            FROM adoptions a
            JOIN pets p ON p.id = a.pet_id
            JOIN candidates c ON c.id = a.candidate_id
            WHERE ($1::text IS NULL OR a.status = $1)
            ORDER BY a.adoption_date DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM adoptions WHERE ($1::text IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows.into_iter().map(AdoptionJoinRow::split).collect(), total))
    }

    pub async fn get_adoption(&self, id: Uuid) -> Result<AdoptionDetails, DbError> {
        let row = sqlx::query_as::<_, AdoptionJoinRow>(
            r#"
            SELECT a.id, a.pet_id, a.candidate_id, a.adoption_date, a.fee, a.notes, a.status,
                   p.name AS pet_name, p.species AS pet_species, p.status AS pet_status,
                   c.name AS candidate_name, c.email AS candidate_email, c.phone AS candidate_phone
            FROM adoptions a
            JOIN pets p ON p.id = a.pet_id
            JOIN candidates c ON c.id = a.candidate_id
            WHERE a.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound("Adoption"))?;
        Ok(row.split())
    }

    pub async fn adoptions_for_candidate(
        &self,
        candidate_id: Uuid,
    ) -> Result<Vec<AdoptionDetails>, DbError> {
        let rows = sqlx::query_as::<_, AdoptionJoinRow>(
            r#"
            SELECT a.id, a.pet_id, a.candidate_id, a.adoption_date, a.fee, a.notes, a.status,
                   p.name AS pet_name, p.species AS pet_species, p.status AS pet_status,
                   c.name AS candidate_name, c.email AS candidate_email, c.phone AS candidate_phone
            FROM adoptions a
            JOIN pets p ON p.id = a.pet_id
            JOIN candidates c ON c.id = a.candidate_id
            WHERE a.candidate_id = $1
            ORDER BY a.adoption_date DESC
            "#,
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(AdoptionJoinRow::split).collect())
    }

    /// Finalizes an adoption: creates the adoption row, marks the pet
    /// adopted, approves the winning candidate's interest and rejects every
    /// competing one. All of it happens in a single transaction — either
    /// the whole transition applies or none of it does.
    ///
    /// The pet row is locked up front so two concurrent finalizations of
    /// the same pet serialize on the precondition checks; the partial
    /// unique index on active adoptions rejects the loser even if the lock
    /// is ever bypassed.
    pub async fn finalize_adoption(
        &self,
        request: &FinalizeAdoption,
    ) -> Result<AdoptionDetails, DbError> {
        let mut tx = self.pool.begin().await?;

        let pet = sqlx::query_as::<_, Pet>("SELECT * FROM pets WHERE id = $1 FOR UPDATE")
            .bind(request.pet_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(DbError::NotFound("Pet"))?;

        let candidate_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM candidates WHERE id = $1)")
                .bind(request.candidate_id)
                .fetch_one(&mut *tx)
                .await?;
        if !candidate_exists {
            return Err(DbError::NotFound("Candidate"));
        }

        if pet.status == PetStatus::Adopted {
            return Err(DbError::Conflict("Pet has already been adopted".to_string()));
        }

        let has_active: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM adoptions WHERE pet_id = $1 AND status = 'active')",
        )
        .bind(request.pet_id)
        .fetch_one(&mut *tx)
        .await?;
        if has_active {
            return Err(DbError::Conflict(
                "Pet already has an active adoption".to_string(),
            ));
        }

        let adoption = sqlx::query_as::<_, Adoption>(
            r#"
            INSERT INTO adoptions (pet_id, candidate_id, fee, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(request.pet_id)
        .bind(request.candidate_id)
        .bind(request.fee)
        .bind(&request.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            DbError::on_constraint(e, "adoptions_one_active_per_pet", || {
                DbError::Conflict("Pet already has an active adoption".to_string())
            })
        })?;

        sqlx::query("UPDATE pets SET status = 'adopted' WHERE id = $1")
            .bind(request.pet_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE interests
            SET status = 'approved', evaluated_at = NOW()
            WHERE candidate_id = $1 AND pet_id = $2 AND status = 'interested'
            "#,
        )
        .bind(request.candidate_id)
        .bind(request.pet_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE interests
            SET status = 'rejected', evaluated_at = NOW(), admin_notes = $3
            WHERE pet_id = $1 AND candidate_id <> $2 AND status = 'interested'
            "#,
        )
        .bind(request.pet_id)
        .bind(request.candidate_id)
        .bind(ADOPTED_BY_ANOTHER_NOTE)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            adoption_id = %adoption.id,
            pet_id = %request.pet_id,
            candidate_id = %request.candidate_id,
            "Adoption finalized."
        );

        self.get_adoption(adoption.id).await
    }

    /// Updates an adoption's status. Cancelling or returning puts the pet
    /// back up for adoption in the same transaction. Interests rejected
    /// when the adoption was finalized stay rejected: a rejected candidate
    /// has to express interest again.
    pub async fn update_adoption_status(
        &self,
        id: Uuid,
        status: AdoptionStatus,
        notes: Option<&str>,
    ) -> Result<AdoptionDetails, DbError> {
        let mut tx = self.pool.begin().await?;

        let adoption =
            sqlx::query_as::<_, Adoption>("SELECT * FROM adoptions WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(DbError::NotFound("Adoption"))?;

        sqlx::query("UPDATE adoptions SET status = $2, notes = COALESCE($3, notes) WHERE id = $1")
            .bind(id)
            .bind(status)
            .bind(notes)
            .execute(&mut *tx)
            .await?;

        if status.releases_pet() {
            sqlx::query("UPDATE pets SET status = 'available' WHERE id = $1")
                .bind(adoption.pet_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(adoption_id = %id, status = %status, "Adoption status updated.");

        self.get_adoption(id).await
    }

    pub async fn adoption_stats(&self) -> Result<AdoptionStats, DbError> {
        let totals = sqlx::query_as::<_, AdoptionTotalsRow>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE status = 'active') AS active,
                   COUNT(*) FILTER (WHERE status = 'cancelled') AS cancelled,
                   COUNT(*) FILTER (WHERE status = 'returned') AS returned
            FROM adoptions
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let per_month = sqlx::query_as::<_, MonthlyAdoptions>(
            r#"
            SELECT DATE_TRUNC('month', adoption_date) AS month, COUNT(*) AS total
            FROM adoptions
            WHERE adoption_date >= NOW() - INTERVAL '6 months'
            GROUP BY month
            ORDER BY month DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(AdoptionStats {
            total: totals.total,
            active: totals.active,
            cancelled: totals.cancelled,
            returned: totals.returned,
            per_month,
        })
    }
}
