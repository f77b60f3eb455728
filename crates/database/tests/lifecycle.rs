//! Adoption-lifecycle tests against a live PostgreSQL instance.
//!
//! These exercise the repository end-to-end, so they are ignored by
//! default. Run them with a database available:
//!
//! ```text
//! DATABASE_URL=postgres://... cargo test -p database -- --ignored
//! ```

use core_types::{AdoptionStatus, CandidateStatus, InterestStatus, PetStatus, Sex, Size, Species, UserRole};
use database::{
    connect, run_migrations, CandidateDetails, DbError, DbRepository, FinalizeAdoption,
    NewCandidate, NewPet, NewUser, PetWithImages,
};
use rust_decimal::Decimal;
use uuid::Uuid;

async fn repo() -> DbRepository {
    let pool = connect().await.expect("database reachable");
    run_migrations(&pool).await.expect("migrations apply");
    DbRepository::new(pool)
}

async fn admin(repo: &DbRepository) -> Uuid {
    let user = repo
        .create_user(NewUser {
            name: "Test Admin".to_string(),
            email: format!("admin-{}@shelter.test", Uuid::new_v4()),
            password_hash: "not-a-real-hash".to_string(),
            phone: None,
            address: None,
            role: UserRole::Admin,
        })
        .await
        .expect("admin created");
    user.id
}

async fn available_pet(repo: &DbRepository, name: &str) -> PetWithImages {
    let registered_by = admin(repo).await;
    repo.create_pet(
        &NewPet {
            name: name.to_string(),
            species: Species::Dog,
            age: "2 years".to_string(),
            size: Size::Medium,
            sex: Sex::Male,
            color: Some("brown".to_string()),
            weight_kg: Some(Decimal::new(1250, 2)),
            description: "Friendly and house-trained.".to_string(),
            temperament: Some("calm".to_string()),
            neutered: true,
            vaccinated: true,
            dewormed: false,
            special_needs: None,
            history: None,
            images: Vec::new(),
        },
        registered_by,
    )
    .await
    .expect("pet created")
}

/// Registers a candidate, optionally expressing interest in a pet at the
/// same time (the public-form path).
async fn candidate(repo: &DbRepository, name: &str, pet_id: Option<Uuid>) -> CandidateDetails {
    repo.create_candidate(&NewCandidate {
        name: name.to_string(),
        email: format!("{}-{}@candidates.test", name.to_lowercase(), Uuid::new_v4()),
        phone: "555-0100".to_string(),
        address: "12 Shelter Lane".to_string(),
        housing_type: "house with yard".to_string(),
        availability: "evenings and weekends".to_string(),
        pet_experience: "grew up with dogs".to_string(),
        motivation: "the kids have wanted a dog for years".to_string(),
        pet_id,
    })
    .await
    .expect("candidate created")
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn finalizing_an_adoption_settles_every_open_interest() {
    let repo = repo().await;

    let pet = available_pet(&repo, "Rex").await;
    let winner = candidate(&repo, "Alice", Some(pet.pet.id)).await;
    let loser = candidate(&repo, "Bob", Some(pet.pet.id)).await;

    let adoption = repo
        .finalize_adoption(&FinalizeAdoption {
            pet_id: pet.pet.id,
            candidate_id: winner.candidate.id,
            notes: Some("picked up on Saturday".to_string()),
            fee: Some(Decimal::new(15000, 2)),
        })
        .await
        .expect("adoption finalizes");

    assert_eq!(adoption.adoption.status, AdoptionStatus::Active);
    assert_eq!(adoption.pet.id, pet.pet.id);
    assert_eq!(adoption.candidate.id, winner.candidate.id);

    let pet_after = repo.get_pet(pet.pet.id).await.expect("pet loads");
    assert_eq!(pet_after.pet.status, PetStatus::Adopted);

    let winner_after = repo.get_candidate(winner.candidate.id).await.expect("winner loads");
    let winner_interest = &winner_after.interests[0];
    assert_eq!(winner_interest.interest.status, InterestStatus::Approved);
    assert!(winner_interest.interest.evaluated_at.is_some());

    let loser_after = repo.get_candidate(loser.candidate.id).await.expect("loser loads");
    let loser_interest = &loser_after.interests[0];
    assert_eq!(loser_interest.interest.status, InterestStatus::Rejected);
    assert!(loser_interest.interest.evaluated_at.is_some());
    assert_eq!(
        loser_interest.interest.admin_notes.as_deref(),
        Some("Pet was adopted by another candidate")
    );
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn a_pet_cannot_be_adopted_twice() {
    let repo = repo().await;

    let pet = available_pet(&repo, "Luna").await;
    let first = candidate(&repo, "Alice", Some(pet.pet.id)).await;
    let second = candidate(&repo, "Bob", Some(pet.pet.id)).await;

    let adoption = repo
        .finalize_adoption(&FinalizeAdoption {
            pet_id: pet.pet.id,
            candidate_id: first.candidate.id,
            notes: None,
            fee: None,
        })
        .await
        .expect("first adoption finalizes");

    let err = repo
        .finalize_adoption(&FinalizeAdoption {
            pet_id: pet.pet.id,
            candidate_id: second.candidate.id,
            notes: None,
            fee: None,
        })
        .await
        .expect_err("second finalization is refused");
    assert!(matches!(err, DbError::Conflict(_)), "got {err:?}");

    // The first adoption is untouched and remains the only one.
    let unchanged = repo.get_adoption(adoption.adoption.id).await.expect("adoption loads");
    assert_eq!(unchanged.adoption.status, AdoptionStatus::Active);
    assert_eq!(unchanged.candidate.id, first.candidate.id);

    let history = repo
        .adoptions_for_candidate(second.candidate.id)
        .await
        .expect("history loads");
    assert!(history.is_empty());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn cancelling_an_adoption_releases_the_pet_but_keeps_rejections() {
    let repo = repo().await;

    let pet = available_pet(&repo, "Mia").await;
    let winner = candidate(&repo, "Alice", Some(pet.pet.id)).await;
    let loser = candidate(&repo, "Bob", Some(pet.pet.id)).await;

    let adoption = repo
        .finalize_adoption(&FinalizeAdoption {
            pet_id: pet.pet.id,
            candidate_id: winner.candidate.id,
            notes: None,
            fee: None,
        })
        .await
        .expect("adoption finalizes");

    let cancelled = repo
        .update_adoption_status(adoption.adoption.id, AdoptionStatus::Cancelled, Some("changed their mind"))
        .await
        .expect("cancellation applies");
    assert_eq!(cancelled.adoption.status, AdoptionStatus::Cancelled);

    let pet_after = repo.get_pet(pet.pet.id).await.expect("pet loads");
    assert_eq!(pet_after.pet.status, PetStatus::Available);

    // The losing candidate is not re-opened; they must express interest again.
    let loser_after = repo.get_candidate(loser.candidate.id).await.expect("loser loads");
    assert_eq!(loser_after.interests[0].interest.status, InterestStatus::Rejected);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn duplicate_interest_is_refused_and_the_original_left_alone() {
    let repo = repo().await;

    let pet = available_pet(&repo, "Nino").await;
    let applicant = candidate(&repo, "Alice", Some(pet.pet.id)).await;
    let original = &applicant.interests[0].interest;

    let err = repo
        .create_interest(applicant.candidate.id, pet.pet.id)
        .await
        .expect_err("duplicate interest is refused");
    assert!(matches!(err, DbError::Duplicate(_)), "got {err:?}");

    let after = repo.get_candidate(applicant.candidate.id).await.expect("candidate loads");
    assert_eq!(after.interests.len(), 1);
    assert_eq!(after.interests[0].interest.id, original.id);
    assert_eq!(after.interests[0].interest.status, InterestStatus::Interested);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn candidate_evaluation_applies_to_all_their_interests() {
    let repo = repo().await;

    let first_pet = available_pet(&repo, "Rex").await;
    let second_pet = available_pet(&repo, "Luna").await;
    let applicant = candidate(&repo, "Alice", Some(first_pet.pet.id)).await;
    repo.create_interest(applicant.candidate.id, second_pet.pet.id)
        .await
        .expect("second interest created");

    let evaluated = repo
        .update_candidate_status(
            applicant.candidate.id,
            CandidateStatus::Approved,
            Some("home visit went well"),
        )
        .await
        .expect("evaluation applies");

    assert_eq!(evaluated.interests.len(), 2);
    for interest in &evaluated.interests {
        assert_eq!(interest.interest.status, InterestStatus::Approved);
        assert!(interest.interest.evaluated_at.is_some());
        assert_eq!(interest.interest.admin_notes.as_deref(), Some("home visit went well"));
    }
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn a_pet_with_adoption_history_cannot_be_deleted() {
    let repo = repo().await;

    let pet = available_pet(&repo, "Toby").await;
    let applicant = candidate(&repo, "Alice", Some(pet.pet.id)).await;

    repo.finalize_adoption(&FinalizeAdoption {
        pet_id: pet.pet.id,
        candidate_id: applicant.candidate.id,
        notes: None,
        fee: None,
    })
    .await
    .expect("adoption finalizes");

    let err = repo.delete_pet(pet.pet.id).await.expect_err("deletion is refused");
    assert!(matches!(err, DbError::Conflict(_)), "got {err:?}");
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn finalizing_against_missing_entities_names_the_missing_one() {
    let repo = repo().await;

    let pet = available_pet(&repo, "Ziggy").await;
    let applicant = candidate(&repo, "Alice", None).await;

    let err = repo
        .finalize_adoption(&FinalizeAdoption {
            pet_id: Uuid::new_v4(),
            candidate_id: applicant.candidate.id,
            notes: None,
            fee: None,
        })
        .await
        .expect_err("unknown pet is refused");
    assert!(matches!(err, DbError::NotFound("Pet")), "got {err:?}");

    let err = repo
        .finalize_adoption(&FinalizeAdoption {
            pet_id: pet.pet.id,
            candidate_id: Uuid::new_v4(),
            notes: None,
            fee: None,
        })
        .await
        .expect_err("unknown candidate is refused");
    assert!(matches!(err, DbError::NotFound("Candidate")), "got {err:?}");
}
