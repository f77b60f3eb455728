//! # Pawhaven Database Crate
//!
//! This crate acts as a high-level, application-specific interface to the
//! PostgreSQL database. It is the system's single source of truth for pets,
//! candidates, interests and adoptions.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** This crate encapsulates all database-specific logic. It
//!   provides a clean, abstract API to the rest of the application, hiding
//!   the underlying SQL and database implementation details.
//! - **Explicit Transactions:** The adoption lifecycle spans three tables
//!   (pets, interests, adoptions). Every cross-entity transition runs as one
//!   explicit `sqlx` transaction on the repository — there are no implicit
//!   cascades.
//! - **Storage-Enforced Invariants:** "At most one active adoption per pet"
//!   and "at most one interest per (candidate, pet) pair" are backed by
//!   unique indexes, not just application checks.
//! - **Asynchronous & Pooled:** All operations are asynchronous, and it uses
//!   a connection pool (`PgPool`) for high-performance, concurrent access.
//!
//! ## Public API
//!
//! - `connect`: The async function to establish the database connection pool.
//! - `run_migrations`: A utility to apply database migrations, ensuring the
//!   schema is up-to-date.
//! - `DbRepository`: The main struct that holds the connection pool and
//!   provides all the high-level data access methods (e.g.
//!   `finalize_adoption`).
//! - `DbError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use repository::{
    Adoption, AdoptionDetails, AdoptionStats, AdoptionWithPet, Candidate, CandidateDetails,
    CandidateStats, CandidateSummary, DbRepository, FinalizeAdoption, Interest, InterestDetails,
    InterestWithPet, MonthlyAdoptions, NewCandidate, NewPet, NewPetImage, NewUser, Pet, PetFilter,
    PetImage, PetStats, PetSummary, PetUpdate, PetWithImages, User,
};
