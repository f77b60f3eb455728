pub mod enums;
pub mod error;

// Re-export the core types to provide a clean public API.
pub use enums::{
    AdoptionStatus, CandidateStatus, InterestStatus, PetStatus, Sex, Size, Species, UserRole,
};
pub use error::CoreError;
