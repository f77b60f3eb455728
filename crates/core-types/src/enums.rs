use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a pet listing. Stored as TEXT in the `pets` table.
///
/// Only the adoption coordinator moves a pet into `Adopted` and back out of
/// it; the other states are set directly by admins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum PetStatus {
    Available,
    InProcess,
    Adopted,
    Unavailable,
}

impl PetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PetStatus::Available => "available",
            PetStatus::InProcess => "in_process",
            PetStatus::Adopted => "adopted",
            PetStatus::Unavailable => "unavailable",
        }
    }
}

/// Lifecycle state of a finalized adoption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum AdoptionStatus {
    Active,
    Cancelled,
    Returned,
}

impl AdoptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdoptionStatus::Active => "active",
            AdoptionStatus::Cancelled => "cancelled",
            AdoptionStatus::Returned => "returned",
        }
    }

    /// Whether moving an adoption into this state puts the pet back up
    /// for adoption.
    pub fn releases_pet(&self) -> bool {
        matches!(self, AdoptionStatus::Cancelled | AdoptionStatus::Returned)
    }
}

/// State of one candidate's interest in one pet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum InterestStatus {
    Interested,
    Approved,
    Rejected,
}

impl InterestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterestStatus::Interested => "interested",
            InterestStatus::Approved => "approved",
            InterestStatus::Rejected => "rejected",
        }
    }
}

/// Evaluation state of an adoption candidate, applied in bulk to every
/// interest the candidate holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum CandidateStatus {
    Pending,
    Approved,
    Rejected,
}

impl CandidateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateStatus::Pending => "pending",
            CandidateStatus::Approved => "approved",
            CandidateStatus::Rejected => "rejected",
        }
    }

    /// The interest state a bulk candidate evaluation writes. `Pending`
    /// resets interests to `Interested` since the interest domain has no
    /// pending state of its own.
    pub fn as_interest_status(&self) -> InterestStatus {
        match self {
            CandidateStatus::Pending => InterestStatus::Interested,
            CandidateStatus::Approved => InterestStatus::Approved,
            CandidateStatus::Rejected => InterestStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Species {
    Dog,
    Cat,
    Other,
}

impl Species {
    pub fn as_str(&self) -> &'static str {
        match self {
            Species::Dog => "dog",
            Species::Cat => "cat",
            Species::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Size {
    Small,
    Medium,
    Large,
}

impl Size {
    pub fn as_str(&self) -> &'static str {
        match self {
            Size::Small => "small",
            Size::Medium => "medium",
            Size::Large => "large",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

/// Role carried by an authenticated back-office user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Staff,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Staff => "staff",
        }
    }
}

macro_rules! impl_display_fromstr {
    ($ty:ident, $kind:literal, [$(($variant:ident, $text:literal)),+ $(,)?]) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($ty::$variant),)+
                    other => Err(CoreError::UnknownVariant($kind, other.to_string())),
                }
            }
        }
    };
}

impl_display_fromstr!(PetStatus, "pet status", [
    (Available, "available"),
    (InProcess, "in_process"),
    (Adopted, "adopted"),
    (Unavailable, "unavailable"),
]);
impl_display_fromstr!(AdoptionStatus, "adoption status", [
    (Active, "active"),
    (Cancelled, "cancelled"),
    (Returned, "returned"),
]);
impl_display_fromstr!(InterestStatus, "interest status", [
    (Interested, "interested"),
    (Approved, "approved"),
    (Rejected, "rejected"),
]);
impl_display_fromstr!(CandidateStatus, "candidate status", [
    (Pending, "pending"),
    (Approved, "approved"),
    (Rejected, "rejected"),
]);
impl_display_fromstr!(Species, "species", [
    (Dog, "dog"),
    (Cat, "cat"),
    (Other, "other"),
]);
impl_display_fromstr!(Size, "size", [
    (Small, "small"),
    (Medium, "medium"),
    (Large, "large"),
]);
impl_display_fromstr!(Sex, "sex", [(Male, "male"), (Female, "female")]);
impl_display_fromstr!(UserRole, "user role", [(Admin, "admin"), (Staff, "staff")]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_round_trip_through_their_text_form() {
        assert_eq!("in_process".parse::<PetStatus>().unwrap(), PetStatus::InProcess);
        assert_eq!(PetStatus::InProcess.to_string(), "in_process");
        assert_eq!("returned".parse::<AdoptionStatus>().unwrap(), AdoptionStatus::Returned);
        assert_eq!("interested".parse::<InterestStatus>().unwrap(), InterestStatus::Interested);
    }

    #[test]
    fn unknown_variant_is_rejected_with_the_kind_name() {
        let err = "lost".parse::<PetStatus>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid pet status: 'lost' is not a recognized value");
    }

    #[test]
    fn cancelled_and_returned_release_the_pet() {
        assert!(AdoptionStatus::Cancelled.releases_pet());
        assert!(AdoptionStatus::Returned.releases_pet());
        assert!(!AdoptionStatus::Active.releases_pet());
    }

    #[test]
    fn pending_candidate_evaluation_resets_interests() {
        assert_eq!(CandidateStatus::Pending.as_interest_status(), InterestStatus::Interested);
        assert_eq!(CandidateStatus::Rejected.as_interest_status(), InterestStatus::Rejected);
    }

    #[test]
    fn enums_serialize_as_snake_case_json() {
        assert_eq!(serde_json::to_string(&PetStatus::InProcess).unwrap(), "\"in_process\"");
        assert_eq!(serde_json::to_string(&Species::Dog).unwrap(), "\"dog\"");
    }
}
