//! Authentication for the back office.
//!
//! Admin-only routes authenticate with a bearer JWT issued by the login
//! endpoint. Handlers opt in by taking the [`AdminUser`] extractor as a
//! parameter; the extractor verifies the token, loads the user, and checks
//! the role, so an unauthenticated request never reaches a handler body.

pub mod extract;
pub mod password;
pub mod token;

pub use extract::{AdminUser, AuthUser, BearerToken};
pub use token::{Claims, TokenError};
