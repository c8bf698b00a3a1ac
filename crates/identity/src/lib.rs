//! `mercado-identity` — user accounts: registration and login.

pub mod service;
pub mod user;

pub use service::{IdentityError, IdentityService, LoginOutcome, RegisterRequest};
pub use user::{UserRecord, UserSummary, normalize_email};
