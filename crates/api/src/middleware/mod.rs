//! Request middleware.

pub mod identity;

pub use identity::{CurrentUser, identity_middleware};
