//! Common types shared across domains.

pub mod errors;

pub use errors::{is_second_factor_required, AuthError};
