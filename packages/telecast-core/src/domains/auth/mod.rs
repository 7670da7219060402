//! Auth domain - session lifecycle and the login state machine
//!
//! Responsibilities:
//! - Phone -> verification code -> optional password sign-in flow
//! - Temp/session token management bridging stateless calls
//! - Durable session persistence with lazy expiry

pub mod edges;
pub mod session;
pub mod types;

pub use edges::{
    fetch_profile, is_authorized, logout, request_code, submit_code, submit_second_factor,
};
pub use session::{mint_token, PgSessionStore, PENDING_AUTH_TTL_SECONDS};
pub use types::{
    ProfileResponse, RequestCodeResponse, SecondFactorResponse, SubmitCodeResponse,
};
