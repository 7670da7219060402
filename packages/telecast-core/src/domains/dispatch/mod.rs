//! Dispatch domain - rate-limited bulk message sending

pub mod edges;
pub mod types;

pub use edges::send_bulk;
pub use types::{DispatchOutcome, DispatchResponse, MAX_MESSAGE_CHARS, MAX_RECIPIENTS};
