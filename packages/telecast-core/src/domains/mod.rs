//! Domain modules.

pub mod auth;
pub mod dispatch;
