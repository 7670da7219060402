// Telecast - Telegram bulk-broadcast core
//
// This crate provides the session lifecycle and authentication state machine
// for a Telegram account (phone -> verification code -> optional password),
// plus the rate-limited dispatch engine that sends one message to a batch of
// recipients using the stored session.
//
// The HTTP surface and the MTProto transport live outside this crate: the
// first belongs to the host application, the second behind the `telegram`
// gateway client.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;

pub use config::*;
