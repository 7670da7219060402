// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic (auth flow, dispatch) lives in domain functions that use
// these traits.
//
// Naming convention: Base* for trait names (e.g., BaseSessionStore)

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// =============================================================================
// Session Store Trait (Infrastructure - durable token -> auth blob mapping)
// =============================================================================

#[async_trait]
pub trait BaseSessionStore: Send + Sync {
    /// Upsert the auth blob under `token`. With a TTL the record expires
    /// `ttl_seconds` from now; without one it never expires.
    async fn put(&self, token: &str, auth_blob: &str, ttl_seconds: Option<u64>) -> Result<()>;

    /// Look up `token`. Returns None when no record exists or when the
    /// record's expiry is not after the current time - expired rows are
    /// treated as absent at read time, whether or not they were evicted.
    async fn get(&self, token: &str) -> Result<Option<String>>;

    /// Remove the record. Deleting an unknown token is not an error.
    async fn delete(&self, token: &str) -> Result<()>;
}

// =============================================================================
// Platform Connection Traits (Infrastructure - remote messaging platform)
// =============================================================================

/// The account behind an authorized connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub phone: Option<String>,
}

/// A recipient identifier resolved to a platform-addressable entity.
#[derive(Debug, Clone)]
pub struct RecipientRef {
    pub peer_id: i64,
    pub access_hash: i64,
    pub username: String,
}

/// Confirmation returned by the platform for a delivered message.
#[derive(Debug, Clone)]
pub struct SendReceipt {
    pub message_id: i64,
}

/// A live connection to the remote platform, positioned at whatever
/// authentication state the blob it was opened from encodes.
///
/// Connections are scoped resources: the operation that opens one must call
/// `disconnect` on every exit path. `disconnect` is safe on a connection
/// that is already gone.
#[async_trait]
pub trait BasePlatformConnection: Send + Sync {
    /// Ask the platform to deliver a verification code to `phone`.
    async fn request_code(&self, phone: &str) -> Result<()>;

    /// Submit the delivered code. Accounts with a second factor fail here
    /// with the platform's password-needed signal.
    async fn sign_in(&self, phone: &str, code: &str) -> Result<()>;

    /// Submit the account password (second factor).
    async fn sign_in_with_password(&self, password: &str) -> Result<()>;

    /// Whether the platform considers this connection fully authorized.
    async fn check_authorization(&self) -> Result<bool>;

    async fn get_profile(&self) -> Result<Profile>;

    /// Resolve a recipient identifier (username) to an addressable entity.
    async fn resolve_recipient(&self, username: &str) -> Result<RecipientRef>;

    async fn send_message(&self, recipient: &RecipientRef, message: &str) -> Result<SendReceipt>;

    /// Serialize the connection's current authentication state. Opaque to
    /// this crate; valid at any point of the login sequence.
    async fn export_session(&self) -> Result<String>;

    async fn disconnect(&self) -> Result<()>;
}

/// Opens per-operation connections. A connection is never reused across
/// independent calls into the auth flow or the dispatch engine.
#[async_trait]
pub trait BaseConnector: Send + Sync {
    /// Perform the network handshake and return a connection positioned at
    /// the authentication state `auth_blob` encodes (unauthenticated when
    /// absent).
    async fn open(&self, auth_blob: Option<&str>) -> Result<Box<dyn BasePlatformConnection>>;
}
