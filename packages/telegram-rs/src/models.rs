use serde::{Deserialize, Serialize};

/// Response to a successful `/connect` handshake.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectResponse {
    pub connection_id: String,
}

/// The connection's exported authentication state, opaque to callers.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionExport {
    pub session: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizationStatus {
    pub authorized: bool,
}

/// The account behind an authorized connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

/// A resolved peer, addressable for message sends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Peer {
    pub peer_id: i64,
    pub access_hash: i64,
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SentMessage {
    pub message_id: i64,
    pub date: i64,
}

/// Error body returned by the gateway on non-2xx responses.
///
/// `error_message` carries the upstream Telegram error code verbatim
/// (e.g. `SESSION_PASSWORD_NEEDED`, `PHONE_CODE_INVALID`).
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error_code: i32,
    pub error_message: String,
}
