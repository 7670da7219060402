// HTTP client for a Telegram MTProto gateway.
//
// The gateway terminates the MTProto transport and exposes the handful of
// operations this workspace needs (code request, sign-in, send) as plain
// JSON endpoints keyed by a connection id.

pub mod models;

use reqwest::Client;
use serde_json::json;

use crate::models::{
    ApiErrorBody, AuthorizationStatus, ConnectResponse, Peer, SentMessage, SessionExport, User,
};

#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    /// Error reported by the gateway/platform itself. The message carries
    /// the upstream Telegram error code verbatim (e.g. SESSION_PASSWORD_NEEDED).
    #[error("telegram api error: {0}")]
    Api(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected gateway response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone)]
pub struct TelegramOptions {
    pub base_url: String,
    pub api_id: i32,
    pub api_hash: String,
    /// Handshake attempts before `connect` gives up.
    pub connection_retries: u32,
}

impl TelegramOptions {
    pub fn new(base_url: String, api_id: i32, api_hash: String) -> Self {
        Self {
            base_url,
            api_id,
            api_hash,
            connection_retries: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelegramService {
    options: TelegramOptions,
    http: Client,
}

impl TelegramService {
    pub fn new(options: TelegramOptions) -> Self {
        Self {
            options,
            http: Client::new(),
        }
    }

    /// Open a fresh connection, optionally restoring an exported session.
    ///
    /// Retries the handshake on transport errors up to the configured
    /// attempt count; gateway-reported errors are not retried.
    pub async fn connect(
        &self,
        session: Option<&str>,
    ) -> Result<TelegramConnection, TelegramError> {
        let url = format!("{}/connect", self.options.base_url);
        let body = json!({
            "api_id": self.options.api_id,
            "api_hash": self.options.api_hash,
            "session": session.unwrap_or(""),
        });

        let mut last_err: Option<TelegramError> = None;
        for _ in 0..self.options.connection_retries.max(1) {
            let res = self.http.post(&url).json(&body).send().await;
            match res {
                Ok(response) => {
                    let connected: ConnectResponse = decode(response).await?;
                    return Ok(TelegramConnection {
                        http: self.http.clone(),
                        base_url: self.options.base_url.clone(),
                        connection_id: connected.connection_id,
                    });
                }
                Err(e) => last_err = Some(TelegramError::Transport(e)),
            }
        }
        Err(last_err
            .unwrap_or_else(|| TelegramError::Decode("connect produced no response".into())))
    }
}

/// A live gateway connection. Short-lived: callers open one per operation
/// and must disconnect on every exit path.
#[derive(Debug, Clone)]
pub struct TelegramConnection {
    http: Client,
    base_url: String,
    connection_id: String,
}

impl TelegramConnection {
    fn url(&self, op: &str) -> String {
        format!("{}/connections/{}/{}", self.base_url, self.connection_id, op)
    }

    /// Ask the platform to deliver a verification code to `phone`.
    pub async fn request_code(&self, phone: &str) -> Result<(), TelegramError> {
        let response = self
            .http
            .post(self.url("sendCode"))
            .json(&json!({ "phone": phone }))
            .send()
            .await?;
        check(response).await
    }

    /// Complete sign-in with the delivered code.
    ///
    /// Accounts with a cloud password fail here with the
    /// SESSION_PASSWORD_NEEDED error code; callers follow up with
    /// [`sign_in_with_password`](Self::sign_in_with_password).
    pub async fn sign_in(&self, phone: &str, code: &str) -> Result<(), TelegramError> {
        let response = self
            .http
            .post(self.url("signIn"))
            .json(&json!({ "phone": phone, "code": code }))
            .send()
            .await?;
        check(response).await
    }

    pub async fn sign_in_with_password(&self, password: &str) -> Result<(), TelegramError> {
        let response = self
            .http
            .post(self.url("checkPassword"))
            .json(&json!({ "password": password }))
            .send()
            .await?;
        check(response).await
    }

    pub async fn check_authorization(&self) -> Result<bool, TelegramError> {
        let response = self.http.get(self.url("authorized")).send().await?;
        let status: AuthorizationStatus = decode(response).await?;
        Ok(status.authorized)
    }

    pub async fn get_profile(&self) -> Result<User, TelegramError> {
        let response = self.http.get(self.url("me")).send().await?;
        decode(response).await
    }

    pub async fn resolve_username(&self, username: &str) -> Result<Peer, TelegramError> {
        let response = self
            .http
            .post(self.url("resolveUsername"))
            .json(&json!({ "username": username }))
            .send()
            .await?;
        decode(response).await
    }

    pub async fn send_message(
        &self,
        peer: &Peer,
        message: &str,
    ) -> Result<SentMessage, TelegramError> {
        let response = self
            .http
            .post(self.url("sendMessage"))
            .json(&json!({
                "peer_id": peer.peer_id,
                "access_hash": peer.access_hash,
                "message": message,
            }))
            .send()
            .await?;
        decode(response).await
    }

    /// Export the connection's current authentication state as an opaque
    /// string. Valid at any point of the login sequence, not only after
    /// full sign-in.
    pub async fn export_session(&self) -> Result<String, TelegramError> {
        let response = self.http.get(self.url("session")).send().await?;
        let exported: SessionExport = decode(response).await?;
        Ok(exported.session)
    }

    /// Tear the connection down. Safe to call on a connection the gateway
    /// has already dropped: a gone-connection response counts as success.
    pub async fn disconnect(&self) -> Result<(), TelegramError> {
        let response = self.http.post(self.url("disconnect")).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        check(response).await
    }
}

/// Map a non-2xx gateway response to `TelegramError::Api`.
async fn check(response: reqwest::Response) -> Result<(), TelegramError> {
    if response.status().is_success() {
        return Ok(());
    }
    Err(api_error(response).await)
}

async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, TelegramError> {
    if !response.status().is_success() {
        return Err(api_error(response).await);
    }
    response
        .json::<T>()
        .await
        .map_err(|e| TelegramError::Decode(e.to_string()))
}

async fn api_error(response: reqwest::Response) -> TelegramError {
    let status = response.status();
    match response.json::<ApiErrorBody>().await {
        Ok(body) => TelegramError::Api(format!("{} ({})", body.error_message, body.error_code)),
        Err(_) => TelegramError::Api(format!("gateway returned {}", status)),
    }
}
