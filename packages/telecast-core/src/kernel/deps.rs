//! Core dependencies for domain operations (using traits for testability)
//!
//! This module provides the central dependency container used by the auth
//! flow and the dispatch engine. Both external services (session store,
//! platform connector) use trait abstractions to enable testing.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use telegram::{TelegramConnection, TelegramOptions, TelegramService};

use crate::config::Config;
use crate::domains::auth::session::PgSessionStore;
use crate::kernel::{
    BaseConnector, BasePlatformConnection, BaseSessionStore, Profile, RecipientRef, SendReceipt,
};

/// Delay between consecutive sends of one dispatch batch.
pub const SEND_DELAY: Duration = Duration::from_millis(200);

// =============================================================================
// TelegramService Adapter (implements BaseConnector trait)
// =============================================================================

/// Wrapper around TelegramService that implements the BaseConnector trait
pub struct TelegramConnector(pub Arc<TelegramService>);

impl TelegramConnector {
    pub fn new(service: Arc<TelegramService>) -> Self {
        Self(service)
    }
}

#[async_trait]
impl BaseConnector for TelegramConnector {
    async fn open(&self, auth_blob: Option<&str>) -> Result<Box<dyn BasePlatformConnection>> {
        let connection = self
            .0
            .connect(auth_blob.filter(|blob| !blob.is_empty()))
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        Ok(Box::new(TelegramConnectionAdapter(connection)))
    }
}

/// Wrapper around a live TelegramConnection that implements
/// BasePlatformConnection
pub struct TelegramConnectionAdapter(pub TelegramConnection);

#[async_trait]
impl BasePlatformConnection for TelegramConnectionAdapter {
    async fn request_code(&self, phone: &str) -> Result<()> {
        self.0
            .request_code(phone)
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))
    }

    async fn sign_in(&self, phone: &str, code: &str) -> Result<()> {
        self.0
            .sign_in(phone, code)
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))
    }

    async fn sign_in_with_password(&self, password: &str) -> Result<()> {
        self.0
            .sign_in_with_password(password)
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))
    }

    async fn check_authorization(&self) -> Result<bool> {
        self.0
            .check_authorization()
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))
    }

    async fn get_profile(&self) -> Result<Profile> {
        let user = self
            .0
            .get_profile()
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        Ok(Profile {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            phone: user.phone,
        })
    }

    async fn resolve_recipient(&self, username: &str) -> Result<RecipientRef> {
        let peer = self
            .0
            .resolve_username(username)
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        Ok(RecipientRef {
            peer_id: peer.peer_id,
            access_hash: peer.access_hash,
            username: peer.username,
        })
    }

    async fn send_message(&self, recipient: &RecipientRef, message: &str) -> Result<SendReceipt> {
        let peer = telegram::models::Peer {
            peer_id: recipient.peer_id,
            access_hash: recipient.access_hash,
            username: recipient.username.clone(),
        };
        let sent = self
            .0
            .send_message(&peer, message)
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        Ok(SendReceipt {
            message_id: sent.message_id,
        })
    }

    async fn export_session(&self) -> Result<String> {
        self.0
            .export_session()
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))
    }

    async fn disconnect(&self) -> Result<()> {
        self.0
            .disconnect()
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))
    }
}

// =============================================================================
// CoreDeps
// =============================================================================

/// Dependencies accessible to domain operations (using traits for testability)
#[derive(Clone)]
pub struct CoreDeps {
    pub session_store: Arc<dyn BaseSessionStore>,
    pub connector: Arc<dyn BaseConnector>,
    /// Inter-send delay for dispatch batches. Production constructors use
    /// [`SEND_DELAY`]; tests may shorten it. Sends stay sequential either way.
    pub send_delay: Duration,
}

impl CoreDeps {
    /// Create new CoreDeps with the given dependencies
    pub fn new(
        session_store: Arc<dyn BaseSessionStore>,
        connector: Arc<dyn BaseConnector>,
    ) -> Self {
        Self {
            session_store,
            connector,
            send_delay: SEND_DELAY,
        }
    }

    /// Build production dependencies from configuration: a Postgres-backed
    /// session store and the Telegram gateway connector.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await?;

        let service = TelegramService::new(TelegramOptions::new(
            config.telegram_gateway_url.clone(),
            config.telegram_api_id,
            config.telegram_api_hash.clone(),
        ));

        Ok(Self::new(
            Arc::new(PgSessionStore::new(pool)),
            Arc::new(TelegramConnector::new(Arc::new(service))),
        ))
    }
}
