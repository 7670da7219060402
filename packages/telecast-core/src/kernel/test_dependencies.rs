// TestDependencies - mock implementations for testing
//
// Provides an in-memory session store and a scripted platform connector
// that can be injected into CoreDeps for tests.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use super::{
    BaseConnector, BasePlatformConnection, BaseSessionStore, Profile, RecipientRef, SendReceipt,
};

// =============================================================================
// In-Memory Session Store
// =============================================================================

/// HashMap-backed session store with the same read-time expiry semantics as
/// the Postgres implementation. Expired rows stay in the map and are simply
/// invisible to `get`.
#[derive(Default)]
pub struct MemorySessionStore {
    records: Mutex<HashMap<String, (String, Option<DateTime<Utc>>)>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of physically stored records, expired ones included.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BaseSessionStore for MemorySessionStore {
    async fn put(&self, token: &str, auth_blob: &str, ttl_seconds: Option<u64>) -> Result<()> {
        let expires_at = ttl_seconds.map(|ttl| Utc::now() + Duration::seconds(ttl as i64));
        self.records
            .lock()
            .unwrap()
            .insert(token.to_string(), (auth_blob.to_string(), expires_at));
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<String>> {
        let records = self.records.lock().unwrap();
        Ok(records.get(token).and_then(|(blob, expires_at)| {
            match expires_at {
                Some(at) if *at <= Utc::now() => None,
                _ => Some(blob.clone()),
            }
        }))
    }

    async fn delete(&self, token: &str) -> Result<()> {
        self.records.lock().unwrap().remove(token);
        Ok(())
    }
}

// =============================================================================
// Mock Platform (connector + connections over shared scripted state)
// =============================================================================

/// Scripted outcome for a `sign_in` call
#[derive(Debug, Clone)]
pub enum ScriptedSignIn {
    Success,
    SecondFactorRequired,
    Failure(String),
}

#[derive(Default)]
struct MockPlatformState {
    sign_in_script: Vec<ScriptedSignIn>,
    password: Option<String>,
    authorized: bool,
    connect_error: Option<String>,
    failing_recipients: HashSet<String>,
    export_counter: usize,
    // recorded calls
    opened_blobs: Vec<Option<String>>,
    disconnects: usize,
    code_requests: Vec<String>,
    sent: Vec<(String, String)>,
}

/// Shared scripted platform. Clone-cheap: connector and connections all
/// point at the same state so tests can assert across calls.
#[derive(Clone)]
pub struct MockPlatform {
    state: Arc<Mutex<MockPlatformState>>,
}

impl MockPlatform {
    pub fn new() -> Self {
        let state = MockPlatformState {
            authorized: true,
            ..Default::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Queue an outcome for the next `sign_in` call (FIFO; defaults to
    /// Success when the queue is empty).
    pub fn with_sign_in_result(self, result: ScriptedSignIn) -> Self {
        self.state.lock().unwrap().sign_in_script.push(result);
        self
    }

    /// Require this password on `sign_in_with_password`; any other value
    /// fails. Without this, any password succeeds.
    pub fn with_password(self, password: &str) -> Self {
        self.state.lock().unwrap().password = Some(password.to_string());
        self
    }

    pub fn with_authorized(self, authorized: bool) -> Self {
        self.state.lock().unwrap().authorized = authorized;
        self
    }

    /// Make every `open` fail with the given error.
    pub fn with_connect_error(self, error: &str) -> Self {
        self.state.lock().unwrap().connect_error = Some(error.to_string());
        self
    }

    /// Make resolution of this recipient fail.
    pub fn with_failing_recipient(self, username: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_recipients
            .insert(username.to_string());
        self
    }

    pub fn connector(&self) -> MockConnector {
        MockConnector {
            state: self.state.clone(),
        }
    }

    // ---- recorded-call accessors ----

    pub fn open_count(&self) -> usize {
        self.state.lock().unwrap().opened_blobs.len()
    }

    pub fn disconnect_count(&self) -> usize {
        self.state.lock().unwrap().disconnects
    }

    /// Auth blobs passed to `open`, in call order.
    pub fn opened_blobs(&self) -> Vec<Option<String>> {
        self.state.lock().unwrap().opened_blobs.clone()
    }

    pub fn code_requests(&self) -> Vec<String> {
        self.state.lock().unwrap().code_requests.clone()
    }

    /// (recipient, message) pairs in send order.
    pub fn sent_messages(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().sent.clone()
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

pub struct MockConnector {
    state: Arc<Mutex<MockPlatformState>>,
}

#[async_trait]
impl BaseConnector for MockConnector {
    async fn open(&self, auth_blob: Option<&str>) -> Result<Box<dyn BasePlatformConnection>> {
        let mut state = self.state.lock().unwrap();
        state.opened_blobs.push(auth_blob.map(str::to_string));
        if let Some(error) = &state.connect_error {
            return Err(anyhow::anyhow!("{}", error));
        }
        Ok(Box::new(MockConnection {
            state: self.state.clone(),
        }))
    }
}

pub struct MockConnection {
    state: Arc<Mutex<MockPlatformState>>,
}

#[async_trait]
impl BasePlatformConnection for MockConnection {
    async fn request_code(&self, phone: &str) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .code_requests
            .push(phone.to_string());
        Ok(())
    }

    async fn sign_in(&self, _phone: &str, _code: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let scripted = if state.sign_in_script.is_empty() {
            ScriptedSignIn::Success
        } else {
            state.sign_in_script.remove(0)
        };
        match scripted {
            ScriptedSignIn::Success => Ok(()),
            ScriptedSignIn::SecondFactorRequired => {
                Err(anyhow::anyhow!("telegram api error: SESSION_PASSWORD_NEEDED (401)"))
            }
            ScriptedSignIn::Failure(message) => Err(anyhow::anyhow!("{}", message)),
        }
    }

    async fn sign_in_with_password(&self, password: &str) -> Result<()> {
        let state = self.state.lock().unwrap();
        match &state.password {
            Some(expected) if expected != password => {
                Err(anyhow::anyhow!("telegram api error: PASSWORD_HASH_INVALID (400)"))
            }
            _ => Ok(()),
        }
    }

    async fn check_authorization(&self) -> Result<bool> {
        Ok(self.state.lock().unwrap().authorized)
    }

    async fn get_profile(&self) -> Result<Profile> {
        Ok(Profile {
            id: 42,
            username: Some("mock_user".to_string()),
            first_name: Some("Mock".to_string()),
            phone: Some("+15551234567".to_string()),
        })
    }

    async fn resolve_recipient(&self, username: &str) -> Result<RecipientRef> {
        let state = self.state.lock().unwrap();
        if state.failing_recipients.contains(username) {
            return Err(anyhow::anyhow!("telegram api error: USERNAME_NOT_OCCUPIED (400)"));
        }
        Ok(RecipientRef {
            peer_id: username.len() as i64,
            access_hash: 0,
            username: username.to_string(),
        })
    }

    async fn send_message(&self, recipient: &RecipientRef, message: &str) -> Result<SendReceipt> {
        let mut state = self.state.lock().unwrap();
        state
            .sent
            .push((recipient.username.clone(), message.to_string()));
        Ok(SendReceipt {
            message_id: state.sent.len() as i64,
        })
    }

    async fn export_session(&self) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.export_counter += 1;
        Ok(format!("mock-session-{}", state.export_counter))
    }

    async fn disconnect(&self) -> Result<()> {
        self.state.lock().unwrap().disconnects += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let store = MemorySessionStore::new();
        store.put("t1", "blob-a", None).await.unwrap();
        assert_eq!(store.get("t1").await.unwrap(), Some("blob-a".to_string()));
    }

    #[tokio::test]
    async fn test_put_is_an_upsert() {
        let store = MemorySessionStore::new();
        store.put("t1", "blob-a", Some(300)).await.unwrap();
        store.put("t1", "blob-b", None).await.unwrap();
        assert_eq!(store.get("t1").await.unwrap(), Some("blob-b".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_expired_record_reads_as_absent_but_stays_stored() {
        let store = MemorySessionStore::new();
        store.put("t1", "blob-a", Some(0)).await.unwrap();
        assert_eq!(store.get("t1").await.unwrap(), None);
        // Lazy invalidation: the row is still physically there
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_is_unconditional() {
        let store = MemorySessionStore::new();
        store.delete("missing").await.unwrap();
        store.put("t1", "blob-a", None).await.unwrap();
        store.delete("t1").await.unwrap();
        assert_eq!(store.get("t1").await.unwrap(), None);
        assert!(store.is_empty());
    }
}
