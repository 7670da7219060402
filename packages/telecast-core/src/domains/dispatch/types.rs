//! Dispatch domain data types

use serde::{Deserialize, Serialize};

/// Messages longer than this are truncated before any send.
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// A batch processes at most this many recipients; extras are ignored.
pub const MAX_RECIPIENTS: usize = 100;

/// Per-recipient outcome. A failed recipient never aborts the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DispatchOutcome {
    #[serde(rename_all = "camelCase")]
    Sent { recipient: String, message_id: i64 },
    #[serde(rename_all = "camelCase")]
    Failed { recipient: String, error: String },
}

impl DispatchOutcome {
    pub fn recipient(&self) -> &str {
        match self {
            DispatchOutcome::Sent { recipient, .. } => recipient,
            DispatchOutcome::Failed { recipient, .. } => recipient,
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, DispatchOutcome::Sent { .. })
    }
}

/// Result of a bulk send: either the full ordered outcome list, or a
/// top-level error for failures that never reached the recipient loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<DispatchOutcome>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DispatchResponse {
    pub fn completed(outcomes: Vec<DispatchOutcome>) -> Self {
        Self {
            data: Some(outcomes),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_wire_shape() {
        let value = serde_json::to_value(DispatchResponse::completed(vec![
            DispatchOutcome::Sent {
                recipient: "alice".to_string(),
                message_id: 7,
            },
            DispatchOutcome::Failed {
                recipient: "bob".to_string(),
                error: "USERNAME_NOT_OCCUPIED (400)".to_string(),
            },
        ]))
        .unwrap();

        assert_eq!(value["data"][0]["status"], "sent");
        assert_eq!(value["data"][0]["messageId"], 7);
        assert_eq!(value["data"][1]["status"], "failed");
        assert_eq!(value["data"][1]["recipient"], "bob");
        assert!(value.get("error").is_none());
    }
}
