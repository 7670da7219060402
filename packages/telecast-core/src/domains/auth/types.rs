//! Auth domain data types
//!
//! Simple, serializable result types returned by the auth flow. Every
//! failure is a value here; faults never cross the operation boundary.

use serde::{Deserialize, Serialize};

use crate::kernel::Profile;

/// Result of requesting a verification code
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestCodeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RequestCodeResponse {
    pub fn sent(temp_token: String) -> Self {
        Self {
            success: true,
            temp_token: Some(temp_token),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            temp_token: None,
            error: Some(error.into()),
        }
    }
}

/// Result of submitting a verification code
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitCodeResponse {
    pub success: bool,
    #[serde(rename = "needs2FA")]
    pub needs_2fa: bool,
    /// On the 2FA branch: the same temp token, reusable for the password step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmitCodeResponse {
    pub fn authenticated(session_token: String) -> Self {
        Self {
            success: true,
            needs_2fa: false,
            temp_token: None,
            session_token: Some(session_token),
            error: None,
        }
    }

    pub fn needs_second_factor(temp_token: String) -> Self {
        Self {
            success: false,
            needs_2fa: true,
            temp_token: Some(temp_token),
            session_token: None,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            needs_2fa: false,
            temp_token: None,
            session_token: None,
            error: Some(error.into()),
        }
    }
}

/// Result of submitting the second factor (account password)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecondFactorResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SecondFactorResponse {
    pub fn authenticated(session_token: String) -> Self {
        Self {
            success: true,
            session_token: Some(session_token),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            session_token: None,
            error: Some(error.into()),
        }
    }
}

/// Result of fetching the authenticated account's profile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Profile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProfileResponse {
    pub fn ok(profile: Profile) -> Self {
        Self {
            data: Some(profile),
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
    fn test_request_code_wire_shape() {
        let value =
            serde_json::to_value(RequestCodeResponse::sent("t-1".to_string())).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["tempToken"], "t-1");
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_needs_2fa_wire_shape() {
        let value =
            serde_json::to_value(SubmitCodeResponse::needs_second_factor("t-1".to_string()))
                .unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["needs2FA"], true);
        assert_eq!(value["tempToken"], "t-1");
    }

    #[test]
    fn test_authenticated_wire_shape() {
        let value =
            serde_json::to_value(SubmitCodeResponse::authenticated("s-1".to_string())).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["needs2FA"], false);
        assert_eq!(value["sessionToken"], "s-1");
        assert!(value.get("tempToken").is_none());
    }
}
