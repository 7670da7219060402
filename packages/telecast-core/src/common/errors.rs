use thiserror::Error;

/// Authentication/session errors surfaced as structured result fields
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("invalid or expired token")]
    InvalidToken,

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("session not found")]
    SessionNotFound,

    #[error("no valid usernames provided")]
    NoValidRecipients,

    #[error("provider error: {0}")]
    Provider(String),
}

/// Error code Telegram reports when an account requires its cloud password
/// after code verification.
const SECOND_FACTOR_MARKER: &str = "SESSION_PASSWORD_NEEDED";

/// Whether a provider error is the second-factor signal.
///
/// The platform reports this condition as an error code embedded in free
/// text, so detection is a substring match. All of that brittleness lives
/// here; any error shape this function does not recognize falls through to
/// the caller's generic failure branch.
pub fn is_second_factor_required(error: &anyhow::Error) -> bool {
    format!("{error:#}").contains(SECOND_FACTOR_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_marker_in_gateway_error() {
        let err = anyhow::anyhow!("telegram api error: SESSION_PASSWORD_NEEDED (401)");
        assert!(is_second_factor_required(&err));
    }

    #[test]
    fn test_detects_marker_through_context_chain() {
        let err = anyhow::anyhow!("SESSION_PASSWORD_NEEDED").context("sign-in failed");
        assert!(is_second_factor_required(&err));
    }

    #[test]
    fn test_other_errors_do_not_match() {
        for text in ["PHONE_CODE_INVALID (400)", "connection reset by peer", ""] {
            let err = anyhow::anyhow!("{}", text);
            assert!(!is_second_factor_required(&err), "{text:?} must not match");
        }
    }

    #[test]
    fn test_marker_is_case_sensitive() {
        // The platform emits the code verbatim in upper case; lower-case
        // text is somebody else's error message.
        let err = anyhow::anyhow!("session_password_needed");
        assert!(!is_second_factor_required(&err));
    }
}
