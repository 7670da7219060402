//! Auth flow controller
//!
//! Drives the login state machine across otherwise-stateless calls:
//!
//!   Anonymous -> CodeRequested -> (Awaiting2FA | Authenticated)
//!
//! No live connection survives between steps. Each step re-hydrates a fresh
//! connection from the blob stored under the caller's token, does its work,
//! and tears the connection down on every exit path.

use anyhow::Result;
use tracing::{debug, info, warn};

use super::session::{mint_token, PENDING_AUTH_TTL_SECONDS};
use super::types::{
    ProfileResponse, RequestCodeResponse, SecondFactorResponse, SubmitCodeResponse,
};
use crate::common::{is_second_factor_required, AuthError};
use crate::kernel::{BasePlatformConnection, CoreDeps};

/// Close a connection whose operation is already decided. A failed teardown
/// must not change the outcome, so it is only logged.
async fn close_quietly(conn: &dyn BasePlatformConnection) {
    if let Err(e) = conn.disconnect().await {
        warn!("Failed to disconnect platform connection: {:#}", e);
    }
}

/// Request a verification code for `phone`.
///
/// On success the connection's intermediate auth state is persisted as a
/// pending record under a fresh temp token (300s TTL) and that token is
/// returned for the caller to carry into the next step.
pub async fn request_code(deps: &CoreDeps, phone: &str) -> RequestCodeResponse {
    debug!("Requesting verification code");

    if !phone.starts_with('+') {
        return RequestCodeResponse::failed(
            "Phone number must include country code (e.g., +1234567890)",
        );
    }

    let conn = match deps.connector.open(None).await {
        Ok(conn) => conn,
        Err(e) => return RequestCodeResponse::failed(format!("Failed to connect: {e:#}")),
    };

    let outcome = async {
        conn.request_code(phone).await?;
        let auth_blob = conn.export_session().await?;
        let temp_token = mint_token();
        deps.session_store
            .put(&temp_token, &auth_blob, Some(PENDING_AUTH_TTL_SECONDS))
            .await?;
        Ok::<_, anyhow::Error>(temp_token)
    }
    .await;

    close_quietly(conn.as_ref()).await;

    match outcome {
        Ok(temp_token) => {
            info!("Verification code requested, pending auth stored");
            RequestCodeResponse::sent(temp_token)
        }
        Err(e) => RequestCodeResponse::failed(format!("Failed to send code: {e:#}")),
    }
}

/// Submit the verification code delivered to `phone`.
///
/// Unknown or expired temp tokens fail without contacting the platform.
/// When the account requires a second factor, the pending state is
/// re-exported and re-stored under the *same* temp token so the password
/// step can resume from fresh material.
pub async fn submit_code(
    deps: &CoreDeps,
    temp_token: &str,
    phone: &str,
    code: &str,
) -> SubmitCodeResponse {
    debug!("Submitting verification code");

    let auth_blob = match deps.session_store.get(temp_token).await {
        Ok(Some(blob)) => blob,
        Ok(None) => return SubmitCodeResponse::failed(AuthError::InvalidToken.to_string()),
        Err(e) => return SubmitCodeResponse::failed(format!("Session lookup failed: {e:#}")),
    };

    let conn = match deps.connector.open(Some(&auth_blob)).await {
        Ok(conn) => conn,
        Err(e) => return SubmitCodeResponse::failed(format!("Failed to connect: {e:#}")),
    };

    match conn.sign_in(phone, code).await {
        Ok(()) => {
            let outcome = finish_sign_in(deps, conn.as_ref(), temp_token).await;
            close_quietly(conn.as_ref()).await;
            match outcome {
                Ok(session_token) => {
                    info!("Sign-in complete, session created");
                    SubmitCodeResponse::authenticated(session_token)
                }
                Err(e) => {
                    SubmitCodeResponse::failed(format!("Failed to persist session: {e:#}"))
                }
            }
        }
        Err(e) if is_second_factor_required(&e) => {
            // The sign-in attempt advanced the connection's internal state,
            // so the stored pending material is stale. Re-export and
            // re-store under the same token before handing the flow back.
            let refreshed = async {
                let auth_blob = conn.export_session().await?;
                deps.session_store
                    .put(temp_token, &auth_blob, Some(PENDING_AUTH_TTL_SECONDS))
                    .await
            }
            .await;
            close_quietly(conn.as_ref()).await;
            match refreshed {
                Ok(()) => {
                    info!("Second factor required, pending auth refreshed");
                    SubmitCodeResponse::needs_second_factor(temp_token.to_string())
                }
                Err(e) => SubmitCodeResponse::failed(format!(
                    "Failed to preserve pending auth state: {e:#}"
                )),
            }
        }
        Err(e) => {
            close_quietly(conn.as_ref()).await;
            SubmitCodeResponse::failed(format!("Sign-in failed: {e:#}"))
        }
    }
}

/// Submit the account password (second factor).
pub async fn submit_second_factor(
    deps: &CoreDeps,
    temp_token: &str,
    password: &str,
) -> SecondFactorResponse {
    debug!("Submitting second factor");

    let auth_blob = match deps.session_store.get(temp_token).await {
        Ok(Some(blob)) => blob,
        Ok(None) => return SecondFactorResponse::failed(AuthError::InvalidToken.to_string()),
        Err(e) => return SecondFactorResponse::failed(format!("Session lookup failed: {e:#}")),
    };

    let conn = match deps.connector.open(Some(&auth_blob)).await {
        Ok(conn) => conn,
        Err(e) => return SecondFactorResponse::failed(format!("Failed to connect: {e:#}")),
    };

    let outcome = async {
        conn.sign_in_with_password(password)
            .await
            .map_err(|e| anyhow::anyhow!("Sign-in failed: {e:#}"))?;
        finish_sign_in(deps, conn.as_ref(), temp_token).await
    }
    .await;

    close_quietly(conn.as_ref()).await;

    match outcome {
        Ok(session_token) => {
            info!("Second factor accepted, session created");
            SecondFactorResponse::authenticated(session_token)
        }
        Err(e) => SecondFactorResponse::failed(format!("{e:#}")),
    }
}

/// Persist the fully-authenticated state under a fresh session token (no
/// expiry) and retire the pending record.
async fn finish_sign_in(
    deps: &CoreDeps,
    conn: &dyn BasePlatformConnection,
    temp_token: &str,
) -> Result<String> {
    let auth_blob = conn.export_session().await?;
    let session_token = mint_token();
    deps.session_store.put(&session_token, &auth_blob, None).await?;
    deps.session_store.delete(temp_token).await?;
    Ok(session_token)
}

/// Whether `session_token` identifies a live, platform-confirmed session.
///
/// Never raises: unresolvable tokens, expired records, and provider
/// failures all read as "not authorized".
pub async fn is_authorized(deps: &CoreDeps, session_token: &str) -> bool {
    let auth_blob = match deps.session_store.get(session_token).await {
        Ok(Some(blob)) => blob,
        Ok(None) => return false,
        Err(e) => {
            warn!("Session lookup failed during authorization check: {:#}", e);
            return false;
        }
    };

    let conn = match deps.connector.open(Some(&auth_blob)).await {
        Ok(conn) => conn,
        Err(e) => {
            warn!("Failed to connect during authorization check: {:#}", e);
            return false;
        }
    };

    let authorized = conn.check_authorization().await;
    close_quietly(conn.as_ref()).await;

    authorized.unwrap_or_else(|e| {
        warn!("Authorization check failed: {:#}", e);
        false
    })
}

/// Fetch the authenticated account's profile.
pub async fn fetch_profile(deps: &CoreDeps, session_token: &str) -> ProfileResponse {
    if session_token.trim().is_empty() {
        return ProfileResponse::failed(AuthError::NotAuthenticated.to_string());
    }

    let auth_blob = match deps.session_store.get(session_token).await {
        Ok(Some(blob)) => blob,
        Ok(None) => return ProfileResponse::failed(AuthError::SessionNotFound.to_string()),
        Err(e) => return ProfileResponse::failed(format!("Session lookup failed: {e:#}")),
    };

    let conn = match deps.connector.open(Some(&auth_blob)).await {
        Ok(conn) => conn,
        Err(e) => return ProfileResponse::failed(format!("Failed to connect: {e:#}")),
    };

    let profile = conn.get_profile().await;
    close_quietly(conn.as_ref()).await;

    match profile {
        Ok(profile) => ProfileResponse::ok(profile),
        Err(e) => ProfileResponse::failed(AuthError::Provider(format!("{e:#}")).to_string()),
    }
}

/// Logout (delete the stored session)
pub async fn logout(deps: &CoreDeps, session_token: &str) -> Result<()> {
    deps.session_store.delete(session_token).await?;
    info!("Session deleted");
    Ok(())
}
