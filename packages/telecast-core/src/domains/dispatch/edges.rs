//! Dispatch engine
//!
//! Sends one message to an ordered batch of recipients over a single
//! per-batch connection. Sends are strictly sequential with a fixed delay
//! between consecutive attempts to stay under the platform's abuse
//! thresholds; per-recipient failures are recorded and the batch continues.

use tracing::{debug, info, warn};

use super::types::{DispatchOutcome, DispatchResponse, MAX_MESSAGE_CHARS, MAX_RECIPIENTS};
use crate::common::AuthError;
use crate::kernel::CoreDeps;

/// Send `message` to each of `recipients` under the session identified by
/// `session_token`.
///
/// Preconditions are checked before any network activity: the token must
/// resolve to a live session, the message is truncated to
/// [`MAX_MESSAGE_CHARS`], and the recipient list is trimmed of blank
/// entries and capped at [`MAX_RECIPIENTS`] (input order preserved).
pub async fn send_bulk(
    deps: &CoreDeps,
    session_token: &str,
    message: &str,
    recipients: &[String],
) -> DispatchResponse {
    if session_token.trim().is_empty() {
        return DispatchResponse::failed(AuthError::NotAuthenticated.to_string());
    }

    let auth_blob = match deps.session_store.get(session_token).await {
        Ok(Some(blob)) => blob,
        Ok(None) => return DispatchResponse::failed(AuthError::SessionNotFound.to_string()),
        Err(e) => return DispatchResponse::failed(format!("Session lookup failed: {e:#}")),
    };

    let message: String = message.chars().take(MAX_MESSAGE_CHARS).collect();

    let recipients: Vec<&str> = recipients
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .take(MAX_RECIPIENTS)
        .collect();

    if recipients.is_empty() {
        return DispatchResponse::failed(AuthError::NoValidRecipients.to_string());
    }

    debug!("Dispatching message to {} recipients", recipients.len());

    // One connection for the whole batch.
    let conn = match deps.connector.open(Some(&auth_blob)).await {
        Ok(conn) => conn,
        Err(e) => return DispatchResponse::failed(format!("Failed to connect: {e:#}")),
    };

    let mut outcomes = Vec::with_capacity(recipients.len());
    for (i, recipient) in recipients.iter().enumerate() {
        // Rate limit between consecutive sends, not before the first.
        if i > 0 {
            tokio::time::sleep(deps.send_delay).await;
        }

        let attempt = async {
            let peer = conn.resolve_recipient(recipient).await?;
            conn.send_message(&peer, &message).await
        }
        .await;

        match attempt {
            Ok(receipt) => outcomes.push(DispatchOutcome::Sent {
                recipient: recipient.to_string(),
                message_id: receipt.message_id,
            }),
            Err(e) => {
                warn!("Send to {} failed: {:#}", recipient, e);
                outcomes.push(DispatchOutcome::Failed {
                    recipient: recipient.to_string(),
                    error: format!("{e:#}"),
                });
            }
        }
    }

    if let Err(e) = conn.disconnect().await {
        warn!("Failed to disconnect after dispatch: {:#}", e);
    }

    let sent = outcomes.iter().filter(|o| o.is_sent()).count();
    info!("Dispatch complete: {}/{} sent", sent, outcomes.len());

    DispatchResponse::completed(outcomes)
}
