//! Browserless login: a pairing code plus polling.
//!
//! Used on headless/remote sessions, when the user asks for it, or when the
//! browser handoff fails. The anti-forgery machinery of the loopback flow
//! does not apply here; the platform validates the pairing code server-side.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE;

use crate::error::LoginError;
use crate::gateway::AuthGateway;

/// Fixed delay between session polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Hard ceiling on polls; the flow gives up two minutes in.
pub const MAX_POLL_ATTEMPTS: u32 = 120;

/// URL the user visits to confirm the pairing code.
pub fn pairing_url(dashboard_url: &str, pairing_code: &str) -> String {
    let payload = format!("wordCode={}", urlencoding::encode(pairing_code));
    format!("{dashboard_url}/cli-login?d={}", URL_SAFE.encode(payload))
}

/// Run the device-code flow: create a session, show the pairing code, then
/// poll until the platform hands back a token or the attempt cap is hit.
///
/// A transport or platform error stops the flow immediately; polls are
/// never retried past an error.
pub async fn run<G>(gateway: &G, dashboard_url: &str) -> Result<String, LoginError>
where
    G: AuthGateway + ?Sized,
{
    let pairing_code = gateway
        .create_login_session()
        .await
        .map_err(LoginError::Remote)?;

    eprintln!("Browserless login");
    eprintln!(
        "Please visit:\n  {}",
        pairing_url(dashboard_url, &pairing_code)
    );
    eprintln!("Your pairing code is: {pairing_code}");
    eprintln!("Waiting for login...");

    for attempt in 1..=MAX_POLL_ATTEMPTS {
        tokio::time::sleep(POLL_INTERVAL).await;

        match gateway.consume_login_session(&pairing_code).await {
            Ok(Some(token)) => {
                tracing::debug!(attempt, "login session confirmed");
                return Ok(token);
            }
            Ok(None) => {
                tracing::trace!(attempt, "login session still pending");
            }
            Err(e) => return Err(LoginError::Remote(e)),
        }
    }

    Err(LoginError::Timeout {
        attempts: MAX_POLL_ATTEMPTS,
    })
}
