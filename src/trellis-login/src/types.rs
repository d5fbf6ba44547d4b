//! The in-flight login attempt.

use std::fmt;

use crate::error::LoginError;

/// How the attempt reaches the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMode {
    /// Browser redirect back to a localhost listener.
    BrowserLoopback,
    /// Pairing code confirmed on the dashboard, polled by the CLI.
    DeviceCode,
}

/// Terminal (and initial) states of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Pending,
    Authenticated,
    CodeMismatch,
    BrowserUnavailable,
    Timeout,
    RemoteError,
}

impl LoginOutcome {
    /// The outcome a failing attempt resolves to.
    pub fn from_error(err: &LoginError) -> Self {
        match err {
            LoginError::CodeMismatch => LoginOutcome::CodeMismatch,
            LoginError::BrowserUnavailable(_) => LoginOutcome::BrowserUnavailable,
            LoginError::Timeout { .. } => LoginOutcome::Timeout,
            LoginError::Remote(_)
            | LoginError::PortBind { .. }
            | LoginError::Callback(_)
            | LoginError::Store(_) => LoginOutcome::RemoteError,
        }
    }
}

/// The single authentication context of one `login` call.
///
/// Owned exclusively by the orchestrator; created when the call starts and
/// discarded the moment it resolves. Only the token outlives it, and only
/// through the credential store.
pub struct LoginAttempt {
    mode: LoginMode,
    /// Loopback only; generated once, never reused across attempts.
    anti_forgery_code: Option<String>,
    /// Loopback only; a best-effort hint until the listener binds it.
    listen_port: Option<u16>,
    outcome: LoginOutcome,
}

impl LoginAttempt {
    pub fn new(mode: LoginMode) -> Self {
        Self {
            mode,
            anti_forgery_code: None,
            listen_port: None,
            outcome: LoginOutcome::Pending,
        }
    }

    pub fn mode(&self) -> LoginMode {
        self.mode
    }

    pub fn outcome(&self) -> LoginOutcome {
        self.outcome
    }

    pub fn listen_port(&self) -> Option<u16> {
        self.listen_port
    }

    /// Attach the loopback secrets for this attempt.
    pub(crate) fn arm_loopback(&mut self, code: String, port: u16) {
        self.anti_forgery_code = Some(code);
        self.listen_port = Some(port);
    }

    /// Switch a failed browser handoff over to the device-code flow. The
    /// loopback state is dropped; it must not leak into the new mode.
    pub(crate) fn fall_back_to_device_code(&mut self) {
        self.mode = LoginMode::DeviceCode;
        self.anti_forgery_code = None;
        self.listen_port = None;
    }

    pub(crate) fn resolve(&mut self, outcome: LoginOutcome) {
        self.outcome = outcome;
    }
}

// The anti-forgery code must never reach logs, so Debug redacts it.
impl fmt::Debug for LoginAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginAttempt")
            .field("mode", &self.mode)
            .field("listen_port", &self.listen_port)
            .field(
                "anti_forgery_code",
                &self.anti_forgery_code.as_ref().map(|_| "<redacted>"),
            )
            .field("outcome", &self.outcome)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_drops_loopback_state() {
        let mut attempt = LoginAttempt::new(LoginMode::BrowserLoopback);
        attempt.arm_loopback("1234567890123456".into(), 54321);
        attempt.fall_back_to_device_code();

        assert_eq!(attempt.mode(), LoginMode::DeviceCode);
        assert!(attempt.anti_forgery_code.is_none());
        assert!(attempt.listen_port().is_none());
        assert_eq!(attempt.outcome(), LoginOutcome::Pending);
    }

    #[test]
    fn debug_never_prints_the_code() {
        let mut attempt = LoginAttempt::new(LoginMode::BrowserLoopback);
        attempt.arm_loopback("1234567890123456".into(), 54321);

        let rendered = format!("{attempt:?}");
        assert!(!rendered.contains("1234567890123456"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn outcome_from_error_matches_taxonomy() {
        assert_eq!(
            LoginOutcome::from_error(&LoginError::CodeMismatch),
            LoginOutcome::CodeMismatch
        );
        assert_eq!(
            LoginOutcome::from_error(&LoginError::Timeout { attempts: 120 }),
            LoginOutcome::Timeout
        );
        assert_eq!(
            LoginOutcome::from_error(&LoginError::Remote(anyhow::anyhow!("boom"))),
            LoginOutcome::RemoteError
        );
    }
}
