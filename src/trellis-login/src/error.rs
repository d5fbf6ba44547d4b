//! Errors a login attempt can end in.

use thiserror::Error;

/// Errors that can occur during a login attempt.
///
/// `BrowserUnavailable` is the only recoverable kind: the orchestrator
/// falls back to the device-code flow instead of surfacing it. Everything
/// else terminates the attempt and reaches the command layer verbatim.
#[derive(Debug, Error)]
pub enum LoginError {
    /// The browser callback echoed a code that does not belong to this
    /// attempt. Always a hard failure; any token in that callback is
    /// discarded.
    #[error("login callback carried an invalid code")]
    CodeMismatch,

    /// No browser could be opened for the loopback flow.
    #[error("could not open a browser")]
    BrowserUnavailable(#[source] anyhow::Error),

    /// The device-code flow reached its polling cap without a token.
    #[error("login timed out after {attempts} attempts")]
    Timeout { attempts: u32 },

    /// Transport failure or a platform-reported error.
    #[error("the Trellis platform reported an error")]
    Remote(#[source] anyhow::Error),

    /// The loopback listener could not bind its port (port 0 means the
    /// ephemeral-port probe itself failed).
    #[error("failed to bind the login callback listener (port {port})")]
    PortBind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// The callback completed but was unusable (e.g. no token on a
    /// matching code).
    #[error("malformed login callback: {0}")]
    Callback(&'static str),

    /// The validated token could not be persisted.
    #[error("failed to store credentials")]
    Store(#[source] anyhow::Error),
}
