//! Authentication flows for the Trellis CLI.
//!
//! Two ways to turn a dashboard account into a bearer token:
//! - a browser loopback flow: open the dashboard login page, receive the
//!   token on a single-use localhost listener guarded by an anti-forgery
//!   code
//! - a device-code flow: show a human-readable pairing code and poll the
//!   platform until the user confirms it
//!
//! [`login`] picks between them (explicit request, remote-session
//! detection, browser availability with device-code fallback) and persists
//! the token only once the attempt has fully validated.

pub mod code;
pub mod device_code;
mod error;
mod flow;
mod gateway;
pub mod server;
mod types;

pub use error::LoginError;
pub use flow::{LoginOptions, login};
pub use gateway::{AuthGateway, CredentialStore, User};
pub use server::{CallbackListener, login_url, run_once};
pub use types::{LoginAttempt, LoginMode, LoginOutcome};
