//! The login orchestrator: mode selection, browser handoff, fallback.

use crate::code;
use crate::device_code;
use crate::error::LoginError;
use crate::gateway::{AuthGateway, CredentialStore, User};
use crate::server::{self, CallbackListener};
use crate::types::{LoginAttempt, LoginMode, LoginOutcome};

/// Options for one login invocation.
#[derive(Debug, Clone)]
pub struct LoginOptions {
    /// Skip the browser entirely and pair with a device code.
    pub prefer_device_code: bool,
    /// Dashboard base URL the login pages live under.
    pub dashboard_url: String,
}

/// Log in and return the authenticated user.
///
/// Exactly one attempt runs per call and its state never outlives the
/// call. The token is persisted only after full validation; on
/// `CodeMismatch`, `Timeout` or `Remote` nothing is written.
pub async fn login<G, S>(opts: &LoginOptions, gateway: &G, store: &S) -> Result<User, LoginError>
where
    G: AuthGateway + ?Sized,
    S: CredentialStore + ?Sized,
{
    login_with_opener(opts, gateway, store, open_browser).await
}

/// [`login`] with an injectable browser opener.
pub(crate) async fn login_with_opener<G, S, F>(
    opts: &LoginOptions,
    gateway: &G,
    store: &S,
    open: F,
) -> Result<User, LoginError>
where
    G: AuthGateway + ?Sized,
    S: CredentialStore + ?Sized,
    F: FnOnce(&str) -> Result<(), LoginError>,
{
    let mut attempt = LoginAttempt::new(select_mode(opts));

    let token = match obtain_token(&mut attempt, opts, gateway, open).await {
        Ok(token) => token,
        Err(e) => {
            attempt.resolve(LoginOutcome::from_error(&e));
            tracing::debug!(attempt = ?attempt, "login attempt failed");
            return Err(e);
        }
    };

    store.store_token(&token).map_err(LoginError::Store)?;
    attempt.resolve(LoginOutcome::Authenticated);
    tracing::debug!(attempt = ?attempt, "login attempt succeeded");

    gateway
        .current_user(&token)
        .await
        .map_err(LoginError::Remote)
}

fn select_mode(opts: &LoginOptions) -> LoginMode {
    if opts.prefer_device_code {
        tracing::debug!("device-code login requested");
        return LoginMode::DeviceCode;
    }
    if is_remote_session() {
        tracing::debug!("remote terminal session detected, using device-code login");
        return LoginMode::DeviceCode;
    }
    LoginMode::BrowserLoopback
}

async fn obtain_token<G, F>(
    attempt: &mut LoginAttempt,
    opts: &LoginOptions,
    gateway: &G,
    open: F,
) -> Result<String, LoginError>
where
    G: AuthGateway + ?Sized,
    F: FnOnce(&str) -> Result<(), LoginError>,
{
    if attempt.mode() == LoginMode::DeviceCode {
        return device_code::run(gateway, &opts.dashboard_url).await;
    }

    let anti_forgery_code = code::generate_code();
    let port = code::free_port().map_err(|source| LoginError::PortBind { port: 0, source })?;
    attempt.arm_loopback(anti_forgery_code.clone(), port);

    // Bind before opening the browser so a lost port race surfaces here
    // instead of sending the dashboard a redirect nothing is listening on.
    let listener = CallbackListener::bind(port, &anti_forgery_code, &opts.dashboard_url).await?;
    let url = server::login_url(&opts.dashboard_url, port, &anti_forgery_code);

    if let Err(e) = open(&url) {
        // No browser is not fatal: tear the listener down and pair with a
        // device code instead.
        tracing::debug!(error = %e, "browser unavailable, falling back to device code");
        listener.abort();
        attempt.fall_back_to_device_code();
        return device_code::run(gateway, &opts.dashboard_url).await;
    }

    // The URL itself is not echoed here: it embeds the anti-forgery code,
    // which stays between this process and the opened browser.
    eprintln!("Opening the browser to complete login...");
    eprintln!("Waiting for login...");
    listener.wait().await
}

/// A terminal reached over SSH with no forwarded display cannot complete a
/// local browser redirect.
fn is_remote_session() -> bool {
    let over_ssh =
        std::env::var_os("SSH_TTY").is_some() || std::env::var_os("SSH_CLIENT").is_some();
    over_ssh && std::env::var_os("DISPLAY").is_none()
}

/// Open `url` in the default browser.
///
/// Only http/https URLs without embedded credentials are handed to the
/// platform opener.
fn open_browser(url: &str) -> Result<(), LoginError> {
    let parsed = url::Url::parse(url).map_err(|e| LoginError::BrowserUnavailable(e.into()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(LoginError::BrowserUnavailable(anyhow::anyhow!(
                "refusing to open URL with scheme '{scheme}'"
            )));
        }
    }

    if !parsed.username().is_empty() || parsed.password().is_some() {
        return Err(LoginError::BrowserUnavailable(anyhow::anyhow!(
            "refusing to open URL with embedded credentials"
        )));
    }

    spawn_browser(parsed.as_str()).map_err(|e| LoginError::BrowserUnavailable(e.into()))
}

#[cfg(target_os = "macos")]
fn spawn_browser(url: &str) -> std::io::Result<()> {
    std::process::Command::new("open")
        .arg("--")
        .arg(url)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map(|_| ())
}

#[cfg(target_os = "linux")]
fn spawn_browser(url: &str) -> std::io::Result<()> {
    std::process::Command::new("xdg-open")
        .arg(url)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map(|_| ())
}

#[cfg(target_os = "windows")]
fn spawn_browser(url: &str) -> std::io::Result<()> {
    std::process::Command::new("cmd")
        .args(["/C", "start", "", url])
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map(|_| ())
}

#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
fn spawn_browser(_url: &str) -> std::io::Result<()> {
    Err(std::io::Error::from(std::io::ErrorKind::Unsupported))
}
