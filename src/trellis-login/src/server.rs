//! Single-use loopback listener for the browser login callback.
//!
//! The dashboard finishes a browser login by redirecting the user's browser
//! to `http://127.0.0.1:<port>/?token=..&code=..`. The listener here accepts
//! exactly one such callback, validates the echoed anti-forgery code, and
//! shuts itself down; retried callbacks are not supported.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE;
use serde::Serialize;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;

use crate::error::LoginError;

const STATUS_OK: &str = "Ok";
const INVALID_CODE: &str = "Invalid code";
const MISSING_TOKEN: &str = "Missing token";

/// URL the browser is sent to. The dashboard decodes the payload and, once
/// the user has authenticated, redirects back to the loopback listener with
/// `token` and `code` query parameters.
pub fn login_url(dashboard_url: &str, port: u16, code: &str) -> String {
    let payload = format!("port={port}&code={}", urlencoding::encode(code));
    format!("{dashboard_url}/cli-login?d={}", URL_SAFE.encode(payload))
}

/// What the one completing callback carried.
enum CallbackOutcome {
    Matched { token: String },
    Mismatch,
    Malformed(&'static str),
}

/// Senders handed to whichever request completes the attempt.
struct Completion {
    result: oneshot::Sender<CallbackOutcome>,
    shutdown: oneshot::Sender<()>,
}

struct ListenerState {
    expected_code: String,
    allow_origin: HeaderValue,
    completion: Mutex<Option<Completion>>,
}

/// JSON body returned to the redirecting browser.
#[derive(Serialize)]
struct CallbackBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
}

impl CallbackBody {
    fn ok() -> Self {
        Self {
            status: Some(STATUS_OK),
            error: None,
        }
    }

    fn error(message: &'static str) -> Self {
        Self {
            status: None,
            error: Some(message),
        }
    }
}

fn callback_response(status: StatusCode, body: CallbackBody, allow_origin: &HeaderValue) -> Response {
    (
        status,
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin.clone())],
        axum::Json(body),
    )
        .into_response()
}

async fn handle_callback(
    State(state): State<Arc<ListenerState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(completion) = state.completion.lock().await.take() else {
        // A request raced in behind the completing one; the attempt is
        // already over and nothing is signaled.
        return StatusCode::GONE.into_response();
    };

    let token = params.get("token").map(String::as_str).unwrap_or_default();
    let code = params.get("code").map(String::as_str).unwrap_or_default();

    let (outcome, response) = if code != state.expected_code {
        // Whatever token rode along did not come from this attempt; it is
        // discarded, never stored.
        tracing::warn!("login callback rejected: code mismatch");
        (
            CallbackOutcome::Mismatch,
            callback_response(
                StatusCode::BAD_REQUEST,
                CallbackBody::error(INVALID_CODE),
                &state.allow_origin,
            ),
        )
    } else if token.is_empty() {
        (
            CallbackOutcome::Malformed("callback carried no token"),
            callback_response(
                StatusCode::BAD_REQUEST,
                CallbackBody::error(MISSING_TOKEN),
                &state.allow_origin,
            ),
        )
    } else {
        (
            CallbackOutcome::Matched {
                token: token.to_string(),
            },
            callback_response(StatusCode::OK, CallbackBody::ok(), &state.allow_origin),
        )
    };

    // Result first, then shutdown: the waiter may only observe a fully
    // decided outcome.
    let _ = completion.result.send(outcome);
    let _ = completion.shutdown.send(());
    response
}

/// CORS preflight for the dashboard's redirect; never completes the attempt.
async fn handle_preflight(State(state): State<Arc<ListenerState>>) -> Response {
    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, state.allow_origin.clone()),
            (
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static("GET, HEAD, PUT, PATCH, POST, DELETE"),
            ),
            (
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static("authorization"),
            ),
        ],
    )
        .into_response()
}

/// A bound, not-yet-completed callback listener.
pub struct CallbackListener {
    port: u16,
    result_rx: oneshot::Receiver<CallbackOutcome>,
    server: JoinHandle<()>,
}

impl CallbackListener {
    /// Bind the listener on the loopback interface.
    ///
    /// The port was chosen by [`crate::code::free_port`] as a hint only, so
    /// the bind can fail; that is the distinct [`LoginError::PortBind`] and
    /// is fatal for this attempt.
    pub async fn bind(
        port: u16,
        expected_code: &str,
        dashboard_url: &str,
    ) -> Result<Self, LoginError> {
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .map_err(|source| LoginError::PortBind { port, source })?;

        let (result_tx, result_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let state = Arc::new(ListenerState {
            expected_code: expected_code.to_string(),
            allow_origin: HeaderValue::try_from(dashboard_url)
                .unwrap_or_else(|_| HeaderValue::from_static("*")),
            completion: Mutex::new(Some(Completion {
                result: result_tx,
                shutdown: shutdown_tx,
            })),
        });

        let app = Router::new()
            .route("/", get(handle_callback).options(handle_preflight))
            .with_state(state);

        let server = tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = serve.await {
                tracing::error!(error = %e, "login callback server failed");
            }
        });

        tracing::debug!(port, "login callback listener bound");
        Ok(Self {
            port,
            result_rx,
            server,
        })
    }

    /// The port the listener is bound on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Wait for the one completing callback and return its token.
    ///
    /// There is deliberately no timeout: the flow is waiting on a human in
    /// a browser, and process interruption is the way out. The server's
    /// graceful shutdown is awaited before returning so the HTTP response
    /// has been written by the time the caller resumes.
    pub async fn wait(self) -> Result<String, LoginError> {
        let outcome = self.result_rx.await;
        let _ = self.server.await;

        match outcome {
            Ok(CallbackOutcome::Matched { token }) => Ok(token),
            Ok(CallbackOutcome::Mismatch) => Err(LoginError::CodeMismatch),
            Ok(CallbackOutcome::Malformed(reason)) => Err(LoginError::Callback(reason)),
            Err(_) => Err(LoginError::Callback("listener stopped without a callback")),
        }
    }

    /// Tear the listener down without waiting for a callback.
    pub fn abort(self) {
        self.server.abort();
    }
}

/// One complete accept-validate-shutdown cycle on `port`.
pub async fn run_once(
    port: u16,
    expected_code: &str,
    dashboard_url: &str,
) -> Result<String, LoginError> {
    CallbackListener::bind(port, expected_code, dashboard_url)
        .await?
        .wait()
        .await
}
