//! The GraphQL client and its typed operations.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use trellis_login::User;

use crate::error::ApiError;

/// User-Agent string for HTTP requests.
const USER_AGENT: &str = concat!("trellis-cli/", env!("CARGO_PKG_VERSION"));

/// Default timeout for API requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const CREATE_LOGIN_SESSION: &str = "mutation { createLoginSession }";
const CONSUME_LOGIN_SESSION: &str = "mutation($code: String!) { consumeLoginSession(code: $code) }";
const USER_META: &str = "query { me { id name email } }";
const USER_PROJECTS: &str = "query { me { projects { id name } } }";

/// A project visible to the authenticated user.
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

#[derive(serde::Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Deserialize)]
struct GraphqlResponse<D> {
    data: Option<D>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Deserialize)]
struct CreateLoginSessionData {
    #[serde(rename = "createLoginSession")]
    code: String,
}

#[derive(Deserialize)]
struct ConsumeLoginSessionData {
    #[serde(rename = "consumeLoginSession")]
    token: Option<String>,
}

#[derive(Deserialize)]
struct MeData<T> {
    me: T,
}

#[derive(Deserialize)]
struct ProjectList {
    projects: Vec<Project>,
}

/// Client for the backboard GraphQL endpoint.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ApiClient {
    /// Build a client against `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(DEFAULT_TIMEOUT)
            .tcp_nodelay(true)
            .build()?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    async fn post_graphql<D>(
        &self,
        query: &'static str,
        variables: serde_json::Value,
        token: Option<&str>,
    ) -> Result<D, ApiError>
    where
        D: DeserializeOwned,
    {
        let mut request = self
            .http
            .post(&self.endpoint)
            .json(&GraphqlRequest { query, variables });
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(%status, "API request failed");
            return Err(ApiError::Status { status, body });
        }

        let envelope: GraphqlResponse<D> = response.json().await?;
        if !envelope.errors.is_empty() {
            let message = envelope
                .errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ApiError::Graph(message));
        }

        envelope.data.ok_or(ApiError::MissingData)
    }

    /// Create a browserless login session; returns the pairing code.
    pub async fn create_login_session(&self) -> Result<String, ApiError> {
        let data: CreateLoginSessionData = self
            .post_graphql(CREATE_LOGIN_SESSION, serde_json::json!({}), None)
            .await?;
        Ok(data.code)
    }

    /// Poll a login session. `None` until the user confirms the code.
    pub async fn consume_login_session(&self, code: &str) -> Result<Option<String>, ApiError> {
        let data: ConsumeLoginSessionData = self
            .post_graphql(
                CONSUME_LOGIN_SESSION,
                serde_json::json!({ "code": code }),
                None,
            )
            .await?;
        Ok(data.token.filter(|t| !t.is_empty()))
    }

    /// Fetch the user `token` belongs to.
    pub async fn current_user(&self, token: &str) -> Result<User, ApiError> {
        let data: MeData<User> = self
            .post_graphql(USER_META, serde_json::json!({}), Some(token))
            .await?;
        Ok(data.me)
    }

    /// List the projects visible to `token`'s user.
    pub async fn projects(&self, token: &str) -> Result<Vec<Project>, ApiError> {
        let data: MeData<ProjectList> = self
            .post_graphql(USER_PROJECTS, serde_json::json!({}), Some(token))
            .await?;
        Ok(data.me.projects)
    }
}

#[async_trait]
impl trellis_login::AuthGateway for ApiClient {
    async fn create_login_session(&self) -> anyhow::Result<String> {
        Ok(ApiClient::create_login_session(self).await?)
    }

    async fn consume_login_session(&self, code: &str) -> anyhow::Result<Option<String>> {
        Ok(ApiClient::consume_login_session(self, code).await?)
    }

    async fn current_user(&self, token: &str) -> anyhow::Result<User> {
        Ok(ApiClient::current_user(self, token).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn mock_graphql(server: &wiremock::MockServer, body: serde_json::Value) {
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_raw(body.to_string(), "application/json"),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn create_login_session_returns_pairing_code() {
        let server = wiremock::MockServer::start().await;
        mock_graphql(
            &server,
            serde_json::json!({ "data": { "createLoginSession": "WORD-CODE" } }),
        )
        .await;

        let client = ApiClient::new(server.uri()).expect("client");
        let code = client.create_login_session().await.expect("session");
        assert_eq!(code, "WORD-CODE");
    }

    #[tokio::test]
    async fn consume_login_session_pending_is_none() {
        let server = wiremock::MockServer::start().await;
        mock_graphql(
            &server,
            serde_json::json!({ "data": { "consumeLoginSession": null } }),
        )
        .await;

        let client = ApiClient::new(server.uri()).expect("client");
        let token = client.consume_login_session("WORD-CODE").await.expect("poll");
        assert!(token.is_none());
    }

    #[tokio::test]
    async fn consume_login_session_empty_string_is_none() {
        let server = wiremock::MockServer::start().await;
        mock_graphql(
            &server,
            serde_json::json!({ "data": { "consumeLoginSession": "" } }),
        )
        .await;

        let client = ApiClient::new(server.uri()).expect("client");
        let token = client.consume_login_session("WORD-CODE").await.expect("poll");
        assert!(token.is_none());
    }

    #[tokio::test]
    async fn consume_login_session_returns_token() {
        let server = wiremock::MockServer::start().await;
        mock_graphql(
            &server,
            serde_json::json!({ "data": { "consumeLoginSession": "tok_999" } }),
        )
        .await;

        let client = ApiClient::new(server.uri()).expect("client");
        let token = client.consume_login_session("WORD-CODE").await.expect("poll");
        assert_eq!(token.as_deref(), Some("tok_999"));
    }

    #[tokio::test]
    async fn current_user_sends_bearer_token() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/"))
            .and(wiremock::matchers::header(
                "authorization",
                "Bearer tok_abc",
            ))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_raw(
                serde_json::json!({
                    "data": { "me": { "id": "u-1", "name": "Ada", "email": "ada@example.com" } }
                })
                .to_string(),
                "application/json",
            ))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).expect("client");
        let user = client.current_user("tok_abc").await.expect("user");
        assert_eq!(user.id, "u-1");
        assert_eq!(user.email, "ada@example.com");
    }

    #[tokio::test]
    async fn projects_lists_the_users_projects() {
        let server = wiremock::MockServer::start().await;
        mock_graphql(
            &server,
            serde_json::json!({
                "data": { "me": { "projects": [
                    { "id": "p-1", "name": "api" },
                    { "id": "p-2", "name": "web" }
                ] } }
            }),
        )
        .await;

        let client = ApiClient::new(server.uri()).expect("client");
        let projects = client.projects("tok_abc").await.expect("projects");
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].id, "p-1");
        assert_eq!(projects[1].name, "web");
    }

    #[tokio::test]
    async fn graphql_errors_surface_as_graph() {
        let server = wiremock::MockServer::start().await;
        mock_graphql(
            &server,
            serde_json::json!({
                "data": null,
                "errors": [{ "message": "Not Authorized" }]
            }),
        )
        .await;

        let client = ApiClient::new(server.uri()).expect("client");
        let err = client.current_user("tok_bad").await.err().expect("error");
        assert!(matches!(err, ApiError::Graph(ref m) if m.contains("Not Authorized")));
    }

    #[tokio::test]
    async fn server_error_surfaces_status_and_body() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/"))
            .respond_with(wiremock::ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).expect("client");
        let err = client.create_login_session().await.err().expect("error");
        assert!(
            matches!(err, ApiError::Status { status, ref body } if status == 502 && body == "bad gateway")
        );
    }
}
