//! The root config file: token and per-directory project links.
//!
//! Layout mirrors what the dashboard and older CLI builds expect:
//!
//! ```json
//! {
//!   "user": { "token": "..." },
//!   "projects": {
//!     "/home/me/app": { "projectPath": "/home/me/app", "project": "p-1" }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::paths::trellis_home;

/// Default GraphQL endpoint of the Trellis platform.
pub const DEFAULT_API_URL: &str = "https://backboard.trellis.dev/graphql";

/// Default dashboard URL; login URLs are built against this host.
pub const DEFAULT_DASHBOARD_URL: &str = "https://trellis.dev";

/// Environment variable overriding the API endpoint.
pub const API_URL_ENV_VAR: &str = "TRELLIS_API_URL";

/// Environment variable overriding the dashboard URL.
pub const DASHBOARD_URL_ENV_VAR: &str = "TRELLIS_DASHBOARD_URL";

/// Persisted user state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    /// Bearer token for the platform API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// A directory linked to a platform project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectLink {
    /// Absolute, lowercased path of the linked directory.
    #[serde(default)]
    pub project_path: String,
    /// Project id on the platform.
    #[serde(default)]
    pub project: String,
    /// Optional environment id within the project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

/// Full contents of `config.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RootConfig {
    #[serde(default)]
    pub user: UserConfig,
    /// Project links keyed by absolute directory path.
    #[serde(default)]
    pub projects: BTreeMap<String, ProjectLink>,
}

/// Handle to the on-disk configuration.
#[derive(Debug, Clone)]
pub struct Configs {
    home: PathBuf,
}

impl Configs {
    /// Open the configuration under the resolved Trellis home.
    pub fn new() -> Result<Self> {
        Ok(Self {
            home: trellis_home()?,
        })
    }

    /// Open the configuration under an explicit home directory.
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    fn config_path(&self) -> PathBuf {
        self.home.join("config.json")
    }

    /// Read the root config; a missing file is an empty config.
    pub fn load(&self) -> Result<RootConfig> {
        let path = self.config_path();
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(RootConfig::default());
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, cfg: &RootConfig) -> Result<()> {
        let path = self.config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(cfg)?;
        std::fs::write(&path, json)?;
        set_file_permissions(&path)?;
        tracing::debug!(path = %path.display(), "wrote config");
        Ok(())
    }

    /// The stored bearer token, if any. Empty strings count as absent.
    pub fn token(&self) -> Result<Option<String>> {
        Ok(self.load()?.user.token.filter(|t| !t.is_empty()))
    }

    /// Persist a bearer token, replacing any previous one.
    pub fn set_token(&self, token: &str) -> Result<()> {
        let mut cfg = self.load()?;
        cfg.user.token = Some(token.to_string());
        self.save(&cfg)
    }

    /// Remove the stored token. Returns whether one was present.
    pub fn clear_token(&self) -> Result<bool> {
        let mut cfg = self.load()?;
        let had_token = cfg.user.token.take().is_some_and(|t| !t.is_empty());
        self.save(&cfg)?;
        Ok(had_token)
    }

    /// The project link governing `dir`, chosen by longest matching parent
    /// path so nested checkouts resolve to the innermost link.
    pub fn linked_project_for(&self, dir: &Path) -> Result<Option<ProjectLink>> {
        let cfg = self.load()?;
        let dir = normalize_path(dir);

        let mut best: Option<&ProjectLink> = None;
        let mut best_len = 0;
        for (path, link) in &cfg.projects {
            if format!("{dir}/").starts_with(&format!("{path}/")) && path.len() >= best_len {
                best_len = path.len();
                best = Some(link);
            }
        }
        Ok(best.cloned())
    }

    /// The project link for the current working directory.
    pub fn linked_project(&self) -> Result<Option<ProjectLink>> {
        let cwd = std::env::current_dir()?;
        self.linked_project_for(&cwd)
    }

    /// Link `dir` to a project id.
    pub fn link_project(&self, dir: &Path, project: &str) -> Result<()> {
        let mut cfg = self.load()?;
        let path = normalize_path(dir);
        cfg.projects.insert(
            path.clone(),
            ProjectLink {
                project_path: path,
                project: project.to_string(),
                environment: None,
            },
        );
        self.save(&cfg)
    }

    /// Remove the link recorded for exactly `dir`. Returns whether a link
    /// was removed.
    pub fn unlink_project(&self, dir: &Path) -> Result<bool> {
        let mut cfg = self.load()?;
        let removed = cfg.projects.remove(&normalize_path(dir)).is_some();
        self.save(&cfg)?;
        Ok(removed)
    }

    /// GraphQL endpoint, honoring the env override.
    pub fn api_url(&self) -> String {
        url_from_env(API_URL_ENV_VAR, DEFAULT_API_URL)
    }

    /// Dashboard base URL, honoring the env override.
    pub fn dashboard_url(&self) -> String {
        url_from_env(DASHBOARD_URL_ENV_VAR, DEFAULT_DASHBOARD_URL)
    }
}

impl trellis_login::CredentialStore for Configs {
    fn store_token(&self, token: &str) -> anyhow::Result<()> {
        self.set_token(token)?;
        Ok(())
    }
}

fn url_from_env(var: &str, default: &str) -> String {
    match std::env::var(var) {
        Ok(url) if !url.is_empty() => url.trim_end_matches('/').to_string(),
        _ => default.to_string(),
    }
}

/// Link keys are absolute lowercased paths so lookups are stable across
/// differently-cased spellings of the same directory.
fn normalize_path(dir: &Path) -> String {
    dir.to_string_lossy().to_lowercase()
}

/// Restrict the config file to the owning user; it holds a credential.
fn set_file_permissions(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)?;
    }

    #[cfg(not(unix))]
    {
        let _ = path;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn configs() -> (tempfile::TempDir, Configs) {
        let dir = tempfile::tempdir().expect("tempdir");
        let configs = Configs::with_home(dir.path());
        (dir, configs)
    }

    #[test]
    fn missing_file_is_empty_config() {
        let (_dir, configs) = configs();
        assert!(configs.token().unwrap().is_none());
        assert!(configs.load().unwrap().projects.is_empty());
    }

    #[test]
    fn token_round_trip() {
        let (_dir, configs) = configs();
        configs.set_token("tok_abc").unwrap();
        assert_eq!(configs.token().unwrap().as_deref(), Some("tok_abc"));

        assert!(configs.clear_token().unwrap());
        assert!(configs.token().unwrap().is_none());
        assert!(!configs.clear_token().unwrap());
    }

    #[test]
    fn empty_token_counts_as_absent() {
        let (_dir, configs) = configs();
        configs.set_token("").unwrap();
        assert!(configs.token().unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn config_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let (dir, configs) = configs();
        configs.set_token("secret").unwrap();
        let mode = std::fs::metadata(dir.path().join("config.json"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn link_lookup_prefers_longest_prefix() {
        let (_dir, configs) = configs();
        configs.link_project(Path::new("/home/me"), "outer").unwrap();
        configs
            .link_project(Path::new("/home/me/app"), "inner")
            .unwrap();

        let link = configs
            .linked_project_for(Path::new("/home/me/app/src"))
            .unwrap()
            .expect("link");
        assert_eq!(link.project, "inner");

        let link = configs
            .linked_project_for(Path::new("/home/me/other"))
            .unwrap()
            .expect("link");
        assert_eq!(link.project, "outer");

        assert!(
            configs
                .linked_project_for(Path::new("/srv"))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn prefix_match_is_componentwise() {
        let (_dir, configs) = configs();
        configs.link_project(Path::new("/home/me/app"), "app").unwrap();

        // "/home/me/app2" shares the string prefix but not the directory.
        assert!(
            configs
                .linked_project_for(Path::new("/home/me/app2"))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn unlink_removes_only_exact_directory() {
        let (_dir, configs) = configs();
        configs.link_project(Path::new("/home/me/app"), "app").unwrap();

        assert!(!configs.unlink_project(Path::new("/home/me")).unwrap());
        assert!(configs.unlink_project(Path::new("/home/me/app")).unwrap());
        assert!(
            configs
                .linked_project_for(Path::new("/home/me/app"))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    #[serial]
    fn api_url_env_override() {
        unsafe { std::env::set_var(API_URL_ENV_VAR, "http://localhost:8000/graphql/") };
        let (_dir, configs) = configs();
        assert_eq!(configs.api_url(), "http://localhost:8000/graphql");
        unsafe { std::env::remove_var(API_URL_ENV_VAR) };
        assert_eq!(configs.api_url(), DEFAULT_API_URL);
    }

    #[test]
    #[serial]
    fn dashboard_url_env_override() {
        unsafe { std::env::set_var(DASHBOARD_URL_ENV_VAR, "http://localhost:3000") };
        let (_dir, configs) = configs();
        assert_eq!(configs.dashboard_url(), "http://localhost:3000");
        unsafe { std::env::remove_var(DASHBOARD_URL_ENV_VAR) };
        assert_eq!(configs.dashboard_url(), DEFAULT_DASHBOARD_URL);
    }
}
