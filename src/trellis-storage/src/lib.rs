//! Local configuration storage for the Trellis CLI.
//!
//! Everything the CLI persists between invocations lives in a single JSON
//! file under the Trellis home directory (`~/.trellis` by default,
//! overridable with `TRELLIS_HOME`):
//! - the bearer token obtained by `trellis login`
//! - per-directory project links created by `trellis link`
//!
//! The file is written with `0600` permissions on Unix since it holds a
//! credential.

mod config;
mod error;
mod paths;

pub use config::{
    API_URL_ENV_VAR, Configs, DASHBOARD_URL_ENV_VAR, DEFAULT_API_URL, DEFAULT_DASHBOARD_URL,
    ProjectLink, RootConfig, UserConfig,
};
pub use error::{Result, StorageError};
pub use paths::{HOME_ENV_VAR, trellis_home};
