//! Command implementations. Each command is thin forwarding code: read
//! config, call the platform, print the result.

use anyhow::{Context, Result};
use trellis_storage::Configs;

pub mod link;
pub mod list;
pub mod login;
pub mod logout;
pub mod unlink;
pub mod whoami;

/// The stored token, or the error every authenticated command shares.
pub(crate) fn require_token(configs: &Configs) -> Result<String> {
    configs
        .token()?
        .context("Not logged in. Run `trellis login` first")
}
