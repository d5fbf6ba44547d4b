//! `trellis link`

use anyhow::{Context, Result};
use trellis_api::ApiClient;
use trellis_storage::Configs;

use super::require_token;
use crate::cli::LinkArgs;
use crate::styled_output::{bold, print_success};

pub async fn run(args: LinkArgs) -> Result<()> {
    let configs = Configs::new()?;
    let token = require_token(&configs)?;

    let client = ApiClient::new(configs.api_url())?;
    let projects = client.projects(&token).await?;

    let project = projects
        .iter()
        .find(|p| p.id == args.project || p.name == args.project)
        .with_context(|| format!("No project matching '{}'", args.project))?;

    let cwd = std::env::current_dir()?;
    configs.link_project(&cwd, &project.id)?;

    print_success(&format!(
        "Linked {} to {}",
        cwd.display(),
        bold(&project.name)
    ));
    Ok(())
}
