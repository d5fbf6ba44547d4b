//! `trellis list`

use anyhow::Result;
use trellis_api::ApiClient;
use trellis_storage::Configs;

use super::require_token;
use crate::styled_output::{bold, dim, print_info};

pub async fn run() -> Result<()> {
    let configs = Configs::new()?;
    let token = require_token(&configs)?;

    let client = ApiClient::new(configs.api_url())?;
    let projects = client.projects(&token).await?;

    if projects.is_empty() {
        print_info("No projects yet. Create one on the dashboard.");
        return Ok(());
    }

    let linked = configs.linked_project()?.map(|link| link.project);
    for project in projects {
        if linked.as_deref() == Some(project.id.as_str()) {
            println!("{} (linked)", bold(&project.name));
        } else {
            println!("{}", dim(&project.name));
        }
    }
    Ok(())
}
