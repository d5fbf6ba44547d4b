//! `trellis whoami`

use anyhow::Result;
use trellis_api::ApiClient;
use trellis_storage::Configs;

use super::require_token;
use crate::styled_output::bold;

pub async fn run() -> Result<()> {
    let configs = Configs::new()?;
    let token = require_token(&configs)?;

    let client = ApiClient::new(configs.api_url())?;
    let user = client.current_user(&token).await?;

    println!("{} ({})", bold(user.display_name()), user.email);
    Ok(())
}
