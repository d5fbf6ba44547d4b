//! `trellis login`

use anyhow::Result;
use trellis_api::ApiClient;
use trellis_login::LoginOptions;
use trellis_storage::Configs;

use crate::cli::LoginArgs;
use crate::styled_output::{bold, print_success};

pub async fn run(args: LoginArgs) -> Result<()> {
    let configs = Configs::new()?;
    let gateway = ApiClient::new(configs.api_url())?;

    let opts = LoginOptions {
        prefer_device_code: args.browserless,
        dashboard_url: configs.dashboard_url(),
    };

    let user = trellis_login::login(&opts, &gateway, &configs).await?;
    print_success(&format!(
        "Logged in as {} ({})",
        bold(user.display_name()),
        user.email
    ));
    Ok(())
}
