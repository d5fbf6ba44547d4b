//! `trellis logout`

use anyhow::Result;
use trellis_storage::Configs;

use crate::styled_output::{print_info, print_success};

pub async fn run() -> Result<()> {
    let configs = Configs::new()?;
    if configs.clear_token()? {
        print_success("Logged out");
    } else {
        print_info("Already logged out");
    }
    Ok(())
}
