//! `trellis unlink`

use anyhow::Result;
use trellis_storage::Configs;

use crate::styled_output::{print_info, print_success};

pub async fn run() -> Result<()> {
    let configs = Configs::new()?;
    let cwd = std::env::current_dir()?;

    if configs.unlink_project(&cwd)? {
        print_success("Project unlinked");
    } else {
        print_info("No project linked to this directory");
    }
    Ok(())
}
