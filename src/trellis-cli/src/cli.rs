//! CLI argument structures and parsing.

use clap::{Args, Parser, Subcommand};

/// Interact with the Trellis platform from the command line.
#[derive(Parser)]
#[command(name = "trellis")]
#[command(author, version)]
#[command(about = "Trellis - deploy infrastructure, instantly", long_about = None)]
pub struct Cli {
    /// Enable verbose output (same as TRELLIS_LOG=debug)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in to your Trellis account
    Login(LoginArgs),
    /// Log out and remove the stored credentials
    Logout,
    /// Show the currently logged-in user
    Whoami,
    /// List your projects
    List,
    /// Link this directory to a project
    Link(LinkArgs),
    /// Remove the project link for this directory
    Unlink,
}

#[derive(Args)]
pub struct LoginArgs {
    /// Browserless login: pair with a code instead of opening a browser
    #[arg(short, long)]
    pub browserless: bool,
}

#[derive(Args)]
pub struct LinkArgs {
    /// Project id or name to link
    pub project: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_accepts_browserless_flag() {
        let cli = Cli::try_parse_from(["trellis", "login", "--browserless"]).expect("parse");
        match cli.command {
            Commands::Login(args) => assert!(args.browserless),
            _ => panic!("expected login"),
        }

        let cli = Cli::try_parse_from(["trellis", "login"]).expect("parse");
        match cli.command {
            Commands::Login(args) => assert!(!args.browserless),
            _ => panic!("expected login"),
        }
    }

    #[test]
    fn link_requires_a_project() {
        assert!(Cli::try_parse_from(["trellis", "link"]).is_err());
        let cli = Cli::try_parse_from(["trellis", "link", "my-app"]).expect("parse");
        match cli.command {
            Commands::Link(args) => assert_eq!(args.project, "my-app"),
            _ => panic!("expected link"),
        }
    }
}
