use clap::{Parser, Subcommand};

use super::commands::spo::SpoCommands;
use super::commands::teams::TeamsCommands;
use super::commands::user::UserCommands;

#[derive(Parser)]
#[command(name = "m365-cli")]
#[command(about = "A CLI tool for administering Microsoft 365 tenants")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Microsoft Teams management
    #[command(subcommand)]
    Teams(TeamsCommands),
    /// Azure AD user management
    #[command(subcommand)]
    User(UserCommands),
    /// SharePoint Online management
    #[command(subcommand)]
    Spo(SpoCommands),
}
