mod list;

pub use list::UserListArgs;

use anyhow::Result;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum UserCommands {
    /// List users in the tenant
    List(UserListArgs),
}

pub async fn handle_user_command(command: UserCommands) -> Result<()> {
    match command {
        UserCommands::List(args) => list::handle(args).await,
    }
}
