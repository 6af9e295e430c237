mod channel_member_list;
mod user_app_upgrade;

pub use channel_member_list::ChannelMemberListArgs;
pub use user_app_upgrade::UserAppUpgradeArgs;

use anyhow::Result;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum TeamsCommands {
    /// List members of a Microsoft Teams team channel
    ChannelMemberList(ChannelMemberListArgs),
    /// Upgrade an app installed for a user to its latest version
    UserAppUpgrade(UserAppUpgradeArgs),
}

pub async fn handle_teams_command(command: TeamsCommands) -> Result<()> {
    match command {
        TeamsCommands::ChannelMemberList(args) => channel_member_list::handle(args).await,
        TeamsCommands::UserAppUpgrade(args) => user_app_upgrade::handle(args).await,
    }
}
