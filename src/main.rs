use anyhow::Result;
use clap::Parser;
use log::info;

use m365_cli::cli::app::Commands;
use m365_cli::cli::{commands, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env().init();

    let cli = Cli::parse();
    info!("Starting m365-cli");

    match cli.command {
        Commands::Teams(command) => commands::handle_teams_command(command).await?,
        Commands::User(command) => commands::handle_user_command(command).await?,
        Commands::Spo(command) => commands::handle_spo_command(command).await?,
    }

    Ok(())
}
