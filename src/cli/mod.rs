pub mod client;
pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use client::ApiClient;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

#[derive(Parser)]
#[command(name = "crm-roles")]
#[command(about = "CRM Roles CLI - inspect and administer role, group and menu permissions")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(
        long,
        global = true,
        env = "CRM_ROLES_URL",
        default_value = DEFAULT_SERVER_URL,
        help = "Base URL of the roles API server"
    )]
    pub server: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Show the merged permission tree for a user")]
    Permissions(commands::permissions::PermissionsArgs),

    #[command(about = "Feature group management")]
    Groups {
        #[command(subcommand)]
        cmd: commands::groups::GroupCommands,
    },

    #[command(about = "Show the features of a role or group")]
    Features(commands::features::FeaturesArgs),

    #[command(about = "Validate fixture files locally")]
    Fixture {
        #[command(subcommand)]
        cmd: commands::fixture::FixtureCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Permissions(args) => {
            let client = ApiClient::new(&cli.server)?;
            commands::permissions::handle(&client, args, output_format).await
        }
        Commands::Groups { cmd } => {
            let client = ApiClient::new(&cli.server)?;
            commands::groups::handle(&client, cmd, output_format).await
        }
        Commands::Features(args) => {
            let client = ApiClient::new(&cli.server)?;
            commands::features::handle(&client, args, output_format).await
        }
        Commands::Fixture { cmd } => commands::fixture::handle(cmd, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_permissions_with_global_flags() {
        let cli = Cli::try_parse_from([
            "crm-roles",
            "--json",
            "--server",
            "http://roles.internal:8080",
            "permissions",
            "65f1c2d3e4a5b6c7d8e9f001",
            "--dashboard",
            "admin_dashboard",
        ])
        .unwrap();

        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
        assert_eq!(cli.server, "http://roles.internal:8080");
        match cli.command {
            Commands::Permissions(args) => {
                assert_eq!(args.user_id, "65f1c2d3e4a5b6c7d8e9f001");
                assert_eq!(args.dashboard.as_deref(), Some("admin_dashboard"));
                assert!(args.college.is_none());
            }
            _ => panic!("expected permissions command"),
        }
    }

    #[test]
    fn parses_group_create() {
        let cli = Cli::try_parse_from([
            "crm-roles",
            "groups",
            "create",
            "--name",
            "Lead Managers",
            "--file",
            "lead_managers.json",
            "--update",
        ])
        .unwrap();

        match cli.command {
            Commands::Groups {
                cmd: commands::groups::GroupCommands::Create { name, update, description, .. },
            } => {
                assert_eq!(name, "Lead Managers");
                assert!(update);
                assert!(description.is_none());
            }
            _ => panic!("expected groups create"),
        }
    }
}
