use clap::Args;
use serde_json::Value;

use crate::cli::client::ApiClient;
use crate::cli::utils::print_tree;
use crate::cli::OutputFormat;

#[derive(Args)]
pub struct PermissionsArgs {
    #[arg(help = "User id")]
    pub user_id: String,
    #[arg(long, help = "Dashboard type (defaults to admin_dashboard)")]
    pub dashboard: Option<String>,
    #[arg(long, help = "Current college id")]
    pub college: Option<String>,
}

pub async fn handle(
    client: &ApiClient,
    args: PermissionsArgs,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let mut query = Vec::new();
    if let Some(dashboard) = args.dashboard {
        query.push(("dashboard_type", dashboard));
    }
    if let Some(college) = args.college {
        query.push(("college_id", college));
    }

    let resolved = client
        .get(&format!("/api/permissions/{}", args.user_id), &query)
        .await?
        .into_data()?;

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&resolved)?),
        OutputFormat::Text => {
            let dashboard = resolved
                .get("dashboard_type")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            println!("Permissions for {} on {}", args.user_id, dashboard);
            if let Some(college) = resolved.get("college_id").and_then(Value::as_str) {
                println!("College: {}", college);
            }
            print_tree(resolved.get("data").unwrap_or(&Value::Null));
        }
    }
    Ok(())
}
