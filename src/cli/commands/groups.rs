use anyhow::Context;
use clap::Subcommand;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

use crate::cli::client::{ApiClient, Reply};
use crate::cli::utils::{output_empty_collection, output_success};
use crate::cli::OutputFormat;
use crate::menu::ScreenDetail;
use crate::services::CreateGroupRequest;

#[derive(Subcommand)]
pub enum GroupCommands {
    #[command(about = "List feature groups")]
    List,

    #[command(about = "Create a feature group from a screen_details file")]
    Create {
        #[arg(long, help = "Group name")]
        name: String,
        #[arg(long, help = "JSON or YAML file holding the screen_details")]
        file: PathBuf,
        #[arg(long, help = "Group description")]
        description: Option<String>,
        #[arg(long, help = "Fold into the existing group of the same name")]
        update: bool,
    },

    #[command(about = "Delete a feature group, or one feature of it")]
    Delete {
        #[arg(help = "Group id")]
        group_id: String,
        #[arg(long, help = "Only remove this feature")]
        feature: Option<String>,
    },
}

/// A bare list of details, or an object carrying them
#[derive(Deserialize)]
#[serde(untagged)]
enum DetailsFile {
    List(Vec<ScreenDetail>),
    Wrapped { screen_details: Vec<ScreenDetail> },
}

pub async fn handle(
    client: &ApiClient,
    cmd: GroupCommands,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        GroupCommands::List => handle_list(client, output_format).await,
        GroupCommands::Create {
            name,
            file,
            description,
            update,
        } => handle_create(client, name, &file, description, update, output_format).await,
        GroupCommands::Delete { group_id, feature } => {
            handle_delete(client, group_id, feature, output_format).await
        }
    }
}

async fn handle_list(client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    let groups = client.get("/api/groups", &[]).await?.into_data()?;
    let Some(list) = groups.as_array().filter(|l| !l.is_empty()) else {
        return output_empty_collection(&output_format, "groups", "No feature groups found");
    };

    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "groups": list }))?)
        }
        OutputFormat::Text => {
            for group in list {
                let field = |key: &str| group.get(key).cloned().unwrap_or(Value::Null);
                println!(
                    "{}  {}  features={} users={}",
                    field("id").as_str().unwrap_or("-"),
                    field("name").as_str().unwrap_or("-"),
                    field("feature_count"),
                    field("user_count"),
                );
            }
        }
    }
    Ok(())
}

async fn handle_create(
    client: &ApiClient,
    name: String,
    file: &Path,
    description: Option<String>,
    update: bool,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let screen_details = read_details(file)?;
    let request = CreateGroupRequest {
        name,
        description,
        screen_details,
        created_by: None,
    };

    let query = [("update", update.to_string())];
    let group = client
        .post("/api/groups", &query, &request)
        .await?
        .into_data()?;

    let id = group
        .get("_id")
        .or_else(|| group.get("id"))
        .and_then(Value::as_str)
        .unwrap_or("-")
        .to_string();
    let verb = if update { "updated" } else { "created" };
    output_success(
        &output_format,
        &format!("Feature group '{}' {} ({})", request.name, verb, id),
        Some(json!({ "group": group })),
    )
}

async fn handle_delete(
    client: &ApiClient,
    group_id: String,
    feature: Option<String>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let mut query = Vec::new();
    if let Some(feature) = &feature {
        query.push(("feature_id", feature.clone()));
    }

    let path = format!("/api/groups/{}", group_id);
    let message = match client.delete(&path, &query).await? {
        Reply::Detail(detail) => detail,
        Reply::Data(_) => match feature {
            Some(feature) => format!("Feature {} removed from group {}", feature, group_id),
            None => format!("Feature group {} deleted", group_id),
        },
    };
    output_success(&output_format, &message, None)
}

fn read_details(path: &Path) -> anyhow::Result<Vec<ScreenDetail>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let parsed: DetailsFile = if is_yaml {
        serde_yaml::from_str(&raw).with_context(|| format!("Invalid YAML in {}", path.display()))?
    } else {
        serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))?
    };

    Ok(match parsed {
        DetailsFile::List(details) => details,
        DetailsFile::Wrapped { screen_details } => screen_details,
    })
}
