use clap::Args;

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_empty_collection, print_tree};
use crate::cli::OutputFormat;
use crate::services::TreeKind;

#[derive(Args)]
pub struct FeaturesArgs {
    #[arg(help = "Tree kind: roles or groups")]
    pub kind: TreeKind,
    #[arg(help = "Role or group id")]
    pub id: String,
    #[arg(long, help = "Only this feature and its subtree")]
    pub feature: Option<String>,
    #[arg(long, help = "College id, for a college copy of a role")]
    pub college: Option<String>,
}

pub async fn handle(
    client: &ApiClient,
    args: FeaturesArgs,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let mut query = Vec::new();
    if let Some(feature) = args.feature {
        query.push(("feature_id", feature));
    }
    if let Some(college) = args.college {
        query.push(("college_id", college));
    }

    let path = format!("/api/{}s/{}/features", args.kind, args.id);
    let features = client.get(&path, &query).await?.into_data()?;

    if features.as_array().map_or(true, Vec::is_empty) {
        return output_empty_collection(&output_format, "features", "No features found");
    }
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&features)?),
        OutputFormat::Text => print_tree(&features),
    }
    Ok(())
}
