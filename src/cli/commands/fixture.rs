use anyhow::anyhow;
use clap::Subcommand;
use serde_json::{json, Map, Value};
use std::path::PathBuf;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::Fixture;

#[derive(Subcommand)]
pub enum FixtureCommands {
    #[command(about = "Parse a fixture file and check its cross-references")]
    Check {
        #[arg(help = "Fixture file (.json, .yaml or .yml)")]
        path: PathBuf,
    },
}

pub async fn handle(cmd: FixtureCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        FixtureCommands::Check { path } => handle_check(path, output_format),
    }
}

fn handle_check(path: PathBuf, output_format: OutputFormat) -> anyhow::Result<()> {
    let fixture = Fixture::load(&path)?;
    let problems = fixture.problems();

    let counts: Map<String, Value> = fixture
        .counts()
        .iter()
        .map(|(name, count)| (name.to_string(), json!(count)))
        .collect();

    if !problems.is_empty() {
        match output_format {
            OutputFormat::Json => println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "success": false,
                    "path": path.display().to_string(),
                    "counts": counts,
                    "problems": problems,
                }))?
            ),
            OutputFormat::Text => {
                for problem in &problems {
                    eprintln!("  - {}", problem);
                }
            }
        }
        return Err(anyhow!(
            "{} has {} problem(s)",
            path.display(),
            problems.len()
        ));
    }

    if let OutputFormat::Text = output_format {
        for (name, count) in fixture.counts() {
            println!("{:>14}: {}", name, count);
        }
    }
    output_success(
        &output_format,
        &format!("{} is a valid fixture", path.display()),
        Some(json!({ "path": path.display().to_string(), "counts": counts })),
    )
}
