mod common;

use std::process::{Command, Output};

use anyhow::Result;
use common::*;
use serde_json::Value;

fn crm_roles(server: &str, args: &[&str]) -> Result<Output> {
    Ok(Command::new(env!("CARGO_BIN_EXE_crm-roles"))
        .arg("--server")
        .arg(server)
        .args(args)
        .env_remove("CRM_ROLES_URL")
        .output()?)
}

fn stdout_json(output: &Output) -> Result<Value> {
    Ok(serde_json::from_slice(&output.stdout)?)
}

#[tokio::test]
async fn lists_groups_and_permissions() -> Result<()> {
    let server = start_server().await?;

    let output = crm_roles(&server.base_url, &["--json", "groups", "list"])?;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let body = stdout_json(&output)?;
    assert_eq!(body["groups"].as_array().map(Vec::len), Some(2));

    let output = crm_roles(&server.base_url, &["permissions", GROUP_USER])?;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.contains("reports [r--]"), "unexpected output: {}", text);
    Ok(())
}

#[tokio::test]
async fn creates_and_deletes_groups() -> Result<()> {
    let server = start_server().await?;

    let details = std::env::temp_dir().join(format!("crm-roles-cli-{}.json", server.port));
    std::fs::write(
        &details,
        r#"[{"feature_id": "reports", "permissions": {"read": true}}]"#,
    )?;
    let file = details.to_string_lossy().to_string();

    let output = crm_roles(
        &server.base_url,
        &["--json", "groups", "create", "--name", "Auditors", "--file", &file],
    )?;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let body = stdout_json(&output)?;
    let group_id = body["group"]["_id"].as_str().expect("group id").to_string();

    let output = crm_roles(
        &server.base_url,
        &["groups", "create", "--name", "Auditors", "--file", &file],
    )?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Group already exists"));

    let output = crm_roles(&server.base_url, &["groups", "delete", &group_id])?;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let _ = std::fs::remove_file(details);
    Ok(())
}

#[tokio::test]
async fn shows_features_of_a_role() -> Result<()> {
    let server = start_server().await?;

    let output = crm_roles(
        &server.base_url,
        &["--json", "features", "roles", ADMIN_ROLE, "--feature", "leads"],
    )?;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let body = stdout_json(&output)?;
    assert_eq!(body[0]["feature_id"], "leads");
    Ok(())
}

#[test]
fn checks_fixture_files_offline() -> Result<()> {
    let dir = std::env::temp_dir();
    let good = dir.join(format!("crm-roles-good-{}.json", std::process::id()));
    std::fs::write(&good, serde_json::to_vec(&seed())?)?;

    let output = Command::new(env!("CARGO_BIN_EXE_crm-roles"))
        .args(["--json", "fixture", "check"])
        .arg(&good)
        .output()?;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let body = stdout_json(&output)?;
    assert_eq!(body["counts"]["users"], 4);

    let bad = dir.join(format!("crm-roles-bad-{}.json", std::process::id()));
    std::fs::write(
        &bad,
        r#"{"users": [{"_id": "65f000000000000000000299", "role": {"role_id": "65f000000000000000000098"}}]}"#,
    )?;
    let output = Command::new(env!("CARGO_BIN_EXE_crm-roles"))
        .args(["fixture", "check"])
        .arg(&bad)
        .output()?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown role"));

    let _ = std::fs::remove_file(good);
    let _ = std::fs::remove_file(bad);
    Ok(())
}
