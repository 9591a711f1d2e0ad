#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

pub const ADMIN_ROLE: &str = "65f000000000000000000001";
pub const EMPTY_ROLE: &str = "65f000000000000000000002";
pub const REPORTS_GROUP: &str = "65f000000000000000000101";
pub const CALLS_GROUP: &str = "65f000000000000000000102";
pub const ADMIN_USER: &str = "65f000000000000000000201";
pub const GROUP_USER: &str = "65f000000000000000000202";
pub const COLLEGE_USER: &str = "65f000000000000000000203";
pub const PLAIN_USER: &str = "65f000000000000000000204";
pub const COLLEGE: &str = "65f000000000000000000301";
pub const OTHER_COLLEGE: &str = "65f000000000000000000302";
pub const UNKNOWN_ID: &str = "65f0000000000000000009ff";

/// Master tree, roles, groups, users and one college override
pub fn seed() -> Value {
    json!({
        "screens": [
            {
                "screen_type": "master_screen",
                "dashboard_type": "admin_dashboard",
                "menus": {
                    "crm": {
                        "feature_id": "crm",
                        "name": "CRM",
                        "permissions": {"read": true, "write": false, "delete": false},
                        "features": {
                            "leads": {"feature_id": "leads", "permissions": {"read": true, "write": false, "delete": false}},
                            "calls": {"feature_id": "calls", "permissions": {"read": false, "write": false, "delete": false}}
                        }
                    },
                    "reports": {"feature_id": "reports", "name": "Reports", "permissions": {"read": false}}
                }
            },
            {
                "screen_type": "college_screen",
                "dashboard_type": "admin_dashboard",
                "college_id": COLLEGE,
                "menus": {
                    "reports": {"feature_id": "reports", "visibility": false, "permissions": {"read": false}}
                }
            }
        ],
        "roles": [
            {
                "_id": ADMIN_ROLE,
                "role_name": "counselor",
                "menus": {
                    "crm": {
                        "feature_id": "crm",
                        "permissions": {"read": true, "write": false, "delete": false},
                        "features": {
                            "leads": {"feature_id": "leads", "permissions": {"read": true, "write": false, "delete": false}}
                        }
                    }
                }
            },
            {"_id": EMPTY_ROLE, "role_name": "intern", "menus": {}}
        ],
        "college_roles": [
            {
                "_id": "65f000000000000000000401",
                "role_id": ADMIN_ROLE,
                "college_id": COLLEGE,
                "role_name": "counselor",
                "menus": {
                    "crm": {"feature_id": "crm", "permissions": {"read": true, "write": true, "delete": false}},
                    "reports": {"feature_id": "reports", "permissions": {"read": true}}
                }
            }
        ],
        "groups": [
            {
                "_id": REPORTS_GROUP,
                "name": "Reporting",
                "menus": {"reports": {"feature_id": "reports", "permissions": {"read": true}}},
                "user_permissions": [GROUP_USER]
            },
            {
                "_id": CALLS_GROUP,
                "name": "Call Center",
                "menus": {
                    "crm": {
                        "feature_id": "crm",
                        "features": {"calls": {"feature_id": "calls", "permissions": {"read": true, "write": true}}}
                    }
                }
            }
        ],
        "users": [
            {"_id": ADMIN_USER, "role": {"role_id": ADMIN_ROLE}},
            {
                "_id": GROUP_USER,
                "role": {"role_id": EMPTY_ROLE},
                "assign_group_permissions": [{"group_id": REPORTS_GROUP, "name": "Reporting"}]
            },
            {
                "_id": COLLEGE_USER,
                "role": {"role_id": ADMIN_ROLE},
                "associated_colleges": [COLLEGE]
            },
            {"_id": PLAIN_USER, "role": {"role_id": ADMIN_ROLE}}
        ]
    })
}

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
    fixture: PathBuf,
    child: Child,
}

impl TestServer {
    fn spawn(fixture_doc: &Value) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let fixture = std::env::temp_dir().join(format!(
            "crm-roles-fixture-{}-{}.json",
            std::process::id(),
            port
        ));
        std::fs::write(&fixture, serde_json::to_vec_pretty(fixture_doc)?)
            .context("failed to write fixture file")?;

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_crm-roles-api"));
        cmd.env("APP_ENV", "development")
            .env("PORT", port.to_string())
            .env("STORAGE_BACKEND", "memory")
            .env("STORAGE_FIXTURE", &fixture)
            .env("CACHE_ENABLED", "true")
            .env("SECURITY_ENABLE_CORS", "false")
            .env_remove("CURRENT_COLLEGE_ID")
            .env_remove("CACHE_TTL_SECS")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            client: reqwest::Client::new(),
            fixture,
            child,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = self.client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> Result<(StatusCode, Value)> {
        let res = self.client.get(self.url(path)).send().await?;
        Ok((res.status(), res.json().await?))
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        let res = self.client.post(self.url(path)).json(&body).send().await?;
        Ok((res.status(), res.json().await?))
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        let res = self.client.put(self.url(path)).json(&body).send().await?;
        Ok((res.status(), res.json().await?))
    }

    pub async fn patch(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        let res = self.client.patch(self.url(path)).json(&body).send().await?;
        Ok((res.status(), res.json().await?))
    }

    pub async fn delete(&self, path: &str) -> Result<(StatusCode, Value)> {
        let res = self.client.delete(self.url(path)).send().await?;
        Ok((res.status(), res.json().await?))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_file(&self.fixture);
    }
}

/// A fresh server seeded with `seed()`. Every test gets its own process
/// so writes never leak between tests.
pub async fn start_server() -> Result<TestServer> {
    start_server_with(&seed()).await
}

pub async fn start_server_with(fixture: &Value) -> Result<TestServer> {
    let server = TestServer::spawn(fixture)?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}
