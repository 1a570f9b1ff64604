#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use cat_api_rust::auth::AuthKeys;
use cat_api_rust::database::models::Role;
use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-test-secret";

/// A server process on its own port with a fresh in-memory store.
/// Killed when dropped.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
    child: Child,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        let server = Self::spawn()?;
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_cat-api-rust"));
        cmd.args(["serve", "--memory"])
            .env("APP_ENV", "development")
            .env("SERVER_HOST", "127.0.0.1")
            .env("CAT_API_PORT", port.to_string())
            .env("SECURITY_JWT_SECRET", JWT_SECRET)
            .env("SECURITY_PASSWORD_ROUNDS", "1000")
            .env("API_ENABLE_REQUEST_LOGGING", "false")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            client: reqwest::Client::new(),
            child,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
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

    /// Register a user and return its id together with a bearer token
    pub async fn register(&self, user_name: &str, email: &str) -> Result<(Uuid, String)> {
        let res = self
            .client
            .post(self.url("/api/v1/users"))
            .json(&json!({
                "user_name": user_name,
                "email": email,
                "password": "hunter22"
            }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());

        let body: Value = res.json().await?;
        let id: Uuid = body["data"]["_id"]
            .as_str()
            .context("missing _id")?
            .parse()?;
        Ok((id, token_for(id, Role::User)))
    }

    /// Create a cat at `lng`, `lat` and return its id
    pub async fn create_cat(&self, token: &str, name: &str, lng: f64, lat: f64) -> Result<Uuid> {
        let res = self
            .client
            .post(self.url("/api/v1/cats"))
            .bearer_auth(token)
            .json(&cat_body(name, lng, lat))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create cat failed: {}", res.status());

        let body: Value = res.json().await?;
        Ok(body["data"]["_id"].as_str().context("missing _id")?.parse()?)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

pub fn token_for(id: Uuid, role: Role) -> String {
    AuthKeys::new(JWT_SECRET, 1)
        .issue(id, role)
        .expect("token issue")
}

pub fn cat_body(name: &str, lng: f64, lat: f64) -> Value {
    json!({
        "cat_name": name,
        "weight": 4.5,
        "filename": format!("{}.jpg", name),
        "birthdate": "2019-04-01",
        "location": { "type": "Point", "coordinates": [lng, lat] }
    })
}
