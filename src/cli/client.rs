use anyhow::{anyhow, Context};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;

/// Thin reqwest wrapper around the roles API envelope
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

/// Decoded server reply. `Detail` is the informational 200 body.
#[derive(Debug)]
pub enum Reply {
    Data(Value),
    Detail(String),
}

impl ApiClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let parsed = url::Url::parse(base_url)
            .with_context(|| format!("Invalid server URL '{}'", base_url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(anyhow!("Server URL must use http or https: {}", base_url));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> anyhow::Result<Reply> {
        self.send(self.request(Method::GET, path).query(query)).await
    }

    pub async fn post<B: Serialize>(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> anyhow::Result<Reply> {
        self.send(self.request(Method::POST, path).query(query).json(body))
            .await
    }

    pub async fn delete(&self, path: &str, query: &[(&str, String)]) -> anyhow::Result<Reply> {
        self.send(self.request(Method::DELETE, path).query(query))
            .await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    async fn send(&self, request: RequestBuilder) -> anyhow::Result<Reply> {
        let response = request
            .send()
            .await
            .with_context(|| format!("Could not reach {}", self.base_url))?;
        let status = response.status();
        let body: Value = response
            .json()
            .await
            .with_context(|| format!("Server returned a non-JSON body ({})", status))?;
        decode(status, body)
    }
}

fn decode(status: StatusCode, body: Value) -> anyhow::Result<Reply> {
    if !status.is_success() {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("request failed");
        return match body.get("code").and_then(Value::as_str) {
            Some(code) => Err(anyhow!("{} ({}, {})", message, status, code)),
            None => Err(anyhow!("{} ({})", message, status)),
        };
    }

    if let Some(detail) = body.get("detail").and_then(Value::as_str) {
        return Ok(Reply::Detail(detail.to_string()));
    }
    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            Ok(Reply::Data(map.remove("data").unwrap_or(Value::Null)))
        }
        other => Ok(Reply::Data(other)),
    }
}

impl Reply {
    /// The data payload, failing for informational replies
    pub fn into_data(self) -> anyhow::Result<Value> {
        match self {
            Reply::Data(value) => Ok(value),
            Reply::Detail(detail) => Err(anyhow!("{}", detail)),
        }
    }
}
