//! Control-plane client over HTTP.
//!
//! Wire contract:
//! - `GET {base}/services` returns a JSON array of services.
//! - `POST {base}/control/{name}/{action}` returns a control result body,
//!   with `success: false` for refusals the backend could explain.
//!
//! Both responses must carry `Content-Type: application/json`. Any non-2xx
//! status is an `Http` error, whatever the body says.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use svcdash_core::directory::{DirectoryError, ServiceDirectory, decode_json};
use svcdash_core::model::{ControlResult, Service, ServiceAction};

pub struct HttpDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDirectory {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DirectoryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DirectoryError::transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn services_url(&self) -> String {
        format!("{}/services", self.base_url)
    }

    fn control_url(&self, name: &str, action: ServiceAction) -> String {
        format!(
            "{}/control/{}/{}",
            self.base_url,
            urlencoding::encode(name),
            action.as_str()
        )
    }
}

/// Accept `host:port` as well as a full URL; a bare address means plain HTTP.
pub fn normalize_addr(addr: &str) -> String {
    if addr.starts_with("http://") || addr.starts_with("https://") {
        addr.to_string()
    } else {
        format!("http://{}", addr)
    }
}

fn transport(e: reqwest::Error) -> DirectoryError {
    if e.is_timeout() {
        DirectoryError::transport("request timed out")
    } else {
        DirectoryError::transport(e.to_string())
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, DirectoryError> {
    let content_type = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = resp.bytes().await.map_err(transport)?;
    decode_json(content_type.as_deref(), &body)
}

#[async_trait]
impl ServiceDirectory for HttpDirectory {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch_services(&self) -> Result<Vec<Service>, DirectoryError> {
        let url = self.services_url();
        debug!(%url, "fetching services");

        let resp = self.client.get(&url).send().await.map_err(transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DirectoryError::Http {
                status: status.as_u16(),
            });
        }
        read_json(resp).await
    }

    async fn control_service(
        &self,
        name: &str,
        action: ServiceAction,
    ) -> Result<ControlResult, DirectoryError> {
        let url = self.control_url(name, action);
        debug!(%url, "sending control request");

        let resp = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DirectoryError::Http {
                status: status.as_u16(),
            });
        }
        read_json(resp).await
    }
}
