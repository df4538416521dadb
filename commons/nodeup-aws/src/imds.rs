use std::time::Duration;

use async_trait::async_trait;
use nodeup_core::{ClientError, MetadataSource};
use reqwest::{Client, Response, StatusCode};
use tracing::debug;

pub const DEFAULT_ENDPOINT: &str = "http://169.254.169.254";

const TOKEN_TTL_HEADER: &str = "X-aws-ec2-metadata-token-ttl-seconds";
const TOKEN_HEADER: &str = "X-aws-ec2-metadata-token";
const TOKEN_TTL_SECONDS: u32 = 60;

/// Instance metadata service client (IMDSv2: every read is preceded by a
/// session token request).
pub struct Imds {
    client: Client,
    base_url: String,
}

impl Imds {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = Client::builder()
            .user_agent(concat!("nodeup/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| ClientError::other(format!("couldn't build metadata client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn token(&self) -> Result<String, ClientError> {
        let url = format!("{}/latest/api/token", self.base_url);
        let response = self
            .client
            .put(&url)
            .header(TOKEN_TTL_HEADER, TOKEN_TTL_SECONDS.to_string())
            .send()
            .await
            .map_err(request_failed)?;
        handle_response(&url, response).await
    }
}

#[async_trait]
impl MetadataSource for Imds {
    async fn get(&self, key: &str) -> Result<String, ClientError> {
        let token = self.token().await?;
        let url = format!("{}/latest/meta-data/{key}", self.base_url);
        debug!(url = %url, "reading instance metadata");
        let response = self
            .client
            .get(&url)
            .header(TOKEN_HEADER, token)
            .send()
            .await
            .map_err(request_failed)?;
        let value = handle_response(&url, response).await?;
        Ok(value.trim().to_string())
    }
}

fn request_failed(e: reqwest::Error) -> ClientError {
    ClientError::other(format!("metadata request failed: {e}"))
}

async fn handle_response(url: &str, response: Response) -> Result<String, ClientError> {
    let status = response.status();
    if status.is_success() {
        return response.text().await.map_err(request_failed);
    }
    let body = response.text().await.unwrap_or_default();
    Err(classify(status, format!("{url}: {status} {}", body.trim())))
}

fn classify(status: StatusCode, message: String) -> ClientError {
    match status {
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::TOO_MANY_REQUESTS => {
            ClientError::ServiceUnavailable(message)
        }
        _ => ClientError::Other(message),
    }
}
