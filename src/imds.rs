/// Instance metadata (IMDSv2) client.
///
/// Two calls only: fetch a short-lived session token, then read the
/// placement region with it. Both go to the link-local metadata endpoint;
/// the base URL is configurable so tests can point at a local server.
use crate::error::{ProvisionError, Result};
use crate::retry::{retry, RetryPolicy};
use std::time::Duration;

const TOKEN_PATH: &str = "/latest/api/token";
const REGION_PATH: &str = "/latest/meta-data/placement/region";
const TOKEN_TTL_HEADER: &str = "X-aws-ec2-metadata-token-ttl-seconds";
const TOKEN_HEADER: &str = "X-aws-ec2-metadata-token";

pub struct ImdsClient {
    http: reqwest::Client,
    endpoint: String,
    token_ttl_secs: u64,
}

impl ImdsClient {
    pub fn new(endpoint: impl Into<String>, token_ttl_secs: u64) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            endpoint: endpoint.into(),
            token_ttl_secs,
        }
    }

    /// Fetch an IMDSv2 session token. An empty token after the retry budget
    /// is exhausted is fatal.
    pub async fn fetch_token(&self, policy: RetryPolicy) -> Result<String> {
        let url = format!("{}{}", self.endpoint, TOKEN_PATH);

        let token = retry(policy, "IMDS token fetch", || {
            let http = self.http.clone();
            let url = url.clone();
            let ttl = self.token_ttl_secs;
            async move {
                let response = http
                    .put(&url)
                    .header(TOKEN_TTL_HEADER, ttl.to_string())
                    .send()
                    .await?;

                if !response.status().is_success() {
                    return Err(ProvisionError::Context(format!(
                        "Metadata token request returned {}",
                        response.status()
                    )));
                }

                let token = response.text().await?.trim().to_string();
                if token.is_empty() {
                    return Err(ProvisionError::Context(
                        "Metadata endpoint returned an empty token".to_string(),
                    ));
                }
                Ok(token)
            }
        })
        .await?;

        tracing::info!("[Imds] Session token acquired ({} chars)", token.len());
        Ok(token)
    }

    /// Read the placement region using a previously fetched token.
    pub async fn region(&self, token: &str) -> Result<String> {
        let url = format!("{}{}", self.endpoint, REGION_PATH);

        let response = self.http.get(&url).header(TOKEN_HEADER, token).send().await?;

        if !response.status().is_success() {
            return Err(ProvisionError::Context(format!(
                "Region lookup returned {}",
                response.status()
            )));
        }

        let region = response.text().await?.trim().to_string();
        if region.is_empty() {
            return Err(ProvisionError::Context(
                "Metadata endpoint returned an empty region".to_string(),
            ));
        }

        tracing::info!("[Imds] Resolved region: {}", region);
        Ok(region)
    }
}
