use crate::api::{read_bytes, read_json, send, ImageGenerator};
use crate::error::{Error, Result};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

pub const API_BASE_URL: &str = "https://api.replicate.com/v1";
pub const DEFAULT_MODEL: &str = "black-forest-labs/flux-1.1-pro";
const PROVIDER: &str = "replicate";
const POLL_INTERVAL: Duration = Duration::from_secs(1);
const MAX_POLLS: u32 = 60;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Output {
    Single(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct PredictionUrls {
    get: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    #[serde(default)]
    id: String,
    status: String,
    output: Option<Output>,
    error: Option<serde_json::Value>,
    urls: Option<PredictionUrls>,
}

impl Prediction {
    fn output_url(&self) -> Option<&str> {
        match self.output.as_ref()? {
            Output::Single(url) => Some(url.as_str()),
            Output::Many(urls) => urls.first().map(String::as_str),
        }
    }

    fn has_failed(&self) -> bool {
        matches!(self.status.as_str(), "failed" | "canceled")
    }
}

/// Text-to-image generation through Replicate predictions.
#[derive(Debug, Clone)]
pub struct ReplicateClient {
    client: Client,
    base_url: String,
    model: String,
    api_token: Option<String>,
}

impl ReplicateClient {
    pub fn new(base_url: &str, model: &str, api_token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_token,
        })
    }

    fn token(&self) -> Result<&str> {
        self.api_token
            .as_deref()
            .ok_or_else(|| Error::ConfigError("REPLICATE_API_TOKEN is not set".to_string()))
    }

    async fn wait_for_output(&self, mut prediction: Prediction) -> Result<String> {
        let token = self.token()?;
        for _ in 0..MAX_POLLS {
            if prediction.has_failed() {
                return Err(Error::UpstreamFetch(format!(
                    "prediction {} {}: {}",
                    prediction.id,
                    prediction.status,
                    prediction.error.map(|e| e.to_string()).unwrap_or_default()
                )));
            }
            if let Some(url) = prediction.output_url() {
                return Ok(url.to_string());
            }

            let poll_url = prediction
                .urls
                .as_ref()
                .and_then(|u| u.get.clone())
                .ok_or_else(|| Error::UpstreamFetch("prediction has neither output nor poll url".to_string()))?;

            debug!("Prediction {} is {}, polling", prediction.id, prediction.status);
            tokio::time::sleep(POLL_INTERVAL).await;
            let response = send(PROVIDER, self.client.get(&poll_url).bearer_auth(token)).await?;
            prediction = read_json(PROVIDER, response).await?;
        }
        Err(Error::UpstreamFetch(format!(
            "prediction {} did not finish after {} polls",
            prediction.id, MAX_POLLS
        )))
    }
}

#[async_trait]
impl ImageGenerator for ReplicateClient {
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>> {
        let token = self.token()?;
        info!("Generating image with {}", self.model);

        let url = format!("{}/models/{}/predictions", self.base_url, self.model);
        let body = json!({
            "input": {
                "prompt": prompt,
                "prompt_upsampling": true,
            }
        });
        let request = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header("Prefer", "wait")
            .json(&body);

        let response = send(PROVIDER, request).await?;
        let prediction: Prediction = read_json(PROVIDER, response).await?;
        let output_url = self.wait_for_output(prediction).await?;

        let response = send(PROVIDER, self.client.get(&output_url)).await?;
        let bytes = read_bytes(PROVIDER, response).await?;
        info!("Downloaded {} byte generated image", bytes.len());
        Ok(bytes)
    }
}
