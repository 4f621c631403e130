use crate::response::json_body;
use crate::{ClientError, ClientErrorResult};

use kuku_config::PredictionConfig;
use kuku_core::PredictionResult;

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client as ReqwestClient, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const PREDICT_PATH: &str = "/predict";
const HEALTH_PATH: &str = "/health";

/// Image uploads are slower than row queries.
const PREDICTION_TIMEOUT: Duration = Duration::from_secs(120);

/// `GET /health` payload of the classification service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub external_api_status: Option<String>,
    #[serde(default)]
    pub services: HashMap<String, Value>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy") || self.status.eq_ignore_ascii_case("ok")
    }
}

/// Client for the external disease-classification endpoint.
pub struct PredictionClient {
    base_url: String,
    max_image_bytes: u64,
    client: ReqwestClient,
}

impl PredictionClient {
    pub fn new(config: &PredictionConfig) -> ClientErrorResult<Self> {
        let base_url = config.url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| ClientError::invalid_url(&base_url, e.to_string()))?;

        let client = ReqwestClient::builder().timeout(PREDICTION_TIMEOUT).build()?;

        Ok(Self {
            base_url,
            max_image_bytes: config.max_image_bytes,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upload an image for classification.
    ///
    /// # Arguments
    /// * `image` - Raw image bytes; rejected locally above `max_image_bytes`
    /// * `filename` - Name reported to the service, also used to pick the MIME type
    /// * `crop_type` - Optional category label sent alongside the image
    pub async fn predict(
        &self,
        image: Vec<u8>,
        filename: &str,
        crop_type: Option<&str>,
    ) -> ClientErrorResult<PredictionResult> {
        let size = image.len() as u64;
        if size > self.max_image_bytes {
            return Err(ClientError::image_too_large(size, self.max_image_bytes));
        }

        let part = Part::bytes(image)
            .file_name(filename.to_string())
            .mime_str(mime_for(filename))?;
        let mut form = Form::new().part("file", part);
        if let Some(crop_type) = crop_type {
            form = form.text("crop_type", crop_type.to_string());
        }

        log::debug!("Submitting {filename} ({size} bytes) for prediction");
        let response = self
            .client
            .post(format!("{}{PREDICT_PATH}", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let mut result: PredictionResult = json_body(response).await?;
        if result.filename.is_none() {
            result.filename = Some(filename.to_string());
        }
        if result.crop_type.is_none() {
            result.crop_type = crop_type.map(str::to_string);
        }
        Ok(result)
    }

    pub async fn health(&self) -> ClientErrorResult<HealthStatus> {
        let response = self
            .client
            .get(format!("{}{HEALTH_PATH}", self.base_url))
            .send()
            .await?;
        json_body(response).await
    }

    /// Service banner served at the root path.
    pub async fn api_info(&self) -> ClientErrorResult<Value> {
        let response = self.client.get(format!("{}/", self.base_url)).send().await?;
        json_body(response).await
    }
}

pub(crate) fn mime_for(filename: &str) -> &'static str {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}
