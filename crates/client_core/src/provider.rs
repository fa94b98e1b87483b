use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use moodpaper_shared::{error::ProviderErrorBody, protocol::GenerateContentResponse};
use reqwest::Client;
use tracing::debug;

use crate::{prompt::ImageRequest, settings::ProviderSettings, ImageProvider};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Image provider backed by the Generative Language `generateContent` endpoint.
pub struct GeminiImageProvider {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GeminiImageProvider {
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        Self::with_client(Client::new(), settings)
    }

    pub fn with_client(client: Client, settings: &ProviderSettings) -> Result<Self> {
        settings.validate()?;
        let api_key = settings.require_api_key()?.to_string();
        Ok(Self {
            client,
            endpoint: settings.generate_content_url(),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ImageProvider for GeminiImageProvider {
    async fn generate_image(&self, request: &ImageRequest) -> Result<Option<Vec<u8>>> {
        let body = request.to_wire();
        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .context("failed to reach image provider")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let provider_error = ProviderErrorBody::from_response_text(status.as_u16(), &text);
            return Err(anyhow!(provider_error)
                .context(format!("image provider returned HTTP {}", status.as_u16())));
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .context("invalid image provider response payload")?;

        let Some(data_b64) = payload.first_inline_data() else {
            debug!(
                candidates = payload.candidates.len(),
                "provider response carried no image part"
            );
            return Ok(None);
        };

        let bytes = STANDARD
            .decode(data_b64.trim())
            .context("provider returned malformed base64 image data")?;
        Ok(Some(bytes))
    }
}

#[cfg(test)]
#[path = "tests/provider_tests.rs"]
mod tests;
