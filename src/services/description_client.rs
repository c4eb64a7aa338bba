use crate::config::DescriberConfig;
use crate::error::{PipelineError, Result};
use crate::models::generate_types::GenerateContentRequest;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;

#[async_trait]
pub trait BreedDescriber: Send + Sync {
    async fn describe(&self, breed_label: &str) -> Result<String>;
}

/// Asks a `generateContent` text-generation endpoint to describe a breed.
#[derive(Clone)]
pub struct GenerativeDescriber {
    client: Client,
    endpoint: String,
    api_version: String,
    model: String,
    api_key: String,
}

impl GenerativeDescriber {
    pub fn new(
        client: Client,
        endpoint: impl Into<String>,
        api_version: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_version: api_version.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(client: Client, config: &DescriberConfig) -> Result<Self> {
        Ok(Self::new(
            client,
            config.endpoint.clone(),
            config.api_version.clone(),
            config.model.clone(),
            config.api_key()?,
        ))
    }

    pub fn generate_url(&self) -> Result<Url> {
        let url = format!(
            "{}/{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.api_version,
            self.model
        );
        // The key stays out of the error text.
        Url::parse_with_params(&url, &[("key", self.api_key.as_str())])
            .map_err(|e| PipelineError::InvalidEndpoint(format!("{}: {}", url, e)))
    }
}

pub fn breed_prompt(breed_label: &str) -> String {
    format!(
        "Tell me about the {} dog breed. Include characteristics, temperament, and interesting facts in 2-3 paragraphs.",
        breed_label.replace('_', " ")
    )
}

#[async_trait]
impl BreedDescriber for GenerativeDescriber {
    async fn describe(&self, breed_label: &str) -> Result<String> {
        let url = self.generate_url()?;
        let request = GenerateContentRequest::from_prompt(breed_prompt(breed_label));
        tracing::debug!(model = %self.model, breed = breed_label, "Requesting breed description");

        let response = self.client.post(url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "Description service returned a non-success status");
        }

        let bytes = response.bytes().await?;
        let json: Value = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::debug!("Description body is not JSON: {}", e);
            PipelineError::InvalidResponse
        })?;

        extract_text(&json)
            .map(str::to_owned)
            .ok_or(PipelineError::InvalidResponse)
    }
}

/// Walks `candidates[0].content.parts[0].text`. Any missing level, or a level
/// of the wrong JSON type, yields `None`.
pub fn extract_text(json: &Value) -> Option<&str> {
    json.get("candidates")?
        .as_array()?
        .first()?
        .get("content")?
        .get("parts")?
        .as_array()?
        .first()?
        .get("text")?
        .as_str()
}
