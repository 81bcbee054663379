mod client;
pub mod schema;
pub(crate) mod types;
pub mod util;

pub use schema::StructuredOutput;

use anyhow::{anyhow, Result};

use client::GeminiClient;
use types::{Content, GenerateRequest, GenerationConfig};
use util::strip_code_blocks;

// =============================================================================
// Gemini Agent
// =============================================================================

#[derive(Clone)]
pub struct Gemini {
    api_key: String,
    model: String,
    base_url: Option<String>,
}

impl Gemini {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
        }
    }

    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| anyhow!("GEMINI_API_KEY environment variable not set"))?;
        Ok(Self::new(api_key, model))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn client(&self) -> GeminiClient {
        let client = GeminiClient::new(&self.api_key);
        if let Some(ref url) = self.base_url {
            client.with_base_url(url)
        } else {
            client
        }
    }

    // =========================================================================
    // Convenience methods
    // =========================================================================

    /// Type-safe structured output extraction.
    ///
    /// Constrains the response to the schema of `T` via `responseSchema`
    /// and deserializes the returned JSON.
    pub async fn extract<T: StructuredOutput>(
        &self,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> Result<T> {
        let schema = T::gemini_schema();

        let request = GenerateRequest::new()
            .system(system_prompt)
            .content(Content::user(user_prompt))
            .generation_config(GenerationConfig {
                temperature: Some(0.0),
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(schema),
            });

        let response = self.client().generate(&self.model, &request).await?;

        let text = response
            .text()
            .ok_or_else(|| anyhow!("No content in Gemini response"))?;

        serde_json::from_str(strip_code_blocks(&text))
            .map_err(|e| anyhow!("Failed to deserialize response: {}", e))
    }

    /// Simple free-text completion.
    pub async fn complete(
        &self,
        system: impl Into<String>,
        user: impl Into<String>,
    ) -> Result<String> {
        let request = GenerateRequest::new()
            .system(system)
            .content(Content::user(user))
            .generation_config(GenerationConfig {
                temperature: Some(0.0),
                ..Default::default()
            });

        let response = self.client().generate(&self.model, &request).await?;

        response
            .text()
            .ok_or_else(|| anyhow!("No content in Gemini response"))
    }
}
