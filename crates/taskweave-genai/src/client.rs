//! Generation client boundary
//!
//! [`GenerationClient`] is the black-box collaborator that turns a prompt
//! plus response schema into raw structured output. The real network
//! implementation lives outside this workspace; tests use scripted
//! clients from `taskweave-test-utils`.

use crate::schema::{parse_validated, SchemaValidationError};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Model options for a generation call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Output token budget
    pub max_tokens: u32,
}

impl GenerationOptions {
    /// Create options for a model with default sampling
    #[inline]
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// With sampling temperature
    #[inline]
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// With output token budget
    #[inline]
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: "default".to_string(),
            temperature: 0.7,
            max_tokens: 8192,
        }
    }
}

/// One structured generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// User prompt
    pub prompt: String,
    /// System instruction
    pub system_instruction: String,
    /// Response schema the model must satisfy
    pub response_schema: Value,
    /// Model options
    pub options: GenerationOptions,
}

impl GenerationRequest {
    /// Create a request
    #[inline]
    #[must_use]
    pub fn new(
        prompt: impl Into<String>,
        system_instruction: impl Into<String>,
        response_schema: Value,
        options: GenerationOptions,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            system_instruction: system_instruction.into(),
            response_schema,
            options,
        }
    }
}

/// Errors from the generation boundary
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The service call itself failed (transport, quota, model error)
    #[error("generation request failed: {0}")]
    RequestFailed(String),

    /// Output did not satisfy the response schema
    #[error(transparent)]
    InvalidResponse(#[from] SchemaValidationError),
}

/// Black-box structured generation collaborator
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Send a request and return the model's raw JSON output
    ///
    /// Implementations return the payload as-is; schema validation is the
    /// caller's concern via [`generate_structured`].
    ///
    /// # Errors
    /// Returns [`GenerationError::RequestFailed`] for service failures.
    async fn generate(&self, request: &GenerationRequest) -> Result<Value, GenerationError>;
}

/// Call the client and validate the output against `T`'s schema
///
/// # Errors
/// Returns [`GenerationError::InvalidResponse`] carrying the raw payload
/// and field errors when the model output violates the schema.
pub async fn generate_structured<T>(
    client: &dyn GenerationClient,
    request: &GenerationRequest,
) -> Result<T, GenerationError>
where
    T: DeserializeOwned + JsonSchema,
{
    let raw = client.generate(request).await?;
    Ok(parse_validated(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, JsonSchema)]
    struct Greeting {
        text: String,
    }

    struct FixedClient(Value);

    #[async_trait]
    impl GenerationClient for FixedClient {
        async fn generate(&self, _request: &GenerationRequest) -> Result<Value, GenerationError> {
            Ok(self.0.clone())
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new(
            "say hi",
            "you greet people",
            crate::schema::response_schema::<Greeting>(),
            GenerationOptions::default(),
        )
    }

    #[tokio::test]
    async fn structured_call_parses_valid_output() {
        let client = FixedClient(json!({"text": "hi"}));
        let greeting: Greeting = generate_structured(&client, &request()).await.unwrap();
        assert_eq!(greeting.text, "hi");
    }

    #[tokio::test]
    async fn structured_call_rejects_invalid_output() {
        let client = FixedClient(json!({"wrong": true}));
        let err = generate_structured::<Greeting>(&client, &request())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::InvalidResponse(_)));
    }

    #[test]
    fn options_builder() {
        let options = GenerationOptions::new("planner-large")
            .with_temperature(0.3)
            .with_max_tokens(4096);
        assert_eq!(options.model, "planner-large");
        assert_eq!(options.temperature, 0.3);
        assert_eq!(options.max_tokens, 4096);
    }
}
