//! Client for the content-generation backend
//!
//! Every call is a single request: no retries and no client-side timeout
//! beyond what the transport does by default. Responses are normalized so the
//! caller only ever sees a decoded value or an [`ApiError`].

#[cfg(test)]
pub(crate) mod stub;

use reqwest::{Client, RequestBuilder, Response, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::mode::Mode;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/api";
pub const DEFAULT_MAX_LENGTH: u32 = 500;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The endpoint could not be reached at all
    #[error("Cannot connect to the server at {endpoint}. Is the backend running?")]
    Connectivity {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with an error; `message` is shown verbatim
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("no content generated")]
    EmptyResult,
    #[error("Unexpected response from server: {0}")]
    Decode(String),
    #[error("Invalid endpoint URL '{0}' (expected http:// or https://)")]
    InvalidEndpoint(String),
}

impl ApiError {
    pub fn is_connectivity(&self) -> bool {
        matches!(self, ApiError::Connectivity { .. })
    }
}

/// Body of `POST /generate`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub input: String,
    #[serde(rename = "type")]
    pub mode: Mode,
    pub max_length: u32,
    pub temperature: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_length: u32,
    pub temperature: f64,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Successfully generated content and the lengths the server reported
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub content: String,
    pub input_length: Option<usize>,
    pub output_length: Option<usize>,
}

pub type GenerationResult = Result<Generated, ApiError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub model_loaded: bool,
    #[serde(default)]
    pub model_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_name: Option<String>,
    pub model_type: Option<String>,
    pub vocab_size: Option<u64>,
    pub num_parameters: Option<u64>,
    pub num_parameters_human: Option<String>,
    /// Some models report "N/A" here, so keep it untyped
    pub max_position_embeddings: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ModelInfoResponse {
    model_info: ModelInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct TemplateRequest<'a> {
    template_name: &'a str,
    template_content: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateCreated {
    #[serde(default)]
    pub message: String,
    pub template: SavedTemplate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedTemplate {
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    params: GenerationParams,
}

impl ApiClient {
    pub fn new(endpoint: &str) -> Result<Self, ApiError> {
        Self::with_client(endpoint, Client::new())
    }

    pub fn with_client(endpoint: &str, client: Client) -> Result<Self, ApiError> {
        let url = Url::parse(endpoint)
            .map_err(|_| ApiError::InvalidEndpoint(endpoint.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidEndpoint(endpoint.to_string()));
        }

        Ok(Self {
            client,
            base_url: endpoint.trim_end_matches('/').to_string(),
            params: GenerationParams::default(),
        })
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Build the request body for one submission
    pub fn build_request(&self, input: &str, mode: Mode) -> GenerationRequest {
        GenerationRequest {
            input: input.to_string(),
            mode,
            max_length: self.params.max_length,
            temperature: self.params.temperature,
        }
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        let response = self.send(self.client.get(self.url("health"))).await?;
        let body = read_json(response).await?;
        serde_json::from_value(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// `GET /model-info`; the server answers 503 while the model is loading
    pub async fn model_info(&self) -> Result<ModelInfo, ApiError> {
        let response = self.send(self.client.get(self.url("model-info"))).await?;
        let body = read_json(response).await?;
        let parsed: ModelInfoResponse =
            serde_json::from_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(parsed.model_info)
    }

    /// `POST /generate` for one user action
    pub async fn generate(&self, input: &str, mode: Mode) -> GenerationResult {
        let request = self.build_request(input, mode);
        tracing::info!(
            mode = %mode,
            input_chars = request.input.chars().count(),
            max_length = request.max_length,
            "Requesting generation"
        );

        let response = self
            .send(self.client.post(self.url("generate")).json(&request))
            .await?;
        let status = response.status().as_u16();
        let body = read_json(response).await?;

        let generated = parse_generated(status, &body)?;
        tracing::info!(
            input_length = ?generated.input_length,
            output_chars = generated.content.chars().count(),
            "Content generated"
        );
        Ok(generated)
    }

    /// `POST /create-template`
    pub async fn create_template(&self, name: &str, content: &str) -> Result<TemplateCreated, ApiError> {
        let request = TemplateRequest {
            template_name: name,
            template_content: content,
        };
        let response = self
            .send(self.client.post(self.url("create-template")).json(&request))
            .await?;
        let body = read_json(response).await?;
        serde_json::from_value(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        request.send().await.map_err(|source| {
            tracing::warn!("Request to {} failed: {}", self.base_url, source);
            ApiError::Connectivity {
                endpoint: self.base_url.clone(),
                source,
            }
        })
    }
}

/// Read the body as JSON and turn non-2xx statuses into [`ApiError::Api`].
/// A body that isn't JSON decodes as `Null`.
async fn read_json(response: Response) -> Result<Value, ApiError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))?;
    let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);

    if !status.is_success() {
        let message = error_message(&body)
            .unwrap_or_else(|| format!("Server error (HTTP {})", status.as_u16()));
        tracing::warn!(status = status.as_u16(), "Server returned error: {}", message);
        return Err(ApiError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(body)
}

fn parse_generated(status: u16, body: &Value) -> GenerationResult {
    match body.get("content").and_then(Value::as_str) {
        Some(content) if !content.trim().is_empty() => Ok(Generated {
            content: content.to_string(),
            input_length: length_field(body, "input_length"),
            output_length: length_field(body, "output_length"),
        }),
        _ => match error_message(body) {
            // 2xx carrying `success: false` and an error
            Some(message) => Err(ApiError::Api { status, message }),
            None => Err(ApiError::EmptyResult),
        },
    }
}

fn length_field(body: &Value, key: &str) -> Option<usize> {
    body.get(key)
        .and_then(Value::as_u64)
        .and_then(|n| usize::try_from(n).ok())
}

/// Pull a human-readable message out of an error body. Understands the
/// plain `{error}` / `{detail}` / `{message}` shapes and FastAPI's
/// validation list `{detail: [{msg}, ...]}`.
pub fn error_message(body: &Value) -> Option<String> {
    for key in ["error", "detail", "message"] {
        match body.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.clone()),
            Some(Value::Array(items)) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                if !messages.is_empty() {
                    return Some(messages.join("; "));
                }
            }
            _ => {}
        }
    }
    None
}
