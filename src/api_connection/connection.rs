use reqwest::Client;
use std::error::Error;
use std::fmt;
use std::time::Duration;
use tracing::debug;

use super::endpoints::{
    ChatCompletionRequest, ChatCompletionResponse, Provider, DEFAULT_REQUEST_TIMEOUT,
    GROQ_BASE_URL, GROQ_MODELS,
};

#[derive(Debug)]
pub enum ApiConnectionError {
    MissingApiKey(String),
    NetworkError(reqwest::Error),
    Timeout(Duration),
    SerializationError(serde_json::Error),
    ApiError {
        status: reqwest::StatusCode,
        error_body: String,
    },
    EmptyResponse,
}

impl fmt::Display for ApiConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiConnectionError::MissingApiKey(provider_name) => {
                write!(f, "API key not configured for provider: {}", provider_name)
            }
            ApiConnectionError::NetworkError(err) => write!(f, "Network error: {}", err),
            ApiConnectionError::Timeout(limit) => {
                write!(f, "Request timed out after {:?}", limit)
            }
            ApiConnectionError::SerializationError(err) => {
                write!(f, "Serialization error: {}", err)
            }
            ApiConnectionError::ApiError { status, error_body } => {
                write!(f, "API error {}: {}", status, error_body)
            }
            ApiConnectionError::EmptyResponse => write!(f, "API returned no content"),
        }
    }
}

impl Error for ApiConnectionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ApiConnectionError::NetworkError(err) => Some(err),
            ApiConnectionError::SerializationError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiConnectionError {
    fn from(err: reqwest::Error) -> Self {
        ApiConnectionError::NetworkError(err)
    }
}

impl From<serde_json::Error> for ApiConnectionError {
    fn from(err: serde_json::Error) -> Self {
        ApiConnectionError::SerializationError(err)
    }
}

impl Provider {
    /// Groq's OpenAI-compatible endpoint. A `None` or blank key makes every
    /// call fail with [`ApiConnectionError::MissingApiKey`].
    pub fn groq(api_key: Option<String>) -> Self {
        Self::Groq {
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: GROQ_BASE_URL.to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_base_url(self, url: impl Into<String>) -> Self {
        match self {
            Provider::Groq { api_key, timeout, .. } => Provider::Groq {
                api_key,
                base_url: url.into().trim_end_matches('/').to_string(),
                timeout,
            },
        }
    }

    pub fn with_timeout(self, limit: Duration) -> Self {
        match self {
            Provider::Groq { api_key, base_url, .. } => Provider::Groq {
                api_key,
                base_url,
                timeout: limit,
            },
        }
    }

    /// Whether `model` is one of the provider's known chat models.
    pub fn lists_model(&self, model: &str) -> bool {
        match self {
            Provider::Groq { .. } => GROQ_MODELS.contains(&model),
        }
    }

    pub fn has_api_key(&self) -> bool {
        match self {
            Provider::Groq { api_key, .. } => api_key.is_some(),
        }
    }

    pub async fn call_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ApiConnectionError> {
        match self {
            Provider::Groq {
                api_key,
                base_url,
                timeout,
                ..
            } => {
                let api_key = api_key
                    .as_deref()
                    .ok_or_else(|| ApiConnectionError::MissingApiKey("groq".to_string()))?;

                let client = Client::builder().timeout(*timeout).build()?;
                let url = format!("{}/chat/completions", base_url);
                debug!(%url, model = %request.model, "sending chat completion request");

                let response = client
                    .post(&url)
                    .bearer_auth(api_key)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|err| classify_transport_error(err, *timeout))?;

                if response.status().is_success() {
                    let body = response
                        .bytes()
                        .await
                        .map_err(|err| classify_transport_error(err, *timeout))?;
                    let chat_response = serde_json::from_slice::<ChatCompletionResponse>(&body)?;
                    Ok(chat_response)
                } else {
                    let status = response.status();
                    let error_body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Failed to read error body".to_string());
                    Err(ApiConnectionError::ApiError { status, error_body })
                }
            }
        }
    }
}

fn classify_transport_error(err: reqwest::Error, limit: Duration) -> ApiConnectionError {
    if err.is_timeout() {
        ApiConnectionError::Timeout(limit)
    } else {
        ApiConnectionError::NetworkError(err)
    }
}
