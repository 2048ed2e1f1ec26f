use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::time::{Duration, Instant};

use crate::config::models::TutorConfig;
use crate::error::TutorError;
use crate::logging::{log_model_call, log_timeout};
use crate::pipelines::json_utils;

/// Transport-level failures of a single `generateContent` round trip.
/// The controller only sees these folded into a `TutorError`.
#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("model returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("model returned an empty response")]
    Empty,
    #[error("model response did not match the expected shape: {0}")]
    Malformed(String),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: Option<String>,
    pub data: String,
}

impl GenerateContentResponse {
    fn first_parts(&self) -> &[ResponsePart] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or(&[])
    }

    /// Concatenated text of the first candidate's parts
    pub fn text(&self) -> String {
        self.first_parts()
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }

    /// First inline image as a renderable data URI
    pub fn first_image_data_uri(&self) -> Option<String> {
        self.first_parts()
            .iter()
            .find_map(|p| p.inline_data.as_ref())
            .map(|inline| {
                let mime = inline.mime_type.as_deref().unwrap_or("image/png");
                format!("data:{};base64,{}", mime, inline.data)
            })
    }
}

/// Thin client for the `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    api_base: String,
    api_key: Option<String>,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(config: &TutorConfig) -> Result<Self, TutorError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .tcp_keepalive(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| TutorError::new(format!("Failed to create HTTP client: {}", e), "startup"))?;

        let api_key = config.api_key();
        if api_key.is_none() {
            tracing::warn!(
                env = %config.api_key_env,
                "No API key in environment; model calls will fail"
            );
        }

        Ok(GeminiClient {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key,
            timeout_secs: config.request_timeout_secs,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_base, model)
    }

    async fn generate_content(
        &self,
        model: &str,
        stage: &str,
        prompt: &str,
        generation_config: GenerationConfig,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let start = Instant::now();
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: Some(generation_config),
        };

        let result: Result<GenerateContentResponse, GeminiError> = async {
            let mut request = self.http.post(self.endpoint(model)).json(&body);
            if let Some(key) = &self.api_key {
                request = request.header("x-goog-api-key", key);
            }

            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(GeminiError::Status {
                    status: status.as_u16(),
                    body: body.chars().take(500).collect(),
                });
            }

            response
                .json::<GenerateContentResponse>()
                .await
                .map_err(|e| GeminiError::Malformed(format!("response envelope: {}", e)))
        }
        .await;

        let latency_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => log_model_call(model, stage, true, latency_ms),
            Err(GeminiError::Transport(e)) if e.is_timeout() => {
                log_timeout(model, self.timeout_secs);
            }
            Err(e) => {
                tracing::debug!(model = model, stage = stage, error = %e, "Model call failed");
                log_model_call(model, stage, false, latency_ms);
            }
        }
        result
    }

    /// Request structured JSON matching `schema` and parse it into `T`.
    pub async fn generate_json<T: DeserializeOwned>(
        &self,
        model: &str,
        stage: &str,
        prompt: &str,
        schema: Value,
    ) -> Result<T, GeminiError> {
        let config = GenerationConfig {
            response_mime_type: Some("application/json"),
            response_schema: Some(schema),
            ..GenerationConfig::default()
        };
        let response = self.generate_content(model, stage, prompt, config).await?;

        let raw = response.text();
        if raw.trim().is_empty() {
            return Err(GeminiError::Empty);
        }

        tracing::debug!(
            model = model,
            raw_response_preview = %raw.chars().take(500).collect::<String>(),
            "Structured response"
        );

        let json_str = json_utils::extract_json(&raw)
            .map_err(|e| GeminiError::Malformed(e.to_string()))?;
        serde_json::from_str::<T>(&json_str)
            .map_err(|e| GeminiError::Malformed(format!("{} (payload: {})", e, json_str.chars().take(300).collect::<String>())))
    }

    /// Request an illustration. `Ok(None)` when the response carries no image part.
    pub async fn generate_image(
        &self,
        model: &str,
        prompt: &str,
        aspect_ratio: &str,
    ) -> Result<Option<String>, GeminiError> {
        let config = GenerationConfig {
            image_config: Some(ImageConfig {
                aspect_ratio: aspect_ratio.to_string(),
            }),
            ..GenerationConfig::default()
        };
        let response = self.generate_content(model, "visual_aid", prompt, config).await?;
        let image = response.first_image_data_uri();
        if image.is_none() {
            tracing::info!(model = model, "Image response contained no inline image");
        }
        Ok(image)
    }
}
