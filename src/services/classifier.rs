//! Image classifier client and the model fallback loop.
//!
//! [`GeminiClient`] speaks the Gemini `generateContent` REST API. [`Verifier`]
//! walks the configured model names in order and returns the first usable
//! answer; a model that errors or answers with empty text is logged and skipped.

use crate::{
    config::settings::ClassifierConfig,
    core::verification::{ANALYSIS_PROMPT, WasteAnalysis, parse_analysis},
    errors::{Error, Result},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::{future::Future, time::Duration};
use tracing::{error, info, instrument, warn};

/// An image to classify, base64-encoded without any `data:` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    /// Base64 image bytes
    pub data: String,
    /// MIME type, e.g. `image/jpeg`
    pub mime_type: String,
}

impl ImageInput {
    /// Builds an input from base64 text, accepting a full `data:<mime>;base64,` URL.
    ///
    /// When the data URL carries a MIME type it wins over `mime_type`.
    pub fn from_base64(data: &str, mime_type: Option<&str>) -> Result<Self> {
        let (url_mime, payload) = match data.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest.split_once(',').ok_or_else(|| Error::Validation {
                    message: "Malformed data URL".to_string(),
                })?;
                let mime = header.trim_end_matches(";base64");
                ((!mime.is_empty()).then_some(mime), payload)
            }
            None => (None, data),
        };

        let payload = payload.trim();
        if payload.is_empty() {
            return Err(Error::Validation {
                message: "Image data cannot be empty".to_string(),
            });
        }
        STANDARD.decode(payload).map_err(|e| Error::Validation {
            message: format!("Image data is not valid base64: {e}"),
        })?;

        let mime_type = url_mime
            .or(mime_type)
            .filter(|m| m.starts_with("image/"))
            .ok_or_else(|| Error::Validation {
                message: "An image MIME type is required".to_string(),
            })?;

        Ok(Self {
            data: payload.to_string(),
            mime_type: mime_type.to_string(),
        })
    }

    /// Builds an input from raw image bytes.
    #[must_use]
    pub fn from_bytes(bytes: &[u8], mime_type: &str) -> Self {
        Self {
            data: STANDARD.encode(bytes),
            mime_type: mime_type.to_string(),
        }
    }
}

/// A remote model that answers a text prompt about an image.
pub trait VisionModel {
    /// Sends `prompt` and `image` to the model named `model` and returns its text.
    fn generate(
        &self,
        model: &str,
        prompt: &str,
        image: &ImageInput,
    ) -> impl Future<Output = Result<String>> + Send;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 2],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum Part<'a> {
    Text(&'a str),
    InlineData(InlineData<'a>),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Header carrying the API key. The request URL must never contain it.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// HTTP client for the Gemini `generateContent` API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GeminiClient {
    /// Creates a client for `endpoint` (e.g. `https://generativelanguage.googleapis.com/v1beta`).
    pub fn new(endpoint: &str, api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

impl VisionModel for GeminiClient {
    async fn generate(&self, model: &str, prompt: &str, image: &ImageInput) -> Result<String> {
        let request = GenerateRequest {
            contents: [Content {
                parts: [
                    Part::Text(prompt),
                    Part::InlineData(InlineData {
                        mime_type: &image.mime_type,
                        data: &image.data,
                    }),
                ],
            }],
        };

        let response = self
            .client
            .post(format!("{}/models/{model}:generateContent", self.endpoint))
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Http(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Http(e.without_url()))?;
        Ok(body.text())
    }
}

/// Runs the model fallback loop and parses the winning answer.
#[derive(Debug, Clone)]
pub struct Verifier<M> {
    model: M,
    models: Vec<String>,
    correct_quantity: bool,
}

impl Verifier<GeminiClient> {
    /// Builds a Gemini-backed verifier from configuration and an API key.
    pub fn gemini(config: &ClassifierConfig, api_key: String) -> Result<Self> {
        let client = GeminiClient::new(
            &config.endpoint,
            api_key,
            Duration::from_secs(config.timeout_secs),
        )?;
        Ok(Self::new(client, config))
    }
}

impl<M: VisionModel> Verifier<M> {
    /// Wraps any [`VisionModel`] with the configured fallback order.
    pub fn new(model: M, config: &ClassifierConfig) -> Self {
        Self {
            model,
            models: config.models.clone(),
            correct_quantity: config.correct_quantity,
        }
    }

    /// Classifies `image`, trying each configured model until one answers.
    ///
    /// Once a model returns non-empty text that text is parsed and the result
    /// returned as-is; a parse failure does not fall through to the next model.
    #[instrument(skip(self, image), fields(mime_type = %image.mime_type))]
    pub async fn verify(&self, image: &ImageInput) -> Result<WasteAnalysis> {
        let mut failures = Vec::new();
        let mut quota_hit = false;

        for name in &self.models {
            info!("Attempting verification with model: {}", name);
            match self.model.generate(name, ANALYSIS_PROMPT, image).await {
                Ok(text) if !text.trim().is_empty() => {
                    return parse_analysis(&text, self.correct_quantity)
                        .inspect_err(|e| error!("Model {} returned unusable output: {}", name, e));
                }
                Ok(_) => {
                    warn!("Model {} returned empty text", name);
                    failures.push(format!("[{name}]: Empty response"));
                }
                Err(e) => {
                    warn!("Model {} failed: {}", name, e);
                    quota_hit |= is_quota_error(&e);
                    failures.push(format!("[{name}]: {e}"));
                }
            }
        }

        if failures.is_empty() {
            failures.push("no models configured".to_string());
        }
        let details = failures.join("; ");
        error!("All models failed: {}", details);

        if quota_hit {
            Err(Error::QuotaExceeded { details })
        } else {
            Err(Error::ClassifierUnavailable { details })
        }
    }
}

fn is_quota_error(error: &Error) -> bool {
    if matches!(error, Error::Upstream { status: 429, .. }) {
        return true;
    }
    let message = error.to_string().to_lowercase();
    message.contains("429") || message.contains("quota")
}
