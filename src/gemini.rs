//! `LanguageModel` backed by the Gemini `generateContent` REST endpoint.

use crate::commentary::{LanguageModel, PromptRequest};
use crate::config::GeminiConfig;
use crate::error::CommentaryError;
use crate::{debug_log, info_log};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first candidate, parts concatenated. Empty if there is none.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

fn request_body(request: &PromptRequest) -> GenerateRequest<'_> {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![Part {
                text: &request.prompt,
            }],
        }],
        generation_config: GenerationConfig {
            temperature: request.temperature,
            top_p: request.top_p,
        },
    }
}

fn decode_response(body: &str) -> Result<String, CommentaryError> {
    let parsed: GenerateResponse =
        serde_json::from_str(body).map_err(|e| CommentaryError::Decode(e.to_string()))?;
    Ok(parsed.text())
}

pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, CommentaryError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        info_log!("Gemini client ready (model {})", config.model);
        Ok(Self { http, config })
    }

    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, request: &PromptRequest) -> Result<String, CommentaryError> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Err(CommentaryError::MissingApiKey);
        };

        debug_log!("POST {}", self.endpoint());
        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request_body(request))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(CommentaryError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let text = decode_response(&body)?;
        debug_log!("Gemini returned {} chars", text.len());
        Ok(text)
    }
}
