use super::{ensure_parts, ContentPart, GenerativeModel, ModelSettings};
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// `generateContent` client for Google Gemini. Each call is attempted once.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(settings: &ModelSettings) -> Result<Self> {
        if settings.api_key.trim().is_empty() {
            bail!(
                "Gemini API key must be provided via {}",
                ModelSettings::API_KEY_ENV
            );
        }
        let base = settings
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let model = settings
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            base.trim_end_matches('/'),
            model
        );
        let http = Client::builder()
            .user_agent(concat!("recruitiq/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(
                settings.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ))
            .build()
            .context("failed to build Gemini HTTP client")?;
        Ok(Self {
            http,
            url,
            api_key: settings.api_key.clone(),
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    #[instrument(name = "gemini_generate", skip(self, parts), fields(model = %self.model, parts = parts.len()))]
    async fn generate(&self, parts: &[ContentPart]) -> Result<String> {
        ensure_parts(parts)?;
        let payload = GeminiRequest {
            contents: vec![GeminiRequestContent {
                role: "user",
                parts: parts.iter().map(GeminiRequestPart::from).collect(),
            }],
        };

        let response = self
            .http
            .post(&self.url)
            .query(&[("key", &self.api_key)])
            .json(&payload)
            .send()
            .await
            .context("failed to call Gemini generateContent API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Gemini API error ({}): {}", status, body);
        }

        let message: GeminiResponse = response
            .json()
            .await
            .context("failed to parse Gemini response")?;
        let candidate = message
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Gemini response contained no candidates"))?;
        let text: String = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        if text.is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".into());
            bail!("Gemini response missing text content (finish reason: {reason})");
        }
        debug!(chars = text.len(), "received Gemini response");
        Ok(text)
    }
}

#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiRequestContent<'a>>,
}

#[derive(Serialize)]
struct GeminiRequestContent<'a> {
    role: &'static str,
    parts: Vec<GeminiRequestPart<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum GeminiRequestPart<'a> {
    Text {
        text: &'a str,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

impl<'a> From<&'a ContentPart> for GeminiRequestPart<'a> {
    fn from(part: &'a ContentPart) -> Self {
        match part {
            ContentPart::Text(text) => Self::Text {
                text: text.as_str(),
            },
            ContentPart::InlineImage { mime_type, data } => Self::Inline {
                inline_data: InlineData {
                    mime_type: mime_type.as_str(),
                    data: data.as_str(),
                },
            },
        }
    }
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ProviderKind;
    use httpmock::prelude::*;
    use serde_json::json;

    fn base_settings(url: String) -> ModelSettings {
        ModelSettings {
            provider: ProviderKind::Gemini,
            api_key: "test-key".into(),
            endpoint: Some(url),
            model: Some("gemini-test".into()),
            timeout_secs: Some(5),
            pdftoppm: None,
        }
    }

    #[test]
    fn request_parts_use_gemini_wire_names() {
        let parts = vec![
            ContentPart::text("job description"),
            ContentPart::InlineImage {
                mime_type: "image/jpeg".into(),
                data: "AAEC".into(),
            },
        ];
        let payload = GeminiRequest {
            contents: vec![GeminiRequestContent {
                role: "user",
                parts: parts.iter().map(GeminiRequestPart::from).collect(),
            }],
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        {"text": "job description"},
                        {"inlineData": {"mimeType": "image/jpeg", "data": "AAEC"}}
                    ]
                }]
            })
        );
    }

    #[test]
    fn new_requires_api_key() {
        let mut settings = base_settings("http://localhost".into());
        settings.api_key = " ".into();
        let err = GeminiClient::new(&settings).unwrap_err();
        assert!(err.to_string().contains("GOOGLE_API_KEY"));
    }

    #[test]
    fn defaults_model_name() {
        let mut settings = base_settings("http://localhost/".into());
        settings.model = None;
        let client = GeminiClient::new(&settings).unwrap();
        assert_eq!(client.model(), DEFAULT_MODEL);
        assert_eq!(
            client.url,
            "http://localhost/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[tokio::test]
    #[ignore = "requires loopback networking"]
    async fn generate_joins_candidate_text_parts() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-test:generateContent")
                .query_param("key", "test-key");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "candidates": [
                        {
                            "content": {
                                "role": "model",
                                "parts": [
                                    {"text": "**Compatibility Score:** "},
                                    {"text": "72/100**"}
                                ]
                            },
                            "finishReason": "STOP"
                        }
                    ]
                }));
        });

        let client = GeminiClient::new(&base_settings(server.base_url())).unwrap();
        let text = client.generate(&[ContentPart::text("hello")]).await.unwrap();
        assert_eq!(text, "**Compatibility Score:** 72/100**");
        mock.assert();
    }

    #[tokio::test]
    #[ignore = "requires loopback networking"]
    async fn does_not_retry_on_failure() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-test:generateContent");
            then.status(500).body("quota exceeded");
        });

        let client = GeminiClient::new(&base_settings(server.base_url())).unwrap();
        let err = client
            .generate(&[ContentPart::text("hello")])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Gemini API error"));
        assert!(err.to_string().contains("quota exceeded"));
        mock.assert_hits(1);
    }

    #[tokio::test]
    #[ignore = "requires loopback networking"]
    async fn blocked_candidate_reports_finish_reason() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(200)
                .json_body(json!({"candidates": [{"finishReason": "SAFETY"}]}));
        });

        let client = GeminiClient::new(&base_settings(server.base_url())).unwrap();
        let err = client
            .generate(&[ContentPart::text("hello")])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }
}
