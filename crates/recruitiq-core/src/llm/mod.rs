mod gemini;
mod settings;

use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use gemini::GeminiClient;
pub use settings::{ModelSettings, ProviderKind};

/// One piece of model input, sent in order alongside the others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentPart {
    Text(String),
    /// Raster image with base64-encoded bytes.
    InlineImage { mime_type: String, data: String },
}

impl ContentPart {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

/// Client abstraction over a hosted generative model.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Generate a free-text answer from the ordered instruction and content parts.
    async fn generate(&self, parts: &[ContentPart]) -> Result<String>;
}

#[async_trait]
impl<M: GenerativeModel + ?Sized> GenerativeModel for Arc<M> {
    async fn generate(&self, parts: &[ContentPart]) -> Result<String> {
        (**self).generate(parts).await
    }
}

#[async_trait]
impl<M: GenerativeModel + ?Sized> GenerativeModel for Box<M> {
    async fn generate(&self, parts: &[ContentPart]) -> Result<String> {
        (**self).generate(parts).await
    }
}

/// Offline stand-in that answers without any structured fields.
#[derive(Debug, Default, Clone)]
pub struct NoopModel;

#[async_trait]
impl GenerativeModel for NoopModel {
    async fn generate(&self, parts: &[ContentPart]) -> Result<String> {
        Ok(format!(
            "Model provider not configured; received {} content part(s).\nSet RECRUITIQ_PROVIDER=gemini and GOOGLE_API_KEY to receive a full analysis.",
            parts.len()
        ))
    }
}

/// Build the model client selected by `settings`.
pub fn build_model(settings: &ModelSettings) -> Result<Box<dyn GenerativeModel>> {
    match settings.provider {
        ProviderKind::Gemini => Ok(Box::new(GeminiClient::new(settings)?)),
        ProviderKind::Noop => Ok(Box::new(NoopModel)),
    }
}

pub(crate) fn ensure_parts(parts: &[ContentPart]) -> Result<()> {
    if parts.is_empty() {
        bail!("refusing to call model without content parts");
    }
    Ok(())
}
