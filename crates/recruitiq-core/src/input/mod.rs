//! Turns user-supplied resumes and feedback into model content parts.
//!
//! Resumes arrive as PDF bytes and are reduced to a JPEG of their first page.
//! Feedback arrives as pasted text, a plain-text file or a `.docx` document
//! and is reduced to a single string. Nothing here talks to the model; callers
//! must surface [`InputError::InputMissing`] before any external call.

pub mod docx;
pub mod pdf;

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::llm::ContentPart;

pub use pdf::{PageRenderer, PopplerRenderer};

pub const PLAIN_TEXT_MIME: &str = "text/plain";
pub const WORD_DOCUMENT_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const JPEG_MIME: &str = "image/jpeg";

/// Failures raised while normalizing user input.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("{0}")]
    InputMissing(&'static str),
    #[error("unsupported document type `{0}` (expected .txt or .docx)")]
    UnsupportedDocument(String),
    #[error("document could not be read: {0}")]
    InvalidDocument(String),
    #[error("failed to render resume PDF: {0:#}")]
    Render(#[source] anyhow::Error),
}

/// Feedback document formats understood by the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    PlainText,
    WordDocument,
}

impl DocumentKind {
    pub fn from_mime_type(mime: &str) -> Result<Self, InputError> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            PLAIN_TEXT_MIME => Ok(Self::PlainText),
            WORD_DOCUMENT_MIME => Ok(Self::WordDocument),
            _ => Err(InputError::UnsupportedDocument(mime.to_string())),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, InputError> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "txt" => Ok(Self::PlainText),
            "docx" => Ok(Self::WordDocument),
            _ => Err(InputError::UnsupportedDocument(path.display().to_string())),
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::PlainText => PLAIN_TEXT_MIME,
            Self::WordDocument => WORD_DOCUMENT_MIME,
        }
    }
}

/// An uploaded feedback file.
#[derive(Debug, Clone)]
pub struct FeedbackDocument {
    pub kind: DocumentKind,
    pub bytes: Vec<u8>,
}

impl FeedbackDocument {
    pub fn new(kind: DocumentKind, bytes: Vec<u8>) -> Self {
        Self { kind, bytes }
    }

    /// Flatten the document into plain text.
    pub fn text(&self) -> Result<String, InputError> {
        match self.kind {
            DocumentKind::PlainText => String::from_utf8(self.bytes.clone())
                .map_err(|err| InputError::InvalidDocument(err.to_string())),
            DocumentKind::WordDocument => docx::paragraph_text(&self.bytes),
        }
    }
}

/// Resume-versus-job-description request.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    pub job_description: String,
    pub resume_pdf: Option<Vec<u8>>,
}

impl AnalysisRequest {
    pub fn new(job_description: impl Into<String>, resume_pdf: Option<Vec<u8>>) -> Self {
        Self {
            job_description: job_description.into(),
            resume_pdf,
        }
    }

    /// Validate presence of both inputs, returning the job description and PDF bytes.
    pub fn require(&self) -> Result<(&str, &[u8]), InputError> {
        match self.resume_pdf.as_deref() {
            Some(pdf) if !pdf.is_empty() && !self.job_description.trim().is_empty() => {
                Ok((self.job_description.as_str(), pdf))
            }
            _ => Err(InputError::InputMissing(
                "Please upload a resume and provide a job description before analysis.",
            )),
        }
    }
}

/// Employee feedback request. A document, when present, wins over the text box.
#[derive(Debug, Clone, Default)]
pub struct FeedbackRequest {
    pub text: Option<String>,
    pub document: Option<FeedbackDocument>,
}

impl FeedbackRequest {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            document: None,
        }
    }

    pub fn from_document(document: FeedbackDocument) -> Self {
        Self {
            text: None,
            document: Some(document),
        }
    }

    /// Resolve the feedback to a single non-blank string.
    pub fn resolve(&self) -> Result<String, InputError> {
        let resolved = match (&self.document, &self.text) {
            (Some(document), _) => {
                debug!(kind = ?document.kind, bytes = document.bytes.len(), "reading feedback document");
                document.text()?
            }
            (None, Some(text)) => text.trim().to_string(),
            (None, None) => String::new(),
        };
        if resolved.trim().is_empty() {
            return Err(InputError::InputMissing(
                "Please provide feedback through text area or file upload.",
            ));
        }
        Ok(resolved)
    }
}

/// Rasterize the first page of `pdf` and wrap it as an inline JPEG part.
pub async fn resume_image_part<R>(renderer: &R, pdf: &[u8]) -> Result<ContentPart, InputError>
where
    R: PageRenderer + ?Sized,
{
    if pdf.is_empty() {
        return Err(InputError::InputMissing("No File Uploaded."));
    }
    let jpeg = renderer
        .render_first_page(pdf)
        .await
        .map_err(InputError::Render)?;
    debug!(jpeg_bytes = jpeg.len(), "rendered first resume page");
    Ok(pdf::inline_jpeg(&jpeg))
}
