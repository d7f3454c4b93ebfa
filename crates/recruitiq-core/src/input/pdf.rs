use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tokio::process::Command;
use tracing::{debug, instrument};

use super::JPEG_MIME;
use crate::llm::ContentPart;

const DEFAULT_PDFTOPPM: &str = "pdftoppm";
const DEFAULT_DPI: u32 = 200;

/// Rasterizes PDF pages. Only the first page of a resume is ever sent to the model.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Render page one of `pdf` and return JPEG bytes.
    async fn render_first_page(&self, pdf: &[u8]) -> Result<Vec<u8>>;
}

/// Renderer that shells out to poppler's `pdftoppm`.
#[derive(Debug, Clone)]
pub struct PopplerRenderer {
    program: PathBuf,
    dpi: u32,
}

impl Default for PopplerRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_PDFTOPPM)
    }
}

impl PopplerRenderer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            dpi: DEFAULT_DPI,
        }
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }
}

#[async_trait]
impl PageRenderer for PopplerRenderer {
    #[instrument(name = "render_first_page", skip(self, pdf), fields(program = %self.program.display(), pdf_bytes = pdf.len()))]
    async fn render_first_page(&self, pdf: &[u8]) -> Result<Vec<u8>> {
        let source = tempfile::Builder::new()
            .prefix("recruitiq-resume-")
            .suffix(".pdf")
            .tempfile()
            .context("failed to create temporary PDF file")?;
        tokio::fs::write(source.path(), pdf)
            .await
            .context("failed to write temporary PDF file")?;

        // No output root: pdftoppm writes the single JPEG to stdout.
        let output = Command::new(&self.program)
            .args(rasterize_args(self.dpi, source.path()))
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("failed to launch {}", self.program.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            );
        }
        if output.stdout.is_empty() {
            bail!("{} produced no image data", self.program.display());
        }
        debug!(jpeg_bytes = output.stdout.len(), "pdftoppm finished");
        Ok(output.stdout)
    }
}

fn rasterize_args(dpi: u32, source: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-jpeg", "-f", "1", "-l", "1", "-singlefile", "-r"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(dpi.to_string().into());
    args.push(source.as_os_str().to_owned());
    args
}

/// Wrap raw JPEG bytes as a base64 inline image part.
pub fn inline_jpeg(jpeg: &[u8]) -> ContentPart {
    ContentPart::InlineImage {
        mime_type: JPEG_MIME.to_string(),
        data: STANDARD.encode(jpeg),
    }
}
