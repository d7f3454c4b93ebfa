use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Compatibility score used when the model omits or reformats the score line.
pub const DEFAULT_COMPATIBILITY_SCORE: u8 = 0;
/// Neutral sentiment score used when the model omits the score line.
pub const DEFAULT_SENTIMENT_SCORE: u8 = 50;
/// Sentiment label used when the model omits the label line.
pub const DEFAULT_SENTIMENT_LABEL: &str = "Unknown";

// Patterns mirror the phrasing requested in `crate::analysis` prompts; keep them in sync.
pub const COMPATIBILITY_SCORE_PATTERN: &str = r"\*\*Compatibility Score:\*\*\s*([0-9]+)/100\*\*";
pub const SENTIMENT_SCORE_PATTERN: &str = r"\*\*Sentiment Score \(0–100\):\*\*\s*([0-9]+)";
pub const SENTIMENT_LABEL_PATTERN: &str = r"\*\*Overall Sentiment:\*\*\s*([A-Za-z\s-]+)";

static COMPATIBILITY_SCORE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(COMPATIBILITY_SCORE_PATTERN).expect("compatibility score pattern compiles")
});
static SENTIMENT_SCORE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(SENTIMENT_SCORE_PATTERN).expect("sentiment score pattern compiles"));
static SENTIMENT_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(SENTIMENT_LABEL_PATTERN).expect("sentiment label pattern compiles"));

/// Structured fields recovered from a resume analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityFields {
    pub score: u8,
}

/// Structured fields recovered from a feedback analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentFields {
    pub score: u8,
    pub label: String,
}

/// Extracted fields together with the untouched model response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedReport<F> {
    pub fields: F,
    pub raw: String,
}

/// Recovers structured fields from free-text model output. Never fails:
/// absent fields resolve to documented defaults.
pub trait ReportExtractor: Send + Sync {
    fn compatibility(&self, response: String) -> ExtractedReport<CompatibilityFields>;

    fn sentiment(&self, response: String) -> ExtractedReport<SentimentFields>;
}

/// Source patterns for [`RegexReportExtractor`]. Each must contain one capture group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionPatterns {
    pub compatibility_score: String,
    pub sentiment_score: String,
    pub sentiment_label: String,
}

impl Default for ExtractionPatterns {
    fn default() -> Self {
        Self {
            compatibility_score: COMPATIBILITY_SCORE_PATTERN.into(),
            sentiment_score: SENTIMENT_SCORE_PATTERN.into(),
            sentiment_label: SENTIMENT_LABEL_PATTERN.into(),
        }
    }
}

/// Case-sensitive regular-expression extractor matching the bolded labels the prompts request.
#[derive(Debug, Clone)]
pub struct RegexReportExtractor {
    compatibility_score: Regex,
    sentiment_score: Regex,
    sentiment_label: Regex,
}

impl Default for RegexReportExtractor {
    fn default() -> Self {
        Self {
            compatibility_score: COMPATIBILITY_SCORE_RE.clone(),
            sentiment_score: SENTIMENT_SCORE_RE.clone(),
            sentiment_label: SENTIMENT_LABEL_RE.clone(),
        }
    }
}

impl RegexReportExtractor {
    /// Compile custom patterns, for prompts whose wording differs from the built-in ones.
    pub fn with_patterns(patterns: &ExtractionPatterns) -> Result<Self> {
        Ok(Self {
            compatibility_score: compile("compatibility_score", &patterns.compatibility_score)?,
            sentiment_score: compile("sentiment_score", &patterns.sentiment_score)?,
            sentiment_label: compile("sentiment_label", &patterns.sentiment_label)?,
        })
    }
}

fn compile(name: &str, pattern: &str) -> Result<Regex> {
    let regex =
        Regex::new(pattern).with_context(|| format!("invalid regex pattern for {name}"))?;
    if regex.captures_len() < 2 {
        anyhow::bail!("pattern for {name} must contain a capture group");
    }
    Ok(regex)
}

fn capture<'t>(regex: &Regex, text: &'t str) -> Option<&'t str> {
    regex
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Parse captured digits, clamping to 100. Digit runs that overflow fall back to `default`.
fn parse_score(field: &'static str, digits: Option<&str>, default: u8) -> u8 {
    match digits.map(str::parse::<u32>) {
        Some(Ok(value)) => value.min(100) as u8,
        Some(Err(err)) => {
            warn!(field, %err, default, "unparseable score, using default");
            default
        }
        None => {
            warn!(field, default, "score not found in model response, using default");
            default
        }
    }
}

impl ReportExtractor for RegexReportExtractor {
    fn compatibility(&self, response: String) -> ExtractedReport<CompatibilityFields> {
        let score = parse_score(
            "compatibility_score",
            capture(&self.compatibility_score, &response),
            DEFAULT_COMPATIBILITY_SCORE,
        );
        debug!(score, "extracted compatibility fields");
        ExtractedReport {
            fields: CompatibilityFields { score },
            raw: response,
        }
    }

    fn sentiment(&self, response: String) -> ExtractedReport<SentimentFields> {
        let score = parse_score(
            "sentiment_score",
            capture(&self.sentiment_score, &response),
            DEFAULT_SENTIMENT_SCORE,
        );
        let label = match capture(&self.sentiment_label, &response).map(str::trim) {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => {
                warn!("sentiment label not found in model response, using default");
                DEFAULT_SENTIMENT_LABEL.to_string()
            }
        };
        debug!(score, %label, "extracted sentiment fields");
        ExtractedReport {
            fields: SentimentFields { score, label },
            raw: response,
        }
    }
}
