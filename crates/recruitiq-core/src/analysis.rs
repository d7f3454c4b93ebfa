use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};

use crate::extract::{
    CompatibilityFields, ExtractedReport, RegexReportExtractor, ReportExtractor, SentimentFields,
};
use crate::input::{
    resume_image_part, AnalysisRequest, FeedbackRequest, InputError, PageRenderer,
    PopplerRenderer,
};
use crate::llm::{ContentPart, GenerativeModel};
use crate::present::{GaugeChart, LabelColor, PieChart, SentimentBand, SentimentThresholds};

/// Instructions sent after the job description and resume image.
pub const RESUME_PROMPT: &str = "\
You are an Applicant Tracking System (ATS) for a Software Engineer position.

Given the following job description and resume, analyze the resume and provide:

Compatibility Score: Assign a score (0-100)/100 reflecting how well the resume matches the job description, based on skills, experience, and qualifications.

Matched Skills: List the technical skills, programming languages, frameworks, and tools from the resume that directly match the job description requirements.

Relevant Experience: Summarize the candidate's work experience, projects, and contributions that align with the responsibilities and qualifications in the job description.

Education & Certifications: Identify any degrees, certifications, or specialized training that match or exceed the job requirements.

Gaps or Missing Qualifications: Note any important skills or experiences required by the job description that are missing or weak in the resume.

Format your response with clear headings and bullet points by adding bold font to side headings.
";

/// Instructions sent after the employee feedback text.
pub const FEEDBACK_PROMPT: &str = "\
You are a highly experienced HR analytics expert. Analyze the following employee feedback using sentiment analysis and NLP.

Provide the following:
- Sentiment Score (0–100): A number where 0 is extremely negative, 50 is neutral, and 100 is extremely positive.
- Overall Sentiment: Classify as **Positive**, **Negative**, or **Neutral**.
- Summary: Briefly summarize the employee's main points.
- Attrition Risk: High / Medium / Low based on tone and content.
- Recommendations: Clear bullet points for improving employee engagement.

Ensure each section has a heading and be concise.
";

/// Failures surfaced at the boundary of a user action.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Required input absent; no model call was made.
    #[error("{0}")]
    InputMissing(String),
    #[error(transparent)]
    Input(InputError),
    #[error("{0:#}")]
    ExternalCall(anyhow::Error),
}

impl From<InputError> for AnalysisError {
    fn from(err: InputError) -> Self {
        match err {
            InputError::InputMissing(message) => Self::InputMissing(message.to_string()),
            other => Self::Input(other),
        }
    }
}

/// Resume analysis outcome with its chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeReport {
    pub compatibility: ExtractedReport<CompatibilityFields>,
    pub chart: PieChart,
}

impl ResumeReport {
    pub fn from_extracted(compatibility: ExtractedReport<CompatibilityFields>) -> Self {
        let chart = PieChart::compatibility(compatibility.fields.score);
        Self {
            compatibility,
            chart,
        }
    }

    pub fn score(&self) -> u8 {
        self.compatibility.fields.score
    }

    pub fn raw(&self) -> &str {
        &self.compatibility.raw
    }
}

/// Feedback analysis outcome with its display buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackReport {
    pub sentiment: ExtractedReport<SentimentFields>,
    pub band: SentimentBand,
    pub label_color: LabelColor,
    pub gauge: GaugeChart,
}

impl FeedbackReport {
    pub fn from_extracted(
        sentiment: ExtractedReport<SentimentFields>,
        thresholds: &SentimentThresholds,
    ) -> Self {
        let score = sentiment.fields.score;
        Self {
            band: SentimentBand::from_score_with_thresholds(score, thresholds),
            label_color: LabelColor::for_label(&sentiment.fields.label),
            gauge: GaugeChart::sentiment_with_thresholds(score, thresholds),
            sentiment,
        }
    }

    pub fn score(&self) -> u8 {
        self.sentiment.fields.score
    }

    pub fn label(&self) -> &str {
        &self.sentiment.fields.label
    }

    pub fn raw(&self) -> &str {
        &self.sentiment.raw
    }
}

/// Runs the two analyses: validate input, call the model once, extract, map.
pub struct Analyzer<M: GenerativeModel> {
    model: M,
    renderer: Arc<dyn PageRenderer>,
    extractor: Arc<dyn ReportExtractor>,
    thresholds: SentimentThresholds,
}

impl<M: GenerativeModel> Analyzer<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            renderer: Arc::new(PopplerRenderer::default()),
            extractor: Arc::new(RegexReportExtractor::default()),
            thresholds: SentimentThresholds::default(),
        }
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn PageRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn ReportExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_thresholds(mut self, thresholds: SentimentThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Compare a resume's first page against a job description.
    #[instrument(name = "analyze_resume", skip_all)]
    pub async fn analyze_resume(
        &self,
        request: &AnalysisRequest,
    ) -> Result<ResumeReport, AnalysisError> {
        let (job_description, pdf) = request.require()?;
        let image = resume_image_part(self.renderer.as_ref(), pdf).await?;
        let parts = [
            ContentPart::text(job_description),
            image,
            ContentPart::text(RESUME_PROMPT),
        ];
        let response = self
            .model
            .generate(&parts)
            .await
            .map_err(AnalysisError::ExternalCall)?;
        let report = ResumeReport::from_extracted(self.extractor.compatibility(response));
        info!(score = report.score(), "resume analysis completed");
        Ok(report)
    }

    /// Analyse employee feedback for sentiment and attrition risk.
    #[instrument(name = "analyze_feedback", skip_all)]
    pub async fn analyze_feedback(
        &self,
        request: &FeedbackRequest,
    ) -> Result<FeedbackReport, AnalysisError> {
        let feedback = request.resolve()?;
        let parts = [ContentPart::text(feedback), ContentPart::text(FEEDBACK_PROMPT)];
        let response = self
            .model
            .generate(&parts)
            .await
            .map_err(AnalysisError::ExternalCall)?;
        let report =
            FeedbackReport::from_extracted(self.extractor.sentiment(response), &self.thresholds);
        info!(
            score = report.score(),
            label = report.label(),
            band = ?report.band,
            "feedback analysis completed"
        );
        Ok(report)
    }
}
