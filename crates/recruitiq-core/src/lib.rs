pub mod analysis;
pub mod extract;
pub mod input;
pub mod llm;
pub mod present;
pub mod report;

pub use analysis::{AnalysisError, Analyzer, FeedbackReport, ResumeReport};
pub use extract::{
    CompatibilityFields, ExtractedReport, ExtractionPatterns, RegexReportExtractor,
    ReportExtractor, SentimentFields,
};
pub use input::{
    AnalysisRequest, DocumentKind, FeedbackDocument, FeedbackRequest, InputError, PageRenderer,
    PopplerRenderer,
};
pub use llm::{build_model, ContentPart, GenerativeModel, ModelSettings, NoopModel, ProviderKind};
pub use present::{GaugeChart, LabelColor, PieChart, SentimentBand, SentimentThresholds};
pub use report::{html_fragment, render_report, OutputFormat, RenderReport, SummaryLine};
