use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::{Color, Colorize};
use recruitiq_core::{
    build_model, html_fragment, render_report, AnalysisError, AnalysisRequest, Analyzer,
    DocumentKind, FeedbackDocument, FeedbackReport, FeedbackRequest, LabelColor,
    ModelSettings, OutputFormat, PopplerRenderer, RenderReport, SentimentBand,
    SummaryLine,
};
use serde::Deserialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const EXIT_INPUT_MISSING: u8 = 2;
const DEFAULT_LOG_FILTER: &str = "info,tokio=warn";

#[derive(Parser, Debug)]
#[command(
    name = "recruitiq",
    author,
    version,
    about = "Resume compatibility and employee sentiment analysis powered by Gemini"
)]
struct Cli {
    /// Optional TOML/YAML/JSON file with a `[model]` table
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Output style for the analysis report
    #[arg(long, value_enum, default_value_t = Format::Human, global = true)]
    format: Format,

    /// Save the verbatim model response to PATH
    #[arg(long, value_name = "PATH", global = true)]
    save: Option<PathBuf>,

    /// Save the verbatim model response as resume_analysis.txt / sentiment_analysis.txt
    #[arg(long, global = true, conflicts_with = "save")]
    save_default: bool,

    /// Write the report as an escaped HTML fragment
    #[arg(long, value_name = "PATH", global = true)]
    html: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Human,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Human => OutputFormat::Human,
            Format::Json => OutputFormat::Json,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare a resume (first PDF page) against a job description
    Resume {
        /// Resume in PDF format
        #[arg(long, value_name = "PDF")]
        resume: Option<PathBuf>,
        /// Job description text
        #[arg(long, conflicts_with = "job_description_file")]
        job_description: Option<String>,
        /// File containing the job description
        #[arg(long, value_name = "PATH")]
        job_description_file: Option<PathBuf>,
    },
    /// Analyse employee feedback for sentiment and attrition risk
    Feedback {
        /// Feedback, survey response or exit interview text
        #[arg(long)]
        text: Option<String>,
        /// Feedback document (.txt or .docx); takes precedence over --text
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
    },
}

/// Values read from `--config`; environment variables win over the file.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    model: ModelSection,
}

#[derive(Debug, Default, Deserialize)]
struct ModelSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    timeout_secs: Option<u64>,
    pdftoppm: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    init_tracing();
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report_failure(&err),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = load_settings(cli.config.as_deref())?;
    debug!(provider = ?settings.provider, model = ?settings.model, "loaded model settings");
    let renderer = PopplerRenderer::new(
        settings
            .pdftoppm
            .clone()
            .unwrap_or_else(|| PathBuf::from("pdftoppm")),
    );
    let analyzer = Analyzer::new(build_model(&settings)?).with_renderer(Arc::new(renderer));
    let format = OutputFormat::from(cli.format);
    let save = SaveTarget::from_flags(cli.save, cli.save_default);

    match cli.command {
        Commands::Resume {
            resume,
            job_description,
            job_description_file,
        } => {
            let job_description = match (job_description, job_description_file) {
                (Some(text), _) => text,
                (None, Some(path)) => read_text(&path).await?,
                (None, None) => String::new(),
            };
            let resume_pdf = match resume {
                Some(path) => Some(
                    tokio::fs::read(&path)
                        .await
                        .with_context(|| format!("failed to read resume {}", path.display()))?,
                ),
                None => None,
            };
            let request = AnalysisRequest::new(job_description, resume_pdf);
            let report = analyzer.analyze_resume(&request).await?;
            emit(format, &render_report(&report, format)?);
            write_outputs(&report, save, cli.html.as_deref()).await
        }
        Commands::Feedback { text, file } => {
            let document = match file {
                Some(path) => Some(read_document(&path).await?),
                None => None,
            };
            let request = FeedbackRequest { text, document };
            let report = analyzer.analyze_feedback(&request).await?;
            let rendered = match format {
                OutputFormat::Human => render_feedback_colored(&report)?,
                OutputFormat::Json => render_report(&report, format)?,
            };
            emit(format, &rendered);
            write_outputs(&report, save, cli.html.as_deref()).await
        }
    }
}

fn load_settings(config_path: Option<&Path>) -> Result<ModelSettings> {
    let mut vars: HashMap<String, String> = std::env::vars().collect();
    if let Some(path) = config_path {
        let file: FileConfig = config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .with_context(|| format!("failed to load config file {}", path.display()))?;
        apply_file_defaults(&mut vars, file.model);
    }
    ModelSettings::from_vars(vars)
}

/// Fill settings the environment leaves unset or blank from the `[model]` table.
fn apply_file_defaults(vars: &mut HashMap<String, String>, section: ModelSection) {
    let defaults = [
        (ModelSettings::PROVIDER_ENV, section.provider),
        (ModelSettings::MODEL_ENV, section.model),
        (ModelSettings::ENDPOINT_ENV, section.endpoint),
        (
            ModelSettings::TIMEOUT_ENV,
            section.timeout_secs.map(|secs| secs.to_string()),
        ),
        (
            ModelSettings::PDFTOPPM_ENV,
            section.pdftoppm.map(|p| p.display().to_string()),
        ),
    ];
    for (key, value) in defaults {
        let Some(value) = value else { continue };
        match vars.get(key) {
            Some(existing) if !existing.trim().is_empty() => {}
            _ => {
                vars.insert(key.to_string(), value);
            }
        }
    }
}

async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}

async fn read_document(path: &Path) -> Result<FeedbackDocument> {
    let kind = DocumentKind::from_path(path).map_err(AnalysisError::from)?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read feedback document {}", path.display()))?;
    Ok(FeedbackDocument::new(kind, bytes))
}

fn emit(format: OutputFormat, rendered: &str) {
    if format == OutputFormat::Human {
        eprintln!("{}", "Analysis Completed".green().bold());
    }
    println!("{}", rendered.trim_end());
}

/// Where `--save` / `--save-default` asked the raw report to go.
#[derive(Debug, PartialEq, Eq)]
enum SaveTarget {
    Skip,
    DefaultName,
    Path(PathBuf),
}

impl SaveTarget {
    fn from_flags(path: Option<PathBuf>, default_name: bool) -> Self {
        match (path, default_name) {
            (Some(path), _) => Self::Path(path),
            (None, true) => Self::DefaultName,
            (None, false) => Self::Skip,
        }
    }
}

async fn write_outputs<R: RenderReport>(
    report: &R,
    save: SaveTarget,
    html: Option<&Path>,
) -> Result<()> {
    let save_path = match save {
        SaveTarget::Skip => None,
        SaveTarget::DefaultName => Some(PathBuf::from(report.download_name())),
        SaveTarget::Path(path) => Some(path),
    };
    if let Some(path) = save_path {
        tokio::fs::write(&path, report.raw_text())
            .await
            .with_context(|| format!("failed to save report to {}", path.display()))?;
        info!(path = %path.display(), "saved analysis report");
    }
    if let Some(path) = html {
        tokio::fs::write(path, html_fragment(report.raw_text()))
            .await
            .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
        info!(path = %path.display(), "wrote HTML report");
    }
    Ok(())
}

fn label_color(color: LabelColor) -> Color {
    match color {
        LabelColor::Red => Color::Red,
        LabelColor::Green => Color::Green,
        LabelColor::Yellow => Color::Yellow,
        LabelColor::Default => Color::White,
    }
}

fn band_color(band: SentimentBand) -> Color {
    match band {
        SentimentBand::High => Color::Green,
        SentimentBand::Mid => Color::Yellow,
        SentimentBand::Low => Color::Red,
    }
}

/// Human feedback report with the score and label lines colored by band and label.
fn render_feedback_colored(report: &FeedbackReport) -> Result<String> {
    report.render_human_styled(|line, text| match line {
        SummaryLine::Score => text.color(band_color(report.band)).to_string(),
        SummaryLine::Label => text
            .color(label_color(report.label_color))
            .bold()
            .to_string(),
    })
}

fn report_failure(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<AnalysisError>() {
        Some(AnalysisError::InputMissing(message)) => {
            eprintln!("{} {}", "warning:".yellow().bold(), message);
            ExitCode::from(EXIT_INPUT_MISSING)
        }
        Some(AnalysisError::ExternalCall(cause)) => {
            eprintln!(
                "{} An error occurred during analysis: {cause:#}",
                "error:".red().bold()
            );
            ExitCode::FAILURE
        }
        _ => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use recruitiq_core::{ExtractedReport, SentimentFields, SentimentThresholds};

    fn feedback_report(score: u8, label: &str) -> FeedbackReport {
        FeedbackReport::from_extracted(
            ExtractedReport {
                fields: SentimentFields {
                    score,
                    label: label.into(),
                },
                raw: format!("**Overall Sentiment:** {label}"),
            },
            &SentimentThresholds::default(),
        )
    }

    #[test]
    fn colored_feedback_matches_plain_render_without_color() {
        colored::control::set_override(false);
        let report = feedback_report(75, "Positive");
        assert_eq!(
            render_feedback_colored(&report).unwrap(),
            render_report(&report, OutputFormat::Human).unwrap()
        );
    }

    #[test]
    fn save_flags_resolve_target() {
        let cli = Cli::try_parse_from(["recruitiq", "feedback", "--text", "hi", "--save-default"])
            .unwrap();
        assert_eq!(
            SaveTarget::from_flags(cli.save, cli.save_default),
            SaveTarget::DefaultName
        );

        let cli = Cli::try_parse_from(["recruitiq", "--save", "out.txt", "feedback", "--text", "hi"])
            .unwrap();
        assert_eq!(
            SaveTarget::from_flags(cli.save, cli.save_default),
            SaveTarget::Path(PathBuf::from("out.txt"))
        );

        let cli = Cli::try_parse_from(["recruitiq", "feedback", "--text", "hi"]).unwrap();
        assert_eq!(
            SaveTarget::from_flags(cli.save, cli.save_default),
            SaveTarget::Skip
        );
    }

    #[test]
    fn save_default_before_subcommand_keeps_subcommand() {
        let cli = Cli::try_parse_from(["recruitiq", "--save-default", "feedback", "--text", "hi"])
            .unwrap();
        assert!(cli.save_default);
        assert!(matches!(cli.command, Commands::Feedback { .. }));
    }

    #[test]
    fn save_requires_a_path() {
        let err = Cli::try_parse_from(["recruitiq", "feedback", "--text", "hi", "--save"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn save_flags_conflict() {
        let err = Cli::try_parse_from([
            "recruitiq",
            "feedback",
            "--save",
            "out.txt",
            "--save-default",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn default_log_filter_shows_info() {
        assert!(EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
        assert_eq!(DEFAULT_LOG_FILTER.split(',').next(), Some("info"));
    }

    #[test]
    fn file_defaults_fill_unset_and_blank_vars() {
        let mut vars = HashMap::from([
            (ModelSettings::PROVIDER_ENV.to_string(), "  ".to_string()),
            (ModelSettings::MODEL_ENV.to_string(), "gemini-1.5-flash".to_string()),
        ]);
        apply_file_defaults(
            &mut vars,
            ModelSection {
                provider: Some("noop".into()),
                model: Some("gemini-2.0-flash".into()),
                timeout_secs: Some(30),
                ..ModelSection::default()
            },
        );
        assert_eq!(vars[ModelSettings::PROVIDER_ENV], "noop");
        assert_eq!(vars[ModelSettings::MODEL_ENV], "gemini-1.5-flash");
        assert_eq!(vars[ModelSettings::TIMEOUT_ENV], "30");

        let settings = ModelSettings::from_vars(vars).unwrap();
        assert_eq!(settings.provider, recruitiq_core::ProviderKind::Noop);
    }

    #[test]
    fn job_description_sources_conflict() {
        let err = Cli::try_parse_from([
            "recruitiq",
            "resume",
            "--job-description",
            "Rust",
            "--job-description-file",
            "jd.txt",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }
}
