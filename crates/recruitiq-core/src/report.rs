use std::fmt::Write;

use serde::Serialize;

use crate::analysis::{FeedbackReport, ResumeReport};
use crate::present::{GaugeChart, LabelColor, PieChart, SentimentBand};

pub const RESUME_DOWNLOAD_NAME: &str = "resume_analysis.txt";
pub const FEEDBACK_DOWNLOAD_NAME: &str = "sentiment_analysis.txt";

/// Format styles supported in default reporter implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Common surface of the two analysis outcomes for output and download.
pub trait RenderReport {
    /// Verbatim model response, offered as the downloadable report.
    fn raw_text(&self) -> &str;

    /// Default file name for the downloadable report.
    fn download_name(&self) -> &'static str;

    fn render_human(&self) -> anyhow::Result<String>;

    fn render_json(&self) -> anyhow::Result<String>;
}

/// Produce a report string using the desired format.
pub fn render_report<R: RenderReport + ?Sized>(
    report: &R,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Human => report.render_human(),
        OutputFormat::Json => report.render_json(),
    }
}

/// HTML fragment of the model text for display: escaped, newlines as `<br>`.
pub fn html_fragment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 32);
    out.push_str("<div class='result-box'>");
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\n' => out.push_str("<br>"),
            '\r' => {}
            _ => out.push(ch),
        }
    }
    out.push_str("</div>");
    out
}

impl RenderReport for ResumeReport {
    fn raw_text(&self) -> &str {
        self.raw()
    }

    fn download_name(&self) -> &'static str {
        RESUME_DOWNLOAD_NAME
    }

    fn render_human(&self) -> anyhow::Result<String> {
        let mut out = String::new();
        writeln!(out, "Resume Compatibility Score: {}%", self.score())?;
        for slice in &self.chart.slices {
            writeln!(out, "  - {:<5} {:>3}", slice.label, slice.value)?;
        }
        writeln!(out)?;
        writeln!(out, "Analysis Report:")?;
        writeln!(out, "{}", self.raw().trim_end())?;
        Ok(out)
    }

    fn render_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(&JsonResumeReport {
            kind: "resume",
            compatibility_score: self.score(),
            chart: &self.chart,
            report: self.raw(),
        })?)
    }
}

impl RenderReport for FeedbackReport {
    fn raw_text(&self) -> &str {
        self.raw()
    }

    fn download_name(&self) -> &'static str {
        FEEDBACK_DOWNLOAD_NAME
    }

    fn render_human(&self) -> anyhow::Result<String> {
        self.render_human_styled(|_, line| line)
    }

    fn render_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(&JsonFeedbackReport {
            kind: "feedback",
            sentiment_score: self.score(),
            sentiment_label: self.label(),
            band: self.band,
            band_color: self.band.color(),
            label_color: self.label_color,
            gauge: &self.gauge,
            report: self.raw(),
        })?)
    }
}

/// Trailing summary lines of a human feedback report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryLine {
    Score,
    Label,
}

impl FeedbackReport {
    /// Human rendering with `style` applied to each summary line, e.g. terminal colors.
    pub fn render_human_styled<F>(&self, style: F) -> anyhow::Result<String>
    where
        F: Fn(SummaryLine, String) -> String,
    {
        let score_line = format!(
            "Sentiment Score: {} ({}, {})",
            self.score(),
            self.band.description(),
            self.band.color()
        );
        let label_line = format!("Overall Sentiment: {}", self.label());

        let mut out = String::new();
        writeln!(out, "Sentiment Analysis Report:")?;
        writeln!(out, "{}", self.raw().trim_end())?;
        writeln!(out)?;
        writeln!(out, "{}", style(SummaryLine::Score, score_line))?;
        writeln!(out, "{}", style(SummaryLine::Label, label_line))?;
        Ok(out)
    }
}

#[derive(Debug, Serialize)]
struct JsonResumeReport<'a> {
    kind: &'static str,
    compatibility_score: u8,
    chart: &'a PieChart,
    report: &'a str,
}

#[derive(Debug, Serialize)]
struct JsonFeedbackReport<'a> {
    kind: &'static str,
    sentiment_score: u8,
    sentiment_label: &'a str,
    band: SentimentBand,
    band_color: &'static str,
    label_color: LabelColor,
    gauge: &'a GaugeChart,
    report: &'a str,
}
