//! Pure mappings from extracted fields to chart descriptions and display colors.

use serde::{Deserialize, Serialize};

pub const MATCH_COLOR: &str = "#4CAF50";
pub const GAP_COLOR: &str = "#FF6F61";

/// Score cut points for sentiment bands. Both bounds are inclusive on the upper band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentThresholds {
    pub mid: u8,
    pub high: u8,
}

impl Default for SentimentThresholds {
    fn default() -> Self {
        Self { mid: 40, high: 70 }
    }
}

/// Qualitative bucket for a 0–100 sentiment score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentBand {
    Low,
    Mid,
    High,
}

impl SentimentBand {
    pub fn from_score(score: u8) -> Self {
        Self::from_score_with_thresholds(score, &SentimentThresholds::default())
    }

    pub fn from_score_with_thresholds(score: u8, thresholds: &SentimentThresholds) -> Self {
        if score >= thresholds.high {
            Self::High
        } else if score >= thresholds.mid {
            Self::Mid
        } else {
            Self::Low
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::High => "#4CAF50",
            Self::Mid => "#FFC107",
            Self::Low => "#F44336",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::High => "positive",
            Self::Mid => "neutral",
            Self::Low => "negative",
        }
    }
}

/// Display color for a sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelColor {
    Red,
    Green,
    Yellow,
    Default,
}

impl LabelColor {
    /// Case-insensitive substring match checked as negative, positive, neutral.
    pub fn for_label(label: &str) -> Self {
        let lower = label.to_lowercase();
        if lower.contains("negative") {
            Self::Red
        } else if lower.contains("positive") {
            Self::Green
        } else if lower.contains("neutral") {
            Self::Yellow
        } else {
            Self::Default
        }
    }

    pub fn css(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Default => "white",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieSlice {
    pub label: String,
    pub value: u8,
    pub color: String,
}

/// Donut chart splitting a compatibility score into match and gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieChart {
    pub slices: Vec<PieSlice>,
    pub hole: f32,
    pub annotation: String,
}

impl PieChart {
    pub fn compatibility(score: u8) -> Self {
        let score = score.min(100);
        Self {
            slices: vec![
                PieSlice {
                    label: "Match".into(),
                    value: score,
                    color: MATCH_COLOR.into(),
                },
                PieSlice {
                    label: "Gap".into(),
                    value: 100 - score,
                    color: GAP_COLOR.into(),
                },
            ],
            hole: 0.5,
            annotation: format!("{score}%"),
        }
    }
}

/// Colored range on the gauge axis, `[from, to)` except for the last step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GaugeStep {
    pub from: u8,
    pub to: u8,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeThreshold {
    pub color: String,
    pub width: u8,
    pub thickness: f32,
    pub value: u8,
}

/// Gauge chart for a sentiment score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeChart {
    pub title: String,
    pub value: u8,
    pub axis: (u8, u8),
    pub bar_color: String,
    pub steps: Vec<GaugeStep>,
    pub threshold: GaugeThreshold,
}

impl GaugeChart {
    pub fn sentiment(score: u8) -> Self {
        Self::sentiment_with_thresholds(score, &SentimentThresholds::default())
    }

    pub fn sentiment_with_thresholds(score: u8, thresholds: &SentimentThresholds) -> Self {
        let score = score.min(100);
        let step = |from: u8, to: u8, color: &str| GaugeStep {
            from,
            to,
            color: color.to_string(),
        };
        Self {
            title: "Sentiment Score".into(),
            value: score,
            axis: (0, 100),
            bar_color: "orange".into(),
            steps: vec![
                step(0, thresholds.mid, "red"),
                step(thresholds.mid, thresholds.high, "yellow"),
                step(thresholds.high, 100, "green"),
            ],
            threshold: GaugeThreshold {
                color: "black".into(),
                width: 4,
                thickness: 0.75,
                value: score,
            },
        }
    }
}
