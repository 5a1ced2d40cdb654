use serde::{Deserialize, Serialize};

use crate::utils::constants::DEFAULT_ACCENT_COLOR;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Candle,
    Line,
    Area,
}

impl ChartType {
    pub const ALL: [ChartType; 3] = [ChartType::Candle, ChartType::Line, ChartType::Area];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Candle => "candle",
            ChartType::Line => "line",
            ChartType::Area => "area",
        }
    }
}

/// Display and chart preferences. Local only, no server copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub theme: Theme,
    pub chart_type: ChartType,
    pub show_volume: bool,
    pub accent_color: String,
    pub compact_mode: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            chart_type: ChartType::Candle,
            show_volume: true,
            accent_color: DEFAULT_ACCENT_COLOR.to_string(),
            compact_mode: false,
        }
    }
}
