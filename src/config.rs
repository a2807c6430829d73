//! Audit configuration.
//!
//! Every policy constant used by the pipeline (timeouts, sampling caps,
//! clustering thresholds, scoring weights) lives here so a TOML file can
//! recalibrate it without code changes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::types::Category;

/// The single fixed viewport pages are rendered at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1440,
            height: 900,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewportParseError {
    #[error("Invalid viewport format: expected WIDTHxHEIGHT (e.g., 1440x900)")]
    InvalidFormat,
    #[error("Invalid viewport dimension: {0}")]
    InvalidDimension(String),
    #[error("Viewport dimensions must be positive")]
    Zero,
}

impl FromStr for Viewport {
    type Err = ViewportParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or(ViewportParseError::InvalidFormat)?;
        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| ViewportParseError::InvalidDimension(part.trim().to_string()))
        };
        let (width, height) = (parse(w)?, parse(h)?);
        if width == 0 || height == 0 {
            return Err(ViewportParseError::Zero);
        }
        Ok(Viewport { width, height })
    }
}

impl TryFrom<String> for Viewport {
    type Error = ViewportParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Viewport> for String {
    fn from(value: Viewport) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    #[serde(with = "humantime_serde")]
    pub navigation: Duration,
    #[serde(with = "humantime_serde")]
    pub network_idle: Duration,
    /// Fixed delay after network idle before sampling.
    #[serde(with = "humantime_serde")]
    pub settle: Duration,
    /// Hard cap on the whole browser helper process.
    #[serde(with = "humantime_serde")]
    pub process: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            navigation: Duration::from_secs(30),
            network_idle: Duration::from_secs(5),
            settle: Duration::from_millis(500),
            process: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub node_command: String,
    pub headless: bool,
    /// Extra navigation attempts after a transient load failure.
    pub navigation_retries: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            node_command: "node".to_string(),
            headless: true,
            navigation_retries: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingLimits {
    pub max_text_elements: usize,
    pub max_layout_elements: usize,
    pub max_ancestor_depth: usize,
}

impl Default for SamplingLimits {
    fn default() -> Self {
        Self {
            max_text_elements: 2000,
            max_layout_elements: 3000,
            max_ancestor_depth: 64,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Colors closer than this (CIE76 ΔE) collapse into one cluster.
    pub delta_e_threshold: f64,
    pub base_unit_tolerance_px: f64,
    /// Minimum fraction of spacing values that must fit a base unit.
    pub base_unit_threshold: f64,
    pub base_unit_max_px: u32,
    pub base_unit_min_px: u32,
    pub pattern_min_occurrences: usize,
    pub pattern_size_bucket_px: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            delta_e_threshold: 5.0,
            base_unit_tolerance_px: 1.0,
            base_unit_threshold: 0.8,
            base_unit_max_px: 64,
            base_unit_min_px: 2,
            pattern_min_occurrences: 2,
            pattern_size_bucket_px: 8.0,
        }
    }
}

/// Per-category weights of the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub colors: f64,
    pub font_sizes: f64,
    pub font_weights: f64,
    pub font_families: f64,
    pub line_heights: f64,
    pub spacing: f64,
    pub radii: f64,
    pub shadows: f64,
    pub z_index: f64,
    pub opacity: f64,
    pub transitions: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            colors: 0.20,
            font_sizes: 0.12,
            font_weights: 0.06,
            font_families: 0.08,
            line_heights: 0.06,
            spacing: 0.18,
            radii: 0.08,
            shadows: 0.07,
            z_index: 0.05,
            opacity: 0.05,
            transitions: 0.05,
        }
    }
}

impl ScoreWeights {
    pub fn weight(&self, category: Category) -> f64 {
        match category {
            Category::Colors => self.colors,
            Category::FontSizes => self.font_sizes,
            Category::FontWeights => self.font_weights,
            Category::FontFamilies => self.font_families,
            Category::LineHeights => self.line_heights,
            Category::Spacing => self.spacing,
            Category::Radii => self.radii,
            Category::Shadows => self.shadows,
            Category::ZIndex => self.z_index,
            Category::Opacity => self.opacity,
            Category::Transitions => self.transitions,
        }
    }

    pub fn sum(&self) -> f64 {
        Category::all().iter().map(|c| self.weight(*c)).sum()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub viewport: Viewport,
    pub timeouts: Timeouts,
    pub browser: BrowserConfig,
    pub sampling: SamplingLimits,
    pub analysis: AnalysisConfig,
    pub weights: ScoreWeights,
}

impl Config {
    /// Load from an explicit path, the central config file, or defaults (in that order).
    pub fn load(path: Option<&Path>) -> Result<Self, String> {
        let candidate = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::central_config_path().filter(|p| p.exists()),
        };
        let Some(candidate) = candidate else {
            return Ok(Config::default());
        };
        let raw = std::fs::read_to_string(&candidate).map_err(|e| e.to_string())?;
        toml::from_str(&raw).map_err(|e| e.to_string())
    }

    /// `~/.config/dsa/config.toml`, when a home directory is known.
    pub fn central_config_path() -> Option<PathBuf> {
        std::env::var_os("HOME")
            .filter(|h| !h.is_empty())
            .map(|home| {
                PathBuf::from(home)
                    .join(".config")
                    .join("dsa")
                    .join("config.toml")
            })
    }

    pub fn validate(&self) -> Result<(), String> {
        let a = &self.analysis;
        if !(a.delta_e_threshold > 0.0) {
            return Err("analysis.delta_e_threshold must be positive".to_string());
        }
        if !(a.base_unit_threshold > 0.0 && a.base_unit_threshold <= 1.0) {
            return Err("analysis.base_unit_threshold must be in (0, 1]".to_string());
        }
        if a.base_unit_tolerance_px < 0.0 {
            return Err("analysis.base_unit_tolerance_px must not be negative".to_string());
        }
        if a.base_unit_min_px == 0 || a.base_unit_min_px > a.base_unit_max_px {
            return Err(
                "analysis.base_unit_min_px must be positive and not exceed base_unit_max_px"
                    .to_string(),
            );
        }
        if !(a.pattern_size_bucket_px > 0.0) {
            return Err("analysis.pattern_size_bucket_px must be positive".to_string());
        }
        if a.pattern_min_occurrences == 0 {
            return Err("analysis.pattern_min_occurrences must be at least 1".to_string());
        }
        let s = &self.sampling;
        if s.max_text_elements == 0 || s.max_layout_elements == 0 || s.max_ancestor_depth == 0 {
            return Err("sampling caps must be positive".to_string());
        }
        if Category::all()
            .iter()
            .any(|c| self.weights.weight(*c) < 0.0 || !self.weights.weight(*c).is_finite())
        {
            return Err("weights must be finite and non-negative".to_string());
        }
        if self.weights.sum() <= 0.0 {
            return Err("at least one weight must be positive".to_string());
        }
        Ok(())
    }
}
