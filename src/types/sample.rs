//! Style samples captured from a rendered page.

use serde::{Deserialize, Serialize};

use crate::color::Rgba;

/// Rectangle bounds for an element, in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Four box-model edge values in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Sides {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Sides {
    pub fn values(&self) -> [f64; 4] {
        [self.top, self.right, self.bottom, self.left]
    }
}

/// One sampled element's observed computed style.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSample {
    /// Short CSS-ish hint for locating the element (e.g. `button.primary`).
    pub selector: String,
    pub tag: String,
    pub font_size: Option<f64>,
    pub font_weight: Option<String>,
    pub font_family: Option<String>,
    /// Raw computed value, e.g. `24px` or `normal`.
    pub line_height: Option<String>,
    pub color: Option<Rgba>,
    /// Effective background after walking transparent ancestors.
    pub background_color: Option<Rgba>,
    /// Set only when the element draws a visible border.
    pub border_color: Option<Rgba>,
    /// Element paints a background image or gradient.
    pub has_background_image: bool,
    pub margin: Sides,
    pub padding: Sides,
    pub row_gap: Option<f64>,
    pub column_gap: Option<f64>,
    pub border_radius: Option<String>,
    pub box_shadow: Option<String>,
    pub z_index: Option<String>,
    pub opacity: Option<f64>,
    pub transition_duration: Option<String>,
    pub rect: BoundingBox,
}

/// The bounded, document-ordered samples for one audit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleSet {
    /// Text-bearing elements (typography and text colors).
    pub text: Vec<StyleSample>,
    /// Layout elements (backgrounds, spacing, misc, patterns).
    pub layout: Vec<StyleSample>,
    pub page_background: Option<Rgba>,
    /// Elements dropped because a cap was reached.
    pub truncated: usize,
}

impl SampleSet {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.layout.is_empty()
    }

    /// Layout elements whose background cannot be reduced to one color.
    pub fn background_image_count(&self) -> usize {
        self.layout
            .iter()
            .filter(|s| s.has_background_image)
            .count()
    }
}
