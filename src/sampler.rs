//! Conversion of the raw in-page capture into typed style samples.

use crate::browser::{RawCapture, RawElement};
use crate::color::{parse_css_color, Rgba};
use crate::config::SamplingLimits;
use crate::css::{format_px, parse_px};
use crate::types::{BoundingBox, SampleSet, Sides, StyleSample};
use crate::{DsaError, Result};

/// Builds the bounded sample set for one page.
///
/// Caps are re-applied here so a misbehaving helper cannot hand the analyzers
/// more than the configured number of elements; overflow is counted, never an error.
pub fn sample_page(capture: &RawCapture, limits: &SamplingLimits) -> Result<SampleSet> {
    if let Some(message) = &capture.sample_error {
        return Err(DsaError::sample(message.clone()));
    }

    let page_background = capture
        .page_background
        .as_deref()
        .and_then(parse_css_color)
        .filter(|c| !c.is_transparent())
        .map(|c| c.over(Rgba::WHITE));
    let fallback = page_background.unwrap_or(Rgba::WHITE);

    let mut truncated = capture.truncated;
    let mut convert = |raw: &[RawElement], cap: usize| -> Vec<StyleSample> {
        truncated += raw.len().saturating_sub(cap);
        raw.iter()
            .take(cap)
            .map(|el| to_sample(el, fallback, limits.max_ancestor_depth))
            .collect()
    };

    let text = convert(&capture.text, limits.max_text_elements);
    let layout = convert(&capture.layout, limits.max_layout_elements);

    tracing::debug!(
        text = text.len(),
        layout = layout.len(),
        truncated,
        "sampled page"
    );

    Ok(SampleSet {
        text,
        layout,
        page_background,
        truncated,
    })
}

/// Effective background of an element: translucent layers in its
/// own-then-ancestors chain are composited down to the first opaque layer,
/// or to `fallback` (the page background) when the chain has none.
pub fn resolve_background(chain: &[String], fallback: Rgba, max_depth: usize) -> Rgba {
    let mut layers: Vec<Rgba> = Vec::new();
    for color in chain
        .iter()
        .take(max_depth)
        .filter_map(|value| parse_css_color(value))
        .filter(|c| !c.is_transparent())
    {
        layers.push(color);
        if color.is_opaque() {
            break;
        }
    }
    let base = match layers.last() {
        Some(last) if last.is_opaque() => *last,
        _ => fallback,
    };
    let stop = layers.iter().position(Rgba::is_opaque).unwrap_or(layers.len());
    layers[..stop]
        .iter()
        .rev()
        .fold(base, |backdrop, layer| layer.over(backdrop))
}

fn to_sample(el: &RawElement, fallback: Rgba, max_depth: usize) -> StyleSample {
    let border_visible = el
        .border_width
        .as_deref()
        .and_then(parse_px)
        .is_some_and(|w| w > 0.0);

    let background = resolve_background(&el.backgrounds, fallback, max_depth);

    StyleSample {
        selector: el.selector.clone(),
        tag: el.tag.to_ascii_lowercase(),
        font_size: el.font_size.as_deref().and_then(parse_px),
        font_weight: non_empty(el.font_weight.as_deref()),
        font_family: non_empty(el.font_family.as_deref()),
        line_height: el.line_height.as_deref().and_then(normalize_line_height),
        color: visible_color(el.color.as_deref(), background),
        background_color: Some(background),
        border_color: if border_visible {
            visible_color(el.border_color.as_deref(), background)
        } else {
            None
        },
        has_background_image: el
            .background_image
            .as_deref()
            .map(str::trim)
            .is_some_and(|v| !v.is_empty() && v != "none"),
        margin: sides(&el.margin),
        padding: sides(&el.padding),
        row_gap: el.row_gap.as_deref().and_then(parse_px),
        column_gap: el.column_gap.as_deref().and_then(parse_px),
        border_radius: non_empty(el.border_radius.as_deref()),
        box_shadow: non_empty(el.box_shadow.as_deref()),
        z_index: non_empty(el.z_index.as_deref()),
        opacity: el
            .opacity
            .as_deref()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite()),
        transition_duration: non_empty(el.transition_duration.as_deref()),
        rect: BoundingBox {
            x: el.rect.x,
            y: el.rect.y,
            width: el.rect.width,
            height: el.rect.height,
        },
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// The color as painted: translucent values are flattened onto `background`.
fn visible_color(value: Option<&str>, background: Rgba) -> Option<Rgba> {
    value
        .and_then(parse_css_color)
        .filter(|c| !c.is_transparent())
        .map(|c| c.over(background))
}

/// `24px` keeps its pixel form, keywords and unitless ratios stay as written.
fn normalize_line_height(value: &str) -> Option<String> {
    let v = value.trim();
    if v.is_empty() {
        return None;
    }
    Some(parse_px(v).map(format_px).unwrap_or_else(|| v.to_ascii_lowercase()))
}

fn sides(values: &[String]) -> Sides {
    let px = |i: usize| {
        values
            .get(i)
            .and_then(|v| parse_px(v))
            .unwrap_or(0.0)
    };
    Sides {
        top: px(0),
        right: px(1),
        bottom: px(2),
        left: px(3),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tag: &str) -> RawElement {
        RawElement {
            selector: tag.to_string(),
            tag: tag.to_string(),
            ..RawElement::default()
        }
    }

    #[test]
    fn background_walks_past_transparent_ancestors() {
        let chain = vec![
            "rgba(0, 0, 0, 0)".to_string(),
            "transparent".to_string(),
            "rgb(30, 64, 175)".to_string(),
            "rgb(255, 0, 0)".to_string(),
        ];
        let resolved = resolve_background(&chain, Rgba::WHITE, 64);
        assert_eq!(resolved.to_hex(), "#1e40af");
    }

    #[test]
    fn background_falls_back_when_chain_is_transparent_or_too_deep() {
        let chain = vec!["rgba(0, 0, 0, 0)".to_string(), "rgb(0, 0, 0)".to_string()];
        let page = Rgba::opaque(250, 250, 250);
        assert_eq!(resolve_background(&chain, page, 1), page);
        assert_eq!(resolve_background(&[], page, 64), page);
    }

    #[test]
    fn translucent_layers_composite_down_the_chain() {
        let overlay = vec!["rgba(0, 0, 0, 0.04)".to_string(), "rgb(255, 255, 255)".to_string()];
        let resolved = resolve_background(&overlay, Rgba::WHITE, 64);
        assert_eq!(resolved.to_hex(), "#f5f5f5");
        assert!(resolved.is_opaque());

        // No opaque ancestor: the page background is the backdrop.
        let veil = vec!["rgba(255, 255, 255, 0.5)".to_string()];
        let dark = Rgba::opaque(0, 0, 0);
        assert_eq!(resolve_background(&veil, dark, 64).to_hex(), "#808080");
    }

    #[test]
    fn translucent_text_is_flattened_onto_its_background() {
        let mut el = element("p");
        el.color = Some("rgba(0, 0, 0, 0.5)".into());
        el.backgrounds = vec!["rgb(255, 255, 255)".into()];
        let capture = RawCapture {
            text: vec![el],
            ..RawCapture::default()
        };
        let set = sample_page(&capture, &SamplingLimits::default()).unwrap();
        assert_eq!(set.text[0].color.map(|c| c.to_hex()).as_deref(), Some("#808080"));
    }

    #[test]
    fn page_background_defaults_to_white() {
        let mut capture = RawCapture::default();
        let mut el = element("div");
        el.backgrounds = vec!["rgba(0, 0, 0, 0)".to_string()];
        capture.layout.push(el);
        let set = sample_page(&capture, &SamplingLimits::default()).unwrap();
        assert_eq!(set.layout[0].background_color, Some(Rgba::WHITE));
        assert_eq!(set.page_background, None);
    }

    #[test]
    fn caps_truncate_without_error() {
        let capture = RawCapture {
            text: (0..5).map(|_| element("p")).collect(),
            layout: (0..7).map(|_| element("div")).collect(),
            truncated: 2,
            ..RawCapture::default()
        };
        let limits = SamplingLimits {
            max_text_elements: 3,
            max_layout_elements: 4,
            max_ancestor_depth: 64,
        };
        let set = sample_page(&capture, &limits).unwrap();
        assert_eq!(set.text.len(), 3);
        assert_eq!(set.layout.len(), 4);
        assert_eq!(set.truncated, 2 + 2 + 3);
    }

    #[test]
    fn in_page_failure_is_a_sample_error() {
        let capture = RawCapture {
            sample_error: Some("document.body is null".to_string()),
            ..RawCapture::default()
        };
        let err = sample_page(&capture, &SamplingLimits::default()).unwrap_err();
        assert!(matches!(err, DsaError::Sample(_)));
    }

    #[test]
    fn style_values_are_parsed() {
        let mut el = element("BUTTON");
        el.font_size = Some("14px".into());
        el.line_height = Some("20.0px".into());
        el.color = Some("rgb(255, 255, 255)".into());
        el.border_color = Some("rgb(0, 0, 0)".into());
        el.border_width = Some("0px".into());
        el.background_image = Some("linear-gradient(red, blue)".into());
        el.margin = vec!["0px".into(), "8px".into(), "auto".into(), "8px".into()];
        el.row_gap = Some("normal".into());
        el.column_gap = Some("12px".into());
        el.opacity = Some("0.5".into());
        let capture = RawCapture {
            layout: vec![el],
            ..RawCapture::default()
        };
        let set = sample_page(&capture, &SamplingLimits::default()).unwrap();
        let s = &set.layout[0];
        assert_eq!(s.tag, "button");
        assert_eq!(s.font_size, Some(14.0));
        assert_eq!(s.line_height.as_deref(), Some("20px"));
        assert_eq!(s.color, Some(Rgba::WHITE));
        assert_eq!(s.border_color, None);
        assert!(s.has_background_image);
        assert_eq!(s.margin.values(), [0.0, 8.0, 0.0, 8.0]);
        assert_eq!(s.row_gap, None);
        assert_eq!(s.column_gap, Some(12.0));
        assert_eq!(s.opacity, Some(0.5));
        assert_eq!(set.background_image_count(), 1);
    }

    #[test]
    fn visible_border_keeps_its_color() {
        let mut el = element("div");
        el.border_color = Some("rgb(229, 231, 235)".into());
        el.border_width = Some("1px".into());
        let capture = RawCapture {
            layout: vec![el],
            ..RawCapture::default()
        };
        let set = sample_page(&capture, &SamplingLimits::default()).unwrap();
        assert_eq!(
            set.layout[0].border_color.map(|c| c.to_hex()).as_deref(),
            Some("#e5e7eb")
        );
    }
}
