//! Normalization of computed CSS values into comparable strings.

use crate::color::{parse_css_color, trim_float};

/// Parses a pixel length (`16px`, `0`, `-4.5px`). Other units yield `None`.
pub fn parse_px(value: &str) -> Option<f64> {
    let v = value.trim();
    let number = match v.strip_suffix("px") {
        Some(n) => n.trim(),
        None if v == "0" => v,
        None => return None,
    };
    number.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// `16` -> `16px`, `12.504` -> `12.5px`.
pub fn format_px(value: f64) -> String {
    format!("{}px", trim_float(value, 2))
}

/// Splits on commas that are not inside parentheses.
pub fn split_top_level_commas(value: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for ch in value.chars() {
        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

/// Splits on whitespace outside parentheses.
fn split_top_level_whitespace(value: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for ch in value.chars() {
        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            c if c.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

/// Canonical form of a `box-shadow` declaration, or `None` for `none`.
///
/// Within a layer the keyword `inset` comes first, then the color, then the
/// lengths in their original order. Layers keep their order, so a multi-layer
/// shadow stays one value.
pub fn normalize_shadow(value: &str) -> Option<String> {
    let v = value.trim().to_ascii_lowercase();
    if v.is_empty() || v == "none" {
        return None;
    }
    let layers: Vec<String> = split_top_level_commas(&v)
        .iter()
        .map(|layer| {
            let mut inset = false;
            let mut color = None;
            let mut lengths = Vec::new();
            for token in split_top_level_whitespace(layer) {
                if token == "inset" {
                    inset = true;
                } else if let Some(c) = parse_css_color(&token) {
                    color = Some(c.to_css());
                } else if let Some(px) = parse_px(&token) {
                    lengths.push(format_px(px));
                } else {
                    lengths.push(token);
                }
            }
            let mut out = Vec::new();
            if inset {
                out.push("inset".to_string());
            }
            if let Some(c) = color {
                out.push(c);
            }
            out.extend(lengths);
            out.join(" ")
        })
        .filter(|layer| !layer.is_empty())
        .collect();
    if layers.is_empty() {
        None
    } else {
        Some(layers.join(", "))
    }
}

/// Canonical `border-radius`; equal corners collapse to one value, zero yields `None`.
/// Elliptical radii keep their ` / ` separator unless both axes match.
pub fn normalize_radius(value: &str) -> Option<String> {
    let v = value.trim().to_ascii_lowercase();
    if v.is_empty() {
        return None;
    }
    let axes: Vec<Vec<String>> = v
        .split('/')
        .map(|axis| {
            axis.split_whitespace()
                .map(|p| parse_px(p).map(format_px).unwrap_or_else(|| p.to_string()))
                .collect()
        })
        .collect();
    if axes.iter().flatten().all(|p| p == "0px") {
        return None;
    }
    let collapse = |parts: &[String]| -> String {
        if parts.iter().all(|p| p == &parts[0]) {
            parts[0].clone()
        } else {
            parts.join(" ")
        }
    };
    let mut normalized: Vec<String> = axes
        .iter()
        .filter(|parts| !parts.is_empty())
        .map(|parts| collapse(parts))
        .collect();
    normalized.dedup();
    Some(normalized.join(" / "))
}

/// Parses `0.2s` / `150ms` into milliseconds.
pub fn parse_duration_ms(value: &str) -> Option<f64> {
    let v = value.trim().to_ascii_lowercase();
    if let Some(ms) = v.strip_suffix("ms") {
        return ms.trim().parse().ok();
    }
    if let Some(s) = v.strip_suffix('s') {
        return s.trim().parse::<f64>().ok().map(|s| s * 1000.0);
    }
    None
}

/// Canonical `transition-duration` list in ms, or `None` when all durations are zero.
pub fn normalize_duration(value: &str) -> Option<String> {
    let durations: Vec<f64> = split_top_level_commas(value)
        .iter()
        .filter_map(|d| parse_duration_ms(d))
        .collect();
    if durations.is_empty() || durations.iter().all(|d| *d <= 0.0) {
        return None;
    }
    Some(
        durations
            .iter()
            .map(|d| format!("{}ms", trim_float(*d, 1)))
            .collect::<Vec<_>>()
            .join(", "),
    )
}
