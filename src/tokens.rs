//! Design-token proposals and their export formats.
//!
//! Tokens come from each report's proposed scale. Exports are pure
//! serializations of a finished audit: a flat name/value map, a utility
//! framework (Tailwind) theme extension, and a `:root` custom-property sheet.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::types::{AuditResult, Category, DesignToken, ReportDetail, SprawlReport, TokenGroup};
use crate::{DsaError, Result};

impl TokenGroup {
    fn for_category(category: Category) -> Self {
        match category {
            Category::Colors => TokenGroup::Color,
            Category::FontSizes => TokenGroup::FontSize,
            Category::FontWeights => TokenGroup::FontWeight,
            Category::FontFamilies => TokenGroup::FontFamily,
            Category::LineHeights => TokenGroup::LineHeight,
            Category::Spacing => TokenGroup::Spacing,
            Category::Radii => TokenGroup::Radius,
            Category::Shadows => TokenGroup::Shadow,
            Category::ZIndex => TokenGroup::ZIndex,
            Category::Opacity => TokenGroup::Opacity,
            Category::Transitions => TokenGroup::Duration,
        }
    }

    /// Token-name prefix, e.g. `space` in `space-3`.
    pub const fn prefix(self) -> &'static str {
        match self {
            TokenGroup::Color => "color",
            TokenGroup::FontSize => "font-size",
            TokenGroup::FontWeight => "font-weight",
            TokenGroup::FontFamily => "font-family",
            TokenGroup::LineHeight => "line-height",
            TokenGroup::Spacing => "space",
            TokenGroup::Radius => "radius",
            TokenGroup::Shadow => "shadow",
            TokenGroup::ZIndex => "z",
            TokenGroup::Opacity => "opacity",
            TokenGroup::Duration => "duration",
        }
    }

    /// Key under Tailwind's `theme.extend`.
    pub const fn tailwind_key(self) -> &'static str {
        match self {
            TokenGroup::Color => "colors",
            TokenGroup::FontSize => "fontSize",
            TokenGroup::FontWeight => "fontWeight",
            TokenGroup::FontFamily => "fontFamily",
            TokenGroup::LineHeight => "lineHeight",
            TokenGroup::Spacing => "spacing",
            TokenGroup::Radius => "borderRadius",
            TokenGroup::Shadow => "boxShadow",
            TokenGroup::ZIndex => "zIndex",
            TokenGroup::Opacity => "opacity",
            TokenGroup::Duration => "transitionDuration",
        }
    }
}

/// Proposes tokens for every computable category, in category order.
/// Names are kebab-case and unique within the result.
pub fn propose_tokens(reports: &[SprawlReport]) -> Vec<DesignToken> {
    let mut used: HashSet<String> = HashSet::new();
    let mut tokens = Vec::new();

    for report in reports.iter().filter(|r| r.is_computable()) {
        let group = TokenGroup::for_category(report.category);
        match (&report.detail, group) {
            (Some(ReportDetail::Palette { entries }), TokenGroup::Color) => {
                let limit = report.proposed_scale.len();
                for entry in entries.iter().take(limit) {
                    let name = unique_name(&mut used, &format!("color-{}", entry.name));
                    tokens.push(DesignToken {
                        group,
                        name,
                        value: entry.hex.clone(),
                    });
                }
            }
            _ => {
                for (i, value) in report.proposed_scale.iter().enumerate() {
                    let base = format!("{}-{}", group.prefix(), i + 1);
                    tokens.push(DesignToken {
                        group,
                        name: unique_name(&mut used, &base),
                        value: value.clone(),
                    });
                }
            }
        }
    }
    tokens
}

fn unique_name(used: &mut HashSet<String>, base: &str) -> String {
    let mut name = base.to_string();
    let mut suffix = 2;
    while used.contains(&name) {
        name = format!("{}-{}", base, suffix);
        suffix += 1;
    }
    used.insert(name.clone());
    name
}

/// Flat `name -> value` mapping.
pub fn to_token_map(tokens: &[DesignToken]) -> BTreeMap<String, String> {
    tokens
        .iter()
        .map(|t| (t.name.clone(), t.value.clone()))
        .collect()
}

/// `{ "theme": { "extend": { ... } } }` for a Tailwind config.
pub fn to_tailwind_config(tokens: &[DesignToken]) -> Value {
    let mut extend = Map::new();
    for token in tokens {
        let key = token
            .name
            .strip_prefix(token.group.prefix())
            .map(|rest| rest.trim_start_matches('-'))
            .filter(|rest| !rest.is_empty())
            .unwrap_or(&token.name);
        let section = extend
            .entry(token.group.tailwind_key())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(section) = section {
            section.insert(key.to_string(), Value::String(token.value.clone()));
        }
    }
    serde_json::json!({ "theme": { "extend": Value::Object(extend) } })
}

/// A `:root` block declaring one custom property per token.
pub fn to_css_variables(tokens: &[DesignToken]) -> String {
    let mut css = String::from(":root {\n");
    for token in tokens {
        css.push_str(&format!("  --{}: {};\n", token.name, token.value));
    }
    css.push_str("}\n");
    css
}

/// Reads custom properties back out of a stylesheet fragment.
pub fn parse_css_variables(css: &str) -> Result<BTreeMap<String, String>> {
    let body = css
        .split_once('{')
        .and_then(|(_, rest)| rest.rsplit_once('}'))
        .map(|(body, _)| body)
        .ok_or_else(|| DsaError::Config("stylesheet has no declaration block".to_string()))?;

    let mut vars = BTreeMap::new();
    for declaration in body.split(';') {
        let declaration = declaration.trim();
        if declaration.is_empty() {
            continue;
        }
        let (name, value) = declaration.split_once(':').ok_or_else(|| {
            DsaError::Config(format!("malformed declaration: {}", declaration))
        })?;
        let name = name.trim();
        let Some(name) = name.strip_prefix("--") else {
            continue;
        };
        vars.insert(name.to_string(), value.trim().to_string());
    }
    Ok(vars)
}

/// Export target for `dsa export`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Tokens,
    Tailwind,
    Css,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Tokens => "tokens",
            ExportFormat::Tailwind => "tailwind",
            ExportFormat::Css => "css",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = DsaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tokens" | "json" => Ok(ExportFormat::Tokens),
            "tailwind" => Ok(ExportFormat::Tailwind),
            "css" => Ok(ExportFormat::Css),
            other => Err(DsaError::Config(format!("Unknown export format: {}", other))),
        }
    }
}

/// Serializes a finished audit's token proposals.
pub fn export(result: &AuditResult, format: ExportFormat) -> Result<String> {
    let tokens = &result.token_proposals;
    match format {
        ExportFormat::Tokens => Ok(serde_json::to_string_pretty(&to_token_map(tokens))?),
        ExportFormat::Tailwind => Ok(serde_json::to_string_pretty(&to_tailwind_config(tokens))?),
        ExportFormat::Css => Ok(to_css_variables(tokens)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColorEntry, ColorRole, ValueCount};

    fn entry(hex: &str, name: &str) -> ColorEntry {
        ColorEntry {
            hex: hex.into(),
            lab: [0.0; 3],
            count: 1,
            role: ColorRole::Text,
            name: name.into(),
            members: vec![hex.into()],
        }
    }

    fn reports() -> Vec<SprawlReport> {
        let colors = SprawlReport::measured(
            Category::Colors,
            2,
            vec![ValueCount::new("#1e40af", 3), ValueCount::new("#1d4ed8", 1)],
            vec!["#1e40af".into(), "#1d4ed8".into()],
        )
        .with_detail(ReportDetail::Palette {
            entries: vec![entry("#1e40af", "royal-blue"), entry("#1d4ed8", "royal-blue")],
        });
        let spacing = SprawlReport::measured(
            Category::Spacing,
            2,
            vec![ValueCount::new("8px", 2), ValueCount::new("4px", 1)],
            vec!["4px".into(), "8px".into()],
        );
        let broken = SprawlReport::not_computable(Category::Radii, "failed");
        vec![colors, spacing, broken]
    }

    #[test]
    fn token_names_are_unique() {
        let tokens = propose_tokens(&reports());
        let names: Vec<&str> = tokens.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["color-royal-blue", "color-royal-blue-2", "space-1", "space-2"]
        );
    }

    #[test]
    fn tailwind_config_groups_by_theme_key() {
        let config = to_tailwind_config(&propose_tokens(&reports()));
        assert_eq!(config["theme"]["extend"]["colors"]["royal-blue"], "#1e40af");
        assert_eq!(config["theme"]["extend"]["spacing"]["1"], "4px");
        assert!(config["theme"]["extend"].get("borderRadius").is_none());
    }

    #[test]
    fn css_round_trips_to_token_map() {
        let tokens = propose_tokens(&reports());
        let css = to_css_variables(&tokens);
        assert!(css.starts_with(":root {"));
        assert_eq!(parse_css_variables(&css).unwrap(), to_token_map(&tokens));
    }

    #[test]
    fn values_with_commas_survive_css() {
        let tokens = vec![
            DesignToken {
                group: TokenGroup::FontFamily,
                name: "font-family-1".into(),
                value: "Inter, sans-serif".into(),
            },
            DesignToken {
                group: TokenGroup::Shadow,
                name: "shadow-1".into(),
                value: "rgba(0, 0, 0, 0.1) 0px 1px 2px 0px, #000000 0px 0px 1px 0px".into(),
            },
        ];
        let parsed = parse_css_variables(&to_css_variables(&tokens)).unwrap();
        assert_eq!(parsed, to_token_map(&tokens));
    }

    #[test]
    fn empty_tokens_still_produce_valid_exports() {
        assert_eq!(to_css_variables(&[]), ":root {\n}\n");
        assert!(parse_css_variables(":root {\n}\n").unwrap().is_empty());
        assert!(parse_css_variables("no block").is_err());
    }

    #[test]
    fn export_format_parses() {
        assert_eq!("CSS".parse::<ExportFormat>().unwrap(), ExportFormat::Css);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Tokens);
        assert!("yaml".parse::<ExportFormat>().is_err());
    }
}
