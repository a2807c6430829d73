//! Color math: CSS color parsing, sRGB to CIE LAB, ΔE and naming.
//!
//! LAB uses the D65 reference white with standard sRGB gamma companding.
//! ΔE is CIE76: the Euclidean distance in LAB,
//! `sqrt((L1-L2)^2 + (a1-a2)^2 + (b1-b2)^2)`.
//! All functions are pure and deterministic.

use palette::{convert::FromColorUnclamped, Lab, Srgb};
use serde::{Deserialize, Serialize};

/// An sRGB color with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }

    pub fn is_opaque(&self) -> bool {
        self.a >= 1.0
    }

    /// Source-over compositing of `self` onto `backdrop`.
    pub fn over(&self, backdrop: Rgba) -> Rgba {
        let a = self.a.clamp(0.0, 1.0);
        if a >= 1.0 {
            return *self;
        }
        let da = backdrop.a.clamp(0.0, 1.0);
        let out = a + da * (1.0 - a);
        if out <= 0.0 {
            return Rgba { r: 0, g: 0, b: 0, a: 0.0 };
        }
        let mix = |s: u8, d: u8| {
            ((s as f64 * a + d as f64 * da * (1.0 - a)) / out)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        Rgba {
            r: mix(self.r, backdrop.r),
            g: mix(self.g, backdrop.g),
            b: mix(self.b, backdrop.b),
            a: out,
        }
    }

    /// Lowercase `#rrggbb`; alpha is dropped, so flatten translucent colors
    /// with [`Rgba::over`] first.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Canonical CSS text, used to normalize colors embedded in other values.
    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            self.to_hex()
        } else {
            format!(
                "rgba({}, {}, {}, {})",
                self.r,
                self.g,
                self.b,
                trim_float(self.a, 3)
            )
        }
    }

    pub fn to_lab(&self) -> LabColor {
        let srgb = Srgb::new(
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        );
        let lab: Lab = Lab::from_color_unclamped(srgb);
        LabColor {
            l: lab.l as f64,
            a: lab.a as f64,
            b: lab.b as f64,
        }
    }
}

/// A CIE L*a*b* coordinate (D65).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabColor {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

impl LabColor {
    pub fn to_array(self) -> [f64; 3] {
        [self.l, self.a, self.b]
    }

    pub fn chroma(&self) -> f64 {
        (self.a * self.a + self.b * self.b).sqrt()
    }
}

/// CIE76 color difference.
pub fn delta_e(x: LabColor, y: LabColor) -> f64 {
    let dl = x.l - y.l;
    let da = x.a - y.a;
    let db = x.b - y.b;
    (dl * dl + da * da + db * db).sqrt()
}

/// Parses the color forms browsers emit from `getComputedStyle`, plus hex.
pub fn parse_css_color(input: &str) -> Option<Rgba> {
    let s = input.trim().to_ascii_lowercase();
    match s.as_str() {
        "" | "none" | "currentcolor" | "inherit" | "initial" => return None,
        "transparent" => return Some(Rgba { r: 0, g: 0, b: 0, a: 0.0 }),
        "white" => return Some(Rgba::WHITE),
        "black" => return Some(Rgba::opaque(0, 0, 0)),
        _ => {}
    }
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    let inner = s
        .strip_prefix("rgba(")
        .or_else(|| s.strip_prefix("rgb("))?
        .strip_suffix(')')?;
    parse_rgb_args(inner)
}

/// Parses `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa` (the leading `#` optional).
pub fn parse_hex(hex: &str) -> Option<Rgba> {
    let hex = hex.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let expanded: String = match hex.len() {
        3 | 4 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 | 8 => hex.to_string(),
        _ => return None,
    };
    let byte = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    let alpha = if expanded.len() == 8 {
        byte(6)? as f64 / 255.0
    } else {
        1.0
    };
    Some(Rgba {
        r: byte(0)?,
        g: byte(2)?,
        b: byte(4)?,
        a: alpha,
    })
}

fn parse_rgb_args(inner: &str) -> Option<Rgba> {
    // Accepts both `r, g, b[, a]` and `r g b[ / a]`.
    let normalized = inner.replace('/', " ").replace(',', " ");
    let parts: Vec<&str> = normalized.split_whitespace().collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |raw: &str| -> Option<u8> {
        let value = if let Some(pct) = raw.strip_suffix('%') {
            pct.parse::<f64>().ok()? * 2.55
        } else {
            raw.parse::<f64>().ok()?
        };
        Some(value.round().clamp(0.0, 255.0) as u8)
    };
    let alpha = match parts.get(3) {
        Some(raw) => {
            let value = if let Some(pct) = raw.strip_suffix('%') {
                pct.parse::<f64>().ok()? / 100.0
            } else {
                raw.parse::<f64>().ok()?
            };
            value.clamp(0.0, 1.0)
        }
        None => 1.0,
    };
    Some(Rgba {
        r: channel(parts[0])?,
        g: channel(parts[1])?,
        b: channel(parts[2])?,
        a: alpha,
    })
}

/// Reference names for human-readable color labels, matched in order.
const NAMED_COLORS: &[(&str, &str)] = &[
    ("black", "#000000"),
    ("white", "#ffffff"),
    ("gray", "#808080"),
    ("dark-gray", "#404040"),
    ("light-gray", "#d3d3d3"),
    ("off-white", "#f5f5f5"),
    ("slate", "#708090"),
    ("red", "#ff0000"),
    ("dark-red", "#8b0000"),
    ("crimson", "#dc143c"),
    ("pink", "#ffc0cb"),
    ("hot-pink", "#ff69b4"),
    ("orange", "#ffa500"),
    ("dark-orange", "#ff8c00"),
    ("brown", "#8b4513"),
    ("tan", "#d2b48c"),
    ("beige", "#f5f5dc"),
    ("yellow", "#ffff00"),
    ("gold", "#ffd700"),
    ("olive", "#808000"),
    ("lime", "#00ff00"),
    ("green", "#008000"),
    ("dark-green", "#006400"),
    ("mint", "#98ff98"),
    ("teal", "#008080"),
    ("cyan", "#00ffff"),
    ("sky-blue", "#87ceeb"),
    ("light-blue", "#add8e6"),
    ("blue", "#0000ff"),
    ("royal-blue", "#4169e1"),
    ("navy", "#000080"),
    ("indigo", "#4b0082"),
    ("purple", "#800080"),
    ("violet", "#ee82ee"),
    ("lavender", "#e6e6fa"),
    ("magenta", "#ff00ff"),
    ("maroon", "#800000"),
];

/// Nearest reference name by ΔE; ties go to the earlier table entry.
pub fn color_name(color: &Rgba) -> &'static str {
    let lab = color.to_lab();
    let mut best: Option<(&'static str, f64)> = None;
    for (name, hex) in NAMED_COLORS {
        let Some(reference) = parse_hex(hex) else {
            continue;
        };
        let distance = delta_e(lab, reference.to_lab());
        match best {
            Some((_, d)) if distance >= d => {}
            _ => best = Some((name, distance)),
        }
    }
    best.map(|(name, _)| name).unwrap_or("gray")
}

/// Formats without trailing zeros, at most `decimals` places.
pub(crate) fn trim_float(value: f64, decimals: usize) -> String {
    let text = format!("{:.*}", decimals, value);
    let trimmed = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text.as_str()
    };
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
