//! Raw capture records as emitted by the in-page sampling script.

use serde::{Deserialize, Serialize};

/// Top-level JSON printed by the helper process.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScriptOutput {
    pub status: String,
    pub message: Option<String>,
    pub capture: Option<RawCapture>,
}

/// Everything the sampling script observed on one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCapture {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// Computed background of `body`, falling back to `html`.
    #[serde(default)]
    pub page_background: Option<String>,
    #[serde(default)]
    pub text: Vec<RawElement>,
    #[serde(default)]
    pub layout: Vec<RawElement>,
    /// Elements skipped in-page after a cap was hit.
    #[serde(default)]
    pub truncated: usize,
    /// Set when the in-page script threw after navigation succeeded.
    #[serde(default)]
    pub sample_error: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// One element's computed-style map, values as CSS text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawElement {
    pub selector: String,
    pub tag: String,
    #[serde(default)]
    pub rect: RawRect,
    /// Own background color first, then each ancestor's, innermost first.
    #[serde(default)]
    pub backgrounds: Vec<String>,
    pub background_image: Option<String>,
    pub font_size: Option<String>,
    pub font_weight: Option<String>,
    pub font_family: Option<String>,
    pub line_height: Option<String>,
    pub color: Option<String>,
    pub border_color: Option<String>,
    pub border_width: Option<String>,
    /// top, right, bottom, left
    #[serde(default)]
    pub margin: Vec<String>,
    #[serde(default)]
    pub padding: Vec<String>,
    pub row_gap: Option<String>,
    pub column_gap: Option<String>,
    pub border_radius: Option<String>,
    pub box_shadow: Option<String>,
    pub z_index: Option<String>,
    pub opacity: Option<String>,
    pub transition_duration: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_output_deserializes() {
        let json = r#"{
            "status": "ok",
            "capture": {
                "url": "https://example.com/",
                "title": "Example",
                "pageBackground": "rgb(255, 255, 255)",
                "text": [{
                    "selector": "p.lead",
                    "tag": "p",
                    "rect": {"x": 0, "y": 10, "width": 300, "height": 24},
                    "backgrounds": ["rgba(0, 0, 0, 0)", "rgb(250, 250, 250)"],
                    "backgroundImage": "none",
                    "fontSize": "16px",
                    "fontWeight": "400",
                    "fontFamily": "Inter, sans-serif",
                    "lineHeight": "24px",
                    "color": "rgb(17, 24, 39)",
                    "margin": ["0px", "0px", "16px", "0px"],
                    "padding": ["0px", "0px", "0px", "0px"],
                    "rowGap": "normal",
                    "columnGap": "normal",
                    "borderRadius": "0px",
                    "boxShadow": "none",
                    "zIndex": "auto",
                    "opacity": "1",
                    "transitionDuration": "0s"
                }],
                "layout": [],
                "truncated": 0
            }
        }"#;

        let out: ScriptOutput = serde_json::from_str(json).unwrap();
        assert_eq!(out.status, "ok");
        let capture = out.capture.unwrap();
        assert_eq!(capture.page_background.as_deref(), Some("rgb(255, 255, 255)"));
        assert_eq!(capture.text.len(), 1);
        let el = &capture.text[0];
        assert_eq!(el.tag, "p");
        assert_eq!(el.backgrounds.len(), 2);
        assert_eq!(el.margin[2], "16px");
        assert_eq!(el.rect.width, 300.0);
        assert!(el.border_color.is_none());
        assert!(capture.sample_error.is_none());
    }

    #[test]
    fn error_output_deserializes_without_capture() {
        let out: ScriptOutput =
            serde_json::from_str(r#"{"status":"error","message":"net::ERR_NAME_NOT_RESOLVED"}"#)
                .unwrap();
        assert_eq!(out.status, "error");
        assert!(out.capture.is_none());
    }
}
