//! Declarative display layouts.
//!
//! A layout file is TOML data, loadable independent of the binary: a set
//! of named layouts, each an ordered list of lines, each line an ordered
//! list of segments. Segments are the unit of sensor selection and
//! numeric transformation; the renderer concatenates them and clamps the
//! result to the layout width.

use crate::error::{DisplayError, DisplayResult};
use serde::Deserialize;
use std::path::Path;

/// Default display width in columns.
pub const DEFAULT_WIDTH: usize = 20;

/// Default display height in rows.
pub const DEFAULT_ROWS: usize = 4;

const WIDTH_RANGE: std::ops::RangeInclusive<usize> = 4..=40;
const ROWS_RANGE: std::ops::RangeInclusive<usize> = 1..=8;

// ─── Schema ─────────────────────────────────────────────────────────

/// A parsed layout file: one or more named layouts.
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutFile {
    /// All layouts defined by the file.
    #[serde(rename = "layout")]
    pub layouts: Vec<DisplayLayout>,
}

/// A named, ordered list of line templates for one display geometry.
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayLayout {
    /// Layout name, referenced from the daemon configuration.
    pub name: String,
    /// Display width in columns.
    #[serde(default = "default_width")]
    pub width: usize,
    /// Display height in rows.
    #[serde(default = "default_rows")]
    pub rows: usize,
    /// Line templates, top to bottom. Missing trailing rows render blank.
    #[serde(rename = "line", default)]
    pub lines: Vec<LineSpec>,
}

/// One line template: segments concatenated left to right.
#[derive(Debug, Clone, Deserialize)]
pub struct LineSpec {
    /// Segments of the line.
    #[serde(rename = "segment", default)]
    pub segments: Vec<SegmentSpec>,
}

/// Horizontal justification of a numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    /// Pad on the right.
    Left,
    /// Pad on the left (numeric default).
    #[default]
    Right,
}

/// Which sensor a segment consumes.
#[derive(Debug, Clone, Deserialize)]
pub struct SensorRef {
    /// Exact original (non-user-renamed) label.
    pub label: String,
    /// Optional unit tie-break for labels published by several devices.
    #[serde(default)]
    pub unit: Option<String>,
}

/// One renderable segment.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SegmentSpec {
    /// Literal text, emitted as-is.
    Text {
        /// The text to emit.
        text: String,
    },
    /// A numeric readout of one sensor.
    Value {
        /// Exact original label of the sensor to read.
        label: String,
        /// Optional unit tie-break.
        #[serde(default)]
        unit: Option<String>,
        /// Minimum field width in cells.
        width: usize,
        /// Fractional digits; zero renders a truncated integer.
        #[serde(default)]
        decimals: usize,
        /// Multiplier applied before formatting.
        #[serde(default = "default_scale")]
        scale: f64,
        /// Field justification.
        #[serde(default)]
        align: Align,
        /// Value substituted when the sensor is missing.
        #[serde(default)]
        fallback: f64,
    },
    /// Arithmetic mean of two independently looked-up sensors.
    Average {
        /// The two sensors to average.
        sensors: [SensorRef; 2],
        /// Minimum field width in cells.
        width: usize,
        /// Fractional digits; zero renders a truncated integer.
        #[serde(default)]
        decimals: usize,
        /// Multiplier applied to the mean before formatting.
        #[serde(default = "default_scale")]
        scale: f64,
        /// Field justification.
        #[serde(default)]
        align: Align,
        /// Per-sensor value substituted when a lookup misses.
        #[serde(default)]
        fallback: f64,
    },
    /// A quantized 0–100 bar graph.
    Bar {
        /// Exact original label of the sensor holding the percentage.
        label: String,
        /// Optional unit tie-break.
        #[serde(default)]
        unit: Option<String>,
        /// Cells reserved for the bar (shorter bars are space-padded).
        width: usize,
        /// Percentage substituted when the sensor is missing.
        #[serde(default)]
        fallback: f64,
    },
    /// The current instant as a calendar string.
    Clock {
        /// strftime-style format.
        #[serde(default = "default_clock_format")]
        format: String,
        /// Blink the ':' separators by replacing them with spaces on
        /// alternating renders.
        #[serde(default = "default_true")]
        blink: bool,
    },
}

fn default_width() -> usize {
    DEFAULT_WIDTH
}

fn default_rows() -> usize {
    DEFAULT_ROWS
}

fn default_scale() -> f64 {
    1.0
}

fn default_clock_format() -> String {
    "%a %Y-%m-%d %H:%M".to_string()
}

fn default_true() -> bool {
    true
}

// ─── Loading & Validation ───────────────────────────────────────────

impl LayoutFile {
    /// Parse and validate a layout document.
    pub fn from_toml(text: &str) -> DisplayResult<Self> {
        let file: LayoutFile =
            toml::from_str(text).map_err(|e| DisplayError::Parse(e.to_string()))?;
        file.validate()?;
        Ok(file)
    }

    /// Read, parse, and validate a layout file from disk.
    pub fn load(path: impl AsRef<Path>) -> DisplayResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Look up a layout by name.
    pub fn get(&self, name: &str) -> DisplayResult<&DisplayLayout> {
        self.layouts
            .iter()
            .find(|l| l.name == name)
            .ok_or_else(|| DisplayError::UnknownLayout(name.to_string()))
    }

    fn validate(&self) -> DisplayResult<()> {
        if self.layouts.is_empty() {
            return Err(DisplayError::Validation(
                "layout file defines no layouts".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for layout in &self.layouts {
            if !seen.insert(layout.name.as_str()) {
                return Err(DisplayError::Validation(format!(
                    "duplicate layout name: {}",
                    layout.name
                )));
            }
            layout.validate()?;
        }
        Ok(())
    }
}

impl DisplayLayout {
    fn validate(&self) -> DisplayResult<()> {
        if !WIDTH_RANGE.contains(&self.width) {
            return Err(DisplayError::Validation(format!(
                "layout {}: width {} out of range [{}, {}]",
                self.name,
                self.width,
                WIDTH_RANGE.start(),
                WIDTH_RANGE.end()
            )));
        }
        if !ROWS_RANGE.contains(&self.rows) {
            return Err(DisplayError::Validation(format!(
                "layout {}: rows {} out of range [{}, {}]",
                self.name,
                self.rows,
                ROWS_RANGE.start(),
                ROWS_RANGE.end()
            )));
        }
        if self.lines.len() > self.rows {
            return Err(DisplayError::Validation(format!(
                "layout {}: {} lines exceed {} rows",
                self.name,
                self.lines.len(),
                self.rows
            )));
        }

        for (i, line) in self.lines.iter().enumerate() {
            for segment in &line.segments {
                segment.validate(&self.name, i, self.width)?;
            }
        }
        Ok(())
    }
}

impl SegmentSpec {
    fn validate(&self, layout: &str, line: usize, layout_width: usize) -> DisplayResult<()> {
        let field_width = match self {
            Self::Text { .. } | Self::Clock { .. } => None,
            Self::Value { width, .. } | Self::Average { width, .. } | Self::Bar { width, .. } => {
                Some(*width)
            }
        };

        if let Some(width) = field_width {
            if width == 0 {
                return Err(DisplayError::Validation(format!(
                    "layout {layout} line {line}: zero-width segment"
                )));
            }
            if width > layout_width {
                return Err(DisplayError::Validation(format!(
                    "layout {layout} line {line}: segment width {width} exceeds display width {layout_width}"
                )));
            }
        }

        if let Self::Clock { format, .. } = self {
            if format.is_empty() {
                return Err(DisplayError::Validation(format!(
                    "layout {layout} line {line}: empty clock format"
                )));
            }
        }

        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_layout_toml() -> &'static str {
        r#"
[[layout]]
name = "bars"
width = 20
rows = 4

[[layout.line]]
segment = [
    { kind = "clock", blink = true },
]

[[layout.line]]
segment = [
    { kind = "text", text = "Cpu " },
    { kind = "bar", label = "Total CPU Usage", width = 10 },
    { kind = "text", text = "| " },
    { kind = "value", label = "CPU Package", width = 2 },
    { kind = "text", text = "'c" },
]
"#
    }

    #[test]
    fn parse_valid_layout() {
        let file = LayoutFile::from_toml(minimal_layout_toml()).unwrap();
        assert_eq!(file.layouts.len(), 1);
        let layout = file.get("bars").unwrap();
        assert_eq!(layout.width, 20);
        assert_eq!(layout.rows, 4);
        assert_eq!(layout.lines.len(), 2);
        assert_eq!(layout.lines[1].segments.len(), 5);
    }

    #[test]
    fn defaults_apply() {
        let file = LayoutFile::from_toml(
            r#"
[[layout]]
name = "empty"
"#,
        )
        .unwrap();
        let layout = file.get("empty").unwrap();
        assert_eq!(layout.width, DEFAULT_WIDTH);
        assert_eq!(layout.rows, DEFAULT_ROWS);
        assert!(layout.lines.is_empty());
    }

    #[test]
    fn unknown_layout_name() {
        let file = LayoutFile::from_toml(minimal_layout_toml()).unwrap();
        let err = file.get("missing").unwrap_err();
        assert!(matches!(err, DisplayError::UnknownLayout(name) if name == "missing"));
    }

    #[test]
    fn reject_empty_file() {
        let err = LayoutFile::from_toml("").unwrap_err();
        assert!(matches!(err, DisplayError::Parse(_)));
    }

    #[test]
    fn reject_no_layouts() {
        let err = LayoutFile::from_toml("layout = []").unwrap_err();
        assert!(matches!(err, DisplayError::Validation(_)));
    }

    #[test]
    fn reject_duplicate_names() {
        let err = LayoutFile::from_toml(
            r#"
[[layout]]
name = "a"
[[layout]]
name = "a"
"#,
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("duplicate"), "got: {msg}");
    }

    #[test]
    fn reject_zero_width_segment() {
        let err = LayoutFile::from_toml(
            r#"
[[layout]]
name = "bad"
[[layout.line]]
segment = [{ kind = "value", label = "X", width = 0 }]
"#,
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("zero-width"), "got: {msg}");
    }

    #[test]
    fn reject_segment_wider_than_display() {
        let err = LayoutFile::from_toml(
            r#"
[[layout]]
name = "bad"
width = 16
[[layout.line]]
segment = [{ kind = "bar", label = "X", width = 17 }]
"#,
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("exceeds display width"), "got: {msg}");
    }

    #[test]
    fn reject_too_many_lines() {
        let err = LayoutFile::from_toml(
            r#"
[[layout]]
name = "bad"
rows = 1
[[layout.line]]
segment = [{ kind = "text", text = "a" }]
[[layout.line]]
segment = [{ kind = "text", text = "b" }]
"#,
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("exceed"), "got: {msg}");
    }

    #[test]
    fn reject_width_out_of_range() {
        let err = LayoutFile::from_toml(
            r#"
[[layout]]
name = "bad"
width = 100
"#,
        )
        .unwrap_err();
        assert!(matches!(err, DisplayError::Validation(_)));
    }

    #[test]
    fn reject_unknown_segment_kind() {
        let err = LayoutFile::from_toml(
            r#"
[[layout]]
name = "bad"
[[layout.line]]
segment = [{ kind = "sparkline", label = "X" }]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, DisplayError::Parse(_)));
    }

    #[test]
    fn average_segment_parses() {
        let file = LayoutFile::from_toml(
            r#"
[[layout]]
name = "avg"
[[layout.line]]
[[layout.line.segment]]
kind = "average"
sensors = [
    { label = "DIMM[2] Temperature" },
    { label = "DIMM[3] Temperature" },
]
width = 2
"#,
        )
        .unwrap();
        let layout = file.get("avg").unwrap();
        assert!(matches!(
            layout.lines[0].segments[0],
            SegmentSpec::Average { .. }
        ));
    }
}
