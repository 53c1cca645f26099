//! Frame rendering.
//!
//! `render` maps one sensor catalog plus one layout to a frame of
//! fixed-width lines. It is deterministic: given the same catalog, layout,
//! instant, and blink phase, the output is identical. The only mutable
//! state is the [`RenderSession`], which owns the blink phase (reset on
//! every reconnect) and the preview mirror (reset only on process start).

use crate::bar::percent_to_bar;
use crate::frame::{Cell, Line, RenderedFrame, RenderWarning};
use crate::layout::{Align, DisplayLayout, SegmentSpec, SensorRef};
use crate::preview::PreviewBuffer;
use chrono::NaiveDateTime;
use lcdlink_sensors::Catalog;
use std::fmt::Write as _;
use tracing::warn;

// ─── Session State ──────────────────────────────────────────────────

/// Per-session rendering state.
///
/// Replaces what would otherwise be ambient globals: the alternating
/// colon flag and the rotating preview index live here, with defined
/// reset rules.
#[derive(Debug, Clone, Default)]
pub struct RenderSession {
    colon_hidden: bool,
    preview: PreviewBuffer,
}

impl RenderSession {
    /// New session: colon visible, preview rotation at slot zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the blink phase to its initial value.
    ///
    /// Called whenever the connection transitions from closed to open.
    /// The preview rotation is deliberately NOT reset here.
    pub fn reset_blink(&mut self) {
        self.colon_hidden = false;
    }

    /// Current blink phase; `false` means separators are visible.
    pub fn colon_hidden(&self) -> bool {
        self.colon_hidden
    }

    /// The preview mirror.
    pub fn preview(&self) -> &PreviewBuffer {
        &self.preview
    }

    /// Mutable access for out-of-band status lines.
    pub fn preview_mut(&mut self) -> &mut PreviewBuffer {
        &mut self.preview
    }

    /// Render one frame from a catalog and a layout at the given instant.
    ///
    /// Every line is padded or truncated to exactly `layout.width` cells;
    /// missing trailing rows render blank. Sensor lookups that miss fall
    /// back to the segment's configured value and are reported in the
    /// frame's warning list. The blink phase advances once per call.
    pub fn render(
        &mut self,
        catalog: &Catalog,
        layout: &DisplayLayout,
        now: NaiveDateTime,
    ) -> RenderedFrame {
        let mut lines = Vec::with_capacity(layout.rows);
        let mut warnings = Vec::new();

        for row in 0..layout.rows {
            let line = match layout.lines.get(row) {
                Some(spec) => {
                    let mut cells = Vec::with_capacity(layout.width);
                    for segment in &spec.segments {
                        self.render_segment(segment, catalog, now, row, &mut cells, &mut warnings);
                    }
                    Line::fit(cells, layout.width)
                }
                None => Line::blank(layout.width),
            };
            self.preview.push(&line);
            lines.push(line);
        }

        for warning in &warnings {
            warn!(%warning, layout = %layout.name, "sensor fallback");
        }

        self.colon_hidden = !self.colon_hidden;

        RenderedFrame { lines, warnings }
    }

    fn render_segment(
        &self,
        segment: &SegmentSpec,
        catalog: &Catalog,
        now: NaiveDateTime,
        row: usize,
        cells: &mut Vec<Cell>,
        warnings: &mut Vec<RenderWarning>,
    ) {
        match segment {
            SegmentSpec::Text { text } => {
                cells.extend(text.chars().map(Cell::Char));
            }

            SegmentSpec::Value {
                label,
                unit,
                width,
                decimals,
                scale,
                align,
                fallback,
            } => {
                let value = lookup(catalog, label, unit.as_deref(), *fallback, row, warnings);
                let text = format_field(value * scale, *width, *decimals, *align);
                cells.extend(text.chars().map(Cell::Char));
            }

            SegmentSpec::Average {
                sensors,
                width,
                decimals,
                scale,
                align,
                fallback,
            } => {
                let a = lookup_ref(catalog, &sensors[0], *fallback, row, warnings);
                let b = lookup_ref(catalog, &sensors[1], *fallback, row, warnings);
                let mean = (a + b) / 2.0;
                let text = format_field(mean * scale, *width, *decimals, *align);
                cells.extend(text.chars().map(Cell::Char));
            }

            SegmentSpec::Bar {
                label,
                unit,
                width,
                fallback,
            } => {
                let value = lookup(catalog, label, unit.as_deref(), *fallback, row, warnings);
                let pattern = percent_to_bar(value);
                let mut bar_cells = Vec::with_capacity(*width);
                for _ in 0..pattern.full {
                    bar_cells.push(Cell::Bar(crate::bar::BarLevel::Five));
                }
                if let Some(level) = pattern.partial {
                    bar_cells.push(Cell::Bar(level));
                }
                bar_cells.truncate(*width);
                while bar_cells.len() < *width {
                    bar_cells.push(Cell::Char(' '));
                }
                cells.extend(bar_cells);
            }

            SegmentSpec::Clock { format, blink } => {
                let mut text = String::new();
                if write!(&mut text, "{}", now.format(format)).is_err() {
                    // Unformattable pattern: emit it raw rather than fail
                    // the whole frame.
                    text = format.clone();
                }
                if *blink && self.colon_hidden {
                    text = text.replace(':', " ");
                }
                cells.extend(text.chars().map(Cell::Char));
            }
        }
    }
}

// ─── Lookup & Formatting ────────────────────────────────────────────

fn lookup(
    catalog: &Catalog,
    label: &str,
    unit: Option<&str>,
    fallback: f64,
    row: usize,
    warnings: &mut Vec<RenderWarning>,
) -> f64 {
    match catalog.find(label, unit) {
        Some(reading) => reading.value,
        None => {
            warnings.push(RenderWarning {
                line: row,
                label: label.to_string(),
                unit: unit.map(str::to_string),
            });
            fallback
        }
    }
}

fn lookup_ref(
    catalog: &Catalog,
    sensor: &SensorRef,
    fallback: f64,
    row: usize,
    warnings: &mut Vec<RenderWarning>,
) -> f64 {
    lookup(
        catalog,
        &sensor.label,
        sensor.unit.as_deref(),
        fallback,
        row,
        warnings,
    )
}

/// Format a numeric field at a minimum width.
///
/// Zero decimals renders a truncated integer, matching how integer
/// readouts (clocks, temperatures, fan speeds) are conventionally shown.
fn format_field(value: f64, width: usize, decimals: usize, align: Align) -> String {
    let text = if decimals == 0 {
        format!("{}", value.trunc() as i64)
    } else {
        format!("{value:.decimals$}")
    };
    match align {
        Align::Right => format!("{text:>width$}"),
        Align::Left => format!("{text:<width$}"),
    }
}

/// Build a status frame: one message line, remaining rows blank.
///
/// Used at the tick boundary to put a failure on the display instead of
/// stale data.
pub fn status_frame(message: &str, width: usize, rows: usize) -> RenderedFrame {
    let mut frame = RenderedFrame::blank(width, rows.max(1));
    frame.lines[0] = Line::from_text(message, width);
    frame
}

// ─── Tests ──────────────────────────────────────────────────────────
