//! LCD control-byte stream encoding.
//!
//! The wire format is a single logical byte stream mixing literal text
//! bytes with five reserved control codes in 23..=31. Bar glyphs exist
//! only as typed frame cells, so they can never collide with literal
//! text; any reserved byte that does show up in text (a pathological
//! sensor label, for instance) is sanitized to `'?'` and logged.
//!
//! Per-tick emit order: optional clear, optional backlight toggle, then
//! each line's bytes followed by exactly one line break — including after
//! the last line; the receiving device decides whether a trailing break
//! is a no-op or a buffer wrap.

use crate::bar::BarLevel;
use crate::frame::{Cell, RenderedFrame};
use bitflags::bitflags;
use tracing::warn;

/// Bar glyph, fill level 1/5.
pub const BAR_LEVEL_1: u8 = 23;
/// Bar glyph, fill level 2/5.
pub const BAR_LEVEL_2: u8 = 24;
/// Bar glyph, fill level 3/5.
pub const BAR_LEVEL_3: u8 = 25;
/// Bar glyph, fill level 4/5.
pub const BAR_LEVEL_4: u8 = 26;
/// Bar glyph, full cell.
pub const BAR_LEVEL_5: u8 = 27;
/// Turn the backlight on.
pub const OPEN_BACKLIGHT: u8 = 28;
/// Turn the backlight off.
pub const CLOSE_BACKLIGHT: u8 = 29;
/// Advance to the next line.
pub const LINE_BREAK: u8 = 30;
/// Clear the display.
pub const CLEAR: u8 = 31;

/// Replacement for text bytes the protocol cannot carry.
const PLACEHOLDER: u8 = b'?';

bitflags! {
    /// Control intents emitted ahead of a frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Intents: u8 {
        /// Clear the display before the frame.
        const CLEAR = 1 << 0;
        /// Turn the backlight on before the frame.
        const BACKLIGHT_ON = 1 << 1;
        /// Turn the backlight off before the frame.
        const BACKLIGHT_OFF = 1 << 2;
    }
}

/// Encode one frame plus control intents into the output byte stream.
pub fn encode(frame: &RenderedFrame, intents: Intents) -> Vec<u8> {
    // Worst case: every cell one byte, one break per line, three intents.
    let capacity = frame.lines.iter().map(|l| l.len() + 1).sum::<usize>() + 3;
    let mut out = Vec::with_capacity(capacity);

    if intents.contains(Intents::CLEAR) {
        out.push(CLEAR);
    }
    if intents.contains(Intents::BACKLIGHT_ON) {
        out.push(OPEN_BACKLIGHT);
    }
    if intents.contains(Intents::BACKLIGHT_OFF) {
        out.push(CLOSE_BACKLIGHT);
    }

    for line in &frame.lines {
        for cell in line.cells() {
            out.push(encode_cell(cell));
        }
        out.push(LINE_BREAK);
    }

    out
}

/// Byte sequence emitted when a connection opens, ahead of the first frame.
pub fn connect_sequence() -> [u8; 2] {
    [CLEAR, OPEN_BACKLIGHT]
}

/// Byte sequence emitted (best-effort) when a connection closes.
pub fn disconnect_sequence() -> [u8; 2] {
    [CLEAR, CLOSE_BACKLIGHT]
}

fn encode_cell(cell: &Cell) -> u8 {
    match cell {
        Cell::Bar(level) => bar_code(*level),
        Cell::Char(c) => encode_char(*c),
    }
}

fn bar_code(level: BarLevel) -> u8 {
    match level {
        BarLevel::One => BAR_LEVEL_1,
        BarLevel::Two => BAR_LEVEL_2,
        BarLevel::Three => BAR_LEVEL_3,
        BarLevel::Four => BAR_LEVEL_4,
        BarLevel::Five => BAR_LEVEL_5,
    }
}

/// Map a text character to its single wire byte.
///
/// Printable ASCII and the extended 128..=255 range pass through; control
/// characters (which include the reserved 23..=31 block) and anything
/// beyond U+00FF cannot be carried and become the placeholder.
fn encode_char(c: char) -> u8 {
    match u32::from(c) {
        cp @ 32..=126 => cp as u8,
        cp @ 128..=255 => cp as u8,
        cp => {
            warn!(codepoint = cp, "unencodable character in frame text, sanitized");
            PLACEHOLDER
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
