//! Rotating four-slot mirror of emitted lines.
//!
//! Purely for on-screen inspection of what was last sent to the device;
//! it never touches the wire protocol. Bar glyphs mirror as the printable
//! substitutes '2', '4', '6', '8', '=' so the mirror stays plain text.
//! The rotation index resets only on process start, not on reconnect.

use crate::bar::BarLevel;
use crate::frame::{Cell, Line};

const SLOTS: usize = 4;

/// Last four emitted lines, newest overwriting the oldest slot.
#[derive(Debug, Clone, Default)]
pub struct PreviewBuffer {
    slots: [String; SLOTS],
    next: usize,
}

impl PreviewBuffer {
    /// An empty preview with the rotation at slot zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one emitted line, advancing the rotation.
    pub fn push(&mut self, line: &Line) {
        self.slots[self.next] = line.cells().iter().map(mirror_cell).collect();
        self.next = (self.next + 1) % SLOTS;
    }

    /// Record an out-of-band status line (error frames, notices).
    pub fn push_text(&mut self, text: &str) {
        self.slots[self.next] = text.to_string();
        self.next = (self.next + 1) % SLOTS;
    }

    /// Slot contents in slot order (not emission order).
    pub fn slots(&self) -> &[String; SLOTS] {
        &self.slots
    }

    /// All four slots joined with newlines, for logging or a status UI.
    pub fn text(&self) -> String {
        self.slots.join("\n")
    }
}

fn mirror_cell(cell: &Cell) -> char {
    match cell {
        Cell::Char(c) => *c,
        Cell::Bar(BarLevel::One) => '2',
        Cell::Bar(BarLevel::Two) => '4',
        Cell::Bar(BarLevel::Three) => '6',
        Cell::Bar(BarLevel::Four) => '8',
        Cell::Bar(BarLevel::Five) => '=',
    }
}
