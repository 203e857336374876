// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A single line: a dense array of [`CellEntry`] plus a side table of
//! [`ExtendedCell`]s for anything that doesn't fit the dense form.

use tracing::warn;

use crate::attrs::Color;
use crate::cell::{self, Cell, CellEntry, Encoded, ExtendedCell};

/// Flags carried by a [`Line`].
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct LineFlags(u8);

impl LineFlags {
    /// This line continues onto the next one; a logical paragraph's lines
    /// all have this set except the last.
    pub const WRAPPED: LineFlags = LineFlags(1 << 0);
    /// At least one cell in this line lives in the extended side table.
    pub const EXTENDED: LineFlags = LineFlags(1 << 1);
    /// Scratch sentinel set on lines superseded mid-reflow; skipped by
    /// later passes over the same block.
    pub const DEAD: LineFlags = LineFlags(1 << 2);

    pub const fn empty() -> Self {
        LineFlags(0)
    }

    pub fn contains(self, other: LineFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: LineFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: LineFlags) {
        self.0 &= !other.0;
    }

    pub fn set(&mut self, other: LineFlags, value: bool) {
        if value {
            self.insert(other);
        } else {
            self.remove(other);
        }
    }
}

/// One row of the grid: a variable-length run of dense cell entries plus
/// whatever entries had to be promoted to the extended side table.
#[derive(Clone, Debug, Default)]
pub struct Line {
    cells: Vec<CellEntry>,
    extended: Vec<ExtendedCell>,
    cellused: usize,
    pub flags: LineFlags,
}

impl Line {
    pub fn new() -> Self {
        Line { cells: Vec::new(), extended: Vec::new(), cellused: 0, flags: LineFlags::empty() }
    }

    pub fn cellsize(&self) -> usize {
        self.cells.len()
    }

    pub fn cellused(&self) -> usize {
        self.cellused
    }

    pub fn is_dead(&self) -> bool {
        self.flags.contains(LineFlags::DEAD)
    }

    pub fn is_wrapped(&self) -> bool {
        self.flags.contains(LineFlags::WRAPPED)
    }

    /// Release this line's buffers and mark it dead; used by the reflow
    /// engine when a row has been fully consumed by a join.
    pub fn kill(&mut self) {
        self.cells = Vec::new();
        self.extended = Vec::new();
        self.cellused = 0;
        self.flags = LineFlags::DEAD;
    }

    /// Enlarge `cells` to at least `width` entries, snapping up to the
    /// nearest of the three growth tiers `sx/4`, `sx/2`, `sx` to amortize
    /// sparse-line fill while leaving short lines small.
    pub fn expand(&mut self, width: usize, sx: usize, bg: Color) {
        if self.cells.len() >= width {
            return;
        }
        let mut new_len = width;
        for tier in [sx / 4, sx / 2, sx] {
            if tier >= width {
                new_len = tier;
                break;
            }
        }
        let new_len = new_len.max(width);

        let fill = if bg.is_rgb() {
            let offset = self.extended.len();
            self.extended.push(ExtendedCell { bg, ..ExtendedCell::default() });
            self.flags.insert(LineFlags::EXTENDED);
            cell::promote(CellEntry::DEFAULT, offset)
        } else {
            CellEntry::blank_with_bg(bg)
        };
        self.cells.resize(new_len, fill);
    }

    /// Overwrite the entry at `x` with a blank cell carrying `bg`. A no-op
    /// past the end of the line, since unwritten columns already read back
    /// as default.
    pub fn clear_cell(&mut self, x: usize, bg: Color) {
        if x >= self.cells.len() {
            return;
        }
        if bg.is_rgb() {
            let offset = self.extended.len();
            self.extended.push(ExtendedCell { bg, ..ExtendedCell::default() });
            self.flags.insert(LineFlags::EXTENDED);
            self.cells[x] = cell::promote(CellEntry::DEFAULT, offset);
        } else {
            self.cells[x] = CellEntry::blank_with_bg(bg);
        }
    }

    /// Read the cell at `x`, reconstructing it from whichever form backs
    /// it. Out-of-range columns and dangling extended offsets both read
    /// back as the default cell.
    pub fn get_cell(&self, x: usize) -> Cell {
        let Some(entry) = self.cells.get(x) else {
            return Cell::default();
        };
        if entry.is_extended() {
            match self.extended.get(entry.extended_offset()) {
                Some(ext) => ext.into(),
                None => {
                    warn!(x, offset = entry.extended_offset(), "extended offset out of range");
                    Cell::default()
                }
            }
        } else {
            (*entry).into()
        }
    }

    /// Write `value` at column `x`, expanding the line and promoting to
    /// the extended form if the cell demands it. `sx` is the grid width,
    /// used only to pick the growth tier. A width-2 cell also reserves a
    /// dense padding entry at `x + 1`.
    pub fn set_cell(&mut self, x: usize, value: &Cell, sx: usize) {
        let width = (value.width as usize).max(1);
        self.expand(x + width, sx, Color::Default);
        match cell::store(value) {
            Encoded::Dense(entry) => self.cells[x] = entry,
            Encoded::Extended(entry, ext) => {
                let offset = self.extended.len();
                self.extended.push(ext);
                self.cells[x] = cell::promote(entry, offset);
                self.flags.insert(LineFlags::EXTENDED);
            }
        }
        if width == 2 {
            self.cells[x + 1] = CellEntry::padding_with_bg(value.bg);
        }
        self.cellused = self.cellused.max(x + width);
    }

    /// Truncate the line to `width` cells, dropping anything past it. Used
    /// when clearing to end-of-line with a default background, to avoid
    /// materializing trailing default cells.
    pub fn truncate(&mut self, width: usize) {
        self.cells.truncate(width);
        self.cellused = self.cellused.min(width);
    }

    /// Rewrite `extended` to a packed array in traversal order, dropping
    /// slots no dense entry still references, and updating every
    /// surviving `offset` in place.
    pub fn compact(&mut self) {
        if self.extended.is_empty() {
            return;
        }
        let old_extended = std::mem::take(&mut self.extended);
        let mut packed = Vec::new();
        for entry in self.cells.iter_mut() {
            if !entry.is_extended() {
                continue;
            }
            let old_offset = entry.extended_offset();
            match old_extended.get(old_offset) {
                Some(ext) => {
                    let new_offset = packed.len();
                    packed.push(ext.clone());
                    *entry = cell::promote(*entry, new_offset);
                }
                None => {
                    warn!(old_offset, "dropping dangling extended offset during compact");
                    *entry = CellEntry::DEFAULT;
                }
            }
        }
        self.flags.set(LineFlags::EXTENDED, !packed.is_empty());
        self.extended = packed;
    }
}
