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

//! The grid facade: the public row/cell/region/history operations that sit
//! on top of the block allocator and line store.

use tracing::warn;

use crate::attrs::Color;
use crate::block::{BlockStore, LocateCache};
use crate::cell::Cell;
use crate::error::GridError;
use crate::line::Line;

/// The grid: a width, a visible height, and a history of line blocks.
///
/// Row addressing is a single flat space `[0, hsize + sy)`: rows
/// `[0, hsize)` are scrollback, rows `[hsize, hsize + sy)` are visible.
#[derive(Debug)]
pub struct Grid {
    pub(crate) sx: usize,
    pub(crate) sy: usize,
    pub(crate) blocks: BlockStore,
    pub(crate) hallocated: usize,
    pub(crate) hsize: usize,
    pub(crate) hlimit: usize,
    pub(crate) hscrolled: usize,
    pub(crate) reflowing: bool,
}

impl Grid {
    /// Construct a grid with `sy` blank visible rows and no history. Fails
    /// only on dimensions that would immediately violate the grid's own
    /// invariants.
    pub fn new(sx: usize, sy: usize, hlimit: usize) -> Result<Grid, GridError> {
        if sx == 0 {
            return Err(GridError::ZeroWidth);
        }
        if sy == 0 {
            return Err(GridError::ZeroHeight);
        }
        if hlimit < sy {
            return Err(GridError::HistoryLimitTooSmall { hlimit, sy });
        }

        let mut blocks = BlockStore::new();
        blocks.realloc(sy, sx);
        Ok(Grid { sx, sy, blocks, hallocated: sy, hsize: 0, hlimit, hscrolled: 0, reflowing: false })
    }

    /// Equivalent to `drop(self)`; kept for lifecycle symmetry with `new`.
    pub fn destroy(self) {}

    pub fn sx(&self) -> usize {
        self.sx
    }

    pub fn sy(&self) -> usize {
        self.sy
    }

    pub fn hsize(&self) -> usize {
        self.hsize
    }

    pub fn hlimit(&self) -> usize {
        self.hlimit
    }

    pub fn hscrolled(&self) -> usize {
        self.hscrolled
    }

    pub fn hallocated(&self) -> usize {
        self.hallocated
    }

    fn in_range(&self, y: usize) -> bool {
        y < self.hsize + self.sy
    }

    /// Locate the block owning row `y`, first draining any pending lazy
    /// reflow if that block still needs it.
    fn locate_resolved(&mut self, y: usize) -> (usize, usize) {
        let (block_idx, _) = self.blocks.locate(y);
        if self.blocks.block(block_idx).need_reflow && !self.reflowing {
            crate::reflow::reflow_complete(self);
        }
        self.blocks.locate(y)
    }

    pub fn get_cell(&mut self, x: usize, y: usize) -> Cell {
        if !self.in_range(y) {
            warn!(x, y, "get_cell out of range");
            return Cell::default();
        }
        let (block_idx, local) = self.locate_resolved(y);
        match self.blocks.block(block_idx).lines.get(local) {
            Some(line) => line.get_cell(x),
            None => Cell::default(),
        }
    }

    pub fn set_cell(&mut self, x: usize, y: usize, value: &Cell) {
        if x >= self.sx {
            warn!(x, y, "set_cell column out of range");
            return;
        }
        if !self.in_range(y) {
            warn!(x, y, "set_cell row out of range");
            return;
        }
        let sx = self.sx;
        let (block_idx, local) = self.locate_resolved(y);
        if let Some(line) = self.blocks.block_mut(block_idx).lines.get_mut(local) {
            line.set_cell(x, value, sx);
        }
    }

    /// Vectorized write of ASCII bytes sharing a style template.
    pub fn set_cells(&mut self, x: usize, y: usize, template: &Cell, bytes: &[u8]) {
        for (i, &byte) in bytes.iter().enumerate() {
            let cell = Cell { text: smallvec::smallvec![byte], width: 1, ..template.clone() };
            self.set_cell(x + i, y, &cell);
        }
    }

    /// Clear the rectangle `[x, x+nx) x [y, y+ny)`. Delegates to the
    /// cheaper [`Grid::clear_lines`] when the rectangle spans the full
    /// width.
    pub fn clear(&mut self, x: usize, y: usize, nx: usize, ny: usize, bg: Color) {
        if x == 0 && nx >= self.sx {
            self.clear_lines(y, ny, bg);
            return;
        }
        let sx = self.sx;
        let reaches_end = x + nx >= sx;
        let end = (y + ny).min(self.hsize + self.sy);
        for row in y..end {
            if reaches_end && bg == Color::Default {
                let (block_idx, local) = self.locate_resolved(row);
                if let Some(line) = self.blocks.block_mut(block_idx).lines.get_mut(local) {
                    line.truncate(x);
                }
            } else {
                for col in x..x + nx {
                    let blank = Cell { bg, ..Cell::default() };
                    self.set_cell(col, row, &blank);
                }
            }
        }
    }

    /// Blank whole rows `[y, y+ny)`, freeing their buffers and, if `bg`
    /// isn't the terminal default, re-expanding to full width with it.
    pub fn clear_lines(&mut self, y: usize, ny: usize, bg: Color) {
        let sx = self.sx;
        let end = (y + ny).min(self.hsize + self.sy);
        for row in y..end {
            let (block_idx, local) = self.locate_resolved(row);
            if let Some(line) = self.blocks.block_mut(block_idx).lines.get_mut(local) {
                *line = Line::new();
                if bg != Color::Default {
                    line.expand(sx, sx, bg);
                }
            }
        }
    }

    /// Move `ny` line records from `[src, src+ny)` to `[dst, dst+ny)`.
    /// Traversal direction depends on whether the move is upward or
    /// downward, so that overlapping ranges never alias a row that hasn't
    /// been read yet. Source rows outside the destination range are
    /// re-emptied afterward.
    pub fn move_lines(&mut self, dst: usize, src: usize, ny: usize, bg: Color) {
        if dst == src || ny == 0 {
            return;
        }
        let mut src_cache = LocateCache::new();
        let mut dst_cache = LocateCache::new();

        let order: Box<dyn Iterator<Item = usize>> =
            if dst > src { Box::new((0..ny).rev()) } else { Box::new(0..ny) };

        for i in order {
            let (src_block, src_local) = src_cache.locate(&self.blocks, src + i);
            let moved = std::mem::replace(&mut self.blocks.block_mut(src_block).lines[src_local], Line::new());
            let (dst_block, dst_local) = dst_cache.locate(&self.blocks, dst + i);
            self.blocks.block_mut(dst_block).lines[dst_local] = moved;
        }

        let sx = self.sx;
        let mut vacated_cache = LocateCache::new();
        for i in 0..ny {
            let row = src + i;
            if row >= dst && row < dst + ny {
                continue;
            }
            let (block_idx, local) = vacated_cache.locate(&self.blocks, row);
            if let Some(line) = self.blocks.block_mut(block_idx).lines.get_mut(local) {
                *line = Line::new();
                if bg != Color::Default {
                    line.expand(sx, sx, bg);
                }
            }
        }
    }

    /// Move `nx` cells within row `y` from column `src_x` to `dst_x`,
    /// clearing the vacated source columns to `bg`.
    pub fn move_cells(&mut self, dst_x: usize, src_x: usize, y: usize, nx: usize, bg: Color) {
        if dst_x == src_x || nx == 0 {
            return;
        }
        let moved: Vec<Cell> = (0..nx).map(|i| self.get_cell(src_x + i, y)).collect();
        for (i, cell) in moved.into_iter().enumerate() {
            self.set_cell(dst_x + i, y, &cell);
        }
        for i in 0..nx {
            let col = src_x + i;
            if col >= dst_x && col < dst_x + nx {
                continue;
            }
            let (block_idx, local) = self.locate_resolved(y);
            if let Some(line) = self.blocks.block_mut(block_idx).lines.get_mut(local) {
                line.clear_cell(col, bg);
            }
        }
    }

    /// Push the bottom of the visible region into history.
    pub fn scroll_history(&mut self, bg: Color) {
        let sx = self.sx;
        self.hallocated += 1;
        self.blocks.realloc(self.hallocated, sx);

        let last = self.hallocated - 1;
        let (block_idx, local) = self.blocks.locate(last);
        if let Some(line) = self.blocks.block_mut(block_idx).lines.get_mut(local) {
            *line = Line::new();
            if bg != Color::Default {
                line.expand(sx, sx, bg);
            }
        }

        let newly_historical = self.hsize;
        let (block_idx, local) = self.blocks.locate(newly_historical);
        if let Some(line) = self.blocks.block_mut(block_idx).lines.get_mut(local) {
            line.compact();
        }

        self.hsize += 1;
        self.hscrolled += 1;
        self.collect_history();
    }

    /// Scroll a bounded region `[upper, lower]` of the visible area up by
    /// one line, archiving the displaced top row into history.
    pub fn scroll_history_region(&mut self, upper: usize, lower: usize, bg: Color) {
        debug_assert!(upper <= lower && lower < self.sy);
        let sx = self.sx;

        self.hallocated += 1;
        self.blocks.realloc(self.hallocated, sx);

        self.move_lines(self.hsize + 1, self.hsize, self.sy, bg);

        // The push-down above vacates `hsize` without carrying anything into
        // it; the region's departing top row landed one slot further down,
        // at `hsize + 1 + upper`. Pull it back into the history slot before
        // it gets overwritten by the up-shift below.
        let historical = self.hsize;
        self.move_lines(historical, historical + 1 + upper, 1, bg);
        let (block_idx, local) = self.blocks.locate(historical);
        if let Some(line) = self.blocks.block_mut(block_idx).lines.get_mut(local) {
            line.compact();
        }
        self.hsize += 1;
        self.hscrolled += 1;

        let base = self.hsize;
        if lower > upper {
            self.move_lines(base + upper, base + upper + 1, lower - upper, bg);
        }
        self.clear_lines(base + lower, 1, bg);

        self.collect_history();
    }

    /// Trim history down to `hlimit` when it's grown past it: removes 10%
    /// of `hlimit` (at least one row) from the head.
    pub fn collect_history(&mut self) {
        if self.hsize < self.hlimit {
            return;
        }
        let trim = (self.hlimit / 10).max(1).min(self.hsize);
        self.blocks.trim_head(trim);
        self.hsize -= trim;
        self.hallocated -= trim;
        self.hscrolled = self.hscrolled.min(self.hsize);
    }

    /// Drop all scrollback, keeping only the visible region.
    pub fn clear_history(&mut self) {
        self.blocks.trim_head(self.hsize);
        self.hallocated -= self.hsize;
        self.hsize = 0;
        self.hscrolled = 0;
    }

    /// Deep-copy `ny` lines from `src[sy..sy+ny)` into `self[dy..dy+ny)`,
    /// leaving `src` untouched so the two grids stay independent.
    pub fn duplicate_lines(&mut self, dy: usize, src: &Grid, sy: usize, ny: usize) -> anyhow::Result<()> {
        if dy + ny > self.hsize + self.sy {
            anyhow::bail!("duplicate_lines: destination range [{dy}, {}) out of bounds", dy + ny);
        }
        if sy + ny > src.hsize + src.sy {
            anyhow::bail!("duplicate_lines: source range [{sy}, {}) out of bounds", sy + ny);
        }
        for i in 0..ny {
            let (src_block, src_local) = src.blocks.locate(sy + i);
            let line = src.blocks.block(src_block).lines[src_local].clone();
            let (dst_block, dst_local) = self.blocks.locate(dy + i);
            self.blocks.block_mut(dst_block).lines[dst_local] = line;
        }
        Ok(())
    }

    /// Mark row `y` as wrapped (or not): the writer hit the right edge mid
    /// logical line and continued onto the next row. Reflow uses this flag
    /// to decide which rows belong to the same paragraph; the grid itself
    /// never sets or clears it on its own.
    pub fn set_wrapped(&mut self, y: usize, wrapped: bool) {
        if !self.in_range(y) {
            warn!(y, "set_wrapped row out of range");
            return;
        }
        let (block_idx, local) = self.locate_resolved(y);
        if let Some(line) = self.blocks.block_mut(block_idx).lines.get_mut(local) {
            line.flags.set(crate::line::LineFlags::WRAPPED, wrapped);
        }
    }

    /// Read-only introspection of one row, for tests and diffing.
    pub fn peek_line(&mut self, y: usize) -> Option<&Line> {
        if !self.in_range(y) {
            return None;
        }
        let (block_idx, local) = self.locate_resolved(y);
        self.blocks.block(block_idx).lines.get(local)
    }

    /// Compare two grids cell-by-cell over their shared geometry.
    pub fn compare(a: &mut Grid, b: &mut Grid) -> bool {
        if a.sx != b.sx || a.hsize + a.sy != b.hsize + b.sy {
            return false;
        }
        let total = a.hsize + a.sy;
        for y in 0..total {
            for x in 0..a.sx {
                if a.get_cell(x, y) != b.get_cell(x, y) {
                    return false;
                }
            }
        }
        true
    }

    /// Rewrap every block to `new_sx`, updating each `fixups` target (e.g.
    /// a cursor row) in place. See [`crate::reflow`] for the algorithm.
    pub fn reflow(&mut self, new_sx: usize, fixups: &mut [&mut usize]) {
        crate::reflow::reflow(self, new_sx, fixups);
    }

    #[cfg(debug_assertions)]
    pub fn assert_invariants(&self) {
        if !self.reflowing {
            debug_assert_eq!(self.hallocated, self.hsize + self.sy);
        }
        debug_assert!(self.hscrolled <= self.hsize);
        self.blocks.assert_consistent(self.hallocated);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_degenerate_dimensions() {
        assert_eq!(Grid::new(0, 24, 100).unwrap_err(), GridError::ZeroWidth);
        assert_eq!(Grid::new(80, 0, 100).unwrap_err(), GridError::ZeroHeight);
        assert_eq!(
            Grid::new(80, 24, 10).unwrap_err(),
            GridError::HistoryLimitTooSmall { hlimit: 10, sy: 24 }
        );
    }

    #[test]
    fn set_get_round_trips() {
        let mut grid = Grid::new(80, 24, 1000).unwrap();
        let c = Cell::from_char('Q');
        grid.set_cell(5, 3, &c);
        assert_eq!(grid.get_cell(5, 3), c);
        grid.assert_invariants();
    }

    #[test]
    fn out_of_range_reads_return_default() {
        let mut grid = Grid::new(80, 24, 1000).unwrap();
        assert_eq!(grid.get_cell(1000, 0), Cell::default());
        assert_eq!(grid.get_cell(0, 1000), Cell::default());
    }

    #[test]
    fn scroll_history_grows_hsize_and_preserves_invariants() {
        let mut grid = Grid::new(80, 24, 1000).unwrap();
        let c = Cell::from_char('a');
        grid.set_cell(0, 0, &c);
        grid.scroll_history(Color::Default);
        assert_eq!(grid.hsize(), 1);
        assert_eq!(grid.hallocated(), 25);
        // the row that scrolled off is now history row 0
        assert_eq!(grid.get_cell(0, 0), c);
        grid.assert_invariants();
    }

    #[test]
    fn collect_history_trims_at_least_one_row() {
        let mut grid = Grid::new(80, 24, 24).unwrap();
        for _ in 0..30 {
            grid.scroll_history(Color::Default);
        }
        assert!(grid.hsize() < grid.hlimit());
        grid.assert_invariants();
    }

    #[test]
    fn move_lines_round_trip_restores_disjoint_regions() {
        let mut grid = Grid::new(10, 10, 100).unwrap();
        let c = Cell::from_char('m');
        grid.set_cell(0, 2, &c);
        grid.move_lines(6, 2, 2, Color::Default);
        grid.move_lines(2, 6, 2, Color::Default);
        assert_eq!(grid.get_cell(0, 2), c);
        assert_eq!(grid.get_cell(0, 6), Cell::default());
    }

    #[test]
    fn duplicate_isolates_source_from_destination() {
        let mut src = Grid::new(10, 10, 100).unwrap();
        let mut dst = Grid::new(10, 10, 100).unwrap();
        let c = Cell::from_char('d');
        src.set_cell(0, 0, &c);
        dst.duplicate_lines(0, &src, 0, 1).unwrap();
        src.set_cell(0, 0, &Cell::from_char('z'));
        assert_eq!(dst.get_cell(0, 0), c);
    }

    #[test]
    fn clear_with_default_bg_truncates_trailing_cells() {
        let mut grid = Grid::new(10, 5, 100).unwrap();
        grid.set_cell(5, 0, &Cell::from_char('x'));
        grid.clear(3, 0, 7, 1, Color::Default);
        assert_eq!(grid.peek_line(0).unwrap().cellsize(), 3);
    }
}
