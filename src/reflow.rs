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

//! Width-change reflow: rewrap blocks to a new column count, splitting
//! over-long lines and joining previously-wrapped fragments, while
//! repairing caller-supplied row anchors (cursor, scroll position) in
//! place.
//!
//! Rows are tracked through the rewrite as "distance from the very bottom
//! of the grid" rather than absolute position from the head, because
//! blocks are rewritten tail-to-head and only the already-processed
//! (tail-ward) blocks have a known final size at any point in the walk.

use tracing::warn;

use crate::cell::Cell;
use crate::grid::Grid;
use crate::line::{Line, LineFlags};

/// Rewrap every block to `new_sx`, updating each fixup target in place.
/// A no-op if `new_sx` already matches the grid's width.
pub fn reflow(grid: &mut Grid, new_sx: usize, fixups: &mut [&mut usize]) {
    if new_sx == grid.sx {
        return;
    }
    if grid.reflowing {
        warn!("reflow re-entered while already in progress, ignoring");
        return;
    }
    grid.reflowing = true;
    let _span = tracing::debug_span!("grid_reflow", old_sx = grid.sx, new_sx, sy = grid.sy).entered();

    let old_total = grid.hallocated;
    let mut rev_values: Vec<usize> = fixups.iter().map(|f| old_total.saturating_sub(**f)).collect();
    rev_values.push(old_total.saturating_sub(grid.hscrolled)); // rev_hscrolled, tracked alongside caller fixups

    let sy = grid.sy;
    let block_count = grid.blocks.block_count();
    let mut hsize_diff: isize = 0;
    let mut emitted_new_from_tail: usize = 0;
    let mut processed_old_from_tail: usize = 0;

    for idx in (0..block_count).rev() {
        let old_len = grid.blocks.block(idx).len();

        if emitted_new_from_tail > sy {
            // This block lies entirely in history beyond what we need to
            // have rewrapped right away; mark it and defer.
            let block = grid.blocks.block_mut(idx);
            block.need_reflow = true;
            block.sx = new_sx;
            processed_old_from_tail += old_len;
            emitted_new_from_tail += old_len;
            continue;
        }

        let mut local_idxs = Vec::new();
        let mut local_rows = Vec::new();
        for (i, &r) in rev_values.iter().enumerate() {
            if r > processed_old_from_tail && r <= processed_old_from_tail + old_len {
                let dist_from_block_tail = r - processed_old_from_tail;
                local_idxs.push(i);
                local_rows.push(old_len - dist_from_block_tail);
            }
        }

        let lines = std::mem::take(&mut grid.blocks.block_mut(idx).lines);
        let new_lines = reflow_block_lines(lines, new_sx, &mut local_rows);
        let new_len = new_lines.len();
        {
            let block = grid.blocks.block_mut(idx);
            block.lines = new_lines;
            block.sx = new_sx;
            block.need_reflow = false;
        }

        for (k, &i) in local_idxs.iter().enumerate() {
            rev_values[i] = emitted_new_from_tail + new_len - local_rows[k];
        }

        hsize_diff += new_len as isize - old_len as isize;
        processed_old_from_tail += old_len;
        emitted_new_from_tail += new_len;
    }

    apply_hsize_diff(grid, hsize_diff);
    grid.sx = new_sx;
    grid.hallocated = grid.hsize + grid.sy;

    let new_total = grid.hallocated;
    for (f, &r) in fixups.iter_mut().zip(rev_values.iter()) {
        **f = new_total.saturating_sub(r);
    }
    let rev_hscrolled = *rev_values.last().expect("rev_hscrolled was always pushed");
    grid.hscrolled = new_total.saturating_sub(rev_hscrolled).min(grid.hsize);

    grid.reflowing = false;
}

/// Walk every block still marked `need_reflow`, rewrapping it with an
/// empty fixup list, and fold the resulting size changes into `hsize`.
/// Guarded by `reflowing` against re-entry from within another
/// completion pass.
pub(crate) fn reflow_complete(grid: &mut Grid) {
    if grid.reflowing {
        return;
    }
    grid.reflowing = true;
    let _span = tracing::debug_span!("reflow_complete").entered();

    let new_sx = grid.sx;
    let mut hsize_diff: isize = 0;
    for idx in 0..grid.blocks.block_count() {
        if !grid.blocks.block(idx).need_reflow {
            continue;
        }
        let lines = std::mem::take(&mut grid.blocks.block_mut(idx).lines);
        let old_len = lines.len();
        let mut no_fixups: Vec<usize> = Vec::new();
        let new_lines = reflow_block_lines(lines, new_sx, &mut no_fixups);
        let new_len = new_lines.len();
        let block = grid.blocks.block_mut(idx);
        block.lines = new_lines;
        block.sx = new_sx;
        block.need_reflow = false;
        hsize_diff += new_len as isize - old_len as isize;
    }

    apply_hsize_diff(grid, hsize_diff);
    grid.hallocated = grid.hsize + grid.sy;
    grid.hscrolled = grid.hscrolled.min(grid.hsize);
    grid.reflowing = false;
}

fn apply_hsize_diff(grid: &mut Grid, hsize_diff: isize) {
    if hsize_diff < 0 && (-hsize_diff) as usize > grid.hsize {
        let shortfall = (-hsize_diff) as usize - grid.hsize;
        grid.hsize = 0;
        if grid.blocks.block_count() > 0 {
            let idx = grid.blocks.block_count() - 1;
            let block = grid.blocks.block_mut(idx);
            let target_len = block.lines.len() + shortfall;
            block.lines.resize_with(target_len, Line::new);
        }
    } else {
        grid.hsize = (grid.hsize as isize + hsize_diff).max(0) as usize;
    }
}

/// Rewrap one block's lines to `new_sx`. `fixups` are local, 0-based row
/// indices into `src`; they're updated in place to point at the
/// equivalent row in the returned `Vec<Line>`.
fn reflow_block_lines(mut src: Vec<Line>, new_sx: usize, fixups: &mut [usize]) -> Vec<Line> {
    let mut target: Vec<Line> = Vec::with_capacity(src.len());
    let n = src.len();
    let mut yy = 0usize;

    while yy < n {
        if src[yy].is_dead() {
            yy += 1;
            continue;
        }

        let used = src[yy].cellused();
        let first_width = if used > 0 { src[yy].get_cell(0).width as usize } else { 0 };

        if used == new_sx || first_width > new_sx {
            target.push(std::mem::replace(&mut src[yy], Line::new()));
            yy += 1;
        } else if used > new_sx {
            let produced = split_line(&src[yy], new_sx, &mut target);
            apply_split_fixup(fixups, yy, produced);
            let was_wrapped = src[yy].is_wrapped();
            src[yy] = Line::new();
            yy += 1;
            if was_wrapped {
                let removed = {
                    let target_row = target.last_mut().expect("split always produces at least one row");
                    join_into(target_row, &mut src, yy, new_sx)
                };
                apply_join_fixup(fixups, yy, removed);
                yy += removed;
            }
        } else if src[yy].is_wrapped() {
            target.push(std::mem::replace(&mut src[yy], Line::new()));
            yy += 1;
            let removed = {
                let target_row = target.last_mut().expect("just pushed a row");
                join_into(target_row, &mut src, yy, new_sx)
            };
            apply_join_fixup(fixups, yy, removed);
            yy += removed;
        } else {
            target.push(std::mem::replace(&mut src[yy], Line::new()));
            yy += 1;
        }
    }

    target
}

/// Split one over-long line into as many `new_sx`-wide rows as it takes,
/// appending them to `target`. A cell is never allowed to straddle a row
/// boundary: if placing it would overflow a non-empty row, that row is
/// closed out (marked wrapped) and a fresh one started. Returns the
/// number of rows produced.
fn split_line(line: &Line, new_sx: usize, target: &mut Vec<Line>) -> usize {
    let start = target.len();
    let used = line.cellused();
    if used == 0 {
        target.push(Line::new());
        return 1;
    }

    let mut row = Line::new();
    let mut row_col = 0usize;
    let mut row_width = 0usize;
    for col in 0..used {
        let cell = line.get_cell(col);
        let w = cell.width as usize;
        if row_width + w > new_sx && row_col > 0 {
            row.flags.insert(LineFlags::WRAPPED);
            target.push(row);
            row = Line::new();
            row_col = 0;
            row_width = 0;
        }
        row.set_cell(row_col, &cell, new_sx);
        row_width += w;
        row_col += 1;
    }
    target.push(row);
    target.len() - start
}

/// Fill the remaining room in `target_row` by consuming whole cells from
/// `src[from..]` in order. Stops at an empty, unwrapped row (end of
/// paragraph) or as soon as the next cell wouldn't fit. A row that's only
/// partially consumed has its leftover cells shifted to column 0 and is
/// left in place rather than removed. Returns the number of rows fully
/// consumed (and killed).
fn join_into(target_row: &mut Line, src: &mut [Line], from: usize, new_sx: usize) -> usize {
    let mut idx = from;
    let mut removed = 0usize;

    while idx < src.len() {
        if src[idx].is_dead() {
            idx += 1;
            continue;
        }

        let used = src[idx].cellused();
        if used == 0 && !src[idx].is_wrapped() {
            break;
        }

        let room = new_sx.saturating_sub(target_row.cellused());
        if room == 0 {
            break;
        }

        let mut consumed = 0usize;
        let mut width_used = 0usize;
        for col in 0..used {
            let w = src[idx].get_cell(col).width as usize;
            if width_used + w > room {
                break;
            }
            width_used += w;
            consumed += 1;
        }

        let base = target_row.cellused();
        for col in 0..consumed {
            let cell = src[idx].get_cell(col);
            target_row.set_cell(base + col, &cell, new_sx);
        }

        if consumed == used {
            let was_wrapped = src[idx].is_wrapped();
            if !was_wrapped {
                target_row.flags.remove(LineFlags::WRAPPED);
            }
            src[idx].kill();
            removed += 1;
            idx += 1;
            if !was_wrapped {
                break;
            }
        } else {
            let remaining: Vec<Cell> = (consumed..used).map(|c| src[idx].get_cell(c)).collect();
            let mut shifted = Line::new();
            shifted.flags.set(LineFlags::WRAPPED, src[idx].is_wrapped());
            for (i, cell) in remaining.iter().enumerate() {
                shifted.set_cell(i, cell, new_sx);
            }
            src[idx] = shifted;
            break;
        }
    }

    removed
}

fn apply_split_fixup(fixups: &mut [usize], yy: usize, produced: usize) {
    if produced == 0 {
        return;
    }
    for f in fixups.iter_mut() {
        if yy <= *f {
            *f += produced - 1;
        }
    }
}

fn apply_join_fixup(fixups: &mut [usize], to: usize, k: usize) {
    if k == 0 {
        return;
    }
    for f in fixups.iter_mut() {
        if *f > to + k {
            *f -= k;
        } else if *f > to {
            *f = to;
        }
    }
}
