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

//! `string_cells`: minimal-diff SGR/C0 serialization of a run of cells,
//! for dumping or diffing grid contents without driving a real terminal.

use itoa::Buffer;
use smallvec::{smallvec, SmallVec};

use crate::attrs::{Attr, Color, DENSE_MASK};
use crate::cell::{Cell, CellFlags};
use crate::grid::Grid;

const ESC: u8 = 0x1B;
const SHIFT_OUT: u8 = 0x0E;
const SHIFT_IN: u8 = 0x0F;

/// Render `nx` cells starting at `(px, py)` to a byte string, emitting the
/// minimal SGR transitions needed as rendering state moves away from
/// `last_cell`, which is updated to the final cell's style. Padding cells
/// (the right half of a wide glyph) are skipped.
///
/// `with_codes` controls whether SGR/charset-shift sequences are emitted at
/// all; `escape_c0` backslash-escapes control bytes and doubles literal
/// backslashes instead of writing them raw; `trim` drops trailing spaces
/// from the result.
pub fn string_cells(
    grid: &mut Grid,
    px: usize,
    py: usize,
    nx: usize,
    last_cell: &mut Cell,
    with_codes: bool,
    escape_c0: bool,
    trim: bool,
) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut charset_active = last_cell.attr.charset();

    for i in 0..nx {
        let cell = grid.get_cell(px + i, py);
        if cell.flags.contains(CellFlags::PADDING) {
            continue;
        }
        if with_codes {
            emit_sgr_transition(&mut buf, last_cell, &cell, escape_c0);
            emit_charset_shift(&mut buf, &mut charset_active, cell.attr.charset(), escape_c0);
        }
        emit_text(&mut buf, &cell, escape_c0);
        *last_cell = cell;
    }

    if trim {
        while buf.last() == Some(&b' ') {
            buf.pop();
        }
    }
    buf
}

/// Emit the SGR sequence transitioning from `last`'s style to `cell`'s, or
/// nothing if nothing changed. Clearing any attribute bit forces a full
/// `ESC[0m` reset (SGR has no "unset just this one" code for most
/// attributes), after which every bit `cell` still carries is re-emitted as
/// newly set, and fg/bg are re-emitted unconditionally since the reset also
/// wiped them back to default.
fn emit_sgr_transition(buf: &mut Vec<u8>, last: &Cell, cell: &Cell, escape_c0: bool) {
    let prev_bits = last.attr.bits() & DENSE_MASK;
    let cur_bits = cell.attr.bits() & DENSE_MASK;
    let reset = prev_bits & !cur_bits != 0;

    let mut params: SmallVec<[u16; 8]> = SmallVec::new();
    if reset {
        params.push(0);
    }
    let baseline = if reset { 0 } else { prev_bits };
    let newly_set = Attr::from_bits(cur_bits & !baseline);
    for bit in newly_set.set_bits_in_sgr_order() {
        params.push(bit.sgr_code());
    }

    if reset || cell.fg != last.fg {
        params.extend(color_params(cell.fg, cell.attr.bright(), true));
    }
    if reset || cell.bg != last.bg {
        params.extend(color_params(cell.bg, cell.attr.bright(), false));
    }

    if params.is_empty() {
        return;
    }
    emit_c0(buf, ESC, escape_c0);
    buf.push(b'[');
    let mut itoa_buf = Buffer::new();
    for (i, p) in params.iter().enumerate() {
        if i != 0 {
            buf.push(b';');
        }
        buf.extend_from_slice(itoa_buf.format(*p).as_bytes());
    }
    buf.push(b'm');
}

/// SGR parameter(s) for one color, as either foreground or background.
/// `bright` is carried on the cell's `Attr`, not the `Color` itself, so it's
/// threaded through separately.
fn color_params(color: Color, bright: bool, foreground: bool) -> SmallVec<[u16; 5]> {
    match (color, foreground) {
        (Color::Default, true) => smallvec![39],
        (Color::Default, false) => smallvec![49],
        (Color::Basic(n), true) => smallvec![if bright { 90 + n as u16 } else { 30 + n as u16 }],
        (Color::Basic(n), false) => smallvec![if bright { 100 + n as u16 } else { 40 + n as u16 }],
        (Color::Palette(n), true) => smallvec![38, 5, n as u16],
        (Color::Palette(n), false) => smallvec![48, 5, n as u16],
        (Color::Rgb(r, g, b), true) => smallvec![38, 2, r as u16, g as u16, b as u16],
        (Color::Rgb(r, g, b), false) => smallvec![48, 2, r as u16, g as u16, b as u16],
    }
}

/// Charset shift (SO/SI) is tracked independently of the SGR reset above —
/// it's preserved across a zero-reset rather than cleared by one.
fn emit_charset_shift(buf: &mut Vec<u8>, active: &mut bool, want: bool, escape_c0: bool) {
    if want && !*active {
        emit_c0(buf, SHIFT_OUT, escape_c0);
        *active = true;
    } else if !want && *active {
        emit_c0(buf, SHIFT_IN, escape_c0);
        *active = false;
    }
}

fn emit_text(buf: &mut Vec<u8>, cell: &Cell, escape_c0: bool) {
    for &b in cell.text.iter() {
        if escape_c0 && b == b'\\' {
            buf.push(b'\\');
            buf.push(b'\\');
        } else if escape_c0 && b < 0x20 {
            emit_c0(buf, b, true);
        } else {
            buf.push(b);
        }
    }
}

fn emit_c0(buf: &mut Vec<u8>, byte: u8, escape_c0: bool) {
    if escape_c0 {
        buf.push(b'\\');
        buf.push(b'0' + (byte >> 6));
        buf.push(b'0' + ((byte >> 3) & 0x7));
        buf.push(b'0' + (byte & 0x7));
    } else {
        buf.push(byte);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(grid: &mut Grid, x: usize, y: usize, c: char, f: impl FnOnce(&mut Cell)) {
        let mut cell = Cell::from_char(c);
        f(&mut cell);
        grid.set_cell(x, y, &cell);
    }

    #[test]
    fn plain_text_without_codes_emits_only_bytes() {
        let mut grid = Grid::new(10, 1, 10).unwrap();
        set(&mut grid, 0, 0, 'h', |_| {});
        set(&mut grid, 1, 0, 'i', |_| {});
        let mut last = Cell::default();
        let out = string_cells(&mut grid, 0, 0, 2, &mut last, false, false, false);
        assert_eq!(out, b"hi");
    }

    #[test]
    fn fg_color_change_emits_sgr() {
        let mut grid = Grid::new(10, 1, 10).unwrap();
        set(&mut grid, 0, 0, 'x', |c| c.fg = Color::Basic(2));
        let mut last = Cell::default();
        let out = string_cells(&mut grid, 0, 0, 1, &mut last, true, false, false);
        assert_eq!(out, b"\x1b[32mx");
    }

    #[test]
    fn clearing_an_attribute_forces_a_reset_and_recolors() {
        let mut grid = Grid::new(10, 1, 10).unwrap();
        set(&mut grid, 0, 0, 'a', |c| c.attr.set_bright(true));
        set(&mut grid, 1, 0, 'b', |_| {});
        let mut last = Cell::default();
        let out = string_cells(&mut grid, 0, 0, 2, &mut last, true, false, false);
        assert_eq!(out, b"\x1b[1ma\x1b[0;39;49mb");
    }

    #[test]
    fn padding_cells_are_skipped() {
        let mut grid = Grid::new(10, 1, 10).unwrap();
        set(&mut grid, 0, 0, '字', |_| {});
        let mut last = Cell::default();
        let out = string_cells(&mut grid, 0, 0, 2, &mut last, false, false, false);
        assert_eq!(out, "字".as_bytes());
    }

    #[test]
    fn trim_drops_trailing_spaces() {
        let mut grid = Grid::new(5, 1, 10).unwrap();
        set(&mut grid, 0, 0, 'x', |_| {});
        let mut last = Cell::default();
        let out = string_cells(&mut grid, 0, 0, 5, &mut last, false, false, true);
        assert_eq!(out, b"x");
    }

    #[test]
    fn escape_c0_doubles_backslash_and_escapes_control_bytes() {
        let mut grid = Grid::new(4, 1, 10).unwrap();
        set(&mut grid, 0, 0, 'x', |c| c.fg = Color::Basic(1));
        let mut last = Cell::default();
        let out = string_cells(&mut grid, 0, 0, 1, &mut last, true, true, false);
        assert_eq!(out, b"\\033[31mx");
    }

    #[test]
    fn charset_shift_wraps_the_run() {
        let mut grid = Grid::new(4, 1, 10).unwrap();
        set(&mut grid, 0, 0, 'a', |c| c.attr.set_charset(true));
        set(&mut grid, 1, 0, 'b', |c| c.attr.set_charset(true));
        set(&mut grid, 2, 0, 'c', |_| {});
        let mut last = Cell::default();
        let out = string_cells(&mut grid, 0, 0, 3, &mut last, true, false, false);
        assert_eq!(out, b"\x0eab\x0fc");
    }
}
