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

#[path = "support/mod.rs"]
mod support;

use gridpane::attrs::Color;
use gridpane::{Cell, Grid};

#[test]
fn move_lines_round_trip_restores_disjoint_regions() {
    let mut grid = Grid::new(10, 10, 100).unwrap();
    support::write_str(&mut grid, 0, 2, "row");

    grid.move_lines(6, 2, 1, Color::Default);
    assert_eq!(support::read_str(&mut grid, 0, 2, 3), "");
    assert_eq!(support::read_str(&mut grid, 0, 6, 3), "row");

    grid.move_lines(2, 6, 1, Color::Default);
    assert_eq!(support::read_str(&mut grid, 0, 2, 3), "row");
    assert_eq!(support::read_str(&mut grid, 0, 6, 3), "");
}

#[test]
fn move_cells_shifts_within_a_row_and_clears_the_source() {
    let mut grid = Grid::new(10, 1, 100).unwrap();
    support::write_str(&mut grid, 0, 0, "abc");

    grid.move_cells(5, 0, 0, 3, Color::Default);

    assert_eq!(support::read_str(&mut grid, 5, 0, 3), "abc");
    assert_eq!(grid.get_cell(0, 0), Cell::default());
}

#[test]
fn clear_with_default_bg_truncates_trailing_cells() {
    let mut grid = Grid::new(10, 5, 100).unwrap();
    grid.set_cell(5, 0, &Cell::from_char('x'));
    grid.clear(3, 0, 7, 1, Color::Default);
    assert_eq!(grid.peek_line(0).unwrap().cellsize(), 3);
}

#[test]
fn clear_is_idempotent() {
    let mut grid = Grid::new(10, 1, 100).unwrap();
    support::write_str(&mut grid, 0, 0, "abcdef");
    grid.clear(2, 0, 3, 1, Color::Default);
    let once = support::read_str(&mut grid, 0, 0, 10);
    grid.clear(2, 0, 3, 1, Color::Default);
    assert_eq!(support::read_str(&mut grid, 0, 0, 10), once);
}

#[test]
fn duplicate_lines_isolates_source_from_destination() {
    let mut src = Grid::new(10, 10, 100).unwrap();
    let mut dst = Grid::new(10, 10, 100).unwrap();
    support::write_str(&mut src, 0, 0, "d");

    dst.duplicate_lines(0, &src, 0, 1).unwrap();
    support::write_str(&mut src, 0, 0, "z");

    assert_eq!(support::read_str(&mut dst, 0, 0, 1), "d");
}
