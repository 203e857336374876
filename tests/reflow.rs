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

use gridpane::Grid;

// S3 -- reflow narrow -> wide joins a wrapped paragraph back together.
#[test]
fn reflow_narrow_to_wide_joins_a_wrapped_paragraph() {
    let mut grid = Grid::new(4, 2, 100).unwrap();
    support::write_str(&mut grid, 0, 0, "ab");
    grid.set_wrapped(0, true);
    support::write_str(&mut grid, 0, 1, "cd");

    grid.reflow(8, &mut []);

    assert_eq!(support::read_str(&mut grid, 0, 0, 8), "abcd");
    assert!(!grid.peek_line(0).unwrap().is_wrapped());
}

// S4 -- reflow wide -> narrow splits a long line and fixes up a cursor row.
#[test]
fn reflow_wide_to_narrow_splits_and_shifts_a_cursor_fixup() {
    let mut grid = Grid::new(6, 2, 100).unwrap();
    support::write_str(&mut grid, 0, 0, "abcdef");
    let mut cursor_row: usize = 0;

    grid.reflow(3, &mut [&mut cursor_row]);

    assert_eq!(support::read_str(&mut grid, 0, 0, 3), "abc");
    assert!(grid.peek_line(0).unwrap().is_wrapped());
    assert_eq!(support::read_str(&mut grid, 0, 1, 3), "def");
    assert!(!grid.peek_line(1).unwrap().is_wrapped());
    assert_eq!(cursor_row, 1);
}

// Round-trip law: reflowing to the current width is a no-op.
#[test]
fn reflow_to_the_same_width_leaves_content_and_fixups_untouched() {
    let mut grid = Grid::new(5, 2, 100).unwrap();
    support::write_str(&mut grid, 0, 0, "hello");
    let mut fixup: usize = 1;

    grid.reflow(5, &mut [&mut fixup]);

    assert_eq!(support::read_str(&mut grid, 0, 0, 5), "hello");
    assert_eq!(fixup, 1);
}

// A row that ends exactly at new_sx stays wrapped only while there's more
// content coming; the final row of a split never gets marked wrapped just
// for landing on the boundary with nothing left to place.
#[test]
fn split_exact_width_boundary_stays_wrapped() {
    let mut grid = Grid::new(9, 1, 100).unwrap();
    support::write_str(&mut grid, 0, 0, "abcdefghi");

    grid.reflow(3, &mut []);

    assert!(grid.peek_line(0).unwrap().is_wrapped());
    assert!(grid.peek_line(1).unwrap().is_wrapped());
    assert!(!grid.peek_line(2).unwrap().is_wrapped());
}

#[test]
fn reflow_narrow_then_wide_recovers_the_original_paragraph_text() {
    let mut grid = Grid::new(10, 1, 100).unwrap();
    support::write_str(&mut grid, 0, 0, "abcdefghij");

    grid.reflow(4, &mut []);
    grid.reflow(10, &mut []);

    assert_eq!(support::read_str(&mut grid, 0, 0, 10), "abcdefghij");
}
