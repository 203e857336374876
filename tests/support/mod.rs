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

//! Shared fixture builders for the integration tests.

use gridpane::{Cell, Grid};

/// Write `text`'s ASCII bytes starting at `(x, y)`, one cell per byte.
pub fn write_str(grid: &mut Grid, x: usize, y: usize, text: &str) {
    for (i, b) in text.bytes().enumerate() {
        grid.set_cell(x + i, y, &Cell::from_char(b as char));
    }
}

/// Render `nx` cells of row `y` back to a plain ASCII string, ignoring SGR
/// and trailing default padding.
pub fn read_str(grid: &mut Grid, x: usize, y: usize, nx: usize) -> String {
    let mut last = Cell::default();
    let bytes = gridpane::ansi::string_cells(grid, x, y, nx, &mut last, false, false, true);
    String::from_utf8(bytes).expect("ascii fixture text")
}
