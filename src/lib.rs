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

//! An in-memory grid storage engine for a terminal multiplexer.
//!
//! This crate owns cells, scrollback blocks, and width-change reflow. It
//! does not parse terminal escape sequences and does not drive a pty or a
//! renderer; [`grid::Grid`] is a plain row/cell store that a parser writes
//! into and a renderer reads out of via [`ansi::string_cells`].
//!
//! Row addressing is a single flat space `[0, hsize + sy)`: history rows
//! come first, then the visible region. [`grid::Grid::reflow`] rewraps the
//! whole history when the visible width changes, keeping any number of
//! caller-owned row fixups (cursor position, selection anchors, ...)
//! consistent across the rewrap.

pub mod ansi;
pub mod attrs;
pub mod block;
pub mod cell;
pub mod error;
pub mod grid;
pub mod line;
mod reflow;

pub use attrs::{Attr, Color, SgrAttrBit};
pub use cell::{Cell, CellEntry, CellFlags, ExtendedCell};
pub use error::GridError;
pub use grid::Grid;
pub use line::{Line, LineFlags};
