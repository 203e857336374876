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

//! The grid's closed error taxonomy. Everything past construction is
//! best-effort: out-of-range requests are logged via `tracing` and
//! otherwise ignored rather than surfaced here.

use std::fmt;

/// Failures that can occur while constructing a [`crate::grid::Grid`].
/// This is the only place the crate hands the embedder a typed error;
/// every other operation is infallible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    /// `sx == 0`: a grid with no columns can't hold a cell.
    ZeroWidth,
    /// `sy == 0`: a grid with no visible rows can't hold a cursor.
    ZeroHeight,
    /// `hlimit < sy`: the history limit must be able to hold at least the
    /// visible region before collection makes sense.
    HistoryLimitTooSmall { hlimit: usize, sy: usize },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::ZeroWidth => write!(f, "grid width (sx) must be nonzero"),
            GridError::ZeroHeight => write!(f, "grid height (sy) must be nonzero"),
            GridError::HistoryLimitTooSmall { hlimit, sy } => {
                write!(f, "history limit {hlimit} is smaller than visible height {sy}")
            }
        }
    }
}

impl std::error::Error for GridError {}
