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

//! The cell codec: the logical [`Cell`], its dense [`CellEntry`] encoding,
//! the [`ExtendedCell`] side-table form, and the `store`/`promote`
//! operations that move between them.

use smallvec::{smallvec, SmallVec};
use unicode_width::UnicodeWidthChar;

use crate::attrs::{Attr, Color, DEFAULT_COLOR};

/// Flags carried by a dense [`CellEntry`].
///
/// `PADDING` marks the right half of a wide glyph; `EXTENDED` means the
/// dense payload should be ignored and treated as an index into the line's
/// extended table instead; `FG_PALETTE256`/`BG_PALETTE256` distinguish a
/// basic ANSI color index from an xterm-256 palette index sharing the same
/// byte.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct CellFlags(u8);

impl CellFlags {
    pub const PADDING: CellFlags = CellFlags(1 << 0);
    pub const EXTENDED: CellFlags = CellFlags(1 << 1);
    pub const FG_PALETTE256: CellFlags = CellFlags(1 << 2);
    pub const BG_PALETTE256: CellFlags = CellFlags(1 << 3);

    pub const fn empty() -> Self {
        CellFlags(0)
    }

    pub fn contains(self, other: CellFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: CellFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: CellFlags) {
        self.0 &= !other.0;
    }

    pub fn set(&mut self, other: CellFlags, value: bool) {
        if value {
            self.insert(other);
        } else {
            self.remove(other);
        }
    }
}

impl std::ops::BitOr for CellFlags {
    type Output = CellFlags;
    fn bitor(self, rhs: CellFlags) -> CellFlags {
        CellFlags(self.0 | rhs.0)
    }
}

// Prove the dense entry stays in the single 8-byte-class record the spec
// calls for: flags + attr + fg + bg + a one-word payload, no padding
// inflating it further.
static_assertions::assert_eq_size!(CellEntry, u64);

/// The dense, inline representation of a cell: a fixed 8-byte-class record
/// used for the common case (single ASCII byte, width 1, 8-bit attrs,
/// basic/palette colors, no combining marks).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CellEntry {
    pub flags: CellFlags,
    attr: u8,
    fg: u8,
    bg: u8,
    /// Either a single ASCII byte (when `flags` lacks `EXTENDED`), or an
    /// index into the owning line's `extended` table (when it's set).
    payload: u32,
}

impl CellEntry {
    /// The default dense entry: a blank, default-styled ASCII space.
    pub const DEFAULT: CellEntry = CellEntry {
        flags: CellFlags::empty(),
        attr: 0,
        fg: DEFAULT_COLOR,
        bg: DEFAULT_COLOR,
        payload: b' ' as u32,
    };

    pub fn is_extended(&self) -> bool {
        self.flags.contains(CellFlags::EXTENDED)
    }

    pub fn is_padding(&self) -> bool {
        self.flags.contains(CellFlags::PADDING)
    }

    pub fn extended_offset(&self) -> usize {
        debug_assert!(self.is_extended());
        self.payload as usize
    }

    pub fn ascii_byte(&self) -> u8 {
        debug_assert!(!self.is_extended());
        self.payload as u8
    }

    fn with_extended_offset(mut self, offset: usize) -> Self {
        self.flags.insert(CellFlags::EXTENDED);
        self.payload = offset as u32;
        self
    }

    pub fn bg_color(&self) -> Color {
        Color::from_dense(self.bg, self.flags.contains(CellFlags::BG_PALETTE256))
    }

    pub fn fg_color(&self) -> Color {
        Color::from_dense(self.fg, self.flags.contains(CellFlags::FG_PALETTE256))
    }

    pub fn attr(&self) -> Attr {
        Attr::from_dense_byte(self.attr)
    }

    fn set_bg(&mut self, bg: Color) {
        debug_assert!(!bg.is_rgb(), "dense entries cannot hold RGB colors");
        self.bg = bg.dense_index();
        self.flags.set(CellFlags::BG_PALETTE256, bg.is_palette256());
    }

    fn set_fg(&mut self, fg: Color) {
        debug_assert!(!fg.is_rgb(), "dense entries cannot hold RGB colors");
        self.fg = fg.dense_index();
        self.flags.set(CellFlags::FG_PALETTE256, fg.is_palette256());
    }

    /// A blank entry carrying only a background color (used when expanding
    /// or clearing a line to a non-default background).
    pub fn blank_with_bg(bg: Color) -> Self {
        let mut e = CellEntry::DEFAULT;
        e.set_bg(bg);
        e
    }

    /// A padding cell (right half of a wide glyph) for the given bg.
    pub fn padding_with_bg(bg: Color) -> Self {
        let mut e = Self::blank_with_bg(bg);
        e.flags.insert(CellFlags::PADDING);
        e
    }
}

impl Default for CellEntry {
    fn default() -> Self {
        CellEntry::DEFAULT
    }
}

/// The full, non-dense representation of a cell. Lives in a line's
/// `extended` side table and is referenced from a dense entry via
/// `offset`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ExtendedCell {
    pub text: SmallVec<[u8; 4]>,
    pub width: u8,
    pub attr: Attr,
    pub flags: CellFlags,
    pub fg: Color,
    pub bg: Color,
}

impl Default for ExtendedCell {
    fn default() -> Self {
        ExtendedCell {
            text: smallvec![b' '],
            width: 1,
            attr: Attr::empty(),
            flags: CellFlags::empty(),
            fg: Color::Default,
            bg: Color::Default,
        }
    }
}

/// The logical, owned cell: what callers construct and what readers get
/// back, regardless of which on-disk form backs it.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Cell {
    pub text: SmallVec<[u8; 4]>,
    pub width: u8,
    pub attr: Attr,
    pub flags: CellFlags,
    pub fg: Color,
    pub bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            text: smallvec![b' '],
            width: 1,
            attr: Attr::empty(),
            flags: CellFlags::empty(),
            fg: Color::Default,
            bg: Color::Default,
        }
    }
}

impl Cell {
    /// Construct a single-character cell with default styling, sized via
    /// `unicode-width`. Panics on a zero-width or control character — those
    /// have to be merged into a preceding cell or dropped by the caller,
    /// the way a combining-mark-aware parser would.
    pub fn from_char(c: char) -> Self {
        let width = match UnicodeWidthChar::width(c) {
            None => panic!("control chars cannot become cells"),
            Some(0) => panic!("zero width chars cannot become standalone cells"),
            Some(w) => w as u8,
        };
        let mut buf = [0u8; 4];
        let s = c.encode_utf8(&mut buf);
        Cell { text: SmallVec::from_slice(s.as_bytes()), width, ..Cell::default() }
    }

    pub fn padding() -> Self {
        let mut c = Cell::default();
        c.flags.insert(CellFlags::PADDING);
        c.width = 0;
        c
    }

    fn needs_extended(&self) -> bool {
        self.attr.needs_extended()
            || self.text.len() != 1
            || self.width != 1
            || self.fg.is_rgb()
            || self.bg.is_rgb()
    }

    fn to_extended(&self) -> ExtendedCell {
        ExtendedCell {
            text: self.text.clone(),
            width: self.width,
            attr: self.attr,
            flags: self.flags,
            fg: self.fg,
            bg: self.bg,
        }
    }
}

impl From<&ExtendedCell> for Cell {
    fn from(e: &ExtendedCell) -> Self {
        Cell { text: e.text.clone(), width: e.width, attr: e.attr, flags: e.flags, fg: e.fg, bg: e.bg }
    }
}

impl From<CellEntry> for Cell {
    /// Reconstruct a logical cell from a *non-extended* dense entry.
    /// Callers must resolve extended entries via the line's side table
    /// instead; this impl only covers the common dense path.
    fn from(e: CellEntry) -> Self {
        debug_assert!(!e.is_extended());
        let mut c = Cell {
            text: smallvec![e.ascii_byte()],
            width: if e.is_padding() { 0 } else { 1 },
            attr: e.attr(),
            flags: e.flags,
            fg: e.fg_color(),
            bg: e.bg_color(),
        };
        c.flags.remove(CellFlags::EXTENDED);
        c
    }
}

/// The outcome of encoding a [`Cell`]: either a self-contained dense entry,
/// or a dense indirection plus the extended payload that the caller (the
/// line store) must append to its side table before patching the entry's
/// offset via [`promote`].
pub enum Encoded {
    Dense(CellEntry),
    Extended(CellEntry, ExtendedCell),
}

/// **store**: encode a logical cell as a dense entry when possible.
pub fn store(cell: &Cell) -> Encoded {
    if cell.needs_extended() {
        let mut entry = CellEntry::DEFAULT;
        entry.flags = cell.flags;
        return Encoded::Extended(entry, cell.to_extended());
    }

    let mut entry = CellEntry::DEFAULT;
    entry.flags = cell.flags;
    entry.attr = cell.attr.dense_byte();
    entry.set_fg(cell.fg);
    entry.set_bg(cell.bg);
    entry.payload = cell.text[0] as u32;
    Encoded::Dense(entry)
}

/// **promote**: given a dense entry, patch it into an indirection pointing
/// at `offset` in the owning line's extended table.
pub fn promote(entry: CellEntry, offset: usize) -> CellEntry {
    entry.with_extended_offset(offset)
}
