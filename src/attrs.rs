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

//! Styling types shared by both the dense and extended cell forms: the
//! attribute bitset and the color representation.

/// The sentinel color index meaning "use the terminal's default color".
///
/// Chosen as `8` rather than `0` because the basic ANSI palette only ever
/// needs indices `0..=7`; `8` is free and reserved for this purpose.
pub const DEFAULT_COLOR: u8 = 8;

const BIT_BRIGHT: u16 = 1 << 0;
const BIT_DIM: u16 = 1 << 1;
const BIT_ITALICS: u16 = 1 << 2;
const BIT_UNDERSCORE: u16 = 1 << 3;
const BIT_BLINK: u16 = 1 << 4;
const BIT_REVERSE: u16 = 1 << 5;
const BIT_HIDDEN: u16 = 1 << 6;
const BIT_STRIKETHROUGH: u16 = 1 << 7;
/// Charset-shift (SO/SI) is the one attribute bit that doesn't fit the dense
/// entry's 8-bit attr byte, so setting it always forces promotion to an
/// extended cell.
const BIT_CHARSET: u16 = 1 << 8;

/// The low 8 bits are exactly what fits in a dense [`crate::cell::CellEntry`].
pub const DENSE_MASK: u16 = 0x00FF;

/// A bitset of character attributes: bright, dim, italics, underscore,
/// blink, reverse, hidden, strikethrough, and charset-shift.
///
/// Mirrors the manual bitset idiom (named bit constants plus paired
/// `is_x`/`set_x` accessors) rather than reaching for a bitflags crate.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Attr(u16);

impl Attr {
    pub const fn empty() -> Self {
        Attr(0)
    }

    pub const fn from_bits(bits: u16) -> Self {
        Attr(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    /// True if any bit lives above the dense 8-bit attr byte, which forces
    /// this cell into the extended side table.
    pub fn needs_extended(self) -> bool {
        self.0 & !DENSE_MASK != 0
    }

    pub fn dense_byte(self) -> u8 {
        (self.0 & DENSE_MASK) as u8
    }

    pub fn from_dense_byte(byte: u8) -> Self {
        Attr(byte as u16)
    }
}

// Paired accessors, one per bit, written longhand rather than via a macro
// since the bit-to-name mapping is small and fixed.
impl Attr {
    pub fn bright(self) -> bool {
        self.0 & BIT_BRIGHT != 0
    }
    pub fn set_bright(&mut self, v: bool) {
        set_bit(&mut self.0, BIT_BRIGHT, v);
    }

    pub fn dim(self) -> bool {
        self.0 & BIT_DIM != 0
    }
    pub fn set_dim(&mut self, v: bool) {
        set_bit(&mut self.0, BIT_DIM, v);
    }

    pub fn italics(self) -> bool {
        self.0 & BIT_ITALICS != 0
    }
    pub fn set_italics(&mut self, v: bool) {
        set_bit(&mut self.0, BIT_ITALICS, v);
    }

    pub fn underscore(self) -> bool {
        self.0 & BIT_UNDERSCORE != 0
    }
    pub fn set_underscore(&mut self, v: bool) {
        set_bit(&mut self.0, BIT_UNDERSCORE, v);
    }

    pub fn blink(self) -> bool {
        self.0 & BIT_BLINK != 0
    }
    pub fn set_blink(&mut self, v: bool) {
        set_bit(&mut self.0, BIT_BLINK, v);
    }

    pub fn reverse(self) -> bool {
        self.0 & BIT_REVERSE != 0
    }
    pub fn set_reverse(&mut self, v: bool) {
        set_bit(&mut self.0, BIT_REVERSE, v);
    }

    pub fn hidden(self) -> bool {
        self.0 & BIT_HIDDEN != 0
    }
    pub fn set_hidden(&mut self, v: bool) {
        set_bit(&mut self.0, BIT_HIDDEN, v);
    }

    pub fn strikethrough(self) -> bool {
        self.0 & BIT_STRIKETHROUGH != 0
    }
    pub fn set_strikethrough(&mut self, v: bool) {
        set_bit(&mut self.0, BIT_STRIKETHROUGH, v);
    }

    pub fn charset(self) -> bool {
        self.0 & BIT_CHARSET != 0
    }
    pub fn set_charset(&mut self, v: bool) {
        set_bit(&mut self.0, BIT_CHARSET, v);
    }

    /// Every attribute bit currently set, in the fixed SGR emission order
    /// used by `string_cells`: bright, dim, italics, underscore, blink,
    /// reverse, hidden, strikethrough.
    pub fn set_bits_in_sgr_order(self) -> impl Iterator<Item = SgrAttrBit> {
        const ORDER: [(u16, SgrAttrBit); 8] = [
            (BIT_BRIGHT, SgrAttrBit::Bright),
            (BIT_DIM, SgrAttrBit::Dim),
            (BIT_ITALICS, SgrAttrBit::Italics),
            (BIT_UNDERSCORE, SgrAttrBit::Underscore),
            (BIT_BLINK, SgrAttrBit::Blink),
            (BIT_REVERSE, SgrAttrBit::Reverse),
            (BIT_HIDDEN, SgrAttrBit::Hidden),
            (BIT_STRIKETHROUGH, SgrAttrBit::Strikethrough),
        ];
        let bits = self.0;
        ORDER.into_iter().filter(move |(bit, _)| bits & bit != 0).map(|(_, name)| name)
    }
}

fn set_bit(mode: &mut u16, bit: u16, v: bool) {
    if v {
        *mode |= bit;
    } else {
        *mode &= !bit;
    }
}

/// One attribute bit, named for SGR code emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SgrAttrBit {
    Bright,
    Dim,
    Italics,
    Underscore,
    Blink,
    Reverse,
    Hidden,
    Strikethrough,
}

impl SgrAttrBit {
    /// The SGR parameter that sets this attribute.
    pub fn sgr_code(self) -> u16 {
        match self {
            SgrAttrBit::Bright => 1,
            SgrAttrBit::Dim => 2,
            SgrAttrBit::Italics => 3,
            SgrAttrBit::Underscore => 4,
            SgrAttrBit::Blink => 5,
            SgrAttrBit::Reverse => 7,
            SgrAttrBit::Hidden => 8,
            SgrAttrBit::Strikethrough => 9,
        }
    }
}

/// A foreground or background color.
///
/// `Basic` and `Palette` both encode to a single byte in the dense cell
/// form (distinguished by a flag bit in [`crate::cell::CellFlags`]); `Rgb`
/// always forces promotion to an extended cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    /// The terminal's default color (sentinel index `8`).
    Default,
    /// One of the 8 basic ANSI colors. Whether this renders as the normal
    /// or bright variant (`3x`/`4x` vs `9x`/`10x`) depends on the cell's
    /// [`Attr::bright`] bit, not on this value.
    Basic(u8),
    /// An xterm 256-color palette index.
    Palette(u8),
    /// A 24-bit RGB color.
    Rgb(u8, u8, u8),
}

impl Default for Color {
    fn default() -> Self {
        Color::Default
    }
}

impl Color {
    pub fn is_rgb(self) -> bool {
        matches!(self, Color::Rgb(..))
    }

    pub fn is_palette256(self) -> bool {
        matches!(self, Color::Palette(_))
    }

    /// Encode to the dense single-byte index. Panics on `Rgb`, since RGB
    /// colors never fit the dense form — callers must check
    /// [`Color::is_rgb`] first.
    pub fn dense_index(self) -> u8 {
        match self {
            Color::Default => DEFAULT_COLOR,
            Color::Basic(n) => n,
            Color::Palette(n) => n,
            Color::Rgb(..) => panic!("RGB color has no dense index"),
        }
    }

    /// Reconstruct a `Basic`/`Palette`/`Default` color from a dense byte
    /// plus the palette-256 flag. Never produces `Rgb` — that only comes
    /// from the extended side table.
    pub fn from_dense(index: u8, is_palette256: bool) -> Self {
        if is_palette256 {
            Color::Palette(index)
        } else if index == DEFAULT_COLOR {
            Color::Default
        } else {
            Color::Basic(index)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dense_round_trip_low_bits() {
        let mut a = Attr::empty();
        a.set_bright(true);
        a.set_underscore(true);
        assert!(!a.needs_extended());
        let back = Attr::from_dense_byte(a.dense_byte());
        assert_eq!(a, back);
    }

    #[test]
    fn charset_bit_forces_extended() {
        let mut a = Attr::empty();
        a.set_charset(true);
        assert!(a.needs_extended());
    }

    #[test]
    fn sgr_order_is_fixed() {
        let mut a = Attr::empty();
        a.set_strikethrough(true);
        a.set_bright(true);
        let order: Vec<_> = a.set_bits_in_sgr_order().collect();
        assert_eq!(order, vec![SgrAttrBit::Bright, SgrAttrBit::Strikethrough]);
    }

    #[test]
    fn color_dense_round_trip() {
        assert_eq!(Color::from_dense(DEFAULT_COLOR, false), Color::Default);
        assert_eq!(Color::from_dense(3, false), Color::Basic(3));
        assert_eq!(Color::from_dense(200, true), Color::Palette(200));
    }
}
