//! MSB first bit packing of variable width fields.

use bitvec::prelude::*;

/// Split `value`, `total_bits` wide, into its upper `high_bits` and the
/// remaining lower bits.
pub fn split_value(value: u32, high_bits: u32, total_bits: u32) -> (u32, u32) {
    let rest_bits = total_bits - high_bits;
    let high = value >> rest_bits;
    (high, value - (high << rest_bits))
}

/// Inverse of [`split_value`].
pub fn combine(high: u32, rest: u32, rest_bits: u32) -> u32 {
    (high << rest_bits) + rest
}

pub struct BitWriter<'a> {
    bits: &'a mut BitSlice<u8, Msb0>,
    pos: usize,
}

impl<'a> BitWriter<'a> {
    /// Clears `data` and starts writing at its first bit.
    pub fn new(data: &'a mut [u8]) -> Self {
        data.fill(0);
        Self {
            bits: data.view_bits_mut::<Msb0>(),
            pos: 0,
        }
    }

    /// Append the `width` low bits of `value`.
    ///
    /// Panics when the field does not fit in the buffer.
    pub fn pack(&mut self, value: u32, width: u32) {
        if width == 0 {
            return;
        }
        debug_assert!(width == 32 || value >> width == 0);
        let end = self.pos + width as usize;
        self.bits[self.pos..end].store_be(value);
        self.pos = end;
    }

    /// Bits written so far.
    pub fn position(&self) -> usize {
        self.pos
    }
}

pub struct BitReader<'a> {
    bits: &'a BitSlice<u8, Msb0>,
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            bits: data.view_bits::<Msb0>(),
            pos: 0,
        }
    }

    /// Read the next `width` bits.
    ///
    /// Panics when reading past the end of the buffer.
    pub fn unpack(&mut self, width: u32) -> u32 {
        if width == 0 {
            return 0;
        }
        let end = self.pos + width as usize;
        let value = self.bits[self.pos..end].load_be::<u32>();
        self.pos = end;
        value
    }

    pub fn position(&self) -> usize {
        self.pos
    }
}
