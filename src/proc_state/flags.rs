/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

/// The five condition flags.
///
/// Packed into a byte (see [`to_processor_status_word`](#method.to_processor_status_word)) the
/// flags occupy bits 7, 6, 4, 2 and 0; bit 1 always reads 1 and bits 3 and 5 always read 0.
/// Those constant bits are not stored, so no sequence of operations can corrupt them.
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy)]
pub struct Flags {
    /// Zero
    pub z: bool,
    /// Sign
    pub s: bool,
    /// Parity, set when the result has an even number of bits set
    pub p: bool,
    /// Carry
    pub cy: bool,
    /// Auxiliary carry, out of bit 3
    pub ac: bool,
}

/// Unsigned operand widths the flag engine works on.
pub trait Width: Copy {
    const BITS: u32;

    fn widen(self) -> u32;
}

impl Width for u8 {
    const BITS: u32 = 8;

    fn widen(self) -> u32 {
        self as u32
    }
}

impl Width for u16 {
    const BITS: u32 = 16;

    fn widen(self) -> u32 {
        self as u32
    }
}

/// Whether `a + b + carry_in` overflows the operand width.
///
/// Subtraction is performed as the addition of the complemented operand, so this is also the
/// inverse of the borrow for the subtract family.
pub fn carry<T: Width>(a: T, b: T, carry_in: bool) -> bool {
    let max = (1u32 << T::BITS) - 1;
    a.widen() + b.widen() + (carry_in as u32) > max
}

/// Whether the low nibbles of `a + b + carry_in` carry into bit 4.
pub fn aux_carry(a: u8, b: u8, carry_in: bool) -> bool {
    (a & 0x0f) + (b & 0x0f) + (carry_in as u8) > 0x0f
}

impl Flags {
    pub fn from_processor_status_word(psw: u8) -> Flags {
        Flags {
            z: (psw & (1 << 6)) != 0,
            s: (psw & (1 << 7)) != 0,
            p: (psw & (1 << 2)) != 0,
            cy: (psw & 1) != 0,
            ac: (psw & (1 << 4)) != 0,
        }
    }

    pub fn to_processor_status_word(&self) -> u8 {
        (self.cy as u8)
            | 0b0000_0010
            | ((self.p as u8) << 2)
            | ((self.ac as u8) << 4)
            | ((self.z as u8) << 6)
            | ((self.s as u8) << 7)
    }

    /// Sets sign, zero and parity from `result`. Carries are left alone.
    pub fn set_result_flags<T: Width>(&mut self, result: T) {
        let value = result.widen();
        self.s = (value >> (T::BITS - 1)) & 1 != 0;
        self.z = value == 0;
        self.p = value.count_ones() % 2 == 0;
    }

    /// Packed decimal correction of the accumulator `a` after an addition.
    ///
    /// Carry and auxiliary carry are only ever set here, never cleared: they keep whatever the
    /// two corrections left in them.
    pub fn decimal_adjust(&mut self, a: u8) -> u8 {
        let mut a = a;
        if self.ac || a & 0x0f > 9 {
            a = a.wrapping_add(0x06);
            self.ac = true;
        }
        if self.cy || a >> 4 > 9 {
            a = a.wrapping_add(0x60);
            self.cy = true;
        }
        self.set_result_flags(a);
        a
    }
}
