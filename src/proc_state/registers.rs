/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use crate::opcode::{Reg16, Register};

/// 16-bit value with `high` in bits 8-15 and `low` in bits 0-7.
pub fn join(high: u8, low: u8) -> u16 {
    ((high as u16) << 8) | low as u16
}

/// Inverse of [`join`](fn.join.html): `(high, low)`.
pub fn split(value: u16) -> (u8, u8) {
    ((value >> 8) as u8, value as u8)
}

/// The general purpose registers, the stack pointer and the program counter.
///
/// Pairs are views over two independent bytes: `B`, `D` and `H` hold the high byte of
/// `BC`, `DE` and `HL`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,
}

impl Registers {
    pub fn reg_val(&self, reg: Register) -> u8 {
        match reg {
            Register::A => self.a,
            Register::B => self.b,
            Register::C => self.c,
            Register::D => self.d,
            Register::E => self.e,
            Register::H => self.h,
            Register::L => self.l,
        }
    }

    pub fn set_reg_val(&mut self, reg: Register, value: u8) {
        match reg {
            Register::A => self.a = value,
            Register::B => self.b = value,
            Register::C => self.c = value,
            Register::D => self.d = value,
            Register::E => self.e = value,
            Register::H => self.h = value,
            Register::L => self.l = value,
        }
    }

    pub fn reg_16_val(&self, reg: Reg16) -> u16 {
        match reg {
            Reg16::B => join(self.b, self.c),
            Reg16::D => join(self.d, self.e),
            Reg16::H => join(self.h, self.l),
            Reg16::SP => self.sp,
        }
    }

    pub fn set_reg_16_val(&mut self, reg: Reg16, value: u16) {
        let (high, low) = split(value);
        match reg {
            Reg16::B => {
                self.b = high;
                self.c = low;
            }
            Reg16::D => {
                self.d = high;
                self.e = low;
            }
            Reg16::H => {
                self.h = high;
                self.l = low;
            }
            Reg16::SP => self.sp = value,
        }
    }

    pub fn bc(&self) -> u16 {
        self.reg_16_val(Reg16::B)
    }

    pub fn de(&self) -> u16 {
        self.reg_16_val(Reg16::D)
    }

    pub fn hl(&self) -> u16 {
        self.reg_16_val(Reg16::H)
    }
}
