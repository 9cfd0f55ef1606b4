/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::borrow::{Borrow, BorrowMut};

use super::registers::{join, split};
use super::{DataBus, Proc8080};

/// Size of the 8080 address space.
pub const MEMORY_SIZE: usize = 0x10000;

/// The full address space. Any `u16` is a valid index.
pub type Memory = [u8; MEMORY_SIZE];

/// A zeroed, heap allocated address space.
pub fn new_memory() -> Box<Memory> {
    Box::new([0; MEMORY_SIZE])
}

/// Byte and word access to the address space.
///
/// Words are little-endian: the low byte sits at the lower address. Every address computation
/// wraps at `0xffff`.
impl<Bus: DataBus, Mem: BorrowMut<Memory>> Proc8080<Bus, Mem> {
    /// Borrows the memory immutably.
    pub fn memory(&self) -> &Memory {
        <Mem as Borrow<Memory>>::borrow(&self.memory)
    }

    /// Borrows the memory mutably, e.g. to map in a new ROM bank between steps.
    pub fn memory_mut(&mut self) -> &mut Memory {
        <Mem as BorrowMut<Memory>>::borrow_mut(&mut self.memory)
    }

    pub fn read_byte(&self, addr: u16) -> u8 {
        self.memory()[addr as usize]
    }

    pub fn write_byte(&mut self, addr: u16, value: u8) {
        self.memory_mut()[addr as usize] = value;
    }

    pub fn read_word(&self, addr: u16) -> u16 {
        let low = self.read_byte(addr);
        let high = self.read_byte(addr.wrapping_add(1));
        join(high, low)
    }

    pub fn write_word(&mut self, addr: u16, value: u16) {
        let (high, low) = split(value);
        self.write_byte(addr, low);
        self.write_byte(addr.wrapping_add(1), high);
    }

    /// Copies `program` into memory starting at `origin`.
    ///
    /// Nothing is validated; bytes past `0xffff` wrap around to address 0.
    pub fn load(&mut self, origin: u16, program: &[u8]) {
        let mut addr = origin;
        for &byte in program {
            self.write_byte(addr, byte);
            addr = addr.wrapping_add(1);
        }
    }

    /// Reads the byte at `PC` and moves `PC` past it.
    pub fn fetch_byte(&mut self) -> u8 {
        let value = self.read_byte(self.registers.pc);
        self.registers.pc = self.registers.pc.wrapping_add(1);
        value
    }

    /// Reads the little-endian word at `PC` and moves `PC` past it.
    pub fn fetch_word(&mut self) -> u16 {
        let value = self.read_word(self.registers.pc);
        self.registers.pc = self.registers.pc.wrapping_add(2);
        value
    }
}
