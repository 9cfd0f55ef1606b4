/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::borrow::BorrowMut;

use super::{DataBus, Memory, Proc8080};
use crate::opcode::OpCode;

/// A simple wrapper around [`Proc8080`](struct.Proc8080.html) which allows to intercept opcodes.
///
/// This structure is useful for debugging, or for standing in for code that does not exist in
/// the image, like the CP/M BDOS entry point test programs call into.
pub struct InterceptableProc8080<Bus, Mem, Intercept>
where
    Bus: DataBus,
    Mem: BorrowMut<Memory>,
    Intercept: FnMut(&Proc8080<Bus, Mem>, &OpCode) -> bool,
{
    proc8080: Proc8080<Bus, Mem>,
    interceptor: Intercept,
}

impl<Bus, Mem, Intercept> InterceptableProc8080<Bus, Mem, Intercept>
where
    Bus: DataBus,
    Mem: BorrowMut<Memory>,
    Intercept: FnMut(&Proc8080<Bus, Mem>, &OpCode) -> bool,
{
    /// Builds an `InterceptableProc8080` by taking ownership of an existing `Proc8080`.
    ///
    /// `interceptor` runs after an instruction has been decoded and the program counter moved
    /// past it, and before the instruction is applied. It returns:
    ///  - `true` if it handled the instruction, which is then skipped
    ///  - `false` to let the processor apply it normally
    ///
    /// Interrupt bookkeeping is the same either way.
    pub fn from_8080(
        proc8080: Proc8080<Bus, Mem>,
        interceptor: Intercept,
    ) -> InterceptableProc8080<Bus, Mem, Intercept> {
        InterceptableProc8080 { proc8080, interceptor }
    }

    /// Takes ownership of the wrapped `Proc8080`.
    pub fn unwrap(self) -> Proc8080<Bus, Mem> {
        self.proc8080
    }

    /// Same as [`Proc8080::step`](struct.Proc8080.html#method.step), with the interceptor
    /// consulted before the instruction is applied.
    pub fn step(&mut self) {
        if let Some(fetched) = self.proc8080.fetch_op() {
            if !(self.interceptor)(&self.proc8080, &fetched.op) {
                self.proc8080.apply_op(fetched.op);
            }
            self.proc8080.retire(&fetched);
        }
    }

    pub fn interrupt(&mut self, vector: u8) {
        self.proc8080.interrupt(vector)
    }

    pub fn proc8080(&self) -> &Proc8080<Bus, Mem> {
        &self.proc8080
    }

    pub fn proc8080_mut(&mut self) -> &mut Proc8080<Bus, Mem> {
        &mut self.proc8080
    }
}
