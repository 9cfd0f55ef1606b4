/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! # Intel 8080 emulator core
//!
//! An instruction-level model of the 8080: registers, flags, a 64 KiB address space, the
//! interrupt latch and every one of the 256 opcodes. Timing is not modelled.
//!
//! The main struct is [`Proc8080`](proc_state/struct.Proc8080.html). It is driven one
//! instruction at a time with `step`, talks to devices through a
//! [`DataBus`](proc_state/trait.DataBus.html) and receives interrupts with `interrupt`.
//!
//! ```
//! use intel8080::proc_state::{new_memory, PortHandlers, Proc8080};
//!
//! let mut cpu = Proc8080::new(new_memory(), PortHandlers::new(|_| 0, |_, _| ()));
//! // LXI B,$1234 ; HLT
//! cpu.load(0x0000, &[0x01, 0x34, 0x12, 0x76]);
//! while !cpu.is_halted() {
//!     cpu.step();
//! }
//! assert_eq!(cpu.registers().bc(), 0x1234);
//! assert_eq!(cpu.pc(), 0x0004);
//! ```
//!
//! The [`opcode`](opcode/index.html) module decodes raw bytes without a processor, which is
//! enough to build a disassembler:
//!
//! ```
//! use intel8080::opcode::OpCodes;
//!
//! let program: &[u8] = &[0x3e, 0x01, 0xc3, 0x00, 0x01];
//! let mut addr = 0;
//! for op in OpCodes::new(program) {
//!     let op = op.unwrap();
//!     println!("0x{:04x} - {}", addr, op);
//!     addr += op.size();
//! }
//! assert_eq!(addr, 5);
//! ```

pub mod opcode;
pub mod proc_state;
