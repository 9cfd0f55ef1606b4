/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::borrow::BorrowMut;
use std::fmt;

use super::{DataBus, Flags, Memory, Proc8080};

/// A copy of every register, for debuggers and trace comparison. Memory is not included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    /// Packed flags, as pushed by `PUSH PSW`
    pub flags: u8,
    pub sp: u16,
    pub pc: u16,
    pub halted: bool,
    pub interrupts_enabled: bool,
    pub interrupt_pending: bool,
}

impl Snapshot {
    pub fn flags(&self) -> Flags {
        Flags::from_processor_status_word(self.flags)
    }
}

impl<Bus: DataBus, Mem: BorrowMut<Memory>> Proc8080<Bus, Mem> {
    pub fn snapshot(&self) -> Snapshot {
        let registers = &self.registers;
        Snapshot {
            a: registers.a,
            b: registers.b,
            c: registers.c,
            d: registers.d,
            e: registers.e,
            h: registers.h,
            l: registers.l,
            flags: self.flags.to_processor_status_word(),
            sp: registers.sp,
            pc: registers.pc,
            halted: self.halted,
            interrupts_enabled: self.interrupts_enabled,
            interrupt_pending: self.interrupt_pending,
        }
    }
}

/// Register dump in a fixed-width table.
impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let flags = self.flags();
        writeln!(f, " A  B  C  D  E  H  L   SP   PC | S Z A P C")?;
        write!(
            f,
            "{:02x} {:02x} {:02x} {:02x} {:02x} {:02x} {:02x} {:04x} {:04x} | {} {} {} {} {}",
            self.a,
            self.b,
            self.c,
            self.d,
            self.e,
            self.h,
            self.l,
            self.sp,
            self.pc,
            flags.s as u8,
            flags.z as u8,
            flags.ac as u8,
            flags.p as u8,
            flags.cy as u8,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proc_state::new_memory;

    struct NoPorts;

    impl DataBus for NoPorts {
        fn read_port(&mut self, _port: u8) -> u8 {
            0
        }

        fn write_port(&mut self, _port: u8, _value: u8) {}
    }

    #[test]
    fn fresh_processor() {
        let cpu = Proc8080::new(new_memory(), NoPorts);
        let snapshot = cpu.snapshot();
        assert_eq!(snapshot.flags, 0x02);
        assert_eq!(snapshot.pc, 0);
        assert_eq!(snapshot.sp, 0);
        assert!(!snapshot.halted);
        assert!(!snapshot.interrupts_enabled);
        assert!(!snapshot.interrupt_pending);
    }

    #[test]
    fn dump_layout() {
        let mut cpu = Proc8080::new(new_memory(), NoPorts);
        // LXI H,$03ff ; MVI A,$80 ; STC
        cpu.load(0x0000, &[0x21, 0xff, 0x03, 0x3e, 0x80, 0x37]);
        for _ in 0..3 {
            cpu.step();
        }

        assert_eq!(
            cpu.snapshot().to_string(),
            " A  B  C  D  E  H  L   SP   PC | S Z A P C\n\
             80 00 00 00 00 03 ff 0000 0006 | 0 0 0 0 1"
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_as_plain_fields() {
        let cpu = Proc8080::new(new_memory(), NoPorts);
        let json = serde_json::to_value(cpu.snapshot()).unwrap();
        assert_eq!(json["flags"], 2);
        assert_eq!(json["halted"], false);
    }
}
