/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

mod flags;
mod intercept;
mod memory;
mod registers;
mod snapshot;

use std::borrow::BorrowMut;
use std::fmt;

use log::{debug, trace};

use crate::opcode::OpCode::*;
use crate::opcode::{self, Condition, OpCode, Operand, Reg16};
pub use self::flags::{aux_carry, carry, Flags, Width};
pub use self::intercept::InterceptableProc8080;
pub use self::memory::{new_memory, Memory, MEMORY_SIZE};
pub use self::registers::{join, split, Registers};
pub use self::snapshot::Snapshot;

/// Interface used by `Proc8080` for `IN` and `OUT` instructions. This is the main way to interact
/// with the processor emulation.
///
/// The 8080 communicates with external devices via the instructions `IN` (the CPU reads from the
/// data bus on a given port) and `OUT` (the CPU writes to a given port). What a port does depends
/// on the hardware being emulated: a sound latch, a shift register, a keyboard matrix...
///
/// Both calls happen synchronously inside [`step`](struct.Proc8080.html#method.step) and must
/// not call back into the processor.
pub trait DataBus {
    /// Called by `Proc8080` when it applies an `IN` instruction.
    fn read_port(&mut self, port: u8) -> u8;

    /// Called by `Proc8080` when it applies an `OUT` instruction.
    fn write_port(&mut self, port: u8, value: u8);
}

/// A `DataBus` made of two closures, one per direction.
///
/// ```
/// use intel8080::proc_state::{new_memory, PortHandlers, Proc8080};
///
/// let mut printed = Vec::new();
/// let mut cpu = Proc8080::new(
///     new_memory(),
///     PortHandlers::new(|_port| 0x00, |_port, value| printed.push(value)),
/// );
/// cpu.load(0x0000, &[0x3e, b'!', 0xd3, 0x01]); // MVI A,'!' ; OUT 1
/// cpu.step();
/// cpu.step();
/// drop(cpu);
/// assert_eq!(printed, b"!");
/// ```
pub struct PortHandlers<I, O> {
    input: I,
    output: O,
}

impl<I, O> PortHandlers<I, O>
where
    I: FnMut(u8) -> u8,
    O: FnMut(u8, u8),
{
    pub fn new(input: I, output: O) -> PortHandlers<I, O> {
        PortHandlers { input, output }
    }
}

impl<I, O> DataBus for PortHandlers<I, O>
where
    I: FnMut(u8) -> u8,
    O: FnMut(u8, u8),
{
    fn read_port(&mut self, port: u8) -> u8 {
        (self.input)(port)
    }

    fn write_port(&mut self, port: u8, value: u8) {
        (self.output)(port, value)
    }
}

/// Structure containing the processor state (flags, registers, interrupt latch) and logic.
///
/// The address space is anything that can lend a [`Memory`](type.Memory.html): a
/// `Box<Memory>` handed over to the processor, or a `&mut Memory` kept by the caller.
pub struct Proc8080<Bus: DataBus, Mem: BorrowMut<Memory> = Box<Memory>> {
    flags: Flags,
    registers: Registers,
    memory: Mem,
    interrupts_enabled: bool,
    interrupt_pending: bool,
    interrupt_vector: u8,
    halted: bool,
    data_bus: Bus,
}

/// An instruction ready to be applied.
struct Fetched {
    op: OpCode,
    from_interrupt: bool,
}

impl<Bus: DataBus, Mem: BorrowMut<Memory>> Proc8080<Bus, Mem> {
    /// Builds a new `Proc8080` over the memory `mem` with the given `DataBus`.
    ///
    /// All registers start at 0, as does the program counter. Interrupts are disabled.
    pub fn new(mem: Mem, data_bus: Bus) -> Proc8080<Bus, Mem> {
        Proc8080 {
            flags: Default::default(),
            registers: Default::default(),
            memory: mem,
            interrupts_enabled: false,
            interrupt_pending: false,
            interrupt_vector: 0,
            halted: false,
            data_bus,
        }
    }

    /// Borrows the processor flags immutably.
    pub fn flags(&self) -> &Flags {
        &self.flags
    }

    pub fn flags_mut(&mut self) -> &mut Flags {
        &mut self.flags
    }

    /// Borrows the processor registers immutably.
    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.registers
    }

    pub fn pc(&self) -> u16 {
        self.registers.pc
    }

    pub fn set_pc(&mut self, pc: u16) {
        self.registers.pc = pc;
    }

    pub fn sp(&self) -> u16 {
        self.registers.sp
    }

    /// `A` in the high byte, the packed flags in the low byte.
    pub fn psw(&self) -> u16 {
        join(self.registers.a, self.flags.to_processor_status_word())
    }

    /// Loads `A` and the flags. Bits 1, 3 and 5 of the low byte are ignored.
    pub fn set_psw(&mut self, value: u16) {
        let (a, flags) = split(value);
        self.registers.a = a;
        self.flags = Flags::from_processor_status_word(flags);
    }

    /// The memory byte addressed by `HL`.
    pub fn at_hl(&self) -> u8 {
        self.read_byte(self.registers.hl())
    }

    /// The memory word on top of the stack.
    pub fn at_sp(&self) -> u16 {
        self.read_word(self.registers.sp)
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn interrupts_enabled(&self) -> bool {
        self.interrupts_enabled
    }

    pub fn interrupt_pending(&self) -> bool {
        self.interrupt_pending
    }

    pub fn bus(&self) -> &Bus {
        &self.data_bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.data_bus
    }

    /// Gives back the memory and the data bus.
    pub fn into_parts(self) -> (Mem, Bus) {
        (self.memory, self.data_bus)
    }

    /// Runs one instruction.
    ///
    /// A pending interrupt wins over memory: its vector is executed as the next opcode without
    /// being read from memory and without moving the program counter, and the processor leaves
    /// the halted state. Otherwise a halted processor does nothing, and a running one reads the
    /// opcode at `PC` and applies it.
    pub fn step(&mut self) {
        if let Some(fetched) = self.fetch_op() {
            self.apply_op(fetched.op);
            self.retire(&fetched);
        }
    }

    /// Latches `vector` as the next instruction to execute and disables interrupts.
    ///
    /// The vector is usually one of the `RST` opcodes (`0xc7`, `0xcf`... `0xff`) but any opcode
    /// is accepted. The request is latched whether or not interrupts are currently enabled;
    /// device code that must honour `DI` checks
    /// [`interrupts_enabled`](#method.interrupts_enabled) first. Only call this between steps.
    pub fn interrupt(&mut self, vector: u8) {
        if self.interrupt_pending {
            debug!(
                "interrupt {:#04x} replaces pending {:#04x}",
                vector, self.interrupt_vector
            );
        } else {
            debug!("interrupt {:#04x} latched", vector);
        }
        self.interrupts_enabled = false;
        self.interrupt_pending = true;
        self.interrupt_vector = vector;
    }

    fn fetch_op(&mut self) -> Option<Fetched> {
        if self.interrupt_pending {
            let vector = self.interrupt_vector;
            debug!("servicing interrupt {:#04x} at {:04x}", vector, self.registers.pc);
            let op = opcode::decode(vector, || self.fetch_byte());
            Some(Fetched { op, from_interrupt: true })
        } else if self.halted {
            None
        } else {
            let pc = self.registers.pc;
            let byte = self.fetch_byte();
            let op = opcode::decode(byte, || self.fetch_byte());
            trace!("{:04x}  {}", pc, op);
            Some(Fetched { op, from_interrupt: false })
        }
    }

    fn retire(&mut self, fetched: &Fetched) {
        if fetched.from_interrupt {
            self.interrupt_pending = false;
            self.halted = false;
        }
    }

    fn apply_op(&mut self, op: OpCode) {
        match op {
            Nop => (),
            Hlt => self.halt(),

            // Data transfer
            Mov(dst, src) => {
                let value = self.operand_val(src);
                self.set_operand_val(dst, value);
            }
            Mvi(dst, value) => self.set_operand_val(dst, value),
            Lxi(reg, value) => self.registers.set_reg_16_val(reg, value),
            Lda(addr) => self.registers.a = self.read_byte(addr),
            Sta(addr) => self.write_byte(addr, self.registers.a),
            Lhld(addr) => {
                let value = self.read_word(addr);
                self.registers.set_reg_16_val(Reg16::H, value);
            }
            Shld(addr) => self.write_word(addr, self.registers.hl()),
            Ldax(reg) => self.registers.a = self.read_byte(self.registers.reg_16_val(reg)),
            Stax(reg) => self.write_byte(self.registers.reg_16_val(reg), self.registers.a),
            Xchg => self.xchg(),

            // Arithmetic
            Add(src) => {
                let value = self.operand_val(src);
                self.add_to_accumulator(value, false);
            }
            Adc(src) => {
                let value = self.operand_val(src);
                self.add_to_accumulator(value, self.flags.cy);
            }
            Sub(src) => {
                let value = self.operand_val(src);
                self.registers.a = self.subtract(value, false);
            }
            Sbb(src) => {
                let value = self.operand_val(src);
                self.registers.a = self.subtract(value, self.flags.cy);
            }
            Adi(value) => self.add_to_accumulator(value, false),
            Aci(value) => self.add_to_accumulator(value, self.flags.cy),
            Sui(value) => self.registers.a = self.subtract(value, false),
            Sbi(value) => self.registers.a = self.subtract(value, self.flags.cy),
            Inr(dst) => self.increment(dst),
            Dcr(dst) => self.decrement(dst),
            Inx(reg) => {
                let value = self.registers.reg_16_val(reg).wrapping_add(1);
                self.registers.set_reg_16_val(reg, value);
            }
            Dcx(reg) => {
                let value = self.registers.reg_16_val(reg).wrapping_sub(1);
                self.registers.set_reg_16_val(reg, value);
            }
            Dad(reg) => self.add_register_pair_to_h(reg),
            Daa => self.registers.a = self.flags.decimal_adjust(self.registers.a),

            // Logical
            Ana(src) => {
                let value = self.operand_val(src);
                self.apply_and(value);
            }
            Xra(src) => {
                let value = self.operand_val(src);
                self.apply_xor(value);
            }
            Ora(src) => {
                let value = self.operand_val(src);
                self.apply_or(value);
            }
            Cmp(src) => {
                let value = self.operand_val(src);
                self.subtract(value, false);
            }
            Ani(value) => self.apply_and(value),
            Xri(value) => self.apply_xor(value),
            Ori(value) => self.apply_or(value),
            Cpi(value) => {
                self.subtract(value, false);
            }
            Rlc => self.rotate_left(),
            Rrc => self.rotate_right(),
            Ral => self.shift_left(),
            Rar => self.shift_right(),
            Cma => self.registers.a = !self.registers.a,
            Cmc => self.flags.cy = !self.flags.cy,
            Stc => self.flags.cy = true,

            // Branch
            Jmp(addr) => self.registers.pc = addr,
            Jcc(cond, addr) => if self.condition_met(cond) { self.registers.pc = addr },
            Call(addr) => self.apply_call(addr),
            Ccc(cond, addr) => if self.condition_met(cond) { self.apply_call(addr) },
            Ret => self.apply_return(),
            Rcc(cond) => if self.condition_met(cond) { self.apply_return() },
            Rst(n) => self.apply_call(u16::from(n) * 8),
            Pchl => self.registers.pc = self.registers.hl(),

            // Stack, I/O, and Machine Control
            Push(reg) => self.push_stack(self.registers.reg_16_val(reg)),
            PushPsw => self.push_stack(self.psw()),
            Pop(reg) => {
                let value = self.pop_stack();
                self.registers.set_reg_16_val(reg, value);
            }
            PopPsw => {
                let value = self.pop_stack();
                self.set_psw(value);
            }
            Xthl => self.xthl(),
            Sphl => self.registers.sp = self.registers.hl(),
            In(port) => self.registers.a = self.data_bus.read_port(port),
            Out(port) => self.data_bus.write_port(port, self.registers.a),
            Ei => self.interrupts_enabled = true,
            Di => self.interrupts_enabled = false,
        }
    }

    fn halt(&mut self) {
        debug!("halted at {:04x}", self.registers.pc);
        self.halted = true;
    }

    fn operand_val(&self, operand: Operand) -> u8 {
        match operand {
            Operand::Reg(reg) => self.registers.reg_val(reg),
            Operand::M => self.at_hl(),
        }
    }

    fn set_operand_val(&mut self, operand: Operand, value: u8) {
        match operand {
            Operand::Reg(reg) => self.registers.set_reg_val(reg, value),
            Operand::M => self.write_byte(self.registers.hl(), value),
        }
    }

    fn condition_met(&self, cond: Condition) -> bool {
        match cond {
            Condition::NotZero => !self.flags.z,
            Condition::Zero => self.flags.z,
            Condition::NoCarry => !self.flags.cy,
            Condition::Carry => self.flags.cy,
            Condition::ParityOdd => !self.flags.p,
            Condition::ParityEven => self.flags.p,
            Condition::Plus => !self.flags.s,
            Condition::Minus => self.flags.s,
        }
    }

    fn xchg(&mut self) {
        let d = self.registers.de();
        let h = self.registers.hl();

        self.registers.set_reg_16_val(Reg16::D, h);
        self.registers.set_reg_16_val(Reg16::H, d);
    }

    fn add_to_accumulator(&mut self, value: u8, carry_in: bool) {
        let a = self.registers.a;
        let result = a.wrapping_add(value).wrapping_add(carry_in as u8);

        self.flags.cy = carry(a, value, carry_in);
        self.flags.ac = aux_carry(a, value, carry_in);
        self.flags.set_result_flags(result);
        self.registers.a = result;
    }

    /// `A - value - borrow_in`, computed as `A + !value + !borrow_in`. Sets every flag, with
    /// carry meaning borrow, and leaves `A` alone.
    fn subtract(&mut self, value: u8, borrow_in: bool) -> u8 {
        let a = self.registers.a;
        let complement = !value;
        let result = a.wrapping_add(complement).wrapping_add(!borrow_in as u8);

        self.flags.cy = !carry(a, complement, !borrow_in);
        self.flags.ac = aux_carry(a, complement, !borrow_in);
        self.flags.set_result_flags(result);
        result
    }

    fn increment(&mut self, dst: Operand) {
        let value = self.operand_val(dst);
        let result = value.wrapping_add(1);

        self.set_operand_val(dst, result);
        self.flags.ac = value & 0x0f == 0x0f;
        self.flags.set_result_flags(result);
    }

    fn decrement(&mut self, dst: Operand) {
        let value = self.operand_val(dst);
        let result = value.wrapping_sub(1);

        self.set_operand_val(dst, result);
        self.flags.ac = value & 0x0f == 0x00;
        self.flags.set_result_flags(result);
    }

    fn add_register_pair_to_h(&mut self, reg: Reg16) {
        let h = self.registers.hl();
        let value = self.registers.reg_16_val(reg);

        self.registers.set_reg_16_val(Reg16::H, h.wrapping_add(value));
        self.flags.cy = carry(h, value, false);
    }

    fn apply_and(&mut self, value: u8) {
        let a = self.registers.a;
        let result = a & value;

        self.registers.a = result;
        self.flags.set_result_flags(result);
        self.flags.cy = false;
        self.flags.ac = (a | value) & 0x08 != 0;
    }

    fn apply_xor(&mut self, value: u8) {
        let result = self.registers.a ^ value;

        self.registers.a = result;
        self.flags.set_result_flags(result);
        self.flags.cy = false;
        self.flags.ac = false;
    }

    fn apply_or(&mut self, value: u8) {
        let result = self.registers.a | value;

        self.registers.a = result;
        self.flags.set_result_flags(result);
        self.flags.cy = false;
        self.flags.ac = false;
    }

    fn rotate_left(&mut self) {
        let a = self.registers.a;
        self.registers.a = a.rotate_left(1);
        self.flags.cy = (a & 0x80) != 0;
    }

    fn rotate_right(&mut self) {
        let a = self.registers.a;
        self.registers.a = a.rotate_right(1);
        self.flags.cy = (a & 0x01) != 0;
    }

    // RAL and RAR bring a 0 in; only the bit going out lands in carry.
    fn shift_left(&mut self) {
        let a = self.registers.a;
        self.registers.a = a << 1;
        self.flags.cy = (a & 0x80) != 0;
    }

    fn shift_right(&mut self) {
        let a = self.registers.a;
        self.registers.a = a >> 1;
        self.flags.cy = (a & 0x01) != 0;
    }

    fn apply_call(&mut self, addr: u16) {
        let pc = self.registers.pc;
        self.push_stack(pc);
        self.registers.pc = addr;
    }

    fn apply_return(&mut self) {
        self.registers.pc = self.pop_stack();
    }

    fn push_stack(&mut self, value: u16) {
        let new_stack_pointer = self.registers.sp.wrapping_sub(2);
        self.write_word(new_stack_pointer, value);
        self.registers.sp = new_stack_pointer;
    }

    fn pop_stack(&mut self) -> u16 {
        let value = self.at_sp();
        self.registers.sp = self.registers.sp.wrapping_add(2);
        value
    }

    fn xthl(&mut self) {
        let addr = self.registers.sp;
        let h_value = self.registers.hl();
        let mem_value = self.read_word(addr);
        self.write_word(addr, h_value);
        self.registers.set_reg_16_val(Reg16::H, mem_value);
    }
}

impl<Bus: DataBus, Mem: BorrowMut<Memory>> fmt::Debug for Proc8080<Bus, Mem> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Proc8080")
            .field("flags", &self.flags)
            .field("registers", &self.registers)
            .field("interrupts_enabled", &self.interrupts_enabled)
            .field("interrupt_pending", &self.interrupt_pending)
            .field("halted", &self.halted)
            .finish()
    }
}
