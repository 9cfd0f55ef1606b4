/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use self::OpCode::*;
use std::fmt::{self, Display, Formatter};

/// One of the seven 8-bit registers.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Register {
    A,
    B,
    C,
    D,
    E,
    H,
    L,
}

impl Display for Register {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Source or destination of an 8-bit operation: a register, or `M`, the memory byte addressed
/// by `HL`.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Operand {
    Reg(Register),
    M,
}

impl Operand {
    /// Operand selected by the 3-bit register field of an opcode (`B C D E H L M A`).
    pub fn from_bits(bits: u8) -> Operand {
        match bits & 0x07 {
            0 => Operand::Reg(Register::B),
            1 => Operand::Reg(Register::C),
            2 => Operand::Reg(Register::D),
            3 => Operand::Reg(Register::E),
            4 => Operand::Reg(Register::H),
            5 => Operand::Reg(Register::L),
            6 => Operand::M,
            _ => Operand::Reg(Register::A),
        }
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            Operand::Reg(reg) => write!(f, "{}", reg),
            Operand::M => write!(f, "M"),
        }
    }
}

/// Register pairs addressable by the 16-bit instructions. `PSW` only appears in `PUSH`/`POP`
/// and has its own opcodes.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Reg16 {
    B,
    D,
    H,
    SP,
}

impl Reg16 {
    /// Pair selected by the 2-bit pair field of an opcode.
    pub fn from_bits(bits: u8) -> Reg16 {
        match bits & 0x03 {
            0 => Reg16::B,
            1 => Reg16::D,
            2 => Reg16::H,
            _ => Reg16::SP,
        }
    }
}

impl Display for Reg16 {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Flag test used by the conditional jumps, calls and returns.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Condition {
    NotZero,
    Zero,
    NoCarry,
    Carry,
    ParityOdd,
    ParityEven,
    Plus,
    Minus,
}

impl Condition {
    pub fn from_bits(bits: u8) -> Condition {
        match bits & 0x07 {
            0 => Condition::NotZero,
            1 => Condition::Zero,
            2 => Condition::NoCarry,
            3 => Condition::Carry,
            4 => Condition::ParityOdd,
            5 => Condition::ParityEven,
            6 => Condition::Plus,
            _ => Condition::Minus,
        }
    }

    /// Mnemonic suffix, e.g. `NZ` in `JNZ`.
    pub fn suffix(&self) -> &'static str {
        match *self {
            Condition::NotZero => "NZ",
            Condition::Zero => "Z",
            Condition::NoCarry => "NC",
            Condition::Carry => "C",
            Condition::ParityOdd => "PO",
            Condition::ParityEven => "PE",
            Condition::Plus => "P",
            Condition::Minus => "M",
        }
    }
}

/// A decoded instruction together with its immediate data.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum OpCode {
    Nop,
    Hlt,

    // Data transfer
    Mov(Operand, Operand),
    Mvi(Operand, u8),
    Lxi(Reg16, u16),
    Lda(u16),
    Sta(u16),
    Lhld(u16),
    Shld(u16),
    Ldax(Reg16),
    Stax(Reg16),
    Xchg,

    // Arithmetic
    Add(Operand),
    Adc(Operand),
    Sub(Operand),
    Sbb(Operand),
    Adi(u8),
    Aci(u8),
    Sui(u8),
    Sbi(u8),
    Inr(Operand),
    Dcr(Operand),
    Inx(Reg16),
    Dcx(Reg16),
    Dad(Reg16),
    Daa,

    // Logical
    Ana(Operand),
    Xra(Operand),
    Ora(Operand),
    Cmp(Operand),
    Ani(u8),
    Xri(u8),
    Ori(u8),
    Cpi(u8),
    Rlc,
    Rrc,
    Ral,
    Rar,
    Cma,
    Cmc,
    Stc,

    // Branch
    Jmp(u16),
    Jcc(Condition, u16),
    Call(u16),
    Ccc(Condition, u16),
    Ret,
    Rcc(Condition),
    Rst(u8),
    Pchl,

    // Stack, I/O and machine control
    Push(Reg16),
    PushPsw,
    Pop(Reg16),
    PopPsw,
    Xthl,
    Sphl,
    In(u8),
    Out(u8),
    Ei,
    Di,
}

impl OpCode {
    /// Encoded length in bytes, opcode included.
    pub fn size(&self) -> u16 {
        match *self {
            Lxi(_, _)
            | Lda(_)
            | Sta(_)
            | Lhld(_)
            | Shld(_)
            | Jmp(_)
            | Jcc(_, _)
            | Call(_)
            | Ccc(_, _) => 3,
            Mvi(_, _)
            | Adi(_)
            | Aci(_)
            | Sui(_)
            | Sbi(_)
            | Ani(_)
            | Xri(_)
            | Ori(_)
            | Cpi(_)
            | In(_)
            | Out(_) => 2,
            _ => 1,
        }
    }
}

impl Display for OpCode {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            Nop => write!(f, "NOP"),
            Hlt => write!(f, "HLT"),

            Mov(dst, src) => write!(f, "MOV {},{}", dst, src),
            Mvi(dst, v) => write!(f, "MVI {},${:02x}", dst, v),
            Lxi(reg, v) => write!(f, "LXI {},${:04x}", reg, v),
            Lda(adr) => write!(f, "LDA ${:04x}", adr),
            Sta(adr) => write!(f, "STA ${:04x}", adr),
            Lhld(adr) => write!(f, "LHLD ${:04x}", adr),
            Shld(adr) => write!(f, "SHLD ${:04x}", adr),
            Ldax(reg) => write!(f, "LDAX {}", reg),
            Stax(reg) => write!(f, "STAX {}", reg),
            Xchg => write!(f, "XCHG"),

            Add(src) => write!(f, "ADD {}", src),
            Adc(src) => write!(f, "ADC {}", src),
            Sub(src) => write!(f, "SUB {}", src),
            Sbb(src) => write!(f, "SBB {}", src),
            Adi(v) => write!(f, "ADI ${:02x}", v),
            Aci(v) => write!(f, "ACI ${:02x}", v),
            Sui(v) => write!(f, "SUI ${:02x}", v),
            Sbi(v) => write!(f, "SBI ${:02x}", v),
            Inr(dst) => write!(f, "INR {}", dst),
            Dcr(dst) => write!(f, "DCR {}", dst),
            Inx(reg) => write!(f, "INX {}", reg),
            Dcx(reg) => write!(f, "DCX {}", reg),
            Dad(reg) => write!(f, "DAD {}", reg),
            Daa => write!(f, "DAA"),

            Ana(src) => write!(f, "ANA {}", src),
            Xra(src) => write!(f, "XRA {}", src),
            Ora(src) => write!(f, "ORA {}", src),
            Cmp(src) => write!(f, "CMP {}", src),
            Ani(v) => write!(f, "ANI ${:02x}", v),
            Xri(v) => write!(f, "XRI ${:02x}", v),
            Ori(v) => write!(f, "ORI ${:02x}", v),
            Cpi(v) => write!(f, "CPI ${:02x}", v),
            Rlc => write!(f, "RLC"),
            Rrc => write!(f, "RRC"),
            Ral => write!(f, "RAL"),
            Rar => write!(f, "RAR"),
            Cma => write!(f, "CMA"),
            Cmc => write!(f, "CMC"),
            Stc => write!(f, "STC"),

            Jmp(adr) => write!(f, "JMP ${:04x}", adr),
            Jcc(cond, adr) => write!(f, "J{} ${:04x}", cond.suffix(), adr),
            Call(adr) => write!(f, "CALL ${:04x}", adr),
            Ccc(cond, adr) => write!(f, "C{} ${:04x}", cond.suffix(), adr),
            Ret => write!(f, "RET"),
            Rcc(cond) => write!(f, "R{}", cond.suffix()),
            Rst(n) => write!(f, "RST {}", n),
            Pchl => write!(f, "PCHL"),

            Push(reg) => write!(f, "PUSH {}", reg),
            PushPsw => write!(f, "PUSH PSW"),
            Pop(reg) => write!(f, "POP {}", reg),
            PopPsw => write!(f, "POP PSW"),
            Xthl => write!(f, "XTHL"),
            Sphl => write!(f, "SPHL"),
            In(port) => write!(f, "IN ${:02x}", port),
            Out(port) => write!(f, "OUT ${:02x}", port),
            Ei => write!(f, "EI"),
            Di => write!(f, "DI"),
        }
    }
}
