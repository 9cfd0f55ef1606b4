/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

mod opcodes;
pub use self::opcodes::Condition;
pub use self::opcodes::OpCode;
pub use self::opcodes::Operand;
pub use self::opcodes::Reg16;
pub use self::opcodes::Register;

use std::error::Error;
use std::fmt;
use std::io::{self, Read};

use self::opcodes::OpCode::*;

/// Decodes the instruction starting with `opcode`.
///
/// Immediate data is pulled through `next_byte`, which is called once per operand byte in
/// address order. Every byte value decodes to an instruction: the undocumented encodings are
/// aliases of `NOP`, `JMP`, `RET` and `CALL`.
pub fn decode<F: FnMut() -> u8>(opcode: u8, mut next_byte: F) -> OpCode {
    let dst = Operand::from_bits(opcode >> 3);
    let src = Operand::from_bits(opcode);
    let pair = Reg16::from_bits(opcode >> 4);
    let cond = Condition::from_bits(opcode >> 3);

    match opcode {
        0x00 | 0x08 | 0x10 | 0x18 | 0x20 | 0x28 | 0x30 | 0x38 => Nop,

        0x01 | 0x11 | 0x21 | 0x31 => Lxi(pair, next_word(&mut next_byte)),
        0x02 | 0x12 => Stax(pair),
        0x0a | 0x1a => Ldax(pair),
        0x22 => Shld(next_word(&mut next_byte)),
        0x2a => Lhld(next_word(&mut next_byte)),
        0x32 => Sta(next_word(&mut next_byte)),
        0x3a => Lda(next_word(&mut next_byte)),
        0x03 | 0x13 | 0x23 | 0x33 => Inx(pair),
        0x0b | 0x1b | 0x2b | 0x3b => Dcx(pair),
        0x09 | 0x19 | 0x29 | 0x39 => Dad(pair),

        0x04 | 0x0c | 0x14 | 0x1c | 0x24 | 0x2c | 0x34 | 0x3c => Inr(dst),
        0x05 | 0x0d | 0x15 | 0x1d | 0x25 | 0x2d | 0x35 | 0x3d => Dcr(dst),
        0x06 | 0x0e | 0x16 | 0x1e | 0x26 | 0x2e | 0x36 | 0x3e => Mvi(dst, next_byte()),

        0x07 => Rlc,
        0x0f => Rrc,
        0x17 => Ral,
        0x1f => Rar,
        0x27 => Daa,
        0x2f => Cma,
        0x37 => Stc,
        0x3f => Cmc,

        // MOV M,M is where HLT lives
        0x76 => Hlt,
        0x40..=0x75 | 0x77..=0x7f => Mov(dst, src),

        0x80..=0x87 => Add(src),
        0x88..=0x8f => Adc(src),
        0x90..=0x97 => Sub(src),
        0x98..=0x9f => Sbb(src),
        0xa0..=0xa7 => Ana(src),
        0xa8..=0xaf => Xra(src),
        0xb0..=0xb7 => Ora(src),
        0xb8..=0xbf => Cmp(src),

        0xc0 | 0xc8 | 0xd0 | 0xd8 | 0xe0 | 0xe8 | 0xf0 | 0xf8 => Rcc(cond),
        0xc2 | 0xca | 0xd2 | 0xda | 0xe2 | 0xea | 0xf2 | 0xfa => {
            Jcc(cond, next_word(&mut next_byte))
        }
        0xc4 | 0xcc | 0xd4 | 0xdc | 0xe4 | 0xec | 0xf4 | 0xfc => {
            Ccc(cond, next_word(&mut next_byte))
        }
        0xc7 | 0xcf | 0xd7 | 0xdf | 0xe7 | 0xef | 0xf7 | 0xff => Rst((opcode >> 3) & 0x07),

        0xc3 | 0xcb => Jmp(next_word(&mut next_byte)),
        0xc9 | 0xd9 => Ret,
        0xcd | 0xdd | 0xed | 0xfd => Call(next_word(&mut next_byte)),

        0xc1 | 0xd1 | 0xe1 => Pop(pair),
        0xf1 => PopPsw,
        0xc5 | 0xd5 | 0xe5 => Push(pair),
        0xf5 => PushPsw,

        0xc6 => Adi(next_byte()),
        0xce => Aci(next_byte()),
        0xd6 => Sui(next_byte()),
        0xde => Sbi(next_byte()),
        0xe6 => Ani(next_byte()),
        0xee => Xri(next_byte()),
        0xf6 => Ori(next_byte()),
        0xfe => Cpi(next_byte()),

        0xd3 => Out(next_byte()),
        0xdb => In(next_byte()),
        0xe3 => Xthl,
        0xe9 => Pchl,
        0xeb => Xchg,
        0xf3 => Di,
        0xf9 => Sphl,
        0xfb => Ei,
    }
}

/// Little-endian word from the next two bytes.
fn next_word<F: FnMut() -> u8>(next_byte: &mut F) -> u16 {
    let low = next_byte();
    let high = next_byte();
    ((high as u16) << 8) | low as u16
}

/// Encoded length of the instruction starting with `opcode`.
pub fn instruction_size(opcode: u8) -> u16 {
    decode(opcode, || 0).size()
}

/// Read a slice of bytes and returns an opcode, possibly with its data.
///
/// The parsing fails if the slice is shorter than the instruction it starts.
pub fn read_opcode(bytes: &[u8]) -> Result<OpCode, UnexpectedEndOfInput> {
    let (&opcode, data) = bytes.split_first().ok_or(UnexpectedEndOfInput)?;
    if bytes.len() < instruction_size(opcode) as usize {
        return Err(UnexpectedEndOfInput);
    }
    let mut data = data.iter().copied();
    Ok(decode(opcode, || data.next().unwrap_or(0)))
}

/// Iterator over the instructions of a raw program image.
///
/// Iteration stops after the first error.
pub struct OpCodes<R: Read> {
    reader: R,
    failed: bool,
}

impl<R: Read> OpCodes<R> {
    pub fn new(reader: R) -> OpCodes<R> {
        OpCodes { reader, failed: false }
    }
}

impl<R: Read> Iterator for OpCodes<R> {
    type Item = Result<OpCode, UnexpectedEndOfInput>;

    fn next(&mut self) -> Option<Result<OpCode, UnexpectedEndOfInput>> {
        if self.failed {
            return None;
        }

        let mut bytes = [0; 3];
        match self.reader.read_exact(&mut bytes[..1]) {
            Ok(()) => {}
            Err(ref e) if e.kind() == io::ErrorKind::UnexpectedEof => return None,
            Err(_) => {
                self.failed = true;
                return Some(Err(UnexpectedEndOfInput));
            }
        }

        let size = instruction_size(bytes[0]) as usize;
        let result = self
            .reader
            .read_exact(&mut bytes[1..size])
            .map_err(|_| UnexpectedEndOfInput)
            .and_then(|()| read_opcode(&bytes[..size]));
        self.failed = result.is_err();
        Some(result)
    }
}

/// The byte source ended in the middle of an instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnexpectedEndOfInput;

impl fmt::Display for UnexpectedEndOfInput {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unexpected end of input")
    }
}

impl Error for UnexpectedEndOfInput {}
