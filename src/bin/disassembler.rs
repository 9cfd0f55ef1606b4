/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::fs::File;
use std::io;
use std::process;

use intel8080::opcode::OpCodes;

fn main() {
    let path = match std::env::args().nth(1) {
        Some(path) => path,
        None => {
            eprintln!("usage: disassembler <file>");
            process::exit(1);
        }
    };

    let input = match File::open(&path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("{}: {}", path, e);
            process::exit(1);
        }
    };

    let mut addr: u16 = 0;
    for op_code in OpCodes::new(io::BufReader::new(input)) {
        match op_code {
            Ok(op_code) => {
                println!("0x{:04x} - {}", addr, op_code);
                addr = addr.wrapping_add(op_code.size());
            }
            Err(e) => {
                eprintln!("0x{:04x} - {}", addr, e);
                process::exit(1);
            }
        }
    }
}
