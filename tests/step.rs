/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use intel8080::proc_state::{new_memory, DataBus, Flags, PortHandlers, Proc8080};

struct DummyBus {}

impl DataBus for DummyBus {
    fn read_port(&mut self, _port: u8) -> u8 {
        0
    }

    fn write_port(&mut self, _port: u8, _value: u8) {}
}

fn proc_with(program: &[u8]) -> Proc8080<DummyBus> {
    let mut proc8080 = Proc8080::new(new_memory(), DummyBus {});
    proc8080.load(0x0000, program);
    proc8080
}

fn run(proc8080: &mut Proc8080<DummyBus>, steps: usize) {
    for _ in 0..steps {
        proc8080.step();
    }
}

#[test]
fn lhld_loads_hl_without_touching_flags() {
    let mut proc8080 = proc_with(&[0x2a, 0x5b, 0x02]);
    proc8080.load(0x025b, &[0xff, 0x03]);
    let flags = Flags { s: true, cy: true, ..Default::default() };
    *proc8080.flags_mut() = flags;

    proc8080.step();

    assert_eq!(proc8080.registers().hl(), 0x03ff);
    assert_eq!(*proc8080.flags(), flags);
    assert_eq!(proc8080.pc(), 0x0003);
}

#[test]
fn lxi_fills_the_pair_high_then_low() {
    let mut proc8080 = proc_with(&[0x01, 0x34, 0x12]);
    proc8080.step();
    assert_eq!(proc8080.registers().b, 0x12);
    assert_eq!(proc8080.registers().c, 0x34);
}

#[test]
fn interrupt_wakes_a_halted_processor() {
    let mut proc8080 = proc_with(&[0x76]);
    proc8080.registers_mut().sp = 0x1000;
    proc8080.step();
    assert!(proc8080.is_halted());
    let pc_at_interrupt = proc8080.pc();

    // a halted processor stays put
    proc8080.step();
    assert_eq!(proc8080.pc(), pc_at_interrupt);

    proc8080.interrupt(0xc7);
    assert!(proc8080.interrupt_pending());
    proc8080.step();

    assert!(!proc8080.is_halted());
    assert!(!proc8080.interrupt_pending());
    assert_eq!(proc8080.pc(), 0x0000);
    assert_eq!(proc8080.sp(), 0x0ffe);
    assert_eq!(proc8080.at_sp(), pc_at_interrupt);
}

#[test]
fn interrupt_disables_interrupts() {
    // EI ; NOP ; NOP
    let mut proc8080 = proc_with(&[0xfb, 0x00, 0x00]);
    proc8080.registers_mut().sp = 0x1000;
    proc8080.step();
    assert!(proc8080.interrupts_enabled());

    proc8080.interrupt(0xcf);
    assert!(!proc8080.interrupts_enabled());
    proc8080.step();

    assert_eq!(proc8080.pc(), 0x0008);
    assert_eq!(proc8080.at_sp(), 0x0001);
    assert!(!proc8080.interrupts_enabled());
}

#[test]
fn interrupt_vector_takes_its_operand_from_pc() {
    let mut proc8080 = proc_with(&[]);
    proc8080.registers_mut().sp = 0x1000;
    proc8080.set_pc(0x0200);
    proc8080.load(0x0200, &[0x00, 0x03]);

    proc8080.interrupt(0xcd); // CALL $0300
    proc8080.step();

    assert_eq!(proc8080.pc(), 0x0300);
    assert_eq!(proc8080.at_sp(), 0x0202);
}

#[test]
fn latest_interrupt_wins() {
    let mut proc8080 = proc_with(&[]);
    proc8080.registers_mut().sp = 0x1000;
    proc8080.interrupt(0xc7);
    proc8080.interrupt(0xff);
    proc8080.step();
    assert_eq!(proc8080.pc(), 0x0038);
}

#[test]
fn call_then_ret_resumes_after_the_operand() {
    // LXI SP,$2000 ; CALL $0010 ; HLT
    let mut proc8080 = proc_with(&[0x31, 0x00, 0x20, 0xcd, 0x10, 0x00, 0x76]);
    proc8080.load(0x0010, &[0xc9]);

    run(&mut proc8080, 2);
    assert_eq!(proc8080.pc(), 0x0010);
    assert_eq!(proc8080.sp(), 0x1ffe);

    proc8080.step();
    assert_eq!(proc8080.pc(), 0x0006);
    assert_eq!(proc8080.sp(), 0x2000);

    proc8080.step();
    assert!(proc8080.is_halted());
}

#[test]
fn conditional_call_not_taken_skips_the_operand() {
    // XRA A ; CNZ $1234 ; NOP
    let mut proc8080 = proc_with(&[0xaf, 0xc4, 0x34, 0x12, 0x00]);
    proc8080.registers_mut().sp = 0x1000;
    run(&mut proc8080, 2);
    assert_eq!(proc8080.pc(), 0x0004);
    assert_eq!(proc8080.sp(), 0x1000);
}

#[test]
fn push_pop_restores_pairs() {
    // LXI SP,$1000 ; LXI B,$beef ; PUSH B ; LXI B,$0000 ; POP B
    let mut proc8080 = proc_with(&[0x31, 0x00, 0x10, 0x01, 0xef, 0xbe, 0xc5, 0x01, 0x00, 0x00, 0xc1]);
    run(&mut proc8080, 5);
    assert_eq!(proc8080.registers().bc(), 0xbeef);
    assert_eq!(proc8080.sp(), 0x1000);
}

#[test]
fn pop_psw_forces_the_constant_flag_bits() {
    // LXI SP,$1000 ; LXI H,$12ff ; PUSH H ; POP PSW ; PUSH PSW ; POP B
    let mut proc8080 = proc_with(&[0x31, 0x00, 0x10, 0x21, 0xff, 0x12, 0xe5, 0xf1, 0xf5, 0xc1]);
    run(&mut proc8080, 6);
    assert_eq!(proc8080.registers().a, 0x12);
    assert_eq!(proc8080.registers().b, 0x12);
    assert_eq!(proc8080.registers().c, 0xd7);
    assert_eq!(proc8080.psw(), 0x12d7);
}

#[test]
fn inr_and_dcr_leave_carry_alone() {
    // STC ; MVI A,$ff ; INR A
    let mut proc8080 = proc_with(&[0x37, 0x3e, 0xff, 0x3c]);
    run(&mut proc8080, 3);
    let flags = *proc8080.flags();
    assert_eq!(proc8080.registers().a, 0x00);
    assert!(flags.z);
    assert!(flags.ac);
    assert!(!flags.s);
    assert!(flags.cy);

    // MVI B,$00 ; DCR B
    let mut proc8080 = proc_with(&[0x06, 0x00, 0x05]);
    run(&mut proc8080, 2);
    let flags = *proc8080.flags();
    assert_eq!(proc8080.registers().b, 0xff);
    assert!(flags.s);
    assert!(flags.ac);
    assert!(!flags.z);
    assert!(!flags.cy);
}

#[test]
fn decimal_adjust() {
    // MVI A,$9a ; DAA
    let mut proc8080 = proc_with(&[0x3e, 0x9a, 0x27]);
    run(&mut proc8080, 2);
    let flags = *proc8080.flags();
    assert_eq!(proc8080.registers().a, 0x00);
    assert!(flags.cy);
    assert!(flags.ac);
    assert!(flags.z);
}

#[test]
fn xchg_swaps_without_flags() {
    // LXI H,$1234 ; LXI D,$abcd ; STC ; XCHG
    let mut proc8080 = proc_with(&[0x21, 0x34, 0x12, 0x11, 0xcd, 0xab, 0x37, 0xeb]);
    run(&mut proc8080, 3);
    let flags = *proc8080.flags();
    proc8080.step();
    assert_eq!(proc8080.registers().hl(), 0xabcd);
    assert_eq!(proc8080.registers().de(), 0x1234);
    assert_eq!(*proc8080.flags(), flags);
}

#[test]
fn parity_follows_the_bit_count() {
    // MVI A,$03 ; ORA A ; MVI A,$01 ; ORA A
    let mut proc8080 = proc_with(&[0x3e, 0x03, 0xb7, 0x3e, 0x01, 0xb7]);
    run(&mut proc8080, 2);
    assert!(proc8080.flags().p);
    run(&mut proc8080, 2);
    assert!(!proc8080.flags().p);
}

#[test]
fn undocumented_opcodes_alias_documented_ones() {
    let mut proc8080 = proc_with(&[0x08, 0xcb, 0x10, 0x00]);
    proc8080.registers_mut().sp = 0x1000;
    // 0010: 0xdd CALL $0020 ; 0020: 0xd9 RET
    proc8080.load(0x0010, &[0xdd, 0x20, 0x00]);
    proc8080.load(0x0020, &[0xd9]);

    proc8080.step();
    assert_eq!(proc8080.pc(), 0x0001);
    proc8080.step();
    assert_eq!(proc8080.pc(), 0x0010);
    proc8080.step();
    assert_eq!(proc8080.pc(), 0x0020);
    assert_eq!(proc8080.at_sp(), 0x0013);
    proc8080.step();
    assert_eq!(proc8080.pc(), 0x0013);
    assert_eq!(proc8080.sp(), 0x1000);
}

#[test]
fn program_counter_wraps() {
    let mut proc8080 = proc_with(&[]);
    proc8080.set_pc(0xffff);
    proc8080.step();
    assert_eq!(proc8080.pc(), 0x0000);

    // JMP split across the top of memory
    proc8080.load(0xfffe, &[0xc3, 0x34, 0x12]);
    proc8080.set_pc(0xfffe);
    proc8080.step();
    assert_eq!(proc8080.pc(), 0x1234);
}

#[test]
fn stack_wraps() {
    // LXI SP,$0001 ; LXI B,$beef ; PUSH B
    let mut proc8080 = proc_with(&[0x31, 0x01, 0x00, 0x01, 0xef, 0xbe, 0xc5]);
    run(&mut proc8080, 3);
    assert_eq!(proc8080.sp(), 0xffff);
    assert_eq!(proc8080.read_byte(0xffff), 0xef);
    assert_eq!(proc8080.read_byte(0x0000), 0xbe);
}

#[test]
fn ports_reach_the_bus() {
    let mut sent = Vec::new();
    let mut proc8080 = Proc8080::new(
        new_memory(),
        PortHandlers::new(|port| port ^ 0xff, |port, value| sent.push((port, value))),
    );
    // IN $0f ; OUT $10 ; INR A ; OUT $11
    proc8080.load(0x0000, &[0xdb, 0x0f, 0xd3, 0x10, 0x3c, 0xd3, 0x11]);
    for _ in 0..4 {
        proc8080.step();
    }
    drop(proc8080);
    assert_eq!(sent, vec![(0x10, 0xf0), (0x11, 0xf1)]);
}

#[test]
fn caller_keeps_ownership_of_borrowed_memory() {
    let mut ram = new_memory();
    ram[0x0000] = 0x3e; // MVI A,$42
    ram[0x0001] = 0x42;
    ram[0x0002] = 0x32; // STA $0100
    ram[0x0003] = 0x00;
    ram[0x0004] = 0x01;

    let mut proc8080 = Proc8080::new(&mut *ram, DummyBus {});
    proc8080.step();
    proc8080.step();
    let (_, _bus) = proc8080.into_parts();

    assert_eq!(ram[0x0100], 0x42);
}
