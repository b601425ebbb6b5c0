use rstest::rstest;
use vmx_asm::{op, regs};
use vmx_vm::prelude::*;
use vmx_vm::util::{boot_code, vmx_v1};

fn run(code: Vec<u8>) -> Interpreter<ScriptedConsole> {
    let mut vm = boot_code(&vmx_v1(&code)).unwrap();
    vm.run().unwrap();
    vm
}

#[test]
fn sub_from_itself_sets_the_zero_flag() {
    let vm = run(op::assemble([
        op::mov(op::reg(regs::EAX), op::imm(5)),
        op::sub(op::reg(regs::EAX), op::reg(regs::EAX)),
        op::stop(),
    ]));
    assert_eq!(vm.register(regs::CC), 0x4000_0000);
    assert_eq!(vm.register(regs::EAX), 0);
}

#[test]
fn negative_result_sets_the_sign_flag() {
    let vm = run(op::assemble([
        op::mov(op::reg(regs::EAX), op::imm(-1)),
        op::add(op::reg(regs::EAX), op::imm(0)),
        op::stop(),
    ]));
    assert_eq!(vm.register(regs::CC), 0x8000_0000);
    assert_eq!(vm.register(regs::EAX), 0xFFFF_FFFF);
}

#[test]
fn division_by_zero_is_fatal() {
    let code = op::assemble([
        op::mov(op::reg(regs::EAX), op::imm(5)),
        op::mov(op::reg(regs::EBX), op::imm(0)),
        op::div(op::reg(regs::EAX), op::reg(regs::EBX)),
        op::stop(),
    ]);
    let err = boot_code(&vmx_v1(&code)).unwrap().run().unwrap_err();
    assert_eq!(err.fault(), Some(Fault::DivisionByZero));
    assert_eq!(err.to_string(), "division by zero");
}

#[rstest]
#[case(7, 2, 3, 1)]
#[case(-7, 2, -4, 1)]
#[case(7, -2, -4, -1)]
#[case(-7, -2, 3, -1)]
fn division_floors_the_quotient(
    #[case] a: i16,
    #[case] b: i16,
    #[case] quotient: i32,
    #[case] remainder: i32,
) {
    let vm = run(op::assemble([
        op::mov(op::reg(regs::EAX), op::imm(a)),
        op::div(op::reg(regs::EAX), op::imm(b)),
        op::stop(),
    ]));
    assert_eq!(vm.register(regs::EAX), quotient as u32);
    assert_eq!(vm.register(regs::AC), remainder as u32);
}

#[test]
fn mul_keeps_the_low_32_bits() {
    // EAX = 1 << 16, squared: the 64-bit product overflows to zero.
    let vm = run(op::assemble([
        op::ldh(op::reg(regs::EAX), op::imm(1)),
        op::mul(op::reg(regs::EAX), op::reg(regs::EAX)),
        op::stop(),
    ]));
    assert_eq!(vm.register(regs::EAX), 0);
    assert_eq!(vm.register(regs::CC), 0x4000_0000);
}

#[test]
fn cmp_sets_flags_without_writing() {
    let vm = run(op::assemble([
        op::mov(op::reg(regs::EAX), op::imm(3)),
        op::cmp(op::reg(regs::EAX), op::imm(5)),
        op::stop(),
    ]));
    assert_eq!(vm.register(regs::EAX), 3);
    assert_eq!(vm.register(regs::CC), 0x8000_0000);
}

#[test]
fn shifts() {
    let vm = run(op::assemble([
        op::mov(op::reg(regs::EAX), op::imm(-8)),
        op::sar(op::reg(regs::EAX), op::imm(1)),
        op::mov(op::reg(regs::EBX), op::imm(-8)),
        op::shr(op::reg(regs::EBX), op::imm(1)),
        op::mov(op::reg(regs::ECX), op::imm(1)),
        op::shl(op::reg(regs::ECX), op::imm(33)), // count masked to 1
        op::stop(),
    ]));
    assert_eq!(vm.register(regs::EAX), 0xFFFF_FFFC);
    assert_eq!(vm.register(regs::EBX), 0x7FFF_FFFC);
    assert_eq!(vm.register(regs::ECX), 2);
}

#[test]
fn bitwise_ops_set_flags() {
    let vm = run(op::assemble([
        op::mov(op::reg(regs::EAX), op::imm(0x0F0F)),
        op::and(op::reg(regs::EAX), op::imm(0x00F0)),
        op::stop(),
    ]));
    assert_eq!(vm.register(regs::EAX), 0);
    assert_eq!(vm.register(regs::CC), 0x4000_0000);

    let vm = run(op::assemble([
        op::mov(op::reg(regs::EAX), op::imm(0x0F00)),
        op::or(op::reg(regs::EAX), op::imm(0x00F0)),
        op::xor(op::reg(regs::EAX), op::imm(0x0FF0)),
        op::stop(),
    ]));
    assert_eq!(vm.register(regs::EAX), 0);
}

#[test]
fn not_inverts_in_place() {
    let vm = run(op::assemble([
        op::not(op::reg(regs::EAX)),
        op::stop(),
    ]));
    assert_eq!(vm.register(regs::EAX), 0xFFFF_FFFF);
    assert_eq!(vm.register(regs::CC), 0x8000_0000);
}

#[test]
fn ldl_ldh_compose_a_word() {
    let vm = run(op::assemble([
        op::ldh(op::reg(regs::EAX), op::imm(0x1234)),
        op::ldl(op::reg(regs::EAX), op::imm(0x5678)),
        op::stop(),
    ]));
    assert_eq!(vm.register(regs::EAX), 0x1234_5678);
}

#[test]
fn swap_exchanges_register_values() {
    let vm = run(op::assemble([
        op::mov(op::reg(regs::EAX), op::imm(1)),
        op::mov(op::reg(regs::EBX), op::imm(2)),
        op::swap(op::reg(regs::EAX), op::reg(regs::EBX)),
        op::stop(),
    ]));
    assert_eq!(vm.register(regs::EAX), 2);
    assert_eq!(vm.register(regs::EBX), 1);
}

#[test]
fn swap_with_an_immediate_faults() {
    let code = op::assemble([
        op::swap(op::reg(regs::EAX), op::imm(1)),
        op::stop(),
    ]);
    let err = boot_code(&vmx_v1(&code)).unwrap().run().unwrap_err();
    assert_eq!(err.fault(), Some(Fault::InvalidOperand));
}

#[test]
fn rnd_stays_below_the_limit_and_sets_flags() {
    let vm = run(op::assemble([
        op::rnd(op::reg(regs::EAX), op::imm(100)),
        op::stop(),
    ]));
    assert!(vm.register(regs::EAX) < 100);

    let vm = run(op::assemble([
        op::rnd(op::reg(regs::EAX), op::imm(0)),
        op::stop(),
    ]));
    assert_eq!(vm.register(regs::EAX), 0);
    assert_eq!(vm.register(regs::CC), 0x4000_0000);
}
