use vmx_asm::{op, regs};
use vmx_vm::prelude::*;
use vmx_vm::util::{boot_code, vmx_v1};

#[test]
fn unassigned_opcode_reports_the_header_byte() {
    let err = boot_code(&vmx_v1(&[0x09])).unwrap().run().unwrap_err();
    assert_eq!(err.fault(), Some(Fault::InvalidOpcode(0x09)));
    assert_eq!(err.to_string(), "invalid instruction OPC=09");
}

#[test]
fn truncated_operand_bytes_fail_the_fetch() {
    // MOV header promising an immediate B that is cut off by the segment
    // end.
    let err = boot_code(&vmx_v1(&[0x90, 0x00]))
        .unwrap()
        .run()
        .unwrap_err();
    assert_eq!(err.fault(), Some(Fault::InvalidFetch));
    assert_eq!(err.to_string(), "invalid instruction");
}

#[test]
fn reserved_cell_size_faults_at_decode() {
    // A memory operand with the reserved 01 cell-size bits.
    let err = boot_code(&vmx_v1(&[0x70, 0x0A, 0x4B, 0x00, 0x00]))
        .unwrap()
        .run()
        .unwrap_err();
    assert_eq!(err.fault(), Some(Fault::InvalidOpcode(0x70)));
}

#[test]
fn decode_exposes_operand_descriptors() {
    // OP1/OP2 are rewritten by every decode, so an instruction reading
    // them sees its own descriptors: MOV EAX, OP1 observes A = register
    // EAX (0x0A); MOV EBX, OP2 observes B = register OP2 (0x06).
    let code = op::assemble([
        op::mov(op::reg(regs::EAX), op::reg(regs::OP1)),
        op::mov(op::reg(regs::EBX), op::reg(regs::OP2)),
        op::stop(),
    ]);
    let mut vm = boot_code(&vmx_v1(&code)).unwrap();
    vm.run().unwrap();

    assert_eq!(vm.register(regs::EAX), 0x0100_000A);
    assert_eq!(vm.register(regs::EBX), 0x0100_0006);
    // The last decode was the STOP.
    assert_eq!(vm.register(regs::OPC), 0x0F);
}
