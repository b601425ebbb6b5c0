use vmx_asm::{op, regs};
use vmx_vm::prelude::*;
use vmx_vm::util::{boot_code, ImageBuilder};

fn sample_vm() -> Interpreter<ScriptedConsole> {
    let code = op::assemble([
        op::mov(op::reg(regs::EAX), op::imm(0x1234)),
        op::mov(op::mem(regs::DS, 0, CellSize::Word), op::reg(regs::EAX)),
        op::stop(),
    ]);
    let image = ImageBuilder::new(code).data(0x20).stack(0x20).build();
    let mut vm = boot_code(&image).unwrap();
    vm.run().unwrap();
    vm
}

#[test]
fn snapshot_header_layout() {
    let vm = sample_vm();
    let bytes = vm.snapshot_bytes();

    assert_eq!(&bytes[..5], b"VMI25");
    assert_eq!(bytes[5], 1);
    assert_eq!(u16::from_be_bytes([bytes[6], bytes[7]]), 16);
    // Header + 32 registers + 8 descriptors + RAM.
    assert_eq!(bytes.len(), 8 + 32 * 4 + 8 * 4 + 16 * 1024);
}

#[test]
fn snapshot_round_trip_restores_everything() {
    let vm = sample_vm();
    let bytes = vm.snapshot_bytes();

    let mut restored = Interpreter::<ScriptedConsole>::default();
    restored.restore_bytes(&bytes).unwrap();

    assert_eq!(restored.registers(), vm.registers());
    assert_eq!(restored.segments(), vm.segments());
    assert_eq!(restored.ram(), vm.ram());
    assert_eq!(restored.segment_map(), vm.segment_map());
}

#[test]
fn restored_machine_reports_the_halted_ip() {
    let vm = sample_vm();
    let mut restored = Interpreter::<ScriptedConsole>::default();
    restored.restore_bytes(&vm.snapshot_bytes()).unwrap();

    // The snapshot was taken after STOP: the machine stays halted.
    assert_eq!(restored.register(regs::IP), 0xFFFF_FFFF);
    restored.run().unwrap();
}

#[test]
fn kind_indices_are_rederived_from_segment_registers() {
    let vm = sample_vm();
    let mut restored = Interpreter::<ScriptedConsole>::default();
    restored.restore_bytes(&vm.snapshot_bytes()).unwrap();

    let map = restored.segment_map();
    assert_eq!(map.slot(SegmentKind::Code), Some(0));
    assert_eq!(map.slot(SegmentKind::Data), Some(1));
    assert_eq!(map.slot(SegmentKind::Stack), Some(2));
    assert_eq!(map.slot(SegmentKind::Param), None);
    assert_eq!(map.slot(SegmentKind::Const), None);
}

#[test]
fn malformed_snapshots_are_rejected() {
    let mut vm = Interpreter::<ScriptedConsole>::default();

    assert!(matches!(
        vm.restore_bytes(b"VMJ25\x01"),
        Err(ImageError::BadMagic)
    ));
    assert!(matches!(
        vm.restore_bytes(b"VMI25\x02"),
        Err(ImageError::UnsupportedVersion(2))
    ));
    assert!(matches!(
        vm.restore_bytes(b"VMI25\x01\x00\x00"),
        Err(ImageError::BadRamSize)
    ));
    // Declares 16 KiB but carries no RAM.
    assert!(matches!(
        vm.restore_bytes(b"VMI25\x01\x00\x10"),
        Err(ImageError::TruncatedSnapshot)
    ));
}

#[test]
fn segments_outside_ram_are_rejected() {
    let vm = sample_vm();
    let mut bytes = vm.snapshot_bytes();
    // Corrupt the first descriptor: base at the very end of RAM plus a
    // nonzero size.
    let seg0 = 8 + 32 * 4;
    bytes[seg0..seg0 + 2].copy_from_slice(&0xFFF0u16.to_be_bytes());
    bytes[seg0 + 2..seg0 + 4].copy_from_slice(&0x0100u16.to_be_bytes());

    let mut restored = Interpreter::<ScriptedConsole>::default();
    assert!(matches!(
        restored.restore_bytes(&bytes),
        Err(ImageError::OutOfMemory)
    ));
}
