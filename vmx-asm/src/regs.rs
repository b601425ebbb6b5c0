//! Register file layout shared by the assembler and the interpreter.

use crate::Sector;

/// Index into the 32-entry register file.
pub type RegisterId = usize;

/// Register count for bounds checking.
pub const VM_REGISTER_COUNT: usize = 32;

/// Last logical address used by a data access.
pub const LAR: RegisterId = 0x00;

/// `(nbytes << 16) | physical` of the last data access.
pub const MAR: RegisterId = 0x01;

/// Value moved by the last data access, zero-extended.
pub const MBR: RegisterId = 0x02;

/// Instruction pointer, a logical `(segment, offset)` pair.
pub const IP: RegisterId = 0x03;

/// Opcode of the instruction being executed.
pub const OPC: RegisterId = 0x04;

/// Descriptor of operand A.
pub const OP1: RegisterId = 0x05;

/// Descriptor of operand B.
pub const OP2: RegisterId = 0x06;

/// Stack pointer (logical).
pub const SP: RegisterId = 0x07;

/// Base pointer (logical).
pub const BP: RegisterId = 0x08;

/// General-purpose accumulator.
pub const EAX: RegisterId = 0x0A;

/// General-purpose register.
pub const EBX: RegisterId = 0x0B;

/// General-purpose register; holds `(cell << 16) | count` for I/O traps.
pub const ECX: RegisterId = 0x0C;

/// General-purpose register; holds the buffer pointer for I/O traps.
pub const EDX: RegisterId = 0x0D;

/// General-purpose register.
pub const EEX: RegisterId = 0x0E;

/// General-purpose register.
pub const EFX: RegisterId = 0x0F;

/// Division remainder.
pub const AC: RegisterId = 0x10;

/// Condition codes: bit 31 is N, bit 30 is Z.
pub const CC: RegisterId = 0x11;

/// Code segment base pointer.
pub const CS: RegisterId = 0x1A;

/// Data segment base pointer.
pub const DS: RegisterId = 0x1B;

/// Extra segment base pointer.
pub const ES: RegisterId = 0x1C;

/// Stack segment base pointer.
pub const SS: RegisterId = 0x1D;

/// Constant segment base pointer.
pub const KS: RegisterId = 0x1E;

/// Parameter segment base pointer.
pub const PS: RegisterId = 0x1F;

/// Display name of a register, `"R?"` for reserved slots.
pub const fn name(id: RegisterId) -> &'static str {
    match id {
        LAR => "LAR",
        MAR => "MAR",
        MBR => "MBR",
        IP => "IP",
        OPC => "OPC",
        OP1 => "OP1",
        OP2 => "OP2",
        SP => "SP",
        BP => "BP",
        EAX => "EAX",
        EBX => "EBX",
        ECX => "ECX",
        EDX => "EDX",
        EEX => "EEX",
        EFX => "EFX",
        AC => "AC",
        CC => "CC",
        CS => "CS",
        DS => "DS",
        ES => "ES",
        SS => "SS",
        KS => "KS",
        PS => "PS",
        _ => "R?",
    }
}

/// Display name of a register sector, e.g. `AX`, `AH`, `AL` for `EAX`.
///
/// Sectors only have distinct names on the general-purpose set; any other
/// register falls back to its plain name.
pub fn sector_name(id: RegisterId, sector: Sector) -> &'static str {
    const GP: [[&str; 4]; 6] = [
        ["EAX", "AX", "AH", "AL"],
        ["EBX", "BX", "BH", "BL"],
        ["ECX", "CX", "CH", "CL"],
        ["EDX", "DX", "DH", "DL"],
        ["EEX", "EX", "EH", "EL"],
        ["EFX", "FX", "FH", "FL"],
    ];
    if (EAX..=EFX).contains(&id) {
        GP[id - EAX][sector as usize]
    } else {
        name(id)
    }
}
