//! Instruction constructors, shorthand for assembling programs by hand.
//!
//! ```
//! use vmx_asm::{op, regs};
//!
//! let bytes = op::assemble([
//!     op::mov(op::reg(regs::EAX), op::imm(42)),
//!     op::stop(),
//! ]);
//! assert_eq!(bytes, vec![0x90, 0x00, 0x2A, 0x0A, 0x0F]);
//! ```

use crate::regs::RegisterId;
use crate::{CellSize, Instruction, Opcode, Operand, Sector};

/// Full-width register operand.
pub const fn reg(id: RegisterId) -> Operand {
    Operand::Register {
        code: id as u8,
        sector: Sector::Full,
    }
}

/// Register operand naming a sector of `id`.
pub const fn reg_sector(id: RegisterId, sector: Sector) -> Operand {
    Operand::Register {
        code: id as u8,
        sector,
    }
}

/// Signed 16-bit immediate operand.
pub const fn imm(v: i16) -> Operand {
    Operand::Immediate(v)
}

/// Memory operand based on a register pointer.
pub const fn mem(base: RegisterId, disp: i16, cell: CellSize) -> Operand {
    Operand::Memory {
        base: base as u8,
        disp,
        cell,
    }
}

/// Word-sized memory operand addressed through the implicit data segment.
pub const fn mem_ds(disp: i16) -> Operand {
    Operand::Memory {
        base: 0x0F,
        disp,
        cell: CellSize::Word,
    }
}

/// Concatenate instructions into a code image.
pub fn assemble<I>(instructions: I) -> Vec<u8>
where
    I: IntoIterator<Item = Instruction>,
{
    instructions
        .into_iter()
        .flat_map(|inst| inst.to_bytes())
        .collect()
}

macro_rules! two_op {
    ($($(#[$attr:meta])* $fn:ident -> $opcode:ident;)*) => {
        $(
            $(#[$attr])*
            pub fn $fn(a: Operand, b: Operand) -> Instruction {
                Instruction::new(Opcode::$opcode, a, b)
            }
        )*
    };
}

macro_rules! one_op {
    ($($(#[$attr:meta])* $fn:ident -> $opcode:ident;)*) => {
        $(
            $(#[$attr])*
            pub fn $fn(a: Operand) -> Instruction {
                Instruction::new(Opcode::$opcode, a, Operand::None)
            }
        )*
    };
}

two_op! {
    /// `MOV A, B`
    mov -> MOV;
    /// `ADD A, B`
    add -> ADD;
    /// `SUB A, B`
    sub -> SUB;
    /// `MUL A, B`
    mul -> MUL;
    /// `DIV A, B`
    div -> DIV;
    /// `CMP A, B`
    cmp -> CMP;
    /// `SHL A, B`
    shl -> SHL;
    /// `SHR A, B`
    shr -> SHR;
    /// `SAR A, B`
    sar -> SAR;
    /// `AND A, B`
    and -> AND;
    /// `OR A, B`
    or -> OR;
    /// `XOR A, B`
    xor -> XOR;
    /// `SWAP A, B`
    swap -> SWAP;
    /// `LDL A, B`
    ldl -> LDL;
    /// `LDH A, B`
    ldh -> LDH;
    /// `RND A, B`
    rnd -> RND;
}

one_op! {
    /// `SYS n`
    sys -> SYS;
    /// `JMP target`
    jmp -> JMP;
    /// `JZ target`
    jz -> JZ;
    /// `JP target`
    jp -> JP;
    /// `JN target`
    jn -> JN;
    /// `JNZ target`
    jnz -> JNZ;
    /// `JNP target`
    jnp -> JNP;
    /// `JNN target`
    jnn -> JNN;
    /// `NOT A`
    not -> NOT;
    /// `PUSH A`
    push -> PUSH;
    /// `POP A`
    pop -> POP;
    /// `CALL target`
    call -> CALL;
}

/// `RET`
pub fn ret() -> Instruction {
    Instruction::new(Opcode::RET, Operand::None, Operand::None)
}

/// `STOP`
pub fn stop() -> Instruction {
    Instruction::new(Opcode::STOP, Operand::None, Operand::None)
}
