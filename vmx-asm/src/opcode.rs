use core::fmt;

/// Shape of an instruction's operand list, decided by the opcode alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandClass {
    /// No operand bytes follow the header.
    Zero,
    /// Operand A only; its type tag sits in the two high bits of the header.
    One,
    /// Operands A and B; B's bytes precede A's on the wire.
    Two,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[repr(u8)]
/// Opcode representation for the VMX machine.
///
/// The opcode occupies the low five bits of the instruction header byte.
/// Values `0x09` and `0x0A` are unassigned and must fail to decode.
pub enum Opcode {
    /// System trap. The call number comes from operand A, falling back to
    /// the low half of `EAX` when the operand is absent.
    SYS = 0x00,
    /// Unconditional jump inside the code segment.
    ///
    /// | Operation | `IP.offset = A & 0xFFFF` |
    /// | Syntax    | `JMP target`             |
    JMP = 0x01,
    /// Jump if the zero flag is set.
    JZ = 0x02,
    /// Jump if the result was strictly positive (`!N && !Z`).
    JP = 0x03,
    /// Jump if the negative flag is set.
    JN = 0x04,
    /// Jump if the zero flag is clear.
    JNZ = 0x05,
    /// Jump if the result was zero or negative (`N || Z`).
    JNP = 0x06,
    /// Jump if the negative flag is clear.
    JNN = 0x07,
    /// Bitwise complement of operand A, in place.
    ///
    /// | Operation | `A = !A` |
    /// | Flags     | N, Z     |
    NOT = 0x08,
    /// Push the 32-bit value of operand A onto the stack.
    PUSH = 0x0B,
    /// Pop a 32-bit value from the stack into operand A.
    POP = 0x0C,
    /// Push the address of the next instruction, then jump.
    CALL = 0x0D,
    /// Pop the return address into `IP`. Popping the boot sentinel halts
    /// the machine cleanly.
    RET = 0x0E,
    /// Halt by setting `IP` to the sentinel pointer.
    STOP = 0x0F,
    /// Copy operand B into operand A. Flags are untouched.
    MOV = 0x10,
    /// | Operation | `A = A + B` |
    /// | Flags     | N, Z        |
    ADD = 0x11,
    /// | Operation | `A = A - B` |
    /// | Flags     | N, Z        |
    SUB = 0x12,
    /// 32x32 multiplication keeping the low 32 bits of the product.
    MUL = 0x13,
    /// Signed floored division: quotient to A, remainder to `AC`.
    /// Division by zero is a fault.
    DIV = 0x14,
    /// Set N and Z from `A - B` without writing the difference back.
    CMP = 0x15,
    /// Logical left shift by `B & 31`.
    SHL = 0x16,
    /// Logical right shift by `B & 31`.
    SHR = 0x17,
    /// Arithmetic right shift by `B & 31`.
    SAR = 0x18,
    /// | Operation | `A = A & B` |
    /// | Flags     | N, Z        |
    AND = 0x19,
    /// | Operation | `A = A \| B` |
    /// | Flags     | N, Z         |
    OR = 0x1A,
    /// | Operation | `A = A ^ B` |
    /// | Flags     | N, Z        |
    XOR = 0x1B,
    /// Exchange operands A and B. Neither side may be absent or immediate.
    SWAP = 0x1C,
    /// Load the low half: `A = (A & 0xFFFF0000) | (B & 0xFFFF)`.
    LDL = 0x1D,
    /// Load the high half: `A = (A & 0x0000FFFF) | ((B & 0xFFFF) << 16)`.
    LDH = 0x1E,
    /// Uniform random value in `[0, B)`; zero when `B` is zero.
    RND = 0x1F,
}

/// Error for a header byte whose opcode bits name no instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InvalidOpcode(pub u8);

impl fmt::Display for InvalidOpcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid opcode 0x{:02X}", self.0)
    }
}

impl std::error::Error for InvalidOpcode {}

impl Opcode {
    /// Operand list shape for this opcode.
    pub const fn class(self) -> OperandClass {
        match self {
            Self::RET | Self::STOP => OperandClass::Zero,
            Self::SYS
            | Self::JMP
            | Self::JZ
            | Self::JP
            | Self::JN
            | Self::JNZ
            | Self::JNP
            | Self::JNN
            | Self::NOT
            | Self::PUSH
            | Self::POP
            | Self::CALL => OperandClass::One,
            _ => OperandClass::Two,
        }
    }

    /// Assembler mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::SYS => "SYS",
            Self::JMP => "JMP",
            Self::JZ => "JZ",
            Self::JP => "JP",
            Self::JN => "JN",
            Self::JNZ => "JNZ",
            Self::JNP => "JNP",
            Self::JNN => "JNN",
            Self::NOT => "NOT",
            Self::PUSH => "PUSH",
            Self::POP => "POP",
            Self::CALL => "CALL",
            Self::RET => "RET",
            Self::STOP => "STOP",
            Self::MOV => "MOV",
            Self::ADD => "ADD",
            Self::SUB => "SUB",
            Self::MUL => "MUL",
            Self::DIV => "DIV",
            Self::CMP => "CMP",
            Self::SHL => "SHL",
            Self::SHR => "SHR",
            Self::SAR => "SAR",
            Self::AND => "AND",
            Self::OR => "OR",
            Self::XOR => "XOR",
            Self::SWAP => "SWAP",
            Self::LDL => "LDL",
            Self::LDH => "LDH",
            Self::RND => "RND",
        }
    }
}

impl TryFrom<u8> for Opcode {
    type Error = InvalidOpcode;

    fn try_from(b: u8) -> Result<Self, Self::Error> {
        use Opcode::*;
        let op = match b {
            0x00 => SYS,
            0x01 => JMP,
            0x02 => JZ,
            0x03 => JP,
            0x04 => JN,
            0x05 => JNZ,
            0x06 => JNP,
            0x07 => JNN,
            0x08 => NOT,
            0x0B => PUSH,
            0x0C => POP,
            0x0D => CALL,
            0x0E => RET,
            0x0F => STOP,
            0x10 => MOV,
            0x11 => ADD,
            0x12 => SUB,
            0x13 => MUL,
            0x14 => DIV,
            0x15 => CMP,
            0x16 => SHL,
            0x17 => SHR,
            0x18 => SAR,
            0x19 => AND,
            0x1A => OR,
            0x1B => XOR,
            0x1C => SWAP,
            0x1D => LDL,
            0x1E => LDH,
            0x1F => RND,
            _ => return Err(InvalidOpcode(b)),
        };
        Ok(op)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
