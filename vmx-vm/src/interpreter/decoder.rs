//! Instruction fetch and decode.
//!
//! One instruction is `1 + |B| + |A|` bytes. The header byte carries the
//! opcode in its low five bits; how the remaining bits classify the
//! operands depends on the opcode's size class. For two-operand forms,
//! operand B's bytes precede operand A's.

use vmx_asm::regs::{CS, IP, OP1, OP2, OPC};
use vmx_asm::{Instruction, Opcode, Operand, OperandClass, OperandType};

use super::Interpreter;
use crate::error::Fault;
use crate::segment::LogicalAddr;

/// A decoded instruction together with its fetch footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fetched {
    /// The instruction itself.
    pub inst: Instruction,
    /// Encoded length in bytes.
    pub size: u16,
    /// Physical address of the header byte.
    pub phys: u16,
}

impl<C> Interpreter<C> {
    /// Decode the instruction under `IP` and advance `IP` past it.
    ///
    /// On success `OPC`, `OP1` and `OP2` describe the decoded instruction;
    /// the new `IP` keeps the segment index of `CS`.
    pub(crate) fn fetch_and_decode(&mut self) -> Result<Fetched, Fault> {
        let ip = LogicalAddr::from_raw(self.registers[IP]);
        let (seg, offset) = (ip.segment(), ip.offset());

        let mut header = [0u8];
        let phys = self.fetch_code(seg, offset, &mut header)?;
        let header = header[0];

        let opcode =
            Opcode::try_from(header & 0x1F).map_err(|_| Fault::InvalidOpcode(header))?;

        self.registers[OPC] = u32::from(header & 0x1F);
        self.registers[OP1] = 0;
        self.registers[OP2] = 0;

        let mut size = 1u16;
        let (a, b) = match opcode.class() {
            OperandClass::Zero => (Operand::None, Operand::None),
            OperandClass::One => {
                let ty = OperandType::from_bits(header >> 6);
                let a = self.fetch_operand(seg, offset, &mut size, ty, header)?;
                (a, Operand::None)
            }
            OperandClass::Two => {
                let ty_b = OperandType::from_bits(header >> 6);
                let ty_a = if header & 0x20 != 0 {
                    OperandType::Memory
                } else {
                    OperandType::Register
                };
                let b = self.fetch_operand(seg, offset, &mut size, ty_b, header)?;
                let a = self.fetch_operand(seg, offset, &mut size, ty_a, header)?;
                (a, b)
            }
        };

        let inst = Instruction::new(opcode, a, b);
        self.registers[OP1] = inst.a().descriptor();
        self.registers[OP2] = inst.b().descriptor();

        let code_seg = LogicalAddr::from_raw(self.registers[CS]).segment();
        self.registers[IP] = LogicalAddr::new(code_seg, offset.wrapping_add(size)).raw();

        Ok(Fetched { inst, size, phys })
    }

    /// Fetch and parse one operand at `offset + *size`, bumping `*size` by
    /// its width.
    fn fetch_operand(
        &self,
        seg: u16,
        offset: u16,
        size: &mut u16,
        ty: OperandType,
        header: u8,
    ) -> Result<Operand, Fault> {
        let width = ty.width();
        if width == 0 {
            return Ok(Operand::None);
        }
        let mut raw = [0u8; 3];
        let raw = &mut raw[..usize::from(width)];
        self.fetch_code(seg, offset.wrapping_add(*size), raw)?;
        *size += width;
        Operand::parse(ty, raw).ok_or(Fault::InvalidOpcode(header))
    }
}

#[cfg(test)]
mod tests {
    use vmx_asm::{op, CellSize};

    use crate::prelude::*;
    use crate::segment::SegmentDescriptor;

    fn vm_with_code(code: &[u8]) -> Interpreter<ScriptedConsole> {
        let mut vm = Interpreter::<ScriptedConsole>::default();
        vm.segments[0] = SegmentDescriptor {
            base: 0,
            size: code.len() as u16,
        };
        vm.ram[..code.len()].copy_from_slice(code);
        vm.registers[regs::CS] = LogicalAddr::new(0, 0).raw();
        vm.registers[regs::IP] = LogicalAddr::new(0, 0).raw();
        vm
    }

    #[test]
    fn decode_advances_ip_by_encoded_width() {
        let inst = op::mov(op::reg(regs::EAX), op::imm(42));
        let width = inst.size();
        let mut vm = vm_with_code(&inst.to_bytes());

        let fetched = vm.fetch_and_decode().unwrap();
        assert_eq!(fetched.size, width);
        assert_eq!(fetched.phys, 0);
        assert_eq!(fetched.inst, inst);
        assert_eq!(vm.registers[regs::IP], u32::from(width));
    }

    #[test]
    fn decode_exposes_descriptors() {
        let inst = op::mov(op::mem(regs::EBX, 2, CellSize::Word), op::imm(-1));
        let mut vm = vm_with_code(&inst.to_bytes());

        vm.fetch_and_decode().unwrap();
        assert_eq!(vm.registers[regs::OPC], 0x10);
        assert_eq!(vm.registers[regs::OP1], 0x030B_0002);
        assert_eq!(vm.registers[regs::OP2], 0x0200_FFFF);
    }

    #[test]
    fn unassigned_opcode_is_rejected() {
        let mut vm = vm_with_code(&[0x09]);
        assert_eq!(vm.fetch_and_decode(), Err(Fault::InvalidOpcode(0x09)));
    }

    #[test]
    fn reserved_cell_size_is_rejected() {
        // MOV with a memory operand whose cell-size bits are the reserved
        // 01 pattern.
        let header = 0x70u8; // B register, A memory, opcode 0x10
        let mut vm = vm_with_code(&[header, 0x0A, 0x4B, 0x00, 0x00]);
        assert_eq!(vm.fetch_and_decode(), Err(Fault::InvalidOpcode(header)));
    }

    #[test]
    fn truncated_instruction_fails_fetch() {
        // Header promises a two-byte immediate that is not there.
        let mut vm = vm_with_code(&[0x81]);
        assert_eq!(vm.fetch_and_decode(), Err(Fault::InvalidFetch));
    }
}
