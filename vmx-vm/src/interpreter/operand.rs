//! Uniform operand evaluation.
//!
//! Reads and writes are polymorphic over the operand kind: register
//! sectors, sign-extended immediates, and sized memory cells all come back
//! as 32-bit values.

use vmx_asm::regs::{self, RegisterId};
use vmx_asm::{CellSize, Operand};

use super::Interpreter;
use crate::error::Fault;
use crate::segment::LogicalAddr;

impl<C> Interpreter<C> {
    /// Evaluate an operand. Absent operands read as zero.
    pub(crate) fn read_operand(&mut self, operand: &Operand) -> Result<u32, Fault> {
        match *operand {
            Operand::None => Ok(0),
            Operand::Register { code, sector } => {
                Ok(sector.extract(self.registers[code as RegisterId]))
            }
            Operand::Immediate(v) => Ok(v as i32 as u32),
            Operand::Memory { base, disp, cell } => {
                let (seg, offset) = self.memory_operand_addr(base, disp, cell)?;
                let raw = self.load(seg, offset, cell)?;
                Ok(cell.sign_extend(raw))
            }
        }
    }

    /// Store a value through an operand. Immediates and absent operands
    /// are not writable.
    pub(crate) fn write_operand(&mut self, operand: &Operand, value: u32) -> Result<(), Fault> {
        match *operand {
            Operand::None | Operand::Immediate(_) => Err(Fault::InvalidOperand),
            Operand::Register { code, sector } => {
                let reg = &mut self.registers[code as RegisterId];
                *reg = sector.insert(*reg, value);
                Ok(())
            }
            Operand::Memory { base, disp, cell } => {
                let (seg, offset) = self.memory_operand_addr(base, disp, cell)?;
                self.store(seg, offset, cell, value)
            }
        }
    }

    /// Resolve a memory operand to its `(segment, offset)` pair.
    ///
    /// The base pointer comes from the named register, or from `DS` for
    /// the implicit encodings; the displacement is added to its offset
    /// with 16-bit wrap-around.
    fn memory_operand_addr(
        &self,
        base: u8,
        disp: i16,
        cell: CellSize,
    ) -> Result<(u16, u16), Fault> {
        let base_reg = if Operand::is_implicit_ds(base, cell) {
            regs::DS
        } else {
            base as RegisterId
        };
        let pointer = LogicalAddr::from_raw(self.registers[base_reg]);
        if pointer.is_sentinel() {
            return Err(Fault::SegmentFault);
        }
        Ok((pointer.segment(), pointer.offset().wrapping_add(disp as u16)))
    }
}
