//! Jumps, calls and halting.

use vmx_asm::regs::{CS, IP};
use vmx_asm::Operand;

use super::Interpreter;
use crate::consts::SENTINEL;
use crate::error::Fault;
use crate::segment::LogicalAddr;

impl<C> Interpreter<C> {
    /// Branch target: the operand's low 16 bits, written verbatim into
    /// `IP.offset`. The segment index always comes from `CS`.
    fn jump_target(&mut self, operand: &Operand) -> Result<u16, Fault> {
        Ok(self.read_operand(operand)? as u16)
    }

    fn jump_to(&mut self, offset: u16) {
        let code_seg = LogicalAddr::from_raw(self.registers[CS]).segment();
        self.registers[IP] = LogicalAddr::new(code_seg, offset).raw();
    }

    /// Unconditional jump, or conditional when `taken` says so.
    pub(crate) fn jump_if(&mut self, operand: &Operand, taken: bool) -> Result<(), Fault> {
        let target = self.jump_target(operand)?;
        if taken {
            self.jump_to(target);
        }
        Ok(())
    }

    /// `CALL`: push the post-decode `IP` (the next instruction), then
    /// jump.
    pub(crate) fn call(&mut self, operand: &Operand) -> Result<(), Fault> {
        let target = self.jump_target(operand)?;
        self.push(self.registers[IP])?;
        self.jump_to(target);
        Ok(())
    }

    /// `RET`: pop the full logical pointer into `IP`. Popping the boot
    /// sentinel halts the machine at the next loop check.
    pub(crate) fn ret(&mut self) -> Result<(), Fault> {
        self.registers[IP] = self.pop()?;
        Ok(())
    }

    /// `STOP`: park `IP` on the sentinel.
    pub(crate) fn stop(&mut self) {
        self.registers[IP] = SENTINEL;
    }
}
