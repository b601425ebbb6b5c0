//! Stack discipline: 32-bit words on the stack segment, growing downward.

use vmx_asm::regs::{SP, SS};

use super::Interpreter;
use crate::error::Fault;
use crate::segment::LogicalAddr;

impl<C> Interpreter<C> {
    /// Push a 32-bit word. `SP` must have room for four more bytes below
    /// it.
    pub(crate) fn push(&mut self, value: u32) -> Result<(), Fault> {
        let stack = LogicalAddr::from_raw(self.registers[SS]);
        if stack.is_sentinel() {
            return Err(Fault::StackOverflow);
        }
        let sp = LogicalAddr::from_raw(self.registers[SP]).offset();
        if sp < 4 {
            return Err(Fault::StackOverflow);
        }
        let sp = sp - 4;
        self.store_word(stack.segment(), sp, value)?;
        self.registers[SP] = LogicalAddr::new(stack.segment(), sp).raw();
        Ok(())
    }

    /// Pop a 32-bit word. `SP + 4` must stay inside the stack segment.
    pub(crate) fn pop(&mut self) -> Result<u32, Fault> {
        let stack = LogicalAddr::from_raw(self.registers[SS]);
        if stack.is_sentinel() {
            return Err(Fault::StackUnderflow);
        }
        let seg = stack.segment();
        let size = self
            .segments
            .get(usize::from(seg))
            .map(|d| d.size)
            .unwrap_or_default();
        let sp = LogicalAddr::from_raw(self.registers[SP]).offset();
        if u32::from(sp) + 4 > u32::from(size) {
            return Err(Fault::StackUnderflow);
        }
        let value = self.load_word(seg, sp)?;
        self.registers[SP] = LogicalAddr::new(seg, sp + 4).raw();
        Ok(value)
    }
}
