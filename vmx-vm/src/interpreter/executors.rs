//! The run loop and the opcode dispatch.

use vmx_asm::regs::IP;
use vmx_asm::{Opcode, Operand, OperandType};

use super::{Fetched, Interpreter};
use crate::consts::{SEG_COUNT, SENTINEL};
use crate::error::{Fault, VmError};
use crate::io::Console;
use crate::segment::LogicalAddr;
use crate::state::ExecuteState;

impl<C: Console> Interpreter<C> {
    /// Run until the machine halts or faults.
    ///
    /// A clean halt (sentinel `IP`, or `IP` parked exactly at the end of
    /// its segment) returns `Ok`; every fault is an error carrying its
    /// one-line diagnostic.
    pub fn run(&mut self) -> Result<(), VmError> {
        if self.disassemble {
            self.dump_segments();
            self.dump_const_strings();
        }

        loop {
            let ip = LogicalAddr::from_raw(self.registers[IP]);
            if ip.is_sentinel() {
                tracing::debug!("halt: sentinel instruction pointer");
                return Ok(());
            }

            let seg = ip.segment();
            if usize::from(seg) >= SEG_COUNT {
                return Err(Fault::SegmentFault.into());
            }
            let seg_size = self.segments[usize::from(seg)].size;
            if ip.offset() == seg_size {
                tracing::debug!("halt: fell off the end of the code segment");
                return Ok(());
            }
            if ip.offset() > seg_size {
                return Err(Fault::SegmentFault.into());
            }
            self.translate_code(seg, ip.offset(), 1)?;

            let fetched = self.fetch_and_decode()?;

            if self.disassemble {
                self.disasm_line(&fetched);
            }

            // A pending single-step pauses after this instruction, not
            // after the trap that requested it.
            let stepping = self.debugger.single_step;
            let mut state = self.instruction(&fetched)?;
            if stepping && state.should_continue() {
                state = self.step_pause()?;
            }
            if !state.should_continue() {
                return Ok(());
            }
        }
    }

    /// Execute one decoded instruction.
    pub(crate) fn instruction(&mut self, fetched: &Fetched) -> Result<ExecuteState, Fault> {
        let (a, b) = (fetched.inst.a(), fetched.inst.b());

        match fetched.inst.opcode() {
            Opcode::SYS => return self.sys(a),

            Opcode::JMP => self.jump_if(a, true)?,
            Opcode::JZ => {
                let taken = self.flag_z();
                self.jump_if(a, taken)?;
            }
            Opcode::JP => {
                let taken = !self.flag_n() && !self.flag_z();
                self.jump_if(a, taken)?;
            }
            Opcode::JN => {
                let taken = self.flag_n();
                self.jump_if(a, taken)?;
            }
            Opcode::JNZ => {
                let taken = !self.flag_z();
                self.jump_if(a, taken)?;
            }
            Opcode::JNP => {
                let taken = self.flag_n() || self.flag_z();
                self.jump_if(a, taken)?;
            }
            Opcode::JNN => {
                let taken = !self.flag_n();
                self.jump_if(a, taken)?;
            }

            Opcode::NOT => self.alu_not(a)?,

            Opcode::PUSH => {
                let value = self.read_operand(a)?;
                self.push(value)?;
            }
            Opcode::POP => {
                let value = self.pop()?;
                self.write_operand(a, value)?;
            }
            Opcode::CALL => self.call(a)?,
            Opcode::RET => {
                self.ret()?;
                if self.registers[IP] == SENTINEL {
                    return Ok(ExecuteState::Halt);
                }
            }
            Opcode::STOP => {
                self.stop();
                return Ok(ExecuteState::Halt);
            }

            Opcode::MOV => {
                let value = self.read_operand(b)?;
                self.write_operand(a, value)?;
            }
            Opcode::ADD => self.alu_binary(a, b, u32::wrapping_add)?,
            Opcode::SUB => self.alu_binary(a, b, u32::wrapping_sub)?,
            Opcode::MUL => self.alu_binary(a, b, u32::wrapping_mul)?,
            Opcode::DIV => self.alu_div(a, b)?,
            Opcode::CMP => self.alu_cmp(a, b)?,
            Opcode::SHL => self.alu_binary(a, b, |x, n| x << (n & 31))?,
            Opcode::SHR => self.alu_binary(a, b, |x, n| x >> (n & 31))?,
            Opcode::SAR => self.alu_binary(a, b, |x, n| ((x as i32) >> (n & 31)) as u32)?,
            Opcode::AND => self.alu_binary(a, b, |x, y| x & y)?,
            Opcode::OR => self.alu_binary(a, b, |x, y| x | y)?,
            Opcode::XOR => self.alu_binary(a, b, |x, y| x ^ y)?,

            Opcode::SWAP => self.swap(a, b)?,
            Opcode::LDL => {
                self.alu_load_half(a, b, |dst, low| (dst & 0xFFFF_0000) | low)?;
            }
            Opcode::LDH => {
                self.alu_load_half(a, b, |dst, low| (dst & 0x0000_FFFF) | (low << 16))?;
            }
            Opcode::RND => self.alu_rnd(a, b)?,
        }

        Ok(ExecuteState::Proceed)
    }

    /// `SWAP`: both sides must be writable places.
    fn swap(&mut self, a: &Operand, b: &Operand) -> Result<(), Fault> {
        if matches!(a.ty(), OperandType::None | OperandType::Immediate)
            || matches!(b.ty(), OperandType::None | OperandType::Immediate)
        {
            return Err(Fault::InvalidOperand);
        }
        let va = self.read_operand(a)?;
        let vb = self.read_operand(b)?;
        self.write_operand(a, vb)?;
        self.write_operand(b, va)
    }

    /// `LDL`/`LDH`: merge the low 16 bits of B into one half of A.
    /// Flags are untouched.
    fn alu_load_half(
        &mut self,
        a: &Operand,
        b: &Operand,
        merge: fn(u32, u32) -> u32,
    ) -> Result<(), Fault> {
        let low = self.read_operand(b)? & 0xFFFF;
        let dst = self.read_operand(a)?;
        self.write_operand(a, merge(dst, low))
    }
}
