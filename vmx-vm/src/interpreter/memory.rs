//! Segment translation and the sized big-endian accessors.

use vmx_asm::regs::{LAR, MAR, MBR};
use vmx_asm::CellSize;

use super::Interpreter;
use crate::consts::SEG_COUNT;
use crate::error::Fault;
use crate::segment::LogicalAddr;

impl<C> Interpreter<C> {
    fn translate_inner(&self, seg: u16, offset: u16, nbytes: u16) -> Option<u16> {
        if usize::from(seg) >= SEG_COUNT || nbytes == 0 {
            return None;
        }
        let descriptor = self.segments[usize::from(seg)];
        let end = u32::from(offset) + u32::from(nbytes);
        if end > u32::from(descriptor.size) {
            return None;
        }
        // base + size <= |RAM| holds for every loaded segment, so this
        // cannot leave the 16-bit physical space.
        Some(descriptor.base + offset)
    }

    /// Translate a data access. Faults with the data identity.
    pub(crate) fn translate(&self, seg: u16, offset: u16, nbytes: u16) -> Result<u16, Fault> {
        self.translate_inner(seg, offset, nbytes)
            .ok_or(Fault::SegmentFault)
    }

    /// Translate an instruction fetch: same arithmetic, distinct fault
    /// identity for error reporting.
    pub(crate) fn translate_code(&self, seg: u16, offset: u16, nbytes: u16) -> Result<u16, Fault> {
        self.translate_inner(seg, offset, nbytes)
            .ok_or(Fault::InvalidFetch)
    }

    /// Copy instruction bytes out of the code stream. Fetches do not touch
    /// `LAR`/`MAR`/`MBR`.
    pub(crate) fn fetch_code(&self, seg: u16, offset: u16, buf: &mut [u8]) -> Result<u16, Fault> {
        let phys = self.translate_code(seg, offset, buf.len() as u16)?;
        let phys_usize = usize::from(phys);
        buf.copy_from_slice(&self.ram[phys_usize..phys_usize + buf.len()]);
        Ok(phys)
    }

    /// Read a sized big-endian cell at `(seg, offset)`.
    ///
    /// The value comes back zero-extended; every successful access updates
    /// `LAR`, `MAR` and `MBR`.
    pub(crate) fn load(&mut self, seg: u16, offset: u16, cell: CellSize) -> Result<u32, Fault> {
        let nbytes = cell.len();
        let phys = self.translate(seg, offset, nbytes)?;
        let mut value = 0u32;
        for i in 0..usize::from(nbytes) {
            value = (value << 8) | u32::from(self.ram[usize::from(phys) + i]);
        }
        self.touch_access(seg, offset, nbytes, phys, value);
        Ok(value)
    }

    /// Write a sized big-endian cell at `(seg, offset)`, truncating `value`
    /// to the cell width. Updates `LAR`, `MAR` and `MBR`.
    pub(crate) fn store(
        &mut self,
        seg: u16,
        offset: u16,
        cell: CellSize,
        value: u32,
    ) -> Result<(), Fault> {
        let nbytes = cell.len();
        let phys = self.translate(seg, offset, nbytes)?;
        let truncated = value & cell_mask(cell);
        for i in 0..usize::from(nbytes) {
            let shift = 8 * (u32::from(nbytes) - 1 - i as u32);
            self.ram[usize::from(phys) + i] = (truncated >> shift) as u8;
        }
        self.touch_access(seg, offset, nbytes, phys, truncated);
        Ok(())
    }

    /// 32-bit convenience wrappers; the stack and the loader only move
    /// whole words.
    pub(crate) fn load_word(&mut self, seg: u16, offset: u16) -> Result<u32, Fault> {
        self.load(seg, offset, CellSize::Word)
    }

    pub(crate) fn store_word(&mut self, seg: u16, offset: u16, value: u32) -> Result<(), Fault> {
        self.store(seg, offset, CellSize::Word, value)
    }

    fn touch_access(&mut self, seg: u16, offset: u16, nbytes: u16, phys: u16, value: u32) {
        self.registers[LAR] = LogicalAddr::new(seg, offset).raw();
        self.registers[MAR] = (u32::from(nbytes) << 16) | u32::from(phys);
        self.registers[MBR] = value;
    }
}

const fn cell_mask(cell: CellSize) -> u32 {
    match cell {
        CellSize::Byte => 0xFF,
        CellSize::Half => 0xFFFF,
        CellSize::Word => 0xFFFF_FFFF,
    }
}
