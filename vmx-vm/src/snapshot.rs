//! VMI snapshots: the whole machine state, save and restore.
//!
//! Layout, all big-endian: `"VMI25"`, version byte, RAM size in KiB, the
//! 32 registers, the 8 segment descriptors, then the raw RAM.

use std::fs;
use std::path::Path;

use vmx_asm::regs::{CS, DS, ES, KS, PS, SS, VM_REGISTER_COUNT};

use crate::consts::{RAM_MAX_KIB, SEG_COUNT, VMI_MAGIC, VMI_VERSION};
use crate::error::{ImageError, VmError};
use crate::interpreter::Interpreter;
use crate::segment::{SegmentDescriptor, SegmentKind, SegmentMap};

impl<C> Interpreter<C> {
    /// Serialize the machine state.
    pub fn snapshot_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(6 + 2 + VM_REGISTER_COUNT * 4 + SEG_COUNT * 4 + self.ram.len());
        out.extend_from_slice(VMI_MAGIC);
        out.push(VMI_VERSION);
        out.extend_from_slice(&self.ram_kib().to_be_bytes());
        for reg in self.registers {
            out.extend_from_slice(&reg.to_be_bytes());
        }
        for segment in self.segments {
            out.extend_from_slice(&segment.base.to_be_bytes());
            out.extend_from_slice(&segment.size.to_be_bytes());
        }
        out.extend_from_slice(&self.ram);
        out
    }

    /// Write a snapshot file.
    pub fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<(), VmError> {
        fs::write(path.as_ref(), self.snapshot_bytes())?;
        tracing::debug!(path = %path.as_ref().display(), "snapshot saved");
        Ok(())
    }

    /// Restore the machine state from snapshot bytes.
    ///
    /// Registers, segments and RAM come back exactly as saved; the
    /// kind-to-slot map is rederived from the segment-base registers.
    pub fn restore_bytes(&mut self, bytes: &[u8]) -> Result<(), ImageError> {
        let header = bytes.get(..6).ok_or(ImageError::TruncatedSnapshot)?;
        if &header[..5] != VMI_MAGIC {
            return Err(ImageError::BadMagic);
        }
        if header[5] != VMI_VERSION {
            return Err(ImageError::UnsupportedVersion(header[5]));
        }

        let kib = bytes.get(6..8).ok_or(ImageError::TruncatedSnapshot)?;
        let ram_kib = u16::from_be_bytes([kib[0], kib[1]]);
        if ram_kib == 0 || ram_kib > RAM_MAX_KIB {
            return Err(ImageError::BadRamSize);
        }
        let ram_len = usize::from(ram_kib) * 1024;

        fn take<'a>(bytes: &'a [u8], cursor: &mut usize, n: usize) -> Result<&'a [u8], ImageError> {
            let slice = bytes
                .get(*cursor..*cursor + n)
                .ok_or(ImageError::TruncatedSnapshot)?;
            *cursor += n;
            Ok(slice)
        }
        let mut cursor = 8usize;

        let mut registers = [0u32; VM_REGISTER_COUNT];
        for reg in registers.iter_mut() {
            let b = take(bytes, &mut cursor, 4)?;
            *reg = u32::from_be_bytes([b[0], b[1], b[2], b[3]]);
        }

        let mut segments = [SegmentDescriptor::default(); SEG_COUNT];
        for segment in segments.iter_mut() {
            let b = take(bytes, &mut cursor, 4)?;
            *segment = SegmentDescriptor {
                base: u16::from_be_bytes([b[0], b[1]]),
                size: u16::from_be_bytes([b[2], b[3]]),
            };
            if u32::from(segment.base) + u32::from(segment.size) > ram_len as u32 {
                return Err(ImageError::OutOfMemory);
            }
        }

        let ram = take(bytes, &mut cursor, ram_len)?.to_vec();

        self.registers = registers;
        self.segments = segments;
        self.ram = ram;
        self.map = SegmentMap::from_registers([
            (SegmentKind::Code, self.registers[CS]),
            (SegmentKind::Data, self.registers[DS]),
            (SegmentKind::Extra, self.registers[ES]),
            (SegmentKind::Stack, self.registers[SS]),
            (SegmentKind::Const, self.registers[KS]),
            (SegmentKind::Param, self.registers[PS]),
        ]);
        Ok(())
    }

    /// Read and restore a snapshot file.
    pub fn restore<P: AsRef<Path>>(&mut self, path: P) -> Result<(), VmError> {
        let bytes = fs::read(path.as_ref())?;
        self.restore_bytes(&bytes)?;
        tracing::debug!(path = %path.as_ref().display(), "snapshot restored");
        Ok(())
    }
}
