//! Process image placement and register seeding.

use vmx_asm::regs::{BP, CC, CS, DS, ES, IP, KS, OP1, OP2, OPC, PS, SP, SS};

use super::Interpreter;
use crate::consts::{PARAM_AREA_MAX, SEG_COUNT, SENTINEL};
use crate::error::{ImageError, VmError};
use crate::image::VmxFile;
use crate::segment::{LogicalAddr, SegmentDescriptor, SegmentKind, SegmentMap};

/// Where the argv table landed inside the parameter segment.
struct PlacedImage {
    argv_offset: Option<u16>,
}

impl<C> Interpreter<C> {
    /// Build the initial process image: place segments, copy the code and
    /// constant pools, materialize the parameter area, seed the registers
    /// and install the boot stack frame.
    pub fn init(&mut self, image: &VmxFile, params: &[String]) -> Result<(), VmError> {
        let placed = self.place_segments(image, params)?;
        self.seed_registers(image);
        self.install_boot_frame(params.len() as u32, placed.argv_offset)?;

        for reg in [OPC, OP1, OP2, CC] {
            self.registers[reg] = 0;
        }

        tracing::debug!(
            version = image.version,
            code = image.code.len(),
            params = params.len(),
            "process image loaded"
        );
        Ok(())
    }

    /// Lay the segments out in their fixed placement order, skipping the
    /// absent ones. The table indexes segments by placement order; the
    /// kind map remembers which slot each kind landed in.
    fn place_segments(&mut self, image: &VmxFile, params: &[String]) -> Result<PlacedImage, ImageError> {
        self.segments = [SegmentDescriptor::default(); SEG_COUNT];
        self.map = SegmentMap::default();
        self.ram.fill(0);

        let ram_limit = self.ram.len() as u32;
        let param_size = param_area_size(params)?;
        let code_size = image.code.len() as u16;
        let const_size = image.consts.len() as u16;

        fn place(cursor: &mut u32, ram_limit: u32, size: u16) -> Result<u16, ImageError> {
            let base = *cursor;
            *cursor += u32::from(size);
            if *cursor > ram_limit {
                return Err(ImageError::OutOfMemory);
            }
            Ok(base as u16)
        }
        let mut cursor = 0u32;

        let param_base = place(&mut cursor, ram_limit, param_size)?;
        let const_base = place(&mut cursor, ram_limit, const_size)?;
        let code_base = place(&mut cursor, ram_limit, code_size)?;

        // A v1 image owns no data declaration: whatever RAM is left below
        // the limit becomes the data segment.
        let data_size = if image.version == 1 {
            (ram_limit - cursor).min(0xFFFF) as u16
        } else {
            image.data_size
        };
        let data_base = place(&mut cursor, ram_limit, data_size)?;
        let extra_base = place(&mut cursor, ram_limit, image.extra_size)?;
        let stack_base = place(&mut cursor, ram_limit, image.stack_size)?;

        let placement = [
            (SegmentKind::Param, param_base, param_size),
            (SegmentKind::Const, const_base, const_size),
            (SegmentKind::Code, code_base, code_size),
            (SegmentKind::Data, data_base, data_size),
            (SegmentKind::Extra, extra_base, image.extra_size),
            (SegmentKind::Stack, stack_base, image.stack_size),
        ];
        let mut slot = 0;
        for (kind, base, size) in placement {
            if size == 0 {
                continue;
            }
            self.segments[slot] = SegmentDescriptor { base, size };
            self.map.assign(kind, slot);
            slot += 1;
        }

        let code_base = usize::from(code_base);
        self.ram[code_base..code_base + image.code.len()].copy_from_slice(&image.code);
        let const_base = usize::from(const_base);
        self.ram[const_base..const_base + image.consts.len()].copy_from_slice(&image.consts);

        let argv_offset = if param_size > 0 {
            Some(self.build_param_area(param_base, params))
        } else {
            None
        };

        Ok(PlacedImage { argv_offset })
    }

    /// Pack the argument strings back to back, then the argv table of
    /// logical pointers, closed by a sentinel entry.
    fn build_param_area(&mut self, base: u16, params: &[String]) -> u16 {
        let slot = self
            .map
            .slot(SegmentKind::Param)
            .expect("parameter segment was just placed") as u16;
        let base = usize::from(base);

        let mut cursor = 0usize;
        let mut string_offsets = Vec::with_capacity(params.len());
        for param in params {
            string_offsets.push(cursor as u16);
            let bytes = param.as_bytes();
            self.ram[base + cursor..base + cursor + bytes.len()].copy_from_slice(bytes);
            self.ram[base + cursor + bytes.len()] = 0;
            cursor += bytes.len() + 1;
        }

        let argv_offset = cursor as u16;
        for offset in string_offsets {
            let pointer = LogicalAddr::new(slot, offset).raw();
            self.ram[base + cursor..base + cursor + 4].copy_from_slice(&pointer.to_be_bytes());
            cursor += 4;
        }
        self.ram[base + cursor..base + cursor + 4].copy_from_slice(&SENTINEL.to_be_bytes());

        argv_offset
    }

    fn seed_registers(&mut self, image: &VmxFile) {
        let map = self.map;
        self.registers.fill(0);

        let seg_pointer = |kind| {
            map.slot(kind)
                .map(|slot| LogicalAddr::new(slot as u16, 0).raw())
                .unwrap_or(SENTINEL)
        };
        self.registers[CS] = seg_pointer(SegmentKind::Code);
        self.registers[DS] = seg_pointer(SegmentKind::Data);
        self.registers[ES] = seg_pointer(SegmentKind::Extra);
        self.registers[SS] = seg_pointer(SegmentKind::Stack);
        self.registers[KS] = seg_pointer(SegmentKind::Const);
        self.registers[PS] = seg_pointer(SegmentKind::Param);

        let code_seg = LogicalAddr::from_raw(self.registers[CS]).segment();
        self.registers[IP] = LogicalAddr::new(code_seg, image.entry).raw();

        match map.slot(SegmentKind::Stack) {
            Some(slot) => {
                let top = self.segments[slot].size;
                self.registers[SP] = LogicalAddr::new(slot as u16, top).raw();
                self.registers[BP] = self.registers[SP];
            }
            None => {
                self.registers[SP] = SENTINEL;
                self.registers[BP] = SENTINEL;
            }
        }
    }

    /// CRT-style boot frame, present whenever the image has a stack. In
    /// pop order: the argv pointer, then argc, then the sentinel return
    /// address that makes a final `RET` halt cleanly.
    fn install_boot_frame(&mut self, argc: u32, argv_offset: Option<u16>) -> Result<(), VmError> {
        if LogicalAddr::from_raw(self.registers[SS]).is_sentinel() {
            return Ok(());
        }

        let argv_pointer = match (self.map.slot(SegmentKind::Param), argv_offset) {
            (Some(slot), Some(offset)) if argc > 0 => LogicalAddr::new(slot as u16, offset).raw(),
            _ => SENTINEL,
        };

        self.push(SENTINEL)?;
        self.push(argc)?;
        self.push(argv_pointer)?;
        self.registers[BP] = self.registers[SP];
        Ok(())
    }
}

/// Strings plus `(argc + 1)` table entries; must fit a 16-bit segment.
fn param_area_size(params: &[String]) -> Result<u16, ImageError> {
    if params.is_empty() {
        return Ok(0);
    }
    let strings: u32 = params.iter().map(|p| p.len() as u32 + 1).sum();
    let table = (params.len() as u32 + 1) * 4;
    let total = strings + table;
    if total > PARAM_AREA_MAX {
        return Err(ImageError::ParamsTooLarge);
    }
    Ok(total as u16)
}
