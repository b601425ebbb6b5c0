//! System traps: blocking cell I/O, string I/O, terminal control and the
//! breakpoint hook.

use bitflags::bitflags;
use vmx_asm::regs::{EAX, ECX, EDX};
use vmx_asm::{CellSize, Operand};

use super::Interpreter;
use crate::error::Fault;
use crate::io::Console;
use crate::segment::LogicalAddr;
use crate::state::ExecuteState;

bitflags! {
    /// Print/read format flags, taken from the low five bits of `EAX`.
    /// Any subset may be set; printing emits every selected format.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SysModes: u32 {
        /// Signed decimal, sized to the cell width.
        const DEC = 0x01;
        /// Raw characters, one per cell byte.
        const CHR = 0x02;
        /// Octal with a `0o` prefix.
        const OCT = 0x04;
        /// Uppercase hexadecimal with a `0x` prefix.
        const HEX = 0x08;
        /// Binary with a `0b` prefix.
        const BIN = 0x10;
    }
}

/// Parse one input line under the active modes.
///
/// Character mode packs the first `cell` bytes big-endian; otherwise the
/// line is numeric in the first recognized base (binary, octal, hex,
/// decimal), with `0x`/`0b` prefixes overriding.
pub(crate) fn parse_input(modes: SysModes, cell: CellSize, line: &str) -> Result<u32, Fault> {
    if modes.contains(SysModes::CHR) {
        let bytes = line.as_bytes();
        let mut value = 0u32;
        for i in 0..usize::from(cell.len()) {
            value = (value << 8) | u32::from(bytes.get(i).copied().unwrap_or(0));
        }
        return Ok(value);
    }

    let mut base = if modes.contains(SysModes::BIN) {
        2
    } else if modes.contains(SysModes::OCT) {
        8
    } else if modes.contains(SysModes::HEX) {
        16
    } else {
        10
    };

    let mut digits = line.trim();
    let negative = if let Some(rest) = digits.strip_prefix('-') {
        digits = rest;
        true
    } else {
        false
    };
    if let Some(rest) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        digits = rest;
        base = 16;
    } else if let Some(rest) = digits.strip_prefix("0b").or_else(|| digits.strip_prefix("0B")) {
        digits = rest;
        base = 2;
    }

    let magnitude = i64::from_str_radix(digits, base).map_err(|_| Fault::InvalidInput)?;
    let signed = if negative { -magnitude } else { magnitude };
    Ok(signed as u32)
}

/// Render a cell value in every selected format, space separated, in the
/// fixed order binary, hex, octal, decimal, characters.
pub(crate) fn format_cell(modes: SysModes, value: u32, cell: CellSize) -> String {
    let mut parts = Vec::new();
    if modes.contains(SysModes::BIN) {
        parts.push(format!("0b{value:b}"));
    }
    if modes.contains(SysModes::HEX) {
        parts.push(format!("0x{value:X}"));
    }
    if modes.contains(SysModes::OCT) {
        parts.push(format!("0o{value:o}"));
    }
    if modes.contains(SysModes::DEC) {
        parts.push(match cell {
            CellSize::Byte => (value as u8 as i8).to_string(),
            CellSize::Half => (value as u16 as i16).to_string(),
            CellSize::Word => (value as i32).to_string(),
        });
    }
    if modes.contains(SysModes::CHR) {
        let mut chars = String::new();
        for i in (0..u32::from(cell.len())).rev() {
            let byte = (value >> (8 * i)) as u8;
            chars.push(if (0x20..=0x7E).contains(&byte) {
                byte as char
            } else {
                '.'
            });
        }
        parts.push(chars);
    }
    parts.join(" ")
}

impl<C: Console> Interpreter<C> {
    /// Dispatch a `SYS` trap. The call number is operand A, or the low
    /// half of `EAX` when the operand is absent.
    pub(crate) fn sys(&mut self, a: &Operand) -> Result<ExecuteState, Fault> {
        let callno = match a {
            Operand::None => self.registers[EAX] & 0xFFFF,
            _ => self.read_operand(a)?,
        };
        match callno {
            0x1 => self.sys_read_cells()?,
            0x2 => self.sys_write_cells()?,
            0x3 => self.sys_read_string()?,
            0x4 => self.sys_print_string()?,
            0x7 => self.print("\x1b[2J\x1b[H")?,
            0xF => return self.breakpoint(),
            n => return Err(Fault::InvalidSysCall(n)),
        }
        Ok(ExecuteState::Proceed)
    }

    /// `ECX` packs `(cell << 16) | count`; the count lives in bits 15..8
    /// when non-zero, else in the full low half (legacy encoding). The
    /// buffer pointer is `EDX`.
    fn cell_args(&self) -> Result<(SysModes, CellSize, u16, LogicalAddr), Fault> {
        let modes = SysModes::from_bits_truncate(self.registers[EAX]);
        let ecx = self.registers[ECX];
        let cell = CellSize::from_len((ecx >> 16) as u16).ok_or(Fault::InvalidOperand)?;
        let packed = (ecx >> 8) & 0xFF;
        let count = if packed != 0 { packed as u16 } else { ecx as u16 };
        Ok((modes, cell, count, LogicalAddr::from_raw(self.registers[EDX])))
    }

    /// Offset of cell `i` in the buffer; overshooting the 16-bit offset
    /// space is a segment fault rather than a wrap-around.
    fn cell_offset(buf: LogicalAddr, cell: CellSize, index: u16) -> Result<u16, Fault> {
        let offset = u32::from(buf.offset()) + u32::from(index) * u32::from(cell.len());
        u16::try_from(offset).map_err(|_| Fault::SegmentFault)
    }

    fn sys_read_cells(&mut self) -> Result<(), Fault> {
        let (modes, cell, count, buf) = self.cell_args()?;
        for i in 0..count {
            let offset = Self::cell_offset(buf, cell, i)?;
            let phys = self.translate(buf.segment(), offset, cell.len())?;
            self.print(&format!("[{phys:04X}]: "))?;
            self.console.flush().map_err(|_| Fault::InputClosed)?;
            let line = self.read_line()?;
            let value = parse_input(modes, cell, &line)?;
            self.store(buf.segment(), offset, cell, value)?;
        }
        Ok(())
    }

    fn sys_write_cells(&mut self) -> Result<(), Fault> {
        let (modes, cell, count, buf) = self.cell_args()?;
        for i in 0..count {
            let offset = Self::cell_offset(buf, cell, i)?;
            let phys = self.translate(buf.segment(), offset, cell.len())?;
            let value = self.load(buf.segment(), offset, cell)?;
            let line = format!("[{phys:04X}]: {}\n", format_cell(modes, value, cell));
            self.print(&line)?;
        }
        Ok(())
    }

    /// One line into a NUL-terminated buffer of at most `ECX & 0xFFFF`
    /// bytes.
    fn sys_read_string(&mut self) -> Result<(), Fault> {
        let capacity = self.registers[ECX] & 0xFFFF;
        if capacity == 0 {
            return Ok(());
        }
        let buf = LogicalAddr::from_raw(self.registers[EDX]);
        let line = self.read_line()?;
        let bytes = line.as_bytes();
        let len = bytes.len().min(capacity as usize - 1);
        for (i, byte) in bytes[..len].iter().enumerate() {
            let offset = Self::cell_offset(buf, CellSize::Byte, i as u16)?;
            self.store(buf.segment(), offset, CellSize::Byte, u32::from(*byte))?;
        }
        let offset = Self::cell_offset(buf, CellSize::Byte, len as u16)?;
        self.store(buf.segment(), offset, CellSize::Byte, 0)
    }

    /// Print NUL-terminated bytes starting at `EDX`.
    fn sys_print_string(&mut self) -> Result<(), Fault> {
        let buf = LogicalAddr::from_raw(self.registers[EDX]);
        let mut text = String::new();
        for i in 0.. {
            let offset = Self::cell_offset(buf, CellSize::Byte, i)?;
            let byte = self.load(buf.segment(), offset, CellSize::Byte)? as u8;
            if byte == 0 {
                break;
            }
            text.push(byte as char);
        }
        self.print(&text)
    }

    pub(crate) fn print(&mut self, text: &str) -> Result<(), Fault> {
        self.console.print(text).map_err(|_| Fault::InputClosed)
    }

    pub(crate) fn read_line(&mut self) -> Result<String, Fault> {
        self.console
            .read_line()
            .map_err(|_| Fault::InputClosed)?
            .ok_or(Fault::InputClosed)
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;
    use vmx_asm::CellSize;

    use super::{format_cell, parse_input, SysModes};

    #[test_case("42", 42; "decimal")]
    #[test_case("-1", 0xFFFF_FFFF; "negative decimal")]
    #[test_case("0x2A", 42; "hex prefix")]
    #[test_case("0b101", 5; "binary prefix")]
    fn numeric_parse(line: &str, expected: u32) {
        assert_eq!(
            parse_input(SysModes::DEC, CellSize::Word, line),
            Ok(expected)
        );
    }

    #[test]
    fn first_recognized_base_wins() {
        assert_eq!(parse_input(SysModes::HEX, CellSize::Word, "ff"), Ok(0xFF));
        assert_eq!(parse_input(SysModes::OCT, CellSize::Word, "17"), Ok(0o17));
        assert_eq!(
            parse_input(SysModes::BIN | SysModes::HEX, CellSize::Word, "11"),
            Ok(0b11)
        );
    }

    #[test]
    fn character_mode_packs_big_endian() {
        assert_eq!(
            parse_input(SysModes::CHR, CellSize::Word, "AB"),
            Ok(0x4142_0000)
        );
        assert_eq!(parse_input(SysModes::CHR, CellSize::Byte, "AB"), Ok(0x41));
    }

    #[test]
    fn garbage_input_is_a_fault() {
        assert!(parse_input(SysModes::DEC, CellSize::Word, "four").is_err());
    }

    #[test]
    fn formats_in_fixed_order() {
        let all = SysModes::all();
        assert_eq!(
            format_cell(all, 0x41, CellSize::Byte),
            "0b1000001 0x41 0o101 65 A"
        );
    }

    #[test]
    fn binary_of_zero() {
        assert_eq!(format_cell(SysModes::BIN, 0, CellSize::Word), "0b0");
    }

    #[test]
    fn decimal_is_sized_to_the_cell() {
        assert_eq!(format_cell(SysModes::DEC, 0x80, CellSize::Byte), "-128");
        assert_eq!(format_cell(SysModes::DEC, 0x8000, CellSize::Half), "-32768");
        assert_eq!(format_cell(SysModes::DEC, 0x80, CellSize::Half), "128");
    }

    #[test]
    fn unprintable_chars_become_dots() {
        assert_eq!(format_cell(SysModes::CHR, 0x0041_0742, CellSize::Word), ".A.B");
    }
}
