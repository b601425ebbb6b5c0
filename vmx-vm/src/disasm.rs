//! Disassembler hooks for the `-d` listing mode.
//!
//! The run loop hands every decoded instruction over before executing it;
//! before the first fetch it dumps the segment table and the constant
//! pool's strings. All listing output goes to stdout, separate from the
//! console the program itself talks to.

use crate::interpreter::{Fetched, Interpreter};
use crate::segment::SegmentKind;

impl<C> Interpreter<C> {
    /// Print one listing line: physical address, raw bytes, mnemonic and
    /// operands.
    pub(crate) fn disasm_line(&self, fetched: &Fetched) {
        let start = usize::from(fetched.phys);
        let raw = &self.ram[start..start + usize::from(fetched.size)];
        let bytes = raw
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ");
        println!("[{:04X}] {bytes} | {}", fetched.phys, fetched.inst);
    }

    /// Dump the segment table: slot, kind, base and size.
    pub(crate) fn dump_segments(&self) {
        println!("segments:");
        for kind in SegmentKind::PLACEMENT {
            let Some(slot) = self.map.slot(kind) else {
                continue;
            };
            let descriptor = self.segments[slot];
            println!(
                "  [{slot}] {:<5} base={:04X} size={:04X}",
                kind.name(),
                descriptor.base,
                descriptor.size
            );
        }
    }

    /// Dump the NUL-terminated strings packed in the constant segment.
    pub(crate) fn dump_const_strings(&self) {
        let Some(slot) = self.map.slot(SegmentKind::Const) else {
            return;
        };
        let descriptor = self.segments[slot];
        let start = usize::from(descriptor.base);
        let bytes = &self.ram[start..start + usize::from(descriptor.size)];

        println!("const strings:");
        for (offset, chunk) in split_strings(bytes) {
            println!("  [{offset:04X}] {chunk:?}");
        }
    }
}

/// NUL-terminated chunks of printable text, with their offsets.
fn split_strings(bytes: &[u8]) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, byte) in bytes.iter().enumerate() {
        if *byte == 0 {
            if i > start {
                let text: String = bytes[start..i]
                    .iter()
                    .map(|b| if (0x20..=0x7E).contains(b) { *b as char } else { '.' })
                    .collect();
                out.push((start, text));
            }
            start = i + 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::split_strings;

    #[test]
    fn splits_on_nul_and_masks_unprintables() {
        let bytes = b"hi\0\0a\x01b\0tail";
        let strings = split_strings(bytes);
        assert_eq!(strings, vec![(0, "hi".into()), (4, "a.b".into())]);
    }
}
