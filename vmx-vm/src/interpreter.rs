//! [`Interpreter`] implementation.

use std::path::PathBuf;

use rand::rngs::StdRng;
use vmx_asm::regs::VM_REGISTER_COUNT;

use crate::consts::{RAM_DEFAULT_KIB, SEG_COUNT};
use crate::io::StdConsole;
use crate::segment::{SegmentDescriptor, SegmentMap};
use crate::state::Debugger;

mod alu;
mod constructors;
mod debug;
mod decoder;
mod executors;
mod flow;
mod initialization;
mod memory;
mod operand;
mod stack;
mod sys;

pub use decoder::Fetched;
pub use sys::SysModes;

/// Machine-wide knobs fixed at construction time.
#[derive(Debug, Clone)]
pub struct VmConfig {
    /// RAM size in KiB.
    pub ram_kib: u16,
    /// Hand every decoded instruction to the disassembler.
    pub disassemble: bool,
    /// Where the breakpoint trap saves snapshots.
    pub snapshot_path: Option<PathBuf>,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            ram_kib: RAM_DEFAULT_KIB,
            disassemble: false,
            snapshot_path: None,
        }
    }
}

/// VM interpreter: register file, RAM, segment table and the console the
/// `SYS` traps talk to.
///
/// The lifecycle is construct → [`init`](Self::init) (or
/// [`restore`](Self::restore) from a snapshot) → [`run`](Self::run).
#[derive(Debug)]
pub struct Interpreter<C> {
    pub(crate) registers: [u32; VM_REGISTER_COUNT],
    pub(crate) ram: Vec<u8>,
    pub(crate) segments: [SegmentDescriptor; SEG_COUNT],
    pub(crate) map: SegmentMap,
    pub(crate) console: C,
    pub(crate) rng: Option<StdRng>,
    pub(crate) debugger: Debugger,
    pub(crate) disassemble: bool,
}

impl<C> Interpreter<C> {
    /// Current state of the register file.
    pub const fn registers(&self) -> &[u32; VM_REGISTER_COUNT] {
        &self.registers
    }

    /// One register.
    pub fn register(&self, id: vmx_asm::regs::RegisterId) -> u32 {
        self.registers[id]
    }

    /// Current state of the VM memory.
    pub fn ram(&self) -> &[u8] {
        self.ram.as_slice()
    }

    /// The segment table.
    pub const fn segments(&self) -> &[SegmentDescriptor; SEG_COUNT] {
        &self.segments
    }

    /// Kind-to-slot map for the current image.
    pub const fn segment_map(&self) -> &SegmentMap {
        &self.map
    }

    /// The console behind the `SYS` traps.
    pub const fn console(&self) -> &C {
        &self.console
    }

    /// RAM size in KiB, as recorded in snapshots.
    pub fn ram_kib(&self) -> u16 {
        (self.ram.len() / 1024) as u16
    }
}

impl Interpreter<StdConsole> {
    /// Interpreter on the process terminal.
    pub fn new(config: VmConfig) -> Self {
        Self::with_console(StdConsole, config)
    }
}
