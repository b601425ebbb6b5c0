//! VMX virtual machine implementation.
//!
//! The machine executes programs compiled to the VMX bytecode format over a
//! small segmented memory: a flat byte-addressable RAM partitioned into up
//! to eight logical segments, with every program address expressed as a
//! `(segment, offset)` pair that is translated and bounds-checked on each
//! access.

pub mod consts;
pub mod disasm;
pub mod error;
pub mod image;
pub mod interpreter;
pub mod io;
pub mod segment;
pub mod snapshot;
pub mod state;

#[cfg(any(test, feature = "test-helpers"))]
pub mod util;

pub mod prelude {
    //! Re-exports of the types needed to load and run a program.

    pub use vmx_asm::regs::{self, RegisterId};
    pub use vmx_asm::{CellSize, Instruction, Opcode, Operand, Sector};

    pub use crate::error::{Fault, ImageError, VmError};
    pub use crate::image::VmxFile;
    pub use crate::interpreter::{Interpreter, VmConfig};
    pub use crate::io::{Console, StdConsole};
    pub use crate::segment::{LogicalAddr, SegmentDescriptor, SegmentKind};
    pub use crate::state::ExecuteState;

    #[cfg(any(test, feature = "test-helpers"))]
    pub use crate::io::ScriptedConsole;
}
