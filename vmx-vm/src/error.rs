//! Runtime and loader error types.

use std::io;

use thiserror::Error;

/// Runtime fault taxonomy. Every fault is fatal to the current run; the
/// `Display` form is the one-line diagnostic printed by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum Fault {
    /// A data access fell outside its segment, or named an unused slot.
    #[error("segment fault")]
    SegmentFault,
    /// Instruction fetch failed to translate.
    #[error("invalid instruction")]
    InvalidFetch,
    /// The decoder met an opcode outside every size class, or a reserved
    /// operand encoding.
    #[error("invalid instruction OPC={0:02X}")]
    InvalidOpcode(u8),
    /// The operand shape is not allowed for the instruction, e.g. a write
    /// to an immediate.
    #[error("invalid operand for instruction")]
    InvalidOperand,
    /// `DIV` with a zero divisor.
    #[error("division by zero")]
    DivisionByZero,
    /// A push would move `SP` below the stack segment.
    #[error("stack overflow")]
    StackOverflow,
    /// A pop would move `SP` past the top of the stack segment.
    #[error("stack underflow")]
    StackUnderflow,
    /// `SYS` with an unknown call number.
    #[error("invalid system call {0}")]
    InvalidSysCall(u32),
    /// A blocking read could not parse the line it was given.
    #[error("invalid input")]
    InvalidInput,
    /// The input stream closed inside a blocking `SYS` trap.
    #[error("input stream closed")]
    InputClosed,
    /// The operator quit from the breakpoint prompt.
    #[error("aborted")]
    Aborted,
}

/// Program image and snapshot parse failures.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The file does not start with the expected magic.
    #[error("invalid image magic")]
    BadMagic,
    /// The version byte names a format this machine does not speak.
    #[error("unsupported image version {0}")]
    UnsupportedVersion(u8),
    /// The header ended before all of its fields.
    #[error("truncated image header")]
    TruncatedHeader,
    /// The file holds fewer code bytes than the header promised.
    #[error("image is missing code bytes: expected {0}")]
    TruncatedCode(u16),
    /// The file holds fewer constant bytes than the header promised.
    #[error("image is missing constant bytes: expected {0}")]
    TruncatedConst(u16),
    /// Program arguments do not fit in a parameter segment.
    #[error("program arguments exceed the parameter segment")]
    ParamsTooLarge,
    /// The segment layout does not fit in the configured RAM.
    #[error("not enough memory to host the process image")]
    OutOfMemory,
    /// The snapshot ended before registers, segments and RAM were read.
    #[error("truncated snapshot")]
    TruncatedSnapshot,
    /// The snapshot declares a RAM size this machine cannot host.
    #[error("invalid snapshot RAM size")]
    BadRamSize,
}

/// Top-level error for loading and running a program.
#[derive(Debug, Error)]
pub enum VmError {
    /// The program faulted at runtime.
    #[error(transparent)]
    Fault(#[from] Fault),
    /// The image or snapshot could not be loaded.
    #[error(transparent)]
    Image(#[from] ImageError),
    /// An operating system error outside the VM's control.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl VmError {
    /// The runtime fault behind this error, if that is what it is.
    pub const fn fault(&self) -> Option<Fault> {
        match self {
            Self::Fault(fault) => Some(*fault),
            _ => None,
        }
    }
}
