//! Runtime state representation for the VM.

use std::path::PathBuf;

/// Resulting state of a single instruction execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ExecuteState {
    /// The VM should proceed with the next instruction.
    #[default]
    Proceed,
    /// The instruction halted the machine (`STOP`, or a `RET` that popped
    /// the boot sentinel).
    Halt,
}

impl ExecuteState {
    /// Whether the run loop should keep fetching.
    pub const fn should_continue(&self) -> bool {
        matches!(self, Self::Proceed)
    }
}

/// Breakpoint-trap state: where snapshots go and whether the machine is
/// being single-stepped.
#[derive(Debug, Clone, Default)]
pub struct Debugger {
    /// Snapshot target, set from the front-end's `.vmi` path.
    pub snapshot_path: Option<PathBuf>,
    /// Set by the prompt to pause again after the next instruction.
    pub single_step: bool,
}
