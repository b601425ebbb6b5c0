//! Breakpoint trap: snapshot-then-prompt, with single stepping.

use super::Interpreter;
use crate::error::Fault;
use crate::io::Console;
use crate::state::ExecuteState;

impl<C: Console> Interpreter<C> {
    /// `SYS 0xF`. Saves a snapshot when a target path is configured, then
    /// prompts: `g` resumes free running, `q` aborts the run, and a bare
    /// return executes one instruction before pausing again.
    pub(crate) fn breakpoint(&mut self) -> Result<ExecuteState, Fault> {
        self.debugger.single_step = false;
        self.save_breakpoint_snapshot();

        loop {
            self.print("dbg> ")?;
            self.console.flush().map_err(|_| Fault::InputClosed)?;
            match self.read_line()?.trim() {
                "g" => return Ok(ExecuteState::Proceed),
                "q" => return Err(Fault::Aborted),
                "" => {
                    self.debugger.single_step = true;
                    return Ok(ExecuteState::Proceed);
                }
                _ => self.print("g = continue, q = quit, enter = step\n")?,
            }
        }
    }

    /// Re-entered by the run loop after each single-stepped instruction.
    pub(crate) fn step_pause(&mut self) -> Result<ExecuteState, Fault> {
        self.breakpoint()
    }

    fn save_breakpoint_snapshot(&mut self) {
        let Some(path) = self.debugger.snapshot_path.clone() else {
            return;
        };
        if let Err(err) = self.save_snapshot(&path) {
            tracing::warn!(path = %path.display(), %err, "snapshot save failed");
        }
    }
}
