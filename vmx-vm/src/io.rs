//! Console seam used by the blocking `SYS` traps.

use std::io::{self, BufRead, Write};

/// Line-oriented terminal access.
///
/// The interpreter is generic over this trait so tests can script the
/// dialogue; the real machine talks to stdin/stdout.
pub trait Console {
    /// Read one line, without its terminator. `None` means the stream
    /// closed.
    fn read_line(&mut self) -> io::Result<Option<String>>;

    /// Write a chunk of output. No newline is appended.
    fn print(&mut self, text: &str) -> io::Result<()>;

    /// Flush pending output, called before a read prompt blocks.
    fn flush(&mut self) -> io::Result<()>;
}

/// [`Console`] over the process stdin/stdout.
#[derive(Debug, Default)]
pub struct StdConsole;

impl Console for StdConsole {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let n = io::stdin().lock().read_line(&mut line)?;
        if n == 0 {
            return Ok(None);
        }
        while line.ends_with(['\n', '\r']) {
            line.pop();
        }
        Ok(Some(line))
    }

    fn print(&mut self, text: &str) -> io::Result<()> {
        io::stdout().write_all(text.as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

/// Scripted console for tests: canned input lines, captured output.
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    input: std::collections::VecDeque<String>,
    output: String,
}

#[cfg(any(test, feature = "test-helpers"))]
impl ScriptedConsole {
    /// Console that will answer reads with `lines`, in order.
    pub fn with_input<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input: lines.into_iter().map(Into::into).collect(),
            output: String::new(),
        }
    }

    /// Everything the machine printed so far.
    pub fn output(&self) -> &str {
        &self.output
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl Console for ScriptedConsole {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.input.pop_front())
    }

    fn print(&mut self, text: &str) -> io::Result<()> {
        self.output.push_str(text);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
