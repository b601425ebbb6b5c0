//! Exposed constructors API for the [`Interpreter`].

use rand::rngs::StdRng;
use rand::SeedableRng;
use vmx_asm::regs::VM_REGISTER_COUNT;

use super::{Interpreter, VmConfig};
use crate::consts::{RAM_MAX_KIB, SEG_COUNT};
use crate::segment::SegmentMap;
use crate::state::Debugger;

impl<C> Interpreter<C> {
    /// Create an empty machine over the given console.
    ///
    /// RAM is zeroed and capped at [`RAM_MAX_KIB`]; no segment exists until
    /// an image is loaded.
    pub fn with_console(console: C, config: VmConfig) -> Self {
        let ram_kib = config.ram_kib.clamp(1, RAM_MAX_KIB);
        Self {
            registers: [0; VM_REGISTER_COUNT],
            ram: vec![0; usize::from(ram_kib) * 1024],
            segments: [Default::default(); SEG_COUNT],
            map: SegmentMap::default(),
            console,
            rng: None,
            debugger: Debugger {
                snapshot_path: config.snapshot_path,
                single_step: false,
            },
            disassemble: config.disassemble,
        }
    }

    /// Pin the `RND` sequence, for reproducible runs.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = Some(StdRng::seed_from_u64(seed));
        self
    }

    /// Recover the console, e.g. to inspect scripted output.
    pub fn into_console(self) -> C {
        self.console
    }
}

impl<C: Default> Default for Interpreter<C> {
    fn default() -> Self {
        Self::with_console(C::default(), VmConfig::default())
    }
}
