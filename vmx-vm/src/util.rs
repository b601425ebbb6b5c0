//! Test helpers: on-disk image construction and pre-wired machines.

use crate::error::VmError;
use crate::image::VmxFile;
use crate::interpreter::{Interpreter, VmConfig};
use crate::io::ScriptedConsole;

/// A v1 image: magic, version, code size, code.
pub fn vmx_v1(code: &[u8]) -> Vec<u8> {
    let mut out = b"VMX25\x01".to_vec();
    out.extend_from_slice(&(code.len() as u16).to_be_bytes());
    out.extend_from_slice(code);
    out
}

/// A v2 image with explicit segment sizes.
#[derive(Debug, Default, Clone)]
pub struct ImageBuilder {
    code: Vec<u8>,
    consts: Vec<u8>,
    data_size: u16,
    extra_size: u16,
    stack_size: u16,
    entry: u16,
}

impl ImageBuilder {
    /// Builder over the given code bytes.
    pub fn new(code: impl Into<Vec<u8>>) -> Self {
        Self {
            code: code.into(),
            ..Default::default()
        }
    }

    /// Ship a constant pool.
    pub fn consts(mut self, consts: impl Into<Vec<u8>>) -> Self {
        self.consts = consts.into();
        self
    }

    /// Declare a data segment.
    pub fn data(mut self, size: u16) -> Self {
        self.data_size = size;
        self
    }

    /// Declare an extra segment.
    pub fn extra(mut self, size: u16) -> Self {
        self.extra_size = size;
        self
    }

    /// Declare a stack segment.
    pub fn stack(mut self, size: u16) -> Self {
        self.stack_size = size;
        self
    }

    /// Set the entry offset.
    pub fn entry(mut self, entry: u16) -> Self {
        self.entry = entry;
        self
    }

    /// Serialize as a v2 VMX file.
    pub fn build(self) -> Vec<u8> {
        let mut out = b"VMX25\x02".to_vec();
        for size in [
            self.code.len() as u16,
            self.data_size,
            self.extra_size,
            self.stack_size,
            self.consts.len() as u16,
            self.entry,
        ] {
            out.extend_from_slice(&size.to_be_bytes());
        }
        out.extend_from_slice(&self.code);
        out.extend_from_slice(&self.consts);
        out
    }
}

/// Parse `image`, load it with `params`, and wire a scripted console that
/// will answer reads with `input`.
pub fn boot<'a>(
    image: &[u8],
    params: impl IntoIterator<Item = &'a str>,
    input: impl IntoIterator<Item = &'a str>,
) -> Result<Interpreter<ScriptedConsole>, VmError> {
    let file = VmxFile::parse(image)?;
    let mut vm = Interpreter::with_console(
        ScriptedConsole::with_input(input),
        VmConfig::default(),
    )
    .with_rng_seed(0x5EED);
    let params: Vec<String> = params.into_iter().map(str::to_owned).collect();
    vm.init(&file, &params)?;
    Ok(vm)
}

/// [`boot`] with no parameters and no console input.
pub fn boot_code(image: &[u8]) -> Result<Interpreter<ScriptedConsole>, VmError> {
    boot(image, [], [])
}
