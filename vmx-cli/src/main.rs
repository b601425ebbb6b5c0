//! `vmx` — run VMX programs and VMI snapshots.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use vmx_vm::prelude::*;

#[derive(Debug, Parser)]
#[command(name = "vmx", version, about = "VMX virtual machine")]
struct Opts {
    /// A `.vmx` program, a `.vmi` snapshot, or both; anything else is
    /// passed to the program as an argument.
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Print a disassembly listing while executing.
    #[arg(short = 'd', long)]
    disassemble: bool,

    /// RAM size in KiB.
    #[arg(
        short = 'm',
        long = "ram",
        default_value_t = 16,
        value_parser = clap::value_parser!(u16).range(1..=64)
    )]
    ram_kib: u16,

    /// Program arguments placed in the parameter segment.
    #[arg(short = 'p', long = "params", num_args = 1..)]
    params: Vec<String>,
}

/// How the positional inputs split up: program image, snapshot, and
/// loose program arguments.
#[derive(Debug, Default, PartialEq, Eq)]
struct Inputs {
    vmx: Option<PathBuf>,
    vmi: Option<PathBuf>,
    params: Vec<String>,
}

fn classify(inputs: &[String]) -> Inputs {
    let mut out = Inputs::default();
    for input in inputs {
        if input.ends_with(".vmx") && out.vmx.is_none() {
            out.vmx = Some(PathBuf::from(input));
        } else if input.ends_with(".vmi") && out.vmi.is_none() {
            out.vmi = Some(PathBuf::from(input));
        } else {
            out.params.push(input.clone());
        }
    }
    out
}

fn run(opts: Opts) -> Result<(), VmError> {
    let mut inputs = classify(&opts.inputs);
    inputs.params.extend(opts.params);

    if inputs.vmx.is_none() && inputs.vmi.is_none() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "a .vmx program or .vmi snapshot is required",
        )
        .into());
    }

    let config = VmConfig {
        ram_kib: opts.ram_kib,
        disassemble: opts.disassemble,
        snapshot_path: inputs.vmi.clone(),
    };
    let mut vm = Interpreter::new(config);

    match (&inputs.vmx, &inputs.vmi) {
        (Some(vmx), _) => {
            let image = VmxFile::open(vmx)?;
            vm.init(&image, &inputs.params)?;
            tracing::debug!(path = %vmx.display(), "program loaded");
        }
        (None, Some(vmi)) => vm.restore(vmi)?,
        (None, None) => unreachable!(),
    }

    vm.run()
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    match run(Opts::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn classifies_by_extension() {
        let inputs = classify(&strings(&["prog.vmx", "dump.vmi", "12", "abc"]));
        assert_eq!(inputs.vmx, Some(PathBuf::from("prog.vmx")));
        assert_eq!(inputs.vmi, Some(PathBuf::from("dump.vmi")));
        assert_eq!(inputs.params, strings(&["12", "abc"]));
    }

    #[test]
    fn loose_arguments_become_params() {
        let inputs = classify(&strings(&["prog.vmx", "hello"]));
        assert_eq!(inputs.params, strings(&["hello"]));
    }

    #[test]
    fn opts_parse_with_flags() {
        let opts = Opts::parse_from(["vmx", "prog.vmx", "-d", "-m", "32", "-p", "a", "b"]);
        assert!(opts.disassemble);
        assert_eq!(opts.ram_kib, 32);
        assert_eq!(opts.params, strings(&["a", "b"]));
    }
}
