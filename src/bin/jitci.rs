//! Inspection tool for the jitci compiler interface.
//!
//! Prints runtime options, VM configuration, register sets and calling
//! conventions, and can push a compilation request through the runtime.

use clap::{Args, Parser, Subcommand};
use jitci::core::signature::Signature;
use jitci::core::vm_config::VmConfig;
use jitci::core::CallingConventionType;
use jitci::runtime::backend::{find_factory, Backend};
use jitci::runtime::compiler::{MethodRef, INVOCATION_ENTRY_BCI};
use jitci::runtime::options::Options;
use jitci::runtime::{Runtime, ServiceRegistry};
use jitci::RegisterConfig;
use std::io;

#[derive(Parser, Debug)]
#[command(name = "jitci")]
#[command(about = "Inspect the jitci compiler interface", long_about = None)]
struct Cli {
    /// Runtime option property, e.g. -D jitci.Compiler=stub
    #[arg(short = 'D', value_parser = parse_property, global = true)]
    properties: Vec<(String, String)>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print all runtime options
    Flags,
    /// Print the VM configuration
    Config(TargetArgs),
    /// Print allocatable and caller-saved registers
    Registers(TargetArgs),
    /// Print the calling convention of a method descriptor
    Cc {
        /// Method descriptor, e.g. (IJLjava/lang/Object;D)V
        descriptor: String,

        /// Use the native convention
        #[arg(long, conflicts_with = "callee")]
        native: bool,

        /// Use the managed convention from the callee's view
        #[arg(long)]
        callee: bool,

        #[command(flatten)]
        target: TargetArgs,
    },
    /// Dispatch a compilation request and print the result
    Compile {
        holder: String,
        name: String,
        descriptor: String,

        /// Entry bytecode index for an OSR compilation
        #[arg(long)]
        osr_bci: Option<i32>,

        #[command(flatten)]
        target: TargetArgs,
    },
}

#[derive(Args, Debug)]
struct TargetArgs {
    /// Architecture name (defaults to the host)
    #[arg(short, long)]
    arch: Option<String>,

    /// Reserve the heap base register for compressed references
    #[arg(long)]
    compressed_oops: bool,

    /// Use the Windows x64 conventions
    #[arg(long)]
    windows: bool,
}

impl TargetArgs {
    fn vm_config(&self) -> VmConfig {
        let config = match &self.arch {
            Some(arch) => VmConfig::for_architecture(arch),
            None => VmConfig::host(),
        };
        let windows = self.windows || config.windows_os;
        config
            .with_compressed_oops(self.compressed_oops)
            .with_windows_os(windows)
    }
}

fn parse_property(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    Ok((key.to_string(), value.to_string()))
}

fn host_backend(config: &VmConfig) -> Result<Backend, Box<dyn std::error::Error>> {
    let services = ServiceRegistry::with_builtin_backends();
    let factory = find_factory(services.backend_factories(), &config.host_architecture)?;
    Ok(factory.create_backend(config, None)?)
}

fn names(regs: &[jitci::Register]) -> String {
    regs.iter().map(|r| r.name).collect::<Vec<_>>().join(", ")
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = Options::from_env();
    options.apply_properties(cli.properties.iter().map(|(k, v)| (k, v)));

    match cli.command {
        Command::Flags => options.print_flags(&mut io::stdout().lock())?,
        Command::Config(target) => print!("{}", target.vm_config()),
        Command::Registers(target) => {
            let backend = host_backend(&target.vm_config())?;
            let cfg = backend.register_config();
            println!("Architecture: {}", cfg.architecture().name());
            println!("Allocatable: [{}]", names(cfg.allocatable_registers()));
            println!("CallerSave:  [{}]", names(cfg.caller_save_registers()));
            println!("Frame:       {}", cfg.frame_register());
        }
        Command::Cc {
            descriptor,
            native,
            callee,
            target,
        } => {
            let signature = Signature::parse(&descriptor)?;
            let ty = if native {
                CallingConventionType::NativeCall
            } else if callee {
                CallingConventionType::ManagedCallee
            } else {
                CallingConventionType::ManagedCall
            };
            let backend = host_backend(&target.vm_config())?;
            let cc = backend.register_config().calling_convention(
                ty,
                signature.return_kind(),
                signature.parameters(),
            );
            println!("{} {:?}", signature, ty);
            println!("{}", cc);
        }
        Command::Compile {
            holder,
            name,
            descriptor,
            osr_bci,
            target,
        } => {
            let method = MethodRef::parse(holder, name, &descriptor)?;
            let runtime = Runtime::builder()
                .config(target.vm_config())
                .options(options)
                .build()?;
            let result = runtime.compile_method(method, osr_bci.unwrap_or(INVOCATION_ENTRY_BCI), 0, 1);
            println!("{}", result);
            print!("{}", runtime.stats());
            runtime.shutdown()?;
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
