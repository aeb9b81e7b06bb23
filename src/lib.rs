//! jitci - compiler interface between a managed-language VM and pluggable JIT compilers.
//!
//! The crate describes each target's register file and calling conventions,
//! registers one backend per architecture, selects the system compiler and
//! exposes a runtime facade the execution engine calls into.
//!
//! # Primary Usage
//!
//! ```ignore
//! use jitci::{CallingConventionType, RegisterConfig, Runtime, ValueKind};
//!
//! let runtime = Runtime::init_global(Runtime::builder())?;
//! let cc = runtime
//!     .host_backend()
//!     .register_config()
//!     .calling_convention(CallingConventionType::ManagedCall, ValueKind::Int, &[ValueKind::Long]);
//! ```
//!
//! # Architecture
//!
//! - [`core`] - Value kinds, registers, calling conventions, configuration
//! - [`x64`] - x86-64 register file, register configuration and disassembler
//! - [`aarch64`] - AArch64 register file and register configuration
//! - [`runtime`] - Backends, code cache, compiler selection, runtime facade

pub mod aarch64;
pub mod core;
pub mod runtime;
pub mod x64;

pub use crate::core::{
    CallingConvention, CallingConventionType, CiError, CiResult, Location, Register, RegisterConfig,
    ValueKind, VmConfig,
};
pub use crate::runtime::{Runtime, RuntimeBuilder, ServiceRegistry};
