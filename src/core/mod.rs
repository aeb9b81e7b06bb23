// This module holds the architecture-neutral building blocks of the compiler interface:
// value kinds and method descriptors, register identities and register sets, architecture
// and target descriptors, calling convention locations together with the assigner that
// produces them, the RegisterConfig trait implemented per architecture, the VM
// configuration snapshot and the crate-wide error type. Nothing here owns global state.

//! Core types shared by all architectures.
//!
//! # Key Components
//!
//! ## Registers (`register`, `register_config`)
//! - Statically enumerated registers, number-keyed register sets
//! - Allocatable and caller-saved set construction
//!
//! ## Calling conventions (`calling_convention`)
//! - Register-or-stack [`Location`] sum type
//! - Lane-aware assignment of parameters and return values

pub mod arch;
pub mod calling_convention;
pub mod error;
pub mod kind;
pub mod register;
pub mod register_config;
pub mod signature;
pub mod vm_config;

pub use arch::{ArchKind, Architecture, TargetDescription};
pub use calling_convention::{CallingConvention, CallingConventionType, Location, StackSlot};
pub use error::{CiError, CiResult};
pub use kind::{Lane, ValueKind};
pub use register::{Register, RegisterAttributes, RegisterCategory, RegisterSet};
pub use register_config::RegisterConfig;
pub use signature::Signature;
pub use vm_config::VmConfig;
