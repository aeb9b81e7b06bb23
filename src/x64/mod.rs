//! x86-64 architecture-specific components.
//!
//! - Register file and the x86-64 architecture descriptor
//! - Register configuration (allocatable set, calling conventions)
//! - Backend factory and iced-x86 based disassembly of installed code

pub mod backend;
pub mod disasm;
pub mod register_config;
pub mod registers;

pub use backend::Amd64BackendFactory;
pub use register_config::Amd64RegisterConfig;
pub use registers::amd64;
