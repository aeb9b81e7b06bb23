//! AArch64 target support.

pub mod backend;
pub mod register_config;
pub mod registers;

pub use backend::Aarch64BackendFactory;
pub use register_config::Aarch64RegisterConfig;
pub use registers::aarch64;
