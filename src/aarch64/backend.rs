//! AArch64 backend factory.

use super::register_config::Aarch64RegisterConfig;
use super::registers::aarch64;
use crate::core::arch::TargetDescription;
use crate::core::error::{CiError, CiResult};
use crate::core::register_config::RegisterConfig;
use crate::core::vm_config::VmConfig;
use crate::runtime::backend::{Backend, BackendFactory};
use std::sync::Arc;

/// Builds the AArch64 backend. There is no AArch64 disassembler.
#[derive(Debug, Default, Clone, Copy)]
pub struct Aarch64BackendFactory;

impl BackendFactory for Aarch64BackendFactory {
    fn architecture(&self) -> &'static str {
        "aarch64"
    }

    fn create_backend(&self, config: &VmConfig, _host: Option<&Backend>) -> CiResult<Backend> {
        let arch = aarch64();
        if config.word_size != arch.word_size {
            return Err(CiError::WordSizeMismatch {
                arch: self.architecture(),
                expected: arch.word_size,
                actual: config.word_size,
            });
        }
        let target = TargetDescription::new(arch, 16, true);
        let register_config = Aarch64RegisterConfig::new(target.clone(), config)?;
        log::debug!(
            "aarch64 backend: {} allocatable registers, compressed oops {}",
            register_config.allocatable_registers().len(),
            config.use_compressed_oops
        );
        Ok(Backend::new(target, Arc::new(register_config), None))
    }
}
