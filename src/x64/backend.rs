//! x86-64 backend factory.
//!
//! Builds the x86-64 target description, register configuration and code
//! cache (with an iced-x86 disassembler) from the VM configuration.

use super::disasm::disassemble;
use super::register_config::Amd64RegisterConfig;
use super::registers::amd64;
use crate::core::arch::TargetDescription;
use crate::core::error::{CiError, CiResult};
use crate::core::register_config::RegisterConfig;
use crate::core::vm_config::VmConfig;
use crate::runtime::backend::{Backend, BackendFactory};
use std::sync::Arc;

/// Stack alignment required at call sites.
const STACK_ALIGNMENT: usize = 16;

/// Factory for the x86-64 backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct Amd64BackendFactory;

impl BackendFactory for Amd64BackendFactory {
    fn architecture(&self) -> &'static str {
        "amd64"
    }

    fn create_backend(&self, config: &VmConfig, _host: Option<&Backend>) -> CiResult<Backend> {
        let arch = amd64();
        if config.word_size != arch.word_size {
            return Err(CiError::WordSizeMismatch {
                arch: arch.name(),
                expected: arch.word_size,
                actual: config.word_size,
            });
        }

        let target = TargetDescription::new(arch, STACK_ALIGNMENT, true);
        let register_config = Amd64RegisterConfig::new(target.clone(), config)?;
        log::debug!(
            "amd64 backend: {} allocatable registers, compressed oops {}, windows {}",
            register_config.allocatable_registers().len(),
            config.use_compressed_oops,
            config.windows_os
        );
        Ok(Backend::new(target, Arc::new(register_config), Some(disassemble)))
    }
}
