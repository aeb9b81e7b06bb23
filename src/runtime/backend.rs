//! Backends and the per-architecture backend registry.

use super::code_cache::{CodeCache, DisassembleFn};
use crate::core::arch::{ArchKind, TargetDescription};
use crate::core::error::{CiError, CiResult};
use crate::core::register_config::RegisterConfig;
use crate::core::vm_config::VmConfig;
use hashbrown::HashMap;
use std::sync::Arc;

/// Architecture-specific bundle of register configuration and code cache.
pub struct Backend {
    target: TargetDescription,
    register_config: Arc<dyn RegisterConfig>,
    code_cache: CodeCache,
}

impl Backend {
    pub fn new(
        target: TargetDescription,
        register_config: Arc<dyn RegisterConfig>,
        disassembler: Option<DisassembleFn>,
    ) -> Self {
        let code_cache = CodeCache::new(target.clone(), disassembler);
        Self {
            target,
            register_config,
            code_cache,
        }
    }

    pub fn arch_kind(&self) -> ArchKind {
        self.target.arch.kind
    }

    pub fn target(&self) -> &TargetDescription {
        &self.target
    }

    pub fn register_config(&self) -> &dyn RegisterConfig {
        self.register_config.as_ref()
    }

    pub fn code_cache(&self) -> &CodeCache {
        &self.code_cache
    }
}

/// Creates the backend for one architecture.
pub trait BackendFactory: Send + Sync {
    /// Architecture name matched case-insensitively against the VM's host architecture.
    fn architecture(&self) -> &'static str;

    /// Build the backend. `host` is the host backend when creating a
    /// secondary backend, `None` when creating the host backend itself.
    fn create_backend(&self, config: &VmConfig, host: Option<&Backend>) -> CiResult<Backend>;
}

/// Find the factory for `architecture` among `factories`, first match wins.
pub fn find_factory(
    factories: &[Arc<dyn BackendFactory>],
    architecture: &str,
) -> CiResult<Arc<dyn BackendFactory>> {
    factories
        .iter()
        .find(|f| f.architecture().eq_ignore_ascii_case(architecture))
        .cloned()
        .ok_or_else(|| CiError::UnsupportedArchitecture {
            arch: architecture.to_string(),
        })
}

/// One backend per architecture.
///
/// Written only during single-threaded startup; afterwards it is only read,
/// so concurrent lookups need no synchronization.
#[derive(Default)]
pub struct BackendRegistry {
    backends: HashMap<ArchKind, Arc<Backend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `backend` for its architecture.
    ///
    /// # Panics
    /// If a backend for the same architecture is already registered.
    pub fn register(&mut self, backend: Backend) -> Arc<Backend> {
        let arch = backend.arch_kind();
        let backend = Arc::new(backend);
        let old = self.backends.insert(arch, backend.clone());
        assert!(
            old.is_none(),
            "cannot overwrite existing backend for architecture {}",
            arch
        );
        log::debug!("registered backend for {}", arch);
        backend
    }

    pub fn get(&self, arch: ArchKind) -> Option<&Arc<Backend>> {
        self.backends.get(&arch)
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ArchKind, &Arc<Backend>)> {
        self.backends.iter().map(|(k, v)| (*k, v))
    }
}
