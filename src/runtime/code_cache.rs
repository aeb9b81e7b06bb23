// This module implements the code cache owned by each backend. Compilers hand finished
// CompiledArtifacts to the runtime, which installs them here and receives an InstalledCode
// handle in return. The handle carries a synthetic entry address, a version counter and a
// validity flag. Invalidation removes the code from the cache and bumps the version; any
// later attempt to execute the handle fails with CiError::InvalidInstalledCode so the
// execution engine can re-resolve or recompile. Execution itself is delegated to a
// CodeExecutor supplied by the engine, since only the engine knows how to enter compiled
// frames. Installation may happen concurrently from several compiler threads, so the map
// of live code is guarded by a mutex and ids/addresses come from atomic counters.

//! Code cache and installed code handles.

use crate::core::arch::TargetDescription;
use crate::core::error::{CiError, CiResult};
use hashbrown::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

/// Disassembler for one architecture: `(code, load address) -> listing`.
pub type DisassembleFn = fn(&[u8], u64) -> String;

/// Base of the synthetic address range handed out to installed code.
const CODE_BASE_ADDRESS: u64 = 0x7f00_0000_0000;

/// Alignment of installed code entries.
const CODE_ENTRY_ALIGNMENT: u64 = 32;

/// A managed value passed to or returned from installed code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// Opaque object handle owned by the execution engine.
    Object(u64),
    Null,
    Void,
}

/// Compiled code produced by a compiler for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledArtifact {
    pub name: String,
    /// Machine code.
    pub code: Vec<u8>,
    /// Frame size of the compiled method in bytes.
    pub total_frame_size: usize,
    /// Id of the compilation request that produced this artifact, if any.
    pub request_id: Option<i32>,
}

impl CompiledArtifact {
    pub fn new(name: impl Into<String>, code: Vec<u8>, total_frame_size: usize) -> Self {
        Self {
            name: name.into(),
            code,
            total_frame_size,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, id: i32) -> Self {
        self.request_id = Some(id);
        self
    }
}

/// Entry into compiled frames, provided by the execution engine.
pub trait CodeExecutor: Send + Sync {
    fn execute(&self, code: &InstalledCode, args: &[Value]) -> CiResult<Value>;
}

/// Handle to code accepted into the code cache.
pub struct InstalledCode {
    id: u64,
    name: String,
    address: u64,
    version: AtomicU64,
    valid: AtomicBool,
    artifact: Arc<CompiledArtifact>,
    executor: Option<Arc<dyn CodeExecutor>>,
}

impl InstalledCode {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entry address, 0 once invalidated.
    pub fn address(&self) -> u64 {
        if self.is_valid() {
            self.address
        } else {
            0
        }
    }

    /// Incremented every time the code is invalidated.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    pub fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Acquire)
    }

    pub fn artifact(&self) -> &CompiledArtifact {
        &self.artifact
    }

    pub fn code(&self) -> &[u8] {
        &self.artifact.code
    }

    fn invalidate(&self) -> bool {
        let was_valid = self.valid.swap(false, Ordering::AcqRel);
        if was_valid {
            self.version.fetch_add(1, Ordering::AcqRel);
        }
        was_valid
    }

    /// Execute the code with `args`.
    ///
    /// Fails with [`CiError::InvalidInstalledCode`] if the code was invalidated
    /// since installation. Callers are expected to re-resolve and retry.
    pub fn execute(&self, args: &[Value]) -> CiResult<Value> {
        if !self.is_valid() {
            return Err(CiError::InvalidInstalledCode {
                name: self.name.clone(),
            });
        }
        let executor = self.executor.as_ref().ok_or_else(|| CiError::NotExecutable {
            name: self.name.clone(),
        })?;
        executor.execute(self, args)
    }
}

impl fmt::Debug for InstalledCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstalledCode")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("address", &format_args!("{:#x}", self.address))
            .field("version", &self.version())
            .field("valid", &self.is_valid())
            .finish()
    }
}

/// Installed code of one backend.
pub struct CodeCache {
    target: TargetDescription,
    disassembler: Option<DisassembleFn>,
    executor: OnceLock<Arc<dyn CodeExecutor>>,
    installed: Mutex<HashMap<u64, Arc<InstalledCode>>>,
    next_id: AtomicU64,
    next_address: AtomicU64,
}

impl CodeCache {
    pub fn new(target: TargetDescription, disassembler: Option<DisassembleFn>) -> Self {
        Self {
            target,
            disassembler,
            executor: OnceLock::new(),
            installed: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            next_address: AtomicU64::new(CODE_BASE_ADDRESS),
        }
    }

    pub fn target(&self) -> &TargetDescription {
        &self.target
    }

    /// Attach the execution engine's executor. Only the first call has an effect.
    pub fn attach_executor(&self, executor: Arc<dyn CodeExecutor>) -> bool {
        self.executor.set(executor).is_ok()
    }

    /// Install `artifact` and return its handle.
    pub fn add_code(&self, artifact: CompiledArtifact) -> Arc<InstalledCode> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let span = (artifact.code.len() as u64).max(1).div_ceil(CODE_ENTRY_ALIGNMENT) * CODE_ENTRY_ALIGNMENT;
        let address = self.next_address.fetch_add(span, Ordering::Relaxed);

        let installed = Arc::new(InstalledCode {
            id,
            name: artifact.name.clone(),
            address,
            version: AtomicU64::new(0),
            valid: AtomicBool::new(true),
            artifact: Arc::new(artifact),
            executor: self.executor.get().cloned(),
        });

        log::debug!(
            "installed '{}' ({} bytes) at {:#x} as id {}",
            installed.name,
            installed.code().len(),
            address,
            id
        );
        self.lock_installed().insert(id, installed.clone());
        installed
    }

    /// Invalidate installed code. Returns `false` if it was already invalid.
    pub fn invalidate(&self, code: &InstalledCode) -> bool {
        self.lock_installed().remove(&code.id);
        let invalidated = code.invalidate();
        if invalidated {
            log::debug!("invalidated '{}' (id {})", code.name, code.id);
        }
        invalidated
    }

    /// Look up live code by id.
    pub fn lookup(&self, id: u64) -> Option<Arc<InstalledCode>> {
        self.lock_installed().get(&id).cloned()
    }

    /// Number of live installed code blobs.
    pub fn installed_count(&self) -> usize {
        self.lock_installed().len()
    }

    /// Disassembly of installed code, if this architecture has a disassembler.
    pub fn disassemble(&self, code: &InstalledCode) -> Option<String> {
        let disassemble = self.disassembler?;
        Some(disassemble(code.code(), code.address))
    }

    fn lock_installed(&self) -> std::sync::MutexGuard<'_, HashMap<u64, Arc<InstalledCode>>> {
        self.installed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::x64::registers::amd64;

    struct EchoFirst;

    impl CodeExecutor for EchoFirst {
        fn execute(&self, _code: &InstalledCode, args: &[Value]) -> CiResult<Value> {
            Ok(args.first().copied().unwrap_or(Value::Void))
        }
    }

    fn cache() -> CodeCache {
        CodeCache::new(TargetDescription::new(amd64(), 16, true), None)
    }

    #[test]
    fn test_install_assigns_distinct_aligned_addresses() {
        let cache = cache();
        let a = cache.add_code(CompiledArtifact::new("a", vec![0xC3; 40], 16));
        let b = cache.add_code(CompiledArtifact::new("b", vec![0xC3], 16));
        assert_ne!(a.id(), b.id());
        assert_eq!(a.address() % CODE_ENTRY_ALIGNMENT, 0);
        assert_eq!(b.address(), a.address() + 64);
        assert_eq!(cache.installed_count(), 2);
        assert!(cache.lookup(a.id()).is_some());
    }

    #[test]
    fn test_invalidated_code_cannot_execute() {
        let cache = cache();
        assert!(cache.attach_executor(Arc::new(EchoFirst)));
        let code = cache.add_code(CompiledArtifact::new("m", vec![0xC3], 0));
        assert_eq!(code.execute(&[Value::Int(7)]).unwrap(), Value::Int(7));

        assert!(cache.invalidate(&code));
        assert!(!cache.invalidate(&code));
        assert_eq!(code.version(), 1);
        assert_eq!(code.address(), 0);
        assert!(cache.lookup(code.id()).is_none());
        assert!(matches!(
            code.execute(&[Value::Int(7)]),
            Err(CiError::InvalidInstalledCode { name }) if name == "m"
        ));
    }

    #[test]
    fn test_execute_without_executor() {
        let cache = cache();
        let code = cache.add_code(CompiledArtifact::new("m", vec![0xC3], 0));
        assert!(matches!(code.execute(&[]), Err(CiError::NotExecutable { .. })));
        assert!(cache.disassemble(&code).is_none());
    }
}
