//! Selection of the system compiler factory.
//!
//! The factory is chosen once per runtime. With no compiler requested the
//! [`StubCompilerFactory`] is used, so the runtime is always in a callable
//! state. A requested name is matched exactly against the registered
//! factories in registration order and the first match wins; no match is a
//! fatal configuration error.

use super::compiler::{Compiler, CompilerFactory, StubCompiler};
use super::runtime::Runtime;
use crate::core::error::{CiError, CiResult};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

/// Name reported by the stub factory.
pub const STUB_COMPILER_NAME: &str = "<none>";

/// Factory of the compiler that rejects every request.
#[derive(Debug, Default)]
pub struct StubCompilerFactory;

impl CompilerFactory for StubCompilerFactory {
    fn compiler_name(&self) -> &str {
        STUB_COMPILER_NAME
    }

    fn create_compiler(&self, _runtime: &Runtime) -> CiResult<Arc<dyn Compiler>> {
        Ok(Arc::new(StubCompiler))
    }
}

/// Pick the factory for `requested` among `candidates`.
///
/// Calls [`CompilerFactory::on_selection`] on the chosen factory. Candidates
/// after the first match are not inspected.
pub fn select_compiler_factory(
    requested: Option<&str>,
    candidates: &[Arc<dyn CompilerFactory>],
) -> CiResult<Arc<dyn CompilerFactory>> {
    let Some(name) = requested else {
        log::debug!("no compiler requested, using {}", STUB_COMPILER_NAME);
        return Ok(Arc::new(StubCompilerFactory));
    };

    let factory = candidates
        .iter()
        .find(|f| f.compiler_name() == name)
        .ok_or_else(|| CiError::CompilerNotFound {
            name: name.to_string(),
        })?;
    factory.on_selection();
    log::debug!("selected compiler '{}'", name);
    Ok(factory.clone())
}

/// Memoizes the selected factory. Resolution runs at most once even when
/// several threads ask concurrently; a failed resolution is not memoized.
#[derive(Default)]
pub struct CompilerFactoryResolver {
    selected: OnceLock<Arc<dyn CompilerFactory>>,
    lock: Mutex<()>,
}

impl CompilerFactoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// The selected factory, if resolution already happened.
    pub fn get(&self) -> Option<&Arc<dyn CompilerFactory>> {
        self.selected.get()
    }

    pub fn get_or_resolve(
        &self,
        requested: Option<&str>,
        candidates: &[Arc<dyn CompilerFactory>],
    ) -> CiResult<Arc<dyn CompilerFactory>> {
        if let Some(factory) = self.selected.get() {
            return Ok(factory.clone());
        }
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(factory) = self.selected.get() {
            return Ok(factory.clone());
        }
        let factory = select_compiler_factory(requested, candidates)?;
        Ok(self.selected.get_or_init(|| factory).clone())
    }
}
