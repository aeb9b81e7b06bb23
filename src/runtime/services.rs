//! Registry of pluggable services.
//!
//! Backend factories, compiler factories and event listeners are registered
//! explicitly at startup. Registration order is the discovery order seen by
//! the runtime.

use super::backend::BackendFactory;
use super::compiler::CompilerFactory;
use super::events::VmEventListener;
use crate::aarch64::Aarch64BackendFactory;
use crate::x64::Amd64BackendFactory;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct ServiceRegistry {
    backend_factories: Vec<Arc<dyn BackendFactory>>,
    compiler_factories: Vec<Arc<dyn CompilerFactory>>,
    event_listeners: Vec<Arc<dyn VmEventListener>>,
}

impl ServiceRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the backend factories of every supported architecture.
    pub fn with_builtin_backends() -> Self {
        let mut registry = Self::new();
        registry
            .register_backend_factory(Arc::new(Amd64BackendFactory))
            .register_backend_factory(Arc::new(Aarch64BackendFactory));
        registry
    }

    pub fn register_backend_factory(&mut self, factory: Arc<dyn BackendFactory>) -> &mut Self {
        self.backend_factories.push(factory);
        self
    }

    pub fn register_compiler_factory(&mut self, factory: Arc<dyn CompilerFactory>) -> &mut Self {
        self.compiler_factories.push(factory);
        self
    }

    pub fn register_event_listener(&mut self, listener: Arc<dyn VmEventListener>) -> &mut Self {
        self.event_listeners.push(listener);
        self
    }

    pub fn backend_factories(&self) -> &[Arc<dyn BackendFactory>] {
        &self.backend_factories
    }

    pub fn compiler_factories(&self) -> &[Arc<dyn CompilerFactory>] {
        &self.compiler_factories
    }

    pub fn event_listeners(&self) -> &[Arc<dyn VmEventListener>] {
        &self.event_listeners
    }
}
