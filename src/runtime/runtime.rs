// This module implements the runtime facade: the one object the execution engine talks to.
// Building a runtime runs the startup sequence in a fixed order. It reads the VM
// configuration, finds the backend factory for the host architecture, creates and registers
// the host backend, handles the diagnostic print options, resolves the compiler factory and,
// if that factory has runtime-specific hooks, caches the compilation level adjustment policy
// and the trivial method prefixes. Any configuration error aborts the build.
//
// After startup the facade lazily creates the compiler on first use, dispatches compile
// requests and always turns the compiler's answer into a well-formed
// CompilationRequestResult, even when the compiler fails or panics. It also broadcasts
// lifecycle events to the registered listeners and resolves type names. The compiler and the
// listener list are each initialized exactly once under their own lock. A process-wide
// instance can be installed with Runtime::init_global; independent instances can be built
// for embedding and tests.

//! The runtime facade.

use super::backend::{find_factory, Backend, BackendRegistry};
use super::code_cache::{CodeCache, CodeExecutor, CompiledArtifact, InstalledCode};
use super::compiler::{
    CompilationLevel, CompilationLevelAdjustment, CompilationRequest, CompilationRequestResult,
    Compiler, CompilerFactory, MethodRef,
};
use super::compiler_config::CompilerFactoryResolver;
use super::events::VmEventListener;
use super::init_timer::InitTimer;
use super::options::{OptionKey, Options};
use super::services::ServiceRegistry;
use super::stats::RuntimeStats;
use super::types::{JavaType, ResolvedType, TypeResolver};
use crate::core::arch::ArchKind;
use crate::core::error::CiResult;
use crate::core::kind::ValueKind;
use crate::core::vm_config::VmConfig;
use std::any::Any;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

static GLOBAL_RUNTIME: OnceLock<Runtime> = OnceLock::new();
static GLOBAL_INIT_LOCK: Mutex<()> = Mutex::new(());

/// Configures and builds a [`Runtime`].
pub struct RuntimeBuilder {
    config: VmConfig,
    options: Options,
    services: ServiceRegistry,
    type_resolver: Option<Arc<dyn TypeResolver>>,
    executor: Option<Arc<dyn CodeExecutor>>,
}

impl RuntimeBuilder {
    /// Host configuration, default options and the given services.
    pub fn new(services: ServiceRegistry) -> Self {
        Self {
            config: VmConfig::host(),
            options: Options::new(),
            services,
            type_resolver: None,
            executor: None,
        }
    }

    pub fn config(mut self, config: VmConfig) -> Self {
        self.config = config;
        self
    }

    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn type_resolver(mut self, resolver: Arc<dyn TypeResolver>) -> Self {
        self.type_resolver = Some(resolver);
        self
    }

    /// Executor attached to the host code cache.
    pub fn executor(mut self, executor: Arc<dyn CodeExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Run the startup sequence.
    ///
    /// `PrintFlags` and `PrintConfig` terminate the process with exit code 0
    /// after printing.
    pub fn build(self) -> CiResult<Runtime> {
        let RuntimeBuilder {
            config,
            options,
            services,
            type_resolver,
            executor,
        } = self;
        let timing = options.init_timer();
        let _timer = InitTimer::start(timing, "Runtime<init>");

        let host_architecture = config.host_architecture.clone();
        let factory = {
            let _t = InitTimer::start(timing, format!("find factory: {}", host_architecture));
            find_factory(services.backend_factories(), &host_architecture)?
        };

        let mut backends = BackendRegistry::new();
        let host_backend = {
            let _t = InitTimer::start(timing, format!("create backend: {}", host_architecture));
            backends.register(factory.create_backend(&config, None)?)
        };
        if let Some(executor) = executor {
            host_backend.code_cache().attach_executor(executor);
        }

        handle_print_options(&options, &config);

        let resolver = CompilerFactoryResolver::new();
        let compiler_factory = {
            let _t = InitTimer::start(timing, "resolve compiler factory");
            resolver.get_or_resolve(options.compiler(), services.compiler_factories())?
        };

        let (adjustment, trivial_prefixes) = match compiler_factory.runtime_factory() {
            Some(hooks) => (hooks.compilation_level_adjustment(), Some(hooks.trivial_prefixes())),
            None => (CompilationLevelAdjustment::None, None),
        };
        log::debug!(
            "runtime ready: host {}, compiler '{}', level adjustment {:?}",
            host_backend.arch_kind(),
            compiler_factory.compiler_name(),
            adjustment
        );

        Ok(Runtime {
            config,
            options,
            backends,
            host_backend,
            resolver,
            services,
            compilation_level_adjustment: adjustment,
            trivial_prefixes,
            compiler: OnceLock::new(),
            compiler_lock: Mutex::new(()),
            listeners: OnceLock::new(),
            type_resolver,
            stats: RuntimeStats::new(),
        })
    }
}

fn handle_print_options(options: &Options, config: &VmConfig) {
    let print_flags = options.get_bool(OptionKey::PrintFlags);
    if print_flags || options.get_bool(OptionKey::ShowFlags) {
        let _ = options.print_flags(&mut io::stdout().lock());
        if print_flags {
            std::process::exit(0);
        }
    }
    if options.get_bool(OptionKey::PrintConfig) {
        let _ = write!(io::stdout().lock(), "{}", config);
        std::process::exit(0);
    }
}

/// Coordinates the backends, the selected compiler and VM event listeners.
pub struct Runtime {
    config: VmConfig,
    options: Options,
    backends: BackendRegistry,
    host_backend: Arc<Backend>,
    resolver: CompilerFactoryResolver,
    services: ServiceRegistry,
    compilation_level_adjustment: CompilationLevelAdjustment,
    trivial_prefixes: Option<Vec<String>>,
    compiler: OnceLock<Arc<dyn Compiler>>,
    compiler_lock: Mutex<()>,
    listeners: OnceLock<Vec<Arc<dyn VmEventListener>>>,
    type_resolver: Option<Arc<dyn TypeResolver>>,
    stats: RuntimeStats,
}

impl Runtime {
    /// Builder with the built-in backends and no compilers or listeners.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new(ServiceRegistry::with_builtin_backends())
    }

    /// Install the process-wide runtime. Only the first successful call
    /// builds; later calls return the existing instance and drop `builder`.
    pub fn init_global(builder: RuntimeBuilder) -> CiResult<&'static Runtime> {
        if let Some(runtime) = GLOBAL_RUNTIME.get() {
            return Ok(runtime);
        }
        let _guard = GLOBAL_INIT_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(runtime) = GLOBAL_RUNTIME.get() {
            return Ok(runtime);
        }
        let runtime = builder.build()?;
        Ok(GLOBAL_RUNTIME.get_or_init(|| runtime))
    }

    /// The process-wide runtime, if installed.
    pub fn global() -> Option<&'static Runtime> {
        GLOBAL_RUNTIME.get()
    }

    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn host_backend(&self) -> &Arc<Backend> {
        &self.host_backend
    }

    pub fn backend(&self, arch: ArchKind) -> Option<&Arc<Backend>> {
        self.backends.get(arch)
    }

    pub fn backends(&self) -> &BackendRegistry {
        &self.backends
    }

    /// Word kind of the host backend.
    pub fn host_word_kind(&self) -> ValueKind {
        self.host_backend.target().word_kind()
    }

    pub fn stats(&self) -> &RuntimeStats {
        &self.stats
    }

    /// The selected compiler factory. Always the same instance.
    pub fn resolve_compiler_factory(&self) -> CiResult<Arc<dyn CompilerFactory>> {
        self.resolver
            .get_or_resolve(self.options.compiler(), self.services.compiler_factories())
    }

    /// The compiler, created by the selected factory on first use.
    pub fn compiler(&self) -> CiResult<Arc<dyn Compiler>> {
        if let Some(compiler) = self.compiler.get() {
            return Ok(compiler.clone());
        }
        let _guard = self.compiler_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(compiler) = self.compiler.get() {
            return Ok(compiler.clone());
        }
        let factory = self.resolve_compiler_factory()?;
        let compiler = factory.create_compiler(self)?;
        log::debug!("created compiler '{}'", factory.compiler_name());
        Ok(self.compiler.get_or_init(|| compiler).clone())
    }

    /// VM token for the level adjustment policy of the selected factory.
    pub fn compilation_level_adjustment(&self) -> i32 {
        self.compilation_level_adjustment.to_vm(&self.config)
    }

    pub fn compilation_level_adjustment_policy(&self) -> CompilationLevelAdjustment {
        self.compilation_level_adjustment
    }

    /// Trivial method prefixes, `None` unless the factory has runtime hooks.
    pub fn trivial_prefixes(&self) -> Option<&[String]> {
        self.trivial_prefixes.as_deref()
    }

    /// Let the selected factory adjust the VM's numeric compilation level.
    ///
    /// # Panics
    /// If `level` is not one of the VM's compilation levels.
    pub fn adjust_compilation_level(
        &self,
        holder: &str,
        name: &str,
        signature: &str,
        is_osr: bool,
        level: i32,
    ) -> i32 {
        let current = CompilationLevel::from_vm(&self.config, level)
            .unwrap_or_else(|| panic!("should not reach here: unknown compilation level {}", level));
        let Some(factory) = self.resolver.get() else {
            return level;
        };
        match factory.runtime_factory() {
            Some(hooks) => hooks
                .adjust_compilation_level(holder, name, signature, is_osr, current)
                .to_vm(&self.config),
            None => level,
        }
    }

    /// Compile `method` on behalf of the execution engine.
    ///
    /// Never fails: compiler errors and panics become failure results that
    /// must not be retried.
    pub fn compile_method(&self, method: MethodRef, entry_bci: i32, env: u64, id: i32) -> CompilationRequestResult {
        self.stats.record_request();
        let request = CompilationRequest::new(method, entry_bci, env, id);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let compiler = self.compiler()?;
            compiler.compile_method(&request)
        }));

        let (result, panicked) = match outcome {
            Ok(Ok(outcome)) => (outcome.normalize(), false),
            Ok(Err(err)) => {
                log::warn!("compilation of {} (id {}) failed: {}", request.method, id, err);
                (CompilationRequestResult::failure(err.to_string(), false), false)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                log::error!("compiler panicked on {} (id {}): {}", request.method, id, message);
                (CompilationRequestResult::failure(message, false), true)
            }
        };

        if result.is_success() {
            self.stats.record_success();
        } else {
            self.stats.record_failure(panicked);
        }
        result
    }

    /// Install `artifact` into the host code cache and notify listeners.
    pub fn install_code(&self, artifact: CompiledArtifact) -> CiResult<Arc<InstalledCode>> {
        let code_cache = self.host_backend.code_cache();
        let installed = code_cache.add_code(artifact);
        self.stats.record_install(installed.code().len());
        self.notify_install(code_cache, &installed, installed.artifact())?;
        Ok(installed)
    }

    /// Invalidate code installed in the host code cache.
    pub fn invalidate_installed_code(&self, code: &InstalledCode) -> bool {
        let invalidated = self.host_backend.code_cache().invalidate(code);
        if invalidated {
            self.stats.record_invalidation();
        }
        invalidated
    }

    fn listeners(&self) -> &[Arc<dyn VmEventListener>] {
        self.listeners.get_or_init(|| {
            let listeners = self.services.event_listeners().to_vec();
            log::debug!("discovered {} event listener(s)", listeners.len());
            listeners
        })
    }

    /// Broadcast a successful installation.
    pub fn notify_install(
        &self,
        code_cache: &CodeCache,
        installed: &InstalledCode,
        artifact: &CompiledArtifact,
    ) -> CiResult<()> {
        for listener in self.listeners() {
            listener.notify_install(code_cache, installed, artifact)?;
        }
        Ok(())
    }

    /// Broadcast VM shutdown.
    pub fn shutdown(&self) -> CiResult<()> {
        log::debug!("shutdown\n{}", self.stats);
        for listener in self.listeners() {
            listener.notify_shutdown()?;
        }
        Ok(())
    }

    /// Broadcast the end of VM bootstrap.
    pub fn bootstrap_finished(&self) -> CiResult<()> {
        for listener in self.listeners() {
            listener.notify_bootstrap_finished()?;
        }
        Ok(())
    }

    /// Resolve a type name. One-character names are primitive type
    /// characters; anything else goes through the type resolver and becomes
    /// [`JavaType::Unresolved`] if the lookup declines.
    pub fn lookup_type(&self, name: &str, accessing: Option<&ResolvedType>, resolve: bool) -> CiResult<JavaType> {
        let mut chars = name.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            return Ok(JavaType::Primitive(ValueKind::from_primitive_or_void_type_char(ch)?));
        }
        let resolved = self
            .type_resolver
            .as_ref()
            .and_then(|resolver| resolver.lookup(name, accessing, resolve));
        Ok(match resolved {
            Some(ty) => JavaType::Resolved(ty),
            None => JavaType::Unresolved(name.to_string()),
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("compiler panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("compiler panicked: {}", s)
    } else {
        "compiler panicked".to_string()
    }
}
