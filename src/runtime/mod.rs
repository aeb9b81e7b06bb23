// This module holds everything that exists once per process at run time: the backend
// registry and per-backend code caches, the compiler and compiler factory abstractions with
// the logic that selects the system compiler, VM event listeners, runtime options, startup
// timing, statistics and the Runtime facade that ties these together.

//! Runtime layer of the compiler interface.
//!
//! # Startup
//!
//! [`RuntimeBuilder::build`] locates the host backend factory, registers the
//! host backend and resolves the compiler factory. [`Runtime::init_global`]
//! installs one instance for the whole process.
//!
//! # Steady state
//!
//! The execution engine calls [`Runtime::compile_method`],
//! [`Runtime::adjust_compilation_level`], [`Runtime::install_code`] and the
//! lifecycle notifications. Compile dispatch never fails; compiler errors are
//! turned into [`CompilationRequestResult`] failures.

pub mod backend;
pub mod code_cache;
pub mod compiler;
pub mod compiler_config;
pub mod events;
pub mod init_timer;
pub mod options;
#[allow(clippy::module_inception)]
pub mod runtime;
pub mod services;
pub mod stats;
pub mod types;

pub use backend::{find_factory, Backend, BackendFactory, BackendRegistry};
pub use code_cache::{CodeCache, CodeExecutor, CompiledArtifact, InstalledCode, Value};
pub use compiler::{
    CompilationLevel, CompilationLevelAdjustment, CompilationRequest, CompilationRequestResult,
    CompileOutcome, Compiler, CompilerFactory, MethodRef, RequestResult, RuntimeCompilerFactory,
    INVOCATION_ENTRY_BCI,
};
pub use compiler_config::{CompilerFactoryResolver, StubCompilerFactory};
pub use events::VmEventListener;
pub use init_timer::InitTimer;
pub use options::{OptionKey, OptionValue, Options};
pub use runtime::{Runtime, RuntimeBuilder};
pub use services::ServiceRegistry;
pub use stats::{RuntimeStats, StatsSnapshot};
pub use types::{JavaType, ResolvedType, TypeResolver};
