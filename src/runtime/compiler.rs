// This module defines what a pluggable compiler looks like to the runtime. A CompilerFactory
// is registered under a name and, once selected, creates the single Compiler instance used
// for the rest of the process. Factories written specifically for this runtime can also
// implement RuntimeCompilerFactory to steer tiered compilation: they pick a compilation level
// adjustment policy, supply method name prefixes the execution engine treats as trivial, and
// may adjust the level chosen for individual methods. Compilers answer requests either with
// the runtime's own CompilationRequestResult or with any other type implementing
// RequestResult, which the runtime normalizes before handing it back to the engine.

//! Compiler, compiler factory and compilation request types.

use super::runtime::Runtime;
use crate::core::error::{CiError, CiResult};
use crate::core::signature::Signature;
use crate::core::vm_config::VmConfig;
use std::fmt;
use std::sync::Arc;

/// Entry BCI of a standard, non-OSR compilation.
pub const INVOCATION_ENTRY_BCI: i32 = -1;

/// Tiered compilation levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CompilationLevel {
    None,
    Simple,
    LimitedProfile,
    FullProfile,
    FullOptimization,
}

impl CompilationLevel {
    /// Map the VM's numeric level, `None` if it is not one of the known values.
    pub fn from_vm(config: &VmConfig, level: i32) -> Option<Self> {
        let mapped = if level == config.compilation_level_none {
            CompilationLevel::None
        } else if level == config.compilation_level_simple {
            CompilationLevel::Simple
        } else if level == config.compilation_level_limited_profile {
            CompilationLevel::LimitedProfile
        } else if level == config.compilation_level_full_profile {
            CompilationLevel::FullProfile
        } else if level == config.compilation_level_full_optimization {
            CompilationLevel::FullOptimization
        } else {
            return None;
        };
        Some(mapped)
    }

    pub fn to_vm(self, config: &VmConfig) -> i32 {
        match self {
            CompilationLevel::None => config.compilation_level_none,
            CompilationLevel::Simple => config.compilation_level_simple,
            CompilationLevel::LimitedProfile => config.compilation_level_limited_profile,
            CompilationLevel::FullProfile => config.compilation_level_full_profile,
            CompilationLevel::FullOptimization => config.compilation_level_full_optimization,
        }
    }
}

/// Which method attributes the VM passes when asking for a level adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompilationLevelAdjustment {
    /// No adjustment requests.
    #[default]
    None,
    /// Adjust based on the declaring type.
    ByHolder,
    /// Adjust based on declaring type, name and signature.
    ByFullSignature,
}

impl CompilationLevelAdjustment {
    pub fn to_vm(self, config: &VmConfig) -> i32 {
        match self {
            CompilationLevelAdjustment::None => config.comp_level_adjustment_none,
            CompilationLevelAdjustment::ByHolder => config.comp_level_adjustment_by_holder,
            CompilationLevelAdjustment::ByFullSignature => config.comp_level_adjustment_by_full_signature,
        }
    }
}

/// A method to be compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodRef {
    pub holder: String,
    pub name: String,
    pub signature: Signature,
}

impl MethodRef {
    pub fn new(holder: impl Into<String>, name: impl Into<String>, signature: Signature) -> Self {
        Self {
            holder: holder.into(),
            name: name.into(),
            signature,
        }
    }

    /// Build a method reference from a JVM method descriptor.
    pub fn parse(holder: impl Into<String>, name: impl Into<String>, descriptor: &str) -> CiResult<Self> {
        Ok(Self::new(holder, name, Signature::parse(descriptor)?))
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{}", self.holder, self.name, self.signature.descriptor())
    }
}

/// A request from the execution engine to compile one method.
#[derive(Debug, Clone)]
pub struct CompilationRequest {
    pub method: MethodRef,
    /// Bytecode index to enter at, [`INVOCATION_ENTRY_BCI`] for a standard compile.
    pub entry_bci: i32,
    /// Opaque handle to the engine's compilation environment.
    pub env: u64,
    pub id: i32,
}

impl CompilationRequest {
    pub fn new(method: MethodRef, entry_bci: i32, env: u64, id: i32) -> Self {
        Self {
            method,
            entry_bci,
            env,
            id,
        }
    }

    /// On-stack replacement compilation.
    pub fn is_osr(&self) -> bool {
        self.entry_bci != INVOCATION_ENTRY_BCI
    }
}

/// Result shape handed back to the execution engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompilationRequestResult {
    Success {
        /// Bytecodes inlined into the compiled method, -1 if unknown.
        inlined_bytecodes: i32,
    },
    Failure {
        message: String,
        /// Whether the engine may retry the request later.
        retry: bool,
    },
}

impl CompilationRequestResult {
    pub fn success(inlined_bytecodes: i32) -> Self {
        CompilationRequestResult::Success { inlined_bytecodes }
    }

    pub fn failure(message: impl Into<String>, retry: bool) -> Self {
        CompilationRequestResult::Failure {
            message: message.into(),
            retry,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CompilationRequestResult::Success { .. })
    }

    pub fn failure_message(&self) -> Option<&str> {
        match self {
            CompilationRequestResult::Failure { message, .. } => Some(message),
            CompilationRequestResult::Success { .. } => None,
        }
    }

    pub fn retry(&self) -> bool {
        matches!(self, CompilationRequestResult::Failure { retry: true, .. })
    }
}

impl fmt::Display for CompilationRequestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompilationRequestResult::Success { inlined_bytecodes } => {
                write!(f, "success (inlined bytecodes: {})", inlined_bytecodes)
            }
            CompilationRequestResult::Failure { message, retry } => {
                write!(f, "failure: {} (retry: {})", message, retry)
            }
        }
    }
}

/// A compiler-specific result type.
pub trait RequestResult: Send + fmt::Debug {
    /// Failure description, `None` on success.
    fn failure(&self) -> Option<String>;
}

/// What a compiler returns for a request.
#[derive(Debug)]
pub enum CompileOutcome {
    Native(CompilationRequestResult),
    Foreign(Box<dyn RequestResult>),
}

impl CompileOutcome {
    /// Translate into the runtime's result shape. Foreign failures are never
    /// retried and foreign successes report unknown inlining.
    pub fn normalize(self) -> CompilationRequestResult {
        match self {
            CompileOutcome::Native(result) => result,
            CompileOutcome::Foreign(result) => match result.failure() {
                Some(message) => CompilationRequestResult::failure(message, false),
                None => CompilationRequestResult::success(-1),
            },
        }
    }
}

impl From<CompilationRequestResult> for CompileOutcome {
    fn from(result: CompilationRequestResult) -> Self {
        CompileOutcome::Native(result)
    }
}

pub trait Compiler: Send + Sync {
    fn compile_method(&self, request: &CompilationRequest) -> CiResult<CompileOutcome>;
}

/// Creates the process-wide compiler.
pub trait CompilerFactory: Send + Sync {
    /// Name matched against the `Compiler` option.
    fn compiler_name(&self) -> &str;

    /// Called once when this factory is selected.
    fn on_selection(&self) {}

    fn create_compiler(&self, runtime: &Runtime) -> CiResult<Arc<dyn Compiler>>;

    /// Runtime-specific extensions, if this factory provides them.
    fn runtime_factory(&self) -> Option<&dyn RuntimeCompilerFactory> {
        None
    }
}

/// Tiered compilation hooks for factories written against this runtime.
pub trait RuntimeCompilerFactory: Send + Sync {
    fn compilation_level_adjustment(&self) -> CompilationLevelAdjustment {
        CompilationLevelAdjustment::None
    }

    /// Method name prefixes the execution engine may treat as trivial.
    fn trivial_prefixes(&self) -> Vec<String> {
        Vec::new()
    }

    /// Potentially change the level chosen for a method. `holder` is the
    /// declaring type; `name` and `signature` are only meaningful under
    /// [`CompilationLevelAdjustment::ByFullSignature`].
    fn adjust_compilation_level(
        &self,
        _holder: &str,
        _name: &str,
        _signature: &str,
        _is_osr: bool,
        level: CompilationLevel,
    ) -> CompilationLevel {
        level
    }
}

/// Compiler used when no compiler was requested. Every request fails.
#[derive(Debug, Default)]
pub struct StubCompiler;

impl Compiler for StubCompiler {
    fn compile_method(&self, _request: &CompilationRequest) -> CiResult<CompileOutcome> {
        Err(CiError::NoCompilerSelected)
    }
}
