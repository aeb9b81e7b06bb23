//! VM configuration values consumed by the compiler interface.
//!
//! The execution engine provides these once at startup. [`VmConfig::host`]
//! derives a configuration for the machine the crate was built for.

use std::fmt;

/// Snapshot of the VM configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmConfig {
    /// Host architecture name (`amd64`, `aarch64`).
    pub host_architecture: String,
    /// Machine word size in bytes.
    pub word_size: usize,
    /// Whether heap references are compressed relative to a heap base register.
    pub use_compressed_oops: bool,
    pub windows_os: bool,
    /// Largest supported compiled frame, in bytes.
    pub max_frame_size: usize,

    pub comp_level_adjustment_none: i32,
    pub comp_level_adjustment_by_holder: i32,
    pub comp_level_adjustment_by_full_signature: i32,

    pub compilation_level_none: i32,
    pub compilation_level_simple: i32,
    pub compilation_level_limited_profile: i32,
    pub compilation_level_full_profile: i32,
    pub compilation_level_full_optimization: i32,
}

impl VmConfig {
    /// Configuration for the build target.
    pub fn host() -> Self {
        let arch = if cfg!(target_arch = "x86_64") {
            "amd64"
        } else {
            std::env::consts::ARCH
        };
        Self::for_architecture(arch)
    }

    /// Default configuration for a named architecture.
    pub fn for_architecture(arch: &str) -> Self {
        Self {
            host_architecture: arch.to_string(),
            word_size: std::mem::size_of::<usize>(),
            use_compressed_oops: false,
            windows_os: cfg!(windows),
            max_frame_size: 16 * 1024,
            comp_level_adjustment_none: 0,
            comp_level_adjustment_by_holder: 1,
            comp_level_adjustment_by_full_signature: 2,
            compilation_level_none: 0,
            compilation_level_simple: 1,
            compilation_level_limited_profile: 2,
            compilation_level_full_profile: 3,
            compilation_level_full_optimization: 4,
        }
    }

    pub fn with_compressed_oops(mut self, enabled: bool) -> Self {
        self.use_compressed_oops = enabled;
        self
    }

    pub fn with_windows_os(mut self, enabled: bool) -> Self {
        self.windows_os = enabled;
        self
    }

    /// All values as `(type, name, value)`, sorted by name.
    pub fn flags(&self) -> Vec<(&'static str, &'static str, String)> {
        let mut flags = vec![
            ("String", "hostArchitecture", self.host_architecture.clone()),
            ("intx", "wordSize", self.word_size.to_string()),
            ("bool", "UseCompressedOops", self.use_compressed_oops.to_string()),
            ("bool", "windowsOs", self.windows_os.to_string()),
            ("intx", "maxFrameSize", self.max_frame_size.to_string()),
            ("int", "compLevelAdjustmentNone", self.comp_level_adjustment_none.to_string()),
            ("int", "compLevelAdjustmentByHolder", self.comp_level_adjustment_by_holder.to_string()),
            (
                "int",
                "compLevelAdjustmentByFullSignature",
                self.comp_level_adjustment_by_full_signature.to_string(),
            ),
            ("int", "compilationLevelNone", self.compilation_level_none.to_string()),
            ("int", "compilationLevelSimple", self.compilation_level_simple.to_string()),
            (
                "int",
                "compilationLevelLimitedProfile",
                self.compilation_level_limited_profile.to_string(),
            ),
            ("int", "compilationLevelFullProfile", self.compilation_level_full_profile.to_string()),
            (
                "int",
                "compilationLevelFullOptimization",
                self.compilation_level_full_optimization.to_string(),
            ),
        ];
        flags.sort_by(|a, b| a.1.cmp(b.1));
        flags
    }
}

impl Default for VmConfig {
    fn default() -> Self {
        Self::host()
    }
}

impl fmt::Display for VmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (ty, name, value) in self.flags() {
            writeln!(f, "[vmconfig:flag] {} {} = {}", ty, name, value)?;
        }
        Ok(())
    }
}
