//! Target architecture descriptors.

use super::kind::ValueKind;
use super::register::{Register, RegisterCategory};
use std::fmt;

/// Architecture type. Backends are registered and looked up by this key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchKind {
    Amd64,
    AArch64,
}

impl ArchKind {
    /// Canonical name as reported by the VM configuration.
    pub fn name(self) -> &'static str {
        match self {
            ArchKind::Amd64 => "amd64",
            ArchKind::AArch64 => "aarch64",
        }
    }
}

impl fmt::Display for ArchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static description of an architecture's register file.
#[derive(Debug, Clone)]
pub struct Architecture {
    pub kind: ArchKind,
    /// Machine word size in bytes.
    pub word_size: usize,
    /// Every register, indexed by register number.
    pub registers: &'static [Register],
    /// Registers that can hold values, in allocation order.
    pub available_value_registers: &'static [Register],
    /// Size of the return address pushed by a call instruction.
    pub return_address_size: usize,
}

impl Architecture {
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Whether a register of `category` can legally hold a value of `kind`.
    pub fn can_store_value(&self, category: RegisterCategory, kind: ValueKind) -> bool {
        category.can_store(kind)
    }

    /// Look up a register by assembler name.
    pub fn register_by_name(&self, name: &str) -> Option<Register> {
        self.registers.iter().copied().find(|r| r.name == name)
    }
}

/// Code generation target: an architecture plus target-level properties.
#[derive(Debug, Clone)]
pub struct TargetDescription {
    pub arch: Architecture,
    pub word_size: usize,
    /// Required stack alignment at call sites, in bytes.
    pub stack_alignment: usize,
    /// Whether the target is a multi-processor system.
    pub is_mp: bool,
}

impl TargetDescription {
    pub fn new(arch: Architecture, stack_alignment: usize, is_mp: bool) -> Self {
        let word_size = arch.word_size;
        Self {
            arch,
            word_size,
            stack_alignment,
            is_mp,
        }
    }

    /// Value kind of a machine word.
    pub fn word_kind(&self) -> ValueKind {
        if self.word_size == 8 {
            ValueKind::Long
        } else {
            ValueKind::Int
        }
    }
}
