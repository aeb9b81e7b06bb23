// This module implements the architecture-neutral half of calling convention assignment.
// A CallingConvention binds one method signature to concrete locations: every parameter
// gets either a register or a stack slot, the return value gets a fixed register chosen
// by lane, and the total outgoing argument area is recorded so the caller can size its
// frame. ConventionAssigner walks the parameters in declaration order with one cursor per
// lane (integer/reference and floating point). A parameter takes the next register of its
// lane's pool while the pool lasts and otherwise spills to a word-aligned stack slot.
// Native conventions on ABIs with a register home space start the stack offset past that
// area. Architecture register configurations supply the pools and return registers.

//! Calling convention assignment.
//!
//! Shared by every architecture's register configuration. The assigner is
//! created fresh for each signature and produces an immutable
//! [`CallingConvention`].

use super::kind::{Lane, ValueKind};
use super::register::Register;
use std::fmt;

/// Which side of which kind of call a convention describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallingConventionType {
    /// Caller's view of a call between managed methods.
    ManagedCall,
    /// Callee's view of a call between managed methods.
    ManagedCallee,
    /// Call into or out of native code.
    NativeCall,
}

impl CallingConventionType {
    /// Whether this is the caller-side (outgoing) view.
    pub fn is_out(self) -> bool {
        match self {
            CallingConventionType::ManagedCall | CallingConventionType::NativeCall => true,
            CallingConventionType::ManagedCallee => false,
        }
    }

    pub fn is_native(self) -> bool {
        self == CallingConventionType::NativeCall
    }
}

/// A stack slot holding an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackSlot {
    /// Offset from the start of the outgoing argument area.
    pub offset: usize,
    /// Slot size in bytes, never smaller than the word size.
    pub size: usize,
    pub kind: ValueKind,
    /// Set for the callee view: the offset is relative to the caller's frame
    /// and the callee's frame size must be added to reach it.
    pub add_frame_size: bool,
}

/// Where a value lives at a call boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Register { reg: Register, kind: ValueKind },
    Stack(StackSlot),
}

impl Location {
    pub fn kind(&self) -> ValueKind {
        match self {
            Location::Register { kind, .. } => *kind,
            Location::Stack(slot) => slot.kind,
        }
    }

    pub fn register(&self) -> Option<Register> {
        match self {
            Location::Register { reg, .. } => Some(*reg),
            Location::Stack(_) => None,
        }
    }

    pub fn stack_slot(&self) -> Option<&StackSlot> {
        match self {
            Location::Register { .. } => None,
            Location::Stack(slot) => Some(slot),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Register { reg, kind } => write!(f, "{}|{}", reg, kind.type_char()),
            Location::Stack(slot) => {
                let base = if slot.add_frame_size { "in" } else { "out" };
                write!(f, "stack:{}+{}|{}", base, slot.offset, slot.kind.type_char())
            }
        }
    }
}

/// Resolved locations for one method signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallingConvention {
    stack_size: usize,
    return_location: Option<Location>,
    arguments: Vec<Location>,
}

impl CallingConvention {
    pub fn new(stack_size: usize, return_location: Option<Location>, arguments: Vec<Location>) -> Self {
        Self {
            stack_size,
            return_location,
            arguments,
        }
    }

    /// Size of the outgoing argument area in bytes.
    pub fn stack_size(&self) -> usize {
        self.stack_size
    }

    /// Return location, `None` for void methods.
    pub fn return_location(&self) -> Option<&Location> {
        self.return_location.as_ref()
    }

    pub fn arguments(&self) -> &[Location] {
        &self.arguments
    }

    pub fn argument(&self, index: usize) -> &Location {
        &self.arguments[index]
    }

    pub fn argument_count(&self) -> usize {
        self.arguments.len()
    }
}

impl fmt::Display for CallingConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallingConvention[")?;
        for (i, arg) in self.arguments.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        match &self.return_location {
            Some(ret) => write!(f, " -> {}", ret)?,
            None => write!(f, " -> void")?,
        }
        write!(f, "; stack={}]", self.stack_size)
    }
}

/// Register pools a convention draws from.
#[derive(Debug, Clone, Copy)]
pub struct ConventionPools<'a> {
    pub general: &'a [Register],
    pub float: &'a [Register],
    pub integer_return: Register,
    pub float_return: Register,
    pub word_size: usize,
    /// Bytes reserved before the first stack argument.
    pub home_space: usize,
}

/// Per-signature location assigner.
pub struct ConventionAssigner<'a> {
    pools: ConventionPools<'a>,
    ty: CallingConventionType,
    /// Next general purpose parameter register.
    gp_cnt: usize,
    /// Next floating point parameter register.
    fp_cnt: usize,
    /// Current stack offset.
    stack: usize,
}

impl<'a> ConventionAssigner<'a> {
    pub fn new(pools: ConventionPools<'a>, ty: CallingConventionType) -> Self {
        Self {
            pools,
            ty,
            gp_cnt: 0,
            fp_cnt: 0,
            stack: pools.home_space,
        }
    }

    /// Assign the next parameter.
    ///
    /// # Panics
    /// If `kind` has no lane (`Void`, `Illegal`).
    pub fn assign_arg(&mut self, kind: ValueKind) -> Location {
        let kind = kind.stack_kind();
        let reg = match kind.lane() {
            Some(Lane::Integer) => {
                let reg = self.pools.general.get(self.gp_cnt).copied();
                if reg.is_some() {
                    self.gp_cnt += 1;
                }
                reg
            }
            Some(Lane::Float) => {
                let reg = self.pools.float.get(self.fp_cnt).copied();
                if reg.is_some() {
                    self.fp_cnt += 1;
                }
                reg
            }
            None => unreachable!("should not reach here: no lane for parameter kind {kind:?}"),
        };

        match reg {
            Some(reg) => Location::Register { reg, kind },
            None => {
                let size = kind.size_in_bytes().max(self.pools.word_size);
                let slot = StackSlot {
                    offset: self.stack,
                    size,
                    kind,
                    add_frame_size: !self.ty.is_out(),
                };
                self.stack += size;
                Location::Stack(slot)
            }
        }
    }

    /// Return location for `kind`; never on the stack.
    pub fn assign_ret(&self, kind: ValueKind) -> Option<Location> {
        let kind = kind.stack_kind();
        let reg = match kind.lane()? {
            Lane::Integer => self.pools.integer_return,
            Lane::Float => self.pools.float_return,
        };
        Some(Location::Register { reg, kind })
    }

    /// Total outgoing argument area so far.
    pub fn stack_size(&self) -> usize {
        self.stack
    }

    pub fn gp_used(&self) -> usize {
        self.gp_cnt
    }

    pub fn fp_used(&self) -> usize {
        self.fp_cnt
    }

    /// Assign every parameter and the return value of a signature.
    pub fn assign(mut self, return_kind: ValueKind, parameters: &[ValueKind]) -> CallingConvention {
        let arguments = parameters.iter().map(|&kind| self.assign_arg(kind)).collect();
        let return_location = self.assign_ret(return_kind);
        CallingConvention::new(self.stack, return_location, arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::register::RegisterCategory;

    const G0: Register = Register::new("g0", 0, 0, RegisterCategory::GeneralPurpose);
    const G1: Register = Register::new("g1", 1, 1, RegisterCategory::GeneralPurpose);
    const F0: Register = Register::new("f0", 2, 0, RegisterCategory::FloatingPoint);

    fn pools(home_space: usize) -> ConventionPools<'static> {
        ConventionPools {
            general: &[G0, G1],
            float: &[F0],
            integer_return: G0,
            float_return: F0,
            word_size: 8,
            home_space,
        }
    }

    #[test]
    fn test_independent_lane_cursors() {
        let mut assigner = ConventionAssigner::new(pools(0), CallingConventionType::ManagedCall);
        assert_eq!(assigner.assign_arg(ValueKind::Float).register(), Some(F0));
        assert_eq!(assigner.assign_arg(ValueKind::Int).register(), Some(G0));
        assert_eq!(assigner.assign_arg(ValueKind::Object).register(), Some(G1));
        assert_eq!(assigner.gp_used(), 2);
        assert_eq!(assigner.fp_used(), 1);
        assert_eq!(assigner.stack_size(), 0);
    }

    #[test]
    fn test_overflow_uses_word_aligned_slots() {
        let mut assigner = ConventionAssigner::new(pools(0), CallingConventionType::ManagedCall);
        assigner.assign_arg(ValueKind::Int);
        assigner.assign_arg(ValueKind::Int);
        let third = assigner.assign_arg(ValueKind::Byte);
        let slot = third.stack_slot().unwrap();
        assert_eq!(slot.offset, 0);
        assert_eq!(slot.size, 8);
        assert_eq!(slot.kind, ValueKind::Int);
        assert!(!slot.add_frame_size);
        let fourth = assigner.assign_arg(ValueKind::Double);
        assert_eq!(fourth.register(), Some(F0));
        let fifth = assigner.assign_arg(ValueKind::Float);
        let slot = fifth.stack_slot().unwrap();
        assert_eq!(slot.offset, 8);
        assert_eq!(slot.size, 8);
        assert_eq!(assigner.stack_size(), 16);
    }

    #[test]
    fn test_home_space_offsets_first_stack_slot() {
        let conv = ConventionAssigner::new(pools(32), CallingConventionType::NativeCall)
            .assign(ValueKind::Void, &[ValueKind::Long; 3]);
        assert_eq!(conv.argument(2).stack_slot().unwrap().offset, 32);
        assert_eq!(conv.stack_size(), 40);
        assert!(conv.return_location().is_none());
    }

    #[test]
    fn test_callee_view_adds_frame_size() {
        let conv = ConventionAssigner::new(pools(0), CallingConventionType::ManagedCallee)
            .assign(ValueKind::Short, &[ValueKind::Int; 3]);
        assert!(conv.argument(2).stack_slot().unwrap().add_frame_size);
        let ret = conv.return_location().unwrap();
        assert_eq!(ret.register(), Some(G0));
        assert_eq!(ret.kind(), ValueKind::Int);
    }

    #[test]
    #[should_panic(expected = "should not reach here")]
    fn test_void_parameter_is_fatal() {
        let mut assigner = ConventionAssigner::new(pools(0), CallingConventionType::ManagedCall);
        assigner.assign_arg(ValueKind::Void);
    }
}
