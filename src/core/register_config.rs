//! Register catalog and the per-architecture register configuration seam.
//!
//! [`init_allocatable`] computes the allocatable subset of an architecture's
//! value registers; [`filter_registers`] selects the registers able to hold a
//! kind. [`RegisterConfig`] is implemented once per architecture and is what
//! compilers query for allocation and calling convention decisions.

use super::arch::Architecture;
use super::calling_convention::{CallingConvention, CallingConventionType};
use super::error::{CiError, CiResult};
use super::kind::ValueKind;
use super::register::{Register, RegisterAttributes, RegisterSet};

/// Compute the allocatable registers.
///
/// Removes `reserved` and, if given, the heap base register from `all`,
/// keeping the order of `all`. Fails with `IllegalState` if the result size is
/// not `all.len() - reserved.len() - (heap_base as 1)`, which happens when a
/// reserved register is not part of `all` or is listed twice.
pub fn init_allocatable(
    all: &[Register],
    reserved: &[Register],
    heap_base: Option<Register>,
) -> CiResult<Vec<Register>> {
    let reserved_set = RegisterSet::from_registers(reserved);
    let registers: Vec<Register> = all
        .iter()
        .copied()
        .filter(|reg| !reserved_set.contains(*reg))
        .filter(|reg| Some(*reg) != heap_base)
        .collect();

    let expected = all
        .len()
        .checked_sub(reserved.len() + usize::from(heap_base.is_some()));
    if expected != Some(registers.len()) {
        return Err(CiError::IllegalState {
            reason: format!(
                "allocatable register count {} does not match {} registers - {} reserved - {} heap base",
                registers.len(),
                all.len(),
                reserved.len(),
                usize::from(heap_base.is_some())
            ),
        });
    }
    Ok(registers)
}

/// Registers from `registers` whose category can hold `kind`, in input order.
pub fn filter_registers(arch: &Architecture, kind: ValueKind, registers: &[Register]) -> Vec<Register> {
    registers
        .iter()
        .copied()
        .filter(|reg| arch.can_store_value(reg.category, kind))
        .collect()
}

/// Register usage conventions of one architecture.
pub trait RegisterConfig: Send + Sync {
    fn architecture(&self) -> &Architecture;

    /// Register holding the stack frame.
    fn frame_register(&self) -> Register;

    /// Registers available to the register allocator, in allocation order.
    fn allocatable_registers(&self) -> &[Register];

    /// Allocatable registers able to hold `kind`.
    fn filter_allocatable_registers(&self, kind: ValueKind, registers: &[Register]) -> Vec<Register> {
        filter_registers(self.architecture(), kind, registers)
    }

    /// Registers whose contents a call may destroy.
    fn caller_save_registers(&self) -> &[Register];

    /// Registers a callee must preserve, if the convention has any.
    fn callee_save_registers(&self) -> Option<&[Register]>;

    fn are_all_allocatable_registers_caller_saved(&self) -> bool;

    /// Parameter registers used for `kind` under `ty`.
    ///
    /// # Panics
    /// If `kind` cannot be passed as a parameter.
    fn calling_convention_registers(&self, ty: CallingConventionType, kind: ValueKind) -> &[Register];

    /// Register holding a return value of `kind`, `None` for void.
    fn return_register(&self, kind: ValueKind) -> Option<Register>;

    /// Locations for a call with the given return and parameter kinds.
    fn calling_convention(
        &self,
        ty: CallingConventionType,
        return_kind: ValueKind,
        parameter_kinds: &[ValueKind],
    ) -> CallingConvention;

    /// Largest frame the VM supports, in bytes.
    fn maximum_frame_size(&self) -> usize;

    /// Attributes of every register of the architecture, indexed by number.
    fn attributes_map(&self) -> Vec<RegisterAttributes> {
        RegisterAttributes::create_map(
            self.architecture().registers,
            self.caller_save_registers(),
            self.callee_save_registers(),
            self.allocatable_registers(),
        )
    }
}

/// Caller-saved set: allocatable registers plus every parameter pool.
pub fn compute_caller_saved(universe: &[Register], pools: &[&[Register]]) -> Vec<Register> {
    let mut set = RegisterSet::new();
    for pool in pools {
        for reg in pool.iter() {
            set.insert(*reg);
        }
    }
    set.to_vec(universe)
}
