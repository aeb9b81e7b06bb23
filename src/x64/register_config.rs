// This module implements the x86-64 register configuration used by compilers targeting the
// managed runtime. Managed calls pass integer and reference arguments in RSI, RDX, RCX, R8,
// R9, RDI (a rotation of the System V order so that RDI stays free longest) and native calls
// use the platform ABI: RDI, RSI, RDX, RCX, R8, R9 on Unix and RCX, RDX, R8, R9 with a
// 32-byte home space on Windows. Floating point arguments use XMM0-XMM7 in both
// conventions. Return values are always in RAX or XMM0. RSP and R15 (the thread register)
// are never allocatable; R12 is additionally reserved as the heap base when compressed
// references are enabled. Every allocatable and every parameter register is caller-saved,
// there are no callee-saved registers.

//! x86-64 register configuration.

use super::registers::*;
use crate::core::arch::TargetDescription;
use crate::core::calling_convention::{
    CallingConvention, CallingConventionType, ConventionAssigner, ConventionPools,
};
use crate::core::error::CiResult;
use crate::core::kind::{Lane, ValueKind};
use crate::core::register::Register;
use crate::core::register_config::{compute_caller_saved, init_allocatable, RegisterConfig};
use crate::core::vm_config::VmConfig;
use crate::core::arch::Architecture;
use std::fmt;

/// Registers never handed to the allocator.
pub const RESERVED_REGISTERS: [Register; 2] = [RSP, R15];

/// Heap base register when compressed references are enabled.
pub const HEAP_BASE_REGISTER: Register = R12;

const XMM_PARAMETER_REGISTERS: [Register; 8] = [XMM0, XMM1, XMM2, XMM3, XMM4, XMM5, XMM6, XMM7];

const SYSV_JAVA_PARAMETER_REGISTERS: [Register; 6] = [RSI, RDX, RCX, R8, R9, RDI];
const SYSV_NATIVE_PARAMETER_REGISTERS: [Register; 6] = [RDI, RSI, RDX, RCX, R8, R9];
const WIN64_JAVA_PARAMETER_REGISTERS: [Register; 6] = [RDX, R8, R9, RDI, RSI, RCX];
const WIN64_NATIVE_PARAMETER_REGISTERS: [Register; 4] = [RCX, RDX, R8, R9];

/// x86-64 register configuration.
pub struct Amd64RegisterConfig {
    target: TargetDescription,
    allocatable: Vec<Register>,
    /// Always includes every parameter register.
    caller_saved: Vec<Register>,
    max_frame_size: usize,
    java_general_parameter_registers: &'static [Register],
    native_general_parameter_registers: &'static [Register],
    /// Windows x64 requires a save area for the register arguments.
    needs_native_stack_home_space: bool,
}

impl Amd64RegisterConfig {
    /// Create the configuration, reserving the heap base register if the VM
    /// uses compressed references.
    pub fn new(target: TargetDescription, config: &VmConfig) -> CiResult<Self> {
        let heap_base = config.use_compressed_oops.then_some(HEAP_BASE_REGISTER);
        let allocatable = init_allocatable(
            target.arch.available_value_registers,
            &RESERVED_REGISTERS,
            heap_base,
        )?;
        let result = Self::with_allocatable(target, config, allocatable);
        debug_assert!(result.caller_saved.len() >= result.allocatable.len());
        Ok(result)
    }

    /// Create the configuration with an explicit allocatable list.
    pub fn with_allocatable(target: TargetDescription, config: &VmConfig, allocatable: Vec<Register>) -> Self {
        let (java, native, home_space): (&'static [Register], &'static [Register], bool) =
            if config.windows_os {
                (&WIN64_JAVA_PARAMETER_REGISTERS, &WIN64_NATIVE_PARAMETER_REGISTERS, true)
            } else {
                (&SYSV_JAVA_PARAMETER_REGISTERS, &SYSV_NATIVE_PARAMETER_REGISTERS, false)
            };

        let caller_saved = compute_caller_saved(
            target.arch.registers,
            &[&allocatable, &XMM_PARAMETER_REGISTERS, java, native],
        );

        Self {
            target,
            allocatable,
            caller_saved,
            max_frame_size: config.max_frame_size,
            java_general_parameter_registers: java,
            native_general_parameter_registers: native,
            needs_native_stack_home_space: home_space,
        }
    }

    pub fn target(&self) -> &TargetDescription {
        &self.target
    }

    pub fn needs_native_stack_home_space(&self) -> bool {
        self.needs_native_stack_home_space
    }

    fn general_parameter_registers(&self, ty: CallingConventionType) -> &'static [Register] {
        if ty.is_native() {
            self.native_general_parameter_registers
        } else {
            self.java_general_parameter_registers
        }
    }
}

impl RegisterConfig for Amd64RegisterConfig {
    fn architecture(&self) -> &Architecture {
        &self.target.arch
    }

    fn frame_register(&self) -> Register {
        RSP
    }

    fn allocatable_registers(&self) -> &[Register] {
        &self.allocatable
    }

    fn caller_save_registers(&self) -> &[Register] {
        &self.caller_saved
    }

    fn callee_save_registers(&self) -> Option<&[Register]> {
        None
    }

    fn are_all_allocatable_registers_caller_saved(&self) -> bool {
        true
    }

    fn calling_convention_registers(&self, ty: CallingConventionType, kind: ValueKind) -> &[Register] {
        match kind.lane() {
            Some(Lane::Integer) => self.general_parameter_registers(ty),
            Some(Lane::Float) => &XMM_PARAMETER_REGISTERS,
            None => unreachable!("should not reach here: no parameter registers for {kind:?}"),
        }
    }

    fn return_register(&self, kind: ValueKind) -> Option<Register> {
        match kind.lane()? {
            Lane::Integer => Some(RAX),
            Lane::Float => Some(XMM0),
        }
    }

    fn calling_convention(
        &self,
        ty: CallingConventionType,
        return_kind: ValueKind,
        parameter_kinds: &[ValueKind],
    ) -> CallingConvention {
        // Parameter locations are the same from the caller and callee perspective.
        let general = self.general_parameter_registers(ty);
        let home_space = if ty.is_native() && self.needs_native_stack_home_space {
            general.len() * self.target.word_size
        } else {
            0
        };
        let pools = ConventionPools {
            general,
            float: &XMM_PARAMETER_REGISTERS,
            integer_return: RAX,
            float_return: XMM0,
            word_size: self.target.word_size,
            home_space,
        };
        ConventionAssigner::new(pools, ty).assign(return_kind, parameter_kinds)
    }

    fn maximum_frame_size(&self) -> usize {
        self.max_frame_size
    }
}

impl fmt::Display for Amd64RegisterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = |regs: &[Register]| regs.iter().map(|r| r.name).collect::<Vec<_>>().join(", ");
        writeln!(f, "Allocatable: [{}]", names(&self.allocatable))?;
        writeln!(f, "CallerSave:  [{}]", names(&self.caller_saved))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::calling_convention::Location;
    use crate::core::register::RegisterSet;

    fn config(windows: bool, compressed: bool) -> Amd64RegisterConfig {
        let vm = VmConfig::for_architecture("amd64")
            .with_windows_os(windows)
            .with_compressed_oops(compressed);
        Amd64RegisterConfig::new(TargetDescription::new(amd64(), 16, true), &vm).unwrap()
    }

    #[test]
    fn test_allocatable_count_with_and_without_heap_base() {
        let plain = config(false, false);
        assert_eq!(plain.allocatable_registers().len(), ALL_REGISTERS.len() - 2);
        assert!(plain.allocatable_registers().contains(&R12));

        let compressed = config(false, true);
        assert_eq!(compressed.allocatable_registers().len(), ALL_REGISTERS.len() - 3);
        assert!(!compressed.allocatable_registers().contains(&R12));
        assert!(!compressed.allocatable_registers().contains(&RSP));
        assert!(!compressed.allocatable_registers().contains(&R15));
    }

    #[test]
    fn test_caller_saved_covers_allocatable_and_parameters() {
        for windows in [false, true] {
            let cfg = config(windows, true);
            let saved = RegisterSet::from_registers(cfg.caller_save_registers());
            let mut pools = RegisterSet::from_registers(cfg.allocatable_registers());
            pools.union(&RegisterSet::from_registers(&XMM_PARAMETER_REGISTERS));
            for ty in [CallingConventionType::ManagedCall, CallingConventionType::NativeCall] {
                pools.union(&RegisterSet::from_registers(
                    cfg.calling_convention_registers(ty, ValueKind::Int),
                ));
            }
            assert_eq!(saved, pools);
            assert!(cfg.callee_save_registers().is_none());
            assert!(cfg.are_all_allocatable_registers_caller_saved());
        }
    }

    #[test]
    fn test_managed_call_mixed_signature() {
        let cfg = config(false, false);
        let params = [
            ValueKind::Int,
            ValueKind::Long,
            ValueKind::Object,
            ValueKind::Int,
            ValueKind::Int,
            ValueKind::Int,
            ValueKind::Double,
        ];
        let cc = cfg.calling_convention(CallingConventionType::ManagedCall, ValueKind::Void, &params);
        let regs: Vec<_> = cc.arguments().iter().map(|l| l.register().unwrap()).collect();
        assert_eq!(regs, vec![RSI, RDX, RCX, R8, R9, RDI, XMM0]);
        assert_eq!(cc.stack_size(), 0);
        assert!(cc.return_location().is_none());
    }

    #[test]
    fn test_managed_call_seventh_integer_goes_to_stack() {
        let cfg = config(false, false);
        let cc = cfg.calling_convention(
            CallingConventionType::ManagedCall,
            ValueKind::Int,
            &[ValueKind::Int; 7],
        );
        match cc.argument(6) {
            Location::Stack(slot) => {
                assert_eq!(slot.offset, 0);
                assert_eq!(slot.size, 8);
            }
            other => panic!("expected stack slot, got {other}"),
        }
        assert_eq!(cc.stack_size(), 8);
        assert_eq!(cc.return_location().unwrap().register(), Some(RAX));
    }

    #[test]
    fn test_windows_native_call_reserves_home_space() {
        let cfg = config(true, false);
        let cc = cfg.calling_convention(CallingConventionType::NativeCall, ValueKind::Float, &[ValueKind::Long; 2]);
        assert_eq!(cc.argument(0).register(), Some(RCX));
        assert_eq!(cc.argument(1).register(), Some(RDX));
        assert_eq!(cc.stack_size(), 32);

        let cc = cfg.calling_convention(CallingConventionType::NativeCall, ValueKind::Void, &[ValueKind::Long; 5]);
        assert_eq!(cc.argument(4).stack_slot().unwrap().offset, 32);
        assert_eq!(cc.stack_size(), 40);

        // Managed calls never reserve home space.
        let cc = cfg.calling_convention(CallingConventionType::ManagedCall, ValueKind::Void, &[ValueKind::Long; 2]);
        assert_eq!(cc.stack_size(), 0);
    }

    #[test]
    fn test_return_registers() {
        let cfg = config(false, false);
        assert_eq!(cfg.return_register(ValueKind::Boolean), Some(RAX));
        assert_eq!(cfg.return_register(ValueKind::Object), Some(RAX));
        assert_eq!(cfg.return_register(ValueKind::Float), Some(XMM0));
        assert_eq!(cfg.return_register(ValueKind::Void), None);
        assert_eq!(cfg.return_register(ValueKind::Illegal), None);
        assert_eq!(cfg.frame_register(), RSP);
    }

    #[test]
    fn test_filter_allocatable_registers() {
        let cfg = config(false, false);
        let fp = cfg.filter_allocatable_registers(ValueKind::Double, cfg.allocatable_registers());
        assert_eq!(fp, XMM_REGISTERS.to_vec());
        let gp = cfg.filter_allocatable_registers(ValueKind::Long, cfg.allocatable_registers());
        assert_eq!(gp.len(), 14);
        assert_eq!(gp[0], RAX);
    }

    #[test]
    #[should_panic(expected = "should not reach here")]
    fn test_void_parameter_registers_is_fatal() {
        config(false, false).calling_convention_registers(CallingConventionType::ManagedCall, ValueKind::Void);
    }
}
