// AArch64 register configuration. Managed calls rotate the native integer argument order by
// one so that r0 is handed out last: r1..r7 come first, then r0. Native calls follow AAPCS64
// with r0..r7. Both use v0-v7 for floating point arguments and return in r0 or v0. The
// scratch registers r8/r9, the thread register r28, the frame pointer, the link register,
// zr and sp are reserved. r27 becomes the heap base when compressed references are enabled.
// There is no stack home space on this platform.

//! AArch64 register configuration.

use super::registers::*;
use crate::core::arch::{Architecture, TargetDescription};
use crate::core::calling_convention::{
    CallingConvention, CallingConventionType, ConventionAssigner, ConventionPools,
};
use crate::core::error::CiResult;
use crate::core::kind::{Lane, ValueKind};
use crate::core::register::Register;
use crate::core::register_config::{compute_caller_saved, init_allocatable, RegisterConfig};
use crate::core::vm_config::VmConfig;
use std::fmt;

pub const RESERVED_REGISTERS: [Register; 7] = [RSCRATCH1, RSCRATCH2, THREAD_REGISTER, FP, LR, ZR, SP];

pub const HEAP_BASE_REGISTER: Register = R27;

const JAVA_GENERAL_PARAMETER_REGISTERS: [Register; 8] = [R1, R2, R3, R4, R5, R6, R7, R0];
const NATIVE_GENERAL_PARAMETER_REGISTERS: [Register; 8] = [R0, R1, R2, R3, R4, R5, R6, R7];
const SIMD_PARAMETER_REGISTERS: [Register; 8] = [V0, V1, V2, V3, V4, V5, V6, V7];

/// AArch64 register configuration.
pub struct Aarch64RegisterConfig {
    target: TargetDescription,
    allocatable: Vec<Register>,
    caller_saved: Vec<Register>,
    max_frame_size: usize,
}

impl Aarch64RegisterConfig {
    pub fn new(target: TargetDescription, config: &VmConfig) -> CiResult<Self> {
        let heap_base = config.use_compressed_oops.then_some(HEAP_BASE_REGISTER);
        let allocatable = init_allocatable(
            target.arch.available_value_registers,
            &RESERVED_REGISTERS,
            heap_base,
        )?;
        let caller_saved = compute_caller_saved(
            target.arch.registers,
            &[
                &allocatable,
                &SIMD_PARAMETER_REGISTERS,
                &JAVA_GENERAL_PARAMETER_REGISTERS,
                &NATIVE_GENERAL_PARAMETER_REGISTERS,
            ],
        );
        Ok(Self {
            target,
            allocatable,
            caller_saved,
            max_frame_size: config.max_frame_size,
        })
    }

    pub fn target(&self) -> &TargetDescription {
        &self.target
    }

    fn general_parameter_registers(ty: CallingConventionType) -> &'static [Register] {
        if ty.is_native() {
            &NATIVE_GENERAL_PARAMETER_REGISTERS
        } else {
            &JAVA_GENERAL_PARAMETER_REGISTERS
        }
    }
}

impl RegisterConfig for Aarch64RegisterConfig {
    fn architecture(&self) -> &Architecture {
        &self.target.arch
    }

    fn frame_register(&self) -> Register {
        SP
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
            Some(Lane::Integer) => Self::general_parameter_registers(ty),
            Some(Lane::Float) => &SIMD_PARAMETER_REGISTERS,
            None => unreachable!("should not reach here: no parameter registers for {kind:?}"),
        }
    }

    fn return_register(&self, kind: ValueKind) -> Option<Register> {
        match kind.lane()? {
            Lane::Integer => Some(R0),
            Lane::Float => Some(V0),
        }
    }

    fn calling_convention(
        &self,
        ty: CallingConventionType,
        return_kind: ValueKind,
        parameter_kinds: &[ValueKind],
    ) -> CallingConvention {
        let pools = ConventionPools {
            general: Self::general_parameter_registers(ty),
            float: &SIMD_PARAMETER_REGISTERS,
            integer_return: R0,
            float_return: V0,
            word_size: self.target.word_size,
            home_space: 0,
        };
        ConventionAssigner::new(pools, ty).assign(return_kind, parameter_kinds)
    }

    fn maximum_frame_size(&self) -> usize {
        self.max_frame_size
    }
}

impl fmt::Display for Aarch64RegisterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = |regs: &[Register]| regs.iter().map(|r| r.name).collect::<Vec<_>>().join(", ");
        writeln!(f, "Allocatable: [{}]", names(&self.allocatable))?;
        writeln!(f, "CallerSave:  [{}]", names(&self.caller_saved))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(compressed: bool) -> Aarch64RegisterConfig {
        let vm = VmConfig::for_architecture("aarch64").with_compressed_oops(compressed);
        Aarch64RegisterConfig::new(TargetDescription::new(aarch64(), 16, true), &vm).unwrap()
    }

    #[test]
    fn test_allocatable_excludes_reserved() {
        let cfg = config(false);
        assert_eq!(cfg.allocatable_registers().len(), 58);
        for reg in RESERVED_REGISTERS {
            assert!(!cfg.allocatable_registers().contains(&reg), "{}", reg);
        }
        assert_eq!(config(true).allocatable_registers().len(), 57);
        assert!(!config(true).allocatable_registers().contains(&R27));
    }

    #[test]
    fn test_managed_call_hands_out_r0_last() {
        let cfg = config(false);
        let cc = cfg.calling_convention(
            CallingConventionType::ManagedCall,
            ValueKind::Long,
            &[ValueKind::Int; 9],
        );
        assert_eq!(cc.argument(0).register(), Some(R1));
        assert_eq!(cc.argument(7).register(), Some(R0));
        assert_eq!(cc.argument(8).stack_slot().unwrap().offset, 0);
        assert_eq!(cc.stack_size(), 8);
        assert_eq!(cc.return_location().unwrap().register(), Some(R0));
    }

    #[test]
    fn test_native_call_has_no_home_space() {
        let cfg = config(false);
        let cc = cfg.calling_convention(
            CallingConventionType::NativeCall,
            ValueKind::Double,
            &[ValueKind::Long, ValueKind::Float],
        );
        assert_eq!(cc.argument(0).register(), Some(R0));
        assert_eq!(cc.argument(1).register(), Some(V0));
        assert_eq!(cc.stack_size(), 0);
        assert_eq!(cc.return_location().unwrap().register(), Some(V0));
        assert_eq!(cfg.frame_register(), SP);
    }
}
