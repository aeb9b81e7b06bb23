//! AArch64 register file.
//!
//! `r0`-`r30` are numbers 0-30, `zr` is 31 and `sp` is 32 (both encode as 31),
//! SIMD/FP registers `v0`-`v31` are numbers 33-64.

use crate::core::arch::{ArchKind, Architecture};
use crate::core::register::{Register, RegisterCategory};

const fn gp(name: &'static str, encoding: u8) -> Register {
    Register::new(name, encoding as u16, encoding, RegisterCategory::GeneralPurpose)
}

const fn simd(name: &'static str, encoding: u8) -> Register {
    Register::new(name, 33 + encoding as u16, encoding, RegisterCategory::FloatingPoint)
}

pub const CPU_REGISTERS: [Register; 33] = [
    gp("r0", 0),
    gp("r1", 1),
    gp("r2", 2),
    gp("r3", 3),
    gp("r4", 4),
    gp("r5", 5),
    gp("r6", 6),
    gp("r7", 7),
    gp("r8", 8),
    gp("r9", 9),
    gp("r10", 10),
    gp("r11", 11),
    gp("r12", 12),
    gp("r13", 13),
    gp("r14", 14),
    gp("r15", 15),
    gp("r16", 16),
    gp("r17", 17),
    gp("r18", 18),
    gp("r19", 19),
    gp("r20", 20),
    gp("r21", 21),
    gp("r22", 22),
    gp("r23", 23),
    gp("r24", 24),
    gp("r25", 25),
    gp("r26", 26),
    gp("r27", 27),
    gp("r28", 28),
    gp("r29", 29),
    gp("r30", 30),
    gp("zr", 31),
    Register::new("sp", 32, 31, RegisterCategory::GeneralPurpose),
];

pub const SIMD_REGISTERS: [Register; 32] = [
    simd("v0", 0),
    simd("v1", 1),
    simd("v2", 2),
    simd("v3", 3),
    simd("v4", 4),
    simd("v5", 5),
    simd("v6", 6),
    simd("v7", 7),
    simd("v8", 8),
    simd("v9", 9),
    simd("v10", 10),
    simd("v11", 11),
    simd("v12", 12),
    simd("v13", 13),
    simd("v14", 14),
    simd("v15", 15),
    simd("v16", 16),
    simd("v17", 17),
    simd("v18", 18),
    simd("v19", 19),
    simd("v20", 20),
    simd("v21", 21),
    simd("v22", 22),
    simd("v23", 23),
    simd("v24", 24),
    simd("v25", 25),
    simd("v26", 26),
    simd("v27", 27),
    simd("v28", 28),
    simd("v29", 29),
    simd("v30", 30),
    simd("v31", 31),
];

pub const R0: Register = CPU_REGISTERS[0];
pub const R1: Register = CPU_REGISTERS[1];
pub const R2: Register = CPU_REGISTERS[2];
pub const R3: Register = CPU_REGISTERS[3];
pub const R4: Register = CPU_REGISTERS[4];
pub const R5: Register = CPU_REGISTERS[5];
pub const R6: Register = CPU_REGISTERS[6];
pub const R7: Register = CPU_REGISTERS[7];
pub const R8: Register = CPU_REGISTERS[8];
pub const R9: Register = CPU_REGISTERS[9];
pub const R27: Register = CPU_REGISTERS[27];
pub const R28: Register = CPU_REGISTERS[28];
/// Frame pointer.
pub const FP: Register = CPU_REGISTERS[29];
/// Link register.
pub const LR: Register = CPU_REGISTERS[30];
pub const ZR: Register = CPU_REGISTERS[31];
pub const SP: Register = CPU_REGISTERS[32];

pub const V0: Register = SIMD_REGISTERS[0];
pub const V1: Register = SIMD_REGISTERS[1];
pub const V2: Register = SIMD_REGISTERS[2];
pub const V3: Register = SIMD_REGISTERS[3];
pub const V4: Register = SIMD_REGISTERS[4];
pub const V5: Register = SIMD_REGISTERS[5];
pub const V6: Register = SIMD_REGISTERS[6];
pub const V7: Register = SIMD_REGISTERS[7];

/// Scratch registers used by the macro assembler.
pub const RSCRATCH1: Register = R8;
pub const RSCRATCH2: Register = R9;
/// Holds the current thread.
pub const THREAD_REGISTER: Register = R28;

pub static ALL_REGISTERS: [Register; 65] = {
    let mut all = [ZR; 65];
    let mut i = 0;
    while i < 33 {
        all[i] = CPU_REGISTERS[i];
        i += 1;
    }
    while i < 65 {
        all[i] = SIMD_REGISTERS[i - 33];
        i += 1;
    }
    all
};

/// The AArch64 architecture descriptor.
pub fn aarch64() -> Architecture {
    Architecture {
        kind: ArchKind::AArch64,
        word_size: 8,
        registers: &ALL_REGISTERS,
        available_value_registers: &ALL_REGISTERS,
        return_address_size: 0,
    }
}
