//! x86-64 register file.
//!
//! General purpose registers are numbered 0-15 in hardware encoding order,
//! XMM registers 16-31.

use crate::core::arch::{ArchKind, Architecture};
use crate::core::register::{Register, RegisterCategory};

const fn cpu(name: &'static str, encoding: u8) -> Register {
    Register::new(name, encoding as u16, encoding, RegisterCategory::GeneralPurpose)
}

const fn xmm(name: &'static str, encoding: u8) -> Register {
    Register::new(name, 16 + encoding as u16, encoding, RegisterCategory::FloatingPoint)
}

pub const RAX: Register = cpu("rax", 0);
pub const RCX: Register = cpu("rcx", 1);
pub const RDX: Register = cpu("rdx", 2);
pub const RBX: Register = cpu("rbx", 3);
pub const RSP: Register = cpu("rsp", 4);
pub const RBP: Register = cpu("rbp", 5);
pub const RSI: Register = cpu("rsi", 6);
pub const RDI: Register = cpu("rdi", 7);
pub const R8: Register = cpu("r8", 8);
pub const R9: Register = cpu("r9", 9);
pub const R10: Register = cpu("r10", 10);
pub const R11: Register = cpu("r11", 11);
pub const R12: Register = cpu("r12", 12);
pub const R13: Register = cpu("r13", 13);
pub const R14: Register = cpu("r14", 14);
pub const R15: Register = cpu("r15", 15);

pub const XMM0: Register = xmm("xmm0", 0);
pub const XMM1: Register = xmm("xmm1", 1);
pub const XMM2: Register = xmm("xmm2", 2);
pub const XMM3: Register = xmm("xmm3", 3);
pub const XMM4: Register = xmm("xmm4", 4);
pub const XMM5: Register = xmm("xmm5", 5);
pub const XMM6: Register = xmm("xmm6", 6);
pub const XMM7: Register = xmm("xmm7", 7);
pub const XMM8: Register = xmm("xmm8", 8);
pub const XMM9: Register = xmm("xmm9", 9);
pub const XMM10: Register = xmm("xmm10", 10);
pub const XMM11: Register = xmm("xmm11", 11);
pub const XMM12: Register = xmm("xmm12", 12);
pub const XMM13: Register = xmm("xmm13", 13);
pub const XMM14: Register = xmm("xmm14", 14);
pub const XMM15: Register = xmm("xmm15", 15);

pub const CPU_REGISTERS: [Register; 16] = [
    RAX, RCX, RDX, RBX, RSP, RBP, RSI, RDI, R8, R9, R10, R11, R12, R13, R14, R15,
];

pub const XMM_REGISTERS: [Register; 16] = [
    XMM0, XMM1, XMM2, XMM3, XMM4, XMM5, XMM6, XMM7, XMM8, XMM9, XMM10, XMM11, XMM12, XMM13,
    XMM14, XMM15,
];

pub static ALL_REGISTERS: [Register; 32] = [
    RAX, RCX, RDX, RBX, RSP, RBP, RSI, RDI, R8, R9, R10, R11, R12, R13, R14, R15, XMM0, XMM1,
    XMM2, XMM3, XMM4, XMM5, XMM6, XMM7, XMM8, XMM9, XMM10, XMM11, XMM12, XMM13, XMM14, XMM15,
];

/// The x86-64 architecture descriptor.
pub fn amd64() -> Architecture {
    Architecture {
        kind: ArchKind::Amd64,
        word_size: 8,
        registers: &ALL_REGISTERS,
        available_value_registers: &ALL_REGISTERS,
        return_address_size: 8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_numbers_match_index() {
        for (i, reg) in ALL_REGISTERS.iter().enumerate() {
            assert_eq!(reg.number as usize, i, "{}", reg);
        }
        assert_eq!(amd64().register_by_name("xmm3"), Some(XMM3));
        assert_eq!(amd64().register_by_name("r12"), Some(R12));
    }
}
