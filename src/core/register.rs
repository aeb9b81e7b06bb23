//! Register identities and register sets.
//!
//! A [`Register`] is a statically enumerated, immutable description of one
//! physical register. [`RegisterSet`] is a bitset over register numbers, used
//! where membership matters more than order (caller-saved computation,
//! attribute maps). Ordered roles such as the allocatable list or parameter
//! pools are plain slices or `Vec<Register>`.

use super::kind::{Lane, ValueKind};
use std::fmt;

/// Upper bound (exclusive) on register numbers.
pub const MAX_REGISTER_NUMBER: usize = 128;

const SET_WORDS: usize = MAX_REGISTER_NUMBER / 64;

/// Storage category of a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterCategory {
    GeneralPurpose = 0,
    FloatingPoint = 1,
}

impl RegisterCategory {
    /// Whether a register of this category can hold a value of `kind`.
    pub fn can_store(self, kind: ValueKind) -> bool {
        match (self, kind.lane()) {
            (RegisterCategory::GeneralPurpose, Some(Lane::Integer)) => true,
            (RegisterCategory::FloatingPoint, Some(Lane::Float)) => true,
            _ => false,
        }
    }
}

/// A physical register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Register {
    /// Assembler name (`rax`, `xmm3`, `r27`).
    pub name: &'static str,
    /// Register number, unique within an architecture.
    pub number: u16,
    /// Hardware encoding. Not unique: AArch64 `sp` and `zr` share 31.
    pub encoding: u8,
    pub category: RegisterCategory,
}

impl Register {
    pub const fn new(name: &'static str, number: u16, encoding: u8, category: RegisterCategory) -> Self {
        Self {
            name,
            number,
            encoding,
            category,
        }
    }

    pub fn is_general_purpose(&self) -> bool {
        self.category == RegisterCategory::GeneralPurpose
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Bit set for tracking register membership.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterSet {
    words: [u64; SET_WORDS],
}

impl RegisterSet {
    /// Create an empty register set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set containing every register in `regs`.
    pub fn from_registers<'a, I>(regs: I) -> Self
    where
        I: IntoIterator<Item = &'a Register>,
    {
        let mut set = Self::new();
        for reg in regs {
            set.insert(*reg);
        }
        set
    }

    fn slot(reg: Register) -> Option<(usize, u64)> {
        let n = reg.number as usize;
        (n < MAX_REGISTER_NUMBER).then(|| (n / 64, 1u64 << (n % 64)))
    }

    pub fn contains(&self, reg: Register) -> bool {
        match Self::slot(reg) {
            Some((word, bit)) => self.words[word] & bit != 0,
            None => false,
        }
    }

    /// Insert a register, returning `true` if it was not present.
    ///
    /// # Panics
    /// If the register number is out of range.
    pub fn insert(&mut self, reg: Register) -> bool {
        let (word, bit) = Self::slot(reg)
            .unwrap_or_else(|| panic!("register number out of range: {} ({})", reg, reg.number));
        let fresh = self.words[word] & bit == 0;
        self.words[word] |= bit;
        fresh
    }

    pub fn remove(&mut self, reg: Register) {
        if let Some((word, bit)) = Self::slot(reg) {
            self.words[word] &= !bit;
        }
    }

    /// Set union with another set.
    pub fn union(&mut self, other: &RegisterSet) {
        for i in 0..SET_WORDS {
            self.words[i] |= other.words[i];
        }
    }

    /// Whether every member of `self` is also in `other`.
    pub fn is_subset(&self, other: &RegisterSet) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .all(|(a, b)| a & !b == 0)
    }

    pub fn len(&self) -> usize {
        self.words.iter().map(|m| m.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|m| *m == 0)
    }

    /// Members of this set in the order they appear in `universe`.
    pub fn to_vec(&self, universe: &[Register]) -> Vec<Register> {
        universe.iter().copied().filter(|r| self.contains(*r)).collect()
    }
}

/// Per-register attributes derived from a register configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegisterAttributes {
    pub caller_save: bool,
    pub callee_save: bool,
    pub allocatable: bool,
}

impl RegisterAttributes {
    /// Build the attribute map indexed by register number.
    pub fn create_map(
        registers: &[Register],
        caller_save: &[Register],
        callee_save: Option<&[Register]>,
        allocatable: &[Register],
    ) -> Vec<RegisterAttributes> {
        let caller = RegisterSet::from_registers(caller_save);
        let callee = RegisterSet::from_registers(callee_save.unwrap_or(&[]));
        let alloc = RegisterSet::from_registers(allocatable);

        let len = registers.iter().map(|r| r.number as usize + 1).max().unwrap_or(0);
        let mut map = vec![RegisterAttributes::default(); len];
        for reg in registers {
            map[reg.number as usize] = RegisterAttributes {
                caller_save: caller.contains(*reg),
                callee_save: callee.contains(*reg),
                allocatable: alloc.contains(*reg),
            };
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Register = Register::new("a", 0, 0, RegisterCategory::GeneralPurpose);
    const B: Register = Register::new("b", 1, 1, RegisterCategory::GeneralPurpose);
    const F0: Register = Register::new("f0", 2, 0, RegisterCategory::FloatingPoint);

    #[test]
    fn test_register_set_operations() {
        let mut set = RegisterSet::new();
        assert!(set.is_empty());
        assert!(set.insert(A));
        assert!(!set.insert(A));
        assert!(set.contains(A));
        // Same encoding, different register number.
        assert!(!set.contains(F0));
        set.insert(F0);
        assert_eq!(set.len(), 2);
        set.remove(A);
        assert!(!set.contains(A));
        assert_eq!(set.to_vec(&[A, B, F0]), vec![F0]);
    }

    #[test]
    fn test_subset_and_union() {
        let small = RegisterSet::from_registers(&[A]);
        let mut big = RegisterSet::from_registers(&[B, F0]);
        assert!(!small.is_subset(&big));
        big.union(&small);
        assert!(small.is_subset(&big));
        assert_eq!(big.len(), 3);
    }

    #[test]
    fn test_category_can_store() {
        assert!(RegisterCategory::GeneralPurpose.can_store(ValueKind::Object));
        assert!(!RegisterCategory::GeneralPurpose.can_store(ValueKind::Float));
        assert!(RegisterCategory::FloatingPoint.can_store(ValueKind::Double));
        assert!(!RegisterCategory::FloatingPoint.can_store(ValueKind::Void));
    }

    #[test]
    fn test_attribute_map() {
        let map = RegisterAttributes::create_map(&[A, B, F0], &[A, F0], None, &[A]);
        assert_eq!(map.len(), 3);
        assert!(map[0].caller_save && map[0].allocatable);
        assert!(!map[1].caller_save && !map[1].allocatable);
        assert!(map[2].caller_save && !map[2].callee_save);
    }
}
