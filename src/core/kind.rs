//! Value kinds of the managed language.
//!
//! The set of kinds is closed. Every kind that can be passed or returned is
//! classified into exactly one [`Lane`]; `Void` and `Illegal` have no lane.

use super::error::{CiError, CiResult};
use std::fmt;

/// Primitive and reference categories of managed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
    Object,
    Void,
    Illegal,
}

/// Register lane a value travels in when passed to or returned from a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    /// Integer and reference values (general purpose registers).
    Integer,
    /// Floating point values.
    Float,
}

impl ValueKind {
    /// Kind used when the value lives in a stack slot or register.
    ///
    /// Sub-int kinds are widened to `Int`; all other kinds are unchanged.
    pub fn stack_kind(self) -> ValueKind {
        match self {
            ValueKind::Boolean | ValueKind::Byte | ValueKind::Short | ValueKind::Char => {
                ValueKind::Int
            }
            other => other,
        }
    }

    /// Natural size in bytes. References are assumed uncompressed (8 bytes).
    pub fn size_in_bytes(self) -> usize {
        match self {
            ValueKind::Boolean | ValueKind::Byte => 1,
            ValueKind::Short | ValueKind::Char => 2,
            ValueKind::Int | ValueKind::Float => 4,
            ValueKind::Long | ValueKind::Double | ValueKind::Object => 8,
            ValueKind::Void | ValueKind::Illegal => 0,
        }
    }

    /// Lane classification, `None` for `Void` and `Illegal`.
    pub fn lane(self) -> Option<Lane> {
        match self {
            ValueKind::Boolean
            | ValueKind::Byte
            | ValueKind::Short
            | ValueKind::Char
            | ValueKind::Int
            | ValueKind::Long
            | ValueKind::Object => Some(Lane::Integer),
            ValueKind::Float | ValueKind::Double => Some(Lane::Float),
            ValueKind::Void | ValueKind::Illegal => None,
        }
    }

    pub fn is_primitive(self) -> bool {
        !matches!(self, ValueKind::Object | ValueKind::Illegal)
    }

    /// Descriptor character of this kind.
    pub fn type_char(self) -> char {
        match self {
            ValueKind::Boolean => 'Z',
            ValueKind::Byte => 'B',
            ValueKind::Short => 'S',
            ValueKind::Char => 'C',
            ValueKind::Int => 'I',
            ValueKind::Long => 'J',
            ValueKind::Float => 'F',
            ValueKind::Double => 'D',
            ValueKind::Object => 'A',
            ValueKind::Void => 'V',
            ValueKind::Illegal => '-',
        }
    }

    /// Map a primitive or void descriptor character to its kind.
    pub fn from_primitive_or_void_type_char(ch: char) -> CiResult<ValueKind> {
        match ch {
            'Z' => Ok(ValueKind::Boolean),
            'B' => Ok(ValueKind::Byte),
            'S' => Ok(ValueKind::Short),
            'C' => Ok(ValueKind::Char),
            'I' => Ok(ValueKind::Int),
            'J' => Ok(ValueKind::Long),
            'F' => Ok(ValueKind::Float),
            'D' => Ok(ValueKind::Double),
            'V' => Ok(ValueKind::Void),
            _ => Err(CiError::InvalidTypeChar { ch }),
        }
    }

    /// Name as used in source code (`int`, `long`, ...).
    pub fn java_name(self) -> &'static str {
        match self {
            ValueKind::Boolean => "boolean",
            ValueKind::Byte => "byte",
            ValueKind::Short => "short",
            ValueKind::Char => "char",
            ValueKind::Int => "int",
            ValueKind::Long => "long",
            ValueKind::Float => "float",
            ValueKind::Double => "double",
            ValueKind::Object => "Object",
            ValueKind::Void => "void",
            ValueKind::Illegal => "illegal",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.java_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_kind_widens_sub_int_kinds() {
        for kind in [ValueKind::Boolean, ValueKind::Byte, ValueKind::Short, ValueKind::Char] {
            assert_eq!(kind.stack_kind(), ValueKind::Int);
        }
        assert_eq!(ValueKind::Long.stack_kind(), ValueKind::Long);
        assert_eq!(ValueKind::Object.stack_kind(), ValueKind::Object);
        assert_eq!(ValueKind::Float.stack_kind(), ValueKind::Float);
    }

    #[test]
    fn test_lane_classification() {
        assert_eq!(ValueKind::Object.lane(), Some(Lane::Integer));
        assert_eq!(ValueKind::Char.lane(), Some(Lane::Integer));
        assert_eq!(ValueKind::Double.lane(), Some(Lane::Float));
        assert_eq!(ValueKind::Void.lane(), None);
        assert_eq!(ValueKind::Illegal.lane(), None);
    }

    #[test]
    fn test_type_chars() {
        assert_eq!(ValueKind::from_primitive_or_void_type_char('J').unwrap(), ValueKind::Long);
        assert_eq!(ValueKind::from_primitive_or_void_type_char('V').unwrap(), ValueKind::Void);
        assert!(matches!(
            ValueKind::from_primitive_or_void_type_char('L'),
            Err(CiError::InvalidTypeChar { ch: 'L' })
        ));
        assert_eq!(ValueKind::Double.type_char(), 'D');
    }
}
