//! Method descriptor parsing.
//!
//! The execution engine identifies methods by holder, name and a descriptor
//! such as `(IJLjava/lang/Object;[ID)V`. Only the value kinds matter to the
//! calling convention, so reference and array types collapse to `Object`.

use super::error::{CiError, CiResult};
use super::kind::ValueKind;
use std::fmt;

/// Parameter and return kinds of a method descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    descriptor: String,
    parameters: Vec<ValueKind>,
    return_kind: ValueKind,
}

impl Signature {
    /// Parse a method descriptor.
    pub fn parse(descriptor: &str) -> CiResult<Self> {
        let invalid = |reason: &str| CiError::InvalidSignature {
            descriptor: descriptor.to_string(),
            reason: reason.to_string(),
        };

        let bytes = descriptor.as_bytes();
        if bytes.first() != Some(&b'(') {
            return Err(invalid("expected '('"));
        }

        let mut pos = 1;
        let mut parameters = Vec::new();
        loop {
            match bytes.get(pos) {
                None => return Err(invalid("missing ')'")),
                Some(b')') => {
                    pos += 1;
                    break;
                }
                Some(_) => {
                    let (kind, next) = parse_field_type(bytes, pos).map_err(|r| invalid(r))?;
                    if kind == ValueKind::Void {
                        return Err(invalid("void parameter"));
                    }
                    parameters.push(kind);
                    pos = next;
                }
            }
        }

        let (return_kind, end) = parse_field_type(bytes, pos).map_err(|r| invalid(r))?;
        if end != bytes.len() {
            return Err(invalid("trailing characters after return type"));
        }

        Ok(Self {
            descriptor: descriptor.to_string(),
            parameters,
            return_kind,
        })
    }

    /// Build a signature directly from kinds.
    pub fn from_kinds(parameters: &[ValueKind], return_kind: ValueKind) -> Self {
        let mut descriptor = String::from("(");
        for kind in parameters {
            match kind {
                ValueKind::Object => descriptor.push_str("Ljava/lang/Object;"),
                other => descriptor.push(other.type_char()),
            }
        }
        descriptor.push(')');
        match return_kind {
            ValueKind::Object => descriptor.push_str("Ljava/lang/Object;"),
            other => descriptor.push(other.type_char()),
        }
        Self {
            descriptor,
            parameters: parameters.to_vec(),
            return_kind,
        }
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn parameters(&self) -> &[ValueKind] {
        &self.parameters
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    pub fn return_kind(&self) -> ValueKind {
        self.return_kind
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor)
    }
}

/// Parse one field type starting at `pos`, returning its kind and the next position.
fn parse_field_type(bytes: &[u8], pos: usize) -> Result<(ValueKind, usize), &'static str> {
    match bytes.get(pos) {
        None => Err("unexpected end of descriptor"),
        Some(b'L') => {
            let end = bytes[pos..]
                .iter()
                .position(|&b| b == b';')
                .ok_or("unterminated class name")?;
            if end == 1 {
                return Err("empty class name");
            }
            Ok((ValueKind::Object, pos + end + 1))
        }
        Some(b'[') => {
            let mut component = pos + 1;
            while bytes.get(component) == Some(&b'[') {
                component += 1;
            }
            let (kind, next) = parse_field_type(bytes, component)?;
            if kind == ValueKind::Void {
                return Err("array of void");
            }
            Ok((ValueKind::Object, next))
        }
        Some(&b) => ValueKind::from_primitive_or_void_type_char(b as char)
            .map(|kind| (kind, pos + 1))
            .map_err(|_| "unknown type character"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_descriptor() {
        let sig = Signature::parse("(IJLjava/lang/Object;IIID)V").unwrap();
        assert_eq!(
            sig.parameters(),
            &[
                ValueKind::Int,
                ValueKind::Long,
                ValueKind::Object,
                ValueKind::Int,
                ValueKind::Int,
                ValueKind::Int,
                ValueKind::Double,
            ]
        );
        assert_eq!(sig.return_kind(), ValueKind::Void);
    }

    #[test]
    fn test_parse_arrays_and_empty() {
        let sig = Signature::parse("([[I[Ljava/lang/String;Z)[J").unwrap();
        assert_eq!(
            sig.parameters(),
            &[ValueKind::Object, ValueKind::Object, ValueKind::Boolean]
        );
        assert_eq!(sig.return_kind(), ValueKind::Object);

        let empty = Signature::parse("()F").unwrap();
        assert_eq!(empty.parameter_count(), 0);
        assert_eq!(empty.return_kind(), ValueKind::Float);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "I)V", "(I", "(V)V", "(Ljava/lang/Object)V", "(I)VX", "(Q)V", "([V)V"] {
            assert!(
                matches!(Signature::parse(bad), Err(CiError::InvalidSignature { .. })),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_from_kinds_round_trips_descriptor() {
        let sig = Signature::from_kinds(&[ValueKind::Int, ValueKind::Object], ValueKind::Double);
        assert_eq!(sig.descriptor(), "(ILjava/lang/Object;)D");
        assert_eq!(Signature::parse(sig.descriptor()).unwrap(), sig);
    }
}
