//! Type handles returned by name lookups.

use crate::core::kind::ValueKind;
use std::fmt;

/// A type the native lookup resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedType {
    /// Internal name, e.g. `Ljava/lang/String;`.
    pub name: String,
}

impl ResolvedType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JavaType {
    Primitive(ValueKind),
    Resolved(ResolvedType),
    /// Placeholder for a name the lookup declined to resolve.
    Unresolved(String),
}

impl JavaType {
    pub fn kind(&self) -> ValueKind {
        match self {
            JavaType::Primitive(kind) => *kind,
            JavaType::Resolved(_) | JavaType::Unresolved(_) => ValueKind::Object,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, JavaType::Unresolved(_))
    }

    pub fn name(&self) -> String {
        match self {
            JavaType::Primitive(kind) => kind.type_char().to_string(),
            JavaType::Resolved(ty) => ty.name.clone(),
            JavaType::Unresolved(name) => name.clone(),
        }
    }
}

impl fmt::Display for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JavaType::Primitive(kind) => write!(f, "{}", kind.java_name()),
            JavaType::Resolved(ty) => write!(f, "{}", ty.name),
            JavaType::Unresolved(name) => write!(f, "{} (unresolved)", name),
        }
    }
}

/// Native type lookup provided by the execution engine.
pub trait TypeResolver: Send + Sync {
    /// Look up `name` as seen from `accessing`. `resolve` asks the engine to
    /// load the type if needed. Returning `None` declines the lookup.
    fn lookup(&self, name: &str, accessing: Option<&ResolvedType>, resolve: bool) -> Option<ResolvedType>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_and_names() {
        assert_eq!(JavaType::Primitive(ValueKind::Long).kind(), ValueKind::Long);
        assert_eq!(JavaType::Primitive(ValueKind::Long).name(), "J");
        let resolved = JavaType::Resolved(ResolvedType::new("Ljava/lang/String;"));
        assert_eq!(resolved.kind(), ValueKind::Object);
        assert!(resolved.is_resolved());
        let unresolved = JavaType::Unresolved("LMissing;".to_string());
        assert!(!unresolved.is_resolved());
        assert_eq!(unresolved.to_string(), "LMissing; (unresolved)");
    }
}
