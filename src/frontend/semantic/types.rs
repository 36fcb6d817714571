//! Static types of the line script

use std::fmt;

use serde::Serialize;

use crate::frontend::parser::ast::TypeName;

/// A value type known to the binder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    Int,
    Double,
    String,
    Bool,
    Void,
    /// Parameter type accepting any non-void value
    Object,
    /// Produced after a reported error; compatible with everything to avoid cascades
    Error,
}

impl Type {
    /// Type for a written type name, `None` for `var`
    pub fn from_name(name: TypeName) -> Option<Type> {
        match name {
            TypeName::Var => None,
            TypeName::Int => Some(Type::Int),
            TypeName::Double => Some(Type::Double),
            TypeName::String => Some(Type::String),
            TypeName::Bool => Some(Type::Bool),
            TypeName::Void => Some(Type::Void),
        }
    }

    #[inline]
    pub fn is_numeric(self) -> bool {
        matches!(self, Type::Int | Type::Double)
    }

    #[inline]
    pub fn is_error(self) -> bool {
        self == Type::Error
    }

    /// Whether a value of type `source` can be stored where `self` is expected
    pub fn accepts(
        self,
        source: Type,
    ) -> bool {
        if self == source || self.is_error() || source.is_error() {
            return true;
        }
        match self {
            Type::Double => source == Type::Int,
            Type::Object => source != Type::Void,
            _ => false,
        }
    }

    /// Whether `source` matches `self` without any conversion
    pub fn matches_exactly(
        self,
        source: Type,
    ) -> bool {
        self == source || source.is_error()
    }
}

impl fmt::Display for Type {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let s = match self {
            Type::Int => "int",
            Type::Double => "double",
            Type::String => "string",
            Type::Bool => "bool",
            Type::Void => "void",
            Type::Object => "object",
            Type::Error => "?",
        };
        f.write_str(s)
    }
}
