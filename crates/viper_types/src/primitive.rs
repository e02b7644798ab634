//! Primitive data types

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// A builtin, non-composite data type.
///
/// Parses from and displays as the spelling used in source, e.g. `i32` or `bool`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum PrimitiveType {
    Bool,
    Byte,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl PrimitiveType {
    /// The size of a value of this type, in bytes
    pub const fn size(&self) -> usize {
        match self {
            PrimitiveType::Bool | PrimitiveType::Byte | PrimitiveType::I8 | PrimitiveType::U8 => 1,
            PrimitiveType::I16 | PrimitiveType::U16 => 2,
            PrimitiveType::I32 | PrimitiveType::U32 | PrimitiveType::F32 => 4,
            PrimitiveType::I64 | PrimitiveType::U64 | PrimitiveType::F64 => 8,
        }
    }

    pub const fn is_integer(&self) -> bool {
        !matches!(
            self,
            PrimitiveType::Bool | PrimitiveType::F32 | PrimitiveType::F64
        )
    }

    pub const fn is_signed(&self) -> bool {
        matches!(
            self,
            PrimitiveType::I8
                | PrimitiveType::I16
                | PrimitiveType::I32
                | PrimitiveType::I64
                | PrimitiveType::F32
                | PrimitiveType::F64
        )
    }

    pub const fn is_float(&self) -> bool {
        matches!(self, PrimitiveType::F32 | PrimitiveType::F64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_parse_primitive() {
        assert_eq!(PrimitiveType::from_str("i32"), Ok(PrimitiveType::I32));
        assert_eq!(PrimitiveType::from_str("bool"), Ok(PrimitiveType::Bool));
        assert!(PrimitiveType::from_str("Point").is_err());
    }

    #[test]
    fn test_display_is_source_spelling() {
        for ty in PrimitiveType::iter() {
            let spelled = ty.to_string();
            assert_eq!(PrimitiveType::from_str(&spelled), Ok(ty));
        }
        assert_eq!(PrimitiveType::U64.to_string(), "u64");
    }

    #[test]
    fn test_sizes() {
        assert_eq!(PrimitiveType::Byte.size(), 1);
        assert_eq!(PrimitiveType::F64.size(), 8);
        assert!(PrimitiveType::U16.is_integer());
        assert!(!PrimitiveType::U16.is_signed());
        assert!(PrimitiveType::F32.is_float());
    }
}
