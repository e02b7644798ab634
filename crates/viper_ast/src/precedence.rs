//! Operator precedence, used to drive expression parsing

use viper_tokens::TokenKind;

/// How tightly an operator binds. Later variants bind tighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Assign,
    Comparison,
    AddSub,
    MulDivMod,
    BitShift,
    Prefix,
    Call,
    /// Not an operator at all
    Invalid,
}

impl Precedence {
    /// Gets the precedence of a token used as an infix operator
    pub fn of(token: &TokenKind) -> Self {
        match token {
            TokenKind::Assign
            | TokenKind::PlusAssign
            | TokenKind::MinusAssign
            | TokenKind::MultAssign
            | TokenKind::DivAssign
            | TokenKind::RemAssign => Precedence::Assign,
            TokenKind::Eq
            | TokenKind::Neq
            | TokenKind::Lt
            | TokenKind::Lte
            | TokenKind::Gt
            | TokenKind::Gte
            | TokenKind::And
            | TokenKind::Or => Precedence::Comparison,
            TokenKind::Plus | TokenKind::Minus => Precedence::AddSub,
            TokenKind::Star | TokenKind::Div | TokenKind::Rem => Precedence::MulDivMod,
            TokenKind::LShift
            | TokenKind::RShift
            | TokenKind::BitwiseAnd
            | TokenKind::BitwiseOr
            | TokenKind::BitwiseXor => Precedence::BitShift,
            _ => Precedence::Invalid,
        }
    }

    /// Checks if this is the precedence of an infix operator
    pub fn is_operator(&self) -> bool {
        !matches!(self, Precedence::Invalid | Precedence::Lowest)
    }

    /// The next tighter precedence level
    pub fn next(&self) -> Self {
        match self {
            Precedence::Lowest => Precedence::Assign,
            Precedence::Assign => Precedence::Comparison,
            Precedence::Comparison => Precedence::AddSub,
            Precedence::AddSub => Precedence::MulDivMod,
            Precedence::MulDivMod => Precedence::BitShift,
            Precedence::BitShift => Precedence::Prefix,
            Precedence::Prefix => Precedence::Call,
            Precedence::Call | Precedence::Invalid => Precedence::Invalid,
        }
    }
}

/// Which way operators of equal precedence group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Associativity {
    Left,
    Right,
}

impl Associativity {
    pub fn of(token: &TokenKind) -> Self {
        match Precedence::of(token) {
            Precedence::Assign => Associativity::Right,
            _ => Associativity::Left,
        }
    }
}

/// Checks if a token can start a prefix expression
pub fn is_prefix_operator(token: &TokenKind) -> bool {
    matches!(token, TokenKind::Minus | TokenKind::Bang | TokenKind::Tilde)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Precedence::Lowest < Precedence::Assign);
        assert!(Precedence::AddSub < Precedence::MulDivMod);
        assert!(Precedence::MulDivMod < Precedence::BitShift);
        assert!(Precedence::Call < Precedence::Invalid);
    }

    #[test]
    fn test_operator_table() {
        assert_eq!(Precedence::of(&TokenKind::Plus), Precedence::AddSub);
        assert_eq!(Precedence::of(&TokenKind::Star), Precedence::MulDivMod);
        assert_eq!(Precedence::of(&TokenKind::Eq), Precedence::Comparison);
        assert_eq!(Precedence::of(&TokenKind::SemiColon), Precedence::Invalid);
        assert!(!Precedence::of(&TokenKind::RParen).is_operator());
    }

    #[test]
    fn test_associativity() {
        assert_eq!(Associativity::of(&TokenKind::Assign), Associativity::Right);
        assert_eq!(Associativity::of(&TokenKind::PlusAssign), Associativity::Right);
        assert_eq!(Associativity::of(&TokenKind::Minus), Associativity::Left);
    }
}
