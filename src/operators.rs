//! Operator overloads exposed through `@OPERATOR`.
//!
//! The symbol in the directive is mapped to a mangled suffix that becomes part
//! of the C symbol (`Class_operator$index`). Every suffix starts with `$`,
//! which cannot appear in an `@FUNCTION` name, so overloads never collide with
//! ordinary methods.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperatorSymbol {
    Index,
    Equals,
    NotEquals,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
    RotateLeft,
    LogicalAnd,
    LogicalOr,
    LogicalXor,
    LogicalNot,
    BitNot,
}

impl OperatorSymbol {
    pub const ALL: [OperatorSymbol; 23] = [
        OperatorSymbol::Index,
        OperatorSymbol::Equals,
        OperatorSymbol::NotEquals,
        OperatorSymbol::LessThan,
        OperatorSymbol::LessThanEqual,
        OperatorSymbol::GreaterThan,
        OperatorSymbol::GreaterThanEqual,
        OperatorSymbol::Add,
        OperatorSymbol::Subtract,
        OperatorSymbol::Multiply,
        OperatorSymbol::Divide,
        OperatorSymbol::Modulo,
        OperatorSymbol::BitAnd,
        OperatorSymbol::BitOr,
        OperatorSymbol::BitXor,
        OperatorSymbol::ShiftLeft,
        OperatorSymbol::ShiftRight,
        OperatorSymbol::RotateLeft,
        OperatorSymbol::LogicalAnd,
        OperatorSymbol::LogicalOr,
        OperatorSymbol::LogicalXor,
        OperatorSymbol::LogicalNot,
        OperatorSymbol::BitNot,
    ];

    pub fn parse(symbol: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.symbol() == symbol)
    }

    /// Spelling used in the directive and in the runtime's lookup name.
    pub fn symbol(self) -> &'static str {
        match self {
            OperatorSymbol::Index => "[]",
            OperatorSymbol::Equals => "==",
            OperatorSymbol::NotEquals => "!=",
            OperatorSymbol::LessThan => "<",
            OperatorSymbol::LessThanEqual => "<=",
            OperatorSymbol::GreaterThan => ">",
            OperatorSymbol::GreaterThanEqual => ">=",
            OperatorSymbol::Add => "+",
            OperatorSymbol::Subtract => "-",
            OperatorSymbol::Multiply => "*",
            OperatorSymbol::Divide => "/",
            OperatorSymbol::Modulo => "%",
            OperatorSymbol::BitAnd => "&",
            OperatorSymbol::BitOr => "|",
            OperatorSymbol::BitXor => "^",
            OperatorSymbol::ShiftLeft => "<<",
            OperatorSymbol::ShiftRight => ">>",
            OperatorSymbol::RotateLeft => "<<<",
            OperatorSymbol::LogicalAnd => "&&",
            OperatorSymbol::LogicalOr => "||",
            OperatorSymbol::LogicalXor => "^^",
            OperatorSymbol::LogicalNot => "!",
            OperatorSymbol::BitNot => "~",
        }
    }

    pub fn mangled(self) -> &'static str {
        match self {
            OperatorSymbol::Index => "$index",
            OperatorSymbol::Equals => "$eq",
            OperatorSymbol::NotEquals => "$ne",
            OperatorSymbol::LessThan => "$lt",
            OperatorSymbol::LessThanEqual => "$le",
            OperatorSymbol::GreaterThan => "$gt",
            OperatorSymbol::GreaterThanEqual => "$ge",
            OperatorSymbol::Add => "$add",
            OperatorSymbol::Subtract => "$sub",
            OperatorSymbol::Multiply => "$mul",
            OperatorSymbol::Divide => "$div",
            OperatorSymbol::Modulo => "$mod",
            OperatorSymbol::BitAnd => "$band",
            OperatorSymbol::BitOr => "$bor",
            OperatorSymbol::BitXor => "$bxor",
            OperatorSymbol::ShiftLeft => "$shl",
            OperatorSymbol::ShiftRight => "$shr",
            OperatorSymbol::RotateLeft => "$rol",
            OperatorSymbol::LogicalAnd => "$land",
            OperatorSymbol::LogicalOr => "$lor",
            OperatorSymbol::LogicalXor => "$lxor",
            OperatorSymbol::LogicalNot => "$lnot",
            OperatorSymbol::BitNot => "$bnot",
        }
    }

    /// Name the runtime resolves the overload by, e.g. `operator []`.
    pub fn display_name(self) -> String {
        format!("operator {}", self.symbol())
    }
}
