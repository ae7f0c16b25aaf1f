//! Kind-specific data carried by an item.

use super::kind::PayloadShape;
use crate::token::TokenKind;
use crate::Name;

/// Unary and binary operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Operator {
    // Unary
    Neg,
    Not,
    BitNot,
    Deref,
    AddressOf,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,

    // Binary
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    And,
    Or,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Assignment
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    RemAssign,
    BitAndAssign,
    BitOrAssign,
    BitXorAssign,
    ShlAssign,
    ShrAssign,
}

impl Operator {
    /// Whether evaluating the operator writes to its operand.
    pub const fn is_mutating(self) -> bool {
        matches!(
            self,
            Operator::PreIncrement
                | Operator::PreDecrement
                | Operator::PostIncrement
                | Operator::PostDecrement
                | Operator::Assign
                | Operator::AddAssign
                | Operator::SubAssign
                | Operator::MulAssign
                | Operator::DivAssign
                | Operator::RemAssign
                | Operator::BitAndAssign
                | Operator::BitOrAssign
                | Operator::BitXorAssign
                | Operator::ShlAssign
                | Operator::ShrAssign
        )
    }

    pub const fn is_unary(self) -> bool {
        matches!(
            self,
            Operator::Neg
                | Operator::Not
                | Operator::BitNot
                | Operator::Deref
                | Operator::AddressOf
                | Operator::PreIncrement
                | Operator::PreDecrement
                | Operator::PostIncrement
                | Operator::PostDecrement
        )
    }

    /// Operator spelled by a binary-position token.
    pub const fn binary_from_token(kind: TokenKind) -> Option<Operator> {
        Some(match kind {
            TokenKind::Plus => Operator::Add,
            TokenKind::Minus => Operator::Sub,
            TokenKind::Star => Operator::Mul,
            TokenKind::Slash => Operator::Div,
            TokenKind::Percent => Operator::Rem,
            TokenKind::Amp => Operator::BitAnd,
            TokenKind::Pipe => Operator::BitOr,
            TokenKind::Caret => Operator::BitXor,
            TokenKind::Shl => Operator::Shl,
            TokenKind::Shr => Operator::Shr,
            TokenKind::AndAnd => Operator::And,
            TokenKind::OrOr => Operator::Or,
            TokenKind::EqEq => Operator::Eq,
            TokenKind::NotEq => Operator::NotEq,
            TokenKind::Lt => Operator::Lt,
            TokenKind::LtEq => Operator::LtEq,
            TokenKind::Gt => Operator::Gt,
            TokenKind::GtEq => Operator::GtEq,
            TokenKind::Assign => Operator::Assign,
            TokenKind::PlusAssign => Operator::AddAssign,
            TokenKind::MinusAssign => Operator::SubAssign,
            TokenKind::StarAssign => Operator::MulAssign,
            TokenKind::SlashAssign => Operator::DivAssign,
            TokenKind::PercentAssign => Operator::RemAssign,
            TokenKind::AmpAssign => Operator::BitAndAssign,
            TokenKind::PipeAssign => Operator::BitOrAssign,
            TokenKind::CaretAssign => Operator::BitXorAssign,
            TokenKind::ShlAssign => Operator::ShlAssign,
            TokenKind::ShrAssign => Operator::ShrAssign,
            _ => return None,
        })
    }

    /// Operator spelled by a prefix-position token.
    pub const fn prefix_from_token(kind: TokenKind) -> Option<Operator> {
        Some(match kind {
            TokenKind::Minus => Operator::Neg,
            TokenKind::Bang => Operator::Not,
            TokenKind::Tilde => Operator::BitNot,
            TokenKind::Star => Operator::Deref,
            TokenKind::Amp => Operator::AddressOf,
            TokenKind::PlusPlus => Operator::PreIncrement,
            TokenKind::MinusMinus => Operator::PreDecrement,
            _ => return None,
        })
    }
}

/// Documentation or attribute text attached to a definition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Annotation {
    DocComment(Name),
    Attribute(Name),
}

/// Header shared by every definition kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct DefinitionData {
    pub name: Name,
    /// Declared type of a variable, target of an alias, return type of a
    /// function, or index type of an enumeration.
    pub type_name: Option<Name>,
    /// Base class then interfaces for classes; base interfaces otherwise.
    pub bases: Vec<Name>,
    pub annotations: Vec<Annotation>,
}

impl DefinitionData {
    pub fn named(name: Name) -> Self {
        DefinitionData {
            name,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_type(mut self, type_name: Name) -> Self {
        self.type_name = Some(type_name);
        self
    }

    #[must_use]
    pub fn with_bases(mut self, bases: impl IntoIterator<Item = Name>) -> Self {
        self.bases.extend(bases);
        self
    }
}

/// Syntactic kind of a template parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum TemplateParamSyntax {
    Type,
    /// A value parameter with the named type.
    Variable(Name),
    /// A template-template parameter taking `arity` arguments.
    Template(u8),
}

/// Kind-specific payload. Which variant a kind takes is fixed by
/// [`ItemKind::payload_shape`](super::ItemKind::payload_shape).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemPayload {
    #[default]
    None,
    Name(Name),
    Literal(Name),
    Bool(bool),
    Call {
        is_method: bool,
    },
    Operator(Operator),
    Definition(Box<DefinitionData>),
    Import {
        path: Name,
        alias: Option<Name>,
    },
    TemplateParameter {
        name: Name,
        kind: TemplateParamSyntax,
    },
    Module {
        name: Name,
    },
}

impl ItemPayload {
    pub fn definition(data: DefinitionData) -> Self {
        ItemPayload::Definition(Box::new(data))
    }

    pub const fn shape(&self) -> PayloadShape {
        match self {
            ItemPayload::None => PayloadShape::None,
            ItemPayload::Name(_) => PayloadShape::Name,
            ItemPayload::Literal(_) => PayloadShape::Literal,
            ItemPayload::Bool(_) => PayloadShape::Bool,
            ItemPayload::Call { .. } => PayloadShape::Call,
            ItemPayload::Operator(_) => PayloadShape::Operator,
            ItemPayload::Definition(_) => PayloadShape::Definition,
            ItemPayload::Import { .. } => PayloadShape::Import,
            ItemPayload::TemplateParameter { .. } => PayloadShape::TemplateParameter,
            ItemPayload::Module { .. } => PayloadShape::Module,
        }
    }
}
