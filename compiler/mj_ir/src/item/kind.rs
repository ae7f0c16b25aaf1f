//! The closed set of item kinds and their child-role conventions.

use std::fmt;

/// Broad grouping used by the family views.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ItemFamily {
    Statement,
    Expression,
    Definition,
    Directive,
    Template,
    Root,
}

/// Payload variant a kind requires.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PayloadShape {
    None,
    Name,
    Literal,
    Bool,
    Call,
    Operator,
    Definition,
    Import,
    TemplateParameter,
    Module,
}

macro_rules! item_kinds {
    ($($(#[$doc:meta])* $variant:ident = $byte:literal, $family:ident, $shape:ident;)*) => {
        /// Kind tag of an [`Item`](super::ItemRef), fixed at construction.
        ///
        /// The discriminant is also the kind byte of an
        /// [`ItemLocator`](crate::ItemLocator). Child roles are listed per
        /// variant; `?` marks an optional trailing child.
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
        #[repr(u8)]
        pub enum ItemKind {
            $($(#[$doc])* $variant = $byte,)*
        }

        impl ItemKind {
            pub const ALL: &'static [ItemKind] = &[$(ItemKind::$variant,)*];

            #[inline]
            pub const fn from_byte(byte: u8) -> Option<ItemKind> {
                match byte {
                    $($byte => Some(ItemKind::$variant),)*
                    _ => None,
                }
            }

            #[inline]
            pub const fn family(self) -> ItemFamily {
                match self {
                    $(ItemKind::$variant => ItemFamily::$family,)*
                }
            }

            #[inline]
            pub const fn payload_shape(self) -> PayloadShape {
                match self {
                    $(ItemKind::$variant => PayloadShape::$shape,)*
                }
            }

            pub const fn name(self) -> &'static str {
                match self {
                    $(ItemKind::$variant => stringify!($variant),)*
                }
            }
        }
    };
}

item_kinds! {
    // Statements
    /// `[statements...]`
    Block = 1, Statement, None;
    /// `[]`
    Break = 2, Statement, None;
    /// `[]`
    Continue = 3, Statement, None;
    /// `[body, condition]`
    DoWhile = 4, Statement, None;
    /// `[init, condition, step, body]`
    For = 5, Statement, None;
    /// `[]`; payload is the target label.
    Goto = 6, Statement, Name;
    /// `[condition, then, else?]`
    If = 7, Statement, None;
    /// `[scrutinee, Case..., Else?]`
    Switch = 8, Statement, None;
    /// `[value?]`
    Return = 9, Statement, None;
    /// `[condition, body]`
    While = 10, Statement, None;
    /// `[condition, body]`; loops until the condition holds.
    Until = 11, Statement, None;
    /// `[value?]`
    Yield = 12, Statement, None;

    // Expressions
    /// `[]`; payload is the literal text.
    IntegerLiteral = 32, Expression, Literal;
    /// `[]`; payload is the literal text.
    FloatLiteral = 33, Expression, Literal;
    /// `[]`; payload is the literal text.
    StringLiteral = 34, Expression, Literal;
    /// `[]`; payload is the literal text.
    CharLiteral = 35, Expression, Literal;
    /// `[]`
    BooleanLiteral = 36, Expression, Bool;
    /// `[]`
    NullLiteral = 37, Expression, None;
    /// `[]`; payload is the referenced name.
    VariableReference = 38, Expression, Name;
    /// `[object]`; payload is the member name.
    MemberAccess = 39, Expression, Name;
    /// `[callee, args...]`; a method call's callee is a `MemberAccess`.
    Call = 40, Expression, Call;
    /// `[operand]`
    Unary = 41, Expression, Operator;
    /// `[lhs, rhs]`
    Binary = 42, Expression, Operator;
    /// `[condition, then, else]`
    Ternary = 43, Expression, None;
    /// `[statements..., value]`
    BlockExpression = 44, Expression, None;
    /// `[body, handler?]`
    Try = 45, Expression, None;
    /// `[resource, body]`
    Use = 46, Expression, None;
    /// `[value, body]`
    Case = 47, Expression, None;
    /// `[body]`
    Else = 48, Expression, None;
    /// `[body]`
    Then = 49, Expression, None;

    // Definitions
    /// `[initializer?]`
    VariableDefinition = 64, Definition, Definition;
    /// `[TemplateParameterList?, parameters..., body?]`
    FunctionDefinition = 65, Definition, Definition;
    /// `[TemplateParameterList?, parameters..., body?]`
    MethodDefinition = 66, Definition, Definition;
    /// `[TemplateParameterList?, members...]`
    ClassDefinition = 67, Definition, Definition;
    /// `[TemplateParameterList?, methods...]`
    InterfaceDefinition = 68, Definition, Definition;
    /// `[TemplateParameterList?, fields...]`
    StructureDefinition = 69, Definition, Definition;
    /// `[TemplateParameterList?, fields...]`
    UnionDefinition = 70, Definition, Definition;
    /// `[constants...]`; each constant is a `VariableDefinition`.
    EnumerationDefinition = 71, Definition, Definition;
    /// `[TemplateParameterList?]`; the target is the payload's type name.
    TypeAliasDefinition = 72, Definition, Definition;

    // Directives
    /// `[]`
    Import = 96, Directive, Import;

    // Template constructs
    /// `[TemplateParameter...]`
    TemplateParameterList = 112, Template, None;
    /// `[default?]`
    TemplateParameter = 113, Template, TemplateParameter;
    /// `[arguments...]`
    TemplateArgumentList = 114, Template, None;
    /// `[TemplateArgumentList]`; payload is the template name.
    Specialization = 115, Template, Name;

    /// `[items...]`
    Module = 127, Root, Module;
}

impl ItemKind {
    #[inline]
    pub const fn is_statement(self) -> bool {
        matches!(self.family(), ItemFamily::Statement)
    }

    #[inline]
    pub const fn is_expression(self) -> bool {
        matches!(self.family(), ItemFamily::Expression)
    }

    #[inline]
    pub const fn is_definition(self) -> bool {
        matches!(self.family(), ItemFamily::Definition)
    }

    #[inline]
    pub const fn is_loop(self) -> bool {
        matches!(
            self,
            ItemKind::For | ItemKind::While | ItemKind::DoWhile | ItemKind::Until
        )
    }
}

impl fmt::Debug for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
