//! Typed views for every item kind and for the statement, expression and
//! definition families.

use super::kind::{ItemFamily, ItemKind};
use super::payload::{Annotation, DefinitionData, ItemPayload, Operator, TemplateParamSyntax};
use super::view::{ItemRef, ItemView, TypedItems};
use crate::Name;

macro_rules! define_view {
    ($(#[$doc:meta])* $view:ident, |$kind:ident| $accepts:expr) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        pub struct $view<'t>(ItemRef<'t>);

        impl<'t> ItemView<'t> for $view<'t> {
            const NAME: &'static str = stringify!($view);

            #[inline]
            fn accepts($kind: ItemKind) -> bool {
                $accepts
            }

            #[inline]
            fn wrap(item: ItemRef<'t>) -> Self {
                $view(item)
            }

            #[inline]
            fn item(self) -> ItemRef<'t> {
                self.0
            }
        }

        impl<'t> std::ops::Deref for $view<'t> {
            type Target = ItemRef<'t>;

            fn deref(&self) -> &ItemRef<'t> {
                &self.0
            }
        }
    };
}

macro_rules! kind_views {
    ($($view:ident),* $(,)?) => {
        $(define_view!($view, |kind| kind == ItemKind::$view);)*
    };
}

kind_views! {
    Block, Break, Continue, DoWhile, For, Goto, If, Switch, Return, While, Until, Yield,
    IntegerLiteral, FloatLiteral, StringLiteral, CharLiteral, BooleanLiteral, NullLiteral,
    VariableReference, MemberAccess, Call, Unary, Binary, Ternary, BlockExpression, Try, Use,
    Case, Else, Then,
    VariableDefinition, FunctionDefinition, MethodDefinition, ClassDefinition,
    InterfaceDefinition, StructureDefinition, UnionDefinition, EnumerationDefinition,
    TypeAliasDefinition,
    Import,
    TemplateParameterList, TemplateParameter, TemplateArgumentList, Specialization,
    Module,
}

define_view!(
    /// Any statement kind.
    Statement,
    |kind| kind.family() == ItemFamily::Statement
);
define_view!(
    /// Any expression kind.
    Expression,
    |kind| kind.family() == ItemFamily::Expression
);
define_view!(
    /// Any definition kind; the only items that carry annotations.
    Definition,
    |kind| kind.family() == ItemFamily::Definition
);
define_view!(
    /// Any literal expression.
    Literal,
    |kind| matches!(
        kind,
        ItemKind::IntegerLiteral
            | ItemKind::FloatLiteral
            | ItemKind::StringLiteral
            | ItemKind::CharLiteral
            | ItemKind::BooleanLiteral
            | ItemKind::NullLiteral
    )
);
define_view!(
    /// Any loop statement.
    Loop,
    |kind| kind.is_loop()
);

fn payload_name(item: ItemRef<'_>) -> Name {
    match item.payload() {
        ItemPayload::Name(name) | ItemPayload::Literal(name) => *name,
        _ => Name::EMPTY,
    }
}

fn definition_data<'t>(item: ItemRef<'t>) -> &'t DefinitionData {
    static EMPTY: DefinitionData = DefinitionData {
        name: Name::EMPTY,
        type_name: None,
        bases: Vec::new(),
        annotations: Vec::new(),
    };
    match item.payload() {
        ItemPayload::Definition(data) => data,
        _ => &EMPTY,
    }
}

fn operator_of(item: ItemRef<'_>) -> Operator {
    match item.payload() {
        ItemPayload::Operator(op) => *op,
        // Payload shape is checked on push.
        other => panic!("operator item without operator payload: {other:?}"),
    }
}

impl<'t> Statement<'t> {
    pub fn kind(self) -> ItemKind {
        self.0.kind()
    }
}

impl<'t> Expression<'t> {
    pub fn kind(self) -> ItemKind {
        self.0.kind()
    }
}

impl<'t> Literal<'t> {
    /// Literal text; `None` for boolean and null literals.
    pub fn text(self) -> Option<Name> {
        match self.0.payload() {
            ItemPayload::Literal(name) => Some(*name),
            _ => None,
        }
    }
}

impl<'t> Definition<'t> {
    pub fn name(self) -> Name {
        definition_data(self.0).name
    }

    pub fn type_name(self) -> Option<Name> {
        definition_data(self.0).type_name
    }

    pub fn bases(self) -> &'t [Name] {
        &definition_data(self.0).bases
    }

    pub fn annotations(self) -> &'t [Annotation] {
        &definition_data(self.0).annotations
    }

    pub fn doc_comments(self) -> impl Iterator<Item = Name> + 't {
        self.annotations().iter().filter_map(|a| match a {
            Annotation::DocComment(text) => Some(*text),
            Annotation::Attribute(_) => None,
        })
    }

    pub fn has_attribute(self, attribute: Name) -> bool {
        self.annotations().contains(&Annotation::Attribute(attribute))
    }

    pub fn template_parameters(self) -> Option<TemplateParameterList<'t>> {
        self.0.items::<TemplateParameterList<'t>>().next()
    }

    pub fn is_template(self) -> bool {
        self.template_parameters().is_some()
    }
}

macro_rules! definition_accessors {
    ($($view:ident),*) => {
        $(
            impl<'t> $view<'t> {
                pub fn definition(self) -> Definition<'t> {
                    Definition(self.0)
                }

                pub fn name(self) -> Name {
                    definition_data(self.0).name
                }
            }
        )*
    };
}

definition_accessors!(
    VariableDefinition,
    FunctionDefinition,
    MethodDefinition,
    ClassDefinition,
    InterfaceDefinition,
    StructureDefinition,
    UnionDefinition,
    EnumerationDefinition,
    TypeAliasDefinition
);

impl<'t> If<'t> {
    pub fn condition(self) -> Option<Expression<'t>> {
        self.0.child(0).and_then(|c| c.try_cast().ok())
    }

    pub fn then_branch(self) -> Option<ItemRef<'t>> {
        self.0.child(1)
    }

    pub fn else_branch(self) -> Option<ItemRef<'t>> {
        self.0.child(2)
    }
}

impl<'t> Ternary<'t> {
    pub fn condition(self) -> Option<ItemRef<'t>> {
        self.0.child(0)
    }

    pub fn then_value(self) -> Option<ItemRef<'t>> {
        self.0.child(1)
    }

    pub fn else_value(self) -> Option<ItemRef<'t>> {
        self.0.child(2)
    }
}

impl<'t> For<'t> {
    pub fn init(self) -> Option<ItemRef<'t>> {
        self.0.child(0)
    }

    pub fn condition(self) -> Option<ItemRef<'t>> {
        self.0.child(1)
    }

    pub fn step(self) -> Option<ItemRef<'t>> {
        self.0.child(2)
    }

    pub fn body(self) -> Option<ItemRef<'t>> {
        self.0.child(3)
    }
}

macro_rules! conditional_loop {
    ($($view:ident),*) => {
        $(
            impl<'t> $view<'t> {
                pub fn condition(self) -> Option<ItemRef<'t>> {
                    self.0.child(0)
                }

                pub fn body(self) -> Option<ItemRef<'t>> {
                    self.0.child(1)
                }
            }
        )*
    };
}

conditional_loop!(While, Until);

impl<'t> DoWhile<'t> {
    pub fn body(self) -> Option<ItemRef<'t>> {
        self.0.child(0)
    }

    pub fn condition(self) -> Option<ItemRef<'t>> {
        self.0.child(1)
    }
}

impl<'t> Switch<'t> {
    pub fn scrutinee(self) -> Option<ItemRef<'t>> {
        self.0.child(0)
    }

    pub fn cases(self) -> TypedItems<'t, Case<'t>> {
        self.0.items()
    }

    pub fn default_case(self) -> Option<Else<'t>> {
        self.0.items::<Else<'t>>().next()
    }
}

impl<'t> Case<'t> {
    pub fn value(self) -> Option<ItemRef<'t>> {
        self.0.child(0)
    }

    pub fn body(self) -> Option<ItemRef<'t>> {
        self.0.child(1)
    }
}

macro_rules! single_body {
    ($($view:ident),*) => {
        $(
            impl<'t> $view<'t> {
                pub fn body(self) -> Option<ItemRef<'t>> {
                    self.0.child(0)
                }
            }
        )*
    };
}

single_body!(Then, Else);

macro_rules! optional_value {
    ($($view:ident),*) => {
        $(
            impl<'t> $view<'t> {
                pub fn value(self) -> Option<ItemRef<'t>> {
                    self.0.child(0)
                }
            }
        )*
    };
}

optional_value!(Return, Yield);

impl<'t> Goto<'t> {
    pub fn label(self) -> Name {
        payload_name(self.0)
    }
}

impl<'t> Block<'t> {
    pub fn statements(self) -> impl Iterator<Item = ItemRef<'t>> {
        self.0.children()
    }
}

impl<'t> BlockExpression<'t> {
    pub fn statements(self) -> impl Iterator<Item = ItemRef<'t>> {
        let count = self.0.child_count().saturating_sub(1);
        self.0.children().take(count)
    }

    pub fn value(self) -> Option<ItemRef<'t>> {
        self.0.children().next_back()
    }
}

impl<'t> Try<'t> {
    pub fn body(self) -> Option<ItemRef<'t>> {
        self.0.child(0)
    }

    pub fn handler(self) -> Option<ItemRef<'t>> {
        self.0.child(1)
    }
}

impl<'t> Use<'t> {
    pub fn resource(self) -> Option<ItemRef<'t>> {
        self.0.child(0)
    }

    pub fn body(self) -> Option<ItemRef<'t>> {
        self.0.child(1)
    }
}

macro_rules! literal_text {
    ($($view:ident),*) => {
        $(
            impl<'t> $view<'t> {
                pub fn text(self) -> Name {
                    payload_name(self.0)
                }
            }
        )*
    };
}

literal_text!(IntegerLiteral, FloatLiteral, StringLiteral, CharLiteral);

impl<'t> BooleanLiteral<'t> {
    pub fn value(self) -> bool {
        matches!(self.0.payload(), ItemPayload::Bool(true))
    }
}

impl<'t> VariableReference<'t> {
    pub fn name(self) -> Name {
        payload_name(self.0)
    }
}

impl<'t> MemberAccess<'t> {
    pub fn object(self) -> Option<ItemRef<'t>> {
        self.0.child(0)
    }

    pub fn member(self) -> Name {
        payload_name(self.0)
    }
}

impl<'t> Call<'t> {
    pub fn callee(self) -> Option<ItemRef<'t>> {
        self.0.child(0)
    }

    pub fn arguments(self) -> impl ExactSizeIterator<Item = ItemRef<'t>> {
        self.0.children().skip(1)
    }

    pub fn is_method(self) -> bool {
        matches!(self.0.payload(), ItemPayload::Call { is_method: true })
    }

    /// Receiver of a method call.
    pub fn receiver(self) -> Option<ItemRef<'t>> {
        if !self.is_method() {
            return None;
        }
        self.callee()
            .and_then(|c| c.try_cast::<MemberAccess<'t>>().ok())
            .and_then(MemberAccess::object)
    }
}

impl<'t> Unary<'t> {
    pub fn operator(self) -> Operator {
        operator_of(self.0)
    }

    pub fn operand(self) -> Option<ItemRef<'t>> {
        self.0.child(0)
    }
}

impl<'t> Binary<'t> {
    pub fn operator(self) -> Operator {
        operator_of(self.0)
    }

    pub fn lhs(self) -> Option<ItemRef<'t>> {
        self.0.child(0)
    }

    pub fn rhs(self) -> Option<ItemRef<'t>> {
        self.0.child(1)
    }
}

impl<'t> VariableDefinition<'t> {
    pub fn type_name(self) -> Option<Name> {
        definition_data(self.0).type_name
    }

    pub fn initializer(self) -> Option<ItemRef<'t>> {
        self.0.children().find(|c| c.is::<Expression<'t>>())
    }
}

macro_rules! callable_accessors {
    ($($view:ident),*) => {
        $(
            impl<'t> $view<'t> {
                pub fn parameters(self) -> TypedItems<'t, VariableDefinition<'t>> {
                    self.0.items()
                }

                pub fn return_type(self) -> Option<Name> {
                    definition_data(self.0).type_name
                }

                pub fn body(self) -> Option<Block<'t>> {
                    self.0.items::<Block<'t>>().next_back()
                }
            }
        )*
    };
}

callable_accessors!(FunctionDefinition, MethodDefinition);

impl<'t> ClassDefinition<'t> {
    /// First listed base, by convention the base class.
    pub fn base(self) -> Option<Name> {
        definition_data(self.0).bases.first().copied()
    }

    pub fn interfaces(self) -> &'t [Name] {
        definition_data(self.0).bases.get(1..).unwrap_or(&[])
    }

    pub fn fields(self) -> TypedItems<'t, VariableDefinition<'t>> {
        self.0.items()
    }

    pub fn methods(self) -> TypedItems<'t, MethodDefinition<'t>> {
        self.0.items()
    }
}

impl<'t> InterfaceDefinition<'t> {
    pub fn bases(self) -> &'t [Name] {
        &definition_data(self.0).bases
    }

    pub fn methods(self) -> TypedItems<'t, MethodDefinition<'t>> {
        self.0.items()
    }
}

macro_rules! record_accessors {
    ($($view:ident),*) => {
        $(
            impl<'t> $view<'t> {
                pub fn fields(self) -> TypedItems<'t, VariableDefinition<'t>> {
                    self.0.items()
                }
            }
        )*
    };
}

record_accessors!(StructureDefinition, UnionDefinition);

impl<'t> EnumerationDefinition<'t> {
    /// Constants in declaration order.
    pub fn constants(self) -> TypedItems<'t, VariableDefinition<'t>> {
        self.0.items()
    }

    pub fn index_type(self) -> Option<Name> {
        definition_data(self.0).type_name
    }
}

impl<'t> TypeAliasDefinition<'t> {
    pub fn target(self) -> Option<Name> {
        definition_data(self.0).type_name
    }
}

impl<'t> Import<'t> {
    pub fn path(self) -> Name {
        match self.0.payload() {
            ItemPayload::Import { path, .. } => *path,
            _ => Name::EMPTY,
        }
    }

    pub fn alias(self) -> Option<Name> {
        match self.0.payload() {
            ItemPayload::Import { alias, .. } => *alias,
            _ => None,
        }
    }
}

impl<'t> TemplateParameterList<'t> {
    pub fn parameters(self) -> TypedItems<'t, TemplateParameter<'t>> {
        self.0.items()
    }
}

impl<'t> TemplateParameter<'t> {
    pub fn name(self) -> Name {
        match self.0.payload() {
            ItemPayload::TemplateParameter { name, .. } => *name,
            _ => Name::EMPTY,
        }
    }

    pub fn syntax(self) -> TemplateParamSyntax {
        match self.0.payload() {
            ItemPayload::TemplateParameter { kind, .. } => *kind,
            _ => TemplateParamSyntax::Type,
        }
    }

    pub fn default_value(self) -> Option<ItemRef<'t>> {
        self.0.child(0)
    }
}

impl<'t> TemplateArgumentList<'t> {
    pub fn arguments(self) -> impl ExactSizeIterator<Item = ItemRef<'t>> {
        self.0.children()
    }
}

impl<'t> Specialization<'t> {
    pub fn template_name(self) -> Name {
        payload_name(self.0)
    }

    pub fn arguments(self) -> Option<TemplateArgumentList<'t>> {
        self.0.items::<TemplateArgumentList<'t>>().next()
    }
}

impl<'t> Module<'t> {
    pub fn name(self) -> Name {
        match self.0.payload() {
            ItemPayload::Module { name } => *name,
            _ => Name::EMPTY,
        }
    }

    pub fn top_level(self) -> impl Iterator<Item = ItemRef<'t>> {
        self.0.children()
    }

    pub fn definitions(self) -> TypedItems<'t, Definition<'t>> {
        self.0.items()
    }

    pub fn imports(self) -> TypedItems<'t, Import<'t>> {
        self.0.items()
    }
}
