//! One-time determinism pass run when a tree is sealed.
//!
//! An item is deterministic when evaluating it twice in the same state yields
//! the same result without side effects. Children are allocated before their
//! parents, so a single forward pass over the arena sees every child's verdict
//! before the parent needs it.

use super::kind::ItemKind;
use super::payload::ItemPayload;
use super::tree::{ItemId, ItemTree};

pub(super) fn compute_determinism(tree: &ItemTree) -> Vec<bool> {
    let mut memo = Vec::with_capacity(tree.len());
    for index in 0..tree.len() {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "node count was checked against u32 on push"
        )]
        let id = ItemId::new(index as u32);
        let verdict = judge(tree, id, &memo);
        memo.push(verdict);
    }
    memo
}

fn judge(tree: &ItemTree, id: ItemId, memo: &[bool]) -> bool {
    let children = tree.children_of(id);
    let all = |ids: &[ItemId]| ids.iter().all(|c| memo[c.index()]);

    match tree.kind_of(id) {
        ItemKind::For
        | ItemKind::While
        | ItemKind::DoWhile
        | ItemKind::Until
        | ItemKind::Break
        | ItemKind::Continue
        | ItemKind::Goto
        | ItemKind::Yield
        | ItemKind::Try
        | ItemKind::Use => false,

        ItemKind::IntegerLiteral
        | ItemKind::FloatLiteral
        | ItemKind::StringLiteral
        | ItemKind::CharLiteral
        | ItemKind::BooleanLiteral
        | ItemKind::NullLiteral
        | ItemKind::VariableReference
        | ItemKind::Import
        | ItemKind::TemplateParameterList
        | ItemKind::TemplateParameter
        | ItemKind::TemplateArgumentList
        | ItemKind::Specialization
        | ItemKind::FunctionDefinition
        | ItemKind::MethodDefinition
        | ItemKind::ClassDefinition
        | ItemKind::InterfaceDefinition
        | ItemKind::StructureDefinition
        | ItemKind::UnionDefinition
        | ItemKind::EnumerationDefinition
        | ItemKind::TypeAliasDefinition => true,

        ItemKind::Call => {
            let is_method = matches!(tree.payload_of(id), ItemPayload::Call { is_method: true });
            // Callee first, then arguments.
            !is_method && all(children.get(1..).unwrap_or(&[]))
        }

        ItemKind::Unary | ItemKind::Binary => {
            let mutates = match tree.payload_of(id) {
                ItemPayload::Operator(op) => op.is_mutating(),
                _ => false,
            };
            !mutates && all(children)
        }

        ItemKind::VariableDefinition
        | ItemKind::Return
        | ItemKind::If
        | ItemKind::Ternary
        | ItemKind::Block
        | ItemKind::BlockExpression
        | ItemKind::Module
        | ItemKind::Switch
        | ItemKind::Case
        | ItemKind::Then
        | ItemKind::Else
        | ItemKind::MemberAccess => all(children),
    }
}
