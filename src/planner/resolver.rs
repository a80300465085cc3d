use crate::planner::Slot;
use crate::sql::ast::{Expression, Node, QualifiedName, QualifiedNameReference};
use crate::sql::{NodeRewriter, RewriteResult, TreeRewriter};
use std::collections::HashMap;

/// Names visible to an expression, keyed by their full dotted name
pub type SymbolTable = HashMap<QualifiedName, Slot>;

/// Rewrites qualified name references into slot references.
///
/// Names missing from the symbol table are left untouched.
pub struct SlotResolver;

impl NodeRewriter<SymbolTable> for SlotResolver {
    fn rewrite_qualified_name_reference(
        &self,
        node: &QualifiedNameReference,
        symbols: &SymbolTable,
    ) -> Option<Node> {
        let slot = symbols.get(&node.name)?;
        log::trace!("Resolved {} to slot {}", node.name, slot);
        Some(Expression::slot(slot.clone()).into())
    }
}

/// Resolve every known name in `expression` to its slot
pub fn resolve_slots(expression: &Expression, symbols: &SymbolTable) -> RewriteResult<Expression> {
    TreeRewriter::new(&SlotResolver).rewrite_expression(expression, symbols)
}
