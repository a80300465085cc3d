//! Double-dispatch visitor over the closed node set.
//!
//! `process` resolves the handler for the node's concrete variant. Every
//! handler has a default that forwards to its category handler, so a
//! visitor only overrides the variants it cares about:
//!
//! ```text
//! visit_long_literal ─┐
//! visit_string_literal┼─> visit_literal ─> visit_expression ─┐
//! visit_arithmetic ───────────────────────> visit_expression ├─> visit_node
//! visit_query ─────────> visit_statement ────────────────────┤
//! visit_table ─────────> visit_relation ─────────────────────┤
//! visit_select ──────────────────────────────────────────────┘
//! ```
//!
//! The default `visit_node` fails with [`UnhandledNode`].

use crate::sql::ast::*;
use crate::sql::node::{NodeKind, NodeRef};
use thiserror::Error;

/// Raised by the root handler when no override handled a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Unhandled node kind: {kind}")]
pub struct UnhandledNode {
    pub kind: NodeKind,
}

pub trait AstVisitor<C: ?Sized> {
    type Output;
    type Error: From<UnhandledNode>;

    /// Dispatch to the most specific handler for `node`
    fn process(&self, node: NodeRef<'_>, context: &C) -> Result<Self::Output, Self::Error> {
        match node {
            NodeRef::Query(n) => self.visit_query(n, context),
            NodeRef::Select(n) => self.visit_select(n, context),
            NodeRef::Table(n) => self.visit_table(n, context),
            NodeRef::AliasedRelation(n) => self.visit_aliased_relation(n, context),
            NodeRef::Subquery(n) => self.visit_subquery(n, context),
            NodeRef::LongLiteral(n) => self.visit_long_literal(n, context),
            NodeRef::DoubleLiteral(n) => self.visit_double_literal(n, context),
            NodeRef::StringLiteral(n) => self.visit_string_literal(n, context),
            NodeRef::NullLiteral(n) => self.visit_null_literal(n, context),
            NodeRef::QualifiedNameReference(n) => {
                self.visit_qualified_name_reference(n, context)
            }
            NodeRef::SlotReference(n) => self.visit_slot_reference(n, context),
            NodeRef::ArithmeticExpression(n) => self.visit_arithmetic_expression(n, context),
            NodeRef::ComparisonExpression(n) => self.visit_comparison_expression(n, context),
            NodeRef::LogicalBinaryExpression(n) => {
                self.visit_logical_binary_expression(n, context)
            }
            NodeRef::NotExpression(n) => self.visit_not_expression(n, context),
            NodeRef::IsNullPredicate(n) => self.visit_is_null_predicate(n, context),
            NodeRef::IsNotNullPredicate(n) => self.visit_is_not_null_predicate(n, context),
            NodeRef::NullIfExpression(n) => self.visit_null_if_expression(n, context),
            NodeRef::CoalesceExpression(n) => self.visit_coalesce_expression(n, context),
            NodeRef::FunctionCall(n) => self.visit_function_call(n, context),
            NodeRef::LikePredicate(n) => self.visit_like_predicate(n, context),
            NodeRef::InPredicate(n) => self.visit_in_predicate(n, context),
            NodeRef::SubqueryExpression(n) => self.visit_subquery_expression(n, context),
            NodeRef::AllColumns(n) => self.visit_all_columns(n, context),
            NodeRef::AliasedExpression(n) => self.visit_aliased_expression(n, context),
        }
    }

    fn process_expression(
        &self,
        expression: &Expression,
        context: &C,
    ) -> Result<Self::Output, Self::Error> {
        self.process(expression.as_node_ref(), context)
    }

    // Category handlers

    fn visit_node(&self, node: NodeRef<'_>, _context: &C) -> Result<Self::Output, Self::Error> {
        Err(UnhandledNode { kind: node.kind() }.into())
    }

    fn visit_statement(
        &self,
        node: NodeRef<'_>,
        context: &C,
    ) -> Result<Self::Output, Self::Error> {
        self.visit_node(node, context)
    }

    fn visit_relation(&self, node: NodeRef<'_>, context: &C) -> Result<Self::Output, Self::Error> {
        self.visit_node(node, context)
    }

    fn visit_expression(
        &self,
        node: NodeRef<'_>,
        context: &C,
    ) -> Result<Self::Output, Self::Error> {
        self.visit_node(node, context)
    }

    fn visit_literal(&self, node: NodeRef<'_>, context: &C) -> Result<Self::Output, Self::Error> {
        self.visit_expression(node, context)
    }

    // Statements and relations

    fn visit_query(&self, node: &Query, context: &C) -> Result<Self::Output, Self::Error> {
        self.visit_statement(NodeRef::Query(node), context)
    }

    fn visit_select(&self, node: &Select, context: &C) -> Result<Self::Output, Self::Error> {
        self.visit_node(NodeRef::Select(node), context)
    }

    fn visit_table(&self, node: &Table, context: &C) -> Result<Self::Output, Self::Error> {
        self.visit_relation(NodeRef::Table(node), context)
    }

    fn visit_aliased_relation(
        &self,
        node: &AliasedRelation,
        context: &C,
    ) -> Result<Self::Output, Self::Error> {
        self.visit_relation(NodeRef::AliasedRelation(node), context)
    }

    fn visit_subquery(&self, node: &Subquery, context: &C) -> Result<Self::Output, Self::Error> {
        self.visit_relation(NodeRef::Subquery(node), context)
    }

    // Literals

    fn visit_long_literal(
        &self,
        node: &LongLiteral,
        context: &C,
    ) -> Result<Self::Output, Self::Error> {
        self.visit_literal(NodeRef::LongLiteral(node), context)
    }

    fn visit_double_literal(
        &self,
        node: &DoubleLiteral,
        context: &C,
    ) -> Result<Self::Output, Self::Error> {
        self.visit_literal(NodeRef::DoubleLiteral(node), context)
    }

    fn visit_string_literal(
        &self,
        node: &StringLiteral,
        context: &C,
    ) -> Result<Self::Output, Self::Error> {
        self.visit_literal(NodeRef::StringLiteral(node), context)
    }

    fn visit_null_literal(
        &self,
        node: &NullLiteral,
        context: &C,
    ) -> Result<Self::Output, Self::Error> {
        self.visit_literal(NodeRef::NullLiteral(node), context)
    }

    // Expressions

    fn visit_qualified_name_reference(
        &self,
        node: &QualifiedNameReference,
        context: &C,
    ) -> Result<Self::Output, Self::Error> {
        self.visit_expression(NodeRef::QualifiedNameReference(node), context)
    }

    fn visit_slot_reference(
        &self,
        node: &SlotReference,
        context: &C,
    ) -> Result<Self::Output, Self::Error> {
        self.visit_expression(NodeRef::SlotReference(node), context)
    }

    fn visit_arithmetic_expression(
        &self,
        node: &ArithmeticExpression,
        context: &C,
    ) -> Result<Self::Output, Self::Error> {
        self.visit_expression(NodeRef::ArithmeticExpression(node), context)
    }

    fn visit_comparison_expression(
        &self,
        node: &ComparisonExpression,
        context: &C,
    ) -> Result<Self::Output, Self::Error> {
        self.visit_expression(NodeRef::ComparisonExpression(node), context)
    }

    fn visit_logical_binary_expression(
        &self,
        node: &LogicalBinaryExpression,
        context: &C,
    ) -> Result<Self::Output, Self::Error> {
        self.visit_expression(NodeRef::LogicalBinaryExpression(node), context)
    }

    fn visit_not_expression(
        &self,
        node: &NotExpression,
        context: &C,
    ) -> Result<Self::Output, Self::Error> {
        self.visit_expression(NodeRef::NotExpression(node), context)
    }

    fn visit_is_null_predicate(
        &self,
        node: &IsNullPredicate,
        context: &C,
    ) -> Result<Self::Output, Self::Error> {
        self.visit_expression(NodeRef::IsNullPredicate(node), context)
    }

    fn visit_is_not_null_predicate(
        &self,
        node: &IsNotNullPredicate,
        context: &C,
    ) -> Result<Self::Output, Self::Error> {
        self.visit_expression(NodeRef::IsNotNullPredicate(node), context)
    }

    fn visit_null_if_expression(
        &self,
        node: &NullIfExpression,
        context: &C,
    ) -> Result<Self::Output, Self::Error> {
        self.visit_expression(NodeRef::NullIfExpression(node), context)
    }

    fn visit_coalesce_expression(
        &self,
        node: &CoalesceExpression,
        context: &C,
    ) -> Result<Self::Output, Self::Error> {
        self.visit_expression(NodeRef::CoalesceExpression(node), context)
    }

    fn visit_function_call(
        &self,
        node: &FunctionCall,
        context: &C,
    ) -> Result<Self::Output, Self::Error> {
        self.visit_expression(NodeRef::FunctionCall(node), context)
    }

    fn visit_like_predicate(
        &self,
        node: &LikePredicate,
        context: &C,
    ) -> Result<Self::Output, Self::Error> {
        self.visit_expression(NodeRef::LikePredicate(node), context)
    }

    fn visit_in_predicate(
        &self,
        node: &InPredicate,
        context: &C,
    ) -> Result<Self::Output, Self::Error> {
        self.visit_expression(NodeRef::InPredicate(node), context)
    }

    fn visit_subquery_expression(
        &self,
        node: &SubqueryExpression,
        context: &C,
    ) -> Result<Self::Output, Self::Error> {
        self.visit_expression(NodeRef::SubqueryExpression(node), context)
    }

    fn visit_all_columns(
        &self,
        node: &AllColumns,
        context: &C,
    ) -> Result<Self::Output, Self::Error> {
        self.visit_expression(NodeRef::AllColumns(node), context)
    }

    fn visit_aliased_expression(
        &self,
        node: &AliasedExpression,
        context: &C,
    ) -> Result<Self::Output, Self::Error> {
        self.visit_expression(NodeRef::AliasedExpression(node), context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::DataType;
    use crate::planner::Slot;

    /// Names the handler that finally ran
    struct HandlerName;

    impl AstVisitor<()> for HandlerName {
        type Output = String;
        type Error = UnhandledNode;

        fn visit_expression(&self, node: NodeRef<'_>, _: &()) -> Result<String, UnhandledNode> {
            Ok(format!("expression:{}", node.kind()))
        }

        fn visit_comparison_expression(
            &self,
            _: &ComparisonExpression,
            _: &(),
        ) -> Result<String, UnhandledNode> {
            Ok("comparison".to_string())
        }

        fn visit_relation(&self, node: NodeRef<'_>, _: &()) -> Result<String, UnhandledNode> {
            Ok(format!("relation:{}", node.kind()))
        }
    }

    /// Overrides nothing
    struct Empty;

    impl AstVisitor<()> for Empty {
        type Output = ();
        type Error = UnhandledNode;
    }

    /// Overrides only the literal category
    struct Literals;

    impl AstVisitor<()> for Literals {
        type Output = &'static str;
        type Error = UnhandledNode;

        fn visit_literal(&self, _: NodeRef<'_>, _: &()) -> Result<&'static str, UnhandledNode> {
            Ok("literal")
        }
    }

    fn all_expressions() -> Vec<Expression> {
        vec![
            Expression::long(1),
            Expression::double(1.0),
            Expression::string("s"),
            Expression::null(),
            Expression::name("a"),
            Expression::slot(Slot::new(0, "a", DataType::Long)),
            Expression::add(Expression::long(1), Expression::long(2)),
            Expression::and(Expression::null(), Expression::null()),
            Expression::not(Expression::null()),
            Expression::is_null(Expression::null()),
            Expression::is_not_null(Expression::null()),
            Expression::null_if(Expression::long(1), Expression::long(2)),
            Expression::coalesce(vec![]),
            Expression::function_call("abs", vec![Expression::long(-1)]),
            Expression::like(Expression::string("a"), Expression::string("%")),
            Expression::in_list(Expression::long(1), vec![Expression::long(1)]),
            Expression::Subquery(SubqueryExpression {
                query: Box::new(Query::simple(vec![], "t")),
            }),
            Expression::AllColumns(AllColumns { prefix: None }),
            Expression::aliased(Expression::long(1), "one"),
        ]
    }

    #[test]
    fn test_generic_expression_handler_receives_every_variant() {
        for expr in all_expressions() {
            let result = HandlerName.process_expression(&expr, &()).unwrap();
            assert_eq!(result, format!("expression:{}", expr.kind()));
        }
    }

    #[test]
    fn test_specific_handler_takes_precedence() {
        let expr = Expression::lt(Expression::long(1), Expression::long(2));
        assert_eq!(HandlerName.process_expression(&expr, &()).unwrap(), "comparison");
    }

    #[test]
    fn test_literal_category_sits_between_literals_and_expression() {
        for expr in [
            Expression::long(1),
            Expression::double(2.0),
            Expression::string("x"),
            Expression::null(),
        ] {
            assert_eq!(Literals.process_expression(&expr, &()).unwrap(), "literal");
        }

        let err = Literals
            .process_expression(&Expression::name("a"), &())
            .unwrap_err();
        assert_eq!(err.kind, NodeKind::QualifiedNameReference);
    }

    #[test]
    fn test_relations_fall_back_to_relation_handler() {
        let table = Table {
            name: QualifiedName::parse("orders"),
        };
        let aliased = AliasedRelation {
            relation: Box::new(Relation::Table(table.clone())),
            alias: "o".to_string(),
        };

        assert_eq!(
            HandlerName.process(NodeRef::Table(&table), &()).unwrap(),
            "relation:Table"
        );
        assert_eq!(
            HandlerName
                .process(NodeRef::AliasedRelation(&aliased), &())
                .unwrap(),
            "relation:AliasedRelation"
        );
    }

    #[test]
    fn test_root_handler_names_unhandled_variant() {
        let query = Query::simple(vec![Expression::long(1)], "t");
        let err = HandlerName.process(NodeRef::Query(&query), &()).unwrap_err();
        assert_eq!(err, UnhandledNode { kind: NodeKind::Query });
        assert_eq!(err.to_string(), "Unhandled node kind: Query");

        for expr in all_expressions() {
            let err = Empty.process_expression(&expr, &()).unwrap_err();
            assert_eq!(err.kind, expr.kind());
        }
    }
}
