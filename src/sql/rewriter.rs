//! Tree rewriting.
//!
//! A [`NodeRewriter`] decides, node by node, whether to replace a node. Every
//! handler defaults to its category handler and the root handler returns
//! `None`, meaning "no rewrite for this node". Handlers must be pure
//! functions of the node and the context.
//!
//! [`TreeRewriter`] drives a rewriter over a tree. A replacement is used as
//! is and its children are not revisited; on `None` the driver descends into
//! the children and rebuilds the node from their rewrites.

use crate::sql::ast::*;
use crate::sql::node::{NodeKind, NodeRef};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    #[error("Rewrite of {kind} produced a {actual} node in {expected} position")]
    CategoryMismatch {
        kind: NodeKind,
        expected: NodeCategory,
        actual: NodeCategory,
    },
}

pub type RewriteResult<T> = Result<T, RewriteError>;

pub trait NodeRewriter<C: ?Sized> {
    fn rewrite_node(&self, _node: NodeRef<'_>, _context: &C) -> Option<Node> {
        None
    }

    fn rewrite_statement(&self, node: NodeRef<'_>, context: &C) -> Option<Node> {
        self.rewrite_node(node, context)
    }

    fn rewrite_relation(&self, node: NodeRef<'_>, context: &C) -> Option<Node> {
        self.rewrite_node(node, context)
    }

    fn rewrite_expression(&self, node: NodeRef<'_>, context: &C) -> Option<Node> {
        self.rewrite_node(node, context)
    }

    fn rewrite_literal(&self, node: NodeRef<'_>, context: &C) -> Option<Node> {
        self.rewrite_expression(node, context)
    }

    fn rewrite_query(&self, node: &Query, context: &C) -> Option<Node> {
        self.rewrite_statement(NodeRef::Query(node), context)
    }

    fn rewrite_select(&self, node: &Select, context: &C) -> Option<Node> {
        self.rewrite_node(NodeRef::Select(node), context)
    }

    fn rewrite_table(&self, node: &Table, context: &C) -> Option<Node> {
        self.rewrite_relation(NodeRef::Table(node), context)
    }

    fn rewrite_aliased_relation(&self, node: &AliasedRelation, context: &C) -> Option<Node> {
        self.rewrite_relation(NodeRef::AliasedRelation(node), context)
    }

    fn rewrite_subquery(&self, node: &Subquery, context: &C) -> Option<Node> {
        self.rewrite_relation(NodeRef::Subquery(node), context)
    }

    fn rewrite_long_literal(&self, node: &LongLiteral, context: &C) -> Option<Node> {
        self.rewrite_literal(NodeRef::LongLiteral(node), context)
    }

    fn rewrite_double_literal(&self, node: &DoubleLiteral, context: &C) -> Option<Node> {
        self.rewrite_literal(NodeRef::DoubleLiteral(node), context)
    }

    fn rewrite_string_literal(&self, node: &StringLiteral, context: &C) -> Option<Node> {
        self.rewrite_literal(NodeRef::StringLiteral(node), context)
    }

    fn rewrite_null_literal(&self, node: &NullLiteral, context: &C) -> Option<Node> {
        self.rewrite_literal(NodeRef::NullLiteral(node), context)
    }

    fn rewrite_qualified_name_reference(
        &self,
        node: &QualifiedNameReference,
        context: &C,
    ) -> Option<Node> {
        self.rewrite_expression(NodeRef::QualifiedNameReference(node), context)
    }

    fn rewrite_slot_reference(&self, node: &SlotReference, context: &C) -> Option<Node> {
        self.rewrite_expression(NodeRef::SlotReference(node), context)
    }

    fn rewrite_arithmetic_expression(
        &self,
        node: &ArithmeticExpression,
        context: &C,
    ) -> Option<Node> {
        self.rewrite_expression(NodeRef::ArithmeticExpression(node), context)
    }

    fn rewrite_comparison_expression(
        &self,
        node: &ComparisonExpression,
        context: &C,
    ) -> Option<Node> {
        self.rewrite_expression(NodeRef::ComparisonExpression(node), context)
    }

    fn rewrite_logical_binary_expression(
        &self,
        node: &LogicalBinaryExpression,
        context: &C,
    ) -> Option<Node> {
        self.rewrite_expression(NodeRef::LogicalBinaryExpression(node), context)
    }

    fn rewrite_not_expression(&self, node: &NotExpression, context: &C) -> Option<Node> {
        self.rewrite_expression(NodeRef::NotExpression(node), context)
    }

    fn rewrite_is_null_predicate(&self, node: &IsNullPredicate, context: &C) -> Option<Node> {
        self.rewrite_expression(NodeRef::IsNullPredicate(node), context)
    }

    fn rewrite_is_not_null_predicate(
        &self,
        node: &IsNotNullPredicate,
        context: &C,
    ) -> Option<Node> {
        self.rewrite_expression(NodeRef::IsNotNullPredicate(node), context)
    }

    fn rewrite_null_if_expression(&self, node: &NullIfExpression, context: &C) -> Option<Node> {
        self.rewrite_expression(NodeRef::NullIfExpression(node), context)
    }

    fn rewrite_coalesce_expression(
        &self,
        node: &CoalesceExpression,
        context: &C,
    ) -> Option<Node> {
        self.rewrite_expression(NodeRef::CoalesceExpression(node), context)
    }

    fn rewrite_function_call(&self, node: &FunctionCall, context: &C) -> Option<Node> {
        self.rewrite_expression(NodeRef::FunctionCall(node), context)
    }

    fn rewrite_like_predicate(&self, node: &LikePredicate, context: &C) -> Option<Node> {
        self.rewrite_expression(NodeRef::LikePredicate(node), context)
    }

    fn rewrite_in_predicate(&self, node: &InPredicate, context: &C) -> Option<Node> {
        self.rewrite_expression(NodeRef::InPredicate(node), context)
    }

    fn rewrite_subquery_expression(
        &self,
        node: &SubqueryExpression,
        context: &C,
    ) -> Option<Node> {
        self.rewrite_expression(NodeRef::SubqueryExpression(node), context)
    }

    fn rewrite_all_columns(&self, node: &AllColumns, context: &C) -> Option<Node> {
        self.rewrite_expression(NodeRef::AllColumns(node), context)
    }

    fn rewrite_aliased_expression(&self, node: &AliasedExpression, context: &C) -> Option<Node> {
        self.rewrite_expression(NodeRef::AliasedExpression(node), context)
    }
}

/// Route a node to the rewriter's handler for its concrete variant
fn dispatch<R, C>(rewriter: &R, node: NodeRef<'_>, context: &C) -> Option<Node>
where
    R: NodeRewriter<C> + ?Sized,
    C: ?Sized,
{
    match node {
        NodeRef::Query(n) => rewriter.rewrite_query(n, context),
        NodeRef::Select(n) => rewriter.rewrite_select(n, context),
        NodeRef::Table(n) => rewriter.rewrite_table(n, context),
        NodeRef::AliasedRelation(n) => rewriter.rewrite_aliased_relation(n, context),
        NodeRef::Subquery(n) => rewriter.rewrite_subquery(n, context),
        NodeRef::LongLiteral(n) => rewriter.rewrite_long_literal(n, context),
        NodeRef::DoubleLiteral(n) => rewriter.rewrite_double_literal(n, context),
        NodeRef::StringLiteral(n) => rewriter.rewrite_string_literal(n, context),
        NodeRef::NullLiteral(n) => rewriter.rewrite_null_literal(n, context),
        NodeRef::QualifiedNameReference(n) => rewriter.rewrite_qualified_name_reference(n, context),
        NodeRef::SlotReference(n) => rewriter.rewrite_slot_reference(n, context),
        NodeRef::ArithmeticExpression(n) => rewriter.rewrite_arithmetic_expression(n, context),
        NodeRef::ComparisonExpression(n) => rewriter.rewrite_comparison_expression(n, context),
        NodeRef::LogicalBinaryExpression(n) => {
            rewriter.rewrite_logical_binary_expression(n, context)
        }
        NodeRef::NotExpression(n) => rewriter.rewrite_not_expression(n, context),
        NodeRef::IsNullPredicate(n) => rewriter.rewrite_is_null_predicate(n, context),
        NodeRef::IsNotNullPredicate(n) => rewriter.rewrite_is_not_null_predicate(n, context),
        NodeRef::NullIfExpression(n) => rewriter.rewrite_null_if_expression(n, context),
        NodeRef::CoalesceExpression(n) => rewriter.rewrite_coalesce_expression(n, context),
        NodeRef::FunctionCall(n) => rewriter.rewrite_function_call(n, context),
        NodeRef::LikePredicate(n) => rewriter.rewrite_like_predicate(n, context),
        NodeRef::InPredicate(n) => rewriter.rewrite_in_predicate(n, context),
        NodeRef::SubqueryExpression(n) => rewriter.rewrite_subquery_expression(n, context),
        NodeRef::AllColumns(n) => rewriter.rewrite_all_columns(n, context),
        NodeRef::AliasedExpression(n) => rewriter.rewrite_aliased_expression(n, context),
    }
}

fn mismatch(kind: NodeKind, expected: NodeCategory, actual: &Node) -> RewriteError {
    RewriteError::CategoryMismatch {
        kind,
        expected,
        actual: actual.category(),
    }
}

/// Drives a [`NodeRewriter`] over a whole tree
pub struct TreeRewriter<'r, R: ?Sized> {
    rewriter: &'r R,
}

impl<'r, R: ?Sized> TreeRewriter<'r, R> {
    pub fn new(rewriter: &'r R) -> Self {
        Self { rewriter }
    }

    pub fn rewrite<C: ?Sized>(&self, node: &Node, context: &C) -> RewriteResult<Node>
    where
        R: NodeRewriter<C>,
    {
        match node {
            Node::Query(query) => Ok(Node::Query(self.rewrite_query(query, context)?)),
            Node::Select(select) => Ok(Node::Select(self.rewrite_select(select, context)?)),
            Node::Relation(relation) => {
                Ok(Node::Relation(self.rewrite_relation(relation, context)?))
            }
            Node::Expression(expression) => Ok(Node::Expression(
                self.rewrite_expression(expression, context)?,
            )),
        }
    }

    pub fn rewrite_query<C: ?Sized>(&self, query: &Query, context: &C) -> RewriteResult<Query>
    where
        R: NodeRewriter<C>,
    {
        match dispatch(self.rewriter, NodeRef::Query(query), context) {
            Some(Node::Query(rewritten)) => Ok(rewritten),
            Some(other) => Err(mismatch(NodeKind::Query, NodeCategory::Statement, &other)),
            None => Ok(Query {
                select: self.rewrite_select(&query.select, context)?,
                from: query
                    .from
                    .iter()
                    .map(|relation| self.rewrite_relation(relation, context))
                    .collect::<RewriteResult<_>>()?,
                where_clause: self.rewrite_optional(query.where_clause.as_ref(), context)?,
                group_by: self.rewrite_all(&query.group_by, context)?,
                having: self.rewrite_optional(query.having.as_ref(), context)?,
                limit: query.limit,
            }),
        }
    }

    pub fn rewrite_select<C: ?Sized>(&self, select: &Select, context: &C) -> RewriteResult<Select>
    where
        R: NodeRewriter<C>,
    {
        match dispatch(self.rewriter, NodeRef::Select(select), context) {
            Some(Node::Select(rewritten)) => Ok(rewritten),
            Some(other) => Err(mismatch(NodeKind::Select, NodeCategory::Select, &other)),
            None => Ok(Select {
                distinct: select.distinct,
                select_items: self.rewrite_all(&select.select_items, context)?,
            }),
        }
    }

    pub fn rewrite_relation<C: ?Sized>(
        &self,
        relation: &Relation,
        context: &C,
    ) -> RewriteResult<Relation>
    where
        R: NodeRewriter<C>,
    {
        let node = relation.as_node_ref();
        match dispatch(self.rewriter, node, context) {
            Some(Node::Relation(rewritten)) => Ok(rewritten),
            Some(other) => Err(mismatch(node.kind(), NodeCategory::Relation, &other)),
            None => match relation {
                Relation::Table(_) => Ok(relation.clone()),
                Relation::Aliased(aliased) => Ok(Relation::Aliased(AliasedRelation {
                    relation: Box::new(self.rewrite_relation(&aliased.relation, context)?),
                    alias: aliased.alias.clone(),
                })),
                Relation::Subquery(subquery) => Ok(Relation::Subquery(Subquery {
                    query: Box::new(self.rewrite_query(&subquery.query, context)?),
                })),
            },
        }
    }

    pub fn rewrite_expression<C: ?Sized>(
        &self,
        expression: &Expression,
        context: &C,
    ) -> RewriteResult<Expression>
    where
        R: NodeRewriter<C>,
    {
        let node = expression.as_node_ref();
        match dispatch(self.rewriter, node, context) {
            Some(Node::Expression(rewritten)) => Ok(rewritten),
            Some(other) => Err(mismatch(node.kind(), NodeCategory::Expression, &other)),
            None => self.rewrite_children(expression, context),
        }
    }

    /// Rebuild `expression` from the rewrites of its children
    fn rewrite_children<C: ?Sized>(
        &self,
        expression: &Expression,
        context: &C,
    ) -> RewriteResult<Expression>
    where
        R: NodeRewriter<C>,
    {
        let rewritten = match expression {
            Expression::LongLiteral(_)
            | Expression::DoubleLiteral(_)
            | Expression::StringLiteral(_)
            | Expression::NullLiteral(_)
            | Expression::QualifiedNameReference(_)
            | Expression::SlotReference(_)
            | Expression::AllColumns(_) => expression.clone(),
            Expression::Arithmetic(node) => Expression::Arithmetic(ArithmeticExpression {
                operator: node.operator,
                left: self.rewrite_boxed(&node.left, context)?,
                right: self.rewrite_boxed(&node.right, context)?,
            }),
            Expression::Comparison(node) => Expression::Comparison(ComparisonExpression {
                operator: node.operator,
                left: self.rewrite_boxed(&node.left, context)?,
                right: self.rewrite_boxed(&node.right, context)?,
            }),
            Expression::LogicalBinary(node) => {
                Expression::LogicalBinary(LogicalBinaryExpression {
                    operator: node.operator,
                    left: self.rewrite_boxed(&node.left, context)?,
                    right: self.rewrite_boxed(&node.right, context)?,
                })
            }
            Expression::Not(node) => Expression::Not(NotExpression {
                value: self.rewrite_boxed(&node.value, context)?,
            }),
            Expression::IsNull(node) => Expression::IsNull(IsNullPredicate {
                value: self.rewrite_boxed(&node.value, context)?,
            }),
            Expression::IsNotNull(node) => Expression::IsNotNull(IsNotNullPredicate {
                value: self.rewrite_boxed(&node.value, context)?,
            }),
            Expression::NullIf(node) => Expression::NullIf(NullIfExpression {
                first: self.rewrite_boxed(&node.first, context)?,
                second: self.rewrite_boxed(&node.second, context)?,
            }),
            Expression::Coalesce(node) => Expression::Coalesce(CoalesceExpression {
                operands: self.rewrite_all(&node.operands, context)?,
            }),
            Expression::FunctionCall(node) => Expression::FunctionCall(FunctionCall {
                name: node.name.clone(),
                arguments: self.rewrite_all(&node.arguments, context)?,
            }),
            Expression::Like(node) => Expression::Like(LikePredicate {
                value: self.rewrite_boxed(&node.value, context)?,
                pattern: self.rewrite_boxed(&node.pattern, context)?,
                escape: match &node.escape {
                    Some(escape) => Some(self.rewrite_boxed(escape, context)?),
                    None => None,
                },
            }),
            Expression::In(node) => Expression::In(InPredicate {
                value: self.rewrite_boxed(&node.value, context)?,
                value_list: self.rewrite_all(&node.value_list, context)?,
            }),
            Expression::Subquery(node) => Expression::Subquery(SubqueryExpression {
                query: Box::new(self.rewrite_query(&node.query, context)?),
            }),
            Expression::Aliased(node) => Expression::Aliased(AliasedExpression {
                expression: self.rewrite_boxed(&node.expression, context)?,
                alias: node.alias.clone(),
            }),
        };
        Ok(rewritten)
    }

    fn rewrite_boxed<C: ?Sized>(
        &self,
        expression: &Expression,
        context: &C,
    ) -> RewriteResult<Box<Expression>>
    where
        R: NodeRewriter<C>,
    {
        Ok(Box::new(self.rewrite_expression(expression, context)?))
    }

    fn rewrite_all<C: ?Sized>(
        &self,
        expressions: &[Expression],
        context: &C,
    ) -> RewriteResult<Vec<Expression>>
    where
        R: NodeRewriter<C>,
    {
        expressions
            .iter()
            .map(|expression| self.rewrite_expression(expression, context))
            .collect()
    }

    fn rewrite_optional<C: ?Sized>(
        &self,
        expression: Option<&Expression>,
        context: &C,
    ) -> RewriteResult<Option<Expression>>
    where
        R: NodeRewriter<C>,
    {
        expression
            .map(|expression| self.rewrite_expression(expression, context))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Rewrites nothing
    struct Identity;

    impl NodeRewriter<()> for Identity {}

    /// Multiplies every long literal by the context factor
    struct ScaleLongs;

    impl NodeRewriter<i64> for ScaleLongs {
        fn rewrite_long_literal(&self, node: &LongLiteral, factor: &i64) -> Option<Node> {
            Some(Expression::long(node.value * factor).into())
        }
    }

    /// Replaces every expression at its category handler
    struct NullEverything;

    impl NodeRewriter<()> for NullEverything {
        fn rewrite_expression(&self, _: NodeRef<'_>, _: &()) -> Option<Node> {
            Some(Expression::null().into())
        }
    }

    /// Swaps additions for subtractions and scales literals
    struct SwapAdd;

    impl NodeRewriter<()> for SwapAdd {
        fn rewrite_arithmetic_expression(
            &self,
            node: &ArithmeticExpression,
            _: &(),
        ) -> Option<Node> {
            Some(Expression::subtract((*node.left).clone(), (*node.right).clone()).into())
        }

        fn rewrite_long_literal(&self, node: &LongLiteral, _: &()) -> Option<Node> {
            Some(Expression::long(node.value * 100).into())
        }
    }

    /// Returns a relation where an expression is required
    struct WrongCategory;

    impl NodeRewriter<()> for WrongCategory {
        fn rewrite_null_literal(&self, _: &NullLiteral, _: &()) -> Option<Node> {
            Some(Node::Relation(Relation::Table(Table {
                name: QualifiedName::parse("t"),
            })))
        }
    }

    fn sample_query() -> Query {
        let mut query = Query::simple(
            vec![Expression::aliased(
                Expression::add(Expression::name("a"), Expression::long(1)),
                "a1",
            )],
            "t",
        );
        query.where_clause = Some(Expression::in_list(
            Expression::long(2),
            vec![Expression::Subquery(SubqueryExpression {
                query: Box::new(Query::simple(vec![Expression::long(3)], "u")),
            })],
        ));
        query.from = vec![Relation::Aliased(AliasedRelation {
            relation: Box::new(Relation::Subquery(Subquery {
                query: Box::new(Query::simple(vec![Expression::long(4)], "v")),
            })),
            alias: "s".to_string(),
        })];
        query.limit = Some(10);
        query
    }

    #[test]
    fn test_identity_rewrite_preserves_tree() {
        let node = Node::Query(sample_query());
        let rewritten = TreeRewriter::new(&Identity).rewrite(&node, &()).unwrap();
        assert_eq!(rewritten, node);
    }

    #[test]
    fn test_rewrite_reaches_nested_literals() {
        let rewritten = TreeRewriter::new(&ScaleLongs)
            .rewrite_query(&sample_query(), &2)
            .unwrap();

        let mut expected = sample_query();
        expected.select.select_items = vec![Expression::aliased(
            Expression::add(Expression::name("a"), Expression::long(2)),
            "a1",
        )];
        expected.where_clause = Some(Expression::in_list(
            Expression::long(4),
            vec![Expression::Subquery(SubqueryExpression {
                query: Box::new(Query::simple(vec![Expression::long(6)], "u")),
            })],
        ));
        expected.from = vec![Relation::Aliased(AliasedRelation {
            relation: Box::new(Relation::Subquery(Subquery {
                query: Box::new(Query::simple(vec![Expression::long(8)], "v")),
            })),
            alias: "s".to_string(),
        })];

        assert_eq!(rewritten, expected);
    }

    #[test]
    fn test_category_handler_replaces_whole_subtree() {
        let expr = Expression::and(Expression::long(1), Expression::long(2));
        let rewritten = TreeRewriter::new(&NullEverything)
            .rewrite_expression(&expr, &())
            .unwrap();
        assert_eq!(rewritten, Expression::null());
    }

    #[test]
    fn test_replacement_children_are_not_revisited() {
        let expr = Expression::not(Expression::add(Expression::long(1), Expression::long(2)));
        let rewritten = TreeRewriter::new(&SwapAdd)
            .rewrite_expression(&expr, &())
            .unwrap();
        assert_eq!(
            rewritten,
            Expression::not(Expression::subtract(
                Expression::long(1),
                Expression::long(2)
            ))
        );

        // Literals outside the replaced subtree are still rewritten
        let expr = Expression::coalesce(vec![Expression::long(1)]);
        let rewritten = TreeRewriter::new(&SwapAdd)
            .rewrite_expression(&expr, &())
            .unwrap();
        assert_eq!(rewritten, Expression::coalesce(vec![Expression::long(100)]));
    }

    #[test]
    fn test_category_mismatch_is_reported() {
        let expr = Expression::is_null(Expression::null());
        let err = TreeRewriter::new(&WrongCategory)
            .rewrite_expression(&expr, &())
            .unwrap_err();
        assert_eq!(
            err,
            RewriteError::CategoryMismatch {
                kind: NodeKind::NullLiteral,
                expected: NodeCategory::Expression,
                actual: NodeCategory::Relation,
            }
        );
        assert_eq!(
            err.to_string(),
            "Rewrite of NullLiteral produced a Relation node in Expression position"
        );
    }
}
