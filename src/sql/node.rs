//! Borrowed, variant-precise handles onto tree nodes.
//!
//! `NodeRef` flattens the owned category enums (`Node`, `Relation`,
//! `Expression`) into one enum of concrete variants. Visitors and rewriters
//! pass it up their fallback chain so that a category handler still knows
//! which concrete node it was handed.

use crate::sql::ast::*;
use std::fmt;

/// Concrete node variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Query,
    Select,
    Table,
    AliasedRelation,
    Subquery,
    LongLiteral,
    DoubleLiteral,
    StringLiteral,
    NullLiteral,
    QualifiedNameReference,
    SlotReference,
    ArithmeticExpression,
    ComparisonExpression,
    LogicalBinaryExpression,
    NotExpression,
    IsNullPredicate,
    IsNotNullPredicate,
    NullIfExpression,
    CoalesceExpression,
    FunctionCall,
    LikePredicate,
    InPredicate,
    SubqueryExpression,
    AllColumns,
    AliasedExpression,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Query => "Query",
            NodeKind::Select => "Select",
            NodeKind::Table => "Table",
            NodeKind::AliasedRelation => "AliasedRelation",
            NodeKind::Subquery => "Subquery",
            NodeKind::LongLiteral => "LongLiteral",
            NodeKind::DoubleLiteral => "DoubleLiteral",
            NodeKind::StringLiteral => "StringLiteral",
            NodeKind::NullLiteral => "NullLiteral",
            NodeKind::QualifiedNameReference => "QualifiedNameReference",
            NodeKind::SlotReference => "SlotReference",
            NodeKind::ArithmeticExpression => "ArithmeticExpression",
            NodeKind::ComparisonExpression => "ComparisonExpression",
            NodeKind::LogicalBinaryExpression => "LogicalBinaryExpression",
            NodeKind::NotExpression => "NotExpression",
            NodeKind::IsNullPredicate => "IsNullPredicate",
            NodeKind::IsNotNullPredicate => "IsNotNullPredicate",
            NodeKind::NullIfExpression => "NullIfExpression",
            NodeKind::CoalesceExpression => "CoalesceExpression",
            NodeKind::FunctionCall => "FunctionCall",
            NodeKind::LikePredicate => "LikePredicate",
            NodeKind::InPredicate => "InPredicate",
            NodeKind::SubqueryExpression => "SubqueryExpression",
            NodeKind::AllColumns => "AllColumns",
            NodeKind::AliasedExpression => "AliasedExpression",
        }
    }

    pub fn category(&self) -> NodeCategory {
        match self {
            NodeKind::Query => NodeCategory::Statement,
            NodeKind::Select => NodeCategory::Select,
            NodeKind::Table | NodeKind::AliasedRelation | NodeKind::Subquery => {
                NodeCategory::Relation
            }
            _ => NodeCategory::Expression,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeRef<'a> {
    Query(&'a Query),
    Select(&'a Select),
    Table(&'a Table),
    AliasedRelation(&'a AliasedRelation),
    Subquery(&'a Subquery),
    LongLiteral(&'a LongLiteral),
    DoubleLiteral(&'a DoubleLiteral),
    StringLiteral(&'a StringLiteral),
    NullLiteral(&'a NullLiteral),
    QualifiedNameReference(&'a QualifiedNameReference),
    SlotReference(&'a SlotReference),
    ArithmeticExpression(&'a ArithmeticExpression),
    ComparisonExpression(&'a ComparisonExpression),
    LogicalBinaryExpression(&'a LogicalBinaryExpression),
    NotExpression(&'a NotExpression),
    IsNullPredicate(&'a IsNullPredicate),
    IsNotNullPredicate(&'a IsNotNullPredicate),
    NullIfExpression(&'a NullIfExpression),
    CoalesceExpression(&'a CoalesceExpression),
    FunctionCall(&'a FunctionCall),
    LikePredicate(&'a LikePredicate),
    InPredicate(&'a InPredicate),
    SubqueryExpression(&'a SubqueryExpression),
    AllColumns(&'a AllColumns),
    AliasedExpression(&'a AliasedExpression),
}

impl<'a> NodeRef<'a> {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeRef::Query(_) => NodeKind::Query,
            NodeRef::Select(_) => NodeKind::Select,
            NodeRef::Table(_) => NodeKind::Table,
            NodeRef::AliasedRelation(_) => NodeKind::AliasedRelation,
            NodeRef::Subquery(_) => NodeKind::Subquery,
            NodeRef::LongLiteral(_) => NodeKind::LongLiteral,
            NodeRef::DoubleLiteral(_) => NodeKind::DoubleLiteral,
            NodeRef::StringLiteral(_) => NodeKind::StringLiteral,
            NodeRef::NullLiteral(_) => NodeKind::NullLiteral,
            NodeRef::QualifiedNameReference(_) => NodeKind::QualifiedNameReference,
            NodeRef::SlotReference(_) => NodeKind::SlotReference,
            NodeRef::ArithmeticExpression(_) => NodeKind::ArithmeticExpression,
            NodeRef::ComparisonExpression(_) => NodeKind::ComparisonExpression,
            NodeRef::LogicalBinaryExpression(_) => NodeKind::LogicalBinaryExpression,
            NodeRef::NotExpression(_) => NodeKind::NotExpression,
            NodeRef::IsNullPredicate(_) => NodeKind::IsNullPredicate,
            NodeRef::IsNotNullPredicate(_) => NodeKind::IsNotNullPredicate,
            NodeRef::NullIfExpression(_) => NodeKind::NullIfExpression,
            NodeRef::CoalesceExpression(_) => NodeKind::CoalesceExpression,
            NodeRef::FunctionCall(_) => NodeKind::FunctionCall,
            NodeRef::LikePredicate(_) => NodeKind::LikePredicate,
            NodeRef::InPredicate(_) => NodeKind::InPredicate,
            NodeRef::SubqueryExpression(_) => NodeKind::SubqueryExpression,
            NodeRef::AllColumns(_) => NodeKind::AllColumns,
            NodeRef::AliasedExpression(_) => NodeKind::AliasedExpression,
        }
    }

    /// Direct expression children in evaluation order. Statements,
    /// relations and subquery expressions have none.
    pub fn children(&self) -> Vec<&'a Expression> {
        match *self {
            NodeRef::Query(_)
            | NodeRef::Select(_)
            | NodeRef::Table(_)
            | NodeRef::AliasedRelation(_)
            | NodeRef::Subquery(_)
            | NodeRef::LongLiteral(_)
            | NodeRef::DoubleLiteral(_)
            | NodeRef::StringLiteral(_)
            | NodeRef::NullLiteral(_)
            | NodeRef::QualifiedNameReference(_)
            | NodeRef::SlotReference(_)
            | NodeRef::SubqueryExpression(_)
            | NodeRef::AllColumns(_) => vec![],
            NodeRef::ArithmeticExpression(node) => vec![&*node.left, &*node.right],
            NodeRef::ComparisonExpression(node) => vec![&*node.left, &*node.right],
            NodeRef::LogicalBinaryExpression(node) => vec![&*node.left, &*node.right],
            NodeRef::NotExpression(node) => vec![&*node.value],
            NodeRef::IsNullPredicate(node) => vec![&*node.value],
            NodeRef::IsNotNullPredicate(node) => vec![&*node.value],
            NodeRef::NullIfExpression(node) => vec![&*node.first, &*node.second],
            NodeRef::CoalesceExpression(node) => node.operands.iter().collect(),
            NodeRef::FunctionCall(node) => node.arguments.iter().collect(),
            NodeRef::LikePredicate(node) => {
                let mut children = vec![&*node.value, &*node.pattern];
                if let Some(escape) = &node.escape {
                    children.push(&**escape);
                }
                children
            }
            NodeRef::InPredicate(node) => {
                let mut children = vec![&*node.value];
                children.extend(node.value_list.iter());
                children
            }
            NodeRef::AliasedExpression(node) => vec![&*node.expression],
        }
    }
}

impl Node {
    pub fn as_node_ref(&self) -> NodeRef<'_> {
        match self {
            Node::Query(node) => NodeRef::Query(node),
            Node::Select(node) => NodeRef::Select(node),
            Node::Relation(relation) => relation.as_node_ref(),
            Node::Expression(expression) => expression.as_node_ref(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.as_node_ref().kind()
    }
}

impl Relation {
    pub fn as_node_ref(&self) -> NodeRef<'_> {
        match self {
            Relation::Table(node) => NodeRef::Table(node),
            Relation::Aliased(node) => NodeRef::AliasedRelation(node),
            Relation::Subquery(node) => NodeRef::Subquery(node),
        }
    }
}

impl Expression {
    pub fn as_node_ref(&self) -> NodeRef<'_> {
        match self {
            Expression::LongLiteral(node) => NodeRef::LongLiteral(node),
            Expression::DoubleLiteral(node) => NodeRef::DoubleLiteral(node),
            Expression::StringLiteral(node) => NodeRef::StringLiteral(node),
            Expression::NullLiteral(node) => NodeRef::NullLiteral(node),
            Expression::QualifiedNameReference(node) => NodeRef::QualifiedNameReference(node),
            Expression::SlotReference(node) => NodeRef::SlotReference(node),
            Expression::Arithmetic(node) => NodeRef::ArithmeticExpression(node),
            Expression::Comparison(node) => NodeRef::ComparisonExpression(node),
            Expression::LogicalBinary(node) => NodeRef::LogicalBinaryExpression(node),
            Expression::Not(node) => NodeRef::NotExpression(node),
            Expression::IsNull(node) => NodeRef::IsNullPredicate(node),
            Expression::IsNotNull(node) => NodeRef::IsNotNullPredicate(node),
            Expression::NullIf(node) => NodeRef::NullIfExpression(node),
            Expression::Coalesce(node) => NodeRef::CoalesceExpression(node),
            Expression::FunctionCall(node) => NodeRef::FunctionCall(node),
            Expression::Like(node) => NodeRef::LikePredicate(node),
            Expression::In(node) => NodeRef::InPredicate(node),
            Expression::Subquery(node) => NodeRef::SubqueryExpression(node),
            Expression::AllColumns(node) => NodeRef::AllColumns(node),
            Expression::Aliased(node) => NodeRef::AliasedExpression(node),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.as_node_ref().kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_kinds() {
        assert_eq!(Expression::long(1).kind(), NodeKind::LongLiteral);
        assert_eq!(
            Expression::add(Expression::long(1), Expression::long(2)).kind(),
            NodeKind::ArithmeticExpression
        );
        assert_eq!(
            Expression::coalesce(vec![]).kind(),
            NodeKind::CoalesceExpression
        );
        assert_eq!(Expression::name("a.b").kind().as_str(), "QualifiedNameReference");
    }

    #[test]
    fn test_kind_categories() {
        assert_eq!(NodeKind::Query.category(), NodeCategory::Statement);
        assert_eq!(NodeKind::Select.category(), NodeCategory::Select);
        assert_eq!(NodeKind::AliasedRelation.category(), NodeCategory::Relation);
        assert_eq!(NodeKind::NullLiteral.category(), NodeCategory::Expression);
        assert_eq!(NodeKind::AllColumns.category(), NodeCategory::Expression);
    }

    #[test]
    fn test_node_ref_kind_matches_node() {
        let nodes = vec![
            Node::from(Expression::not(Expression::null())),
            Node::from(Relation::Table(Table {
                name: QualifiedName::parse("t"),
            })),
            Node::from(Query::simple(vec![Expression::long(1)], "t")),
        ];

        for node in nodes {
            let node_ref = node.as_node_ref();
            assert_eq!(node_ref.kind(), node.kind());
            assert_eq!(node.kind().category(), node.category());
        }
    }

    #[test]
    fn test_only_expressions_have_children() {
        let query = Query::simple(vec![Expression::long(1)], "t");
        assert!(NodeRef::Query(&query).children().is_empty());
        assert!(NodeRef::Select(&query.select).children().is_empty());

        let like = Expression::like(Expression::name("a"), Expression::string("x%"));
        assert_eq!(like.as_node_ref().children().len(), 2);
    }
}
