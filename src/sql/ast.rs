// SQL Abstract Syntax Tree (AST) definitions

use crate::expression::operator::{ArithmeticOperator, ComparisonOperator, LogicalOperator};
use crate::planner::Slot;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dotted, multi-part name such as `orders.price`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualifiedName {
    parts: Vec<String>,
}

impl QualifiedName {
    /// Split a dotted name into its parts
    pub fn parse(dotted: &str) -> Self {
        Self {
            parts: dotted.split('.').map(str::to_string).collect(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parts.join("."))
    }
}

/// Any node of the tree, grouped by category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Query(Query),
    Select(Select),
    Relation(Relation),
    Expression(Expression),
}

/// Coarse node categories; a rewritten node must keep the category of the
/// position it is placed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    Statement,
    Select,
    Relation,
    Expression,
}

impl NodeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeCategory::Statement => "Statement",
            NodeCategory::Select => "Select",
            NodeCategory::Relation => "Relation",
            NodeCategory::Expression => "Expression",
        }
    }
}

impl fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Node {
    pub fn category(&self) -> NodeCategory {
        match self {
            Node::Query(_) => NodeCategory::Statement,
            Node::Select(_) => NodeCategory::Select,
            Node::Relation(_) => NodeCategory::Relation,
            Node::Expression(_) => NodeCategory::Expression,
        }
    }
}

impl From<Expression> for Node {
    fn from(expression: Expression) -> Self {
        Node::Expression(expression)
    }
}

impl From<Relation> for Node {
    fn from(relation: Relation) -> Self {
        Node::Relation(relation)
    }
}

impl From<Query> for Node {
    fn from(query: Query) -> Self {
        Node::Query(query)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub select: Select,
    pub from: Vec<Relation>,
    pub where_clause: Option<Expression>,
    pub group_by: Vec<Expression>,
    pub having: Option<Expression>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Select {
    pub distinct: bool,
    pub select_items: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Relation {
    Table(Table),
    Aliased(AliasedRelation),
    Subquery(Subquery),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: QualifiedName,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasedRelation {
    pub relation: Box<Relation>,
    pub alias: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subquery {
    pub query: Box<Query>,
}

/// Expression tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    LongLiteral(LongLiteral),
    DoubleLiteral(DoubleLiteral),
    StringLiteral(StringLiteral),
    NullLiteral(NullLiteral),

    /// Name as written in the query; must be resolved before evaluation
    QualifiedNameReference(QualifiedNameReference),

    /// Column bound to a planner slot
    SlotReference(SlotReference),

    Arithmetic(ArithmeticExpression),
    Comparison(ComparisonExpression),
    LogicalBinary(LogicalBinaryExpression),
    Not(NotExpression),
    IsNull(IsNullPredicate),
    IsNotNull(IsNotNullPredicate),
    NullIf(NullIfExpression),
    Coalesce(CoalesceExpression),
    FunctionCall(FunctionCall),
    Like(LikePredicate),
    In(InPredicate),
    Subquery(SubqueryExpression),
    AllColumns(AllColumns),
    Aliased(AliasedExpression),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongLiteral {
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoubleLiteral {
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringLiteral {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NullLiteral;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualifiedNameReference {
    pub name: QualifiedName,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotReference {
    pub slot: Slot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArithmeticExpression {
    pub operator: ArithmeticOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonExpression {
    pub operator: ComparisonOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalBinaryExpression {
    pub operator: LogicalOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotExpression {
    pub value: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsNullPredicate {
    pub value: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsNotNullPredicate {
    pub value: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NullIfExpression {
    pub first: Box<Expression>,
    pub second: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoalesceExpression {
    pub operands: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: QualifiedName,
    pub arguments: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikePredicate {
    pub value: Box<Expression>,
    pub pattern: Box<Expression>,
    pub escape: Option<Box<Expression>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InPredicate {
    pub value: Box<Expression>,
    pub value_list: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubqueryExpression {
    pub query: Box<Query>,
}

/// `*` or `prefix.*` in a select list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllColumns {
    pub prefix: Option<QualifiedName>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasedExpression {
    pub expression: Box<Expression>,
    pub alias: String,
}

impl Expression {
    pub fn long(value: i64) -> Self {
        Expression::LongLiteral(LongLiteral { value })
    }

    pub fn double(value: f64) -> Self {
        Expression::DoubleLiteral(DoubleLiteral { value })
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expression::StringLiteral(StringLiteral {
            value: value.into(),
        })
    }

    pub fn null() -> Self {
        Expression::NullLiteral(NullLiteral)
    }

    /// Create an unresolved reference from a dotted name
    pub fn name(dotted: &str) -> Self {
        Expression::QualifiedNameReference(QualifiedNameReference {
            name: QualifiedName::parse(dotted),
        })
    }

    pub fn slot(slot: Slot) -> Self {
        Expression::SlotReference(SlotReference { slot })
    }

    pub fn arithmetic(operator: ArithmeticOperator, left: Expression, right: Expression) -> Self {
        Expression::Arithmetic(ArithmeticExpression {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn add(left: Expression, right: Expression) -> Self {
        Self::arithmetic(ArithmeticOperator::Add, left, right)
    }

    pub fn subtract(left: Expression, right: Expression) -> Self {
        Self::arithmetic(ArithmeticOperator::Subtract, left, right)
    }

    pub fn multiply(left: Expression, right: Expression) -> Self {
        Self::arithmetic(ArithmeticOperator::Multiply, left, right)
    }

    pub fn divide(left: Expression, right: Expression) -> Self {
        Self::arithmetic(ArithmeticOperator::Divide, left, right)
    }

    pub fn modulus(left: Expression, right: Expression) -> Self {
        Self::arithmetic(ArithmeticOperator::Modulus, left, right)
    }

    pub fn comparison(operator: ComparisonOperator, left: Expression, right: Expression) -> Self {
        Expression::Comparison(ComparisonExpression {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn eq(left: Expression, right: Expression) -> Self {
        Self::comparison(ComparisonOperator::Equal, left, right)
    }

    pub fn ne(left: Expression, right: Expression) -> Self {
        Self::comparison(ComparisonOperator::NotEqual, left, right)
    }

    pub fn lt(left: Expression, right: Expression) -> Self {
        Self::comparison(ComparisonOperator::LessThan, left, right)
    }

    pub fn le(left: Expression, right: Expression) -> Self {
        Self::comparison(ComparisonOperator::LessThanOrEqual, left, right)
    }

    pub fn gt(left: Expression, right: Expression) -> Self {
        Self::comparison(ComparisonOperator::GreaterThan, left, right)
    }

    pub fn ge(left: Expression, right: Expression) -> Self {
        Self::comparison(ComparisonOperator::GreaterThanOrEqual, left, right)
    }

    pub fn logical(operator: LogicalOperator, left: Expression, right: Expression) -> Self {
        Expression::LogicalBinary(LogicalBinaryExpression {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Self::logical(LogicalOperator::And, left, right)
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Self::logical(LogicalOperator::Or, left, right)
    }

    pub fn not(value: Expression) -> Self {
        Expression::Not(NotExpression {
            value: Box::new(value),
        })
    }

    pub fn is_null(value: Expression) -> Self {
        Expression::IsNull(IsNullPredicate {
            value: Box::new(value),
        })
    }

    pub fn is_not_null(value: Expression) -> Self {
        Expression::IsNotNull(IsNotNullPredicate {
            value: Box::new(value),
        })
    }

    pub fn null_if(first: Expression, second: Expression) -> Self {
        Expression::NullIf(NullIfExpression {
            first: Box::new(first),
            second: Box::new(second),
        })
    }

    pub fn coalesce(operands: Vec<Expression>) -> Self {
        Expression::Coalesce(CoalesceExpression { operands })
    }

    pub fn function_call(name: &str, arguments: Vec<Expression>) -> Self {
        Expression::FunctionCall(FunctionCall {
            name: QualifiedName::parse(name),
            arguments,
        })
    }

    pub fn like(value: Expression, pattern: Expression) -> Self {
        Expression::Like(LikePredicate {
            value: Box::new(value),
            pattern: Box::new(pattern),
            escape: None,
        })
    }

    pub fn in_list(value: Expression, value_list: Vec<Expression>) -> Self {
        Expression::In(InPredicate {
            value: Box::new(value),
            value_list,
        })
    }

    pub fn aliased(expression: Expression, alias: impl Into<String>) -> Self {
        Expression::Aliased(AliasedExpression {
            expression: Box::new(expression),
            alias: alias.into(),
        })
    }

    /// Direct expression children in evaluation order. Subqueries are
    /// opaque: their inner query is not an expression child.
    pub fn children(&self) -> Vec<&Expression> {
        self.as_node_ref().children()
    }
}

impl Query {
    /// `SELECT <items> FROM <table>` with no other clauses
    pub fn simple(select_items: Vec<Expression>, table: &str) -> Self {
        Self {
            select: Select {
                distinct: false,
                select_items,
            },
            from: vec![Relation::Table(Table {
                name: QualifiedName::parse(table),
            })],
            where_clause: None,
            group_by: vec![],
            having: None,
            limit: None,
        }
    }
}
