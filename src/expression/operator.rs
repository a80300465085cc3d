//! Operator definitions for expressions.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArithmeticOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulus,
}

impl ArithmeticOperator {
    /// Upper-case name used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            ArithmeticOperator::Add => "ADD",
            ArithmeticOperator::Subtract => "SUBTRACT",
            ArithmeticOperator::Multiply => "MULTIPLY",
            ArithmeticOperator::Divide => "DIVIDE",
            ArithmeticOperator::Modulus => "MODULUS",
        }
    }
}

/// Comparison operators, always producing a boolean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl ComparisonOperator {
    /// Upper-case name used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "EQUAL",
            ComparisonOperator::NotEqual => "NOT_EQUAL",
            ComparisonOperator::LessThan => "LESS_THAN",
            ComparisonOperator::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
            ComparisonOperator::GreaterThan => "GREATER_THAN",
            ComparisonOperator::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
        }
    }

    /// Whether an ordering between the operands satisfies this operator
    pub fn matches(&self, ordering: Ordering) -> bool {
        match self {
            ComparisonOperator::Equal => ordering == Ordering::Equal,
            ComparisonOperator::NotEqual => ordering != Ordering::Equal,
            ComparisonOperator::LessThan => ordering == Ordering::Less,
            ComparisonOperator::LessThanOrEqual => ordering != Ordering::Greater,
            ComparisonOperator::GreaterThan => ordering == Ordering::Greater,
            ComparisonOperator::GreaterThanOrEqual => ordering != Ordering::Less,
        }
    }

    /// Apply the operator to two doubles with IEEE semantics: every
    /// comparison involving NaN is false except `<>`.
    pub fn compare_f64(&self, left: f64, right: f64) -> bool {
        match self {
            ComparisonOperator::Equal => left == right,
            ComparisonOperator::NotEqual => left != right,
            ComparisonOperator::LessThan => left < right,
            ComparisonOperator::LessThanOrEqual => left <= right,
            ComparisonOperator::GreaterThan => left > right,
            ComparisonOperator::GreaterThanOrEqual => left >= right,
        }
    }
}

/// Logical binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_names() {
        assert_eq!(LogicalOperator::And.as_str(), "AND");
        assert_eq!(LogicalOperator::Or.as_str(), "OR");

        assert_eq!(ArithmeticOperator::Divide.name(), "DIVIDE");
        assert_eq!(ComparisonOperator::LessThanOrEqual.name(), "LESS_THAN_OR_EQUAL");
    }

    #[test]
    fn test_comparison_matches_ordering() {
        use Ordering::*;

        assert!(ComparisonOperator::Equal.matches(Equal));
        assert!(!ComparisonOperator::Equal.matches(Less));
        assert!(ComparisonOperator::NotEqual.matches(Greater));
        assert!(ComparisonOperator::LessThan.matches(Less));
        assert!(ComparisonOperator::LessThanOrEqual.matches(Equal));
        assert!(!ComparisonOperator::LessThanOrEqual.matches(Greater));
        assert!(ComparisonOperator::GreaterThan.matches(Greater));
        assert!(ComparisonOperator::GreaterThanOrEqual.matches(Equal));
        assert!(!ComparisonOperator::GreaterThanOrEqual.matches(Less));
    }

    #[test]
    fn test_compare_f64_with_nan() {
        let nan = f64::NAN;
        assert!(!ComparisonOperator::Equal.compare_f64(nan, nan));
        assert!(ComparisonOperator::NotEqual.compare_f64(nan, 1.0));
        assert!(!ComparisonOperator::LessThan.compare_f64(nan, 1.0));
        assert!(!ComparisonOperator::GreaterThanOrEqual.compare_f64(nan, 1.0));
        assert!(ComparisonOperator::LessThan.compare_f64(1.0, 2.0));
    }

    #[test]
    fn test_operator_serde_names() {
        let json = serde_json::to_string(&ComparisonOperator::LessThanOrEqual).unwrap();
        assert_eq!(json, "\"LESS_THAN_OR_EQUAL\"");
        let op: ArithmeticOperator = serde_json::from_str("\"MODULUS\"").unwrap();
        assert_eq!(op, ArithmeticOperator::Modulus);
    }
}
