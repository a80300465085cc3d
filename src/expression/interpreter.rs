//! Expression interpreter.
//!
//! Evaluates a resolved expression tree against one row of channel readers,
//! following SQL three-valued logic. The interpreter only holds the
//! slot-to-channel mapping, so one instance can evaluate rows from many
//! threads at once.

use crate::access::{DataType, TupleReadable, Value};
use crate::expression::{
    ArithmeticOperator, ComparisonOperator, ExpressionError, ExpressionResult, LogicalOperator,
};
use crate::planner::Slot;
use crate::sql::ast::*;
use crate::sql::{AstVisitor, NodeRef};
use std::collections::HashMap;

/// Every channel carries a single scalar field today
const FIELD: usize = 0;

/// Evaluator for resolved expressions
#[derive(Debug, Clone)]
pub struct ExpressionInterpreter {
    slot_to_channel: HashMap<Slot, usize>,
}

impl ExpressionInterpreter {
    pub fn new(slot_to_channel: HashMap<Slot, usize>) -> Self {
        log::debug!(
            "Created expression interpreter over {} slots",
            slot_to_channel.len()
        );
        Self { slot_to_channel }
    }

    /// Evaluate an expression and return the result
    pub fn evaluate<T: TupleReadable>(
        &self,
        expression: &Expression,
        row: &[T],
    ) -> ExpressionResult<Value> {
        self.process_expression(expression, row)
    }

    /// Evaluate a filter: `NULL` rejects the row like `false` does
    pub fn evaluate_predicate<T: TupleReadable>(
        &self,
        expression: &Expression,
        row: &[T],
    ) -> ExpressionResult<bool> {
        match self.evaluate(expression, row)? {
            Value::Boolean(b) => Ok(b),
            Value::Null => Ok(false),
            other => Err(type_mismatch("FILTER", &[&other])),
        }
    }

    pub fn channel(&self, slot: &Slot) -> Option<usize> {
        self.slot_to_channel.get(slot).copied()
    }
}

fn type_mismatch(operation: &str, operands: &[&Value]) -> ExpressionError {
    ExpressionError::TypeMismatch {
        operation: operation.to_string(),
        operand_types: operands.iter().map(|value| value.type_name()).collect(),
    }
}

/// Boolean view of a logical operand; `None` stands for NULL
fn as_boolean(value: &Value, operation: &str) -> ExpressionResult<Option<bool>> {
    match value {
        Value::Null => Ok(None),
        Value::Boolean(b) => Ok(Some(*b)),
        other => Err(type_mismatch(operation, &[other])),
    }
}

fn arithmetic(operator: ArithmeticOperator, left: &Value, right: &Value) -> ExpressionResult<Value> {
    match (left, right) {
        (Value::Long(a), Value::Long(b)) => {
            let (a, b) = (*a, *b);
            let result = match operator {
                ArithmeticOperator::Add => a.wrapping_add(b),
                ArithmeticOperator::Subtract => a.wrapping_sub(b),
                ArithmeticOperator::Multiply => a.wrapping_mul(b),
                ArithmeticOperator::Divide => {
                    if b == 0 {
                        return Err(ExpressionError::DivisionByZero);
                    }
                    a.wrapping_div(b)
                }
                ArithmeticOperator::Modulus => {
                    if b == 0 {
                        return Err(ExpressionError::DivisionByZero);
                    }
                    a.wrapping_rem(b)
                }
            };
            Ok(Value::Long(result))
        }
        _ => match (left.as_f64(), right.as_f64()) {
            (Some(a), Some(b)) => {
                let result = match operator {
                    ArithmeticOperator::Add => a + b,
                    ArithmeticOperator::Subtract => a - b,
                    ArithmeticOperator::Multiply => a * b,
                    ArithmeticOperator::Divide => a / b,
                    ArithmeticOperator::Modulus => a % b,
                };
                Ok(Value::Double(result))
            }
            _ => Err(type_mismatch(operator.name(), &[left, right])),
        },
    }
}

/// Compare two non-null values. Numbers are compared as doubles, even when
/// both are integers; byte strings compare lexicographically by byte.
fn compare(operator: ComparisonOperator, left: &Value, right: &Value) -> ExpressionResult<bool> {
    if let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) {
        return Ok(operator.compare_f64(a, b));
    }
    match (left, right) {
        (Value::Bytes(a), Value::Bytes(b)) => Ok(operator.matches(a.as_ref().cmp(b.as_ref()))),
        _ => Err(type_mismatch(operator.name(), &[left, right])),
    }
}

impl<T: TupleReadable> AstVisitor<[T]> for ExpressionInterpreter {
    type Output = Value;
    type Error = ExpressionError;

    fn visit_slot_reference(&self, node: &SlotReference, row: &[T]) -> ExpressionResult<Value> {
        let slot = &node.slot;
        let channel = self
            .channel(slot)
            .ok_or_else(|| ExpressionError::UnresolvedSlot { slot: slot.clone() })?;
        let input = row
            .get(channel)
            .ok_or_else(|| ExpressionError::ContractViolation {
                message: format!(
                    "channel {} of slot {} is out of bounds for a row with {} channels",
                    channel,
                    slot,
                    row.len()
                ),
            })?;

        if input.is_null(FIELD) {
            return Ok(Value::Null);
        }

        match slot.data_type {
            DataType::Long => Ok(Value::Long(input.get_long(FIELD))),
            DataType::Double => Ok(Value::Double(input.get_double(FIELD))),
            DataType::String => Ok(Value::Bytes(input.get_slice(FIELD))),
            data_type => Err(ExpressionError::UnsupportedType { data_type }),
        }
    }

    fn visit_qualified_name_reference(
        &self,
        node: &QualifiedNameReference,
        _row: &[T],
    ) -> ExpressionResult<Value> {
        Err(ExpressionError::ContractViolation {
            message: format!(
                "qualified name {} should have been rewritten to a slot reference",
                node.name
            ),
        })
    }

    fn visit_long_literal(&self, node: &LongLiteral, _row: &[T]) -> ExpressionResult<Value> {
        Ok(Value::Long(node.value))
    }

    fn visit_double_literal(&self, node: &DoubleLiteral, _row: &[T]) -> ExpressionResult<Value> {
        Ok(Value::Double(node.value))
    }

    fn visit_string_literal(&self, node: &StringLiteral, _row: &[T]) -> ExpressionResult<Value> {
        Ok(Value::string(&node.value))
    }

    fn visit_null_literal(&self, _node: &NullLiteral, _row: &[T]) -> ExpressionResult<Value> {
        Ok(Value::Null)
    }

    fn visit_is_null_predicate(
        &self,
        node: &IsNullPredicate,
        row: &[T],
    ) -> ExpressionResult<Value> {
        let value = self.process_expression(&node.value, row)?;
        Ok(Value::Boolean(value.is_null()))
    }

    fn visit_is_not_null_predicate(
        &self,
        node: &IsNotNullPredicate,
        row: &[T],
    ) -> ExpressionResult<Value> {
        let value = self.process_expression(&node.value, row)?;
        Ok(Value::Boolean(!value.is_null()))
    }

    fn visit_coalesce_expression(
        &self,
        node: &CoalesceExpression,
        row: &[T],
    ) -> ExpressionResult<Value> {
        for operand in &node.operands {
            let value = self.process_expression(operand, row)?;
            if !value.is_null() {
                return Ok(value);
            }
        }
        Ok(Value::Null)
    }

    fn visit_arithmetic_expression(
        &self,
        node: &ArithmeticExpression,
        row: &[T],
    ) -> ExpressionResult<Value> {
        let left = self.process_expression(&node.left, row)?;
        if left.is_null() {
            return Ok(Value::Null);
        }
        let right = self.process_expression(&node.right, row)?;
        if right.is_null() {
            return Ok(Value::Null);
        }

        arithmetic(node.operator, &left, &right)
    }

    fn visit_comparison_expression(
        &self,
        node: &ComparisonExpression,
        row: &[T],
    ) -> ExpressionResult<Value> {
        let left = self.process_expression(&node.left, row)?;
        if left.is_null() {
            return Ok(Value::Null);
        }
        let right = self.process_expression(&node.right, row)?;
        if right.is_null() {
            return Ok(Value::Null);
        }

        Ok(Value::Boolean(compare(node.operator, &left, &right)?))
    }

    fn visit_null_if_expression(
        &self,
        node: &NullIfExpression,
        row: &[T],
    ) -> ExpressionResult<Value> {
        let first = self.process_expression(&node.first, row)?;
        if first.is_null() {
            return Ok(Value::Null);
        }
        // A NULL second operand yields NULL, not `first`
        let second = self.process_expression(&node.second, row)?;
        if second.is_null() {
            return Ok(Value::Null);
        }

        let equal = match (&first, &second) {
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            _ => match (first.as_f64(), second.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => return Err(type_mismatch("NULLIF", &[&first, &second])),
            },
        };

        if equal {
            Ok(Value::Null)
        } else {
            Ok(first)
        }
    }

    fn visit_not_expression(&self, node: &NotExpression, row: &[T]) -> ExpressionResult<Value> {
        let value = self.process_expression(&node.value, row)?;
        match as_boolean(&value, "NOT")? {
            Some(b) => Ok(Value::Boolean(!b)),
            None => Ok(Value::Null),
        }
    }

    fn visit_logical_binary_expression(
        &self,
        node: &LogicalBinaryExpression,
        row: &[T],
    ) -> ExpressionResult<Value> {
        let operation = node.operator.as_str();
        // The deciding value wins regardless of NULLs: false for AND, true for OR
        let decisive = match node.operator {
            LogicalOperator::And => false,
            LogicalOperator::Or => true,
        };

        let left = as_boolean(&self.process_expression(&node.left, row)?, operation)?;
        if left == Some(decisive) {
            return Ok(Value::Boolean(decisive));
        }
        let right = as_boolean(&self.process_expression(&node.right, row)?, operation)?;
        if right == Some(decisive) {
            return Ok(Value::Boolean(decisive));
        }

        if left.is_none() || right.is_none() {
            return Ok(Value::Null);
        }
        Ok(Value::Boolean(!decisive))
    }

    fn visit_expression(&self, node: NodeRef<'_>, _row: &[T]) -> ExpressionResult<Value> {
        Err(ExpressionError::UnsupportedOperation {
            message: format!("not yet implemented: {}", node.kind()),
        })
    }

    fn visit_node(&self, node: NodeRef<'_>, _row: &[T]) -> ExpressionResult<Value> {
        Err(ExpressionError::UnsupportedOperation {
            message: format!(
                "interpreter can only handle expression nodes, got {}",
                node.kind()
            ),
        })
    }
}
