//! Expected-value evaluation.
//!
//! Evaluation is structural recursion with no side effects. A node whose
//! value cannot be predicted (an unbound column, an integer overflow the
//! engine would reject, a type the operator does not accept) evaluates to
//! `None`, and so does every ancestor of that node.

use std::cmp::Ordering;

use pivotsql_types::{Constant, DataType, RowValue};

use crate::ast::{BinaryOperator, ColumnValue, Expression, Function, PostfixOperator, UnaryOperator};

impl Expression {
    /// Expected value using the constants bound into column references.
    pub fn expected_value(&self) -> Option<Constant> {
        self.eval_with(&|c: &ColumnValue| c.value.clone())
    }

    /// Expected value with every column re-bound from `row`.
    pub fn evaluate(&self, row: &RowValue) -> Option<Constant> {
        self.eval_with(&|c: &ColumnValue| row.get(&c.column).cloned())
    }

    fn eval_with<F>(&self, lookup: &F) -> Option<Constant>
    where
        F: Fn(&ColumnValue) -> Option<Constant>,
    {
        match self {
            Expression::ColumnValue(c) => lookup(c),
            Expression::Literal { value, .. } => Some(value.clone()),
            Expression::Unary { op, operand } => eval_unary(*op, &operand.eval_with(lookup)?),
            Expression::Binary { op, left, right } => {
                let left = left.eval_with(lookup)?;
                let right = right.eval_with(lookup)?;
                eval_binary(*op, &left, &right)
            }
            Expression::Postfix { op, operand } => eval_postfix(*op, &operand.eval_with(lookup)?),
            Expression::InList {
                operand,
                list,
                negated,
            } => {
                let probe = operand.eval_with(lookup)?;
                let candidates = list
                    .iter()
                    .map(|e| e.eval_with(lookup))
                    .collect::<Option<Vec<_>>>()?;
                eval_in_list(&probe, &candidates, *negated)
            }
            Expression::Between {
                operand,
                low,
                high,
                negated,
            } => {
                let value = operand.eval_with(lookup)?;
                let above = eval_binary(
                    BinaryOperator::GreaterThanOrEqual,
                    &value,
                    &low.eval_with(lookup)?,
                )?;
                let below = eval_binary(
                    BinaryOperator::LessThanOrEqual,
                    &value,
                    &high.eval_with(lookup)?,
                )?;
                let within = above.and(&below)?;
                if *negated { within.not() } else { Some(within) }
            }
            Expression::Cast { operand, target } => operand.eval_with(lookup)?.cast(*target),
            Expression::Function { func, args } => {
                let args = args
                    .iter()
                    .map(|e| e.eval_with(lookup))
                    .collect::<Option<Vec<_>>>()?;
                eval_function(*func, &args)
            }
        }
    }
}

fn eval_unary(op: UnaryOperator, value: &Constant) -> Option<Constant> {
    match (op, value) {
        (UnaryOperator::Not, _) => value.not(),
        (UnaryOperator::Minus | UnaryOperator::Plus, Constant::Null) => Some(Constant::Null),
        (UnaryOperator::Minus, Constant::Integer(v)) => v.checked_neg().map(Constant::Integer),
        (UnaryOperator::Plus, Constant::Integer(v)) => Some(Constant::Integer(*v)),
        _ => None,
    }
}

fn eval_binary(op: BinaryOperator, left: &Constant, right: &Constant) -> Option<Constant> {
    match op {
        BinaryOperator::Equals => left.equals(right),
        BinaryOperator::NotEquals => left.compare_with(right, Ordering::is_ne),
        BinaryOperator::LessThan => left.compare_with(right, Ordering::is_lt),
        BinaryOperator::LessThanOrEqual => left.compare_with(right, Ordering::is_le),
        BinaryOperator::GreaterThan => left.compare_with(right, Ordering::is_gt),
        BinaryOperator::GreaterThanOrEqual => left.compare_with(right, Ordering::is_ge),
        BinaryOperator::And => left.and(right),
        BinaryOperator::Or => left.or(right),
        BinaryOperator::Add | BinaryOperator::Subtract | BinaryOperator::Multiply => {
            match (left, right) {
                (Constant::Null, Constant::Null | Constant::Integer(_))
                | (Constant::Integer(_), Constant::Null) => Some(Constant::Null),
                (Constant::Integer(a), Constant::Integer(b)) => {
                    let result = match op {
                        BinaryOperator::Add => a.checked_add(*b),
                        BinaryOperator::Subtract => a.checked_sub(*b),
                        _ => a.checked_mul(*b),
                    };
                    result.map(Constant::Integer)
                }
                _ => None,
            }
        }
        BinaryOperator::Concat => match (left, right) {
            (Constant::Null, Constant::Null | Constant::Text(_))
            | (Constant::Text(_), Constant::Null) => Some(Constant::Null),
            (Constant::Text(a), Constant::Text(b)) => Some(Constant::Text(format!("{a}{b}"))),
            _ => None,
        },
    }
}

fn eval_postfix(op: PostfixOperator, value: &Constant) -> Option<Constant> {
    let result = match op {
        PostfixOperator::IsNull => value.is_null(),
        PostfixOperator::IsNotNull => !value.is_null(),
        truth_test => {
            if !value.is_null() && value.data_type() != Some(DataType::Boolean) {
                return None;
            }
            let b = value.as_boolean();
            match truth_test {
                PostfixOperator::IsTrue => b == Some(true),
                PostfixOperator::IsFalse => b == Some(false),
                PostfixOperator::IsNotTrue => b != Some(true),
                _ => b != Some(false),
            }
        }
    };
    Some(Constant::Boolean(result))
}

/// `probe [NOT] IN (candidates)` under SQL NULL semantics.
///
/// A NULL probe yields NULL. A non-NULL candidate equal to the probe decides
/// the result immediately. Otherwise the result is NULL when any candidate
/// was NULL, and "not found" when none was.
fn eval_in_list(probe: &Constant, candidates: &[Constant], negated: bool) -> Option<Constant> {
    if probe.is_null() {
        return Some(Constant::Null);
    }
    let found = !negated;
    let mut saw_null = false;
    for candidate in candidates {
        if candidate.is_null() {
            saw_null = true;
            continue;
        }
        if candidate.equals(probe)?.as_boolean() == Some(true) {
            return Some(Constant::Boolean(found));
        }
    }
    if saw_null {
        Some(Constant::Null)
    } else {
        Some(Constant::Boolean(!found))
    }
}

fn eval_function(func: Function, args: &[Constant]) -> Option<Constant> {
    let [arg] = args else {
        return None;
    };
    match (func, arg) {
        (_, Constant::Null) => Some(Constant::Null),
        (Function::Abs, Constant::Integer(v)) => v.checked_abs().map(Constant::Integer),
        (Function::Length, Constant::Text(s)) => {
            i64::try_from(s.chars().count()).ok().map(Constant::Integer)
        }
        (Function::Lower, Constant::Text(s)) => Some(Constant::Text(s.to_lowercase())),
        (Function::Upper, Constant::Text(s)) => Some(Constant::Text(s.to_uppercase())),
        _ => None,
    }
}
