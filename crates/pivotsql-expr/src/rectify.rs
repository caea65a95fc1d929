//! Rectification: wrapping a predicate in a truth test so that it is TRUE
//! (or never TRUE) for the pivot row.

use pivotsql_types::{Constant, DataType};
use serde::{Deserialize, Serialize};

use crate::ast::{Expression, PostfixOperator};
use crate::error::RectifyError;

/// Whether rectified predicates must select or reject the pivot row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RectifyPolicy {
    /// Rectified predicate evaluates to TRUE on the pivot row.
    #[default]
    Include,
    /// Rectified predicate never evaluates to TRUE on the pivot row.
    Exclude,
}

/// Truth test that rectifies a predicate whose expected value is `value`.
///
/// | expected | include    | exclude    |
/// |----------|------------|------------|
/// | TRUE     | `IS TRUE`  | `IS FALSE` |
/// | FALSE    | `IS FALSE` | `IS TRUE`  |
/// | NULL     | `IS NULL`  | `IS FALSE` |
pub fn truth_test(policy: RectifyPolicy, value: &Constant) -> Result<PostfixOperator, RectifyError> {
    let op = match (policy, value) {
        (RectifyPolicy::Include, Constant::Boolean(true))
        | (RectifyPolicy::Exclude, Constant::Boolean(false)) => PostfixOperator::IsTrue,
        (RectifyPolicy::Include, Constant::Boolean(false))
        | (RectifyPolicy::Exclude, Constant::Boolean(true) | Constant::Null) => {
            PostfixOperator::IsFalse
        }
        (RectifyPolicy::Include, Constant::Null) => PostfixOperator::IsNull,
        (_, other) => return Err(RectifyError::NotTruthValue(other.clone())),
    };
    Ok(op)
}

/// Rectifies predicates under one policy and keeps a log of the results.
#[derive(Debug, Clone, Default)]
pub struct Rectifier {
    policy: RectifyPolicy,
    predicates: Vec<Expression>,
}

impl Rectifier {
    pub fn new(policy: RectifyPolicy) -> Self {
        Self {
            policy,
            predicates: Vec::new(),
        }
    }

    pub fn policy(&self) -> RectifyPolicy {
        self.policy
    }

    /// Wraps `predicate` in the truth test matching its expected value.
    ///
    /// # Errors
    ///
    /// Fails when the predicate is not boolean or its value is unknown.
    pub fn rectify(&mut self, predicate: Expression) -> Result<Expression, RectifyError> {
        let data_type = predicate.data_type();
        if data_type != DataType::Boolean {
            return Err(RectifyError::NotBoolean(data_type));
        }
        let value = predicate.expected_value().ok_or(RectifyError::UnknownValue)?;
        let op = truth_test(self.policy, &value)?;
        let rectified = Expression::postfix(op, predicate);
        self.predicates.push(rectified.clone());
        Ok(rectified)
    }

    /// Every predicate rectified so far, in order.
    pub fn rectified_predicates(&self) -> &[Expression] {
        &self.predicates
    }

    pub fn into_predicates(self) -> Vec<Expression> {
        self.predicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOperator;
    use pivotsql_types::Column;
    use test_case::test_case;

    #[test_case(RectifyPolicy::Include, Constant::Boolean(true), PostfixOperator::IsTrue)]
    #[test_case(RectifyPolicy::Include, Constant::Boolean(false), PostfixOperator::IsFalse)]
    #[test_case(RectifyPolicy::Include, Constant::Null, PostfixOperator::IsNull)]
    #[test_case(RectifyPolicy::Exclude, Constant::Boolean(true), PostfixOperator::IsFalse)]
    #[test_case(RectifyPolicy::Exclude, Constant::Boolean(false), PostfixOperator::IsTrue)]
    #[test_case(RectifyPolicy::Exclude, Constant::Null, PostfixOperator::IsFalse)]
    fn truth_test_mapping(policy: RectifyPolicy, value: Constant, expected: PostfixOperator) {
        assert_eq!(truth_test(policy, &value), Ok(expected));
    }

    #[test]
    fn truth_test_rejects_non_boolean() {
        assert_eq!(
            truth_test(RectifyPolicy::Include, &Constant::Integer(1)),
            Err(RectifyError::NotTruthValue(Constant::Integer(1)))
        );
    }

    #[test]
    fn rectify_logs_predicates() {
        let mut rectifier = Rectifier::new(RectifyPolicy::Include);
        let column = Column::new("t0", "c0", DataType::Integer);
        let predicate = Expression::binary(
            BinaryOperator::LessThan,
            Expression::column(column, Some(Constant::Integer(5))),
            Expression::literal(Constant::Integer(3), DataType::Integer),
        );
        let rectified = rectifier.rectify(predicate.clone()).unwrap();

        assert_eq!(rectified, Expression::postfix(PostfixOperator::IsFalse, predicate));
        assert_eq!(rectified.expected_value(), Some(Constant::Boolean(true)));
        assert_eq!(rectifier.rectified_predicates(), &[rectified]);
    }

    #[test]
    fn rectify_rejects_unknown_and_non_boolean() {
        let mut rectifier = Rectifier::new(RectifyPolicy::Exclude);
        let unbound = Expression::column(Column::new("t0", "c0", DataType::Boolean), None);
        assert_eq!(rectifier.rectify(unbound), Err(RectifyError::UnknownValue));

        let integer = Expression::literal(Constant::Integer(1), DataType::Integer);
        assert_eq!(
            rectifier.rectify(integer),
            Err(RectifyError::NotBoolean(DataType::Integer))
        );
        assert!(rectifier.into_predicates().is_empty());
    }
}
