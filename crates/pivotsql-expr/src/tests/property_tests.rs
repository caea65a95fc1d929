//! Property-based tests using proptest.
//!
//! Membership law, rectification guarantees and evaluation idempotence over
//! generated rows and generated expressions.

use pivotsql_types::{Column, Constant, DataType, RowValue};
use proptest::prelude::*;

use crate::{Expression, ExpressionGenerator, Rectifier, RectifyPolicy, SeededRng};

fn integer() -> impl Strategy<Value = Constant> {
    prop_oneof![
        1 => Just(Constant::Null),
        4 => (-5i64..5).prop_map(Constant::Integer),
    ]
}

fn boolean() -> impl Strategy<Value = Constant> {
    prop_oneof![
        1 => Just(Constant::Null),
        4 => any::<bool>().prop_map(Constant::Boolean),
    ]
}

fn text() -> impl Strategy<Value = Constant> {
    prop_oneof![
        1 => Just(Constant::Null),
        4 => "[a-c]{0,3}".prop_map(Constant::Text),
    ]
}

fn columns() -> Vec<Column> {
    vec![
        Column::new("t0", "c0", DataType::Integer),
        Column::new("t0", "c1", DataType::Boolean),
        Column::new("t1", "c0", DataType::Text),
        Column::new("t1", "c1", DataType::Integer),
    ]
}

fn row() -> impl Strategy<Value = RowValue> {
    (integer(), boolean(), text(), integer()).prop_map(|(a, b, c, d)| {
        RowValue::from_columns(&columns(), vec![a, b, c, d]).unwrap()
    })
}

fn literal(value: &Constant) -> Expression {
    Expression::literal(value.clone(), DataType::Integer)
}

/// Reference statement of the three-valued membership law.
fn membership(probe: &Constant, list: &[Constant]) -> Constant {
    if probe.is_null() {
        return Constant::Null;
    }
    if list.iter().any(|c| c == probe) {
        return Constant::Boolean(true);
    }
    if list.iter().any(Constant::is_null) {
        Constant::Null
    } else {
        Constant::Boolean(false)
    }
}

fn generate(seed: u64, row: &RowValue) -> Option<Expression> {
    let columns = columns();
    let mut rng = SeededRng::new(seed);
    ExpressionGenerator::new(&mut rng)
        .with_columns(&columns)
        .with_row(row)
        .generate_expression_with_expected_result(DataType::Boolean)
        .ok()
}

proptest! {
    // ========================================================================
    // IN / NOT IN
    // ========================================================================

    #[test]
    fn in_list_follows_membership_law(
        probe in integer(),
        list in prop::collection::vec(integer(), 1..6),
    ) {
        let items: Vec<Expression> = list.iter().map(literal).collect();
        let expected = membership(&probe, &list);

        let positive = Expression::in_list(literal(&probe), items.clone(), false);
        prop_assert_eq!(positive.expected_value(), Some(expected.clone()));

        let negative = Expression::in_list(literal(&probe), items, true);
        prop_assert_eq!(negative.expected_value(), expected.not());
    }

    // ========================================================================
    // Rectification
    // ========================================================================

    #[test]
    fn included_predicates_are_true(seed: u64, row in row()) {
        if let Some(predicate) = generate(seed, &row) {
            let rectified = Rectifier::new(RectifyPolicy::Include).rectify(predicate).unwrap();
            prop_assert_eq!(rectified.evaluate(&row), Some(Constant::Boolean(true)));
        }
    }

    #[test]
    fn excluded_predicates_are_never_true(seed: u64, row in row()) {
        if let Some(predicate) = generate(seed, &row) {
            let rectified = Rectifier::new(RectifyPolicy::Exclude).rectify(predicate).unwrap();
            let value = rectified.evaluate(&row);
            prop_assert!(value.is_some());
            prop_assert_ne!(value, Some(Constant::Boolean(true)));
        }
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    #[test]
    fn evaluation_is_idempotent(seed: u64, row in row()) {
        if let Some(expr) = generate(seed, &row) {
            let first = expr.evaluate(&row);
            prop_assert_eq!(&first, &expr.evaluate(&row));
            prop_assert_eq!(&first, &expr.expected_value());
            prop_assert_eq!(expr.expected_value(), expr.expected_value());
        }
    }
}
