//! Random expression generation with statically-known expected values.
//!
//! When a pivot row is bound, every node is evaluated as soon as it is
//! built and generation gives up on the first node whose value is unknown,
//! instead of discovering an unevaluable tree after it is complete.

use pivotsql_types::{Column, Constant, DataType, RowValue};
use tracing::trace;

use crate::ast::{BinaryOperator, Expression, Function, PostfixOperator, UnaryOperator};
use crate::error::GenerationError;
use crate::rng::Randomness;
use crate::select::{Direction, OrderingTerm};

/// Default maximum depth of generated trees.
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Default number of attempts before giving up on a predicate.
pub const DEFAULT_MAX_RETRIES: usize = 100;

const EDGE_INTEGERS: [i64; 6] = [
    0,
    1,
    -1,
    2_147_483_647,
    -2_147_483_648,
    9_223_372_036_854_775_807,
];

/// ASCII only, so case mapping and length agree across engines.
const TEXT_ALPHABET: &[u8] = b"abcxyzABCXYZ019 '%_-";

const MAX_TEXT_LENGTH: usize = 6;
const MAX_IN_LIST: usize = 4;

/// Builds random expression trees over a column set.
pub struct ExpressionGenerator<'a, R: Randomness> {
    rng: &'a mut R,
    columns: Vec<Column>,
    row: Option<&'a RowValue>,
    max_depth: usize,
    max_retries: usize,
}

impl<'a, R: Randomness> ExpressionGenerator<'a, R> {
    pub fn new(rng: &'a mut R) -> Self {
        Self {
            rng,
            columns: Vec::new(),
            row: None,
            max_depth: DEFAULT_MAX_DEPTH,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Columns that leaves may reference.
    #[must_use]
    pub fn with_columns(mut self, columns: &[Column]) -> Self {
        self.columns = columns.to_vec();
        self
    }

    /// Binds the pivot row; column references carry its values.
    #[must_use]
    pub fn with_row(mut self, row: &'a RowValue) -> Self {
        self.row = Some(row);
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Generates one tree of `data_type`.
    ///
    /// Returns `None` when a row is bound and some node's value could not be
    /// predicted.
    pub fn generate_expression(&mut self, data_type: DataType) -> Option<Expression> {
        self.node(data_type, self.max_depth)
    }

    /// Generates a tree of `data_type` whose expected value is known.
    pub fn generate_expression_with_expected_result(
        &mut self,
        data_type: DataType,
    ) -> Result<Expression, GenerationError> {
        let attempts = self.max_retries.max(1);
        for attempt in 0..attempts {
            match self.generate_expression(data_type) {
                Some(expr) if expr.expected_value().is_some() => return Ok(expr),
                _ => trace!(attempt, %data_type, "discarding expression with unknown value"),
            }
        }
        Err(GenerationError::RetriesExhausted {
            data_type,
            attempts,
        })
    }

    /// Ordering terms over the columns: plain references or expressions
    /// that mention at least one column.
    pub fn generate_order_bys(&mut self) -> Vec<OrderingTerm> {
        self.order_bys(false)
    }

    /// Ordering terms made only of plain column references.
    pub fn generate_column_order_bys(&mut self) -> Vec<OrderingTerm> {
        self.order_bys(true)
    }

    fn order_bys(&mut self, columns_only: bool) -> Vec<OrderingTerm> {
        if self.columns.is_empty() {
            return Vec::new();
        }
        let count = 1 + self.rng.next_usize(self.columns.len().min(3));
        let mut terms = Vec::with_capacity(count);
        for _ in 0..count {
            let expr = if !columns_only && self.rng.next_bool() {
                let data_type = self.any_type();
                match self.node(data_type, self.max_depth) {
                    Some(expr) if expr.references_columns() => expr,
                    _ => self.column_reference(),
                }
            } else {
                self.column_reference()
            };
            let direction = if self.rng.next_bool() {
                Direction::Ascending
            } else {
                Direction::Descending
            };
            terms.push(OrderingTerm { expr, direction });
        }
        terms
    }

    fn node(&mut self, data_type: DataType, depth: usize) -> Option<Expression> {
        if depth == 0 || self.rng.next_usize(4) == 0 {
            return self.leaf(data_type);
        }
        let depth = depth - 1;
        let expr = match data_type {
            DataType::Boolean => self.boolean_node(depth)?,
            DataType::Integer => self.integer_node(depth)?,
            DataType::Text => self.text_node(depth)?,
        };
        self.known(expr)
    }

    fn leaf(&mut self, data_type: DataType) -> Option<Expression> {
        let candidates: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.data_type() == data_type)
            .map(|(i, _)| i)
            .collect();
        if !candidates.is_empty() && self.rng.next_bool() {
            let index = candidates[self.rng.next_usize(candidates.len())];
            let column = self.columns[index].clone();
            let value = self.row.and_then(|row| row.get(&column).cloned());
            return self.known(Expression::column(column, value));
        }
        Some(Expression::literal(
            generate_constant(self.rng, data_type),
            data_type,
        ))
    }

    fn boolean_node(&mut self, depth: usize) -> Option<Expression> {
        Some(match self.rng.next_usize(7) {
            0 => Expression::unary(UnaryOperator::Not, self.node(DataType::Boolean, depth)?),
            1 => {
                let operand_type = self.any_type();
                let op = *self.rng.choose(&BinaryOperator::COMPARISONS)?;
                Expression::binary(
                    op,
                    self.node(operand_type, depth)?,
                    self.node(operand_type, depth)?,
                )
            }
            2 => {
                let op = if self.rng.next_bool() {
                    BinaryOperator::And
                } else {
                    BinaryOperator::Or
                };
                Expression::binary(
                    op,
                    self.node(DataType::Boolean, depth)?,
                    self.node(DataType::Boolean, depth)?,
                )
            }
            3 => {
                let operand_type = self.any_type();
                let ops: Vec<PostfixOperator> = PostfixOperator::ALL
                    .into_iter()
                    .filter(|op| op.accepts(operand_type))
                    .collect();
                let op = *self.rng.choose(&ops)?;
                Expression::postfix(op, self.node(operand_type, depth)?)
            }
            4 => {
                let operand_type = self.any_type();
                let operand = self.node(operand_type, depth)?;
                let len = 1 + self.rng.next_usize(MAX_IN_LIST);
                let mut list = Vec::with_capacity(len);
                for _ in 0..len {
                    list.push(self.node(operand_type, depth)?);
                }
                Expression::in_list(operand, list, self.rng.next_bool())
            }
            5 => {
                let operand_type = self.any_type();
                Expression::between(
                    self.node(operand_type, depth)?,
                    self.node(operand_type, depth)?,
                    self.node(operand_type, depth)?,
                    self.rng.next_bool(),
                )
            }
            _ => Expression::cast(self.node(DataType::Integer, depth)?, DataType::Boolean),
        })
    }

    fn integer_node(&mut self, depth: usize) -> Option<Expression> {
        Some(match self.rng.next_usize(5) {
            0 => {
                let op = if self.rng.next_bool() {
                    UnaryOperator::Minus
                } else {
                    UnaryOperator::Plus
                };
                Expression::unary(op, self.node(DataType::Integer, depth)?)
            }
            1 => {
                let op = *self.rng.choose(&BinaryOperator::ARITHMETIC)?;
                Expression::binary(
                    op,
                    self.node(DataType::Integer, depth)?,
                    self.node(DataType::Integer, depth)?,
                )
            }
            2 => Expression::cast(self.node(DataType::Boolean, depth)?, DataType::Integer),
            3 => Expression::function(Function::Abs, vec![self.node(DataType::Integer, depth)?]),
            _ => Expression::function(Function::Length, vec![self.node(DataType::Text, depth)?]),
        })
    }

    fn text_node(&mut self, depth: usize) -> Option<Expression> {
        Some(match self.rng.next_usize(3) {
            0 => Expression::binary(
                BinaryOperator::Concat,
                self.node(DataType::Text, depth)?,
                self.node(DataType::Text, depth)?,
            ),
            1 => {
                let func = if self.rng.next_bool() {
                    Function::Lower
                } else {
                    Function::Upper
                };
                Expression::function(func, vec![self.node(DataType::Text, depth)?])
            }
            _ => {
                let source = if self.rng.next_bool() {
                    DataType::Integer
                } else {
                    DataType::Boolean
                };
                Expression::cast(self.node(source, depth)?, DataType::Text)
            }
        })
    }

    fn column_reference(&mut self) -> Expression {
        let column = self.columns[self.rng.next_usize(self.columns.len())].clone();
        let value = self.row.and_then(|row| row.get(&column).cloned());
        Expression::column(column, value)
    }

    fn any_type(&mut self) -> DataType {
        DataType::ALL[self.rng.next_usize(DataType::ALL.len())]
    }

    /// Fails fast on an unknown value, but only when a row is bound.
    fn known(&self, expr: Expression) -> Option<Expression> {
        if self.row.is_some() && expr.expected_value().is_none() {
            None
        } else {
            Some(expr)
        }
    }
}

/// A random constant of `data_type`; NULL about one time in ten.
pub fn generate_constant<R: Randomness>(rng: &mut R, data_type: DataType) -> Constant {
    if rng.next_usize(10) == 0 {
        return Constant::Null;
    }
    match data_type {
        DataType::Boolean => Constant::Boolean(rng.next_bool()),
        DataType::Integer => Constant::Integer(match rng.next_usize(4) {
            0 => EDGE_INTEGERS[rng.next_usize(EDGE_INTEGERS.len())],
            1 | 2 => rng.next_i64_range(-100, 100),
            _ => rng.next_i64_range(-100_000, 100_000),
        }),
        DataType::Text => {
            let len = rng.next_usize(MAX_TEXT_LENGTH + 1);
            let text = (0..len)
                .map(|_| char::from(TEXT_ALPHABET[rng.next_usize(TEXT_ALPHABET.len())]))
                .collect();
            Constant::Text(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{ScriptedRng, SeededRng};

    fn table() -> (Vec<Column>, RowValue) {
        let columns = vec![
            Column::new("t0", "c0", DataType::Integer),
            Column::new("t0", "c1", DataType::Text),
            Column::new("t0", "c2", DataType::Boolean),
        ];
        let row = RowValue::from_columns(
            &columns,
            vec![Constant::Integer(1), Constant::Null, Constant::Boolean(true)],
        )
        .unwrap();
        (columns, row)
    }

    #[test]
    fn scripted_draws_pin_the_shape() {
        let (columns, row) = table();
        // no early stop, comparison, integer operands, `=`, column, literal 1
        let mut rng = ScriptedRng::new(vec![1, 1, 1, 0, 1, 0, 0, 5, 1, 101]);
        let expr = ExpressionGenerator::new(&mut rng)
            .with_columns(&columns)
            .with_row(&row)
            .with_max_depth(1)
            .generate_expression(DataType::Boolean)
            .unwrap();

        let expected = Expression::binary(
            BinaryOperator::Equals,
            Expression::column(columns[0].clone(), Some(Constant::Integer(1))),
            Expression::literal(Constant::Integer(1), DataType::Integer),
        );
        assert_eq!(expr, expected);
        assert_eq!(expr.expected_value(), Some(Constant::Boolean(true)));
        assert_eq!(rng.consumed(), 10);
    }

    #[test]
    fn generated_trees_have_requested_type() {
        let (columns, row) = table();
        let mut rng = SeededRng::new(3);
        for data_type in DataType::ALL {
            for _ in 0..200 {
                let expr = ExpressionGenerator::new(&mut rng)
                    .with_columns(&columns)
                    .with_row(&row)
                    .generate_expression_with_expected_result(data_type)
                    .unwrap();
                assert_eq!(expr.data_type(), data_type);
                assert!(expr.expected_value().is_some());
            }
        }
    }

    #[test]
    fn column_values_come_from_the_bound_row() {
        let (columns, row) = table();
        let mut rng = SeededRng::new(11);
        for _ in 0..100 {
            let expr = ExpressionGenerator::new(&mut rng)
                .with_columns(&columns)
                .with_row(&row)
                .generate_expression_with_expected_result(DataType::Boolean)
                .unwrap();
            assert_eq!(expr.expected_value(), expr.evaluate(&row));
        }
    }

    #[test]
    fn unbound_columns_exhaust_retries() {
        let columns = vec![Column::new("t0", "c0", DataType::Boolean)];
        // always pick the column leaf at depth 0
        let mut rng = ScriptedRng::new(vec![1]);
        let err = ExpressionGenerator::new(&mut rng)
            .with_columns(&columns)
            .with_max_depth(0)
            .with_max_retries(5)
            .generate_expression_with_expected_result(DataType::Boolean)
            .unwrap_err();
        assert_eq!(
            err,
            GenerationError::RetriesExhausted {
                data_type: DataType::Boolean,
                attempts: 5
            }
        );
    }

    #[test]
    fn order_bys_reference_columns() {
        let (columns, _) = table();
        let mut rng = SeededRng::new(5);
        let mut generator = ExpressionGenerator::new(&mut rng).with_columns(&columns);
        for _ in 0..100 {
            let terms = generator.generate_order_bys();
            assert!(!terms.is_empty() && terms.len() <= 3);
            assert!(terms.iter().all(|t| t.expr.references_columns()));

            let terms = generator.generate_column_order_bys();
            assert!(terms.iter().all(|t| matches!(t.expr, Expression::ColumnValue(_))));
        }
    }

    #[test]
    fn order_bys_need_columns() {
        let mut rng = SeededRng::new(5);
        assert!(ExpressionGenerator::new(&mut rng).generate_order_bys().is_empty());
    }

    #[test]
    fn constants_are_ascii() {
        let mut rng = SeededRng::new(9);
        for _ in 0..500 {
            if let Constant::Text(s) = generate_constant(&mut rng, DataType::Text) {
                assert!(s.is_ascii());
                assert!(s.len() <= MAX_TEXT_LENGTH);
            }
        }
    }
}
