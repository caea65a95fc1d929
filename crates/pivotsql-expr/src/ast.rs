//! Expression tree.
//!
//! The expression grammar is a closed enum. Every consumer (the evaluator,
//! the generator, the printer) matches it exhaustively, so adding an
//! operator means adding a variant and one arm per consumer.

use pivotsql_types::{Column, Constant, DataType};

/// A column reference, optionally bound to the pivot row's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnValue {
    pub column: Column,
    /// Value of the column in the bound row; `None` when no row is bound.
    pub value: Option<Constant>,
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Not,
    Minus,
    Plus,
}

impl UnaryOperator {
    pub fn sql(self) -> &'static str {
        match self {
            UnaryOperator::Not => "NOT",
            UnaryOperator::Minus => "-",
            UnaryOperator::Plus => "+",
        }
    }
}

/// Infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Add,
    Subtract,
    Multiply,
    And,
    Or,
    Concat,
}

impl BinaryOperator {
    pub const COMPARISONS: [BinaryOperator; 6] = [
        BinaryOperator::Equals,
        BinaryOperator::NotEquals,
        BinaryOperator::LessThan,
        BinaryOperator::LessThanOrEqual,
        BinaryOperator::GreaterThan,
        BinaryOperator::GreaterThanOrEqual,
    ];

    pub const ARITHMETIC: [BinaryOperator; 3] = [
        BinaryOperator::Add,
        BinaryOperator::Subtract,
        BinaryOperator::Multiply,
    ];

    pub fn sql(self) -> &'static str {
        match self {
            BinaryOperator::Equals => "=",
            BinaryOperator::NotEquals => "<>",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessThanOrEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterThanOrEqual => ">=",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::And => "AND",
            BinaryOperator::Or => "OR",
            BinaryOperator::Concat => "||",
        }
    }

    pub fn is_comparison(self) -> bool {
        Self::COMPARISONS.contains(&self)
    }

    /// Result type of the operator.
    pub fn result_type(self) -> DataType {
        match self {
            BinaryOperator::Add | BinaryOperator::Subtract | BinaryOperator::Multiply => {
                DataType::Integer
            }
            BinaryOperator::Concat => DataType::Text,
            _ => DataType::Boolean,
        }
    }
}

/// Truth-test and null-test postfix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostfixOperator {
    IsTrue,
    IsFalse,
    IsNull,
    IsNotNull,
    IsNotTrue,
    IsNotFalse,
}

impl PostfixOperator {
    pub const ALL: [PostfixOperator; 6] = [
        PostfixOperator::IsTrue,
        PostfixOperator::IsFalse,
        PostfixOperator::IsNull,
        PostfixOperator::IsNotNull,
        PostfixOperator::IsNotTrue,
        PostfixOperator::IsNotFalse,
    ];

    pub fn sql(self) -> &'static str {
        match self {
            PostfixOperator::IsTrue => "IS TRUE",
            PostfixOperator::IsFalse => "IS FALSE",
            PostfixOperator::IsNull => "IS NULL",
            PostfixOperator::IsNotNull => "IS NOT NULL",
            PostfixOperator::IsNotTrue => "IS NOT TRUE",
            PostfixOperator::IsNotFalse => "IS NOT FALSE",
        }
    }

    /// Null tests accept any operand type; truth tests need a boolean.
    pub fn accepts(self, data_type: DataType) -> bool {
        matches!(self, PostfixOperator::IsNull | PostfixOperator::IsNotNull)
            || data_type == DataType::Boolean
    }
}

/// Built-in scalar functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Abs,
    Length,
    Lower,
    Upper,
}

impl Function {
    pub fn sql(self) -> &'static str {
        match self {
            Function::Abs => "ABS",
            Function::Length => "LENGTH",
            Function::Lower => "LOWER",
            Function::Upper => "UPPER",
        }
    }

    pub fn argument_type(self) -> DataType {
        match self {
            Function::Abs => DataType::Integer,
            Function::Length | Function::Lower | Function::Upper => DataType::Text,
        }
    }

    pub fn result_type(self) -> DataType {
        match self {
            Function::Abs | Function::Length => DataType::Integer,
            Function::Lower | Function::Upper => DataType::Text,
        }
    }
}

/// An expression node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    ColumnValue(ColumnValue),
    Literal {
        value: Constant,
        data_type: DataType,
    },
    Unary {
        op: UnaryOperator,
        operand: Box<Expression>,
    },
    Binary {
        op: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Postfix {
        op: PostfixOperator,
        operand: Box<Expression>,
    },
    /// `operand [NOT] IN (list)`.
    InList {
        operand: Box<Expression>,
        list: Vec<Expression>,
        negated: bool,
    },
    /// `operand [NOT] BETWEEN low AND high`.
    Between {
        operand: Box<Expression>,
        low: Box<Expression>,
        high: Box<Expression>,
        negated: bool,
    },
    Cast {
        operand: Box<Expression>,
        target: DataType,
    },
    Function {
        func: Function,
        args: Vec<Expression>,
    },
}

impl Expression {
    /// A column reference bound to `value`.
    pub fn column(column: Column, value: Option<Constant>) -> Self {
        Expression::ColumnValue(ColumnValue { column, value })
    }

    /// A literal; the type of a NULL literal comes from `data_type`.
    pub fn literal(value: Constant, data_type: DataType) -> Self {
        Expression::Literal { value, data_type }
    }

    pub fn unary(op: UnaryOperator, operand: Expression) -> Self {
        Expression::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOperator, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn postfix(op: PostfixOperator, operand: Expression) -> Self {
        Expression::Postfix {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn in_list(operand: Expression, list: Vec<Expression>, negated: bool) -> Self {
        Expression::InList {
            operand: Box::new(operand),
            list,
            negated,
        }
    }

    pub fn between(operand: Expression, low: Expression, high: Expression, negated: bool) -> Self {
        Expression::Between {
            operand: Box::new(operand),
            low: Box::new(low),
            high: Box::new(high),
            negated,
        }
    }

    pub fn cast(operand: Expression, target: DataType) -> Self {
        Expression::Cast {
            operand: Box::new(operand),
            target,
        }
    }

    pub fn function(func: Function, args: Vec<Expression>) -> Self {
        Expression::Function { func, args }
    }

    /// Declared result type of this node.
    pub fn data_type(&self) -> DataType {
        match self {
            Expression::ColumnValue(c) => c.column.data_type(),
            Expression::Literal { data_type, .. } => *data_type,
            Expression::Unary { op, .. } => match op {
                UnaryOperator::Not => DataType::Boolean,
                UnaryOperator::Minus | UnaryOperator::Plus => DataType::Integer,
            },
            Expression::Binary { op, .. } => op.result_type(),
            Expression::Postfix { .. } | Expression::InList { .. } | Expression::Between { .. } => {
                DataType::Boolean
            }
            Expression::Cast { target, .. } => *target,
            Expression::Function { func, .. } => func.result_type(),
        }
    }

    /// Direct children, left to right.
    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::ColumnValue(_) | Expression::Literal { .. } => Vec::new(),
            Expression::Unary { operand, .. }
            | Expression::Postfix { operand, .. }
            | Expression::Cast { operand, .. } => vec![&**operand],
            Expression::Binary { left, right, .. } => vec![&**left, &**right],
            Expression::InList { operand, list, .. } => {
                std::iter::once(operand.as_ref()).chain(list).collect()
            }
            Expression::Between {
                operand, low, high, ..
            } => vec![&**operand, &**low, &**high],
            Expression::Function { args, .. } => args.iter().collect(),
        }
    }

    /// Whether any node of the tree is a column reference.
    pub fn references_columns(&self) -> bool {
        matches!(self, Expression::ColumnValue(_))
            || self.children().into_iter().any(Expression::references_columns)
    }
}
