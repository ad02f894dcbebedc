use crate::{Error, Result};

use std::collections::HashMap;

pub const OPERATOR_EQUAL: &str = "=";

/// WHERE expression tree, as produced by an external planner. Only `=`
/// comparisons between a column and a literal, and ANDs of those, are
/// supported.
#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    And(Box<Expression>, Box<Expression>),
    Comparison {
        operator: String,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Value(String),
}

impl Expression {
    /// `column = literal`
    pub fn equals(column: &str, literal: &str) -> Expression {
        Expression::Comparison {
            operator: OPERATOR_EQUAL.to_string(),
            left: Box::new(Expression::Value(column.to_string())),
            right: Box::new(Expression::Value(literal.to_string())),
        }
    }

    pub fn and(left: Expression, right: Expression) -> Expression {
        Expression::And(Box::new(left), Box::new(right))
    }
}

/// Evaluate a WHERE tree against a row. `column_orders` maps column names
/// to positions within `row`.
pub fn eval_where(
    expression: &Expression,
    row: &[String],
    column_orders: &HashMap<String, usize>,
) -> Result<bool> {
    match expression {
        Expression::And(left, right) => {
            Ok(eval_where(left, row, column_orders)? && eval_where(right, row, column_orders)?)
        }
        Expression::Comparison {
            operator,
            left,
            right,
        } => {
            if operator != OPERATOR_EQUAL {
                return Err(Error::Unsupported(format!("operator: {}", operator)));
            }

            let column = value_of(left)?;
            let literal = value_of(right)?;
            let order = column_orders
                .get(column)
                .ok_or_else(|| Error::ColumnNotFound(column.to_string()))?;
            let cell = row
                .get(*order)
                .ok_or_else(|| Error::ColumnNotFound(column.to_string()))?;

            Ok(cell == literal)
        }
        Expression::Value(_) => Err(Error::Unsupported(
            "a bare value is not a predicate".to_string(),
        )),
    }
}

fn value_of(expression: &Expression) -> Result<&str> {
    match expression {
        Expression::Value(value) => Ok(value),
        _ => Err(Error::Unsupported(
            "comparison operands must be values".to_string(),
        )),
    }
}
