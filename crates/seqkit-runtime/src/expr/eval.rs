//! Expression evaluation
//!
//! Evaluation is a plain tree walk over the bound arguments. There is no
//! environment beyond the argument slice, so an expression can only observe
//! the values the template passes in.

use crate::error::{SeqError, SeqResult};
use crate::expr::ast::*;
use crate::span::Span;
use crate::table::Key;
use crate::value::Value;
use std::cmp::Ordering;

/// Evaluate an expression against positional arguments
pub fn evaluate(expr: &Expr, args: &[Value]) -> SeqResult<Value> {
    match expr {
        Expr::Literal(lit, _) => Ok(eval_literal(lit)),
        Expr::Param(p) => Ok(args.get(p.slot).cloned().unwrap_or_default()),
        Expr::Unary(unary) => eval_unary(unary, args),
        Expr::Binary(binary) => eval_binary(binary, args),
        Expr::Index(index) => {
            let target = evaluate(&index.target, args)?;
            let key = evaluate(&index.index, args)?;
            index_value(&target, &key, index.span)
        }
        Expr::Field(field) => {
            let target = evaluate(&field.target, args)?;
            field_value(&target, &field.name, field.span)
        }
        Expr::Group(group) => evaluate(&group.expr, args),
    }
}

fn eval_literal(lit: &Literal) -> Value {
    match lit {
        Literal::Number(n) => Value::Number(*n),
        Literal::String(s) => Value::string(s),
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Nil => Value::Nil,
    }
}

fn eval_unary(unary: &UnaryExpr, args: &[Value]) -> SeqResult<Value> {
    let value = evaluate(&unary.expr, args)?;

    match unary.op {
        UnaryOp::Negate => match value {
            Value::Number(n) => Ok(Value::Number(-n)),
            other => Err(type_error(
                format!("cannot negate a {} value", other.type_name()),
                unary.span,
            )),
        },
        UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
        UnaryOp::Len => match &value {
            Value::String(s) => Ok(Value::from(s.len())),
            Value::Sequence(seq) => Ok(Value::from(seq.len())),
            Value::Table(table) => Ok(Value::from(table.border())),
            other => Err(type_error(
                format!("cannot take the length of a {} value", other.type_name()),
                unary.span,
            )),
        },
    }
}

fn eval_binary(binary: &BinaryExpr, args: &[Value]) -> SeqResult<Value> {
    // Short-circuit operators yield one of their operands
    match binary.op {
        BinaryOp::And => {
            let left = evaluate(&binary.left, args)?;
            return if left.is_truthy() {
                evaluate(&binary.right, args)
            } else {
                Ok(left)
            };
        }
        BinaryOp::Or => {
            let left = evaluate(&binary.left, args)?;
            return if left.is_truthy() {
                Ok(left)
            } else {
                evaluate(&binary.right, args)
            };
        }
        _ => {}
    }

    let left = evaluate(&binary.left, args)?;
    let right = evaluate(&binary.right, args)?;
    let span = binary.span;

    match binary.op {
        BinaryOp::Add
        | BinaryOp::Sub
        | BinaryOp::Mul
        | BinaryOp::Div
        | BinaryOp::Mod => numeric_binary_op(binary.op, &left, &right, span),
        BinaryOp::Concat => concat(&left, &right, span),
        BinaryOp::Eq => Ok(Value::Bool(left == right)),
        BinaryOp::Ne => Ok(Value::Bool(left != right)),
        BinaryOp::Lt => compare(&left, &right, span).map(|o| Value::Bool(o == Ordering::Less)),
        BinaryOp::Le => compare(&left, &right, span).map(|o| Value::Bool(o != Ordering::Greater)),
        BinaryOp::Gt => compare(&left, &right, span).map(|o| Value::Bool(o == Ordering::Greater)),
        BinaryOp::Ge => compare(&left, &right, span).map(|o| Value::Bool(o != Ordering::Less)),
        BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
    }
}

fn numeric_binary_op(op: BinaryOp, left: &Value, right: &Value, span: Span) -> SeqResult<Value> {
    let (a, b) = match (left, right) {
        (Value::Number(a), Value::Number(b)) => (*a, *b),
        _ => {
            return Err(type_error(
                format!(
                    "arithmetic on {} and {} values",
                    left.type_name(),
                    right.type_name()
                ),
                span,
            ))
        }
    };

    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(SeqError::DivideByZero { span });
            }
            a / b
        }
        BinaryOp::Mod => {
            if b == 0.0 {
                return Err(SeqError::DivideByZero { span });
            }
            // floored: the result takes the sign of the divisor
            a - (a / b).floor() * b
        }
        _ => unreachable!("not an arithmetic operator"),
    };

    Ok(Value::Number(result))
}

fn concat(left: &Value, right: &Value, span: Span) -> SeqResult<Value> {
    match (left, right) {
        (Value::String(_) | Value::Number(_), Value::String(_) | Value::Number(_)) => {
            Ok(Value::from(format!("{}{}", left, right)))
        }
        _ => Err(type_error(
            format!(
                "cannot concatenate {} and {} values",
                left.type_name(),
                right.type_name()
            ),
            span,
        )),
    }
}

fn compare(left: &Value, right: &Value, span: Span) -> SeqResult<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a
            .partial_cmp(b)
            .ok_or_else(|| type_error("cannot order NaN", span)),
        (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
        _ => Err(type_error(
            format!(
                "cannot compare {} with {}",
                left.type_name(),
                right.type_name()
            ),
            span,
        )),
    }
}

fn index_value(target: &Value, key: &Value, span: Span) -> SeqResult<Value> {
    match target {
        Value::Sequence(seq) => match key {
            Value::Number(n) if n.fract() == 0.0 => Ok(seq.get(*n as i64).unwrap_or_default()),
            Value::Number(_) => Ok(Value::Nil),
            Value::String(name) => field_value(target, name, span),
            other => Err(type_error(
                format!("cannot index a sequence with a {} value", other.type_name()),
                span,
            )),
        },
        Value::Table(table) => match Key::from_value(key) {
            Some(key) => Ok(table.get(&key)),
            None => Ok(Value::Nil),
        },
        other => Err(type_error(
            format!("cannot index a {} value", other.type_name()),
            span,
        )),
    }
}

fn field_value(target: &Value, name: &str, span: Span) -> SeqResult<Value> {
    match target {
        Value::Sequence(seq) => match name {
            "length" => Ok(Value::from(seq.len())),
            _ => Ok(Value::Nil),
        },
        Value::Table(table) => Ok(table.get(&Key::from(name))),
        other => Err(type_error(
            format!("cannot read field '{}' of a {} value", name, other.type_name()),
            span,
        )),
    }
}

fn type_error(msg: impl Into<String>, span: Span) -> SeqError {
    SeqError::TypeError {
        msg: msg.into(),
        span,
    }
}
