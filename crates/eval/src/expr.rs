//! Tree-walking evaluation of parsed formulas.
//!
//! The walk is sandboxed by construction: an expression can observe the
//! supplied parents map and the [`EvalContext`] clock, and nothing else.
//! Arithmetic follows IEEE-754 doubles, with division by zero yielding
//! the signed infinities rather than an error.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use formwork_core::ast::{BinaryOp, Expr};

use crate::funcs;
use crate::types::{EvalContext, EvalError, Value};

/// Evaluate an expression against a parent-value map. Parent labels
/// absent from the map read as the context's `missing` value.
pub fn eval_expr(
    expr: &Expr,
    parents: &BTreeMap<String, Value>,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Str(s) => Ok(Value::Text(s.clone())),
        Expr::Parent(label) => Ok(parents
            .get(label)
            .cloned()
            .unwrap_or_else(|| ctx.missing.clone())),
        Expr::Neg(inner) => {
            let value = eval_expr(inner, parents, ctx)?;
            Ok(Value::Number(-value.to_number()))
        }
        Expr::Binary { op, left, right } => {
            let l = eval_expr(left, parents, ctx)?;
            let r = eval_expr(right, parents, ctx)?;
            Ok(apply_binary(*op, &l, &r))
        }
        Expr::Conditional {
            cond,
            then_branch,
            else_branch,
        } => {
            // Lazy: only the taken branch evaluates.
            let c = eval_expr(cond, parents, ctx)?;
            if c.truthy() {
                eval_expr(then_branch, parents, ctx)
            } else {
                eval_expr(else_branch, parents, ctx)
            }
        }
        Expr::Call { func, args } => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval_expr(arg, parents, ctx)?);
            }
            funcs::apply_helper(*func, &values, ctx)
        }
    }
}

fn apply_binary(op: BinaryOp, left: &Value, right: &Value) -> Value {
    match op {
        BinaryOp::Add => {
            // A text or list operand turns '+' into concatenation, the
            // same way form inputs behave when glued together.
            if is_stringish(left) || is_stringish(right) {
                Value::Text(format!(
                    "{}{}",
                    left.display_string(),
                    right.display_string()
                ))
            } else {
                Value::Number(left.to_number() + right.to_number())
            }
        }
        BinaryOp::Sub => Value::Number(left.to_number() - right.to_number()),
        BinaryOp::Mul => Value::Number(left.to_number() * right.to_number()),
        BinaryOp::Div => Value::Number(left.to_number() / right.to_number()),
        BinaryOp::Eq => Value::Bool(cmp_values(left, right) == Some(Ordering::Equal)),
        BinaryOp::Neq => Value::Bool(cmp_values(left, right) != Some(Ordering::Equal)),
        BinaryOp::Lt => Value::Bool(cmp_values(left, right) == Some(Ordering::Less)),
        BinaryOp::Lte => Value::Bool(matches!(
            cmp_values(left, right),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::Gt => Value::Bool(cmp_values(left, right) == Some(Ordering::Greater)),
        BinaryOp::Gte => Value::Bool(matches!(
            cmp_values(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        )),
    }
}

fn is_stringish(value: &Value) -> bool {
    matches!(value, Value::Text(_) | Value::List(_))
}

/// Two text operands order lexicographically, anything else numerically.
/// NaN orders as `None`, which fails every comparison except `!=`.
fn cmp_values(left: &Value, right: &Value) -> Option<Ordering> {
    if let (Value::Text(a), Value::Text(b)) = (left, right) {
        Some(a.cmp(b))
    } else {
        left.to_number().partial_cmp(&right.to_number())
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
