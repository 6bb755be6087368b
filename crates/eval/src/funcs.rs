//! The fixed helper-function library available to formulas.
//!
//! Every helper is side-effect-free and total over any argument list of
//! the right shape: bad input degrades to `Null`, 0, or NaN per the
//! documented coercions rather than failing evaluation. The only errors
//! are arity mistakes, which are also caught at schema-save time.

use time::Date;

use formwork_core::ast::HelperFn;

use crate::types::{EvalContext, EvalError, Value, DATE_FORMAT};

/// Dispatch a helper call over already-evaluated arguments.
pub fn apply_helper(
    func: HelperFn,
    args: &[Value],
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    match func {
        HelperFn::ComputeAge => match args {
            [dob] => Ok(compute_age(dob, ctx.today)),
            _ => Err(arity_error(func, 1, args.len())),
        },
        HelperFn::Sum => Ok(sum(args)),
        HelperFn::Concat => Ok(concat(args)),
        HelperFn::Avg => Ok(avg(args)),
        HelperFn::Max => max(args),
        HelperFn::Min => min(args),
        HelperFn::If => match args {
            [cond, then_val, else_val] => Ok(if cond.truthy() {
                then_val.clone()
            } else {
                else_val.clone()
            }),
            _ => Err(arity_error(func, 3, args.len())),
        },
    }
}

fn arity_error(func: HelperFn, expected: usize, got: usize) -> EvalError {
    EvalError::Arity {
        func: func.name().to_owned(),
        expected,
        got,
    }
}

/// Whole completed years from a `yyyy-mm-dd` date of birth to `today`.
/// Empty or unparseable input yields `Null`; a future date counts the
/// years toward it.
pub fn compute_age(dob: &Value, today: Date) -> Value {
    let text = dob.display_string();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    let born = match Date::parse(trimmed, DATE_FORMAT) {
        Ok(d) => d,
        Err(_) => return Value::Null,
    };
    let mut years = today.year() - born.year();
    if (u8::from(today.month()), today.day()) < (u8::from(born.month()), born.day()) {
        years -= 1;
    }
    Value::Number(f64::from(years.abs()))
}

/// Arithmetic sum. Zero arguments sum to 0.
pub fn sum(args: &[Value]) -> Value {
    Value::Number(args.iter().map(numeric_or_zero).sum())
}

/// String concatenation of every argument's display form, no separator.
pub fn concat(args: &[Value]) -> Value {
    let mut out = String::new();
    for arg in args {
        out.push_str(&arg.display_string());
    }
    Value::Text(out)
}

/// Mean of the arguments; zero arguments average to 0.
pub fn avg(args: &[Value]) -> Value {
    if args.is_empty() {
        return Value::Number(0.0);
    }
    let total: f64 = args.iter().map(numeric_or_zero).sum();
    Value::Number(total / args.len() as f64)
}

/// Numeric maximum. Any non-numeric argument poisons the result to NaN,
/// which the scheduler later collapses to an empty display value.
pub fn max(args: &[Value]) -> Result<Value, EvalError> {
    fold_extreme(args, HelperFn::Max, f64::NEG_INFINITY, |n, best| n > best)
}

/// Numeric minimum, same NaN behavior as [`max`].
pub fn min(args: &[Value]) -> Result<Value, EvalError> {
    fold_extreme(args, HelperFn::Min, f64::INFINITY, |n, best| n < best)
}

fn fold_extreme(
    args: &[Value],
    func: HelperFn,
    start: f64,
    replaces: fn(f64, f64) -> bool,
) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::NoArguments {
            func: func.name().to_owned(),
        });
    }
    let mut best = start;
    for arg in args {
        let n = arg.to_number();
        if n.is_nan() {
            return Ok(Value::Number(f64::NAN));
        }
        if replaces(n, best) {
            best = n;
        }
    }
    Ok(Value::Number(best))
}

/// Coercion used by sum/avg: anything that does not read as a number
/// counts as zero instead of poisoning the total.
fn numeric_or_zero(value: &Value) -> f64 {
    let n = value.to_number();
    if n.is_nan() {
        0.0
    } else {
        n
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn text(s: &str) -> Value {
        Value::Text(s.to_owned())
    }

    #[test]
    fn compute_age_counts_completed_years() {
        let today = date!(2026 - 08 - 25);
        assert_eq!(
            compute_age(&text("2000-01-01"), today),
            Value::Number(26.0)
        );
        // birthday later this year: not yet completed
        assert_eq!(
            compute_age(&text("2000-12-31"), today),
            Value::Number(25.0)
        );
        // birthday today counts
        assert_eq!(
            compute_age(&text("2000-08-25"), today),
            Value::Number(26.0)
        );
    }

    #[test]
    fn compute_age_of_bad_input_is_null() {
        let today = date!(2026 - 08 - 25);
        assert_eq!(compute_age(&text(""), today), Value::Null);
        assert_eq!(compute_age(&text("   "), today), Value::Null);
        assert_eq!(compute_age(&text("not-a-date"), today), Value::Null);
        assert_eq!(compute_age(&text("2000-13-40"), today), Value::Null);
        assert_eq!(compute_age(&Value::Null, today), Value::Null);
    }

    #[test]
    fn compute_age_of_future_date_counts_toward_it() {
        let today = date!(2026 - 08 - 25);
        assert_eq!(
            compute_age(&text("2030-01-01"), today),
            Value::Number(4.0)
        );
    }

    #[test]
    fn sum_coerces_and_defaults() {
        assert_eq!(sum(&[]), Value::Number(0.0));
        assert_eq!(sum(&[text("3"), text("4")]), Value::Number(7.0));
        assert_eq!(
            sum(&[text("3"), text("abc"), Value::Null]),
            Value::Number(3.0)
        );
        assert_eq!(sum(&[Value::Number(1.5), text("2.5")]), Value::Number(4.0));
    }

    #[test]
    fn avg_of_zero_arguments_is_zero() {
        assert_eq!(avg(&[]), Value::Number(0.0));
        assert_eq!(
            avg(&[Value::Number(2.0), Value::Number(4.0)]),
            Value::Number(3.0)
        );
        // non-numeric counts as zero but still divides
        assert_eq!(avg(&[text("6"), text("abc")]), Value::Number(3.0));
    }

    #[test]
    fn concat_joins_display_strings() {
        assert_eq!(concat(&[]), Value::Text(String::new()));
        assert_eq!(
            concat(&[text("a"), Value::Number(2.0), Value::Null, text("b")]),
            Value::Text("a2b".into())
        );
    }

    #[test]
    fn max_and_min_pick_extremes() {
        let args = [Value::Number(3.0), text("7"), Value::Number(-1.0)];
        assert_eq!(max(&args).unwrap(), Value::Number(7.0));
        assert_eq!(min(&args).unwrap(), Value::Number(-1.0));
    }

    #[test]
    fn max_and_min_poison_on_non_numeric() {
        let args = [Value::Number(3.0), text("abc")];
        let m = max(&args).unwrap();
        match m {
            Value::Number(n) => assert!(n.is_nan()),
            other => panic!("expected NaN number, got {:?}", other),
        }
    }

    #[test]
    fn max_and_min_reject_zero_arguments() {
        assert_eq!(
            max(&[]),
            Err(EvalError::NoArguments {
                func: "max".into()
            })
        );
        assert_eq!(
            min(&[]),
            Err(EvalError::NoArguments {
                func: "min".into()
            })
        );
    }

    #[test]
    fn apply_helper_enforces_arity() {
        let ctx = EvalContext::at(date!(2026 - 08 - 25));
        let err = apply_helper(HelperFn::ComputeAge, &[], &ctx).unwrap_err();
        assert_eq!(
            err.to_string(),
            "computeAge() takes exactly 1 argument, got 0"
        );
        let err = apply_helper(HelperFn::If, &[Value::Bool(true)], &ctx).unwrap_err();
        assert_eq!(err.to_string(), "if() takes exactly 3 arguments, got 1");
    }

    #[test]
    fn if_helper_selects_by_truthiness() {
        let ctx = EvalContext::at(date!(2026 - 08 - 25));
        let picked = apply_helper(
            HelperFn::If,
            &[text(""), text("then"), text("else")],
            &ctx,
        )
        .unwrap();
        assert_eq!(picked, Value::Text("else".into()));
        let picked = apply_helper(
            HelperFn::If,
            &[Value::Number(1.0), text("then"), text("else")],
            &ctx,
        )
        .unwrap();
        assert_eq!(picked, Value::Text("then".into()));
    }
}
