//! JSON encoding of weight expressions.
//!
//! Numbers are leaves (`Int` when the JSON number is integral), strings are
//! parameters, and operators are single-key objects: `{"log": e}`,
//! `{"exp": e}`, `{"pow": [a, b]}`, `{"+": [a, b]}`, `{"-": [a, b]}`,
//! `{"*": [a, b]}`, `{"/": [a, b]}`. The sugar `{"not": e}` parses as
//! `{"-": [1, e]}` and is never produced on output.

use serde_json::{json, Value};

use super::{self as expr, Expr, ExprError, WeightExpr};

pub fn expr_from_value(v: &Value) -> Result<WeightExpr, ExprError> {
    match v {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(expr::int(i))
            } else if let Some(x) = n.as_f64() {
                Ok(expr::dbl(x))
            } else {
                Err(ExprError::Malformed(format!(
                    "number {} does not fit a weight",
                    n
                )))
            }
        }
        Value::String(name) => Ok(expr::param(name.clone())),
        Value::Object(map) if map.len() == 1 => {
            let (op, arg) = map
                .iter()
                .next()
                .ok_or_else(|| ExprError::Malformed("empty operator object".to_string()))?;
            match op.as_str() {
                "log" => Ok(expr::log(expr_from_value(arg)?)),
                "exp" => Ok(expr::exp(expr_from_value(arg)?)),
                "not" => Ok(expr::not(expr_from_value(arg)?)),
                "pow" | "+" | "-" | "*" | "/" => {
                    let (l, r) = binary_args(op, arg)?;
                    Ok(match op.as_str() {
                        "pow" => expr::pow(l, r),
                        "+" => expr::add(l, r),
                        "-" => expr::sub(l, r),
                        "*" => expr::mul(l, r),
                        _ => expr::div(l, r),
                    })
                }
                other => Err(ExprError::Malformed(format!(
                    "unknown weight operator '{}'",
                    other
                ))),
            }
        }
        other => Err(ExprError::Malformed(format!(
            "expected a number, parameter name or operator object, found {}",
            json_kind(other)
        ))),
    }
}

pub fn expr_to_value(e: &Expr) -> Value {
    match e {
        Expr::Int(v) => json!(v),
        Expr::Dbl(v) => json!(v),
        Expr::Param(name) => json!(name),
        Expr::Log(x) => json!({ "log": expr_to_value(x) }),
        Expr::Exp(x) => json!({ "exp": expr_to_value(x) }),
        Expr::Pow(l, r) => json!({ "pow": [expr_to_value(l), expr_to_value(r)] }),
        Expr::Add(l, r) => json!({ "+": [expr_to_value(l), expr_to_value(r)] }),
        Expr::Sub(l, r) => json!({ "-": [expr_to_value(l), expr_to_value(r)] }),
        Expr::Mul(l, r) => json!({ "*": [expr_to_value(l), expr_to_value(r)] }),
        Expr::Div(l, r) => json!({ "/": [expr_to_value(l), expr_to_value(r)] }),
    }
}

fn binary_args(op: &str, arg: &Value) -> Result<(WeightExpr, WeightExpr), ExprError> {
    match arg {
        Value::Array(items) if items.len() == 2 => Ok((
            expr_from_value(&items[0])?,
            expr_from_value(&items[1])?,
        )),
        _ => Err(ExprError::Malformed(format!(
            "operator '{}' takes a two-element array",
            op
        ))),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> WeightExpr {
        let v: Value = serde_json::from_str(text).unwrap();
        expr_from_value(&v).unwrap()
    }

    #[test]
    fn test_leaves() {
        assert_eq!(*parse("3"), Expr::Int(3));
        assert_eq!(*parse("-2"), Expr::Int(-2));
        assert_eq!(*parse("0.25"), Expr::Dbl(0.25));
        assert_eq!(*parse("\"gapOpen\""), Expr::Param("gapOpen".to_string()));
    }

    #[test]
    fn test_operators() {
        let e = parse(r#"{"*": [{"-": [1, "p"]}, 0.25]}"#);
        assert_eq!(format!("{}", e), "(1 - p) * 0.25");

        let e = parse(r#"{"pow": ["x", 2]}"#);
        assert_eq!(format!("{}", e), "pow(x, 2)");

        let e = parse(r#"{"log": {"exp": 1}}"#);
        assert_eq!(format!("{}", e), "log(exp(1))");
    }

    #[test]
    fn test_not_sugar_parses_but_never_prints() {
        let e = parse(r#"{"not": "p"}"#);
        assert_eq!(*e, *expr::sub(expr::one(), expr::param("p")));

        let v = expr_to_value(&e);
        assert_eq!(serde_json::to_string(&v).unwrap(), r#"{"-":[1,"p"]}"#);
    }

    #[test]
    fn test_round_trip() {
        let text = r#"{"/":[{"+":["a",{"log":2}]},{"pow":[0.5,"b"]}]}"#;
        let e = parse(text);
        let v = expr_to_value(&e);
        assert_eq!(serde_json::to_string(&v).unwrap(), text);
    }

    #[test]
    fn test_malformed() {
        let v: Value = serde_json::from_str(r#"{"frob": 1}"#).unwrap();
        let err = expr_from_value(&v).unwrap_err();
        assert!(err.to_string().contains("unknown weight operator 'frob'"));

        let v: Value = serde_json::from_str(r#"{"+": [1]}"#).unwrap();
        let err = expr_from_value(&v).unwrap_err();
        assert!(err.to_string().contains("two-element array"));

        let v: Value = serde_json::from_str("true").unwrap();
        let err = expr_from_value(&v).unwrap_err();
        assert!(err.to_string().contains("a boolean"));
    }
}
