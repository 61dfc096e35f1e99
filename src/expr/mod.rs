//! Weight-expression algebra.
//!
//! Transition weights are immutable arithmetic trees over numbers and named
//! parameters. Trees are shared via `Arc` so a `Machine` stays `Send + Sync`
//! and generation calls can run concurrently over one model. Constructors
//! build exactly the node asked for; no algebraic rewriting happens here or
//! anywhere downstream.

pub mod json;
pub mod topo;

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

/// Shared handle to an expression node.
pub type WeightExpr = Arc<Expr>;

// ─── Expression tree ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // ── Leaves ──
    Int(i64),
    Dbl(f64),
    Param(String),

    // ── Unary ──
    Log(WeightExpr),
    Exp(WeightExpr),

    // ── Binary ──
    Pow(WeightExpr, WeightExpr),
    Add(WeightExpr, WeightExpr),
    Sub(WeightExpr, WeightExpr),
    Mul(WeightExpr, WeightExpr),
    Div(WeightExpr, WeightExpr),
}

#[derive(Debug, thiserror::Error)]
pub enum ExprError {
    #[error("parameter '{0}' is not bound")]
    Unbound(String),
    #[error("parameter definitions form a cycle through '{0}'")]
    Cycle(String),
    #[error("{0}")]
    Malformed(String),
}

// ─── Constructors ─────────────────────────────────────────────────

pub fn int(v: i64) -> WeightExpr {
    Arc::new(Expr::Int(v))
}

pub fn dbl(v: f64) -> WeightExpr {
    Arc::new(Expr::Dbl(v))
}

pub fn param(name: impl Into<String>) -> WeightExpr {
    Arc::new(Expr::Param(name.into()))
}

pub fn zero() -> WeightExpr {
    int(0)
}

pub fn one() -> WeightExpr {
    int(1)
}

pub fn log(x: WeightExpr) -> WeightExpr {
    Arc::new(Expr::Log(x))
}

pub fn exp(x: WeightExpr) -> WeightExpr {
    Arc::new(Expr::Exp(x))
}

pub fn pow(base: WeightExpr, exponent: WeightExpr) -> WeightExpr {
    Arc::new(Expr::Pow(base, exponent))
}

pub fn add(l: WeightExpr, r: WeightExpr) -> WeightExpr {
    Arc::new(Expr::Add(l, r))
}

pub fn sub(l: WeightExpr, r: WeightExpr) -> WeightExpr {
    Arc::new(Expr::Sub(l, r))
}

pub fn mul(l: WeightExpr, r: WeightExpr) -> WeightExpr {
    Arc::new(Expr::Mul(l, r))
}

pub fn div(l: WeightExpr, r: WeightExpr) -> WeightExpr {
    Arc::new(Expr::Div(l, r))
}

/// Complement sugar: `not(x)` is `1 - x`.
pub fn not(x: WeightExpr) -> WeightExpr {
    sub(one(), x)
}

// ─── Queries and evaluation ───────────────────────────────────────

impl Expr {
    /// Collect the free parameter names, sorted.
    pub fn params(&self) -> BTreeSet<String> {
        let mut acc = BTreeSet::new();
        self.collect_params(&mut acc);
        acc
    }

    fn collect_params(&self, acc: &mut BTreeSet<String>) {
        match self {
            Expr::Int(_) | Expr::Dbl(_) => {}
            Expr::Param(name) => {
                acc.insert(name.clone());
            }
            Expr::Log(x) | Expr::Exp(x) => x.collect_params(acc),
            Expr::Pow(l, r)
            | Expr::Add(l, r)
            | Expr::Sub(l, r)
            | Expr::Mul(l, r)
            | Expr::Div(l, r) => {
                l.collect_params(acc);
                r.collect_params(acc);
            }
        }
    }

    /// Numeric evaluation under a parameter binding. Every `Param` must be
    /// bound; definitions are not resolved here (callers substitute first
    /// or bind the defined names too).
    pub fn eval(&self, bindings: &HashMap<String, f64>) -> Result<f64, ExprError> {
        Ok(match self {
            Expr::Int(v) => *v as f64,
            Expr::Dbl(v) => *v,
            Expr::Param(name) => *bindings
                .get(name)
                .ok_or_else(|| ExprError::Unbound(name.clone()))?,
            Expr::Log(x) => x.eval(bindings)?.ln(),
            Expr::Exp(x) => x.eval(bindings)?.exp(),
            Expr::Pow(l, r) => l.eval(bindings)?.powf(r.eval(bindings)?),
            Expr::Add(l, r) => l.eval(bindings)? + r.eval(bindings)?,
            Expr::Sub(l, r) => l.eval(bindings)? - r.eval(bindings)?,
            Expr::Mul(l, r) => l.eval(bindings)? * r.eval(bindings)?,
            Expr::Div(l, r) => l.eval(bindings)? / r.eval(bindings)?,
        })
    }
}

// ─── Display ──────────────────────────────────────────────────────

/// Human-readable math notation for summaries and error messages. Nested
/// binary operands are parenthesized unconditionally; the generated-code
/// renderer in `codegen::translate` is the one that minimizes parentheses.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn operand(f: &mut fmt::Formatter<'_>, x: &Expr) -> fmt::Result {
            if matches!(
                x,
                Expr::Pow(..) | Expr::Add(..) | Expr::Sub(..) | Expr::Mul(..) | Expr::Div(..)
            ) {
                write!(f, "({})", x)
            } else {
                write!(f, "{}", x)
            }
        }
        match self {
            Expr::Int(v) => write!(f, "{}", v),
            Expr::Dbl(v) => write!(f, "{}", v),
            Expr::Param(name) => write!(f, "{}", name),
            Expr::Log(x) => write!(f, "log({})", x),
            Expr::Exp(x) => write!(f, "exp({})", x),
            Expr::Pow(l, r) => write!(f, "pow({}, {})", l, r),
            Expr::Add(l, r) => {
                operand(f, l)?;
                write!(f, " + ")?;
                operand(f, r)
            }
            Expr::Sub(l, r) => {
                operand(f, l)?;
                write!(f, " - ")?;
                operand(f, r)
            }
            Expr::Mul(l, r) => {
                operand(f, l)?;
                write!(f, " * ")?;
                operand(f, r)
            }
            Expr::Div(l, r) => {
                operand(f, l)?;
                write!(f, " / ")?;
                operand(f, r)
            }
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_sorted_and_deduped() {
        let e = mul(
            add(param("beta"), param("alpha")),
            sub(one(), param("beta")),
        );
        let names: Vec<String> = e.params().into_iter().collect();
        assert_eq!(names, vec!["alpha".to_string(), "beta".to_string()]);
    }

    #[test]
    fn test_eval() {
        let mut bindings = HashMap::new();
        bindings.insert("p".to_string(), 0.25);

        let e = mul(not(param("p")), dbl(4.0));
        let v = e.eval(&bindings).unwrap();
        assert!((v - 3.0).abs() < 1e-12);

        let e = log(exp(int(2)));
        assert!((e.eval(&bindings).unwrap() - 2.0).abs() < 1e-12);

        let e = pow(param("p"), int(2));
        assert!((e.eval(&bindings).unwrap() - 0.0625).abs() < 1e-12);
    }

    #[test]
    fn test_eval_unbound() {
        let e = add(param("missing"), one());
        let err = e.eval(&HashMap::new()).unwrap_err();
        assert_eq!(err.to_string(), "parameter 'missing' is not bound");
    }

    #[test]
    fn test_display() {
        let e = mul(sub(one(), param("p")), dbl(0.25));
        assert_eq!(format!("{}", e), "(1 - p) * 0.25");
        assert_eq!(format!("{}", log(param("x"))), "log(x)");
        assert_eq!(format!("{}", pow(param("x"), int(3))), "pow(x, 3)");
    }

    #[test]
    fn test_not_is_one_minus() {
        assert_eq!(*not(param("p")), Expr::Sub(one(), param("p")));
    }
}
