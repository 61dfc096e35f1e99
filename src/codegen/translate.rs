//! Weight-expression rendering.
//!
//! Turns expression trees into target-language arithmetic with minimal
//! parentheses. Defined parameters become the `f{n}` locals declared at the
//! top of the generated function; free parameters become runtime
//! parameter-table lookups.

use std::collections::HashMap;

use super::backend::Backend;
use crate::expr::Expr;
use crate::machine::{StateIndex, TransIndex};

/// Local holding the value of the parameter with the given ordinal.
pub(crate) fn func_var(ordinal: usize) -> String {
    format!("f{}", ordinal + 1)
}

/// Local holding the log-weight of transition `t` out of state `s`.
pub(crate) fn trans_var(s: StateIndex, t: TransIndex) -> String {
    format!("t{}_{}", s + 1, t + 1)
}

pub(crate) struct ExprRenderer<'a> {
    pub backend: &'a dyn Backend,
    pub func_idx: &'a HashMap<String, usize>,
}

impl ExprRenderer<'_> {
    /// Render `expr` in the backend's syntax. `parent_precedence` is the
    /// binding power imposed by the enclosing operator; a subtree is
    /// parenthesized only when the parent binds tighter than it does.
    pub fn render(&self, expr: &Expr, parent_precedence: i32) -> String {
        match expr {
            Expr::Int(v) => v.to_string(),
            Expr::Dbl(v) => v.to_string(),
            Expr::Param(name) => match self.func_idx.get(name) {
                Some(&ordinal) => func_var(ordinal),
                None => self.backend.map_accessor("p", name),
            },
            Expr::Log(x) => format!(
                "{}log({})",
                self.backend.math_library(),
                self.render(x, 0)
            ),
            Expr::Exp(x) => format!(
                "{}exp({})",
                self.backend.math_library(),
                self.render(x, 0)
            ),
            Expr::Pow(l, r) => format!(
                "{}pow({},{})",
                self.backend.math_library(),
                self.render(l, 0),
                self.render(r, 0)
            ),
            // a*b: rank 2; both sides demand rank 2
            // a/b: rank 2; the divisor demands rank 3
            // a-b: rank 1; the subtrahend demands rank 2
            // a+b: rank 1; neither side demands anything
            Expr::Mul(l, r) => self.binary(parent_precedence, 2, 2, 2, "*", l, r),
            Expr::Div(l, r) => self.binary(parent_precedence, 2, 2, 3, "/", l, r),
            Expr::Sub(l, r) => self.binary(parent_precedence, 1, 0, 2, "-", l, r),
            Expr::Add(l, r) => self.binary(parent_precedence, 1, 0, 0, "+", l, r),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn binary(
        &self,
        parent: i32,
        p: i32,
        lp: i32,
        rp: i32,
        opcode: &str,
        l: &Expr,
        r: &Expr,
    ) -> String {
        let body = format!("{}{}{}", self.render(l, lp), opcode, self.render(r, rp));
        if parent > p {
            format!("({})", body)
        } else {
            body
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────
