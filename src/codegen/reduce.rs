//! Log-space summation over rendered alternatives.
//!
//! Cell updates collect a list of already-rendered log-domain expressions
//! and fold them into a left-deep chain of binary softplus calls. Layout
//! matters as much as structure here: once a sum has two or more
//! alternatives, every alternative lands on its own continuation line so
//! the generated cell updates stay reviewable.

use super::backend::Backend;

/// Fold `exprs` into a single log-domain expression.
///
/// Zero alternatives are impossible, rendered as negative infinity. With a
/// single alternative at top level the value is clamped into the
/// representable range via `bound_log` unless the caller knows it is
/// `already_bounded` (a cell built purely from already-clamped cells).
pub(crate) fn log_sum_exp(
    backend: &dyn Backend,
    exprs: &[String],
    line_indent: &str,
    top_level: bool,
    already_bounded: bool,
) -> String {
    let new_line = format!("\n{}", line_indent);
    match exprs {
        [] => format!("-{}", backend.infinity()),
        [only] => {
            if !top_level {
                format!("{}{}", new_line, only)
            } else if already_bounded {
                only.clone()
            } else {
                backend.bound_log(only)
            }
        }
        [rest @ .., last] => backend.binary_softplus(
            &log_sum_exp(backend, rest, line_indent, false, false),
            &format!("{}{}", new_line, last),
        ),
    }
}

// ─── Tests ────────────────────────────────────────────────────────
