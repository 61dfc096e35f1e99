use std::path::PathBuf;

use crate::expr::ExprError;

/// Errors raised while reading or assembling a machine model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model is not valid JSON: {msg}")]
    Syntax {
        msg: String,
        /// 1-based position reported by the JSON parser.
        line: usize,
        column: usize,
    },
    #[error("in weight expression: {0}")]
    Weight(#[from] ExprError),
    #[error("transition references undeclared state '{0}'")]
    UnknownState(String),
    #[error("transition references state {index}, but the machine has {n_states} states")]
    StateOutOfRange { index: usize, n_states: usize },
    #[error("duplicate state id '{0}'")]
    DuplicateStateId(String),
    #[error("machine has no states")]
    Empty,
    #[error("accept state {0} has outgoing transitions")]
    AcceptNotTerminal(usize),
    #[error("null transition from state {from} to state {to} does not advance")]
    NonAdvancingNull { from: usize, to: usize },
}

/// Errors raised at generation time. Fatal: nothing is emitted.
#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    #[error("cannot compile an empty machine")]
    EmptyMachine,
    #[error("text sequences need a single-character alphabet; {side} alphabet contains {token:?}")]
    MultiCharToken { side: &'static str, token: String },
    #[error("null transition from state {from} to state {to} does not advance")]
    NonAdvancingNull { from: usize, to: usize },
    #[error("unknown target '{0}' (expected 'js' or 'cpp')")]
    UnknownTarget(String),
    #[error(transparent)]
    Expr(#[from] ExprError),
}
