//! Per-generation machine analysis.
//!
//! Everything here is derived from the machine at the start of a generation
//! call and thrown away afterwards; nothing is cached on the machine, so
//! concurrent calls over one shared model stay safe.

use std::collections::HashMap;

use crate::machine::{Machine, StateIndex, TransIndex};

// ─── Tokenizer ────────────────────────────────────────────────────

/// Maps between symbols and the 1-based tokens used in generated code.
///
/// `tok2sym[0]` is the empty token; the sorted alphabet follows. A profile
/// row carries `tok2sym.len()` columns: column `t - 1` holds symbol token
/// `t`'s weight and the final column holds the position's empty ("gap")
/// weight.
#[derive(Debug)]
pub struct Tokenizer {
    pub tok2sym: Vec<String>,
    pub sym2tok: HashMap<String, usize>,
}

impl Tokenizer {
    pub fn new(alphabet: Vec<String>) -> Self {
        let mut tok2sym = Vec::with_capacity(alphabet.len() + 1);
        tok2sym.push(String::new());
        tok2sym.extend(alphabet);
        let sym2tok = tok2sym
            .iter()
            .enumerate()
            .skip(1)
            .map(|(tok, sym)| (sym.clone(), tok))
            .collect();
        Tokenizer { tok2sym, sym2tok }
    }

    /// Width of a profile row for this alphabet.
    pub fn n_columns(&self) -> usize {
        self.tok2sym.len()
    }

    /// Column of the empty ("gap") weight, always the last.
    pub fn gap_column(&self) -> usize {
        self.tok2sym.len() - 1
    }

    pub fn token(&self, sym: &str) -> Option<usize> {
        self.sym2tok.get(sym).copied()
    }
}

// ─── Machine analysis ─────────────────────────────────────────────

/// Derived tables for one generation call.
pub struct MachineAnalysis<'m> {
    pub machine: &'m Machine,
    /// For each destination state, the `(source, trans_index)` pairs that
    /// reach it, source-ascending then outgoing-list order. This is the
    /// canonical summation order for every generated log-sum.
    pub incoming: Vec<Vec<(StateIndex, TransIndex)>>,
    /// Parameter name to zero-based ordinal, positional in the definition
    /// table.
    pub func_idx: HashMap<String, usize>,
    pub input_tok: Tokenizer,
    pub output_tok: Tokenizer,
}

impl<'m> MachineAnalysis<'m> {
    pub fn new(machine: &'m Machine) -> Self {
        let mut incoming: Vec<Vec<(StateIndex, TransIndex)>> =
            vec![Vec::new(); machine.n_states()];
        for (src, state) in machine.states.iter().enumerate() {
            for (t, trans) in state.trans.iter().enumerate() {
                if trans.dest < incoming.len() {
                    incoming[trans.dest].push((src, t));
                }
            }
        }
        let mut func_idx = HashMap::new();
        for (ordinal, (name, _)) in machine.defs.iter().enumerate() {
            func_idx.entry(name.clone()).or_insert(ordinal);
        }
        MachineAnalysis {
            machine,
            incoming,
            func_idx,
            input_tok: Tokenizer::new(machine.input_alphabet()),
            output_tok: Tokenizer::new(machine.output_alphabet()),
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────
