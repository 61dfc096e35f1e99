//! Transducer data model.
//!
//! A machine is a flat list of states; state 0 is the start and the last
//! state is the unique accept state. Transitions carry optional input and
//! output labels plus a weight expression. The model is never transformed
//! here: normal forms (advancing nulls, wait/continue discipline) are the
//! model author's responsibility, and `validate` checks the properties the
//! generator depends on.

pub mod json;

use std::collections::BTreeSet;

use crate::error::ModelError;
use crate::expr::{self, WeightExpr};

pub type StateIndex = usize;
/// Position of a transition within its source state's outgoing list.
pub type TransIndex = usize;

// ─── Transitions ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MachineTransition {
    pub input: Option<String>,
    pub output: Option<String>,
    pub dest: StateIndex,
    pub weight: WeightExpr,
}

impl MachineTransition {
    pub fn new(
        input: Option<String>,
        output: Option<String>,
        dest: StateIndex,
        weight: WeightExpr,
    ) -> Self {
        MachineTransition {
            input,
            output,
            dest,
            weight,
        }
    }

    pub fn input_empty(&self) -> bool {
        self.input.as_deref().map_or(true, str::is_empty)
    }

    pub fn output_empty(&self) -> bool {
        self.output.as_deref().map_or(true, str::is_empty)
    }

    /// Empty on both tapes.
    pub fn is_null(&self) -> bool {
        self.input_empty() && self.output_empty()
    }
}

// ─── States ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct MachineState {
    pub name: Option<String>,
    pub trans: Vec<MachineTransition>,
}

impl MachineState {
    /// A waiting state is parked until the input tape moves: every outgoing
    /// transition consumes input. Vacuously true for the terminal state.
    pub fn waits(&self) -> bool {
        self.trans.iter().all(|t| !t.input_empty())
    }

    /// A continuing state never touches the input tape and is not terminal.
    pub fn continues(&self) -> bool {
        !self.trans.is_empty() && self.trans.iter().all(|t| t.input_empty())
    }

    pub fn terminates(&self) -> bool {
        self.trans.is_empty()
    }
}

// ─── Machine ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Machine {
    pub states: Vec<MachineState>,
    /// Parameter definition table in model-file order. Ordinals are
    /// positional, so order is meaningful.
    pub defs: Vec<(String, WeightExpr)>,
}

impl Machine {
    pub fn n_states(&self) -> usize {
        self.states.len()
    }

    pub fn start_state(&self) -> StateIndex {
        0
    }

    pub fn end_state(&self) -> StateIndex {
        self.n_states().saturating_sub(1)
    }

    /// Sorted, deduplicated nonempty input labels.
    pub fn input_alphabet(&self) -> Vec<String> {
        self.alphabet(|t| t.input.as_deref())
    }

    /// Sorted, deduplicated nonempty output labels.
    pub fn output_alphabet(&self) -> Vec<String> {
        self.alphabet(|t| t.output.as_deref())
    }

    fn alphabet(&self, label: impl Fn(&MachineTransition) -> Option<&str>) -> Vec<String> {
        let mut set = BTreeSet::new();
        for state in &self.states {
            for trans in &state.trans {
                if let Some(sym) = label(trans) {
                    if !sym.is_empty() {
                        set.insert(sym.to_string());
                    }
                }
            }
        }
        set.into_iter().collect()
    }

    /// Names referenced by any weight but defined nowhere. These become
    /// runtime parameter-table lookups in generated code.
    pub fn free_params(&self) -> Vec<String> {
        let defined: BTreeSet<&str> = self.defs.iter().map(|(n, _)| n.as_str()).collect();
        let mut free = BTreeSet::new();
        for state in &self.states {
            for trans in &state.trans {
                for name in trans.weight.params() {
                    if !defined.contains(name.as_str()) {
                        free.insert(name);
                    }
                }
            }
        }
        for (_, body) in &self.defs {
            for name in body.params() {
                if !defined.contains(name.as_str()) {
                    free.insert(name);
                }
            }
        }
        free.into_iter().collect()
    }

    pub fn n_transitions(&self) -> usize {
        self.states.iter().map(|s| s.trans.len()).sum()
    }

    /// Structural checks the generator depends on: the machine is nonempty,
    /// every destination is in range, every null transition advances
    /// (`dest > src`, which makes within-row null propagation sound), and
    /// the accept state has no way out.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.states.is_empty() {
            return Err(ModelError::Empty);
        }
        for (src, state) in self.states.iter().enumerate() {
            for trans in &state.trans {
                if trans.dest >= self.n_states() {
                    return Err(ModelError::StateOutOfRange {
                        index: trans.dest,
                        n_states: self.n_states(),
                    });
                }
                if trans.is_null() && trans.dest <= src {
                    return Err(ModelError::NonAdvancingNull {
                        from: src,
                        to: trans.dest,
                    });
                }
            }
        }
        if !self.states[self.end_state()].trans.is_empty() {
            return Err(ModelError::AcceptNotTerminal(self.end_state()));
        }
        Ok(())
    }
}

// ─── Tests ────────────────────────────────────────────────────────
