//! Code generation: turns a validated [`Machine`] into standalone source
//! text that scores an input/output sequence pair under the Forward
//! algorithm.
//!
//! The pipeline splits into machine [`analysis`] (incoming-transition
//! index, tokenizers, parameter ordinals), weight-expression rendering in
//! `translate` and `reduce`, and the `forward` emitter that unrolls the
//! dynamic-programming recurrence. Everything target-specific lives behind
//! the [`Backend`] trait.

pub mod analysis;
pub mod backend;
mod forward;
mod reduce;
mod translate;

use crate::error::CodegenError;
use crate::machine::Machine;

use self::analysis::MachineAnalysis;
use self::backend::{create_backend, Backend};
use self::forward::ForwardEmitter;

// ─── Sequence presentation ───────────────────────────────────────────────

/// How one side of the sequence pair is passed to the generated function.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeqKind {
    /// Position-by-position symbol probabilities, one row per position
    /// with a trailing gap column.
    Profile,
    /// Vector of zero-based token indices into the alphabet.
    TokenList,
    /// Native string, one single-character symbol per position.
    Text,
}

// ─── Generator ───────────────────────────────────────────────────────────

/// Drives code generation for one target backend.
pub struct Generator {
    backend: Box<dyn Backend>,
    trace_cells: bool,
}

impl Generator {
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Generator {
            backend,
            trace_cells: false,
        }
    }

    /// Emit a diagnostic print of every cell as it is filled.
    pub fn with_trace_cells(mut self, trace_cells: bool) -> Self {
        self.trace_cells = trace_cells;
        self
    }

    pub fn backend(&self) -> &dyn Backend {
        &*self.backend
    }

    /// Generate the Forward scoring function for `machine`.
    ///
    /// The machine must already be in normal form: every null transition
    /// advances the state index, so the emitted cell updates only ever read
    /// rows and columns that were filled earlier in the sweep.
    pub fn forward(
        &self,
        machine: &Machine,
        input: SeqKind,
        output: SeqKind,
        func_name: &str,
    ) -> Result<String, CodegenError> {
        if machine.n_states() == 0 {
            return Err(CodegenError::EmptyMachine);
        }
        if input == SeqKind::Text {
            check_single_char(machine.input_alphabet(), "input")?;
        }
        if output == SeqKind::Text {
            check_single_char(machine.output_alphabet(), "output")?;
        }
        for (s, state) in machine.states.iter().enumerate() {
            for t in &state.trans {
                if t.is_null() && t.dest <= s {
                    return Err(CodegenError::NonAdvancingNull { from: s, to: t.dest });
                }
            }
        }
        let emitter = ForwardEmitter {
            backend: &*self.backend,
            machine,
            analysis: MachineAnalysis::new(machine),
            input,
            output,
            trace_cells: self.trace_cells,
        };
        emitter.emit(func_name)
    }
}

fn check_single_char(alphabet: Vec<String>, side: &'static str) -> Result<(), CodegenError> {
    for sym in alphabet {
        if sym.len() != 1 {
            return Err(CodegenError::MultiCharToken { side, token: sym });
        }
    }
    Ok(())
}

/// Look up `target_name` and generate the Forward scorer in one call.
pub fn compile_forward(
    machine: &Machine,
    input: SeqKind,
    output: SeqKind,
    target_name: &str,
    func_name: &str,
) -> Result<String, CodegenError> {
    let backend = create_backend(target_name)
        .ok_or_else(|| CodegenError::UnknownTarget(target_name.to_string()))?;
    Generator::new(backend).forward(machine, input, output, func_name)
}

// ─── Tests ───────────────────────────────────────────────────────────────
