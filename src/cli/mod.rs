//! Subcommands of the `weftc` binary.
//!
//! Each subcommand is a clap `Args` struct plus a `cmd_*` entry point in its
//! own module. Failures print `error: ...` to stderr and exit nonzero;
//! model loading funnels through [`load_model`] so JSON syntax errors always
//! come out as underlined reports.

pub mod build;
pub mod check;
pub mod init;

use std::path::Path;
use std::process;

use weftc::codegen::SeqKind;
use weftc::diagnostic;
use weftc::machine::Machine;

/// Load and validate a model file, exiting with a report on any failure.
pub fn load_model(path: &Path) -> Machine {
    let loaded = Machine::load(path).and_then(|m| {
        m.validate()?;
        Ok(m)
    });
    match loaded {
        Ok(machine) => machine,
        Err(err) => {
            let source = std::fs::read_to_string(path).unwrap_or_default();
            diagnostic::report_model_error(&path.to_string_lossy(), &source, &err);
            process::exit(1);
        }
    }
}

/// Display name for a state: its id when the model has one, else its index.
pub fn state_name(machine: &Machine, s: usize) -> String {
    match &machine.states[s].name {
        Some(name) => name.clone(),
        None => s.to_string(),
    }
}

/// Map a sequence-kind flag value to a `SeqKind`.
pub fn parse_seq_kind(flag: &str, value: &str) -> SeqKind {
    match value {
        "profile" => SeqKind::Profile,
        "tokens" => SeqKind::TokenList,
        "text" => SeqKind::Text,
        other => {
            eprintln!(
                "error: {} must be profile, tokens or text (got '{}')",
                flag, other
            );
            process::exit(1);
        }
    }
}
