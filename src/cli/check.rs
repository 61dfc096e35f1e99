use std::path::{Path, PathBuf};
use std::process;

use clap::Args;

use weftc::diagnostic::Diagnostic;
use weftc::expr::topo::toposort_params;
use weftc::expr::ExprError;
use weftc::machine::Machine;

use super::{load_model, state_name};

#[derive(Args)]
pub struct CheckArgs {
    /// Input model .json file
    pub input: PathBuf,
}

pub fn cmd_check(args: CheckArgs) {
    let machine = load_model(&args.input);
    warn_constraints_ignored(&args.input);

    let text = match summary(&machine) {
        Ok(t) => t,
        Err(err) => {
            eprintln!("error: {}", err);
            process::exit(1);
        }
    };
    println!("{}", text);

    for s in unreachable_states(&machine) {
        eprintln!(
            "warning: state {} is unreachable from the start state",
            state_name(&machine, s)
        );
    }
    eprintln!("OK: {}", args.input.display());
}

/// Render the model summary: counts, alphabets, parameters, and the
/// definition table in the order generated code declares it.
fn summary(machine: &Machine) -> Result<String, ExprError> {
    let mut lines = Vec::new();
    lines.push(format!(
        "states: {} (start {}, accept {})",
        machine.n_states(),
        state_name(machine, machine.start_state()),
        state_name(machine, machine.end_state())
    ));
    lines.push(format!("transitions: {}", machine.n_transitions()));
    lines.push(alphabet_line("input alphabet", &machine.input_alphabet()));
    lines.push(alphabet_line("output alphabet", &machine.output_alphabet()));
    let free = machine.free_params();
    if free.is_empty() {
        lines.push("free parameters: (none)".to_string());
    } else {
        lines.push(format!("free parameters: {}", free.join(" ")));
    }
    if !machine.defs.is_empty() {
        let order = toposort_params(&machine.defs)?;
        lines.push("defs (emission order):".to_string());
        for name in &order {
            if let Some((_, body)) = machine.defs.iter().find(|(n, _)| n == name) {
                lines.push(format!("  {} = {}", name, body));
            }
        }
    }
    Ok(lines.join("\n"))
}

fn alphabet_line(label: &str, alphabet: &[String]) -> String {
    if alphabet.is_empty() {
        format!("{}: (none)", label)
    } else {
        format!("{}: {}", label, alphabet.join(" "))
    }
}

/// States no transition path from the start state reaches.
fn unreachable_states(machine: &Machine) -> Vec<usize> {
    let mut seen = vec![false; machine.n_states()];
    seen[machine.start_state()] = true;
    let mut stack = vec![machine.start_state()];
    while let Some(s) = stack.pop() {
        for t in &machine.states[s].trans {
            if !seen[t.dest] {
                seen[t.dest] = true;
                stack.push(t.dest);
            }
        }
    }
    (0..machine.n_states()).filter(|&s| !seen[s]).collect()
}

/// Warn when the model carries a constraints section from the fitting
/// pipeline. Generation only reads `state` and `defs`.
fn warn_constraints_ignored(path: &Path) {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(_) => return,
    };
    let doc: serde_json::Value = match serde_json::from_str(&source) {
        Ok(v) => v,
        Err(_) => return,
    };
    if doc.get("cons").is_none() {
        return;
    }
    let start = source.find("\"cons\"").unwrap_or(0);
    Diagnostic::warning("constraints section is ignored".to_string(), start, start + 6)
        .with_note("code generation reads `state` and `defs` only".to_string())
        .render(&path.to_string_lossy(), &source);
}

// ─── Tests ────────────────────────────────────────────────────────
