use std::path::{Path, PathBuf};
use std::process;

use clap::Args;

use weftc::codegen::backend::create_backend;
use weftc::codegen::{Generator, SeqKind};

use super::{load_model, parse_seq_kind, state_name};

#[derive(Args)]
pub struct BuildArgs {
    /// Input model .json file
    pub input: PathBuf,
    /// Output source file (default: the model path with the target's extension)
    #[arg(short, long, conflicts_with = "stdout")]
    pub output: Option<PathBuf>,
    /// Target language (js or cpp)
    #[arg(long, default_value = "js")]
    pub target: String,
    /// Input sequence kind (profile, tokens or text)
    #[arg(long, default_value = "tokens")]
    pub input_seq: String,
    /// Output sequence kind (profile, tokens or text)
    #[arg(long, default_value = "tokens")]
    pub output_seq: String,
    /// Name of the generated function (default: the model file stem)
    #[arg(long)]
    pub name: Option<String>,
    /// Print the generated source to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,
    /// Emit per-cell diagnostic prints into the generated code
    #[arg(long)]
    pub trace_cells: bool,
}

pub fn cmd_build(args: BuildArgs) {
    let BuildArgs {
        input,
        output,
        target,
        input_seq,
        output_seq,
        name,
        stdout,
        trace_cells,
    } = args;

    let backend = match create_backend(&target) {
        Some(b) => b,
        None => {
            eprintln!("error: unknown target '{}' (expected js or cpp)", target);
            process::exit(1);
        }
    };
    let input_kind = parse_seq_kind("--input-seq", &input_seq);
    let output_kind = parse_seq_kind("--output-seq", &output_seq);
    let func_name = name.unwrap_or_else(|| default_func_name(&input));

    let machine = load_model(&input);
    if output_kind == SeqKind::Profile {
        // Only waiting states absorb a profile position's gap weight.
        for (s, state) in machine.states.iter().enumerate() {
            if !state.waits() && !state.continues() {
                eprintln!(
                    "warning: state {} mixes input-consuming and input-free transitions, so it never absorbs an output-profile gap",
                    state_name(&machine, s)
                );
            }
        }
    }
    let generator = Generator::new(backend).with_trace_cells(trace_cells);
    let source = match generator.forward(&machine, input_kind, output_kind, &func_name) {
        Ok(s) => s,
        Err(err) => {
            eprintln!("error: {}", err);
            process::exit(1);
        }
    };

    if stdout {
        print!("{}", source);
        return;
    }

    let extension = generator.backend().output_extension();
    let out_path =
        output.unwrap_or_else(|| input.with_extension(extension.trim_start_matches('.')));
    if let Err(e) = std::fs::write(&out_path, &source) {
        eprintln!("error: cannot write '{}': {}", out_path.display(), e);
        process::exit(1);
    }
    eprintln!("Compiled -> {}", out_path.display());
}

/// Derive a function name from the model file stem, squashed down to an
/// identifier both targets accept.
fn default_func_name(input: &Path) -> String {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("forward");
    let mut name = String::with_capacity(stem.len());
    for c in stem.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            name.push(c);
        } else {
            name.push('_');
        }
    }
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_func_name() {
        assert_eq!(default_func_name(Path::new("models/psw.json")), "psw");
        assert_eq!(default_func_name(Path::new("my-model.json")), "my_model");
        assert_eq!(default_func_name(Path::new("3mer.json")), "_3mer");
    }
}
