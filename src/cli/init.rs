use std::path::PathBuf;
use std::process;

use clap::Args;

use weftc::presets;

#[derive(Args)]
pub struct InitArgs {
    /// Model name, used as the state-name prefix
    pub name: String,
    /// Emission alphabet, one character per token
    #[arg(short, long)]
    pub alphabet: String,
    /// Number of geometric components in the indel-length mixture
    #[arg(short, long, default_value_t = 0)]
    pub mix: usize,
    /// Use separate insertion and deletion parameters
    #[arg(short, long)]
    pub irrev: bool,
    /// Write the model here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn cmd_init(args: InitArgs) {
    if args.alphabet.is_empty() {
        eprintln!("error: alphabet must not be empty");
        process::exit(1);
    }

    let machine = presets::pair_hmm(&args.name, &args.alphabet, args.mix, args.irrev);
    let text = match serde_json::to_string_pretty(&machine.to_json_value()) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    match args.output {
        Some(path) => {
            if let Err(e) = std::fs::write(&path, &text) {
                eprintln!("error: cannot write '{}': {}", path.display(), e);
                process::exit(1);
            }
            eprintln!("Created {}", path.display());
        }
        None => println!("{}", text),
    }
}
