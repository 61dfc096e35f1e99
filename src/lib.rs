pub mod codegen;
pub mod diagnostic;
pub mod error;
pub mod expr;
pub mod machine;
pub mod presets;

// Re-exports used by the CLI, tests and benches.
pub use codegen::{compile_forward, Generator, SeqKind};
pub use error::{CodegenError, ModelError};
pub use expr::{Expr, WeightExpr};
pub use machine::{Machine, MachineState, MachineTransition};
