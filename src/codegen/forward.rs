//! Forward-algorithm emitter: unrolls the machine's transition structure
//! into straight-line cell updates over a two-row dynamic-programming
//! sweep.
//!
//! The emission order mirrors the evaluation order of the generated
//! function: the origin cell, then the whole input axis at output position
//! zero, then one pass per output position with a ping-pong pair of row
//! buffers. Each cell holds two values per state, "go" (even column) and
//! "wait" (odd column), and every update reads only cells filled earlier
//! in the sweep, which is exactly what the null-transition advancement
//! check guarantees.

use std::collections::HashMap;

use crate::error::CodegenError;
use crate::expr::topo::toposort_params;
use crate::expr::WeightExpr;
use crate::machine::{Machine, StateIndex};

use super::analysis::{MachineAnalysis, Tokenizer};
use super::backend::{escape_str, Backend};
use super::reduce::log_sum_exp;
use super::translate::{func_var, trans_var, ExprRenderer};
use super::SeqKind;

// Fixed local names inside the generated function.
const XVAR: &str = "x";
const YVAR: &str = "y";
const PARAM_VAR: &str = "p";
const BUF0: &str = "buf0";
const BUF1: &str = "buf1";
const CURRENT: &str = "current";
const PREV: &str = "prev";
const RESULT_VAR: &str = "result";
const CELL: &str = "cell";
const XCELL: &str = "xcell";
const YCELL: &str = "ycell";
const XYCELL: &str = "xycell";
const XIDX: &str = "ix";
const YIDX: &str = "iy";
const XMAT: &str = "mx";
const XVEC: &str = "vx";
const YVEC: &str = "vy";
const XSIZE: &str = "sx";
const YSIZE: &str = "sy";

const TAB: &str = "  ";
const TAB2: &str = "    ";
const TAB3: &str = "      ";

pub(crate) struct ForwardEmitter<'a> {
    pub backend: &'a dyn Backend,
    pub machine: &'a Machine,
    pub analysis: MachineAnalysis<'a>,
    pub input: SeqKind,
    pub output: SeqKind,
    pub trace_cells: bool,
}

impl ForwardEmitter<'_> {
    pub fn emit(&self, func_name: &str) -> Result<String, CodegenError> {
        let b = self.backend;
        let n = self.machine.n_states();
        let renderer = ExprRenderer {
            backend: b,
            func_idx: &self.analysis.func_idx,
        };
        let mut out = String::new();

        out.push_str("// generated automatically by weftc, do not edit\n");
        out.push_str(b.preamble());
        out.push_str(&format!(
            "{} {} ({}{}, {}{}, {}{}) {{\n",
            b.func_keyword(),
            func_name,
            self.seq_type(self.input),
            XVAR,
            self.seq_type(self.output),
            YVAR,
            b.params_type(),
            PARAM_VAR,
        ));
        out.push_str(b.func_init());
        out.push_str(&format!(
            "{}{} {} = {}.{};\n",
            TAB,
            b.size_type(),
            XSIZE,
            XVAR,
            b.size_method()
        ));
        out.push_str(&format!(
            "{}{} {} = {}.{};\n",
            TAB,
            b.size_type(),
            YSIZE,
            YVAR,
            b.size_method()
        ));

        // Parameter locals, defined before first use.
        let def_of: HashMap<&str, &WeightExpr> = self
            .machine
            .defs
            .iter()
            .map(|(name, body)| (name.as_str(), body))
            .collect();
        for name in toposort_params(&self.machine.defs)? {
            out.push_str(&format!(
                "{}{} {} = {};\n",
                TAB,
                b.weight_type(),
                func_var(self.analysis.func_idx[&name]),
                renderer.render(def_of[name.as_str()], 0)
            ));
        }

        // One clamped log-space local per transition weight.
        for (s, state) in self.machine.states.iter().enumerate() {
            for (t, trans) in state.trans.iter().enumerate() {
                out.push_str(&format!(
                    "{}{} {} = {};\n",
                    TAB,
                    b.log_weight_type(),
                    trans_var(s, t),
                    b.unary_log(&renderer.render(&trans.weight, 0))
                ));
            }
        }

        if self.input == SeqKind::Profile {
            out.push_str(&format!(
                "{}{}\n",
                TAB,
                b.declare_matrix(
                    XMAT,
                    &format!("{} + 1", XSIZE),
                    &self.analysis.input_tok.n_columns().to_string()
                )
            ));
        }
        if self.output == SeqKind::Profile {
            out.push_str(&format!(
                "{}{}\n",
                TAB,
                b.declare_vector(YVEC, &self.analysis.output_tok.n_columns().to_string())
            ));
        }
        for buf in [BUF0, BUF1] {
            out.push_str(&format!(
                "{}{}\n",
                TAB,
                b.declare_matrix(buf, &format!("{} + 1", XSIZE), &(2 * n).to_string())
            ));
        }
        out.push_str(&format!(
            "{}{} {} = 0, {};\n",
            TAB,
            b.index_type(),
            XIDX,
            YIDX
        ));

        self.emit_origin(&mut out);
        self.emit_x_sweep(&mut out);
        self.emit_y_sweep(&mut out);

        // The score sits in the end state's wait value of the last cell.
        let final_buf = format!("({} & 1 ? {} : {})", YSIZE, BUF1, BUF0);
        let final_cell = format!("{}[{}]", self.buf_row(&final_buf, XSIZE), 2 * n - 1);
        out.push_str(&format!(
            "{}{} {} = {};\n",
            TAB,
            b.result_type(),
            RESULT_VAR,
            b.real_log(&final_cell)
        ));
        if self.input == SeqKind::Profile {
            out.push_str(&b.delete_array(XMAT));
        }
        if self.output == SeqKind::Profile {
            out.push_str(&b.delete_array(YVEC));
        }
        out.push_str(&b.delete_array(BUF0));
        out.push_str(&b.delete_array(BUF1));
        out.push_str(&format!("{}return {};\n", TAB, RESULT_VAR));
        out.push_str("}\n");
        out.push_str(&b.postamble(&[func_name.to_string()]));
        Ok(out)
    }

    fn seq_type(&self, kind: SeqKind) -> &'static str {
        match kind {
            SeqKind::Profile => self.backend.matrix_type(),
            SeqKind::TokenList => self.backend.token_vec_type(),
            SeqKind::Text => self.backend.string_type(),
        }
    }

    fn buf_row(&self, buf: &str, row: &str) -> String {
        let row_size = (2 * self.machine.n_states()).to_string();
        self.backend.array_row_accessor(buf, row, &row_size)
    }

    fn input_row(&self, row: &str) -> String {
        let row_size = self.analysis.input_tok.n_columns().to_string();
        self.backend.array_row_accessor(XMAT, row, &row_size)
    }

    fn case_label(&self, kind: SeqKind, tokzr: &Tokenizer, tok: usize) -> String {
        match kind {
            SeqKind::Text => format!("case '{}':", tokzr.tok2sym[tok]),
            _ => format!("case {}:", tok - 1),
        }
    }

    // ─── Sweeps ─────────────────────────────────────────────────────────

    fn emit_origin(&self, out: &mut String) {
        let b = self.backend;
        out.push_str(&format!("{}{{\n", TAB));
        out.push_str(&format!(
            "{}{} {} = {};\n",
            TAB2,
            b.cell_ref_type(),
            CELL,
            self.buf_row(BUF0, "0")
        ));
        self.store_transitions(out, TAB2, true, false, false, false, 0, 0, true);
        self.show_cell(out, TAB2, false, false);
        out.push_str(&format!("{}}}\n", TAB));
    }

    fn emit_x_sweep(&self, out: &mut String) {
        let b = self.backend;
        out.push_str(&format!(
            "{}for ({} = 1; {} <= {}; ++{}) {{\n",
            TAB, XIDX, XIDX, XSIZE, XIDX
        ));
        out.push_str(&format!(
            "{}{} {} = {};\n",
            TAB2,
            b.cell_ref_type(),
            CELL,
            self.buf_row(BUF0, XIDX)
        ));
        out.push_str(&format!(
            "{}{} {} = {};\n",
            TAB2,
            b.const_cell_ref_type(),
            XCELL,
            self.buf_row(BUF0, "ix - 1")
        ));
        let subject = b.const_array_accessor(XVAR, "ix - 1");
        let (xtab, x_toks) = if self.input == SeqKind::Profile {
            // The input row is logged once here and reread in every later
            // output pass.
            out.push_str(&format!(
                "{}{} {} = {};\n",
                TAB2,
                b.vec_ref_type(),
                XVEC,
                self.input_row("ix - 1")
            ));
            for col in 0..self.analysis.input_tok.n_columns() {
                out.push_str(&format!(
                    "{}{}[{}] = {};\n",
                    TAB2,
                    XVEC,
                    col,
                    b.unary_log(&b.const_array_accessor(&subject, &col.to_string()))
                ));
            }
            ("", 0..1)
        } else {
            out.push_str(&format!("{}switch ({}) {{\n", TAB2, subject));
            (TAB2, 1..self.analysis.input_tok.tok2sym.len())
        };
        for x_tok in x_toks {
            if self.input != SeqKind::Profile {
                out.push_str(&format!(
                    "{}{}{}\n",
                    xtab,
                    TAB,
                    self.case_label(self.input, &self.analysis.input_tok, x_tok)
                ));
            }
            let body = format!("{}{}", xtab, TAB2);
            self.store_transitions(out, &body, true, true, false, false, x_tok, 0, false);
            self.show_cell(out, &body, true, false);
            if self.input != SeqKind::Profile {
                out.push_str(&format!("{}break;\n", body));
            }
        }
        if self.input != SeqKind::Profile {
            out.push_str(&format!("{}{}default:\n", xtab, TAB));
            out.push_str(&format!("{}{}return {};\n", xtab, TAB2, b.real_infinity()));
            out.push_str(&format!("{}{}break;\n", xtab, TAB2));
            out.push_str(&format!("{}}}\n", TAB2));
        }
        out.push_str(&format!("{}}}\n", TAB));
    }

    fn emit_y_sweep(&self, out: &mut String) {
        let b = self.backend;
        out.push_str(&format!(
            "{}for ({} = 1; {} <= {}; ++{}) {{\n",
            TAB, YIDX, YIDX, YSIZE, YIDX
        ));
        out.push_str(&format!(
            "{}{} {} = {} & 1 ? {} : {};\n",
            TAB2,
            b.array_ref_type(),
            CURRENT,
            YIDX,
            BUF1,
            BUF0
        ));
        out.push_str(&format!(
            "{}{} {} = {} & 1 ? {} : {};\n",
            TAB2,
            b.array_ref_type(),
            PREV,
            YIDX,
            BUF0,
            BUF1
        ));
        let y_subject = b.const_array_accessor(YVAR, "iy - 1");
        let (ytab, y_toks) = if self.output == SeqKind::Profile {
            for col in 0..self.analysis.output_tok.n_columns() {
                out.push_str(&format!(
                    "{}{}[{}] = {};\n",
                    TAB2,
                    YVEC,
                    col,
                    b.unary_log(&b.const_array_accessor(&y_subject, &col.to_string()))
                ));
            }
            ("", 0..1)
        } else {
            out.push_str(&format!("{}switch ({}) {{\n", TAB2, y_subject));
            (TAB2, 1..self.analysis.output_tok.tok2sym.len())
        };
        for y_tok in y_toks {
            if self.output != SeqKind::Profile {
                out.push_str(&format!(
                    "{}{}{}\n",
                    ytab,
                    TAB,
                    self.case_label(self.output, &self.analysis.output_tok, y_tok)
                ));
            }
            // Column zero sees output-consuming transitions only.
            out.push_str(&format!("{}{}{{\n", ytab, TAB2));
            out.push_str(&format!(
                "{}{}{} {} = {};\n",
                ytab,
                TAB3,
                b.cell_ref_type(),
                CELL,
                self.buf_row(CURRENT, "0")
            ));
            out.push_str(&format!(
                "{}{}{} {} = {};\n",
                ytab,
                TAB3,
                b.const_cell_ref_type(),
                YCELL,
                self.buf_row(PREV, "0")
            ));
            let x0 = format!("{}{}", ytab, TAB3);
            self.store_transitions(out, &x0, true, false, true, false, 0, y_tok, false);
            self.show_cell(out, &x0, false, true);
            out.push_str(&format!("{}{}}}\n", ytab, TAB2));

            out.push_str(&format!(
                "{}{}for ({} = 1; {} <= {}; ++{}) {{\n",
                ytab, TAB2, XIDX, XIDX, XSIZE, XIDX
            ));
            out.push_str(&format!(
                "{}{}{} {} = {};\n",
                ytab,
                TAB3,
                b.cell_ref_type(),
                CELL,
                self.buf_row(CURRENT, XIDX)
            ));
            out.push_str(&format!(
                "{}{}{} {} = {};\n",
                ytab,
                TAB3,
                b.const_cell_ref_type(),
                XCELL,
                self.buf_row(CURRENT, "ix - 1")
            ));
            out.push_str(&format!(
                "{}{}{} {} = {};\n",
                ytab,
                TAB3,
                b.const_cell_ref_type(),
                YCELL,
                self.buf_row(PREV, XIDX)
            ));
            out.push_str(&format!(
                "{}{}{} {} = {};\n",
                ytab,
                TAB3,
                b.const_cell_ref_type(),
                XYCELL,
                self.buf_row(PREV, "ix - 1")
            ));
            let x_subject = b.const_array_accessor(XVAR, "ix - 1");
            let (xytab, x_toks) = if self.input == SeqKind::Profile {
                out.push_str(&format!(
                    "{}{}{} {} = {};\n",
                    ytab,
                    TAB3,
                    b.const_vec_ref_type(),
                    XVEC,
                    self.input_row("ix - 1")
                ));
                (ytab.to_string(), 0..1)
            } else {
                out.push_str(&format!("{}{}switch ({}) {{\n", ytab, TAB3, x_subject));
                (
                    format!("{}{}", ytab, TAB2),
                    1..self.analysis.input_tok.tok2sym.len(),
                )
            };
            for x_tok in x_toks {
                if self.input != SeqKind::Profile {
                    out.push_str(&format!(
                        "{}{}{}\n",
                        xytab,
                        TAB2,
                        self.case_label(self.input, &self.analysis.input_tok, x_tok)
                    ));
                }
                let body = format!("{}{}", xytab, TAB3);
                self.store_transitions(out, &body, true, true, true, true, x_tok, y_tok, false);
                self.show_cell(out, &body, true, true);
                if self.input != SeqKind::Profile {
                    out.push_str(&format!("{}break;\n", body));
                }
            }
            if self.input != SeqKind::Profile {
                out.push_str(&format!("{}{}default:\n", xytab, TAB2));
                out.push_str(&format!("{}{}return {};\n", xytab, TAB3, b.real_infinity()));
                out.push_str(&format!("{}{}break;\n", xytab, TAB3));
                out.push_str(&format!("{}{}}}\n", xytab, TAB));
            }
            out.push_str(&format!("{}{}}}\n", ytab, TAB2));
            if self.output != SeqKind::Profile {
                out.push_str(&format!("{}{}break;\n", ytab, TAB2));
            }
        }
        if self.output != SeqKind::Profile {
            out.push_str(&format!("{}{}default:\n", ytab, TAB));
            out.push_str(&format!("{}{}return {};\n", ytab, TAB2, b.real_infinity()));
            out.push_str(&format!("{}{}break;\n", ytab, TAB2));
            out.push_str(&format!("{}{}}}\n", ytab, TAB));
        }
        out.push_str(&format!("{}}}\n", TAB));
    }

    // ─── Cell updates ───────────────────────────────────────────────────

    /// Write the full block of cell updates for one (ix, iy) cell. The
    /// `with_*` flags select which transition classes can fire here; the
    /// token arguments are zero for profile sides and the matched symbol
    /// token for discrete sides.
    #[allow(clippy::too_many_arguments)]
    fn store_transitions(
        &self,
        out: &mut String,
        indent: &str,
        with_null: bool,
        with_input: bool,
        with_output: bool,
        with_both: bool,
        in_tok: usize,
        out_tok: usize,
        start: bool,
    ) {
        let line_indent = format!("{}{}", indent, TAB);
        for s in 0..self.machine.n_states() {
            for output_waiting in [false, true] {
                let mut exprs: Vec<String> = Vec::new();
                if start && s == 0 && !output_waiting {
                    exprs.push("0".to_string());
                }
                if with_input {
                    self.add_transitions(&mut exprs, true, false, s, in_tok, out_tok, output_waiting);
                }
                if with_output {
                    self.add_transitions(&mut exprs, false, true, s, in_tok, out_tok, output_waiting);
                }
                if with_both {
                    self.add_transitions(&mut exprs, true, true, s, in_tok, out_tok, output_waiting);
                }
                if with_null {
                    self.add_transitions(&mut exprs, false, false, s, in_tok, out_tok, output_waiting);
                }
                out.push_str(&format!(
                    "{}{}[{}] = {};\n",
                    indent,
                    CELL,
                    2 * s + usize::from(output_waiting),
                    log_sum_exp(self.backend, &exprs, &line_indent, true, output_waiting)
                ));
            }
        }
    }

    /// Collect the summands for state `s` contributed by transitions of
    /// one input/output class.
    #[allow(clippy::too_many_arguments)]
    fn add_transitions(
        &self,
        exprs: &mut Vec<String>,
        with_input: bool,
        with_output: bool,
        s: StateIndex,
        in_tok: usize,
        out_tok: usize,
        output_waiting: bool,
    ) {
        if output_waiting {
            // A wait value is reached by absorbing an input gap, or by
            // parking the freshly computed go value.
            if with_input && !with_output && in_tok == 0 {
                exprs.push(format!(
                    "{}[{}] + {}[{}]",
                    XCELL,
                    2 * s + 1,
                    XVEC,
                    self.analysis.input_tok.gap_column()
                ));
            }
            if !with_input && !with_output {
                exprs.push(format!("{}[{}]", CELL, 2 * s));
            }
            return;
        }
        if with_output && !with_input && self.machine.states[s].waits() && out_tok == 0 {
            exprs.push(format!(
                "{}[{}] + {}[{}]",
                YCELL,
                2 * s,
                YVEC,
                self.analysis.output_tok.gap_column()
            ));
        }
        let src_row = if with_output {
            if with_input {
                XYCELL
            } else {
                YCELL
            }
        } else if with_input {
            XCELL
        } else {
            CELL
        };
        for &(src, t) in &self.analysis.incoming[s] {
            let trans = &self.machine.states[src].trans[t];
            if with_input == trans.input_empty() || with_output == trans.output_empty() {
                continue;
            }
            if with_input
                && in_tok != 0
                && trans.input.as_deref().unwrap_or("") != self.analysis.input_tok.tok2sym[in_tok]
            {
                continue;
            }
            if with_output
                && out_tok != 0
                && trans.output.as_deref().unwrap_or("")
                    != self.analysis.output_tok.tok2sym[out_tok]
            {
                continue;
            }
            let mut term = format!("{}[{}] + {}", src_row, 2 * src + 1, trans_var(src, t));
            if with_input && in_tok == 0 {
                let sym = trans.input.as_deref().unwrap_or("");
                term.push_str(&format!(
                    " + {}[{}]",
                    XVEC,
                    self.analysis.input_tok.sym2tok[sym] - 1
                ));
            }
            if with_output && out_tok == 0 {
                let sym = trans.output.as_deref().unwrap_or("");
                term.push_str(&format!(
                    " + {}[{}]",
                    YVEC,
                    self.analysis.output_tok.sym2tok[sym] - 1
                ));
            }
            exprs.push(term);
        }
    }

    // ─── Tracing ────────────────────────────────────────────────────────

    fn show_cell(&self, out: &mut String, indent: &str, with_input: bool, with_output: bool) {
        if !self.trace_cells {
            return;
        }
        let mut desc: Vec<String> = vec!["\"Cell(\"".to_string()];
        desc.push(if with_input {
            XIDX.to_string()
        } else {
            "0".to_string()
        });
        desc.push("\",\"".to_string());
        desc.push(if with_output {
            YIDX.to_string()
        } else {
            "0".to_string()
        });
        desc.push("\")\"".to_string());
        if with_input && self.input == SeqKind::Profile {
            self.push_vector_dump(&mut desc, XVEC, &self.analysis.input_tok);
        }
        if with_output && self.output == SeqKind::Profile {
            self.push_vector_dump(&mut desc, YVEC, &self.analysis.output_tok);
        }
        for s in 0..self.machine.n_states() {
            desc.push(format!("\" {} go:\"", escape_str(&self.state_label(s))));
            desc.push(self.val_or_inf(&format!("{}[{}]", CELL, 2 * s)));
            desc.push("\" wait:\"".to_string());
            desc.push(self.val_or_inf(&format!("{}[{}]", CELL, 2 * s + 1)));
        }
        out.push_str(indent);
        out.push_str(&self.backend.warn(&desc));
        out.push('\n');
    }

    fn push_vector_dump(&self, desc: &mut Vec<String>, name: &str, tokzr: &Tokenizer) {
        desc.push(format!("\" {}(\"", name));
        for col in 0..tokzr.n_columns() {
            let label = if col == tokzr.gap_column() {
                "-".to_string()
            } else {
                escape_str(&tokzr.tok2sym[col + 1])
            };
            desc.push(format!("{}{}:\"", if col > 0 { "\" " } else { "\"" }, label));
            desc.push(self.val_or_inf(&format!("{}[{}]", name, col)));
        }
        desc.push("\")\"".to_string());
    }

    fn val_or_inf(&self, arg: &str) -> String {
        let b = self.backend;
        format!(
            "({} <= -{} ? {} : ({} >= {} ? {} : {}))",
            arg,
            b.infinity(),
            b.make_string("\"-inf\""),
            arg,
            b.infinity(),
            b.make_string("\"inf\""),
            b.to_string_expr(arg)
        )
    }

    fn state_label(&self, s: StateIndex) -> String {
        match &self.machine.states[s].name {
            Some(name) => serde_json::Value::String(name.clone()).to_string(),
            None => s.to_string(),
        }
    }
}

#[cfg(test)]
mod tests;
