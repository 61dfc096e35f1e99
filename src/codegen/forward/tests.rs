use crate::codegen::backend::create_backend;
use crate::codegen::{compile_forward, Generator, SeqKind};
use crate::expr::{self, WeightExpr};
use crate::machine::{Machine, MachineState, MachineTransition};

fn machine(states: Vec<MachineState>) -> Machine {
    Machine {
        states,
        defs: vec![],
    }
}

fn state(name: &str, trans: Vec<MachineTransition>) -> MachineState {
    MachineState {
        name: Some(name.to_string()),
        trans,
    }
}

fn tr(input: &str, output: &str, dest: usize, weight: WeightExpr) -> MachineTransition {
    MachineTransition::new(
        if input.is_empty() {
            None
        } else {
            Some(input.to_string())
        },
        if output.is_empty() {
            None
        } else {
            Some(output.to_string())
        },
        dest,
        weight,
    )
}

/// Copies one `a` from input to output, then stops.
fn echo_machine() -> Machine {
    machine(vec![
        state("start", vec![tr("a", "a", 1, expr::param("pEcho"))]),
        state("end", vec![]),
    ])
}

#[test]
fn test_js_token_echo_golden() {
    let src = compile_forward(
        &echo_machine(),
        SeqKind::TokenList,
        SeqKind::TokenList,
        "js",
        "score",
    )
    .unwrap();
    let expected = r#"// generated automatically by weftc, do not edit
var sp = require('./softplus.js')
function score (x, y, p) {
  const sx = x.length;
  const sy = y.length;
  const t1_1 = sp.int_log (p["pEcho"]);
  var buf0 = new Array(sx + 1).fill(0).map (function() { return new Array (4).fill(0) });
  var buf1 = new Array(sx + 1).fill(0).map (function() { return new Array (4).fill(0) });
  var ix = 0, iy;
  {
    var cell = buf0[0];
    cell[0] = sp.bound_intlog (0);
    cell[1] = cell[0];
    cell[2] = -sp.SOFTPLUS_INTLOG_INFINITY;
    cell[3] = cell[2];
  }
  for (ix = 1; ix <= sx; ++ix) {
    var cell = buf0[ix];
    const xcell = buf0[ix - 1];
    switch (x[ix - 1]) {
      case 0:
        cell[0] = -sp.SOFTPLUS_INTLOG_INFINITY;
        cell[1] = cell[0];
        cell[2] = -sp.SOFTPLUS_INTLOG_INFINITY;
        cell[3] = cell[2];
        break;
      default:
        return Infinity;
        break;
    }
  }
  for (iy = 1; iy <= sy; ++iy) {
    var current = iy & 1 ? buf1 : buf0;
    var prev = iy & 1 ? buf0 : buf1;
    switch (y[iy - 1]) {
      case 0:
        {
          var cell = current[0];
          const ycell = prev[0];
          cell[0] = -sp.SOFTPLUS_INTLOG_INFINITY;
          cell[1] = cell[0];
          cell[2] = -sp.SOFTPLUS_INTLOG_INFINITY;
          cell[3] = cell[2];
        }
        for (ix = 1; ix <= sx; ++ix) {
          var cell = current[ix];
          const xcell = current[ix - 1];
          const ycell = prev[ix];
          const xycell = prev[ix - 1];
          switch (x[ix - 1]) {
            case 0:
              cell[0] = -sp.SOFTPLUS_INTLOG_INFINITY;
              cell[1] = cell[0];
              cell[2] = sp.bound_intlog (xycell[1] + t1_1);
              cell[3] = cell[2];
              break;
            default:
              return Infinity;
              break;
          }
        }
        break;
      default:
        return Infinity;
        break;
      }
  }
  const result = sp.int_to_log ((sy & 1 ? buf1 : buf0)[sx][3]);
  return result;
}
module.exports = { score: score }
"#;
    assert_eq!(src, expected);
}

#[test]
fn test_cpp_token_echo_structure() {
    let src = compile_forward(
        &echo_machine(),
        SeqKind::TokenList,
        SeqKind::TokenList,
        "cpp",
        "score",
    )
    .unwrap();
    assert!(src.contains("#include \"softplus.h\""));
    assert!(src.contains("#include <limits>"));
    assert!(src.contains(
        "double score (const vector<int>& x, const vector<int>& y, const map<string,double>& p) {"
    ));
    assert!(src.contains("  const SoftPlus sp;\n"));
    assert!(src.contains("  const long long t1_1 = sp.int_log (p.at(string(\"pEcho\")));\n"));
    assert!(src.contains("  long long* buf0 = new long long [(sx + 1) * (4)];\n"));
    assert!(src.contains("    long long* cell = (buf0 + 4 * (ix));\n"));
    assert!(src.contains("    cell[0] = SoftPlus::bound_intlog (0);\n"));
    assert!(src.contains(
        "  const double result = sp.int_to_log (((sy & 1 ? buf1 : buf0) + 4 * (sx))[3]);\n"
    ));
    assert!(src.contains("  delete[] buf0;\n"));
    assert!(src.contains("  delete[] buf1;\n"));
    assert!(src.contains("      return numeric_limits<double>::infinity();\n"));
    assert!(src.ends_with("  return result;\n}\n"));
    assert!(!src.contains("module.exports"));
    // Token vectors never allocate the profile scratch arrays.
    assert!(!src.contains("delete[] mx"));
    assert!(!src.contains("delete[] vy"));
}

#[test]
fn test_profile_input_fills_and_rereads_row() {
    let src = compile_forward(
        &echo_machine(),
        SeqKind::Profile,
        SeqKind::TokenList,
        "js",
        "f",
    )
    .unwrap();
    // One log-probability matrix, filled during the first sweep.
    assert!(src.contains(
        "  var mx = new Array(sx + 1).fill(0).map (function() { return new Array (2).fill(0) });\n"
    ));
    assert!(src.contains("    var vx = mx[ix - 1];\n"));
    assert!(src.contains("    vx[0] = sp.int_log (x[ix - 1][0]);\n"));
    assert!(src.contains("    vx[1] = sp.int_log (x[ix - 1][1]);\n"));
    // Later passes reread the same row without refilling it.
    assert!(src.contains("          const vx = mx[ix - 1];\n"));
    assert_eq!(src.matches("vx[0] = ").count(), 1);
    // The wait value absorbs an input gap through the trailing column.
    assert!(src.contains("xcell[1] + vx[1]"));
    // Symbol marginals index the token's column.
    assert!(src.contains("xycell[1] + t1_1 + vx[0]"));
    // No switch on the input side.
    assert!(!src.contains("switch (x[ix - 1])"));
}

#[test]
fn test_profile_output_vector_is_refilled_per_row() {
    let src = compile_forward(
        &echo_machine(),
        SeqKind::TokenList,
        SeqKind::Profile,
        "js",
        "f",
    )
    .unwrap();
    assert!(src.contains("  var vy = new Array(2).fill(0);\n"));
    assert!(src.contains("    vy[0] = sp.int_log (y[iy - 1][0]);\n"));
    assert!(src.contains("    vy[1] = sp.int_log (y[iy - 1][1]);\n"));
    assert!(src.contains("xycell[1] + t1_1 + vy[0]"));
    assert!(!src.contains("switch (y[iy - 1])"));
    assert!(!src.contains("mx"));
}

#[test]
fn test_cpp_teardown_matches_allocation() {
    let src = compile_forward(
        &echo_machine(),
        SeqKind::Profile,
        SeqKind::Profile,
        "cpp",
        "f",
    )
    .unwrap();
    assert!(src.contains("  long long* mx = new long long [(sx + 1) * (2)];\n"));
    assert!(src.contains("  long long* vy = new long long [2];\n"));
    let mx = src.find("  delete[] mx;\n").unwrap();
    let vy = src.find("  delete[] vy;\n").unwrap();
    let b0 = src.find("  delete[] buf0;\n").unwrap();
    let b1 = src.find("  delete[] buf1;\n").unwrap();
    assert!(mx < vy && vy < b0 && b0 < b1);
}

#[test]
fn test_text_input_switches_on_characters() {
    let src = compile_forward(&echo_machine(), SeqKind::Text, SeqKind::Text, "js", "f").unwrap();
    assert!(src.contains("    switch (x[ix - 1]) {\n"));
    assert!(src.contains("      case 'a':\n"));
    assert!(src.contains("    switch (y[iy - 1]) {\n"));
    assert!(!src.contains("case 0:"));
}

#[test]
fn test_output_gap_marginal_requires_waiting_state() {
    // State 0 leaves on a null transition, so it never waits; state 1
    // consumes input on every outgoing transition.
    let m = machine(vec![
        state("relay", vec![tr("", "", 1, expr::dbl(0.9))]),
        state("copy", vec![tr("a", "b", 2, expr::param("w"))]),
        state("end", vec![]),
    ]);
    let src = compile_forward(&m, SeqKind::TokenList, SeqKind::Profile, "js", "f").unwrap();
    // Output-gap carry appears for the waiting states only (states 1 and
    // 2; the end state waits vacuously).
    assert!(!src.contains("ycell[0] + vy[1]"));
    assert!(src.contains("ycell[2] + vy[1]"));
    assert!(src.contains("ycell[4] + vy[1]"));
    // The carry sums with the null transition feeding state 1.
    assert!(src.contains(
        "cell[2] = sp.int_logsumexp (\n        ycell[2] + vy[1], \n        cell[1] + t1_1)"
    ));
}

#[test]
fn test_multiple_alternatives_span_lines() {
    // Two null paths converge on the end state.
    let m = machine(vec![
        state("s", vec![tr("", "", 1, expr::dbl(0.5)), tr("", "", 2, expr::dbl(0.25))]),
        state("m", vec![tr("", "", 2, expr::dbl(0.75))]),
        state("e", vec![]),
    ]);
    let src = compile_forward(&m, SeqKind::TokenList, SeqKind::TokenList, "js", "f").unwrap();
    assert!(src.contains(
        "    cell[4] = sp.int_logsumexp (\n      cell[1] + t1_2, \n      cell[3] + t2_1);\n"
    ));
    // A single null alternative is clamped instead.
    assert!(src.contains("    cell[2] = sp.bound_intlog (cell[1] + t1_1);\n"));
}

#[test]
fn test_defined_params_emit_in_dependency_order() {
    let mut m = echo_machine();
    m.states[0].trans[0].weight = expr::param("gapSc");
    m.defs = vec![
        (
            "gapSc".to_string(),
            expr::mul(expr::param("gapOpen"), expr::param("gapExtend")),
        ),
        ("gapOpen".to_string(), expr::dbl(0.1)),
    ];
    let src = compile_forward(&m, SeqKind::TokenList, SeqKind::TokenList, "js", "f").unwrap();
    let open = src.find("  const f2 = 0.1;\n").unwrap();
    let sc = src.find("  const f1 = f2*p[\"gapExtend\"];\n").unwrap();
    assert!(open < sc);
    assert!(src.contains("  const t1_1 = sp.int_log (f1);\n"));
}

#[test]
fn test_trace_cells_js() {
    let backend = create_backend("js").unwrap();
    let src = Generator::new(backend)
        .with_trace_cells(true)
        .forward(&echo_machine(), SeqKind::Profile, SeqKind::TokenList, "f")
        .unwrap();
    // Origin cell reports fixed coordinates and no vector dump.
    assert!(src.contains(r#"console.warn ("Cell(" + 0 + "," + 0 + ")" + " \"start\" go:""#));
    // The input sweep reports ix and the input row.
    assert!(src.contains(r#""Cell(" + ix + "," + 0 + ")" + " vx(" + "a:""#));
    assert!(src.contains(r#"" -:""#));
    assert!(src.contains(
        r#"(vx[0] <= -sp.SOFTPLUS_INTLOG_INFINITY ? "-inf" : (vx[0] >= sp.SOFTPLUS_INTLOG_INFINITY ? "inf" : vx[0]))"#
    ));
    assert!(src.contains(r#"" wait:""#));
    // Token-list output side never dumps a vy vector.
    assert!(!src.contains(" vy("));
}

#[test]
fn test_trace_cells_cpp_uses_stream_pieces() {
    let backend = create_backend("cpp").unwrap();
    let src = Generator::new(backend)
        .with_trace_cells(true)
        .forward(&echo_machine(), SeqKind::TokenList, SeqKind::TokenList, "f")
        .unwrap();
    assert!(src.contains(r#"cerr << "Cell(" << 0 << "," << 0 << ")""#));
    assert!(src.contains("<< endl;"));
    assert!(src.contains(r#"string("-inf")"#));
    assert!(src.contains("to_string(cell[0])"));
}

#[test]
fn test_unnamed_states_trace_by_index() {
    let m = machine(vec![
        MachineState {
            name: None,
            trans: vec![tr("a", "a", 1, expr::one())],
        },
        MachineState {
            name: None,
            trans: vec![],
        },
    ]);
    let backend = create_backend("js").unwrap();
    let src = Generator::new(backend)
        .with_trace_cells(true)
        .forward(&m, SeqKind::TokenList, SeqKind::TokenList, "f")
        .unwrap();
    assert!(src.contains(r#"" 0 go:""#));
    assert!(src.contains(r#"" 1 go:""#));
}
