use super::{escape_str, Backend};

// ─── JavaScript backend ───────────────────────────────────────────

/// JavaScript backend. Arrays are garbage-collected and dynamically sized,
/// so declarations allocate with `new Array(..).fill(0)` and teardown emits
/// nothing. The fixed-point log library is loaded from `./softplus.js`.
pub struct JsBackend;

impl Backend for JsBackend {
    fn target_name(&self) -> &str {
        "js"
    }
    fn output_extension(&self) -> &str {
        ".js"
    }

    fn preamble(&self) -> &'static str {
        "var sp = require('./softplus.js')\n"
    }
    fn func_keyword(&self) -> &'static str {
        "function"
    }
    fn func_init(&self) -> &'static str {
        ""
    }
    fn matrix_type(&self) -> &'static str {
        ""
    }
    fn token_vec_type(&self) -> &'static str {
        ""
    }
    fn string_type(&self) -> &'static str {
        ""
    }
    fn params_type(&self) -> &'static str {
        ""
    }
    fn vec_ref_type(&self) -> &'static str {
        "var"
    }
    fn const_vec_ref_type(&self) -> &'static str {
        "const"
    }
    fn array_ref_type(&self) -> &'static str {
        "var"
    }
    fn cell_ref_type(&self) -> &'static str {
        "var"
    }
    fn const_cell_ref_type(&self) -> &'static str {
        "const"
    }
    fn index_type(&self) -> &'static str {
        "var"
    }
    fn size_type(&self) -> &'static str {
        "const"
    }
    fn size_method(&self) -> &'static str {
        "length"
    }
    fn weight_type(&self) -> &'static str {
        "const"
    }
    fn log_weight_type(&self) -> &'static str {
        "const"
    }
    fn result_type(&self) -> &'static str {
        "const"
    }
    fn math_library(&self) -> &'static str {
        "Math."
    }
    fn infinity(&self) -> &'static str {
        "sp.SOFTPLUS_INTLOG_INFINITY"
    }
    fn real_infinity(&self) -> &'static str {
        "Infinity"
    }

    fn declare_matrix(&self, name: &str, dim1: &str, dim2: &str) -> String {
        format!(
            "var {} = new Array({}).fill(0).map (function() {{ return new Array ({}).fill(0) }});",
            name, dim1, dim2
        )
    }
    fn declare_vector(&self, name: &str, dim: &str) -> String {
        format!("var {} = new Array({}).fill(0);", name, dim)
    }
    fn delete_array(&self, _name: &str) -> String {
        String::new()
    }
    fn array_row_accessor(&self, name: &str, row: &str, _row_size: &str) -> String {
        format!("{}[{}]", name, row)
    }

    fn binary_softplus(&self, a: &str, b: &str) -> String {
        format!("sp.int_logsumexp ({}, {})", a, b)
    }
    fn unary_log(&self, x: &str) -> String {
        format!("sp.int_log ({})", x)
    }
    fn unary_exp(&self, x: &str) -> String {
        format!("sp.int_exp ({})", x)
    }
    fn bound_log(&self, x: &str) -> String {
        format!("sp.bound_intlog ({})", x)
    }
    fn real_log(&self, x: &str) -> String {
        format!("sp.int_to_log ({})", x)
    }

    fn warn(&self, args: &[String]) -> String {
        format!("console.warn ({});", args.join(" + "))
    }
    fn make_string(&self, arg: &str) -> String {
        arg.to_string()
    }
    fn to_string_expr(&self, arg: &str) -> String {
        arg.to_string()
    }

    fn map_accessor(&self, obj: &str, key: &str) -> String {
        format!("{}[\"{}\"]", obj, escape_str(key))
    }
    fn const_array_accessor(&self, obj: &str, index: &str) -> String {
        format!("{}[{}]", obj, index)
    }

    fn postamble(&self, func_names: &[String]) -> String {
        let pairs: Vec<String> = func_names.iter().map(|f| format!("{}: {}", f, f)).collect();
        format!("module.exports = {{ {} }}\n", pairs.join(", "))
    }
}

// ─── Tests ────────────────────────────────────────────────────────
