use super::{escape_str, Backend};

// ─── C++ backend ──────────────────────────────────────────────────

/// C++ backend. Matrices are flat `new long long[..]` allocations with
/// row-major pointer arithmetic for row access, so every declaration has a
/// matching `delete[]` in the teardown block. The generated function takes
/// typed references and instantiates a local `SoftPlus` table.
pub struct CppBackend;

impl Backend for CppBackend {
    fn target_name(&self) -> &str {
        "cpp"
    }
    fn output_extension(&self) -> &str {
        ".cpp"
    }

    fn preamble(&self) -> &'static str {
        "#include <vector>\n\
         #include <map>\n\
         #include <string>\n\
         #include <iostream>\n\
         #include <limits>\n\
         #include \"softplus.h\"\n\
         using namespace std;\n"
    }
    fn func_keyword(&self) -> &'static str {
        "double"
    }
    fn func_init(&self) -> &'static str {
        "  const SoftPlus sp;\n"
    }
    fn matrix_type(&self) -> &'static str {
        "const vector<vector<double> >& "
    }
    fn token_vec_type(&self) -> &'static str {
        "const vector<int>& "
    }
    fn string_type(&self) -> &'static str {
        "const string& "
    }
    fn params_type(&self) -> &'static str {
        "const map<string,double>& "
    }
    fn vec_ref_type(&self) -> &'static str {
        "long long*"
    }
    fn const_vec_ref_type(&self) -> &'static str {
        "const long long*"
    }
    fn array_ref_type(&self) -> &'static str {
        "long long*"
    }
    fn cell_ref_type(&self) -> &'static str {
        "long long*"
    }
    fn const_cell_ref_type(&self) -> &'static str {
        "const long long*"
    }
    fn index_type(&self) -> &'static str {
        "size_t"
    }
    fn size_type(&self) -> &'static str {
        "const size_t"
    }
    fn size_method(&self) -> &'static str {
        "size()"
    }
    fn weight_type(&self) -> &'static str {
        "const double"
    }
    fn log_weight_type(&self) -> &'static str {
        "const long long"
    }
    fn result_type(&self) -> &'static str {
        "const double"
    }
    fn math_library(&self) -> &'static str {
        ""
    }
    fn infinity(&self) -> &'static str {
        "SOFTPLUS_INTLOG_INFINITY"
    }
    fn real_infinity(&self) -> &'static str {
        "numeric_limits<double>::infinity()"
    }

    fn declare_matrix(&self, name: &str, dim1: &str, dim2: &str) -> String {
        format!(
            "long long* {} = new long long [({}) * ({})];",
            name, dim1, dim2
        )
    }
    fn declare_vector(&self, name: &str, dim: &str) -> String {
        format!("long long* {} = new long long [{}];", name, dim)
    }
    fn delete_array(&self, name: &str) -> String {
        format!("  delete[] {};\n", name)
    }
    fn array_row_accessor(&self, name: &str, row: &str, row_size: &str) -> String {
        format!("({} + {} * ({}))", name, row_size, row)
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
        format!("SoftPlus::bound_intlog ({})", x)
    }
    fn real_log(&self, x: &str) -> String {
        format!("sp.int_to_log ({})", x)
    }

    fn warn(&self, args: &[String]) -> String {
        format!("cerr << {} << endl;", args.join(" << "))
    }
    fn make_string(&self, arg: &str) -> String {
        format!("string({})", arg)
    }
    fn to_string_expr(&self, arg: &str) -> String {
        format!("to_string({})", arg)
    }

    fn map_accessor(&self, obj: &str, key: &str) -> String {
        format!("{}.at(string(\"{}\"))", obj, escape_str(key))
    }
    fn const_array_accessor(&self, obj: &str, index: &str) -> String {
        format!("{}.at({})", obj, index)
    }

    fn postamble(&self, _func_names: &[String]) -> String {
        String::new()
    }
}

// ─── Tests ────────────────────────────────────────────────────────
