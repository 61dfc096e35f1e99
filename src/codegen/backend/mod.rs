pub mod cpp;
pub mod js;

/// Trait abstracting target syntax for the forward-function generator.
///
/// Each method returns the target-language text for one primitive: a type
/// keyword, an array declaration, a log-space library call. The generator
/// calls these while walking the machine, so all dynamic-programming logic
/// is shared and a backend is nothing but a syntax table.
pub trait Backend {
    /// Target name (e.g. "js", "cpp").
    fn target_name(&self) -> &str;
    /// File extension for output (e.g. ".js").
    fn output_extension(&self) -> &str;

    // --- Declarations and types ---
    fn preamble(&self) -> &'static str;
    fn func_keyword(&self) -> &'static str;
    /// Text inserted right after the opening brace of the function.
    fn func_init(&self) -> &'static str;
    /// Parameter type for a profile sequence, empty if untyped.
    fn matrix_type(&self) -> &'static str;
    /// Parameter type for a token-list sequence, empty if untyped.
    fn token_vec_type(&self) -> &'static str;
    /// Parameter type for a text sequence, empty if untyped.
    fn string_type(&self) -> &'static str;
    /// Parameter type for the runtime parameter table, empty if untyped.
    fn params_type(&self) -> &'static str;
    fn vec_ref_type(&self) -> &'static str;
    fn const_vec_ref_type(&self) -> &'static str;
    fn array_ref_type(&self) -> &'static str;
    fn cell_ref_type(&self) -> &'static str;
    fn const_cell_ref_type(&self) -> &'static str;
    fn index_type(&self) -> &'static str;
    fn size_type(&self) -> &'static str;
    /// Member access that yields a sequence's length.
    fn size_method(&self) -> &'static str;
    fn weight_type(&self) -> &'static str;
    fn log_weight_type(&self) -> &'static str;
    fn result_type(&self) -> &'static str;
    /// Prefix for math calls ("Math." or empty).
    fn math_library(&self) -> &'static str;
    /// The fixed-point log-domain infinity constant.
    fn infinity(&self) -> &'static str;
    /// The target's native floating-point infinity.
    fn real_infinity(&self) -> &'static str;

    // --- Array management ---
    fn declare_matrix(&self, name: &str, dim1: &str, dim2: &str) -> String;
    fn declare_vector(&self, name: &str, dim: &str) -> String;
    /// Teardown statement for a declared array, empty for GC targets.
    fn delete_array(&self, name: &str) -> String;
    fn array_row_accessor(&self, name: &str, row: &str, row_size: &str) -> String;

    // --- Log-space library calls ---
    fn binary_softplus(&self, a: &str, b: &str) -> String;
    fn unary_log(&self, x: &str) -> String;
    fn unary_exp(&self, x: &str) -> String;
    fn bound_log(&self, x: &str) -> String;
    /// Conversion out of the fixed-point log domain, used exactly once.
    fn real_log(&self, x: &str) -> String;

    // --- Diagnostics and conversions ---
    /// Statement printing the given pieces to the diagnostic stream.
    fn warn(&self, args: &[String]) -> String;
    /// Wrap a quoted literal so it concatenates as a string.
    fn make_string(&self, arg: &str) -> String;
    /// Convert a numeric expression to text for concatenation.
    fn to_string_expr(&self, arg: &str) -> String;

    // --- Container lookups ---
    fn map_accessor(&self, obj: &str, key: &str) -> String;
    fn const_array_accessor(&self, obj: &str, index: &str) -> String;

    fn postamble(&self, func_names: &[String]) -> String;
}

/// Escape a name for embedding in a double-quoted string literal.
pub(crate) fn escape_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out
}

pub use cpp::CppBackend;
pub use js::JsBackend;

// ─── Backend factory ──────────────────────────────────────────────

/// Create the backend for a target name, if the target is known.
pub fn create_backend(target_name: &str) -> Option<Box<dyn Backend>> {
    match target_name {
        "js" => Some(Box::new(JsBackend)),
        "cpp" => Some(Box::new(CppBackend)),
        _ => None,
    }
}

// ─── Tests ────────────────────────────────────────────────────────
