//! Front end for the ReShade FX effect shader language.
//!
//! Lexes, parses, resolves symbols, and constant-folds an `.fx` source
//! file into a [`parser::Module`], collecting non-aborting diagnostics
//! along the way. There is no code generation here: callers that need an
//! executable artifact hand the resulting [`parser::Module`] to a
//! separate backend.
//!
//! ```no_run
//! let source = "float4 main() : SV_Target { return float4(1, 0, 0, 1); }";
//! let (module, diagnostics) = fxc::compile(source, "test.fx");
//! if diagnostics.ok() {
//!     println!("{} functions parsed", module.functions.len());
//! }
//! ```

pub mod arena;
pub mod ast;
pub mod config;
pub mod diagnostics;
pub mod fold;
pub mod intrinsics;
pub mod lexer;
pub mod parser;
pub mod source;
pub mod symbols;
pub mod types;

pub use config::{CompilerConfig, SpecConstantValue};
pub use diagnostics::{codes, Diagnostic, DiagnosticBag, DiagnosticCode, Severity};
pub use parser::{Module, Parser};
pub use source::{Location, SourceBuffer};
pub use symbols::SymbolTable;
pub use types::{BaseType, Qualifiers, Type};

/// Compiles `source` with no host configuration.
///
/// `source_name` is used only to tag diagnostic locations; it need not be
/// a real path.
#[tracing::instrument(skip(source))]
pub fn compile(source: &str, source_name: &str) -> (Module, DiagnosticBag) {
    compile_with_config(source, &CompilerConfig::new(source_name))
}

/// Compiles `source` under `config`, prepending any spec-constant
/// `#define` preamble (spec.md §6) before lexing.
///
/// The lexer has no preprocessor, so the `#define SPEC_CONSTANT_<name>
/// <value>` lines are expanded textually here: each such line is
/// dropped (replaced by a blank line, to keep diagnostic line numbers
/// stable) and every whole-word occurrence of the name elsewhere in the
/// unit is substituted with its value. This is deliberately limited to
/// that one directive shape; `#if`/`#ifdef`/function-like macros are
/// out of scope.
#[tracing::instrument(skip(source, config))]
pub fn compile_with_config(source: &str, config: &CompilerConfig) -> (Module, DiagnosticBag) {
    let preamble = config.render_preamble();
    let full_source = format!("{preamble}{source}");
    let expanded = expand_defines(&full_source);
    tracing::debug!(bytes = expanded.len(), "lexing and parsing");
    let buffer = SourceBuffer::new(config.source_name().to_string(), expanded);
    let parser = Parser::new(&buffer);
    let (module, diagnostics) = parser.parse_module();
    tracing::debug!(
        functions = module.functions.len(),
        structs = module.structs.len(),
        diagnostics = diagnostics.len(),
        "parse complete"
    );
    (module, diagnostics)
}

fn expand_defines(source: &str) -> String {
    let mut macros: std::collections::HashMap<String, String> = std::collections::HashMap::new();
    let mut out = String::with_capacity(source.len());
    for line in source.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix("#define ") {
            let rest = rest.trim_end();
            match rest.split_once(char::is_whitespace) {
                Some((name, value)) => {
                    macros.insert(name.to_string(), value.trim().to_string());
                }
                None => {
                    macros.insert(rest.to_string(), String::new());
                }
            }
            out.push('\n');
            continue;
        }
        out.push_str(&substitute_macros(line, &macros));
    }
    out
}

fn substitute_macros(line: &str, macros: &std::collections::HashMap<String, String>) -> String {
    if macros.is_empty() {
        return line.to_string();
    }
    let chars: Vec<char> = line.chars().collect();
    let mut result = String::with_capacity(line.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_ascii_alphabetic() || chars[i] == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            match macros.get(&word) {
                Some(value) => result.push_str(value),
                None => result.push_str(&word),
            }
        } else {
            result.push(chars[i]);
            i += 1;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_trivial_function_with_no_diagnostics() {
        let (module, diagnostics) =
            compile("float4 main() : SV_Target { return float4(1, 0, 0, 1); }", "t.fx");
        assert!(diagnostics.ok());
        assert_eq!(module.global_functions.len(), 1);
    }

    #[test]
    fn undeclared_identifier_is_reported() {
        let (_module, diagnostics) = compile("float4 main() : SV_Target { return foo; }", "t.fx");
        assert!(!diagnostics.ok());
        assert!(diagnostics
            .iter()
            .any(|d| d.code == codes::UndeclaredIdentifier));
    }

    #[test]
    fn spec_constant_preamble_is_visible_to_the_parser() {
        let config = CompilerConfig::new("t.fx")
            .with_spec_constant("BLOOM_ENABLE", SpecConstantValue::Bool(true));
        let (module, diagnostics) = compile_with_config(
            "static const int enabled = SPEC_CONSTANT_BLOOM_ENABLE;",
            &config,
        );
        assert!(diagnostics.ok());
        assert_eq!(module.global_variables.len(), 1);
    }
}
