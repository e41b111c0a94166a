//! Compiler configuration
//!
//! Grounded on the teacher's `config.rs::CompilerConfig`/`with_builtin`
//! builder pattern. Spec-constant overrides (spec.md §6) are the only
//! piece of host configuration this front end takes.

use crate::types::BaseType;

/// A scalar value materialized as a `#define SPEC_CONSTANT_<name> <value>`
/// line ahead of the source, per spec.md §6.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecConstantValue {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
}

impl SpecConstantValue {
    pub fn base_type(&self) -> BaseType {
        match self {
            SpecConstantValue::Bool(_) => BaseType::Bool,
            SpecConstantValue::Int(_) => BaseType::Int,
            SpecConstantValue::Uint(_) => BaseType::Uint,
            SpecConstantValue::Float(_) => BaseType::Float,
        }
    }

    fn render(&self) -> String {
        match self {
            SpecConstantValue::Bool(b) => (*b as i64).to_string(),
            SpecConstantValue::Int(i) => i.to_string(),
            SpecConstantValue::Uint(u) => format!("{u}u"),
            SpecConstantValue::Float(f) => format!("{f}"),
        }
    }
}

/// Host-supplied compile configuration.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    source_name: String,
    spec_constants: Vec<(String, SpecConstantValue)>,
}

impl CompilerConfig {
    pub fn new(source_name: impl Into<String>) -> Self {
        CompilerConfig {
            source_name: source_name.into(),
            spec_constants: Vec::new(),
        }
    }

    pub fn with_spec_constant(mut self, name: impl Into<String>, value: SpecConstantValue) -> Self {
        self.spec_constants.push((name.into(), value));
        self
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn spec_constants(&self) -> &[(String, SpecConstantValue)] {
        &self.spec_constants
    }

    /// Renders the `#define SPEC_CONSTANT_<name> <value>` preamble
    /// prepended to source text before lexing (spec.md §6).
    pub fn render_preamble(&self) -> String {
        let mut preamble = String::new();
        for (name, value) in &self.spec_constants {
            preamble.push_str(&format!("#define SPEC_CONSTANT_{name} {}\n", value.render()));
        }
        preamble
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig::new("<unnamed>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_spec_constant_preamble() {
        let config = CompilerConfig::new("test.fx")
            .with_spec_constant("BLOOM_ENABLE", SpecConstantValue::Bool(true))
            .with_spec_constant("EXPOSURE", SpecConstantValue::Float(1.5));
        let preamble = config.render_preamble();
        assert_eq!(
            preamble,
            "#define SPEC_CONSTANT_BLOOM_ENABLE 1\n#define SPEC_CONSTANT_EXPOSURE 1.5\n"
        );
    }

    #[test]
    fn default_config_has_no_spec_constants() {
        let config = CompilerConfig::default();
        assert!(config.spec_constants().is_empty());
    }
}
