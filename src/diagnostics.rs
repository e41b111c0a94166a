//! Diagnostic accumulation
//!
//! `spec.md` §7 requires the compiler to record errors and warnings as it
//! goes rather than aborting on the first one. This module is the
//! generalization of `lint.rs`'s `Severity`/`LintDiagnostic` pair (from the
//! teacher workspace) into the front end's primary error-reporting
//! mechanism.

use crate::source::Location;
use std::fmt;

/// Severity of a recorded diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A numeric diagnostic code, HLSL-style (`Xnnnn`).
///
/// The exact codes spec.md §7 enumerates by name, plus the handful the
/// original ReShade compiler (`examples/original_source/source/parser.cpp`)
/// raises that the distillation only referenced by scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DiagnosticCode(pub u32);

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X{}", self.0)
    }
}

#[allow(non_upper_case_globals)]
pub mod codes {
    use super::DiagnosticCode;

    pub const SyntaxError: DiagnosticCode = DiagnosticCode(3000);
    pub const UndeclaredType: DiagnosticCode = DiagnosticCode(3004);
    pub const Redefinition: DiagnosticCode = DiagnosticCode(3005);
    pub const UndeclaredIdentifier: DiagnosticCode = DiagnosticCode(3010);
    pub const NoMatchingOverload: DiagnosticCode = DiagnosticCode(3013);
    pub const WrongArgumentCount: DiagnosticCode = DiagnosticCode(3014);
    pub const CannotConvert: DiagnosticCode = DiagnosticCode(3017);
    pub const TypeMismatch: DiagnosticCode = DiagnosticCode(3020);
    pub const ScalarConditionRequired: DiagnosticCode = DiagnosticCode(3022);
    pub const ConstLValue: DiagnosticCode = DiagnosticCode(3025);
    pub const DuplicateQualifier: DiagnosticCode = DiagnosticCode(3048);
    pub const ArrayDimension: DiagnosticCode = DiagnosticCode(3057);
    pub const OutOfRangeSwizzle: DiagnosticCode = DiagnosticCode(3067);
    pub const MixedSwizzleSets: DiagnosticCode = DiagnosticCode(3086);
    pub const LValueRequired: DiagnosticCode = DiagnosticCode(3087);
    pub const NonIntegralBitwiseOperand: DiagnosticCode = DiagnosticCode(3088);
    pub const ImplicitTruncation: DiagnosticCode = DiagnosticCode(3206);
    pub const Recursion: DiagnosticCode = DiagnosticCode(3500);
    pub const AmbiguousCall: DiagnosticCode = DiagnosticCode(3501);
    pub const DeprecatedAnnotationType: DiagnosticCode = DiagnosticCode(4717);
    pub const ImplicitUniform: DiagnosticCode = DiagnosticCode(5000);
    pub const EmptyStruct: DiagnosticCode = DiagnosticCode(5001);
    pub const EmptySwitch: DiagnosticCode = DiagnosticCode(5002);
}

/// A single recorded diagnostic: location, severity, code and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub location: Location,
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} {}: {}",
            self.location, self.severity, self.code, self.message
        )
    }
}

/// Accumulates diagnostics over the lifetime of one compilation.
///
/// Never aborts: callers keep recording diagnostics and driving the parser
/// forward. `ok()` reflects whether any error-severity diagnostic was
/// recorded.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, location: Location, code: DiagnosticCode, message: impl Into<String>) {
        self.error_count += 1;
        self.diagnostics.push(Diagnostic {
            location,
            severity: Severity::Error,
            code,
            message: message.into(),
        });
    }

    pub fn warning(
        &mut self,
        location: Location,
        code: DiagnosticCode,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(Diagnostic {
            location,
            severity: Severity::Warning,
            code,
            message: message.into(),
        });
    }

    /// `true` iff no error-severity diagnostic has been recorded.
    pub fn ok(&self) -> bool {
        self.error_count == 0
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl fmt::Display for DiagnosticBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diag in &self.diagnostics {
            write!(f, "{diag}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn loc() -> Location {
        Location::new(Arc::from("test.fx"), 3, 5, 10)
    }

    #[test]
    fn ok_is_true_with_only_warnings() {
        let mut bag = DiagnosticBag::new();
        bag.warning(loc(), codes::ImplicitUniform, "global variables are uniform");
        assert!(bag.ok());
        assert_eq!(bag.len(), 1);
    }

    #[test]
    fn ok_is_false_after_any_error() {
        let mut bag = DiagnosticBag::new();
        bag.warning(loc(), codes::ImplicitUniform, "w");
        bag.error(loc(), codes::SyntaxError, "e");
        assert!(!bag.ok());
    }

    #[test]
    fn formats_hlsl_style() {
        let mut bag = DiagnosticBag::new();
        bag.error(loc(), codes::WrongArgumentCount, "incorrect number of arguments");
        let text = bag.to_string();
        assert_eq!(
            text,
            "test.fx(3, 5): error X3014: incorrect number of arguments\n"
        );
    }
}
