//! Symbol table
//!
//! Scoped lookup over user declarations and the intrinsic overload set
//! (spec.md §4.E). Ported from `examples/original_source/source/symbol_table.cpp`'s
//! `symbol_table` class: a hashmap of `name -> list<(scope, decl)>` walked
//! newest-to-oldest, plus a parent stack used for recursion detection.
//!
//! Design note §9 asks `resolve_call`'s `(ambiguous, is_intrinsic)`
//! out-params to become a tagged variant; [`CallResolution`] is that.

use crate::arena::Handle;
use crate::ast::{FunctionDecl, StructDecl, VariableDecl};
use crate::intrinsics::{self, IntrinsicEntry};
use crate::types::Type;
use std::collections::HashMap;

/// What a name resolves to. Functions carry their parameter types inline
/// so overload resolution and redefinition checks never need arena
/// access -- the symbol table is self-contained.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclRef {
    Variable(Handle<VariableDecl>),
    Struct(Handle<StructDecl>),
    Function {
        handle: Handle<FunctionDecl>,
        param_types: Vec<Type>,
        return_type: Type,
    },
    Intrinsic(&'static IntrinsicEntry),
}

impl DeclRef {
    fn is_function_like(&self) -> bool {
        matches!(self, DeclRef::Function { .. } | DeclRef::Intrinsic(_))
    }

    fn param_types(&self) -> &[Type] {
        match self {
            DeclRef::Function { param_types, .. } => param_types,
            DeclRef::Intrinsic(e) => &e.arg_types,
            _ => &[],
        }
    }

    fn return_type(&self) -> Type {
        match self {
            DeclRef::Function { return_type, .. } => *return_type,
            DeclRef::Intrinsic(e) => e.return_type,
            DeclRef::Variable(_) | DeclRef::Struct(_) => Type::VOID,
        }
    }
}

/// `(dotted_namespace, level, namespace_level)`, per spec.md §4.E.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scope {
    pub namespace: String,
    pub level: u32,
    pub namespace_level: u32,
}

impl Scope {
    fn global() -> Self {
        Scope {
            namespace: String::new(),
            level: 0,
            namespace_level: 0,
        }
    }
}

pub enum CallResolution {
    Resolved(DeclRef),
    Ambiguous,
    NotFound,
}

pub struct SymbolTable {
    symbols: HashMap<String, Vec<(Scope, DeclRef)>>,
    scope_stack: Vec<Scope>,
    current: Scope,
    namespace_stack: Vec<String>,
    /// Mirrors the original's `_parent_stack`: the enclosing function of
    /// the scope currently being parsed, used by `current_parent` for
    /// recursion detection.
    parent_stack: Vec<Handle<FunctionDecl>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            symbols: HashMap::new(),
            scope_stack: Vec::new(),
            current: Scope::global(),
            namespace_stack: Vec::new(),
            parent_stack: Vec::new(),
        }
    }

    pub fn current_scope(&self) -> &Scope {
        &self.current
    }

    pub fn current_parent(&self) -> Option<Handle<FunctionDecl>> {
        self.parent_stack.last().copied()
    }

    pub fn enter_scope(&mut self, parent_function: Option<Handle<FunctionDecl>>) {
        self.scope_stack.push(self.current.clone());
        self.current = Scope {
            namespace: self.current.namespace.clone(),
            level: self.current.level + 1,
            namespace_level: self.current.namespace_level,
        };
        if let Some(f) = parent_function {
            self.parent_stack.push(f);
        }
    }

    pub fn leave_scope(&mut self) {
        let left_level = self.current.level;
        if let Some(prev) = self.scope_stack.pop() {
            if !self.parent_stack.is_empty() && left_level > prev.level {
                self.parent_stack.pop();
            }
            self.current = prev;
        }
        self.prune_scope_above(left_level);
    }

    /// Drops table entries inserted at a scope level deeper than
    /// `level`, since they're no longer reachable once that scope is
    /// gone (invariant 4, spec.md §3).
    fn prune_scope_above(&mut self, level: u32) {
        let namespace = self.current.namespace.clone();
        for entries in self.symbols.values_mut() {
            entries.retain(|(scope, _)| scope.level < level || scope.namespace != namespace);
        }
    }

    pub fn enter_namespace(&mut self, name: impl Into<String>) {
        self.namespace_stack.push(name.into());
        self.scope_stack.push(self.current.clone());
        self.current = Scope {
            namespace: self.namespace_stack.join("::"),
            level: 0,
            namespace_level: self.namespace_stack.len() as u32,
        };
    }

    pub fn leave_namespace(&mut self) {
        self.namespace_stack.pop();
        if let Some(prev) = self.scope_stack.pop() {
            self.current = prev;
        }
    }

    fn conflicts_with_existing(&self, name: &str, decl: &DeclRef) -> bool {
        let Some(entries) = self.symbols.get(name) else {
            return false;
        };
        for (scope, existing) in entries.iter().rev() {
            if scope != &self.current {
                continue;
            }
            match (existing, decl) {
                (DeclRef::Function { param_types: a, .. }, DeclRef::Function { param_types: b, .. }) => {
                    if a == b {
                        return true;
                    }
                }
                _ => return true,
            }
        }
        false
    }

    /// Inserts `decl` under `name`. Returns `false` on redefinition
    /// (spec.md §4.G "duplicate-definition checks"): a variable/struct
    /// colliding with anything at the same scope, or a function whose
    /// parameter list exactly matches an existing overload.
    ///
    /// Global declarations are additionally registered under every
    /// prefix of the current namespace path so unqualified lookups from
    /// an enclosing namespace can find them (spec.md §4.E).
    pub fn insert(&mut self, name: impl Into<String>, decl: DeclRef, is_global: bool) -> bool {
        let name = name.into();
        if self.conflicts_with_existing(&name, &decl) {
            return false;
        }
        if is_global {
            let min_depth = if self.namespace_stack.is_empty() { 0 } else { 1 };
            for depth in (min_depth..=self.namespace_stack.len()).rev() {
                let scope = Scope {
                    namespace: self.namespace_stack[..depth].join("::"),
                    level: 0,
                    namespace_level: depth as u32,
                };
                self.symbols
                    .entry(name.clone())
                    .or_default()
                    .push((scope, decl.clone()));
            }
        } else {
            self.symbols
                .entry(name)
                .or_default()
                .push((self.current.clone(), decl));
        }
        true
    }

    /// A scope is visible from the current one if it's an ancestor block
    /// (lower or equal level) in an enclosing namespace (this one or a
    /// prefix of it).
    fn visible(&self, scope: &Scope) -> bool {
        if scope.level > self.current.level || scope.namespace_level > self.current.namespace_level {
            return false;
        }
        scope.namespace.is_empty()
            || self.current.namespace == scope.namespace
            || self.current.namespace.starts_with(&format!("{}::", scope.namespace))
    }

    /// Unqualified lookup: newest-to-oldest, skipping scopes not visible
    /// from the current one. Prefers a variable/struct match; otherwise
    /// returns the nearest function/intrinsic match. `exclusive`
    /// restricts to entries at exactly the current scope (shadowing
    /// checks).
    pub fn find(&self, name: &str, exclusive: bool) -> Option<DeclRef> {
        let entries = self.symbols.get(name)?;
        let mut function_fallback = None;
        for (scope, decl) in entries.iter().rev() {
            let matches_scope = if exclusive {
                scope == &self.current
            } else {
                self.visible(scope)
            };
            if !matches_scope {
                continue;
            }
            if decl.is_function_like() {
                if function_fallback.is_none() {
                    function_fallback = Some(decl.clone());
                }
            } else {
                return Some(decl.clone());
            }
        }
        function_fallback
    }

    /// Qualified lookup (`A::B::name`): exact namespace match, ignoring
    /// the current scope's visibility rules (spec.md §8 scenario S6).
    pub fn find_qualified(&self, namespace: &str, name: &str) -> Option<DeclRef> {
        let entries = self.symbols.get(name)?;
        entries
            .iter()
            .rev()
            .find(|(scope, _)| scope.namespace == namespace)
            .map(|(_, decl)| decl.clone())
    }

    /// Overload resolution for a call (spec.md §4.E).
    pub fn resolve_call(&self, name: &str, arg_types: &[Type], namespace: Option<&str>) -> CallResolution {
        let user_candidates: Vec<DeclRef> = self
            .symbols
            .get(name)
            .into_iter()
            .flatten()
            .filter(|(scope, decl)| {
                matches!(decl, DeclRef::Function { .. })
                    && match namespace {
                        Some(ns) => scope.namespace == ns,
                        None => self.visible(scope),
                    }
            })
            .map(|(_, decl)| decl.clone())
            .collect();

        let candidates: Vec<DeclRef> = if !user_candidates.is_empty() {
            user_candidates
        } else if namespace.is_some() {
            // Qualified calls never fall back to intrinsics.
            Vec::new()
        } else {
            intrinsics::by_name(name).map(DeclRef::Intrinsic).collect()
        };

        let mut viable: Vec<(Vec<u32>, DeclRef)> = Vec::new();
        for candidate in candidates {
            let params = candidate.param_types();
            if params.len() != arg_types.len() {
                continue;
            }
            let mut ranks: Vec<u32> = arg_types
                .iter()
                .zip(params)
                .map(|(arg, param)| Type::rank(arg, param))
                .collect();
            if ranks.iter().any(|&r| r == 0) {
                continue;
            }
            ranks.sort_unstable_by(|a, b| b.cmp(a));
            viable.push((ranks, candidate));
        }

        if viable.is_empty() {
            return CallResolution::NotFound;
        }

        viable.sort_by(|a, b| a.0.cmp(&b.0));
        if viable.len() > 1 && viable[0].0 == viable[1].0 {
            return CallResolution::Ambiguous;
        }
        CallResolution::Resolved(viable.into_iter().next().unwrap().1)
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

pub fn call_return_type(decl: &DeclRef) -> Type {
    decl.return_type()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;

    fn var_handle() -> Handle<VariableDecl> {
        let mut arena: Arena<VariableDecl> = Arena::new();
        arena.alloc(VariableDecl {
            name: "x".into(),
            unique_name: "Vx".into(),
            ty: Type::INT,
            semantic: None,
            annotations: Default::default(),
            initializer: None,
            texture_properties: None,
            sampler_properties: None,
        })
    }

    #[test]
    fn scope_discipline_hides_inner_after_leave() {
        let mut table = SymbolTable::new();
        let outer = var_handle();
        let inner = var_handle();
        table.insert("x", DeclRef::Variable(outer), false);
        table.enter_scope(None);
        table.insert("x", DeclRef::Variable(inner), false);
        assert_eq!(table.find("x", false), Some(DeclRef::Variable(inner)));
        table.leave_scope();
        assert_eq!(table.find("x", false), Some(DeclRef::Variable(outer)));
    }

    #[test]
    fn redefinition_of_variable_at_same_scope_is_rejected() {
        let mut table = SymbolTable::new();
        assert!(table.insert("x", DeclRef::Variable(var_handle()), false));
        assert!(!table.insert("x", DeclRef::Variable(var_handle()), false));
    }

    #[test]
    fn function_overloading_allows_distinct_signatures() {
        let mut table = SymbolTable::new();
        let f = Handle::from_raw(0);
        assert!(table.insert(
            "f",
            DeclRef::Function { handle: f, param_types: vec![Type::INT], return_type: Type::INT },
            true
        ));
        assert!(table.insert(
            "f",
            DeclRef::Function { handle: f, param_types: vec![Type::FLOAT], return_type: Type::INT },
            true
        ));
        assert!(!table.insert(
            "f",
            DeclRef::Function { handle: f, param_types: vec![Type::INT], return_type: Type::INT },
            true
        ));
    }

    #[test]
    fn namespace_prefix_makes_global_visible_from_enclosing_scope() {
        let mut table = SymbolTable::new();
        table.enter_namespace("A");
        table.insert(
            "pi",
            DeclRef::Variable(var_handle()),
            true,
        );
        table.leave_namespace();
        // Unqualified lookup from global scope does not see A::pi ...
        assert!(table.find("pi", false).is_none());
        // ... but qualified lookup does.
        assert!(table.find_qualified("A", "pi").is_some());
    }

    #[test]
    fn overload_resolution_prefers_exact_match() {
        let mut table = SymbolTable::new();
        let f = Handle::from_raw(0);
        table.insert(
            "f",
            DeclRef::Function { handle: f, param_types: vec![Type::FLOAT], return_type: Type::FLOAT },
            true,
        );
        match table.resolve_call("f", &[Type::FLOAT], None) {
            CallResolution::Resolved(DeclRef::Function { param_types, .. }) => {
                assert_eq!(param_types, vec![Type::FLOAT]);
            }
            _ => panic!("expected resolution"),
        }
    }

    #[test]
    fn overload_resolution_falls_back_to_intrinsics_when_no_user_function() {
        let table = SymbolTable::new();
        match table.resolve_call("abs", &[Type::FLOAT], None) {
            CallResolution::Resolved(DeclRef::Intrinsic(entry)) => assert_eq!(entry.name, "abs"),
            _ => panic!("expected intrinsic resolution"),
        }
    }

    #[test]
    fn user_function_with_same_name_shadows_intrinsics_even_on_arity_mismatch() {
        let mut table = SymbolTable::new();
        let f = Handle::from_raw(0);
        table.insert(
            "abs",
            DeclRef::Function { handle: f, param_types: vec![Type::INT, Type::INT], return_type: Type::INT },
            true,
        );
        // One-argument call: user `abs` exists but doesn't match arity,
        // so this must not silently fall back to the builtin.
        assert!(matches!(
            table.resolve_call("abs", &[Type::FLOAT], None),
            CallResolution::NotFound
        ));
    }
}
