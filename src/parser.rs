//! Recursive-descent parser
//!
//! Builds the AST from the token stream, resolving identifiers and calls
//! through [`crate::symbols::SymbolTable`] and folding every freshly built
//! expression through [`crate::fold`] (spec.md §4.F). The semantic checks
//! spec.md §4.G describes (l-value rules, return-type compatibility, scope
//! discipline, duplicate-definition) are inlined at the productions that
//! need them rather than living in a separate pass, exactly as the
//! original `parser.cpp` does it.
//!
//! One-token lookahead is `self.current`; the lexer's own snapshot/restore
//! is reached for only by [`Parser::try_parse_cast`], the one genuinely
//! ambiguous production (design note §9, SPEC_FULL §2.1).

use crate::arena::{Arena, Handle};
use crate::ast::*;
use crate::diagnostics::{codes, DiagnosticBag};
use crate::fold;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::source::{Location, SourceBuffer};
use crate::symbols::{CallResolution, DeclRef, SymbolTable};
use crate::types::{ARRAY_NOT_ARRAY, ARRAY_UNSIZED, BaseType, Qualifiers, Type};
use std::collections::HashMap;

/// Read-only output handed to a backend (spec.md §6 "Output to backend").
pub struct Module {
    pub exprs: Arena<Expr>,
    pub stmts: Arena<Stmt>,
    pub variables: Arena<VariableDecl>,
    pub functions: Arena<FunctionDecl>,
    pub structs: Arena<StructDecl>,
    pub fields: Arena<FieldDecl>,
    pub global_variables: Vec<Handle<VariableDecl>>,
    pub global_functions: Vec<Handle<FunctionDecl>>,
    pub global_structs: Vec<Handle<StructDecl>>,
    pub techniques: Vec<TechniqueDecl>,
}

struct ParserSnapshot {
    lexer: crate::lexer::Snapshot,
    current: Token,
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    diagnostics: DiagnosticBag,
    symbols: SymbolTable,
    exprs: Arena<Expr>,
    stmts: Arena<Stmt>,
    variables: Arena<VariableDecl>,
    functions: Arena<FunctionDecl>,
    structs: Arena<StructDecl>,
    fields: Arena<FieldDecl>,
    global_variables: Vec<Handle<VariableDecl>>,
    global_functions: Vec<Handle<FunctionDecl>>,
    global_structs: Vec<Handle<StructDecl>>,
    techniques: Vec<TechniqueDecl>,
    current: Token,
}

/// Precedence levels, low to high (spec.md §4.F). The ternary sits above
/// assignment (handled separately at the statement/initializer level) and
/// below logical-or.
const PREC_LOGICAL_OR: u8 = 2;
const PREC_LOGICAL_AND: u8 = 3;
const PREC_BIT_OR: u8 = 4;
const PREC_BIT_XOR: u8 = 5;
const PREC_BIT_AND: u8 = 6;
const PREC_EQUALITY: u8 = 7;
const PREC_RELATIONAL: u8 = 8;
const PREC_SHIFT: u8 = 9;
const PREC_ADDITIVE: u8 = 10;
const PREC_MULTIPLICATIVE: u8 = 11;

fn binary_op_for(kind: &TokenKind) -> Option<(BinaryOp, u8)> {
    use TokenKind::*;
    Some(match kind {
        PipePipe => (BinaryOp::LogicalOr, PREC_LOGICAL_OR),
        AmpAmp => (BinaryOp::LogicalAnd, PREC_LOGICAL_AND),
        Pipe => (BinaryOp::BitOr, PREC_BIT_OR),
        Caret => (BinaryOp::BitXor, PREC_BIT_XOR),
        Amp => (BinaryOp::BitAnd, PREC_BIT_AND),
        EqualEqual => (BinaryOp::Equal, PREC_EQUALITY),
        BangEqual => (BinaryOp::NotEqual, PREC_EQUALITY),
        Less => (BinaryOp::Less, PREC_RELATIONAL),
        LessEqual => (BinaryOp::LessEqual, PREC_RELATIONAL),
        Greater => (BinaryOp::Greater, PREC_RELATIONAL),
        GreaterEqual => (BinaryOp::GreaterEqual, PREC_RELATIONAL),
        LessLess => (BinaryOp::Shl, PREC_SHIFT),
        GreaterGreater => (BinaryOp::Shr, PREC_SHIFT),
        Plus => (BinaryOp::Add, PREC_ADDITIVE),
        Minus => (BinaryOp::Sub, PREC_ADDITIVE),
        Star => (BinaryOp::Mul, PREC_MULTIPLICATIVE),
        Slash => (BinaryOp::Div, PREC_MULTIPLICATIVE),
        Percent => (BinaryOp::Mod, PREC_MULTIPLICATIVE),
        _ => return None,
    })
}

fn assign_op_for(kind: &TokenKind) -> Option<AssignOp> {
    use TokenKind::*;
    Some(match kind {
        Equal => AssignOp::None,
        PlusEqual => AssignOp::Add,
        MinusEqual => AssignOp::Sub,
        StarEqual => AssignOp::Mul,
        SlashEqual => AssignOp::Div,
        PercentEqual => AssignOp::Mod,
        AmpEqual => AssignOp::BitAnd,
        PipeEqual => AssignOp::BitOr,
        CaretEqual => AssignOp::BitXor,
        LessLessEqual => AssignOp::Shl,
        GreaterGreaterEqual => AssignOp::Shr,
        _ => return None,
    })
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a SourceBuffer) -> Self {
        let mut lexer = Lexer::new(source);
        let mut diagnostics = DiagnosticBag::new();
        let current = lexer.next(&mut diagnostics);
        Parser {
            lexer,
            diagnostics,
            symbols: SymbolTable::new(),
            exprs: Arena::new(),
            stmts: Arena::new(),
            variables: Arena::new(),
            functions: Arena::new(),
            structs: Arena::new(),
            fields: Arena::new(),
            global_variables: Vec::new(),
            global_functions: Vec::new(),
            global_structs: Vec::new(),
            techniques: Vec::new(),
            current,
        }
    }

    fn loc(&self) -> Location {
        self.current.location.clone()
    }

    fn advance(&mut self) -> Token {
        let next = self.lexer.next(&mut self.diagnostics);
        std::mem::replace(&mut self.current, next)
    }

    fn snapshot(&self) -> ParserSnapshot {
        ParserSnapshot {
            lexer: self.lexer.snapshot(),
            current: self.current.clone(),
        }
    }

    fn restore(&mut self, snap: ParserSnapshot) {
        self.lexer.restore(snap.lexer);
        self.current = snap.current;
    }

    fn accept(&mut self, kind: &TokenKind) -> bool {
        if &self.current.kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> bool {
        if self.accept(kind) {
            true
        } else {
            self.diagnostics.error(
                self.loc(),
                codes::SyntaxError,
                format!("expected {:?}, got {:?}", kind, self.current.kind),
            );
            false
        }
    }

    fn expect_identifier(&mut self) -> Option<String> {
        if let TokenKind::Identifier(name) = self.current.kind.clone() {
            self.advance();
            Some(name)
        } else {
            self.diagnostics.error(
                self.loc(),
                codes::SyntaxError,
                format!("expected identifier, got {:?}", self.current.kind),
            );
            None
        }
    }

    /// Skips tokens until the next `;` or matching `}`, per spec.md §7's
    /// resynchronization rule.
    fn resync(&mut self) {
        let mut depth = 0i32;
        loop {
            match &self.current.kind {
                TokenKind::EndOfFile => return,
                TokenKind::Semicolon if depth == 0 => {
                    self.advance();
                    return;
                }
                TokenKind::LBrace => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::RBrace => {
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                    depth -= 1;
                    self.advance();
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    pub fn diagnostics(&self) -> &DiagnosticBag {
        &self.diagnostics
    }

    // ---- top level -----------------------------------------------------

    pub fn parse_module(mut self) -> (Module, DiagnosticBag) {
        while !matches!(self.current.kind, TokenKind::EndOfFile) {
            self.parse_top_level_item();
        }
        let module = Module {
            exprs: self.exprs,
            stmts: self.stmts,
            variables: self.variables,
            functions: self.functions,
            structs: self.structs,
            fields: self.fields,
            global_variables: self.global_variables,
            global_functions: self.global_functions,
            global_structs: self.global_structs,
            techniques: self.techniques,
        };
        (module, self.diagnostics)
    }

    fn parse_top_level_item(&mut self) {
        match &self.current.kind {
            TokenKind::Namespace => self.parse_namespace(),
            TokenKind::Struct => {
                self.parse_struct_decl();
            }
            TokenKind::Technique => self.parse_technique(),
            TokenKind::EndOfFile => {}
            _ => self.parse_global_declaration(),
        }
    }

    fn parse_namespace(&mut self) {
        self.advance();
        let name = self.expect_identifier().unwrap_or_default();
        self.symbols.enter_namespace(name);
        if self.expect(&TokenKind::LBrace) {
            while !matches!(self.current.kind, TokenKind::RBrace | TokenKind::EndOfFile) {
                self.parse_top_level_item();
            }
            self.expect(&TokenKind::RBrace);
        }
        self.symbols.leave_namespace();
    }

    // ---- types / qualifiers ---------------------------------------------

    fn parse_qualifiers(&mut self) -> Qualifiers {
        let mut qualifiers = Qualifiers::NONE;
        loop {
            let bit = match &self.current.kind {
                TokenKind::Extern => Qualifiers::EXTERN,
                TokenKind::Static => Qualifiers::STATIC,
                TokenKind::Uniform => Qualifiers::UNIFORM,
                TokenKind::Volatile => Qualifiers::VOLATILE,
                TokenKind::Precise => Qualifiers::PRECISE,
                TokenKind::In => Qualifiers::IN,
                TokenKind::Out => Qualifiers::OUT,
                TokenKind::InOut => Qualifiers::INOUT,
                TokenKind::Const => Qualifiers::CONST,
                TokenKind::Linear => Qualifiers::LINEAR,
                TokenKind::Noperspective => Qualifiers::NOPERSPECTIVE,
                TokenKind::Centroid => Qualifiers::CENTROID,
                TokenKind::Nointerpolation => Qualifiers::NOINTERPOLATION,
                _ => break,
            };
            if qualifiers.contains(bit) {
                self.diagnostics.warning(self.loc(), codes::DuplicateQualifier, "duplicate type qualifier");
            }
            qualifiers.insert(bit);
            self.advance();
        }
        qualifiers
    }

    /// Parses a base type token (not including qualifiers or array
    /// brackets, which the declarator handles). Returns `None` (without
    /// consuming) if the current token cannot start a type.
    fn try_parse_base_type(&mut self) -> Option<Type> {
        match self.current.kind.clone() {
            TokenKind::TypeName(ty) => {
                self.advance();
                Some(ty)
            }
            TokenKind::StringType => {
                self.advance();
                Some(Type::STRING)
            }
            TokenKind::Sampler(_) => {
                self.advance();
                Some(Type::sampler())
            }
            TokenKind::Texture(_) => {
                self.advance();
                Some(Type::texture())
            }
            TokenKind::Identifier(name) => match self.symbols.find(&name, false) {
                Some(DeclRef::Struct(handle)) => {
                    self.advance();
                    let mut ty = Type::scalar(BaseType::Struct);
                    ty.definition = Some(handle.index());
                    Some(ty)
                }
                _ => None,
            },
            _ => None,
        }
    }

    // ---- struct declarations --------------------------------------------

    fn parse_struct_decl(&mut self) -> Option<Handle<StructDecl>> {
        self.advance();
        let name = self.expect_identifier().unwrap_or_default();
        self.expect(&TokenKind::LBrace);
        let mut fields = Vec::new();
        while !matches!(self.current.kind, TokenKind::RBrace | TokenKind::EndOfFile) {
            self.parse_qualifiers();
            let Some(field_ty) = self.try_parse_base_type() else {
                self.diagnostics.error(self.loc(), codes::UndeclaredType, "expected a type");
                self.resync();
                continue;
            };
            loop {
                let Some(field_name) = self.expect_identifier() else { break };
                let semantic = self.parse_optional_semantic();
                let handle = self.fields.alloc(FieldDecl { name: field_name, ty: field_ty, semantic });
                fields.push(handle);
                if !self.accept(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::Semicolon);
        }
        self.expect(&TokenKind::RBrace);
        self.expect(&TokenKind::Semicolon);
        if fields.is_empty() {
            self.diagnostics.warning(self.loc(), codes::EmptyStruct, "struct has no members");
        }
        let unique_name = self.mangle("S", &name);
        let handle = self.structs.alloc(StructDecl { name: name.clone(), unique_name, fields });
        if !self.symbols.insert(name, DeclRef::Struct(handle), true) {
            self.diagnostics.error(self.loc(), codes::Redefinition, "redefinition of struct");
        }
        self.global_structs.push(handle);
        Some(handle)
    }

    fn parse_optional_semantic(&mut self) -> Option<String> {
        if self.accept(&TokenKind::Colon) {
            let name = self.expect_identifier().unwrap_or_default();
            Some(name.to_uppercase())
        } else {
            None
        }
    }

    // ---- global declarations (variable or function) ----------------------

    fn parse_global_declaration(&mut self) {
        let qualifiers = self.parse_qualifiers();
        let Some(base_ty) = self.try_parse_base_type() else {
            self.diagnostics.error(self.loc(), codes::UndeclaredType, "expected a type");
            self.resync();
            return;
        };
        let Some(name) = self.expect_identifier() else {
            self.resync();
            return;
        };

        if matches!(self.current.kind, TokenKind::LParen) {
            self.parse_function_declarator(name, base_ty, qualifiers);
        } else {
            self.parse_variable_declarator_list(name, base_ty, qualifiers, true);
        }
    }

    // ---- variable declarator ----------------------------------------------

    fn parse_variable_declarator_list(&mut self, first_name: String, base_ty: Type, qualifiers: Qualifiers, is_global: bool) -> Vec<Handle<VariableDecl>> {
        let mut out = Vec::new();
        let mut name = Some(first_name);
        loop {
            let Some(decl_name) = name.take().or_else(|| self.expect_identifier()) else { break };
            if let Some(handle) = self.parse_one_variable_declarator(decl_name, base_ty, qualifiers, is_global) {
                out.push(handle);
            }
            if !self.accept(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::Semicolon);
        out
    }

    fn parse_one_variable_declarator(&mut self, name: String, base_ty: Type, mut qualifiers: Qualifiers, is_global: bool) -> Option<Handle<VariableDecl>> {
        if base_ty.is_void() {
            self.diagnostics.error(self.loc(), codes::TypeMismatch, "variable cannot be of type void");
        }
        if qualifiers.contains(Qualifiers::IN) || qualifiers.contains(Qualifiers::OUT) {
            self.diagnostics.error(self.loc(), codes::TypeMismatch, "'in'/'out' are not valid on variables");
        }
        if !is_global {
            if qualifiers.contains(Qualifiers::EXTERN) || qualifiers.contains(Qualifiers::UNIFORM) {
                self.diagnostics.error(self.loc(), codes::TypeMismatch, "local variables cannot be 'extern' or 'uniform'");
            }
            if base_ty.is_sampler() || base_ty.is_texture() {
                self.diagnostics.error(self.loc(), codes::TypeMismatch, "local variables cannot be sampler/texture typed");
            }
        }

        let mut array_length = crate::types::ARRAY_NOT_ARRAY;
        if self.accept(&TokenKind::LBracket) {
            if self.accept(&TokenKind::RBracket) {
                array_length = crate::types::ARRAY_UNSIZED;
            } else {
                let size_expr = self.parse_expression();
                let size_expr = self.fold(size_expr);
                array_length = match self.exprs.get(size_expr) {
                    Expr::Literal { value: LiteralValue::Int(v), .. } => v[0] as i32,
                    Expr::Literal { value: LiteralValue::Uint(v), .. } => v[0] as i32,
                    _ => {
                        self.diagnostics.error(self.loc(), codes::ArrayDimension, "array size must be a constant integral expression");
                        1
                    }
                };
                if !(1..=65536).contains(&array_length) {
                    self.diagnostics.error(self.loc(), codes::ArrayDimension, "array dimension out of range [1, 65536]");
                    array_length = array_length.clamp(1, 65536);
                }
                self.expect(&TokenKind::RBracket);
            }
        }

        let semantic = self.parse_optional_semantic();
        let annotations = self.parse_optional_annotations();

        if is_global && !qualifiers.contains(Qualifiers::STATIC) && base_ty.is_numeric() {
            if !qualifiers.contains(Qualifiers::UNIFORM) {
                self.diagnostics.warning(self.loc(), codes::ImplicitUniform, "global variables are considered 'uniform' by default");
                qualifiers.insert(Qualifiers::UNIFORM);
                qualifiers.insert(Qualifiers::EXTERN);
            }
            if qualifiers.contains(Qualifiers::CONST) && qualifiers.contains(Qualifiers::UNIFORM) {
                self.diagnostics.error(self.loc(), codes::TypeMismatch, "'const' cannot be combined with 'uniform'");
            }
        }

        let mut ty = base_ty.with_qualifiers(qualifiers);
        ty.array_length = array_length;

        let initializer = if self.accept(&TokenKind::Equal) {
            let init = if matches!(self.current.kind, TokenKind::LBrace) {
                self.parse_initializer_list(ty)
            } else {
                self.parse_assignment_expression()
            };
            Some(self.fold(init))
        } else {
            None
        };

        let initializer = match initializer {
            Some(h) => Some(h),
            None if is_global && base_ty.is_numeric() && qualifiers.contains(Qualifiers::CONST) => {
                self.diagnostics.error(self.loc(), codes::SyntaxError, "uninitialized 'const' variable");
                None
            }
            None if base_ty.is_numeric() && !ty.is_array() && !qualifiers.contains(Qualifiers::UNIFORM) => {
                let zero = self.exprs.alloc(Expr::Literal { ty, value: LiteralValue::zero_for(ty.base_type) });
                Some(zero)
            }
            None => None,
        };

        let global_prefix = if qualifiers.contains(Qualifiers::UNIFORM) { "U" } else { "V" };
        let unique_name = self.mangle(if is_global { global_prefix } else { "L" }, &name);
        let (texture_properties, sampler_properties) = self.parse_optional_properties(&ty);

        let handle = self.variables.alloc(VariableDecl {
            name: name.clone(),
            unique_name,
            ty,
            semantic,
            annotations,
            initializer,
            texture_properties,
            sampler_properties,
        });
        if !self.symbols.insert(name, DeclRef::Variable(handle), is_global) {
            self.diagnostics.error(self.loc(), codes::Redefinition, "redefinition of variable");
        }
        if is_global {
            self.global_variables.push(handle);
        }
        Some(handle)
    }

    // ---- annotations -----------------------------------------------------

    fn parse_optional_annotations(&mut self) -> Annotations {
        let mut annotations = Annotations::new();
        if !self.accept(&TokenKind::Less) {
            return annotations;
        }
        while !matches!(self.current.kind, TokenKind::Greater | TokenKind::EndOfFile) {
            // An optional leading type name (`string`, `float`, ...) is
            // accepted but deprecated; annotation values are untyped here.
            let type_prefix_loc = self.loc();
            if self.try_parse_base_type().is_some() {
                self.diagnostics.warning(
                    type_prefix_loc,
                    codes::DeprecatedAnnotationType,
                    "the type prefix on an annotation is deprecated",
                );
            }
            let Some(key) = self.expect_identifier() else {
                self.resync_to(&TokenKind::Greater);
                break;
            };
            self.expect(&TokenKind::Equal);
            let value = self.parse_annotation_value();
            annotations.insert(key, value);
            self.expect(&TokenKind::Semicolon);
        }
        self.expect(&TokenKind::Greater);
        annotations
    }

    fn parse_annotation_value(&mut self) -> AnnotationValue {
        let negate = self.accept(&TokenKind::Minus);
        match self.current.kind.clone() {
            TokenKind::StringLiteral(s) => {
                self.advance();
                AnnotationValue::String(s)
            }
            TokenKind::IntLiteral(i) => {
                self.advance();
                AnnotationValue::Int(if negate { -i } else { i })
            }
            TokenKind::UintLiteral(u) => {
                self.advance();
                AnnotationValue::Uint(u)
            }
            TokenKind::FloatLiteral(f) => {
                self.advance();
                let f = f as f64;
                AnnotationValue::Float(if negate { -f } else { f })
            }
            TokenKind::DoubleLiteral(f) => {
                self.advance();
                AnnotationValue::Float(if negate { -f } else { f })
            }
            TokenKind::True => {
                self.advance();
                AnnotationValue::Uint(1)
            }
            TokenKind::False => {
                self.advance();
                AnnotationValue::Uint(0)
            }
            _ => {
                self.diagnostics.error(self.loc(), codes::SyntaxError, "expected an annotation value");
                self.advance();
                AnnotationValue::Int(0)
            }
        }
    }

    /// Skips tokens up to (not including) the next occurrence of `kind` at
    /// brace depth 0, used to resynchronize inside `<...>`/`{...}` blocks
    /// without losing the enclosing terminator.
    fn resync_to(&mut self, kind: &TokenKind) {
        let mut depth = 0i32;
        loop {
            match &self.current.kind {
                TokenKind::EndOfFile => return,
                k if depth == 0 && k == kind => return,
                TokenKind::LBrace => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::RBrace => {
                    depth -= 1;
                    self.advance();
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn resync_to_rbrace(&mut self) {
        self.resync_to(&TokenKind::RBrace);
    }

    // ---- sampler / texture property blocks --------------------------------

    fn parse_property_value_expr(&mut self) -> Handle<Expr> {
        // A bare identifier in a state-value position names a symbolic
        // enum value, a function, or a texture -- none of which this AST
        // models as a first-class reference -- so it's captured as a
        // string literal and resolved later against its context.
        if let TokenKind::Identifier(name) = self.current.kind.clone() {
            self.advance();
            return self.exprs.alloc(Expr::Literal { ty: Type::STRING, value: LiteralValue::String(name) });
        }
        let expr = self.parse_assignment_expression();
        self.fold(expr)
    }

    fn literal_u32(&self, expr: Handle<Expr>) -> Option<u32> {
        match self.exprs.get(expr) {
            Expr::Literal { value: LiteralValue::Int(v), .. } => Some(v[0] as u32),
            Expr::Literal { value: LiteralValue::Uint(v), .. } => Some(v[0] as u32),
            Expr::Literal { value: LiteralValue::Float(v), .. } => Some(v[0] as u32),
            _ => None,
        }
    }

    fn literal_bool(&self, expr: Handle<Expr>) -> Option<bool> {
        match self.exprs.get(expr) {
            Expr::Literal { value: LiteralValue::Bool(v), .. } => Some(v[0]),
            Expr::Literal { value: LiteralValue::Int(v), .. } => Some(v[0] != 0),
            Expr::Literal { value: LiteralValue::Uint(v), .. } => Some(v[0] != 0),
            _ => None,
        }
    }

    fn literal_f64(&self, expr: Handle<Expr>) -> Option<f64> {
        match self.exprs.get(expr) {
            Expr::Literal { value: LiteralValue::Float(v), .. } => Some(v[0]),
            Expr::Literal { value: LiteralValue::Int(v), .. } => Some(v[0] as f64),
            Expr::Literal { value: LiteralValue::Uint(v), .. } => Some(v[0] as f64),
            _ => None,
        }
    }

    fn literal_string(&self, expr: Handle<Expr>) -> Option<String> {
        match self.exprs.get(expr) {
            Expr::Literal { value: LiteralValue::String(s), .. } => Some(s.clone()),
            _ => None,
        }
    }

    fn parse_optional_properties(&mut self, ty: &Type) -> (Option<TextureProperties>, Option<SamplerProperties>) {
        if !self.accept(&TokenKind::LBrace) {
            return (None, None);
        }
        if ty.is_texture() {
            let mut props = TextureProperties::default();
            while !matches!(self.current.kind, TokenKind::RBrace | TokenKind::EndOfFile) {
                let Some(key) = self.expect_identifier() else {
                    self.resync_to_rbrace();
                    break;
                };
                self.expect(&TokenKind::Equal);
                let value = self.parse_property_value_expr();
                match key.as_str() {
                    "Width" => props.width = self.literal_u32(value),
                    "Height" => props.height = self.literal_u32(value),
                    "Depth" => props.depth = self.literal_u32(value),
                    "MipLevels" => props.mip_levels = self.literal_u32(value),
                    "Format" => props.format = self.literal_string(value),
                    "SRGBTexture" => props.srgb = self.literal_bool(value),
                    _ => {}
                }
                self.expect(&TokenKind::Semicolon);
            }
            self.expect(&TokenKind::RBrace);
            (Some(props), None)
        } else if ty.is_sampler() {
            let mut props = SamplerProperties::default();
            while !matches!(self.current.kind, TokenKind::RBrace | TokenKind::EndOfFile) {
                let Some(key) = self.expect_identifier() else {
                    self.resync_to_rbrace();
                    break;
                };
                self.expect(&TokenKind::Equal);
                let value = self.parse_property_value_expr();
                match key.as_str() {
                    "Texture" => {
                        if let Some(name) = self.literal_string(value) {
                            if let Some(DeclRef::Variable(h)) = self.symbols.find(&name, false) {
                                props.texture = Some(h);
                            }
                        }
                    }
                    "AddressU" => props.address_u = self.literal_string(value),
                    "AddressV" => props.address_v = self.literal_string(value),
                    "AddressW" => props.address_w = self.literal_string(value),
                    "MinFilter" => props.filter = Some(props.filter.unwrap_or(0) | 0b00),
                    "MagFilter" => props.filter = Some(props.filter.unwrap_or(0) | 0b01_00),
                    "MipFilter" => props.filter = Some(props.filter.unwrap_or(0) | 0b01_0000),
                    "MinLOD" => props.min_lod = self.literal_f64(value),
                    "MaxLOD" => props.max_lod = self.literal_f64(value),
                    "MipLODBias" => props.lod_bias = self.literal_f64(value),
                    _ => {}
                }
                self.expect(&TokenKind::Semicolon);
            }
            self.expect(&TokenKind::RBrace);
            (None, Some(props))
        } else {
            self.resync_to_rbrace();
            self.expect(&TokenKind::RBrace);
            (None, None)
        }
    }

    // ---- functions ---------------------------------------------------------

    fn mangle(&self, prefix: &str, name: &str) -> String {
        let ns = self.symbols.current_scope().namespace.replace("::", "_");
        if ns.is_empty() {
            format!("{prefix}{name}")
        } else {
            format!("{prefix}{ns}_{name}")
        }
    }

    fn fold(&mut self, expr: Handle<Expr>) -> Handle<Expr> {
        fold::fold_expr(&mut self.exprs, &self.variables, expr)
    }

    fn parse_function_declarator(&mut self, name: String, return_type: Type, qualifiers: Qualifiers) {
        self.advance(); // consume (
        let mut parameters = Vec::new();
        if !matches!(self.current.kind, TokenKind::RParen) {
            loop {
                let param_qualifiers = self.parse_qualifiers();
                let Some(param_ty) = self.try_parse_base_type() else {
                    self.diagnostics.error(self.loc(), codes::UndeclaredType, "expected a parameter type");
                    break;
                };
                if param_qualifiers.contains(Qualifiers::OUT) && param_qualifiers.contains(Qualifiers::CONST) {
                    self.diagnostics.error(self.loc(), codes::TypeMismatch, "'out' parameters cannot be 'const'");
                }
                let Some(param_name) = self.expect_identifier() else { break };
                let mut param_ty = param_ty.with_qualifiers(param_qualifiers);
                if self.accept(&TokenKind::LBracket) {
                    if !self.accept(&TokenKind::RBracket) {
                        let size_expr = self.parse_expression();
                        self.fold(size_expr);
                        self.expect(&TokenKind::RBracket);
                    }
                    param_ty.array_length = ARRAY_UNSIZED;
                }
                let semantic = self.parse_optional_semantic();
                parameters.push(ParameterDecl { name: param_name, ty: param_ty, semantic });
                if !self.accept(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen);
        let return_semantic = self.parse_optional_semantic();

        let param_types: Vec<Type> = parameters.iter().map(|p| p.ty).collect();
        let return_type = return_type.with_qualifiers(qualifiers);
        let unique_name = self.mangle("F", &name);
        let handle = self.functions.alloc(FunctionDecl {
            name: name.clone(),
            unique_name,
            parameters: parameters.clone(),
            return_type,
            return_semantic,
            body: None,
            is_intrinsic: false,
        });
        if !self.symbols.insert(name.clone(), DeclRef::Function { handle, param_types, return_type }, true) {
            self.diagnostics.error(self.loc(), codes::Redefinition, "a function with this exact parameter list already exists");
        }
        self.global_functions.push(handle);

        if self.accept(&TokenKind::Semicolon) {
            return;
        }

        self.symbols.enter_scope(Some(handle));
        for param in &parameters {
            let unique_name = self.mangle("L", &param.name);
            let var_handle = self.variables.alloc(VariableDecl {
                name: param.name.clone(),
                unique_name,
                ty: param.ty,
                semantic: param.semantic.clone(),
                annotations: Annotations::new(),
                initializer: None,
                texture_properties: None,
                sampler_properties: None,
            });
            self.symbols.insert(param.name.clone(), DeclRef::Variable(var_handle), false);
        }
        let body = self.parse_compound_statement();
        self.symbols.leave_scope();
        self.functions.get_mut(handle).body = Some(body);
    }

    // ---- statements ---------------------------------------------------------

    fn parse_compound_statement(&mut self) -> Handle<Stmt> {
        self.expect(&TokenKind::LBrace);
        self.symbols.enter_scope(None);
        let mut statements = Vec::new();
        while !matches!(self.current.kind, TokenKind::RBrace | TokenKind::EndOfFile) {
            statements.push(self.parse_statement());
        }
        self.expect(&TokenKind::RBrace);
        self.symbols.leave_scope();
        self.stmts.alloc(Stmt::Compound { statements })
    }

    fn parse_optional_attributes(&mut self) -> Attributes {
        let mut attributes = Vec::new();
        while self.accept(&TokenKind::LBracket) {
            if let Some(name) = self.expect_identifier() {
                attributes.push(name);
            }
            self.expect(&TokenKind::RBracket);
        }
        attributes
    }

    fn looks_like_declaration(&self) -> bool {
        let starts_type = matches!(
            self.current.kind,
            TokenKind::Extern
                | TokenKind::Static
                | TokenKind::Uniform
                | TokenKind::Volatile
                | TokenKind::Precise
                | TokenKind::Const
                | TokenKind::Linear
                | TokenKind::Noperspective
                | TokenKind::Centroid
                | TokenKind::Nointerpolation
                | TokenKind::TypeName(_)
                | TokenKind::StringType
                | TokenKind::Sampler(_)
                | TokenKind::Texture(_)
        );
        starts_type
            || matches!(&self.current.kind, TokenKind::Identifier(name) if matches!(self.symbols.find(name, false), Some(DeclRef::Struct(_))))
    }

    fn parse_local_declaration_statement(&mut self) -> Handle<Stmt> {
        let qualifiers = self.parse_qualifiers();
        let Some(base_ty) = self.try_parse_base_type() else {
            self.diagnostics.error(self.loc(), codes::UndeclaredType, "expected a type");
            self.resync();
            return self.stmts.alloc(Stmt::Compound { statements: Vec::new() });
        };
        let Some(name) = self.expect_identifier() else {
            self.resync();
            return self.stmts.alloc(Stmt::Compound { statements: Vec::new() });
        };
        let variables = self.parse_variable_declarator_list(name, base_ty, qualifiers, false);
        self.stmts.alloc(Stmt::DeclaratorList { variables })
    }

    fn check_scalar_condition(&mut self, expr: Handle<Expr>) {
        let ty = self.exprs.get(expr).ty();
        if !(ty.is_scalar() && ty.is_numeric()) {
            self.diagnostics.error(self.loc(), codes::ScalarConditionRequired, "condition must evaluate to a scalar value");
        }
    }

    fn parse_statement(&mut self) -> Handle<Stmt> {
        let attributes = self.parse_optional_attributes();
        match self.current.kind.clone() {
            TokenKind::LBrace => self.parse_compound_statement(),
            TokenKind::If => self.parse_if_statement(attributes),
            TokenKind::Switch => self.parse_switch_statement(attributes),
            TokenKind::For => self.parse_for_statement(attributes),
            TokenKind::While => self.parse_while_statement(attributes),
            TokenKind::Do => self.parse_do_while_statement(attributes),
            TokenKind::Break => {
                self.advance();
                self.expect(&TokenKind::Semicolon);
                self.stmts.alloc(Stmt::Break)
            }
            TokenKind::Continue => {
                self.advance();
                self.expect(&TokenKind::Semicolon);
                self.stmts.alloc(Stmt::Continue)
            }
            TokenKind::Discard => {
                self.advance();
                self.expect(&TokenKind::Semicolon);
                self.stmts.alloc(Stmt::Discard)
            }
            TokenKind::Return => {
                self.advance();
                let value = if matches!(self.current.kind, TokenKind::Semicolon) {
                    None
                } else {
                    let e = self.parse_expression();
                    Some(self.fold(e))
                };
                self.expect(&TokenKind::Semicolon);
                self.stmts.alloc(Stmt::Return { value })
            }
            TokenKind::Semicolon => {
                self.advance();
                self.stmts.alloc(Stmt::Compound { statements: Vec::new() })
            }
            _ if self.looks_like_declaration() => self.parse_local_declaration_statement(),
            _ => {
                let expr = self.parse_expression();
                let expr = self.fold(expr);
                self.expect(&TokenKind::Semicolon);
                self.stmts.alloc(Stmt::Expression { expr })
            }
        }
    }

    fn parse_if_statement(&mut self, attributes: Attributes) -> Handle<Stmt> {
        self.advance();
        self.expect(&TokenKind::LParen);
        let cond = self.parse_expression();
        let cond = self.fold(cond);
        self.check_scalar_condition(cond);
        self.expect(&TokenKind::RParen);
        let then_branch = self.parse_statement();
        let else_branch = if self.accept(&TokenKind::Else) { Some(self.parse_statement()) } else { None };
        self.stmts.alloc(Stmt::If { attributes, cond, then_branch, else_branch })
    }

    fn parse_switch_statement(&mut self, attributes: Attributes) -> Handle<Stmt> {
        self.advance();
        self.expect(&TokenKind::LParen);
        let value = self.parse_expression();
        let value = self.fold(value);
        self.expect(&TokenKind::RParen);
        self.expect(&TokenKind::LBrace);
        let mut cases = Vec::new();
        let mut default = None;
        let mut saw_label = false;
        loop {
            if matches!(self.current.kind, TokenKind::RBrace | TokenKind::EndOfFile) {
                break;
            }
            let mut labels = Vec::new();
            let mut is_default = false;
            loop {
                match self.current.kind {
                    TokenKind::Case => {
                        self.advance();
                        let e = self.parse_expression();
                        let e = self.fold(e);
                        if let Expr::Literal { value, .. } = self.exprs.get(e).clone() {
                            labels.push(CaseLabel { value });
                        } else {
                            self.diagnostics.error(self.loc(), codes::SyntaxError, "case label must be a constant expression");
                        }
                        self.expect(&TokenKind::Colon);
                    }
                    TokenKind::Default => {
                        self.advance();
                        self.expect(&TokenKind::Colon);
                        is_default = true;
                    }
                    _ => break,
                }
            }
            if labels.is_empty() && !is_default {
                self.diagnostics.error(self.loc(), codes::SyntaxError, "expected 'case' or 'default'");
                self.resync_to_rbrace();
                break;
            }
            saw_label = true;
            let mut statements = Vec::new();
            while !matches!(self.current.kind, TokenKind::Case | TokenKind::Default | TokenKind::RBrace | TokenKind::EndOfFile) {
                statements.push(self.parse_statement());
            }
            let body = self.stmts.alloc(Stmt::Compound { statements });
            if is_default {
                default = Some(body);
            } else {
                cases.push((labels, body));
            }
        }
        self.expect(&TokenKind::RBrace);
        if !saw_label {
            self.diagnostics.warning(self.loc(), codes::EmptySwitch, "switch statement has no case labels");
        }
        self.stmts.alloc(Stmt::Switch { attributes, value, cases, default })
    }

    fn parse_for_statement(&mut self, attributes: Attributes) -> Handle<Stmt> {
        self.advance();
        self.expect(&TokenKind::LParen);
        self.symbols.enter_scope(None);
        let init = if matches!(self.current.kind, TokenKind::Semicolon) {
            self.advance();
            None
        } else if self.looks_like_declaration() {
            Some(self.parse_local_declaration_statement())
        } else {
            let e = self.parse_expression();
            let e = self.fold(e);
            self.expect(&TokenKind::Semicolon);
            Some(self.stmts.alloc(Stmt::Expression { expr: e }))
        };
        let cond = if matches!(self.current.kind, TokenKind::Semicolon) {
            None
        } else {
            let e = self.parse_expression();
            Some(self.fold(e))
        };
        self.expect(&TokenKind::Semicolon);
        let increment = if matches!(self.current.kind, TokenKind::RParen) {
            None
        } else {
            let e = self.parse_expression();
            Some(self.fold(e))
        };
        self.expect(&TokenKind::RParen);
        let body = self.parse_statement();
        self.symbols.leave_scope();
        self.stmts.alloc(Stmt::For { attributes, init, cond, increment, body })
    }

    fn parse_while_statement(&mut self, attributes: Attributes) -> Handle<Stmt> {
        self.advance();
        self.expect(&TokenKind::LParen);
        let cond = self.parse_expression();
        let cond = self.fold(cond);
        self.check_scalar_condition(cond);
        self.expect(&TokenKind::RParen);
        let body = self.parse_statement();
        self.stmts.alloc(Stmt::While { attributes, is_do_while: false, cond, body })
    }

    fn parse_do_while_statement(&mut self, attributes: Attributes) -> Handle<Stmt> {
        self.advance();
        let body = self.parse_statement();
        self.expect(&TokenKind::While);
        self.expect(&TokenKind::LParen);
        let cond = self.parse_expression();
        let cond = self.fold(cond);
        self.expect(&TokenKind::RParen);
        self.expect(&TokenKind::Semicolon);
        self.stmts.alloc(Stmt::While { attributes, is_do_while: true, cond, body })
    }

    // ---- expressions ---------------------------------------------------------

    fn parse_expression(&mut self) -> Handle<Expr> {
        let first = self.parse_assignment_expression();
        if !matches!(self.current.kind, TokenKind::Comma) {
            return first;
        }
        let mut list = vec![first];
        while self.accept(&TokenKind::Comma) {
            list.push(self.parse_assignment_expression());
        }
        let ty = self.exprs.get(*list.last().unwrap()).ty();
        self.exprs.alloc(Expr::Sequence { list, ty })
    }

    fn parse_assignment_expression(&mut self) -> Handle<Expr> {
        let lhs = self.parse_conditional_expression();
        let Some(op) = assign_op_for(&self.current.kind) else { return lhs };
        let loc = self.loc();
        self.advance();
        let rhs = self.parse_assignment_expression();
        if !self.is_lvalue(lhs) {
            self.diagnostics.error(loc.clone(), codes::LValueRequired, "l-value required as left operand of assignment");
        } else if self.is_const_lvalue(lhs) {
            self.diagnostics.error(loc.clone(), codes::ConstLValue, "cannot assign to a const-qualified variable");
        }
        let lhs_ty = self.exprs.get(lhs).ty();
        let rhs = self.convert_to(rhs, lhs_ty, loc);
        self.exprs.alloc(Expr::Assignment { op, lhs, rhs, ty: lhs_ty })
    }

    fn parse_conditional_expression(&mut self) -> Handle<Expr> {
        let cond = self.parse_binary_expression(PREC_LOGICAL_OR);
        if !self.accept(&TokenKind::Question) {
            return cond;
        }
        let then_expr = self.parse_assignment_expression();
        self.expect(&TokenKind::Colon);
        let else_expr = self.parse_assignment_expression();
        self.check_scalar_condition(cond);
        let ty = self.exprs.get(then_expr).ty();
        let node = self.exprs.alloc(Expr::Conditional { cond, then_expr, else_expr, ty });
        self.fold(node)
    }

    fn parse_binary_expression(&mut self, min_prec: u8) -> Handle<Expr> {
        let mut lhs = self.parse_unary_expression();
        loop {
            let Some((op, prec)) = binary_op_for(&self.current.kind) else { break };
            if prec < min_prec {
                break;
            }
            self.advance();
            let rhs = self.parse_binary_expression(prec + 1);
            if matches!(op, BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor | BinaryOp::Shl | BinaryOp::Shr) {
                let lty = self.exprs.get(lhs).ty();
                let rty = self.exprs.get(rhs).ty();
                if !lty.is_integral() || !rty.is_integral() {
                    self.diagnostics.error(self.loc(), codes::NonIntegralBitwiseOperand, "bitwise operators require integral operands");
                }
            }
            let ty = self.binary_result_type(op, lhs, rhs);
            let node = self.exprs.alloc(Expr::Binary { op, lhs, rhs, ty });
            lhs = self.fold(node);
        }
        lhs
    }

    fn binary_result_type(&self, op: BinaryOp, lhs: Handle<Expr>, rhs: Handle<Expr>) -> Type {
        let lty = self.exprs.get(lhs).ty();
        let rty = self.exprs.get(rhs).ty();
        let rows = lty.rows.max(rty.rows);
        let cols = lty.cols.max(rty.cols);
        if matches!(
            op,
            BinaryOp::Less
                | BinaryOp::LessEqual
                | BinaryOp::Greater
                | BinaryOp::GreaterEqual
                | BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::LogicalAnd
                | BinaryOp::LogicalOr
        ) {
            return Type { base_type: BaseType::Bool, rows, cols, array_length: ARRAY_NOT_ARRAY, qualifiers: Qualifiers::NONE, definition: None };
        }
        let base = if matches!(op, BinaryOp::Shl | BinaryOp::Shr | BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor) {
            BaseType::Int
        } else {
            fold::promote(lty.base_type, rty.base_type)
        };
        Type { base_type: base, rows, cols, array_length: ARRAY_NOT_ARRAY, qualifiers: Qualifiers::NONE, definition: None }
    }

    fn bool_shape_of(ty: Type) -> Type {
        Type { base_type: BaseType::Bool, rows: ty.rows, cols: ty.cols, array_length: ARRAY_NOT_ARRAY, qualifiers: Qualifiers::NONE, definition: None }
    }

    fn can_start_unary_expression(&self) -> bool {
        !matches!(
            self.current.kind,
            TokenKind::Semicolon
                | TokenKind::RParen
                | TokenKind::RBrace
                | TokenKind::RBracket
                | TokenKind::Comma
                | TokenKind::EndOfFile
                | TokenKind::Colon
        ) && binary_op_for(&self.current.kind).is_none()
            && assign_op_for(&self.current.kind).is_none()
    }

    /// The one genuinely ambiguous production: `(` Identifier `)` could be
    /// a struct cast or a parenthesized variable reference. Resolved by
    /// speculatively parsing a cast and rolling back via the lexer's
    /// snapshot/restore if it doesn't pan out.
    fn try_parse_cast(&mut self) -> Option<Type> {
        if !matches!(self.current.kind, TokenKind::LParen) {
            return None;
        }
        let snap = self.snapshot();
        self.advance();
        let ty = match self.current.kind.clone() {
            TokenKind::TypeName(t) => {
                self.advance();
                Some(t)
            }
            TokenKind::StringType => {
                self.advance();
                Some(Type::STRING)
            }
            TokenKind::Identifier(name) => match self.symbols.find(&name, false) {
                Some(DeclRef::Struct(handle)) => {
                    self.advance();
                    let mut t = Type::scalar(BaseType::Struct);
                    t.definition = Some(handle.index());
                    Some(t)
                }
                _ => None,
            },
            _ => None,
        };
        let Some(ty) = ty else {
            self.restore(snap);
            return None;
        };
        if !matches!(self.current.kind, TokenKind::RParen) {
            self.restore(snap);
            return None;
        }
        self.advance();
        if !self.can_start_unary_expression() {
            self.restore(snap);
            return None;
        }
        Some(ty)
    }

    fn parse_unary_expression(&mut self) -> Handle<Expr> {
        match self.current.kind {
            TokenKind::Minus => {
                self.advance();
                let operand = self.parse_unary_expression();
                let ty = self.exprs.get(operand).ty();
                let node = self.exprs.alloc(Expr::Unary { op: UnaryOp::Negate, operand, ty });
                self.fold(node)
            }
            TokenKind::Plus => {
                self.advance();
                self.parse_unary_expression()
            }
            TokenKind::Bang => {
                self.advance();
                let operand = self.parse_unary_expression();
                let ty = Self::bool_shape_of(self.exprs.get(operand).ty());
                let node = self.exprs.alloc(Expr::Unary { op: UnaryOp::LogicalNot, operand, ty });
                self.fold(node)
            }
            TokenKind::Tilde => {
                self.advance();
                let operand = self.parse_unary_expression();
                let ty = self.exprs.get(operand).ty();
                if !ty.is_integral() {
                    self.diagnostics.error(self.loc(), codes::NonIntegralBitwiseOperand, "bitwise complement requires an integral operand");
                }
                let node = self.exprs.alloc(Expr::Unary { op: UnaryOp::BitwiseNot, operand, ty });
                self.fold(node)
            }
            TokenKind::PlusPlus => {
                self.advance();
                let operand = self.parse_unary_expression();
                if !self.is_lvalue(operand) {
                    self.diagnostics.error(self.loc(), codes::LValueRequired, "l-value required as operand of '++'");
                }
                let ty = self.exprs.get(operand).ty();
                self.exprs.alloc(Expr::Unary { op: UnaryOp::PreInc, operand, ty })
            }
            TokenKind::MinusMinus => {
                self.advance();
                let operand = self.parse_unary_expression();
                if !self.is_lvalue(operand) {
                    self.diagnostics.error(self.loc(), codes::LValueRequired, "l-value required as operand of '--'");
                }
                let ty = self.exprs.get(operand).ty();
                self.exprs.alloc(Expr::Unary { op: UnaryOp::PreDec, operand, ty })
            }
            TokenKind::LParen => {
                if let Some(cast_ty) = self.try_parse_cast() {
                    let operand = self.parse_unary_expression();
                    let node = self.exprs.alloc(Expr::Unary { op: UnaryOp::Cast, operand, ty: cast_ty });
                    self.fold(node)
                } else {
                    self.parse_postfix_expression()
                }
            }
            _ => self.parse_postfix_expression(),
        }
    }

    fn is_lvalue(&self, expr: Handle<Expr>) -> bool {
        matches!(
            self.exprs.get(expr),
            Expr::LValue { .. } | Expr::Field { .. } | Expr::Swizzle { .. } | Expr::Binary { op: BinaryOp::ElementExtract, .. }
        )
    }

    fn is_const_lvalue(&self, expr: Handle<Expr>) -> bool {
        match self.exprs.get(expr) {
            Expr::LValue { variable, .. } => self.variables.get(*variable).ty.has_qualifier(Qualifiers::CONST),
            _ => false,
        }
    }

    fn convert_to(&mut self, expr: Handle<Expr>, target: Type, loc: Location) -> Handle<Expr> {
        let src = self.exprs.get(expr).ty();
        if src == target {
            return expr;
        }
        let rank = Type::rank(&src, &target);
        if rank == 0 {
            self.diagnostics.error(loc, codes::CannotConvert, format!("cannot implicitly convert from '{src}' to '{target}'"));
            return expr;
        }
        if rank & 32 != 0 {
            self.diagnostics.warning(loc, codes::ImplicitTruncation, format!("implicit truncation from '{src}' to '{target}'"));
        }
        let node = self.exprs.alloc(Expr::Unary { op: UnaryOp::Cast, operand: expr, ty: target });
        self.fold(node)
    }

    fn parse_postfix_expression(&mut self) -> Handle<Expr> {
        let mut expr = self.parse_primary_expression();
        loop {
            match self.current.kind.clone() {
                TokenKind::Dot => {
                    self.advance();
                    let Some(name) = self.expect_identifier() else { break };
                    expr = self.apply_member_access(expr, &name);
                }
                TokenKind::PlusPlus => {
                    self.advance();
                    if !self.is_lvalue(expr) {
                        self.diagnostics.error(self.loc(), codes::LValueRequired, "l-value required as operand of '++'");
                    }
                    let ty = self.exprs.get(expr).ty();
                    expr = self.exprs.alloc(Expr::Unary { op: UnaryOp::PostInc, operand: expr, ty });
                }
                TokenKind::MinusMinus => {
                    self.advance();
                    if !self.is_lvalue(expr) {
                        self.diagnostics.error(self.loc(), codes::LValueRequired, "l-value required as operand of '--'");
                    }
                    let ty = self.exprs.get(expr).ty();
                    expr = self.exprs.alloc(Expr::Unary { op: UnaryOp::PostDec, operand: expr, ty });
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expression();
                    let index = self.fold(index);
                    self.expect(&TokenKind::RBracket);
                    expr = self.apply_index(expr, index);
                }
                _ => break,
            }
        }
        expr
    }

    fn lookup_struct_field(&self, ty: Type, name: &str) -> Option<Handle<FieldDecl>> {
        let idx = ty.definition?;
        let struct_handle: Handle<StructDecl> = Handle::from_raw(idx);
        let decl = self.structs.get(struct_handle);
        decl.fields.iter().copied().find(|&f| self.fields.get(f).name == name)
    }

    fn parse_vector_swizzle_mask(&mut self, name: &str, rows: u8) -> Option<Vec<i8>> {
        if name.is_empty() || name.len() > 4 {
            return None;
        }
        const XYZW: &[u8] = b"xyzw";
        const RGBA: &[u8] = b"rgba";
        const STPQ: &[u8] = b"stpq";
        let bytes = name.as_bytes();
        let set = if bytes.iter().all(|b| XYZW.contains(b)) {
            XYZW
        } else if bytes.iter().all(|b| RGBA.contains(b)) {
            RGBA
        } else if bytes.iter().all(|b| STPQ.contains(b)) {
            STPQ
        } else {
            if bytes.iter().any(|b| XYZW.contains(b) || RGBA.contains(b) || STPQ.contains(b)) {
                self.diagnostics.error(self.loc(), codes::MixedSwizzleSets, "swizzle mask mixes different component sets");
            }
            return None;
        };
        let mut mask = Vec::with_capacity(bytes.len());
        for &b in bytes {
            let idx = set.iter().position(|&c| c == b).unwrap() as u8;
            if idx >= rows {
                self.diagnostics.error(self.loc(), codes::OutOfRangeSwizzle, "swizzle component out of range for this vector");
                return None;
            }
            mask.push(idx as i8);
        }
        Some(mask)
    }

    /// Parses a single `mRC`/`RC` group (without its leading underscore),
    /// returning the zero-based `(row, col)` offset and whether the group
    /// used the one-based (no `m`) form.
    fn parse_matrix_swizzle_group(part: &str) -> Option<(u8, u8, bool)> {
        let (one_based, digits) = match part.strip_prefix('m') {
            Some(d) => (false, d),
            None => (true, part),
        };
        if digits.len() != 2 {
            return None;
        }
        let mut chars = digits.chars();
        let r = chars.next()?.to_digit(10)? as u8;
        let c = chars.next()?.to_digit(10)? as u8;
        if one_based {
            if !(1..=4).contains(&r) || !(1..=4).contains(&c) {
                return None;
            }
            Some((r - 1, c - 1, true))
        } else {
            if r > 3 || c > 3 {
                return None;
            }
            Some((r, c, false))
        }
    }

    /// Parses a matrix swizzle name made of up to 4 underscore-separated
    /// `_mRC`/`_RC` groups (e.g. `_m00_m11_m22_m33` or `_11_22`), all of
    /// the same one-based/zero-based form. Returns the offsets in order
    /// plus whether any offset repeats (which marks the result `const`).
    fn parse_matrix_swizzle_mask(name: &str) -> Option<(Vec<(u8, u8)>, bool)> {
        let rest = name.strip_prefix('_')?;
        if rest.is_empty() {
            return None;
        }
        let mut offsets = Vec::with_capacity(4);
        let mut form: Option<bool> = None;
        for part in rest.split('_') {
            let (r, c, one_based) = Self::parse_matrix_swizzle_group(part)?;
            match form {
                Some(f) if f != one_based => return None,
                Some(_) => {}
                None => form = Some(one_based),
            }
            offsets.push((r, c));
        }
        if offsets.is_empty() || offsets.len() > 4 {
            return None;
        }
        let mut duplicate = false;
        for i in 0..offsets.len() {
            for j in (i + 1)..offsets.len() {
                if offsets[i] == offsets[j] {
                    duplicate = true;
                }
            }
        }
        Some((offsets, duplicate))
    }

    fn apply_member_access(&mut self, expr: Handle<Expr>, name: &str) -> Handle<Expr> {
        let operand_ty = self.exprs.get(expr).ty();
        if operand_ty.is_struct() {
            if let Some(field) = self.lookup_struct_field(operand_ty, name) {
                let field_ty = self.fields.get(field).ty;
                return self.exprs.alloc(Expr::Field { operand: expr, field, ty: field_ty });
            }
            self.diagnostics.error(self.loc(), codes::SyntaxError, format!("'{name}' is not a member of this struct"));
            return expr;
        }
        if operand_ty.is_vector() || operand_ty.is_scalar() {
            if let Some(mask) = self.parse_vector_swizzle_mask(name, operand_ty.rows.max(1)) {
                let ty = Type { base_type: operand_ty.base_type, rows: mask.len() as u8, cols: 1, array_length: ARRAY_NOT_ARRAY, qualifiers: Qualifiers::NONE, definition: None };
                let mut arr = [-1i8; 4];
                for (i, &m) in mask.iter().enumerate() {
                    arr[i] = m;
                }
                let node = self.exprs.alloc(Expr::Swizzle { operand: expr, mask: arr, ty });
                return self.fold(node);
            }
            self.diagnostics.error(self.loc(), codes::SyntaxError, format!("'{name}' is not a valid swizzle"));
            return expr;
        }
        if operand_ty.is_matrix() {
            if let Some((offsets, duplicate)) = Self::parse_matrix_swizzle_mask(name) {
                let mut mask = [-1i8; 4];
                for (i, &(r, c)) in offsets.iter().enumerate() {
                    mask[i] = (r * 4 + c) as i8;
                }
                let qualifiers = if duplicate { Qualifiers::CONST } else { Qualifiers::NONE };
                let ty = Type::vector(operand_ty.base_type, offsets.len() as u8).with_qualifiers(qualifiers);
                let node = self.exprs.alloc(Expr::Swizzle { operand: expr, mask, ty });
                return self.fold(node);
            }
        }
        self.diagnostics.error(self.loc(), codes::SyntaxError, format!("'{name}' is not a valid member or swizzle"));
        expr
    }

    fn apply_index(&mut self, expr: Handle<Expr>, index: Handle<Expr>) -> Handle<Expr> {
        let ty = self.exprs.get(expr).ty();
        let elem_ty = if ty.is_array() {
            let mut t = ty;
            t.array_length = ARRAY_NOT_ARRAY;
            t
        } else if ty.is_matrix() {
            Type::vector(ty.base_type, ty.cols)
        } else if ty.is_vector() {
            Type::scalar(ty.base_type)
        } else {
            self.diagnostics.error(self.loc(), codes::TypeMismatch, "this type cannot be indexed");
            ty
        };
        // Not folded: constant indexing would need lane selection rather
        // than the folder's elementwise semantics.
        self.exprs.alloc(Expr::Binary { op: BinaryOp::ElementExtract, lhs: expr, rhs: index, ty: elem_ty })
    }

    fn parse_primary_expression(&mut self) -> Handle<Expr> {
        match self.current.kind.clone() {
            TokenKind::IntLiteral(v) => {
                self.advance();
                let mut value = [0i64; 16];
                value[0] = v;
                self.exprs.alloc(Expr::Literal { ty: Type::INT, value: LiteralValue::Int(value) })
            }
            TokenKind::UintLiteral(v) => {
                self.advance();
                let mut value = [0u64; 16];
                value[0] = v;
                self.exprs.alloc(Expr::Literal { ty: Type::UINT, value: LiteralValue::Uint(value) })
            }
            TokenKind::FloatLiteral(v) => {
                self.advance();
                let mut value = [0.0; 16];
                value[0] = v as f64;
                self.exprs.alloc(Expr::Literal { ty: Type::FLOAT, value: LiteralValue::Float(value) })
            }
            TokenKind::DoubleLiteral(v) => {
                self.advance();
                let mut value = [0.0; 16];
                value[0] = v;
                self.exprs.alloc(Expr::Literal { ty: Type::FLOAT, value: LiteralValue::Float(value) })
            }
            TokenKind::True => {
                self.advance();
                self.exprs.alloc(Expr::Literal { ty: Type::BOOL, value: LiteralValue::Bool([true; 16]) })
            }
            TokenKind::False => {
                self.advance();
                self.exprs.alloc(Expr::Literal { ty: Type::BOOL, value: LiteralValue::Bool([false; 16]) })
            }
            TokenKind::StringLiteral(s) => {
                self.advance();
                self.exprs.alloc(Expr::Literal { ty: Type::STRING, value: LiteralValue::String(s) })
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression();
                self.expect(&TokenKind::RParen);
                inner
            }
            TokenKind::TypeName(ty) => self.parse_constructor_call(ty),
            TokenKind::Identifier(name) => self.parse_identifier_or_call(name),
            other => {
                self.diagnostics.error(self.loc(), codes::SyntaxError, format!("unexpected token {other:?}"));
                self.advance();
                self.exprs.alloc(Expr::Literal { ty: Type::INT, value: LiteralValue::Int([0; 16]) })
            }
        }
    }

    fn parse_constructor_call(&mut self, ty: Type) -> Handle<Expr> {
        self.advance();
        self.expect(&TokenKind::LParen);
        let mut arguments = Vec::new();
        if !matches!(self.current.kind, TokenKind::RParen) {
            loop {
                arguments.push(self.parse_assignment_expression());
                if !self.accept(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen);
        let total: usize = arguments.iter().map(|&a| self.exprs.get(a).ty().lane_count()).sum();
        if total != ty.components() as usize {
            self.diagnostics.error(self.loc(), codes::WrongArgumentCount, "constructor argument component count does not match the target type");
        }
        let node = self.exprs.alloc(Expr::Constructor { target_type: ty, arguments });
        self.fold(node)
    }

    fn parse_identifier_or_call(&mut self, name: String) -> Handle<Expr> {
        self.advance();
        let mut full_name = name;
        while matches!(self.current.kind, TokenKind::ColonColon) {
            self.advance();
            let Some(next) = self.expect_identifier() else { break };
            full_name = format!("{full_name}::{next}");
        }
        let (namespace, last) = match full_name.rfind("::") {
            Some(pos) => (Some(full_name[..pos].to_string()), full_name[pos + 2..].to_string()),
            None => (None, full_name.clone()),
        };

        if matches!(self.current.kind, TokenKind::LParen) {
            return self.parse_call(last, namespace);
        }

        let decl = match &namespace {
            Some(ns) => self.symbols.find_qualified(ns, &last),
            None => self.symbols.find(&last, false),
        };
        match decl {
            Some(DeclRef::Variable(handle)) => {
                let ty = self.variables.get(handle).ty;
                let node = self.exprs.alloc(Expr::LValue { variable: handle, ty });
                self.fold(node)
            }
            _ => {
                self.diagnostics.error(self.loc(), codes::UndeclaredIdentifier, format!("'{full_name}' is undeclared"));
                self.exprs.alloc(Expr::Literal { ty: Type::INT, value: LiteralValue::Int([0; 16]) })
            }
        }
    }

    fn convert_call_arguments(&mut self, arguments: &[Handle<Expr>], handle: Handle<FunctionDecl>) -> Vec<Handle<Expr>> {
        let param_types: Vec<Type> = self.functions.get(handle).parameters.iter().map(|p| p.ty).collect();
        let mut out = Vec::with_capacity(arguments.len());
        for (&arg, &param_ty) in arguments.iter().zip(param_types.iter()) {
            let loc = self.loc();
            out.push(self.convert_to(arg, param_ty, loc));
        }
        out
    }

    fn parse_call(&mut self, name: String, namespace: Option<String>) -> Handle<Expr> {
        self.advance();
        let mut arguments = Vec::new();
        if !matches!(self.current.kind, TokenKind::RParen) {
            loop {
                arguments.push(self.parse_assignment_expression());
                if !self.accept(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen);
        let arg_types: Vec<Type> = arguments.iter().map(|&a| self.exprs.get(a).ty()).collect();
        let loc = self.loc();
        match self.symbols.resolve_call(&name, &arg_types, namespace.as_deref()) {
            CallResolution::Resolved(DeclRef::Function { handle, return_type, .. }) => {
                if Some(handle) == self.symbols.current_parent() {
                    self.diagnostics.error(loc, codes::Recursion, "recursive function calls are not supported");
                }
                let arguments = self.convert_call_arguments(&arguments, handle);
                self.exprs.alloc(Expr::Call { callee_name: name, callee: Some(handle), arguments, ty: return_type })
            }
            CallResolution::Resolved(DeclRef::Intrinsic(entry)) => {
                let node = self.exprs.alloc(Expr::Intrinsic { op: entry.op, arguments, ty: entry.return_type });
                self.fold(node)
            }
            CallResolution::Resolved(_) => unreachable!("resolve_call only yields function-like candidates"),
            CallResolution::Ambiguous => {
                self.diagnostics.error(loc, codes::AmbiguousCall, format!("call to '{name}' is ambiguous"));
                self.exprs.alloc(Expr::Call { callee_name: name, callee: None, arguments, ty: Type::VOID })
            }
            CallResolution::NotFound => {
                self.diagnostics.error(loc, codes::NoMatchingOverload, format!("no overload of '{name}' matches the given arguments"));
                self.exprs.alloc(Expr::Call { callee_name: name, callee: None, arguments, ty: Type::VOID })
            }
        }
    }

    // ---- initializer lists ----------------------------------------------

    fn parse_initializer_list(&mut self, ty: Type) -> Handle<Expr> {
        self.expect(&TokenKind::LBrace);
        let elem_ty = if ty.is_array() {
            let mut t = ty;
            t.array_length = ARRAY_NOT_ARRAY;
            t
        } else {
            ty
        };
        let mut values = Vec::new();
        if !matches!(self.current.kind, TokenKind::RBrace) {
            loop {
                let value = if matches!(self.current.kind, TokenKind::LBrace) {
                    self.parse_initializer_list(elem_ty)
                } else {
                    self.parse_assignment_expression()
                };
                values.push(self.fold(value));
                if !self.accept(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RBrace);

        if ty.is_array() && ty.array_length > ARRAY_NOT_ARRAY {
            let declared = ty.array_length as usize;
            if values.len() > declared {
                self.diagnostics.error(
                    self.loc(),
                    codes::CannotConvert,
                    format!("too many initializers ({}) for array of length {}", values.len(), declared),
                );
            } else {
                while values.len() < declared {
                    let zero = self.exprs.alloc(Expr::Literal { ty: elem_ty, value: LiteralValue::zero_for(elem_ty.base_type) });
                    values.push(zero);
                }
            }
        }

        self.exprs.alloc(Expr::InitializerList { values, ty })
    }

    // ---- techniques ---------------------------------------------------------

    fn parse_technique(&mut self) {
        self.advance();
        let name = self.expect_identifier().unwrap_or_default();
        let annotations = self.parse_optional_annotations();
        self.expect(&TokenKind::LBrace);
        let mut passes = Vec::new();
        while !matches!(self.current.kind, TokenKind::RBrace | TokenKind::EndOfFile) {
            passes.push(self.parse_pass());
        }
        self.expect(&TokenKind::RBrace);
        let unique_name = self.mangle("T", &name);
        self.techniques.push(TechniqueDecl { name, unique_name, annotations, passes });
    }

    fn parse_pass(&mut self) -> PassDecl {
        self.expect(&TokenKind::Pass);
        let name = if matches!(self.current.kind, TokenKind::Identifier(_)) { self.expect_identifier() } else { None };
        self.expect(&TokenKind::LBrace);
        let mut states: HashMap<String, Handle<Expr>> = HashMap::new();
        while !matches!(self.current.kind, TokenKind::RBrace | TokenKind::EndOfFile) {
            let Some(key) = self.expect_identifier() else {
                self.resync_to_rbrace();
                break;
            };
            self.expect(&TokenKind::Equal);
            let value = self.parse_property_value_expr();
            states.insert(key, value);
            self.expect(&TokenKind::Semicolon);
        }
        self.expect(&TokenKind::RBrace);
        PassDecl { name, states }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> (Module, DiagnosticBag) {
        let buffer = SourceBuffer::new("test.fx", src);
        Parser::new(&buffer).parse_module()
    }

    #[test]
    fn s1_const_global_folds_arithmetic_with_precedence() {
        let (module, diags) = parse("static const int x = 2 + 3 * 4;");
        assert!(diags.ok());
        assert_eq!(module.global_variables.len(), 1);
        let var = module.variables.get(module.global_variables[0]);
        assert!(var.ty.has_qualifier(Qualifiers::CONST));
        match module.exprs.get(var.initializer.unwrap()) {
            Expr::Literal { value: LiteralValue::Int(v), .. } => assert_eq!(v[0], 14),
            other => panic!("expected folded literal, got {other:?}"),
        }
    }

    #[test]
    fn s2_vector_initializer_folds_and_warns_implicit_uniform() {
        let (module, diags) = parse("float3 v = float3(1, 2, 3) * 2.0;");
        assert!(diags.ok());
        assert_eq!(diags.len(), 1);
        let var = module.variables.get(module.global_variables[0]);
        assert!(var.ty.has_qualifier(Qualifiers::UNIFORM));
        assert!(var.ty.has_qualifier(Qualifiers::EXTERN));
        match module.exprs.get(var.initializer.unwrap()) {
            Expr::Literal { value: LiteralValue::Float(v), .. } => assert_eq!(&v[..3], &[2.0, 4.0, 6.0]),
            other => panic!("expected folded literal, got {other:?}"),
        }
    }

    #[test]
    fn s3_swizzle_in_return_constructor_has_no_diagnostics() {
        let src = "float4 main(float2 uv : TEXCOORD) : SV_TARGET {\n  return float4(uv.yx, 0, 1);\n}\n";
        let (module, diags) = parse(src);
        assert!(diags.ok(), "{diags}");
        assert_eq!(module.global_functions.len(), 1);
        let func = module.functions.get(module.global_functions[0]);
        assert_eq!(func.parameters[0].semantic.as_deref(), Some("TEXCOORD"));
        assert_eq!(func.return_semantic.as_deref(), Some("SV_TARGET"));
        let Stmt::Compound { statements } = module.stmts.get(func.body.unwrap()) else { panic!("expected compound body") };
        let Stmt::Return { value } = module.stmts.get(statements[0]) else { panic!("expected return statement") };
        let Expr::Constructor { arguments, .. } = module.exprs.get(value.unwrap()) else { panic!("expected constructor") };
        match module.exprs.get(arguments[0]) {
            Expr::Swizzle { mask, .. } => assert_eq!(mask, &[1, 0, -1, -1]),
            other => panic!("expected swizzle, got {other:?}"),
        }
    }

    #[test]
    fn matrix_swizzle_diagonal_repeats_up_to_four_groups() {
        let src = "float4x4 m;\nfloat4 main() : SV_TARGET {\n  return m._m00_m11_m22_m33;\n}\n";
        let (module, diags) = parse(src);
        assert!(diags.ok(), "{diags}");
        let func = module.functions.get(module.global_functions[0]);
        let Stmt::Compound { statements } = module.stmts.get(func.body.unwrap()) else { panic!("expected compound body") };
        let Stmt::Return { value } = module.stmts.get(statements[0]) else { panic!("expected return statement") };
        match module.exprs.get(value.unwrap()) {
            Expr::Swizzle { mask, ty, .. } => {
                assert_eq!(mask, &[0, 5, 10, 15]);
                assert!(!ty.has_qualifier(Qualifiers::CONST));
            }
            other => panic!("expected swizzle, got {other:?}"),
        }
    }

    #[test]
    fn matrix_swizzle_repeated_offset_marks_result_const() {
        let src = "float4x4 m;\nfloat2 main() : SV_TARGET {\n  return m._m00_m00;\n}\n";
        let (module, diags) = parse(src);
        assert!(diags.ok(), "{diags}");
        let func = module.functions.get(module.global_functions[0]);
        let Stmt::Compound { statements } = module.stmts.get(func.body.unwrap()) else { panic!("expected compound body") };
        let Stmt::Return { value } = module.stmts.get(statements[0]) else { panic!("expected return statement") };
        match module.exprs.get(value.unwrap()) {
            Expr::Swizzle { mask, ty, .. } => {
                assert_eq!(&mask[..2], &[0, 0]);
                assert!(ty.has_qualifier(Qualifiers::CONST));
            }
            other => panic!("expected swizzle, got {other:?}"),
        }
    }

    #[test]
    fn s4_wrong_constructor_argument_count_is_an_error() {
        let (_, diags) = parse("float4 p = float4(1,2,3);");
        assert!(!diags.ok());
        assert!(diags.iter().any(|d| d.code == codes::WrongArgumentCount));
    }

    #[test]
    fn s5_oversized_initializer_list_errors_undersized_pads_with_zero() {
        let (_, diags) = parse("int a[2] = { 1, 2, 3 };");
        assert!(diags.iter().any(|d| d.code == codes::CannotConvert));

        let (module, diags2) = parse("int a[3] = { 1 };");
        assert!(diags2.ok(), "{diags2}");
        let var = module.variables.get(module.global_variables[0]);
        let Expr::InitializerList { values, .. } = module.exprs.get(var.initializer.unwrap()) else { panic!("expected initializer list") };
        assert_eq!(values.len(), 3);
        match module.exprs.get(values[1]) {
            Expr::Literal { value: LiteralValue::Int(v), .. } => assert_eq!(v[0], 0),
            other => panic!("expected zero-padded literal, got {other:?}"),
        }
    }

    #[test]
    fn s6_namespace_qualified_lookup_resolves_and_folds() {
        let src = "namespace A {\n  static const float pi = 3.14;\n  float twice() { return pi * 2.0; }\n}\nfloat f() { return A::pi; }\n";
        let (module, diags) = parse(src);
        assert!(diags.ok(), "{diags}");
        assert_eq!(module.global_functions.len(), 2);
        for &handle in &module.global_functions {
            let func = module.functions.get(handle);
            let Stmt::Compound { statements } = module.stmts.get(func.body.unwrap()) else { panic!("expected compound body") };
            let Stmt::Return { value } = module.stmts.get(statements[0]) else { panic!("expected return") };
            assert!(matches!(module.exprs.get(value.unwrap()), Expr::Literal { .. }), "expected {} to fold", func.name);
        }
    }

    #[test]
    fn recursive_call_is_rejected() {
        let (_, diags) = parse("int fact(int n) { return n * fact(n - 1); }");
        assert!(diags.iter().any(|d| d.code == codes::Recursion));
    }

    #[test]
    fn overload_resolution_picks_exact_match_regardless_of_order() {
        let src = "float pick(float a) { return a; }\nint pick(int a) { return a; }\nfloat g() { return pick(1.0); }\n";
        let (module, diags) = parse(src);
        assert!(diags.ok(), "{diags}");
        let g = module.functions.get(module.global_functions[2]);
        let Stmt::Compound { statements } = module.stmts.get(g.body.unwrap()) else { panic!() };
        let Stmt::Return { value } = module.stmts.get(statements[0]) else { panic!() };
        let Expr::Call { callee, .. } = module.exprs.get(value.unwrap()) else { panic!("expected a call") };
        let callee_handle = callee.expect("resolved callee");
        assert_eq!(module.functions.get(callee_handle).name, "pick");
        assert_eq!(module.functions.get(callee_handle).parameters[0].ty.base_type, BaseType::Float);
    }

    #[test]
    fn technique_and_pass_states_are_captured() {
        let src = "float4 main() : SV_TARGET { return 0; }\ntechnique T {\n  pass P {\n    PixelShader = main;\n  }\n}\n";
        let (module, diags) = parse(src);
        assert!(diags.ok(), "{diags}");
        assert_eq!(module.techniques.len(), 1);
        assert_eq!(module.techniques[0].passes.len(), 1);
        assert!(module.techniques[0].passes[0].states.contains_key("PixelShader"));
    }

    #[test]
    fn empty_struct_warns() {
        let (_, diags) = parse("struct Empty {};");
        assert!(diags.ok());
        assert!(diags.iter().any(|d| d.code == codes::EmptyStruct));
    }

    #[test]
    fn cast_to_struct_type_is_disambiguated_from_parenthesized_variable() {
        let src = "struct Point { float x; float y; };\nfloat g(Point p) { return (Point)p.x; }\n";
        let (_, diags) = parse(src);
        // (Point)p.x is a cast of p.x to Point, not a call; this mistyping
        // is a semantic error (scalar -> struct) rather than a parse error.
        assert!(!diags.iter().any(|d| d.code == codes::SyntaxError), "{diags}");
    }
}
