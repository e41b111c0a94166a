//! Lexer
//!
//! Produces a finite, non-restartable stream of tokens with literal
//! payloads (spec.md §4.B). Never panics: malformed input becomes an
//! `Unknown` token plus a recorded diagnostic, and lexing continues.
//!
//! The snapshot/restore mechanism here plays the role of `parser::backup`/
//! `restore` in `examples/original_source/source/parser.hpp`, which saves
//! the lexer state (`_lexer_backup`) plus the buffered lookahead tokens
//! (`_token`, `_token_next`) as a single unit; design note §9 asks for
//! that to become one `Snapshot` value, which is what [`Snapshot`] is.

use crate::diagnostics::{DiagnosticBag, codes};
use crate::source::{Location, SourceBuffer};
use crate::types::{BaseType, Type};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceDim {
    Generic,
    D1,
    D2,
    D3,
    Cube,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Dot,
    Colon,
    ColonColon,
    Question,
    Tilde,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Less,
    Greater,
    Equal,
    Bang,
    Amp,
    Pipe,
    Caret,
    PlusEqual,
    MinusEqual,
    StarEqual,
    SlashEqual,
    PercentEqual,
    AmpEqual,
    PipeEqual,
    CaretEqual,
    LessEqual,
    GreaterEqual,
    EqualEqual,
    BangEqual,
    AmpAmp,
    PipePipe,
    PlusPlus,
    MinusMinus,
    LessLess,
    GreaterGreater,
    LessLessEqual,
    GreaterGreaterEqual,
    Arrow,

    // Keywords: declarations / control flow
    Namespace,
    Struct,
    Technique,
    Pass,
    If,
    Else,
    For,
    While,
    Do,
    Break,
    Continue,
    Return,
    Discard,
    Switch,
    Case,
    Default,

    // Keywords: qualifiers
    Extern,
    Static,
    Uniform,
    Volatile,
    Precise,
    In,
    Out,
    InOut,
    Const,
    Linear,
    Noperspective,
    Centroid,
    Nointerpolation,

    // Boolean literals are keywords, not identifiers
    True,
    False,

    // Type keywords
    TypeName(Type),
    Sampler(ResourceDim),
    Texture(ResourceDim),
    StringType,

    // Literals / identifiers
    IntLiteral(i64),
    UintLiteral(u64),
    FloatLiteral(f32),
    DoubleLiteral(f64),
    StringLiteral(String),
    Identifier(String),

    EndOfFile,
    Unknown,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: Location,
}

/// Captures the lexer's cursor plus its buffered lookahead token as a
/// single restorable unit. Only one snapshot should be outstanding at a
/// time -- taking a second before restoring the first is an API misuse,
/// per spec.md §4.B, not something this type enforces at compile time.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pos: u32,
    peeked: Option<Token>,
}

pub struct Lexer<'a> {
    source: &'a SourceBuffer,
    bytes: &'a [u8],
    pos: u32,
    peeked: Option<Token>,
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Parse `float`, `int`, `uint`, `bool`, optionally suffixed by a row
/// count (`1`-`4`) and an `xN` column count, into a [`Type`]. Returns
/// `None` if `ident` isn't one of these words.
fn numeric_type_keyword(ident: &str) -> Option<Type> {
    let (base, rest) = if let Some(r) = ident.strip_prefix("float") {
        (BaseType::Float, r)
    } else if let Some(r) = ident.strip_prefix("uint") {
        (BaseType::Uint, r)
    } else if let Some(r) = ident.strip_prefix("int") {
        (BaseType::Int, r)
    } else if let Some(r) = ident.strip_prefix("bool") {
        (BaseType::Bool, r)
    } else {
        return None;
    };

    if rest.is_empty() {
        return Some(Type::scalar(base));
    }

    let mut chars = rest.chars();
    let rows = chars.next()?.to_digit(10)?;
    if !(1..=4).contains(&rows) {
        return None;
    }
    match chars.next() {
        None => Some(Type::vector(base, rows as u8)),
        Some('x') => {
            let cols = chars.next()?.to_digit(10)?;
            if chars.next().is_some() || !(1..=4).contains(&cols) {
                return None;
            }
            Some(Type::matrix(base, rows as u8, cols as u8))
        }
        _ => None,
    }
}

fn keyword_or_identifier(ident: &str) -> TokenKind {
    match ident {
        "namespace" => return TokenKind::Namespace,
        "struct" => return TokenKind::Struct,
        "technique" => return TokenKind::Technique,
        "pass" => return TokenKind::Pass,
        "if" => return TokenKind::If,
        "else" => return TokenKind::Else,
        "for" => return TokenKind::For,
        "while" => return TokenKind::While,
        "do" => return TokenKind::Do,
        "break" => return TokenKind::Break,
        "continue" => return TokenKind::Continue,
        "return" => return TokenKind::Return,
        "discard" => return TokenKind::Discard,
        "switch" => return TokenKind::Switch,
        "case" => return TokenKind::Case,
        "default" => return TokenKind::Default,
        "extern" => return TokenKind::Extern,
        "static" => return TokenKind::Static,
        "uniform" => return TokenKind::Uniform,
        "volatile" => return TokenKind::Volatile,
        "precise" => return TokenKind::Precise,
        "in" => return TokenKind::In,
        "out" => return TokenKind::Out,
        "inout" => return TokenKind::InOut,
        "const" => return TokenKind::Const,
        "linear" => return TokenKind::Linear,
        "noperspective" => return TokenKind::Noperspective,
        "centroid" => return TokenKind::Centroid,
        "nointerpolation" => return TokenKind::Nointerpolation,
        "true" => return TokenKind::True,
        "false" => return TokenKind::False,
        "void" => return TokenKind::TypeName(Type::VOID),
        "string" => return TokenKind::StringType,
        "sampler" => return TokenKind::Sampler(ResourceDim::Generic),
        "sampler1D" => return TokenKind::Sampler(ResourceDim::D1),
        "sampler2D" => return TokenKind::Sampler(ResourceDim::D2),
        "sampler3D" => return TokenKind::Sampler(ResourceDim::D3),
        "samplerCUBE" => return TokenKind::Sampler(ResourceDim::Cube),
        "texture" => return TokenKind::Texture(ResourceDim::Generic),
        "texture1D" => return TokenKind::Texture(ResourceDim::D1),
        "texture2D" => return TokenKind::Texture(ResourceDim::D2),
        "texture3D" => return TokenKind::Texture(ResourceDim::D3),
        "textureCUBE" => return TokenKind::Texture(ResourceDim::Cube),
        _ => {}
    }
    if let Some(ty) = numeric_type_keyword(ident) {
        return TokenKind::TypeName(ty);
    }
    TokenKind::Identifier(ident.to_string())
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a SourceBuffer) -> Self {
        Lexer {
            source,
            bytes: source.text().as_bytes(),
            pos: 0,
            peeked: None,
        }
    }

    fn loc(&self, offset: u32) -> Location {
        self.source.locate(offset)
    }

    fn byte_at(&self, i: u32) -> Option<u8> {
        self.bytes.get(i as usize).copied()
    }

    fn current(&self) -> Option<u8> {
        self.byte_at(self.pos)
    }

    fn peek_byte(&self, ahead: u32) -> Option<u8> {
        self.byte_at(self.pos + ahead)
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.current();
        if b.is_some() {
            self.pos += 1;
        }
        b
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.current() {
                Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => {
                    self.pos += 1;
                }
                Some(b'/') if self.peek_byte(1) == Some(b'/') => {
                    while let Some(b) = self.current() {
                        if b == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                Some(b'/') if self.peek_byte(1) == Some(b'*') => {
                    self.pos += 2;
                    loop {
                        match self.current() {
                            None => break,
                            Some(b'*') if self.peek_byte(1) == Some(b'/') => {
                                self.pos += 2;
                                break;
                            }
                            _ => self.pos += 1,
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn lex_number(&mut self, diags: &mut DiagnosticBag, start: u32) -> TokenKind {
        let is_hex = self.current() == Some(b'0')
            && matches!(self.peek_byte(1), Some(b'x') | Some(b'X'));
        let is_octal = self.current() == Some(b'0')
            && matches!(self.peek_byte(1), Some(b'0'..=b'7'));

        if is_hex {
            self.pos += 2;
            let digits_start = self.pos;
            while matches!(self.current(), Some(b) if b.is_ascii_hexdigit()) {
                self.pos += 1;
            }
            let text = &self.source.text()[digits_start as usize..self.pos as usize];
            let (value, overflowed) = match u64::from_str_radix(text, 16) {
                Ok(v) => (v, false),
                Err(_) => (u64::MAX, true),
            };
            if overflowed {
                diags.error(
                    self.loc(start),
                    codes::SyntaxError,
                    "integer literal out of range",
                );
            }
            return self.finish_integer_literal(value);
        }

        if is_octal {
            self.pos += 1;
            let digits_start = self.pos;
            while matches!(self.current(), Some(b'0'..=b'7')) {
                self.pos += 1;
            }
            let text = &self.source.text()[digits_start as usize..self.pos as usize];
            let (value, overflowed) = match u64::from_str_radix(text, 8) {
                Ok(v) => (v, false),
                Err(_) => (u64::MAX, true),
            };
            if overflowed {
                diags.error(
                    self.loc(start),
                    codes::SyntaxError,
                    "integer literal out of range",
                );
            }
            return self.finish_integer_literal(value);
        }

        while matches!(self.current(), Some(b) if b.is_ascii_digit()) {
            self.pos += 1;
        }

        let mut is_float = false;
        if self.current() == Some(b'.') {
            is_float = true;
            self.pos += 1;
            while matches!(self.current(), Some(b) if b.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        if matches!(self.current(), Some(b'e') | Some(b'E')) {
            let mut lookahead = self.pos + 1;
            if matches!(self.byte_at(lookahead), Some(b'+') | Some(b'-')) {
                lookahead += 1;
            }
            if matches!(self.byte_at(lookahead), Some(b) if b.is_ascii_digit()) {
                is_float = true;
                self.pos = lookahead;
                while matches!(self.current(), Some(b) if b.is_ascii_digit()) {
                    self.pos += 1;
                }
            }
        }

        let text = &self.source.text()[start as usize..self.pos as usize];

        if is_float {
            if matches!(self.current(), Some(b'l') | Some(b'L'))
                && matches!(self.peek_byte(1), Some(b'f') | Some(b'F'))
            {
                self.pos += 2;
                let value: f64 = text.parse().unwrap_or_else(|_| {
                    diags.error(self.loc(start), codes::SyntaxError, "malformed double literal");
                    0.0
                });
                return TokenKind::DoubleLiteral(value);
            }
            if matches!(self.current(), Some(b'f') | Some(b'F')) {
                self.pos += 1;
            }
            let value: f32 = text.parse().unwrap_or_else(|_| {
                diags.error(self.loc(start), codes::SyntaxError, "malformed float literal");
                0.0
            });
            return TokenKind::FloatLiteral(value);
        }

        if matches!(self.current(), Some(b'u') | Some(b'U')) {
            self.pos += 1;
            let value: u64 = text.parse().unwrap_or(u64::MAX);
            return TokenKind::UintLiteral(value);
        }

        match text.parse::<i64>() {
            Ok(value) => TokenKind::IntLiteral(value),
            Err(_) => {
                diags.error(
                    self.loc(start),
                    codes::SyntaxError,
                    "integer literal out of range",
                );
                TokenKind::IntLiteral(i64::MAX)
            }
        }
    }

    fn finish_integer_literal(&mut self, value: u64) -> TokenKind {
        if matches!(self.current(), Some(b'u') | Some(b'U')) {
            self.pos += 1;
            TokenKind::UintLiteral(value)
        } else {
            TokenKind::IntLiteral(value as i64)
        }
    }

    fn lex_string(&mut self, diags: &mut DiagnosticBag, start: u32) -> TokenKind {
        self.pos += 1; // opening quote
        let mut value = String::new();
        loop {
            match self.current() {
                None | Some(b'\n') => {
                    diags.error(self.loc(start), codes::SyntaxError, "unterminated string literal");
                    return TokenKind::Unknown;
                }
                Some(b'"') => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => {
                    self.pos += 1;
                    match self.bump() {
                        Some(b'\\') => value.push('\\'),
                        Some(b'"') => value.push('"'),
                        Some(b'n') => value.push('\n'),
                        Some(b't') => value.push('\t'),
                        Some(b'r') => value.push('\r'),
                        Some(b'0') => value.push('\0'),
                        Some(other) => {
                            diags.error(
                                self.loc(self.pos - 1),
                                codes::SyntaxError,
                                format!("unrecognized escape sequence '\\{}'", other as char),
                            );
                        }
                        None => {
                            diags.error(self.loc(start), codes::SyntaxError, "unterminated string literal");
                            return TokenKind::Unknown;
                        }
                    }
                }
                Some(_) => {
                    let s = start_of_utf8_char(self.bytes, self.pos);
                    let ch_str = std::str::from_utf8(&self.bytes[s.0 as usize..s.1 as usize])
                        .unwrap_or("?");
                    value.push_str(ch_str);
                    self.pos = s.1;
                }
            }
        }
        TokenKind::StringLiteral(value)
    }

    fn lex_punctuation(&mut self, diags: &mut DiagnosticBag, start: u32) -> TokenKind {
        macro_rules! three {
            ($c0:expr, $c1:expr, $c2:expr, $kind:expr) => {
                if self.current() == Some($c0)
                    && self.peek_byte(1) == Some($c1)
                    && self.peek_byte(2) == Some($c2)
                {
                    self.pos += 3;
                    return $kind;
                }
            };
        }
        macro_rules! two {
            ($c0:expr, $c1:expr, $kind:expr) => {
                if self.current() == Some($c0) && self.peek_byte(1) == Some($c1) {
                    self.pos += 2;
                    return $kind;
                }
            };
        }
        macro_rules! one {
            ($c0:expr, $kind:expr) => {
                if self.current() == Some($c0) {
                    self.pos += 1;
                    return $kind;
                }
            };
        }

        three!(b'<', b'<', b'=', TokenKind::LessLessEqual);
        three!(b'>', b'>', b'=', TokenKind::GreaterGreaterEqual);

        two!(b'<', b'<', TokenKind::LessLess);
        two!(b'>', b'>', TokenKind::GreaterGreater);
        two!(b'<', b'=', TokenKind::LessEqual);
        two!(b'>', b'=', TokenKind::GreaterEqual);
        two!(b'=', b'=', TokenKind::EqualEqual);
        two!(b'!', b'=', TokenKind::BangEqual);
        two!(b'&', b'&', TokenKind::AmpAmp);
        two!(b'|', b'|', TokenKind::PipePipe);
        two!(b'+', b'+', TokenKind::PlusPlus);
        two!(b'-', b'-', TokenKind::MinusMinus);
        two!(b'+', b'=', TokenKind::PlusEqual);
        two!(b'-', b'=', TokenKind::MinusEqual);
        two!(b'*', b'=', TokenKind::StarEqual);
        two!(b'/', b'=', TokenKind::SlashEqual);
        two!(b'%', b'=', TokenKind::PercentEqual);
        two!(b'&', b'=', TokenKind::AmpEqual);
        two!(b'|', b'=', TokenKind::PipeEqual);
        two!(b'^', b'=', TokenKind::CaretEqual);
        two!(b'-', b'>', TokenKind::Arrow);
        two!(b':', b':', TokenKind::ColonColon);

        one!(b'(', TokenKind::LParen);
        one!(b')', TokenKind::RParen);
        one!(b'{', TokenKind::LBrace);
        one!(b'}', TokenKind::RBrace);
        one!(b'[', TokenKind::LBracket);
        one!(b']', TokenKind::RBracket);
        one!(b';', TokenKind::Semicolon);
        one!(b',', TokenKind::Comma);
        one!(b'.', TokenKind::Dot);
        one!(b':', TokenKind::Colon);
        one!(b'?', TokenKind::Question);
        one!(b'~', TokenKind::Tilde);
        one!(b'+', TokenKind::Plus);
        one!(b'-', TokenKind::Minus);
        one!(b'*', TokenKind::Star);
        one!(b'/', TokenKind::Slash);
        one!(b'%', TokenKind::Percent);
        one!(b'<', TokenKind::Less);
        one!(b'>', TokenKind::Greater);
        one!(b'=', TokenKind::Equal);
        one!(b'!', TokenKind::Bang);
        one!(b'&', TokenKind::Amp);
        one!(b'|', TokenKind::Pipe);
        one!(b'^', TokenKind::Caret);

        let ch = self.current().unwrap();
        self.pos += 1;
        diags.error(
            self.loc(start),
            codes::SyntaxError,
            format!("unexpected character '{}'", ch as char),
        );
        TokenKind::Unknown
    }

    fn lex_one(&mut self, diags: &mut DiagnosticBag) -> Token {
        self.skip_trivia();
        let start = self.pos;
        let kind = match self.current() {
            None => TokenKind::EndOfFile,
            Some(b'"') => self.lex_string(diags, start),
            Some(b) if b.is_ascii_digit() => self.lex_number(diags, start),
            Some(b'.') if matches!(self.peek_byte(1), Some(d) if d.is_ascii_digit()) => {
                self.lex_number(diags, start)
            }
            Some(b) if is_ident_start(b) => {
                while matches!(self.current(), Some(b) if is_ident_continue(b)) {
                    self.pos += 1;
                }
                let text = &self.source.text()[start as usize..self.pos as usize];
                keyword_or_identifier(text)
            }
            Some(_) => self.lex_punctuation(diags, start),
        };
        Token {
            kind,
            location: self.loc(start),
        }
    }

    /// Return the next token, consuming it.
    pub fn next(&mut self, diags: &mut DiagnosticBag) -> Token {
        if let Some(tok) = self.peeked.take() {
            return tok;
        }
        self.lex_one(diags)
    }

    /// Return the next token without consuming it; repeated calls before
    /// a [`Lexer::next`] return the same token.
    pub fn peek(&mut self, diags: &mut DiagnosticBag) -> &Token {
        if self.peeked.is_none() {
            let tok = self.lex_one(diags);
            self.peeked = Some(tok);
        }
        self.peeked.as_ref().unwrap()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            pos: self.pos,
            peeked: self.peeked.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: Snapshot) {
        self.pos = snapshot.pos;
        self.peeked = snapshot.peeked;
    }
}

/// Returns the `[start, end)` byte range of the UTF-8 scalar value
/// beginning at `pos` (which must be a char boundary).
fn start_of_utf8_char(bytes: &[u8], pos: u32) -> (u32, u32) {
    let b0 = bytes[pos as usize];
    let len = if b0 & 0x80 == 0 {
        1
    } else if b0 & 0xE0 == 0xC0 {
        2
    } else if b0 & 0xF0 == 0xE0 {
        3
    } else {
        4
    };
    (pos, pos + len as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(src: &str) -> (Vec<TokenKind>, DiagnosticBag) {
        let buf = SourceBuffer::new("t.fx", src);
        let mut lexer = Lexer::new(&buf);
        let mut diags = DiagnosticBag::new();
        let mut kinds = Vec::new();
        loop {
            let tok = lexer.next(&mut diags);
            let is_eof = tok.kind == TokenKind::EndOfFile;
            kinds.push(tok.kind);
            if is_eof {
                break;
            }
        }
        (kinds, diags)
    }

    #[test]
    fn lexes_identifiers_and_keywords() {
        let (kinds, diags) = lex_all("float x = myVar;");
        assert!(diags.is_empty());
        assert_eq!(
            kinds,
            vec![
                TokenKind::TypeName(Type::FLOAT),
                TokenKind::Identifier("x".into()),
                TokenKind::Equal,
                TokenKind::Identifier("myVar".into()),
                TokenKind::Semicolon,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn lexes_vector_and_matrix_type_keywords() {
        let (kinds, _) = lex_all("float3 float4x4");
        assert_eq!(
            kinds[0],
            TokenKind::TypeName(Type::vector(BaseType::Float, 3))
        );
        assert_eq!(
            kinds[1],
            TokenKind::TypeName(Type::matrix(BaseType::Float, 4, 4))
        );
    }

    #[test]
    fn lexes_integer_suffixes() {
        let (kinds, _) = lex_all("1 1u 0x1F 010 0x1Fu 010u");
        assert_eq!(kinds[0], TokenKind::IntLiteral(1));
        assert_eq!(kinds[1], TokenKind::UintLiteral(1));
        assert_eq!(kinds[2], TokenKind::IntLiteral(0x1F));
        assert_eq!(kinds[3], TokenKind::IntLiteral(8));
        assert_eq!(kinds[4], TokenKind::UintLiteral(0x1F));
        assert_eq!(kinds[5], TokenKind::UintLiteral(8));
    }

    #[test]
    fn lexes_float_and_double_suffixes() {
        let (kinds, _) = lex_all("1.0 1.0f 1.0lf 1e3");
        assert_eq!(kinds[0], TokenKind::FloatLiteral(1.0));
        assert_eq!(kinds[1], TokenKind::FloatLiteral(1.0));
        assert_eq!(kinds[2], TokenKind::DoubleLiteral(1.0));
        assert_eq!(kinds[3], TokenKind::FloatLiteral(1000.0));
    }

    #[test]
    fn lexes_string_escapes() {
        let (kinds, diags) = lex_all("\"a\\nb\\\"c\"");
        assert!(diags.is_empty());
        assert_eq!(kinds[0], TokenKind::StringLiteral("a\nb\"c".into()));
    }

    #[test]
    fn unterminated_string_yields_diagnostic_and_unknown() {
        let (kinds, diags) = lex_all("\"unterminated");
        assert!(!diags.ok());
        assert_eq!(kinds[0], TokenKind::Unknown);
    }

    #[test]
    fn longest_match_wins_for_operators() {
        let (kinds, _) = lex_all("<<= >>= << >> <= >= == != && || ++ -- -> ::");
        assert_eq!(
            kinds,
            vec![
                TokenKind::LessLessEqual,
                TokenKind::GreaterGreaterEqual,
                TokenKind::LessLess,
                TokenKind::GreaterGreater,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
                TokenKind::EqualEqual,
                TokenKind::BangEqual,
                TokenKind::AmpAmp,
                TokenKind::PipePipe,
                TokenKind::PlusPlus,
                TokenKind::MinusMinus,
                TokenKind::Arrow,
                TokenKind::ColonColon,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn skips_line_and_block_comments() {
        let (kinds, _) = lex_all("// comment\nfloat /* inline */ x;");
        assert_eq!(
            kinds,
            vec![
                TokenKind::TypeName(Type::FLOAT),
                TokenKind::Identifier("x".into()),
                TokenKind::Semicolon,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn snapshot_restores_cursor_and_peek() {
        let buf = SourceBuffer::new("t.fx", "a b c");
        let mut lexer = Lexer::new(&buf);
        let mut diags = DiagnosticBag::new();
        let first = lexer.next(&mut diags);
        assert_eq!(first.kind, TokenKind::Identifier("a".into()));
        lexer.peek(&mut diags); // buffers "b"
        let snap = lexer.snapshot();
        let second = lexer.next(&mut diags); // consumes "b"
        assert_eq!(second.kind, TokenKind::Identifier("b".into()));
        lexer.restore(snap);
        let second_again = lexer.next(&mut diags);
        assert_eq!(second_again.kind, TokenKind::Identifier("b".into()));
        let third = lexer.next(&mut diags);
        assert_eq!(third.kind, TokenKind::Identifier("c".into()));
    }

    #[test]
    fn unexpected_character_becomes_unknown_and_never_panics() {
        let (kinds, diags) = lex_all("a @ b");
        assert!(!diags.ok());
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier("a".into()),
                TokenKind::Unknown,
                TokenKind::Identifier("b".into()),
                TokenKind::EndOfFile,
            ]
        );
    }
}
