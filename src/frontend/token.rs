//! Token definitions for tinyjs

use std::fmt;

use crate::utils::Span;

/// A token produced by the lexer: its kind plus the exact source text
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, span: Span) -> Self {
        Self { kind, literal: literal.into(), span }
    }

    pub fn eof(span: Span) -> Self {
        Self { kind: TokenKind::Eof, literal: String::new(), span }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({}, '{}')", self.kind, self.literal)
    }
}

/// Token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // ============ Special ============
    /// End of input
    Eof,

    // ============ Keywords ============
    /// function
    Function,
    /// var, let (the spelling survives in the token literal)
    Var,
    /// const
    Const,
    /// if
    If,
    /// else
    Else,
    /// while
    While,
    /// for
    For,
    /// return
    Return,
    /// true
    True,
    /// false
    False,
    /// void
    Void,
    /// null
    Null,

    // ============ Identifiers and Literals ============
    Ident,
    Number,
    Str,

    // ============ Operators ============
    /// =
    Assign,
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// %
    Percent,
    /// !
    Bang,
    /// <
    Lt,
    /// >
    Gt,
    /// <=
    Le,
    /// >=
    Ge,
    /// ==
    EqEq,
    /// !=
    NotEq,
    /// ===
    StrictEq,
    /// !==
    StrictNotEq,
    /// &&
    AndAnd,
    /// ||
    OrOr,

    // ============ Delimiters ============
    /// (
    LParen,
    /// )
    RParen,
    /// {
    LBrace,
    /// }
    RBrace,
    /// [
    LBracket,
    /// ]
    RBracket,
    /// ,
    Comma,
    /// .
    Dot,
    /// :
    Colon,
    /// ->
    Arrow,
    /// ;
    Semicolon,

    /// Unrecognized character
    Unknown,
}

impl TokenKind {
    /// Try to convert an identifier to a keyword
    pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
        match s {
            "function" => Some(TokenKind::Function),
            "var" | "let" => Some(TokenKind::Var),
            "const" => Some(TokenKind::Const),
            "if" => Some(TokenKind::If),
            "else" => Some(TokenKind::Else),
            "while" => Some(TokenKind::While),
            "for" => Some(TokenKind::For),
            "return" => Some(TokenKind::Return),
            "true" => Some(TokenKind::True),
            "false" => Some(TokenKind::False),
            "void" => Some(TokenKind::Void),
            "null" => Some(TokenKind::Null),
            _ => None,
        }
    }

    /// Keywords that start a new statement; resynchronization stops in front of them
    pub fn starts_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::Var | TokenKind::Const | TokenKind::Function | TokenKind::If
        )
    }

    /// Get the precedence of an infix or postfix operator (precedence climbing)
    /// Returns None if the token cannot continue an expression
    pub fn infix_precedence(&self) -> Option<u8> {
        match self {
            // Assignment (lowest, right-associative)
            TokenKind::Assign => Some(1),

            // Logical OR
            TokenKind::OrOr => Some(2),

            // Logical AND
            TokenKind::AndAnd => Some(3),

            // Equality
            TokenKind::EqEq | TokenKind::NotEq | TokenKind::StrictEq | TokenKind::StrictNotEq => Some(4),

            // Comparison
            TokenKind::Lt | TokenKind::Le | TokenKind::Gt | TokenKind::Ge => Some(5),

            // Additive
            TokenKind::Plus | TokenKind::Minus => Some(6),

            // Multiplicative
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Some(7),

            // Call and index
            TokenKind::LParen | TokenKind::LBracket => Some(PREC_POSTFIX),

            _ => None,
        }
    }
}

/// Binding power of prefix `!` and `-`
pub const PREC_UNARY: u8 = 8;

/// Binding power of call and index postfix operators
pub const PREC_POSTFIX: u8 = 9;

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Eof => "EOF",
            TokenKind::Function => "FUNCTION",
            TokenKind::Var => "VAR",
            TokenKind::Const => "CONST",
            TokenKind::If => "IF",
            TokenKind::Else => "ELSE",
            TokenKind::While => "WHILE",
            TokenKind::For => "FOR",
            TokenKind::Return => "RETURN",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::Void => "VOID",
            TokenKind::Null => "NULL",
            TokenKind::Ident => "IDENT",
            TokenKind::Number => "NUMBER",
            TokenKind::Str => "STRING",
            TokenKind::Assign => "ASSIGN",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Star => "ASTERISK",
            TokenKind::Slash => "SLASH",
            TokenKind::Percent => "MODULO",
            TokenKind::Bang => "BANG",
            TokenKind::Lt => "LT",
            TokenKind::Gt => "GT",
            TokenKind::Le => "LTE",
            TokenKind::Ge => "GTE",
            TokenKind::EqEq => "EQ",
            TokenKind::NotEq => "NOT_EQ",
            TokenKind::StrictEq => "STRICT_EQ",
            TokenKind::StrictNotEq => "STRICT_NOT_EQ",
            TokenKind::AndAnd => "AND",
            TokenKind::OrOr => "OR",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::LBrace => "LBRACE",
            TokenKind::RBrace => "RBRACE",
            TokenKind::LBracket => "LBRACKET",
            TokenKind::RBracket => "RBRACKET",
            TokenKind::Comma => "COMMA",
            TokenKind::Dot => "DOT",
            TokenKind::Colon => "COLON",
            TokenKind::Arrow => "ARROW",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}
