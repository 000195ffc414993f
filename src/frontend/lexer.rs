//! Lexer for tinyjs
//!
//! Produces tokens lazily, one per `next_token` call. Invalid input never
//! stops the lexer: unrecognized characters become `Unknown` tokens and
//! unterminated strings run to end of input. Both are also recorded as
//! lexical errors the caller can drain.

use log::trace;

use crate::frontend::token::{Token, TokenKind};
use crate::utils::{Error, Span};

/// The lexer state
pub struct Lexer {
    /// Source code as chars
    source: Vec<char>,
    /// Current position in source
    pos: usize,
    /// Start position of current token
    start: usize,
    /// Lexical errors not yet taken by the caller
    errors: Vec<Error>,
}

impl Lexer {
    /// Create a new lexer for the given source code
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            start: 0,
            errors: Vec::new(),
        }
    }

    /// Get the current character without advancing
    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    /// Get the next character without advancing
    fn peek_next(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    /// Advance to the next character
    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    /// Create a span from start to current position
    fn make_span(&self) -> Span {
        Span::new(self.start, self.pos)
    }

    /// Create a token whose literal is the scanned source text
    fn make_token(&self, kind: TokenKind) -> Token {
        let text: String = self.source[self.start..self.pos].iter().collect();
        Token::new(kind, text, self.make_span())
    }

    /// Consume `next` if it follows, choosing between two kinds
    fn either(&mut self, next: char, matched: TokenKind, single: TokenKind) -> TokenKind {
        if self.peek() == Some(next) {
            self.advance();
            matched
        } else {
            single
        }
    }

    /// Skip whitespace and `//` comments
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' | '\n' => {
                    self.advance();
                }
                // Line comment, the newline itself is left for the whitespace arm
                '/' if self.peek_next() == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn is_ident_start(c: char) -> bool {
        c.is_ascii_alphabetic() || c == '_'
    }

    /// Read an identifier or keyword
    fn read_identifier(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if Self::is_ident_start(c) || c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }

        let text: String = self.source[self.start..self.pos].iter().collect();
        let kind = TokenKind::keyword_from_str(&text).unwrap_or(TokenKind::Ident);
        Token::new(kind, text, self.make_span())
    }

    /// Read a number literal: digits, optionally `.` and more digits
    ///
    /// A bare trailing `.` (`1.`) is part of the number, as in the source language.
    fn read_number(&mut self) -> Token {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek() == Some('.') {
            self.advance();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }

        self.make_token(TokenKind::Number)
    }

    /// Read a string literal; escapes are not processed
    fn read_string(&mut self) -> Token {
        self.advance(); // consume opening quote
        let content_start = self.pos;

        while let Some(c) = self.peek() {
            if c == '"' {
                break;
            }
            self.advance();
        }

        let value: String = self.source[content_start..self.pos].iter().collect();
        if self.advance().is_none() {
            self.errors.push(Error::UnterminatedString { span: self.make_span() });
        }

        Token::new(TokenKind::Str, value, self.make_span())
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Token {
        let token = self.scan_token();
        trace!("lexed {}", token);
        token
    }

    fn scan_token(&mut self) -> Token {
        self.skip_whitespace();
        self.start = self.pos;

        let Some(c) = self.advance() else {
            return Token::eof(self.make_span());
        };

        // Identifiers and keywords
        if Self::is_ident_start(c) {
            self.pos -= 1; // back up
            return self.read_identifier();
        }

        // Numbers
        if c.is_ascii_digit() {
            self.pos -= 1; // back up
            return self.read_number();
        }

        // String literals
        if c == '"' {
            self.pos -= 1; // back up
            return self.read_string();
        }

        let kind = match c {
            '=' => {
                if self.peek() == Some('=') {
                    self.advance();
                    self.either('=', TokenKind::StrictEq, TokenKind::EqEq)
                } else {
                    TokenKind::Assign
                }
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.advance();
                    self.either('=', TokenKind::StrictNotEq, TokenKind::NotEq)
                } else {
                    TokenKind::Bang
                }
            }
            '<' => self.either('=', TokenKind::Le, TokenKind::Lt),
            '>' => self.either('=', TokenKind::Ge, TokenKind::Gt),
            '-' => self.either('>', TokenKind::Arrow, TokenKind::Minus),
            '&' => self.either('&', TokenKind::AndAnd, TokenKind::Unknown),
            '|' => self.either('|', TokenKind::OrOr, TokenKind::Unknown),
            '+' => TokenKind::Plus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            _ => TokenKind::Unknown,
        };

        if kind == TokenKind::Unknown {
            self.errors.push(Error::UnexpectedCharacter { ch: c, span: self.make_span() });
        }

        self.make_token(kind)
    }

    /// Take the lexical errors recorded since the last call
    pub fn take_errors(&mut self) -> Vec<Error> {
        std::mem::take(&mut self.errors)
    }

    /// Tokenize the entire source and return all tokens, ending with `Eof`
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}
