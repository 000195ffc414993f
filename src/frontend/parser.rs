//! Parser for tinyjs
//!
//! Recursive descent for statements, precedence climbing for expressions.
//! Syntax errors are collected instead of aborting: a failed statement is
//! recorded, the token stream is resynchronized to the next statement
//! boundary and parsing carries on.

use log::debug;

use crate::frontend::ast::*;
use crate::frontend::lexer::Lexer;
use crate::frontend::token::{Token, TokenKind, PREC_UNARY};
use crate::utils::{Category, Error, Result};

/// The parser
pub struct Parser {
    lexer: Lexer,
    current: Token,
    peek: Token,
    errors: Vec<Error>,
    /// Lexical errors of `peek`, reported once it becomes `current`
    peek_errors: Vec<Error>,
    /// Tokens consumed so far, used to detect a statement that made no progress
    consumed: usize,
}

impl Parser {
    /// Create a new parser pulling tokens from a lexer
    pub fn new(mut lexer: Lexer) -> Self {
        let current = lexer.next_token();
        let errors = lexer.take_errors();
        let peek = lexer.next_token();
        let peek_errors = lexer.take_errors();
        Self {
            lexer,
            current,
            peek,
            errors,
            peek_errors,
            consumed: 0,
        }
    }

    // ==================== Helper Methods ====================

    fn advance(&mut self) -> Token {
        let next = self.lexer.next_token();
        let next_errors = self.lexer.take_errors();
        self.errors.extend(std::mem::replace(&mut self.peek_errors, next_errors));
        let peek = std::mem::replace(&mut self.peek, next);
        self.consumed += 1;
        std::mem::replace(&mut self.current, peek)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn is_at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    fn consume(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token> {
        if self.check(expected) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&expected.to_string()))
        }
    }

    /// Error for the current token when `expected` was required
    fn unexpected(&self, expected: &str) -> Error {
        if let Some(err) = self.unknown_char() {
            return err;
        }
        Error::UnexpectedToken {
            expected: expected.to_string(),
            found: self.current.kind.to_string(),
            literal: self.current.literal.clone(),
            span: self.current.span,
        }
    }

    /// An unknown token is already reported by the lexer; reuse that error so
    /// recovery still runs but nothing is reported twice
    fn unknown_char(&self) -> Option<Error> {
        if self.current.kind != TokenKind::Unknown {
            return None;
        }
        Some(Error::UnexpectedCharacter {
            ch: self.current.literal.chars().next().unwrap_or('\0'),
            span: self.current.span,
        })
    }

    fn report(&mut self, err: Error) {
        if err.category() != Category::Lexical {
            debug!("{}", err);
            self.errors.push(err);
        }
    }

    /// Skip tokens up to the next statement boundary
    ///
    /// A `;` is consumed. A `}`, end of input, or a keyword that starts a new
    /// statement is left in place for the caller. Brace groups opened while
    /// skipping are skipped whole, so their `}` is never taken as a boundary.
    fn synchronize(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.current.kind {
                TokenKind::Eof => return,
                TokenKind::RBrace if depth == 0 => return,
                TokenKind::Semicolon if depth == 0 => {
                    self.advance();
                    return;
                }
                kind if depth == 0 && kind.starts_statement() => return,
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth -= 1,
                _ => {}
            }
            self.advance();
        }
    }

    // ==================== Parsing Methods ====================

    /// Parse a complete program; check `take_errors()` before trusting the result
    pub fn parse_program(&mut self) -> Program {
        let statements = self.parse_statement_list(TokenKind::Eof);
        debug!(
            "parsed {} statement(s), {} error(s)",
            statements.len(),
            self.errors.len()
        );
        Program { statements }
    }

    /// Take ownership of the collected diagnostics
    pub fn take_errors(&mut self) -> Vec<Error> {
        std::mem::take(&mut self.errors)
    }

    fn parse_statement_list(&mut self, closer: TokenKind) -> Vec<Stmt> {
        let mut statements = Vec::new();

        while !self.check(closer) && !self.is_at_end() {
            if self.consume(TokenKind::Semicolon) {
                continue;
            }

            let before = self.consumed;
            match self.parse_stmt() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    self.report(err);
                    self.synchronize();
                }
            }

            // A token no statement can start with and recovery stopped on
            if self.consumed == before && !self.check(closer) && !self.is_at_end() {
                self.advance();
            }
        }

        statements
    }

    fn parse_block(&mut self) -> Result<Block> {
        self.expect(TokenKind::LBrace)?;
        let statements = self.parse_statement_list(TokenKind::RBrace);

        // Only end of input stops the list early; keep what was parsed
        if !self.consume(TokenKind::RBrace) {
            let err = self.unexpected(&TokenKind::RBrace.to_string());
            self.report(err);
        }

        Ok(Block { statements })
    }

    fn parse_stmt(&mut self) -> Result<Stmt> {
        match self.current.kind {
            TokenKind::Var | TokenKind::Const => {
                let stmt = self.parse_var_decl()?;
                self.consume(TokenKind::Semicolon);
                Ok(stmt)
            }
            TokenKind::Function => self.parse_func_decl(),
            TokenKind::Return => self.parse_return_stmt(),
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::While => self.parse_while_stmt(),
            TokenKind::For => self.parse_for_stmt(),
            TokenKind::LBrace => Ok(Stmt::Block(self.parse_block()?)),
            TokenKind::Semicolon => {
                self.advance();
                Ok(Stmt::Block(Block::default()))
            }
            _ => {
                let expr = self.parse_expr()?;
                self.consume(TokenKind::Semicolon);
                Ok(Stmt::Expr(expr))
            }
        }
    }

    fn parse_ident(&mut self) -> Result<Ident> {
        if !self.check(TokenKind::Ident) {
            return Err(self.unexpected(&TokenKind::Ident.to_string()));
        }
        let token = self.advance();
        Ok(Ident::new(token.literal, token.span))
    }

    /// var|let|const name [= expr], without the trailing `;`
    fn parse_var_decl(&mut self) -> Result<Stmt> {
        let keyword = self.advance();
        let kind = match (keyword.kind, keyword.literal.as_str()) {
            (TokenKind::Const, _) => VarKind::Const,
            (_, "let") => VarKind::Let,
            _ => VarKind::Var,
        };

        let name = self.parse_ident()?;
        let initializer = if self.consume(TokenKind::Assign) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        Ok(Stmt::VarDecl { kind, name, initializer })
    }

    fn parse_func_decl(&mut self) -> Result<Stmt> {
        self.expect(TokenKind::Function)?;
        let name = self.parse_ident()?;

        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                params.push(self.parse_ident()?);
                if !self.consume(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;

        // Optional return type annotation, accepted and ignored
        if self.consume(TokenKind::Arrow) && !self.consume(TokenKind::Void) {
            self.parse_ident()?;
        }

        let body = self.parse_block()?;
        Ok(Stmt::FuncDecl { name, params, body })
    }

    fn parse_return_stmt(&mut self) -> Result<Stmt> {
        let keyword = self.expect(TokenKind::Return)?;

        let value = if !self.check(TokenKind::Semicolon)
            && !self.check(TokenKind::RBrace)
            && !self.is_at_end()
        {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.consume(TokenKind::Semicolon);

        Ok(Stmt::Return { value, span: keyword.span })
    }

    fn parse_condition(&mut self) -> Result<Expr> {
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        Ok(condition)
    }

    fn parse_if_stmt(&mut self) -> Result<Stmt> {
        self.expect(TokenKind::If)?;
        let condition = self.parse_condition()?;
        let then_branch = Box::new(self.parse_stmt()?);

        let else_branch = if self.consume(TokenKind::Else) {
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };

        Ok(Stmt::If { condition, then_branch, else_branch })
    }

    fn parse_while_stmt(&mut self) -> Result<Stmt> {
        self.expect(TokenKind::While)?;
        let condition = self.parse_condition()?;
        let body = Box::new(self.parse_stmt()?);
        Ok(Stmt::While { condition, body })
    }

    fn parse_for_stmt(&mut self) -> Result<Stmt> {
        self.expect(TokenKind::For)?;
        self.expect(TokenKind::LParen)?;

        let init = match self.current.kind {
            TokenKind::Semicolon => None,
            TokenKind::Var | TokenKind::Const => Some(Box::new(self.parse_var_decl()?)),
            _ => Some(Box::new(Stmt::Expr(self.parse_expr()?))),
        };
        self.expect(TokenKind::Semicolon)?;

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon)?;

        let increment = if self.check(TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::RParen)?;

        let body = Box::new(self.parse_stmt()?);
        Ok(Stmt::For { init, condition, increment, body })
    }

    // ==================== Expression Parsing ====================

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_expr_bp(0)
    }

    /// Precedence climbing: keep absorbing operators that bind at least `min_bp`
    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr> {
        let mut left = self.parse_prefix()?;

        loop {
            let kind = self.current.kind;
            let Some(bp) = kind.infix_precedence() else {
                break;
            };
            if bp < min_bp {
                break;
            }

            left = match kind {
                TokenKind::LParen => self.parse_call(left)?,
                TokenKind::LBracket => self.parse_index(left)?,
                TokenKind::Assign => self.parse_assign(left, bp)?,
                _ => {
                    let Some(op) = Self::token_to_binop(kind) else {
                        break;
                    };
                    self.advance();
                    // Left-associative
                    let right = self.parse_expr_bp(bp + 1)?;
                    Expr::Binary {
                        left: Box::new(left),
                        op,
                        right: Box::new(right),
                    }
                }
            };
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expr> {
        let expr = match self.current.kind {
            TokenKind::Ident => Expr::Ident(self.parse_ident()?),
            TokenKind::Number => {
                let token = self.advance();
                Expr::Literal(Literal::Number(token.literal.parse().unwrap_or(0.0)))
            }
            TokenKind::Str => {
                let token = self.advance();
                Expr::Literal(Literal::String(token.literal))
            }
            TokenKind::True => {
                self.advance();
                Expr::Literal(Literal::Bool(true))
            }
            TokenKind::False => {
                self.advance();
                Expr::Literal(Literal::Bool(false))
            }
            TokenKind::Null => {
                self.advance();
                Expr::Literal(Literal::Null)
            }

            // Unary operators bind tighter than any binary operator
            TokenKind::Bang | TokenKind::Minus => {
                let op = if self.advance().kind == TokenKind::Bang {
                    UnOp::Not
                } else {
                    UnOp::Neg
                };
                let operand = self.parse_expr_bp(PREC_UNARY)?;
                Expr::Unary { op, operand: Box::new(operand) }
            }

            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                inner
            }

            TokenKind::LBracket => {
                self.advance();
                let elements = self.parse_expr_list(TokenKind::RBracket)?;
                Expr::Array(elements)
            }

            _ => {
                if let Some(err) = self.unknown_char() {
                    return Err(err);
                }
                return Err(Error::ExpectedExpr {
                    found: self.current.kind.to_string(),
                    literal: self.current.literal.clone(),
                    span: self.current.span,
                });
            }
        };

        Ok(expr)
    }

    /// Comma-separated expressions up to and including `closer`
    fn parse_expr_list(&mut self, closer: TokenKind) -> Result<Vec<Expr>> {
        let mut items = Vec::new();
        while !self.check(closer) && !self.is_at_end() {
            items.push(self.parse_expr()?);
            if !self.consume(TokenKind::Comma) {
                break;
            }
        }
        self.expect(closer)?;
        Ok(items)
    }

    fn parse_call(&mut self, callee: Expr) -> Result<Expr> {
        self.expect(TokenKind::LParen)?;
        let args = self.parse_expr_list(TokenKind::RParen)?;
        Ok(Expr::Call { callee: Box::new(callee), args })
    }

    fn parse_index(&mut self, collection: Expr) -> Result<Expr> {
        self.expect(TokenKind::LBracket)?;
        let index = self.parse_expr()?;
        self.expect(TokenKind::RBracket)?;
        Ok(Expr::Index {
            collection: Box::new(collection),
            index: Box::new(index),
        })
    }

    /// Right-associative: the value is parsed at assignment's own level
    fn parse_assign(&mut self, target: Expr, bp: u8) -> Result<Expr> {
        let eq = self.expect(TokenKind::Assign)?;
        let value = self.parse_expr_bp(bp)?;

        if !target.is_assignable() {
            self.report(Error::InvalidAssignTarget { span: eq.span });
            return Ok(value);
        }

        Ok(Expr::Assign {
            target: Box::new(target),
            value: Box::new(value),
        })
    }

    fn token_to_binop(kind: TokenKind) -> Option<BinOp> {
        match kind {
            TokenKind::Plus => Some(BinOp::Add),
            TokenKind::Minus => Some(BinOp::Sub),
            TokenKind::Star => Some(BinOp::Mul),
            TokenKind::Slash => Some(BinOp::Div),
            TokenKind::Percent => Some(BinOp::Mod),
            TokenKind::EqEq => Some(BinOp::Eq),
            TokenKind::NotEq => Some(BinOp::Ne),
            TokenKind::StrictEq => Some(BinOp::StrictEq),
            TokenKind::StrictNotEq => Some(BinOp::StrictNe),
            TokenKind::Lt => Some(BinOp::Lt),
            TokenKind::Le => Some(BinOp::Le),
            TokenKind::Gt => Some(BinOp::Gt),
            TokenKind::Ge => Some(BinOp::Ge),
            TokenKind::AndAnd => Some(BinOp::And),
            TokenKind::OrOr => Some(BinOp::Or),
            _ => None,
        }
    }
}

/// Parse a whole source string, returning the best-effort tree and every
/// lexical and syntax diagnostic
pub fn parse(source: &str) -> (Program, Vec<Error>) {
    let mut parser = Parser::new(Lexer::new(source));
    let program = parser.parse_program();
    (program, parser.take_errors())
}
