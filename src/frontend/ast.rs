//! Abstract Syntax Tree definitions for tinyjs
//!
//! Nodes own their children. The tree is built once by the parser and only
//! read afterwards by the analyzer and the code generator.

use std::fmt;

use crate::utils::Span;

/// A complete program (compilation unit)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

/// Identifier with its source location
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self { name: name.into(), span }
    }
}

/// Declaration keyword, as spelled in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKind {
    Var,
    Let,
    Const,
}

impl fmt::Display for VarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarKind::Var => write!(f, "var"),
            VarKind::Let => write!(f, "let"),
            VarKind::Const => write!(f, "const"),
        }
    }
}

/// Code block
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub statements: Vec<Stmt>,
}

/// Statement
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// var|let|const name [= expr]
    VarDecl {
        kind: VarKind,
        name: Ident,
        initializer: Option<Expr>,
    },
    /// function name(params) { body }
    FuncDecl {
        name: Ident,
        params: Vec<Ident>,
        body: Block,
    },
    /// return [expr]
    Return {
        value: Option<Expr>,
        span: Span,
    },
    /// if (cond) stmt [else stmt]
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    /// while (cond) stmt
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    /// for ([init]; [cond]; [increment]) stmt
    For {
        init: Option<Box<Stmt>>,
        condition: Option<Expr>,
        increment: Option<Expr>,
        body: Box<Stmt>,
    },
    /// { stmts }
    Block(Block),
    /// Expression statement
    Expr(Expr),
}

/// Expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Identifier
    Ident(Ident),
    /// Literal value
    Literal(Literal),
    /// [a, b, c]
    Array(Vec<Expr>),
    /// Unary operation
    Unary {
        op: UnOp,
        operand: Box<Expr>,
    },
    /// Binary operation
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    /// target = value, where target is an identifier or an index expression
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    /// Function call
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    /// Index access (collection[index])
    Index {
        collection: Box<Expr>,
        index: Box<Expr>,
    },
}

/// Literal value
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    String(String),
    Bool(bool),
    Null,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    Ne,
    StrictEq,
    StrictNe,
    Lt,
    Le,
    Gt,
    Ge,

    // Logical
    And,
    Or,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::StrictEq => "===",
            BinOp::StrictNe => "!==",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        };
        f.write_str(s)
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnOp {
    /// -
    Neg,
    /// !
    Not,
}

impl fmt::Display for UnOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnOp::Neg => write!(f, "-"),
            UnOp::Not => write!(f, "!"),
        }
    }
}

/// A reference to any node, used for generic traversal
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Stmt(&'a Stmt),
    Expr(&'a Expr),
}

impl Stmt {
    /// Direct children in evaluation order
    pub fn children(&self) -> Vec<Node<'_>> {
        match self {
            Stmt::VarDecl { initializer, .. } => initializer.iter().map(Node::Expr).collect(),
            Stmt::FuncDecl { body, .. } => body.statements.iter().map(Node::Stmt).collect(),
            Stmt::Return { value, .. } => value.iter().map(Node::Expr).collect(),
            Stmt::If { condition, then_branch, else_branch } => {
                let mut nodes = vec![Node::Expr(condition), Node::Stmt(then_branch)];
                nodes.extend(else_branch.as_deref().map(Node::Stmt));
                nodes
            }
            Stmt::While { condition, body } => vec![Node::Expr(condition), Node::Stmt(body)],
            Stmt::For { init, condition, increment, body } => {
                let mut nodes: Vec<Node<'_>> = init.as_deref().map(Node::Stmt).into_iter().collect();
                nodes.extend(condition.iter().map(Node::Expr));
                nodes.extend(increment.iter().map(Node::Expr));
                nodes.push(Node::Stmt(body));
                nodes
            }
            Stmt::Block(block) => block.statements.iter().map(Node::Stmt).collect(),
            Stmt::Expr(expr) => vec![Node::Expr(expr)],
        }
    }
}

impl Expr {
    /// Direct children in evaluation order
    pub fn children(&self) -> Vec<Node<'_>> {
        match self {
            Expr::Ident(_) | Expr::Literal(_) => Vec::new(),
            Expr::Array(elements) => elements.iter().map(Node::Expr).collect(),
            Expr::Unary { operand, .. } => vec![Node::Expr(operand)],
            Expr::Binary { left, right, .. } => vec![Node::Expr(left), Node::Expr(right)],
            Expr::Assign { target, value } => vec![Node::Expr(target), Node::Expr(value)],
            Expr::Call { callee, args } => {
                let mut nodes = vec![Node::Expr(callee)];
                nodes.extend(args.iter().map(Node::Expr));
                nodes
            }
            Expr::Index { collection, index } => vec![Node::Expr(collection), Node::Expr(index)],
        }
    }

    /// Whether this expression may appear on the left of `=`
    pub fn is_assignable(&self) -> bool {
        matches!(self, Expr::Ident(_) | Expr::Index { .. })
    }
}

impl<'a> Node<'a> {
    /// Direct children in evaluation order
    pub fn children(&self) -> Vec<Node<'a>> {
        match self {
            Node::Stmt(stmt) => stmt.children(),
            Node::Expr(expr) => expr.children(),
        }
    }
}
