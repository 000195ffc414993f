//! Semantic Analysis for tinyjs
//!
//! Performs:
//! - Symbol table management (nested scopes, redeclaration rules)
//! - Mutability checks on assignment
//! - Call checks (callee declared, callable, argument count)
//! - Best-effort type inference for indexing checks
//!
//! Every violation is recorded and analysis continues.

use std::collections::HashMap;
use std::fmt;

use log::{debug, trace};

use crate::frontend::ast::*;
use crate::stdlib::NativeRegistry;
use crate::types::TypeTag;
use crate::utils::{Error, Result, Span};

// ==================== Symbol Table ====================

/// Unique identifier for a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

/// How a symbol was introduced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Var,
    Let,
    Const,
    /// Native, registered before analysis
    Global,
}

impl From<VarKind> for DeclKind {
    fn from(kind: VarKind) -> Self {
        match kind {
            VarKind::Var => Self::Var,
            VarKind::Let => Self::Let,
            VarKind::Const => Self::Const,
        }
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Var => write!(f, "var"),
            Self::Let => write!(f, "let"),
            Self::Const => write!(f, "const"),
            Self::Global => write!(f, "global"),
        }
    }
}

/// Kind of symbol
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolKind {
    Variable,
    Function { params: Vec<TypeTag>, ret: TypeTag },
}

/// Symbol information
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub decl: DeclKind,
    pub mutable: bool,
    pub ty: TypeTag,
    pub span: Span,
}

impl Symbol {
    /// Mutability follows from the declaration kind: only `const` is frozen
    pub fn new(name: impl Into<String>, kind: SymbolKind, decl: DeclKind, ty: TypeTag, span: Span) -> Self {
        Self {
            name: name.into(),
            kind,
            decl,
            mutable: decl != DeclKind::Const,
            ty,
            span,
        }
    }
}

/// A scope containing symbols
#[derive(Debug)]
struct Scope {
    parent: Option<ScopeId>,
    symbols: HashMap<String, Symbol>,
    label: String,
    is_function: bool,
}

/// Symbol table with nested scopes
///
/// Scopes are pushed and popped in strict nesting order, so the arena is
/// always exactly the chain from the global scope to the current one.
pub struct SymbolTable {
    scopes: Vec<Scope>,
    current: ScopeId,
    function_depth: usize,
}

impl SymbolTable {
    pub fn new() -> Self {
        // Create global scope
        let global = Scope {
            parent: None,
            symbols: HashMap::new(),
            label: "global".to_string(),
            is_function: false,
        };
        Self {
            scopes: vec![global],
            current: ScopeId(0),
            function_depth: 0,
        }
    }

    /// Enter a new scope
    pub fn enter_scope(&mut self, label: impl Into<String>, is_function: bool) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            parent: Some(self.current),
            symbols: HashMap::new(),
            label: label.into(),
            is_function,
        });
        if is_function {
            self.function_depth += 1;
        }
        self.current = id;
        trace!("enter scope '{}' (depth {})", self.current_label(), self.depth());
        id
    }

    /// Exit the current scope, discarding its symbols
    ///
    /// The global scope is never exited.
    pub fn exit_scope(&mut self) {
        let Some(parent) = self.scopes[self.current.0].parent else {
            return;
        };
        if let Some(scope) = self.scopes.pop() {
            trace!("exit scope '{}'", scope.label);
            if scope.is_function {
                self.function_depth -= 1;
            }
        }
        self.current = parent;
    }

    /// Define a symbol in the current scope
    ///
    /// Redeclaring a name is an error when either declaration is `let` or
    /// `const`. Two plain `var` declarations are tolerated only in the global
    /// scope, where the newer symbol replaces the older one.
    pub fn define(&mut self, symbol: Symbol) -> Result<()> {
        let scope = &mut self.scopes[self.current.0];
        if let Some(existing) = scope.symbols.get(&symbol.name) {
            let tolerated =
                existing.decl == DeclKind::Var && symbol.decl == DeclKind::Var && scope.parent.is_none();
            if !tolerated {
                return Err(Error::AlreadyDeclared {
                    name: symbol.name.clone(),
                    previous: existing.decl.to_string(),
                    span: symbol.span,
                });
            }
        }
        scope.symbols.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    /// Look up a symbol, searching from current scope upward
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        let mut scope_id = Some(self.current);
        while let Some(id) = scope_id {
            if let Some(symbol) = self.scopes[id.0].symbols.get(name) {
                return Some(symbol);
            }
            scope_id = self.scopes[id.0].parent;
        }
        None
    }

    /// Look up a symbol only in the current scope
    pub fn lookup_local(&self, name: &str) -> Option<&Symbol> {
        self.scopes[self.current.0].symbols.get(name)
    }

    /// Number of scopes on the chain, the global scope included
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Label of the current scope
    pub fn current_label(&self) -> &str {
        &self.scopes[self.current.0].label
    }

    /// Whether the current scope is nested in a function body
    pub fn in_function(&self) -> bool {
        self.function_depth > 0
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

// ==================== Semantic Analyzer ====================

/// Semantic analyzer
pub struct SemanticAnalyzer {
    pub symbols: SymbolTable,
    errors: Vec<Error>,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        let mut analyzer = Self {
            symbols: SymbolTable::new(),
            errors: Vec::new(),
        };
        analyzer.register_natives();
        analyzer
    }

    /// Register native functions in the global scope
    fn register_natives(&mut self) {
        let registry = NativeRegistry::new();
        for native in registry.all() {
            let symbol = Symbol::new(
                native.name.clone(),
                SymbolKind::Function {
                    params: native.params.clone(),
                    ret: native.ret_type,
                },
                DeclKind::Global,
                TypeTag::Function,
                Span::dummy(), // Native, no source location
            );
            // Natives have distinct names, so this cannot collide
            let _ = self.symbols.define(symbol);
        }
    }

    /// Analyze a program, returning every semantic error in visit order
    ///
    /// An empty list means the program is accepted.
    pub fn analyze(&mut self, program: &Program) -> Vec<Error> {
        for stmt in &program.statements {
            self.visit_stmt(stmt);
        }
        debug!("semantic analysis finished with {} error(s)", self.errors.len());
        std::mem::take(&mut self.errors)
    }

    /// Look up a name from the current scope (the global scope once analysis is done)
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.symbols.lookup(name)
    }

    fn report(&mut self, err: Error) {
        trace!("{}", err);
        self.errors.push(err);
    }

    fn define(&mut self, symbol: Symbol) {
        if let Err(err) = self.symbols.define(symbol) {
            self.report(err);
        }
    }

    // ==================== Statements ====================

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::VarDecl { kind, name, initializer } => self.visit_var_decl(*kind, name, initializer.as_ref()),
            Stmt::FuncDecl { name, params, body } => self.visit_func_decl(name, params, body),
            Stmt::Return { value, span } => {
                if !self.symbols.in_function() {
                    self.report(Error::ReturnOutsideFunction { span: *span });
                }
                if let Some(value) = value {
                    self.visit_expr(value);
                }
            }
            Stmt::If { condition, then_branch, else_branch } => {
                self.visit_expr(condition);
                self.visit_scoped(then_branch, "if-then");
                if let Some(else_branch) = else_branch {
                    self.visit_scoped(else_branch, "if-else");
                }
            }
            Stmt::While { condition, body } => {
                self.visit_expr(condition);
                self.visit_scoped(body, "while-body");
            }
            Stmt::For { init, condition, increment, body } => {
                // The initializer lives in the loop's own scope
                self.symbols.enter_scope("for-loop", false);
                if let Some(init) = init {
                    self.visit_stmt(init);
                }
                if let Some(condition) = condition {
                    self.visit_expr(condition);
                }
                if let Some(increment) = increment {
                    self.visit_expr(increment);
                }
                self.visit_scoped(body, "for-body");
                self.symbols.exit_scope();
            }
            Stmt::Block(block) => {
                self.symbols.enter_scope("block", false);
                self.visit_block(block);
                self.symbols.exit_scope();
            }
            Stmt::Expr(expr) => self.visit_expr(expr),
        }
    }

    fn visit_block(&mut self, block: &Block) {
        for stmt in &block.statements {
            self.visit_stmt(stmt);
        }
    }

    /// Visit a branch or loop body in a fresh scope; a block body shares it
    fn visit_scoped(&mut self, stmt: &Stmt, label: &str) {
        self.symbols.enter_scope(label, false);
        match stmt {
            Stmt::Block(block) => self.visit_block(block),
            other => self.visit_stmt(other),
        }
        self.symbols.exit_scope();
    }

    fn visit_var_decl(&mut self, kind: VarKind, name: &Ident, initializer: Option<&Expr>) {
        if let Some(init) = initializer {
            self.visit_expr(init);
        }

        let ty = initializer.map_or(TypeTag::Unknown, |init| self.infer(init));
        self.define(Symbol::new(name.name.clone(), SymbolKind::Variable, kind.into(), ty, name.span));

        if kind == VarKind::Const && initializer.is_none() {
            self.report(Error::UninitializedConst {
                name: name.name.clone(),
                span: name.span,
            });
        }
    }

    fn visit_func_decl(&mut self, name: &Ident, params: &[Ident], body: &Block) {
        // Defined before the body is visited so recursion resolves
        self.define(Symbol::new(
            name.name.clone(),
            SymbolKind::Function {
                params: vec![TypeTag::Any; params.len()],
                ret: TypeTag::Any,
            },
            DeclKind::Var,
            TypeTag::Function,
            name.span,
        ));

        self.symbols.enter_scope(format!("function:{}", name.name), true);

        for param in params {
            if self.symbols.lookup_local(&param.name).is_some() {
                self.report(Error::DuplicateParameter {
                    name: param.name.clone(),
                    function: name.name.clone(),
                    span: param.span,
                });
                continue;
            }
            self.define(Symbol::new(
                param.name.clone(),
                SymbolKind::Variable,
                DeclKind::Let,
                TypeTag::Any,
                param.span,
            ));
        }

        self.visit_block(body);
        self.symbols.exit_scope();
    }

    // ==================== Expressions ====================

    fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident(ident) => {
                if self.symbols.lookup(&ident.name).is_none() {
                    self.report(Error::UndeclaredIdentifier {
                        name: ident.name.clone(),
                        span: ident.span,
                    });
                }
            }
            Expr::Literal(_) => {}
            Expr::Array(_) | Expr::Unary { .. } | Expr::Binary { .. } => {
                for child in expr.children() {
                    self.visit_node(child);
                }
            }
            Expr::Assign { target, value } => {
                self.visit_expr(value);
                match target.as_ref() {
                    Expr::Ident(ident) => {
                        let err = match self.symbols.lookup(&ident.name) {
                            None => Some(Error::AssignToUndeclared {
                                name: ident.name.clone(),
                                span: ident.span,
                            }),
                            Some(symbol) if !symbol.mutable => Some(Error::AssignToConst {
                                name: ident.name.clone(),
                                span: ident.span,
                            }),
                            Some(_) => None,
                        };
                        if let Some(err) = err {
                            self.report(err);
                        }
                    }
                    // Index targets are checked like any other index expression
                    other => self.visit_expr(other),
                }
            }
            Expr::Call { callee, args } => {
                match callee.as_ref() {
                    Expr::Ident(ident) => self.check_call(ident, args.len()),
                    other => self.visit_expr(other),
                }
                for arg in args {
                    self.visit_expr(arg);
                }
            }
            Expr::Index { collection, index } => {
                self.visit_expr(collection);
                self.visit_expr(index);

                if let Expr::Ident(ident) = collection.as_ref() {
                    let ty = self.symbols.lookup(&ident.name).map(|symbol| symbol.ty);
                    if let Some(ty) = ty.filter(|ty| !ty.is_indexable()) {
                        self.report(Error::NotIndexable {
                            name: ident.name.clone(),
                            ty: ty.to_string(),
                            span: ident.span,
                        });
                    }
                }
            }
        }
    }

    fn visit_node(&mut self, node: Node<'_>) {
        match node {
            Node::Stmt(stmt) => self.visit_stmt(stmt),
            Node::Expr(expr) => self.visit_expr(expr),
        }
    }

    /// Check a call through a plain name: declared, callable, arity
    fn check_call(&mut self, callee: &Ident, arg_count: usize) {
        let err = match self.symbols.lookup(&callee.name) {
            None => Error::UndeclaredFunction {
                name: callee.name.clone(),
                span: callee.span,
            },
            Some(Symbol { kind: SymbolKind::Function { params, .. }, .. }) => {
                if params.len() == arg_count {
                    return;
                }
                Error::ArgCountMismatch {
                    name: callee.name.clone(),
                    expected: params.len(),
                    got: arg_count,
                    span: callee.span,
                }
            }
            Some(_) => Error::NotCallable {
                name: callee.name.clone(),
                span: callee.span,
            },
        };
        self.report(err);
    }

    /// Type tag of a variable from the shape of its initializer
    fn infer(&self, init: &Expr) -> TypeTag {
        match init {
            // Booleans are numbers to the code generator
            Expr::Literal(Literal::Number(_) | Literal::Bool(_)) => TypeTag::Number,
            Expr::Literal(Literal::String(_)) => TypeTag::String,
            Expr::Array(_) => TypeTag::Array,
            Expr::Ident(ident) => self
                .symbols
                .lookup(&ident.name)
                .map_or(TypeTag::Unknown, |symbol| symbol.ty),
            _ => TypeTag::Unknown,
        }
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parser::parse;
    use pretty_assertions::assert_eq;

    fn analyze(source: &str) -> Vec<Error> {
        let (program, errors) = parse(source);
        assert!(errors.is_empty(), "unexpected syntax errors: {:?}", errors);
        SemanticAnalyzer::new().analyze(&program)
    }

    fn subjects(errors: &[Error]) -> Vec<&str> {
        errors.iter().filter_map(|e| e.subject()).collect()
    }

    #[test]
    fn test_valid_program() {
        let errors = analyze(
            "function factorial(n) {\n\
               if (n <= 1) { return 1; }\n\
               return n * factorial(n - 1);\n\
             }\n\
             const limit = 5;\n\
             var total = 0;\n\
             for (let i = 1; i <= limit; i = i + 1) {\n\
               let f = factorial(i);\n\
               if (i % 2 == 0) { total = total + f; } else { total = total - f; }\n\
             }\n\
             println(concat(\"total: \", input()));",
        );
        assert_eq!(errors, vec![]);
    }

    #[test]
    fn test_let_redeclaration() {
        let errors = analyze("let x = 1; let x = 2;");
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], Error::AlreadyDeclared { name, previous, .. } if name == "x" && previous == "let"));
    }

    #[test]
    fn test_var_redeclaration_rules() {
        assert_eq!(analyze("var x = 1; var x = 2;"), vec![]);
        assert_eq!(analyze("var x = 1; let x = 2;").len(), 1);
        assert_eq!(analyze("const x = 1; var x = 2;").len(), 1);
        assert_eq!(analyze("function f() { var a = 1; var a = 2; }").len(), 1);
        assert_eq!(analyze("{ var a = 1; var a = 2; }").len(), 1);
        // Shadowing in a nested scope is fine
        assert_eq!(analyze("let x = 1; { let x = 2; }"), vec![]);
    }

    #[test]
    fn test_const_protection() {
        let errors = analyze("const PI = 3.14; PI = 1;");
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], Error::AssignToConst { name, .. } if name == "PI"));

        let errors = analyze("const C;");
        assert!(matches!(errors[..], [Error::UninitializedConst { .. }]));
    }

    #[test]
    fn test_assignment_to_undeclared() {
        let errors = analyze("x = 10;");
        assert!(matches!(&errors[..], [Error::AssignToUndeclared { name, .. }] if name == "x"));
    }

    #[test]
    fn test_native_arity() {
        let errors = analyze("print(\"a\", \"b\");");
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            Error::ArgCountMismatch { name, expected: 1, got: 2, .. } if name == "print"
        ));
        assert_eq!(analyze("var l = [1]; push(l, 2); var v = pop(l); var n = length(l);"), vec![]);
    }

    #[test]
    fn test_user_function_arity() {
        let errors = analyze("function add(a, b) { return a + b; } add(1);");
        assert!(matches!(errors[..], [Error::ArgCountMismatch { expected: 2, got: 1, .. }]));
    }

    #[test]
    fn test_call_checks() {
        let errors = analyze("var numero = 100; numero(); missing(numero);");
        assert_eq!(errors.len(), 2);
        assert!(matches!(&errors[0], Error::NotCallable { name, .. } if name == "numero"));
        assert!(matches!(&errors[1], Error::UndeclaredFunction { name, .. } if name == "missing"));
    }

    #[test]
    fn test_indexability() {
        let errors = analyze("var n = 10; var y = n[0];");
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], Error::NotIndexable { name, ty, .. } if name == "n" && ty == "number"));

        assert_eq!(analyze("var a = [1, 2]; var y = a[0];"), vec![]);
        assert_eq!(analyze("var s = \"abc\"; var c = s[1];"), vec![]);
        assert_eq!(analyze("var u = input(); var c = u[1];"), vec![]);
        // Parameters are `any`
        let errors = analyze("function first(xs) { return xs[0]; }");
        assert!(matches!(&errors[..], [Error::NotIndexable { name, ty, .. }] if name == "xs" && ty == "any"));
        // Type flows through identifier initializers
        assert_eq!(analyze("var n = 1; var m = n; m[0];").len(), 1);
        let errors = analyze("var b = true; var y = b[0];");
        assert!(matches!(&errors[..], [Error::NotIndexable { name, ty, .. }] if name == "b" && ty == "number"));
        assert_eq!(analyze("var z = null; var y = z[0];"), vec![]);
        assert_eq!(analyze("var a = [1]; a[0] = 2;"), vec![]);
        assert_eq!(analyze("var n = 1; n[0] = 2;").len(), 1);
    }

    #[test]
    fn test_return_placement() {
        let errors = analyze("return 0;");
        assert!(matches!(errors[..], [Error::ReturnOutsideFunction { .. }]));

        assert_eq!(analyze("function f(x) { if (x) { while (x) { return 1; } } return 2; }"), vec![]);
        assert_eq!(analyze("function f() {} return;").len(), 1);
    }

    #[test]
    fn test_scope_isolation() {
        let errors = analyze("for (let i = 0; i < 3; i = i + 1) { } i;");
        assert_eq!(subjects(&errors), vec!["i"]);

        let errors = analyze("if (true) { let inner = 1; } else { var other = 2; } inner; other;");
        assert_eq!(subjects(&errors), vec!["inner", "other"]);

        let errors = analyze("while (false) { var w = 1; } w;");
        assert_eq!(subjects(&errors), vec!["w"]);

        let errors = analyze("function f(p) { var local = p; } p; local;");
        assert_eq!(subjects(&errors), vec!["p", "local"]);
    }

    #[test]
    fn test_duplicate_parameter() {
        let errors = analyze("function f(a, a) { return a; }");
        assert!(matches!(
            &errors[..],
            [Error::DuplicateParameter { name, function, .. }] if name == "a" && function == "f"
        ));
    }

    #[test]
    fn test_errors_do_not_stop_analysis() {
        let errors = analyze(
            "x = 10;\n\
             var a = 1;\n\
             var a = 2;\n\
             const PI = 3.14;\n\
             PI = 3.1415;\n\
             print(\"a\", \"b\");\n\
             var numero = 100;\n\
             numero();\n\
             var simples = 10;\n\
             var item = simples[0];\n\
             return 0;\n\
             function teste() {\n\
               if (true) { let bloco = \"x\"; }\n\
               print(bloco);\n\
             }",
        );
        let kinds: Vec<&str> = errors
            .iter()
            .map(|e| match e {
                Error::AssignToUndeclared { .. } => "undeclared-assign",
                Error::AssignToConst { .. } => "const",
                Error::ArgCountMismatch { .. } => "arity",
                Error::NotCallable { .. } => "not-callable",
                Error::NotIndexable { .. } => "not-indexable",
                Error::ReturnOutsideFunction { .. } => "return",
                Error::UndeclaredIdentifier { .. } => "undeclared",
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["undeclared-assign", "const", "arity", "not-callable", "not-indexable", "return", "undeclared"]
        );
    }

    #[test]
    fn test_inferred_types() {
        let (program, _) = parse("var n = 1; var s = \"x\"; var a = []; var c = a; var b = true; function f() {}");
        let mut analyzer = SemanticAnalyzer::new();
        assert_eq!(analyzer.analyze(&program), vec![]);

        let ty = |name: &str| analyzer.lookup(name).map(|s| s.ty);
        assert_eq!(ty("n"), Some(TypeTag::Number));
        assert_eq!(ty("s"), Some(TypeTag::String));
        assert_eq!(ty("a"), Some(TypeTag::Array));
        assert_eq!(ty("c"), Some(TypeTag::Array));
        assert_eq!(ty("b"), Some(TypeTag::Number));
        assert_eq!(ty("f"), Some(TypeTag::Function));
        assert_eq!(ty("print"), Some(TypeTag::Function));
    }

    #[test]
    fn test_mutability_follows_declaration() {
        let (program, _) = parse("var v = 1; let l = 2; const c = 3;");
        let mut analyzer = SemanticAnalyzer::new();
        analyzer.analyze(&program);

        for (name, mutable) in [("v", true), ("l", true), ("c", false), ("print", true)] {
            let symbol = analyzer.lookup(name).expect("symbol");
            assert_eq!(symbol.mutable, mutable, "{}", name);
            assert_eq!(symbol.mutable, symbol.decl != DeclKind::Const);
        }
    }

    #[test]
    fn test_symbol_table_scopes() {
        let mut table = SymbolTable::new();
        assert_eq!(table.depth(), 1);
        assert_eq!(table.current_label(), "global");

        let x = Symbol::new("x", SymbolKind::Variable, DeclKind::Let, TypeTag::Number, Span::dummy());
        table.define(x.clone()).unwrap();

        table.enter_scope("function:f", true);
        table.enter_scope("block", false);
        assert_eq!(table.depth(), 3);
        assert!(table.in_function());
        assert_eq!(table.lookup("x"), Some(&x));
        assert_eq!(table.lookup_local("x"), None);

        table.exit_scope();
        table.exit_scope();
        assert!(!table.in_function());
        assert_eq!(table.depth(), 1);

        // Exiting the global scope is a no-op
        table.exit_scope();
        assert_eq!(table.depth(), 1);
        assert!(table.define(x).is_err());
    }
}
