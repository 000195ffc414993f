//! End-to-end Pipeline Tests
//!
//! Drives source text through `check_source` and the individual stages,
//! asserting on structured diagnostics rather than message text.

use pretty_assertions::assert_eq;

use tinyjs::check_source;
use tinyjs::frontend::ast::{BinOp, Expr, Literal, Program, Stmt};
use tinyjs::frontend::lexer::Lexer;
use tinyjs::frontend::parser::parse;
use tinyjs::frontend::token::TokenKind;
use tinyjs::utils::{Category, Error};

fn semantic_errors(source: &str) -> Vec<Error> {
    match check_source(source) {
        Ok(_) => Vec::new(),
        Err(errors) => {
            assert!(
                errors.iter().all(|e| e.category() == Category::Semantic),
                "expected only semantic errors, got {:?}",
                errors
            );
            errors
        }
    }
}

fn first_expr(program: &Program) -> &Expr {
    match &program.statements[0] {
        Stmt::Expr(expr) => expr,
        other => panic!("expected expression statement, got {:?}", other),
    }
}

fn number(expr: &Expr) -> f64 {
    match expr {
        Expr::Literal(Literal::Number(n)) => *n,
        other => panic!("expected number, got {:?}", other),
    }
}

/// Test: the lexer keeps returning EOF after the end of input
#[test]
fn test_eof_is_idempotent() {
    for source in ["", "let x = 1;", "\"open", "// only a comment"] {
        let mut lexer = Lexer::new(source);
        while lexer.next_token().kind != TokenKind::Eof {}
        for _ in 0..3 {
            assert_eq!(lexer.next_token().kind, TokenKind::Eof, "source {:?}", source);
        }
    }
}

/// Test: multiplication binds tighter than addition
#[test]
fn test_precedence_shape() {
    let program = check_source("1 + 2 * 3;").expect("valid program");
    match first_expr(&program) {
        Expr::Binary { left, op: BinOp::Add, right } => {
            assert_eq!(number(left), 1.0);
            match right.as_ref() {
                Expr::Binary { left, op: BinOp::Mul, right } => {
                    assert_eq!(number(left), 2.0);
                    assert_eq!(number(right), 3.0);
                }
                other => panic!("expected multiplication, got {:?}", other),
            }
        }
        other => panic!("expected addition at the root, got {:?}", other),
    }

    // Parentheses override
    let program = check_source("(1 + 2) * 3;").expect("valid program");
    assert!(matches!(first_expr(&program), Expr::Binary { op: BinOp::Mul, .. }));
}

/// Test: `a = b = 1` nests to the right
#[test]
fn test_assignment_right_associative() {
    let program = check_source("var a; var b; a = b = 1;").expect("valid program");
    match &program.statements[2] {
        Stmt::Expr(Expr::Assign { target, value }) => {
            assert!(matches!(target.as_ref(), Expr::Ident(id) if id.name == "a"));
            match value.as_ref() {
                Expr::Assign { target, value } => {
                    assert!(matches!(target.as_ref(), Expr::Ident(id) if id.name == "b"));
                    assert_eq!(number(value), 1.0);
                }
                other => panic!("expected nested assignment, got {:?}", other),
            }
        }
        other => panic!("expected assignment, got {:?}", other),
    }
}

/// Test: names declared in loops and branches do not leak
#[test]
fn test_scope_isolation() {
    for source in [
        "for (let i = 0; i < 3; i = i + 1) { } print(i);",
        "for (var i = 0; i < 3; i = i + 1) { } print(i);",
        "if (true) { let t = 1; } print(t);",
        "if (false) { } else { var t = 1; } print(t);",
        "while (false) { let t = 1; } print(t);",
    ] {
        let errors = semantic_errors(source);
        assert_eq!(errors.len(), 1, "source {:?}: {:?}", source, errors);
        assert!(matches!(errors[0], Error::UndeclaredIdentifier { .. }));
    }
}

/// Test: redeclaration legality depends on declaration kind
#[test]
fn test_redeclaration() {
    let errors = semantic_errors("let x = 1; let x = 2;");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].subject(), Some("x"));

    assert_eq!(semantic_errors("var x = 1; var x = 2;"), vec![]);
}

/// Test: constants cannot be reassigned
#[test]
fn test_const_protection() {
    let errors = semantic_errors("const PI = 3.14; PI = 1;");
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], Error::AssignToConst { .. }));
    assert!(errors[0].to_string().contains("Cannot reassign constant"));
}

/// Test: native calls go through the arity check
#[test]
fn test_native_arity() {
    let errors = semantic_errors("print(\"a\", \"b\");");
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], Error::ArgCountMismatch { expected: 1, got: 2, .. }));
}

/// Test: only array, string and unknown symbols are indexable
#[test]
fn test_indexability() {
    assert_eq!(semantic_errors("var n = 10; var y = n[0];").len(), 1);
    assert_eq!(semantic_errors("var a = [1, 2]; var y = a[0];"), vec![]);
}

/// Test: parameters and booleans are not indexable
#[test]
fn test_indexing_parameters_and_booleans() {
    let errors = semantic_errors("function first(xs) { return xs[0]; }");
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], Error::NotIndexable { name, .. } if name == "xs"));

    let errors = semantic_errors("var b = true; var y = b[0];");
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], Error::NotIndexable { name, ty, .. } if name == "b" && ty == "number"));
}

/// Test: lexical and syntax errors come back in source order
#[test]
fn test_diagnostics_in_source_order() {
    let errors = check_source("var = @;").expect_err("errors");
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].category(), Category::Syntax);
    assert_eq!(errors[1].category(), Category::Lexical);
    assert!(errors[0].span().start < errors[1].span().start);
}

/// Test: a syntax error keeps later statements parsing and skips semantic analysis
#[test]
fn test_syntax_error_isolation() {
    // `undeclared = 1` would be a semantic error if analysis ran
    let source = "let = 5;\nlet ok = 1;\nundeclared = 1;\nprint(ok);";

    let (program, errors) = parse(source);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].category(), Category::Syntax);
    assert_eq!(program.statements.len(), 3);

    let errors = check_source(source).expect_err("syntax error");
    assert_eq!(errors.len(), 1);
    assert!(errors.iter().all(|e| e.category() == Category::Syntax));
}

/// Test: several independent syntax errors are all reported
#[test]
fn test_multiple_syntax_errors() {
    let errors = check_source("let = 1;\nvar ok = 2;\nconst = 3;\nif x) { }\nprint(ok);").expect_err("syntax errors");
    assert_eq!(errors.len(), 3, "{:?}", errors);
}

/// Test: `return` is only legal inside a function body
#[test]
fn test_return_placement() {
    let errors = semantic_errors("return 1;");
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], Error::ReturnOutsideFunction { .. }));

    assert_eq!(semantic_errors("function f(x) { { if (x) { return x; } } return 0; }"), vec![]);
}

/// Test: a realistic program is accepted
#[test]
fn test_accepts_program() {
    let source = r#"
        const values = [1, 2, 3, 4,];

        // sum the even numbers of the list
        function sumEven(count) -> number {
            let total = 0;
            for (let i = 0; i < count; i = i + 1) {
                if (values[i] % 2 === 0 && !(values[i] < 0)) {
                    total = total + values[i];
                }
            }
            return total;
        }

        var result = sumEven(length(values));
        push(values, result);
        println(concat("done", ""));
    "#;
    let program = check_source(source).expect("valid program");
    assert_eq!(program.statements.len(), 5);
}
