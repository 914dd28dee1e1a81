//! Unit tests for the parser module.
//!
//! This module contains tests for parsing various language constructs including:
//! - Variable declarations and destructuring
//! - Function declarations and expressions
//! - Operator precedence and associativity
//! - Template strings
//! - Class declarations and member tables
//! - Control flow statements
//! - Statement terminators and error reporting

use std::rc::Rc;

use crate::{
    ast::{
        ast::{Program, Stmt},
        expressions::{Access, BinaryOperator, Expr, ExprKind, NumberLiteral, TemplatePart},
        statements::{ClassMember, ForeachValue, FunctionBody},
    },
    errors::errors::{Error, ErrorKind},
    lexer::lexer::tokenize,
};

use super::parser::{parse, ParseOptions};

fn parse_source(source: &str) -> Result<Program, Error> {
    parse_with(source, ParseOptions::default())
}

fn parse_with(source: &str, options: ParseOptions) -> Result<Program, Error> {
    let tokens = tokenize(source.to_string(), Some("test.src".to_string()))?;
    parse(tokens, Rc::new("test.src".to_string()), options)
}

/// The expression of the first statement, or its initializer for a `var`.
fn first_expr(program: &Program) -> &Expr {
    match &program.body[0] {
        Stmt::Expression(stmt) => &stmt.expression,
        Stmt::Var(var) => var.initializer.as_ref().unwrap(),
        other => panic!("expected an expression, got {:?}", other),
    }
}

fn binary(expr: &Expr) -> (&Expr, BinaryOperator, &Expr) {
    match &expr.kind {
        ExprKind::Binary(binary) => (&binary.left, binary.operator, &binary.right),
        other => panic!("expected a binary expression, got {:?}", other),
    }
}

fn identifier_name(expr: &Expr) -> &str {
    &expr.as_identifier().unwrap().name
}

#[test]
fn test_parse_variable_declaration() {
    let program = parse_source("var x = 42;").unwrap();

    match &program.body[0] {
        Stmt::Var(var) => {
            assert_eq!(var.name, "x");
            assert!(var.annotation.is_none());
            assert!(matches!(var.initializer.as_ref().unwrap().kind, ExprKind::Number(_)));
        }
        other => panic!("expected var, got {:?}", other),
    }
}

#[test]
fn test_parse_empty_program() {
    let program = parse_source("").unwrap();
    assert!(program.body.is_empty());

    let program = parse_source(";;var a;;").unwrap();
    assert_eq!(program.body.len(), 1);
}

#[test]
fn test_multiplicative_binds_tighter_than_additive() {
    let program = parse_source("1 + 2 * 3").unwrap();
    let (left, operator, right) = binary(first_expr(&program));

    assert_eq!(operator, BinaryOperator::Add);
    assert!(matches!(left.kind, ExprKind::Number(_)));
    assert_eq!(binary(right).1, BinaryOperator::Multiply);
}

#[test]
fn test_binary_operators_group_left() {
    let program = parse_source("a - b - c").unwrap();
    let (left, operator, right) = binary(first_expr(&program));

    assert_eq!(operator, BinaryOperator::Subtract);
    assert_eq!(identifier_name(right), "c");
    assert_eq!(binary(left).1, BinaryOperator::Subtract);
}

#[test]
fn test_exponent_and_coalesce_group_right() {
    let program = parse_source("a ** b ** c").unwrap();
    let (left, operator, right) = binary(first_expr(&program));
    assert_eq!(operator, BinaryOperator::Power);
    assert_eq!(identifier_name(left), "a");
    assert_eq!(binary(right).1, BinaryOperator::Power);

    let program = parse_source("a ?? b ?? c").unwrap();
    let (left, operator, right) = binary(first_expr(&program));
    assert_eq!(operator, BinaryOperator::Coalesce);
    assert_eq!(identifier_name(left), "a");
    assert_eq!(binary(right).1, BinaryOperator::Coalesce);
}

#[test]
fn test_assignment_groups_right() {
    let program = parse_source("a = b = c").unwrap();

    match &first_expr(&program).kind {
        ExprKind::Assign(assign) => {
            assert_eq!(identifier_name(&assign.target), "a");
            assert!(matches!(assign.value.kind, ExprKind::Assign(_)));
        }
        other => panic!("expected assignment, got {:?}", other),
    }
}

#[test]
fn test_invalid_assignment_target() {
    let error = parse_source("1 = 2").unwrap_err();
    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
}

#[test]
fn test_ternary_is_looser_than_coalesce() {
    let program = parse_source("a ? b : c ?? d").unwrap();

    match &first_expr(&program).kind {
        ExprKind::Ternary(ternary) => {
            assert_eq!(identifier_name(&ternary.condition), "a");
            assert_eq!(binary(&ternary.else_branch).1, BinaryOperator::Coalesce);
        }
        other => panic!("expected ternary, got {:?}", other),
    }
}

#[test]
fn test_logical_and_comparison_precedence() {
    let program = parse_source("!a && b < c || d instanceof E").unwrap();
    let (left, operator, right) = binary(first_expr(&program));

    assert_eq!(operator, BinaryOperator::Or);
    assert_eq!(binary(right).1, BinaryOperator::Instanceof);

    let (not_a, and, comparison) = binary(left);
    assert_eq!(and, BinaryOperator::And);
    assert!(matches!(not_a.kind, ExprKind::Unary(_)));
    assert_eq!(binary(comparison).1, BinaryOperator::Less);
}

#[test]
fn test_concat_is_looser_than_additive() {
    let program = parse_source(r#""n: " +. a + 1"#).unwrap();
    let (left, operator, right) = binary(first_expr(&program));

    assert_eq!(operator, BinaryOperator::Concat);
    assert!(matches!(left.kind, ExprKind::String(_)));
    assert_eq!(binary(right).1, BinaryOperator::Add);
}

#[test]
fn test_pipeline_groups_left() {
    let program = parse_source("a | f | g").unwrap();

    match &first_expr(&program).kind {
        ExprKind::Pipeline(outer) => {
            assert_eq!(identifier_name(&outer.function), "g");
            match &outer.value.kind {
                ExprKind::Pipeline(inner) => {
                    assert_eq!(identifier_name(&inner.value), "a");
                    assert_eq!(identifier_name(&inner.function), "f");
                }
                other => panic!("expected pipeline, got {:?}", other),
            }
        }
        other => panic!("expected pipeline, got {:?}", other),
    }
}

#[test]
fn test_member_access_chain() {
    let program = parse_source("a.b?.c::d[0](1, 2)").unwrap();

    let call = match &first_expr(&program).kind {
        ExprKind::Call(call) => call,
        other => panic!("expected call, got {:?}", other),
    };
    assert_eq!(call.arguments.len(), 2);

    let access = match &call.callee.kind {
        ExprKind::ArrayAccess(access) => access,
        other => panic!("expected array access, got {:?}", other),
    };
    assert!(access.index.is_some());

    let accesses: Vec<(String, Access)> = {
        let mut accesses = vec![];
        let mut current = &*access.target;
        while let ExprKind::Get(get) = &current.kind {
            accesses.push((get.name.clone(), get.access));
            current = &get.object;
        }
        accesses
    };

    assert_eq!(
        accesses,
        vec![
            ("d".to_string(), Access::Static),
            ("c".to_string(), Access::Optional),
            ("b".to_string(), Access::Dot),
        ]
    );
}

#[test]
fn test_array_append_target() {
    let program = parse_source("a[] = 1").unwrap();

    match &first_expr(&program).kind {
        ExprKind::Assign(assign) => match &assign.target.kind {
            ExprKind::ArrayAccess(access) => assert!(access.index.is_none()),
            other => panic!("expected array access, got {:?}", other),
        },
        other => panic!("expected assignment, got {:?}", other),
    }
}

#[test]
fn test_postfix_requires_identifier() {
    assert!(parse_source("i++").is_ok());

    let error = parse_source("a.b++").unwrap_err();
    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
}

#[test]
fn test_postfix_does_not_cross_lines() {
    let program = parse_source("a\n++b").unwrap();

    assert_eq!(program.body.len(), 2);
    assert!(matches!(program.body[1].as_expression().unwrap().kind, ExprKind::Unary(_)));
}

#[test]
fn test_new_with_arguments_and_member() {
    let program = parse_source("new A(1, 2).b").unwrap();

    match &first_expr(&program).kind {
        ExprKind::Get(get) => match &get.object.kind {
            ExprKind::New(new) => {
                assert_eq!(identifier_name(&new.class), "A");
                assert_eq!(new.arguments.len(), 2);
            }
            other => panic!("expected new, got {:?}", other),
        },
        other => panic!("expected get, got {:?}", other),
    }

    let program = parse_source("var c = new A").unwrap();
    assert!(matches!(first_expr(&program).kind, ExprKind::New(_)));
}

#[test]
fn test_array_literal_with_keys() {
    let program = parse_source(r#"["a" => 1, 2, ]"#).unwrap();

    match &first_expr(&program).kind {
        ExprKind::Array(elements) => {
            assert_eq!(elements.len(), 2);
            assert!(elements[0].key.is_some());
            assert!(elements[1].key.is_none());
        }
        other => panic!("expected array, got {:?}", other),
    }
}

#[test]
fn test_match_expression() {
    let program = parse_source(r#"match (x) { 1, 2 => "low", 3 => "mid", default => "high" }"#).unwrap();

    match &first_expr(&program).kind {
        ExprKind::Match(match_expr) => {
            assert_eq!(match_expr.arms.len(), 2);
            assert_eq!(match_expr.arms[0].patterns.len(), 2);
            assert!(match_expr.default.is_some());
        }
        other => panic!("expected match, got {:?}", other),
    }

    let error = parse_source("match (x) { default => 1, default => 2 }").unwrap_err();
    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
}

#[test]
fn test_template_string_parts() {
    let program = parse_source(r#""hello $name and ${a + 1}!""#).unwrap();

    let parts = match &first_expr(&program).kind {
        ExprKind::Template(parts) => parts,
        other => panic!("expected template, got {:?}", other),
    };

    assert_eq!(parts.len(), 5);
    assert!(matches!(&parts[0], TemplatePart::Literal(text) if text == "hello "));
    assert!(matches!(&parts[1], TemplatePart::Expression(expr) if identifier_name(expr) == "name"));
    assert!(matches!(&parts[2], TemplatePart::Literal(text) if text == " and "));
    assert!(matches!(&parts[3], TemplatePart::Expression(expr) if matches!(expr.kind, ExprKind::Binary(_))));
    assert!(matches!(&parts[4], TemplatePart::Literal(text) if text == "!"));
}

#[test]
fn test_nested_template_strings() {
    let program = parse_source(r#""x ${f("y $z")}""#).unwrap();

    let parts = match &first_expr(&program).kind {
        ExprKind::Template(parts) => parts,
        other => panic!("expected template, got {:?}", other),
    };

    let call = match &parts[1] {
        TemplatePart::Expression(Expr { kind: ExprKind::Call(call), .. }) => call,
        other => panic!("expected call, got {:?}", other),
    };
    assert!(matches!(call.arguments[0].kind, ExprKind::Template(_)));

    // Parsing continues after the template.
    let program = parse_source("var a = \"${b}\"\nvar c = 1").unwrap();
    assert_eq!(program.body.len(), 2);
}

#[test]
fn test_template_fragment_error_reports_line() {
    let error = parse_source("var a = 1\nvar b = \"x ${1 +}\"").unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Parse);
    assert_eq!(error.line(), 2);
}

#[test]
fn test_function_declaration_is_hoisted() {
    let program = parse_source("a()\nfun a(x: int, y = 2): string => \"s\"").unwrap();

    match &program.body[1] {
        Stmt::Function(function) => {
            assert_eq!(function.name, "a");
            assert_eq!(function.params.len(), 2);
            assert!(function.params[1].default.is_some());
            assert!(function.return_type.is_some());
            assert!(matches!(function.body, FunctionBody::Expression(_)));
            assert_eq!(program.environment.hoisted.lookup("a"), Some(function.id));
        }
        other => panic!("expected function, got {:?}", other),
    }
}

#[test]
fn test_function_expression_statement() {
    let program = parse_source("fun (x) { return x }").unwrap();
    assert!(matches!(first_expr(&program).kind, ExprKind::Function(_)));

    let program = parse_source("var f = fun (x: int): int => x * 2").unwrap();
    assert!(matches!(first_expr(&program).kind, ExprKind::Function(_)));
}

#[test]
fn test_duplicate_hoisted_declaration() {
    let error = parse_source("fun a() {}\nclass a {}").unwrap_err();

    assert_eq!(error.get_error_name(), "DuplicateDeclaration");
    assert_eq!(error.line(), 2);
}

#[test]
fn test_environment_can_be_omitted() {
    let program = parse_with("fun a() {}", ParseOptions { build_environment: false }).unwrap();
    assert!(program.environment.hoisted.is_empty());

    let program = parse_with("fun a() {}", ParseOptions::default()).unwrap();
    assert!(program.environment.hoisted.contains("a"));
}

#[test]
fn test_parse_class_declaration() {
    let source = r#"
abstract class B(private var x: int, y) extends A(y) implements I, J iterates items {
    private val items: array<int> = []
    public static fun size(): int => 1
    abstract fun f()
    const K = 1
    init { echo x }
}
"#;
    let program = parse_source(source).unwrap();

    let class = match &program.body[0] {
        Stmt::Class(class) => class,
        other => panic!("expected class, got {:?}", other),
    };

    assert!(class.is_abstract);
    assert_eq!(class.params.len(), 2);
    assert!(class.params[0].promotion.is_some());
    assert!(class.params[1].promotion.is_none());
    assert_eq!(class.superclass.as_ref().unwrap().arguments.len(), 1);
    assert_eq!(class.interfaces, vec!["I".to_string(), "J".to_string()]);
    assert!(class.iterates.is_some());
    assert_eq!(class.members.len(), 5);
    assert!(matches!(class.members[4], ClassMember::Initializer(_)));

    for name in ["x", "items", "size", "f", "K"] {
        assert!(class.table.contains(name), "missing member {}", name);
    }
    assert!(!class.table.contains("y"));
    assert_eq!(class.table.len(), 5);
}

#[test]
fn test_duplicate_class_member() {
    let error = parse_source("class A { var a\n fun a() {} }").unwrap_err();

    assert_eq!(error.get_error_name(), "DuplicateDeclaration");
    assert_eq!(error.line(), 2);
}

#[test]
fn test_promotion_outside_class_is_rejected() {
    let error = parse_source("fun a(var x) {}").unwrap_err();
    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
}

#[test]
fn test_try_statements() {
    let program = parse_source("try { a() } catch (e: A|B) { } catch (f: C) { } finally { }").unwrap();

    match &program.body[0] {
        Stmt::Try(stmt) => {
            assert_eq!(stmt.catches.len(), 2);
            assert_eq!(stmt.catches[0].types.len(), 2);
            assert!(stmt.finally.is_some());
        }
        other => panic!("expected try, got {:?}", other),
    }
}

#[test]
fn test_try_construction_errors() {
    let error = parse_source("try { }").unwrap_err();
    assert_eq!(error.get_error_name(), "InvalidConstruction");
    assert_eq!(error.kind(), ErrorKind::Construction);

    let error = parse_source("try { } catch (e) { }").unwrap_err();
    assert_eq!(error.get_error_name(), "InvalidConstruction");
}

#[test]
fn test_control_flow_statements() {
    let source = r#"
if (a) { b() } else if (c) d()
while (x < 10) x++
for (var i = 0; i < 10; i++) echo i, "\n"
for (;;) { }
foreach (items as key => [a, "k" => b]) { }
foreach (items as item) echo item
fun f() { return }
"#;
    let program = parse_source(source).unwrap();
    assert_eq!(program.body.len(), 7);

    match &program.body[0] {
        Stmt::If(stmt) => assert!(matches!(stmt.else_branch.as_deref(), Some(Stmt::If(_)))),
        other => panic!("expected if, got {:?}", other),
    }
    assert!(matches!(program.body[1], Stmt::While(_)));
    assert!(matches!(program.body[6], Stmt::Function(_)));

    match &program.body[4] {
        Stmt::Foreach(stmt) => {
            assert_eq!(stmt.key.as_ref().unwrap().name, "key");
            match &stmt.value {
                ForeachValue::Destructuring(destructuring) => {
                    assert_eq!(destructuring.elements.len(), 2);
                    assert!(destructuring.elements[1].key.is_some());
                }
                other => panic!("expected destructuring, got {:?}", other),
            }
        }
        other => panic!("expected foreach, got {:?}", other),
    }

    match &program.body[2] {
        Stmt::For(stmt) => {
            assert!(matches!(stmt.initializer.as_deref(), Some(Stmt::Var(_))));
            assert!(stmt.condition.is_some());
            assert!(stmt.step.is_some());
        }
        other => panic!("expected for, got {:?}", other),
    }

    let source = "var a = 1\nif (a) a else a\nfun g(x) { if (x) return 1 else return 2 }\nfun h(x) { if (x) return else echo x }";
    let program = parse_source(source).unwrap();
    assert_eq!(program.body.len(), 4);

    match &program.body[1] {
        Stmt::If(stmt) => assert!(matches!(stmt.else_branch.as_deref(), Some(Stmt::Expression(_)))),
        other => panic!("expected if, got {:?}", other),
    }

    for (index, returns_value) in [(2, true), (3, false)] {
        let body = match &program.body[index] {
            Stmt::Function(function) => match &function.body {
                FunctionBody::Block(block) => &block.body,
                other => panic!("expected block body, got {:?}", other),
            },
            other => panic!("expected function, got {:?}", other),
        };

        match &body[0] {
            Stmt::If(stmt) => {
                match stmt.then_branch.as_ref() {
                    Stmt::Return(ret) => assert_eq!(ret.value.is_some(), returns_value),
                    other => panic!("expected return, got {:?}", other),
                }
                assert!(stmt.else_branch.is_some());
            }
            other => panic!("expected if, got {:?}", other),
        }
    }
}

#[test]
fn test_var_destructuring() {
    let program = parse_source(r#"var [a, "k" => b] = x"#).unwrap();

    match &program.body[0] {
        Stmt::VarDestructuring(var) => {
            let names: Vec<&str> = var.destructuring.elements.iter().map(|e| e.name.as_str()).collect();
            assert_eq!(names, vec!["a", "b"]);
        }
        other => panic!("expected destructuring, got {:?}", other),
    }
}

#[test]
fn test_type_annotations() {
    let program = parse_source("var a: ?int|string&Foo<int> = null\nvar f: fun(int, string): bool\nvar l: array<\"a\"|1>").unwrap();

    let annotations: Vec<String> = program
        .body
        .iter()
        .map(|stmt| match stmt {
            Stmt::Var(var) => var.annotation.as_ref().unwrap().to_string(),
            other => panic!("expected var, got {:?}", other),
        })
        .collect();

    assert_eq!(
        annotations,
        vec![
            "?int|(string&Foo<int>)".to_string(),
            "fun(int, string): bool".to_string(),
            "array<\"a\"|1>".to_string(),
        ]
    );
}

#[test]
fn test_statements_end_at_line_breaks() {
    let program = parse_source("var a = 1\nvar b = 2\n").unwrap();
    assert_eq!(program.body.len(), 2);

    let error = parse_source("var a = 1 var b = 2").unwrap_err();
    assert_eq!(error.get_error_name(), "UnexpectedToken");
    assert_eq!(error.line(), 1);
}

#[test]
fn test_parse_error_reports_line() {
    let error = parse_source("var a = 1;\n\nvar = 2;").unwrap_err();

    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
    assert_eq!(error.kind(), ErrorKind::Parse);
    assert_eq!(error.line(), 3);
}

#[test]
fn test_unclosed_block() {
    let error = parse_source("fun a() {\n var b = 1\n").unwrap_err();
    assert_eq!(error.line(), 3);
}

#[test]
fn test_oversized_integer_becomes_float() {
    let program = parse_source("var a = 99999999999999999999\nvar b = 9223372036854775807").unwrap();

    let literal = |index: usize| match &program.body[index] {
        Stmt::Var(var) => match &var.initializer.as_ref().unwrap().kind {
            ExprKind::Number(literal) => literal.clone(),
            other => panic!("expected number, got {:?}", other),
        },
        other => panic!("expected var, got {:?}", other),
    };

    assert_eq!(literal(0), NumberLiteral::Float("99999999999999999999".to_string()));
    assert_eq!(literal(1), NumberLiteral::Int("9223372036854775807".to_string()));
}

#[test]
fn test_node_ids_are_unique() {
    let program = parse_source("var a = b + c\nfun d(e) => e").unwrap();

    let mut ids = vec![program.id];
    if let Stmt::Var(var) = &program.body[0] {
        ids.push(var.id);
        let (left, _, right) = binary(var.initializer.as_ref().unwrap());
        ids.extend([var.initializer.as_ref().unwrap().id, left.id, right.id]);
    }
    if let Stmt::Function(function) = &program.body[1] {
        ids.push(function.id);
        ids.push(function.params[0].id);
    }

    let count = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), count);
    assert!(ids.iter().all(|id| *id < program.next_id));
}
