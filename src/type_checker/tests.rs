//! Unit tests for the type checker.
//!
//! Programs are scanned, parsed and resolved, then checked; the tests read
//! back node types from the resulting table.

use std::rc::Rc;

use crate::{
    ast::{
        ast::{NodeId, Program, Stmt},
        expressions::Expr,
        statements::{ClassMember, ForeachValue},
        types::Type,
    },
    errors::errors::{Error, ErrorImpl, ErrorKind},
    lexer::lexer::tokenize,
    parser::parser::{parse, ParseOptions},
    symbols::resolver::{resolve, ResolveOptions},
};

use super::type_checker::{type_check, TypeTable};

fn check_with(source: &str, options: ResolveOptions) -> Result<(Program, TypeTable), Error> {
    let tokens = tokenize(source.to_string(), Some("test.src".to_string()))?;
    let program = parse(tokens, Rc::new("test.src".to_string()), ParseOptions::default())?;
    let resolution = resolve(&program, options)?;
    let types = type_check(&program, &resolution)?;
    Ok((program, types))
}

fn check(source: &str) -> Result<(Program, TypeTable), Error> {
    check_with(source, ResolveOptions::default())
}

fn type_of(types: &TypeTable, id: NodeId) -> Type {
    types.get(id).cloned().unwrap_or_else(|| panic!("no type for {:?}", id))
}

fn expression(stmt: &Stmt) -> &Expr {
    stmt.as_expression().unwrap()
}

fn declaration_id(stmt: &Stmt) -> NodeId {
    match stmt {
        Stmt::Var(var) => var.id,
        Stmt::Function(function) => function.id,
        Stmt::Class(class) => class.id,
        other => panic!("expected declaration, got {:?}", other),
    }
}

fn assert_mismatch(error: &Error, expected: Type, received: Type) {
    match error.get_impl() {
        ErrorImpl::TypeMismatch { expected: e, received: r } => {
            assert_eq!(e, &expected, "expected type");
            assert_eq!(r, &received, "received type");
        }
        other => panic!("expected TypeMismatch, got {:?}", other),
    }
}

#[test]
fn test_property_assignment_mismatch() {
    let error = check("class A { var b = 1 }; var c = new A; c.b = \"\"").unwrap_err();

    assert_eq!(error.kind(), ErrorKind::TypeCheck);
    assert_mismatch(&error, Type::Int, Type::String);
}

#[test]
fn test_expression_function_inference() {
    let (program, types) = check("fun a() => null; a()").unwrap();

    assert_eq!(type_of(&types, declaration_id(&program.body[0])), Type::function(vec![], Type::Null));
    assert_eq!(type_of(&types, expression(&program.body[1]).id), Type::Null);
    assert_eq!(type_of(&types, program.id), Type::Void);
}

#[test]
fn test_call_before_declaration() {
    let (program, types) = check("a()\nfun a() => null").unwrap();

    assert_eq!(type_of(&types, expression(&program.body[0]).id), Type::Null);
    assert_eq!(type_of(&types, declaration_id(&program.body[1])), Type::function(vec![], Type::Null));
}

#[test]
fn test_array_access_yields_element_type() {
    let (program, types) = check("var a = [1,2]; a[0]").unwrap();

    assert_eq!(type_of(&types, declaration_id(&program.body[0])), Type::array(Type::Int));
    assert_eq!(type_of(&types, expression(&program.body[1]).id), Type::Int);
}

#[test]
fn test_annotation_must_contain_initializer() {
    let error = check("var a: string = null").unwrap_err();
    assert_mismatch(&error, Type::String, Type::Null);

    let (program, types) = check("var a: string = \"\" +. \"\"").unwrap();
    assert_eq!(type_of(&types, declaration_id(&program.body[0])), Type::String);

    assert!(check("var a: ?string = null").is_ok());
    assert!(check("var a: int|string = 1").is_ok());
}

#[test]
fn test_unconstrained_and_empty_array_declarations() {
    let (program, types) = check("var a\nvar b = []\nb[] = 1").unwrap();

    assert_eq!(type_of(&types, declaration_id(&program.body[0])), Type::Any);
    assert_eq!(type_of(&types, declaration_id(&program.body[1])), Type::array(Type::Any));
}

#[test]
fn test_block_function_return_inference() {
    let error = check("fun a() { echo 1 }").unwrap_err();
    match error.get_impl() {
        ErrorImpl::CannotInferReturnType { function } => assert_eq!(function, "a"),
        other => panic!("expected CannotInferReturnType, got {:?}", other),
    }

    let error = check("fun a() {\n return 1\n}").unwrap_err();
    assert_eq!(error.get_error_name(), "CannotInferReturnType");
    assert_eq!(error.line(), 1);

    let error = check("class A {\n fun f() { return }\n}").unwrap_err();
    assert_eq!(error.get_error_name(), "CannotInferReturnType");
    assert_eq!(error.line(), 2);

    let error = check("var f = fun() { echo 1 }").unwrap_err();
    assert_eq!(error.get_error_name(), "CannotInferReturnType");

    let (program, types) = check("fun a(): void { echo 1 }\nclass B { init { return } }").unwrap();
    assert_eq!(type_of(&types, declaration_id(&program.body[0])), Type::function(vec![], Type::Void));
}

#[test]
fn test_declared_return_type() {
    let (program, types) = check("fun a(x: int): int { return x }").unwrap();
    assert_eq!(
        type_of(&types, declaration_id(&program.body[0])),
        Type::function(vec![Type::Int], Type::Int)
    );

    let error = check("fun a(): int {\n return \"a\"\n}").unwrap_err();
    assert_mismatch(&error, Type::Int, Type::String);
    assert_eq!(error.line(), 2);

    let error = check("fun a(): int => \"a\"").unwrap_err();
    assert_mismatch(&error, Type::Int, Type::String);

    let error = check("fun a(): int { return }").unwrap_err();
    assert_mismatch(&error, Type::Int, Type::Void);
}

#[test]
fn test_recursion() {
    let (program, types) = check("fun f(n: int): int => f(n)").unwrap();
    assert_eq!(
        type_of(&types, declaration_id(&program.body[0])),
        Type::function(vec![Type::Int], Type::Int)
    );

    let error = check("fun f() => f()").unwrap_err();
    match error.get_impl() {
        ErrorImpl::RecursiveType { name } => assert_eq!(name, "f"),
        other => panic!("expected RecursiveType, got {:?}", other),
    }
}

#[test]
fn test_mutual_recursion_through_annotation() {
    let source = "fun even(n: int): bool => odd(n)\nfun odd(n: int) => even(n)";
    let (program, types) = check(source).unwrap();

    assert_eq!(
        type_of(&types, declaration_id(&program.body[1])),
        Type::function(vec![Type::Int], Type::Boolean)
    );
}

#[test]
fn test_hoisted_function_reading_later_variable() {
    let error = check("f()\nvar x = 1\nfun f() => x").unwrap_err();

    match error.get_impl() {
        ErrorImpl::UncheckedDeclaration { name } => assert_eq!(name, "x"),
        other => panic!("expected UncheckedDeclaration, got {:?}", other),
    }
    assert_eq!(error.line(), 3);

    assert!(check("var x = 1\nf()\nfun f() => x").is_ok());
}

#[test]
fn test_call_errors() {
    let error = check("var a = 1\na()").unwrap_err();
    match error.get_impl() {
        ErrorImpl::CannotCallNonFunction { callee } => assert_eq!(callee, &Type::Int),
        other => panic!("expected CannotCallNonFunction, got {:?}", other),
    }

    let error = check("fun f(a: int) => a\nf(\"x\")").unwrap_err();
    assert_mismatch(&error, Type::Int, Type::String);
    assert_eq!(error.line(), 2);

    let error = check("fun f(a: int) => a\n\"x\" | f").unwrap_err();
    assert_mismatch(&error, Type::Int, Type::String);
}

#[test]
fn test_array_access_on_non_array() {
    let error = check("var a = 1\na[0]").unwrap_err();

    match error.get_impl() {
        ErrorImpl::NotAnArray { received } => assert_eq!(received, &Type::Int),
        other => panic!("expected NotAnArray, got {:?}", other),
    }
}

#[test]
fn test_operator_types() {
    let (program, types) = check("fun f(a: ?int) => a ?? \"x\"; 1 < 2; !1; 1 <=> 2; \"a\" +. 2; -3; 1 + 2").unwrap();
    assert_eq!(
        type_of(&types, declaration_id(&program.body[0])),
        Type::function(vec![Type::nullable(Type::Int)], Type::union(vec![Type::Int, Type::String]))
    );

    let expected = [Type::Boolean, Type::Boolean, Type::Int, Type::String, Type::Int, Type::Any];
    for (stmt, expected) in program.body[1..].iter().zip(expected) {
        assert_eq!(type_of(&types, expression(stmt).id), expected);
    }
}

#[test]
fn test_ternary_and_match_unions() {
    let (program, types) = check("var a = true ? 1 : \"a\"\nvar b = match (1) { 1, 2 => 1.5, default => null }").unwrap();

    assert_eq!(
        type_of(&types, declaration_id(&program.body[0])),
        Type::union(vec![Type::Int, Type::String])
    );
    assert_eq!(
        type_of(&types, declaration_id(&program.body[1])),
        Type::union(vec![Type::Float, Type::Null])
    );
}

#[test]
fn test_member_access() {
    let source = "class A {\n var x = 1\n fun get() => this.x\n}\nvar a = new A\na.get()\na.x";
    let (program, types) = check(source).unwrap();

    assert_eq!(type_of(&types, expression(&program.body[2]).id), Type::Int);
    assert_eq!(type_of(&types, expression(&program.body[3]).id), Type::Int);

    let class = match &program.body[0] {
        Stmt::Class(class) => class,
        other => panic!("expected class, got {:?}", other),
    };
    let method = class.members.iter().find(|member| matches!(member, ClassMember::Method(_))).unwrap();
    assert_eq!(type_of(&types, method.id()), Type::function(vec![], Type::Int));

    let error = check("class A {}\nvar a = new A\na.missing").unwrap_err();
    match error.get_impl() {
        ErrorImpl::UnknownSymbol { symbol, class } => {
            assert_eq!(symbol, "missing");
            assert_eq!(class, "A");
        }
        other => panic!("expected UnknownSymbol, got {:?}", other),
    }

    let error = check("var a = 1\na.b").unwrap_err();
    match error.get_impl() {
        ErrorImpl::NotAnInstance { received } => assert_eq!(received, &Type::Int),
        other => panic!("expected NotAnInstance, got {:?}", other),
    }
}

#[test]
fn test_member_declared_after_use() {
    let source = "class A {\n fun get() => this.x\n var x = \"a\"\n}";
    let (program, types) = check(source).unwrap();

    let class = match &program.body[0] {
        Stmt::Class(class) => class,
        other => panic!("expected class, got {:?}", other),
    };
    assert_eq!(type_of(&types, class.members[0].id()), Type::function(vec![], Type::String));
    assert_eq!(type_of(&types, class.members[1].id()), Type::String);
}

#[test]
fn test_promoted_parameters_are_members() {
    let source = "class A(var x: int, y: string) {\n var z = y\n fun get() => this.x\n}\nnew A(1, \"a\").z";
    let (program, types) = check(source).unwrap();

    assert_eq!(type_of(&types, expression(&program.body[1]).id), Type::String);
}

#[test]
fn test_superclass_members() {
    let source = "class A { var x = 1 }\nclass B extends A {}\nvar b = new B\nb.x";
    let (program, types) = check(source).unwrap();

    assert_eq!(type_of(&types, expression(&program.body[3]).id), Type::Int);
}

#[test]
fn test_optional_access_is_nullable() {
    let source = "class A { var x = 1 }\nfun f(a: ?A) => a?.x";
    let (program, types) = check(source).unwrap();

    let class = declaration_id(&program.body[0]);
    let instance = Type::Instance { class, name: "A".to_string() };
    assert_eq!(
        type_of(&types, declaration_id(&program.body[1])),
        Type::function(vec![Type::nullable(instance)], Type::nullable(Type::Int))
    );
}

#[test]
fn test_class_annotations_resolve_to_instances() {
    assert!(check("class A {}\nvar a: A = new A").is_ok());

    let error = check("class A {}\nclass B {}\nvar a: A = new B").unwrap_err();
    assert_eq!(error.get_error_name(), "TypeMismatch");
}

#[test]
fn test_this_outside_class() {
    let error = check("fun f() => this").unwrap_err();
    match error.get_impl() {
        ErrorImpl::InvalidThis { keyword } => assert_eq!(keyword, "this"),
        other => panic!("expected InvalidThis, got {:?}", other),
    }

    let error = check("class A { fun f() => super }").unwrap_err();
    match error.get_impl() {
        ErrorImpl::InvalidThis { keyword } => assert_eq!(keyword, "super"),
        other => panic!("expected InvalidThis, got {:?}", other),
    }
}

#[test]
fn test_foreach_variable_types() {
    let (program, types) = check("foreach ([1, 2] as k => v) { }\nforeach (1 as w) { }").unwrap();

    match &program.body[0] {
        Stmt::Foreach(stmt) => {
            let key = stmt.key.as_ref().unwrap();
            assert_eq!(type_of(&types, key.id), Type::union(vec![Type::Int, Type::String]));
            match &stmt.value {
                ForeachValue::Variable(value) => assert_eq!(type_of(&types, value.id), Type::Int),
                other => panic!("expected variable, got {:?}", other),
            }
        }
        other => panic!("expected foreach, got {:?}", other),
    }

    match &program.body[1] {
        Stmt::Foreach(stmt) => match &stmt.value {
            ForeachValue::Variable(value) => assert_eq!(type_of(&types, value.id), Type::Any),
            other => panic!("expected variable, got {:?}", other),
        },
        other => panic!("expected foreach, got {:?}", other),
    }
}

#[test]
fn test_function_expression() {
    let (program, types) = check("var f = fun(a: int) => [a]\nf(1)").unwrap();

    assert_eq!(
        type_of(&types, declaration_id(&program.body[0])),
        Type::function(vec![Type::Int], Type::array(Type::Int))
    );
    assert_eq!(type_of(&types, expression(&program.body[1]).id), Type::array(Type::Int));
}

#[test]
fn test_parameter_default_must_fit() {
    let error = check("fun f(a: int = \"x\") => a").unwrap_err();
    assert_mismatch(&error, Type::Int, Type::String);

    assert!(check("fun f(a: ?int = null) => a").is_ok());
}

#[test]
fn test_external_declarations() {
    let options = || ResolveOptions {
        hoisted: None,
        default_resolver: Some(Box::new(|name: &str| {
            (name == "strlen").then(|| Type::function(vec![Type::String], Type::Int))
        })),
    };

    let (program, types) = check_with("var n = strlen(\"a\")", options()).unwrap();
    assert_eq!(type_of(&types, declaration_id(&program.body[0])), Type::Int);

    let error = check_with("strlen(1)", options()).unwrap_err();
    assert_mismatch(&error, Type::String, Type::Int);
}

#[test]
fn test_declarations_inside_function_expressions() {
    let source = "var f = fun(): int {\n class A { var b = 1 }\n var a = new A\n return a.b\n}";
    let (program, types) = check(source).unwrap();

    assert_eq!(
        type_of(&types, declaration_id(&program.body[0])),
        Type::function(vec![], Type::Int)
    );

    let source = "var f = fun(): string {\n class A {\n fun get() => this.name\n var name = \"a\"\n }\n return new A().get()\n}";
    assert!(check(source).is_ok());
}
