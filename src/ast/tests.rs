//! Unit tests for the type algebra.
//!
//! Covers structural equality, the asymmetric `contains` relation and the
//! union/intersection builders.

use super::{ast::NodeId, types::Type};

fn every_simple_type() -> Vec<Type> {
    vec![
        Type::Void,
        Type::Null,
        Type::Boolean,
        Type::True,
        Type::False,
        Type::Int,
        Type::IntLiteral("5".to_string()),
        Type::Float,
        Type::FloatLiteral("1.5".to_string()),
        Type::String,
        Type::StringLiteral("a".to_string()),
        Type::array(Type::Int),
        Type::function(vec![Type::Int], Type::String),
        Type::nullable(Type::String),
        Type::union(vec![Type::Int, Type::String]),
        Type::intersection(vec![Type::Int, Type::String]),
        Type::Identifier { name: "Foo".to_string(), generics: vec![] },
        Type::Instance { class: NodeId(3), name: "Foo".to_string() },
    ]
}

#[test]
fn test_any_contains_everything() {
    for ty in every_simple_type() {
        assert!(Type::Any.contains(&ty), "any should contain {}", ty);
    }
    assert!(Type::Any.contains(&Type::Any));
}

#[test]
fn test_only_any_contains_any() {
    for ty in every_simple_type() {
        assert!(!ty.contains(&Type::Any), "{} should not contain any", ty);
    }
}

#[test]
fn test_literal_widening() {
    assert!(Type::Int.contains(&Type::IntLiteral("5".to_string())));
    assert!(!Type::IntLiteral("5".to_string()).contains(&Type::Int));

    assert!(Type::String.contains(&Type::StringLiteral("x".to_string())));
    assert!(Type::Float.contains(&Type::FloatLiteral("2.0".to_string())));
    assert!(Type::Boolean.contains(&Type::True));
    assert!(Type::Boolean.contains(&Type::False));
    assert!(!Type::True.contains(&Type::Boolean));
    assert!(!Type::Int.contains(&Type::FloatLiteral("2.0".to_string())));
}

#[test]
fn test_literal_equality_compares_values() {
    assert_eq!(Type::IntLiteral("5".to_string()), Type::IntLiteral("5".to_string()));
    assert_ne!(Type::IntLiteral("5".to_string()), Type::IntLiteral("6".to_string()));
    assert_ne!(Type::StringLiteral("a".to_string()), Type::String);
}

#[test]
fn test_nullable_containment() {
    let nullable = Type::nullable(Type::String);

    assert!(nullable.contains(&Type::Null));
    assert!(nullable.contains(&Type::String));
    assert!(nullable.contains(&Type::StringLiteral("s".to_string())));
    assert!(nullable.contains(&Type::nullable(Type::StringLiteral("s".to_string()))));
    assert!(!nullable.contains(&Type::Int));
    assert!(!Type::String.contains(&nullable));
    assert!(!Type::String.contains(&Type::Null));
}

#[test]
fn test_union_containment() {
    let number = Type::union(vec![Type::Int, Type::Float]);

    assert!(number.contains(&Type::Int));
    assert!(number.contains(&Type::IntLiteral("1".to_string())));
    assert!(!number.contains(&Type::String));
    assert!(number.contains(&Type::union(vec![Type::Float, Type::Int])));
    assert!(number.contains(&Type::union(vec![Type::IntLiteral("1".to_string()), Type::Float])));
    assert!(!Type::Int.contains(&number));
    assert!(!number.contains(&Type::union(vec![Type::Int, Type::String])));
}

#[test]
fn test_intersection_containment() {
    let both = Type::intersection(vec![Type::nullable(Type::Int), Type::union(vec![Type::Int, Type::String])]);

    assert!(both.contains(&Type::Int));
    assert!(!both.contains(&Type::Null));
    assert!(!both.contains(&Type::String));
}

#[test]
fn test_union_construction_is_idempotent() {
    assert_eq!(Type::union(vec![Type::String, Type::String]), Type::String);
    assert!(matches!(Type::union(vec![Type::String, Type::String]), Type::String));
    assert!(matches!(Type::union(vec![]), Type::Void));
    assert!(matches!(Type::intersection(vec![]), Type::Void));
    assert!(matches!(Type::union(vec![Type::Int]), Type::Int));
}

#[test]
fn test_union_construction_flattens() {
    let nested = Type::union(vec![Type::Int, Type::union(vec![Type::String, Type::Int])]);

    match nested {
        Type::Union(members) => {
            assert_eq!(members.len(), 2);
            assert!(matches!(members[0], Type::Int));
            assert!(matches!(members[1], Type::String));
        }
        other => panic!("expected a union, got {}", other),
    }
}

#[test]
fn test_union_equality_ignores_order() {
    let a = Type::union(vec![Type::Int, Type::String]);
    let b = Type::union(vec![Type::String, Type::Int]);
    let c = Type::union(vec![Type::String, Type::Int, Type::Null]);

    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_array_containment() {
    assert!(Type::array(Type::Int).contains(&Type::array(Type::IntLiteral("1".to_string()))));
    assert!(Type::array(Type::Int).contains(&Type::array(Type::Void)));
    assert!(!Type::array(Type::Int).contains(&Type::array(Type::String)));
    assert!(!Type::array(Type::IntLiteral("1".to_string())).contains(&Type::array(Type::Int)));
    assert_ne!(Type::array(Type::Int), Type::array(Type::String));
}

#[test]
fn test_function_parameters_are_covariant() {
    let wide = Type::function(vec![Type::Int], Type::Int);
    let narrow = Type::function(vec![Type::IntLiteral("1".to_string())], Type::Int);

    // Parameter positions compare in the same direction as the return type.
    assert!(wide.contains(&narrow));
    assert!(!narrow.contains(&wide));
    assert!(!wide.contains(&Type::function(vec![Type::Int, Type::Int], Type::Int)));
}

#[test]
fn test_function_equality() {
    assert_eq!(
        Type::function(vec![], Type::Null),
        Type::function(vec![], Type::Null)
    );
    assert_ne!(
        Type::function(vec![], Type::Null),
        Type::function(vec![], Type::Int)
    );
}

#[test]
fn test_nominal_types() {
    let a = Type::Instance { class: NodeId(1), name: "A".to_string() };
    let other_a = Type::Instance { class: NodeId(2), name: "A".to_string() };

    assert!(a.contains(&a.clone()));
    assert!(!a.contains(&other_a));

    let list = Type::Identifier { name: "List".to_string(), generics: vec![Type::Int] };
    assert_eq!(list, Type::Identifier { name: "List".to_string(), generics: vec![Type::Int] });
    assert_ne!(list, Type::Identifier { name: "List".to_string(), generics: vec![Type::String] });
}

#[test]
fn test_non_null() {
    assert_eq!(Type::nullable(Type::Int).non_null(), Type::Int);
    assert_eq!(Type::union(vec![Type::Null, Type::String]).non_null(), Type::String);
    assert_eq!(Type::Int.non_null(), Type::Int);
}

#[test]
fn test_display() {
    assert_eq!(Type::nullable(Type::String).to_string(), "?string");
    assert_eq!(Type::union(vec![Type::Int, Type::String]).to_string(), "int|string");
    assert_eq!(Type::array(Type::Int).to_string(), "array<int>");
    assert_eq!(
        Type::function(vec![Type::union(vec![Type::Int, Type::Null])], Type::StringLiteral("a".to_string())).to_string(),
        "fun(int|null): \"a\""
    );
    assert_eq!(
        Type::union(vec![Type::intersection(vec![Type::Int, Type::Float]), Type::Null]).to_string(),
        "(int&float)|null"
    );
}
