//! Unit tests for error handling.
//!
//! Covers error names, the pass each error belongs to, tips and the
//! `Display` output used by callers.

use crate::ast::types::Type;
use crate::errors::errors::{Error, ErrorImpl, ErrorKind, ErrorTip};
use crate::Position;
use std::rc::Rc;

fn position(offset: u32, line: u32) -> Position {
    Position::new(offset, line, Rc::new("test.src".to_string()))
}

fn error(error_impl: ErrorImpl) -> Error {
    Error::new(error_impl, position(0, 1))
}

#[test]
fn test_error_creation() {
    let error = error(ErrorImpl::UnrecognisedToken {
        token: "@".to_string(),
    });

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.kind(), ErrorKind::Scan);
}

#[test]
fn test_error_position() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "identifier".to_string(),
        },
        position(42, 3),
    );

    assert_eq!(error.get_position().offset, 42);
    assert_eq!(error.get_position().file.as_str(), "test.src");
    assert_eq!(error.line(), 3);
}

#[test]
fn test_error_kinds() {
    let cases = [
        (ErrorImpl::UnterminatedString, ErrorKind::Scan),
        (ErrorImpl::NumberParseError { token: "1e".to_string() }, ErrorKind::Parse),
        (ErrorImpl::DuplicateDeclaration { name: "a".to_string() }, ErrorKind::Parse),
        (ErrorImpl::InvalidConstruction { message: "m".to_string() }, ErrorKind::Construction),
        (ErrorImpl::UndeclaredIdentifier { identifier: "a".to_string() }, ErrorKind::Resolution),
        (
            ErrorImpl::TypeMismatch {
                expected: Type::Int,
                received: Type::String,
            },
            ErrorKind::TypeCheck,
        ),
        (ErrorImpl::RecursiveType { name: "f".to_string() }, ErrorKind::TypeCheck),
        (ErrorImpl::InvalidThis { keyword: "this".to_string() }, ErrorKind::TypeCheck),
    ];

    for (error_impl, kind) in cases {
        let name = format!("{:?}", error_impl);
        assert_eq!(error(error_impl).kind(), kind, "{}", name);
    }
}

#[test]
fn test_type_mismatch_error() {
    let error = error(ErrorImpl::TypeMismatch {
        expected: Type::Int,
        received: Type::nullable(Type::String),
    });

    assert_eq!(error.get_error_name(), "TypeMismatch");
    assert_eq!(error.to_string(), "type mismatch: expected int, received ?string (line 1)");
    assert_eq!(error.get_tip().to_string(), "Expected type `int`, received `?string`");
}

#[test]
fn test_unknown_symbol_error() {
    let error = error(ErrorImpl::UnknownSymbol {
        symbol: "b".to_string(),
        class: "A".to_string(),
    });

    assert_eq!(error.get_error_name(), "UnknownSymbol");
    assert_eq!(error.get_tip().to_string(), "Unknown symbol `b` on class `A`");
}

#[test]
fn test_error_tip_none() {
    let error = error(ErrorImpl::UnrecognisedToken {
        token: "@".to_string(),
    });

    assert!(matches!(error.get_tip(), ErrorTip::None));
}

#[test]
fn test_error_tip_suggestion() {
    let error = error(ErrorImpl::UnexpectedToken {
        token: "}".to_string(),
    });

    match error.get_tip() {
        ErrorTip::Suggestion(_) => (),
        _ => panic!("Expected suggestion tip"),
    }
}

#[test]
fn test_error_tip_display() {
    let tip = ErrorTip::Suggestion("Try this instead".to_string());
    assert_eq!(tip.to_string(), "Try this instead");

    let tip = ErrorTip::None;
    assert_eq!(tip.to_string(), "");
}

#[test]
fn test_undeclared_identifier_display() {
    let error = Error::new(
        ErrorImpl::UndeclaredIdentifier {
            identifier: "foo".to_string(),
        },
        position(10, 4),
    );

    assert_eq!(error.to_string(), "undeclared identifier \"foo\" (line 4)");
}
