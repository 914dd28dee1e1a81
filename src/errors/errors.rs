use std::fmt::Display;

use thiserror::Error;

use crate::{ast::types::Type, Position};

#[derive(Error, Debug, Clone)]
#[error("{} (line {})", .internal_error, .position.line)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

/// The pass an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Scan,
    Parse,
    Construction,
    Resolution,
    TypeCheck,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn line(&self) -> u32 {
        self.position.line
    }

    pub fn kind(&self) -> ErrorKind {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } | ErrorImpl::UnterminatedString => ErrorKind::Scan,
            ErrorImpl::UnexpectedToken { .. }
            | ErrorImpl::UnexpectedTokenDetailed { .. }
            | ErrorImpl::NumberParseError { .. }
            | ErrorImpl::DuplicateDeclaration { .. } => ErrorKind::Parse,
            ErrorImpl::InvalidConstruction { .. } => ErrorKind::Construction,
            ErrorImpl::UndeclaredIdentifier { .. } => ErrorKind::Resolution,
            ErrorImpl::TypeMismatch { .. }
            | ErrorImpl::CannotCallNonFunction { .. }
            | ErrorImpl::UnknownSymbol { .. }
            | ErrorImpl::NotAnInstance { .. }
            | ErrorImpl::NotAnArray { .. }
            | ErrorImpl::CannotInferReturnType { .. }
            | ErrorImpl::RecursiveType { .. }
            | ErrorImpl::UncheckedDeclaration { .. }
            | ErrorImpl::InvalidThis { .. } => ErrorKind::TypeCheck,
        }
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnterminatedString => "UnterminatedString",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::DuplicateDeclaration { .. } => "DuplicateDeclaration",
            ErrorImpl::InvalidConstruction { .. } => "InvalidConstruction",
            ErrorImpl::UndeclaredIdentifier { .. } => "UndeclaredIdentifier",
            ErrorImpl::TypeMismatch { .. } => "TypeMismatch",
            ErrorImpl::CannotCallNonFunction { .. } => "CannotCallNonFunction",
            ErrorImpl::UnknownSymbol { .. } => "UnknownSymbol",
            ErrorImpl::NotAnInstance { .. } => "NotAnInstance",
            ErrorImpl::NotAnArray { .. } => "NotAnArray",
            ErrorImpl::CannotInferReturnType { .. } => "CannotInferReturnType",
            ErrorImpl::RecursiveType { .. } => "RecursiveType",
            ErrorImpl::UncheckedDeclaration { .. } => "UncheckedDeclaration",
            ErrorImpl::InvalidThis { .. } => "InvalidThis",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnterminatedString => {
                ErrorTip::Suggestion(String::from("String literal is missing its closing quote"))
            }
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a semicolon?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::DuplicateDeclaration { name } => {
                ErrorTip::Suggestion(format!("`{}` is already declared in this scope", name))
            }
            ErrorImpl::InvalidConstruction { message } => ErrorTip::Suggestion(message.clone()),
            ErrorImpl::UndeclaredIdentifier { identifier } => {
                ErrorTip::Suggestion(format!("`{}` is not declared", identifier))
            }
            ErrorImpl::TypeMismatch { expected, received } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::CannotCallNonFunction { callee } => {
                ErrorTip::Suggestion(format!("Cannot call non-function of type `{}`", callee))
            }
            ErrorImpl::UnknownSymbol { symbol, class } => {
                ErrorTip::Suggestion(format!("Unknown symbol `{}` on class `{}`", symbol, class))
            }
            ErrorImpl::NotAnInstance { received } => ErrorTip::Suggestion(format!(
                "Expected a class instance, received `{}`",
                received
            )),
            ErrorImpl::NotAnArray { received } => {
                ErrorTip::Suggestion(format!("Cannot index non-array of type `{}`", received))
            }
            ErrorImpl::CannotInferReturnType { function } => ErrorTip::Suggestion(format!(
                "Cannot infer return type of `{}`, add a return type annotation",
                function
            )),
            ErrorImpl::RecursiveType { name } => ErrorTip::Suggestion(format!(
                "`{}` refers to itself, annotate its return type",
                name
            )),
            ErrorImpl::UncheckedDeclaration { name } => ErrorTip::Suggestion(format!(
                "`{}` is used before its declaration is checked",
                name
            )),
            ErrorImpl::InvalidThis { keyword } => {
                ErrorTip::Suggestion(format!("`{}` is not available here", keyword))
            }
        }
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("{name:?} already declared")]
    DuplicateDeclaration { name: String },
    #[error("invalid construction: {message}")]
    InvalidConstruction { message: String },
    #[error("undeclared identifier {identifier:?}")]
    UndeclaredIdentifier { identifier: String },
    #[error("type mismatch: expected {expected}, received {received}")]
    TypeMismatch { expected: Type, received: Type },
    #[error("cannot call non-function {callee}")]
    CannotCallNonFunction { callee: Type },
    #[error("unknown symbol {symbol:?} on {class}")]
    UnknownSymbol { symbol: String, class: String },
    #[error("expected an instance, received {received}")]
    NotAnInstance { received: Type },
    #[error("cannot index non-array {received}")]
    NotAnArray { received: Type },
    #[error("cannot infer function return type of {function:?}")]
    CannotInferReturnType { function: String },
    #[error("cannot infer recursive type of {name:?}")]
    RecursiveType { name: String },
    #[error("declaration {name:?} used before it was checked")]
    UncheckedDeclaration { name: String },
    #[error("{keyword} used outside of a class with a matching declaration")]
    InvalidThis { keyword: String },
}
