//! Parser module for building an Abstract Syntax Tree (AST).
//!
//! This module contains the parser that transforms a stream of tokens
//! into a `Program`. It uses a Pratt parser for expressions
//! with proper operator precedence and handles:
//!
//! - Statement parsing (variable declarations, functions, control flow)
//! - Class declarations and their members
//! - Expression parsing (binary ops, calls, member access, literals)
//! - Template strings with interpolated expressions
//! - Type parsing for type annotations
//!
//! The parser uses NUD (null denotation) and LED (left denotation) functions
//! for expression parsing with binding power for precedence handling. The
//! first error aborts parsing.

pub mod class;
pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
pub mod template;
pub mod types;

#[cfg(test)]
mod tests;
