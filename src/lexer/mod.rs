//! Lexical analysis module for the compiler.
//!
//! This module contains the scanner that converts source code into a stream
//! of tokens for parsing. It handles:
//!
//! - Tokenization of source code using regex patterns
//! - Recognition of keywords, identifiers, literals, and operators
//! - Token position and line tracking for error reporting
//! - Comments and whitespace handling
//! - Double-quoted template strings, including nested `${ ... }` fragments

pub mod lexer;
pub mod tokens;
