//! Type checking and semantic analysis module.
//!
//! This module assigns a type to every expression and declaration of a
//! resolved program. It:
//!
//! - Infers expression types bottom-up from their children
//! - Validates declarations, assignments, calls and returns by containment
//! - Resolves type annotations against the declared classes
//! - Checks forward-referenced functions and class members on demand
//!
//! Types are recorded in a `TypeTable` keyed by `NodeId`; the tree is left
//! untouched. The first violation stops the pass.

pub mod expr;
pub mod stmt;
pub mod type_checker;

#[cfg(test)]
mod tests;
