/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: Node ids, the program root and the statement sum type
/// - expressions: Definitions for the expression kinds
/// - statements: Definitions for statements, declarations and class members
/// - types: The type algebra shared by annotations and the type checker
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;

#[cfg(test)]
mod tests;
