use std::fmt;

use crate::{symbols::table::Environment, Span};

use super::{
    expressions::Expr,
    statements::{
        BlockStmt, ClassDecl, EchoStmt, ExpressionStmt, ForStmt, ForeachStmt, FunctionDecl,
        IfStmt, ReturnStmt, ThrowStmt, TryStmt, VarDecl, VarDestructuringDecl, WhileStmt,
    },
};

/// Node Identifier
///
/// Stable identity of a node that can be referenced by a binding or carry a
/// type. Ids are handed out by the parser in document order and never reused
/// within one program.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NodeId(pub u32);

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Program
///
/// Root of the tree: the ordered top-level statements of one compilation
/// unit plus the hoisted declarations collected while parsing.
#[derive(Debug)]
pub struct Program {
    pub id: NodeId,
    pub body: Vec<Stmt>,
    pub environment: Environment,
    /// First id not handed out by the parser.
    pub next_id: NodeId,
    pub span: Span,
}

/// Statement
///
/// Every statement and declaration kind of the language. Passes match on
/// this exhaustively.
#[derive(Debug)]
pub enum Stmt {
    Expression(ExpressionStmt),
    Var(VarDecl),
    VarDestructuring(VarDestructuringDecl),
    Function(FunctionDecl),
    Class(ClassDecl),
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    Foreach(ForeachStmt),
    Try(TryStmt),
    Throw(ThrowStmt),
    Return(ReturnStmt),
    Echo(EchoStmt),
    Block(BlockStmt),
}

impl Stmt {
    pub fn get_span(&self) -> &Span {
        match self {
            Stmt::Expression(stmt) => &stmt.span,
            Stmt::Var(stmt) => &stmt.span,
            Stmt::VarDestructuring(stmt) => &stmt.span,
            Stmt::Function(stmt) => &stmt.span,
            Stmt::Class(stmt) => &stmt.span,
            Stmt::If(stmt) => &stmt.span,
            Stmt::While(stmt) => &stmt.span,
            Stmt::For(stmt) => &stmt.span,
            Stmt::Foreach(stmt) => &stmt.span,
            Stmt::Try(stmt) => &stmt.span,
            Stmt::Throw(stmt) => &stmt.span,
            Stmt::Return(stmt) => &stmt.span,
            Stmt::Echo(stmt) => &stmt.span,
            Stmt::Block(stmt) => &stmt.span,
        }
    }

    /// The expression of an expression statement.
    pub fn as_expression(&self) -> Option<&Expr> {
        match self {
            Stmt::Expression(stmt) => Some(&stmt.expression),
            _ => None,
        }
    }
}
