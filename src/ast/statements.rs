use crate::{
    errors::errors::{Error, ErrorImpl},
    symbols::table::SymbolTable,
    Span,
};

use super::{ast::{NodeId, Stmt}, expressions::Expr, types::Type};

#[derive(Debug)]
pub struct BlockStmt {
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug)]
pub struct ExpressionStmt {
    pub expression: Expr,
    pub span: Span,
}

/// Variable Declaration
/// `var name[: T] [= value]`
#[derive(Debug)]
pub struct VarDecl {
    pub id: NodeId,
    pub name: String,
    pub annotation: Option<Type>,
    pub initializer: Option<Expr>,
    pub span: Span,
}

/// `var [a, "k" => b] = value`
#[derive(Debug)]
pub struct VarDestructuringDecl {
    pub destructuring: Destructuring,
    pub initializer: Expr,
    pub span: Span,
}

#[derive(Debug)]
pub struct Destructuring {
    pub elements: Vec<DestructuringElement>,
    pub span: Span,
}

/// One name bound by a destructuring pattern, optionally under an explicit key.
#[derive(Debug)]
pub struct DestructuringElement {
    pub id: NodeId,
    pub key: Option<Expr>,
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
    pub is_readonly: bool,
}

/// Constructor parameter promoted to a property (`var`/`val` marker).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Promotion {
    pub modifiers: Modifiers,
    pub mutable: bool,
}

#[derive(Debug)]
pub struct Param {
    pub id: NodeId,
    pub name: String,
    pub annotation: Option<Type>,
    pub default: Option<Expr>,
    pub promotion: Option<Promotion>,
    pub span: Span,
}

#[derive(Debug)]
pub enum FunctionBody {
    Expression(Box<Expr>),
    Block(BlockStmt),
}

/// Function Declaration
/// Hoisted: visible to the whole program regardless of position.
#[derive(Debug)]
pub struct FunctionDecl {
    pub id: NodeId,
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Option<Type>,
    pub body: FunctionBody,
    pub span: Span,
}

/// Class Declaration
///
/// `table` holds every member and promoted constructor parameter declared in
/// the class body, filled in by the parser as the members are read.
#[derive(Debug)]
pub struct ClassDecl {
    pub id: NodeId,
    pub name: String,
    pub is_abstract: bool,
    pub params: Vec<Param>,
    pub superclass: Option<SuperclassDecl>,
    pub interfaces: Vec<String>,
    pub iterates: Option<Expr>,
    pub members: Vec<ClassMember>,
    pub table: SymbolTable,
    pub span: Span,
}

#[derive(Debug)]
pub struct SuperclassDecl {
    /// Always an identifier expression.
    pub name: Expr,
    pub arguments: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug)]
pub enum ClassMember {
    Property(PropertyDecl),
    Method(MethodDecl),
    AbstractMethod(AbstractMethodDecl),
    Const(ConstDecl),
    Initializer(InitializerDecl),
}

impl ClassMember {
    pub fn id(&self) -> NodeId {
        match self {
            ClassMember::Property(member) => member.id,
            ClassMember::Method(member) => member.id,
            ClassMember::AbstractMethod(member) => member.id,
            ClassMember::Const(member) => member.id,
            ClassMember::Initializer(member) => member.id,
        }
    }

    /// Initializers are anonymous.
    pub fn name(&self) -> Option<&str> {
        match self {
            ClassMember::Property(member) => Some(&member.name),
            ClassMember::Method(member) => Some(&member.name),
            ClassMember::AbstractMethod(member) => Some(&member.name),
            ClassMember::Const(member) => Some(&member.name),
            ClassMember::Initializer(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct PropertyDecl {
    pub id: NodeId,
    pub name: String,
    pub modifiers: Modifiers,
    pub mutable: bool,
    pub annotation: Option<Type>,
    pub initializer: Option<Expr>,
    pub span: Span,
}

#[derive(Debug)]
pub struct MethodDecl {
    pub id: NodeId,
    pub name: String,
    pub modifiers: Modifiers,
    pub params: Vec<Param>,
    pub return_type: Option<Type>,
    pub body: FunctionBody,
    pub span: Span,
}

#[derive(Debug)]
pub struct AbstractMethodDecl {
    pub id: NodeId,
    pub name: String,
    pub modifiers: Modifiers,
    pub params: Vec<Param>,
    pub return_type: Option<Type>,
    pub span: Span,
}

#[derive(Debug)]
pub struct ConstDecl {
    pub id: NodeId,
    pub name: String,
    pub modifiers: Modifiers,
    pub annotation: Option<Type>,
    pub value: Expr,
    pub span: Span,
}

/// `init { ... }` block run on construction.
#[derive(Debug)]
pub struct InitializerDecl {
    pub id: NodeId,
    pub body: BlockStmt,
    pub span: Span,
}

#[derive(Debug)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
    pub span: Span,
}

#[derive(Debug)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug)]
pub struct ForStmt {
    pub initializer: Option<Box<Stmt>>,
    pub condition: Option<Expr>,
    pub step: Option<Expr>,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug)]
pub struct ForeachVariable {
    pub id: NodeId,
    pub name: String,
    pub span: Span,
}

#[derive(Debug)]
pub enum ForeachValue {
    Variable(ForeachVariable),
    Destructuring(Destructuring),
}

/// `foreach (iterable as [key =>] value) body`
#[derive(Debug)]
pub struct ForeachStmt {
    pub iterable: Expr,
    pub key: Option<ForeachVariable>,
    pub value: ForeachValue,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug)]
pub struct CatchClause {
    pub id: NodeId,
    pub name: String,
    pub types: Vec<Type>,
    pub body: BlockStmt,
    pub span: Span,
}

impl CatchClause {
    /// A catch clause must name at least one exception type.
    pub fn new(id: NodeId, name: String, types: Vec<Type>, body: BlockStmt, span: Span) -> Result<Self, Error> {
        if types.is_empty() {
            return Err(Error::new(
                ErrorImpl::InvalidConstruction { message: format!("catch clause for `{}` has no exception types", name) },
                span.start.clone(),
            ));
        }

        Ok(CatchClause { id, name, types, body, span })
    }
}

#[derive(Debug)]
pub struct TryStmt {
    pub body: BlockStmt,
    pub catches: Vec<CatchClause>,
    pub finally: Option<BlockStmt>,
    pub span: Span,
}

impl TryStmt {
    /// A try statement needs at least one catch clause or a finally block.
    pub fn new(body: BlockStmt, catches: Vec<CatchClause>, finally: Option<BlockStmt>, span: Span) -> Result<Self, Error> {
        if catches.is_empty() && finally.is_none() {
            return Err(Error::new(
                ErrorImpl::InvalidConstruction { message: String::from("try requires a catch or finally block") },
                span.start.clone(),
            ));
        }

        Ok(TryStmt { body, catches, finally, span })
    }
}

#[derive(Debug)]
pub struct ThrowStmt {
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug)]
pub struct EchoStmt {
    pub values: Vec<Expr>,
    pub span: Span,
}
