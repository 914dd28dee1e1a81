use crate::Span;

use super::{ast::NodeId, statements::{FunctionBody, Param}, types::Type};

/// Expression
///
/// Every expression owns its children. `id` keys the expression's type in
/// the type table and, for identifiers, its binding.
#[derive(Debug)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn get_span(&self) -> &Span {
        &self.span
    }

    pub fn as_identifier(&self) -> Option<&Identifier> {
        match &self.kind {
            ExprKind::Identifier(identifier) => Some(identifier),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum ExprKind {
    // LITERALS
    Null,
    Boolean(bool),
    Number(NumberLiteral),
    String(String),
    Template(Vec<TemplatePart>),
    Array(Vec<ArrayElement>),

    // SYMBOLS
    Identifier(Identifier),
    This,
    Super,

    // OPERATORS
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Postfix(PostfixExpr),
    Grouping(Box<Expr>),
    Ternary(TernaryExpr),
    Assign(AssignExpr),
    Pipeline(PipelineExpr),

    // ACCESS
    ArrayAccess(ArrayAccessExpr),
    Call(CallExpr),
    Get(GetExpr),

    // OBJECTS
    New(NewExpr),
    Clone(Box<Expr>),

    Match(MatchExpr),
    Function(FunctionExpr),
    Throw(Box<Expr>),
}

/// Numeric literal, kept as written.
#[derive(Debug, Clone, PartialEq)]
pub enum NumberLiteral {
    Int(String),
    Float(String),
}

#[derive(Debug)]
pub enum TemplatePart {
    Literal(String),
    Expression(Expr),
}

/// Array Element
/// `value` or `key => value` inside an array literal.
#[derive(Debug)]
pub struct ArrayElement {
    pub key: Option<Expr>,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Identifier {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Coalesce,
    Or,
    And,
    Equals,
    NotEquals,
    Identical,
    NotIdentical,
    Spaceship,
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    Concat,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Instanceof,
    Power,
}

impl BinaryOperator {
    /// Operators whose result is always a boolean.
    pub fn is_boolean(self) -> bool {
        matches!(
            self,
            BinaryOperator::Or
                | BinaryOperator::And
                | BinaryOperator::Equals
                | BinaryOperator::NotEquals
                | BinaryOperator::Identical
                | BinaryOperator::NotIdentical
                | BinaryOperator::Less
                | BinaryOperator::LessEquals
                | BinaryOperator::Greater
                | BinaryOperator::GreaterEquals
        )
    }
}

#[derive(Debug)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub operator: BinaryOperator,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Negate,
    Plus,
    Decrement,
    Increment,
}

#[derive(Debug)]
pub struct UnaryExpr {
    pub operator: UnaryOperator,
    pub operand: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixOperator {
    Increment,
    Decrement,
}

/// Postfix increment/decrement. The operand is always an identifier.
#[derive(Debug)]
pub struct PostfixExpr {
    pub operator: PostfixOperator,
    pub operand: Box<Expr>,
}

#[derive(Debug)]
pub struct TernaryExpr {
    pub condition: Box<Expr>,
    pub then_branch: Box<Expr>,
    pub else_branch: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOperator {
    Assign,
    Add,
    Subtract,
    Multiply,
    Divide,
    Concat,
}

#[derive(Debug)]
pub struct AssignExpr {
    pub target: Box<Expr>,
    pub operator: AssignOperator,
    pub value: Box<Expr>,
}

/// Pipeline
/// `value | function` calls `function` with `value` as its only argument.
#[derive(Debug)]
pub struct PipelineExpr {
    pub value: Box<Expr>,
    pub function: Box<Expr>,
}

/// `target[index]`; the index is absent for the append form `target[] = v`.
#[derive(Debug)]
pub struct ArrayAccessExpr {
    pub target: Box<Expr>,
    pub index: Option<Box<Expr>>,
}

#[derive(Debug)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub arguments: Vec<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// `a.b`
    Dot,
    /// `a?.b`
    Optional,
    /// `A::b`
    Static,
}

#[derive(Debug)]
pub struct GetExpr {
    pub object: Box<Expr>,
    pub name: String,
    pub access: Access,
}

#[derive(Debug)]
pub struct NewExpr {
    pub class: Box<Expr>,
    pub arguments: Vec<Expr>,
}

#[derive(Debug)]
pub struct MatchArm {
    pub patterns: Vec<Expr>,
    pub body: Expr,
    pub span: Span,
}

#[derive(Debug)]
pub struct MatchExpr {
    pub subject: Box<Expr>,
    pub arms: Vec<MatchArm>,
    pub default: Option<Box<Expr>>,
}

/// Function Expression
/// An anonymous function. Names it reads from enclosing function scopes are
/// collected by the resolver as its captures.
#[derive(Debug)]
pub struct FunctionExpr {
    pub params: Vec<Param>,
    pub return_type: Option<Type>,
    pub body: FunctionBody,
}
