use std::collections::HashMap;

use crate::{
    ast::{ast::Stmt, expressions::Expr},
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::{class::*, expr::*, parser::Parser, stmt::*, template::parse_template_expr};

/// Operator precedence, loosest first.
#[derive(PartialEq, PartialOrd, Clone, Copy, Debug)]
pub enum BindingPower {
    Default,
    Assignment,
    Ternary,
    Coalesce,
    LogicalOr,
    LogicalAnd,
    Equality,
    Comparison,
    Concat,
    Additive,
    Multiplicative,
    Instanceof,
    Exponent,
    Unary,
    Postfix,
    Pipeline,
    Call,
    Member,
    Primary,
}

impl BindingPower {
    /// The next looser level. Parsing a right operand at this level makes an
    /// operator right-associative.
    pub fn lower(self) -> BindingPower {
        match self {
            BindingPower::Default | BindingPower::Assignment => BindingPower::Default,
            BindingPower::Ternary => BindingPower::Assignment,
            BindingPower::Coalesce => BindingPower::Ternary,
            BindingPower::LogicalOr => BindingPower::Coalesce,
            BindingPower::LogicalAnd => BindingPower::LogicalOr,
            BindingPower::Equality => BindingPower::LogicalAnd,
            BindingPower::Comparison => BindingPower::Equality,
            BindingPower::Concat => BindingPower::Comparison,
            BindingPower::Additive => BindingPower::Concat,
            BindingPower::Multiplicative => BindingPower::Additive,
            BindingPower::Instanceof => BindingPower::Multiplicative,
            BindingPower::Exponent => BindingPower::Instanceof,
            BindingPower::Unary => BindingPower::Exponent,
            BindingPower::Postfix => BindingPower::Unary,
            BindingPower::Pipeline => BindingPower::Postfix,
            BindingPower::Call => BindingPower::Pipeline,
            BindingPower::Member => BindingPower::Call,
            BindingPower::Primary => BindingPower::Member,
        }
    }
}

pub type StmtHandler = fn(&mut Parser) -> Result<Stmt, Error>;
pub type NUDHandler = fn(&mut Parser) -> Result<Expr, Error>;
pub type LEDHandler = fn(&mut Parser, Expr, BindingPower) -> Result<Expr, Error>;

pub fn create_token_lookups(parser: &mut Parser) {
    // Assignment
    parser.led(TokenKind::Assignment, BindingPower::Assignment, parse_assignment_expr);
    parser.led(TokenKind::PlusEquals, BindingPower::Assignment, parse_assignment_expr);
    parser.led(TokenKind::MinusEquals, BindingPower::Assignment, parse_assignment_expr);
    parser.led(TokenKind::StarEquals, BindingPower::Assignment, parse_assignment_expr);
    parser.led(TokenKind::SlashEquals, BindingPower::Assignment, parse_assignment_expr);
    parser.led(TokenKind::ConcatEquals, BindingPower::Assignment, parse_assignment_expr);

    parser.led(TokenKind::Question, BindingPower::Ternary, parse_ternary_expr);
    parser.led(TokenKind::QuestionQuestion, BindingPower::Coalesce, parse_right_binary_expr);

    // Logical
    parser.led(TokenKind::Or, BindingPower::LogicalOr, parse_binary_expr);
    parser.led(TokenKind::And, BindingPower::LogicalAnd, parse_binary_expr);

    // Equality and comparison
    parser.led(TokenKind::Equals, BindingPower::Equality, parse_binary_expr);
    parser.led(TokenKind::NotEquals, BindingPower::Equality, parse_binary_expr);
    parser.led(TokenKind::Identical, BindingPower::Equality, parse_binary_expr);
    parser.led(TokenKind::NotIdentical, BindingPower::Equality, parse_binary_expr);
    parser.led(TokenKind::Spaceship, BindingPower::Equality, parse_binary_expr);
    parser.led(TokenKind::Less, BindingPower::Comparison, parse_binary_expr);
    parser.led(TokenKind::LessEquals, BindingPower::Comparison, parse_binary_expr);
    parser.led(TokenKind::Greater, BindingPower::Comparison, parse_binary_expr);
    parser.led(TokenKind::GreaterEquals, BindingPower::Comparison, parse_binary_expr);

    // Concat, additive and multiplicative
    parser.led(TokenKind::PlusDot, BindingPower::Concat, parse_binary_expr);
    parser.led(TokenKind::Plus, BindingPower::Additive, parse_binary_expr);
    parser.led(TokenKind::Dash, BindingPower::Additive, parse_binary_expr);
    parser.led(TokenKind::Star, BindingPower::Multiplicative, parse_binary_expr);
    parser.led(TokenKind::Slash, BindingPower::Multiplicative, parse_binary_expr);
    parser.led(TokenKind::Percent, BindingPower::Multiplicative, parse_binary_expr);
    parser.led(TokenKind::Instanceof, BindingPower::Instanceof, parse_binary_expr);
    parser.led(TokenKind::StarStar, BindingPower::Exponent, parse_right_binary_expr);

    parser.led(TokenKind::PlusPlus, BindingPower::Postfix, parse_postfix_expr);
    parser.led(TokenKind::MinusMinus, BindingPower::Postfix, parse_postfix_expr);
    parser.led(TokenKind::Pipe, BindingPower::Pipeline, parse_pipeline_expr);

    parser.led(TokenKind::OpenParen, BindingPower::Call, parse_call_expr);

    // Member
    parser.led(TokenKind::Dot, BindingPower::Member, parse_member_expr);
    parser.led(TokenKind::QuestionDot, BindingPower::Member, parse_member_expr);
    parser.led(TokenKind::ColonColon, BindingPower::Member, parse_member_expr);
    parser.led(TokenKind::OpenBracket, BindingPower::Member, parse_array_access_expr);

    // Literals and symbols
    parser.nud(TokenKind::Number, parse_primary_expr);
    parser.nud(TokenKind::String, parse_primary_expr);
    parser.nud(TokenKind::Identifier, parse_primary_expr);
    parser.nud(TokenKind::Null, parse_primary_expr);
    parser.nud(TokenKind::True, parse_primary_expr);
    parser.nud(TokenKind::False, parse_primary_expr);
    parser.nud(TokenKind::This, parse_primary_expr);
    parser.nud(TokenKind::Super, parse_primary_expr);
    parser.nud(TokenKind::Template, parse_template_expr);
    parser.nud(TokenKind::OpenParen, parse_grouping_expr);
    parser.nud(TokenKind::OpenBracket, parse_array_expr);

    // Prefix
    parser.nud(TokenKind::Not, parse_prefix_expr);
    parser.nud(TokenKind::Dash, parse_prefix_expr);
    parser.nud(TokenKind::Plus, parse_prefix_expr);
    parser.nud(TokenKind::PlusPlus, parse_prefix_expr);
    parser.nud(TokenKind::MinusMinus, parse_prefix_expr);
    parser.nud(TokenKind::Fun, parse_function_expr);
    parser.nud(TokenKind::Throw, parse_throw_expr);
    parser.nud(TokenKind::Match, parse_match_expr);
    parser.nud(TokenKind::New, parse_new_expr);
    parser.nud(TokenKind::Clone, parse_clone_expr);

    // Statements
    parser.stmt(TokenKind::Var, parse_var_decl_stmt);
    parser.stmt(TokenKind::Fun, parse_fun_stmt);
    parser.stmt(TokenKind::Class, parse_class_decl_stmt);
    parser.stmt(TokenKind::Abstract, parse_class_decl_stmt);
    parser.stmt(TokenKind::If, parse_if_stmt);
    parser.stmt(TokenKind::While, parse_while_stmt);
    parser.stmt(TokenKind::For, parse_for_stmt);
    parser.stmt(TokenKind::Foreach, parse_foreach_stmt);
    parser.stmt(TokenKind::Try, parse_try_stmt);
    parser.stmt(TokenKind::Throw, parse_throw_stmt);
    parser.stmt(TokenKind::Echo, parse_echo_stmt);
    parser.stmt(TokenKind::Return, parse_return_stmt);
    parser.stmt(TokenKind::OpenCurly, parse_block_stmt);
}

// Lookup tables inside parser struct, so it's easier
pub type StmtLookup = HashMap<TokenKind, StmtHandler>;
pub type NUDLookup = HashMap<TokenKind, NUDHandler>;
pub type LEDLookup = HashMap<TokenKind, LEDHandler>;
pub type BPLookup = HashMap<TokenKind, BindingPower>;
