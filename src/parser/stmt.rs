use crate::{
    ast::{
        ast::Stmt,
        expressions::Expr,
        statements::{
            BlockStmt, CatchClause, Destructuring, DestructuringElement, EchoStmt, ExpressionStmt,
            ForStmt, ForeachStmt, ForeachValue, ForeachVariable, FunctionBody, FunctionDecl, IfStmt,
            Param, Promotion, ReturnStmt, ThrowStmt, TryStmt, VarDecl, VarDestructuringDecl,
            WhileStmt,
        },
        types::Type,
    },
    errors::errors::Error,
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
};

use super::{class::parse_modifiers, parser::Parser, types::parse_type};

pub fn parse_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let handler = parser.get_stmt_lookup().get(&parser.current_token_kind()).copied();
    if let Some(handler) = handler {
        return handler(parser);
    }

    parse_expression_stmt(parser)
}

pub fn parse_expression_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let expression = parse_expr(parser, BindingPower::Default)?;
    let span = expression.span.clone();
    parser.expect_terminator()?;

    Ok(Stmt::Expression(ExpressionStmt { expression, span }))
}

pub fn parse_var_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let stmt = parse_var_decl(parser)?;
    parser.expect_terminator()?;
    Ok(stmt)
}

/// `var name[: T] [= value]` or `var [a, b] = value`, without terminator.
pub fn parse_var_decl(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    if parser.current_token_kind() == TokenKind::OpenBracket {
        let destructuring = parse_destructuring(parser)?;
        parser.expect_detailed(TokenKind::Assignment, "expected a value to destructure")?;
        let initializer = parse_expr(parser, BindingPower::Default)?;

        return Ok(Stmt::VarDestructuring(VarDestructuringDecl {
            destructuring,
            initializer,
            span: parser.span_from(start),
        }));
    }

    let name = parser
        .expect_detailed(TokenKind::Identifier, "expected identifier during variable declaration")?
        .value;
    let id = parser.advance_id();

    let annotation = if parser.eat(TokenKind::Colon) {
        Some(parse_type(parser, BindingPower::Default)?)
    } else {
        None
    };

    let initializer = if parser.eat(TokenKind::Assignment) {
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    Ok(Stmt::Var(VarDecl {
        id,
        name,
        annotation,
        initializer,
        span: parser.span_from(start),
    }))
}

/// `[a, "key" => b]`
pub fn parse_destructuring(parser: &mut Parser) -> Result<Destructuring, Error> {
    let start = parser.expect(TokenKind::OpenBracket)?.span.start;

    let mut elements = vec![];
    while parser.current_token_kind() != TokenKind::CloseBracket {
        let element_start = parser.get_position();

        let key = if parser.current_token_kind() == TokenKind::Identifier
            && parser.peek(1).kind != TokenKind::FatArrow
        {
            None
        } else {
            let key = parse_expr(parser, BindingPower::Default)?;
            parser.expect_detailed(TokenKind::FatArrow, "expected `=>` after destructuring key")?;
            Some(key)
        };

        let name = parser
            .expect_detailed(TokenKind::Identifier, "expected a variable name in destructuring")?
            .value;

        elements.push(DestructuringElement {
            id: parser.advance_id(),
            key,
            name,
            span: parser.span_from(element_start),
        });

        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    parser.expect_detailed(TokenKind::CloseBracket, "expected `,` or `]` in destructuring")?;
    Ok(Destructuring {
        elements,
        span: parser.span_from(start),
    })
}

/// `fun name(...)` declares a function, any other `fun` starts an expression.
pub fn parse_fun_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    if parser.peek(1).kind == TokenKind::Identifier {
        parse_fn_decl_stmt(parser)
    } else {
        parse_expression_stmt(parser)
    }
}

pub fn parse_fn_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let name_token = parser.expect(TokenKind::Identifier)?;
    let id = parser.advance_id();
    parser.declare_hoisted(&name_token.value, id, name_token.span.start.clone())?;

    let params = parse_params(parser, false)?;
    let return_type = parse_return_type(parser)?;
    let body = parse_function_body(parser)?;
    let span = parser.span_from(start);

    if matches!(body, FunctionBody::Expression(_)) {
        parser.expect_terminator()?;
    }

    Ok(Stmt::Function(FunctionDecl {
        id,
        name: name_token.value,
        params,
        return_type,
        body,
        span,
    }))
}

/// Parses `(a, b: T = 1, ...)`. Class parameters may be promoted to
/// properties with a `var`/`val` marker and modifiers.
pub fn parse_params(parser: &mut Parser, allow_promotion: bool) -> Result<Vec<Param>, Error> {
    parser.expect_detailed(TokenKind::OpenParen, "expected `(` to open the parameter list")?;

    let mut params = vec![];
    while parser.current_token_kind() != TokenKind::CloseParen {
        params.push(parse_param(parser, allow_promotion)?);

        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    parser.expect_detailed(TokenKind::CloseParen, "expected `,` or `)` in parameter list")?;
    Ok(params)
}

fn parse_param(parser: &mut Parser, allow_promotion: bool) -> Result<Param, Error> {
    let start = parser.get_position();
    let (modifiers, has_modifiers) = parse_modifiers(parser);

    let mutable = match parser.current_token_kind() {
        TokenKind::Var => Some(true),
        TokenKind::Val => Some(false),
        _ => None,
    };

    if (has_modifiers || mutable.is_some()) && !allow_promotion {
        return Err(parser.unexpected_detailed("only class parameters can be promoted to properties"));
    }
    if has_modifiers && mutable.is_none() {
        return Err(parser.unexpected_detailed("expected `var` or `val` after parameter modifiers"));
    }
    if mutable.is_some() {
        parser.advance();
    }

    let name = parser
        .expect_detailed(TokenKind::Identifier, "expected a parameter name")?
        .value;

    let annotation = if parser.eat(TokenKind::Colon) {
        Some(parse_type(parser, BindingPower::Default)?)
    } else {
        None
    };

    let default = if parser.eat(TokenKind::Assignment) {
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    Ok(Param {
        id: parser.advance_id(),
        name,
        annotation,
        default,
        promotion: mutable.map(|mutable| Promotion { modifiers, mutable }),
        span: parser.span_from(start),
    })
}

pub fn parse_return_type(parser: &mut Parser) -> Result<Option<Type>, Error> {
    if parser.eat(TokenKind::Colon) {
        Ok(Some(parse_type(parser, BindingPower::Default)?))
    } else {
        Ok(None)
    }
}

/// `=> expression` or `{ ... }`
pub fn parse_function_body(parser: &mut Parser) -> Result<FunctionBody, Error> {
    if parser.eat(TokenKind::FatArrow) {
        return Ok(FunctionBody::Expression(Box::new(parse_expr(parser, BindingPower::Default)?)));
    }

    if parser.current_token_kind() != TokenKind::OpenCurly {
        return Err(parser.unexpected_detailed("expected `=>` or `{` to start the function body"));
    }

    Ok(FunctionBody::Block(parse_block(parser)?))
}

pub fn parse_block(parser: &mut Parser) -> Result<BlockStmt, Error> {
    let start = parser.expect(TokenKind::OpenCurly)?.span.start;

    let mut body = Vec::new();
    parser.skip_semicolons();
    while parser.current_token_kind() != TokenKind::CloseCurly && parser.has_tokens() {
        body.push(parse_stmt(parser)?);
        parser.skip_semicolons();
    }

    parser.expect_detailed(TokenKind::CloseCurly, "expected `}` to close the block")?;

    Ok(BlockStmt {
        body,
        span: parser.span_from(start),
    })
}

pub fn parse_block_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    Ok(Stmt::Block(parse_block(parser)?))
}

fn parse_condition(parser: &mut Parser, keyword: &str) -> Result<Expr, Error> {
    parser.expect_detailed(TokenKind::OpenParen, &format!("expected `(` after {}", keyword))?;
    let condition = parse_expr(parser, BindingPower::Default)?;
    parser.expect_detailed(TokenKind::CloseParen, &format!("expected `)` after {} condition", keyword))?;
    Ok(condition)
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let condition = parse_condition(parser, "if")?;
    let then_branch = Box::new(parse_stmt(parser)?);

    let else_branch = if parser.eat(TokenKind::Else) {
        Some(Box::new(parse_stmt(parser)?))
    } else {
        None
    };

    Ok(Stmt::If(IfStmt {
        condition,
        then_branch,
        else_branch,
        span: parser.span_from(start),
    }))
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let condition = parse_condition(parser, "while")?;
    let body = Box::new(parse_stmt(parser)?);

    Ok(Stmt::While(WhileStmt {
        condition,
        body,
        span: parser.span_from(start),
    }))
}

/// `for (init; condition; step) body`, every clause optional.
pub fn parse_for_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();
    parser.expect_detailed(TokenKind::OpenParen, "expected `(` after for")?;

    let initializer = match parser.current_token_kind() {
        TokenKind::Semicolon => None,
        TokenKind::Var => Some(Box::new(parse_var_decl(parser)?)),
        _ => {
            let expression = parse_expr(parser, BindingPower::Default)?;
            let span = expression.span.clone();
            Some(Box::new(Stmt::Expression(ExpressionStmt { expression, span })))
        }
    };
    parser.expect_detailed(TokenKind::Semicolon, "expected `;` after for initializer")?;

    let condition = if parser.current_token_kind() != TokenKind::Semicolon {
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };
    parser.expect_detailed(TokenKind::Semicolon, "expected `;` after for condition")?;

    let step = if parser.current_token_kind() != TokenKind::CloseParen {
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };
    parser.expect_detailed(TokenKind::CloseParen, "expected `)` after for clauses")?;

    let body = Box::new(parse_stmt(parser)?);

    Ok(Stmt::For(ForStmt {
        initializer,
        condition,
        step,
        body,
        span: parser.span_from(start),
    }))
}

fn parse_foreach_variable(parser: &mut Parser) -> Result<ForeachVariable, Error> {
    let token = parser.expect_detailed(TokenKind::Identifier, "expected a loop variable")?;
    Ok(ForeachVariable {
        id: parser.advance_id(),
        name: token.value,
        span: token.span,
    })
}

fn parse_foreach_value(parser: &mut Parser) -> Result<ForeachValue, Error> {
    if parser.current_token_kind() == TokenKind::OpenBracket {
        Ok(ForeachValue::Destructuring(parse_destructuring(parser)?))
    } else {
        Ok(ForeachValue::Variable(parse_foreach_variable(parser)?))
    }
}

/// `foreach (iterable as [key =>] value) body`
pub fn parse_foreach_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();
    parser.expect_detailed(TokenKind::OpenParen, "expected `(` after foreach")?;

    let iterable = parse_expr(parser, BindingPower::Default)?;
    parser.expect_detailed(TokenKind::As, "expected `as` in foreach")?;

    let (key, value) = if parser.current_token_kind() == TokenKind::Identifier
        && parser.peek(1).kind == TokenKind::FatArrow
    {
        let key = parse_foreach_variable(parser)?;
        parser.advance();
        (Some(key), parse_foreach_value(parser)?)
    } else {
        (None, parse_foreach_value(parser)?)
    };

    parser.expect_detailed(TokenKind::CloseParen, "expected `)` after foreach clause")?;
    let body = Box::new(parse_stmt(parser)?);

    Ok(Stmt::Foreach(ForeachStmt {
        iterable,
        key,
        value,
        body,
        span: parser.span_from(start),
    }))
}

/// `try { } catch (e: A|B) { } finally { }`
pub fn parse_try_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();
    let body = parse_block(parser)?;

    let mut catches = vec![];
    while parser.current_token_kind() == TokenKind::Catch {
        let catch_start = parser.advance().span.start.clone();
        parser.expect_detailed(TokenKind::OpenParen, "expected `(` after catch")?;

        let name = parser
            .expect_detailed(TokenKind::Identifier, "expected the caught variable name")?
            .value;
        let types = if parser.eat(TokenKind::Colon) {
            match parse_type(parser, BindingPower::Default)? {
                Type::Union(members) => members,
                other => vec![other],
            }
        } else {
            vec![]
        };
        parser.expect_detailed(TokenKind::CloseParen, "expected `)` after catch types")?;

        let catch_body = parse_block(parser)?;
        let id = parser.advance_id();
        let span = parser.span_from(catch_start);
        catches.push(CatchClause::new(id, name, types, catch_body, span)?);
    }

    let finally = if parser.eat(TokenKind::Finally) {
        Some(parse_block(parser)?)
    } else {
        None
    };

    let span = parser.span_from(start);
    Ok(Stmt::Try(TryStmt::new(body, catches, finally, span)?))
}

pub fn parse_throw_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();
    let value = parse_expr(parser, BindingPower::Default)?;
    let span = parser.span_from(start);
    parser.expect_terminator()?;

    Ok(Stmt::Throw(ThrowStmt { value, span }))
}

pub fn parse_echo_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let mut values = vec![parse_expr(parser, BindingPower::Default)?];
    while parser.eat(TokenKind::Comma) {
        values.push(parse_expr(parser, BindingPower::Default)?);
    }

    let span = parser.span_from(start);
    parser.expect_terminator()?;

    Ok(Stmt::Echo(EchoStmt { values, span }))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let ends_here = matches!(
        parser.current_token_kind(),
        TokenKind::Semicolon | TokenKind::CloseCurly | TokenKind::Else | TokenKind::EOF
    ) || parser.at_line_break();

    let value = if ends_here {
        None
    } else {
        Some(parse_expr(parser, BindingPower::Default)?)
    };

    let span = parser.span_from(start);
    parser.expect_terminator()?;

    Ok(Stmt::Return(ReturnStmt { value, span }))
}
