use crate::{
    ast::expressions::{
        Access, ArrayAccessExpr, ArrayElement, AssignExpr, AssignOperator, BinaryExpr,
        BinaryOperator, CallExpr, Expr, ExprKind, FunctionExpr, GetExpr, Identifier, MatchArm,
        MatchExpr, NewExpr, NumberLiteral, PipelineExpr, PostfixExpr, PostfixOperator,
        TernaryExpr, UnaryExpr, UnaryOperator,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{
    lookups::BindingPower,
    parser::Parser,
    stmt::{parse_function_body, parse_params, parse_return_type},
};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud = match parser.get_nud_lookup().get(&token_kind) {
        Some(nud) => *nud,
        None => return Err(parser.unexpected()),
    };

    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    loop {
        let token_kind = parser.current_token_kind();
        let next_bp = *parser.get_bp_lookup().get(&token_kind).unwrap_or(&BindingPower::Default);
        if next_bp <= bp {
            break;
        }

        // `a\n++b` is two statements.
        if matches!(token_kind, TokenKind::PlusPlus | TokenKind::MinusMinus) && parser.at_line_break() {
            break;
        }

        let led = match parser.get_led_lookup().get(&token_kind) {
            Some(led) => *led,
            None => return Err(parser.unexpected()),
        };

        left = led(parser, left, next_bp)?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.advance().clone();

    let kind = match token.kind {
        TokenKind::Number => {
            let literal = if token.value.contains('.') {
                token.value.parse::<f64>().ok().map(|_| NumberLiteral::Float(token.value.clone()))
            } else {
                // Integers past i64 read as floats, as PHP does.
                token.value.parse::<i64>().ok().map(|_| NumberLiteral::Int(token.value.clone())).or_else(|| {
                    token.value.parse::<f64>().ok().map(|_| NumberLiteral::Float(token.value.clone()))
                })
            };

            match literal {
                Some(literal) => ExprKind::Number(literal),
                None => {
                    return Err(Error::new(
                        ErrorImpl::NumberParseError { token: token.value.clone() },
                        token.span.start.clone(),
                    ))
                }
            }
        }
        TokenKind::String => ExprKind::String(token.value.clone()),
        TokenKind::Identifier => ExprKind::Identifier(Identifier { name: token.value.clone() }),
        TokenKind::Null => ExprKind::Null,
        TokenKind::True => ExprKind::Boolean(true),
        TokenKind::False => ExprKind::Boolean(false),
        TokenKind::This => ExprKind::This,
        TokenKind::Super => ExprKind::Super,
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken { token: token.value.clone() },
                token.span.start.clone(),
            ))
        }
    };

    Ok(parser.mk_expr(kind, token.span))
}

fn binary_operator(kind: TokenKind) -> Option<BinaryOperator> {
    let operator = match kind {
        TokenKind::QuestionQuestion => BinaryOperator::Coalesce,
        TokenKind::Or => BinaryOperator::Or,
        TokenKind::And => BinaryOperator::And,
        TokenKind::Equals => BinaryOperator::Equals,
        TokenKind::NotEquals => BinaryOperator::NotEquals,
        TokenKind::Identical => BinaryOperator::Identical,
        TokenKind::NotIdentical => BinaryOperator::NotIdentical,
        TokenKind::Spaceship => BinaryOperator::Spaceship,
        TokenKind::Less => BinaryOperator::Less,
        TokenKind::LessEquals => BinaryOperator::LessEquals,
        TokenKind::Greater => BinaryOperator::Greater,
        TokenKind::GreaterEquals => BinaryOperator::GreaterEquals,
        TokenKind::PlusDot => BinaryOperator::Concat,
        TokenKind::Plus => BinaryOperator::Add,
        TokenKind::Dash => BinaryOperator::Subtract,
        TokenKind::Star => BinaryOperator::Multiply,
        TokenKind::Slash => BinaryOperator::Divide,
        TokenKind::Percent => BinaryOperator::Modulo,
        TokenKind::Instanceof => BinaryOperator::Instanceof,
        TokenKind::StarStar => BinaryOperator::Power,
        _ => return None,
    };
    Some(operator)
}

fn build_binary(parser: &mut Parser, left: Expr, right_bp: BindingPower) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let operator = match binary_operator(operator_token.kind) {
        Some(operator) => operator,
        None => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken { token: operator_token.value.clone() },
                operator_token.span.start.clone(),
            ))
        }
    };

    let right = parse_expr(parser, right_bp)?;
    let span = left.span.to(&right.span);

    Ok(parser.mk_expr(
        ExprKind::Binary(BinaryExpr {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }),
        span,
    ))
}

pub fn parse_binary_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    build_binary(parser, left, bp)
}

/// Binary operator grouping to the right (`??`, `**`).
pub fn parse_right_binary_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    build_binary(parser, left, bp.lower())
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let operator = match operator_token.kind {
        TokenKind::Not => UnaryOperator::Not,
        TokenKind::Dash => UnaryOperator::Negate,
        TokenKind::Plus => UnaryOperator::Plus,
        TokenKind::MinusMinus => UnaryOperator::Decrement,
        _ => UnaryOperator::Increment,
    };

    let operand = parse_expr(parser, BindingPower::Unary)?;
    let span = operator_token.span.to(&operand.span);

    Ok(parser.mk_expr(
        ExprKind::Unary(UnaryExpr {
            operator,
            operand: Box::new(operand),
        }),
        span,
    ))
}

pub fn parse_postfix_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    if left.as_identifier().is_none() {
        return Err(parser.unexpected_detailed("increment and decrement need a variable operand"));
    }

    let operator_token = parser.advance().clone();
    let operator = if operator_token.kind == TokenKind::PlusPlus {
        PostfixOperator::Increment
    } else {
        PostfixOperator::Decrement
    };
    let span = left.span.to(&operator_token.span);

    Ok(parser.mk_expr(
        ExprKind::Postfix(PostfixExpr {
            operator,
            operand: Box::new(left),
        }),
        span,
    ))
}

pub fn parse_assignment_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    if !matches!(left.kind, ExprKind::Identifier(_) | ExprKind::Get(_) | ExprKind::ArrayAccess(_)) {
        return Err(parser.unexpected_detailed("left side of an assignment must be a variable, property or array element"));
    }

    let operator_token = parser.advance().clone();
    let operator = match operator_token.kind {
        TokenKind::PlusEquals => AssignOperator::Add,
        TokenKind::MinusEquals => AssignOperator::Subtract,
        TokenKind::StarEquals => AssignOperator::Multiply,
        TokenKind::SlashEquals => AssignOperator::Divide,
        TokenKind::ConcatEquals => AssignOperator::Concat,
        _ => AssignOperator::Assign,
    };

    // Assignments group to the right.
    let value = parse_expr(parser, BindingPower::Default)?;
    let span = left.span.to(&value.span);

    Ok(parser.mk_expr(
        ExprKind::Assign(AssignExpr {
            target: Box::new(left),
            operator,
            value: Box::new(value),
        }),
        span,
    ))
}

pub fn parse_ternary_expr(parser: &mut Parser, condition: Expr, bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();

    let then_branch = parse_expr(parser, BindingPower::Default)?;
    parser.expect_detailed(TokenKind::Colon, "expected `:` in ternary expression")?;
    let else_branch = parse_expr(parser, bp.lower())?;
    let span = condition.span.to(&else_branch.span);

    Ok(parser.mk_expr(
        ExprKind::Ternary(TernaryExpr {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        }),
        span,
    ))
}

/// `value | function` calls `function` with `value`.
pub fn parse_pipeline_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();

    let function = parse_expr(parser, bp)?;
    let span = left.span.to(&function.span);

    Ok(parser.mk_expr(
        ExprKind::Pipeline(PipelineExpr {
            value: Box::new(left),
            function: Box::new(function),
        }),
        span,
    ))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().span.start.clone();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect_detailed(TokenKind::CloseParen, "expected `)` to close the group")?;

    let span = parser.span_from(start);
    Ok(parser.mk_expr(ExprKind::Grouping(Box::new(expr)), span))
}

/// Parses `(a, b, ...)`, allowing a trailing comma.
pub fn parse_arguments(parser: &mut Parser) -> Result<Vec<Expr>, Error> {
    parser.expect(TokenKind::OpenParen)?;

    let mut args = vec![];
    while parser.current_token_kind() != TokenKind::CloseParen {
        args.push(parse_expr(parser, BindingPower::Default)?);

        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    parser.expect_detailed(TokenKind::CloseParen, "expected `,` or `)` in argument list")?;
    Ok(args)
}

pub fn parse_call_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    let arguments = parse_arguments(parser)?;
    let span = parser.span_from(left.span.start.clone());

    Ok(parser.mk_expr(
        ExprKind::Call(CallExpr {
            callee: Box::new(left),
            arguments,
        }),
        span,
    ))
}

/// Member names may be reserved words (`A::class`, `a.default`).
pub fn parse_member_name(parser: &mut Parser) -> Result<String, Error> {
    let token = parser.current_token();
    let is_word = token.kind == TokenKind::Identifier
        || (!token.value.is_empty() && token.value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !matches!(token.kind, TokenKind::Number | TokenKind::String | TokenKind::Template | TokenKind::EOF));

    if !is_word {
        return Err(parser.unexpected_detailed("expected a member name"));
    }

    Ok(parser.advance().value.clone())
}

pub fn parse_member_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    let access = match parser.advance().kind {
        TokenKind::QuestionDot => Access::Optional,
        TokenKind::ColonColon => Access::Static,
        _ => Access::Dot,
    };

    let name = parse_member_name(parser)?;
    let span = parser.span_from(left.span.start.clone());

    Ok(parser.mk_expr(
        ExprKind::Get(GetExpr {
            object: Box::new(left),
            name,
            access,
        }),
        span,
    ))
}

pub fn parse_array_access_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();

    let index = if parser.current_token_kind() == TokenKind::CloseBracket {
        None
    } else {
        Some(Box::new(parse_expr(parser, BindingPower::Default)?))
    };
    parser.expect_detailed(TokenKind::CloseBracket, "expected `]` after array index")?;

    let span = parser.span_from(left.span.start.clone());
    Ok(parser.mk_expr(
        ExprKind::ArrayAccess(ArrayAccessExpr {
            target: Box::new(left),
            index,
        }),
        span,
    ))
}

/// `[a, b]` or `["k" => a, 1 => b]`.
pub fn parse_array_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().span.start.clone();

    let mut elements = vec![];
    while parser.current_token_kind() != TokenKind::CloseBracket {
        let first = parse_expr(parser, BindingPower::Default)?;

        let element = if parser.eat(TokenKind::FatArrow) {
            let value = parse_expr(parser, BindingPower::Default)?;
            ArrayElement {
                span: first.span.to(&value.span),
                key: Some(first),
                value,
            }
        } else {
            ArrayElement {
                span: first.span.clone(),
                key: None,
                value: first,
            }
        };
        elements.push(element);

        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    parser.expect_detailed(TokenKind::CloseBracket, "expected `,` or `]` in array literal")?;

    let span = parser.span_from(start);
    Ok(parser.mk_expr(ExprKind::Array(elements), span))
}

pub fn parse_function_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().span.start.clone();

    let params = parse_params(parser, false)?;
    let return_type = parse_return_type(parser)?;
    let body = parse_function_body(parser)?;

    let span = parser.span_from(start);
    Ok(parser.mk_expr(
        ExprKind::Function(FunctionExpr {
            params,
            return_type,
            body,
        }),
        span,
    ))
}

pub fn parse_throw_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().span.start.clone();
    let value = parse_expr(parser, BindingPower::Default)?;

    let span = parser.span_from(start);
    Ok(parser.mk_expr(ExprKind::Throw(Box::new(value)), span))
}

/// `match (subject) { a, b => x, default => y }`
pub fn parse_match_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().span.start.clone();

    parser.expect_detailed(TokenKind::OpenParen, "expected `(` after match")?;
    let subject = parse_expr(parser, BindingPower::Default)?;
    parser.expect_detailed(TokenKind::CloseParen, "expected `)` after match subject")?;
    parser.expect_detailed(TokenKind::OpenCurly, "expected `{` to open match arms")?;

    let mut arms = vec![];
    let mut default = None;

    while parser.current_token_kind() != TokenKind::CloseCurly {
        if parser.current_token_kind() == TokenKind::Default {
            if default.is_some() {
                return Err(parser.unexpected_detailed("match has more than one default arm"));
            }

            parser.advance();
            parser.expect_detailed(TokenKind::FatArrow, "expected `=>` after default")?;
            default = Some(Box::new(parse_expr(parser, BindingPower::Default)?));
        } else {
            let arm_start = parser.get_position();
            let mut patterns = vec![parse_expr(parser, BindingPower::Default)?];
            while parser.eat(TokenKind::Comma) {
                patterns.push(parse_expr(parser, BindingPower::Default)?);
            }

            parser.expect_detailed(TokenKind::FatArrow, "expected `=>` after match pattern")?;
            let body = parse_expr(parser, BindingPower::Default)?;
            arms.push(MatchArm {
                patterns,
                body,
                span: parser.span_from(arm_start),
            });
        }

        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    parser.expect_detailed(TokenKind::CloseCurly, "expected `,` or `}` in match arms")?;

    let span = parser.span_from(start);
    Ok(parser.mk_expr(
        ExprKind::Match(MatchExpr {
            subject: Box::new(subject),
            arms,
            default,
        }),
        span,
    ))
}

/// `new A`, `new A(args)` or `new a.b(args)`.
pub fn parse_new_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().span.start.clone();

    // Stop before the call so the argument list belongs to `new`.
    let class = parse_expr(parser, BindingPower::Call)?;
    let arguments = if parser.current_token_kind() == TokenKind::OpenParen {
        parse_arguments(parser)?
    } else {
        vec![]
    };

    let span = parser.span_from(start);
    Ok(parser.mk_expr(
        ExprKind::New(NewExpr {
            class: Box::new(class),
            arguments,
        }),
        span,
    ))
}

pub fn parse_clone_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().span.start.clone();
    let operand = parse_expr(parser, BindingPower::Postfix)?;

    let span = parser.span_from(start);
    Ok(parser.mk_expr(ExprKind::Clone(Box::new(operand)), span))
}
