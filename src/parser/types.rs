//! Type parsing implementation.
//!
//! This module handles parsing of type annotations. It supports:
//!
//! - Primitive keywords (`int`, `string`, `mixed`, ...)
//! - Literal types (`1`, `"a"`, `true`)
//! - Nominal types with optional generics (`Foo`, `array<int>`)
//! - Nullable (`?T`), union (`A|B`) and intersection (`A&B`) types
//! - Function types (`fun(A, B): R`)
//!
//! Similar to expression parsing, it uses NUD/LED handlers with
//! binding powers for parsing complex type expressions. `&` binds tighter
//! than `|`.

use std::collections::HashMap;

use crate::{
    ast::types::Type,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{lookups::BindingPower, parser::Parser};

/// Type alias for type null denotation handler functions.
pub type TypeNUDHandler = fn(&mut Parser) -> Result<Type, Error>;

/// Type alias for type left denotation handler functions.
pub type TypeLEDHandler = fn(&mut Parser, Type, BindingPower) -> Result<Type, Error>;

/// Type alias for type NUD lookup table.
pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;

/// Type alias for type LED lookup table.
pub type TypeLEDLookup = HashMap<TokenKind, TypeLEDHandler>;

/// Type alias for type binding power lookup table.
pub type TypeBPLookup = HashMap<TokenKind, BindingPower>;

/// Initializes the type parsing lookup tables.
///
/// Registers NUD and LED handlers for parsing type expressions.
pub fn create_token_type_lookups(parser: &mut Parser) {
    parser.type_nud(TokenKind::Identifier, parse_symbol_type);
    parser.type_nud(TokenKind::Null, parse_keyword_type);
    parser.type_nud(TokenKind::True, parse_keyword_type);
    parser.type_nud(TokenKind::False, parse_keyword_type);
    parser.type_nud(TokenKind::Number, parse_literal_type);
    parser.type_nud(TokenKind::String, parse_literal_type);
    parser.type_nud(TokenKind::Question, parse_nullable_type);
    parser.type_nud(TokenKind::OpenParen, parse_grouping_type);
    parser.type_nud(TokenKind::Fun, parse_function_type);

    parser.type_led(TokenKind::Pipe, BindingPower::LogicalOr, parse_union_type);
    parser.type_led(TokenKind::Ampersand, BindingPower::LogicalAnd, parse_intersection_type);
}

/// Primitive keywords, then nominal references with optional generics.
pub fn parse_symbol_type(parser: &mut Parser) -> Result<Type, Error> {
    let token = parser.expect(TokenKind::Identifier)?;

    let primitive = match token.value.as_str() {
        "any" | "mixed" => Some(Type::Any),
        "void" => Some(Type::Void),
        "bool" | "boolean" => Some(Type::Boolean),
        "int" => Some(Type::Int),
        "float" => Some(Type::Float),
        "string" => Some(Type::String),
        _ => None,
    };
    if let Some(primitive) = primitive {
        return Ok(primitive);
    }

    let mut generics = vec![];
    if parser.eat(TokenKind::Less) {
        loop {
            generics.push(parse_type(parser, BindingPower::Default)?);
            if !parser.eat(TokenKind::Comma) {
                break;
            }
        }
        parser.expect_detailed(TokenKind::Greater, "expected `>` to close the generic arguments")?;
    }

    Ok(Type::Identifier {
        name: token.value,
        generics,
    })
}

pub fn parse_keyword_type(parser: &mut Parser) -> Result<Type, Error> {
    match parser.advance().kind {
        TokenKind::True => Ok(Type::True),
        TokenKind::False => Ok(Type::False),
        _ => Ok(Type::Null),
    }
}

pub fn parse_literal_type(parser: &mut Parser) -> Result<Type, Error> {
    let token = parser.advance().clone();

    match token.kind {
        TokenKind::String => Ok(Type::StringLiteral(token.value)),
        _ if token.value.contains('.') => Ok(Type::FloatLiteral(token.value)),
        _ if token.value.parse::<i64>().is_ok() => Ok(Type::IntLiteral(token.value)),
        _ => Err(Error::new(
            ErrorImpl::NumberParseError { token: token.value },
            token.span.start,
        )),
    }
}

pub fn parse_nullable_type(parser: &mut Parser) -> Result<Type, Error> {
    parser.advance();
    let inner = parse_type(parser, BindingPower::Unary)?;
    Ok(Type::nullable(inner))
}

pub fn parse_grouping_type(parser: &mut Parser) -> Result<Type, Error> {
    parser.advance();
    let inner = parse_type(parser, BindingPower::Default)?;
    parser.expect_detailed(TokenKind::CloseParen, "expected `)` to close the type group")?;
    Ok(inner)
}

/// `fun(A, B): R`
pub fn parse_function_type(parser: &mut Parser) -> Result<Type, Error> {
    parser.advance();
    parser.expect_detailed(TokenKind::OpenParen, "expected `(` in function type")?;

    let mut params = vec![];
    while parser.current_token_kind() != TokenKind::CloseParen {
        params.push(parse_type(parser, BindingPower::Default)?);
        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    parser.expect_detailed(TokenKind::CloseParen, "expected `)` in function type")?;
    parser.expect_detailed(TokenKind::Colon, "expected `:` and a return type in function type")?;
    let return_type = parse_type(parser, BindingPower::Unary)?;

    Ok(Type::function(params, return_type))
}

pub fn parse_union_type(parser: &mut Parser, left: Type, bp: BindingPower) -> Result<Type, Error> {
    parser.advance();
    let right = parse_type(parser, bp)?;
    Ok(Type::union(vec![left, right]))
}

pub fn parse_intersection_type(parser: &mut Parser, left: Type, bp: BindingPower) -> Result<Type, Error> {
    parser.advance();
    let right = parse_type(parser, bp)?;
    Ok(Type::intersection(vec![left, right]))
}

pub fn parse_type(parser: &mut Parser, bp: BindingPower) -> Result<Type, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud = match parser.get_type_nud_lookup().get(&token_kind) {
        Some(nud) => *nud,
        None => return Err(parser.unexpected_detailed("expected a type")),
    };

    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    loop {
        let token_kind = parser.current_token_kind();
        let next_bp = *parser
            .get_type_bp_lookup()
            .get(&token_kind)
            .unwrap_or(&BindingPower::Default);
        if next_bp <= bp {
            break;
        }

        let led = match parser.get_type_led_lookup().get(&token_kind) {
            Some(led) => *led,
            None => return Err(parser.unexpected()),
        };

        left = led(parser, left, next_bp)?;
    }

    Ok(left)
}
