//! Template string parsing.
//!
//! A `Template` token carries the raw body of a double-quoted string holding
//! `$name` or `${expr}` fragments. The body is split into literal and
//! expression parts here; `${...}` fragments are scanned separately and
//! parsed by the same parser, so ids and symbol tables stay shared and
//! nested templates work.

use std::mem;

use crate::{
    ast::expressions::{Expr, ExprKind, Identifier, TemplatePart},
    errors::errors::{Error, ErrorImpl},
    lexer::{
        lexer::{find_interpolation_end, tokenize_fragment, unescape},
        tokens::{Token, TokenKind},
    },
    Position, Span,
};

use super::{expr::parse_expr, lookups::BindingPower, parser::Parser};

pub fn parse_template_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.advance().clone();
    let raw = token.value.as_str();
    let bytes = raw.as_bytes();

    let mut parts = vec![];
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'$' if bytes.get(i + 1) == Some(&b'{') => {
                push_literal(&mut parts, &raw[literal_start..i]);

                let end = match find_interpolation_end(bytes, i + 1) {
                    Some(end) => end,
                    None => return Err(Error::new(ErrorImpl::UnterminatedString, token.span.start.clone())),
                };

                let position = position_in(&token, raw, i + 2);
                let expr = parse_fragment(parser, &raw[i + 2..end], position)?;
                parts.push(TemplatePart::Expression(expr));

                i = end + 1;
                literal_start = i;
            }
            b'$' if bytes.get(i + 1).is_some_and(|c| *c == b'_' || c.is_ascii_alphabetic()) => {
                push_literal(&mut parts, &raw[literal_start..i]);

                let name_start = i + 1;
                let mut name_end = name_start;
                while bytes.get(name_end).is_some_and(|c| *c == b'_' || c.is_ascii_alphanumeric()) {
                    name_end += 1;
                }

                let span = Span {
                    start: position_in(&token, raw, i),
                    end: position_in(&token, raw, name_end),
                };
                let name = raw[name_start..name_end].to_string();
                parts.push(TemplatePart::Expression(
                    parser.mk_expr(ExprKind::Identifier(Identifier { name }), span),
                ));

                i = name_end;
                literal_start = i;
            }
            _ => i += 1,
        }
    }

    push_literal(&mut parts, &raw[literal_start.min(raw.len())..]);

    // Only escaped `$` signs: a plain string after all.
    let kind = if parts.iter().all(|part| matches!(part, TemplatePart::Literal(_))) {
        let mut literal = String::new();
        for part in parts {
            if let TemplatePart::Literal(text) = part {
                literal.push_str(&text);
            }
        }
        ExprKind::String(literal)
    } else {
        ExprKind::Template(parts)
    };

    Ok(parser.mk_expr(kind, token.span))
}

fn push_literal(parts: &mut Vec<TemplatePart>, raw: &str) {
    if !raw.is_empty() {
        parts.push(TemplatePart::Literal(unescape(raw)));
    }
}

/// Source position of byte `index` of the raw template body.
fn position_in(token: &Token, raw: &str, index: usize) -> Position {
    let index = index.min(raw.len());
    let start = &token.span.start;
    let lines = raw.as_bytes()[..index].iter().filter(|c| **c == b'\n').count() as u32;

    // The body starts after the opening quote.
    Position::new(start.offset + 1 + index as u32, start.line + lines, start.file.clone())
}

fn parse_fragment(parser: &mut Parser, source: &str, position: Position) -> Result<Expr, Error> {
    let tokens = tokenize_fragment(source, position.file.clone(), position.line, position.offset)?;

    let saved_tokens = mem::replace(&mut parser.tokens, tokens);
    let saved_pos = mem::replace(&mut parser.pos, 0);

    let result = parse_expr(parser, BindingPower::Default).and_then(|expr| {
        if parser.current_token_kind() == TokenKind::EOF {
            Ok(expr)
        } else {
            Err(parser.unexpected_detailed("expected `}` to close the interpolation"))
        }
    });

    parser.tokens = saved_tokens;
    parser.pos = saved_pos;
    result
}
