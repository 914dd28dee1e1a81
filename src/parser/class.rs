//! Class declarations and class members.
//!
//! Every member name and promoted constructor parameter is registered into
//! the member table of the class while it is parsed; the finished table is
//! stored on the `ClassDecl`.

use crate::{
    ast::{
        ast::Stmt,
        expressions::{Expr, ExprKind, Identifier},
        statements::{
            AbstractMethodDecl, ClassDecl, ClassMember, ConstDecl, InitializerDecl, MethodDecl,
            FunctionBody, Modifiers, Param, PropertyDecl, SuperclassDecl, Visibility,
        },
    },
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::{
    expr::{parse_arguments, parse_expr, parse_member_name},
    lookups::BindingPower,
    parser::Parser,
    stmt::{parse_block, parse_function_body, parse_params, parse_return_type},
    types::parse_type,
};

/// Reads `public|protected|private`, `static`, `final` and `readonly` in any
/// order. The flag reports whether any modifier was present.
pub fn parse_modifiers(parser: &mut Parser) -> (Modifiers, bool) {
    let mut modifiers = Modifiers::default();
    let mut any = false;

    loop {
        match parser.current_token_kind() {
            TokenKind::Public => modifiers.visibility = Visibility::Public,
            TokenKind::Protected => modifiers.visibility = Visibility::Protected,
            TokenKind::Private => modifiers.visibility = Visibility::Private,
            TokenKind::Static => modifiers.is_static = true,
            TokenKind::Final => modifiers.is_final = true,
            TokenKind::Readonly => modifiers.is_readonly = true,
            _ => break,
        }

        parser.advance();
        any = true;
    }

    (modifiers, any)
}

fn parse_identifier_expr(parser: &mut Parser, message: &str) -> Result<Expr, Error> {
    let token = parser.expect_detailed(TokenKind::Identifier, message)?;
    Ok(parser.mk_expr(ExprKind::Identifier(Identifier { name: token.value }), token.span))
}

/// `[abstract] class Name[(params)] [extends S[(args)]] [implements I, J]
/// [iterates member] { members }`
pub fn parse_class_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.get_position();
    let is_abstract = parser.eat(TokenKind::Abstract);
    parser.expect_detailed(TokenKind::Class, "expected `class`")?;

    let name_token = parser.expect_detailed(TokenKind::Identifier, "expected a class name")?;
    let id = parser.advance_id();
    parser.declare_hoisted(&name_token.value, id, name_token.span.start.clone())?;

    parser.enter_class();
    let body = parse_class_body(parser);
    let table = parser.exit_class();
    let body = body?;

    Ok(Stmt::Class(ClassDecl {
        id,
        name: name_token.value,
        is_abstract,
        params: body.params,
        superclass: body.superclass,
        interfaces: body.interfaces,
        iterates: body.iterates,
        members: body.members,
        table,
        span: parser.span_from(start),
    }))
}

struct ClassBody {
    params: Vec<Param>,
    superclass: Option<SuperclassDecl>,
    interfaces: Vec<String>,
    iterates: Option<Expr>,
    members: Vec<ClassMember>,
}

fn parse_class_body(parser: &mut Parser) -> Result<ClassBody, Error> {
    let params = if parser.current_token_kind() == TokenKind::OpenParen {
        parse_params(parser, true)?
    } else {
        vec![]
    };

    for param in params.iter().filter(|param| param.promotion.is_some()) {
        parser.declare_member(&param.name, param.id, param.span.start.clone())?;
    }

    let superclass = if parser.eat(TokenKind::Extends) {
        let start = parser.get_position();
        let name = parse_identifier_expr(parser, "expected a superclass name")?;
        let arguments = if parser.current_token_kind() == TokenKind::OpenParen {
            parse_arguments(parser)?
        } else {
            vec![]
        };

        Some(SuperclassDecl {
            name,
            arguments,
            span: parser.span_from(start),
        })
    } else {
        None
    };

    let mut interfaces = vec![];
    if parser.eat(TokenKind::Implements) {
        loop {
            let interface = parser.expect_detailed(TokenKind::Identifier, "expected an interface name")?;
            interfaces.push(interface.value);

            if !parser.eat(TokenKind::Comma) {
                break;
            }
        }
    }

    let iterates = if parser.eat(TokenKind::Iterates) {
        Some(parse_identifier_expr(parser, "expected the iterated member")?)
    } else {
        None
    };

    parser.expect_detailed(TokenKind::OpenCurly, "expected `{` to open the class body")?;

    let mut members = vec![];
    parser.skip_semicolons();
    while parser.current_token_kind() != TokenKind::CloseCurly && parser.has_tokens() {
        members.push(parse_class_member(parser)?);
        parser.skip_semicolons();
    }

    parser.expect_detailed(TokenKind::CloseCurly, "expected `}` to close the class body")?;

    Ok(ClassBody {
        params,
        superclass,
        interfaces,
        iterates,
        members,
    })
}

fn parse_class_member(parser: &mut Parser) -> Result<ClassMember, Error> {
    let start = parser.get_position();
    let (modifiers, _) = parse_modifiers(parser);

    match parser.current_token_kind() {
        TokenKind::Var | TokenKind::Val => {
            let mutable = parser.advance().kind == TokenKind::Var;
            let name_token = parser.expect_detailed(TokenKind::Identifier, "expected a property name")?;
            let id = parser.advance_id();
            parser.declare_member(&name_token.value, id, name_token.span.start.clone())?;

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

            let span = parser.span_from(start);
            parser.expect_terminator()?;

            Ok(ClassMember::Property(PropertyDecl {
                id,
                name: name_token.value,
                modifiers,
                mutable,
                annotation,
                initializer,
                span,
            }))
        }
        TokenKind::Fun => {
            parser.advance();
            let position = parser.get_position();
            let name = parse_member_name(parser)?;
            let id = parser.advance_id();
            parser.declare_member(&name, id, position)?;

            let params = parse_params(parser, false)?;
            let return_type = parse_return_type(parser)?;
            let body = parse_function_body(parser)?;
            let span = parser.span_from(start);

            if matches!(body, FunctionBody::Expression(_)) {
                parser.expect_terminator()?;
            }

            Ok(ClassMember::Method(MethodDecl {
                id,
                name,
                modifiers,
                params,
                return_type,
                body,
                span,
            }))
        }
        TokenKind::Abstract => {
            parser.advance();
            parser.expect_detailed(TokenKind::Fun, "expected `fun` after abstract")?;
            let position = parser.get_position();
            let name = parse_member_name(parser)?;
            let id = parser.advance_id();
            parser.declare_member(&name, id, position)?;

            let params = parse_params(parser, false)?;
            let return_type = parse_return_type(parser)?;
            let span = parser.span_from(start);
            parser.expect_terminator()?;

            Ok(ClassMember::AbstractMethod(AbstractMethodDecl {
                id,
                name,
                modifiers,
                params,
                return_type,
                span,
            }))
        }
        TokenKind::Const => {
            parser.advance();
            let position = parser.get_position();
            let name = parse_member_name(parser)?;
            let id = parser.advance_id();
            parser.declare_member(&name, id, position)?;

            let annotation = if parser.eat(TokenKind::Colon) {
                Some(parse_type(parser, BindingPower::Default)?)
            } else {
                None
            };
            parser.expect_detailed(TokenKind::Assignment, "expected `=` after const name")?;
            let value = parse_expr(parser, BindingPower::Default)?;

            let span = parser.span_from(start);
            parser.expect_terminator()?;

            Ok(ClassMember::Const(ConstDecl {
                id,
                name,
                modifiers,
                annotation,
                value,
                span,
            }))
        }
        TokenKind::Init => {
            parser.advance();
            let body = parse_block(parser)?;

            Ok(ClassMember::Initializer(InitializerDecl {
                id: parser.advance_id(),
                body,
                span: parser.span_from(start),
            }))
        }
        _ => Err(parser.unexpected_detailed("expected a property, method, const or init block")),
    }
}
