use crate::{
    ast::{
        expressions::{
            Access, ArrayElement, AssignExpr, AssignOperator, BinaryExpr, BinaryOperator, Expr,
            ExprKind, GetExpr, NumberLiteral, TemplatePart, UnaryOperator,
        },
        statements::FunctionBody,
        types::Type,
    },
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::{
    stmt::check_function,
    type_checker::{class_instance, mismatch, TypeChecker},
};

/// Type checks `expr` and its children, records the result and returns it.
pub fn type_check_expr<'a>(checker: &mut TypeChecker<'a>, expr: &'a Expr) -> Result<Type, Error> {
    let ty = match &expr.kind {
        ExprKind::Null => Type::Null,
        ExprKind::Boolean(true) => Type::True,
        ExprKind::Boolean(false) => Type::False,
        ExprKind::Number(NumberLiteral::Int(_)) => Type::Int,
        ExprKind::Number(NumberLiteral::Float(_)) => Type::Float,
        ExprKind::String(_) => Type::String,
        ExprKind::Template(parts) => {
            for part in parts {
                if let TemplatePart::Expression(part) = part {
                    type_check_expr(checker, part)?;
                }
            }
            Type::String
        }
        ExprKind::Array(elements) => type_check_array(checker, elements)?,
        ExprKind::Identifier(identifier) => checker.identifier_type(expr, &identifier.name)?,
        ExprKind::This => match checker.current_class() {
            Some(class) => class_instance(class),
            None => return Err(invalid_this("this", &expr.span.start)),
        },
        ExprKind::Super => match checker.current_class().and_then(|class| checker.superclass_of(class)) {
            Some(superclass) => class_instance(superclass),
            None => return Err(invalid_this("super", &expr.span.start)),
        },
        ExprKind::Binary(binary) => type_check_binary(checker, binary)?,
        ExprKind::Unary(unary) => {
            let operand = type_check_expr(checker, &unary.operand)?;
            match unary.operator {
                UnaryOperator::Not => Type::Boolean,
                _ => operand,
            }
        }
        ExprKind::Postfix(postfix) => type_check_expr(checker, &postfix.operand)?,
        ExprKind::Grouping(inner) | ExprKind::Clone(inner) => type_check_expr(checker, inner)?,
        ExprKind::Ternary(ternary) => {
            type_check_expr(checker, &ternary.condition)?;
            let then_branch = type_check_expr(checker, &ternary.then_branch)?;
            let else_branch = type_check_expr(checker, &ternary.else_branch)?;
            Type::union(vec![then_branch, else_branch])
        }
        ExprKind::Assign(assign) => type_check_assign(checker, assign)?,
        ExprKind::Pipeline(pipeline) => {
            let value = type_check_expr(checker, &pipeline.value)?;
            let function = type_check_expr(checker, &pipeline.function)?;
            call_result(&function, &[(value, &*pipeline.value)], &pipeline.function.span.start)?
        }
        ExprKind::ArrayAccess(access) => {
            let target = type_check_expr(checker, &access.target)?;
            if let Some(index) = &access.index {
                type_check_expr(checker, index)?;
            }

            match target {
                Type::Any => Type::Any,
                Type::Array(element) => *element,
                other => {
                    return Err(Error::new(
                        ErrorImpl::NotAnArray { received: other },
                        access.target.span.start.clone(),
                    ))
                }
            }
        }
        ExprKind::Call(call) => {
            let callee = type_check_expr(checker, &call.callee)?;

            let mut arguments = Vec::with_capacity(call.arguments.len());
            for argument in &call.arguments {
                arguments.push((type_check_expr(checker, argument)?, argument));
            }

            call_result(&callee, &arguments, &call.callee.span.start)?
        }
        ExprKind::Get(get) => type_check_get(checker, get, &expr.span.start)?,
        ExprKind::New(new) => {
            let class = type_check_expr(checker, &new.class)?;
            for argument in &new.arguments {
                type_check_expr(checker, argument)?;
            }

            match class {
                Type::Any => Type::Any,
                Type::Instance { .. } => class,
                other => {
                    return Err(Error::new(
                        ErrorImpl::NotAnInstance { received: other },
                        new.class.span.start.clone(),
                    ))
                }
            }
        }
        ExprKind::Match(match_expr) => {
            type_check_expr(checker, &match_expr.subject)?;

            let mut branches = vec![];
            for arm in &match_expr.arms {
                for pattern in &arm.patterns {
                    type_check_expr(checker, pattern)?;
                }
                branches.push(type_check_expr(checker, &arm.body)?);
            }
            if let Some(default) = &match_expr.default {
                branches.push(type_check_expr(checker, default)?);
            }

            Type::union(branches)
        }
        ExprKind::Function(function) => {
            if let FunctionBody::Block(block) = &function.body {
                checker.index_block(&block.body);
            }

            check_function(
                checker,
                None,
                "anonymous function",
                &function.params,
                function.return_type.as_ref(),
                &function.body,
                &expr.span.start,
            )?
        }
        ExprKind::Throw(value) => {
            type_check_expr(checker, value)?;
            Type::Void
        }
    };

    checker.types.assign(expr.id, ty.clone());
    Ok(ty)
}

fn invalid_this(keyword: &str, position: &Position) -> Error {
    Error::new(
        ErrorImpl::InvalidThis {
            keyword: keyword.to_string(),
        },
        position.clone(),
    )
}

/// An empty literal is `array<void>`, which fits any array.
fn type_check_array<'a>(checker: &mut TypeChecker<'a>, elements: &'a [ArrayElement]) -> Result<Type, Error> {
    let mut values = Vec::with_capacity(elements.len());
    for element in elements {
        if let Some(key) = &element.key {
            type_check_expr(checker, key)?;
        }
        values.push(type_check_expr(checker, &element.value)?);
    }

    Ok(Type::array(Type::union(values)))
}

fn type_check_binary<'a>(checker: &mut TypeChecker<'a>, binary: &'a BinaryExpr) -> Result<Type, Error> {
    let left = type_check_expr(checker, &binary.left)?;
    let right = type_check_expr(checker, &binary.right)?;

    Ok(match binary.operator {
        operator if operator.is_boolean() => Type::Boolean,
        BinaryOperator::Instanceof => Type::Boolean,
        BinaryOperator::Concat => Type::String,
        BinaryOperator::Spaceship => Type::Int,
        BinaryOperator::Coalesce => Type::union(vec![left.non_null(), right]),
        _ => Type::Any,
    })
}

/// Plain assignment must fit the target and has the value's type; compound
/// assignment keeps the target's type.
fn type_check_assign<'a>(checker: &mut TypeChecker<'a>, assign: &'a AssignExpr) -> Result<Type, Error> {
    let target = type_check_expr(checker, &assign.target)?;
    let value = type_check_expr(checker, &assign.value)?;

    match assign.operator {
        AssignOperator::Assign => {
            if !target.contains(&value) {
                return Err(mismatch(&target, &value, &assign.value.span.start));
            }
            Ok(value)
        }
        _ => Ok(target),
    }
}

/// Result of calling a value of type `callee`. Each argument must fit the
/// parameter in its position.
fn call_result(callee: &Type, arguments: &[(Type, &Expr)], position: &Position) -> Result<Type, Error> {
    match callee {
        Type::Any => Ok(Type::Any),
        Type::Function { params, return_type } => {
            for (param, (argument, expr)) in params.iter().zip(arguments) {
                if !param.contains(argument) {
                    return Err(mismatch(param, argument, &expr.span.start));
                }
            }
            Ok((**return_type).clone())
        }
        other => Err(Error::new(
            ErrorImpl::CannotCallNonFunction { callee: other.clone() },
            position.clone(),
        )),
    }
}

/// `a.b`, `a?.b` and `A::b`. The receiver must be a class instance;
/// optional access also accepts a nullable instance and makes the result
/// nullable.
fn type_check_get<'a>(checker: &mut TypeChecker<'a>, get: &'a GetExpr, position: &Position) -> Result<Type, Error> {
    let object = type_check_expr(checker, &get.object)?;
    let receiver = match get.access {
        Access::Optional => object.non_null(),
        Access::Dot | Access::Static => object,
    };

    let class = match &receiver {
        Type::Any => return Ok(Type::Any),
        Type::Instance { class, .. } => checker.class_decl(*class),
        _ => None,
    };
    let class = match class {
        Some(class) => class,
        None => {
            return Err(Error::new(
                ErrorImpl::NotAnInstance { received: receiver },
                get.object.span.start.clone(),
            ))
        }
    };

    let member = match checker.member_type(class, &get.name, position)? {
        Some(member) => member,
        None => {
            return Err(Error::new(
                ErrorImpl::UnknownSymbol {
                    symbol: get.name.clone(),
                    class: class.name.clone(),
                },
                position.clone(),
            ))
        }
    };

    Ok(match get.access {
        Access::Optional => Type::nullable(member),
        Access::Dot | Access::Static => member,
    })
}
