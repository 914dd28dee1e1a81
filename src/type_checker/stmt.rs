use crate::{
    ast::{
        ast::{NodeId, Stmt},
        expressions::Expr,
        statements::{
            ClassDecl, ClassMember, Destructuring, ForeachValue, FunctionBody, FunctionDecl, Param,
        },
        types::Type,
    },
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::{
    expr::type_check_expr,
    type_checker::{class_instance, mismatch, ReturnContext, TypeChecker},
};

pub fn type_check_block<'a>(checker: &mut TypeChecker<'a>, body: &'a [Stmt]) -> Result<(), Error> {
    for stmt in body {
        type_check_stmt(checker, stmt)?;
    }
    Ok(())
}

pub fn type_check_stmt<'a>(checker: &mut TypeChecker<'a>, stmt: &'a Stmt) -> Result<(), Error> {
    match stmt {
        Stmt::Expression(stmt) => type_check_expr(checker, &stmt.expression).map(|_| ()),
        Stmt::Var(var) => {
            let ty = check_declared(checker, var.annotation.as_ref(), var.initializer.as_ref())?;
            checker.types.assign(var.id, ty);
            Ok(())
        }
        Stmt::VarDestructuring(var) => {
            let value = type_check_expr(checker, &var.initializer)?;
            check_destructuring(checker, &var.destructuring, &value)
        }
        Stmt::Function(function) => {
            if checker.types.contains(function.id) {
                return Ok(());
            }
            check_function_decl(checker, function)
        }
        Stmt::Class(class) => check_class(checker, class),
        Stmt::If(stmt) => {
            type_check_expr(checker, &stmt.condition)?;
            type_check_stmt(checker, &stmt.then_branch)?;
            if let Some(else_branch) = &stmt.else_branch {
                type_check_stmt(checker, else_branch)?;
            }
            Ok(())
        }
        Stmt::While(stmt) => {
            type_check_expr(checker, &stmt.condition)?;
            type_check_stmt(checker, &stmt.body)
        }
        Stmt::For(stmt) => {
            if let Some(initializer) = &stmt.initializer {
                type_check_stmt(checker, initializer)?;
            }
            if let Some(condition) = &stmt.condition {
                type_check_expr(checker, condition)?;
            }
            if let Some(step) = &stmt.step {
                type_check_expr(checker, step)?;
            }
            type_check_stmt(checker, &stmt.body)
        }
        Stmt::Foreach(stmt) => {
            let iterable = type_check_expr(checker, &stmt.iterable)?;
            let value = element_or_any(&iterable);

            if let Some(key) = &stmt.key {
                let key_type = match &iterable {
                    Type::Array(_) => Type::union(vec![Type::Int, Type::String]),
                    _ => Type::Any,
                };
                checker.types.assign(key.id, key_type);
            }

            match &stmt.value {
                ForeachValue::Variable(variable) => checker.types.assign(variable.id, value),
                ForeachValue::Destructuring(destructuring) => check_destructuring(checker, destructuring, &value)?,
            }

            type_check_stmt(checker, &stmt.body)
        }
        Stmt::Try(stmt) => {
            type_check_block(checker, &stmt.body.body)?;

            for catch in &stmt.catches {
                let caught = Type::union(catch.types.iter().map(|ty| checker.resolve_annotation(ty)).collect());
                checker.types.assign(catch.id, caught);
                type_check_block(checker, &catch.body.body)?;
            }

            if let Some(finally) = &stmt.finally {
                type_check_block(checker, &finally.body)?;
            }
            Ok(())
        }
        Stmt::Throw(stmt) => type_check_expr(checker, &stmt.value).map(|_| ()),
        Stmt::Return(stmt) => {
            let value = match &stmt.value {
                Some(value) => Some((type_check_expr(checker, value)?, value)),
                None => None,
            };

            if let Some(ReturnContext::Declared(expected)) = checker.returns.last() {
                let (received, position) = match &value {
                    Some((ty, expr)) => (ty.clone(), &expr.span.start),
                    None => (Type::Void, &stmt.span.start),
                };

                if !expected.contains(&received) {
                    return Err(mismatch(expected, &received, position));
                }
            }
            Ok(())
        }
        Stmt::Echo(stmt) => {
            for value in &stmt.values {
                type_check_expr(checker, value)?;
            }
            Ok(())
        }
        Stmt::Block(block) => type_check_block(checker, &block.body),
    }
}

/// Shared rule for `var`, properties and consts: the value must fit the
/// annotation, which is then the declared type. Without an annotation the
/// value's type is used, and `any` when there is no value either.
fn check_declared<'a>(
    checker: &mut TypeChecker<'a>,
    annotation: Option<&Type>,
    initializer: Option<&'a Expr>,
) -> Result<Type, Error> {
    let value = match initializer {
        Some(initializer) => Some((type_check_expr(checker, initializer)?, initializer)),
        None => None,
    };

    match annotation {
        Some(annotation) => {
            let annotation = checker.resolve_annotation(annotation);
            if let Some((value, initializer)) = &value {
                if !annotation.contains(value) {
                    return Err(mismatch(&annotation, value, &initializer.span.start));
                }
            }
            Ok(annotation)
        }
        // `var a = []` may still receive elements of any type.
        None => Ok(match value {
            Some((Type::Array(element), _)) if matches!(*element, Type::Void) => Type::array(Type::Any),
            Some((ty, _)) => ty,
            None => Type::Any,
        }),
    }
}

/// Element type of an iterated or destructured value.
fn element_or_any(ty: &Type) -> Type {
    match ty.element_type() {
        Some(Type::Void) | None => Type::Any,
        Some(element) => element.clone(),
    }
}

fn check_destructuring<'a>(checker: &mut TypeChecker<'a>, destructuring: &'a Destructuring, value: &Type) -> Result<(), Error> {
    let element = element_or_any(value);

    for item in &destructuring.elements {
        if let Some(key) = &item.key {
            type_check_expr(checker, key)?;
        }
        checker.types.assign(item.id, element.clone());
    }
    Ok(())
}

/// Parameters are typed by their annotation, or `any`. A default value must
/// fit the annotation.
pub fn check_param<'a>(checker: &mut TypeChecker<'a>, param: &'a Param) -> Result<Type, Error> {
    if let Some(ty) = checker.types.get(param.id) {
        return Ok(ty.clone());
    }

    checker.begin(param.id);
    let result = check_param_default(checker, param);
    checker.finish(param.id);

    let ty = result?;
    checker.types.assign(param.id, ty.clone());
    Ok(ty)
}

fn check_param_default<'a>(checker: &mut TypeChecker<'a>, param: &'a Param) -> Result<Type, Error> {
    let ty = checker.annotation_or_any(param.annotation.as_ref());

    if let Some(default) = &param.default {
        let value = type_check_expr(checker, default)?;
        if !ty.contains(&value) {
            return Err(mismatch(&ty, &value, &default.span.start));
        }
    }

    Ok(ty)
}

pub fn check_function_decl<'a>(checker: &mut TypeChecker<'a>, function: &'a FunctionDecl) -> Result<(), Error> {
    check_function(
        checker,
        Some(function.id),
        &function.name,
        &function.params,
        function.return_type.as_ref(),
        &function.body,
        &function.span.start,
    )
    .map(|_| ())
}

/// Checks a function, method or function expression and returns its
/// function type. With `decl` set the type is also recorded for that
/// declaration; an annotated return type is recorded before the body is
/// checked so the body may refer to the function itself.
pub fn check_function<'a>(
    checker: &mut TypeChecker<'a>,
    decl: Option<NodeId>,
    name: &str,
    params: &'a [Param],
    return_type: Option<&'a Type>,
    body: &'a FunctionBody,
    position: &Position,
) -> Result<Type, Error> {
    if let Some(decl) = decl {
        checker.begin(decl);
    }

    let result = check_function_signature(checker, decl, name, params, return_type, body, position);

    if let Some(decl) = decl {
        checker.finish(decl);
    }
    result
}

fn check_function_signature<'a>(
    checker: &mut TypeChecker<'a>,
    decl: Option<NodeId>,
    name: &str,
    params: &'a [Param],
    return_type: Option<&'a Type>,
    body: &'a FunctionBody,
    position: &Position,
) -> Result<Type, Error> {
    let mut param_types = Vec::with_capacity(params.len());
    for param in params {
        param_types.push(check_param(checker, param)?);
    }

    if let Some(annotation) = return_type {
        let return_type = checker.resolve_annotation(annotation);
        let ty = Type::function(param_types, return_type.clone());
        if let Some(decl) = decl {
            checker.types.assign(decl, ty.clone());
        }

        checker.returns.push(ReturnContext::Declared(return_type.clone()));
        let result = check_body(checker, body);
        checker.returns.pop();

        if let (Some(value), FunctionBody::Expression(expr)) = (result?, body) {
            if !return_type.contains(&value) {
                return Err(mismatch(&return_type, &value, &expr.span.start));
            }
        }

        return Ok(ty);
    }

    checker.returns.push(ReturnContext::Unannotated);
    let result = check_body(checker, body);
    checker.returns.pop();

    // Only an expression body gives a return type to infer from.
    let return_type = match result? {
        Some(value) => value,
        None => {
            return Err(Error::new(
                ErrorImpl::CannotInferReturnType {
                    function: name.to_string(),
                },
                position.clone(),
            ))
        }
    };

    let ty = Type::function(param_types, return_type);
    if let Some(decl) = decl {
        checker.types.assign(decl, ty.clone());
    }
    Ok(ty)
}

/// The type of an expression body; block bodies have none.
fn check_body<'a>(checker: &mut TypeChecker<'a>, body: &'a FunctionBody) -> Result<Option<Type>, Error> {
    match body {
        FunctionBody::Expression(expr) => type_check_expr(checker, expr).map(Some),
        FunctionBody::Block(block) => type_check_block(checker, &block.body).map(|_| None),
    }
}

fn check_class<'a>(checker: &mut TypeChecker<'a>, class: &'a ClassDecl) -> Result<(), Error> {
    checker.types.assign(class.id, class_instance(class));

    if let Some(superclass) = &class.superclass {
        type_check_expr(checker, &superclass.name)?;
    }

    checker.classes.push(class);
    let result = check_class_body(checker, class);
    checker.classes.pop();
    result
}

fn check_class_body<'a>(checker: &mut TypeChecker<'a>, class: &'a ClassDecl) -> Result<(), Error> {
    for param in &class.params {
        check_param(checker, param)?;
    }

    if let Some(superclass) = &class.superclass {
        for argument in &superclass.arguments {
            type_check_expr(checker, argument)?;
        }
    }

    if let Some(iterates) = &class.iterates {
        type_check_expr(checker, iterates)?;
    }

    for member in &class.members {
        if !checker.types.contains(member.id()) {
            check_member(checker, member)?;
        }
    }

    Ok(())
}

/// Checks one class member. The enclosing class must be current.
pub fn check_member<'a>(checker: &mut TypeChecker<'a>, member: &'a ClassMember) -> Result<(), Error> {
    match member {
        ClassMember::Property(property) => {
            checker.begin(property.id);
            let result = check_declared(checker, property.annotation.as_ref(), property.initializer.as_ref());
            checker.finish(property.id);

            checker.types.assign(property.id, result?);
        }
        ClassMember::Const(constant) => {
            checker.begin(constant.id);
            let result = check_declared(checker, constant.annotation.as_ref(), Some(&constant.value));
            checker.finish(constant.id);

            checker.types.assign(constant.id, result?);
        }
        ClassMember::Method(method) => {
            check_function(
                checker,
                Some(method.id),
                &method.name,
                &method.params,
                method.return_type.as_ref(),
                &method.body,
                &method.span.start,
            )?;
        }
        ClassMember::AbstractMethod(method) => {
            let mut params = Vec::with_capacity(method.params.len());
            for param in &method.params {
                params.push(check_param(checker, param)?);
            }

            let return_type = checker.annotation_or_any(method.return_type.as_ref());
            checker.types.assign(method.id, Type::function(params, return_type));
        }
        ClassMember::Initializer(initializer) => {
            checker.returns.push(ReturnContext::Declared(Type::Void));
            let result = type_check_block(checker, &initializer.body.body);
            checker.returns.pop();

            result?;
            checker.types.assign(initializer.id, Type::Void);
        }
    }

    Ok(())
}
