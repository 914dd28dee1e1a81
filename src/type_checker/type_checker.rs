use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::{
    ast::{
        ast::{NodeId, Program, Stmt},
        expressions::Expr,
        statements::{ClassDecl, ClassMember, FunctionBody, FunctionDecl, Param},
        types::Type,
    },
    errors::errors::{Error, ErrorImpl},
    symbols::resolver::Resolution,
    Position,
};

use super::stmt::{check_function_decl, check_member, check_param, type_check_block};

/// Types computed by the checker, keyed by node.
#[derive(Debug, Default)]
pub struct TypeTable {
    types: HashMap<NodeId, Type>,
}

impl TypeTable {
    pub fn new() -> Self {
        TypeTable::default()
    }

    pub fn get(&self, id: NodeId) -> Option<&Type> {
        self.types.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.types.contains_key(&id)
    }

    /// Records the type of `id`. A node is typed exactly once.
    pub fn assign(&mut self, id: NodeId, ty: Type) {
        let previous = self.types.insert(id, ty);
        assert!(previous.is_none(), "type of {:?} assigned twice", id);
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Declarations that can be referenced before the traversal reaches them.
#[derive(Debug, Clone, Copy)]
pub(super) enum Decl<'a> {
    Function {
        function: &'a FunctionDecl,
        class: Option<&'a ClassDecl>,
    },
    Class(&'a ClassDecl),
    Member {
        member: &'a ClassMember,
        class: &'a ClassDecl,
    },
    ClassParam {
        param: &'a Param,
        class: &'a ClassDecl,
    },
}

/// What `return` statements of the function being checked are held to.
#[derive(Debug)]
pub(super) enum ReturnContext {
    Declared(Type),
    /// Block body without a return annotation; its returns are not checked.
    Unannotated,
}

pub struct TypeChecker<'a> {
    resolution: &'a Resolution,
    pub(super) types: TypeTable,
    decls: HashMap<NodeId, Decl<'a>>,
    in_progress: HashSet<NodeId>,
    pub(super) classes: Vec<&'a ClassDecl>,
    pub(super) returns: Vec<ReturnContext>,
}

impl<'a> TypeChecker<'a> {
    pub fn new(program: &'a Program, resolution: &'a Resolution) -> Self {
        let mut decls = HashMap::new();
        index_decls(&program.body, None, &mut decls);

        TypeChecker {
            resolution,
            types: TypeTable::new(),
            decls,
            in_progress: HashSet::new(),
            classes: vec![],
            returns: vec![],
        }
    }

    /// Indexes the declarations of a block that the initial pass over the
    /// program could not reach, such as a function expression's body.
    pub(super) fn index_block(&mut self, body: &'a [Stmt]) {
        let class = self.current_class();
        index_decls(body, class, &mut self.decls);
    }

    pub fn current_class(&self) -> Option<&'a ClassDecl> {
        self.classes.last().copied()
    }

    pub fn class_decl(&self, id: NodeId) -> Option<&'a ClassDecl> {
        match self.decls.get(&id) {
            Some(Decl::Class(class)) => Some(class),
            _ => None,
        }
    }

    pub fn superclass_of(&self, class: &ClassDecl) -> Option<&'a ClassDecl> {
        let superclass = class.superclass.as_ref()?;
        let binding = self.resolution.binding(superclass.name.id)?;
        self.class_decl(binding.decl)
    }

    /// Marks a declaration as being checked.
    pub(super) fn begin(&mut self, decl: NodeId) {
        self.in_progress.insert(decl);
    }

    pub(super) fn finish(&mut self, decl: NodeId) {
        self.in_progress.remove(&decl);
    }

    /// Type of the declaration an identifier expression is bound to.
    pub fn identifier_type(&mut self, expr: &Expr, name: &str) -> Result<Type, Error> {
        match self.resolution.binding(expr.id) {
            Some(binding) => {
                let decl = binding.decl;
                self.decl_type(decl, name, &expr.span.start)
            }
            None => Err(Error::new(
                ErrorImpl::UndeclaredIdentifier {
                    identifier: name.to_string(),
                },
                expr.span.start.clone(),
            )),
        }
    }

    /// Type of `decl`, checking hoisted functions and class members first
    /// when the traversal has not reached them yet.
    pub fn decl_type(&mut self, decl: NodeId, name: &str, position: &Position) -> Result<Type, Error> {
        if let Some(ty) = self.types.get(decl) {
            return Ok(ty.clone());
        }

        if let Some(external) = self.resolution.external(decl) {
            return Ok(external.declared_type.clone());
        }

        let entry = match self.decls.get(&decl) {
            Some(entry) => *entry,
            None => return Err(unchecked(name, position)),
        };

        if let Decl::Class(class) = entry {
            return Ok(class_instance(class));
        }

        if self.in_progress.contains(&decl) {
            return match self.signature(entry) {
                Some(ty) => Ok(ty),
                None => Err(Error::new(
                    ErrorImpl::RecursiveType {
                        name: name.to_string(),
                    },
                    position.clone(),
                )),
            };
        }

        trace!(decl = ?decl, name, "check declaration on demand");
        match entry {
            Decl::Function { function, class } => {
                self.with_context(class, |checker| check_function_decl(checker, function))?
            }
            Decl::Member { member, class } => {
                self.with_context(Some(class), |checker| check_member(checker, member))?
            }
            Decl::ClassParam { param, class } => {
                self.with_context(Some(class), |checker| check_param(checker, param).map(|_| ()))?
            }
            Decl::Class(_) => {}
        }

        self.types.get(decl).cloned().ok_or_else(|| unchecked(name, position))
    }

    /// The annotated type of a declaration, used while its own body is
    /// still being checked.
    fn signature(&self, entry: Decl<'a>) -> Option<Type> {
        let function = |params: &[Param], return_type: Option<&Type>| {
            let return_type = self.resolve_annotation(return_type?);
            let params = params
                .iter()
                .map(|param| self.annotation_or_any(param.annotation.as_ref()))
                .collect();
            Some(Type::function(params, return_type))
        };

        match entry {
            Decl::Function { function: decl, .. } => function(&decl.params, decl.return_type.as_ref()),
            Decl::Member { member, .. } => match member {
                ClassMember::Property(property) => property.annotation.as_ref().map(|ty| self.resolve_annotation(ty)),
                ClassMember::Const(constant) => constant.annotation.as_ref().map(|ty| self.resolve_annotation(ty)),
                ClassMember::Method(method) => function(&method.params, method.return_type.as_ref()),
                ClassMember::AbstractMethod(method) => function(&method.params, method.return_type.as_ref()),
                ClassMember::Initializer(_) => None,
            },
            Decl::ClassParam { param, .. } => param.annotation.as_ref().map(|ty| self.resolve_annotation(ty)),
            Decl::Class(class) => Some(class_instance(class)),
        }
    }

    /// Runs `f` as if directly inside `class` and outside any function.
    fn with_context<F>(&mut self, class: Option<&'a ClassDecl>, f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Error>,
    {
        let classes = std::mem::replace(&mut self.classes, class.into_iter().collect());
        let returns = std::mem::take(&mut self.returns);

        let result = f(self);

        self.classes = classes;
        self.returns = returns;
        result
    }

    /// Looks `name` up in `class` and then along its superclass chain.
    pub fn member_type(&mut self, class: &'a ClassDecl, name: &str, position: &Position) -> Result<Option<Type>, Error> {
        let mut visited = HashSet::new();
        let mut current = Some(class);

        while let Some(class) = current {
            if !visited.insert(class.id) {
                break;
            }

            if let Some(decl) = class.table.lookup(name) {
                return self.decl_type(decl, name, position).map(Some);
            }

            current = self.superclass_of(class);
        }

        Ok(None)
    }

    /// Turns a parsed annotation into a checked type: `array<T>` becomes an
    /// array type and class names become instances. Unknown names are kept.
    pub fn resolve_annotation(&self, ty: &Type) -> Type {
        match ty {
            Type::Identifier { name, generics } if name == "array" => Type::array(
                generics
                    .first()
                    .map(|element| self.resolve_annotation(element))
                    .unwrap_or(Type::Any),
            ),
            Type::Identifier { name, generics } => {
                let class = self
                    .resolution
                    .hoisted()
                    .lookup(name)
                    .and_then(|decl| self.class_decl(decl));

                match class {
                    Some(class) => class_instance(class),
                    None => Type::Identifier {
                        name: name.clone(),
                        generics: generics.iter().map(|generic| self.resolve_annotation(generic)).collect(),
                    },
                }
            }
            Type::Array(element) => Type::array(self.resolve_annotation(element)),
            Type::Nullable(inner) => Type::nullable(self.resolve_annotation(inner)),
            Type::Union(members) => Type::union(members.iter().map(|member| self.resolve_annotation(member)).collect()),
            Type::Intersection(members) => {
                Type::intersection(members.iter().map(|member| self.resolve_annotation(member)).collect())
            }
            Type::Function { params, return_type } => Type::function(
                params.iter().map(|param| self.resolve_annotation(param)).collect(),
                self.resolve_annotation(return_type),
            ),
            other => other.clone(),
        }
    }

    pub fn annotation_or_any(&self, annotation: Option<&Type>) -> Type {
        annotation.map(|ty| self.resolve_annotation(ty)).unwrap_or(Type::Any)
    }
}

pub(super) fn class_instance(class: &ClassDecl) -> Type {
    Type::Instance {
        class: class.id,
        name: class.name.clone(),
    }
}

pub(super) fn mismatch(expected: &Type, received: &Type, position: &Position) -> Error {
    Error::new(
        ErrorImpl::TypeMismatch {
            expected: expected.clone(),
            received: received.clone(),
        },
        position.clone(),
    )
}

fn unchecked(name: &str, position: &Position) -> Error {
    Error::new(
        ErrorImpl::UncheckedDeclaration {
            name: name.to_string(),
        },
        position.clone(),
    )
}

fn index_decls<'a>(body: &'a [Stmt], class: Option<&'a ClassDecl>, decls: &mut HashMap<NodeId, Decl<'a>>) {
    for stmt in body {
        index_stmt(stmt, class, decls);
    }
}

fn index_function_body<'a>(body: &'a FunctionBody, class: Option<&'a ClassDecl>, decls: &mut HashMap<NodeId, Decl<'a>>) {
    if let FunctionBody::Block(block) = body {
        index_decls(&block.body, class, decls);
    }
}

fn index_stmt<'a>(stmt: &'a Stmt, class: Option<&'a ClassDecl>, decls: &mut HashMap<NodeId, Decl<'a>>) {
    match stmt {
        Stmt::Function(function) => {
            decls.insert(function.id, Decl::Function { function, class });
            index_function_body(&function.body, class, decls);
        }
        Stmt::Class(class_decl) => {
            decls.insert(class_decl.id, Decl::Class(class_decl));

            for param in &class_decl.params {
                decls.insert(param.id, Decl::ClassParam { param, class: class_decl });
            }

            for member in &class_decl.members {
                match member {
                    ClassMember::Initializer(initializer) => {
                        index_decls(&initializer.body.body, Some(class_decl), decls);
                    }
                    ClassMember::Method(method) => {
                        decls.insert(method.id, Decl::Member { member, class: class_decl });
                        index_function_body(&method.body, Some(class_decl), decls);
                    }
                    _ => {
                        decls.insert(member.id(), Decl::Member { member, class: class_decl });
                    }
                }
            }
        }
        Stmt::If(stmt) => {
            index_stmt(&stmt.then_branch, class, decls);
            if let Some(else_branch) = &stmt.else_branch {
                index_stmt(else_branch, class, decls);
            }
        }
        Stmt::While(stmt) => index_stmt(&stmt.body, class, decls),
        Stmt::For(stmt) => index_stmt(&stmt.body, class, decls),
        Stmt::Foreach(stmt) => index_stmt(&stmt.body, class, decls),
        Stmt::Try(stmt) => {
            index_decls(&stmt.body.body, class, decls);
            for catch in &stmt.catches {
                index_decls(&catch.body.body, class, decls);
            }
            if let Some(finally) = &stmt.finally {
                index_decls(&finally.body, class, decls);
            }
        }
        Stmt::Block(block) => index_decls(&block.body, class, decls),
        Stmt::Expression(_)
        | Stmt::Var(_)
        | Stmt::VarDestructuring(_)
        | Stmt::Throw(_)
        | Stmt::Return(_)
        | Stmt::Echo(_) => {}
    }
}

/// Type checks a resolved program.
///
/// Every expression and declaration receives exactly one entry in the
/// returned table. The first violation is returned as an error.
pub fn type_check(program: &Program, resolution: &Resolution) -> Result<TypeTable, Error> {
    let mut checker = TypeChecker::new(program, resolution);

    type_check_block(&mut checker, &program.body)?;
    checker.types.assign(program.id, Type::Void);

    debug!(types = checker.types.len(), "type checked program");
    Ok(checker.types)
}
