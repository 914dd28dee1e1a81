//! Name resolution pass.
//!
//! Walks a parsed program once, in document order, and binds every
//! identifier expression to the node declaring its name. Bindings are kept
//! in a side table keyed by the identifier's `NodeId`; the tree itself is
//! not modified.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::{
    ast::{
        ast::{NodeId, Program, Stmt},
        expressions::{Expr, ExprKind, FunctionExpr, TemplatePart},
        statements::{
            ClassDecl, ClassMember, Destructuring, ForeachValue, FunctionBody, Param,
        },
        types::Type,
    },
    errors::errors::{Error, ErrorImpl},
    Span,
};

use super::{
    scope::{Binding, BindingKind, Capture, Scope, ScopeStack},
    table::SymbolTable,
};

/// Supplies a type for names that have no declaration in the program.
pub type DefaultResolver = Box<dyn Fn(&str) -> Option<Type>>;

#[derive(Default)]
pub struct ResolveOptions {
    /// Declarations shared from other compilation units. Declarations of
    /// the program itself take precedence.
    pub hoisted: Option<SymbolTable>,
    /// Consulted when a name cannot be found in any scope. Without one, such
    /// names are an error.
    pub default_resolver: Option<DefaultResolver>,
}

/// Synthetic declaration created for a name supplied by the default resolver.
#[derive(Debug, Clone)]
pub struct ExternalDecl {
    pub name: String,
    pub declared_type: Type,
}

#[derive(Debug, Default)]
pub struct Resolution {
    bindings: HashMap<NodeId, Binding>,
    captures: HashMap<NodeId, Vec<Capture>>,
    externals: HashMap<NodeId, ExternalDecl>,
    hoisted: SymbolTable,
}

impl Resolution {
    /// Binding of the identifier expression `id`.
    pub fn binding(&self, id: NodeId) -> Option<&Binding> {
        self.bindings.get(&id)
    }

    /// Names the function expression `id` reads from enclosing scopes, in
    /// order of first use.
    pub fn captures(&self, id: NodeId) -> &[Capture] {
        self.captures.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn external(&self, id: NodeId) -> Option<&ExternalDecl> {
        self.externals.get(&id)
    }

    /// The hoisted table after resolution, including declarations that were
    /// registered while walking the program.
    pub fn hoisted(&self) -> &SymbolTable {
        &self.hoisted
    }
}

struct Resolver<'a> {
    scopes: ScopeStack<'a>,
    bindings: HashMap<NodeId, Binding>,
    captures: HashMap<NodeId, Vec<Capture>>,
    externals: HashMap<NodeId, ExternalDecl>,
    external_names: HashMap<String, NodeId>,
    default_resolver: Option<DefaultResolver>,
    next_id: NodeId,
}

/// Resolves every identifier of `program`.
///
/// The first identifier that cannot be resolved fails the pass with
/// `UndeclaredIdentifier`.
pub fn resolve(program: &Program, options: ResolveOptions) -> Result<Resolution, Error> {
    let mut hoisted = options.hoisted.unwrap_or_default();
    for (name, decl) in program.environment.hoisted.iter() {
        hoisted.insert(name.clone(), *decl);
    }

    let mut resolver = Resolver {
        scopes: ScopeStack::new(hoisted),
        bindings: HashMap::new(),
        captures: HashMap::new(),
        externals: HashMap::new(),
        external_names: HashMap::new(),
        default_resolver: options.default_resolver,
        next_id: program.next_id,
    };

    // Top-level functions and classes are visible before their declaration
    // even when the program carries no environment.
    for stmt in &program.body {
        match stmt {
            Stmt::Function(function) => resolver.scopes.declare_hoisted(&function.name, function.id),
            Stmt::Class(class) => resolver.scopes.declare_hoisted(&class.name, class.id),
            _ => {}
        }
    }

    resolver.scopes.push(Scope::Local(SymbolTable::new()));
    for stmt in &program.body {
        resolver.resolve_stmt(stmt)?;
    }
    resolver.scopes.pop();

    debug!(
        bindings = resolver.bindings.len(),
        externals = resolver.externals.len(),
        "resolved program"
    );

    Ok(Resolution {
        bindings: resolver.bindings,
        captures: resolver.captures,
        externals: resolver.externals,
        hoisted: resolver.scopes.into_hoisted(),
    })
}

impl<'a> Resolver<'a> {
    fn resolve_stmt(&mut self, stmt: &'a Stmt) -> Result<(), Error> {
        match stmt {
            Stmt::Expression(stmt) => self.resolve_expr(&stmt.expression),
            Stmt::Var(var) => {
                if let Some(initializer) = &var.initializer {
                    self.resolve_expr(initializer)?;
                }
                self.scopes.declare(&var.name, var.id);
                Ok(())
            }
            Stmt::VarDestructuring(var) => {
                self.resolve_expr(&var.initializer)?;
                self.resolve_destructuring(&var.destructuring)
            }
            Stmt::Function(function) => {
                self.scopes.declare_hoisted(&function.name, function.id);
                self.resolve_function(&function.params, &function.body)
            }
            Stmt::Class(class) => {
                self.scopes.declare_hoisted(&class.name, class.id);
                self.resolve_class(class)
            }
            Stmt::If(stmt) => {
                self.resolve_expr(&stmt.condition)?;
                self.resolve_stmt(&stmt.then_branch)?;
                if let Some(else_branch) = &stmt.else_branch {
                    self.resolve_stmt(else_branch)?;
                }
                Ok(())
            }
            Stmt::While(stmt) => {
                self.resolve_expr(&stmt.condition)?;
                self.resolve_stmt(&stmt.body)
            }
            Stmt::For(stmt) => {
                if let Some(initializer) = &stmt.initializer {
                    self.resolve_stmt(initializer)?;
                }
                if let Some(condition) = &stmt.condition {
                    self.resolve_expr(condition)?;
                }
                if let Some(step) = &stmt.step {
                    self.resolve_expr(step)?;
                }
                self.resolve_stmt(&stmt.body)
            }
            Stmt::Foreach(stmt) => {
                self.resolve_expr(&stmt.iterable)?;
                if let Some(key) = &stmt.key {
                    self.scopes.declare(&key.name, key.id);
                }
                match &stmt.value {
                    ForeachValue::Variable(variable) => self.scopes.declare(&variable.name, variable.id),
                    ForeachValue::Destructuring(destructuring) => self.resolve_destructuring(destructuring)?,
                }
                self.resolve_stmt(&stmt.body)
            }
            Stmt::Try(stmt) => {
                self.resolve_block(&stmt.body.body)?;
                for catch in &stmt.catches {
                    self.scopes.declare(&catch.name, catch.id);
                    self.resolve_block(&catch.body.body)?;
                }
                if let Some(finally) = &stmt.finally {
                    self.resolve_block(&finally.body)?;
                }
                Ok(())
            }
            Stmt::Throw(stmt) => self.resolve_expr(&stmt.value),
            Stmt::Return(stmt) => match &stmt.value {
                Some(value) => self.resolve_expr(value),
                None => Ok(()),
            },
            Stmt::Echo(stmt) => {
                for value in &stmt.values {
                    self.resolve_expr(value)?;
                }
                Ok(())
            }
            // Blocks share the scope of the enclosing function.
            Stmt::Block(block) => self.resolve_block(&block.body),
        }
    }

    fn resolve_block(&mut self, body: &'a [Stmt]) -> Result<(), Error> {
        for stmt in body {
            self.resolve_stmt(stmt)?;
        }
        Ok(())
    }

    fn resolve_destructuring(&mut self, destructuring: &'a Destructuring) -> Result<(), Error> {
        for element in &destructuring.elements {
            if let Some(key) = &element.key {
                self.resolve_expr(key)?;
            }
            self.scopes.declare(&element.name, element.id);
        }
        Ok(())
    }

    fn resolve_defaults(&mut self, params: &'a [Param]) -> Result<(), Error> {
        for param in params {
            if let Some(default) = &param.default {
                self.resolve_expr(default)?;
            }
        }
        Ok(())
    }

    fn resolve_body(&mut self, body: &'a FunctionBody) -> Result<(), Error> {
        match body {
            FunctionBody::Expression(expr) => self.resolve_expr(expr),
            FunctionBody::Block(block) => self.resolve_block(&block.body),
        }
    }

    fn resolve_function(&mut self, params: &'a [Param], body: &'a FunctionBody) -> Result<(), Error> {
        self.resolve_defaults(params)?;

        self.scopes.push(Scope::Local(param_table(params.iter())));
        let result = self.resolve_body(body);
        self.scopes.pop();
        result
    }

    fn resolve_function_expr(&mut self, id: NodeId, function: &'a FunctionExpr) -> Result<(), Error> {
        self.resolve_defaults(&function.params)?;

        self.scopes.push(Scope::closure(id, param_table(function.params.iter())));
        let result = self.resolve_body(&function.body);

        if let Some(Scope::Closure { captures, .. }) = self.scopes.pop() {
            if !captures.is_empty() {
                self.captures.insert(id, captures);
            }
        }
        result
    }

    fn resolve_class(&mut self, class: &'a ClassDecl) -> Result<(), Error> {
        trace!(class = %class.name, "resolve class");

        if let Some(superclass) = &class.superclass {
            self.resolve_expr(&superclass.name)?;
        }

        self.scopes.push(Scope::Class {
            class: class.id,
            table: &class.table,
        });
        let result = self.resolve_class_body(class);
        self.scopes.pop();
        result
    }

    fn resolve_class_body(&mut self, class: &'a ClassDecl) -> Result<(), Error> {
        self.resolve_defaults(&class.params)?;

        // Promoted parameters live in the class table already.
        let constructor_params = || class.params.iter().filter(|param| param.promotion.is_none());

        if let Some(superclass) = &class.superclass {
            self.with_constructor_scope(param_table(constructor_params()), |resolver| {
                for argument in &superclass.arguments {
                    resolver.resolve_expr(argument)?;
                }
                Ok(())
            })?;
        }

        if let Some(iterates) = &class.iterates {
            self.resolve_expr(iterates)?;
        }

        for member in &class.members {
            match member {
                ClassMember::Property(property) => {
                    if let Some(initializer) = &property.initializer {
                        self.with_constructor_scope(param_table(constructor_params()), |resolver| {
                            resolver.resolve_expr(initializer)
                        })?;
                    }
                }
                ClassMember::Const(constant) => {
                    self.with_constructor_scope(param_table(constructor_params()), |resolver| {
                        resolver.resolve_expr(&constant.value)
                    })?;
                }
                ClassMember::Initializer(initializer) => {
                    self.with_constructor_scope(param_table(constructor_params()), |resolver| {
                        resolver.resolve_block(&initializer.body.body)
                    })?;
                }
                ClassMember::Method(method) => self.resolve_function(&method.params, &method.body)?,
                ClassMember::AbstractMethod(method) => self.resolve_defaults(&method.params)?,
            }
        }

        Ok(())
    }

    fn with_constructor_scope<F>(&mut self, params: SymbolTable, f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Error>,
    {
        self.scopes.push(Scope::Local(params));
        let result = f(self);
        self.scopes.pop();
        result
    }

    fn resolve_expr(&mut self, expr: &'a Expr) -> Result<(), Error> {
        match &expr.kind {
            ExprKind::Null
            | ExprKind::Boolean(_)
            | ExprKind::Number(_)
            | ExprKind::String(_)
            | ExprKind::This
            | ExprKind::Super => Ok(()),
            ExprKind::Template(parts) => {
                for part in parts {
                    if let TemplatePart::Expression(part) = part {
                        self.resolve_expr(part)?;
                    }
                }
                Ok(())
            }
            ExprKind::Array(elements) => {
                for element in elements {
                    if let Some(key) = &element.key {
                        self.resolve_expr(key)?;
                    }
                    self.resolve_expr(&element.value)?;
                }
                Ok(())
            }
            ExprKind::Identifier(identifier) => self.resolve_identifier(expr.id, &identifier.name, &expr.span),
            ExprKind::Binary(binary) => {
                self.resolve_expr(&binary.left)?;
                self.resolve_expr(&binary.right)
            }
            ExprKind::Unary(unary) => self.resolve_expr(&unary.operand),
            ExprKind::Postfix(postfix) => self.resolve_expr(&postfix.operand),
            ExprKind::Grouping(inner) | ExprKind::Clone(inner) | ExprKind::Throw(inner) => self.resolve_expr(inner),
            ExprKind::Ternary(ternary) => {
                self.resolve_expr(&ternary.condition)?;
                self.resolve_expr(&ternary.then_branch)?;
                self.resolve_expr(&ternary.else_branch)
            }
            ExprKind::Assign(assign) => {
                self.resolve_expr(&assign.target)?;
                self.resolve_expr(&assign.value)
            }
            ExprKind::Pipeline(pipeline) => {
                self.resolve_expr(&pipeline.value)?;
                self.resolve_expr(&pipeline.function)
            }
            ExprKind::ArrayAccess(access) => {
                self.resolve_expr(&access.target)?;
                if let Some(index) = &access.index {
                    self.resolve_expr(index)?;
                }
                Ok(())
            }
            ExprKind::Call(call) => {
                self.resolve_expr(&call.callee)?;
                for argument in &call.arguments {
                    self.resolve_expr(argument)?;
                }
                Ok(())
            }
            // Member names are looked up by the type checker.
            ExprKind::Get(get) => self.resolve_expr(&get.object),
            ExprKind::New(new) => {
                self.resolve_expr(&new.class)?;
                for argument in &new.arguments {
                    self.resolve_expr(argument)?;
                }
                Ok(())
            }
            ExprKind::Match(match_expr) => {
                self.resolve_expr(&match_expr.subject)?;
                for arm in &match_expr.arms {
                    for pattern in &arm.patterns {
                        self.resolve_expr(pattern)?;
                    }
                    self.resolve_expr(&arm.body)?;
                }
                if let Some(default) = &match_expr.default {
                    self.resolve_expr(default)?;
                }
                Ok(())
            }
            ExprKind::Function(function) => self.resolve_function_expr(expr.id, function),
        }
    }

    fn resolve_identifier(&mut self, id: NodeId, name: &str, span: &Span) -> Result<(), Error> {
        if let Some(binding) = self.scopes.lookup(name) {
            self.bindings.insert(id, binding);
            return Ok(());
        }

        if let Some(decl) = self.external_decl(name) {
            self.bindings.insert(
                id,
                Binding {
                    decl,
                    kind: BindingKind::External,
                },
            );
            return Ok(());
        }

        Err(Error::new(
            ErrorImpl::UndeclaredIdentifier {
                identifier: name.to_string(),
            },
            span.start.clone(),
        ))
    }

    fn external_decl(&mut self, name: &str) -> Option<NodeId> {
        if let Some(decl) = self.external_names.get(name) {
            return Some(*decl);
        }

        let declared_type = (self.default_resolver.as_ref()?)(name)?;
        let decl = self.next_id;
        self.next_id = NodeId(decl.0 + 1);

        trace!(name, decl = ?decl, "external declaration");
        self.external_names.insert(name.to_string(), decl);
        self.externals.insert(
            decl,
            ExternalDecl {
                name: name.to_string(),
                declared_type,
            },
        );
        Some(decl)
    }
}

fn param_table<'p>(params: impl Iterator<Item = &'p Param>) -> SymbolTable {
    let mut table = SymbolTable::new();
    for param in params {
        table.insert(param.name.as_str(), param.id);
    }
    table
}
