//! Scope kinds and the resolution stack.
//!
//! The stack always holds the hoisted table at the bottom. Lookups walk it
//! from the top down and stop at the first table declaring the name. A name
//! found in a local or closure table below one or more closures is a capture
//! of every closure passed on the way down.

use tracing::trace;

use crate::ast::ast::NodeId;

use super::table::SymbolTable;

/// How an identifier reached its declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// Declared in the innermost function, closure or program scope.
    Local,
    /// Declared in a function scope enclosing the current closure.
    Captured,
    /// A member or promoted parameter of an enclosing class.
    Member,
    /// A top-level function or class.
    Hoisted,
    /// Supplied by the default resolver.
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub decl: NodeId,
    pub kind: BindingKind,
}

/// A name a function expression reads from an enclosing scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub name: String,
    pub decl: NodeId,
}

#[derive(Debug)]
pub enum Scope<'a> {
    Hoisted(SymbolTable),
    /// Borrowed from the class declaration, filled in by the parser.
    Class {
        class: NodeId,
        table: &'a SymbolTable,
    },
    Local(SymbolTable),
    Closure {
        function: NodeId,
        table: SymbolTable,
        captures: Vec<Capture>,
    },
}

impl<'a> Scope<'a> {
    pub fn closure(function: NodeId, table: SymbolTable) -> Self {
        Scope::Closure {
            function,
            table,
            captures: vec![],
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Scope::Hoisted(_) => "hoisted",
            Scope::Class { .. } => "class",
            Scope::Local(_) => "local",
            Scope::Closure { .. } => "closure",
        }
    }
}

#[derive(Debug)]
pub struct ScopeStack<'a> {
    scopes: Vec<Scope<'a>>,
}

impl<'a> ScopeStack<'a> {
    pub fn new(hoisted: SymbolTable) -> Self {
        ScopeStack {
            scopes: vec![Scope::Hoisted(hoisted)],
        }
    }

    pub fn push(&mut self, scope: Scope<'a>) {
        trace!(kind = scope.name(), depth = self.scopes.len(), "push scope");
        self.scopes.push(scope);
    }

    /// Pops the current scope. The hoisted table is never popped.
    pub fn pop(&mut self) -> Option<Scope<'a>> {
        if self.scopes.len() <= 1 {
            return None;
        }

        let scope = self.scopes.pop();
        if let Some(scope) = &scope {
            trace!(kind = scope.name(), depth = self.scopes.len(), "pop scope");
        }
        scope
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Declares `name` in the nearest local or closure table.
    pub fn declare(&mut self, name: &str, decl: NodeId) {
        for scope in self.scopes.iter_mut().rev() {
            match scope {
                Scope::Local(table) | Scope::Closure { table, .. } => {
                    table.insert(name, decl);
                    return;
                }
                Scope::Hoisted(_) | Scope::Class { .. } => {}
            }
        }
    }

    /// Adds a function or class to the hoisted table unless the name is taken.
    pub fn declare_hoisted(&mut self, name: &str, decl: NodeId) {
        if let Some(Scope::Hoisted(table)) = self.scopes.first_mut() {
            if !table.contains(name) {
                table.insert(name, decl);
            }
        }
    }

    pub fn lookup(&mut self, name: &str) -> Option<Binding> {
        let mut closures_passed = vec![];

        for index in (0..self.scopes.len()).rev() {
            let found = match &self.scopes[index] {
                Scope::Hoisted(table) => table.lookup(name).map(|decl| (decl, BindingKind::Hoisted)),
                Scope::Class { table, .. } => table.lookup(name).map(|decl| (decl, BindingKind::Member)),
                Scope::Local(table) | Scope::Closure { table, .. } => table.lookup(name).map(|decl| {
                    if closures_passed.is_empty() {
                        (decl, BindingKind::Local)
                    } else {
                        (decl, BindingKind::Captured)
                    }
                }),
            };

            if let Some((decl, kind)) = found {
                if kind == BindingKind::Captured {
                    self.record_capture(&closures_passed, name, decl);
                }
                return Some(Binding { decl, kind });
            }

            if let Scope::Closure { .. } = self.scopes[index] {
                closures_passed.push(index);
            }
        }

        None
    }

    fn record_capture(&mut self, closures: &[usize], name: &str, decl: NodeId) {
        for &index in closures {
            if let Scope::Closure { function, captures, .. } = &mut self.scopes[index] {
                if !captures.iter().any(|capture| capture.name == name) {
                    trace!(function = ?function, name, "capture");
                    captures.push(Capture {
                        name: name.to_string(),
                        decl,
                    });
                }
            }
        }
    }

    pub fn into_hoisted(mut self) -> SymbolTable {
        match self.scopes.swap_remove(0) {
            Scope::Hoisted(table) => table,
            _ => SymbolTable::new(),
        }
    }
}
