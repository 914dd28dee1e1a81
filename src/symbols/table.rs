use std::collections::{hash_map, HashMap};

use crate::ast::ast::NodeId;

/// Maps declared names to the id of the declaring node. Names are unique
/// within one table.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, NodeId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    /// Inserts `name`, returning the declaration it replaced if any.
    pub fn insert(&mut self, name: impl Into<String>, decl: NodeId) -> Option<NodeId> {
        self.symbols.insert(name.into(), decl)
    }

    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.symbols.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, NodeId> {
        self.symbols.iter()
    }
}

/// Symbol metadata kept on a parsed program.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// Top-level functions and classes, visible regardless of order.
    pub hoisted: SymbolTable,
}

impl Environment {
    pub fn new(hoisted: SymbolTable) -> Self {
        Environment { hoisted }
    }
}
