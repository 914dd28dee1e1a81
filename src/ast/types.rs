//! Type system definitions.
//!
//! This module defines the types used by the language, including:
//!
//! - Primitive types (int, float, string, bool, null, void, any)
//! - Literal types denoting a single value (`5`, `"a"`, `true`)
//! - Composite types (arrays, functions, unions, intersections, nullables)
//! - Nominal types, unresolved (`Identifier`) and resolved (`Instance`)
//!
//! Types appear in the AST as parsed annotations and are produced by the type
//! checker for every typed node. Two relations are defined over them:
//! structural equality (`equals`) and assignability (`contains`), where
//! `a.contains(b)` means a value of type `b` may be used where `a` is expected.

use std::fmt::{self, Display};

use super::ast::NodeId;

#[derive(Debug, Clone)]
pub enum Type {
    Any,
    Void,
    Null,
    Boolean,
    True,
    False,
    Int,
    IntLiteral(String),
    Float,
    FloatLiteral(String),
    String,
    StringLiteral(String),
    Array(Box<Type>),
    Function {
        params: Vec<Type>,
        return_type: Box<Type>,
    },
    Union(Vec<Type>),
    Intersection(Vec<Type>),
    Nullable(Box<Type>),
    /// Nominal reference as written in an annotation, not yet resolved.
    Identifier {
        name: String,
        generics: Vec<Type>,
    },
    /// Nominal reference resolved to a class declaration.
    Instance {
        class: NodeId,
        name: String,
    },
}

impl Type {
    pub fn array(element: Type) -> Type {
        Type::Array(Box::new(element))
    }

    pub fn nullable(inner: Type) -> Type {
        Type::Nullable(Box::new(inner))
    }

    pub fn function(params: Vec<Type>, return_type: Type) -> Type {
        Type::Function {
            params,
            return_type: Box::new(return_type),
        }
    }

    /// Builds a union: nested unions are flattened, members equal to an
    /// earlier member are dropped, one member collapses to itself and no
    /// members collapse to `Void`.
    pub fn union(members: Vec<Type>) -> Type {
        build_composite(members, true)
    }

    /// Same normalisation as [`Type::union`] for intersections.
    pub fn intersection(members: Vec<Type>) -> Type {
        build_composite(members, false)
    }

    pub fn equals(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::IntLiteral(a), Type::IntLiteral(b))
            | (Type::FloatLiteral(a), Type::FloatLiteral(b))
            | (Type::StringLiteral(a), Type::StringLiteral(b)) => a == b,
            (Type::Array(a), Type::Array(b)) | (Type::Nullable(a), Type::Nullable(b)) => a.equals(b),
            (Type::Union(a), Type::Union(b)) | (Type::Intersection(a), Type::Intersection(b)) => {
                same_members(a, b)
            }
            (
                Type::Function { params: params_a, return_type: return_a },
                Type::Function { params: params_b, return_type: return_b },
            ) => {
                params_a.len() == params_b.len()
                    && params_a.iter().zip(params_b).all(|(a, b)| mutually_contained(a, b))
                    && mutually_contained(return_a, return_b)
            }
            (
                Type::Identifier { name: name_a, generics: generics_a },
                Type::Identifier { name: name_b, generics: generics_b },
            ) => {
                name_a == name_b
                    && generics_a.len() == generics_b.len()
                    && generics_a.iter().zip(generics_b).all(|(a, b)| a.equals(b))
            }
            (Type::Instance { class: a, .. }, Type::Instance { class: b, .. }) => a == b,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }

    pub fn contains(&self, candidate: &Type) -> bool {
        match (self, candidate) {
            (Type::Any, _) => true,
            (Type::Union(members), _) => {
                if let Type::Union(others) = candidate {
                    if others.iter().all(|other| self.contains(other)) {
                        return true;
                    }
                }
                members.iter().any(|member| member.contains(candidate))
            }
            (_, Type::Union(others)) => others.iter().all(|other| self.contains(other)),
            (Type::Intersection(members), _) => {
                self.equals(candidate) || members.iter().all(|member| member.contains(candidate))
            }
            (_, Type::Intersection(others)) => others.iter().any(|other| self.contains(other)),
            (Type::Nullable(inner), _) => match candidate {
                Type::Null => true,
                Type::Nullable(other) => inner.contains(other),
                _ => inner.contains(candidate),
            },
            (Type::String, Type::StringLiteral(_))
            | (Type::Int, Type::IntLiteral(_))
            | (Type::Float, Type::FloatLiteral(_))
            | (Type::Boolean, Type::True | Type::False) => true,
            // An empty array literal fits any array.
            (Type::Array(element), Type::Array(other)) => {
                matches!(**other, Type::Void) || element.contains(other)
            }
            // Covariant in parameter position.
            (
                Type::Function { params: params_a, return_type: return_a },
                Type::Function { params: params_b, return_type: return_b },
            ) => {
                params_a.len() == params_b.len()
                    && params_a.iter().zip(params_b).all(|(a, b)| a.contains(b))
                    && return_a.contains(return_b)
            }
            _ => self.equals(candidate),
        }
    }

    /// The type left once `null` is ruled out.
    pub fn non_null(&self) -> Type {
        match self {
            Type::Nullable(inner) => inner.non_null(),
            Type::Union(members) => Type::union(
                members
                    .iter()
                    .filter(|member| !matches!(member, Type::Null))
                    .map(Type::non_null)
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::Array(element) => Some(element),
            _ => None,
        }
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

fn mutually_contained(a: &Type, b: &Type) -> bool {
    a.contains(b) && b.contains(a)
}

fn same_members(a: &[Type], b: &[Type]) -> bool {
    a.len() == b.len()
        && a.iter().all(|member| b.iter().any(|other| mutually_contained(member, other)))
        && b.iter().all(|other| a.iter().any(|member| mutually_contained(member, other)))
}

fn build_composite(members: Vec<Type>, is_union: bool) -> Type {
    let mut flat = Vec::with_capacity(members.len());
    for member in members {
        match member {
            Type::Union(inner) if is_union => flat.extend(inner),
            Type::Intersection(inner) if !is_union => flat.extend(inner),
            other => flat.push(other),
        }
    }

    let mut unique: Vec<Type> = Vec::with_capacity(flat.len());
    for member in flat {
        if !unique.iter().any(|existing| existing.equals(&member)) {
            unique.push(member);
        }
    }

    match unique.len() {
        0 => Type::Void,
        1 => unique.remove(0),
        _ if is_union => Type::Union(unique),
        _ => Type::Intersection(unique),
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, types: &[Type], separator: &str) -> fmt::Result {
    // Composite members only need parentheses inside another composite.
    let nested = separator != ", ";
    for (index, ty) in types.iter().enumerate() {
        if index > 0 {
            write!(f, "{}", separator)?;
        }
        match ty {
            Type::Union(_) | Type::Intersection(_) if nested => write!(f, "({})", ty)?,
            _ => write!(f, "{}", ty)?,
        }
    }
    Ok(())
}

impl Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Any => write!(f, "any"),
            Type::Void => write!(f, "void"),
            Type::Null => write!(f, "null"),
            Type::Boolean => write!(f, "bool"),
            Type::True => write!(f, "true"),
            Type::False => write!(f, "false"),
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::String => write!(f, "string"),
            Type::IntLiteral(value) | Type::FloatLiteral(value) => write!(f, "{}", value),
            Type::StringLiteral(value) => write!(f, "{:?}", value),
            Type::Array(element) => write!(f, "array<{}>", element),
            Type::Function { params, return_type } => {
                write!(f, "fun(")?;
                write_joined(f, params, ", ")?;
                write!(f, "): {}", return_type)
            }
            Type::Union(members) => write_joined(f, members, "|"),
            Type::Intersection(members) => write_joined(f, members, "&"),
            Type::Nullable(inner) => match **inner {
                Type::Union(_) | Type::Intersection(_) => write!(f, "?({})", inner),
                _ => write!(f, "?{}", inner),
            },
            Type::Identifier { name, generics } => {
                write!(f, "{}", name)?;
                if !generics.is_empty() {
                    write!(f, "<")?;
                    write_joined(f, generics, ", ")?;
                    write!(f, ">")?;
                }
                Ok(())
            }
            Type::Instance { name, .. } => write!(f, "{}", name),
        }
    }
}
