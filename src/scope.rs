//! Scope stack for the directive scanner.
//!
//! Each `@NAMESPACE`, `@CLASS` and function-like directive pushes one tagged
//! [`Scope`]; `@}` pops exactly the innermost one. The namespace path is read
//! off the stack, so it can never disagree with the nesting.

use std::fmt;

use crate::decl::{ClassDecl, FunctionDecl, FunctionKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Namespace(String),
    Class(ClassDecl),
    Function(FunctionDecl),
    Constructor(FunctionDecl),
    Destructor(FunctionDecl),
    Operator(FunctionDecl),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Namespace,
    Class,
    Function,
    Constructor,
    Destructor,
    Operator,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScopeKind::Namespace => "@NAMESPACE",
            ScopeKind::Class => "@CLASS",
            ScopeKind::Function => "@FUNCTION",
            ScopeKind::Constructor => "@CONSTRUCTOR",
            ScopeKind::Destructor => "@DESTRUCTOR",
            ScopeKind::Operator => "@OPERATOR",
        };
        f.write_str(name)
    }
}

impl Scope {
    /// Wraps a function-like declaration in the variant matching its kind.
    pub fn for_function(decl: FunctionDecl) -> Self {
        match decl.kind {
            FunctionKind::Global | FunctionKind::Method => Scope::Function(decl),
            FunctionKind::Constructor => Scope::Constructor(decl),
            FunctionKind::Destructor => Scope::Destructor(decl),
            FunctionKind::Operator(_) => Scope::Operator(decl),
        }
    }

    pub fn kind(&self) -> ScopeKind {
        match self {
            Scope::Namespace(_) => ScopeKind::Namespace,
            Scope::Class(_) => ScopeKind::Class,
            Scope::Function(_) => ScopeKind::Function,
            Scope::Constructor(_) => ScopeKind::Constructor,
            Scope::Destructor(_) => ScopeKind::Destructor,
            Scope::Operator(_) => ScopeKind::Operator,
        }
    }

    pub fn function(&self) -> Option<&FunctionDecl> {
        match self {
            Scope::Function(decl)
            | Scope::Constructor(decl)
            | Scope::Destructor(decl)
            | Scope::Operator(decl) => Some(decl),
            Scope::Namespace(_) | Scope::Class(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, scope: Scope) {
        self.scopes.push(scope);
    }

    pub fn pop(&mut self) -> Option<Scope> {
        self.scopes.pop()
    }

    pub fn innermost(&self) -> Option<&Scope> {
        self.scopes.last()
    }

    /// The open function-like scope; functions never nest, so it is always
    /// the innermost one.
    pub fn function(&self) -> Option<&FunctionDecl> {
        self.innermost().and_then(Scope::function)
    }

    pub fn class(&self) -> Option<&ClassDecl> {
        self.scopes.iter().rev().find_map(|s| match s {
            Scope::Class(class) => Some(class),
            _ => None,
        })
    }

    pub fn class_mut(&mut self) -> Option<&mut ClassDecl> {
        self.scopes.iter_mut().rev().find_map(|s| match s {
            Scope::Class(class) => Some(class),
            _ => None,
        })
    }

    pub fn namespace_path(&self) -> Vec<String> {
        self.scopes
            .iter()
            .filter_map(|s| match s {
                Scope::Namespace(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }
}
