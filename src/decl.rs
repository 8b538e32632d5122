//! Declarations accumulated by the scanner.
//!
//! A [`FunctionDecl`] is built when its directive is read and committed into
//! its parent (the enclosing [`ClassDecl`] or the global [`Registry`]) when the
//! matching `@}` closes it. A [`ClassDecl`] is committed into the registry the
//! same way. Registry order is declaration order and drives every back-link
//! and index array the emitters produce.

use serde::Serialize;

use crate::operators::OperatorSymbol;
use crate::types::{type_macro_for_dotted, BaseType, TypeDescriptor, PATH_SEPARATOR};

/// C identifier for a qualified path (`Lang@Strings` → `Lang_Strings`).
pub fn mangle_path(path: &str) -> String {
    path.replace(PATH_SEPARATOR, "_")
}

pub fn join_path(namespaces: &[String], name: &str) -> String {
    let mut path = String::new();
    for ns in namespaces {
        path.push_str(ns);
        path.push(PATH_SEPARATOR);
    }
    path.push_str(name);
    path
}

// ═══════════════════════════════════════════════════════════════════════════════
// PARAMETERS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    pub slot: usize,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
}

/// The implicit target instance of a member. Always slot 0, always `this`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receiver {
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
}

impl Receiver {
    pub const NAME: &'static str = "this";
    pub const SLOT: usize = 0;

    pub fn for_class(class: &ClassDecl) -> Self {
        let base = if class.template_param.is_some() {
            BaseType::TemplateInstance
        } else {
            BaseType::Class(class.dotted_name())
        };
        Self {
            ty: TypeDescriptor::scalar(base),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FUNCTIONS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "operator", rename_all = "kebab-case")]
pub enum FunctionKind {
    Global,
    Method,
    Constructor,
    Destructor,
    Operator(OperatorSymbol),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDecl {
    pub kind: FunctionKind,
    /// Name registered with the runtime: the qualified path for globals, the
    /// class-relative name for members.
    pub name: String,
    /// Mangled C suffix shared by the handler and its records.
    pub symbol: String,
    pub receiver: Option<Receiver>,
    pub params: Vec<Parameter>,
    pub ret: TypeDescriptor,
    pub variadic: bool,
}

impl FunctionDecl {
    /// Number of fixed arguments the trampoline receives, receiver included.
    pub fn fixed_arg_count(&self) -> usize {
        self.params.len() + usize::from(self.receiver.is_some())
    }

    pub fn param(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn handler(&self) -> String {
        format!("Exports_fcn_{}", self.symbol)
    }

    pub fn descriptor_symbol(&self) -> String {
        format!("gExports_fcn_{}", self.symbol)
    }

    pub fn prototype_symbol(&self) -> String {
        format!("gExports_fcnp_{}", self.symbol)
    }

    /// Argument type literals in slot order, receiver first.
    pub fn slot_types(&self) -> Vec<&TypeDescriptor> {
        let mut slots: Vec<&TypeDescriptor> = Vec::with_capacity(self.fixed_arg_count());
        if let Some(receiver) = &self.receiver {
            slots.push(&receiver.ty);
        }
        let mut params: Vec<&Parameter> = self.params.iter().collect();
        params.sort_by_key(|p| p.slot);
        slots.extend(params.into_iter().map(|p| &p.ty));
        slots
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLASSES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDecl {
    /// Qualified path, e.g. `Lang@StringMap`.
    pub name: String,
    pub template_param: Option<String>,
    pub constructor: Option<FunctionDecl>,
    pub destructor: Option<FunctionDecl>,
    /// Methods and operators in declaration order.
    pub methods: Vec<FunctionDecl>,
}

impl ClassDecl {
    pub fn new(name: String, template_param: Option<String>) -> Self {
        Self {
            name,
            template_param,
            constructor: None,
            destructor: None,
            methods: Vec::new(),
        }
    }

    pub fn has_constructor(&self) -> bool {
        self.constructor.is_some()
    }

    pub fn has_destructor(&self) -> bool {
        self.destructor.is_some()
    }

    pub fn template_arg_count(&self) -> usize {
        usize::from(self.template_param.is_some())
    }

    pub fn symbol(&self) -> String {
        mangle_path(&self.name)
    }

    pub fn dotted_name(&self) -> String {
        self.name.replace(PATH_SEPARATOR, ".")
    }

    pub fn descriptor_symbol(&self) -> String {
        class_descriptor_symbol(&self.name)
    }

    pub fn type_macro(&self) -> String {
        type_macro_for_dotted(&self.name)
    }

    /// Head of the reverse-chronological method chain.
    pub fn method_chain_head(&self) -> Option<String> {
        self.methods.last().map(FunctionDecl::descriptor_symbol)
    }
}

pub fn class_descriptor_symbol(name: &str) -> String {
    format!("gExports_class_{}", mangle_path(name))
}

// ═══════════════════════════════════════════════════════════════════════════════
// REGISTRY
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registry {
    pub classes: Vec<ClassDecl>,
    pub functions: Vec<FunctionDecl>,
}

impl Registry {
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|c| c.name.as_str())
    }

    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.iter().map(|f| f.name.as_str())
    }

    /// First class or global function name `other` declares again.
    pub fn first_conflict<'a>(&self, other: &'a Registry) -> Option<&'a str> {
        other
            .class_names()
            .find(|name| self.class_names().any(|c| c == *name))
            .or_else(|| {
                other
                    .function_names()
                    .find(|name| self.function_names().any(|f| f == *name))
            })
    }

    /// Appends another unit's declarations after this one's.
    pub fn extend(&mut self, other: Registry) {
        self.classes.extend(other.classes);
        self.functions.extend(other.functions);
    }

    pub fn last_class_symbol(&self) -> Option<String> {
        self.classes.last().map(ClassDecl::descriptor_symbol)
    }

    pub fn last_function_symbol(&self) -> Option<String> {
        self.functions.last().map(FunctionDecl::descriptor_symbol)
    }
}
