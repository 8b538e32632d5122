//! Type Resolver
//!
//! Maps a type name from a directive (`Integer`, `Point[]`, `*`, `T`, ...) to a
//! [`TypeDescriptor`]: the `{typeref, array depth}` pair written into the
//! runtime's prototype records, plus the native C representation used for
//! argument locals and return slots.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::diagnostic::{SyntaxError, SyntaxResult};

/// Identifier fragment shared by every directive pattern.
pub const IDENT_PATTERN: &str = r"[A-Za-z_][A-Za-z0-9_.]*";

lazy_static! {
    static ref IDENT_RE: Regex = Regex::new(&format!("^{}$", IDENT_PATTERN)).unwrap();
}

/// Separator used inside qualified symbol paths (`Lang@Strings@Split`).
pub const PATH_SEPARATOR: char = '@';

// ═══════════════════════════════════════════════════════════════════════════════
// DESCRIPTORS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "kebab-case")]
pub enum BaseType {
    /// `*`, checked at runtime through `ArgTypes`.
    Any,
    Void,
    Boolean,
    Integer,
    Real,
    String,
    /// Position of the owning class's template parameter.
    TemplateArg(usize),
    /// Receiver type of members of a templated class.
    TemplateInstance,
    /// Dotted class name, possibly declared later or in another unit.
    Class(String),
}

/// Native C representation of a value crossing the runtime boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NativeRepr {
    Opaque,
    Void,
    Bool,
    Integer,
    Real,
    String,
    Object,
    Array,
}

impl NativeRepr {
    pub fn c_type(self) -> &'static str {
        match self {
            NativeRepr::Opaque => "const void*",
            NativeRepr::Void => "void",
            NativeRepr::Bool => "tSpiderBool",
            NativeRepr::Integer => "tSpiderInteger",
            NativeRepr::Real => "tSpiderReal",
            NativeRepr::String => "const tSpiderString*",
            NativeRepr::Object => "const tSpiderObject*",
            NativeRepr::Array => "const tSpiderArray*",
        }
    }

    /// Reference-shaped values are passed as the raw `Args[]` pointer;
    /// everything else is copied out of it.
    pub fn is_reference(self) -> bool {
        self.c_type().ends_with('*')
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDescriptor {
    pub base: BaseType,
    pub array_depth: usize,
}

impl TypeDescriptor {
    pub fn new(base: BaseType, array_depth: usize) -> Self {
        Self { base, array_depth }
    }

    pub fn scalar(base: BaseType) -> Self {
        Self::new(base, 0)
    }

    /// Type reference expression as understood by the runtime headers.
    pub fn type_code(&self) -> String {
        match &self.base {
            BaseType::Any => "&gSpiderScript_AnyType".to_string(),
            BaseType::Void => "NULL".to_string(),
            BaseType::Boolean => "&gSpiderScript_BoolType".to_string(),
            BaseType::Integer => "&gSpiderScript_IntegerType".to_string(),
            BaseType::Real => "&gSpiderScript_RealType".to_string(),
            BaseType::String => "&gSpiderScript_StringType".to_string(),
            BaseType::TemplateArg(index) => format!("&gSpiderScript_TemplateArg{}", index),
            BaseType::TemplateInstance => "&gSpiderScript_TemplateInst".to_string(),
            BaseType::Class(name) => type_macro_for_dotted(name),
        }
    }

    /// Initialiser literal, e.g. `{&gSpiderScript_IntegerType,0}`.
    pub fn literal(&self) -> String {
        format!("{{{},{}}}", self.type_code(), self.array_depth)
    }

    pub fn native(&self) -> NativeRepr {
        if self.array_depth > 0 {
            return NativeRepr::Array;
        }
        match self.base {
            BaseType::Any | BaseType::TemplateArg(_) => NativeRepr::Opaque,
            BaseType::Void => NativeRepr::Void,
            BaseType::Boolean => NativeRepr::Bool,
            BaseType::Integer => NativeRepr::Integer,
            BaseType::Real => NativeRepr::Real,
            BaseType::String => NativeRepr::String,
            BaseType::TemplateInstance | BaseType::Class(_) => NativeRepr::Object,
        }
    }

    pub fn is_any(&self) -> bool {
        self.base == BaseType::Any && self.array_depth == 0
    }

    pub fn is_void(&self) -> bool {
        self.base == BaseType::Void && self.array_depth == 0
    }
}

/// `TYPE_` macro naming a class's type definition; `.` and `@` both map to `_z_`.
pub fn type_macro_for_dotted(name: &str) -> String {
    format!("TYPE_{}", name.replace(['.', PATH_SEPARATOR], "_z_"))
}

pub fn is_identifier(text: &str) -> bool {
    IDENT_RE.is_match(text)
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESOLUTION
// ═══════════════════════════════════════════════════════════════════════════════

/// Resolves `ident` in the context of the enclosing class's template
/// parameter (if any).
pub fn resolve_type(ident: &str, template_param: Option<&str>) -> SyntaxResult<TypeDescriptor> {
    let mut base = ident.trim();
    let mut array_depth = 0;
    while base.len() > 2 && base.ends_with("[]") {
        array_depth += 1;
        base = &base[..base.len() - 2];
    }

    let base = match base {
        "*" => {
            if array_depth > 0 {
                return Err(SyntaxError::new("Untyped arrays are not allowed"));
            }
            BaseType::Any
        }
        "void" => {
            if array_depth > 0 {
                return Err(SyntaxError::new("void arrays are not allowed"));
            }
            BaseType::Void
        }
        "Boolean" => BaseType::Boolean,
        "Integer" => BaseType::Integer,
        "Real" => BaseType::Real,
        "String" => BaseType::String,
        name if template_param == Some(name) => BaseType::TemplateArg(0),
        name => {
            if !is_identifier(name) {
                return Err(SyntaxError::new(format!("Invalid identifier '{}'", name)));
            }
            BaseType::Class(name.to_string())
        }
    };

    Ok(TypeDescriptor::new(base, array_depth))
}
