//! Codegen module for the full-translation pass
//!
//! Produces the C fragments the scanner splices around the author's body
//! lines: the unit preamble, prototype records, function descriptors,
//! trampoline headers with argument unpacking, and class records. Every
//! fragment is returned as a string ending in a newline; nothing here touches
//! the output file.

use crate::decl::{ClassDecl, FunctionDecl, FunctionKind, Receiver};

/// Uniform handler signature shared by functions, methods and operators.
pub const PROTO_MACRO: &str = "#define __SFCN_PROTO(n) int n(tSpiderScript*Script,void*RetData,int NArgs,const tSpiderTypeRef*ArgTypes,const void*const Args[])";

/// Raises an engine bug exception and bails out with `SS_ERRRET`.
pub const BUGCHECK_MACRO: &str = "#define __SS_BUGCHECK(cnd)\tdo{if(!(cnd)){return SpiderScript_ThrowException(Script,SS_EXCEPTION_BUG,\"Assertion failure '\"#cnd\"'\"),SS_ERRRET;}}while(0)";

fn address_or_null(symbol: Option<&str>) -> String {
    symbol.map_or_else(|| "NULL".to_string(), |s| format!("&{}", s))
}

fn block(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

// ═══════════════════════════════════════════════════════════════════════════════
// UNIT
// ═══════════════════════════════════════════════════════════════════════════════

pub fn preamble(input_name: &str, header: Option<&str>) -> String {
    let mut lines = vec![
        format!("// Auto-generated from '{}'", input_name),
        "#include <spiderscript.h>".to_string(),
        "#include <assert.h>".to_string(),
    ];
    if let Some(header) = header {
        lines.push(format!("#include <{}>", header));
    }
    lines.push(PROTO_MACRO.to_string());
    lines.push(BUGCHECK_MACRO.to_string());
    block(lines)
}

/// Re-synchronises the C compiler's diagnostics with the input file.
pub fn line_marker(line: usize, file: &str) -> String {
    format!("# {} \"{}\"\n", line, file)
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLASSES
// ═══════════════════════════════════════════════════════════════════════════════

pub fn class_forward(class: &ClassDecl) -> String {
    let mut lines = vec![format!("extern tSpiderClass {};", class.descriptor_symbol())];
    if class.template_param.is_some() {
        lines.push("extern tSpiderScript_TypeDef\tgSpiderScript_TemplateInst;".to_string());
        lines.push("extern tSpiderScript_TypeDef\tgSpiderScript_TemplateArg0;".to_string());
    }
    block(lines)
}

/// The `tSpiderClass` record, linked to the previously emitted class.
pub fn class_record(class: &ClassDecl, previous: Option<&str>, indent: &str) -> String {
    let sym = class.descriptor_symbol();
    let (constructor_proto, constructor) = match &class.constructor {
        Some(ctor) => (format!("&{}", ctor.prototype_symbol()), ctor.handler()),
        None => ("NULL".to_string(), "NULL".to_string()),
    };
    let destructor = class
        .destructor
        .as_ref()
        .map_or_else(|| "NULL".to_string(), FunctionDecl::handler);
    let methods = address_or_null(class.method_chain_head().as_deref());

    let lines = vec![
        format!("tSpiderClass {} = {{", sym),
        format!("\t.Next={},", address_or_null(previous)),
        format!("\t.Name=\"{}\",", class.name),
        format!(
            "\t.TypeDef={{.Class=SS_TYPECLASS_NCLASS,{{.NClass=&{}}}}},",
            sym
        ),
        format!("\t.ConstructorProto={},", constructor_proto),
        format!("\t.Constructor={},", constructor),
        format!("\t.Destructor={},", destructor),
        format!("\t.Methods={},", methods),
        format!("\t.NMetaArgs={},", class.template_arg_count()),
        "\t.NAttributes=0,".to_string(),
        "\t.AttributeDefs={".to_string(),
        "\t\t{NULL,{NULL,0},0,0}".to_string(),
        "\t},".to_string(),
        "};".to_string(),
    ];
    block(lines.into_iter().map(|l| format!("{}{}", indent, l)).collect())
}

// ═══════════════════════════════════════════════════════════════════════════════
// FUNCTIONS
// ═══════════════════════════════════════════════════════════════════════════════

fn error_return(kind: FunctionKind) -> &'static str {
    match kind {
        FunctionKind::Constructor => "NULL",
        FunctionKind::Destructor => "((void)0)",
        _ => "-1",
    }
}

fn prototype(decl: &FunctionDecl) -> String {
    match decl.kind {
        FunctionKind::Constructor => format!(
            "tSpiderObject *{}(tSpiderScript *Script, const tSpiderScript_TypeDef *ClassTypeDef,\n\tint NArgs, const tSpiderTypeRef *ArgTypes, const void * const Args[])",
            decl.handler()
        ),
        FunctionKind::Destructor => format!("void {}(tSpiderObject *this)", decl.handler()),
        _ => format!("__SFCN_PROTO({})", decl.handler()),
    }
}

/// `tSpiderFcnProto`: return type, null-terminated argument types, varargs flag.
pub fn prototype_record(decl: &FunctionDecl) -> String {
    let mut lines = vec![
        format!("tSpiderFcnProto {} = {{", decl.prototype_symbol()),
        format!("\t.ReturnType={},.Args={{", decl.ret.literal()),
    ];
    for ty in decl.slot_types() {
        lines.push(format!("\t\t{},", ty.literal()));
    }
    lines.push("\t\t{NULL,0}".to_string());
    lines.push("\t},".to_string());
    lines.push(format!("\t.bVariableArgs={},", u8::from(decl.variadic)));
    lines.push("};".to_string());
    block(lines)
}

/// `tSpiderFunction`: display name and back-link to the previous sibling.
pub fn function_descriptor(decl: &FunctionDecl, previous: Option<&str>) -> String {
    block(vec![
        format!("tSpiderFunction {} = {{", decl.descriptor_symbol()),
        format!(
            "\t.Next={}, .Name=\"{}\",",
            address_or_null(previous),
            decl.name
        ),
        format!(
            "\t.Handler={}, .Prototype=&{},",
            decl.handler(),
            decl.prototype_symbol()
        ),
        "};".to_string(),
    ])
}

/// Argument count check plus one local per fixed argument.
fn argument_unpacking(decl: &FunctionDecl) -> Vec<String> {
    let fixed = decl.fixed_arg_count();
    let mut lines = Vec::new();
    if decl.variadic {
        lines.push(format!("\t__SS_BUGCHECK(NArgs >= {});", fixed));
        lines.push(format!("\tconst int VArgC = NArgs - {};", fixed));
        lines.push(format!("\tconst tSpiderTypeRef *const VArgT = &ArgTypes[{}];", fixed));
        lines.push(format!("\tconst void *const*const VArgV = &Args[{}];", fixed));
        lines.push("\t(void)VArgC;(void)VArgT;(void)VArgV;".to_string());
    } else {
        lines.push(format!("\t__SS_BUGCHECK(NArgs == {});", fixed));
    }

    let receiver = decl
        .receiver
        .as_ref()
        .map(|r| (Receiver::NAME, Receiver::SLOT, &r.ty));
    let params = decl.params.iter().map(|p| (p.name.as_str(), p.slot, &p.ty));
    for (name, slot, ty) in receiver.into_iter().chain(params) {
        let native = ty.native();
        let c_type = native.c_type();
        if native.is_reference() {
            lines.push(format!("\t{} {} = Args[{}];", c_type, name, slot));
        } else {
            lines.push(format!(
                "\t{} {} = *({}*const)Args[{}];",
                c_type, name, c_type, slot
            ));
        }
        lines.push(format!("\t(void){};", name));
    }
    lines
}

/// Everything emitted for a function-like directive, up to and including the
/// opening brace of the handler body.
///
/// `previous` is the sibling the descriptor links back to; constructors and
/// destructors are referenced from the class record instead and get no
/// descriptor. `next_line` is the first body line for the line marker.
pub fn function_header(decl: &FunctionDecl, previous: Option<&str>, file: &str, next_line: usize) -> String {
    let mut out = format!("#define SS_ERRRET {}\n", error_return(decl.kind));
    let prototype = prototype(decl);

    if decl.kind == FunctionKind::Destructor {
        out.push_str(&block(vec![prototype, "{".to_string()]));
        return out;
    }

    out.push_str(&format!("{};\n", prototype));
    out.push_str(&prototype_record(decl));
    if decl.kind != FunctionKind::Constructor {
        out.push_str(&function_descriptor(decl, previous));
    }

    let mut lines = vec![prototype, "{".to_string()];
    lines.extend(argument_unpacking(decl));
    out.push_str(&block(lines));
    out.push_str(&line_marker(next_line, file));
    out
}

/// Closes a handler body. Void functions fall off with an explicit success so
/// the C compiler still flags a missing return anywhere else.
pub fn function_trailer(decl: &FunctionDecl, indent: &str) -> String {
    let mut out = String::new();
    let returns_status = !matches!(decl.kind, FunctionKind::Constructor | FunctionKind::Destructor);
    if returns_status && decl.ret.is_void() {
        out.push_str(&format!("{}\treturn 0;\n", indent));
    }
    out.push_str("}\n");
    out.push_str("\t#undef SS_ERRRET\n");
    out
}
