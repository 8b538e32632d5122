//! Index emitter
//!
//! Lists every exported class and global function descriptor in
//! null-terminated arrays the runtime walks at load time.

use crate::decl::Registry;

pub fn generate_index(registry: &Registry, header: Option<&str>) -> String {
    let mut lines = vec!["#include <spiderscript.h>".to_string()];
    if let Some(header) = header {
        lines.push(format!("#include \"{}\"", header));
    }

    for class in &registry.classes {
        lines.push(format!("extern tSpiderClass {};", class.descriptor_symbol()));
    }
    for function in &registry.functions {
        lines.push(format!(
            "extern tSpiderFunction {};",
            function.descriptor_symbol()
        ));
    }
    lines.push(format!(
        "int giNumExportedClasses = {};",
        registry.classes.len()
    ));
    lines.push(format!(
        "int giNumExportedFunctions = {};",
        registry.functions.len()
    ));

    lines.push("tSpiderClass *gapExportedClasses[] = {".to_string());
    for class in &registry.classes {
        lines.push(format!("\t&{},", class.descriptor_symbol()));
    }
    lines.push("\tNULL".to_string());
    lines.push("};".to_string());

    lines.push("tSpiderFunction *gapExportedFunctions[] = {".to_string());
    for function in &registry.functions {
        lines.push(format!("\t&{},", function.descriptor_symbol()));
    }
    lines.push("\tNULL".to_string());
    lines.push("};".to_string());

    let mut out = lines.join("\n");
    out.push_str("\n\n");
    out
}
