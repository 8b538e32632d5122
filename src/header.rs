//! Header emitter
//!
//! Declares every scanned class descriptor and maps its `TYPE_` macro to the
//! descriptor's embedded type definition, so other units can name script
//! classes as type references.

use serde::{Deserialize, Serialize};

use crate::decl::Registry;

/// Header shared by independently compiled providers.
pub const DEFAULT_LANG_HEADER: &str = "export_types.gen.h";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HeaderFlavor {
    /// Bindings built into the runtime itself; symbols are exported.
    Language,
    /// An external binding module; pulls in the language's type macros.
    #[default]
    Provider,
}

pub fn generate_header(registry: &Registry, flavor: HeaderFlavor, lang_header: &str) -> String {
    let mut lines = Vec::new();
    let prefix = match flavor {
        HeaderFlavor::Language => "SS_EXPORT ",
        HeaderFlavor::Provider => {
            lines.push(format!("#include \"{}\"", lang_header));
            ""
        }
    };

    for class in &registry.classes {
        lines.push(format!(
            "{}extern tSpiderClass {};",
            prefix,
            class.descriptor_symbol()
        ));
        lines.push(format!(
            "#define {} &{}.TypeDef",
            class.type_macro(),
            class.descriptor_symbol()
        ));
    }

    let mut out = lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}
