//! JSON manifest of a scan-only aggregation pass.
//!
//! Lets build tooling inspect what a set of interface files exports without
//! parsing the generated C.

use serde::Serialize;

use crate::decl::Registry;
use crate::diagnostic::CompilerError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestExport<'a> {
    pub inputs: &'a [String],
    pub class_count: usize,
    pub function_count: usize,
    #[serde(flatten)]
    pub registry: &'a Registry,
}

pub fn generate_manifest(inputs: &[String], registry: &Registry) -> Result<String, CompilerError> {
    let manifest = ManifestExport {
        inputs,
        class_count: registry.classes.len(),
        function_count: registry.functions.len(),
        registry,
    };
    let mut out = serde_json::to_string_pretty(&manifest)?;
    out.push('\n');
    Ok(out)
}
