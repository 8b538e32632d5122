//! Compilation driver
//!
//! Runs one of the four passes over the inputs named in [`CompileOptions`]
//! and commits the result:
//!
//! - **Code**: one emission-enabled scan of a single input.
//! - **Header** / **Index** / **Manifest**: a scan-only aggregation over every
//!   input, then a render of the merged registry.
//!
//! Every pass renders into memory. The output file is only replaced once the
//! whole pass has succeeded, via a sibling temporary file and a rename.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cache::IncrementalCache;
use crate::codegen;
use crate::decl::Registry;
use crate::diagnostic::CompilerError;
use crate::discovery::expand_inputs;
use crate::header::{generate_header, HeaderFlavor, DEFAULT_LANG_HEADER};
use crate::index::generate_index;
use crate::manifest::generate_manifest;
use crate::scanner::{ScanMode, Scanner};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    /// Full translation of one interface file into C.
    #[default]
    Code,
    Header,
    Index,
    Manifest,
}

fn default_lang_header() -> String {
    DEFAULT_LANG_HEADER.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOptions {
    #[serde(default)]
    pub mode: Mode,
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    /// Header included by the generated unit (code and index modes).
    #[serde(default)]
    pub header: Option<String>,
    #[serde(default)]
    pub flavor: HeaderFlavor,
    /// Shared type-name header pulled in by provider headers.
    #[serde(default = "default_lang_header")]
    pub lang_header: String,
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

impl CompileOptions {
    pub fn new(mode: Mode, inputs: Vec<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            mode,
            inputs,
            output: output.into(),
            header: None,
            flavor: HeaderFlavor::default(),
            lang_header: default_lang_header(),
            cache_dir: None,
        }
    }
}

#[derive(Debug)]
pub struct CompileResult {
    pub output: PathBuf,
    /// False when the cache showed the output to be up to date.
    pub written: bool,
}

/// One input file, read up front.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub text: String,
}

impl SourceFile {
    pub fn read(path: &Path) -> Result<Self, CompilerError> {
        let text = fs::read_to_string(path).map_err(|source| CompilerError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            name: path.display().to_string(),
            text,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PASSES
// ═══════════════════════════════════════════════════════════════════════════════

/// Full translation of one input.
pub fn translate_source(source: &SourceFile, header: Option<&str>) -> Result<String, CompilerError> {
    let mut scanner = Scanner::new(ScanMode::Emit);
    scanner.emit_raw(&codegen::preamble(&source.name, header));
    scanner.process_source(&source.name, &source.text)?;
    Ok(scanner.into_output())
}

/// Scan-only aggregation. Each input gets a fresh scanner; registries are
/// merged in input order.
///
/// A class or global function already declared by an earlier input is a
/// syntax error in the later one.
pub fn scan_sources(sources: &[SourceFile]) -> Result<Registry, CompilerError> {
    let registries = sources
        .par_iter()
        .map(|source| {
            let mut scanner = Scanner::new(ScanMode::ScanOnly);
            scanner.process_source(&source.name, &source.text)?;
            Ok(scanner.into_registry())
        })
        .collect::<Result<Vec<Registry>, CompilerError>>()?;

    let mut merged = Registry::default();
    for (source, registry) in sources.iter().zip(registries) {
        if let Some(name) = merged.first_conflict(&registry) {
            return Err(locate_conflict(source, &merged, name));
        }
        merged.extend(registry);
    }
    Ok(merged)
}

/// Re-scans `source` against the declarations merged so far, so the error
/// points at the directive that repeats one of them.
fn locate_conflict(source: &SourceFile, merged: &Registry, name: &str) -> CompilerError {
    let mut scanner = Scanner::with_registry(ScanMode::ScanOnly, merged.clone());
    match scanner.process_source(&source.name, &source.text) {
        Err(err) => err,
        Ok(()) => CompilerError::Syntax {
            file: source.name.clone(),
            line: 0,
            reason: format!("Duplicate declaration '{}'", name),
            source_line: String::new(),
        },
    }
}

/// Renders the requested artifact without touching the output path.
pub fn render(options: &CompileOptions, sources: &[SourceFile]) -> Result<String, CompilerError> {
    match options.mode {
        Mode::Code => {
            let [source] = sources else {
                return Err(CompilerError::Usage(format!(
                    "code mode takes exactly one input, got {}",
                    sources.len()
                )));
            };
            translate_source(source, options.header.as_deref())
        }
        Mode::Header => {
            let registry = scan_sources(sources)?;
            Ok(generate_header(&registry, options.flavor, &options.lang_header))
        }
        Mode::Index => {
            let registry = scan_sources(sources)?;
            Ok(generate_index(&registry, options.header.as_deref()))
        }
        Mode::Manifest => {
            let registry = scan_sources(sources)?;
            let names: Vec<String> = sources.iter().map(|s| s.name.clone()).collect();
            generate_manifest(&names, &registry)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DRIVER
// ═══════════════════════════════════════════════════════════════════════════════

fn options_hash(options: &CompileOptions, sources: &[SourceFile]) -> Result<String, CompilerError> {
    let config = serde_json::to_vec(&(options.mode, &options.header, options.flavor, &options.lang_header))?;
    let mut parts: Vec<&[u8]> = vec![config.as_slice()];
    for source in sources {
        parts.push(source.name.as_bytes());
        parts.push(source.text.as_bytes());
    }
    Ok(IncrementalCache::compute_hash(parts))
}

fn commit(output: &Path, contents: &str) -> Result<(), CompilerError> {
    let write_err = |source| CompilerError::Write {
        path: output.to_path_buf(),
        source,
    };
    let mut staging = output.as_os_str().to_owned();
    staging.push(".tmp");
    let staging = PathBuf::from(staging);

    fs::write(&staging, contents).map_err(write_err)?;
    fs::rename(&staging, output).map_err(write_err)
}

pub fn compile(options: &CompileOptions) -> Result<CompileResult, CompilerError> {
    if options.inputs.is_empty() {
        return Err(CompilerError::Usage("no input files".to_string()));
    }
    let paths = match options.mode {
        Mode::Code => options.inputs.clone(),
        _ => expand_inputs(&options.inputs)?,
    };
    let sources = paths
        .iter()
        .map(|p| SourceFile::read(p))
        .collect::<Result<Vec<_>, _>>()?;

    let cache = options.cache_dir.as_ref().map(IncrementalCache::new);
    let hash = match &cache {
        Some(_) => Some(options_hash(options, &sources)?),
        None => None,
    };
    if let (Some(cache), Some(hash)) = (&cache, &hash) {
        if cache.is_fresh(&options.output, hash) {
            info!("{} is up to date", options.output.display());
            return Ok(CompileResult {
                output: options.output.clone(),
                written: false,
            });
        }
    }

    let contents = render(options, &sources)?;
    commit(&options.output, &contents)?;
    info!("Wrote {}", options.output.display());

    if let (Some(cache), Some(hash)) = (&cache, &hash) {
        cache.store(&options.output, hash);
    }
    Ok(CompileResult {
        output: options.output.clone(),
        written: true,
    })
}
