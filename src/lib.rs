//! # scriptfcns
//!
//! Compiles annotated SpiderScript interface files (`.ssf`) into the C glue
//! that registers native functions and classes with the script runtime.
//!
//! ## Input
//!
//! Interface files are C with directive lines layered on top:
//!
//! ```text
//! @NAMESPACE Gfx
//! @{
//!     @CLASS Point
//!     @{
//!         @CONSTRUCTOR (Integer x, Integer y)
//!         @{
//!             @RETURN NewPoint(Script, @CLASSPTR, x, y);
//!         @}
//!         @FUNCTION Integer X ()
//!         @{
//!             @RETURN ((tPoint*)this)->X;
//!         @}
//!     @}
//! @}
//! ```
//!
//! ## Scanner Invariants
//!
//! 1. **Explicit Scopes**: every directive that opens a block pushes exactly one
//!    scope and must be followed by `@{`; every `@}` pops exactly one.
//!    Input is accepted only if the stack is empty at the end.
//!
//! 2. **Receiver Slot**: methods, operators and destructors carry the receiver
//!    as a separate field. It always occupies argument slot 0 and is never
//!    spelled by the author; user parameters start at slot 1.
//!
//! 3. **Declaration Order**: classes and global functions are registered in
//!    the order they close. Descriptor back-links, the method chains and the
//!    index arrays all follow that order, so output is deterministic.
//!
//! 4. **Fail Loud**: the first syntax error aborts the run. Generated files are
//!    rendered in memory and only written after the whole pass succeeds.

use std::sync::Once;

pub mod args;
pub mod cache;
pub mod codegen;
pub mod compile;
pub mod decl;
pub mod diagnostic;
pub mod discovery;
pub mod header;
pub mod index;
pub mod macros;
pub mod manifest;
pub mod operators;
pub mod scanner;
pub mod scope;
pub mod types;

#[cfg(test)]
mod codegen_tests;

pub use compile::{compile, render, CompileOptions, CompileResult, Mode, SourceFile};
pub use decl::{ClassDecl, FunctionDecl, FunctionKind, Parameter, Receiver, Registry};
pub use diagnostic::{CompilerError, SyntaxError};
pub use header::HeaderFlavor;
pub use scanner::{ScanMode, Scanner};
pub use types::{resolve_type, BaseType, NativeRepr, TypeDescriptor};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for diagnostics output.
///
/// Only active when `RUST_LOG` is set, e.g. `RUST_LOG=scriptfcns=debug`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
