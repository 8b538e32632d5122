//! Directive Scanner
//!
//! Line-oriented state machine over an interface file. Directive lines
//! (`@NAMESPACE`, `@CLASS`, `@FUNCTION`, ...) open scopes on an explicit
//! [`ScopeStack`]; `@{` acknowledges the directive, `@}` closes the innermost
//! scope and commits its declaration into the parent. Every other line goes
//! through the macro expander.
//!
//! In [`ScanMode::Emit`] the scanner also renders the full translation unit
//! into an in-memory buffer as it goes. Nothing is written anywhere until the
//! caller has seen the whole input succeed.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info};

use crate::args::parse_args;
use crate::codegen;
use crate::decl::{join_path, mangle_path, ClassDecl, FunctionDecl, FunctionKind, Receiver, Registry};
use crate::diagnostic::{CompilerError, SyntaxError, SyntaxResult};
use crate::macros::{expand_line, MacroContext};
use crate::operators::OperatorSymbol;
use crate::scope::{Scope, ScopeStack};
use crate::types::{resolve_type, BaseType, TypeDescriptor, IDENT_PATTERN, PATH_SEPARATOR};

lazy_static! {
    static ref NAMESPACE_RE: Regex =
        Regex::new(&format!(r"^@NAMESPACE ({})$", IDENT_PATTERN)).unwrap();
    static ref CLASS_RE: Regex = Regex::new(&format!(
        r"^@CLASS ({})(?:<({})>)?$",
        IDENT_PATTERN, IDENT_PATTERN
    ))
    .unwrap();
    static ref CONSTRUCTOR_RE: Regex = Regex::new(r"^@CONSTRUCTOR\s+\(([^)]*)\)$").unwrap();
    static ref FUNCTION_RE: Regex = Regex::new(&format!(
        r"^@FUNCTION\s+((?:\*|{})(?:\[\])*)\s+({})\s*\(([^)]*)\)$",
        IDENT_PATTERN, IDENT_PATTERN
    ))
    .unwrap();
    static ref OPERATOR_RE: Regex = Regex::new(&format!(
        r#"^@OPERATOR\s+((?:\*|{})(?:\[\])*)\s+"([^"]+)"\s*\(([^)]*)\)$"#,
        IDENT_PATTERN
    ))
    .unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Populate the registries only.
    ScanOnly,
    /// Populate the registries and render the translation unit.
    Emit,
}

#[derive(Debug)]
pub struct Scanner {
    mode: ScanMode,
    file: String,
    line_no: usize,
    scopes: ScopeStack,
    registry: Registry,
    expect_open: bool,
    out: String,
}

impl Scanner {
    pub fn new(mode: ScanMode) -> Self {
        Self {
            mode,
            file: String::new(),
            line_no: 0,
            scopes: ScopeStack::new(),
            registry: Registry::default(),
            expect_open: false,
            out: String::new(),
        }
    }

    /// Scanner that treats `registry` as already declared, so a repeat of
    /// any of its names fails at the offending directive.
    pub fn with_registry(mode: ScanMode, registry: Registry) -> Self {
        Self {
            registry,
            ..Self::new(mode)
        }
    }

    /// Forgets everything scanned so far.
    pub fn reset(&mut self) {
        *self = Self::new(self.mode);
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn into_registry(self) -> Registry {
        self.registry
    }

    /// Rendered translation unit (empty in scan-only mode).
    pub fn into_output(self) -> String {
        self.out
    }

    /// Appends raw text to the output buffer (emission mode only).
    pub fn emit_raw(&mut self, text: &str) {
        if self.emitting() {
            self.out.push_str(text);
        }
    }

    fn emitting(&self) -> bool {
        self.mode == ScanMode::Emit
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // DRIVING
    // ═══════════════════════════════════════════════════════════════════════════

    /// Scans one whole input. The first error aborts the scan.
    pub fn process_source(&mut self, file: &str, source: &str) -> Result<(), CompilerError> {
        self.file = file.to_string();
        self.line_no = 0;
        let mut last_line = "";

        for line in source.lines() {
            self.line_no += 1;
            last_line = line;
            self.process_line(line)
                .map_err(|e| CompilerError::syntax(file, self.line_no, line, e))?;
        }
        self.finish()
            .map_err(|e| CompilerError::syntax(file, self.line_no, last_line, e))?;

        info!("Processed {}", file);
        Ok(())
    }

    /// End-of-input checks: no pending `@{`, no scope left open.
    pub fn finish(&mut self) -> SyntaxResult<()> {
        if self.expect_open {
            return Err(SyntaxError::new("Expect '@{' before end of input"));
        }
        if let Some(scope) = self.scopes.innermost() {
            return Err(SyntaxError::new(format!(
                "Unclosed {} at end of input",
                scope.kind()
            )));
        }
        Ok(())
    }

    /// Consumes one physical line.
    pub fn process_line(&mut self, line: &str) -> SyntaxResult<()> {
        let line = line.split("//").next().unwrap_or_default().trim_end();
        let stripped = line.trim_start();
        let indent = &line[..line.len() - stripped.len()];

        if stripped.is_empty() {
            self.emit_raw("\n");
            return Ok(());
        }

        let first_word = stripped.split_whitespace().next().unwrap_or_default();
        if first_word == "@{" {
            return self.open_block(stripped);
        }
        if self.expect_open {
            return Err(SyntaxError::new("Expect '@{'"));
        }

        debug!(line = self.line_no, directive = first_word, "dispatch");
        match first_word {
            "@}" => self.close_block(stripped, indent),
            "@NAMESPACE" => self.namespace_directive(stripped),
            "@CLASS" => self.class_directive(stripped),
            "@CONSTRUCTOR" => self.constructor_directive(stripped),
            "@DESTRUCTOR" => self.destructor_directive(stripped),
            "@OPERATOR" => self.operator_directive(stripped),
            "@FUNCTION" => self.function_directive(stripped),
            _ => self.ordinary_line(stripped, indent),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // BLOCKS
    // ═══════════════════════════════════════════════════════════════════════════

    fn open_block(&mut self, stripped: &str) -> SyntaxResult<()> {
        if stripped != "@{" {
            return Err(SyntaxError::new("Chaff after '@{'"));
        }
        if !self.expect_open {
            return Err(SyntaxError::new("Unexpected '@{'"));
        }
        self.expect_open = false;
        let marker = codegen::line_marker(self.line_no + 1, &self.file);
        self.emit_raw(&marker);
        Ok(())
    }

    fn close_block(&mut self, stripped: &str, indent: &str) -> SyntaxResult<()> {
        if stripped != "@}" {
            return Err(SyntaxError::new("Chaff after '@}'"));
        }
        let scope = self
            .scopes
            .pop()
            .ok_or_else(|| SyntaxError::new("Unbalanced @}"))?;

        match scope {
            Scope::Namespace(_) => Ok(()),
            Scope::Class(class) => {
                self.close_class(class, indent);
                Ok(())
            }
            Scope::Function(decl)
            | Scope::Constructor(decl)
            | Scope::Destructor(decl)
            | Scope::Operator(decl) => self.close_function(decl, indent),
        }
    }

    fn close_class(&mut self, class: ClassDecl, indent: &str) {
        let record = codegen::class_record(&class, self.registry.last_class_symbol().as_deref(), indent);
        self.emit_raw(&record);
        self.registry.classes.push(class);
    }

    fn close_function(&mut self, decl: FunctionDecl, indent: &str) -> SyntaxResult<()> {
        let trailer = codegen::function_trailer(&decl, indent);
        self.emit_raw(&trailer);

        if decl.kind == FunctionKind::Global {
            self.registry.functions.push(decl);
            return Ok(());
        }
        let class = self
            .scopes
            .class_mut()
            .ok_or_else(|| SyntaxError::new("Member closed outside of its class"))?;
        match decl.kind {
            FunctionKind::Constructor => class.constructor = Some(decl),
            FunctionKind::Destructor => class.destructor = Some(decl),
            _ => class.methods.push(decl),
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // DIRECTIVES
    // ═══════════════════════════════════════════════════════════════════════════

    fn namespace_directive(&mut self, stripped: &str) -> SyntaxResult<()> {
        let caps = NAMESPACE_RE
            .captures(stripped)
            .ok_or_else(|| SyntaxError::new("Bad @NAMESPACE"))?;
        if self.scopes.function().is_some() || self.scopes.class().is_some() {
            return Err(SyntaxError::new("@NAMESPACE inside a class or function"));
        }
        self.scopes.push(Scope::Namespace(caps[1].to_string()));
        self.expect_open = true;
        Ok(())
    }

    fn class_directive(&mut self, stripped: &str) -> SyntaxResult<()> {
        let caps = CLASS_RE
            .captures(stripped)
            .ok_or_else(|| SyntaxError::new("Bad @CLASS"))?;
        if self.scopes.function().is_some() {
            return Err(SyntaxError::new("Class inside a function"));
        }
        if self.scopes.class().is_some() {
            return Err(SyntaxError::new("Nested class"));
        }

        let name = join_path(&self.scopes.namespace_path(), &caps[1]);
        if self.registry.class_names().any(|c| c == name) {
            return Err(SyntaxError::new(format!("Duplicate class '{}'", name)));
        }
        let class = ClassDecl::new(name, caps.get(2).map(|m| m.as_str().to_string()));

        let forward = codegen::class_forward(&class);
        self.emit_raw(&forward);
        self.scopes.push(Scope::Class(class));
        self.expect_open = true;
        Ok(())
    }

    /// Enclosing class for a member directive; functions never nest.
    fn member_class(&self, what: &str) -> SyntaxResult<&ClassDecl> {
        if self.scopes.function().is_some() {
            return Err(SyntaxError::new("Nested function"));
        }
        self.scopes
            .class()
            .ok_or_else(|| SyntaxError::new(format!("{} not in class", what)))
    }

    fn constructor_directive(&mut self, stripped: &str) -> SyntaxResult<()> {
        let caps = CONSTRUCTOR_RE
            .captures(stripped)
            .ok_or_else(|| SyntaxError::new("Bad @CONSTRUCTOR"))?;
        let class = self.member_class("Constructor")?;
        if class.has_constructor() {
            return Err(SyntaxError::new(format!(
                "Class '{}' already has a constructor",
                class.name
            )));
        }

        let args = parse_args(&caps[1], 0, class.template_param.as_deref())?;
        let decl = FunctionDecl {
            kind: FunctionKind::Constructor,
            name: "__construct".to_string(),
            symbol: format!("{}___construct", class.symbol()),
            receiver: None,
            params: args.params,
            ret: TypeDescriptor::scalar(BaseType::Class(class.dotted_name())),
            variadic: args.variadic,
        };
        self.open_function(decl, None);
        Ok(())
    }

    fn destructor_directive(&mut self, stripped: &str) -> SyntaxResult<()> {
        if stripped != "@DESTRUCTOR" {
            return Err(SyntaxError::new("Bad @DESTRUCTOR"));
        }
        let class = self.member_class("Destructor")?;
        if class.has_destructor() {
            return Err(SyntaxError::new(format!(
                "Class '{}' already has a destructor",
                class.name
            )));
        }

        let decl = FunctionDecl {
            kind: FunctionKind::Destructor,
            name: "__destructor".to_string(),
            symbol: format!("{}___destructor", class.symbol()),
            receiver: Some(Receiver::for_class(class)),
            params: Vec::new(),
            ret: TypeDescriptor::scalar(BaseType::Void),
            variadic: false,
        };
        self.open_function(decl, None);
        Ok(())
    }

    fn operator_directive(&mut self, stripped: &str) -> SyntaxResult<()> {
        let caps = OPERATOR_RE
            .captures(stripped)
            .ok_or_else(|| SyntaxError::new("Bad @OPERATOR"))?;
        let class = self.member_class("Operator override")?;
        let op = OperatorSymbol::parse(&caps[2])
            .ok_or_else(|| SyntaxError::new(format!("Unknown operator '{}'", &caps[2])))?;
        let name = op.display_name();
        if class.methods.iter().any(|m| m.name == name) {
            return Err(SyntaxError::new(format!("Duplicate '{}' in '{}'", name, class.name)));
        }

        let template_param = class.template_param.as_deref();
        let args = parse_args(&caps[3], 1, template_param)?;
        let decl = FunctionDecl {
            kind: FunctionKind::Operator(op),
            name,
            symbol: mangle_path(&format!(
                "{}{}operator{}",
                class.name,
                PATH_SEPARATOR,
                op.mangled()
            )),
            receiver: Some(Receiver::for_class(class)),
            params: args.params,
            ret: resolve_type(&caps[1], template_param)?,
            variadic: args.variadic,
        };
        let previous = class.method_chain_head();
        self.open_function(decl, previous);
        Ok(())
    }

    fn function_directive(&mut self, stripped: &str) -> SyntaxResult<()> {
        let caps = FUNCTION_RE
            .captures(stripped)
            .ok_or_else(|| SyntaxError::new("Bad @FUNCTION"))?;
        if self.scopes.function().is_some() {
            return Err(SyntaxError::new("Nested function"));
        }

        let name = &caps[2];
        let (decl, previous) = match self.scopes.class() {
            Some(class) => {
                if class.methods.iter().any(|m| m.name == name) {
                    return Err(SyntaxError::new(format!(
                        "Duplicate method '{}' in '{}'",
                        name, class.name
                    )));
                }
                let template_param = class.template_param.as_deref();
                let args = parse_args(&caps[3], 1, template_param)?;
                let decl = FunctionDecl {
                    kind: FunctionKind::Method,
                    name: name.to_string(),
                    symbol: mangle_path(&format!("{}{}{}", class.name, PATH_SEPARATOR, name)),
                    receiver: Some(Receiver::for_class(class)),
                    params: args.params,
                    ret: resolve_type(&caps[1], template_param)?,
                    variadic: args.variadic,
                };
                (decl, class.method_chain_head())
            }
            None => {
                let path = join_path(&self.scopes.namespace_path(), name);
                if self.registry.function_names().any(|f| f == path) {
                    return Err(SyntaxError::new(format!("Duplicate function '{}'", path)));
                }
                let args = parse_args(&caps[3], 0, None)?;
                let decl = FunctionDecl {
                    kind: FunctionKind::Global,
                    symbol: mangle_path(&path),
                    name: path,
                    receiver: None,
                    params: args.params,
                    ret: resolve_type(&caps[1], None)?,
                    variadic: args.variadic,
                };
                (decl, self.registry.last_function_symbol())
            }
        };
        self.open_function(decl, previous);
        Ok(())
    }

    fn open_function(&mut self, decl: FunctionDecl, previous: Option<String>) {
        let header = codegen::function_header(&decl, previous.as_deref(), &self.file, self.line_no + 1);
        self.emit_raw(&header);
        self.scopes.push(Scope::for_function(decl));
        self.expect_open = true;
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // BODY LINES
    // ═══════════════════════════════════════════════════════════════════════════

    fn ordinary_line(&mut self, stripped: &str, indent: &str) -> SyntaxResult<()> {
        let ctx = MacroContext {
            class: self.scopes.class(),
            function: self.scopes.function(),
        };
        let expanded = expand_line(stripped, &ctx, self.emitting())?;
        if self.emitting() {
            self.out.push_str(indent);
            self.out.push_str(&expanded);
            self.out.push('\n');
        }
        Ok(())
    }
}
