//! Macro Expander
//!
//! Rewrites the inline `@` markers that may appear in ordinary body lines.
//! Expansions run in a fixed order: `@CLASSPTR`, `@TYPEOF(name)`,
//! `@TYPEOF([expr])`, `@TYPECODE`/`@TYPE`, `@RETURN`, then the typed casts.
//! Whatever marker survives that is an error.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::decl::{ClassDecl, FunctionDecl, FunctionKind, Receiver};
use crate::diagnostic::{SyntaxError, SyntaxResult};
use crate::types::{resolve_type, TypeDescriptor, IDENT_PATTERN};

lazy_static! {
    static ref TYPEOF_NAMED_RE: Regex =
        Regex::new(&format!(r"@TYPEOF\(\s*({})\s*\)", IDENT_PATTERN)).unwrap();
    static ref TYPEOF_INDEX_RE: Regex = Regex::new(r"@TYPEOF\(\s*\[(.+?)\]\s*\)").unwrap();
    static ref TYPE_RE: Regex = Regex::new(r"@TYPE(?:CODE)?\(\s*([^)]+?)\s*\)").unwrap();
    static ref RETURN_RE: Regex = Regex::new(r"@RETURN\s*([^;]*)").unwrap();
    static ref CAST_RE: Regex = Regex::new(&format!(
        r"@(ARRAY|STRING|INTEGER|REAL)\s*\(\s*({}|\[[^\]]+\])\s*\)",
        IDENT_PATTERN
    ))
    .unwrap();
    static ref LEFTOVER_RE: Regex = Regex::new(&format!("@({})", IDENT_PATTERN)).unwrap();
}

/// Where the line being expanded sits.
#[derive(Debug, Clone, Copy, Default)]
pub struct MacroContext<'a> {
    pub class: Option<&'a ClassDecl>,
    pub function: Option<&'a FunctionDecl>,
}

impl<'a> MacroContext<'a> {
    fn template_param(&self) -> Option<&'a str> {
        self.class.and_then(|c| c.template_param.as_deref())
    }

    /// Parameter type and slot, the receiver included.
    fn lookup(&self, name: &str) -> Option<(usize, &'a TypeDescriptor)> {
        let function = self.function?;
        if name == Receiver::NAME {
            return function.receiver.as_ref().map(|r| (Receiver::SLOT, &r.ty));
        }
        function.param(name).map(|p| (p.slot, &p.ty))
    }
}

/// `regex::Regex::replace_all` with a fallible replacer.
fn try_replace_all<F>(re: &Regex, text: &str, mut replacer: F) -> SyntaxResult<String>
where
    F: FnMut(&Captures) -> SyntaxResult<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in re.captures_iter(text) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        out.push_str(&text[last..whole.start]);
        out.push_str(&replacer(&caps)?);
        last = whole.end;
    }
    out.push_str(&text[last..]);
    Ok(out)
}

fn type_literal(ty: &TypeDescriptor) -> String {
    format!("((tSpiderTypeRef){})", ty.literal())
}

/// Expands every marker in `line` (already stripped of indentation).
///
/// `emitting` selects the leftover check: in emission mode any remaining
/// `@ident` is rejected, in scan-only mode only a line-leading `@` is.
pub fn expand_line(line: &str, ctx: &MacroContext, emitting: bool) -> SyntaxResult<String> {
    let mut line = line.to_string();

    if let Some(class) = ctx.class {
        line = line.replace("@CLASSPTR", &format!("&{}", class.descriptor_symbol()));
    }
    line = try_replace_all(&TYPEOF_NAMED_RE, &line, |caps| typeof_named(ctx, &caps[1]))?;
    line = try_replace_all(&TYPEOF_INDEX_RE, &line, |caps| typeof_index(ctx, &caps[1]))?;
    line = try_replace_all(&TYPE_RE, &line, |caps| {
        Ok(type_literal(&resolve_type(&caps[1], ctx.template_param())?))
    })?;
    line = try_replace_all(&RETURN_RE, &line, |caps| lower_return(ctx, caps[1].trim()))?;
    line = try_replace_all(&CAST_RE, &line, |caps| cast(ctx, &caps[1], &caps[2]))?;

    if emitting {
        if let Some(caps) = LEFTOVER_RE.captures(&line) {
            return Err(SyntaxError::new(format!(
                "Unknown meta-operator '@{}'",
                &caps[1]
            )));
        }
    } else if line.starts_with('@') {
        let first_word = line.split_whitespace().next().unwrap_or_default();
        return Err(SyntaxError::new(format!("Unknown meta-operator {}", first_word)));
    }

    Ok(line)
}

// ═══════════════════════════════════════════════════════════════════════════════
// EXPANSIONS
// ═══════════════════════════════════════════════════════════════════════════════

fn typeof_named(ctx: &MacroContext, name: &str) -> SyntaxResult<String> {
    let Some((slot, ty)) = ctx.lookup(name) else {
        return Err(SyntaxError::new(format!(
            "Argument '{}' does not exist (TYPEOF)",
            name
        )));
    };
    if ty.is_any() {
        Ok(format!("ArgTypes[{}]", slot))
    } else {
        Ok(type_literal(ty))
    }
}

fn typeof_index(ctx: &MacroContext, index: &str) -> SyntaxResult<String> {
    let function = ctx
        .function
        .ok_or_else(|| SyntaxError::new("@TYPEOF used outside of a function"))?;
    Ok(format!("ArgTypes[{}+({})]", function.fixed_arg_count(), index))
}

fn lower_return(ctx: &MacroContext, value: &str) -> SyntaxResult<String> {
    let function = ctx
        .function
        .ok_or_else(|| SyntaxError::new("@RETURN used outside of a function"))?;

    match function.kind {
        _ if value.is_empty() && !function.ret.is_void() => {
            Err(SyntaxError::new("Missing return value"))
        }
        FunctionKind::Constructor => Ok(format!("return {}", value)),
        FunctionKind::Destructor => {
            if !value.is_empty() {
                return Err(SyntaxError::new("Returning a value from a destructor"));
            }
            Ok("return".to_string())
        }
        _ if function.ret.is_void() => {
            if !value.is_empty() {
                return Err(SyntaxError::new("Returning non-void from void"));
            }
            Ok("return 0".to_string())
        }
        _ => Ok(format!(
            "do{{*({}*)RetData = ({});return 0;}}while(0)",
            function.ret.native().c_type(),
            value
        )),
    }
}

fn cast(ctx: &MacroContext, target: &str, operand: &str) -> SyntaxResult<String> {
    let c_cast = match target {
        "INTEGER" => "const tSpiderInteger",
        "REAL" => "const tSpiderReal",
        "STRING" => "const tSpiderString*",
        "ARRAY" => "const tSpiderArray*",
        other => {
            return Err(SyntaxError::new(format!("Unknown cast '@{}'", other)));
        }
    };

    let value = if let Some(index) = operand.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        let function = ctx
            .function
            .ok_or_else(|| SyntaxError::new(format!("@{} used outside of a function", target)))?;
        if !function.variadic {
            return Err(SyntaxError::new(format!(
                "Indexed @{} in a function without variable arguments",
                target
            )));
        }
        format!(
            "({{int idx=({});__SS_BUGCHECK({}+idx<NArgs);VArgV[idx];}})",
            index,
            function.fixed_arg_count()
        )
    } else {
        let Some((_, ty)) = ctx.lookup(operand) else {
            return Err(SyntaxError::new(format!(
                "Argument '{}' does not exist (cast)",
                operand
            )));
        };
        if !ty.is_any() {
            return Err(SyntaxError::new(format!(
                "Can't cast strictly typed argument '{}'",
                operand
            )));
        }
        operand.to_string()
    };

    if c_cast.ends_with('*') {
        Ok(format!("(({}){})", c_cast, value))
    } else {
        Ok(format!("(*({}*){})", c_cast, value))
    }
}
