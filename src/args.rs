//! Argument List Parser
//!
//! Turns the text between the parentheses of a directive into slot-indexed
//! [`Parameter`]s. Grammar: comma separated `<type> <name>` pairs with an
//! optional trailing `...`.

use crate::decl::{Parameter, Receiver};
use crate::diagnostic::{SyntaxError, SyntaxResult};
use crate::types::{is_identifier, resolve_type};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgList {
    pub variadic: bool,
    pub params: Vec<Parameter>,
}

/// Parses `raw` assigning slots from `start_slot` upward (1 when a receiver
/// already holds slot 0).
pub fn parse_args(raw: &str, start_slot: usize, template_param: Option<&str>) -> SyntaxResult<ArgList> {
    let mut list = ArgList::default();
    if raw.trim().is_empty() {
        return Ok(list);
    }

    let mut slot = start_slot;
    for entry in raw.split(',') {
        if list.variadic {
            return Err(SyntaxError::new("arguments after ..."));
        }
        let entry = entry.trim();
        if entry == "..." {
            list.variadic = true;
            continue;
        }

        let tokens: Vec<&str> = entry.split_whitespace().collect();
        let &[type_name, name] = tokens.as_slice() else {
            return Err(SyntaxError::new(format!("badly formatted argument '{}'", entry)));
        };
        if !is_identifier(name) || name.contains('.') {
            return Err(SyntaxError::new(format!("invalid argument name '{}'", name)));
        }
        if name == Receiver::NAME {
            return Err(SyntaxError::new(format!(
                "argument name '{}' is reserved for the receiver",
                name
            )));
        }
        if list.params.iter().any(|p| p.name == name) {
            return Err(SyntaxError::new(format!("duplicate argument '{}'", name)));
        }

        list.params.push(Parameter {
            name: name.to_string(),
            slot,
            ty: resolve_type(type_name, template_param)?,
        });
        slot += 1;
    }

    Ok(list)
}
