//! Selection of the view variable that becomes primary data, and the
//! split between configuration and domain variables.

use crate::model::{EncodeError, Result, ViewVar, ViewVars, QUERY_LOG_VAR, SPECIAL_VAR_MARKER};
use serde_json::Value;

/// Name of the variable carrying the serialize directive
pub const SERIALIZE_VAR: &str = "_serialize";

pub fn is_special_var(name: &str) -> bool {
    name.starts_with(SPECIAL_VAR_MARKER)
}

/// Names of all configuration variables, in insertion order
pub fn special_vars(vars: &ViewVars) -> Vec<&str> {
    vars.iter()
        .map(|(name, _)| name)
        .filter(|name| is_special_var(name))
        .collect()
}

/// Domain variables, in insertion order. The query log is never data.
pub fn domain_vars(vars: &ViewVars) -> Vec<(&str, &ViewVar)> {
    vars.iter()
        .filter(|(name, _)| !is_special_var(name) && *name != QUERY_LOG_VAR)
        .collect()
}

/// Resolve the variable to encode as `data`.
///
/// `directive` is the raw `_serialize` value, `None` when it was never set.
/// Returns the chosen variable's name and value, or `None` for "no data".
pub fn resolve_data<'a>(
    vars: &'a ViewVars,
    directive: Option<&Value>,
) -> Result<Option<(&'a str, &'a ViewVar)>> {
    let name = match directive {
        None => {
            let domain = domain_vars(vars);
            if domain.len() == 1 {
                return Ok(Some(domain[0]));
            }
            log::debug!(
                "no serialize directive and {} domain variables, rendering without data",
                domain.len()
            );
            return Ok(None);
        }
        Some(Value::Null) | Some(Value::Bool(false)) => return Ok(None),
        Some(Value::Bool(true)) => return Ok(domain_vars(vars).into_iter().next()),
        Some(Value::String(name)) => name.as_str(),
        // Only the first entry is used; the rest merely document intent
        Some(Value::Array(names)) => match names.first() {
            None => return Ok(None),
            Some(Value::String(name)) => name.as_str(),
            Some(other) => {
                return Err(EncodeError::InvalidOption {
                    name: SERIALIZE_VAR.to_string(),
                    reason: format!("list entries must be variable names, got {}", other),
                })
            }
        },
        Some(Value::Object(_)) => return Err(EncodeError::object_serialize_directive()),
        Some(other) => {
            return Err(EncodeError::InvalidOption {
                name: SERIALIZE_VAR.to_string(),
                reason: format!("expected a boolean, a name or a list of names, got {}", other),
            })
        }
    };

    Ok(vars
        .iter()
        .find(|(existing, _)| *existing == name))
}
